//! Error types for clock recovery and resampling

use thiserror::Error;

/// Result type alias for recovery operations
pub type Result<T> = std::result::Result<T, RecoveryError>;

/// Failures surfaced by the analysis core
///
/// An empty signal is not an error: it yields empty clock and violation lists.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecoveryError {
    /// A numeric parameter is out of range (period, ratio, threshold)
    #[error("Invalid parameter: {message}")]
    InvalidParameter { message: String },

    /// Expanded tracks that must line up ended with different lengths
    #[error("Channel misalignment: '{channel}' has {actual} cells, expected {expected}")]
    ChannelMisalignment {
        channel: String,
        expected: usize,
        actual: usize,
    },

    /// Transition timestamps are not finite and strictly increasing
    #[error("Transition {index} is not after its predecessor")]
    UnorderedTransitions { index: usize },
}

impl RecoveryError {
    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            message: message.into(),
        }
    }

    pub fn channel_misalignment(
        channel: impl Into<String>,
        expected: usize,
        actual: usize,
    ) -> Self {
        Self::ChannelMisalignment {
            channel: channel.into(),
            expected,
            actual,
        }
    }
}
