//! Binary-level signals and hysteresis digitizing
//!
//! A digital signal is stored run-length style: the level before the first
//! transition, then only the times at which the level flips.

use super::Waveform;
use crate::error::{RecoveryError, Result};

/// Digitized single-channel signal
#[derive(Debug, Clone, PartialEq)]
pub struct DigitalSignal {
    label: String,
    /// Level before the first transition
    initial: bool,
    /// Strictly increasing toggle times
    transitions: Vec<f64>,
}

impl DigitalSignal {
    /// Build a signal, rejecting non-finite or non-increasing transition times
    pub fn new(label: impl Into<String>, initial: bool, transitions: Vec<f64>) -> Result<Self> {
        for (i, &t) in transitions.iter().enumerate() {
            if !t.is_finite() || (i > 0 && t <= transitions[i - 1]) {
                return Err(RecoveryError::UnorderedTransitions { index: i });
            }
        }

        Ok(Self {
            label: label.into(),
            initial,
            transitions,
        })
    }

    /// Signal toggling at each recovered clock edge, for overlaying the
    /// recovered ticks on a trace viewer
    pub fn with_transitions(
        label: impl Into<String>,
        initial: bool,
        edges: &[f64],
    ) -> Result<Self> {
        Self::new(label, initial, edges.to_vec())
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn initial(&self) -> bool {
        self.initial
    }

    pub fn transitions(&self) -> &[f64] {
        &self.transitions
    }

    pub fn first_transition(&self) -> Option<f64> {
        self.transitions.first().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    /// Level in force at `time`
    ///
    /// A transition exactly at `time` has already taken effect.
    pub fn level_at(&self, time: f64) -> bool {
        let toggles = self.transitions.partition_point(|&t| t <= time);
        self.initial ^ (toggles % 2 == 1)
    }

    /// Level at each of `instants`
    pub fn sample(&self, instants: &[f64]) -> Vec<bool> {
        instants.iter().map(|&t| self.level_at(t)).collect()
    }
}

/// Reduce an analog waveform to a binary level with a hysteresis pair
///
/// Below `low` is 0, above `high` is 1, anything in between holds the
/// previous level. The initial level comes from the first sample, split at
/// the middle of the band when it starts inside it. A transition is stamped
/// with the time of the first sample past the opposite threshold.
pub fn digitize(wave: &Waveform, low: f64, high: f64) -> Result<DigitalSignal> {
    if !low.is_finite() || !high.is_finite() {
        return Err(RecoveryError::invalid_parameter(format!(
            "thresholds must be finite (low={}, high={})",
            low, high
        )));
    }
    if low > high {
        return Err(RecoveryError::invalid_parameter(format!(
            "low threshold {} is above high threshold {}",
            low, high
        )));
    }

    let samples = wave.samples();
    let Some(first) = samples.first() else {
        return DigitalSignal::new(wave.label(), false, Vec::new());
    };

    let initial = if first.value > high {
        true
    } else if first.value < low {
        false
    } else {
        first.value >= (low + high) / 2.0
    };

    let mut level = initial;
    let mut transitions: Vec<f64> = Vec::new();

    for s in &samples[1..] {
        let next = if s.value > high {
            true
        } else if s.value < low {
            false
        } else {
            level
        };

        if next != level {
            // Two flips at the same instant cancel out
            if transitions.last() == Some(&s.time) {
                transitions.pop();
            } else {
                transitions.push(s.time);
            }
            level = next;
        }
    }

    Ok(DigitalSignal {
        label: wave.label().to_string(),
        initial,
        transitions,
    })
}
