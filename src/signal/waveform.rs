//! Analog waveform captured from one scope channel

use crate::error::{RecoveryError, Result};

/// One (time, voltage) point of a capture
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveSample {
    pub time: f64,
    pub value: f64,
}

impl WaveSample {
    pub fn new(time: f64, value: f64) -> Self {
        Self { time, value }
    }
}

/// Sampled analog trace, non-decreasing in time
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    label: String,
    samples: Vec<WaveSample>,
}

impl Waveform {
    /// Build a waveform, rejecting samples that go back in time
    pub fn new(label: impl Into<String>, samples: Vec<WaveSample>) -> Result<Self> {
        for (i, s) in samples.iter().enumerate() {
            if !s.time.is_finite() {
                return Err(RecoveryError::invalid_parameter(format!(
                    "sample {} has non-finite time {}",
                    i, s.time
                )));
            }
            if i > 0 && s.time < samples[i - 1].time {
                return Err(RecoveryError::invalid_parameter(format!(
                    "sample {} at {} precedes sample {} at {}",
                    i,
                    s.time,
                    i - 1,
                    samples[i - 1].time
                )));
            }
        }

        Ok(Self {
            label: label.into(),
            samples,
        })
    }

    /// Pointwise `a - b`
    ///
    /// Both traces must come from the same acquisition, i.e. share every
    /// sample instant.
    pub fn difference(label: impl Into<String>, a: &Waveform, b: &Waveform) -> Result<Self> {
        let label = label.into();
        if a.samples.len() != b.samples.len() {
            return Err(RecoveryError::channel_misalignment(
                b.label.clone(),
                a.samples.len(),
                b.samples.len(),
            ));
        }

        let mut samples = Vec::with_capacity(a.samples.len());
        for (i, (sa, sb)) in a.samples.iter().zip(&b.samples).enumerate() {
            if sa.time != sb.time {
                return Err(RecoveryError::invalid_parameter(format!(
                    "'{}' and '{}' disagree on the time of sample {} ({} vs {})",
                    a.label, b.label, i, sa.time, sb.time
                )));
            }
            samples.push(WaveSample::new(sa.time, sa.value - sb.value));
        }

        Ok(Self { label, samples })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn samples(&self) -> &[WaveSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Time span covered by the capture, if any
    pub fn span(&self) -> Option<(f64, f64)> {
        match (self.samples.first(), self.samples.last()) {
            (Some(first), Some(last)) => Some((first.time, last.time)),
            _ => None,
        }
    }
}
