//! Bit-cell sampling and double-width expansion

use tracing::debug;

use crate::error::{RecoveryError, Result};
use crate::signal::DigitalSignal;

/// Label of the synthetic bit clock track
pub const CLOCK_LABEL: &str = "CLK";

/// Where, relative to the recovered edges, the lines are sampled
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResampleConfig {
    /// Nominal bit period, used to space the synthetic lead ticks
    pub period: f64,
    /// Offset added to every edge before sampling
    pub phase_shift: f64,
    /// Synthetic instants placed before the first edge
    pub lead_in_ticks: usize,
    /// Synthetic instants placed after the last edge (idle / SE0 settle)
    pub lead_out_ticks: usize,
}

impl ResampleConfig {
    /// Sample in the middle of each bit cell, no lead ticks
    pub fn centered(period: f64) -> Self {
        Self {
            period,
            phase_shift: period / 2.0,
            lead_in_ticks: 0,
            lead_out_ticks: 0,
        }
    }

    pub fn with_lead_in(mut self, ticks: usize) -> Self {
        self.lead_in_ticks = ticks;
        self
    }

    pub fn with_lead_out(mut self, ticks: usize) -> Self {
        self.lead_out_ticks = ticks;
        self
    }

    fn validate(&self) -> Result<()> {
        if !self.period.is_finite() || self.period <= 0.0 {
            return Err(RecoveryError::invalid_parameter(format!(
                "period must be positive and finite, got {}",
                self.period
            )));
        }
        if !self.phase_shift.is_finite() {
            return Err(RecoveryError::invalid_parameter(format!(
                "phase shift must be finite, got {}",
                self.phase_shift
            )));
        }
        Ok(())
    }
}

/// Bits of one line sampled at a common set of instants
#[derive(Debug, Clone, PartialEq)]
pub struct SampledLine {
    pub label: String,
    pub bits: Vec<bool>,
}

impl SampledLine {
    pub fn new(label: impl Into<String>, bits: Vec<bool>) -> Self {
        Self {
            label: label.into(),
            bits,
        }
    }
}

/// One expanded 0/1 track
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub label: String,
    pub cells: Vec<u8>,
}

impl Track {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Expanded data lines plus the synthetic bit clock, all of equal length
#[derive(Debug, Clone, PartialEq)]
pub struct ExpandedTracks {
    /// Instants the lines were sampled at
    pub instants: Vec<f64>,
    pub clock: Track,
    pub lines: Vec<Track>,
}

impl ExpandedTracks {
    /// Cells per track
    pub fn len(&self) -> usize {
        self.clock.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clock.is_empty()
    }

    pub fn line(&self, label: &str) -> Option<&Track> {
        self.lines.iter().find(|t| t.label == label)
    }

    /// Verify every track has `2 * instants` cells
    pub fn check_aligned(&self) -> Result<()> {
        let expected = self.instants.len() * 2;
        for track in std::iter::once(&self.clock).chain(&self.lines) {
            if track.len() != expected {
                return Err(RecoveryError::channel_misalignment(
                    track.label.clone(),
                    expected,
                    track.len(),
                ));
            }
        }
        Ok(())
    }
}

/// Shifted sampling instants for `edges`, with the lead ticks added
///
/// No edges means nothing to anchor the lead ticks to, so the result is
/// empty.
pub fn sample_instants(edges: &[f64], config: &ResampleConfig) -> Result<Vec<f64>> {
    config.validate()?;

    let (Some(&first), Some(&last)) = (edges.first(), edges.last()) else {
        return Ok(Vec::new());
    };

    let period = config.period;
    let shift = config.phase_shift;
    let mut instants =
        Vec::with_capacity(config.lead_in_ticks + edges.len() + config.lead_out_ticks);

    for k in (1..=config.lead_in_ticks).rev() {
        instants.push(first + shift - k as f64 * period);
    }
    instants.extend(edges.iter().map(|&t| t + shift));
    for k in 1..=config.lead_out_ticks {
        instants.push(last + shift + k as f64 * period);
    }

    Ok(instants)
}

/// Double every sampled bit and add the bit clock
///
/// Each line must carry one bit per instant; otherwise the tracks would not
/// line up and `ChannelMisalignment` is returned.
pub fn expand_bits(instants: Vec<f64>, lines: Vec<SampledLine>) -> Result<ExpandedTracks> {
    let expected = instants.len() * 2;

    let clock = Track {
        label: CLOCK_LABEL.to_string(),
        cells: std::iter::repeat([0u8, 1u8])
            .take(instants.len())
            .flatten()
            .collect(),
    };

    let mut tracks = Vec::with_capacity(lines.len());
    for line in lines {
        let cells: Vec<u8> = line
            .bits
            .iter()
            .flat_map(|&bit| [u8::from(bit); 2])
            .collect();
        if cells.len() != expected {
            return Err(RecoveryError::channel_misalignment(
                line.label,
                expected,
                cells.len(),
            ));
        }
        tracks.push(Track {
            label: line.label,
            cells,
        });
    }

    let expanded = ExpandedTracks {
        instants,
        clock,
        lines: tracks,
    };
    expanded.check_aligned()?;
    Ok(expanded)
}

/// Sample `channels` at the shifted `edges` and expand the result
pub fn expand(
    edges: &[f64],
    channels: &[&DigitalSignal],
    config: &ResampleConfig,
) -> Result<ExpandedTracks> {
    let instants = sample_instants(edges, config)?;

    let lines = channels
        .iter()
        .map(|ch| SampledLine::new(ch.label(), ch.sample(&instants)))
        .collect();

    let expanded = expand_bits(instants, lines)?;
    debug!(
        "Expanded {} lines to {} cells ({} instants)",
        expanded.lines.len(),
        expanded.len(),
        expanded.instants.len()
    );
    Ok(expanded)
}
