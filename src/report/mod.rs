//! Analysis output for the protocol decoder and trace viewers
//!
//! The expanded tracks go out as 0/1 strings (and packed hex), the recovered
//! edges and per-line violations as plain timestamp lists.

use serde::Serialize;

use crate::clock::RecoveredClock;
use crate::resample::{ExpandedTracks, Track};
use crate::signal::DigitalSignal;

/// Per-line recovery summary
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LineReport {
    pub label: String,
    pub edges: usize,
    pub violations: Vec<f64>,
    pub anchor: Option<f64>,
}

/// One expanded track, rendered two ways
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TrackReport {
    pub label: String,
    /// One character per cell
    pub bits: String,
    /// Cells packed MSB-first, zero padded to a whole byte
    pub hex: String,
}

impl From<&Track> for TrackReport {
    fn from(track: &Track) -> Self {
        Self {
            label: track.label.clone(),
            bits: cells_to_string(&track.cells),
            hex: pack_hex(&track.cells),
        }
    }
}

/// Recovered ticks re-embedded as a toggling signal, for display only
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OverlayReport {
    pub label: String,
    pub initial: bool,
    pub transitions: Vec<f64>,
}

/// Full analysis result
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AnalysisReport {
    pub generated_at_ms: i64,
    pub period: f64,
    pub recovered_edges: Vec<f64>,
    pub instants: usize,
    pub lines: Vec<LineReport>,
    pub tracks: Vec<TrackReport>,
    pub clock_overlay: Option<OverlayReport>,
}

impl AnalysisReport {
    /// Report built around the reference line's edges and the expanded tracks
    pub fn new(period: f64, reference: &RecoveredClock, tracks: &ExpandedTracks) -> Self {
        let mut rendered: Vec<TrackReport> = tracks.lines.iter().map(TrackReport::from).collect();
        rendered.push(TrackReport::from(&tracks.clock));

        Self {
            generated_at_ms: chrono::Utc::now().timestamp_millis(),
            period,
            recovered_edges: reference.edges.clone(),
            instants: tracks.instants.len(),
            lines: Vec::new(),
            tracks: rendered,
            clock_overlay: None,
        }
    }

    pub fn with_line(mut self, label: &str, clock: &RecoveredClock) -> Self {
        self.lines.push(LineReport {
            label: label.to_string(),
            edges: clock.edges.len(),
            violations: clock.violations.clone(),
            anchor: clock.anchor,
        });
        self
    }

    pub fn with_overlay(mut self, overlay: &DigitalSignal) -> Self {
        self.clock_overlay = Some(OverlayReport {
            label: overlay.label().to_string(),
            initial: overlay.initial(),
            transitions: overlay.transitions().to_vec(),
        });
        self
    }

    pub fn total_violations(&self) -> usize {
        self.lines.iter().map(|l| l.violations.len()).sum()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Render cells as a `0`/`1` string
pub fn cells_to_string(cells: &[u8]) -> String {
    cells.iter().map(|&c| if c != 0 { '1' } else { '0' }).collect()
}

/// Pack cells MSB-first into bytes and hex encode them
pub fn pack_hex(cells: &[u8]) -> String {
    let bytes: Vec<u8> = cells
        .chunks(8)
        .map(|chunk| {
            chunk
                .iter()
                .enumerate()
                .fold(0u8, |acc, (i, &c)| acc | (u8::from(c != 0) << (7 - i)))
        })
        .collect();
    hex::encode(bytes)
}

/// Human-readable violation listing for one line
pub fn describe_violations(label: &str, violations: &[f64]) -> String {
    if violations.is_empty() {
        return format!("{}: no timing violations", label);
    }

    let times: Vec<String> = violations.iter().map(|t| format!("{:.9e}", t)).collect();
    format!(
        "{}: {} timing violation(s) at [{}]",
        label,
        violations.len(),
        times.join(", ")
    )
}
