//! End-to-end analysis of one capture
//!
//! 1. Digitize both lines and the differential trace
//! 2. Recover the clock on both lines from a shared origin
//! 3. Sample both lines at the cell centers of line A's clock
//! 4. Assemble the report

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::capture::Capture;
use crate::clock::{count_disagreements, recover_pair, RecoveryParams};
use crate::config::Config;
use crate::report::{describe_violations, AnalysisReport};
use crate::resample::{expand, ResampleConfig};
use crate::signal::{digitize, DigitalSignal, Waveform};

/// Label of the recovered-clock overlay, distinct from the expanded bit clock
pub const OVERLAY_LABEL: &str = "CLK (recovered)";

/// Run the whole analysis over `capture`
pub fn analyze(capture: &Capture, config: &Config) -> Result<AnalysisReport> {
    let period = config.period();

    if let Some((start, end)) = capture.line_a.span() {
        info!(
            "Capture spans {:.9e}..{:.9e} s ({} samples, ~{:.0} bit cells)",
            start,
            end,
            capture.line_a.len(),
            (end - start) / period
        );
    }

    let line_a = digitize(&capture.line_a, config.low_threshold, config.high_threshold)
        .with_context(|| format!("Failed to digitize {}", capture.line_a.label()))?;
    let line_b = digitize(&capture.line_b, config.low_threshold, config.high_threshold)
        .with_context(|| format!("Failed to digitize {}", capture.line_b.label()))?;

    let diff_label = format!("{}-{}", capture.line_b.label(), capture.line_a.label());
    let diff = Waveform::difference(diff_label, &capture.line_b, &capture.line_a)
        .context("Failed to build differential trace")?;
    let diff = digitize(&diff, config.diff_low_threshold, config.diff_high_threshold)
        .context("Failed to digitize differential trace")?;

    info!(
        "Transitions: {}={} {}={} {}={}",
        line_a.label(),
        line_a.transitions().len(),
        line_b.label(),
        line_b.transitions().len(),
        diff.label(),
        diff.transitions().len()
    );

    let params = RecoveryParams {
        period,
        min_ratio: config.min_ratio,
        max_ratio: config.max_ratio,
        t0: None,
    };
    let (clock_a, clock_b) =
        recover_pair(&line_a, &line_b, &params).context("Clock recovery failed")?;

    info!("{}", describe_violations(line_a.label(), &clock_a.violations));
    info!("{}", describe_violations(line_b.label(), &clock_b.violations));

    let missing = count_disagreements(&clock_a.edges, &clock_b.edges, period);
    if missing > 0 {
        warn!(
            "{} of {} edges on {} have no counterpart on {}",
            missing,
            clock_a.len(),
            line_a.label(),
            line_b.label()
        );
    }

    let resample = ResampleConfig::centered(period)
        .with_lead_in(config.lead_in_ticks)
        .with_lead_out(config.lead_out_ticks);
    let tracks = expand(&clock_a.edges, &[&line_a, &line_b], &resample)
        .context("Failed to expand sampled lines")?;

    let overlay = DigitalSignal::with_transitions(OVERLAY_LABEL, diff.initial(), &clock_a.edges)
        .context("Failed to build clock overlay")?;

    info!(
        "Recovered {} edges, {} cells per track",
        clock_a.len(),
        tracks.len()
    );

    Ok(AnalysisReport::new(period, &clock_a, &tracks)
        .with_line(line_a.label(), &clock_a)
        .with_line(line_b.label(), &clock_b)
        .with_overlay(&overlay))
}
