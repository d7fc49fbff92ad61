//! USB clock recovery - offline analysis of scope captures
//!
//! Reads a two-channel capture of a differential pair, recovers the bit
//! clock from the data lines, and emits equal-length 0/1 tracks for a
//! protocol decoder or trace viewer.

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::FmtSubscriber;

use usb_clock_recovery::capture::CaptureReader;
use usb_clock_recovery::config::Config;
use usb_clock_recovery::pipeline;
use usb_clock_recovery::report::AnalysisReport;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = Config::from_env();

    // Initialize logging; stdout is reserved for the report
    FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    info!("===========================================");
    info!("   USB Clock Recovery");
    info!("===========================================");

    info!("Configuration:");
    info!("  Capture: {:?}", config.capture);
    info!("  Bit rate: {} Hz (period {:.3e} s)", config.bit_rate_hz, config.period());
    info!("  Tolerance ratios: min={:?} max={:?}", config.min_ratio, config.max_ratio);
    info!(
        "  Thresholds: {}..{} V, differential {}..{} V",
        config.low_threshold,
        config.high_threshold,
        config.diff_low_threshold,
        config.diff_high_threshold
    );
    info!(
        "  Lead ticks: {} in, {} out",
        config.lead_in_ticks, config.lead_out_ticks
    );
    info!("  Lines: A={} B={}", config.line_a_label, config.line_b_label);

    // Reading and analysis are blocking, keep them off the runtime threads
    let analysis_config = config.clone();
    let report = tokio::task::spawn_blocking(move || -> Result<AnalysisReport> {
        let reader = CaptureReader::new(
            analysis_config.capture.clone(),
            &analysis_config.line_a_label,
            &analysis_config.line_b_label,
        );
        let capture = reader.read_all()?;
        pipeline::analyze(&capture, &analysis_config)
    })
    .await
    .context("Analysis task failed")??;

    let json = report.to_json().context("Failed to serialize report")?;
    match &config.report_path {
        Some(path) => {
            tokio::fs::write(path, json)
                .await
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            info!("Report written to {}", path.display());
        }
        None => println!("{}", json),
    }

    info!(
        "Done. Instants sampled: {}, timing violations: {}",
        report.instants,
        report.total_violations()
    );
    Ok(())
}
