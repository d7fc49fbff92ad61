//! Configuration loaded from environment variables

use std::path::PathBuf;
use tracing::Level;

use crate::capture::CaptureSource;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Capture to analyse (`-` for stdin)
    pub capture: CaptureSource,

    /// Where to write the JSON report (stdout when unset)
    pub report_path: Option<PathBuf>,

    /// Nominal bit rate in Hz
    pub bit_rate_hz: f64,

    /// Early-edge tolerance ratio (None disables the check)
    pub min_ratio: Option<f64>,

    /// Late-edge tolerance ratio (None disables the check)
    pub max_ratio: Option<f64>,

    /// Single-ended hysteresis pair in volts
    pub low_threshold: f64,
    pub high_threshold: f64,

    /// Differential hysteresis pair in volts
    pub diff_low_threshold: f64,
    pub diff_high_threshold: f64,

    /// Synthetic sampling instants before the first / after the last edge
    pub lead_in_ticks: usize,
    pub lead_out_ticks: usize,

    /// Channel role names handed to the decoder
    pub line_a_label: String,
    pub line_b_label: String,

    /// Maximum tracing level
    pub log_level: Level,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let number = |key: &str, default: f64| -> f64 {
            lookup(key)
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(default)
        };
        let count = |key: &str, default: usize| -> usize {
            lookup(key)
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(default)
        };
        // "none" (or an empty value) switches a tolerance bound off
        let ratio = |key: &str, default: f64| -> Option<f64> {
            match lookup(key) {
                Some(s) if s.trim().is_empty() || s.trim().eq_ignore_ascii_case("none") => None,
                Some(s) => Some(s.trim().parse().unwrap_or(default)),
                None => Some(default),
            }
        };

        Self {
            capture: CaptureSource::from_arg(
                &lookup("CAPTURE_PATH").unwrap_or_else(|| "capture.csv".to_string()),
            ),

            report_path: lookup("REPORT_PATH")
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from),

            bit_rate_hz: number("BIT_RATE_HZ", 12e6), // USB full speed

            min_ratio: ratio("MIN_RATIO", 0.9),
            max_ratio: ratio("MAX_RATIO", 1.1),

            low_threshold: number("LOW_THRESHOLD", 1.5),
            high_threshold: number("HIGH_THRESHOLD", 1.8),

            diff_low_threshold: number("DIFF_LOW_THRESHOLD", -0.5),
            diff_high_threshold: number("DIFF_HIGH_THRESHOLD", 0.5),

            // One tick before the first edge samples the cell that starts at t0
            lead_in_ticks: count("LEAD_IN_TICKS", 1),
            lead_out_ticks: count("LEAD_OUT_TICKS", 3),

            line_a_label: lookup("LINE_A_LABEL").unwrap_or_else(|| "D+".to_string()),
            line_b_label: lookup("LINE_B_LABEL").unwrap_or_else(|| "D-".to_string()),

            log_level: lookup("LOG_LEVEL")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(Level::INFO),
        }
    }

    /// Nominal bit period in seconds
    pub fn period(&self) -> f64 {
        1.0 / self.bit_rate_hz
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let cfg = config(&[]);
        assert_eq!(cfg.capture, CaptureSource::File(PathBuf::from("capture.csv")));
        assert_eq!(cfg.report_path, None);
        assert!((cfg.period() - 1.0 / 12e6).abs() < 1e-18);
        assert_eq!(cfg.min_ratio, Some(0.9));
        assert_eq!(cfg.max_ratio, Some(1.1));
        assert_eq!(cfg.lead_in_ticks, 1);
        assert_eq!(cfg.lead_out_ticks, 3);
        assert_eq!(cfg.line_a_label, "D+");
        assert_eq!(cfg.log_level, Level::INFO);
    }

    #[test]
    fn test_overrides() {
        let cfg = config(&[
            ("CAPTURE_PATH", "-"),
            ("REPORT_PATH", "out.json"),
            ("BIT_RATE_HZ", "1.5e6"),
            ("MIN_RATIO", "none"),
            ("MAX_RATIO", "1.2"),
            ("LEAD_IN_TICKS", "2"),
            ("LINE_B_LABEL", "D- (swapped)"),
            ("LOG_LEVEL", "debug"),
        ]);
        assert_eq!(cfg.capture, CaptureSource::Stdin);
        assert_eq!(cfg.report_path, Some(PathBuf::from("out.json")));
        assert_eq!(cfg.bit_rate_hz, 1.5e6);
        assert_eq!(cfg.min_ratio, None);
        assert_eq!(cfg.max_ratio, Some(1.2));
        assert_eq!(cfg.lead_in_ticks, 2);
        assert_eq!(cfg.line_b_label, "D- (swapped)");
        assert_eq!(cfg.log_level, Level::DEBUG);
    }

    #[test]
    fn test_unparseable_values_fall_back() {
        let cfg = config(&[("BIT_RATE_HZ", "fast"), ("MAX_RATIO", "wide")]);
        assert_eq!(cfg.bit_rate_hz, 12e6);
        assert_eq!(cfg.max_ratio, Some(1.1));
    }
}
