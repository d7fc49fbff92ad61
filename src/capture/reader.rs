//! Line-oriented capture reader
//!
//! Row format: `<time> <line A volts> <line B volts>`, separated by commas
//! and/or whitespace. Blank lines and `#` comments are skipped.

use anyhow::{anyhow, Context, Result};
use crossbeam_channel::{bounded, Sender};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use tracing::{debug, info, warn};

use crate::signal::{WaveSample, Waveform};

/// Rows buffered between the reader thread and the consumer
const ROW_CHANNEL_CAPACITY: usize = 4096;

/// One sample instant of a two-channel capture
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureRow {
    pub time: f64,
    pub line_a: f64,
    pub line_b: f64,
}

/// Where capture rows come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureSource {
    File(PathBuf),
    Stdin,
}

impl CaptureSource {
    /// `-` selects stdin, anything else is a file path
    pub fn from_arg(arg: &str) -> Self {
        if arg == "-" {
            Self::Stdin
        } else {
            Self::File(PathBuf::from(arg))
        }
    }

    fn open(&self) -> Result<Box<dyn BufRead + Send>> {
        match self {
            Self::File(path) => {
                let file = File::open(path)
                    .with_context(|| format!("Failed to open capture {}", path.display()))?;
                Ok(Box::new(BufReader::new(file)))
            }
            Self::Stdin => Ok(Box::new(BufReader::new(std::io::stdin()))),
        }
    }
}

/// Reader statistics (atomic for access across the reader thread)
#[derive(Debug, Default)]
pub struct CaptureStats {
    pub rows_read: AtomicU64,
    pub rows_rejected: AtomicU64,
}

impl CaptureStats {
    pub fn rows_read(&self) -> u64 {
        self.rows_read.load(Ordering::Relaxed)
    }

    pub fn rows_rejected(&self) -> u64 {
        self.rows_rejected.load(Ordering::Relaxed)
    }
}

/// Both analog lines of one acquisition
#[derive(Debug, Clone)]
pub struct Capture {
    pub line_a: Waveform,
    pub line_b: Waveform,
}

/// Capture reader
pub struct CaptureReader {
    source: CaptureSource,
    line_a_label: String,
    line_b_label: String,
    stats: Arc<CaptureStats>,
}

impl CaptureReader {
    pub fn new(source: CaptureSource, line_a_label: &str, line_b_label: &str) -> Self {
        Self {
            source,
            line_a_label: line_a_label.to_string(),
            line_b_label: line_b_label.to_string(),
            stats: Arc::new(CaptureStats::default()),
        }
    }

    pub fn stats(&self) -> &Arc<CaptureStats> {
        &self.stats
    }

    /// Read the whole capture into two waveforms
    pub fn read_all(&self) -> Result<Capture> {
        info!("Reading capture from {:?}", self.source);

        let reader = self.source.open()?;
        let (row_tx, row_rx) = bounded::<CaptureRow>(ROW_CHANNEL_CAPACITY);
        let stats = self.stats.clone();

        let handle = thread::Builder::new()
            .name("capture-reader".to_string())
            .spawn(move || read_rows(reader, row_tx, &stats))
            .context("Failed to spawn capture reader thread")?;

        let mut line_a = Vec::new();
        let mut line_b = Vec::new();
        for row in row_rx {
            line_a.push(WaveSample::new(row.time, row.line_a));
            line_b.push(WaveSample::new(row.time, row.line_b));
        }

        handle
            .join()
            .map_err(|_| anyhow!("Capture reader thread panicked"))??;

        info!(
            "Capture read: {} rows, {} rejected",
            self.stats.rows_read(),
            self.stats.rows_rejected()
        );

        Ok(Capture {
            line_a: Waveform::new(self.line_a_label.clone(), line_a)
                .with_context(|| format!("Invalid samples on {}", self.line_a_label))?,
            line_b: Waveform::new(self.line_b_label.clone(), line_b)
                .with_context(|| format!("Invalid samples on {}", self.line_b_label))?,
        })
    }
}

/// Reader thread body: parse every line and forward valid rows
fn read_rows(
    reader: Box<dyn BufRead + Send>,
    tx: Sender<CaptureRow>,
    stats: &CaptureStats,
) -> Result<()> {
    for (line_no, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read capture line {}", line_no + 1))?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        match parse_row(trimmed) {
            Some(row) => {
                stats.rows_read.fetch_add(1, Ordering::Relaxed);
                if tx.send(row).is_err() {
                    debug!("Row channel closed, stopping capture reader");
                    break;
                }
            }
            None => {
                let rejected = stats.rows_rejected.fetch_add(1, Ordering::Relaxed) + 1;
                // Only the first few are worth a line each
                if rejected <= 10 {
                    warn!("Rejected capture line {}: {}", line_no + 1, trimmed);
                }
            }
        }
    }
    Ok(())
}

/// Parse a capture row: time and two channel voltages
pub fn parse_row(line: &str) -> Option<CaptureRow> {
    let mut fields = line
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|f| !f.is_empty())
        .map(|f| f.parse::<f64>().ok().filter(|v| v.is_finite()));

    let time = fields.next()??;
    let line_a = fields.next()??;
    let line_b = fields.next()??;

    if fields.next().is_some() {
        return None;
    }

    Some(CaptureRow {
        time,
        line_a,
        line_b,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_capture(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "usb-clock-recovery-{}-{}.csv",
            name,
            std::process::id()
        ));
        let mut file = File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_parse_row_separators() {
        let expected = CaptureRow {
            time: 1e-9,
            line_a: 3.3,
            line_b: 0.1,
        };
        assert_eq!(parse_row("1e-9,3.3,0.1"), Some(expected));
        assert_eq!(parse_row("1e-9 3.3 0.1"), Some(expected));
        assert_eq!(parse_row("1e-9, 3.3,\t0.1"), Some(expected));
    }

    #[test]
    fn test_parse_row_invalid() {
        assert!(parse_row("1e-9,3.3").is_none(), "Missing channel");
        assert!(parse_row("1e-9,3.3,0.1,7").is_none(), "Extra field");
        assert!(parse_row("t,D+,D-").is_none(), "Header");
        assert!(parse_row("1e-9,NaN,0.1").is_none(), "Non-finite value");
    }

    #[test]
    fn test_source_from_arg() {
        assert_eq!(CaptureSource::from_arg("-"), CaptureSource::Stdin);
        assert_eq!(
            CaptureSource::from_arg("cap.csv"),
            CaptureSource::File(PathBuf::from("cap.csv"))
        );
    }

    #[test]
    fn test_read_all() {
        let path = temp_capture(
            "read-all",
            "# time, D+, D-\n0.0,0.1,3.2\n\n1.0,3.2,0.1\ngarbage\n2.0,3.1,0.2\n",
        );
        let reader = CaptureReader::new(CaptureSource::File(path.clone()), "D+", "D-");
        let capture = reader.read_all().unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(capture.line_a.label(), "D+");
        assert_eq!(capture.line_b.label(), "D-");
        assert_eq!(capture.line_a.len(), 3);
        assert_eq!(capture.line_b.samples()[1], WaveSample::new(1.0, 0.1));
        assert_eq!(reader.stats().rows_read(), 3);
        assert_eq!(reader.stats().rows_rejected(), 1);
    }

    #[test]
    fn test_read_all_rejects_time_reversal() {
        let path = temp_capture("reversal", "1.0,0,0\n0.5,0,0\n");
        let reader = CaptureReader::new(CaptureSource::File(path.clone()), "D+", "D-");
        let result = reader.read_all();
        std::fs::remove_file(&path).ok();
        assert!(result.is_err());
    }

    #[test]
    fn test_read_all_missing_file() {
        let reader = CaptureReader::new(
            CaptureSource::File(PathBuf::from("/nonexistent/capture.csv")),
            "D+",
            "D-",
        );
        assert!(reader.read_all().is_err());
    }
}
