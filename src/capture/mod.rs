//! Capture input
//!
//! Reads two-channel scope captures (one line per sample instant) on a
//! dedicated thread and assembles them into waveforms.

mod reader;

pub use reader::{parse_row, Capture, CaptureReader, CaptureRow, CaptureSource, CaptureStats};
