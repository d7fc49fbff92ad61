//! Clock recovery for oscilloscope captures of self-clocked differential buses
//!
//! No clock line is recorded, so the bit clock is inferred from the data
//! lines themselves:
//! 1. Digitize each analog line with a hysteresis pair
//! 2. Recover clock instants from the transitions, flagging timing violations
//! 3. Sample the lines at the middle of each recovered bit cell
//! 4. Double every bit and add an artificial bit clock for the decoder
//!
//! ```
//! use usb_clock_recovery::clock::{recover, RecoveryParams};
//! use usb_clock_recovery::signal::DigitalSignal;
//!
//! let dp = DigitalSignal::new("D+", false, vec![10.0, 20.0, 31.0])?;
//! let params = RecoveryParams::new(10.0).with_t0(0.0).with_max_ratio(0.05);
//! let clock = recover(&dp, &params)?;
//! assert_eq!(clock.edges, vec![10.0, 20.0, 30.0]);
//! assert_eq!(clock.violations, vec![31.0]);
//! # Ok::<(), usb_clock_recovery::error::RecoveryError>(())
//! ```

pub mod capture;
pub mod clock;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod report;
pub mod resample;
pub mod signal;

pub use clock::{recover, recover_pair, RecoveredClock, RecoveryParams};
pub use error::RecoveryError;
pub use resample::{expand, ExpandedTracks, ResampleConfig};
pub use signal::{digitize, DigitalSignal, Waveform};
