//! Clock recovery for self-clocked signals
//!
//! Each level change of a digitized line is assumed to be triggered by a
//! clock edge. Knowing only the nominal period, the recovery:
//! 1. Fills in the ticks between consecutive transitions
//! 2. Resynchronizes on every observed transition
//! 3. Flags transitions whose timing residual exceeds the tolerance window
//!
//! Resyncing on every edge keeps long captures aligned but only measures
//! per-edge jitter, not accumulated drift.

mod pair;
mod recover;

pub use pair::{count_disagreements, recover_pair};
pub use recover::{recover, RecoveredClock, RecoveryParams};
