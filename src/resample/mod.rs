//! Resampling of digitized lines at recovered clock instants
//!
//! Every recovered edge is shifted into the middle of its bit cell, the
//! lines are sampled there, and each bit is doubled so an artificial bit
//! clock (low then high per bit) can run alongside the data.

mod expand;

pub use expand::{
    expand, expand_bits, sample_instants, ExpandedTracks, ResampleConfig, SampledLine, Track,
    CLOCK_LABEL,
};
