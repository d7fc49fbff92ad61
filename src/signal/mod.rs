//! Signal representations consumed by clock recovery
//!
//! 1. `Waveform`: sampled analog trace of one physical line
//! 2. `digitize`: hysteresis thresholding down to a binary level
//! 3. `DigitalSignal`: initial level plus the times at which it toggles

mod digital;
mod waveform;

pub use digital::{digitize, DigitalSignal};
pub use waveform::{Waveform, WaveSample};
