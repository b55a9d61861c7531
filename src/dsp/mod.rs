/// Digital Signal Processing (DSP) module.
///
/// This module provides the two processing stages of the acquisition
/// pipeline, each operating on one block of samples at a time:
///
/// # Modules
/// - `filter`: Butterworth low-pass IIR filtering of complex baseband blocks.
/// - `demod`: FM demodulation (instantaneous phase, unwrap, first difference).
pub mod demod;
pub mod filter;

pub use demod::{instantaneous_phase, unwrap_phase, Demodulator};
pub use filter::LowPassIir;
