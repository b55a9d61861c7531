//! FM demodulation: instantaneous phase, unwrap, first difference.
//!
//! The demodulator recovers the modulating signal from a block of complex
//! baseband samples by tracking the rate of phase change:
//!
//! 1. instantaneous phase of each sample via `atan2`, confined to (−π, π];
//! 2. phase unwrap, removing the artificial 2π discontinuities;
//! 3. first difference of the unwrapped phase, scaled by
//!    `sample_rate / 2π` to convert radians per sample into Hz.
//!
//! The output is one element shorter than the input; blocks of fewer than
//! two samples demodulate to an empty block.
//!
//! # Example
//!
//! ```
//! use iqflow::dsp::demod::Demodulator;
//! use num_complex::Complex;
//!
//! let demod = Demodulator::new(48_000.0);
//! let samples = vec![
//!     Complex::new(1.0, 0.0),
//!     Complex::new(0.0, 1.0),
//!     Complex::new(-1.0, 0.0),
//! ];
//! let deviation = demod.process(&samples);
//! assert_eq!(deviation.len(), 2);
//! ```

use std::f64::consts::{PI, TAU};

use crate::{ComplexSample, DemodulatedBlock, Sample};

/// Instantaneous phase of each sample, in (−π, π].
pub fn instantaneous_phase(samples: &[ComplexSample]) -> Vec<Sample> {
    samples.iter().map(|s| s.im.atan2(s.re)).collect()
}

/// Remove 2π discontinuities from a sequence of principal-range angles.
///
/// Each output value differs from the corresponding input by an integer
/// multiple of 2π, chosen so that the difference between adjacent
/// unwrapped values lies in (−π, π].
pub fn unwrap_phase(phases: &[Sample]) -> Vec<Sample> {
    let mut out = Vec::with_capacity(phases.len());
    let mut prev_raw = 0.0;
    let mut prev_unwrapped = 0.0;
    for (i, &p) in phases.iter().enumerate() {
        if i == 0 {
            out.push(p);
            prev_raw = p;
            prev_unwrapped = p;
            continue;
        }
        let delta = p - prev_raw;
        // The unique multiple of 2π bringing the step into (−π, π]
        let mut adjusted = delta - (delta / TAU).round() * TAU;
        if adjusted <= -PI {
            adjusted += TAU;
        }
        prev_raw = p;
        prev_unwrapped += adjusted;
        out.push(prev_unwrapped);
    }
    out
}

/// FM demodulator for one acquisition session.
///
/// Stateless across blocks: every call to [`process`](Self::process)
/// demodulates its block in isolation, matching the per-block semantics
/// of the acquisition loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Demodulator {
    sample_rate: f64,
}

impl Demodulator {
    /// Create a demodulator for the given sample rate in Hz.
    pub fn new(sample_rate: f64) -> Self {
        Self { sample_rate }
    }

    /// Demodulate one block of complex samples.
    ///
    /// Returns the instantaneous frequency deviation in Hz, one value per
    /// adjacent sample pair (length N−1). Blocks of length 0 or 1 yield
    /// an empty result.
    pub fn process(&self, samples: &[ComplexSample]) -> DemodulatedBlock {
        if samples.len() < 2 {
            return Vec::new();
        }
        let unwrapped = unwrap_phase(&instantaneous_phase(samples));
        let scale = self.sample_rate / TAU;
        unwrapped
            .windows(2)
            .map(|w| (w[1] - w[0]) * scale)
            .collect()
    }

    /// Sample rate this demodulator was created for, in Hz.
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }
}
