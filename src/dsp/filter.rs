//! Butterworth low-pass filtering of complex baseband blocks.
//!
//! The filter is designed once per acquisition session from
//! {cutoff, sample rate, order} and applied as a causal, single-pass IIR
//! (Direct Form II transposed). Coefficients are real even though the
//! input is complex: the same recursion runs on the real and imaginary
//! parts independently.
//!
//! # Example
//!
//! ```
//! use iqflow::dsp::filter::LowPassIir;
//! use num_complex::Complex;
//!
//! // 100 kHz cutoff at 2.048 MHz sample rate, order 5
//! let filter = LowPassIir::design(100e3, 2.048e6, 5).unwrap();
//!
//! let input = vec![Complex::new(1.0, 0.0); 64];
//! let output = filter.process(&input);
//! assert_eq!(output.len(), 64);
//! ```

use std::f64::consts::PI;

use num_complex::Complex;

use crate::error::{Error, Result};
use crate::{ComplexSample, Sample, SampleBlock};

/// Butterworth low-pass IIR filter.
///
/// Holds the transfer-function coefficients (b, a), each of length
/// order + 1, derived via the analog Butterworth prototype and the
/// bilinear transform with frequency pre-warping. The coefficient set is
/// immutable for the lifetime of the filter; [`process`](Self::process)
/// starts from zero state on every block, so identical input blocks
/// always produce identical output.
#[derive(Debug, Clone, PartialEq)]
pub struct LowPassIir {
    /// Numerator (feedforward) coefficients, b[0]..b[order]
    b: Vec<Sample>,
    /// Denominator (feedback) coefficients, a[0] == 1
    a: Vec<Sample>,
}

impl LowPassIir {
    /// Design a low-pass Butterworth filter.
    ///
    /// # Arguments
    ///
    /// * `cutoff` - Cutoff frequency in Hz; must satisfy 0 < cutoff < sample_rate / 2
    /// * `sample_rate` - Sample rate in Hz
    /// * `order` - Filter order, at least 1 (typical: 5)
    ///
    /// Returns [`Error::Config`] for a cutoff at or above the Nyquist
    /// frequency, a non-positive cutoff or sample rate, or a zero order.
    pub fn design(cutoff: f64, sample_rate: f64, order: usize) -> Result<Self> {
        if order == 0 {
            return Err(Error::config("filter order must be at least 1"));
        }
        if !(sample_rate > 0.0) || !sample_rate.is_finite() {
            return Err(Error::config(format!(
                "sample rate must be positive, got {}",
                sample_rate
            )));
        }
        if !(cutoff > 0.0) || cutoff >= sample_rate / 2.0 {
            return Err(Error::config(format!(
                "cutoff must lie in (0, {}) Hz, got {}",
                sample_rate / 2.0,
                cutoff
            )));
        }

        // Normalized cutoff in (0, 1), where 1 is the Nyquist frequency.
        let wn = cutoff / (sample_rate / 2.0);

        // Pre-warp the cutoff so the analog prototype lands on the right
        // digital frequency after the bilinear transform (fs = 2 convention).
        let fs = 2.0;
        let warped = 2.0 * fs * (PI * wn / fs).tan();

        // Analog Butterworth poles: evenly spaced on the left half of the
        // circle of radius `warped`.
        let mut gain = Complex::new(1.0, 0.0);
        let mut z_poles = Vec::with_capacity(order);
        let fs2 = 2.0 * fs;
        for k in 0..order {
            let theta = PI * (2 * k + order + 1) as f64 / (2 * order) as f64;
            let p = warped * Complex::new(theta.cos(), theta.sin());
            // Bilinear transform of the pole, accumulating the gain change.
            gain *= Complex::new(warped, 0.0) / (Complex::new(fs2, 0.0) - p);
            z_poles.push((Complex::new(fs2, 0.0) + p) / (Complex::new(fs2, 0.0) - p));
        }
        // Poles come in conjugate pairs (plus one real pole for odd order),
        // so the accumulated gain and the expanded polynomials are real.
        let gain = gain.re;

        // Numerator: `order` zeros at z = -1.
        let minus_one = vec![Complex::new(-1.0, 0.0); order];
        let b: Vec<Sample> = poly(&minus_one).iter().map(|c| c.re * gain).collect();
        let a: Vec<Sample> = poly(&z_poles).iter().map(|c| c.re).collect();

        Ok(Self { b, a })
    }

    /// Design the filter from an [`AcquisitionConfig`](crate::AcquisitionConfig).
    pub fn from_config(config: &crate::AcquisitionConfig) -> Result<Self> {
        Self::design(config.cutoff, config.sample_rate, config.filter_order)
    }

    /// Filter one block of complex samples.
    ///
    /// Direct Form II transposed with zero initial conditions; the output
    /// has the same length as the input. Real coefficients applied to a
    /// complex signal filter the I and Q components independently.
    pub fn process(&self, samples: &[ComplexSample]) -> SampleBlock {
        let n = self.b.len();
        let mut state = vec![Complex::new(0.0, 0.0); n - 1];
        let mut out = Vec::with_capacity(samples.len());

        for &x in samples {
            // order >= 1 is guaranteed at design time, so state is non-empty
            let y = self.b[0] * x + state[0];
            for i in 0..state.len() {
                let carry = if i + 1 < state.len() {
                    state[i + 1]
                } else {
                    Complex::new(0.0, 0.0)
                };
                state[i] = self.b[i + 1] * x + carry - self.a[i + 1] * y;
            }
            out.push(y);
        }
        out
    }

    /// Filter order.
    pub fn order(&self) -> usize {
        self.b.len() - 1
    }

    /// Feedforward coefficients b[0]..b[order].
    pub fn numerator(&self) -> &[Sample] {
        &self.b
    }

    /// Feedback coefficients a[0]..a[order], with a[0] == 1.
    pub fn denominator(&self) -> &[Sample] {
        &self.a
    }
}

/// Expand a monic polynomial from its roots, lowest-order coefficient last.
fn poly(roots: &[Complex<f64>]) -> Vec<Complex<f64>> {
    let mut coeffs = vec![Complex::new(1.0, 0.0)];
    for &r in roots {
        coeffs.push(Complex::new(0.0, 0.0));
        for i in (1..coeffs.len()).rev() {
            let prev = coeffs[i - 1];
            coeffs[i] -= r * prev;
        }
    }
    coeffs
}
