//! Acquisition session configuration
//!
//! An [`AcquisitionConfig`] is supplied once at session start and is
//! immutable for the lifetime of that session. Validation happens before
//! any hardware is touched: a configuration that violates the Nyquist
//! margin or asks for a degenerate filter is rejected up front instead of
//! producing silently aliased output.

use std::fmt;

use crate::error::{Error, Result};

/// Tuner gain setting: hardware AGC or a manual value in dB.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gain {
    /// Let the tuner's automatic gain control choose
    Auto,
    /// Fixed gain in dB
    Manual(f64),
}

impl fmt::Display for Gain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gain::Auto => write!(f, "auto"),
            Gain::Manual(db) => write!(f, "{} dB", db),
        }
    }
}

/// Configuration for one acquisition session.
///
/// # Example
///
/// ```
/// use iqflow::AcquisitionConfig;
///
/// let config = AcquisitionConfig {
///     sample_rate: 1_024_000.0,
///     cutoff: 100_000.0,
///     ..AcquisitionConfig::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct AcquisitionConfig {
    /// Sample rate in Hz
    pub sample_rate: f64,
    /// Center frequency in Hz
    pub center_freq: f64,
    /// Frequency correction in PPM
    pub freq_correction: i32,
    /// Tuner gain
    pub gain: Gain,
    /// Low-pass cutoff frequency in Hz
    pub cutoff: f64,
    /// Low-pass filter order
    pub filter_order: usize,
    /// Samples read from the source per acquisition cycle
    pub block_size: usize,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            sample_rate: 2.048e6,
            center_freq: 99.5e6,
            freq_correction: 60,
            gain: Gain::Auto,
            cutoff: 100e3,
            filter_order: 5,
            block_size: 256 * 1024,
        }
    }
}

impl AcquisitionConfig {
    /// Half the sample rate; the highest representable frequency.
    pub fn nyquist(&self) -> f64 {
        self.sample_rate / 2.0
    }

    /// Check the configuration for internal consistency.
    ///
    /// Returns [`Error::Config`] for a non-positive sample rate or cutoff,
    /// a cutoff at or above the Nyquist frequency, a zero filter order, or
    /// a zero block size.
    pub fn validate(&self) -> Result<()> {
        if !(self.sample_rate > 0.0) || !self.sample_rate.is_finite() {
            return Err(Error::config(format!(
                "sample rate must be positive, got {}",
                self.sample_rate
            )));
        }
        if !(self.cutoff > 0.0) || !self.cutoff.is_finite() {
            return Err(Error::config(format!(
                "cutoff must be positive, got {}",
                self.cutoff
            )));
        }
        if self.cutoff >= self.nyquist() {
            return Err(Error::config(format!(
                "cutoff {} Hz is at or above the Nyquist frequency {} Hz",
                self.cutoff,
                self.nyquist()
            )));
        }
        if self.filter_order == 0 {
            return Err(Error::config("filter order must be at least 1"));
        }
        if self.block_size == 0 {
            return Err(Error::config("block size must be at least 1"));
        }
        Ok(())
    }
}
