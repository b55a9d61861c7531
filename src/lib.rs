#![doc = include_str!("../readme.md")]

use num_complex::Complex;

pub mod acquisition;
pub mod config;
pub mod dsp;
pub mod error;
#[cfg(feature = "rtlsdr")]
pub mod rtlsdr;
pub mod source;

/// Floating point type used for signal processing.
pub type Sample = f64;
/// Complex floating point type used for signal processing.
pub type ComplexSample = Complex<Sample>;
/// One block of baseband I/Q samples, produced once per acquisition cycle.
pub type SampleBlock = Vec<ComplexSample>;
/// One block of demodulated instantaneous-frequency values, in Hz.
///
/// Always one element shorter than the [`SampleBlock`] it was produced from.
pub type DemodulatedBlock = Vec<Sample>;

pub use acquisition::{Acquisition, RecordSink, State, Stopper};
pub use config::{AcquisitionConfig, Gain};
pub use error::{Error, Result};
#[cfg(feature = "rtlsdr")]
pub use rtlsdr::RtlSdrSource;
pub use source::{IqFileSource, IqFormat, SampleSource, ToneSource};
