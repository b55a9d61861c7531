//! Sample sources for the acquisition pipeline
//!
//! A [`SampleSource`] produces fixed-size blocks of complex baseband
//! samples on demand. Sources are exclusively owned by the acquisition
//! loop while it is running; dropping the source releases the underlying
//! handle, so a source is closed exactly once.
//!
//! Provided implementations:
//! - [`ToneSource`]: an endless synthetic complex sinusoid (tests, demos)
//! - [`IqFileSource`]: playback of recorded I/Q captures in several formats
//! - `RtlSdrSource`: live RTL-SDR capture (behind the `rtlsdr` feature,
//!   in [`crate::rtlsdr`])

use std::f64::consts::TAU;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use num_complex::Complex;

use crate::error::{Error, Result};
use crate::SampleBlock;

/**
 * I/Q Data Format
 */
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum IqFormat {
    /// Complex unsigned 8-bit (Cu8)
    Cu8,
    /// Complex signed 8-bit (Cs8)
    Cs8,
    /// Complex signed 16-bit (Cs16)
    Cs16,
    /// Complex 32-bit float (Cf32)
    Cf32,
}

impl IqFormat {
    pub(crate) fn bytes_per_sample(self) -> usize {
        match self {
            IqFormat::Cu8 | IqFormat::Cs8 => 2,
            IqFormat::Cs16 => 4,
            IqFormat::Cf32 => 8,
        }
    }
}

impl FromStr for IqFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "cu8" => Ok(IqFormat::Cu8),
            "cs8" => Ok(IqFormat::Cs8),
            "cs16" => Ok(IqFormat::Cs16),
            "cf32" => Ok(IqFormat::Cf32),
            other => Err(Error::config(format!(
                "unknown I/Q format '{}' (expected cu8, cs8, cs16 or cf32)",
                other
            ))),
        }
    }
}

pub(crate) fn convert_bytes_to_complex(format: IqFormat, buffer: &[u8]) -> SampleBlock {
    match format {
        IqFormat::Cu8 => buffer
            .chunks_exact(2)
            .map(|c| {
                Complex::new(
                    (c[0] as f64 - 127.5) / 128.0,
                    (c[1] as f64 - 127.5) / 128.0,
                )
            })
            .collect(),
        IqFormat::Cs8 => buffer
            .chunks_exact(2)
            .map(|c| {
                Complex::new((c[0] as i8) as f64 / 128.0, (c[1] as i8) as f64 / 128.0)
            })
            .collect(),
        IqFormat::Cs16 => buffer
            .chunks_exact(4)
            .map(|c| {
                Complex::new(
                    i16::from_le_bytes([c[0], c[1]]) as f64 / 32768.0,
                    i16::from_le_bytes([c[2], c[3]]) as f64 / 32768.0,
                )
            })
            .collect(),
        IqFormat::Cf32 => buffer
            .chunks_exact(8)
            .map(|c| {
                Complex::new(
                    f32::from_le_bytes([c[0], c[1], c[2], c[3]]) as f64,
                    f32::from_le_bytes([c[4], c[5], c[6], c[7]]) as f64,
                )
            })
            .collect(),
    }
}

/// A source of fixed-size blocks of complex baseband samples.
///
/// `read_block` may block until data is available, but implementations
/// must return within a bounded time so that a pending stop request is
/// not starved indefinitely. `Ok(None)` signals a clean end of stream
/// (finite sources such as file playback); hardware sources never return
/// it. Dropping the source closes the underlying handle.
pub trait SampleSource: Send {
    /// Read the next block of exactly `len` samples.
    fn read_block(&mut self, len: usize) -> Result<Option<SampleBlock>>;
}

/**
 * Synthetic tone source
 */
///
/// Generates an endless unit-amplitude complex sinusoid at a fixed
/// baseband offset. Phase is continuous across blocks, so demodulating
/// its output yields the tone frequency at every sample.
#[derive(Debug, Clone)]
pub struct ToneSource {
    phase: f64,
    phase_inc: f64,
}

impl ToneSource {
    /// Create a tone at `freq` Hz (may be negative) for the given sample rate.
    pub fn new(freq: f64, sample_rate: f64) -> Self {
        Self {
            phase: 0.0,
            phase_inc: TAU * freq / sample_rate,
        }
    }
}

impl SampleSource for ToneSource {
    fn read_block(&mut self, len: usize) -> Result<Option<SampleBlock>> {
        let mut block = Vec::with_capacity(len);
        for _ in 0..len {
            block.push(Complex::new(self.phase.cos(), self.phase.sin()));
            self.phase += self.phase_inc;
        }
        // Keep the accumulator small so precision does not degrade over
        // long sessions
        self.phase %= TAU;
        Ok(Some(block))
    }
}

/**
 * File-based I/Q source
 */
///
/// Plays back a recorded I/Q capture. Reads exactly `len` samples per
/// block; a trailing partial block is treated as end of stream, matching
/// the fixed-block contract of the acquisition loop.
pub struct IqFileSource {
    reader: std::io::BufReader<std::fs::File>,
    format: IqFormat,
}

impl IqFileSource {
    /// Open an I/Q capture file. `~` is expanded to the home directory.
    pub fn open<P: AsRef<Path>>(path: P, format: IqFormat) -> Result<Self> {
        let path = expanduser(path.as_ref().to_path_buf());
        let file = std::fs::File::open(path)?;
        Ok(Self {
            reader: std::io::BufReader::new(file),
            format,
        })
    }
}

impl SampleSource for IqFileSource {
    fn read_block(&mut self, len: usize) -> Result<Option<SampleBlock>> {
        let mut buffer = vec![0u8; len * self.format.bytes_per_sample()];
        match self.reader.read_exact(&mut buffer) {
            Ok(()) => Ok(Some(convert_bytes_to_complex(self.format, &buffer))),
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

fn expanduser(path: PathBuf) -> PathBuf {
    // Check if the path starts with "~"
    if let Some(stripped) = path.to_str().and_then(|p| p.strip_prefix('~')) {
        if let Some(home_dir) = dirs::home_dir() {
            // Join the home directory with the rest of the path
            return home_dir.join(stripped.trim_start_matches('/'));
        }
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_iqformat_from_str() {
        assert_eq!(IqFormat::from_str("cu8").unwrap(), IqFormat::Cu8);
        assert_eq!(IqFormat::from_str("CS16").unwrap(), IqFormat::Cs16);
        assert!(IqFormat::from_str("cf64").is_err());
    }

    #[test]
    fn test_cu8_conversion_center() {
        // 127/128 straddle the unsigned midpoint
        let samples = convert_bytes_to_complex(IqFormat::Cu8, &[127, 128]);
        assert_eq!(samples.len(), 1);
        assert!(samples[0].re.abs() < 0.01);
        assert!(samples[0].im.abs() < 0.01);
    }

    #[test]
    fn test_cs16_conversion_full_scale() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&i16::MAX.to_le_bytes());
        bytes.extend_from_slice(&i16::MIN.to_le_bytes());
        let samples = convert_bytes_to_complex(IqFormat::Cs16, &bytes);
        assert_eq!(samples.len(), 1);
        assert_relative_eq!(samples[0].re, 32767.0 / 32768.0, epsilon = 1e-9);
        assert_relative_eq!(samples[0].im, -1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_cf32_conversion_roundtrip() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&0.25f32.to_le_bytes());
        bytes.extend_from_slice(&(-0.75f32).to_le_bytes());
        let samples = convert_bytes_to_complex(IqFormat::Cf32, &bytes);
        assert_relative_eq!(samples[0].re, 0.25, epsilon = 1e-9);
        assert_relative_eq!(samples[0].im, -0.75, epsilon = 1e-9);
    }

    #[test]
    fn test_tone_source_block_length() {
        let mut source = ToneSource::new(1_000.0, 48_000.0);
        let block = source.read_block(256).unwrap().unwrap();
        assert_eq!(block.len(), 256);
        for s in &block {
            assert_relative_eq!(s.norm(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_tone_source_phase_continuous_across_blocks() {
        // Two blocks of 64 must equal one block of 128
        let mut split = ToneSource::new(5_000.0, 48_000.0);
        let mut whole = ToneSource::new(5_000.0, 48_000.0);

        let mut a = split.read_block(64).unwrap().unwrap();
        a.extend(split.read_block(64).unwrap().unwrap());
        let b = whole.read_block(128).unwrap().unwrap();

        for (x, y) in a.iter().zip(&b) {
            assert_relative_eq!(x.re, y.re, epsilon = 1e-9);
            assert_relative_eq!(x.im, y.im, epsilon = 1e-9);
        }
    }
}
