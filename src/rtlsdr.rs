//! RTL-SDR sample source
//! (requires the `rtlsdr` feature)
//!
//! Wraps an RTL-SDR dongle as a [`SampleSource`]: the device is opened and
//! configured from an [`AcquisitionConfig`], read synchronously in the
//! driver's native Cu8 format, and converted to complex samples. The
//! device handle is released when the source is dropped.

use rtl_sdr_rs::{RtlSdr, TunerGain, DEFAULT_BUF_LENGTH};

use crate::config::{AcquisitionConfig, Gain};
use crate::error::Result;
use crate::source::{convert_bytes_to_complex, IqFormat, SampleSource};
use crate::SampleBlock;

/// Synchronous RTL-SDR sample source.
pub struct RtlSdrSource {
    rtlsdr: RtlSdr,
    /// Raw Cu8 bytes read from the driver but not yet handed out
    pending: Vec<u8>,
}

impl RtlSdrSource {
    /// Open device `device_index` and configure it from `config`.
    ///
    /// Sets the sample rate, tuned frequency and gain before the first
    /// read. The PPM frequency correction is folded into the tuned
    /// frequency rather than programmed into the oscillator, which gives
    /// the same net frequency offset.
    pub fn open(device_index: usize, config: &AcquisitionConfig) -> Result<Self> {
        let mut rtlsdr = RtlSdr::open_with_index(device_index)?;
        rtlsdr.set_sample_rate(config.sample_rate as u32)?;

        let corrected = config.center_freq * (1.0 + config.freq_correction as f64 / 1e6);
        rtlsdr.set_center_freq(corrected as u32)?;

        match config.gain {
            Gain::Manual(gain_db) => {
                // Convert dB to rtl-sdr units (gain * 10)
                let gain_tenths = (gain_db * 10.0) as i32;
                rtlsdr.set_tuner_gain(TunerGain::Manual(gain_tenths))?
            }
            Gain::Auto => rtlsdr.set_tuner_gain(TunerGain::Auto)?,
        };
        rtlsdr.reset_buffer()?;

        Ok(Self {
            rtlsdr,
            pending: Vec::new(),
        })
    }
}

impl SampleSource for RtlSdrSource {
    fn read_block(&mut self, len: usize) -> Result<Option<SampleBlock>> {
        let wanted = len * 2; // Cu8: one byte each for I and Q

        while self.pending.len() < wanted {
            let mut buf = vec![0u8; DEFAULT_BUF_LENGTH];
            let bytes_read = self.rtlsdr.read_sync(&mut buf)?;
            if bytes_read == 0 {
                return Ok(None); // End of stream
            }
            self.pending.extend_from_slice(&buf[..bytes_read]);
        }

        let bytes: Vec<u8> = self.pending.drain(..wanted).collect();
        Ok(Some(convert_bytes_to_complex(IqFormat::Cu8, &bytes)))
    }
}
