//! FM demodulation logger for various I/Q sources
//!
//! Pulls baseband blocks from a sample source, low-pass filters and
//! FM-demodulates them on a dedicated worker thread, prints per-block
//! statistics, and optionally appends every block to a local SQLite
//! database.
//!
//! # Usage Examples
//!
//! ## Synthetic tone (no hardware required)
//! ```bash
//! fmlogger --source tone --tone-freq 5k -v
//! ```
//!
//! ## I/Q file playback with SQLite logging
//! ```bash
//! fmlogger --source file --file capture.iq --format cu8 --db radio_data.db -v
//! ```
//!
//! ## RTL-SDR live capture (requires the `rtlsdr` feature)
//! ```bash
//! fmlogger --source rtlsdr -c 99.5M -s 2048k --ppm 60 --db radio_data.db
//! ```

use std::str::FromStr;

use clap::{ArgAction, Parser, ValueEnum};
use tracing::{info, warn};

use iqflow::{Acquisition, AcquisitionConfig, Gain, IqFileSource, IqFormat, RecordSink, ToneSource};

mod db;
use db::SqliteSink;

#[derive(Debug, Clone, Copy)]
struct Frequency(f64);

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SourceType {
    Tone,
    File,
    Rtlsdr,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "FM demodulation logger for various I/Q sources", long_about = None)]
struct Args {
    /// Center frequency in Hz (accepts k/M suffix, e.g. 99.5M)
    #[arg(short, long, default_value = "99.5M", value_parser = Frequency::from_str)]
    center_freq: Frequency,

    /// Sample rate in Hz (accepts k/M suffix)
    #[arg(short, long, default_value = "2048k", value_parser = Frequency::from_str)]
    sample_rate: Frequency,

    /// Frequency correction in PPM
    #[arg(long, default_value_t = 60)]
    ppm: i32,

    /// Tuner gain in dB (omit for automatic gain control)
    #[arg(short, long)]
    gain: Option<f64>,

    /// Low-pass cutoff frequency in Hz (accepts k/M suffix)
    #[arg(long, default_value = "100k", value_parser = Frequency::from_str)]
    cutoff: Frequency,

    /// Low-pass filter order
    #[arg(long, default_value_t = 5)]
    order: usize,

    /// Samples per acquisition block
    #[arg(long, default_value_t = 256 * 1024)]
    block_size: usize,

    /// Source type: tone, file, or rtlsdr
    #[arg(long, default_value = "tone")]
    source: SourceType,

    /// Input file path (required when source=file)
    #[arg(long)]
    file: Option<String>,

    /// I/Q format for file input (cu8, cs8, cs16, cf32)
    #[arg(long, default_value = "cu8")]
    format: String,

    /// RTL-SDR device index
    #[arg(long, default_value_t = 0)]
    device_index: usize,

    /// Baseband frequency of the synthetic tone source (accepts k/M suffix)
    #[arg(long, default_value = "5k", value_parser = Frequency::from_str)]
    tone_freq: Frequency,

    /// SQLite database to append acquired blocks to
    #[arg(long)]
    db: Option<String>,

    /// Stop after this many blocks
    #[arg(long)]
    blocks: Option<usize>,

    /// Verbosity level (-v=info, -vv=debug, -vvv=trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> iqflow::Result<()> {
    let args = Args::parse();

    // Initialize tracing with verbosity level
    // 0 = WARN (quiet), 1 = INFO, 2 = DEBUG, 3+ = TRACE
    let log_level = match args.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    let _ = tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .try_init();

    let config = AcquisitionConfig {
        sample_rate: args.sample_rate.0,
        center_freq: args.center_freq.0,
        freq_correction: args.ppm,
        gain: match args.gain {
            Some(db) => Gain::Manual(db),
            None => Gain::Auto,
        },
        cutoff: args.cutoff.0,
        filter_order: args.order,
        block_size: args.block_size,
    };

    let sink: Option<Box<dyn RecordSink>> = match &args.db {
        Some(path) => {
            info!("logging blocks to {}", path);
            Some(Box::new(SqliteSink::open(path)?))
        }
        None => None,
    };

    let (acq, rx) = match args.source {
        SourceType::Tone => {
            let freq = args.tone_freq.0;
            Acquisition::start(
                config.clone(),
                move |cfg| Ok(ToneSource::new(freq, cfg.sample_rate)),
                sink,
            )?
        }
        SourceType::File => {
            let path = args
                .file
                .clone()
                .ok_or_else(|| iqflow::Error::config("--file is required when source=file"))?;
            let format = IqFormat::from_str(&args.format)?;
            Acquisition::start(config.clone(), move |_| IqFileSource::open(path, format), sink)?
        }
        SourceType::Rtlsdr => {
            #[cfg(feature = "rtlsdr")]
            {
                let device_index = args.device_index;
                Acquisition::start(
                    config.clone(),
                    move |cfg| iqflow::RtlSdrSource::open(device_index, cfg),
                    sink,
                )?
            }
            #[cfg(not(feature = "rtlsdr"))]
            {
                eprintln!("Error: rtlsdr feature not enabled. Rebuild with --features rtlsdr");
                std::process::exit(1);
            }
        }
    };

    // Graceful stop on Ctrl-C: the loop finishes its in-flight block
    let stopper = acq.stopper();
    if let Err(e) = ctrlc::set_handler(move || stopper.stop()) {
        warn!("could not install Ctrl-C handler: {}", e);
    }

    info!(
        "acquisition running: {:?} source, {} samples per block at {} Hz",
        args.source, config.block_size, config.sample_rate
    );

    let mut count = 0usize;
    for block in rx.iter() {
        count += 1;
        if block.is_empty() {
            continue;
        }
        let mean = block.iter().sum::<f64>() / block.len() as f64;
        let peak = block.iter().fold(0.0f64, |a, &b| a.max(b.abs()));
        info!(
            "block {:>5}: {} values, mean deviation {:.1} Hz, peak {:.1} Hz",
            count,
            block.len(),
            mean,
            peak
        );

        if let Some(limit) = args.blocks {
            if count >= limit {
                acq.stopper().stop();
                break;
            }
        }
    }

    acq.shutdown()?;
    info!("acquisition finished after {} blocks", count);
    Ok(())
}

impl FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(stripped) = s.strip_suffix('M') {
            let val: f64 = stripped.trim().parse().map_err(|_| "Invalid MHz value")?;
            Ok(Frequency(val * 1_000_000.0))
        } else if let Some(stripped) = s.strip_suffix('k') {
            let val: f64 = stripped.trim().parse().map_err(|_| "Invalid kHz value")?;
            Ok(Frequency(val * 1_000.0))
        } else {
            let val: f64 = s.parse().map_err(|_| "Invalid Hz value")?;
            Ok(Frequency(val))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequency_suffix_parsing() {
        assert_eq!(Frequency::from_str("99.5M").unwrap().0, 99_500_000.0);
        assert_eq!(Frequency::from_str("2048k").unwrap().0, 2_048_000.0);
        assert_eq!(Frequency::from_str("100000").unwrap().0, 100_000.0);
        assert!(Frequency::from_str("fast").is_err());
    }
}
