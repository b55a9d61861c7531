//! The real-time acquisition loop
//!
//! One dedicated worker thread owns the sample source for the lifetime of
//! a session and drives the per-block pipeline: read a fixed-size block,
//! low-pass filter it, FM-demodulate it, hand it to the optional record
//! sink, and publish it to the consumer over an ordered channel. The
//! controller side holds an [`Acquisition`] handle and a cloneable
//! [`Stopper`].
//!
//! State machine: Idle → Running → Stopping → Idle.
//!
//! - opening the source fails → the error is returned from
//!   [`Acquisition::start`] and the loop never enters Running;
//! - a device read fails mid-session → the source is dropped, the loop
//!   lands in Idle, and [`Acquisition::shutdown`] reports the error;
//! - a stop request is observed once per iteration: the in-flight block
//!   is finished, never aborted mid-read.
//!
//! Consumer and sink failures are isolated. A disconnected consumer ends
//! the session cleanly; a failing sink is logged and skipped.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;

use crossbeam_channel::{unbounded, Receiver, Sender};
use tracing::{debug, warn};

use crate::config::AcquisitionConfig;
use crate::dsp::{Demodulator, LowPassIir};
use crate::error::{Error, Result};
use crate::source::SampleSource;
use crate::{ComplexSample, DemodulatedBlock, Sample};

/// Observable state of the acquisition loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum State {
    /// No session active; the sample source is closed
    Idle = 0,
    /// The worker is reading, filtering, demodulating and publishing
    Running = 1,
    /// A stop request was issued; the in-flight block is being finished
    Stopping = 2,
}

impl State {
    fn from_u8(value: u8) -> State {
        match value {
            1 => State::Running,
            2 => State::Stopping,
            _ => State::Idle,
        }
    }
}

/// Fire-and-forget persistence seam.
///
/// Called once per produced block, before publication, with the raw
/// samples as read from the source and the demodulated block. Errors are
/// logged at warn level and never stop the acquisition.
pub trait RecordSink: Send {
    fn append(&mut self, raw: &[ComplexSample], demodulated: &[Sample]) -> Result<()>;
}

/// Cloneable stop handle for the acquisition loop.
///
/// Safe to use from any thread (e.g. a Ctrl-C handler). Stopping is
/// cooperative: the worker observes the flag once per iteration and
/// finishes its in-flight block first.
#[derive(Debug, Clone)]
pub struct Stopper {
    stop: Arc<AtomicBool>,
    state: Arc<AtomicU8>,
}

impl Stopper {
    /// Request the loop to stop after the current block.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
        // Running -> Stopping; a loop that is already Idle stays Idle
        let _ = self.state.compare_exchange(
            State::Running as u8,
            State::Stopping as u8,
            Ordering::SeqCst,
            Ordering::SeqCst,
        );
    }

    /// Current state of the loop this stopper belongs to.
    pub fn state(&self) -> State {
        State::from_u8(self.state.load(Ordering::SeqCst))
    }
}

/// Controller handle for one acquisition session.
///
/// Returned by [`Acquisition::start`] together with the ordered receiver
/// of demodulated blocks. Dropping the handle stops the session and joins
/// the worker.
pub struct Acquisition {
    stopper: Stopper,
    worker: Option<thread::JoinHandle<Result<()>>>,
}

impl Acquisition {
    /// Start an acquisition session.
    ///
    /// Validates `config`, spawns the worker thread, and opens the sample
    /// source on it via `open`. If validation or the open fails, the error
    /// is returned and the loop never enters Running. On success the loop
    /// is Running and demodulated blocks arrive on the returned receiver
    /// in strict acquisition order.
    pub fn start<S, F>(
        config: AcquisitionConfig,
        open: F,
        sink: Option<Box<dyn RecordSink>>,
    ) -> Result<(Self, Receiver<DemodulatedBlock>)>
    where
        S: SampleSource + 'static,
        F: FnOnce(&AcquisitionConfig) -> Result<S> + Send + 'static,
    {
        config.validate()?;
        let filter = LowPassIir::from_config(&config)?;
        let demod = Demodulator::new(config.sample_rate);

        let stop = Arc::new(AtomicBool::new(false));
        let state = Arc::new(AtomicU8::new(State::Idle as u8));
        let (tx, rx) = unbounded();
        let (init_tx, init_rx) = mpsc::channel::<Result<()>>();

        let worker = {
            let stop = Arc::clone(&stop);
            let state = Arc::clone(&state);
            thread::spawn(move || {
                let source = match open(&config) {
                    Ok(source) => {
                        state.store(State::Running as u8, Ordering::SeqCst);
                        let _ = init_tx.send(Ok(()));
                        source
                    }
                    Err(e) => {
                        let _ = init_tx.send(Err(e));
                        return Ok(());
                    }
                };
                let result = run_loop(source, &config, &filter, &demod, sink, &stop, &tx);
                state.store(State::Idle as u8, Ordering::SeqCst);
                result
            })
        };

        let stopper = Stopper { stop, state };
        match init_rx.recv() {
            Ok(Ok(())) => Ok((
                Self {
                    stopper,
                    worker: Some(worker),
                },
                rx,
            )),
            Ok(Err(e)) => {
                let _ = worker.join();
                Err(e)
            }
            Err(_) => {
                let _ = worker.join();
                Err(Error::device("acquisition worker died during startup"))
            }
        }
    }

    /// A cloneable stop handle for this session.
    pub fn stopper(&self) -> Stopper {
        self.stopper.clone()
    }

    /// Current state of the loop.
    pub fn state(&self) -> State {
        self.stopper.state()
    }

    /// Stop the session and wait for the worker to finish.
    ///
    /// Returns the worker's verdict: `Ok(())` after a clean stop or end of
    /// stream, the [`Error::Device`] that ended the session otherwise.
    pub fn shutdown(mut self) -> Result<()> {
        self.stopper.stop();
        match self.worker.take() {
            Some(worker) => match worker.join() {
                Ok(result) => result,
                Err(_) => Err(Error::device("acquisition worker panicked")),
            },
            None => Ok(()),
        }
    }
}

impl Drop for Acquisition {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.take() {
            self.stopper.stop();
            let _ = worker.join();
        }
    }
}

/// The Running phase. Owns the source; dropping it on return closes the
/// device exactly once, on every exit path.
fn run_loop<S: SampleSource>(
    mut source: S,
    config: &AcquisitionConfig,
    filter: &LowPassIir,
    demod: &Demodulator,
    mut sink: Option<Box<dyn RecordSink>>,
    stop: &AtomicBool,
    tx: &Sender<DemodulatedBlock>,
) -> Result<()> {
    while !stop.load(Ordering::SeqCst) {
        let block = match source.read_block(config.block_size) {
            Ok(Some(block)) => block,
            Ok(None) => {
                debug!("sample source reached end of stream");
                break;
            }
            Err(e) => {
                return Err(Error::device(format!("sample source read failed: {}", e)));
            }
        };

        let filtered = filter.process(&block);
        let demodulated = demod.process(&filtered);

        if !demodulated.iter().all(|v| v.is_finite()) {
            warn!("dropping block with non-finite demodulated values");
            continue;
        }

        if let Some(sink) = sink.as_mut() {
            if let Err(e) = sink.append(&block, &demodulated) {
                warn!("record sink append failed: {}", e);
            }
        }

        if tx.send(demodulated).is_err() {
            debug!("consumer disconnected, stopping acquisition");
            break;
        }
    }
    Ok(())
}
