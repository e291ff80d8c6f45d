//! Playback controller
//!
//! Owns the state machine and the producer worker that pulls fragments out
//! of the synthesis source into the fragment queue. The audio callback
//! never touches the source; the two timing domains meet only at the queue.

use crate::config::EngineConfig;
use crate::playback::feeder::FrameFeeder;
use crate::playback::fragment::AudioFragment;
use crate::playback::queue::FragmentQueue;
use crate::synth::SynthesisSource;
use crate::{Result, VoxplayError};
use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, info, warn};

/// Playback state of the engine
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackState {
    /// No stream active; the device outputs silence
    Idle,

    /// The device is pulling frames from the feeder
    Streaming,

    /// Device pulls suspended; queued audio is retained
    Paused,
}

/// Asynchronous failure reports from producer and device
///
/// The real-time path never raises errors; everything surfaces here.
#[derive(Clone, Debug)]
pub enum PlaybackEvent {
    /// Synthesis failed for one submission; others are unaffected
    SynthesisFailed {
        /// The submitted text that could not be synthesized
        text: String,
        /// Error message from the source
        error: String,
    },

    /// The output device rejected the stream; the engine went Idle
    DeviceError(String),
}

enum ProducerCommand {
    Speak { text: String, generation: u64 },
    Shutdown,
}

struct ProducerHandle {
    command_tx: Sender<ProducerCommand>,
    worker: Option<JoinHandle<()>>,
}

/// The incremental speech-playback engine
///
/// Text goes in through [`submit_text`](Self::submit_text); fixed-size
/// sample frames come out through the [`FrameFeeder`], which the audio
/// output binding drives at device cadence. Further submissions while
/// streaming append to the queue, so conversational speech plays as one
/// continuous stream.
pub struct PlaybackEngine {
    config: EngineConfig,
    queue: Arc<FragmentQueue>,
    state: Arc<Mutex<PlaybackState>>,
    feeder: Option<FrameFeeder>,
    producer: Option<ProducerHandle>,
    event_tx: Sender<PlaybackEvent>,
    event_rx: Receiver<PlaybackEvent>,
}

impl PlaybackEngine {
    /// Create an engine with the given configuration
    ///
    /// The engine starts Idle with no synthesis source; attach one with
    /// [`set_source`](Self::set_source) before submitting text.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;

        let (event_tx, event_rx) = unbounded();
        let queue = Arc::new(FragmentQueue::new());
        let feeder = FrameFeeder::new(Arc::clone(&queue));

        Ok(Self {
            config,
            queue,
            state: Arc::new(Mutex::new(PlaybackState::Idle)),
            feeder: Some(feeder),
            producer: None,
            event_tx,
            event_rx,
        })
    }

    /// Get the engine's fixed sample rate
    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate
    }

    /// Get the channel count (the engine is mono)
    pub fn channels(&self) -> u16 {
        1
    }

    /// Get the current playback state
    pub fn state(&self) -> PlaybackState {
        *self.state.lock()
    }

    /// Get a receiver for asynchronous failure events
    pub fn events(&self) -> Receiver<PlaybackEvent> {
        self.event_rx.clone()
    }

    /// Number of fragments queued for playback
    pub fn queued_fragments(&self) -> usize {
        self.queue.len()
    }

    /// Seconds of audio queued for playback
    pub fn queued_secs(&self) -> f32 {
        self.queue.queued_secs(self.config.sample_rate)
    }

    /// Attach the synthesis source and start the producer worker
    ///
    /// Replaces any previously attached source; its worker is shut down
    /// first. The source must run at the engine's sample rate.
    pub fn set_source(&mut self, source: Box<dyn SynthesisSource>) -> Result<()> {
        if source.sample_rate() != self.config.sample_rate {
            return Err(VoxplayError::ConfigError(format!(
                "Source sample rate {} does not match engine rate {}",
                source.sample_rate(),
                self.config.sample_rate
            )));
        }

        self.shutdown_producer();

        let (command_tx, command_rx) = bounded(self.config.command_queue_size);
        let queue = Arc::clone(&self.queue);
        let event_tx = self.event_tx.clone();

        let worker = thread::spawn(move || {
            producer_loop(source, command_rx, queue, event_tx);
        });

        self.producer = Some(ProducerHandle {
            command_tx,
            worker: Some(worker),
        });

        info!("Synthesis source attached at {} Hz", self.config.sample_rate);
        Ok(())
    }

    /// Enqueue text for synthesis and playback
    ///
    /// Transitions Idle to Streaming; while already Streaming or Paused the
    /// new audio is appended after everything queued so far.
    pub fn submit_text(&self, text: impl Into<String>) -> Result<()> {
        let producer = self.producer.as_ref().ok_or(VoxplayError::SourceNotReady)?;

        let text = text.into();
        let generation = self.queue.generation();

        {
            let mut state = self.state.lock();
            if *state == PlaybackState::Idle {
                *state = PlaybackState::Streaming;
            }
        }

        debug!("Submitting text for synthesis: {}", text);
        producer
            .command_tx
            .send(ProducerCommand::Speak { text, generation })
            .map_err(|e| VoxplayError::ChannelError(format!("Producer unavailable: {}", e)))
    }

    /// Suspend device pulls without discarding queued audio; idempotent
    pub fn pause(&self) {
        let mut state = self.state.lock();
        if *state == PlaybackState::Streaming {
            *state = PlaybackState::Paused;
            info!("Playback paused");
        }
    }

    /// Resume device pulls after a pause; idempotent
    pub fn resume(&self) {
        let mut state = self.state.lock();
        if *state == PlaybackState::Paused {
            *state = PlaybackState::Streaming;
            info!("Playback resumed");
        }
    }

    /// Flush all queued and in-flight audio and return to Idle; idempotent
    ///
    /// Bumps the queue generation, so a producer mid-submission aborts its
    /// feed loop instead of repopulating the queue, and the feeder discards
    /// its leftover on the next callback.
    pub fn stop(&self) {
        self.queue.clear();
        let mut state = self.state.lock();
        if *state != PlaybackState::Idle {
            *state = PlaybackState::Idle;
            info!("Playback stopped, queue flushed");
        }
    }

    /// Take the engine's single frame feeder
    ///
    /// Returns None after the first call; exactly one consumer may exist.
    pub fn take_feeder(&mut self) -> Option<FrameFeeder> {
        self.feeder.take()
    }

    pub(crate) fn shared_state(&self) -> Arc<Mutex<PlaybackState>> {
        Arc::clone(&self.state)
    }

    pub(crate) fn event_sender(&self) -> Sender<PlaybackEvent> {
        self.event_tx.clone()
    }

    fn shutdown_producer(&mut self) {
        if let Some(mut producer) = self.producer.take() {
            let _ = producer.command_tx.send(ProducerCommand::Shutdown);
            if let Some(worker) = producer.worker.take() {
                let _ = worker.join();
            }
        }
    }
}

impl Drop for PlaybackEngine {
    fn drop(&mut self) {
        self.shutdown_producer();
    }
}

fn producer_loop(
    mut source: Box<dyn SynthesisSource>,
    command_rx: Receiver<ProducerCommand>,
    queue: Arc<FragmentQueue>,
    event_tx: Sender<PlaybackEvent>,
) {
    info!("Synthesis producer started");

    loop {
        match command_rx.recv() {
            Ok(ProducerCommand::Speak { text, generation }) => {
                // Submissions queued before a stop are already stale
                if queue.generation() != generation {
                    debug!("Dropping stale submission: {}", text);
                    continue;
                }

                let mut cancelled = false;
                let result = {
                    let mut sink = |fragment: AudioFragment| {
                        let accepted = queue.push(generation, fragment);
                        if !accepted {
                            cancelled = true;
                        }
                        accepted
                    };
                    source.synthesize(&text, &mut sink)
                };

                if cancelled {
                    debug!("Submission cancelled mid-synthesis: {}", text);
                    continue;
                }

                if let Err(e) = result {
                    warn!("Synthesis failed for submission: {}", e);
                    let _ = event_tx.send(PlaybackEvent::SynthesisFailed {
                        text,
                        error: e.to_string(),
                    });
                }
            }

            Ok(ProducerCommand::Shutdown) => {
                debug!("Producer shutdown requested");
                break;
            }

            Err(_) => break,
        }
    }

    info!("Synthesis producer stopped");
}
