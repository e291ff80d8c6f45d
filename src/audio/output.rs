//! Audio device binding
//!
//! Connects the engine's frame feeder to a cpal output stream. The stream
//! callback is the real-time path: it only locks the playback state, pulls
//! one frame from the feeder, and interleaves — no I/O, no synthesis.

use crate::playback::{PlaybackEngine, PlaybackEvent, PlaybackState};
use crate::{Result, VoxplayError};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Stream, StreamConfig};
use tracing::{error, info};

/// Scratch capacity preallocated for the callback's mono frame
const SCRATCH_FRAMES: usize = 8192;

pub struct AudioOutput {
    device: Device,
    config: StreamConfig,
    stream: Option<Stream>,
}

impl AudioOutput {
    /// Create an audio output on the default device at the engine's rate
    pub fn new(sample_rate: u32) -> Result<Self> {
        let host = cpal::default_host();

        let device = host
            .default_output_device()
            .ok_or_else(|| VoxplayError::AudioDeviceError("No output device available".into()))?;

        info!(
            "Using output device: {}",
            device.name().unwrap_or_else(|_| "Unknown".to_string())
        );

        let default_config: StreamConfig = device
            .default_output_config()
            .map_err(|e| {
                VoxplayError::AudioDeviceError(format!("Failed to get output config: {}", e))
            })?
            .into();

        // The engine declares a fixed rate; keep the device's channel count
        // and replicate the mono signal across channels.
        let config = StreamConfig {
            channels: default_config.channels,
            sample_rate: cpal::SampleRate(sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        Ok(Self {
            device,
            config,
            stream: None,
        })
    }

    /// Get the sample rate the stream runs at
    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate.0
    }

    /// Get the device channel count
    pub fn channels(&self) -> u16 {
        self.config.channels
    }

    /// Bind the engine's feeder to the device and start the stream
    ///
    /// Takes the engine's single frame feeder; a second bind fails. While
    /// the engine is not Streaming the callback outputs silence without
    /// pulling from the feeder.
    pub fn bind(&mut self, engine: &mut PlaybackEngine) -> Result<()> {
        if self.stream.is_some() {
            return Err(VoxplayError::AudioDeviceError(
                "Output stream already bound".into(),
            ));
        }

        let mut feeder = engine.take_feeder().ok_or_else(|| {
            VoxplayError::AudioDeviceError("Engine feeder already taken".into())
        })?;

        let state = engine.shared_state();
        let err_state = engine.shared_state();
        let event_tx = engine.event_sender();
        let channels = self.config.channels as usize;
        let mut mono = vec![0.0f32; SCRATCH_FRAMES];

        let err_fn = move |err: cpal::StreamError| {
            error!("Audio output stream error: {}", err);
            // Device failure is fatal to the current stream
            *err_state.lock() = PlaybackState::Idle;
            let _ = event_tx.send(PlaybackEvent::DeviceError(err.to_string()));
        };

        let stream = self
            .device
            .build_output_stream(
                &self.config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    let frames = data.len() / channels;

                    let pulling = *state.lock() == PlaybackState::Streaming;
                    if !pulling {
                        data.fill(0.0);
                        return;
                    }

                    if mono.len() < frames {
                        mono.resize(frames, 0.0);
                    }
                    feeder.fill(&mut mono[..frames]);

                    for i in 0..frames {
                        for c in 0..channels {
                            data[i * channels + c] = mono[i];
                        }
                    }
                },
                err_fn,
                None,
            )
            .map_err(|e| {
                VoxplayError::AudioDeviceError(format!("Failed to build output stream: {}", e))
            })?;

        stream.play().map_err(|e| {
            VoxplayError::AudioDeviceError(format!("Failed to start output stream: {}", e))
        })?;

        self.stream = Some(stream);
        info!("Audio output bound at {} Hz", self.config.sample_rate.0);
        Ok(())
    }

    /// Stop and release the stream
    pub fn close(&mut self) {
        if let Some(stream) = self.stream.take() {
            drop(stream);
            info!("Audio output closed");
        }
    }

    /// Check whether a stream is currently bound
    pub fn is_bound(&self) -> bool {
        self.stream.is_some()
    }
}

impl Drop for AudioOutput {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;

    #[test]
    fn test_audio_output_creation() {
        // This test might fail in CI environments without audio devices
        if let Ok(output) = AudioOutput::new(22050) {
            assert_eq!(output.sample_rate(), 22050);
            assert!(output.channels() > 0);
            assert!(!output.is_bound());
        }
    }

    #[test]
    fn test_bind_consumes_feeder() {
        if let Ok(mut output) = AudioOutput::new(22050) {
            let mut engine = PlaybackEngine::new(EngineConfig::default()).unwrap();
            if output.bind(&mut engine).is_ok() {
                assert!(output.is_bound());
                assert!(engine.take_feeder().is_none());
                output.close();
                assert!(!output.is_bound());
            }
        }
    }
}
