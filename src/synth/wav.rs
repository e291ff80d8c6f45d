//! WAV-clip synthesis source
//!
//! Plays pre-rendered speech clips looked up by phrase. Useful for canned
//! responses and for exercising the full playback path with real recorded
//! audio instead of a synthesis model.

use crate::playback::fragment::AudioFragment;
use crate::synth::{FragmentSink, SynthesisSource};
use crate::{Result, VoxplayError};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Synthesis source backed by a directory of WAV clips
///
/// A submission "hello there" resolves to `<dir>/hello_there.wav`. Clips
/// must match the engine sample rate; multi-channel clips are downmixed to
/// mono. Long clips are emitted lazily as fixed-size fragments so playback
/// starts before the file is fully decoded.
pub struct WavClipSource {
    dir: PathBuf,
    sample_rate: u32,
    fragment_size: usize,
}

impl WavClipSource {
    /// Create a source reading clips from `dir` at the given rate
    pub fn new(dir: impl Into<PathBuf>, sample_rate: u32, fragment_size: usize) -> Self {
        Self {
            dir: dir.into(),
            sample_rate,
            fragment_size: fragment_size.max(1),
        }
    }

    /// Map a phrase to its clip path
    pub fn clip_path(&self, text: &str) -> PathBuf {
        let slug: String = text
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.wav", slug))
    }

    fn read_clip(&self, path: &Path, sink: FragmentSink<'_>) -> Result<()> {
        let mut reader = hound::WavReader::open(path).map_err(|e| {
            VoxplayError::SynthesisError(format!("Cannot open clip {}: {}", path.display(), e))
        })?;

        let spec = reader.spec();
        if spec.sample_rate != self.sample_rate {
            return Err(VoxplayError::SynthesisError(format!(
                "Clip {} is {} Hz, engine runs at {} Hz",
                path.display(),
                spec.sample_rate,
                self.sample_rate
            )));
        }

        let channels = spec.channels as usize;
        let mut frame = Vec::with_capacity(channels);
        let mut chunk = Vec::with_capacity(self.fragment_size);
        let mut emitted = 0usize;

        let mut push_sample = |sample: f32, chunk: &mut Vec<f32>, frame: &mut Vec<f32>| {
            frame.push(sample);
            if frame.len() == channels {
                let mono = frame.iter().sum::<f32>() / channels as f32;
                frame.clear();
                chunk.push(mono);
            }
        };

        macro_rules! drain_chunk {
            () => {
                if chunk.len() >= self.fragment_size {
                    emitted += 1;
                    if !sink(AudioFragment::new(std::mem::take(&mut chunk))) {
                        debug!("Clip playback cancelled after {} fragments", emitted);
                        return Ok(());
                    }
                    chunk.reserve(self.fragment_size);
                }
            };
        }

        match spec.sample_format {
            hound::SampleFormat::Float => {
                for sample in reader.samples::<f32>() {
                    let sample = sample.map_err(|e| {
                        VoxplayError::SynthesisError(format!("Corrupt clip: {}", e))
                    })?;
                    push_sample(sample, &mut chunk, &mut frame);
                    drain_chunk!();
                }
            }
            hound::SampleFormat::Int => {
                let scale = 1.0 / (1i64 << (spec.bits_per_sample - 1)) as f32;
                for sample in reader.samples::<i32>() {
                    let sample = sample.map_err(|e| {
                        VoxplayError::SynthesisError(format!("Corrupt clip: {}", e))
                    })?;
                    push_sample(sample as f32 * scale, &mut chunk, &mut frame);
                    drain_chunk!();
                }
            }
        }

        if !chunk.is_empty() {
            emitted += 1;
            sink(AudioFragment::new(chunk));
        }

        debug!("Emitted {} fragments from {}", emitted, path.display());
        Ok(())
    }
}

impl SynthesisSource for WavClipSource {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn synthesize(&mut self, text: &str, sink: FragmentSink<'_>) -> Result<()> {
        let path = self.clip_path(text);
        self.read_clip(&path, sink)
    }
}
