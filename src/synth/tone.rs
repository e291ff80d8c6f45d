//! Deterministic tone synthesis
//!
//! Stands in for a neural TTS model in demos and tests: each word becomes a
//! short sine burst followed by a gap, so the full streaming path can run
//! without any model files.

use crate::playback::fragment::AudioFragment;
use crate::synth::{FragmentSink, SynthesisSource};
use crate::{Result, VoxplayError};
use tracing::debug;

/// Beep-per-word synthesis source
pub struct ToneSource {
    sample_rate: u32,
    /// Burst length in milliseconds per character of the word
    ms_per_char: u32,
    /// Gap between words in milliseconds
    gap_ms: u32,
    amplitude: f32,
}

impl ToneSource {
    /// Create a tone source at the given sample rate
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            ms_per_char: 40,
            gap_ms: 60,
            amplitude: 0.5,
        }
    }

    /// Set the burst length per character
    pub fn with_ms_per_char(mut self, ms: u32) -> Self {
        self.ms_per_char = ms;
        self
    }

    /// Set the inter-word gap
    pub fn with_gap_ms(mut self, ms: u32) -> Self {
        self.gap_ms = ms;
        self
    }

    fn word_fragment(&self, word: &str) -> AudioFragment {
        // Pitch varies with the word so repeated text is audibly distinct
        let pitch_step = word.bytes().map(|b| b as u32).sum::<u32>() % 12;
        let freq = 220.0 * 2.0_f32.powf(pitch_step as f32 / 12.0);

        let burst_len =
            (self.sample_rate as u64 * (self.ms_per_char * word.len() as u32) as u64 / 1000) as usize;
        let gap_len = (self.sample_rate as u64 * self.gap_ms as u64 / 1000) as usize;

        let mut samples = Vec::with_capacity(burst_len + gap_len);
        for i in 0..burst_len {
            let t = i as f32 / self.sample_rate as f32;
            // Short linear fade at both ends to avoid clicks
            let fade = (i.min(burst_len - 1 - i) as f32 / 64.0).min(1.0);
            samples.push((t * freq * 2.0 * std::f32::consts::PI).sin() * self.amplitude * fade);
        }
        samples.resize(burst_len + gap_len, 0.0);

        AudioFragment::new(samples)
    }
}

impl SynthesisSource for ToneSource {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn synthesize(&mut self, text: &str, sink: FragmentSink<'_>) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(VoxplayError::SynthesisError("Invalid sample rate".into()));
        }

        let mut words = 0;
        for word in text.split_whitespace() {
            if !sink(self.word_fragment(word)) {
                debug!("Tone synthesis cancelled after {} words", words);
                return Ok(());
            }
            words += 1;
        }

        debug!("Synthesized {} words as tones", words);
        Ok(())
    }
}
