/// A batch of mono audio samples produced by speech synthesis
///
/// Fragments are immutable once created and move through the playback
/// pipeline as whole units. Their boundaries are artifacts of the
/// synthesizer and carry no semantic meaning.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioFragment {
    samples: Vec<f32>,
}

impl AudioFragment {
    /// Create a fragment from normalized f32 samples
    pub fn new(samples: Vec<f32>) -> Self {
        Self { samples }
    }

    /// Create a fragment from 16-bit signed PCM samples
    pub fn from_pcm_i16(pcm: &[i16]) -> Self {
        let samples = pcm.iter().map(|&s| s as f32 / 32768.0).collect();
        Self { samples }
    }

    /// Get the samples in this fragment
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Get the number of samples in this fragment
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if the fragment contains no samples
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Get the duration of this fragment in seconds at the given rate
    pub fn duration_secs(&self, sample_rate: u32) -> f32 {
        self.samples.len() as f32 / sample_rate as f32
    }
}

impl From<Vec<f32>> for AudioFragment {
    fn from(samples: Vec<f32>) -> Self {
        Self::new(samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_pcm_i16() {
        let fragment = AudioFragment::from_pcm_i16(&[0, 16384, -16384, 32767, -32768]);
        assert_eq!(fragment.len(), 5);
        assert_eq!(fragment.samples()[0], 0.0);
        assert!((fragment.samples()[1] - 0.5).abs() < 1e-6);
        assert!((fragment.samples()[2] + 0.5).abs() < 1e-6);
        assert_eq!(fragment.samples()[4], -1.0);
    }

    #[test]
    fn test_empty_fragment() {
        let fragment = AudioFragment::new(Vec::new());
        assert!(fragment.is_empty());
        assert_eq!(fragment.len(), 0);
    }

    #[test]
    fn test_duration() {
        let fragment = AudioFragment::new(vec![0.0; 22050]);
        assert!((fragment.duration_secs(22050) - 1.0).abs() < 1e-6);
    }
}
