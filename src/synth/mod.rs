//! Synthesis source abstraction
//!
//! A synthesis source turns text into an ordered, finite sequence of audio
//! fragments at a fixed sample rate. Sources push fragments into a sink as
//! they are produced so playback can begin before synthesis completes.

pub mod tone;
pub mod wav;

pub use tone::ToneSource;
pub use wav::WavClipSource;

use crate::playback::fragment::AudioFragment;
use crate::Result;

/// Sink receiving fragments in production order
///
/// Returns false when the engine no longer wants fragments for the current
/// submission; the source must stop promptly.
pub type FragmentSink<'a> = &'a mut dyn FnMut(AudioFragment) -> bool;

/// A speech synthesizer usable by the playback engine
///
/// Implementations run on the producer thread and may block (model
/// inference, file I/O). Fragment boundaries are an implementation detail
/// of the synthesizer; no alignment to words or sentences is guaranteed.
pub trait SynthesisSource: Send {
    /// The fixed sample rate of all produced fragments
    fn sample_rate(&self) -> u32;

    /// Synthesize `text`, pushing each fragment to `sink` in order
    ///
    /// A false return from `sink` cancels the remaining fragments of this
    /// submission; that is not an error. Errors abort only this submission.
    fn synthesize(&mut self, text: &str, sink: FragmentSink<'_>) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CountingSource {
        fragments: usize,
    }

    impl SynthesisSource for CountingSource {
        fn sample_rate(&self) -> u32 {
            22050
        }

        fn synthesize(&mut self, _text: &str, sink: FragmentSink<'_>) -> Result<()> {
            for i in 0..self.fragments {
                if !sink(AudioFragment::new(vec![i as f32; 10])) {
                    break;
                }
            }
            Ok(())
        }
    }

    #[test]
    fn test_sink_receives_in_order() {
        let mut source = CountingSource { fragments: 3 };
        let mut seen = Vec::new();
        source
            .synthesize("hello", &mut |fragment| {
                seen.push(fragment.samples()[0]);
                true
            })
            .unwrap();
        assert_eq!(seen, vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_sink_cancellation_stops_source() {
        let mut source = CountingSource { fragments: 100 };
        let mut seen = 0;
        source
            .synthesize("hello", &mut |_| {
                seen += 1;
                seen < 2
            })
            .unwrap();
        assert_eq!(seen, 2);
    }
}
