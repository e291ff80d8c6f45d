//! Real-time frame assembly
//!
//! The frame feeder runs inside the audio callback: every invocation must
//! fill the output slice completely, in bounded time, without blocking or
//! allocating. Fragment boundaries rarely line up with device frame sizes,
//! so the unplayed tail of an oversized fragment is carried between
//! invocations as a leftover.

use crate::playback::fragment::AudioFragment;
use crate::playback::queue::FragmentQueue;
use std::sync::Arc;

/// Unconsumed tail of a partially-played fragment
struct Leftover {
    fragment: AudioFragment,
    pos: usize,
    generation: u64,
}

impl Leftover {
    fn remaining(&self) -> &[f32] {
        &self.fragment.samples()[self.pos..]
    }
}

/// Single consumer that assembles fixed-size frames from queued fragments
///
/// Exactly one feeder exists per engine; it owns the leftover state and is
/// moved into the audio output callback.
pub struct FrameFeeder {
    queue: Arc<FragmentQueue>,
    leftover: Option<Leftover>,
}

impl FrameFeeder {
    pub(crate) fn new(queue: Arc<FragmentQueue>) -> Self {
        Self {
            queue,
            leftover: None,
        }
    }

    /// Fill `out` completely with the next samples of the stream
    ///
    /// Consumes leftover first, then whole fragments from the queue,
    /// zero-padding the tail when the queue runs dry. Underrun is a
    /// legitimate state, not a fault. Returns the number of real (non-pad)
    /// samples written.
    pub fn fill(&mut self, out: &mut [f32]) -> usize {
        // A clear() since the leftover was stashed invalidates it; this is
        // what makes stop atomic from the callback's point of view.
        let generation = self.queue.generation();
        if matches!(&self.leftover, Some(l) if l.generation != generation) {
            self.leftover = None;
        }

        let mut assembled = 0;

        if let Some(leftover) = &mut self.leftover {
            let remaining = leftover.remaining();
            let take = remaining.len().min(out.len());
            out[..take].copy_from_slice(&remaining[..take]);
            assembled = take;
            leftover.pos += take;
        }
        if matches!(&self.leftover, Some(l) if l.remaining().is_empty()) {
            self.leftover = None;
        }

        while assembled < out.len() {
            let Some(fragment) = self.queue.pop() else {
                // Underrun: pad with silence
                out[assembled..].fill(0.0);
                return assembled;
            };

            let need = out.len() - assembled;
            if fragment.len() > need {
                out[assembled..].copy_from_slice(&fragment.samples()[..need]);
                assembled = out.len();
                debug_assert!(self.leftover.is_none());
                self.leftover = Some(Leftover {
                    fragment,
                    pos: need,
                    generation,
                });
            } else {
                // Exact fit consumes the fragment fully and leaves no leftover
                out[assembled..assembled + fragment.len()]
                    .copy_from_slice(fragment.samples());
                assembled += fragment.len();
            }
        }

        assembled
    }

    /// Check whether a partially-consumed fragment is pending
    pub fn has_leftover(&self) -> bool {
        self.leftover.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queue_with(fragments: &[Vec<f32>]) -> Arc<FragmentQueue> {
        let queue = Arc::new(FragmentQueue::new());
        let generation = queue.generation();
        for samples in fragments {
            queue.push(generation, AudioFragment::new(samples.clone()));
        }
        queue
    }

    fn ramp(start: usize, len: usize) -> Vec<f32> {
        (start..start + len).map(|i| i as f32).collect()
    }

    #[test]
    fn test_split_across_frames() {
        // Fragments [500, 300], frame size 400
        let queue = queue_with(&[ramp(0, 500), ramp(500, 300)]);
        let mut feeder = FrameFeeder::new(Arc::clone(&queue));

        let mut frame = vec![0.0; 400];

        assert_eq!(feeder.fill(&mut frame), 400);
        assert_eq!(frame, ramp(0, 400));
        assert!(feeder.has_leftover());

        assert_eq!(feeder.fill(&mut frame), 400);
        assert_eq!(frame, ramp(400, 400));
        assert!(!feeder.has_leftover());

        assert_eq!(feeder.fill(&mut frame), 0);
        assert!(frame.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_exact_fit_leaves_no_leftover() {
        let queue = queue_with(&[ramp(0, 400)]);
        let mut feeder = FrameFeeder::new(queue);

        let mut frame = vec![0.0; 400];
        assert_eq!(feeder.fill(&mut frame), 400);
        assert_eq!(frame, ramp(0, 400));
        assert!(!feeder.has_leftover());
    }

    #[test]
    fn test_zero_length_fragment() {
        let queue = queue_with(&[ramp(0, 100), Vec::new(), ramp(100, 100)]);
        let mut feeder = FrameFeeder::new(queue);

        let mut frame = vec![0.0; 200];
        assert_eq!(feeder.fill(&mut frame), 200);
        assert_eq!(frame, ramp(0, 200));
    }

    #[test]
    fn test_underrun_pads_silence() {
        let queue = queue_with(&[ramp(0, 100)]);
        let mut feeder = FrameFeeder::new(queue);

        let mut frame = vec![1.0; 400];
        assert_eq!(feeder.fill(&mut frame), 100);
        assert_eq!(&frame[..100], &ramp(0, 100)[..]);
        assert!(frame[100..].iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_concatenation_preserved_across_frame_sizes() {
        let fragments = [ramp(0, 7), ramp(7, 13), ramp(20, 1), ramp(21, 29)];
        let queue = queue_with(&fragments);
        let mut feeder = FrameFeeder::new(queue);

        let expected: Vec<f32> = fragments.iter().flatten().copied().collect();
        let mut played = Vec::new();
        for size in [5, 3, 11, 2, 17, 12] {
            let mut frame = vec![0.0; size];
            feeder.fill(&mut frame);
            played.extend(frame);
        }

        assert_eq!(&played[..expected.len()], &expected[..]);
        assert!(played[expected.len()..].iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_clear_discards_leftover() {
        let queue = queue_with(&[ramp(0, 500)]);
        let mut feeder = FrameFeeder::new(Arc::clone(&queue));

        let mut frame = vec![0.0; 400];
        feeder.fill(&mut frame);
        assert!(feeder.has_leftover());

        queue.clear();

        assert_eq!(feeder.fill(&mut frame), 0);
        assert!(frame.iter().all(|&s| s == 0.0));
        assert!(!feeder.has_leftover());
    }

    #[test]
    fn test_multiple_fragments_single_frame() {
        let queue = queue_with(&[ramp(0, 50), ramp(50, 50), ramp(100, 50)]);
        let mut feeder = FrameFeeder::new(queue);

        let mut frame = vec![0.0; 150];
        assert_eq!(feeder.fill(&mut frame), 150);
        assert_eq!(frame, ramp(0, 150));
    }
}
