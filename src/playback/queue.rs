//! Generation-tagged fragment queue
//!
//! Single-producer/single-consumer buffer between the synthesis worker and
//! the audio callback. Clearing bumps a generation counter so a producer
//! that is mid-submission cannot repopulate a queue the user just flushed.

use crate::playback::fragment::AudioFragment;
use parking_lot::Mutex;
use std::collections::VecDeque;

struct Inner {
    fragments: VecDeque<AudioFragment>,
    generation: u64,
}

/// Thread-safe FIFO of audio fragments awaiting playback
pub struct FragmentQueue {
    inner: Mutex<Inner>,
}

impl FragmentQueue {
    /// Create an empty queue at generation zero
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                fragments: VecDeque::new(),
                generation: 0,
            }),
        }
    }

    /// Get the current generation
    ///
    /// The generation changes only on [`clear`](Self::clear).
    pub fn generation(&self) -> u64 {
        self.inner.lock().generation
    }

    /// Append a fragment at the tail if `generation` is still current
    ///
    /// Returns false (dropping the fragment) when the queue has been
    /// cleared since the caller observed `generation`; the producer must
    /// abort its feed loop for the current submission.
    pub fn push(&self, generation: u64, fragment: AudioFragment) -> bool {
        let mut inner = self.inner.lock();
        if inner.generation != generation {
            return false;
        }
        inner.fragments.push_back(fragment);
        true
    }

    /// Remove and return the head fragment, if any
    pub fn pop(&self) -> Option<AudioFragment> {
        self.inner.lock().fragments.pop_front()
    }

    /// Empty the queue and bump the generation in one critical section
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.fragments.clear();
        inner.generation += 1;
    }

    /// Get the number of queued fragments
    pub fn len(&self) -> usize {
        self.inner.lock().fragments.len()
    }

    /// Check if the queue is empty
    pub fn is_empty(&self) -> bool {
        self.inner.lock().fragments.is_empty()
    }

    /// Get total queued duration in seconds at the given rate
    pub fn queued_secs(&self, sample_rate: u32) -> f32 {
        let inner = self.inner.lock();
        let samples: usize = inner.fragments.iter().map(|f| f.len()).sum();
        samples as f32 / sample_rate as f32
    }
}

impl Default for FragmentQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_pop_order() {
        let queue = FragmentQueue::new();
        let generation = queue.generation();

        queue.push(generation, AudioFragment::new(vec![1.0]));
        queue.push(generation, AudioFragment::new(vec![2.0]));
        queue.push(generation, AudioFragment::new(vec![3.0]));

        assert_eq!(queue.pop().unwrap().samples(), &[1.0]);
        assert_eq!(queue.pop().unwrap().samples(), &[2.0]);
        assert_eq!(queue.pop().unwrap().samples(), &[3.0]);
        assert!(queue.pop().is_none());
    }

    #[test]
    fn test_clear_bumps_generation() {
        let queue = FragmentQueue::new();
        let generation = queue.generation();

        assert!(queue.push(generation, AudioFragment::new(vec![1.0])));
        queue.clear();

        assert!(queue.is_empty());
        assert_ne!(queue.generation(), generation);
    }

    #[test]
    fn test_stale_push_rejected() {
        let queue = FragmentQueue::new();
        let stale = queue.generation();
        queue.clear();

        assert!(!queue.push(stale, AudioFragment::new(vec![1.0])));
        assert!(queue.is_empty());

        // A producer holding the fresh generation may keep feeding
        assert!(queue.push(queue.generation(), AudioFragment::new(vec![2.0])));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_queued_secs() {
        let queue = FragmentQueue::new();
        let generation = queue.generation();

        queue.push(generation, AudioFragment::new(vec![0.0; 11025]));
        queue.push(generation, AudioFragment::new(vec![0.0; 11025]));

        assert!((queue.queued_secs(22050) - 1.0).abs() < 1e-6);
    }
}
