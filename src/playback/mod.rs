pub mod engine;
pub mod feeder;
pub mod fragment;
pub mod queue;

pub use engine::{PlaybackEngine, PlaybackEvent, PlaybackState};
pub use feeder::FrameFeeder;
pub use fragment::AudioFragment;
pub use queue::FragmentQueue;
