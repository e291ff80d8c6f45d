#[cfg(feature = "audio-io")]
pub mod output;

#[cfg(feature = "audio-io")]
pub use output::AudioOutput;
