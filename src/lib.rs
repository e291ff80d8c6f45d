pub mod audio;
pub mod config;
pub mod playback;
pub mod synth;

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum VoxplayError {
    #[error("Audio device error: {0}")]
    AudioDeviceError(String),

    #[error("Synthesis error: {0}")]
    SynthesisError(String),

    #[error("Synthesis source not ready")]
    SourceNotReady,

    #[error("Channel error: {0}")]
    ChannelError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IOError(String),
}

impl From<std::io::Error> for VoxplayError {
    fn from(e: std::io::Error) -> Self {
        VoxplayError::IOError(e.to_string())
    }
}

impl VoxplayError {
    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            // Hardware/device errors may require user intervention
            VoxplayError::AudioDeviceError(_) => false,
            // A failed synthesis drops one submission; the stream keeps going
            VoxplayError::SynthesisError(_) => true,
            VoxplayError::SourceNotReady => true,
            VoxplayError::ChannelError(_) => false,
            VoxplayError::ConfigError(_) => false,
            VoxplayError::IOError(_) => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, VoxplayError>;
