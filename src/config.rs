//! Engine configuration
//!
//! Centralized settings for the playback engine and its demo sources.

/// Configuration for the playback engine
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Sample rate the engine (and every synthesis source) runs at
    pub sample_rate: u32,

    /// Depth of the producer command channel (pending submissions)
    pub command_queue_size: usize,

    /// Fragment size, in samples, used by sources that chunk long audio
    pub fragment_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 22050,
            command_queue_size: 100,
            fragment_size: 4096,
        }
    }
}

impl EngineConfig {
    /// Create a configuration with the given sample rate
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            ..Default::default()
        }
    }

    /// Set the producer command channel depth
    pub fn with_command_queue_size(mut self, size: usize) -> Self {
        self.command_queue_size = size;
        self
    }

    /// Set the fragment size used by chunking sources
    pub fn with_fragment_size(mut self, size: usize) -> Self {
        self.fragment_size = size;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> crate::Result<()> {
        if self.sample_rate == 0 {
            return Err(crate::VoxplayError::ConfigError(
                "Sample rate must be non-zero".into(),
            ));
        }
        if self.command_queue_size == 0 {
            return Err(crate::VoxplayError::ConfigError(
                "Command queue size must be non-zero".into(),
            ));
        }
        if self.fragment_size == 0 {
            return Err(crate::VoxplayError::ConfigError(
                "Fragment size must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.sample_rate, 22050);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = EngineConfig::new(48000)
            .with_command_queue_size(10)
            .with_fragment_size(1024);

        assert_eq!(config.sample_rate, 48000);
        assert_eq!(config.command_queue_size, 10);
        assert_eq!(config.fragment_size, 1024);
    }

    #[test]
    fn test_invalid_config() {
        let config = EngineConfig::new(0);
        assert!(config.validate().is_err());
    }
}
