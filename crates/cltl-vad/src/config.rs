//! `[cltl.vad]` configuration.

use shared_config::{ConfigError, ConfigKey, ConfigurationSource};
use shared_types::Topic;

const SECTION: &str = "cltl.vad";

/// Configuration of the VAD service.
#[derive(Debug, Clone, PartialEq)]
pub struct VadConfig {
    pub mic_topic: Topic,
    pub vad_topic: Topic,
    /// RMS level (0.0 - 1.0 of full scale) above which a frame is speech.
    pub threshold: f64,
    /// Silent frames tolerated inside a segment before it is closed.
    pub padding: usize,
    /// Segments shorter than this (ms) are discarded.
    pub min_duration: u64,
}

impl VadConfig {
    pub const REQUIRED_KEYS: &'static [ConfigKey] = &[
        ConfigKey::new(SECTION, "mic_topic"),
        ConfigKey::new(SECTION, "vad_topic"),
        ConfigKey::new(SECTION, "threshold"),
        ConfigKey::new(SECTION, "padding"),
        ConfigKey::new(SECTION, "min_duration"),
    ];

    pub fn from_config(config: &ConfigurationSource) -> Result<Self, ConfigError> {
        let section = config.get_config(SECTION)?;
        Ok(Self {
            mic_topic: section.get_enum("mic_topic")?,
            vad_topic: section.get_enum("vad_topic")?,
            threshold: section.get_float("threshold")?,
            padding: section.get_uint("padding")?,
            min_duration: section.get_uint("min_duration")?,
        })
    }
}
