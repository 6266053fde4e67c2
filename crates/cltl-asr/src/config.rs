//! `[cltl.asr]` configuration.

use shared_config::{ConfigError, ConfigKey, ConfigurationSource};
use shared_types::Topic;

const SECTION: &str = "cltl.asr";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsrConfig {
    /// Base URL of the model server.
    pub url: String,
    pub model: String,
    /// Rate the model expects; segments are resampled to it.
    pub sampling_rate: u32,
    pub vad_topic: Topic,
    pub asr_topic: Topic,
}

impl AsrConfig {
    pub const REQUIRED_KEYS: &'static [ConfigKey] = &[
        ConfigKey::new(SECTION, "url"),
        ConfigKey::new(SECTION, "model"),
        ConfigKey::new(SECTION, "sampling_rate"),
        ConfigKey::new(SECTION, "vad_topic"),
        ConfigKey::new(SECTION, "asr_topic"),
    ];

    pub fn from_config(config: &ConfigurationSource) -> Result<Self, ConfigError> {
        let section = config.get_config(SECTION)?;
        Ok(Self {
            url: section.get_str("url")?.trim_end_matches('/').to_string(),
            model: section.get_str("model")?.to_string(),
            sampling_rate: section.get_uint("sampling_rate")?,
            vad_topic: section.get_enum("vad_topic")?,
            asr_topic: section.get_enum("asr_topic")?,
        })
    }
}
