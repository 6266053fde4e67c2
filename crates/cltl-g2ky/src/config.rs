//! `[cltl.g2ky]` configuration.

use shared_config::{ConfigError, ConfigKey, ConfigurationSource};
use shared_types::Topic;

const SECTION: &str = "cltl.g2ky";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct G2kyConfig {
    pub face_id_topic: Topic,
    pub utterance_topic: Topic,
    pub response_topic: Topic,
}

impl G2kyConfig {
    pub const REQUIRED_KEYS: &'static [ConfigKey] = &[
        ConfigKey::new(SECTION, "face_id_topic"),
        ConfigKey::new(SECTION, "utterance_topic"),
        ConfigKey::new(SECTION, "response_topic"),
    ];

    pub fn from_config(config: &ConfigurationSource) -> Result<Self, ConfigError> {
        let section = config.get_config(SECTION)?;
        Ok(Self {
            face_id_topic: section.get_enum("face_id_topic")?,
            utterance_topic: section.get_enum("utterance_topic")?,
            response_topic: section.get_enum("response_topic")?,
        })
    }
}
