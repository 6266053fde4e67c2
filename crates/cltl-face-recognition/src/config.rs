//! `[cltl.face_recognition]` configuration.

use shared_config::{ConfigError, ConfigKey, ConfigurationSource};
use shared_types::Topic;

const SECTION: &str = "cltl.face_recognition";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaceRecognitionConfig {
    /// Base URL of the face detector server.
    pub url: String,
    pub image_topic: Topic,
    pub face_topic: Topic,
    pub face_recognition_topic: Topic,
}

impl FaceRecognitionConfig {
    pub const REQUIRED_KEYS: &'static [ConfigKey] = &[
        ConfigKey::new(SECTION, "url"),
        ConfigKey::new(SECTION, "image_topic"),
        ConfigKey::new(SECTION, "face_topic"),
        ConfigKey::new(SECTION, "face_recognition_topic"),
    ];

    pub fn from_config(config: &ConfigurationSource) -> Result<Self, ConfigError> {
        let section = config.get_config(SECTION)?;
        Ok(Self {
            url: section.get_str("url")?.trim_end_matches('/').to_string(),
            image_topic: section.get_enum("image_topic")?,
            face_topic: section.get_enum("face_topic")?,
            face_recognition_topic: section.get_enum("face_recognition_topic")?,
        })
    }
}
