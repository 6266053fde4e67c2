//! `[cltl.vector_id]` and `[cltl.vector_id.agg]` configuration.

use shared_config::{ConfigError, ConfigKey, ConfigurationSource};
use shared_types::Topic;

const SECTION: &str = "cltl.vector_id";
const AGG_SECTION: &str = "cltl.vector_id.agg";

#[derive(Debug, Clone, PartialEq)]
pub struct VectorIdConfig {
    pub face_recognition_topic: Topic,
    pub face_id_topic: Topic,
    /// Largest distance at which an embedding joins an existing cluster.
    pub distance_threshold: f64,
}

impl VectorIdConfig {
    pub const REQUIRED_KEYS: &'static [ConfigKey] = &[
        ConfigKey::new(SECTION, "face_recognition_topic"),
        ConfigKey::new(SECTION, "face_id_topic"),
        ConfigKey::new(AGG_SECTION, "distance_threshold"),
    ];

    pub fn from_config(config: &ConfigurationSource) -> Result<Self, ConfigError> {
        let section = config.get_config(SECTION)?;
        let agg = config.get_config(AGG_SECTION)?;

        let distance_threshold = agg.get_float("distance_threshold")?;
        if !(distance_threshold.is_finite() && distance_threshold > 0.0) {
            return Err(ConfigError::InvalidValue {
                section: AGG_SECTION.to_string(),
                key: "distance_threshold".to_string(),
                value: distance_threshold.to_string(),
                reason: "must be a positive number".to_string(),
            });
        }

        Ok(Self {
            face_recognition_topic: section.get_enum("face_recognition_topic")?,
            face_id_topic: section.get_enum("face_id_topic")?,
            distance_threshold,
        })
    }
}
