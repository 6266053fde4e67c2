//! `[cltl.chat-ui]` configuration.

use shared_config::{ConfigError, ConfigKey, ConfigurationSource};
use shared_types::Topic;

const SECTION: &str = "cltl.chat-ui";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatUiConfig {
    /// Name the agent speaks under.
    pub name: String,
    pub utterance_topic: Topic,
    pub response_topic: Topic,
}

impl ChatUiConfig {
    pub const REQUIRED_KEYS: &'static [ConfigKey] = &[
        ConfigKey::new(SECTION, "name"),
        ConfigKey::new(SECTION, "utterance_topic"),
        ConfigKey::new(SECTION, "response_topic"),
    ];

    pub fn from_config(config: &ConfigurationSource) -> Result<Self, ConfigError> {
        let section = config.get_config(SECTION)?;
        Ok(Self {
            name: section.get_str("name")?.to_string(),
            utterance_topic: section.get_enum("utterance_topic")?,
            response_topic: section.get_enum("response_topic")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config() {
        let source = ConfigurationSource::parse(
            r#"
            [cltl.chat-ui]
            name = "Leolani"
            utterance_topic = "cltl.topic.text_in"
            response_topic = "cltl.topic.text_out"
            "#,
        )
        .unwrap();

        let config = ChatUiConfig::from_config(&source).unwrap();
        assert_eq!(config.name, "Leolani");
        assert_eq!(config.utterance_topic, Topic::TextIn);
    }

    #[test]
    fn test_rejects_unknown_topic() {
        let source = ConfigurationSource::parse(
            r#"
            [cltl.chat-ui]
            name = "Leolani"
            utterance_topic = "cltl.topic.txt_in"
            response_topic = "cltl.topic.text_out"
            "#,
        )
        .unwrap();

        assert!(matches!(
            ChatUiConfig::from_config(&source),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}
