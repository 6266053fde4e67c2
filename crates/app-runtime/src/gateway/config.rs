//! `[cltl.web]` configuration.

use std::net::{IpAddr, SocketAddr};

use shared_config::{ConfigError, ConfigKey, ConfigurationSource};

const SECTION: &str = "cltl.web";

/// Listener address of the web gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WebConfig {
    pub host: IpAddr,
    pub port: u16,
}

impl WebConfig {
    pub const REQUIRED_KEYS: &'static [ConfigKey] =
        &[ConfigKey::new(SECTION, "host"), ConfigKey::new(SECTION, "port")];

    pub fn from_config(config: &ConfigurationSource) -> Result<Self, ConfigError> {
        let section = config.get_config(SECTION)?;
        Ok(Self {
            host: section.get_enum("host")?,
            port: section.get_uint("port")?,
        })
    }

    #[must_use]
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config() {
        let source = ConfigurationSource::parse(
            r#"
            [cltl.web]
            host = "0.0.0.0"
            port = 8000
            "#,
        )
        .unwrap();

        let config = WebConfig::from_config(&source).unwrap();
        assert_eq!(config.addr().to_string(), "0.0.0.0:8000");
    }

    #[test]
    fn test_rejects_bad_values() {
        let source = ConfigurationSource::parse(
            r#"
            [cltl.web]
            host = "localhost:80"
            port = 8000
            "#,
        )
        .unwrap();
        assert!(matches!(
            WebConfig::from_config(&source),
            Err(ConfigError::InvalidValue { .. })
        ));

        let source = ConfigurationSource::parse(
            r#"
            [cltl.web]
            host = "127.0.0.1"
            port = 70000
            "#,
        )
        .unwrap();
        assert!(matches!(
            WebConfig::from_config(&source),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}
