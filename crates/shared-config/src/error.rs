use thiserror::Error;

/// Configuration errors. All of them are fatal at startup.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Failed to read config file {path}: {error}")]
    Io { path: String, error: String },

    /// The configuration file is not valid TOML.
    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    /// A section was requested that the configuration does not contain.
    #[error("Missing configuration section [{0}]")]
    MissingSection(String),

    /// A required key is absent.
    #[error("Missing configuration key {section}.{key}")]
    MissingKey { section: String, key: String },

    /// Several required keys are absent (reported together at validation).
    #[error("Missing configuration keys: {}", .0.join(", "))]
    MissingKeys(Vec<String>),

    /// A key holds a value of the wrong type.
    #[error("Configuration key {section}.{key} must be {expected}")]
    InvalidType {
        section: String,
        key: String,
        expected: &'static str,
    },

    /// A key holds a value outside the accepted set.
    #[error("Invalid value '{value}' for {section}.{key}: {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },
}
