//! # Configuration Source
//!
//! Loads the TOML file, flattens it into dotted sections and applies
//! environment overrides.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use toml::{Table, Value};
use tracing::{debug, info, warn};

use crate::error::ConfigError;
use crate::section::ConfigSection;

/// A `(section, key)` pair a component requires to be present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConfigKey {
    pub section: &'static str,
    pub key: &'static str,
}

impl ConfigKey {
    #[must_use]
    pub const fn new(section: &'static str, key: &'static str) -> Self {
        Self { section, key }
    }
}

/// Read-only, process-wide configuration.
#[derive(Debug, Clone, Default)]
pub struct ConfigurationSource {
    sections: BTreeMap<String, ConfigSection>,
}

impl ConfigurationSource {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            error: e.to_string(),
        })?;

        let source = Self::parse(&content)?;
        info!(
            "[config] Loaded {} sections from {}",
            source.sections.len(),
            path.as_ref().display()
        );
        Ok(source)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let table: Table = content
            .parse()
            .map_err(|e: toml::de::Error| ConfigError::Parse(e.to_string()))?;

        let mut source = Self::default();
        source.flatten("", table);
        Ok(source)
    }

    fn flatten(&mut self, prefix: &str, table: Table) {
        for (key, value) in table {
            match value {
                Value::Table(nested) => {
                    let name = if prefix.is_empty() {
                        key
                    } else {
                        format!("{prefix}.{key}")
                    };
                    // Register the section even when it only holds sub-tables.
                    self.sections
                        .entry(name.clone())
                        .or_insert_with(|| ConfigSection::new(name.clone()));
                    self.flatten(&name, nested);
                }
                scalar => {
                    self.sections
                        .entry(prefix.to_string())
                        .or_insert_with(|| ConfigSection::new(prefix))
                        .insert(key, scalar);
                }
            }
        }
    }

    /// Apply overrides from the process environment.
    #[must_use]
    pub fn with_env_overrides(self, prefix: &str) -> Self {
        self.with_overrides(prefix, std::env::vars())
    }

    /// Apply `PREFIX__SECTION__KEY=value` overrides from `vars`.
    ///
    /// Only existing sections can be overridden. A value replacing a string
    /// stays a string; any other value is typed as integer, float or boolean
    /// when it parses as such and as a string otherwise.
    #[must_use]
    pub fn with_overrides<I>(mut self, prefix: &str, vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let marker = format!("{prefix}__");
        for (name, raw) in vars {
            let Some(rest) = name.strip_prefix(&marker) else {
                continue;
            };
            let Some((section_token, key)) = rest.rsplit_once("__") else {
                warn!("[config] Ignoring malformed override {}", name);
                continue;
            };

            let Some(section) = self
                .sections
                .values_mut()
                .find(|s| env_token(s.name()) == section_token)
            else {
                warn!("[config] Override {} targets an unknown section", name);
                continue;
            };

            let key = key.to_lowercase();
            debug!("[config] Override {}.{} from environment", section.name(), key);
            let value = typed_value(section.get(&key).ok(), &raw);
            section.insert(key, value);
        }
        self
    }

    /// Section by dotted name.
    pub fn get_config(&self, section: &str) -> Result<&ConfigSection, ConfigError> {
        self.sections
            .get(section)
            .ok_or_else(|| ConfigError::MissingSection(section.to_string()))
    }

    /// Check that every key in `keys` is present, reporting all gaps at once.
    pub fn require(&self, keys: &[ConfigKey]) -> Result<(), ConfigError> {
        let missing: Vec<String> = keys
            .iter()
            .filter(|k| {
                !self
                    .sections
                    .get(k.section)
                    .is_some_and(|s| s.contains(k.key))
            })
            .map(|k| format!("{}.{}", k.section, k.key))
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::MissingKeys(missing))
        }
    }

    /// Dotted names of all sections, sorted.
    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }
}

fn env_token(section: &str) -> String {
    section.replace(['.', '-'], "_").to_uppercase()
}

fn typed_value(replaced: Option<&Value>, raw: &str) -> Value {
    if matches!(replaced, Some(Value::String(_))) {
        return Value::String(raw.to_string());
    }
    if let Ok(i) = raw.parse::<i64>() {
        Value::Integer(i)
    } else if let Ok(f) = raw.parse::<f64>() {
        Value::Float(f)
    } else if let Ok(b) = raw.parse::<bool>() {
        Value::Boolean(b)
    } else {
        Value::String(raw.to_string())
    }
}
