//! # Config Section
//!
//! Typed access to the keys of one dotted section.

use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;

use toml::Value;

use crate::error::ConfigError;

/// The flat key-value map of a single section.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigSection {
    name: String,
    values: BTreeMap<String, Value>,
}

impl ConfigSection {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: BTreeMap::new(),
        }
    }

    pub(crate) fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.values.insert(key.into(), value);
    }

    /// Dotted name of the section.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Keys in this section, sorted.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Raw value of `key`.
    pub fn get(&self, key: &str) -> Result<&Value, ConfigError> {
        self.values.get(key).ok_or_else(|| ConfigError::MissingKey {
            section: self.name.clone(),
            key: key.to_string(),
        })
    }

    pub fn get_str(&self, key: &str) -> Result<&str, ConfigError> {
        self.get(key)?
            .as_str()
            .ok_or_else(|| self.invalid_type(key, "a string"))
    }

    pub fn get_int(&self, key: &str) -> Result<i64, ConfigError> {
        self.get(key)?
            .as_integer()
            .ok_or_else(|| self.invalid_type(key, "an integer"))
    }

    /// Float value; integer literals are accepted and widened.
    pub fn get_float(&self, key: &str) -> Result<f64, ConfigError> {
        match self.get(key)? {
            Value::Float(f) => Ok(*f),
            Value::Integer(i) => Ok(*i as f64),
            _ => Err(self.invalid_type(key, "a number")),
        }
    }

    pub fn get_bool(&self, key: &str) -> Result<bool, ConfigError> {
        self.get(key)?
            .as_bool()
            .ok_or_else(|| self.invalid_type(key, "a boolean"))
    }

    /// Integer value converted to a narrower unsigned type.
    pub fn get_uint<T>(&self, key: &str) -> Result<T, ConfigError>
    where
        T: TryFrom<i64>,
    {
        let raw = self.get_int(key)?;
        T::try_from(raw).map_err(|_| ConfigError::InvalidValue {
            section: self.name.clone(),
            key: key.to_string(),
            value: raw.to_string(),
            reason: "out of range".to_string(),
        })
    }

    /// String value parsed into an enumerated type.
    pub fn get_enum<T>(&self, key: &str) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: Display,
    {
        let raw = self.get_str(key)?;
        raw.parse::<T>().map_err(|e| ConfigError::InvalidValue {
            section: self.name.clone(),
            key: key.to_string(),
            value: raw.to_string(),
            reason: e.to_string(),
        })
    }

    fn invalid_type(&self, key: &str, expected: &'static str) -> ConfigError {
        ConfigError::InvalidType {
            section: self.name.clone(),
            key: key.to_string(),
            expected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    enum Resolution {
        Vga,
        Qvga,
    }

    impl FromStr for Resolution {
        type Err = String;

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            match s {
                "VGA" => Ok(Self::Vga),
                "QVGA" => Ok(Self::Qvga),
                other => Err(format!("unknown resolution {other}")),
            }
        }
    }

    fn section() -> ConfigSection {
        let mut section = ConfigSection::new("cltl.video");
        section.insert("resolution", Value::String("VGA".into()));
        section.insert("bad_resolution", Value::String("8K".into()));
        section.insert("camera_index", Value::Integer(0));
        section.insert("rate", Value::Float(0.5));
        section.insert("enabled", Value::Boolean(true));
        section
    }

    #[test]
    fn test_typed_accessors() {
        let s = section();
        assert_eq!(s.get_int("camera_index"), Ok(0));
        assert_eq!(s.get_float("rate"), Ok(0.5));
        assert_eq!(s.get_float("camera_index"), Ok(0.0));
        assert_eq!(s.get_bool("enabled"), Ok(true));
        assert_eq!(s.get_enum::<Resolution>("resolution"), Ok(Resolution::Vga));
    }

    #[test]
    fn test_missing_key_names_section() {
        let err = section().get_int("frame_size").unwrap_err();
        assert_eq!(
            err,
            ConfigError::MissingKey {
                section: "cltl.video".into(),
                key: "frame_size".into()
            }
        );
    }

    #[test]
    fn test_mistyped_key() {
        assert!(matches!(
            section().get_int("resolution"),
            Err(ConfigError::InvalidType { expected: "an integer", .. })
        ));
    }

    #[test]
    fn test_invalid_enum_value() {
        assert!(matches!(
            section().get_enum::<Resolution>("bad_resolution"),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_uint_range_check() {
        let mut s = ConfigSection::new("cltl.audio");
        s.insert("channels", Value::Integer(-1));
        assert!(matches!(
            s.get_uint::<u16>("channels"),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}
