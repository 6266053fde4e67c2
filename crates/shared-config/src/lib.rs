//! # Shared Config
//!
//! Hierarchical key-value configuration loaded once at process start and
//! read-only afterwards.
//!
//! ## File Format
//!
//! ```toml
//! [cltl.audio]
//! sampling_rate = 16000
//! channels = 1
//!
//! [cltl.backend.image]
//! rate = 0.5
//! ```
//!
//! Nested tables are flattened into dotted section names, so the example
//! yields the sections `cltl.audio` and `cltl.backend.image`.
//!
//! ## Environment Overrides
//!
//! `G2KY__CLTL_AUDIO__SAMPLING_RATE=8000` overrides `sampling_rate` in the
//! `cltl.audio` section (dots and dashes in the section name are written as
//! underscores).

mod error;
mod section;
mod source;

pub use error::ConfigError;
pub use section::ConfigSection;
pub use source::{ConfigKey, ConfigurationSource};

/// Default prefix for environment overrides.
pub const ENV_PREFIX: &str = "G2KY";
