//! # CLTL ASR - Speech Recognition
//!
//! Transcribes voice segments into text utterances.
//!
//! ```text
//! cltl.topic.vad ──VadEvent──▶ Transcriber ──TextSignalEvent──▶ cltl.topic.text_in
//! ```
//!
//! The model itself lives behind the [`Transcriber`] port; [`RemoteAsr`]
//! reaches a model server over HTTP.

pub mod adapters;
pub mod config;
pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

pub use adapters::RemoteAsr;
pub use config::AsrConfig;
pub use error::AsrError;
pub use ports::Transcriber;
pub use service::AsrService;
