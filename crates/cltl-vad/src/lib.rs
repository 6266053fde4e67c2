//! # CLTL VAD - Voice Activity Detection
//!
//! Cuts the microphone stream into voice segments.
//!
//! ## Architecture
//!
//! - **Ports** (`ports`): `VoiceActivityDetector`, the per-frame speech decision
//! - **Domain** (`domain`): `EnergyDetector` and the `SpeechSegmenter` state machine
//! - **Service** (`service`): `VadService`, bus wiring over `ServiceRuntime`
//!
//! ## Flow
//!
//! ```text
//! cltl.topic.microphone ──AudioSignalEvent──▶ SpeechSegmenter ──VadEvent──▶ cltl.topic.vad
//! ```

pub mod config;
pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

pub use config::VadConfig;
pub use domain::{EnergyDetector, SpeechSegmenter};
pub use error::VadError;
pub use ports::VoiceActivityDetector;
pub use service::VadService;
