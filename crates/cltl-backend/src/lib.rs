//! # CLTL Backend
//!
//! The agent's body: microphone, camera and text-to-speech, fed by a remote
//! client through the host API.
//!
//! ```text
//!  POST /host/mic ──▶ ClientAudioSource ──▶ SynchronizedMicrophone ──▶ cltl.topic.microphone
//!  POST /host/video ─▶ ClientImageSource ──▶ ImageCamera ────────────▶ cltl.topic.image
//!  cltl.topic.text_out ──▶ SynchronizedTextToSpeech ──▶ ConsoleOutput ──▶ GET /host/text
//!                                   │
//!                       holds `microphone` while speaking
//! ```
//!
//! Every captured signal is also kept in a bounded cache and served under
//! `/storage`.

pub mod config;
pub mod devices;
pub mod error;
pub mod server;
pub mod service;
pub mod source;
pub mod storage;

pub use config::{AudioConfig, BackendConfig, CameraResolution, StorageConfig, VideoConfig};
pub use devices::{Backend, ImageCamera, SynchronizedMicrophone, SynchronizedTextToSpeech};
pub use error::BackendError;
pub use server::BackendServer;
pub use service::{BackendService, StorageService};
pub use source::{
    AudioChunk, AudioSource, ClientAudioSource, ClientImageSource, ConsoleOutput, ImageSource,
    TextOutput,
};
pub use storage::{AudioStorage, CachedAudioStorage, CachedImageStorage, ImageStorage, StoredAudio};
