//! # Dependency Container
//!
//! Each capability gets its own container of [`Singleton`] slots over one
//! shared [`InfraContext`]. Nothing is constructed until first asked for,
//! and every slot yields the same instance for the life of the application.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                  ApplicationContainer                   │
//! │  Backend  ChatUi  Vad  Asr  VectorId  FaceRecog  G2ky   │
//! │     │       │      │    │      │         │        │     │
//! │     └───────┴──────┴────┴──────┴─────────┴────────┘     │
//! │                         ▼                               │
//! │      InfraContext (config, event bus, resources)        │
//! └─────────────────────────────────────────────────────────┘
//! ```

mod application;
mod backend;
mod capabilities;
mod infra;
mod singleton;

pub use application::{ApplicationContainer, START_ORDER};
pub use backend::BackendContainer;
pub use capabilities::{
    AsrContainer, ChatUiContainer, FaceRecognitionContainer, G2kyContainer, VadContainer,
    VectorIdContainer,
};
pub use infra::InfraContext;
pub use singleton::{FactoryError, ResolutionError, Singleton};
