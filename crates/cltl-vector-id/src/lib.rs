//! # CLTL Vector ID
//!
//! Assigns stable identities to face embeddings by incremental clustering.
//!
//! ```text
//! cltl.topic.face_recognition ──FaceRecognitionEvent──▶ ClusterIdentity ──FaceIdEvent──▶ cltl.topic.face_id
//! ```

pub mod config;
pub mod domain;
pub mod error;
pub mod service;

pub use config::VectorIdConfig;
pub use domain::{ClusterIdentity, VectorIdentity};
pub use error::VectorIdError;
pub use service::VectorIdService;
