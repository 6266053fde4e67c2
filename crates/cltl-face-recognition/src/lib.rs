//! # CLTL Face Recognition
//!
//! Detects faces in camera images and extracts one embedding per face.
//!
//! ```text
//! cltl.topic.image ──ImageSignalEvent──▶ FaceDetector ──┬─FaceDetectionEvent──▶ cltl.topic.face
//!                                                       └─FaceRecognitionEvent─▶ cltl.topic.face_recognition
//! ```

pub mod adapters;
pub mod config;
pub mod error;
pub mod ports;
pub mod service;

pub use adapters::FaceDetectorProxy;
pub use config::FaceRecognitionConfig;
pub use error::FaceRecognitionError;
pub use ports::FaceDetector;
pub use service::FaceRecognitionService;
