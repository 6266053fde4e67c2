//! Driven port for the face model.

use async_trait::async_trait;
use shared_types::{Face, ImageData};

use crate::error::FaceRecognitionError;

/// Finds faces in an image, each with its embedding.
#[async_trait]
pub trait FaceDetector: Send + Sync {
    async fn detect(&self, image: &ImageData) -> Result<Vec<Face>, FaceRecognitionError>;
}
