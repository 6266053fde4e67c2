//! HTTP proxy to a face detector server.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use shared_types::{Face, ImageData};
use tracing::debug;

use crate::error::FaceRecognitionError;
use crate::ports::FaceDetector;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Posts images to `{url}/detect` and reads back a JSON array of faces.
pub struct FaceDetectorProxy {
    client: Client,
    url: String,
}

impl FaceDetectorProxy {
    pub fn new(url: impl Into<String>) -> Result<Self, FaceRecognitionError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> String {
        format!("{}/detect", self.url)
    }
}

#[async_trait]
impl FaceDetector for FaceDetectorProxy {
    async fn detect(&self, image: &ImageData) -> Result<Vec<Face>, FaceRecognitionError> {
        let response = self.client.post(self.endpoint()).json(image).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FaceRecognitionError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let faces: Vec<Face> = response.json().await?;
        debug!(faces = faces.len(), "[face] Detector response");
        Ok(faces)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint() {
        let proxy = FaceDetectorProxy::new("http://localhost:10002").unwrap();
        assert_eq!(proxy.endpoint(), "http://localhost:10002/detect");
    }

    #[test]
    fn test_face_response_shape() {
        let faces: Vec<Face> = serde_json::from_str(
            r#"[{"bounds": {"x0": 1, "y0": 2, "x1": 30, "y1": 40}, "embedding": [0.5, 0.25]}]"#,
        )
        .unwrap();
        assert_eq!(faces.len(), 1);
        assert_eq!(faces[0].bounds.x1, 30);
        assert_eq!(faces[0].embedding, vec![0.5, 0.25]);
    }
}
