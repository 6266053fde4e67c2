//! # Face Recognition Service
//!
//! Consumes camera images, publishes the detections and one embedding
//! event per face.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use shared_bus::{EventProcessor, HandlerError, InMemoryEventBus, Publisher, ServiceRuntime};
use shared_config::ConfigurationSource;
use shared_types::{Event, FaceDetectionEvent, FaceRecognitionEvent, Payload, Topic};
use tracing::{debug, info};

use crate::config::FaceRecognitionConfig;
use crate::error::FaceRecognitionError;
use crate::ports::FaceDetector;

pub const SERVICE_NAME: &str = "face_recognition";

struct DetectionProcessor {
    detector: Arc<dyn FaceDetector>,
    publisher: Publisher,
    face_topic: Topic,
    face_recognition_topic: Topic,
}

#[async_trait]
impl EventProcessor for DetectionProcessor {
    async fn process(&self, event: Event) -> Result<(), HandlerError> {
        let Payload::Image(image) = event.payload() else {
            return Err(HandlerError::new(format!(
                "expected an image on {}, got {}",
                event.topic(),
                event.payload()
            )));
        };

        let faces = self
            .detector
            .detect(&image.image)
            .await
            .map_err(|e| HandlerError::new(e.to_string()))?;
        debug!(signal = %image.signal_id, faces = faces.len(), "[face] Detected faces");

        let embeddings: Vec<FaceRecognitionEvent> = faces
            .iter()
            .enumerate()
            .map(|(face_index, face)| FaceRecognitionEvent {
                signal_id: image.signal_id.clone(),
                face_index,
                embedding: face.embedding.clone(),
            })
            .collect();

        let publish_err = |e: shared_bus::BusError| HandlerError::new(e.to_string());
        self.publisher
            .publish(
                self.face_topic,
                FaceDetectionEvent {
                    signal_id: image.signal_id.clone(),
                    faces,
                },
            )
            .map_err(publish_err)?;
        for embedding in embeddings {
            self.publisher
                .publish(self.face_recognition_topic, embedding)
                .map_err(publish_err)?;
        }
        Ok(())
    }
}

/// Bus-facing face recognition service.
pub struct FaceRecognitionService {
    config: FaceRecognitionConfig,
    runtime: ServiceRuntime,
    processor: Arc<DetectionProcessor>,
}

impl FaceRecognitionService {
    pub fn new(
        detector: Arc<dyn FaceDetector>,
        bus: Arc<InMemoryEventBus>,
        config: FaceRecognitionConfig,
    ) -> Self {
        let runtime = ServiceRuntime::new(SERVICE_NAME, bus);
        let processor = Arc::new(DetectionProcessor {
            detector,
            publisher: runtime.publisher(),
            face_topic: config.face_topic,
            face_recognition_topic: config.face_recognition_topic,
        });
        Self {
            config,
            runtime,
            processor,
        }
    }

    pub fn from_config(
        detector: Arc<dyn FaceDetector>,
        bus: Arc<InMemoryEventBus>,
        config: &ConfigurationSource,
    ) -> Result<Self, FaceRecognitionError> {
        Ok(Self::new(
            detector,
            bus,
            FaceRecognitionConfig::from_config(config)?,
        ))
    }

    #[must_use]
    pub fn config(&self) -> &FaceRecognitionConfig {
        &self.config
    }

    pub fn start(&self) -> Result<(), FaceRecognitionError> {
        if self.runtime.is_running() {
            return Err(FaceRecognitionError::AlreadyRunning);
        }
        self.runtime
            .consume(&[self.config.image_topic], Arc::clone(&self.processor));
        info!(image_topic = %self.config.image_topic, "[face] Started");
        Ok(())
    }

    pub async fn stop(&self, timeout: Duration) {
        self.runtime.stop(timeout).await;
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.runtime.is_running()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use shared_types::{Bounds, Face, ImageData, ImageSignalEvent};

    struct TwoFaces;

    #[async_trait]
    impl FaceDetector for TwoFaces {
        async fn detect(&self, _image: &ImageData) -> Result<Vec<Face>, FaceRecognitionError> {
            let bounds = Bounds { x0: 0, y0: 0, x1: 10, y1: 10 };
            Ok(vec![
                Face { bounds, embedding: vec![1.0, 0.0] },
                Face { bounds, embedding: vec![0.0, 1.0] },
            ])
        }
    }

    fn config() -> FaceRecognitionConfig {
        FaceRecognitionConfig {
            url: "http://unused".into(),
            image_topic: Topic::Image,
            face_topic: Topic::Face,
            face_recognition_topic: Topic::FaceRecognition,
        }
    }

    #[tokio::test]
    async fn test_publishes_detections_and_embeddings() {
        let bus = Arc::new(InMemoryEventBus::new());
        let seen = Arc::new(Mutex::new(Vec::new()));
        for topic in [Topic::Face, Topic::FaceRecognition] {
            let s = Arc::clone(&seen);
            bus.subscribe(topic, move |e: &Event| {
                s.lock().push(e.payload().to_string());
                Ok(())
            });
        }

        let service = FaceRecognitionService::new(Arc::new(TwoFaces), Arc::clone(&bus), config());
        service.start().unwrap();
        bus.publish(Event::new(
            Topic::Image,
            "backend",
            ImageSignalEvent {
                signal_id: "img-1".into(),
                image: ImageData { width: 1, height: 1, data: vec![0, 0, 0] },
            },
        ))
        .unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(
            *seen.lock(),
            vec![
                "faces signal=img-1 count=2".to_string(),
                "face signal=img-1 index=0 dims=2".to_string(),
                "face signal=img-1 index=1 dims=2".to_string(),
            ]
        );
        service.stop(Duration::from_secs(1)).await;
        assert_eq!(bus.subscriber_count(Topic::Image), 0);
    }
}
