//! # Vector ID Service
//!
//! Consumes face embeddings and publishes the identity of each face.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use shared_bus::{EventProcessor, HandlerError, InMemoryEventBus, Publisher, ServiceRuntime};
use shared_config::ConfigurationSource;
use shared_types::{Event, FaceIdEvent, Payload, Topic};
use tracing::{debug, info};

use crate::config::VectorIdConfig;
use crate::domain::VectorIdentity;
use crate::error::VectorIdError;

pub const SERVICE_NAME: &str = "vector_id";

struct IdentityProcessor {
    identity: Arc<Mutex<dyn VectorIdentity>>,
    publisher: Publisher,
    face_id_topic: Topic,
}

#[async_trait]
impl EventProcessor for IdentityProcessor {
    async fn process(&self, event: Event) -> Result<(), HandlerError> {
        let Payload::FaceRecognition(face) = event.payload() else {
            return Err(HandlerError::new(format!(
                "expected a face embedding on {}, got {}",
                event.topic(),
                event.payload()
            )));
        };

        let identity = self
            .identity
            .lock()
            .identify(&face.embedding)
            .map_err(|e| HandlerError::new(e.to_string()))?;
        debug!(signal = %face.signal_id, face = face.face_index, %identity, "[vector_id] Identified face");

        self.publisher
            .publish(
                self.face_id_topic,
                FaceIdEvent {
                    signal_id: face.signal_id.clone(),
                    face_index: face.face_index,
                    identity,
                },
            )
            .map_err(|e| HandlerError::new(e.to_string()))?;
        Ok(())
    }
}

/// Bus-facing identity service.
pub struct VectorIdService {
    config: VectorIdConfig,
    runtime: ServiceRuntime,
    processor: Arc<IdentityProcessor>,
}

impl VectorIdService {
    pub fn new(
        identity: Arc<Mutex<dyn VectorIdentity>>,
        bus: Arc<InMemoryEventBus>,
        config: VectorIdConfig,
    ) -> Self {
        let runtime = ServiceRuntime::new(SERVICE_NAME, bus);
        let processor = Arc::new(IdentityProcessor {
            identity,
            publisher: runtime.publisher(),
            face_id_topic: config.face_id_topic,
        });
        Self {
            config,
            runtime,
            processor,
        }
    }

    pub fn from_config(
        identity: Arc<Mutex<dyn VectorIdentity>>,
        bus: Arc<InMemoryEventBus>,
        config: &ConfigurationSource,
    ) -> Result<Self, VectorIdError> {
        Ok(Self::new(identity, bus, VectorIdConfig::from_config(config)?))
    }

    #[must_use]
    pub fn config(&self) -> &VectorIdConfig {
        &self.config
    }

    pub fn start(&self) -> Result<(), VectorIdError> {
        if self.runtime.is_running() {
            return Err(VectorIdError::AlreadyRunning);
        }
        self.runtime.consume(
            &[self.config.face_recognition_topic],
            Arc::clone(&self.processor),
        );
        info!(threshold = self.config.distance_threshold, "[vector_id] Started");
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
