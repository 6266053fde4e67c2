//! # G2KY Service
//!
//! Consumes face identities and utterances on one worker, so the two
//! streams are handled in arrival order, and publishes the replies.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use shared_bus::{EventProcessor, HandlerError, InMemoryEventBus, Publisher, ServiceRuntime};
use shared_config::ConfigurationSource;
use shared_types::{Event, Payload, TextSignalEvent, Topic};
use tracing::{debug, info};

use crate::config::G2kyConfig;
use crate::domain::GetToKnowYou;
use crate::error::G2kyError;

pub const SERVICE_NAME: &str = "g2ky";

struct AcquaintanceProcessor {
    g2ky: Arc<Mutex<dyn GetToKnowYou>>,
    publisher: Publisher,
    response_topic: Topic,
}

#[async_trait]
impl EventProcessor for AcquaintanceProcessor {
    async fn process(&self, event: Event) -> Result<(), HandlerError> {
        let reply = match event.payload() {
            Payload::FaceId(face) => self.g2ky.lock().face_seen(&face.identity),
            Payload::Text(text) => self.g2ky.lock().utterance(text.text()),
            other => {
                return Err(HandlerError::new(format!(
                    "unexpected payload on {}: {other}",
                    event.topic()
                )))
            }
        };

        let Some(reply) = reply else {
            return Ok(());
        };
        debug!(reply = %reply, "[g2ky] Responding");
        self.publisher
            .publish(self.response_topic, TextSignalEvent::for_text(reply))
            .map_err(|e| HandlerError::new(e.to_string()))?;
        Ok(())
    }
}

/// Bus-facing G2KY service.
pub struct GetToKnowYouService {
    config: G2kyConfig,
    runtime: ServiceRuntime,
    processor: Arc<AcquaintanceProcessor>,
}

impl GetToKnowYouService {
    pub fn new(
        g2ky: Arc<Mutex<dyn GetToKnowYou>>,
        bus: Arc<InMemoryEventBus>,
        config: G2kyConfig,
    ) -> Self {
        let runtime = ServiceRuntime::new(SERVICE_NAME, bus);
        let processor = Arc::new(AcquaintanceProcessor {
            g2ky,
            publisher: runtime.publisher(),
            response_topic: config.response_topic,
        });
        Self {
            config,
            runtime,
            processor,
        }
    }

    pub fn from_config(
        g2ky: Arc<Mutex<dyn GetToKnowYou>>,
        bus: Arc<InMemoryEventBus>,
        config: &ConfigurationSource,
    ) -> Result<Self, G2kyError> {
        Ok(Self::new(g2ky, bus, G2kyConfig::from_config(config)?))
    }

    #[must_use]
    pub fn config(&self) -> &G2kyConfig {
        &self.config
    }

    pub fn start(&self) -> Result<(), G2kyError> {
        if self.runtime.is_running() {
            return Err(G2kyError::AlreadyRunning);
        }
        self.runtime.consume(
            &[self.config.face_id_topic, self.config.utterance_topic],
            Arc::clone(&self.processor),
        );
        info!("[g2ky] Started");
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
