//! # VAD Service
//!
//! Consumes microphone frames and publishes voice segments.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use shared_bus::{EventProcessor, HandlerError, InMemoryEventBus, Publisher, ServiceRuntime};
use shared_config::ConfigurationSource;
use shared_types::{Event, Payload, Topic};
use tracing::{debug, info};

use crate::config::VadConfig;
use crate::domain::SpeechSegmenter;
use crate::error::VadError;
use crate::ports::VoiceActivityDetector;

pub const SERVICE_NAME: &str = "vad";

struct SegmentProcessor {
    segmenter: Mutex<SpeechSegmenter>,
    publisher: Publisher,
    vad_topic: Topic,
}

#[async_trait]
impl EventProcessor for SegmentProcessor {
    async fn process(&self, event: Event) -> Result<(), HandlerError> {
        let Payload::Audio(frame) = event.payload() else {
            return Err(HandlerError::new(format!(
                "expected audio on {}, got {}",
                event.topic(),
                event.payload()
            )));
        };

        let segment = self.segmenter.lock().push(frame);
        if let Some(segment) = segment {
            debug!(
                signal = %segment.signal_id,
                segment = %segment.segment_id,
                duration_ms = segment.duration_ms(),
                "[vad] Voice segment detected"
            );
            self.publisher
                .publish(self.vad_topic, segment)
                .map_err(|e| HandlerError::new(e.to_string()))?;
        }
        Ok(())
    }
}

/// Bus-facing VAD service.
pub struct VadService {
    config: VadConfig,
    runtime: ServiceRuntime,
    processor: Arc<SegmentProcessor>,
}

impl VadService {
    pub fn new(
        detector: Arc<dyn VoiceActivityDetector>,
        bus: Arc<InMemoryEventBus>,
        config: VadConfig,
    ) -> Self {
        let runtime = ServiceRuntime::new(SERVICE_NAME, bus);
        let processor = Arc::new(SegmentProcessor {
            segmenter: Mutex::new(SpeechSegmenter::new(
                detector,
                config.padding,
                config.min_duration,
            )),
            publisher: runtime.publisher(),
            vad_topic: config.vad_topic,
        });
        Self {
            config,
            runtime,
            processor,
        }
    }

    pub fn from_config(
        detector: Arc<dyn VoiceActivityDetector>,
        bus: Arc<InMemoryEventBus>,
        config: &ConfigurationSource,
    ) -> Result<Self, VadError> {
        Ok(Self::new(detector, bus, VadConfig::from_config(config)?))
    }

    #[must_use]
    pub fn config(&self) -> &VadConfig {
        &self.config
    }

    pub fn start(&self) -> Result<(), VadError> {
        if self.runtime.is_running() {
            return Err(VadError::AlreadyRunning);
        }
        self.runtime
            .consume(&[self.config.mic_topic], Arc::clone(&self.processor));
        info!(mic_topic = %self.config.mic_topic, vad_topic = %self.config.vad_topic, "[vad] Started");
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
