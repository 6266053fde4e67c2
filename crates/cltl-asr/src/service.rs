//! # ASR Service
//!
//! Consumes voice segments and publishes their transcripts.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use shared_bus::{EventProcessor, HandlerError, InMemoryEventBus, Publisher, ServiceRuntime};
use shared_config::ConfigurationSource;
use shared_types::{Event, Payload, TextSignalEvent, Topic};
use tracing::{debug, info};

use crate::config::AsrConfig;
use crate::domain::resample;
use crate::error::AsrError;
use crate::ports::Transcriber;

pub const SERVICE_NAME: &str = "asr";

struct TranscriptionProcessor {
    transcriber: Arc<dyn Transcriber>,
    publisher: Publisher,
    sampling_rate: u32,
    asr_topic: Topic,
}

#[async_trait]
impl EventProcessor for TranscriptionProcessor {
    async fn process(&self, event: Event) -> Result<(), HandlerError> {
        let Payload::Vad(segment) = event.payload() else {
            return Err(HandlerError::new(format!(
                "expected a voice segment on {}, got {}",
                event.topic(),
                event.payload()
            )));
        };

        let samples = resample(&segment.samples, segment.sampling_rate, self.sampling_rate);
        let text = self
            .transcriber
            .transcribe(&samples, self.sampling_rate)
            .await
            .map_err(|e| HandlerError::new(e.to_string()))?;

        let text = text.trim();
        if text.is_empty() {
            debug!(segment = %segment.segment_id, "[asr] Empty transcript");
            return Ok(());
        }

        info!(segment = %segment.segment_id, text, "[asr] Transcribed segment");
        self.publisher
            .publish(self.asr_topic, TextSignalEvent::for_text(text))
            .map_err(|e| HandlerError::new(e.to_string()))?;
        Ok(())
    }
}

/// Bus-facing ASR service.
pub struct AsrService {
    config: AsrConfig,
    runtime: ServiceRuntime,
    processor: Arc<TranscriptionProcessor>,
}

impl AsrService {
    pub fn new(
        transcriber: Arc<dyn Transcriber>,
        bus: Arc<InMemoryEventBus>,
        config: AsrConfig,
    ) -> Self {
        let runtime = ServiceRuntime::new(SERVICE_NAME, bus);
        let processor = Arc::new(TranscriptionProcessor {
            transcriber,
            publisher: runtime.publisher(),
            sampling_rate: config.sampling_rate,
            asr_topic: config.asr_topic,
        });
        Self {
            config,
            runtime,
            processor,
        }
    }

    pub fn from_config(
        transcriber: Arc<dyn Transcriber>,
        bus: Arc<InMemoryEventBus>,
        config: &ConfigurationSource,
    ) -> Result<Self, AsrError> {
        Ok(Self::new(transcriber, bus, AsrConfig::from_config(config)?))
    }

    #[must_use]
    pub fn config(&self) -> &AsrConfig {
        &self.config
    }

    pub fn start(&self) -> Result<(), AsrError> {
        if self.runtime.is_running() {
            return Err(AsrError::AlreadyRunning);
        }
        self.runtime
            .consume(&[self.config.vad_topic], Arc::clone(&self.processor));
        info!(model = %self.config.model, "[asr] Started");
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
