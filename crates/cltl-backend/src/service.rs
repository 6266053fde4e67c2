//! # Backend Services
//!
//! [`BackendService`] publishes what the microphone and camera capture and
//! speaks what arrives on the TTS topic. [`StorageService`] serves the stored
//! signals over HTTP.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use shared_bus::{EventProcessor, HandlerError, InMemoryEventBus, Publisher, ServiceRuntime};
use shared_config::ConfigurationSource;
use shared_types::{AudioSignalEvent, Event, ImageSignalEvent, Payload, Topic};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::BackendConfig;
use crate::devices::{Backend, ImageCamera, SynchronizedMicrophone, SynchronizedTextToSpeech};
use crate::error::BackendError;
use crate::storage::{AudioStorage, ImageStorage};

pub const SERVICE_NAME: &str = "backend";

// =============================================================================
// BACKEND SERVICE
// =============================================================================

struct SpeechProcessor {
    tts: Arc<SynchronizedTextToSpeech>,
}

#[async_trait]
impl EventProcessor for SpeechProcessor {
    async fn process(&self, event: Event) -> Result<(), HandlerError> {
        let Payload::Text(text) = event.payload() else {
            return Err(HandlerError::new(format!(
                "expected text on {}, got {}",
                event.topic(),
                event.payload()
            )));
        };
        self.tts
            .say(text.text())
            .await
            .map_err(|e| HandlerError::new(e.to_string()))
    }
}

/// Bus-facing backend service.
pub struct BackendService {
    config: BackendConfig,
    backend: Arc<Backend>,
    audio_storage: Arc<dyn AudioStorage>,
    image_storage: Arc<dyn ImageStorage>,
    runtime: ServiceRuntime,
}

impl BackendService {
    pub fn new(
        backend: Arc<Backend>,
        audio_storage: Arc<dyn AudioStorage>,
        image_storage: Arc<dyn ImageStorage>,
        bus: Arc<InMemoryEventBus>,
        config: BackendConfig,
    ) -> Self {
        Self {
            config,
            backend,
            audio_storage,
            image_storage,
            runtime: ServiceRuntime::new(SERVICE_NAME, bus),
        }
    }

    pub fn from_config(
        backend: Arc<Backend>,
        audio_storage: Arc<dyn AudioStorage>,
        image_storage: Arc<dyn ImageStorage>,
        bus: Arc<InMemoryEventBus>,
        config: &ConfigurationSource,
    ) -> Result<Self, BackendError> {
        Ok(Self::new(
            backend,
            audio_storage,
            image_storage,
            bus,
            BackendConfig::from_config(config)?,
        ))
    }

    #[must_use]
    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    pub fn start(&self) -> Result<(), BackendError> {
        if self.runtime.is_running() {
            return Err(BackendError::AlreadyRunning);
        }

        self.runtime.spawn(capture_audio(
            Arc::clone(self.backend.microphone()),
            Arc::clone(&self.audio_storage),
            self.runtime.publisher(),
            self.config.mic_topic,
            self.config.frame_size,
        ));
        self.runtime.spawn(capture_images(
            Arc::clone(self.backend.camera()),
            Arc::clone(&self.image_storage),
            self.runtime.publisher(),
            self.config.image_topic,
        ));
        self.runtime.consume(
            &[self.config.tts_topic],
            Arc::new(SpeechProcessor {
                tts: Arc::clone(self.backend.tts()),
            }),
        );

        info!(
            mic_topic = %self.config.mic_topic,
            image_topic = %self.config.image_topic,
            tts_topic = %self.config.tts_topic,
            "[backend] Started"
        );
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

/// Split microphone chunks into frames of `frame_size` samples per channel.
///
/// A signal spans chunks up to and including one marked `end_of_stream`,
/// whose last frame carries `is_last`.
async fn capture_audio(
    microphone: Arc<SynchronizedMicrophone>,
    storage: Arc<dyn AudioStorage>,
    publisher: Publisher,
    topic: Topic,
    frame_size: usize,
) {
    let sampling_rate = microphone.sampling_rate();
    let channels = microphone.channels();
    let frame_len = (frame_size * channels as usize).max(1);
    let mut open_signal: Option<(String, u64)> = None;

    while let Some(chunk) = microphone.listen().await {
        let (signal_id, mut frame_index) = open_signal
            .take()
            .unwrap_or_else(|| (Uuid::new_v4().to_string(), 0));

        let mut frames: Vec<&[i16]> = chunk.samples.chunks(frame_len).collect();
        if frames.is_empty() && chunk.end_of_stream {
            frames.push(&[]);
        }
        let count = frames.len();

        for (i, samples) in frames.into_iter().enumerate() {
            storage.append(&signal_id, sampling_rate, channels, samples);
            let frame = AudioSignalEvent {
                signal_id: signal_id.clone(),
                frame_index,
                sampling_rate,
                channels,
                samples: samples.to_vec(),
                is_last: chunk.end_of_stream && i + 1 == count,
            };
            if let Err(e) = publisher.publish(topic, frame) {
                warn!(error = %e, "[backend] Failed to publish audio frame");
            }
            frame_index += 1;
        }

        if chunk.end_of_stream {
            debug!(signal = %signal_id, frames = frame_index, "[backend] Audio signal closed");
        } else {
            open_signal = Some((signal_id, frame_index));
        }
    }
}

async fn capture_images(
    camera: Arc<ImageCamera>,
    storage: Arc<dyn ImageStorage>,
    publisher: Publisher,
    topic: Topic,
) {
    while let Some(image) = camera.capture().await {
        let signal_id = Uuid::new_v4().to_string();
        storage.store(&signal_id, image.clone());
        debug!(signal = %signal_id, width = image.width, height = image.height, "[backend] Image captured");
        if let Err(e) = publisher.publish(topic, ImageSignalEvent { signal_id, image }) {
            warn!(error = %e, "[backend] Failed to publish image");
        }
    }
}

// =============================================================================
// STORAGE SERVICE
// =============================================================================

/// HTTP access to stored signals.
///
/// | Method | Path |
/// |--------|------|
/// | GET | `/audio/:signal_id` |
/// | GET | `/image/:signal_id` |
pub struct StorageService {
    state: StorageState,
}

#[derive(Clone)]
struct StorageState {
    audio: Arc<dyn AudioStorage>,
    image: Arc<dyn ImageStorage>,
    running: Arc<AtomicBool>,
}

impl StorageService {
    pub fn new(audio: Arc<dyn AudioStorage>, image: Arc<dyn ImageStorage>) -> Self {
        Self {
            state: StorageState {
                audio,
                image,
                running: Arc::new(AtomicBool::new(false)),
            },
        }
    }

    pub fn start(&self) {
        self.state.running.store(true, Ordering::SeqCst);
        info!("[storage] Started");
    }

    pub fn stop(&self) {
        if self.state.running.swap(false, Ordering::SeqCst) {
            info!("[storage] Stopped");
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state.running.load(Ordering::SeqCst)
    }

    pub fn app(&self) -> Router {
        Router::new()
            .route("/audio/:signal_id", get(get_audio))
            .route("/image/:signal_id", get(get_image))
            .with_state(self.state.clone())
    }
}

async fn get_audio(
    State(state): State<StorageState>,
    Path(signal_id): Path<String>,
) -> Response {
    if !state.running.load(Ordering::SeqCst) {
        return unavailable();
    }
    match state.audio.get(&signal_id) {
        Some(audio) => Json(audio).into_response(),
        None => not_found("audio", &signal_id),
    }
}

async fn get_image(
    State(state): State<StorageState>,
    Path(signal_id): Path<String>,
) -> Response {
    if !state.running.load(Ordering::SeqCst) {
        return unavailable();
    }
    match state.image.get(&signal_id) {
        Some(image) => Json(image).into_response(),
        None => not_found("image", &signal_id),
    }
}

fn not_found(kind: &str, signal_id: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "error": format!("no {kind} stored"), "signal_id": signal_id })),
    )
        .into_response()
}

fn unavailable() -> Response {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(serde_json::json!({ "error": "storage service is not running" })),
    )
        .into_response()
}
