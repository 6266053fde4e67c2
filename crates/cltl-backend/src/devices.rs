//! # Backend Devices
//!
//! Microphone, camera and text-to-speech over the client sources, coordinated
//! through the shared [`ResourceCoordinator`]:
//!
//! - the TTS holds [`MICROPHONE`] while speaking, and the microphone drops
//!   audio while it is held, so the agent does not hear itself;
//! - each camera capture holds [`CAMERA`].

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use shared_resource::{ResourceCoordinator, ResourceError, CAMERA, MICROPHONE};
use shared_types::ImageData;
use tokio::time::Instant;
use tracing::debug;

use crate::source::{AudioChunk, AudioSource, ImageSource, TextOutput};

const MICROPHONE_HOLDER: &str = "backend.microphone";
const CAMERA_HOLDER: &str = "backend.camera";
const TTS_HOLDER: &str = "backend.tts";

/// How long speech waits for the microphone to be free.
pub const TTS_MICROPHONE_TIMEOUT: Duration = Duration::from_secs(5);

pub struct SynchronizedMicrophone {
    source: Arc<dyn AudioSource>,
    resources: Arc<ResourceCoordinator>,
}

impl SynchronizedMicrophone {
    pub fn new(source: Arc<dyn AudioSource>, resources: Arc<ResourceCoordinator>) -> Self {
        Self { source, resources }
    }

    #[must_use]
    pub fn sampling_rate(&self) -> u32 {
        self.source.sampling_rate()
    }

    #[must_use]
    pub fn channels(&self) -> u16 {
        self.source.channels()
    }

    /// Next chunk heard while the microphone is free. `None` once the source
    /// is closed.
    pub async fn listen(&self) -> Option<AudioChunk> {
        loop {
            let chunk = self.source.next_chunk().await?;
            match self.resources.try_acquire(MICROPHONE, MICROPHONE_HOLDER) {
                Ok(_guard) => return Some(chunk),
                Err(e) => {
                    debug!(error = %e, samples = chunk.samples.len(), "[backend] Microphone muted, audio dropped");
                }
            }
        }
    }
}

pub struct ImageCamera {
    source: Arc<dyn ImageSource>,
    resources: Arc<ResourceCoordinator>,
    interval: Duration,
    last_capture: Mutex<Option<Instant>>,
}

impl ImageCamera {
    /// `interval` is the minimum time between two captures.
    pub fn new(
        source: Arc<dyn ImageSource>,
        resources: Arc<ResourceCoordinator>,
        interval: Duration,
    ) -> Self {
        Self {
            source,
            resources,
            interval,
            last_capture: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Next image, respecting the capture rate. Images arriving faster are
    /// dropped. `None` once the source is closed.
    pub async fn capture(&self) -> Option<ImageData> {
        loop {
            let image = self.source.next_image().await?;
            let now = Instant::now();
            let due = self
                .last_capture
                .lock()
                .map_or(true, |last| now.duration_since(last) >= self.interval);
            if !due {
                debug!("[backend] Capture rate exceeded, image dropped");
                continue;
            }

            match self.resources.try_acquire(CAMERA, CAMERA_HOLDER) {
                Ok(_guard) => {
                    *self.last_capture.lock() = Some(now);
                    return Some(image);
                }
                Err(e) => debug!(error = %e, "[backend] Camera busy, image dropped"),
            }
        }
    }
}

pub struct SynchronizedTextToSpeech {
    output: Arc<dyn TextOutput>,
    resources: Arc<ResourceCoordinator>,
    timeout: Duration,
}

impl SynchronizedTextToSpeech {
    pub fn new(output: Arc<dyn TextOutput>, resources: Arc<ResourceCoordinator>) -> Self {
        Self {
            output,
            resources,
            timeout: TTS_MICROPHONE_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Speak `text` with the microphone muted.
    pub async fn say(&self, text: &str) -> Result<(), ResourceError> {
        let _guard = self
            .resources
            .acquire(MICROPHONE, TTS_HOLDER, self.timeout)
            .await?;
        self.output.consume(text);
        Ok(())
    }
}

/// The devices of one agent body.
pub struct Backend {
    microphone: Arc<SynchronizedMicrophone>,
    camera: Arc<ImageCamera>,
    tts: Arc<SynchronizedTextToSpeech>,
}

impl Backend {
    pub fn new(
        microphone: Arc<SynchronizedMicrophone>,
        camera: Arc<ImageCamera>,
        tts: Arc<SynchronizedTextToSpeech>,
    ) -> Self {
        Self {
            microphone,
            camera,
            tts,
        }
    }

    #[must_use]
    pub fn microphone(&self) -> &Arc<SynchronizedMicrophone> {
        &self.microphone
    }

    #[must_use]
    pub fn camera(&self) -> &Arc<ImageCamera> {
        &self.camera
    }

    #[must_use]
    pub fn tts(&self) -> &Arc<SynchronizedTextToSpeech> {
        &self.tts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{ClientAudioSource, ClientImageSource, ConsoleOutput};

    fn chunk(value: i16, end_of_stream: bool) -> AudioChunk {
        AudioChunk {
            samples: vec![value; 4],
            end_of_stream,
        }
    }

    #[tokio::test]
    async fn test_microphone_drops_audio_while_muted() {
        let resources = Arc::new(ResourceCoordinator::new());
        let source = Arc::new(ClientAudioSource::new(16_000, 1));
        let microphone = SynchronizedMicrophone::new(source.clone(), Arc::clone(&resources));

        let tts_guard = resources.try_acquire(MICROPHONE, TTS_HOLDER).unwrap();
        source.push(chunk(1, false));
        let listening = tokio::spawn(async move { microphone.listen().await });
        tokio::time::sleep(Duration::from_millis(20)).await;
        drop(tts_guard);
        source.push(chunk(2, true));

        let heard = listening.await.unwrap().unwrap();
        assert_eq!(heard.samples, vec![2; 4]);
        assert!(heard.end_of_stream);
        assert_eq!(resources.held_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_camera_respects_rate() {
        let resources = Arc::new(ResourceCoordinator::new());
        let source = Arc::new(ClientImageSource::new());
        let camera = ImageCamera::new(source.clone(), resources, Duration::from_secs(1));
        let image = |w: u32| ImageData {
            width: w,
            height: 1,
            data: vec![0; w as usize * 3],
        };

        source.push(image(1)).unwrap();
        assert_eq!(camera.capture().await.unwrap().width, 1);

        // Too soon, dropped; the next one after the interval is taken.
        source.push(image(2)).unwrap();
        assert!(tokio::time::timeout(Duration::from_millis(10), camera.capture())
            .await
            .is_err());
        tokio::time::advance(Duration::from_millis(1500)).await;
        source.push(image(3)).unwrap();
        assert_eq!(camera.capture().await.unwrap().width, 3);
    }

    #[tokio::test]
    async fn test_tts_mutes_microphone_while_speaking() {
        let resources = Arc::new(ResourceCoordinator::new());
        let output = Arc::new(ConsoleOutput::new());
        let tts = SynchronizedTextToSpeech::new(output.clone(), Arc::clone(&resources));

        tts.say("hello").await.unwrap();
        assert_eq!(output.drain(), vec!["hello"]);
        assert!(!resources.is_held(MICROPHONE));
    }

    #[tokio::test]
    async fn test_tts_times_out_when_microphone_is_held() {
        let resources = Arc::new(ResourceCoordinator::new());
        let output = Arc::new(ConsoleOutput::new());
        let tts = SynchronizedTextToSpeech::new(output.clone(), Arc::clone(&resources))
            .with_timeout(Duration::from_millis(20));

        let _held = resources.try_acquire(MICROPHONE, "someone").unwrap();
        assert!(matches!(
            tts.say("hello").await,
            Err(ResourceError::Timeout { .. })
        ));
        assert!(output.drain().is_empty());
    }
}
