//! # Signal Sources and Sinks
//!
//! Client sources receive audio and images pushed by a remote client over the
//! host API. [`ConsoleOutput`] is where the text-to-speech ends up.

use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::ImageData;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::error::BackendError;

/// A chunk of interleaved audio pushed by a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioChunk {
    pub samples: Vec<i16>,
    /// Closes the current audio signal.
    pub end_of_stream: bool,
}

#[async_trait]
pub trait AudioSource: Send + Sync {
    /// Next chunk, or `None` once the source is closed.
    async fn next_chunk(&self) -> Option<AudioChunk>;

    fn sampling_rate(&self) -> u32;

    fn channels(&self) -> u16;
}

#[async_trait]
pub trait ImageSource: Send + Sync {
    /// Next image, or `None` once the source is closed.
    async fn next_image(&self) -> Option<ImageData>;
}

pub trait TextOutput: Send + Sync {
    fn consume(&self, text: &str);
}

// =============================================================================
// CLIENT SOURCES
// =============================================================================

/// Audio pushed through [`ClientAudioSource::push`].
pub struct ClientAudioSource {
    sampling_rate: u32,
    channels: u16,
    tx: mpsc::UnboundedSender<AudioChunk>,
    rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<AudioChunk>>,
}

impl ClientAudioSource {
    #[must_use]
    pub fn new(sampling_rate: u32, channels: u16) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            sampling_rate,
            channels,
            tx,
            rx: tokio::sync::Mutex::new(rx),
        }
    }

    pub fn push(&self, chunk: AudioChunk) {
        // The receiver lives as long as `self`.
        let _ = self.tx.send(chunk);
    }
}

#[async_trait]
impl AudioSource for ClientAudioSource {
    async fn next_chunk(&self) -> Option<AudioChunk> {
        self.rx.lock().await.recv().await
    }

    fn sampling_rate(&self) -> u32 {
        self.sampling_rate
    }

    fn channels(&self) -> u16 {
        self.channels
    }
}

/// Images pushed through [`ClientImageSource::push`].
pub struct ClientImageSource {
    tx: mpsc::UnboundedSender<ImageData>,
    rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<ImageData>>,
}

impl Default for ClientImageSource {
    fn default() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx: tokio::sync::Mutex::new(rx),
        }
    }
}

impl ClientImageSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an RGB image; rejects buffers that do not match the dimensions.
    pub fn push(&self, image: ImageData) -> Result<(), BackendError> {
        let expected = (image.width as usize)
            .checked_mul(image.height as usize)
            .and_then(|pixels| pixels.checked_mul(3))
            .ok_or(BackendError::ImageTooLarge {
                width: image.width,
                height: image.height,
            })?;
        if image.data.len() != expected {
            return Err(BackendError::InvalidImage {
                width: image.width,
                height: image.height,
                expected,
                actual: image.data.len(),
            });
        }
        let _ = self.tx.send(image);
        Ok(())
    }
}

#[async_trait]
impl ImageSource for ClientImageSource {
    async fn next_image(&self) -> Option<ImageData> {
        self.rx.lock().await.recv().await
    }
}

// =============================================================================
// TEXT OUTPUT
// =============================================================================

/// Uncollected lines kept by a [`ConsoleOutput`] by default.
pub const SPOKEN_CAPACITY: usize = 256;

/// Logs spoken text and keeps the most recent lines until a client collects
/// them.
#[derive(Debug)]
pub struct ConsoleOutput {
    spoken: Mutex<VecDeque<String>>,
    capacity: usize,
}

impl Default for ConsoleOutput {
    fn default() -> Self {
        Self::with_capacity(SPOKEN_CAPACITY)
    }
}

impl ConsoleOutput {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep at most `capacity` uncollected lines; older ones are dropped.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            spoken: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    /// Take everything spoken since the last call, oldest first.
    pub fn drain(&self) -> Vec<String> {
        self.spoken.lock().drain(..).collect()
    }
}

impl TextOutput for ConsoleOutput {
    fn consume(&self, text: &str) {
        info!(text, "[backend] Say");
        let mut spoken = self.spoken.lock();
        if spoken.len() == self.capacity {
            if let Some(dropped) = spoken.pop_front() {
                warn!(dropped = %dropped, capacity = self.capacity, "[backend] Spoken text not collected, dropping oldest");
            }
        }
        spoken.push_back(text.to_string());
    }
}
