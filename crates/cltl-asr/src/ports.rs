//! Driven port for the speech model.

use async_trait::async_trait;

use crate::error::AsrError;

/// Turns mono 16-bit PCM into text.
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, samples: &[i16], sampling_rate: u32) -> Result<String, AsrError>;
}
