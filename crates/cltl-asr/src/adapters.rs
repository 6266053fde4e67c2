//! HTTP adapter for a remote speech model server.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AsrError;
use crate::ports::Transcriber;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Serialize)]
struct TranscribeRequest<'a> {
    model: &'a str,
    sampling_rate: u32,
    samples: &'a [i16],
}

#[derive(Deserialize)]
struct TranscribeResponse {
    text: String,
}

/// Posts segments to `{url}/transcribe` and reads back `{"text": ...}`.
pub struct RemoteAsr {
    client: Client,
    url: String,
    model: String,
}

impl RemoteAsr {
    pub fn new(url: impl Into<String>, model: impl Into<String>) -> Result<Self, AsrError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            url: url.into(),
            model: model.into(),
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> String {
        format!("{}/transcribe", self.url)
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl Transcriber for RemoteAsr {
    async fn transcribe(&self, samples: &[i16], sampling_rate: u32) -> Result<String, AsrError> {
        let request = TranscribeRequest {
            model: &self.model,
            sampling_rate,
            samples,
        };
        let response = self.client.post(self.endpoint()).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AsrError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let transcript: TranscribeResponse = response.json().await?;
        debug!(chars = transcript.text.len(), "[asr] Received transcript");
        Ok(transcript.text)
    }
}
