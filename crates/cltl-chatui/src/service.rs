//! # Chat UI Service
//!
//! Records agent responses into the current chat and serves the chat API.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use shared_bus::{EventProcessor, HandlerError, InMemoryEventBus, ServiceRuntime};
use shared_config::ConfigurationSource;
use shared_types::{Event, Payload};
use tracing::{debug, info};

use crate::api::{self, ChatApiState};
use crate::config::ChatUiConfig;
use crate::domain::{Chats, Utterance};
use crate::error::ChatUiError;

pub const SERVICE_NAME: &str = "chatui";

struct ResponseProcessor {
    chats: Arc<dyn Chats>,
    agent: Arc<str>,
}

#[async_trait]
impl EventProcessor for ResponseProcessor {
    async fn process(&self, event: Event) -> Result<(), HandlerError> {
        let Payload::Text(text) = event.payload() else {
            return Err(HandlerError::new(format!(
                "expected text on {}, got {}",
                event.topic(),
                event.payload()
            )));
        };

        match self.chats.current_chat() {
            Some(chat_id) => {
                self.chats
                    .append(Utterance::new(&chat_id, &self.agent, text.text()));
            }
            None => debug!(text = text.text(), "[chatui] No open chat, response dropped"),
        }
        Ok(())
    }
}

/// Bus-facing chat UI service.
pub struct ChatUiService {
    config: ChatUiConfig,
    runtime: ServiceRuntime,
    chats: Arc<dyn Chats>,
    processor: Arc<ResponseProcessor>,
}

impl ChatUiService {
    pub fn new(chats: Arc<dyn Chats>, bus: Arc<InMemoryEventBus>, config: ChatUiConfig) -> Self {
        let runtime = ServiceRuntime::new(SERVICE_NAME, bus);
        let processor = Arc::new(ResponseProcessor {
            chats: Arc::clone(&chats),
            agent: Arc::from(config.name.as_str()),
        });
        Self {
            config,
            runtime,
            chats,
            processor,
        }
    }

    pub fn from_config(
        chats: Arc<dyn Chats>,
        bus: Arc<InMemoryEventBus>,
        config: &ConfigurationSource,
    ) -> Result<Self, ChatUiError> {
        Ok(Self::new(chats, bus, ChatUiConfig::from_config(config)?))
    }

    #[must_use]
    pub fn config(&self) -> &ChatUiConfig {
        &self.config
    }

    #[must_use]
    pub fn chats(&self) -> &Arc<dyn Chats> {
        &self.chats
    }

    /// The chat HTTP application, mounted by the web gateway.
    pub fn app(&self) -> Router {
        api::router(ChatApiState {
            chats: Arc::clone(&self.chats),
            publisher: self.runtime.publisher(),
            agent: Arc::clone(&self.processor.agent),
            utterance_topic: self.config.utterance_topic,
        })
    }

    pub fn start(&self) -> Result<(), ChatUiError> {
        if self.runtime.is_running() {
            return Err(ChatUiError::AlreadyRunning);
        }
        self.runtime
            .consume(&[self.config.response_topic], Arc::clone(&self.processor));
        info!(agent = %self.config.name, "[chatui] Started");
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
