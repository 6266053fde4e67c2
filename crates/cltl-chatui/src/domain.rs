//! # Chat Store

use std::collections::HashMap;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use shared_types::current_millis;
use uuid::Uuid;

/// One line in a chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utterance {
    pub id: String,
    pub chat_id: String,
    pub speaker: String,
    pub text: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
}

impl Utterance {
    pub fn new(chat_id: &str, speaker: &str, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            chat_id: chat_id.to_string(),
            speaker: speaker.to_string(),
            text: text.into(),
            timestamp: current_millis(),
        }
    }
}

/// Storage for chat transcripts.
pub trait Chats: Send + Sync {
    /// Append `utterance` to its chat, which becomes the current chat.
    fn append(&self, utterance: Utterance);

    /// Utterances of `chat_id`, starting at index `from`.
    fn utterances(&self, chat_id: &str, from: usize) -> Vec<Utterance>;

    /// The chat most recently written to.
    fn current_chat(&self) -> Option<String>;
}

#[derive(Debug, Default)]
struct ChatState {
    chats: HashMap<String, Vec<Utterance>>,
    current: Option<String>,
}

/// In-memory chat transcripts.
#[derive(Debug, Default)]
pub struct MemoryChats {
    state: RwLock<ChatState>,
}

impl MemoryChats {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn chat_count(&self) -> usize {
        self.state.read().chats.len()
    }
}

impl Chats for MemoryChats {
    fn append(&self, utterance: Utterance) {
        let mut state = self.state.write();
        state.current = Some(utterance.chat_id.clone());
        state
            .chats
            .entry(utterance.chat_id.clone())
            .or_default()
            .push(utterance);
    }

    fn utterances(&self, chat_id: &str, from: usize) -> Vec<Utterance> {
        self.state
            .read()
            .chats
            .get(chat_id)
            .map(|chat| chat.iter().skip(from).cloned().collect())
            .unwrap_or_default()
    }

    fn current_chat(&self) -> Option<String> {
        self.state.read().current.clone()
    }
}
