//! # CLTL Chat UI
//!
//! A minimal chat front end for the agent.
//!
//! ```text
//! POST /chat/{id} ──▶ Chats ──TextSignalEvent──▶ cltl.topic.text_in
//!                      ▲
//! cltl.topic.text_out ─┘   (agent responses, appended to the current chat)
//! ```

pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod service;

pub use config::ChatUiConfig;
pub use domain::{Chats, MemoryChats, Utterance};
pub use error::ChatUiError;
pub use service::ChatUiService;
