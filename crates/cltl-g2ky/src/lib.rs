//! # CLTL G2KY - Get To Know You
//!
//! Learns the names of the people the agent sees.
//!
//! ```text
//! cltl.topic.face_id ──┐
//!                      ├──▶ GetToKnowYou ──TextSignalEvent──▶ cltl.topic.text_out
//! cltl.topic.text_in ──┘
//! ```
//!
//! An unknown face is asked for its name; the next utterance is taken as
//! the answer. Known faces are greeted by name once per appearance.

pub mod config;
pub mod domain;
pub mod error;
pub mod service;

pub use config::G2kyConfig;
pub use domain::{GetToKnowYou, MemoryGetToKnowYou};
pub use error::G2kyError;
pub use service::GetToKnowYouService;
