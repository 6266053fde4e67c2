//! # Bus Topics
//!
//! The fixed, pre-declared set of hierarchical topic names.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::event::PayloadKind;

/// Raised when a topic name is not part of the [`Topic`] enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown topic: {0}")]
pub struct UnknownTopic(pub String);

/// Every topic the bus knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Topic {
    /// Raw audio frames captured by the backend microphone.
    #[serde(rename = "cltl.topic.microphone")]
    Microphone,
    /// Images captured by the backend camera.
    #[serde(rename = "cltl.topic.image")]
    Image,
    /// Voice-activity segments.
    #[serde(rename = "cltl.topic.vad")]
    Vad,
    /// Face detections per image.
    #[serde(rename = "cltl.topic.face")]
    Face,
    /// Per-face embeddings.
    #[serde(rename = "cltl.topic.face_recognition")]
    FaceRecognition,
    /// Identities assigned to faces.
    #[serde(rename = "cltl.topic.face_id")]
    FaceId,
    /// Text coming into the agent (transcripts, chat input).
    #[serde(rename = "cltl.topic.text_in")]
    TextIn,
    /// Text produced by the agent.
    #[serde(rename = "cltl.topic.text_out")]
    TextOut,
}

impl Topic {
    /// All topics, in declaration order.
    pub const ALL: [Topic; 8] = [
        Topic::Microphone,
        Topic::Image,
        Topic::Vad,
        Topic::Face,
        Topic::FaceRecognition,
        Topic::FaceId,
        Topic::TextIn,
        Topic::TextOut,
    ];

    /// The dot-separated topic name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Microphone => "cltl.topic.microphone",
            Self::Image => "cltl.topic.image",
            Self::Vad => "cltl.topic.vad",
            Self::Face => "cltl.topic.face",
            Self::FaceRecognition => "cltl.topic.face_recognition",
            Self::FaceId => "cltl.topic.face_id",
            Self::TextIn => "cltl.topic.text_in",
            Self::TextOut => "cltl.topic.text_out",
        }
    }

    /// The only payload kind accepted on this topic.
    #[must_use]
    pub fn payload_kind(&self) -> PayloadKind {
        match self {
            Self::Microphone => PayloadKind::Audio,
            Self::Image => PayloadKind::Image,
            Self::Vad => PayloadKind::Vad,
            Self::Face => PayloadKind::FaceDetection,
            Self::FaceRecognition => PayloadKind::FaceRecognition,
            Self::FaceId => PayloadKind::FaceId,
            Self::TextIn | Self::TextOut => PayloadKind::Text,
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Topic {
    type Err = UnknownTopic;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|topic| topic.as_str() == s.trim())
            .ok_or_else(|| UnknownTopic(s.to_string()))
    }
}
