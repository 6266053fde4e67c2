//! # Event Envelope
//!
//! An [`Event`] is the unit of delivery on the bus: metadata plus a shared,
//! immutable [`Payload`].

use std::fmt;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::signals::{
    AudioSignalEvent, FaceDetectionEvent, FaceIdEvent, FaceRecognitionEvent, ImageSignalEvent,
    TextSignalEvent, VadEvent,
};
use crate::topic::Topic;

/// Milliseconds since the Unix epoch (0 if the clock is before it).
#[must_use]
pub fn current_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

/// Envelope metadata attached at publish time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMetadata {
    pub id: Uuid,
    pub topic: Topic,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
    /// Name of the publishing service.
    pub source: String,
}

/// Discriminant of [`Payload`], used to check topic compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayloadKind {
    Audio,
    Image,
    Vad,
    FaceDetection,
    FaceRecognition,
    FaceId,
    Text,
}

/// Every payload that can travel over the bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Payload {
    Audio(AudioSignalEvent),
    Image(ImageSignalEvent),
    Vad(VadEvent),
    FaceDetection(FaceDetectionEvent),
    FaceRecognition(FaceRecognitionEvent),
    FaceId(FaceIdEvent),
    Text(TextSignalEvent),
}

impl Payload {
    #[must_use]
    pub fn kind(&self) -> PayloadKind {
        match self {
            Self::Audio(_) => PayloadKind::Audio,
            Self::Image(_) => PayloadKind::Image,
            Self::Vad(_) => PayloadKind::Vad,
            Self::FaceDetection(_) => PayloadKind::FaceDetection,
            Self::FaceRecognition(_) => PayloadKind::FaceRecognition,
            Self::FaceId(_) => PayloadKind::FaceId,
            Self::Text(_) => PayloadKind::Text,
        }
    }

    /// The text event, if this is a text payload.
    #[must_use]
    pub fn as_text(&self) -> Option<&TextSignalEvent> {
        match self {
            Self::Text(event) => Some(event),
            _ => None,
        }
    }
}

/// Short human-readable form; sample and pixel buffers are summarised.
impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Audio(a) => write!(
                f,
                "audio signal={} frame={} samples={} last={}",
                a.signal_id,
                a.frame_index,
                a.samples.len(),
                a.is_last
            ),
            Self::Image(i) => write!(
                f,
                "image signal={} {}x{}",
                i.signal_id, i.image.width, i.image.height
            ),
            Self::Vad(v) => write!(
                f,
                "vad signal={} segment={} frames={}..{}",
                v.signal_id, v.segment_id, v.start_frame, v.end_frame
            ),
            Self::FaceDetection(d) => {
                write!(f, "faces signal={} count={}", d.signal_id, d.faces.len())
            }
            Self::FaceRecognition(r) => write!(
                f,
                "face signal={} index={} dims={}",
                r.signal_id,
                r.face_index,
                r.embedding.len()
            ),
            Self::FaceId(i) => write!(
                f,
                "face_id signal={} index={} identity={}",
                i.signal_id, i.face_index, i.identity
            ),
            Self::Text(t) => write!(f, "text \"{}\"", t.signal.text),
        }
    }
}

macro_rules! impl_payload_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Payload {
                fn from(value: $ty) -> Self {
                    Payload::$variant(value)
                }
            }
        )*
    };
}

impl_payload_from! {
    AudioSignalEvent => Audio,
    ImageSignalEvent => Image,
    VadEvent => Vad,
    FaceDetectionEvent => FaceDetection,
    FaceRecognitionEvent => FaceRecognition,
    FaceIdEvent => FaceId,
    TextSignalEvent => Text,
}

/// A published event. Cloning shares the payload.
#[derive(Debug, Clone)]
pub struct Event {
    metadata: EventMetadata,
    payload: Arc<Payload>,
}

impl Event {
    /// Wrap `payload` for publication on `topic`.
    pub fn new(topic: Topic, source: impl Into<String>, payload: impl Into<Payload>) -> Self {
        Self {
            metadata: EventMetadata {
                id: Uuid::new_v4(),
                topic,
                timestamp: current_millis(),
                source: source.into(),
            },
            payload: Arc::new(payload.into()),
        }
    }

    #[must_use]
    pub fn topic(&self) -> Topic {
        self.metadata.topic
    }

    #[must_use]
    pub fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }

    #[must_use]
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Whether two events share the same payload allocation.
    #[must_use]
    pub fn shares_payload_with(&self, other: &Event) -> bool {
        Arc::ptr_eq(&self.payload, &other.payload)
    }
}
