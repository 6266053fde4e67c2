//! # Signal Payloads
//!
//! Payload types carried by bus events, one per topic family.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::event::current_millis;

// =============================================================================
// AUDIO
// =============================================================================

/// One audio frame of a microphone signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioSignalEvent {
    /// Identifier of the audio signal this frame belongs to.
    pub signal_id: String,
    /// Zero-based position of the frame within the signal.
    pub frame_index: u64,
    pub sampling_rate: u32,
    pub channels: u16,
    /// Interleaved 16-bit PCM samples.
    pub samples: Vec<i16>,
    /// Whether this is the final frame of the signal.
    pub is_last: bool,
}

/// A detected voice segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VadEvent {
    /// Audio signal the segment was cut from.
    pub signal_id: String,
    pub segment_id: String,
    /// First frame (inclusive) of the segment.
    pub start_frame: u64,
    /// Last frame (exclusive) of the segment.
    pub end_frame: u64,
    pub sampling_rate: u32,
    pub samples: Vec<i16>,
}

impl VadEvent {
    /// Segment duration in milliseconds.
    #[must_use]
    pub fn duration_ms(&self) -> u64 {
        if self.sampling_rate == 0 {
            return 0;
        }
        self.samples.len() as u64 * 1000 / u64::from(self.sampling_rate)
    }
}

// =============================================================================
// IMAGES & FACES
// =============================================================================

/// Raw image data (row-major RGB bytes).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

/// An image captured by the camera.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSignalEvent {
    pub signal_id: String,
    pub image: ImageData,
}

/// Pixel bounds `[x0, y0, x1, y1]` of a detected face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

/// A face found in an image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Face {
    pub bounds: Bounds,
    pub embedding: Vec<f32>,
}

/// All faces detected in one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceDetectionEvent {
    /// Image signal the faces were detected in.
    pub signal_id: String,
    pub faces: Vec<Face>,
}

/// The embedding of a single face, ready for identity assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceRecognitionEvent {
    pub signal_id: String,
    pub face_index: usize,
    pub embedding: Vec<f32>,
}

/// The identity assigned to a face.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceIdEvent {
    pub signal_id: String,
    pub face_index: usize,
    pub identity: String,
}

// =============================================================================
// TEXT
// =============================================================================

/// A piece of text, spoken or typed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSignal {
    pub id: String,
    pub text: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
}

impl TextSignal {
    /// Create a signal with a fresh id stamped with the current time.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            text: text.into(),
            timestamp: current_millis(),
        }
    }
}

/// Payload of the text topics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSignalEvent {
    pub signal: TextSignal,
}

impl TextSignalEvent {
    pub fn for_text(text: impl Into<String>) -> Self {
        Self {
            signal: TextSignal::new(text),
        }
    }

    /// The carried text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.signal.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vad_duration() {
        let event = VadEvent {
            signal_id: "s".into(),
            segment_id: "v".into(),
            start_frame: 0,
            end_frame: 10,
            sampling_rate: 16_000,
            samples: vec![0; 8_000],
        };
        assert_eq!(event.duration_ms(), 500);
    }

    #[test]
    fn test_text_signals_get_distinct_ids() {
        let a = TextSignal::new("hello");
        let b = TextSignal::new("hello");
        assert_ne!(a.id, b.id);
        assert_eq!(a.text, "hello");
    }

    #[test]
    fn test_text_event_json_has_text_field() {
        let event = TextSignalEvent::for_text("hi");
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["signal"]["text"], "hi");
    }
}
