//! # VAD Domain
//!
//! Frame classification and segmentation. No I/O.

use std::collections::HashMap;
use std::sync::Arc;

use shared_types::{AudioSignalEvent, VadEvent};
use tracing::debug;
use uuid::Uuid;

use crate::ports::VoiceActivityDetector;

/// Classifies frames by their RMS energy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergyDetector {
    threshold: f64,
}

impl EnergyDetector {
    #[must_use]
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// RMS of `samples` as a fraction of full scale.
    #[must_use]
    pub fn rms(samples: &[i16]) -> f64 {
        if samples.is_empty() {
            return 0.0;
        }
        let sum_sq: f64 = samples
            .iter()
            .map(|&s| {
                let v = f64::from(s) / f64::from(i16::MAX);
                v * v
            })
            .sum();
        (sum_sq / samples.len() as f64).sqrt()
    }
}

impl VoiceActivityDetector for EnergyDetector {
    fn is_speech(&self, samples: &[i16], _sampling_rate: u32) -> bool {
        Self::rms(samples) >= self.threshold
    }
}

struct OpenSegment {
    start_frame: u64,
    sampling_rate: u32,
    samples: Vec<i16>,
    /// Length of `samples` up to and including the last voiced frame.
    voiced_len: usize,
    last_voiced_frame: u64,
    silent_run: usize,
}

/// Groups consecutive voiced frames of each audio signal into segments.
///
/// A segment opens on the first voiced frame and closes once more than
/// `padding` consecutive silent frames follow, or when the signal ends.
/// Trailing silence is trimmed from the emitted segment.
pub struct SpeechSegmenter {
    detector: Arc<dyn VoiceActivityDetector>,
    padding: usize,
    min_duration_ms: u64,
    open: HashMap<String, OpenSegment>,
}

impl SpeechSegmenter {
    pub fn new(detector: Arc<dyn VoiceActivityDetector>, padding: usize, min_duration_ms: u64) -> Self {
        Self {
            detector,
            padding,
            min_duration_ms,
            open: HashMap::new(),
        }
    }

    /// Signals with a segment in progress.
    #[must_use]
    pub fn open_segments(&self) -> usize {
        self.open.len()
    }

    /// Feed one frame; returns a segment if this frame completed one.
    pub fn push(&mut self, frame: &AudioSignalEvent) -> Option<VadEvent> {
        let voiced = self.detector.is_speech(&frame.samples, frame.sampling_rate);

        let completed = match self.open.get_mut(&frame.signal_id) {
            Some(segment) => {
                segment.samples.extend_from_slice(&frame.samples);
                if voiced {
                    segment.voiced_len = segment.samples.len();
                    segment.last_voiced_frame = frame.frame_index;
                    segment.silent_run = 0;
                } else {
                    segment.silent_run += 1;
                }
                segment.silent_run > self.padding
            }
            None if voiced => {
                self.open.insert(
                    frame.signal_id.clone(),
                    OpenSegment {
                        start_frame: frame.frame_index,
                        sampling_rate: frame.sampling_rate,
                        samples: frame.samples.clone(),
                        voiced_len: frame.samples.len(),
                        last_voiced_frame: frame.frame_index,
                        silent_run: 0,
                    },
                );
                false
            }
            None => false,
        };

        if completed || frame.is_last {
            self.close(&frame.signal_id)
        } else {
            None
        }
    }

    fn close(&mut self, signal_id: &str) -> Option<VadEvent> {
        let mut segment = self.open.remove(signal_id)?;
        segment.samples.truncate(segment.voiced_len);

        let event = VadEvent {
            signal_id: signal_id.to_string(),
            segment_id: Uuid::new_v4().to_string(),
            start_frame: segment.start_frame,
            end_frame: segment.last_voiced_frame + 1,
            sampling_rate: segment.sampling_rate,
            samples: segment.samples,
        };

        if event.duration_ms() < self.min_duration_ms {
            debug!(
                signal = signal_id,
                duration_ms = event.duration_ms(),
                "[vad] Discarding short segment"
            );
            return None;
        }
        Some(event)
    }
}
