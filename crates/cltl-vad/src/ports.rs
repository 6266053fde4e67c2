//! Driven port for the per-frame speech decision.

/// Decides whether a single audio frame contains speech.
pub trait VoiceActivityDetector: Send + Sync {
    fn is_speech(&self, samples: &[i16], sampling_rate: u32) -> bool;
}
