//! # Speech Flow
//!
//! ```text
//! POST /host/mic ──▶ ClientAudioSource ──▶ microphone ──▶ cltl.topic.microphone
//!                                              │                  │
//!                                              ▼                  ▼
//!                                        audio storage       VAD ──▶ cltl.topic.vad
//! ```

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use parking_lot::Mutex;
    use serde_json::json;
    use shared_types::{Event, Payload, Topic, VadEvent};

    use crate::integration::support::{eventually, get_json, post_json, started};

    /// Frame size in the default configuration.
    const FRAME: usize = 480;

    fn loud(frames: usize) -> Vec<i16> {
        (0..frames * FRAME)
            .map(|i| if i % 2 == 0 { 8_000 } else { -8_000 })
            .collect()
    }

    fn record_segments(bus: &shared_bus::InMemoryEventBus) -> Arc<Mutex<Vec<VadEvent>>> {
        let segments: Arc<Mutex<Vec<VadEvent>>> = Arc::default();
        let sink = Arc::clone(&segments);
        bus.subscribe(Topic::Vad, move |event: &Event| {
            if let Payload::Vad(segment) = event.payload() {
                sink.lock().push(segment.clone());
            }
            Ok(())
        });
        segments
    }

    #[tokio::test]
    async fn test_mic_audio_reaches_vad_and_storage() {
        let (app, router) = started().await;
        let segments = record_segments(app.bus());

        let (status, body) = post_json(
            &router,
            "/host/mic",
            json!({ "samples": loud(10), "end_of_stream": true }),
        )
        .await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(body["accepted"], 10 * FRAME);

        let segment = eventually(|| {
            let first = segments.lock().first().cloned();
            async move { first }
        })
        .await;
        assert_eq!((segment.start_frame, segment.end_frame), (0, 10));
        assert_eq!(segment.samples.len(), 10 * FRAME);

        let (status, stored) =
            get_json(&router, &format!("/storage/audio/{}", segment.signal_id)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(stored["samples"].as_array().map(Vec::len), Some(10 * FRAME));
        assert_eq!(stored["sampling_rate"], 16_000);

        app.stop().await;
    }

    #[tokio::test]
    async fn test_chunks_until_end_of_stream_form_one_signal() {
        let (app, router) = started().await;
        let segments = record_segments(app.bus());

        for end_of_stream in [false, true] {
            let (status, _) = post_json(
                &router,
                "/host/mic",
                json!({ "samples": loud(5), "end_of_stream": end_of_stream }),
            )
            .await;
            assert_eq!(status, StatusCode::ACCEPTED);
        }

        let segment = eventually(|| {
            let first = segments.lock().first().cloned();
            async move { first }
        })
        .await;
        assert_eq!((segment.start_frame, segment.end_frame), (0, 10));
        assert_eq!(segments.lock().len(), 1);

        app.stop().await;
    }

    #[tokio::test]
    async fn test_unknown_signal_is_not_found() {
        let (app, router) = started().await;

        let (status, body) = get_json(&router, "/storage/audio/missing").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].is_string());

        app.stop().await;
    }
}
