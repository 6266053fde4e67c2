//! # Host Control API
//!
//! The endpoint a remote client talks to: it pushes microphone audio and
//! camera images, and collects what the agent says.
//!
//! | Method | Path | |
//! |--------|------|-|
//! | GET | `/` | health |
//! | GET | `/info` | audio and video parameters |
//! | POST | `/mic` | `{"samples": [..], "end_of_stream": bool}` |
//! | POST | `/video` | `{"width": w, "height": h, "data": [..]}` (RGB) |
//! | GET | `/text` | text spoken since the last call |

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use shared_config::{ConfigError, ConfigurationSource};
use shared_types::ImageData;
use tracing::debug;

use crate::config::{AudioConfig, VideoConfig};
use crate::source::{AudioChunk, ClientAudioSource, ClientImageSource, ConsoleOutput};

#[derive(Debug, Deserialize)]
struct MicRequest {
    samples: Vec<i16>,
    #[serde(default)]
    end_of_stream: bool,
}

pub struct BackendServer {
    state: HostState,
}

#[derive(Clone)]
struct HostState {
    audio: AudioConfig,
    video: VideoConfig,
    audio_source: Arc<ClientAudioSource>,
    image_source: Arc<ClientImageSource>,
    output: Arc<ConsoleOutput>,
}

impl BackendServer {
    pub fn new(
        audio: AudioConfig,
        video: VideoConfig,
        audio_source: Arc<ClientAudioSource>,
        image_source: Arc<ClientImageSource>,
        output: Arc<ConsoleOutput>,
    ) -> Self {
        Self {
            state: HostState {
                audio,
                video,
                audio_source,
                image_source,
                output,
            },
        }
    }

    pub fn from_config(
        config: &ConfigurationSource,
        audio_source: Arc<ClientAudioSource>,
        image_source: Arc<ClientImageSource>,
        output: Arc<ConsoleOutput>,
    ) -> Result<Self, ConfigError> {
        Ok(Self::new(
            AudioConfig::from_config(config)?,
            VideoConfig::from_config(config)?,
            audio_source,
            image_source,
            output,
        ))
    }

    pub fn app(&self) -> Router {
        Router::new()
            .route("/", get(health))
            .route("/info", get(info))
            .route("/mic", post(push_audio))
            .route("/video", post(push_image))
            .route("/text", get(spoken_text))
            .with_state(self.state.clone())
    }
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn info(State(state): State<HostState>) -> impl IntoResponse {
    let (width, height) = state.video.resolution.dimensions().unzip();
    Json(serde_json::json!({
        "audio": state.audio,
        "video": {
            "resolution": state.video.resolution,
            "width": width,
            "height": height,
            "camera_index": state.video.camera_index,
        },
    }))
}

async fn push_audio(
    State(state): State<HostState>,
    Json(request): Json<MicRequest>,
) -> impl IntoResponse {
    let channels = usize::from(state.audio.channels.max(1));
    if request.samples.len() % channels != 0 {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "error": format!("sample count must be a multiple of {channels} channels"),
            })),
        );
    }

    let accepted = request.samples.len();
    debug!(samples = accepted, end_of_stream = request.end_of_stream, "[host] Audio received");
    state.audio_source.push(AudioChunk {
        samples: request.samples,
        end_of_stream: request.end_of_stream,
    });
    (
        StatusCode::ACCEPTED,
        Json(serde_json::json!({ "accepted": accepted })),
    )
}

async fn push_image(
    State(state): State<HostState>,
    Json(image): Json<ImageData>,
) -> impl IntoResponse {
    let (width, height) = (image.width, image.height);
    match state.image_source.push(image) {
        Ok(()) => {
            debug!(width, height, "[host] Image received");
            (
                StatusCode::ACCEPTED,
                Json(serde_json::json!({ "width": width, "height": height })),
            )
        }
        Err(e) => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": e.to_string() })),
        ),
    }
}

async fn spoken_text(State(state): State<HostState>) -> impl IntoResponse {
    Json(state.output.drain())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CameraResolution;
    use crate::source::AudioSource;
    use crate::source::TextOutput;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    fn server() -> (BackendServer, Arc<ClientAudioSource>, Arc<ConsoleOutput>) {
        let audio_source = Arc::new(ClientAudioSource::new(16_000, 2));
        let output = Arc::new(ConsoleOutput::new());
        let server = BackendServer::new(
            AudioConfig {
                sampling_rate: 16_000,
                channels: 2,
                frame_size: 480,
            },
            VideoConfig {
                resolution: CameraResolution::Qvga,
                camera_index: 0,
            },
            Arc::clone(&audio_source),
            Arc::new(ClientImageSource::new()),
            Arc::clone(&output),
        );
        (server, audio_source, output)
    }

    fn post(uri: &str, body: &str) -> Request<Body> {
        Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_info_reports_parameters() {
        let (server, ..) = server();
        let response = server
            .app()
            .oneshot(Request::get("/info").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = json(response).await;
        assert_eq!(body["audio"]["sampling_rate"], 16_000);
        assert_eq!(body["video"]["resolution"], "QVGA");
        assert_eq!(body["video"]["width"], 320);
    }

    #[tokio::test]
    async fn test_mic_pushes_to_audio_source() {
        let (server, source, _) = server();
        let response = server
            .app()
            .oneshot(post("/mic", r#"{"samples": [1, 2, 3, 4], "end_of_stream": true}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);

        let chunk = source.next_chunk().await.unwrap();
        assert_eq!(chunk.samples, vec![1, 2, 3, 4]);
        assert!(chunk.end_of_stream);

        let response = server
            .app()
            .oneshot(post("/mic", r#"{"samples": [1, 2, 3]}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_video_rejects_bad_buffer() {
        let (server, ..) = server();
        let response = server
            .app()
            .oneshot(post("/video", r#"{"width": 2, "height": 1, "data": [0, 0, 0]}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = server
            .app()
            .oneshot(post(
                "/video",
                r#"{"width": 4294967295, "height": 4294967295, "data": []}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(json(response).await["error"]
            .as_str()
            .is_some_and(|e| e.contains("too large")));
    }

    #[tokio::test]
    async fn test_text_drains_spoken_output() {
        let (server, _, output) = server();
        output.consume("Hello");
        let response = server
            .app()
            .oneshot(Request::get("/text").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(json(response).await, serde_json::json!(["Hello"]));
        assert!(output.drain().is_empty());
    }
}
