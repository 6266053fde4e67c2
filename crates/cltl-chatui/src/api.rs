//! # Chat UI HTTP API
//!
//! | Method | Path | |
//! |--------|------|-|
//! | GET | `/` | agent name |
//! | GET | `/chat/:id?from=N` | utterances of a chat |
//! | POST | `/chat/:id` | `{"text": ..}`, recorded and published |

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use shared_bus::Publisher;
use shared_types::{TextSignalEvent, Topic};
use tracing::{debug, warn};

use crate::domain::{Chats, Utterance};

/// Speaker recorded for utterances posted through the API.
pub const USER_SPEAKER: &str = "user";

#[derive(Clone)]
pub(crate) struct ChatApiState {
    pub(crate) chats: Arc<dyn Chats>,
    pub(crate) publisher: Publisher,
    pub(crate) agent: Arc<str>,
    pub(crate) utterance_topic: Topic,
}

#[derive(Debug, Deserialize)]
struct FromQuery {
    from: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct PostUtterance {
    text: String,
    speaker: Option<String>,
}

pub(crate) fn router(state: ChatApiState) -> Router {
    Router::new()
        .route("/", get(agent_info))
        .route("/chat/:chat_id", get(get_chat).post(post_utterance))
        .with_state(state)
}

async fn agent_info(State(state): State<ChatApiState>) -> impl IntoResponse {
    Json(serde_json::json!({ "agent": &*state.agent }))
}

async fn get_chat(
    State(state): State<ChatApiState>,
    Path(chat_id): Path<String>,
    Query(query): Query<FromQuery>,
) -> impl IntoResponse {
    Json(state.chats.utterances(&chat_id, query.from.unwrap_or(0)))
}

async fn post_utterance(
    State(state): State<ChatApiState>,
    Path(chat_id): Path<String>,
    Json(body): Json<PostUtterance>,
) -> impl IntoResponse {
    let text = body.text.trim();
    if text.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "empty utterance" })),
        );
    }

    let speaker = body.speaker.as_deref().unwrap_or(USER_SPEAKER);
    let utterance = Utterance::new(&chat_id, speaker, text);
    state.chats.append(utterance.clone());
    debug!(chat = %chat_id, speaker, "[chatui] Utterance received");

    match state
        .publisher
        .publish(state.utterance_topic, TextSignalEvent::for_text(text))
    {
        Ok(_) => (StatusCode::OK, Json(serde_json::json!(utterance))),
        Err(e) => {
            warn!(error = %e, "[chatui] Failed to publish utterance");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": e.to_string() })),
            )
        }
    }
}
