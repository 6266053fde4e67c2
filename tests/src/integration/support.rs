//! Application fixture and HTTP helpers.

use std::future::Future;
use std::time::Duration;

use app_runtime::ApplicationContainer;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use shared_config::ConfigurationSource;
use tower::ServiceExt;

pub const DEFAULT_CONFIG: &str = include_str!("../../../config/default.toml");

const POLL_INTERVAL: Duration = Duration::from_millis(10);
const POLL_TIMEOUT: Duration = Duration::from_secs(5);

pub fn application(config: &str) -> ApplicationContainer {
    ApplicationContainer::new(ConfigurationSource::parse(config).unwrap())
}

/// A started application and its gateway router.
pub async fn started() -> (ApplicationContainer, Router) {
    let app = application(DEFAULT_CONFIG);
    app.start().await.unwrap();
    let router = app.web_gateway().unwrap().into_router();
    (app, router)
}

pub async fn get_json(router: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::get(uri).body(Body::empty()).unwrap();
    send(router, request).await
}

pub async fn post_json(router: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(router, request).await
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

/// Poll `check` until it yields a value, panicking after a few seconds.
pub async fn eventually<T, F, Fut>(mut check: F) -> T
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Option<T>>,
{
    let deadline = tokio::time::Instant::now() + POLL_TIMEOUT;
    loop {
        if let Some(value) = check().await {
            return value;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition not reached within {POLL_TIMEOUT:?}"
        );
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

/// Utterances of a chat once it holds at least `count` of them.
pub async fn chat_with(router: &Router, chat_id: &str, count: usize) -> Vec<Value> {
    let uri = format!("/chatui/chat/{chat_id}");
    let uri = uri.as_str();
    eventually(move || async move {
        let (_, chat) = get_json(router, uri).await;
        chat.as_array().filter(|u| u.len() >= count).cloned()
    })
    .await
}
