//! # Web Gateway
//!
//! Serves every capability's web application behind one listener, each
//! under its own path prefix.
//!
//! ```text
//!   GET /host/info      ──▶ host app      sees /info
//!   GET /storage/audio/7 ──▶ storage app  sees /audio/7
//!   GET /chatui/chat/1  ──▶ chat app      sees /chat/1
//!   GET /elsewhere      ──▶ 404 {"error":"not found","path":"/elsewhere"}
//! ```

mod config;

pub use config::WebConfig;

use std::future::Future;
use std::io;
use std::net::SocketAddr;

use axum::http::{StatusCode, Uri};
use axum::response::IntoResponse;
use axum::{Json, Router};
use serde_json::json;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::container::ResolutionError;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Invalid mount prefix '{prefix}': {reason}")]
    InvalidPrefix { prefix: String, reason: &'static str },

    #[error("Mount prefix '{prefix}' conflicts with '{existing}'")]
    Conflict { prefix: String, existing: String },

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("Gateway server error: {0}")]
    Serve(#[source] io::Error),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),
}

/// Path-prefix multiplexer over independent routers.
#[derive(Default)]
pub struct WebGateway {
    mounts: Vec<(String, Router)>,
}

impl WebGateway {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount `app` under `prefix`. The app sees request paths with the
    /// prefix stripped.
    pub fn mount(mut self, prefix: &str, app: Router) -> Result<Self, GatewayError> {
        validate_prefix(prefix)?;
        if let Some((existing, _)) = self
            .mounts
            .iter()
            .find(|(existing, _)| overlaps(existing, prefix))
        {
            return Err(GatewayError::Conflict {
                prefix: prefix.to_string(),
                existing: existing.clone(),
            });
        }
        self.mounts.push((prefix.to_string(), app));
        Ok(self)
    }

    /// Mounted prefixes in mount order.
    pub fn prefixes(&self) -> impl Iterator<Item = &str> {
        self.mounts.iter().map(|(prefix, _)| prefix.as_str())
    }

    #[must_use]
    pub fn into_router(self) -> Router {
        self.mounts
            .into_iter()
            .fold(Router::new(), |router, (prefix, app)| router.nest(&prefix, app))
            .fallback(not_found)
            .layer(TraceLayer::new_for_http())
    }

    /// Bind `addr` and serve until `shutdown` resolves.
    pub async fn serve<F>(self, addr: SocketAddr, shutdown: F) -> Result<(), GatewayError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| GatewayError::Bind { addr, source })?;
        self.serve_on(listener, shutdown).await
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    pub async fn serve_on<F>(self, listener: TcpListener, shutdown: F) -> Result<(), GatewayError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let prefixes: Vec<String> = self.prefixes().map(str::to_string).collect();
        let addr = listener.local_addr().map_err(GatewayError::Serve)?;
        info!(%addr, ?prefixes, "[gateway] Serving");

        axum::serve(listener, self.into_router())
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(GatewayError::Serve)?;

        info!("[gateway] Stopped");
        Ok(())
    }
}

fn validate_prefix(prefix: &str) -> Result<(), GatewayError> {
    let invalid = |reason| GatewayError::InvalidPrefix {
        prefix: prefix.to_string(),
        reason,
    };
    if !prefix.starts_with('/') {
        return Err(invalid("must start with '/'"));
    }
    if prefix == "/" {
        return Err(invalid("cannot mount at the root"));
    }
    if prefix.ends_with('/') {
        return Err(invalid("must not end with '/'"));
    }
    if prefix.contains("//") {
        return Err(invalid("must not contain empty segments"));
    }
    if prefix.contains([':', '*']) {
        return Err(invalid("must not contain path parameters"));
    }
    Ok(())
}

/// Whether one prefix equals or nests inside the other.
fn overlaps(a: &str, b: &str) -> bool {
    let nested = |outer: &str, inner: &str| {
        inner
            .strip_prefix(outer)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    };
    nested(a, b) || nested(b, a)
}

async fn not_found(uri: Uri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "not found", "path": uri.path() })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::extract::Path;
    use axum::http::Request;
    use axum::routing::get;
    use tower::ServiceExt;

    fn named_router(name: &'static str) -> Router {
        Router::new()
            .route("/", get(move || async move { name.to_string() }))
            .route(
                "/*rest",
                get(move |Path(rest): Path<String>| async move { format!("{name}:/{rest}") }),
            )
    }

    fn gateway() -> WebGateway {
        WebGateway::new()
            .mount("/host", named_router("host"))
            .unwrap()
            .mount("/storage", named_router("storage"))
            .unwrap()
            .mount("/chatui", named_router("chatui"))
            .unwrap()
    }

    async fn get_body(router: Router, uri: &str) -> (StatusCode, String) {
        let response = router
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_routes_by_prefix_and_strips_it() {
        let router = gateway().into_router();

        assert_eq!(
            get_body(router.clone(), "/host/info").await,
            (StatusCode::OK, "host:/info".to_string())
        );
        assert_eq!(
            get_body(router.clone(), "/storage/audio/42").await,
            (StatusCode::OK, "storage:/audio/42".to_string())
        );
        assert_eq!(
            get_body(router.clone(), "/chatui").await,
            (StatusCode::OK, "chatui".to_string())
        );
    }

    #[tokio::test]
    async fn test_unmatched_path_is_json_404() {
        let router = gateway().into_router();
        let (status, body) = get_body(router, "/hostile/x").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["error"], "not found");
        assert_eq!(json["path"], "/hostile/x");
    }

    #[test]
    fn test_rejects_invalid_prefixes() {
        for prefix in ["host", "/", "/host/", "/a//b", "/:id", "/files/*rest"] {
            let result = WebGateway::new().mount(prefix, Router::new());
            assert!(
                matches!(result, Err(GatewayError::InvalidPrefix { .. })),
                "accepted {prefix}"
            );
        }
    }

    #[test]
    fn test_rejects_overlapping_prefixes() {
        let single = WebGateway::new().mount("/host", Router::new()).unwrap();
        let Err(GatewayError::Conflict { existing, .. }) =
            single.mount("/host/audio", Router::new())
        else {
            panic!("nested prefix accepted");
        };
        assert_eq!(existing, "/host");

        let full = gateway().mount("/hostname", Router::new()).unwrap();
        assert_eq!(
            full.prefixes().collect::<Vec<_>>(),
            vec!["/host", "/storage", "/chatui", "/hostname"]
        );
        assert!(matches!(
            full.mount("/chatui", Router::new()),
            Err(GatewayError::Conflict { .. })
        ));
    }

    #[tokio::test]
    async fn test_serve_stops_on_shutdown() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        let server = tokio::spawn(gateway().serve_on(listener, async move {
            let _ = rx.await;
        }));

        tx.send(()).unwrap();
        let result = tokio::time::timeout(std::time::Duration::from_secs(5), server)
            .await
            .unwrap()
            .unwrap();
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_bind_failure_is_reported() {
        let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = taken.local_addr().unwrap();
        let result = gateway().serve(addr, async {}).await;
        assert!(matches!(result, Err(GatewayError::Bind { .. })));
    }
}
