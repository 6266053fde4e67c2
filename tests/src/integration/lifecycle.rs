//! # Lifecycle
//!
//! Rollback of a failed start and the state left behind by a stop.

#[cfg(test)]
mod tests {
    use app_runtime::{CapabilityId, CapabilityStatus, LifecycleError, START_ORDER};
    use axum::http::StatusCode;
    use shared_config::ConfigError;

    use crate::integration::support::{application, get_json, started, DEFAULT_CONFIG};

    #[tokio::test]
    async fn test_mistyped_key_starts_nothing() {
        let config = DEFAULT_CONFIG.replace("threshold = 0.02", "threshold = \"loud\"");
        let app = application(&config);

        let err = app.start().await.unwrap_err();
        let LifecycleError::Config(ConfigError::InvalidType { section, key, .. }) = err else {
            panic!("unexpected error: {err}");
        };
        assert_eq!((section.as_str(), key.as_str()), ("cltl.vad", "threshold"));

        assert!(app
            .orchestrator()
            .statuses()
            .iter()
            .all(|(_, status)| *status == CapabilityStatus::Registered));
        assert_eq!(app.bus().total_subscriptions(), 0);
        assert!(!app.infra().is_started());

        app.stop().await;
    }

    #[tokio::test]
    async fn test_failed_capability_rolls_back_earlier_ones() {
        let app = application(DEFAULT_CONFIG);
        // A VAD service that is already running refuses a second start.
        app.vad().vad_service().unwrap().start().unwrap();

        let err = app.start().await.unwrap_err();
        assert!(matches!(
            err,
            LifecycleError::StartFailed {
                capability: CapabilityId::Vad,
                ..
            }
        ));

        let statuses = app.orchestrator().statuses();
        assert_eq!(
            statuses,
            vec![
                (CapabilityId::Backend, CapabilityStatus::Stopped),
                (CapabilityId::ChatUi, CapabilityStatus::Stopped),
                (CapabilityId::Vad, CapabilityStatus::Failed),
                (CapabilityId::Asr, CapabilityStatus::Registered),
                (CapabilityId::VectorId, CapabilityStatus::Registered),
                (CapabilityId::FaceRecognition, CapabilityStatus::Registered),
                (CapabilityId::G2ky, CapabilityStatus::Registered),
            ]
        );
        assert_eq!(app.bus().total_subscriptions(), 0);
        assert!(!app.infra().is_started());

        app.stop().await;
    }

    #[tokio::test]
    async fn test_stop_runs_in_reverse_and_leaves_nothing_behind() {
        let (app, router) = started().await;
        assert_eq!(app.orchestrator().order(), START_ORDER.to_vec());
        assert!(app.orchestrator().is_running());

        let (status, body) = get_json(&router, "/host").await;
        assert_eq!(status, StatusCode::OK, "{body}");

        app.stop().await;
        assert_eq!(app.bus().total_subscriptions(), 0);
        assert_eq!(app.resources().held_count(), 0);
        assert!(!app.infra().is_started());

        let (status, _) = get_json(&router, "/storage/audio/any").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_unknown_path_is_json_404() {
        let (app, router) = started().await;

        let (status, body) = get_json(&router, "/nowhere").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["path"], "/nowhere");

        let (status, body) = get_json(&router, "/chatui").await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["agent"], "Leolani");

        app.stop().await;
    }
}
