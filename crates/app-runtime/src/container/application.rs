//! # Application Container
//!
//! Composes every capability container over one [`InfraContext`] and drives
//! them through the [`LifecycleOrchestrator`].

use std::sync::Arc;

use shared_bus::InMemoryEventBus;
use shared_config::{ConfigError, ConfigKey, ConfigurationSource};
use shared_resource::ResourceCoordinator;
use tracing::{info, instrument};

use super::{
    AsrContainer, BackendContainer, ChatUiContainer, FaceRecognitionContainer, G2kyContainer,
    InfraContext, VadContainer, VectorIdContainer,
};
use crate::gateway::{GatewayError, WebConfig, WebGateway};
use crate::registry::{Capability, CapabilityId, LifecycleError, LifecycleOrchestrator};

/// Capability start order. Stopping runs it in reverse.
pub const START_ORDER: [CapabilityId; 7] = [
    CapabilityId::Backend,
    CapabilityId::ChatUi,
    CapabilityId::Vad,
    CapabilityId::Asr,
    CapabilityId::VectorId,
    CapabilityId::FaceRecognition,
    CapabilityId::G2ky,
];

pub struct ApplicationContainer {
    infra: Arc<InfraContext>,
    backend: Arc<BackendContainer>,
    chatui: Arc<ChatUiContainer>,
    vad: Arc<VadContainer>,
    asr: Arc<AsrContainer>,
    vector_id: Arc<VectorIdContainer>,
    face_recognition: Arc<FaceRecognitionContainer>,
    g2ky: Arc<G2kyContainer>,
    orchestrator: LifecycleOrchestrator,
}

impl ApplicationContainer {
    /// Compose the application. Nothing is constructed until started or
    /// asked for.
    #[instrument(skip_all, name = "application")]
    pub fn new(config: ConfigurationSource) -> Self {
        let infra = Arc::new(InfraContext::new(config));

        let backend = Arc::new(BackendContainer::new(Arc::clone(&infra)));
        let chatui = Arc::new(ChatUiContainer::new(Arc::clone(&infra)));
        let vad = Arc::new(VadContainer::new(Arc::clone(&infra)));
        let asr = Arc::new(AsrContainer::new(Arc::clone(&infra)));
        let vector_id = Arc::new(VectorIdContainer::new(Arc::clone(&infra)));
        let face_recognition = Arc::new(FaceRecognitionContainer::new(Arc::clone(&infra)));
        let g2ky = Arc::new(G2kyContainer::new(Arc::clone(&infra)));

        let capabilities: Vec<Arc<dyn Capability>> = START_ORDER
            .iter()
            .map(|id| match id {
                CapabilityId::Backend => Arc::clone(&backend) as Arc<dyn Capability>,
                CapabilityId::ChatUi => Arc::clone(&chatui) as Arc<dyn Capability>,
                CapabilityId::Vad => Arc::clone(&vad) as Arc<dyn Capability>,
                CapabilityId::Asr => Arc::clone(&asr) as Arc<dyn Capability>,
                CapabilityId::VectorId => Arc::clone(&vector_id) as Arc<dyn Capability>,
                CapabilityId::FaceRecognition => {
                    Arc::clone(&face_recognition) as Arc<dyn Capability>
                }
                CapabilityId::G2ky => Arc::clone(&g2ky) as Arc<dyn Capability>,
            })
            .collect();
        let orchestrator = LifecycleOrchestrator::new(Arc::clone(&infra), capabilities);
        info!(capabilities = START_ORDER.len(), "[app] Composed application");

        Self {
            infra,
            backend,
            chatui,
            vad,
            asr,
            vector_id,
            face_recognition,
            g2ky,
            orchestrator,
        }
    }

    /// Every key the application needs, web gateway included.
    #[must_use]
    pub fn required_config(&self) -> Vec<ConfigKey> {
        let mut keys = self.orchestrator.required_config();
        keys.extend_from_slice(WebConfig::REQUIRED_KEYS);
        keys
    }

    /// Validate configuration, then start every capability in order.
    ///
    /// A missing or mistyped key fails before anything starts. A failing
    /// capability rolls back everything started before it.
    pub async fn start(&self) -> Result<(), LifecycleError> {
        let config = self.infra.config();
        config.require(&self.required_config())?;
        WebConfig::from_config(config)?;
        self.orchestrator.start().await?;
        self.orchestrator.log_status();
        Ok(())
    }

    /// Stop every started capability in reverse order. Idempotent.
    pub async fn stop(&self) {
        self.orchestrator.stop().await;
    }

    /// Mount the host, storage and chat applications.
    pub fn web_gateway(&self) -> Result<WebGateway, GatewayError> {
        WebGateway::new()
            .mount("/host", self.backend.server()?.app())?
            .mount("/storage", self.backend.storage_service()?.app())?
            .mount("/chatui", self.chatui.app()?)
    }

    pub fn web_config(&self) -> Result<WebConfig, ConfigError> {
        WebConfig::from_config(self.infra.config())
    }

    #[must_use]
    pub fn infra(&self) -> &Arc<InfraContext> {
        &self.infra
    }

    #[must_use]
    pub fn config(&self) -> &ConfigurationSource {
        self.infra.config()
    }

    #[must_use]
    pub fn bus(&self) -> &Arc<InMemoryEventBus> {
        self.infra.bus()
    }

    #[must_use]
    pub fn resources(&self) -> &Arc<ResourceCoordinator> {
        self.infra.resources()
    }

    #[must_use]
    pub fn backend(&self) -> &BackendContainer {
        &self.backend
    }

    #[must_use]
    pub fn chatui(&self) -> &ChatUiContainer {
        &self.chatui
    }

    #[must_use]
    pub fn vad(&self) -> &VadContainer {
        &self.vad
    }

    #[must_use]
    pub fn asr(&self) -> &AsrContainer {
        &self.asr
    }

    #[must_use]
    pub fn vector_id(&self) -> &VectorIdContainer {
        &self.vector_id
    }

    #[must_use]
    pub fn face_recognition(&self) -> &FaceRecognitionContainer {
        &self.face_recognition
    }

    #[must_use]
    pub fn g2ky(&self) -> &G2kyContainer {
        &self.g2ky
    }

    #[must_use]
    pub fn orchestrator(&self) -> &LifecycleOrchestrator {
        &self.orchestrator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::CapabilityStatus;

    const FULL_CONFIG: &str = include_str!("../../../../config/default.toml");

    fn application() -> ApplicationContainer {
        ApplicationContainer::new(ConfigurationSource::parse(FULL_CONFIG).unwrap())
    }

    #[test]
    fn test_singletons_are_shared() {
        let app = application();
        let first = app.backend().audio_storage().unwrap();
        let second = app.backend().audio_storage().unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        let chats = app.chatui().chats().unwrap();
        let service = app.chatui().chatui_service().unwrap();
        assert!(Arc::ptr_eq(&chats, service.chats()));
    }

    #[test]
    fn test_order_matches_start_order() {
        let app = application();
        assert_eq!(app.orchestrator().order(), START_ORDER.to_vec());
    }

    #[tokio::test]
    async fn test_start_and_stop_releases_everything() {
        let app = application();
        app.start().await.unwrap();
        assert!(app.orchestrator().is_running());
        assert!(app.bus().total_subscriptions() > 0);

        app.stop().await;
        assert_eq!(app.bus().total_subscriptions(), 0);
        assert_eq!(app.resources().held_count(), 0);
        assert!(app
            .orchestrator()
            .statuses()
            .iter()
            .all(|(_, status)| *status == CapabilityStatus::Stopped));

        app.stop().await;
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_start() {
        let trimmed: String = FULL_CONFIG
            .lines()
            .filter(|line| !line.trim_start().starts_with("distance_threshold"))
            .collect::<Vec<_>>()
            .join("\n");
        let app = ApplicationContainer::new(ConfigurationSource::parse(&trimmed).unwrap());

        let err = app.start().await.unwrap_err();
        let LifecycleError::Config(ConfigError::MissingKeys(keys)) = err else {
            panic!("unexpected error: {err}");
        };
        assert_eq!(keys, vec!["cltl.vector_id.agg.distance_threshold".to_string()]);
        assert_eq!(
            app.orchestrator().status(CapabilityId::Backend),
            Some(CapabilityStatus::Registered)
        );
        assert_eq!(app.bus().total_subscriptions(), 0);
    }

    #[tokio::test]
    async fn test_mistyped_web_port_fails_before_start() {
        let config = FULL_CONFIG.replace("port = 8000", "port = \"web\"");
        let app = ApplicationContainer::new(ConfigurationSource::parse(&config).unwrap());

        let err = app.start().await.unwrap_err();
        assert!(matches!(
            err,
            LifecycleError::Config(ConfigError::InvalidType { .. })
        ));
        assert!(app
            .orchestrator()
            .statuses()
            .iter()
            .all(|(_, status)| *status == CapabilityStatus::Registered));
        assert!(!app.infra().is_started());
    }

    #[test]
    fn test_web_gateway_mounts_three_apps() {
        let app = application();
        let gateway = app.web_gateway().unwrap();
        assert_eq!(
            gateway.prefixes().collect::<Vec<_>>(),
            vec!["/host", "/storage", "/chatui"]
        );
        assert_eq!(app.web_config().unwrap().port, 8000);
    }
}
