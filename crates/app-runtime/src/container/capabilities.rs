//! # Capability Containers
//!
//! One container per capability. Each declares its singletons, resolves them
//! on `start()` and stops only the service it actually built.

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use cltl_asr::{AsrConfig, AsrService, RemoteAsr, Transcriber};
use cltl_chatui::{ChatUiConfig, ChatUiService, Chats, MemoryChats};
use cltl_face_recognition::{
    FaceDetector, FaceDetectorProxy, FaceRecognitionConfig, FaceRecognitionService,
};
use cltl_g2ky::{G2kyConfig, GetToKnowYou, GetToKnowYouService, MemoryGetToKnowYou};
use cltl_vad::{EnergyDetector, VadConfig, VadService, VoiceActivityDetector};
use cltl_vector_id::{ClusterIdentity, VectorIdConfig, VectorIdService, VectorIdentity};
use parking_lot::Mutex;
use shared_bus::SERVICE_STOP_TIMEOUT;
use shared_config::{ConfigError, ConfigKey, ConfigurationSource};

use super::{InfraContext, ResolutionError, Singleton};
use crate::registry::{Capability, CapabilityError, CapabilityId};

// =============================================================================
// VAD
// =============================================================================

pub struct VadContainer {
    infra: Arc<InfraContext>,
    vad: Singleton<dyn VoiceActivityDetector>,
    vad_service: Singleton<VadService>,
}

impl VadContainer {
    pub fn new(infra: Arc<InfraContext>) -> Self {
        Self {
            infra,
            vad: Singleton::new("vad", "vad"),
            vad_service: Singleton::new("vad", "vad_service"),
        }
    }

    pub fn vad(&self) -> Result<Arc<dyn VoiceActivityDetector>, ResolutionError> {
        self.vad.get_or_init(|| {
            let config = VadConfig::from_config(self.infra.config())?;
            Ok(Arc::new(EnergyDetector::new(config.threshold)))
        })
    }

    pub fn vad_service(&self) -> Result<Arc<VadService>, ResolutionError> {
        self.vad_service.get_or_init(|| {
            Ok(Arc::new(VadService::from_config(
                self.vad()?,
                Arc::clone(self.infra.bus()),
                self.infra.config(),
            )?))
        })
    }
}

#[async_trait]
impl Capability for VadContainer {
    fn id(&self) -> CapabilityId {
        CapabilityId::Vad
    }

    fn required_config(&self) -> &'static [ConfigKey] {
        VadConfig::REQUIRED_KEYS
    }

    fn validate_config(&self, source: &ConfigurationSource) -> Result<(), ConfigError> {
        VadConfig::from_config(source).map(drop)
    }

    async fn start(&self) -> Result<(), CapabilityError> {
        self.vad_service()?
            .start()
            .map_err(|e| CapabilityError::start(self.id(), e))
    }

    async fn stop(&self) {
        if let Some(service) = self.vad_service.get() {
            service.stop(SERVICE_STOP_TIMEOUT).await;
        }
    }
}

// =============================================================================
// ASR
// =============================================================================

pub struct AsrContainer {
    infra: Arc<InfraContext>,
    asr: Singleton<dyn Transcriber>,
    asr_service: Singleton<AsrService>,
}

impl AsrContainer {
    pub fn new(infra: Arc<InfraContext>) -> Self {
        Self {
            infra,
            asr: Singleton::new("asr", "asr"),
            asr_service: Singleton::new("asr", "asr_service"),
        }
    }

    pub fn asr(&self) -> Result<Arc<dyn Transcriber>, ResolutionError> {
        self.asr.get_or_init(|| {
            let config = AsrConfig::from_config(self.infra.config())?;
            Ok(Arc::new(RemoteAsr::new(config.url, config.model)?))
        })
    }

    pub fn asr_service(&self) -> Result<Arc<AsrService>, ResolutionError> {
        self.asr_service.get_or_init(|| {
            Ok(Arc::new(AsrService::from_config(
                self.asr()?,
                Arc::clone(self.infra.bus()),
                self.infra.config(),
            )?))
        })
    }
}

#[async_trait]
impl Capability for AsrContainer {
    fn id(&self) -> CapabilityId {
        CapabilityId::Asr
    }

    fn required_config(&self) -> &'static [ConfigKey] {
        AsrConfig::REQUIRED_KEYS
    }

    fn validate_config(&self, source: &ConfigurationSource) -> Result<(), ConfigError> {
        AsrConfig::from_config(source).map(drop)
    }

    async fn start(&self) -> Result<(), CapabilityError> {
        self.asr_service()?
            .start()
            .map_err(|e| CapabilityError::start(self.id(), e))
    }

    async fn stop(&self) {
        if let Some(service) = self.asr_service.get() {
            service.stop(SERVICE_STOP_TIMEOUT).await;
        }
    }
}

// =============================================================================
// CHAT UI
// =============================================================================

pub struct ChatUiContainer {
    infra: Arc<InfraContext>,
    chats: Singleton<dyn Chats>,
    chatui_service: Singleton<ChatUiService>,
}

impl ChatUiContainer {
    pub fn new(infra: Arc<InfraContext>) -> Self {
        Self {
            infra,
            chats: Singleton::new("chatui", "chats"),
            chatui_service: Singleton::new("chatui", "chatui_service"),
        }
    }

    pub fn chats(&self) -> Result<Arc<dyn Chats>, ResolutionError> {
        self.chats.get_or_init(|| Ok(Arc::new(MemoryChats::new())))
    }

    pub fn chatui_service(&self) -> Result<Arc<ChatUiService>, ResolutionError> {
        self.chatui_service.get_or_init(|| {
            Ok(Arc::new(ChatUiService::from_config(
                self.chats()?,
                Arc::clone(self.infra.bus()),
                self.infra.config(),
            )?))
        })
    }

    /// The chat web application.
    pub fn app(&self) -> Result<Router, ResolutionError> {
        Ok(self.chatui_service()?.app())
    }
}

#[async_trait]
impl Capability for ChatUiContainer {
    fn id(&self) -> CapabilityId {
        CapabilityId::ChatUi
    }

    fn required_config(&self) -> &'static [ConfigKey] {
        ChatUiConfig::REQUIRED_KEYS
    }

    fn validate_config(&self, source: &ConfigurationSource) -> Result<(), ConfigError> {
        ChatUiConfig::from_config(source).map(drop)
    }

    async fn start(&self) -> Result<(), CapabilityError> {
        self.chatui_service()?
            .start()
            .map_err(|e| CapabilityError::start(self.id(), e))
    }

    async fn stop(&self) {
        if let Some(service) = self.chatui_service.get() {
            service.stop(SERVICE_STOP_TIMEOUT).await;
        }
    }
}

// =============================================================================
// FACE RECOGNITION
// =============================================================================

pub struct FaceRecognitionContainer {
    infra: Arc<InfraContext>,
    face_detector: Singleton<dyn FaceDetector>,
    face_recognition_service: Singleton<FaceRecognitionService>,
}

impl FaceRecognitionContainer {
    pub fn new(infra: Arc<InfraContext>) -> Self {
        Self {
            infra,
            face_detector: Singleton::new("face_recognition", "face_detector"),
            face_recognition_service: Singleton::new(
                "face_recognition",
                "face_recognition_service",
            ),
        }
    }

    pub fn face_detector(&self) -> Result<Arc<dyn FaceDetector>, ResolutionError> {
        self.face_detector.get_or_init(|| {
            let config = FaceRecognitionConfig::from_config(self.infra.config())?;
            Ok(Arc::new(FaceDetectorProxy::new(config.url)?))
        })
    }

    pub fn face_recognition_service(
        &self,
    ) -> Result<Arc<FaceRecognitionService>, ResolutionError> {
        self.face_recognition_service.get_or_init(|| {
            Ok(Arc::new(FaceRecognitionService::from_config(
                self.face_detector()?,
                Arc::clone(self.infra.bus()),
                self.infra.config(),
            )?))
        })
    }
}

#[async_trait]
impl Capability for FaceRecognitionContainer {
    fn id(&self) -> CapabilityId {
        CapabilityId::FaceRecognition
    }

    fn required_config(&self) -> &'static [ConfigKey] {
        FaceRecognitionConfig::REQUIRED_KEYS
    }

    fn validate_config(&self, source: &ConfigurationSource) -> Result<(), ConfigError> {
        FaceRecognitionConfig::from_config(source).map(drop)
    }

    async fn start(&self) -> Result<(), CapabilityError> {
        self.face_recognition_service()?
            .start()
            .map_err(|e| CapabilityError::start(self.id(), e))
    }

    async fn stop(&self) {
        if let Some(service) = self.face_recognition_service.get() {
            service.stop(SERVICE_STOP_TIMEOUT).await;
        }
    }
}

// =============================================================================
// VECTOR ID
// =============================================================================

pub struct VectorIdContainer {
    infra: Arc<InfraContext>,
    vector_id: Singleton<Mutex<dyn VectorIdentity>>,
    vector_id_service: Singleton<VectorIdService>,
}

impl VectorIdContainer {
    pub fn new(infra: Arc<InfraContext>) -> Self {
        Self {
            infra,
            vector_id: Singleton::new("vector_id", "vector_id"),
            vector_id_service: Singleton::new("vector_id", "vector_id_service"),
        }
    }

    pub fn vector_id(&self) -> Result<Arc<Mutex<dyn VectorIdentity>>, ResolutionError> {
        self.vector_id.get_or_init(|| {
            let config = VectorIdConfig::from_config(self.infra.config())?;
            Ok(Arc::new(Mutex::new(ClusterIdentity::agglomerative(
                0,
                config.distance_threshold,
            ))))
        })
    }

    pub fn vector_id_service(&self) -> Result<Arc<VectorIdService>, ResolutionError> {
        self.vector_id_service.get_or_init(|| {
            Ok(Arc::new(VectorIdService::from_config(
                self.vector_id()?,
                Arc::clone(self.infra.bus()),
                self.infra.config(),
            )?))
        })
    }
}

#[async_trait]
impl Capability for VectorIdContainer {
    fn id(&self) -> CapabilityId {
        CapabilityId::VectorId
    }

    fn required_config(&self) -> &'static [ConfigKey] {
        VectorIdConfig::REQUIRED_KEYS
    }

    fn validate_config(&self, source: &ConfigurationSource) -> Result<(), ConfigError> {
        VectorIdConfig::from_config(source).map(drop)
    }

    async fn start(&self) -> Result<(), CapabilityError> {
        self.vector_id_service()?
            .start()
            .map_err(|e| CapabilityError::start(self.id(), e))
    }

    async fn stop(&self) {
        if let Some(service) = self.vector_id_service.get() {
            service.stop(SERVICE_STOP_TIMEOUT).await;
        }
    }
}

// =============================================================================
// G2KY
// =============================================================================

pub struct G2kyContainer {
    infra: Arc<InfraContext>,
    g2ky: Singleton<Mutex<dyn GetToKnowYou>>,
    g2ky_service: Singleton<GetToKnowYouService>,
}

impl G2kyContainer {
    pub fn new(infra: Arc<InfraContext>) -> Self {
        Self {
            infra,
            g2ky: Singleton::new("g2ky", "g2ky"),
            g2ky_service: Singleton::new("g2ky", "g2ky_service"),
        }
    }

    pub fn g2ky(&self) -> Result<Arc<Mutex<dyn GetToKnowYou>>, ResolutionError> {
        self.g2ky
            .get_or_init(|| Ok(Arc::new(Mutex::new(MemoryGetToKnowYou::new()))))
    }

    pub fn g2ky_service(&self) -> Result<Arc<GetToKnowYouService>, ResolutionError> {
        self.g2ky_service.get_or_init(|| {
            Ok(Arc::new(GetToKnowYouService::from_config(
                self.g2ky()?,
                Arc::clone(self.infra.bus()),
                self.infra.config(),
            )?))
        })
    }
}

#[async_trait]
impl Capability for G2kyContainer {
    fn id(&self) -> CapabilityId {
        CapabilityId::G2ky
    }

    fn required_config(&self) -> &'static [ConfigKey] {
        G2kyConfig::REQUIRED_KEYS
    }

    fn validate_config(&self, source: &ConfigurationSource) -> Result<(), ConfigError> {
        G2kyConfig::from_config(source).map(drop)
    }

    async fn start(&self) -> Result<(), CapabilityError> {
        self.g2ky_service()?
            .start()
            .map_err(|e| CapabilityError::start(self.id(), e))
    }

    async fn stop(&self) {
        if let Some(service) = self.g2ky_service.get() {
            service.stop(SERVICE_STOP_TIMEOUT).await;
        }
    }
}
