//! # Backend Container
//!
//! ```text
//! audio_source ──▶ microphone ──┐
//! image_source ──▶ camera ──────┼──▶ backend ──▶ backend_service
//! text_output ───▶ tts ─────────┘                  ▲
//! audio_storage, image_storage ────────────────────┘ ──▶ storage_service
//! audio_source, image_source, text_output ──▶ server (host API)
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use cltl_backend::{
    config, AudioStorage, Backend, BackendServer, BackendService, CachedAudioStorage,
    CachedImageStorage, ClientAudioSource, ClientImageSource, ConsoleOutput, ImageCamera,
    ImageStorage, StorageService, SynchronizedMicrophone, SynchronizedTextToSpeech,
};
use shared_bus::SERVICE_STOP_TIMEOUT;
use shared_config::{ConfigError, ConfigKey, ConfigurationSource};

use super::{InfraContext, ResolutionError, Singleton};
use crate::registry::{Capability, CapabilityError, CapabilityId};

const NAME: &str = "backend";

pub struct BackendContainer {
    infra: Arc<InfraContext>,
    audio_storage: Singleton<dyn AudioStorage>,
    image_storage: Singleton<dyn ImageStorage>,
    audio_source: Singleton<ClientAudioSource>,
    image_source: Singleton<ClientImageSource>,
    text_output: Singleton<ConsoleOutput>,
    microphone: Singleton<SynchronizedMicrophone>,
    camera: Singleton<ImageCamera>,
    tts: Singleton<SynchronizedTextToSpeech>,
    backend: Singleton<Backend>,
    backend_service: Singleton<BackendService>,
    storage_service: Singleton<StorageService>,
    server: Singleton<BackendServer>,
}

impl BackendContainer {
    pub fn new(infra: Arc<InfraContext>) -> Self {
        Self {
            infra,
            audio_storage: Singleton::new(NAME, "audio_storage"),
            image_storage: Singleton::new(NAME, "image_storage"),
            audio_source: Singleton::new(NAME, "audio_source"),
            image_source: Singleton::new(NAME, "image_source"),
            text_output: Singleton::new(NAME, "text_output"),
            microphone: Singleton::new(NAME, "microphone"),
            camera: Singleton::new(NAME, "camera"),
            tts: Singleton::new(NAME, "tts"),
            backend: Singleton::new(NAME, "backend"),
            backend_service: Singleton::new(NAME, "backend_service"),
            storage_service: Singleton::new(NAME, "storage_service"),
            server: Singleton::new(NAME, "server"),
        }
    }

    pub fn audio_storage(&self) -> Result<Arc<dyn AudioStorage>, ResolutionError> {
        self.audio_storage.get_or_init(|| {
            Ok(Arc::new(CachedAudioStorage::from_config(self.infra.config())?))
        })
    }

    pub fn image_storage(&self) -> Result<Arc<dyn ImageStorage>, ResolutionError> {
        self.image_storage.get_or_init(|| {
            Ok(Arc::new(CachedImageStorage::from_config(self.infra.config())?))
        })
    }

    pub fn audio_source(&self) -> Result<Arc<ClientAudioSource>, ResolutionError> {
        self.audio_source.get_or_init(|| {
            let audio = config::AudioConfig::from_config(self.infra.config())?;
            Ok(Arc::new(ClientAudioSource::new(audio.sampling_rate, audio.channels)))
        })
    }

    pub fn image_source(&self) -> Result<Arc<ClientImageSource>, ResolutionError> {
        self.image_source
            .get_or_init(|| Ok(Arc::new(ClientImageSource::new())))
    }

    pub fn text_output(&self) -> Result<Arc<ConsoleOutput>, ResolutionError> {
        self.text_output
            .get_or_init(|| Ok(Arc::new(ConsoleOutput::new())))
    }

    pub fn microphone(&self) -> Result<Arc<SynchronizedMicrophone>, ResolutionError> {
        self.microphone.get_or_init(|| {
            Ok(Arc::new(SynchronizedMicrophone::new(
                self.audio_source()?,
                Arc::clone(self.infra.resources()),
            )))
        })
    }

    pub fn camera(&self) -> Result<Arc<ImageCamera>, ResolutionError> {
        self.camera.get_or_init(|| {
            let interval = config::camera_interval(self.infra.config())?;
            Ok(Arc::new(ImageCamera::new(
                self.image_source()?,
                Arc::clone(self.infra.resources()),
                interval,
            )))
        })
    }

    pub fn tts(&self) -> Result<Arc<SynchronizedTextToSpeech>, ResolutionError> {
        self.tts.get_or_init(|| {
            Ok(Arc::new(SynchronizedTextToSpeech::new(
                self.text_output()?,
                Arc::clone(self.infra.resources()),
            )))
        })
    }

    pub fn backend(&self) -> Result<Arc<Backend>, ResolutionError> {
        self.backend.get_or_init(|| {
            Ok(Arc::new(Backend::new(
                self.microphone()?,
                self.camera()?,
                self.tts()?,
            )))
        })
    }

    pub fn backend_service(&self) -> Result<Arc<BackendService>, ResolutionError> {
        self.backend_service.get_or_init(|| {
            Ok(Arc::new(BackendService::from_config(
                self.backend()?,
                self.audio_storage()?,
                self.image_storage()?,
                Arc::clone(self.infra.bus()),
                self.infra.config(),
            )?))
        })
    }

    pub fn storage_service(&self) -> Result<Arc<StorageService>, ResolutionError> {
        self.storage_service.get_or_init(|| {
            Ok(Arc::new(StorageService::new(
                self.audio_storage()?,
                self.image_storage()?,
            )))
        })
    }

    /// The host control API.
    pub fn server(&self) -> Result<Arc<BackendServer>, ResolutionError> {
        self.server.get_or_init(|| {
            Ok(Arc::new(BackendServer::from_config(
                self.infra.config(),
                self.audio_source()?,
                self.image_source()?,
                self.text_output()?,
            )?))
        })
    }
}

#[async_trait]
impl Capability for BackendContainer {
    fn id(&self) -> CapabilityId {
        CapabilityId::Backend
    }

    fn required_config(&self) -> &'static [ConfigKey] {
        config::REQUIRED_KEYS
    }

    fn validate_config(&self, source: &ConfigurationSource) -> Result<(), ConfigError> {
        config::AudioConfig::from_config(source)?;
        config::VideoConfig::from_config(source)?;
        config::BackendConfig::from_config(source)?;
        config::StorageConfig::from_config(source)?;
        config::camera_interval(source)?;
        Ok(())
    }

    async fn start(&self) -> Result<(), CapabilityError> {
        self.storage_service()?.start();
        self.backend_service()?
            .start()
            .map_err(|e| CapabilityError::start(CapabilityId::Backend, e))
    }

    async fn stop(&self) {
        if let Some(storage) = self.storage_service.get() {
            storage.stop();
        }
        if let Some(service) = self.backend_service.get() {
            service.stop(SERVICE_STOP_TIMEOUT).await;
        }
    }
}
