use shared_bus::BusError;
use shared_config::ConfigError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FaceRecognitionError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Bus(#[from] BusError),

    #[error("Face detector request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Face detector returned {status}: {body}")]
    Server { status: u16, body: String },

    #[error("Face recognition service is already running")]
    AlreadyRunning,
}
