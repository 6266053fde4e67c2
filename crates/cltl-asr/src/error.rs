use shared_bus::BusError;
use shared_config::ConfigError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AsrError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Bus(#[from] BusError),

    #[error("ASR request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("ASR server returned {status}: {body}")]
    Server { status: u16, body: String },

    #[error("ASR service is already running")]
    AlreadyRunning,
}
