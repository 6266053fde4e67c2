use shared_bus::BusError;
use shared_config::ConfigError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VadError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Bus(#[from] BusError),

    #[error("VAD service is already running")]
    AlreadyRunning,
}
