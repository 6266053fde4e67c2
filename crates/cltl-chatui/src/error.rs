use shared_bus::BusError;
use shared_config::ConfigError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChatUiError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Bus(#[from] BusError),

    #[error("Chat UI service is already running")]
    AlreadyRunning,
}
