use shared_bus::BusError;
use shared_config::ConfigError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum G2kyError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Bus(#[from] BusError),

    #[error("G2KY service is already running")]
    AlreadyRunning,
}
