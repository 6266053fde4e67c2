use shared_bus::BusError;
use shared_config::ConfigError;
use shared_resource::ResourceError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Bus(#[from] BusError),

    #[error(transparent)]
    Resource(#[from] ResourceError),

    /// Pixel data does not match `width * height * 3` bytes.
    #[error("Image of {width}x{height} needs {expected} bytes, got {actual}")]
    InvalidImage {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    /// `width * height * 3` does not fit in memory.
    #[error("Image of {width}x{height} is too large")]
    ImageTooLarge { width: u32, height: u32 },

    #[error("Unknown camera resolution: {0}")]
    UnknownResolution(String),

    #[error("Backend service is already running")]
    AlreadyRunning,
}
