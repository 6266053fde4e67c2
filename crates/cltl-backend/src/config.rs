//! # Backend Configuration
//!
//! | Section | Keys |
//! |---------|------|
//! | `cltl.audio` | `sampling_rate`, `channels`, `frame_size` |
//! | `cltl.video` | `resolution`, `camera_index` |
//! | `cltl.backend` | `mic_topic`, `image_topic`, `tts_topic`, `audio_cache_size`, `image_cache_size` |
//! | `cltl.backend.image` | `rate` |

use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;
use std::time::Duration;

use serde::Serialize;
use shared_config::{ConfigError, ConfigKey, ConfigSection, ConfigurationSource};
use shared_types::Topic;

use crate::error::BackendError;

const AUDIO: &str = "cltl.audio";
const VIDEO: &str = "cltl.video";
const BACKEND: &str = "cltl.backend";
const BACKEND_IMAGE: &str = "cltl.backend.image";

/// Every key the backend reads.
pub const REQUIRED_KEYS: &[ConfigKey] = &[
    ConfigKey::new(AUDIO, "sampling_rate"),
    ConfigKey::new(AUDIO, "channels"),
    ConfigKey::new(AUDIO, "frame_size"),
    ConfigKey::new(VIDEO, "resolution"),
    ConfigKey::new(VIDEO, "camera_index"),
    ConfigKey::new(BACKEND, "mic_topic"),
    ConfigKey::new(BACKEND, "image_topic"),
    ConfigKey::new(BACKEND, "tts_topic"),
    ConfigKey::new(BACKEND, "audio_cache_size"),
    ConfigKey::new(BACKEND, "image_cache_size"),
    ConfigKey::new(BACKEND_IMAGE, "rate"),
];

// =============================================================================
// CAMERA RESOLUTION
// =============================================================================

/// Capture resolutions a camera can be configured with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CameraResolution {
    /// Whatever the device delivers.
    Native,
    FullHd,
    Hd,
    Vga,
    Qvga,
    Qqvga,
}

impl CameraResolution {
    /// `(width, height)`, `None` for [`CameraResolution::Native`].
    #[must_use]
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        match self {
            Self::Native => None,
            Self::FullHd => Some((1920, 1080)),
            Self::Hd => Some((1280, 720)),
            Self::Vga => Some((640, 480)),
            Self::Qvga => Some((320, 240)),
            Self::Qqvga => Some((160, 120)),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Native => "NATIVE",
            Self::FullHd => "FULL_HD",
            Self::Hd => "HD",
            Self::Vga => "VGA",
            Self::Qvga => "QVGA",
            Self::Qqvga => "QQVGA",
        }
    }
}

impl fmt::Display for CameraResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CameraResolution {
    type Err = BackendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NATIVE" => Ok(Self::Native),
            "FULL_HD" => Ok(Self::FullHd),
            "HD" => Ok(Self::Hd),
            "VGA" => Ok(Self::Vga),
            "QVGA" => Ok(Self::Qvga),
            "QQVGA" => Ok(Self::Qqvga),
            _ => Err(BackendError::UnknownResolution(s.to_string())),
        }
    }
}

// =============================================================================
// SECTIONS
// =============================================================================

/// `[cltl.audio]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AudioConfig {
    pub sampling_rate: u32,
    pub channels: u16,
    /// Samples per channel in one published frame.
    pub frame_size: usize,
}

impl AudioConfig {
    pub fn from_config(config: &ConfigurationSource) -> Result<Self, ConfigError> {
        let section = config.get_config(AUDIO)?;
        Ok(Self {
            sampling_rate: section.get_uint("sampling_rate")?,
            channels: positive(section, "channels")?,
            frame_size: positive(section, "frame_size")?,
        })
    }
}

/// `[cltl.video]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VideoConfig {
    pub resolution: CameraResolution,
    pub camera_index: u32,
}

impl VideoConfig {
    pub fn from_config(config: &ConfigurationSource) -> Result<Self, ConfigError> {
        let section = config.get_config(VIDEO)?;
        Ok(Self {
            resolution: section.get_enum("resolution")?,
            camera_index: section.get_uint("camera_index")?,
        })
    }
}

/// `[cltl.backend]` topics plus the audio frame size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    pub mic_topic: Topic,
    pub image_topic: Topic,
    pub tts_topic: Topic,
    pub frame_size: usize,
}

impl BackendConfig {
    pub fn from_config(config: &ConfigurationSource) -> Result<Self, ConfigError> {
        let section = config.get_config(BACKEND)?;
        Ok(Self {
            mic_topic: section.get_enum("mic_topic")?,
            image_topic: section.get_enum("image_topic")?,
            tts_topic: section.get_enum("tts_topic")?,
            frame_size: AudioConfig::from_config(config)?.frame_size,
        })
    }
}

/// Capacities of the signal caches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageConfig {
    pub audio_cache_size: NonZeroUsize,
    pub image_cache_size: NonZeroUsize,
}

impl StorageConfig {
    pub fn from_config(config: &ConfigurationSource) -> Result<Self, ConfigError> {
        let section = config.get_config(BACKEND)?;
        Ok(Self {
            audio_cache_size: non_zero(section, "audio_cache_size")?,
            image_cache_size: non_zero(section, "image_cache_size")?,
        })
    }
}

/// Minimum time between two camera captures for `[cltl.backend.image] rate`.
pub fn camera_interval(config: &ConfigurationSource) -> Result<Duration, ConfigError> {
    let section = config.get_config(BACKEND_IMAGE)?;
    let rate = section.get_float("rate")?;
    if !(rate.is_finite() && rate > 0.0) {
        return Err(ConfigError::InvalidValue {
            section: BACKEND_IMAGE.to_string(),
            key: "rate".to_string(),
            value: rate.to_string(),
            reason: "must be a positive number of images per second".to_string(),
        });
    }
    Ok(Duration::from_secs_f64(1.0 / rate))
}

fn non_zero(section: &ConfigSection, key: &str) -> Result<NonZeroUsize, ConfigError> {
    let value: usize = section.get_uint(key)?;
    NonZeroUsize::new(value).ok_or_else(|| ConfigError::InvalidValue {
        section: section.name().to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: "must be positive".to_string(),
    })
}

fn positive<T>(section: &ConfigSection, key: &str) -> Result<T, ConfigError>
where
    T: TryFrom<i64> + Default + PartialEq,
{
    let value: T = section.get_uint(key)?;
    if value == T::default() {
        return Err(ConfigError::InvalidValue {
            section: section.name().to_string(),
            key: key.to_string(),
            value: "0".to_string(),
            reason: "must be positive".to_string(),
        });
    }
    Ok(value)
}
