//! # Signal Storage
//!
//! Bounded in-memory caches of captured audio and images, keyed by signal id.
//! The least recently used signal is evicted once a cache is full.

use std::num::NonZeroUsize;

use lru::LruCache;
use parking_lot::Mutex;
use serde::Serialize;
use shared_config::{ConfigError, ConfigurationSource};
use shared_types::ImageData;

use crate::config::StorageConfig;

/// All audio captured for one signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredAudio {
    pub sampling_rate: u32,
    pub channels: u16,
    /// Interleaved samples in capture order.
    pub samples: Vec<i16>,
}

pub trait AudioStorage: Send + Sync {
    /// Append `samples` to the audio of `signal_id`.
    fn append(&self, signal_id: &str, sampling_rate: u32, channels: u16, samples: &[i16]);

    fn get(&self, signal_id: &str) -> Option<StoredAudio>;
}

pub trait ImageStorage: Send + Sync {
    fn store(&self, signal_id: &str, image: ImageData);

    fn get(&self, signal_id: &str) -> Option<ImageData>;
}

pub struct CachedAudioStorage {
    cache: Mutex<LruCache<String, StoredAudio>>,
}

impl CachedAudioStorage {
    #[must_use]
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn from_config(config: &ConfigurationSource) -> Result<Self, ConfigError> {
        Ok(Self::new(StorageConfig::from_config(config)?.audio_cache_size))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cache.lock().is_empty()
    }
}

impl AudioStorage for CachedAudioStorage {
    fn append(&self, signal_id: &str, sampling_rate: u32, channels: u16, samples: &[i16]) {
        let mut cache = self.cache.lock();
        match cache.get_mut(signal_id) {
            Some(audio) => audio.samples.extend_from_slice(samples),
            None => {
                cache.put(
                    signal_id.to_string(),
                    StoredAudio {
                        sampling_rate,
                        channels,
                        samples: samples.to_vec(),
                    },
                );
            }
        }
    }

    fn get(&self, signal_id: &str) -> Option<StoredAudio> {
        self.cache.lock().get(signal_id).cloned()
    }
}

pub struct CachedImageStorage {
    cache: Mutex<LruCache<String, ImageData>>,
}

impl CachedImageStorage {
    #[must_use]
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn from_config(config: &ConfigurationSource) -> Result<Self, ConfigError> {
        Ok(Self::new(StorageConfig::from_config(config)?.image_cache_size))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cache.lock().is_empty()
    }
}

impl ImageStorage for CachedImageStorage {
    fn store(&self, signal_id: &str, image: ImageData) {
        self.cache.lock().put(signal_id.to_string(), image);
    }

    fn get(&self, signal_id: &str) -> Option<ImageData> {
        self.cache.lock().get(signal_id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capacity(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn test_audio_chunks_accumulate_per_signal() {
        let storage = CachedAudioStorage::new(capacity(4));
        storage.append("s1", 16_000, 1, &[1, 2]);
        storage.append("s1", 16_000, 1, &[3]);
        storage.append("s2", 8_000, 2, &[9, 9]);

        assert_eq!(storage.get("s1").unwrap().samples, vec![1, 2, 3]);
        assert_eq!(storage.get("s2").unwrap().sampling_rate, 8_000);
        assert_eq!(storage.len(), 2);
    }

    #[test]
    fn test_least_recently_used_image_is_evicted() {
        let storage = CachedImageStorage::new(capacity(2));
        let image = ImageData {
            width: 1,
            height: 1,
            data: vec![0, 0, 0],
        };
        storage.store("a", image.clone());
        storage.store("b", image.clone());
        assert!(storage.get("a").is_some());
        storage.store("c", image);

        assert!(storage.get("a").is_some());
        assert!(storage.get("b").is_none());
        assert_eq!(storage.len(), 2);
    }
}
