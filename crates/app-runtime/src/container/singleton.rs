//! # Singleton Slots
//!
//! A [`Singleton`] holds one lazily constructed, shared instance. The first
//! successful [`Singleton::get_or_init`] runs the factory; every later call
//! returns a clone of the same `Arc`. Concurrent first callers block until
//! the single construction finishes.
//!
//! A failing factory leaves the slot empty, so a later call retries.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use once_cell::sync::OnceCell;
use thiserror::Error;
use tracing::debug;

/// Error a factory may fail with.
pub type FactoryError = Box<dyn std::error::Error + Send + Sync>;

/// A singleton factory failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Failed to resolve {container}.{dependency}: {reason}")]
pub struct ResolutionError {
    pub container: &'static str,
    pub dependency: &'static str,
    pub reason: String,
}

pub struct Singleton<T: ?Sized> {
    container: &'static str,
    name: &'static str,
    cell: OnceCell<Arc<T>>,
    constructions: AtomicUsize,
}

impl<T: ?Sized> Singleton<T> {
    #[must_use]
    pub const fn new(container: &'static str, name: &'static str) -> Self {
        Self {
            container,
            name,
            cell: OnceCell::new(),
            constructions: AtomicUsize::new(0),
        }
    }

    /// The cached instance, constructing it with `factory` on first access.
    pub fn get_or_init<F>(&self, factory: F) -> Result<Arc<T>, ResolutionError>
    where
        F: FnOnce() -> Result<Arc<T>, FactoryError>,
    {
        self.cell
            .get_or_try_init(|| {
                self.constructions.fetch_add(1, Ordering::SeqCst);
                debug!(
                    container = self.container,
                    dependency = self.name,
                    "[container] Constructing singleton"
                );
                factory().map_err(|e| ResolutionError {
                    container: self.container,
                    dependency: self.name,
                    reason: e.to_string(),
                })
            })
            .map(Arc::clone)
    }

    /// The instance, if it has been constructed.
    #[must_use]
    pub fn get(&self) -> Option<Arc<T>> {
        self.cell.get().cloned()
    }

    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.cell.get().is_some()
    }

    /// Factory invocations so far, failed ones included.
    #[must_use]
    pub fn construction_count(&self) -> usize {
        self.constructions.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<T: ?Sized> fmt::Debug for Singleton<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Singleton")
            .field("container", &self.container)
            .field("name", &self.name)
            .field("resolved", &self.is_resolved())
            .finish()
    }
}
