//! # Shared Resource
//!
//! Exclusive, named locks over hardware shared between services (the
//! microphone, the camera).
//!
//! Acquisition is scoped: a [`ResourceGuard`] releases its resource when it
//! is dropped, on every exit path including early returns and panics.
//!
//! ```rust,ignore
//! let coordinator = ResourceCoordinator::new();
//! let guard = coordinator.try_acquire(MICROPHONE, "tts")?;
//! // ... speak while the microphone is muted ...
//! drop(guard);
//! ```

use std::collections::HashMap;
use std::pin::pin;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::Notify;
use tracing::debug;

/// Resource name of the microphone.
pub const MICROPHONE: &str = "microphone";

/// Resource name of the camera.
pub const CAMERA: &str = "camera";

/// Errors from resource acquisition. Local to the requesting service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResourceError {
    /// The resource is held by someone else.
    #[error("Resource '{resource}' is held by {holder}")]
    Contention { resource: String, holder: String },

    /// Waiting for the resource exceeded the deadline.
    #[error("Timed out after {waited_ms}ms waiting for resource '{resource}'")]
    Timeout { resource: String, waited_ms: u64 },
}

#[derive(Default)]
struct ResourceState {
    holder: Mutex<Option<String>>,
    released: Notify,
}

impl ResourceState {
    /// Take the resource for `holder`, or name whoever has it.
    fn claim(&self, holder: &str) -> Result<(), String> {
        let mut current = self.holder.lock();
        match current.as_ref() {
            Some(existing) => Err(existing.clone()),
            None => {
                *current = Some(holder.to_string());
                Ok(())
            }
        }
    }
}

/// Issues exclusive locks by resource name.
#[derive(Default)]
pub struct ResourceCoordinator {
    resources: Mutex<HashMap<String, Arc<ResourceState>>>,
}

impl ResourceCoordinator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self, name: &str) -> Arc<ResourceState> {
        Arc::clone(
            self.resources
                .lock()
                .entry(name.to_string())
                .or_default(),
        )
    }

    /// Acquire `name` immediately or fail with [`ResourceError::Contention`].
    pub fn try_acquire(&self, name: &str, holder: &str) -> Result<ResourceGuard, ResourceError> {
        let state = self.state(name);
        match state.claim(holder) {
            Ok(()) => Ok(ResourceGuard::new(name, holder, state)),
            Err(current) => Err(ResourceError::Contention {
                resource: name.to_string(),
                holder: current,
            }),
        }
    }

    /// Acquire `name`, waiting at most `timeout`.
    pub async fn acquire(
        &self,
        name: &str,
        holder: &str,
        timeout: Duration,
    ) -> Result<ResourceGuard, ResourceError> {
        let state = self.state(name);
        let signal = Arc::clone(&state);
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            // Registered before the claim so a release in between is not missed.
            let mut released = pin!(signal.released.notified());
            released.as_mut().enable();

            if state.claim(holder).is_ok() {
                return Ok(ResourceGuard::new(name, holder, state));
            }
            if tokio::time::timeout_at(deadline, released).await.is_err() {
                return Err(ResourceError::Timeout {
                    resource: name.to_string(),
                    waited_ms: timeout.as_millis() as u64,
                });
            }
        }
    }

    /// Current holder of `name`, if any.
    #[must_use]
    pub fn holder(&self, name: &str) -> Option<String> {
        self.resources
            .lock()
            .get(name)
            .and_then(|state| state.holder.lock().clone())
    }

    #[must_use]
    pub fn is_held(&self, name: &str) -> bool {
        self.holder(name).is_some()
    }

    /// Number of resources currently held.
    #[must_use]
    pub fn held_count(&self) -> usize {
        self.resources
            .lock()
            .values()
            .filter(|state| state.holder.lock().is_some())
            .count()
    }
}

/// Scoped ownership of a resource.
pub struct ResourceGuard {
    name: String,
    state: Arc<ResourceState>,
}

impl ResourceGuard {
    /// `state` must already be claimed for `holder`.
    fn new(name: &str, holder: &str, state: Arc<ResourceState>) -> Self {
        debug!(resource = name, holder, "Resource acquired");
        Self {
            name: name.to_string(),
            state,
        }
    }

    #[must_use]
    pub fn resource(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Debug for ResourceGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceGuard")
            .field("resource", &self.name)
            .field("holder", &*self.state.holder.lock())
            .finish()
    }
}

impl Drop for ResourceGuard {
    fn drop(&mut self) {
        let previous = self.state.holder.lock().take();
        self.state.released.notify_waiters();
        debug!(resource = %self.name, holder = ?previous, "Resource released");
    }
}
