//! # Event Publisher
//!
//! The in-memory bus: per-topic handler lists, synchronous fan-out.

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use shared_types::{Event, PayloadKind, Topic, UnknownTopic};
use thiserror::Error;
use tracing::{debug, warn};

use crate::subscriber::{panic_message, EventHandler, HandlerError, Registration, SubscriptionId};

/// Errors raised by the bus itself. Handler failures are never reported here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BusError {
    #[error(transparent)]
    UnknownTopic(#[from] UnknownTopic),

    #[error("Payload {payload:?} cannot be published on {topic}")]
    PayloadMismatch { topic: Topic, payload: PayloadKind },
}

/// Outcome of a single `publish`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Handlers that returned `Ok`.
    pub delivered: usize,
    /// Handlers that returned `Err` or panicked.
    pub failed: usize,
}

impl DeliveryReport {
    /// Number of handlers the event was offered to.
    #[must_use]
    pub fn attempted(&self) -> usize {
        self.delivered + self.failed
    }
}

/// In-process publish/subscribe bus keyed by [`Topic`].
///
/// Delivery happens on the publisher's thread, in registration order. The
/// handler list is snapshotted first, so handlers may publish, subscribe or
/// unsubscribe while being called.
#[derive(Default)]
pub struct InMemoryEventBus {
    handlers: RwLock<HashMap<Topic, Vec<Registration>>>,
    next_id: AtomicU64,
    events_published: AtomicU64,
    handler_failures: AtomicU64,
}

impl InMemoryEventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a closure on `topic`.
    pub fn subscribe<F>(&self, topic: Topic, handler: F) -> SubscriptionId
    where
        F: Fn(&Event) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        self.subscribe_arc(topic, Arc::new(handler))
    }

    /// Register an already shared handler on `topic`.
    pub fn subscribe_arc(&self, topic: Topic, handler: Arc<dyn EventHandler>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.handlers
            .write()
            .entry(topic)
            .or_default()
            .push(Registration { id, handler });
        debug!(topic = %topic, subscription = %id, "[bus] Subscribed");
        id
    }

    /// Register `handler` on a topic given by name.
    ///
    /// Fails with [`BusError::UnknownTopic`] if the name is not a [`Topic`].
    pub fn subscribe_named<F>(&self, topic: &str, handler: F) -> Result<SubscriptionId, BusError>
    where
        F: Fn(&Event) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        let topic: Topic = topic.parse()?;
        Ok(self.subscribe(topic, handler))
    }

    /// Remove a registration. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, topic: Topic, id: SubscriptionId) -> bool {
        let mut handlers = self.handlers.write();
        let Some(registrations) = handlers.get_mut(&topic) else {
            return false;
        };
        let before = registrations.len();
        registrations.retain(|r| r.id != id);
        let removed = registrations.len() < before;
        if registrations.is_empty() {
            handlers.remove(&topic);
        }
        if removed {
            debug!(topic = %topic, subscription = %id, "[bus] Unsubscribed");
        }
        removed
    }

    /// Deliver `event` to every handler registered on its topic.
    pub fn publish(&self, event: Event) -> Result<DeliveryReport, BusError> {
        let topic = event.topic();
        let kind = event.payload().kind();
        if topic.payload_kind() != kind {
            return Err(BusError::PayloadMismatch {
                topic,
                payload: kind,
            });
        }

        self.events_published.fetch_add(1, Ordering::Relaxed);

        let snapshot: Vec<Registration> = self
            .handlers
            .read()
            .get(&topic)
            .cloned()
            .unwrap_or_default();

        let mut report = DeliveryReport::default();
        for registration in &snapshot {
            let outcome = catch_unwind(AssertUnwindSafe(|| registration.handler.handle(&event)));
            match outcome {
                Ok(Ok(())) => report.delivered += 1,
                Ok(Err(e)) => {
                    report.failed += 1;
                    warn!(
                        topic = %topic,
                        subscription = %registration.id,
                        error = %e,
                        "[bus] Handler failed"
                    );
                }
                Err(panic) => {
                    report.failed += 1;
                    warn!(
                        topic = %topic,
                        subscription = %registration.id,
                        panic = %panic_message(panic.as_ref()),
                        "[bus] Handler panicked"
                    );
                }
            }
        }

        if report.failed > 0 {
            self.handler_failures
                .fetch_add(report.failed as u64, Ordering::Relaxed);
        }

        debug!(
            topic = %topic,
            source = %event.metadata().source,
            delivered = report.delivered,
            failed = report.failed,
            "[bus] Event published"
        );
        Ok(report)
    }

    /// Number of handlers registered on `topic`.
    #[must_use]
    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.handlers.read().get(&topic).map_or(0, Vec::len)
    }

    /// Number of handlers registered across all topics.
    #[must_use]
    pub fn total_subscriptions(&self) -> usize {
        self.handlers.read().values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn handler_failures(&self) -> u64 {
        self.handler_failures.load(Ordering::Relaxed)
    }

    /// Drop every registration and return how many were removed.
    pub fn clear(&self) -> usize {
        let mut handlers = self.handlers.write();
        let removed = handlers.values().map(Vec::len).sum();
        handlers.clear();
        if removed > 0 {
            debug!(removed, "[bus] Cleared remaining subscriptions");
        }
        removed
    }
}
