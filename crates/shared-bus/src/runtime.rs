//! # Service Runtime
//!
//! Subscription and worker bookkeeping for one capability service.
//!
//! Bus delivery is synchronous; services are async. `consume` registers a
//! forwarding handler per topic that enqueues into an unbounded channel, and
//! one worker task drains that channel in FIFO order through the service's
//! [`EventProcessor`].
//!
//! `stop` is the only cancellation primitive: it removes every registration,
//! signals the workers and waits for them up to a deadline before aborting.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::FutureExt;
use parking_lot::Mutex;
use shared_types::{Event, Payload, Topic};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::publisher::{BusError, DeliveryReport, InMemoryEventBus};
use crate::subscriber::{panic_message, HandlerError, SubscriptionId};

/// Async consumer of bus events.
#[async_trait]
pub trait EventProcessor: Send + Sync + 'static {
    async fn process(&self, event: Event) -> Result<(), HandlerError>;
}

/// Cloneable publishing handle that stamps events with a service name.
#[derive(Clone)]
pub struct Publisher {
    source: Arc<str>,
    bus: Arc<InMemoryEventBus>,
}

impl Publisher {
    pub fn new(source: &str, bus: Arc<InMemoryEventBus>) -> Self {
        Self {
            source: Arc::from(source),
            bus,
        }
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn publish(
        &self,
        topic: Topic,
        payload: impl Into<Payload>,
    ) -> Result<DeliveryReport, BusError> {
        self.bus.publish(Event::new(topic, &*self.source, payload))
    }
}

/// Owns the subscriptions and worker tasks of a named service.
pub struct ServiceRuntime {
    name: String,
    bus: Arc<InMemoryEventBus>,
    subscriptions: Mutex<Vec<(Topic, SubscriptionId)>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    shutdown_tx: watch::Sender<bool>,
}

impl ServiceRuntime {
    pub fn new(name: impl Into<String>, bus: Arc<InMemoryEventBus>) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            name: name.into(),
            bus,
            subscriptions: Mutex::new(Vec::new()),
            workers: Mutex::new(Vec::new()),
            shutdown_tx,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn bus(&self) -> &Arc<InMemoryEventBus> {
        &self.bus
    }

    /// Handle for processors and background tasks that publish.
    #[must_use]
    pub fn publisher(&self) -> Publisher {
        Publisher::new(&self.name, Arc::clone(&self.bus))
    }

    /// Feed events from `topics` to `processor` on a dedicated worker task.
    ///
    /// Must be called from within a tokio runtime.
    pub fn consume<P>(&self, topics: &[Topic], processor: Arc<P>)
    where
        P: EventProcessor,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<Event>();
        let mut shutdown = self.shutdown_tx.subscribe();
        let name = self.name.clone();

        let worker = tokio::spawn(async move {
            let stopped = *shutdown.borrow();
            if stopped {
                return;
            }
            loop {
                tokio::select! {
                    biased;
                    _ = shutdown.changed() => break,
                    next = rx.recv() => {
                        let Some(event) = next else { break };
                        let topic = event.topic();
                        match AssertUnwindSafe(processor.process(event)).catch_unwind().await {
                            Ok(Ok(())) => {}
                            Ok(Err(e)) => {
                                warn!(service = %name, topic = %topic, error = %e, "[runtime] Event processing failed");
                            }
                            Err(panic) => {
                                warn!(
                                    service = %name,
                                    topic = %topic,
                                    panic = %panic_message(panic.as_ref()),
                                    "[runtime] Event processor panicked"
                                );
                            }
                        }
                    }
                }
            }
            debug!(service = %name, "[runtime] Worker finished");
        });
        self.workers.lock().push(worker);

        let mut subscriptions = self.subscriptions.lock();
        for &topic in topics {
            let tx = tx.clone();
            let service = self.name.clone();
            let id = self.bus.subscribe(topic, move |event: &Event| {
                tx.send(event.clone())
                    .map_err(|_| HandlerError::new(format!("{service} is not consuming")))
            });
            subscriptions.push((topic, id));
        }
        info!(service = %self.name, topics = ?topics, "[runtime] Consuming");
    }

    /// Run a background task until it completes or the service stops.
    pub fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut shutdown = self.shutdown_tx.subscribe();
        let handle = tokio::spawn(async move {
            let stopped = *shutdown.borrow();
            if stopped {
                return;
            }
            tokio::select! {
                _ = shutdown.changed() => {}
                _ = task => {}
            }
        });
        self.workers.lock().push(handle);
    }

    /// Publish `payload` on `topic` with this service as the source.
    pub fn publish(
        &self,
        topic: Topic,
        payload: impl Into<Payload>,
    ) -> Result<DeliveryReport, BusError> {
        self.publisher().publish(topic, payload)
    }

    /// Registrations currently held on the bus.
    #[must_use]
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.lock().len()
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.workers.lock().is_empty() || !self.subscriptions.lock().is_empty()
    }

    /// Unsubscribe everything and wind down the workers within `timeout`.
    ///
    /// Safe to call when nothing was started and safe to call repeatedly.
    /// The runtime can `consume` again afterwards.
    pub async fn stop(&self, timeout: Duration) {
        let subscriptions = std::mem::take(&mut *self.subscriptions.lock());
        for (topic, id) in &subscriptions {
            self.bus.unsubscribe(*topic, *id);
        }

        let workers = std::mem::take(&mut *self.workers.lock());
        if subscriptions.is_empty() && workers.is_empty() {
            return;
        }

        self.shutdown_tx.send_replace(true);
        let deadline = tokio::time::Instant::now() + timeout;
        let mut aborted = 0usize;
        for mut worker in workers {
            match tokio::time::timeout_at(deadline, &mut worker).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!(service = %self.name, error = %e, "[runtime] Worker ended abnormally"),
                Err(_) => {
                    worker.abort();
                    aborted += 1;
                }
            }
        }
        self.shutdown_tx.send_replace(false);

        if aborted > 0 {
            warn!(service = %self.name, aborted, "[runtime] Aborted workers after stop timeout");
        }
        info!(
            service = %self.name,
            unsubscribed = subscriptions.len(),
            "[runtime] Stopped"
        );
    }
}
