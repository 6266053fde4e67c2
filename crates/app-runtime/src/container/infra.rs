//! # Shared Infrastructure
//!
//! Configuration, event bus and resource coordinator shared by every
//! capability container.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use shared_bus::InMemoryEventBus;
use shared_config::ConfigurationSource;
use shared_resource::ResourceCoordinator;
use tracing::{info, warn};

pub struct InfraContext {
    config: ConfigurationSource,
    bus: Arc<InMemoryEventBus>,
    resources: Arc<ResourceCoordinator>,
    started: AtomicBool,
}

impl InfraContext {
    #[must_use]
    pub fn new(config: ConfigurationSource) -> Self {
        Self {
            config,
            bus: Arc::new(InMemoryEventBus::new()),
            resources: Arc::new(ResourceCoordinator::new()),
            started: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn config(&self) -> &ConfigurationSource {
        &self.config
    }

    #[must_use]
    pub fn bus(&self) -> &Arc<InMemoryEventBus> {
        &self.bus
    }

    #[must_use]
    pub fn resources(&self) -> &Arc<ResourceCoordinator> {
        &self.resources
    }

    pub fn start(&self) {
        if !self.started.swap(true, Ordering::SeqCst) {
            info!(
                sections = self.config.section_names().count(),
                "[infra] Started"
            );
        }
    }

    /// Drop whatever subscriptions remain on the bus.
    pub fn stop(&self) {
        if !self.started.swap(false, Ordering::SeqCst) {
            return;
        }
        let leftover = self.bus.clear();
        if leftover > 0 {
            info!(subscriptions = leftover, "[infra] Cleared remaining subscriptions");
        }
        let held = self.resources.held_count();
        if held > 0 {
            warn!(held, "[infra] Resources still held at shutdown");
        }
        info!("[infra] Stopped");
    }

    #[must_use]
    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }
}
