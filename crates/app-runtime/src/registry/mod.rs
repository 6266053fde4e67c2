//! # Capability Registry
//!
//! Every capability container implements [`Capability`]. The
//! [`LifecycleOrchestrator`] starts them over the shared infrastructure in a
//! fixed order and stops them in exactly the reverse order.
//!
//! ```text
//!   start():  infra ──▶ C1 ──▶ C2 ──▶ ... ──▶ Ck
//!   stop():   Ck ──▶ ... ──▶ C2 ──▶ C1 ──▶ infra
//!
//!   Cj fails: Cj ──▶ Cj-1 ──▶ ... ──▶ C1 ──▶ infra    (Cj+1.. never start)
//! ```
//!
//! Configuration is validated for every capability before the first one
//! starts. Transitions are serialized; `stop()` only touches what actually
//! started, so it is safe after a failed or missing `start()` and when
//! repeated.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use shared_config::{ConfigError, ConfigKey, ConfigurationSource};
use thiserror::Error;
use tracing::{error, info};

use crate::container::{InfraContext, ResolutionError};

/// The capabilities an application is composed of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CapabilityId {
    Backend,
    ChatUi,
    Vad,
    Asr,
    VectorId,
    FaceRecognition,
    G2ky,
}

impl CapabilityId {
    /// Display name used in lifecycle logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Backend => "Backend",
            Self::ChatUi => "Chat UI",
            Self::Vad => "VAD",
            Self::Asr => "ASR",
            Self::VectorId => "Vector ID",
            Self::FaceRecognition => "Face Recognition",
            Self::G2ky => "G2KY",
        }
    }
}

impl fmt::Display for CapabilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Capability lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapabilityStatus {
    /// Composed but never started.
    Registered,
    Starting,
    Running,
    Stopping,
    /// Stopped gracefully.
    Stopped,
    /// `start()` failed; rolled back.
    Failed,
}

#[derive(Debug, Error)]
pub enum CapabilityError {
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error("{capability} failed to start: {reason}")]
    Start {
        capability: CapabilityId,
        reason: String,
    },
}

impl CapabilityError {
    pub fn start(capability: CapabilityId, reason: impl fmt::Display) -> Self {
        Self::Start {
            capability,
            reason: reason.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum LifecycleError {
    /// Configuration is missing or mistyped; nothing was started.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A capability failed to start; everything started before it was stopped.
    #[error("Failed to start {capability}: {source}")]
    StartFailed {
        capability: CapabilityId,
        source: CapabilityError,
    },

    #[error("Application is already started")]
    AlreadyStarted,
}

/// A composable unit with its own start/stop hooks.
#[async_trait]
pub trait Capability: Send + Sync {
    fn id(&self) -> CapabilityId;

    fn name(&self) -> &'static str {
        self.id().name()
    }

    /// Configuration keys that must be present before anything starts.
    fn required_config(&self) -> &'static [ConfigKey];

    /// Parse every configuration value the capability reads, without
    /// constructing anything.
    fn validate_config(&self, config: &ConfigurationSource) -> Result<(), ConfigError>;

    /// Resolve dependencies and begin handling events.
    async fn start(&self) -> Result<(), CapabilityError>;

    /// Stop whatever was started. Must tolerate a partial `start()`.
    async fn stop(&self);
}

#[derive(Default)]
struct LifecycleState {
    /// Indices into `capabilities`, in start order.
    started: Vec<usize>,
    running: bool,
}

pub struct LifecycleOrchestrator {
    infra: Arc<InfraContext>,
    capabilities: Vec<Arc<dyn Capability>>,
    status: RwLock<HashMap<CapabilityId, CapabilityStatus>>,
    state: tokio::sync::Mutex<LifecycleState>,
}

impl LifecycleOrchestrator {
    /// `capabilities` are started in the given order.
    pub fn new(infra: Arc<InfraContext>, capabilities: Vec<Arc<dyn Capability>>) -> Self {
        let status = capabilities
            .iter()
            .map(|c| (c.id(), CapabilityStatus::Registered))
            .collect();
        Self {
            infra,
            capabilities,
            status: RwLock::new(status),
            state: tokio::sync::Mutex::new(LifecycleState::default()),
        }
    }

    #[must_use]
    pub fn order(&self) -> Vec<CapabilityId> {
        self.capabilities.iter().map(|c| c.id()).collect()
    }

    /// Every required key of every capability.
    #[must_use]
    pub fn required_config(&self) -> Vec<ConfigKey> {
        self.capabilities
            .iter()
            .flat_map(|c| c.required_config().iter().copied())
            .collect()
    }

    /// Check every required key, then every typed value, of every capability.
    pub fn validate_config(&self) -> Result<(), ConfigError> {
        let config = self.infra.config();
        config.require(&self.required_config())?;
        for capability in &self.capabilities {
            capability.validate_config(config).inspect_err(|e| {
                error!(capability = %capability.id(), error = %e, "[lifecycle] Invalid configuration");
            })?;
        }
        Ok(())
    }

    pub async fn start(&self) -> Result<(), LifecycleError> {
        let mut state = self.state.lock().await;
        if state.running {
            return Err(LifecycleError::AlreadyStarted);
        }

        self.validate_config()?;
        self.infra.start();
        for (index, capability) in self.capabilities.iter().enumerate() {
            let id = capability.id();
            self.set_status(id, CapabilityStatus::Starting);
            info!("Start {}", capability.name());

            match capability.start().await {
                Ok(()) => {
                    self.set_status(id, CapabilityStatus::Running);
                    state.started.push(index);
                }
                Err(source) => {
                    error!(capability = %id, error = %source, "[lifecycle] Start failed, rolling back");
                    info!("Stop {}", capability.name());
                    capability.stop().await;
                    self.set_status(id, CapabilityStatus::Failed);
                    self.stop_started(&mut state).await;
                    self.infra.stop();
                    return Err(LifecycleError::StartFailed {
                        capability: id,
                        source,
                    });
                }
            }
        }

        state.running = true;
        info!(capabilities = self.capabilities.len(), "[lifecycle] All capabilities running");
        Ok(())
    }

    /// Stop in reverse start order, then tear down the infrastructure.
    pub async fn stop(&self) {
        let mut state = self.state.lock().await;
        if !state.running && state.started.is_empty() {
            return;
        }
        self.stop_started(&mut state).await;
        self.infra.stop();
        state.running = false;
        info!("[lifecycle] All capabilities stopped");
    }

    async fn stop_started(&self, state: &mut LifecycleState) {
        while let Some(index) = state.started.pop() {
            let capability = &self.capabilities[index];
            self.set_status(capability.id(), CapabilityStatus::Stopping);
            info!("Stop {}", capability.name());
            capability.stop().await;
            self.set_status(capability.id(), CapabilityStatus::Stopped);
        }
    }

    fn set_status(&self, id: CapabilityId, status: CapabilityStatus) {
        self.status.write().insert(id, status);
    }

    #[must_use]
    pub fn status(&self, id: CapabilityId) -> Option<CapabilityStatus> {
        self.status.read().get(&id).copied()
    }

    /// Statuses in start order.
    #[must_use]
    pub fn statuses(&self) -> Vec<(CapabilityId, CapabilityStatus)> {
        let status = self.status.read();
        self.capabilities
            .iter()
            .filter_map(|c| status.get(&c.id()).map(|s| (c.id(), *s)))
            .collect()
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.statuses()
            .iter()
            .all(|(_, status)| *status == CapabilityStatus::Running)
    }

    pub fn log_status(&self) {
        info!("===========================================");
        info!("  CAPABILITY STATUS");
        info!("===========================================");
        for (id, status) in self.statuses() {
            info!("  {:20} {:?}", id.name(), status);
        }
        info!("===========================================");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use tokio::sync::Notify;
    use tokio_test::{assert_pending, assert_ready, assert_ready_ok, task};

    type Journal = Arc<Mutex<Vec<String>>>;

    struct Recording {
        id: CapabilityId,
        journal: Journal,
        fail_start: bool,
        fail_config: bool,
        gate: Option<Arc<Notify>>,
    }

    #[async_trait]
    impl Capability for Recording {
        fn id(&self) -> CapabilityId {
            self.id
        }

        fn required_config(&self) -> &'static [ConfigKey] {
            &[]
        }

        fn validate_config(&self, _: &ConfigurationSource) -> Result<(), ConfigError> {
            if self.fail_config {
                return Err(ConfigError::InvalidType {
                    section: "cltl.vad".to_string(),
                    key: "threshold".to_string(),
                    expected: "a number",
                });
            }
            Ok(())
        }

        async fn start(&self) -> Result<(), CapabilityError> {
            self.journal.lock().push(format!("start {}", self.id));
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            if self.fail_start {
                return Err(CapabilityError::start(self.id, "boom"));
            }
            Ok(())
        }

        async fn stop(&self) {
            self.journal.lock().push(format!("stop {}", self.id));
        }
    }

    const ORDER: [CapabilityId; 7] = [
        CapabilityId::Backend,
        CapabilityId::ChatUi,
        CapabilityId::Vad,
        CapabilityId::Asr,
        CapabilityId::VectorId,
        CapabilityId::FaceRecognition,
        CapabilityId::G2ky,
    ];

    fn orchestrator(failing: Option<CapabilityId>) -> (LifecycleOrchestrator, Journal) {
        composed(failing, None)
    }

    fn composed(
        failing: Option<CapabilityId>,
        misconfigured: Option<CapabilityId>,
    ) -> (LifecycleOrchestrator, Journal) {
        let journal: Journal = Arc::default();
        let capabilities = ORDER
            .iter()
            .map(|&id| {
                Arc::new(Recording {
                    id,
                    journal: Arc::clone(&journal),
                    fail_start: failing == Some(id),
                    fail_config: misconfigured == Some(id),
                    gate: None,
                }) as Arc<dyn Capability>
            })
            .collect();
        let infra = Arc::new(InfraContext::new(ConfigurationSource::default()));
        (LifecycleOrchestrator::new(infra, capabilities), journal)
    }

    #[tokio::test]
    async fn test_stop_reverses_start() {
        let (orchestrator, journal) = orchestrator(None);
        orchestrator.start().await.unwrap();
        assert!(orchestrator.is_running());
        orchestrator.stop().await;

        let expected: Vec<String> = ORDER
            .iter()
            .map(|id| format!("start {id}"))
            .chain(ORDER.iter().rev().map(|id| format!("stop {id}")))
            .collect();
        assert_eq!(*journal.lock(), expected);
        assert!(orchestrator
            .statuses()
            .iter()
            .all(|(_, s)| *s == CapabilityStatus::Stopped));
    }

    #[tokio::test]
    async fn test_failure_rolls_back_in_reverse() {
        let (orchestrator, journal) = orchestrator(Some(CapabilityId::Asr));
        let err = orchestrator.start().await.unwrap_err();
        assert!(matches!(
            err,
            LifecycleError::StartFailed {
                capability: CapabilityId::Asr,
                ..
            }
        ));

        assert_eq!(
            *journal.lock(),
            vec![
                "start Backend",
                "start Chat UI",
                "start VAD",
                "start ASR",
                "stop ASR",
                "stop VAD",
                "stop Chat UI",
                "stop Backend",
            ]
        );
        assert_eq!(orchestrator.status(CapabilityId::Asr), Some(CapabilityStatus::Failed));
        assert_eq!(
            orchestrator.status(CapabilityId::G2ky),
            Some(CapabilityStatus::Registered)
        );

        // Nothing left to stop.
        orchestrator.stop().await;
        assert_eq!(journal.lock().len(), 8);
    }

    #[tokio::test]
    async fn test_invalid_config_starts_nothing() {
        let (orchestrator, journal) = composed(None, Some(CapabilityId::Vad));
        let err = orchestrator.start().await.unwrap_err();
        assert!(matches!(
            err,
            LifecycleError::Config(ConfigError::InvalidType { .. })
        ));

        assert!(journal.lock().is_empty());
        assert!(orchestrator
            .statuses()
            .iter()
            .all(|(_, s)| *s == CapabilityStatus::Registered));
        assert!(!orchestrator.infra.is_started());
    }

    #[tokio::test]
    async fn test_stop_without_start_is_noop() {
        let (orchestrator, journal) = orchestrator(None);
        orchestrator.stop().await;
        orchestrator.stop().await;
        assert!(journal.lock().is_empty());
    }

    #[tokio::test]
    async fn test_second_start_is_rejected() {
        let (orchestrator, journal) = orchestrator(None);
        orchestrator.start().await.unwrap();
        assert!(matches!(
            orchestrator.start().await,
            Err(LifecycleError::AlreadyStarted)
        ));
        orchestrator.stop().await;
        orchestrator.stop().await;
        assert_eq!(journal.lock().len(), 14);
    }

    #[test]
    fn test_stop_waits_for_start_in_progress() {
        let journal: Journal = Arc::default();
        let gate = Arc::new(Notify::new());
        let backend = Arc::new(Recording {
            id: CapabilityId::Backend,
            journal: Arc::clone(&journal),
            fail_start: false,
            fail_config: false,
            gate: Some(Arc::clone(&gate)),
        });
        let infra = Arc::new(InfraContext::new(ConfigurationSource::default()));
        let orchestrator = LifecycleOrchestrator::new(infra, vec![backend as Arc<dyn Capability>]);

        let mut start = task::spawn(orchestrator.start());
        let mut stop = task::spawn(orchestrator.stop());
        assert_pending!(start.poll());
        assert_pending!(stop.poll());
        assert_eq!(
            orchestrator.status(CapabilityId::Backend),
            Some(CapabilityStatus::Starting)
        );

        gate.notify_one();
        assert!(start.is_woken());
        assert_ready_ok!(start.poll());
        assert!(stop.is_woken());
        assert_ready!(stop.poll());

        assert_eq!(*journal.lock(), vec!["start Backend", "stop Backend"]);
        assert_eq!(
            orchestrator.status(CapabilityId::Backend),
            Some(CapabilityStatus::Stopped)
        );
    }

    #[test]
    fn test_display_names() {
        let names: Vec<_> = ORDER.iter().map(CapabilityId::name).collect();
        assert_eq!(
            names,
            vec!["Backend", "Chat UI", "VAD", "ASR", "Vector ID", "Face Recognition", "G2KY"]
        );
        let (orchestrator, _) = orchestrator(None);
        assert_eq!(orchestrator.order(), ORDER.to_vec());
    }
}
