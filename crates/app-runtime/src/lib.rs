//! # G2KY Application Runtime
//!
//! Composition root for the get-to-know-you agent. The binary in `main.rs`
//! loads configuration, starts every capability and serves the web gateway.
//!
//! ## Modules
//!
//! - `container/` - Lazy singleton containers, one per capability
//! - `registry/` - Capability trait and the ordered start/stop orchestrator
//! - `gateway/` - Path-prefix web gateway over the capability web apps
//! - `diagnostics` - Per-topic event logging
//!
//! ## Event Flow
//!
//! ```text
//! mic ──▶ VAD ──▶ ASR ──▶ text_in ──┬──▶ G2KY ──▶ text_out ──┬──▶ TTS
//!                                   │                        └──▶ Chat UI
//! camera ──▶ Face Recognition ──▶ Vector ID ──▶ face_id ──▶ G2KY
//! Chat UI ──▶ text_in
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod container;
pub mod diagnostics;
pub mod gateway;
pub mod registry;

pub use container::{ApplicationContainer, InfraContext, ResolutionError, Singleton, START_ORDER};
pub use diagnostics::install_event_logging;
pub use gateway::{GatewayError, WebConfig, WebGateway};
pub use registry::{
    Capability, CapabilityError, CapabilityId, CapabilityStatus, LifecycleError,
    LifecycleOrchestrator,
};
