//! # Shared Bus - Event Bus for Inter-Capability Communication
//!
//! ## Rules
//!
//! - Capabilities never call each other directly; they publish and subscribe
//!   on the bus.
//! - Topics are the closed [`Topic`](shared_types::Topic) set. String topic
//!   names are validated at registration.
//! - Delivery for a topic follows registration order and runs on the
//!   publishing thread. A failing handler is logged and skipped.
//!
//! ```text
//! ┌──────────────┐                    ┌──────────────┐
//! │ Capability A │                    │ Capability B │
//! │              │    publish()       │  worker task │
//! │              │ ──────┐            │      ▲       │
//! └──────────────┘       │            └──────┼───────┘
//!                        ▼                   │ mpsc
//!                  ┌──────────────┐   ┌──────┴───────┐
//!                  │  Event Bus   │──▶│ forwarding   │
//!                  │              │   │ handler      │
//!                  └──────────────┘   └──────────────┘
//!                                  subscribe()
//! ```
//!
//! [`ServiceRuntime`] is the bridge on the right-hand side: it turns
//! synchronous deliveries into a FIFO feed for an async [`EventProcessor`].

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

use std::time::Duration;

pub mod publisher;
pub mod runtime;
pub mod subscriber;

// Re-export main types
pub use publisher::{BusError, DeliveryReport, InMemoryEventBus};
pub use runtime::{EventProcessor, Publisher, ServiceRuntime};
pub use subscriber::{EventHandler, HandlerError, SubscriptionId};

/// Upper bound for a service's `stop()` to drain its workers.
pub const SERVICE_STOP_TIMEOUT: Duration = Duration::from_secs(5);
