//! # Shared Types Crate
//!
//! Domain types exchanged between capabilities over the shared bus.
//!
//! ## Design Principles
//!
//! - **Closed topic set**: every bus topic is a [`Topic`] variant. Topic names
//!   coming from configuration are parsed against it, so a typo fails at
//!   registration instead of silently dropping events.
//! - **One payload per topic**: each topic accepts exactly one [`PayloadKind`].
//! - **Immutable events**: an [`Event`] shares its payload behind an `Arc` and
//!   exposes it by reference only.

pub mod event;
pub mod signals;
pub mod topic;

pub use event::{current_millis, Event, EventMetadata, Payload, PayloadKind};
pub use signals::*;
pub use topic::{Topic, UnknownTopic};
