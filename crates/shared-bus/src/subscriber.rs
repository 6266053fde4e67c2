//! # Event Subscriber
//!
//! Defines the subscription side of the event bus.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use shared_types::Event;
use thiserror::Error;

/// A subscriber failed while handling an event.
///
/// Caught and logged at the bus boundary; never reaches the publisher.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Event handler failed: {0}")]
pub struct HandlerError(pub String);

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Callback registered on a topic.
pub trait EventHandler: Send + Sync {
    fn handle(&self, event: &Event) -> Result<(), HandlerError>;
}

impl<F> EventHandler for F
where
    F: Fn(&Event) -> Result<(), HandlerError> + Send + Sync,
{
    fn handle(&self, event: &Event) -> Result<(), HandlerError> {
        self(event)
    }
}

/// Handle returned by `subscribe`, needed to unsubscribe.
///
/// Ids are issued in increasing order, so they also record registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub(crate) u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// A registered handler.
#[derive(Clone)]
pub(crate) struct Registration {
    pub(crate) id: SubscriptionId,
    pub(crate) handler: Arc<dyn EventHandler>,
}

/// Best-effort text of a caught panic.
pub(crate) fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::{TextSignalEvent, Topic};

    #[test]
    fn test_closure_is_a_handler() {
        let handler = |event: &Event| {
            if event.payload().as_text().is_some() {
                Ok(())
            } else {
                Err(HandlerError::new("expected text"))
            }
        };
        let event = Event::new(Topic::TextIn, "test", TextSignalEvent::for_text("hi"));
        assert!(handler.handle(&event).is_ok());
    }

    #[test]
    fn test_panic_message() {
        let caught = std::panic::catch_unwind(|| panic!("boom")).unwrap_err();
        assert_eq!(panic_message(caught.as_ref()), "boom");

        let caught = std::panic::catch_unwind(|| panic!("{} failed", "vad")).unwrap_err();
        assert_eq!(panic_message(caught.as_ref()), "vad failed");
    }

    #[test]
    fn test_subscription_id_display() {
        assert_eq!(SubscriptionId(7).to_string(), "sub-7");
    }
}
