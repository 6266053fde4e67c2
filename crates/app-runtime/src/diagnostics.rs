//! Event logging for every topic on the bus.

use shared_bus::{InMemoryEventBus, SubscriptionId};
use shared_types::{Event, Payload, Topic};
use tracing::info;

/// Subscribe a logger to every topic.
pub fn install_event_logging(bus: &InMemoryEventBus) -> Vec<SubscriptionId> {
    Topic::ALL
        .iter()
        .map(|&topic| {
            bus.subscribe(topic, |event: &Event| {
                info!("{}", describe(event));
                Ok(())
            })
        })
        .collect()
}

/// One log line per event. Utterances show only their text.
#[must_use]
pub fn describe(event: &Event) -> String {
    match event.payload() {
        Payload::Text(text) => {
            format!("UTTERANCE event ({}): ({})", event.topic(), text.text())
        }
        payload => format!("APP event ({}): ({})", event.topic(), payload),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::{FaceIdEvent, TextSignalEvent};

    #[test]
    fn test_describe_utterance() {
        let event = Event::new(Topic::TextIn, "test", TextSignalEvent::for_text("hello"));
        assert_eq!(describe(&event), "UTTERANCE event (cltl.topic.text_in): (hello)");
    }

    #[test]
    fn test_describe_app_event() {
        let event = Event::new(
            Topic::FaceId,
            "test",
            FaceIdEvent {
                signal_id: "s1".to_string(),
                face_index: 0,
                identity: "3".to_string(),
            },
        );
        assert_eq!(
            describe(&event),
            "APP event (cltl.topic.face_id): (face_id signal=s1 index=0 identity=3)"
        );
    }

    #[test]
    fn test_logs_every_topic() {
        let bus = InMemoryEventBus::new();
        let ids = install_event_logging(&bus);
        assert_eq!(ids.len(), Topic::ALL.len());
        for topic in Topic::ALL {
            assert_eq!(bus.subscriber_count(topic), 1);
        }

        let report = bus
            .publish(Event::new(
                Topic::TextIn,
                "test",
                TextSignalEvent::for_text("hello"),
            ))
            .unwrap();
        assert_eq!((report.delivered, report.failed), (1, 0));
    }
}
