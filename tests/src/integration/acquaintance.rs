//! # Acquaintance Flow
//!
//! ```text
//! cltl.topic.face_id ──▶ G2KY ──▶ cltl.topic.text_out ──┬──▶ Chat UI (current chat)
//!                         ▲                             └──▶ TTS ──▶ GET /host/text
//! POST /chatui/chat/:id ──┘ (cltl.topic.text_in)
//! ```

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::http::StatusCode;
    use axum::Router;
    use serde_json::json;
    use shared_bus::InMemoryEventBus;
    use shared_types::{Event, FaceIdEvent, Topic};

    use crate::integration::support::{chat_with, get_json, post_json, started};

    const QUESTION: &str = "Hi, I don't think we have met. What's your name?";

    fn see_face(bus: &InMemoryEventBus, identity: &str) {
        let event = Event::new(
            Topic::FaceId,
            "camera",
            FaceIdEvent {
                signal_id: format!("image-{identity}"),
                face_index: 0,
                identity: identity.to_string(),
            },
        );
        bus.publish(event).unwrap();
    }

    async fn say(router: &Router, text: &str) {
        let (status, body) = post_json(router, "/chatui/chat/c1", json!({ "text": text })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["speaker"], "user");
    }

    async fn spoken(router: &Router, count: usize) -> Vec<String> {
        let mut spoken = Vec::new();
        for _ in 0..500 {
            let (_, body) = get_json(router, "/host/text").await;
            spoken.extend(serde_json::from_value::<Vec<String>>(body).unwrap());
            if spoken.len() >= count {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        spoken
    }

    #[tokio::test]
    async fn test_new_face_is_asked_for_a_name() {
        let (app, router) = started().await;
        say(&router, "hello").await;

        see_face(app.bus(), "7");
        let chat = chat_with(&router, "c1", 2).await;
        assert_eq!(chat[0]["text"], "hello");
        assert_eq!(chat[1]["speaker"], "Leolani");
        assert_eq!(chat[1]["text"], QUESTION);

        say(&router, "My name is Ada").await;
        let chat = chat_with(&router, "c1", 4).await;
        assert_eq!(chat[3]["text"], "Nice to meet you, Ada!");

        assert_eq!(
            spoken(&router, 2).await,
            vec![QUESTION.to_string(), "Nice to meet you, Ada!".to_string()]
        );

        app.stop().await;
    }

    #[tokio::test]
    async fn test_known_face_is_greeted_by_name() {
        let (app, router) = started().await;
        say(&router, "hello").await;

        see_face(app.bus(), "7");
        chat_with(&router, "c1", 2).await;
        say(&router, "I'm Ada").await;
        chat_with(&router, "c1", 4).await;

        see_face(app.bus(), "8");
        let chat = chat_with(&router, "c1", 5).await;
        assert_eq!(chat[4]["text"], QUESTION);

        see_face(app.bus(), "7");
        let chat = chat_with(&router, "c1", 6).await;
        assert_eq!(chat[5]["text"], "Hi Ada, good to see you again!");

        app.stop().await;
    }

    #[tokio::test]
    async fn test_face_in_view_is_not_asked_twice() {
        let (app, router) = started().await;
        say(&router, "hello").await;

        see_face(app.bus(), "7");
        see_face(app.bus(), "7");
        chat_with(&router, "c1", 2).await;

        // Both sightings are processed before the answer.
        say(&router, "Ada").await;
        let chat = chat_with(&router, "c1", 4).await;
        assert_eq!(chat.len(), 4);
        assert_eq!(chat[3]["text"], "Nice to meet you, Ada!");

        app.stop().await;
    }
}
