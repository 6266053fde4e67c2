//! # Acquaintance State Machine
//!
//! Tracks who is in view, who has been introduced and whose name is being
//! asked for.

use std::collections::HashMap;

/// Maps face identities to names through conversation.
pub trait GetToKnowYou: Send + Sync {
    /// A face with `identity` is in view. Returns what to say, if anything.
    fn face_seen(&mut self, identity: &str) -> Option<String>;

    /// Someone said `text`. Returns a reply, if anything.
    fn utterance(&mut self, text: &str) -> Option<String>;

    /// Name learned for `identity`.
    fn name_of(&self, identity: &str) -> Option<String>;
}

const NAME_PREFIXES: [&str; 6] = [
    "my name is ",
    "i am ",
    "i'm ",
    "it's ",
    "call me ",
    "this is ",
];

/// Longest reply without an introduction phrase still taken as a name.
const MAX_BARE_NAME_WORDS: usize = 2;

/// Pull a name out of an answer such as "My name is Ada".
#[must_use]
pub fn extract_name(text: &str) -> Option<String> {
    let cleaned = text
        .trim()
        .trim_end_matches(|c: char| c.is_ascii_punctuation())
        .trim();
    let lower = cleaned.to_lowercase();

    let remainder = NAME_PREFIXES
        .iter()
        .find(|prefix| lower.starts_with(*prefix))
        .and_then(|prefix| cleaned.get(prefix.len()..));

    let candidate = match remainder {
        Some(rest) => rest,
        None if cleaned.split_whitespace().count() <= MAX_BARE_NAME_WORDS => cleaned,
        None => return None,
    };

    let name = candidate
        .split(|c: char| c == ',' || c == '.' || c == '!' || c == '?')
        .next()
        .unwrap_or_default()
        .split_whitespace()
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ");

    (!name.is_empty()).then_some(name)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// In-memory acquaintances, lost on restart.
#[derive(Debug, Default)]
pub struct MemoryGetToKnowYou {
    known: HashMap<String, String>,
    /// Identity whose name was asked for.
    pending: Option<String>,
    /// Identity most recently addressed.
    present: Option<String>,
}

impl MemoryGetToKnowYou {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn acquaintances(&self) -> usize {
        self.known.len()
    }

    #[must_use]
    pub fn is_awaiting_name(&self) -> bool {
        self.pending.is_some()
    }
}

impl GetToKnowYou for MemoryGetToKnowYou {
    fn face_seen(&mut self, identity: &str) -> Option<String> {
        if self.present.as_deref() == Some(identity) {
            return None;
        }
        self.present = Some(identity.to_string());

        if let Some(name) = self.known.get(identity) {
            return Some(format!("Hi {name}, good to see you again!"));
        }
        self.pending = Some(identity.to_string());
        Some("Hi, I don't think we have met. What's your name?".to_string())
    }

    fn utterance(&mut self, text: &str) -> Option<String> {
        let identity = self.pending.take()?;
        match extract_name(text) {
            Some(name) => {
                let reply = format!("Nice to meet you, {name}!");
                self.known.insert(identity, name);
                Some(reply)
            }
            None => {
                self.pending = Some(identity);
                Some("Sorry, I didn't catch that. What's your name?".to_string())
            }
        }
    }

    fn name_of(&self, identity: &str) -> Option<String> {
        self.known.get(identity).cloned()
    }
}
