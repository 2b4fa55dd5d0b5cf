//! Memory models: facts, preferences, goals, conversations, indexed files.

use serde::{Deserialize, Serialize};

/// A remembered fact about some entity ("kubernetes", "my landlord").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fact {
    pub id: i64,
    pub entity: String,
    pub fact: String,

    /// The surrounding text the fact was captured from, if any.
    pub context: Option<String>,

    pub created_at: i64,
}

/// A keyed user preference ("writing_style" → "casual, concise").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preference {
    pub key: String,
    pub value: String,
    pub description: Option<String>,
    pub updated_at: i64,
}

/// A user goal surfaced into the chat system prompt while active.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
    pub id: i64,
    pub goal: String,
    pub deadline: Option<String>,
    pub status: String,
    pub created_at: i64,
    pub completed_at: Option<i64>,
}

/// A saved chat transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: i64,

    /// Auto-extracted from the first user message unless given explicitly.
    pub topic: String,

    /// Flattened `role: content` lines.
    pub transcript: String,

    pub message_count: i64,
    pub created_at: i64,
}

/// A file indexed for search, with an optional model-written summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedFile {
    pub id: i64,
    pub path: String,
    pub summary: Option<String>,
    pub content: String,
    pub indexed_at: i64,
}

/// Extract a short topic from the first user message of a conversation.
///
/// A deliberately crude heuristic kept behind this one function so it can
/// be swapped for something better (or a model call) without touching
/// storage code.
#[must_use]
pub fn extract_topic(first_user_message: &str) -> String {
    let mut topic = first_user_message
        .chars()
        .take(50)
        .collect::<String>()
        .to_lowercase();

    for filler in [
        "what", "how", "why", "when", "where", "can you", "please", "help me",
    ] {
        topic = topic.replace(filler, " ");
    }

    let topic = topic
        .split_whitespace()
        .take(5)
        .collect::<Vec<_>>()
        .join(" ");
    let topic = topic.trim_matches(|c: char| c.is_whitespace() || ",.?!:".contains(c));

    if topic.is_empty() {
        "general".to_string()
    } else {
        topic.to_string()
    }
}

/// Extract the entity a remembered fact is about.
///
/// Looks for an `about <word>` phrase; anything else files under
/// "general". Same replaceable-heuristic contract as [`extract_topic`].
#[must_use]
pub fn extract_entity(fact_text: &str) -> String {
    let lower = fact_text.to_lowercase();
    if let Some(rest) = lower.split(" about ").nth(1) {
        if let Some(word) = rest.split_whitespace().next() {
            let word = word.trim_matches(|c: char| !c.is_alphanumeric());
            if !word.is_empty() {
                return word.to_string();
            }
        }
    }
    "general".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_topic_strips_fillers() {
        let topic = extract_topic("How do I configure nginx reverse proxies?");
        assert!(topic.contains("nginx"));
        assert!(!topic.contains("how"));
    }

    #[test]
    fn test_extract_topic_empty_falls_back() {
        assert_eq!(extract_topic(""), "general");
        assert_eq!(extract_topic("how why when"), "general");
    }

    #[test]
    fn test_extract_entity() {
        assert_eq!(extract_entity("remember this about rust: it is fast"), "rust");
        assert_eq!(extract_entity("something with no marker"), "general");
    }
}
