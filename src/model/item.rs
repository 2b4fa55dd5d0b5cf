//! Learning item and review event models.

use serde::{Deserialize, Serialize};

/// Kind of knowledge a learning item captures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Concept,
    Fact,
    Qa,
    Example,
}

impl ItemType {
    /// Get the string representation for storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Concept => "concept",
            Self::Fact => "fact",
            Self::Qa => "qa",
            Self::Example => "example",
        }
    }

    /// Exact parse; returns `None` for anything else.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "concept" => Some(Self::Concept),
            "fact" => Some(Self::Fact),
            "qa" => Some(Self::Qa),
            "example" => Some(Self::Example),
            _ => None,
        }
    }

    /// Parse a stored value, falling back to the default.
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        Self::parse(&s.to_lowercase()).unwrap_or_default()
    }
}

impl Default for ItemType {
    fn default() -> Self {
        Self::Concept
    }
}

/// An atomic piece of knowledge queued for spaced repetition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearningItem {
    pub id: i64,
    pub skill_id: i64,
    pub item_type: ItemType,

    /// Required for Q&A items, optional otherwise.
    pub question: Option<String>,
    pub answer: String,

    /// 1-5, clamped on the way in.
    pub difficulty: i64,

    pub times_reviewed: i64,
    pub times_correct: i64,

    /// 1-5; updated to `confidence_after` on every review.
    pub confidence_level: i64,

    /// Unix milliseconds.
    pub last_reviewed: Option<i64>,
    pub next_review: Option<i64>,

    pub tags: Option<String>,
    pub source: Option<String>,
    pub created_at: i64,
}

/// Append-only audit record of a single item review.
///
/// Each event causes exactly one [`LearningItem`] mutation (counters,
/// confidence, next review).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewEvent {
    pub id: i64,
    pub item_id: i64,
    pub was_correct: bool,
    pub confidence_before: i64,
    pub confidence_after: i64,
    pub time_taken_seconds: Option<i64>,

    /// Unix milliseconds.
    pub review_date: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_type_round_trip() {
        for ty in [ItemType::Concept, ItemType::Fact, ItemType::Qa, ItemType::Example] {
            assert_eq!(ItemType::parse(ty.as_str()), Some(ty));
        }
        assert_eq!(ItemType::from_str_or_default("bogus"), ItemType::Concept);
    }
}
