//! Skill model.
//!
//! A skill is a tracked subject the user is learning. Sessions accumulate
//! time onto it, the scheduler keeps its review cadence, and roadmap
//! generation fills in its level/goals/timeline metadata.

use serde::{Deserialize, Serialize};

/// Skill difficulty tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillDifficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl SkillDifficulty {
    /// Get the string representation for storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }

    /// Exact parse; returns `None` for anything else.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "beginner" => Some(Self::Beginner),
            "intermediate" => Some(Self::Intermediate),
            "advanced" => Some(Self::Advanced),
            _ => None,
        }
    }

    /// Parse a stored value, falling back to the default.
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        Self::parse(&s.to_lowercase()).unwrap_or_default()
    }
}

impl Default for SkillDifficulty {
    fn default() -> Self {
        Self::Beginner
    }
}

/// Skill lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillStatus {
    Active,
    Archived,
}

impl SkillStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Archived => "archived",
        }
    }

    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "archived" => Self::Archived,
            _ => Self::Active,
        }
    }
}

impl Default for SkillStatus {
    fn default() -> Self {
        Self::Active
    }
}

/// A tracked skill.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Skill {
    /// Stable integer identifier (SQLite rowid).
    pub id: i64,

    /// Unique, case-sensitive name.
    pub name: String,

    /// Free-text category (e.g. "programming").
    pub category: Option<String>,

    pub difficulty: SkillDifficulty,

    /// Free-text target ("conversational fluency", "production-ready").
    pub target_level: Option<String>,

    pub status: SkillStatus,

    /// Accumulated session minutes; only ever grows.
    pub total_time_minutes: i64,

    /// Unix milliseconds.
    pub last_reviewed: Option<i64>,
    pub next_review: Option<i64>,

    /// Roadmap metadata, written by `roadmap generate`.
    pub current_level: Option<String>,
    pub goals: Option<String>,
    pub timeline: Option<String>,
    pub roadmap_generated: bool,

    pub notes: Option<String>,

    pub created_at: i64,
    pub updated_at: i64,
}

/// Aggregate learning-item statistics for a skill.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SkillStats {
    pub item_count: i64,
    pub avg_confidence: Option<f64>,
    pub total_correct: i64,
    pub total_reviews: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difficulty_parsing() {
        assert_eq!(
            SkillDifficulty::parse("advanced"),
            Some(SkillDifficulty::Advanced)
        );
        assert_eq!(SkillDifficulty::parse("ADVANCED"), None);
        assert_eq!(
            SkillDifficulty::from_str_or_default("ADVANCED"),
            SkillDifficulty::Advanced
        );
        assert_eq!(
            SkillDifficulty::from_str_or_default("garbled"),
            SkillDifficulty::Beginner
        );
    }

    #[test]
    fn test_status_round_trip() {
        assert_eq!(SkillStatus::Active.as_str(), "active");
        assert_eq!(
            SkillStatus::from_str_or_default("archived"),
            SkillStatus::Archived
        );
        assert_eq!(SkillStatus::from_str_or_default("???"), SkillStatus::Active);
    }
}
