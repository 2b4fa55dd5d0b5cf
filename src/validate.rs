//! Input normalization for rating and enum fields.
//!
//! Ratings here are low-stakes self-assessments, so out-of-range input
//! coerces to a documented default instead of erroring. Enum-valued text
//! fields resolve in two tiers: exact match, then synonym lookup, then the
//! default.

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::model::{ChallengeDifficulty, ItemType, SkillDifficulty};

/// Default rating when a 1-5 level is absent or out of range.
pub const DEFAULT_LEVEL: i64 = 3;

static SKILL_DIFFICULTY_SYNONYMS: LazyLock<HashMap<&str, SkillDifficulty>> =
    LazyLock::new(|| {
        [
            ("easy", SkillDifficulty::Beginner),
            ("basic", SkillDifficulty::Beginner),
            ("novice", SkillDifficulty::Beginner),
            ("starter", SkillDifficulty::Beginner),
            ("medium", SkillDifficulty::Intermediate),
            ("mid", SkillDifficulty::Intermediate),
            ("moderate", SkillDifficulty::Intermediate),
            ("hard", SkillDifficulty::Advanced),
            ("expert", SkillDifficulty::Advanced),
            ("pro", SkillDifficulty::Advanced),
        ]
        .into_iter()
        .collect()
    });

static ITEM_TYPE_SYNONYMS: LazyLock<HashMap<&str, ItemType>> = LazyLock::new(|| {
    [
        ("idea", ItemType::Concept),
        ("definition", ItemType::Concept),
        ("question", ItemType::Qa),
        ("q&a", ItemType::Qa),
        ("flashcard", ItemType::Qa),
        ("snippet", ItemType::Example),
        ("sample", ItemType::Example),
        ("note", ItemType::Fact),
        ("trivia", ItemType::Fact),
    ]
    .into_iter()
    .collect()
});

/// Clamp a 1-5 self-rating, falling back to [`DEFAULT_LEVEL`].
///
/// `None` and out-of-range values both land on the default; valid input
/// passes through untouched.
#[must_use]
pub fn clamp_level(level: Option<i64>) -> i64 {
    match level {
        Some(l) if (1..=5).contains(&l) => l,
        _ => DEFAULT_LEVEL,
    }
}

/// Resolve a skill difficulty string, defaulting to beginner.
#[must_use]
pub fn normalize_skill_difficulty(input: &str) -> SkillDifficulty {
    let lower = input.trim().to_lowercase();

    if let Some(exact) = SkillDifficulty::parse(&lower) {
        return exact;
    }

    SKILL_DIFFICULTY_SYNONYMS
        .get(lower.as_str())
        .copied()
        .unwrap_or_default()
}

/// Resolve a challenge difficulty string, defaulting to intermediate.
///
/// The intermediate default (rather than beginner) matches the roadmap
/// parser contract: an unrecognized difficulty in model output reads as a
/// mid-tier challenge, not an easy one.
#[must_use]
pub fn normalize_challenge_difficulty(input: &str) -> ChallengeDifficulty {
    let lower = input.trim().to_lowercase();

    if let Some(exact) = ChallengeDifficulty::parse(&lower) {
        return exact;
    }

    match SKILL_DIFFICULTY_SYNONYMS.get(lower.as_str()) {
        Some(SkillDifficulty::Beginner) => ChallengeDifficulty::Beginner,
        Some(SkillDifficulty::Advanced) => ChallengeDifficulty::Advanced,
        _ => ChallengeDifficulty::default(),
    }
}

/// Resolve a learning item type string, defaulting to concept.
#[must_use]
pub fn normalize_item_type(input: &str) -> ItemType {
    let lower = input.trim().to_lowercase();

    if let Some(exact) = ItemType::parse(&lower) {
        return exact;
    }

    ITEM_TYPE_SYNONYMS
        .get(lower.as_str())
        .copied()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_level() {
        assert_eq!(clamp_level(Some(1)), 1);
        assert_eq!(clamp_level(Some(5)), 5);
        assert_eq!(clamp_level(Some(0)), DEFAULT_LEVEL);
        assert_eq!(clamp_level(Some(9)), DEFAULT_LEVEL);
        assert_eq!(clamp_level(Some(-3)), DEFAULT_LEVEL);
        assert_eq!(clamp_level(None), DEFAULT_LEVEL);
    }

    #[test]
    fn test_normalize_skill_difficulty() {
        assert_eq!(
            normalize_skill_difficulty("advanced"),
            SkillDifficulty::Advanced
        );
        assert_eq!(normalize_skill_difficulty("HARD"), SkillDifficulty::Advanced);
        assert_eq!(normalize_skill_difficulty("easy"), SkillDifficulty::Beginner);
        assert_eq!(
            normalize_skill_difficulty("nonsense"),
            SkillDifficulty::Beginner
        );
    }

    #[test]
    fn test_normalize_challenge_difficulty_defaults_intermediate() {
        assert_eq!(
            normalize_challenge_difficulty("beginner"),
            ChallengeDifficulty::Beginner
        );
        assert_eq!(
            normalize_challenge_difficulty("SuperHard"),
            ChallengeDifficulty::Intermediate
        );
        assert_eq!(
            normalize_challenge_difficulty(""),
            ChallengeDifficulty::Intermediate
        );
    }

    #[test]
    fn test_normalize_item_type() {
        assert_eq!(normalize_item_type("qa"), ItemType::Qa);
        assert_eq!(normalize_item_type("flashcard"), ItemType::Qa);
        assert_eq!(normalize_item_type("snippet"), ItemType::Example);
        assert_eq!(normalize_item_type("whatever"), ItemType::Concept);
    }
}
