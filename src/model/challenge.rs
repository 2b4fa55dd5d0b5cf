//! Challenge, obstacle, and skill-evidence models.
//!
//! Challenges are self-contained practical projects that build and prove
//! competency in a skill. Obstacles are the blocking problems hit while
//! working one. Evidence rows are the append-only side effects of finishing
//! either.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Challenge difficulty tiers.
///
/// Defaults to intermediate: roadmap text with a garbled difficulty should
/// read as a mid-tier challenge, not an easy one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChallengeDifficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl ChallengeDifficulty {
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

impl Default for ChallengeDifficulty {
    fn default() -> Self {
        Self::Intermediate
    }
}

/// Challenge lifecycle.
///
/// `not_started → in_progress → {completed, abandoned}`, with abandonment
/// also reachable straight from `not_started`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeStatus {
    NotStarted,
    InProgress,
    Completed,
    Abandoned,
}

impl ChallengeStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Abandoned => "abandoned",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "not_started" => Some(Self::NotStarted),
            "in_progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            "abandoned" => Some(Self::Abandoned),
            _ => None,
        }
    }

    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        Self::parse(&s.to_lowercase()).unwrap_or_default()
    }
}

impl Default for ChallengeStatus {
    fn default() -> Self {
        Self::NotStarted
    }
}

/// Obstacle lifecycle: `blocking → {solved, workaround}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObstacleStatus {
    Blocking,
    Solved,
    Workaround,
}

impl ObstacleStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Blocking => "blocking",
            Self::Solved => "solved",
            Self::Workaround => "workaround",
        }
    }

    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "solved" => Self::Solved,
            "workaround" => Self::Workaround,
            _ => Self::Blocking,
        }
    }
}

impl Default for ObstacleStatus {
    fn default() -> Self {
        Self::Blocking
    }
}

/// What a piece of skill evidence attests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceType {
    ProjectCompleted,
    ObstacleOvercome,
    ConceptApplied,
}

impl EvidenceType {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ProjectCompleted => "project_completed",
            Self::ObstacleOvercome => "obstacle_overcome",
            Self::ConceptApplied => "concept_applied",
        }
    }

    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s {
            "obstacle_overcome" => Self::ObstacleOvercome,
            "concept_applied" => Self::ConceptApplied,
            _ => Self::ProjectCompleted,
        }
    }
}

/// A practical project tied to a skill.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Challenge {
    pub id: i64,
    pub skill_id: i64,
    pub title: String,
    pub description: String,
    pub difficulty: ChallengeDifficulty,
    pub estimated_hours: i64,

    /// Ordered; persisted as JSON text and round-trips as-is.
    pub skills_taught: Vec<String>,

    /// Matched by title against completed challenges of the same skill.
    pub prerequisites: Vec<String>,

    /// Informational only.
    pub unlocks: Vec<String>,

    pub status: ChallengeStatus,

    /// User-supplied, 0-100. Not monotonic; may move backward.
    pub progress_percent: i64,

    /// Accumulated minutes.
    pub time_spent: i64,

    pub github_link: Option<String>,
    pub notes: Option<String>,

    /// Unix milliseconds.
    pub started_at: Option<i64>,
    pub completed_at: Option<i64>,
    pub created_at: i64,
}

/// A blocking problem hit while working a challenge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: i64,
    pub challenge_id: i64,
    pub description: String,
    pub solution: Option<String>,
    pub insight: Option<String>,
    pub time_to_solve: Option<i64>,
    pub resources_used: Option<String>,
    pub status: ObstacleStatus,

    /// Unix milliseconds.
    pub created_at: i64,
    pub solved_at: Option<i64>,
}

/// Append-only proof of competency, emitted by challenge completion and
/// obstacle resolution. Only ever counted, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillEvidence {
    pub id: i64,
    pub skill_id: i64,
    pub challenge_id: i64,
    pub evidence_type: EvidenceType,
    pub description: Option<String>,
    pub created_at: i64,
}

// ── Competency leveling ──────────────────────────────────────

/// Derived competency label for a skill.
///
/// A monotone step function of the completed-challenge count; re-derivable
/// from challenge rows at any time and never persisted as authoritative
/// state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompetencyLevel {
    JustStarting,
    Beginner,
    BeginnerPlus,
    Intermediate,
    Advanced,
}

impl CompetencyLevel {
    /// Derive the level from a completed-challenge count.
    #[must_use]
    pub const fn from_completed(completed: i64) -> Self {
        match completed {
            c if c >= 10 => Self::Advanced,
            c if c >= 5 => Self::Intermediate,
            c if c >= 2 => Self::BeginnerPlus,
            c if c >= 1 => Self::Beginner,
            _ => Self::JustStarting,
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::JustStarting => "just_starting",
            Self::Beginner => "beginner",
            Self::BeginnerPlus => "beginner+",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }

    /// Rough percent-of-mastery for display.
    #[must_use]
    pub const fn percent(&self) -> i64 {
        match self {
            Self::JustStarting => 10,
            Self::Beginner => 30,
            Self::BeginnerPlus => 50,
            Self::Intermediate => 70,
            Self::Advanced => 90,
        }
    }
}

/// Challenge/obstacle/evidence aggregates plus the derived competency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillProgression {
    pub total_challenges: i64,
    pub completed: i64,
    pub in_progress: i64,
    pub total_minutes: i64,
    pub total_obstacles: i64,
    pub solved_obstacles: i64,
    pub evidence_count: i64,
    pub competency_level: CompetencyLevel,
    pub competency_percent: i64,
}

// ── Recommendation ───────────────────────────────────────────

/// A recommended next challenge with a human-readable justification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub challenge: Challenge,
    pub reason: String,
    pub unlocks: Vec<String>,
}

/// Pick the next challenge to work on.
///
/// Among not-started candidates whose prerequisites all match completed
/// titles (case-insensitive), the cheapest by estimated hours wins, with
/// the lower id breaking ties. Returns `None` when nothing is eligible,
/// which is a normal outcome, not an error.
#[must_use]
pub fn recommend_next(
    candidates: Vec<Challenge>,
    completed_titles: &HashSet<String>,
) -> Option<Recommendation> {
    let lowered: HashSet<String> = completed_titles
        .iter()
        .map(|t| t.to_lowercase())
        .collect();

    let mut eligible: Vec<Challenge> = candidates
        .into_iter()
        .filter(|c| c.status == ChallengeStatus::NotStarted)
        .filter(|c| {
            c.prerequisites
                .iter()
                .all(|p| lowered.contains(&p.to_lowercase()))
        })
        .collect();

    eligible.sort_by(|a, b| {
        a.estimated_hours
            .cmp(&b.estimated_hours)
            .then_with(|| a.id.cmp(&b.id))
    });

    let challenge = eligible.into_iter().next()?;

    let reason = if challenge.prerequisites.is_empty() {
        format!(
            "\"{}\" has no prerequisites and is the quickest eligible start at ~{}h",
            challenge.title, challenge.estimated_hours
        )
    } else {
        format!(
            "\"{}\" is unlocked (prerequisites done: {}) and the quickest eligible start at ~{}h",
            challenge.title,
            challenge.prerequisites.join(", "),
            challenge.estimated_hours
        )
    };

    let unlocks = challenge.unlocks.clone();
    Some(Recommendation {
        challenge,
        reason,
        unlocks,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn challenge(id: i64, title: &str, hours: i64, prereqs: &[&str]) -> Challenge {
        Challenge {
            id,
            skill_id: 1,
            title: title.to_string(),
            description: String::new(),
            difficulty: ChallengeDifficulty::Beginner,
            estimated_hours: hours,
            skills_taught: vec![],
            prerequisites: prereqs.iter().map(|s| (*s).to_string()).collect(),
            unlocks: vec!["Next Thing".to_string()],
            status: ChallengeStatus::NotStarted,
            progress_percent: 0,
            time_spent: 0,
            github_link: None,
            notes: None,
            started_at: None,
            completed_at: None,
            created_at: 0,
        }
    }

    #[test]
    fn test_competency_thresholds() {
        let cases = [
            (0, CompetencyLevel::JustStarting, 10),
            (1, CompetencyLevel::Beginner, 30),
            (2, CompetencyLevel::BeginnerPlus, 50),
            (5, CompetencyLevel::Intermediate, 70),
            (10, CompetencyLevel::Advanced, 90),
        ];
        for (count, level, percent) in cases {
            let derived = CompetencyLevel::from_completed(count);
            assert_eq!(derived, level, "count {count}");
            assert_eq!(derived.percent(), percent);
        }
        assert_eq!(
            CompetencyLevel::from_completed(47),
            CompetencyLevel::Advanced
        );
    }

    #[test]
    fn test_recommend_prefers_cheapest_eligible() {
        let completed: HashSet<String> = ["Basics".to_string()].into_iter().collect();
        let candidates = vec![
            challenge(1, "Big Project", 20, &[]),
            challenge(2, "Small Project", 3, &["Basics"]),
            challenge(3, "Locked Project", 1, &["Something Unfinished"]),
        ];

        let rec = recommend_next(candidates, &completed).unwrap();
        assert_eq!(rec.challenge.id, 2);
        assert!(rec.reason.contains("Small Project"));
        assert_eq!(rec.unlocks, vec!["Next Thing".to_string()]);
    }

    #[test]
    fn test_recommend_ties_break_by_id() {
        let completed = HashSet::new();
        let candidates = vec![
            challenge(9, "Later", 5, &[]),
            challenge(4, "Earlier", 5, &[]),
        ];
        let rec = recommend_next(candidates, &completed).unwrap();
        assert_eq!(rec.challenge.id, 4);
    }

    #[test]
    fn test_recommend_none_when_nothing_eligible() {
        let completed = HashSet::new();
        let candidates = vec![challenge(1, "Locked", 2, &["Missing Prereq"])];
        assert!(recommend_next(candidates, &completed).is_none());
        assert!(recommend_next(vec![], &completed).is_none());
    }

    #[test]
    fn test_recommend_ignores_non_not_started() {
        let completed = HashSet::new();
        let mut started = challenge(1, "Started", 1, &[]);
        started.status = ChallengeStatus::InProgress;
        assert!(recommend_next(vec![started], &completed).is_none());
    }
}
