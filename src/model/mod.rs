//! Data models for Mindkeep.
//!
//! This module contains all domain models:
//! - Skill, StudySession, LearningItem, ReviewEvent, Milestone
//! - Challenge, Obstacle, SkillEvidence
//! - DailyStreak
//! - Fact, Preference, Goal, Conversation, IndexedFile

pub mod challenge;
pub mod item;
pub mod memory;
pub mod milestone;
pub mod session;
pub mod skill;
pub mod streak;

pub use challenge::{
    recommend_next, Challenge, ChallengeDifficulty, ChallengeStatus, CompetencyLevel,
    EvidenceType, Obstacle, ObstacleStatus, Recommendation, SkillEvidence, SkillProgression,
};
pub use item::{ItemType, LearningItem, ReviewEvent};
pub use memory::{Conversation, Fact, Goal, IndexedFile, Preference};
pub use milestone::Milestone;
pub use session::StudySession;
pub use skill::{Skill, SkillDifficulty, SkillStats, SkillStatus};
pub use streak::{compute_streaks, DailyStreak, StreakStats};
