//! Study session model.

use serde::{Deserialize, Serialize};

/// One logged block of study time against a skill.
///
/// Append-only: writing a session also updates the parent skill's time
/// accumulator and review schedule, but the session row itself is never
/// mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudySession {
    pub id: i64,
    pub skill_id: i64,
    pub duration_minutes: i64,
    pub topics_covered: String,

    /// Self-rated 1-5; clamped on the way in.
    pub understanding_level: i64,

    pub notes: Option<String>,
    pub key_takeaways: Option<String>,

    /// Unix milliseconds.
    pub session_date: i64,
}
