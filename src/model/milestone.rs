//! Milestone model.

use serde::{Deserialize, Serialize};

/// A named goalpost for a skill.
///
/// Completion is a one-way transition: `completed` flips false→true once
/// and `completed_date` is stamped at that moment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Milestone {
    pub id: i64,
    pub skill_id: i64,
    pub milestone: String,

    /// Free-form date text ("2025-03-01", "end of Q2").
    pub target_date: Option<String>,

    pub completed: bool,

    /// Unix milliseconds, set when completed.
    pub completed_date: Option<i64>,

    pub notes: Option<String>,
}
