//! SQLite storage layer.

pub mod events;
pub mod schema;
pub mod sqlite;

pub use sqlite::{
    DailySummary, DueItem, LearningStats, ObstacleHit, SearchHit, SkillDetails, SkillOverview,
    SkillTime, SqliteStorage,
};
