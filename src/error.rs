//! Error types for the Mindkeep CLI.
//!
//! Provides structured error handling with:
//! - Machine-readable error codes (`ErrorCode`)
//! - Category-based exit codes (2=db, 3=not_found, 4=validation, etc.)
//! - Context-aware recovery hints
//! - Structured JSON output for piped / non-TTY consumers
//!
//! Out-of-range rating inputs (understanding, confidence, difficulty) are
//! deliberately NOT errors; they coerce to defaults in [`crate::validate`].

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Mindkeep operations.
pub type Result<T> = std::result::Result<T, Error>;

// ── Error Code ────────────────────────────────────────────────

/// Machine-readable error codes grouped by category.
///
/// Each code maps to a SCREAMING_SNAKE string and a category-based
/// exit code. Scripts match on the string or the exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Database (exit 2)
    NotInitialized,
    AlreadyInitialized,
    DatabaseError,

    // Not Found (exit 3)
    SkillNotFound,
    ItemNotFound,
    ChallengeNotFound,
    ObstacleNotFound,
    MilestoneNotFound,
    GoalNotFound,

    // Validation (exit 4)
    InvalidArgument,

    // Config (exit 7)
    ConfigError,

    // I/O (exit 8)
    IoError,
    JsonError,

    // External services (exit 9)
    CompletionError,
    EmbeddingError,

    // Internal (exit 1)
    InternalError,
}

impl ErrorCode {
    /// Machine-readable SCREAMING_SNAKE code string.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::NotInitialized => "NOT_INITIALIZED",
            Self::AlreadyInitialized => "ALREADY_INITIALIZED",
            Self::DatabaseError => "DATABASE_ERROR",
            Self::SkillNotFound => "SKILL_NOT_FOUND",
            Self::ItemNotFound => "ITEM_NOT_FOUND",
            Self::ChallengeNotFound => "CHALLENGE_NOT_FOUND",
            Self::ObstacleNotFound => "OBSTACLE_NOT_FOUND",
            Self::MilestoneNotFound => "MILESTONE_NOT_FOUND",
            Self::GoalNotFound => "GOAL_NOT_FOUND",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::ConfigError => "CONFIG_ERROR",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
            Self::CompletionError => "COMPLETION_ERROR",
            Self::EmbeddingError => "EMBEDDING_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Category-based exit code (1-9).
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::InternalError => 1,
            Self::NotInitialized | Self::AlreadyInitialized | Self::DatabaseError => 2,
            Self::SkillNotFound
            | Self::ItemNotFound
            | Self::ChallengeNotFound
            | Self::ObstacleNotFound
            | Self::MilestoneNotFound
            | Self::GoalNotFound => 3,
            Self::InvalidArgument => 4,
            Self::ConfigError => 7,
            Self::IoError | Self::JsonError => 8,
            Self::CompletionError | Self::EmbeddingError => 9,
        }
    }
}

// ── Error Enum ────────────────────────────────────────────────

/// Errors that can occur in Mindkeep CLI operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Not initialized: run `mindkeep init` first")]
    NotInitialized,

    #[error("Already initialized at {path}")]
    AlreadyInitialized { path: PathBuf },

    #[error("Skill not found: {id}")]
    SkillNotFound { id: i64 },

    #[error("Learning item not found: {id}")]
    ItemNotFound { id: i64 },

    #[error("Challenge not found: {id}")]
    ChallengeNotFound { id: i64 },

    #[error("Obstacle not found: {id}")]
    ObstacleNotFound { id: i64 },

    #[error("Milestone not found: {id}")]
    MilestoneNotFound { id: i64 },

    #[error("Goal not found: {id}")]
    GoalNotFound { id: i64 },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Completion service error: {0}")]
    Completion(String),

    #[error("Embedding service error: {0}")]
    Embedding(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Map this error to its structured `ErrorCode`.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::NotInitialized => ErrorCode::NotInitialized,
            Self::AlreadyInitialized { .. } => ErrorCode::AlreadyInitialized,
            Self::SkillNotFound { .. } => ErrorCode::SkillNotFound,
            Self::ItemNotFound { .. } => ErrorCode::ItemNotFound,
            Self::ChallengeNotFound { .. } => ErrorCode::ChallengeNotFound,
            Self::ObstacleNotFound { .. } => ErrorCode::ObstacleNotFound,
            Self::MilestoneNotFound { .. } => ErrorCode::MilestoneNotFound,
            Self::GoalNotFound { .. } => ErrorCode::GoalNotFound,
            Self::Database(_) => ErrorCode::DatabaseError,
            Self::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Self::Config(_) => ErrorCode::ConfigError,
            Self::Completion(_) => ErrorCode::CompletionError,
            Self::Embedding(_) => ErrorCode::EmbeddingError,
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) => ErrorCode::JsonError,
            Self::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Category-based exit code, delegating to the `ErrorCode`.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.error_code().exit_code()
    }

    /// Context-aware recovery hint for the user.
    ///
    /// Returns `None` if no actionable suggestion exists.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::NotInitialized => {
                Some("Run `mindkeep init` to create the database".to_string())
            }

            Self::AlreadyInitialized { path } => Some(format!(
                "Database already exists at {}. Use `--force` to reinitialize.",
                path.display()
            )),

            Self::SkillNotFound { id } => Some(format!(
                "No skill with ID {id}. Use `mindkeep skill list` to see tracked skills."
            )),

            Self::ItemNotFound { id } => Some(format!(
                "No learning item with ID {id}. Use `mindkeep item due` to see review items."
            )),

            Self::ChallengeNotFound { id } => Some(format!(
                "No challenge with ID {id}. Use `mindkeep challenge list` to see challenges."
            )),

            Self::ObstacleNotFound { id } => Some(format!(
                "No obstacle with ID {id}. Use `mindkeep obstacle list <challenge>` to see obstacles."
            )),

            Self::MilestoneNotFound { id } => Some(format!(
                "No milestone with ID {id}. Use `mindkeep milestone list <skill>` to see milestones."
            )),

            Self::GoalNotFound { id } => Some(format!(
                "No goal with ID {id}. Use `mindkeep goal list` to see active goals."
            )),

            Self::Completion(_) => Some(
                "Check that ANTHROPIC_API_KEY is set and the network is reachable".to_string(),
            ),

            Self::Embedding(_) => Some(
                "Semantic search needs a running Ollama server; keyword search still works"
                    .to_string(),
            ),

            Self::InvalidArgument(msg) => {
                if msg.contains("difficulty") {
                    Some("Valid difficulties: beginner, intermediate, advanced".to_string())
                } else if msg.contains("status") {
                    Some(
                        "Valid challenge statuses: not_started, in_progress, completed, abandoned"
                            .to_string(),
                    )
                } else {
                    None
                }
            }

            Self::Database(_) | Self::Io(_) | Self::Json(_) | Self::Config(_)
            | Self::Other(_) => None,
        }
    }

    /// Structured JSON representation for machine consumption.
    ///
    /// Includes error code, message, exit code, and optional recovery hint.
    #[must_use]
    pub fn to_structured_json(&self) -> serde_json::Value {
        let code = self.error_code();
        let mut obj = serde_json::json!({
            "error": {
                "code": code.as_str(),
                "message": self.to_string(),
                "exit_code": code.exit_code(),
            }
        });

        if let Some(hint) = self.hint() {
            obj["error"]["hint"] = serde_json::Value::String(hint);
        }

        obj
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_exit_codes() {
        assert_eq!(Error::SkillNotFound { id: 7 }.exit_code(), 3);
        assert_eq!(Error::ChallengeNotFound { id: 1 }.exit_code(), 3);
        assert_eq!(Error::NotInitialized.exit_code(), 2);
        assert_eq!(Error::Completion("boom".into()).exit_code(), 9);
    }

    #[test]
    fn test_structured_json_includes_hint() {
        let err = Error::SkillNotFound { id: 42 };
        let json = err.to_structured_json();
        assert_eq!(json["error"]["code"], "SKILL_NOT_FOUND");
        assert!(json["error"]["hint"].as_str().unwrap().contains("42"));
    }
}
