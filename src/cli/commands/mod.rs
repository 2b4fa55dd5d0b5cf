//! Command implementations.

pub mod challenge;
pub mod chat;
pub mod completions;
pub mod conversations;
pub mod explain;
pub mod files;
pub mod init;
pub mod item;
pub mod memory;
pub mod milestone;
pub mod obstacle;
pub mod roadmap;
pub mod session;
pub mod skill;
pub mod stats;
pub mod streak;
pub mod version;

use std::path::PathBuf;

use crate::config::{default_actor, resolve_db_path};
use crate::error::{Error, Result};
use crate::storage::SqliteStorage;

/// Open the database, requiring that `mindkeep init` has run.
pub(crate) fn open_storage(db: Option<&PathBuf>) -> Result<SqliteStorage> {
    let db_path = resolve_db_path(db.map(PathBuf::as_path)).ok_or(Error::NotInitialized)?;
    if !db_path.exists() {
        return Err(Error::NotInitialized);
    }
    SqliteStorage::open(&db_path)
}

/// Resolve the database path without opening it.
pub(crate) fn require_db_path(db: Option<&PathBuf>) -> Result<PathBuf> {
    let db_path = resolve_db_path(db.map(PathBuf::as_path)).ok_or(Error::NotInitialized)?;
    if !db_path.exists() {
        return Err(Error::NotInitialized);
    }
    Ok(db_path)
}

/// Resolve the actor for the audit trail.
pub(crate) fn resolve_actor(actor: Option<&str>) -> String {
    actor.map_or_else(default_actor, ToString::to_string)
}

/// Split a comma-separated flag value into trimmed, non-empty entries.
pub(crate) fn split_flag_list(value: Option<&str>) -> Vec<String> {
    value
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(ToString::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Format a Unix-millisecond timestamp for display.
pub(crate) fn format_ts(ms: i64) -> String {
    chrono::DateTime::from_timestamp_millis(ms)
        .map_or_else(|| "-".to_string(), |dt| dt.format("%Y-%m-%d %H:%M").to_string())
}
