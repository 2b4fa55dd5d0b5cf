//! Init command implementation.

use std::path::PathBuf;

use crate::config::resolve_db_path;
use crate::error::{Error, Result};
use crate::storage::SqliteStorage;

/// Initialize the Mindkeep database.
pub fn execute(force: bool, db: Option<&PathBuf>, json: bool) -> Result<()> {
    let db_path = resolve_db_path(db.map(PathBuf::as_path))
        .ok_or_else(|| Error::Config("could not determine a home directory".to_string()))?;

    if db_path.exists() && !force {
        return Err(Error::AlreadyInitialized { path: db_path });
    }

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if db_path.exists() && force {
        std::fs::remove_file(&db_path)?;
    }

    SqliteStorage::open(&db_path)?;

    if json {
        let output = serde_json::json!({
            "initialized": true,
            "path": db_path.display().to_string(),
        });
        println!("{output}");
    } else {
        println!("Initialized Mindkeep database at {}", db_path.display());
        println!("Next: `mindkeep skill add <name>` or `mindkeep chat`");
    }

    Ok(())
}
