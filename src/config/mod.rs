//! Configuration management.
//!
//! Resolves the database path, the actor name for the audit trail, and the
//! external service settings (completion and embedding endpoints, models,
//! keys) from flags and environment variables.
//!
//! Mindkeep keeps a single global database at
//! `~/.mindkeep/data/mindkeep.db`; explanations live as markdown files
//! under `~/.mindkeep/explanations/`.

use std::path::{Path, PathBuf};

/// Default completion model when `MINDKEEP_MODEL` is unset.
pub const DEFAULT_COMPLETION_MODEL: &str = "claude-sonnet-4-5";

/// Default embedding model when `MINDKEEP_EMBED_MODEL` is unset.
pub const DEFAULT_EMBED_MODEL: &str = "nomic-embed-text";

/// Default Ollama endpoint for embeddings.
pub const DEFAULT_OLLAMA_ENDPOINT: &str = "http://localhost:11434";

/// Get the global Mindkeep directory (`~/.mindkeep`).
#[must_use]
pub fn global_mindkeep_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".mindkeep"))
}

/// Check if test mode is enabled.
///
/// Test mode is enabled by setting `MINDKEEP_TEST_DB=1` (or any truthy
/// value) and redirects all database operations to an isolated test
/// database.
#[must_use]
pub fn is_test_mode() -> bool {
    std::env::var("MINDKEEP_TEST_DB")
        .map(|v| !v.is_empty() && v != "0" && v.to_lowercase() != "false")
        .unwrap_or(false)
}

/// Get the test database path (`~/.mindkeep/test/mindkeep.db`).
#[must_use]
pub fn test_db_path() -> Option<PathBuf> {
    global_mindkeep_dir().map(|dir| dir.join("test").join("mindkeep.db"))
}

/// Resolve the database path.
///
/// Priority:
/// 1. Explicit `--db` flag
/// 2. `MINDKEEP_TEST_DB` → isolated test database
/// 3. `MINDKEEP_DB` environment variable
/// 4. Global location: `~/.mindkeep/data/mindkeep.db`
#[must_use]
pub fn resolve_db_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return Some(path.to_path_buf());
    }

    if is_test_mode() {
        return test_db_path();
    }

    if let Ok(db_path) = std::env::var("MINDKEEP_DB") {
        if !db_path.trim().is_empty() {
            return Some(PathBuf::from(db_path));
        }
    }

    global_mindkeep_dir().map(|dir| dir.join("data").join("mindkeep.db"))
}

/// Directory holding saved explanations.
#[must_use]
pub fn explanations_dir() -> Option<PathBuf> {
    global_mindkeep_dir().map(|dir| dir.join("explanations"))
}

/// Get the actor name recorded in the audit trail.
///
/// Priority: `MINDKEEP_ACTOR` env var, then the system username, then
/// "user".
#[must_use]
pub fn default_actor() -> String {
    if let Ok(actor) = std::env::var("MINDKEEP_ACTOR") {
        if !actor.is_empty() {
            return actor;
        }
    }

    if let Ok(user) = std::env::var("USER") {
        if !user.is_empty() {
            return user;
        }
    }

    "user".to_string()
}

/// Resolve the Anthropic API key, erroring with guidance when missing.
///
/// # Errors
///
/// Returns a config error when `ANTHROPIC_API_KEY` is unset or empty.
pub fn anthropic_api_key() -> crate::Result<String> {
    match std::env::var("ANTHROPIC_API_KEY") {
        Ok(key) if !key.trim().is_empty() => Ok(key),
        _ => Err(crate::Error::Config(
            "ANTHROPIC_API_KEY is not set".to_string(),
        )),
    }
}

/// Completion model name (`MINDKEEP_MODEL` or the default).
#[must_use]
pub fn completion_model() -> String {
    std::env::var("MINDKEEP_MODEL")
        .ok()
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_COMPLETION_MODEL.to_string())
}

/// Ollama endpoint for embeddings (`MINDKEEP_OLLAMA_URL` or the default).
#[must_use]
pub fn ollama_endpoint() -> String {
    std::env::var("MINDKEEP_OLLAMA_URL")
        .ok()
        .filter(|u| !u.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_OLLAMA_ENDPOINT.to_string())
}

/// Embedding model name (`MINDKEEP_EMBED_MODEL` or the default).
#[must_use]
pub fn embed_model() -> String {
    std::env::var("MINDKEEP_EMBED_MODEL")
        .ok()
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_EMBED_MODEL.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_actor_not_empty() {
        assert!(!default_actor().is_empty());
    }

    #[test]
    fn test_resolve_db_path_with_explicit() {
        let explicit = PathBuf::from("/custom/path/db.sqlite");
        let result = resolve_db_path(Some(&explicit));
        assert_eq!(result, Some(explicit));
    }

    #[test]
    fn test_resolve_db_path_defaults_to_global() {
        let result = resolve_db_path(None);
        assert!(result.is_some());
        // Either the global default or whatever MINDKEEP_DB/test mode
        // points at; all of them end with the database filename.
        assert!(result.unwrap().to_string_lossy().ends_with(".db"));
    }

    #[test]
    fn test_test_db_path_is_separate() {
        let global = global_mindkeep_dir().unwrap();
        let test = test_db_path().unwrap();
        assert!(test.to_string_lossy().contains("/test/"));
        assert_ne!(global.join("data").join("mindkeep.db"), test);
    }
}
