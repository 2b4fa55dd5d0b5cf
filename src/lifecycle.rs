//! Chat session lifecycle: periodic transcript saves and one-shot
//! shutdown.
//!
//! The chat loop, the interrupt handler, and normal exit all funnel
//! through one owned object. `shutdown()` is guarded by a one-shot flag so
//! the final flush runs at most once however many termination paths fire.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::error::Result;
use crate::llm::{ChatTurn, Role};
use crate::model::memory::extract_topic;
use crate::storage::SqliteStorage;

/// Save the transcript every this many messages.
pub const SAVE_INTERVAL: usize = 10;

/// Owns the in-memory transcript and its persistence.
pub struct Lifecycle {
    db_path: PathBuf,
    actor: String,
    transcript: Mutex<Vec<ChatTurn>>,
    saved_len: AtomicUsize,
    shutdown_done: AtomicBool,
}

impl Lifecycle {
    #[must_use]
    pub fn new(db_path: PathBuf, actor: String) -> Self {
        Self {
            db_path,
            actor,
            transcript: Mutex::new(Vec::new()),
            saved_len: AtomicUsize::new(0),
            shutdown_done: AtomicBool::new(false),
        }
    }

    /// Append a turn to the transcript.
    pub fn push_turn(&self, role: Role, content: &str) {
        let mut transcript = self.transcript.lock().expect("transcript lock poisoned");
        transcript.push(ChatTurn {
            role,
            content: content.to_string(),
        });
    }

    /// Snapshot of the transcript so far.
    #[must_use]
    pub fn turns(&self) -> Vec<ChatTurn> {
        self.transcript.lock().expect("transcript lock poisoned").clone()
    }

    /// Number of turns recorded so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.transcript.lock().expect("transcript lock poisoned").len()
    }

    /// Whether the transcript is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop the transcript without saving (the `clear` chat command saves
    /// first, then calls this).
    pub fn reset(&self) {
        self.transcript.lock().expect("transcript lock poisoned").clear();
        self.saved_len.store(0, Ordering::SeqCst);
    }

    /// Save the transcript if it has grown since the last save.
    ///
    /// # Errors
    ///
    /// Returns an error if the database write fails.
    pub fn flush(&self) -> Result<()> {
        let turns = self.turns();
        if turns.is_empty() || turns.len() <= self.saved_len.load(Ordering::SeqCst) {
            return Ok(());
        }

        let topic = turns
            .iter()
            .find(|t| t.role == Role::User)
            .map_or_else(|| "general".to_string(), |t| extract_topic(&t.content));

        let transcript_text = turns
            .iter()
            .map(|t| format!("{}: {}", t.role.as_str(), t.content))
            .collect::<Vec<_>>()
            .join("\n");

        let mut storage = SqliteStorage::open(&self.db_path)?;
        storage.save_conversation(&topic, &transcript_text, turns.len() as i64, &self.actor)?;
        self.saved_len.store(turns.len(), Ordering::SeqCst);
        Ok(())
    }

    /// Whether a periodic save is due.
    #[must_use]
    pub fn save_due(&self) -> bool {
        let len = self.len();
        len > 0 && len.saturating_sub(self.saved_len.load(Ordering::SeqCst)) >= SAVE_INTERVAL
    }

    /// Final best-effort flush; runs at most once.
    ///
    /// Returns true when this call performed the shutdown, false when a
    /// previous call already did.
    pub fn shutdown(&self) -> bool {
        if self.shutdown_done.swap(true, Ordering::SeqCst) {
            return false;
        }

        if let Err(e) = self.flush() {
            tracing::warn!("failed to save conversation during shutdown: {e}");
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn lifecycle(dir: &tempfile::TempDir) -> Lifecycle {
        Lifecycle::new(dir.path().join("test.db"), "test".to_string())
    }

    #[test]
    fn test_shutdown_runs_once() {
        let dir = tempdir().unwrap();
        let lc = lifecycle(&dir);
        lc.push_turn(Role::User, "hello");
        lc.push_turn(Role::Assistant, "hi");

        assert!(lc.shutdown());
        assert!(!lc.shutdown());

        let storage = SqliteStorage::open(&dir.path().join("test.db")).unwrap();
        let count: i64 = storage
            .conn()
            .query_row("SELECT COUNT(*) FROM conversations", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_flush_skips_when_nothing_new() {
        let dir = tempdir().unwrap();
        let lc = lifecycle(&dir);
        lc.push_turn(Role::User, "tell me about sqlite indexes");
        lc.flush().unwrap();
        lc.flush().unwrap();

        let storage = SqliteStorage::open(&dir.path().join("test.db")).unwrap();
        let count: i64 = storage
            .conn()
            .query_row("SELECT COUNT(*) FROM conversations", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 1);

        let topic: String = storage
            .conn()
            .query_row("SELECT topic FROM conversations", [], |r| r.get(0))
            .unwrap();
        assert!(topic.contains("sqlite"));
    }

    #[test]
    fn test_save_due_interval() {
        let dir = tempdir().unwrap();
        let lc = lifecycle(&dir);
        assert!(!lc.save_due());

        for i in 0..SAVE_INTERVAL {
            lc.push_turn(Role::User, &format!("msg {i}"));
        }
        assert!(lc.save_due());

        lc.flush().unwrap();
        assert!(!lc.save_due());
    }

    #[test]
    fn test_empty_shutdown_writes_nothing() {
        let dir = tempdir().unwrap();
        let lc = lifecycle(&dir);
        assert!(lc.shutdown());

        let storage = SqliteStorage::open(&dir.path().join("test.db")).unwrap();
        let count: i64 = storage
            .conn()
            .query_row("SELECT COUNT(*) FROM conversations", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }
}
