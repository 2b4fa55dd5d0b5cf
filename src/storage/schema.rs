//! Database schema definitions.
//!
//! The complete SQLite schema for Mindkeep. Timestamps are INTEGER Unix
//! milliseconds; streak rows are keyed by `YYYY-MM-DD` date strings;
//! list-valued columns (skills_taught, prerequisites, unlocks) are JSON
//! text and round-trip as lists of strings.

use rusqlite::{Connection, Result};

/// Current schema version for migration tracking.
pub const CURRENT_SCHEMA_VERSION: i32 = 1;

/// The complete SQL schema for the Mindkeep database.
pub const SCHEMA_SQL: &str = r"
-- ====================
-- Schema Version Tracking
-- ====================

CREATE TABLE IF NOT EXISTS schema_migrations (
    version TEXT PRIMARY KEY,
    applied_at INTEGER NOT NULL
);

-- ====================
-- Learning Tracker
-- ====================

-- Skills: subjects being learned
CREATE TABLE IF NOT EXISTS skills (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT UNIQUE NOT NULL,
    category TEXT,
    difficulty TEXT NOT NULL DEFAULT 'beginner',
    target_level TEXT,
    status TEXT NOT NULL DEFAULT 'active',
    total_time_minutes INTEGER NOT NULL DEFAULT 0,
    last_reviewed INTEGER,
    next_review INTEGER,
    current_level TEXT,
    goals TEXT,
    timeline TEXT,
    roadmap_generated INTEGER NOT NULL DEFAULT 0,
    notes TEXT,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_skills_status ON skills(status);
CREATE INDEX IF NOT EXISTS idx_skills_next_review ON skills(next_review, status);

-- Study sessions: append-only log of study time
CREATE TABLE IF NOT EXISTS study_sessions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    skill_id INTEGER NOT NULL,
    duration_minutes INTEGER NOT NULL,
    topics_covered TEXT NOT NULL DEFAULT '',
    understanding_level INTEGER NOT NULL DEFAULT 3,
    notes TEXT,
    key_takeaways TEXT,
    session_date INTEGER NOT NULL,
    FOREIGN KEY (skill_id) REFERENCES skills(id)
);

CREATE INDEX IF NOT EXISTS idx_sessions_skill ON study_sessions(skill_id, session_date DESC);

-- Learning items: facts/concepts/Q&A queued for spaced repetition
CREATE TABLE IF NOT EXISTS learning_items (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    skill_id INTEGER NOT NULL,
    item_type TEXT NOT NULL DEFAULT 'concept',
    question TEXT,
    answer TEXT NOT NULL,
    difficulty INTEGER NOT NULL DEFAULT 3,
    times_reviewed INTEGER NOT NULL DEFAULT 0,
    times_correct INTEGER NOT NULL DEFAULT 0,
    confidence_level INTEGER NOT NULL DEFAULT 1,
    last_reviewed INTEGER,
    next_review INTEGER,
    tags TEXT,
    source TEXT,
    created_at INTEGER NOT NULL,
    FOREIGN KEY (skill_id) REFERENCES skills(id)
);

CREATE INDEX IF NOT EXISTS idx_items_next_review ON learning_items(next_review, skill_id);
CREATE INDEX IF NOT EXISTS idx_items_skill ON learning_items(skill_id);

-- Review events: append-only audit trail of item reviews
CREATE TABLE IF NOT EXISTS review_events (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    item_id INTEGER NOT NULL,
    was_correct INTEGER NOT NULL,
    confidence_before INTEGER NOT NULL,
    confidence_after INTEGER NOT NULL,
    time_taken_seconds INTEGER,
    review_date INTEGER NOT NULL,
    FOREIGN KEY (item_id) REFERENCES learning_items(id)
);

CREATE INDEX IF NOT EXISTS idx_reviews_item ON review_events(item_id, review_date DESC);

-- Milestones: named goalposts per skill
CREATE TABLE IF NOT EXISTS milestones (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    skill_id INTEGER NOT NULL,
    milestone TEXT NOT NULL,
    target_date TEXT,
    completed INTEGER NOT NULL DEFAULT 0,
    completed_date INTEGER,
    notes TEXT,
    FOREIGN KEY (skill_id) REFERENCES skills(id)
);

CREATE INDEX IF NOT EXISTS idx_milestones_skill ON milestones(skill_id, completed);

-- ====================
-- Challenge Lab
-- ====================

-- Challenges: practical projects per skill
CREATE TABLE IF NOT EXISTS challenges (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    skill_id INTEGER NOT NULL,
    title TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    difficulty TEXT NOT NULL DEFAULT 'intermediate',
    estimated_hours INTEGER NOT NULL DEFAULT 5,
    skills_taught TEXT NOT NULL DEFAULT '[]',
    prerequisites TEXT NOT NULL DEFAULT '[]',
    unlocks TEXT NOT NULL DEFAULT '[]',
    status TEXT NOT NULL DEFAULT 'not_started',
    progress_percent INTEGER NOT NULL DEFAULT 0,
    time_spent INTEGER NOT NULL DEFAULT 0,
    github_link TEXT,
    notes TEXT,
    started_at INTEGER,
    completed_at INTEGER,
    created_at INTEGER NOT NULL,
    FOREIGN KEY (skill_id) REFERENCES skills(id)
);

CREATE INDEX IF NOT EXISTS idx_challenges_skill ON challenges(skill_id, status);
CREATE INDEX IF NOT EXISTS idx_challenges_status ON challenges(status);

-- Obstacles encountered while working challenges
CREATE TABLE IF NOT EXISTS obstacles (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    challenge_id INTEGER NOT NULL,
    description TEXT NOT NULL,
    solution TEXT,
    insight TEXT,
    time_to_solve INTEGER,
    resources_used TEXT,
    status TEXT NOT NULL DEFAULT 'blocking',
    created_at INTEGER NOT NULL,
    solved_at INTEGER,
    FOREIGN KEY (challenge_id) REFERENCES challenges(id)
);

CREATE INDEX IF NOT EXISTS idx_obstacles_challenge ON obstacles(challenge_id, status);

-- Skill evidence: append-only proof of competency
CREATE TABLE IF NOT EXISTS skill_evidence (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    skill_id INTEGER NOT NULL,
    challenge_id INTEGER NOT NULL,
    evidence_type TEXT NOT NULL,
    description TEXT,
    created_at INTEGER NOT NULL,
    FOREIGN KEY (skill_id) REFERENCES skills(id),
    FOREIGN KEY (challenge_id) REFERENCES challenges(id)
);

CREATE INDEX IF NOT EXISTS idx_evidence_skill ON skill_evidence(skill_id);

-- Daily streaks: one row per calendar day with recorded work
CREATE TABLE IF NOT EXISTS daily_streaks (
    date TEXT PRIMARY KEY,
    minutes_worked INTEGER NOT NULL DEFAULT 0,
    challenge_id INTEGER,
    obstacles_encountered INTEGER NOT NULL DEFAULT 0,
    obstacles_solved INTEGER NOT NULL DEFAULT 0,
    notes TEXT,
    FOREIGN KEY (challenge_id) REFERENCES challenges(id)
);

-- ====================
-- Memory
-- ====================

-- Facts: remembered statements about entities
CREATE TABLE IF NOT EXISTS facts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    entity TEXT NOT NULL,
    fact TEXT NOT NULL,
    context TEXT,
    created_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_facts_entity ON facts(entity);

-- Preferences: keyed user settings (writing style, etc.)
CREATE TABLE IF NOT EXISTS preferences (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    description TEXT,
    updated_at INTEGER NOT NULL
);

-- Goals
CREATE TABLE IF NOT EXISTS goals (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    goal TEXT NOT NULL,
    deadline TEXT,
    status TEXT NOT NULL DEFAULT 'active',
    created_at INTEGER NOT NULL,
    completed_at INTEGER
);

CREATE INDEX IF NOT EXISTS idx_goals_status ON goals(status);

-- Conversations: saved chat transcripts
CREATE TABLE IF NOT EXISTS conversations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    topic TEXT NOT NULL,
    transcript TEXT NOT NULL,
    message_count INTEGER NOT NULL DEFAULT 0,
    created_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_conversations_created ON conversations(created_at DESC);

-- Indexed files: file contents + model summaries for search
CREATE TABLE IF NOT EXISTS indexed_files (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    path TEXT NOT NULL,
    summary TEXT,
    content TEXT NOT NULL,
    indexed_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_files_path ON indexed_files(path);

-- ====================
-- Embeddings (BLOB f32 vectors)
-- ====================

-- One embedding per (kind, ref_id). kind is 'fact' or 'file'; ref_id
-- points into the matching table.
CREATE TABLE IF NOT EXISTS embedding_chunks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    kind TEXT NOT NULL,
    ref_id INTEGER NOT NULL,
    embedding BLOB NOT NULL,
    dimensions INTEGER NOT NULL,
    provider TEXT NOT NULL,
    model TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    UNIQUE(kind, ref_id)
);

CREATE INDEX IF NOT EXISTS idx_embedding_chunks_kind ON embedding_chunks(kind);

-- ====================
-- Audit Events
-- ====================

CREATE TABLE IF NOT EXISTS events (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    entity_type TEXT NOT NULL,
    entity_id INTEGER NOT NULL,
    event_type TEXT NOT NULL,
    actor TEXT NOT NULL,
    comment TEXT,
    created_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_events_entity ON events(entity_type, entity_id);
CREATE INDEX IF NOT EXISTS idx_events_created ON events(created_at DESC);
";

/// Apply the schema to the database.
///
/// Uses `execute_batch` to run the entire DDL script; idempotent because
/// all statements use `IF NOT EXISTS`.
///
/// # Errors
///
/// Returns an error if the SQL execution fails or pragmas cannot be set.
pub fn apply_schema(conn: &Connection) -> Result<()> {
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;

    conn.execute_batch(SCHEMA_SQL)?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_migrations (version, applied_at) VALUES (?1, ?2)",
        rusqlite::params![
            format!("v{CURRENT_SCHEMA_VERSION}"),
            chrono::Utc::now().timestamp_millis()
        ],
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_schema() {
        let conn = Connection::open_in_memory().unwrap();
        apply_schema(&conn).expect("Failed to apply schema");

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<Vec<_>>>()
            .unwrap();

        for table in [
            "skills",
            "study_sessions",
            "learning_items",
            "review_events",
            "milestones",
            "challenges",
            "obstacles",
            "skill_evidence",
            "daily_streaks",
            "facts",
            "preferences",
            "goals",
            "conversations",
            "indexed_files",
            "embedding_chunks",
            "events",
        ] {
            assert!(tables.contains(&table.to_string()), "missing table {table}");
        }
    }

    #[test]
    fn test_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        apply_schema(&conn).expect("First apply failed");
        apply_schema(&conn).expect("Second apply failed");
    }

    #[test]
    fn test_foreign_keys_enabled() {
        let conn = Connection::open_in_memory().unwrap();
        apply_schema(&conn).unwrap();

        let fk_enabled: i32 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(fk_enabled, 1);
    }

    #[test]
    fn test_skill_name_unique() {
        let conn = Connection::open_in_memory().unwrap();
        apply_schema(&conn).unwrap();

        conn.execute(
            "INSERT INTO skills (name, created_at, updated_at) VALUES ('Rust', 0, 0)",
            [],
        )
        .unwrap();

        let dup = conn.execute(
            "INSERT INTO skills (name, created_at, updated_at) VALUES ('Rust', 0, 0)",
            [],
        );
        assert!(dup.is_err());
    }

    #[test]
    fn test_streak_date_is_primary_key() {
        let conn = Connection::open_in_memory().unwrap();
        apply_schema(&conn).unwrap();

        conn.execute(
            "INSERT INTO daily_streaks (date, minutes_worked) VALUES ('2024-01-01', 30)",
            [],
        )
        .unwrap();

        let dup = conn.execute(
            "INSERT INTO daily_streaks (date, minutes_worked) VALUES ('2024-01-01', 10)",
            [],
        );
        assert!(dup.is_err());
    }
}
