//! SQLite storage implementation.
//!
//! The main storage backend for Mindkeep. Mutations run through the
//! `mutate` transaction protocol, which gives every write an IMMEDIATE
//! transaction plus audit-event logging. Referential integrity is enforced
//! by explicit existence checks inside each mutating operation: a missing
//! foreign id raises a typed NotFound error before anything is written.

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension, Row, Transaction};

use crate::error::{Error, Result};
use crate::model::{
    recommend_next, Challenge, ChallengeDifficulty, ChallengeStatus, CompetencyLevel,
    Conversation, DailyStreak, EvidenceType, Fact, Goal, IndexedFile, ItemType, LearningItem,
    Milestone, Obstacle, ObstacleStatus, Preference, Recommendation, ReviewEvent, Skill,
    SkillDifficulty, SkillEvidence, SkillProgression, SkillStats, SkillStatus, StreakStats,
    StudySession,
};
use crate::model::streak::compute_streaks;
use crate::scheduler;
use crate::storage::events::{insert_event, Event, EventType};
use crate::storage::schema::apply_schema;
use crate::validate::clamp_level;

/// SQLite-based storage backend.
#[derive(Debug)]
pub struct SqliteStorage {
    conn: Connection,
}

/// Context for a mutation operation, carrying audit events to write at
/// commit time.
pub struct MutationContext {
    /// Actor performing the operation.
    pub actor: String,
    /// Events to write at the end of the transaction.
    pub events: Vec<Event>,
}

impl MutationContext {
    fn new(actor: &str) -> Self {
        Self {
            actor: actor.to_string(),
            events: Vec::new(),
        }
    }

    /// Record an audit event for this operation.
    pub fn record_event(&mut self, entity_type: &str, entity_id: i64, event_type: EventType) {
        self.events
            .push(Event::new(entity_type, entity_id, event_type, &self.actor));
    }
}

// ── Read-model structs ───────────────────────────────────────

/// A skill row with its session/item counts for list views.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SkillOverview {
    #[serde(flatten)]
    pub skill: Skill,
    pub session_count: i64,
    pub item_count: i64,
}

/// Full detail view of one skill.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SkillDetails {
    pub skill: Skill,
    pub recent_sessions: Vec<StudySession>,
    pub stats: SkillStats,
}

/// A due (or searched) learning item joined with its skill name.
#[derive(Debug, Clone, serde::Serialize)]
pub struct DueItem {
    #[serde(flatten)]
    pub item: LearningItem,
    pub skill_name: String,
}

/// Alias kept for search results, which carry the same shape.
pub type SearchHit = DueItem;

/// An obstacle search hit with its challenge and skill context.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ObstacleHit {
    #[serde(flatten)]
    pub obstacle: Obstacle,
    pub challenge_title: String,
    pub skill_name: String,
}

/// Counts for the "what's due today" view.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct DailySummary {
    pub items_due_for_review: i64,
    pub skills_needing_attention: i64,
    pub sessions_this_week: i64,
    pub minutes_this_week: i64,
}

/// Per-skill share of recent study time.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SkillTime {
    pub skill_name: String,
    pub session_count: i64,
    pub total_minutes: i64,
}

/// Learning statistics over a trailing window.
#[derive(Debug, Clone, serde::Serialize)]
pub struct LearningStats {
    pub total_minutes: i64,
    pub total_hours: f64,
    pub avg_minutes_per_day: f64,
    pub by_skill: Vec<SkillTime>,
    pub total_reviews: i64,
    pub review_accuracy: f64,
}

// ── Row mappers ──────────────────────────────────────────────

const SKILL_COLUMNS: &str = "id, name, category, difficulty, target_level, status, \
     total_time_minutes, last_reviewed, next_review, current_level, goals, timeline, \
     roadmap_generated, notes, created_at, updated_at";

fn map_skill_row(row: &Row) -> rusqlite::Result<Skill> {
    Ok(Skill {
        id: row.get(0)?,
        name: row.get(1)?,
        category: row.get(2)?,
        difficulty: SkillDifficulty::from_str_or_default(&row.get::<_, String>(3)?),
        target_level: row.get(4)?,
        status: SkillStatus::from_str_or_default(&row.get::<_, String>(5)?),
        total_time_minutes: row.get(6)?,
        last_reviewed: row.get(7)?,
        next_review: row.get(8)?,
        current_level: row.get(9)?,
        goals: row.get(10)?,
        timeline: row.get(11)?,
        roadmap_generated: row.get::<_, i64>(12)? != 0,
        notes: row.get(13)?,
        created_at: row.get(14)?,
        updated_at: row.get(15)?,
    })
}

const ITEM_COLUMNS: &str = "id, skill_id, item_type, question, answer, difficulty, \
     times_reviewed, times_correct, confidence_level, last_reviewed, next_review, \
     tags, source, created_at";

fn map_item_row(row: &Row) -> rusqlite::Result<LearningItem> {
    Ok(LearningItem {
        id: row.get(0)?,
        skill_id: row.get(1)?,
        item_type: ItemType::from_str_or_default(&row.get::<_, String>(2)?),
        question: row.get(3)?,
        answer: row.get(4)?,
        difficulty: row.get(5)?,
        times_reviewed: row.get(6)?,
        times_correct: row.get(7)?,
        confidence_level: row.get(8)?,
        last_reviewed: row.get(9)?,
        next_review: row.get(10)?,
        tags: row.get(11)?,
        source: row.get(12)?,
        created_at: row.get(13)?,
    })
}

const CHALLENGE_COLUMNS: &str = "id, skill_id, title, description, difficulty, \
     estimated_hours, skills_taught, prerequisites, unlocks, status, progress_percent, \
     time_spent, github_link, notes, started_at, completed_at, created_at";

fn decode_list(raw: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_default()
}

fn encode_list(list: &[String]) -> String {
    serde_json::to_string(list).unwrap_or_else(|_| "[]".to_string())
}

fn map_challenge_row(row: &Row) -> rusqlite::Result<Challenge> {
    Ok(Challenge {
        id: row.get(0)?,
        skill_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        difficulty: ChallengeDifficulty::from_str_or_default(&row.get::<_, String>(4)?),
        estimated_hours: row.get(5)?,
        skills_taught: decode_list(&row.get::<_, String>(6)?),
        prerequisites: decode_list(&row.get::<_, String>(7)?),
        unlocks: decode_list(&row.get::<_, String>(8)?),
        status: ChallengeStatus::from_str_or_default(&row.get::<_, String>(9)?),
        progress_percent: row.get(10)?,
        time_spent: row.get(11)?,
        github_link: row.get(12)?,
        notes: row.get(13)?,
        started_at: row.get(14)?,
        completed_at: row.get(15)?,
        created_at: row.get(16)?,
    })
}

const OBSTACLE_COLUMNS: &str = "id, challenge_id, description, solution, insight, \
     time_to_solve, resources_used, status, created_at, solved_at";

fn map_obstacle_row(row: &Row) -> rusqlite::Result<Obstacle> {
    Ok(Obstacle {
        id: row.get(0)?,
        challenge_id: row.get(1)?,
        description: row.get(2)?,
        solution: row.get(3)?,
        insight: row.get(4)?,
        time_to_solve: row.get(5)?,
        resources_used: row.get(6)?,
        status: ObstacleStatus::from_str_or_default(&row.get::<_, String>(7)?),
        created_at: row.get(8)?,
        solved_at: row.get(9)?,
    })
}

fn map_session_row(row: &Row) -> rusqlite::Result<StudySession> {
    Ok(StudySession {
        id: row.get(0)?,
        skill_id: row.get(1)?,
        duration_minutes: row.get(2)?,
        topics_covered: row.get(3)?,
        understanding_level: row.get(4)?,
        notes: row.get(5)?,
        key_takeaways: row.get(6)?,
        session_date: row.get(7)?,
    })
}

fn skill_exists(conn: &Connection, id: i64) -> Result<bool> {
    Ok(conn
        .prepare("SELECT 1 FROM skills WHERE id = ?1")?
        .exists([id])?)
}

fn challenge_exists(conn: &Connection, id: i64) -> Result<bool> {
    Ok(conn
        .prepare("SELECT 1 FROM challenges WHERE id = ?1")?
        .exists([id])?)
}

impl SqliteStorage {
    /// Open a database at the given path.
    ///
    /// Creates the database and applies the schema if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or schema
    /// application fails.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        apply_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        apply_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Get a reference to the underlying connection (for read operations).
    #[must_use]
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Execute a mutation with the transaction protocol.
    ///
    /// Begins an IMMEDIATE transaction, runs the closure, writes its audit
    /// events, and commits; any error rolls the whole transaction back.
    ///
    /// # Errors
    ///
    /// Returns the closure's error, or a database error from commit.
    pub fn mutate<F, R>(&mut self, actor: &str, f: F) -> Result<R>
    where
        F: FnOnce(&Transaction, &mut MutationContext) -> Result<R>,
    {
        let tx = self
            .conn
            .transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;

        let mut ctx = MutationContext::new(actor);
        let result = f(&tx, &mut ctx)?;

        for event in &ctx.events {
            insert_event(&tx, event)?;
        }

        tx.commit()?;
        Ok(result)
    }

    // ================
    // Skill Operations
    // ================

    /// Create a skill, or return the existing id for a duplicate name.
    ///
    /// Returns `(id, existed)`; `existed` lets the caller surface the
    /// duplicate warning without a second query. New skills are scheduled
    /// for review one day out.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn add_skill(
        &mut self,
        name: &str,
        category: Option<&str>,
        difficulty: SkillDifficulty,
        target_level: Option<&str>,
        notes: Option<&str>,
        actor: &str,
    ) -> Result<(i64, bool)> {
        let now = Utc::now();
        let now_ms = now.timestamp_millis();
        let next_review = scheduler::next_review_for_session(now, 1).timestamp_millis();

        self.mutate(actor, |tx, ctx| {
            let existing: Option<i64> = tx
                .query_row("SELECT id FROM skills WHERE name = ?1", [name], |row| {
                    row.get(0)
                })
                .optional()?;

            if let Some(id) = existing {
                return Ok((id, true));
            }

            tx.execute(
                "INSERT INTO skills (name, category, difficulty, target_level, notes, next_review, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
                rusqlite::params![
                    name,
                    category,
                    difficulty.as_str(),
                    target_level,
                    notes,
                    next_review,
                    now_ms
                ],
            )?;

            let id = tx.last_insert_rowid();
            ctx.record_event("skill", id, EventType::SkillCreated);
            Ok((id, false))
        })
    }

    /// List skills with session/item counts, filtered by status.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_skills(&self, status: SkillStatus) -> Result<Vec<SkillOverview>> {
        let sql = format!(
            "SELECT {cols},
                    COUNT(DISTINCT ss.id) AS session_count,
                    COUNT(DISTINCT li.id) AS item_count
             FROM skills s
             LEFT JOIN study_sessions ss ON s.id = ss.skill_id
             LEFT JOIN learning_items li ON s.id = li.skill_id
             WHERE s.status = ?1
             GROUP BY s.id
             ORDER BY s.last_reviewed DESC, s.created_at DESC",
            cols = SKILL_COLUMNS
                .split(", ")
                .map(|c| format!("s.{c}"))
                .collect::<Vec<_>>()
                .join(", ")
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([status.as_str()], |row| {
            Ok(SkillOverview {
                skill: map_skill_row(row)?,
                session_count: row.get(16)?,
                item_count: row.get(17)?,
            })
        })?;

        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Error::from)
    }

    /// Get a skill by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_skill(&self, id: i64) -> Result<Option<Skill>> {
        let sql = format!("SELECT {SKILL_COLUMNS} FROM skills WHERE id = ?1");
        let skill = self
            .conn
            .prepare(&sql)?
            .query_row([id], map_skill_row)
            .optional()?;
        Ok(skill)
    }

    /// Get a skill with its 5 most recent sessions and item aggregates.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SkillNotFound`] if the id does not resolve.
    pub fn get_skill_details(&self, id: i64) -> Result<SkillDetails> {
        let skill = self
            .get_skill(id)?
            .ok_or(Error::SkillNotFound { id })?;

        let mut stmt = self.conn.prepare(
            "SELECT id, skill_id, duration_minutes, topics_covered, understanding_level,
                    notes, key_takeaways, session_date
             FROM study_sessions
             WHERE skill_id = ?1
             ORDER BY session_date DESC
             LIMIT 5",
        )?;
        let recent_sessions = stmt
            .query_map([id], map_session_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let stats = self.conn.query_row(
            "SELECT COUNT(*), AVG(confidence_level), COALESCE(SUM(times_correct), 0),
                    COALESCE(SUM(times_reviewed), 0)
             FROM learning_items
             WHERE skill_id = ?1",
            [id],
            |row| {
                Ok(SkillStats {
                    item_count: row.get(0)?,
                    avg_confidence: row.get(1)?,
                    total_correct: row.get(2)?,
                    total_reviews: row.get(3)?,
                })
            },
        )?;

        Ok(SkillDetails {
            skill,
            recent_sessions,
            stats,
        })
    }

    /// Archive a skill (removes it from active due queries).
    ///
    /// # Errors
    ///
    /// Returns [`Error::SkillNotFound`] if the id does not resolve.
    pub fn archive_skill(&mut self, id: i64, actor: &str) -> Result<()> {
        let now_ms = Utc::now().timestamp_millis();
        self.mutate(actor, |tx, ctx| {
            let rows = tx.execute(
                "UPDATE skills SET status = 'archived', updated_at = ?1 WHERE id = ?2",
                rusqlite::params![now_ms, id],
            )?;
            if rows == 0 {
                return Err(Error::SkillNotFound { id });
            }
            ctx.record_event("skill", id, EventType::SkillArchived);
            Ok(())
        })
    }

    /// Store roadmap metadata on a skill and mark the roadmap generated.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SkillNotFound`] if the id does not resolve.
    pub fn set_roadmap_metadata(
        &mut self,
        id: i64,
        current_level: &str,
        goals: &str,
        timeline: &str,
        actor: &str,
    ) -> Result<()> {
        let now_ms = Utc::now().timestamp_millis();
        self.mutate(actor, |tx, ctx| {
            let rows = tx.execute(
                "UPDATE skills
                 SET current_level = ?1, goals = ?2, timeline = ?3,
                     roadmap_generated = 1, updated_at = ?4
                 WHERE id = ?5",
                rusqlite::params![current_level, goals, timeline, now_ms, id],
            )?;
            if rows == 0 {
                return Err(Error::SkillNotFound { id });
            }
            ctx.record_event("skill", id, EventType::RoadmapGenerated);
            Ok(())
        })
    }

    // ==================
    // Session Operations
    // ==================

    /// Log a study session and roll its effects onto the skill.
    ///
    /// Adds the duration to the skill's time accumulator, stamps
    /// `last_reviewed`, and reschedules `next_review` from the
    /// understanding level. The level is clamped to 1-5 first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SkillNotFound`] before any write if the skill id
    /// does not resolve.
    pub fn log_session(
        &mut self,
        skill_id: i64,
        duration_minutes: i64,
        topics_covered: &str,
        understanding_level: i64,
        notes: Option<&str>,
        key_takeaways: Option<&str>,
        actor: &str,
    ) -> Result<i64> {
        let now = Utc::now();
        let now_ms = now.timestamp_millis();
        let level = clamp_level(Some(understanding_level));
        let next_review = scheduler::next_review_for_session(now, level).timestamp_millis();

        self.mutate(actor, |tx, ctx| {
            if !skill_exists(tx, skill_id)? {
                return Err(Error::SkillNotFound { id: skill_id });
            }

            tx.execute(
                "INSERT INTO study_sessions
                 (skill_id, duration_minutes, topics_covered, understanding_level, notes, key_takeaways, session_date)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                rusqlite::params![
                    skill_id,
                    duration_minutes,
                    topics_covered,
                    level,
                    notes,
                    key_takeaways,
                    now_ms
                ],
            )?;
            let session_id = tx.last_insert_rowid();

            tx.execute(
                "UPDATE skills
                 SET last_reviewed = ?1,
                     next_review = ?2,
                     total_time_minutes = total_time_minutes + ?3,
                     updated_at = ?1
                 WHERE id = ?4",
                rusqlite::params![now_ms, next_review, duration_minutes, skill_id],
            )?;

            ctx.record_event("skill", skill_id, EventType::SessionLogged);
            Ok(session_id)
        })
    }

    // ========================
    // Learning Item Operations
    // ========================

    /// Add a learning item, due for its first review tomorrow.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SkillNotFound`] before any write if the skill id
    /// does not resolve, or an invalid-argument error for a Q&A item with
    /// no question.
    #[allow(clippy::too_many_arguments)]
    pub fn add_learning_item(
        &mut self,
        skill_id: i64,
        answer: &str,
        question: Option<&str>,
        item_type: ItemType,
        difficulty: i64,
        tags: Option<&str>,
        source: Option<&str>,
        actor: &str,
    ) -> Result<i64> {
        if item_type == ItemType::Qa && question.map_or(true, str::is_empty) {
            return Err(Error::InvalidArgument(
                "qa items need a question (pass --question)".to_string(),
            ));
        }

        let now = Utc::now();
        let now_ms = now.timestamp_millis();
        let difficulty = clamp_level(Some(difficulty));
        let next_review = scheduler::next_review_for_session(now, 1).timestamp_millis();

        self.mutate(actor, |tx, ctx| {
            if !skill_exists(tx, skill_id)? {
                return Err(Error::SkillNotFound { id: skill_id });
            }

            tx.execute(
                "INSERT INTO learning_items
                 (skill_id, item_type, question, answer, difficulty, tags, source, next_review, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                rusqlite::params![
                    skill_id,
                    item_type.as_str(),
                    question,
                    answer,
                    difficulty,
                    tags,
                    source,
                    next_review,
                    now_ms
                ],
            )?;

            let id = tx.last_insert_rowid();
            ctx.record_event("item", id, EventType::ItemCreated);
            Ok(id)
        })
    }

    /// Get items due for review, weakest and most overdue first.
    ///
    /// An item is due when `next_review` is null or in the past. Without a
    /// skill filter, only items of active skills are returned. Ordering is
    /// `(next_review ASC, confidence_level ASC)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_items_due_for_review(
        &self,
        skill_id: Option<i64>,
        limit: u32,
    ) -> Result<Vec<DueItem>> {
        let now_ms = Utc::now().timestamp_millis();

        let cols = ITEM_COLUMNS
            .split(", ")
            .map(|c| format!("li.{c}"))
            .collect::<Vec<_>>()
            .join(", ");

        let rows = if let Some(skill_id) = skill_id {
            let sql = format!(
                "SELECT {cols}, s.name
                 FROM learning_items li
                 JOIN skills s ON li.skill_id = s.id
                 WHERE li.skill_id = ?1
                   AND (li.next_review IS NULL OR li.next_review <= ?2)
                 ORDER BY li.next_review ASC, li.confidence_level ASC
                 LIMIT ?3"
            );
            let mut stmt = self.conn.prepare(&sql)?;
            let result = stmt
                .query_map(rusqlite::params![skill_id, now_ms, limit], |row| {
                    Ok(DueItem {
                        item: map_item_row(row)?,
                        skill_name: row.get(14)?,
                    })
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            result
        } else {
            let sql = format!(
                "SELECT {cols}, s.name
                 FROM learning_items li
                 JOIN skills s ON li.skill_id = s.id
                 WHERE (li.next_review IS NULL OR li.next_review <= ?1)
                   AND s.status = 'active'
                 ORDER BY li.next_review ASC, li.confidence_level ASC
                 LIMIT ?2"
            );
            let mut stmt = self.conn.prepare(&sql)?;
            let result = stmt
                .query_map(rusqlite::params![now_ms, limit], |row| {
                    Ok(DueItem {
                        item: map_item_row(row)?,
                        skill_name: row.get(14)?,
                    })
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            result
        };

        Ok(rows)
    }

    /// Record a review: append the event, then update the item.
    ///
    /// Confidence ratings are clamped to 1-5. The item's next review comes
    /// from the scheduler: four hours out on a miss, confidence-keyed
    /// otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ItemNotFound`] before any write if the item id
    /// does not resolve.
    pub fn record_review(
        &mut self,
        item_id: i64,
        was_correct: bool,
        confidence_before: i64,
        confidence_after: i64,
        time_taken_seconds: Option<i64>,
        actor: &str,
    ) -> Result<()> {
        let now = Utc::now();
        let now_ms = now.timestamp_millis();
        let before = clamp_level(Some(confidence_before));
        let after = clamp_level(Some(confidence_after));
        let next_review =
            scheduler::next_review_for_item(now, was_correct, after).timestamp_millis();

        self.mutate(actor, |tx, ctx| {
            let exists = tx
                .prepare("SELECT 1 FROM learning_items WHERE id = ?1")?
                .exists([item_id])?;
            if !exists {
                return Err(Error::ItemNotFound { id: item_id });
            }

            tx.execute(
                "INSERT INTO review_events
                 (item_id, was_correct, confidence_before, confidence_after, time_taken_seconds, review_date)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![
                    item_id,
                    i64::from(was_correct),
                    before,
                    after,
                    time_taken_seconds,
                    now_ms
                ],
            )?;

            tx.execute(
                "UPDATE learning_items
                 SET times_reviewed = times_reviewed + 1,
                     times_correct = times_correct + ?1,
                     last_reviewed = ?2,
                     next_review = ?3,
                     confidence_level = ?4
                 WHERE id = ?5",
                rusqlite::params![i64::from(was_correct), now_ms, next_review, after, item_id],
            )?;

            ctx.record_event("item", item_id, EventType::ItemReviewed);
            Ok(())
        })
    }

    /// Review history for an item, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ItemNotFound`] if the item id does not resolve.
    pub fn get_review_history(&self, item_id: i64, limit: u32) -> Result<Vec<ReviewEvent>> {
        let exists = self
            .conn
            .prepare("SELECT 1 FROM learning_items WHERE id = ?1")?
            .exists([item_id])?;
        if !exists {
            return Err(Error::ItemNotFound { id: item_id });
        }

        let mut stmt = self.conn.prepare(
            "SELECT id, item_id, was_correct, confidence_before, confidence_after,
                    time_taken_seconds, review_date
             FROM review_events
             WHERE item_id = ?1
             ORDER BY review_date DESC, id DESC
             LIMIT ?2",
        )?;
        let rows = stmt
            .query_map(rusqlite::params![item_id, limit], |row| {
                Ok(ReviewEvent {
                    id: row.get(0)?,
                    item_id: row.get(1)?,
                    was_correct: row.get::<_, i64>(2)? != 0,
                    confidence_before: row.get(3)?,
                    confidence_after: row.get(4)?,
                    time_taken_seconds: row.get(5)?,
                    review_date: row.get(6)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Substring search over question/answer/tags.
    ///
    /// Weakest knowledge surfaces first: ordered by confidence ascending,
    /// then most recently reviewed.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn search_learning_items(
        &self,
        query: &str,
        skill_id: Option<i64>,
        limit: u32,
    ) -> Result<Vec<SearchHit>> {
        let pattern = format!("%{query}%");
        let cols = ITEM_COLUMNS
            .split(", ")
            .map(|c| format!("li.{c}"))
            .collect::<Vec<_>>()
            .join(", ");

        let rows = if let Some(skill_id) = skill_id {
            let sql = format!(
                "SELECT {cols}, s.name
                 FROM learning_items li
                 JOIN skills s ON li.skill_id = s.id
                 WHERE li.skill_id = ?1
                   AND (li.question LIKE ?2 OR li.answer LIKE ?2 OR li.tags LIKE ?2)
                 ORDER BY li.confidence_level ASC, li.last_reviewed DESC
                 LIMIT ?3"
            );
            let mut stmt = self.conn.prepare(&sql)?;
            let result = stmt
                .query_map(rusqlite::params![skill_id, pattern, limit], |row| {
                    Ok(SearchHit {
                        item: map_item_row(row)?,
                        skill_name: row.get(14)?,
                    })
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            result
        } else {
            let sql = format!(
                "SELECT {cols}, s.name
                 FROM learning_items li
                 JOIN skills s ON li.skill_id = s.id
                 WHERE (li.question LIKE ?1 OR li.answer LIKE ?1 OR li.tags LIKE ?1)
                   AND s.status = 'active'
                 ORDER BY li.confidence_level ASC, li.last_reviewed DESC
                 LIMIT ?2"
            );
            let mut stmt = self.conn.prepare(&sql)?;
            let result = stmt
                .query_map(rusqlite::params![pattern, limit], |row| {
                    Ok(SearchHit {
                        item: map_item_row(row)?,
                        skill_name: row.get(14)?,
                    })
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            result
        };

        Ok(rows)
    }

    /// Counts of what's due today and this week's study volume.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn daily_summary(&self) -> Result<DailySummary> {
        let now_ms = Utc::now().timestamp_millis();
        let week_ago_ms = now_ms - 7 * 24 * 60 * 60 * 1000;

        let items_due: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM learning_items WHERE next_review <= ?1",
            [now_ms],
            |row| row.get(0),
        )?;

        let skills_due: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM skills WHERE status = 'active' AND next_review <= ?1",
            [now_ms],
            |row| row.get(0),
        )?;

        let (sessions, minutes): (i64, i64) = self.conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(duration_minutes), 0)
             FROM study_sessions WHERE session_date >= ?1",
            [week_ago_ms],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        Ok(DailySummary {
            items_due_for_review: items_due,
            skills_needing_attention: skills_due,
            sessions_this_week: sessions,
            minutes_this_week: minutes,
        })
    }

    /// Learning statistics for the trailing `days` window.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn learning_stats(&self, days: i64) -> Result<LearningStats> {
        let now_ms = Utc::now().timestamp_millis();
        let cutoff_ms = now_ms - days * 24 * 60 * 60 * 1000;

        let total_minutes: i64 = self.conn.query_row(
            "SELECT COALESCE(SUM(duration_minutes), 0)
             FROM study_sessions WHERE session_date >= ?1",
            [cutoff_ms],
            |row| row.get(0),
        )?;

        let mut stmt = self.conn.prepare(
            "SELECT s.name, COUNT(*), SUM(ss.duration_minutes)
             FROM study_sessions ss
             JOIN skills s ON ss.skill_id = s.id
             WHERE ss.session_date >= ?1
             GROUP BY s.name
             ORDER BY SUM(ss.duration_minutes) DESC",
        )?;
        let by_skill = stmt
            .query_map([cutoff_ms], |row| {
                Ok(SkillTime {
                    skill_name: row.get(0)?,
                    session_count: row.get(1)?,
                    total_minutes: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let (total_reviews, correct_reviews): (i64, i64) = self.conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(was_correct), 0)
             FROM review_events WHERE review_date >= ?1",
            [cutoff_ms],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        let review_accuracy = if total_reviews > 0 {
            (correct_reviews as f64 / total_reviews as f64) * 100.0
        } else {
            0.0
        };

        Ok(LearningStats {
            total_minutes,
            total_hours: (total_minutes as f64 / 60.0 * 10.0).round() / 10.0,
            avg_minutes_per_day: (total_minutes as f64 / days as f64 * 10.0).round() / 10.0,
            by_skill,
            total_reviews,
            review_accuracy: (review_accuracy * 10.0).round() / 10.0,
        })
    }

    // ====================
    // Milestone Operations
    // ====================

    /// Add a milestone for a skill.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SkillNotFound`] before any write if the skill id
    /// does not resolve.
    pub fn add_milestone(
        &mut self,
        skill_id: i64,
        milestone: &str,
        target_date: Option<&str>,
        notes: Option<&str>,
        actor: &str,
    ) -> Result<i64> {
        self.mutate(actor, |tx, ctx| {
            if !skill_exists(tx, skill_id)? {
                return Err(Error::SkillNotFound { id: skill_id });
            }

            tx.execute(
                "INSERT INTO milestones (skill_id, milestone, target_date, notes)
                 VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![skill_id, milestone, target_date, notes],
            )?;

            let id = tx.last_insert_rowid();
            ctx.record_event("milestone", id, EventType::MilestoneCreated);
            Ok(id)
        })
    }

    /// Get milestones for a skill, open ones first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_milestones(&self, skill_id: i64, include_completed: bool) -> Result<Vec<Milestone>> {
        let sql = if include_completed {
            "SELECT id, skill_id, milestone, target_date, completed, completed_date, notes
             FROM milestones WHERE skill_id = ?1
             ORDER BY completed ASC, target_date ASC"
        } else {
            "SELECT id, skill_id, milestone, target_date, completed, completed_date, notes
             FROM milestones WHERE skill_id = ?1 AND completed = 0
             ORDER BY target_date ASC"
        };

        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt
            .query_map([skill_id], |row| {
                Ok(Milestone {
                    id: row.get(0)?,
                    skill_id: row.get(1)?,
                    milestone: row.get(2)?,
                    target_date: row.get(3)?,
                    completed: row.get::<_, i64>(4)? != 0,
                    completed_date: row.get(5)?,
                    notes: row.get(6)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Complete a milestone (one-way transition).
    ///
    /// # Errors
    ///
    /// Returns [`Error::MilestoneNotFound`] if the id does not resolve.
    pub fn complete_milestone(&mut self, id: i64, actor: &str) -> Result<()> {
        let now_ms = Utc::now().timestamp_millis();
        self.mutate(actor, |tx, ctx| {
            let rows = tx.execute(
                "UPDATE milestones SET completed = 1, completed_date = ?1 WHERE id = ?2",
                rusqlite::params![now_ms, id],
            )?;
            if rows == 0 {
                return Err(Error::MilestoneNotFound { id });
            }
            ctx.record_event("milestone", id, EventType::MilestoneCompleted);
            Ok(())
        })
    }

    // ====================
    // Challenge Operations
    // ====================

    /// Add a challenge for a skill.
    ///
    /// List fields persist as JSON text; an empty list stays `[]`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SkillNotFound`] before any write if the skill id
    /// does not resolve.
    #[allow(clippy::too_many_arguments)]
    pub fn add_challenge(
        &mut self,
        skill_id: i64,
        title: &str,
        description: &str,
        difficulty: ChallengeDifficulty,
        estimated_hours: i64,
        skills_taught: &[String],
        prerequisites: &[String],
        unlocks: &[String],
        actor: &str,
    ) -> Result<i64> {
        let now_ms = Utc::now().timestamp_millis();

        self.mutate(actor, |tx, ctx| {
            if !skill_exists(tx, skill_id)? {
                return Err(Error::SkillNotFound { id: skill_id });
            }

            tx.execute(
                "INSERT INTO challenges
                 (skill_id, title, description, difficulty, estimated_hours,
                  skills_taught, prerequisites, unlocks, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                rusqlite::params![
                    skill_id,
                    title,
                    description,
                    difficulty.as_str(),
                    estimated_hours,
                    encode_list(skills_taught),
                    encode_list(prerequisites),
                    encode_list(unlocks),
                    now_ms
                ],
            )?;

            let id = tx.last_insert_rowid();
            ctx.record_event("challenge", id, EventType::ChallengeCreated);
            Ok(id)
        })
    }

    /// Get a challenge by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_challenge(&self, id: i64) -> Result<Option<Challenge>> {
        let sql = format!("SELECT {CHALLENGE_COLUMNS} FROM challenges WHERE id = ?1");
        let challenge = self
            .conn
            .prepare(&sql)?
            .query_row([id], map_challenge_row)
            .optional()?;
        Ok(challenge)
    }

    /// List challenges, optionally filtered by skill and/or status.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_challenges(
        &self,
        skill_id: Option<i64>,
        status: Option<ChallengeStatus>,
    ) -> Result<Vec<Challenge>> {
        let mut sql = format!("SELECT {CHALLENGE_COLUMNS} FROM challenges WHERE 1=1");
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(skill_id) = skill_id {
            sql.push_str(" AND skill_id = ?");
            params.push(Box::new(skill_id));
        }
        if let Some(status) = status {
            sql.push_str(" AND status = ?");
            params.push(Box::new(status.as_str().to_string()));
        }
        sql.push_str(" ORDER BY created_at DESC");

        let mut stmt = self.conn.prepare(&sql)?;
        let params_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|b| b.as_ref()).collect();
        let rows = stmt
            .query_map(params_refs.as_slice(), map_challenge_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Mark a challenge started.
    ///
    /// Returns false (without erroring) when the id is unknown.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub fn start_challenge(&mut self, id: i64, actor: &str) -> Result<bool> {
        let now_ms = Utc::now().timestamp_millis();
        self.mutate(actor, |tx, ctx| {
            let rows = tx.execute(
                "UPDATE challenges SET status = 'in_progress', started_at = ?1 WHERE id = ?2",
                rusqlite::params![now_ms, id],
            )?;
            if rows > 0 {
                ctx.record_event("challenge", id, EventType::ChallengeStarted);
            }
            Ok(rows > 0)
        })
    }

    /// Update challenge progress.
    ///
    /// The percent overwrites whatever was there and may move backward;
    /// no monotonicity is enforced. Minutes accumulate. Returns false when
    /// the id is unknown.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub fn update_challenge_progress(
        &mut self,
        id: i64,
        progress_percent: i64,
        minutes_delta: i64,
        notes: Option<&str>,
        actor: &str,
    ) -> Result<bool> {
        let percent = progress_percent.clamp(0, 100);

        self.mutate(actor, |tx, ctx| {
            let rows = if let Some(notes) = notes {
                tx.execute(
                    "UPDATE challenges
                     SET progress_percent = ?1, time_spent = time_spent + ?2, notes = ?3
                     WHERE id = ?4",
                    rusqlite::params![percent, minutes_delta, notes, id],
                )?
            } else {
                tx.execute(
                    "UPDATE challenges
                     SET progress_percent = ?1, time_spent = time_spent + ?2
                     WHERE id = ?3",
                    rusqlite::params![percent, minutes_delta, id],
                )?
            };

            if rows > 0 {
                ctx.record_event("challenge", id, EventType::ChallengeProgressed);
            }
            Ok(rows > 0)
        })
    }

    /// Complete a challenge and emit project evidence.
    ///
    /// Forces `progress_percent` to 100, stamps `completed_at`, and
    /// appends final notes after any existing ones rather than
    /// overwriting.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ChallengeNotFound`] if the id does not resolve.
    pub fn complete_challenge(
        &mut self,
        id: i64,
        github_link: Option<&str>,
        final_notes: Option<&str>,
        actor: &str,
    ) -> Result<()> {
        let now_ms = Utc::now().timestamp_millis();

        self.mutate(actor, |tx, ctx| {
            let existing: Option<(i64, Option<String>)> = tx
                .query_row(
                    "SELECT skill_id, notes FROM challenges WHERE id = ?1",
                    [id],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()?;

            let Some((skill_id, notes)) = existing else {
                return Err(Error::ChallengeNotFound { id });
            };

            let notes = match (notes.filter(|n| !n.is_empty()), final_notes) {
                (Some(old), Some(new)) => Some(format!("{old}\n\nFinal notes: {new}")),
                (None, Some(new)) => Some(format!("Final notes: {new}")),
                (old, None) => old,
            };

            tx.execute(
                "UPDATE challenges
                 SET status = 'completed', completed_at = ?1, progress_percent = 100,
                     github_link = COALESCE(?2, github_link), notes = ?3
                 WHERE id = ?4",
                rusqlite::params![now_ms, github_link, notes, id],
            )?;

            tx.execute(
                "INSERT INTO skill_evidence (skill_id, challenge_id, evidence_type, description, created_at)
                 VALUES (?1, ?2, ?3, 'Completed full challenge', ?4)",
                rusqlite::params![skill_id, id, EvidenceType::ProjectCompleted.as_str(), now_ms],
            )?;

            ctx.record_event("challenge", id, EventType::ChallengeCompleted);
            Ok(())
        })
    }

    /// Abandon a challenge.
    ///
    /// Completed challenges stay completed; abandonment is only reachable
    /// from `not_started` and `in_progress`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ChallengeNotFound`] if the id does not resolve,
    /// or an invalid-argument error for a completed challenge.
    pub fn abandon_challenge(&mut self, id: i64, actor: &str) -> Result<()> {
        self.mutate(actor, |tx, ctx| {
            let status: Option<String> = tx
                .query_row("SELECT status FROM challenges WHERE id = ?1", [id], |row| {
                    row.get(0)
                })
                .optional()?;

            let Some(status) = status else {
                return Err(Error::ChallengeNotFound { id });
            };
            if ChallengeStatus::from_str_or_default(&status) == ChallengeStatus::Completed {
                return Err(Error::InvalidArgument(
                    "cannot abandon a completed challenge".to_string(),
                ));
            }

            tx.execute("UPDATE challenges SET status = 'abandoned' WHERE id = ?1", [id])?;
            ctx.record_event("challenge", id, EventType::ChallengeAbandoned);
            Ok(())
        })
    }

    /// Derive a skill's progression from its challenge history.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SkillNotFound`] if the skill id does not resolve.
    pub fn get_skill_progression(&self, skill_id: i64) -> Result<SkillProgression> {
        if !skill_exists(&self.conn, skill_id)? {
            return Err(Error::SkillNotFound { id: skill_id });
        }

        let (total, completed, in_progress, minutes): (i64, i64, i64, i64) =
            self.conn.query_row(
                "SELECT COUNT(*),
                        COALESCE(SUM(CASE WHEN status = 'completed' THEN 1 ELSE 0 END), 0),
                        COALESCE(SUM(CASE WHEN status = 'in_progress' THEN 1 ELSE 0 END), 0),
                        COALESCE(SUM(time_spent), 0)
                 FROM challenges WHERE skill_id = ?1",
                [skill_id],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )?;

        let (total_obstacles, solved_obstacles): (i64, i64) = self.conn.query_row(
            "SELECT COUNT(*),
                    COALESCE(SUM(CASE WHEN o.status = 'solved' THEN 1 ELSE 0 END), 0)
             FROM obstacles o
             JOIN challenges c ON o.challenge_id = c.id
             WHERE c.skill_id = ?1",
            [skill_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        let evidence_count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM skill_evidence WHERE skill_id = ?1",
            [skill_id],
            |row| row.get(0),
        )?;

        let level = CompetencyLevel::from_completed(completed);

        Ok(SkillProgression {
            total_challenges: total,
            completed,
            in_progress,
            total_minutes: minutes,
            total_obstacles,
            solved_obstacles,
            evidence_count,
            competency_level: level,
            competency_percent: level.percent(),
        })
    }

    /// Recommend the next challenge for a skill, if any is eligible.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SkillNotFound`] if the skill id does not resolve.
    pub fn get_recommended_challenge(&self, skill_id: i64) -> Result<Option<Recommendation>> {
        if !skill_exists(&self.conn, skill_id)? {
            return Err(Error::SkillNotFound { id: skill_id });
        }

        let not_started = self.list_challenges(Some(skill_id), Some(ChallengeStatus::NotStarted))?;

        let mut stmt = self
            .conn
            .prepare("SELECT title FROM challenges WHERE skill_id = ?1 AND status = 'completed'")?;
        let completed_titles: HashSet<String> = stmt
            .query_map([skill_id], |row| row.get(0))?
            .collect::<rusqlite::Result<HashSet<_>>>()?;

        Ok(recommend_next(not_started, &completed_titles))
    }

    /// Recent evidence records for a skill, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_evidence(&self, skill_id: i64, limit: u32) -> Result<Vec<SkillEvidence>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, skill_id, challenge_id, evidence_type, description, created_at
             FROM skill_evidence
             WHERE skill_id = ?1
             ORDER BY created_at DESC
             LIMIT ?2",
        )?;
        let rows = stmt
            .query_map(rusqlite::params![skill_id, limit], |row| {
                Ok(SkillEvidence {
                    id: row.get(0)?,
                    skill_id: row.get(1)?,
                    challenge_id: row.get(2)?,
                    evidence_type: EvidenceType::from_str_or_default(
                        &row.get::<_, String>(3)?,
                    ),
                    description: row.get(4)?,
                    created_at: row.get(5)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    // ===================
    // Obstacle Operations
    // ===================

    /// Log a blocking obstacle against a challenge.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ChallengeNotFound`] before any write if the
    /// challenge id does not resolve.
    pub fn log_obstacle(
        &mut self,
        challenge_id: i64,
        description: &str,
        actor: &str,
    ) -> Result<i64> {
        let now_ms = Utc::now().timestamp_millis();

        self.mutate(actor, |tx, ctx| {
            if !challenge_exists(tx, challenge_id)? {
                return Err(Error::ChallengeNotFound { id: challenge_id });
            }

            tx.execute(
                "INSERT INTO obstacles (challenge_id, description, status, created_at)
                 VALUES (?1, ?2, 'blocking', ?3)",
                rusqlite::params![challenge_id, description, now_ms],
            )?;

            let id = tx.last_insert_rowid();
            ctx.record_event("obstacle", id, EventType::ObstacleLogged);
            Ok(id)
        })
    }

    /// Resolve an obstacle as solved (or as a workaround).
    ///
    /// Emits `obstacle_overcome` evidence for the owning skill, described
    /// by the first 200 characters of the solution.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ObstacleNotFound`] if the id does not resolve.
    #[allow(clippy::too_many_arguments)]
    pub fn solve_obstacle(
        &mut self,
        id: i64,
        solution: &str,
        insight: Option<&str>,
        time_to_solve: Option<i64>,
        resources_used: Option<&str>,
        workaround: bool,
        actor: &str,
    ) -> Result<()> {
        let now_ms = Utc::now().timestamp_millis();
        let status = if workaround {
            ObstacleStatus::Workaround
        } else {
            ObstacleStatus::Solved
        };

        self.mutate(actor, |tx, ctx| {
            let challenge_id: Option<i64> = tx
                .query_row(
                    "SELECT challenge_id FROM obstacles WHERE id = ?1",
                    [id],
                    |row| row.get(0),
                )
                .optional()?;

            let Some(challenge_id) = challenge_id else {
                return Err(Error::ObstacleNotFound { id });
            };

            tx.execute(
                "UPDATE obstacles
                 SET solution = ?1, insight = ?2, time_to_solve = ?3,
                     resources_used = ?4, status = ?5, solved_at = ?6
                 WHERE id = ?7",
                rusqlite::params![
                    solution,
                    insight,
                    time_to_solve,
                    resources_used,
                    status.as_str(),
                    now_ms,
                    id
                ],
            )?;

            let skill_id: i64 = tx.query_row(
                "SELECT skill_id FROM challenges WHERE id = ?1",
                [challenge_id],
                |row| row.get(0),
            )?;

            let evidence: String = solution.chars().take(200).collect();
            tx.execute(
                "INSERT INTO skill_evidence (skill_id, challenge_id, evidence_type, description, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![
                    skill_id,
                    challenge_id,
                    EvidenceType::ObstacleOvercome.as_str(),
                    evidence,
                    now_ms
                ],
            )?;

            ctx.record_event("obstacle", id, EventType::ObstacleResolved);
            Ok(())
        })
    }

    /// Get obstacles for a challenge, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_obstacles(&self, challenge_id: i64) -> Result<Vec<Obstacle>> {
        let sql = format!(
            "SELECT {OBSTACLE_COLUMNS} FROM obstacles
             WHERE challenge_id = ?1 ORDER BY created_at DESC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map([challenge_id], map_obstacle_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Search past obstacles and solutions by keyword.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn search_obstacles(&self, keyword: &str) -> Result<Vec<ObstacleHit>> {
        let pattern = format!("%{keyword}%");
        let cols = OBSTACLE_COLUMNS
            .split(", ")
            .map(|c| format!("o.{c}"))
            .collect::<Vec<_>>()
            .join(", ");

        let sql = format!(
            "SELECT {cols}, c.title, s.name
             FROM obstacles o
             JOIN challenges c ON o.challenge_id = c.id
             JOIN skills s ON c.skill_id = s.id
             WHERE o.description LIKE ?1 OR o.solution LIKE ?1
             ORDER BY o.solved_at DESC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map([pattern], |row| {
                Ok(ObstacleHit {
                    obstacle: map_obstacle_row(row)?,
                    challenge_title: row.get(10)?,
                    skill_name: row.get(11)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    // =================
    // Streak Operations
    // =================

    /// Upsert the streak row for `date`.
    ///
    /// The first write of a day inserts; later writes accumulate minutes
    /// and obstacle counters and append notes.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn log_daily_streak(
        &mut self,
        date: NaiveDate,
        minutes_worked: i64,
        challenge_id: Option<i64>,
        obstacles_encountered: i64,
        obstacles_solved: i64,
        notes: Option<&str>,
        actor: &str,
    ) -> Result<()> {
        let date_str = date.to_string();

        self.mutate(actor, |tx, ctx| {
            let existing: Option<Option<String>> = tx
                .query_row(
                    "SELECT notes FROM daily_streaks WHERE date = ?1",
                    [&date_str],
                    |row| row.get(0),
                )
                .optional()?;

            if let Some(old_notes) = existing {
                let merged_notes = match (old_notes.filter(|n| !n.is_empty()), notes) {
                    (Some(old), Some(new)) => Some(format!("{old}\n{new}")),
                    (None, Some(new)) => Some(new.to_string()),
                    (old, None) => old,
                };
                tx.execute(
                    "UPDATE daily_streaks
                     SET minutes_worked = minutes_worked + ?1,
                         obstacles_encountered = obstacles_encountered + ?2,
                         obstacles_solved = obstacles_solved + ?3,
                         notes = ?4
                     WHERE date = ?5",
                    rusqlite::params![
                        minutes_worked,
                        obstacles_encountered,
                        obstacles_solved,
                        merged_notes,
                        date_str
                    ],
                )?;
            } else {
                tx.execute(
                    "INSERT INTO daily_streaks
                     (date, minutes_worked, challenge_id, obstacles_encountered, obstacles_solved, notes)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    rusqlite::params![
                        date_str,
                        minutes_worked,
                        challenge_id,
                        obstacles_encountered,
                        obstacles_solved,
                        notes
                    ],
                )?;
            }

            ctx.record_event("streak", 0, EventType::StreakLogged);
            Ok(())
        })
    }

    /// Get one streak row by date.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_streak_entry(&self, date: NaiveDate) -> Result<Option<DailyStreak>> {
        let row = self
            .conn
            .prepare(
                "SELECT date, minutes_worked, challenge_id, obstacles_encountered,
                        obstacles_solved, notes
                 FROM daily_streaks WHERE date = ?1",
            )?
            .query_row([date.to_string()], |row| {
                Ok(DailyStreak {
                    date: row.get(0)?,
                    minutes_worked: row.get(1)?,
                    challenge_id: row.get(2)?,
                    obstacles_encountered: row.get(3)?,
                    obstacles_solved: row.get(4)?,
                    notes: row.get(5)?,
                })
            })
            .optional()?;
        Ok(row)
    }

    /// Streak statistics anchored at `today`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_streak_stats(&self, today: NaiveDate) -> Result<StreakStats> {
        let mut stmt = self
            .conn
            .prepare("SELECT date FROM daily_streaks ORDER BY date DESC")?;
        let dates: Vec<NaiveDate> = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .filter_map(std::result::Result::ok)
            .filter_map(|s| s.parse().ok())
            .collect();

        Ok(compute_streaks(&dates, today))
    }

    // =================
    // Memory Operations
    // =================

    /// Remember a fact about an entity.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn remember_fact(
        &mut self,
        entity: &str,
        fact: &str,
        context: Option<&str>,
        actor: &str,
    ) -> Result<i64> {
        let now_ms = Utc::now().timestamp_millis();
        self.mutate(actor, |tx, ctx| {
            tx.execute(
                "INSERT INTO facts (entity, fact, context, created_at) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![entity, fact, context, now_ms],
            )?;
            let id = tx.last_insert_rowid();
            ctx.record_event("fact", id, EventType::FactSaved);
            Ok(id)
        })
    }

    /// Get a fact by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_fact(&self, id: i64) -> Result<Option<Fact>> {
        let fact = self
            .conn
            .prepare("SELECT id, entity, fact, context, created_at FROM facts WHERE id = ?1")?
            .query_row([id], |row| {
                Ok(Fact {
                    id: row.get(0)?,
                    entity: row.get(1)?,
                    fact: row.get(2)?,
                    context: row.get(3)?,
                    created_at: row.get(4)?,
                })
            })
            .optional()?;
        Ok(fact)
    }

    /// Keyword fallback search over facts (the recall degraded path).
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn search_facts(&self, query: &str, limit: u32) -> Result<Vec<Fact>> {
        let pattern = format!("%{query}%");
        let mut stmt = self.conn.prepare(
            "SELECT id, entity, fact, context, created_at FROM facts
             WHERE fact LIKE ?1 OR entity LIKE ?1
             ORDER BY created_at DESC LIMIT ?2",
        )?;
        let rows = stmt
            .query_map(rusqlite::params![pattern, limit], |row| {
                Ok(Fact {
                    id: row.get(0)?,
                    entity: row.get(1)?,
                    fact: row.get(2)?,
                    context: row.get(3)?,
                    created_at: row.get(4)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Most recent facts.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn recent_facts(&self, limit: u32) -> Result<Vec<Fact>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, entity, fact, context, created_at FROM facts
             ORDER BY created_at DESC LIMIT ?1",
        )?;
        let rows = stmt
            .query_map([limit], |row| {
                Ok(Fact {
                    id: row.get(0)?,
                    entity: row.get(1)?,
                    fact: row.get(2)?,
                    context: row.get(3)?,
                    created_at: row.get(4)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// All facts about one entity.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn facts_about(&self, entity: &str) -> Result<Vec<Fact>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, entity, fact, context, created_at FROM facts
             WHERE entity = ?1 ORDER BY created_at DESC",
        )?;
        let rows = stmt
            .query_map([entity], |row| {
                Ok(Fact {
                    id: row.get(0)?,
                    entity: row.get(1)?,
                    fact: row.get(2)?,
                    context: row.get(3)?,
                    created_at: row.get(4)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Save (upsert) a preference.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn save_preference(
        &mut self,
        key: &str,
        value: &str,
        description: Option<&str>,
        actor: &str,
    ) -> Result<()> {
        let now_ms = Utc::now().timestamp_millis();
        self.mutate(actor, |tx, ctx| {
            tx.execute(
                "INSERT INTO preferences (key, value, description, updated_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(key) DO UPDATE SET
                   value = excluded.value,
                   description = COALESCE(excluded.description, description),
                   updated_at = excluded.updated_at",
                rusqlite::params![key, value, description, now_ms],
            )?;
            ctx.record_event("preference", 0, EventType::PreferenceSaved);
            Ok(())
        })
    }

    /// Get a preference value.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_preference(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM preferences WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    /// List all preferences.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_preferences(&self) -> Result<Vec<Preference>> {
        let mut stmt = self.conn.prepare(
            "SELECT key, value, description, updated_at FROM preferences ORDER BY key",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(Preference {
                    key: row.get(0)?,
                    value: row.get(1)?,
                    description: row.get(2)?,
                    updated_at: row.get(3)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Add a goal.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn add_goal(&mut self, goal: &str, deadline: Option<&str>, actor: &str) -> Result<i64> {
        let now_ms = Utc::now().timestamp_millis();
        self.mutate(actor, |tx, ctx| {
            tx.execute(
                "INSERT INTO goals (goal, deadline, created_at) VALUES (?1, ?2, ?3)",
                rusqlite::params![goal, deadline, now_ms],
            )?;
            let id = tx.last_insert_rowid();
            ctx.record_event("goal", id, EventType::GoalCreated);
            Ok(id)
        })
    }

    /// Active goals, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn active_goals(&self) -> Result<Vec<Goal>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, goal, deadline, status, created_at, completed_at FROM goals
             WHERE status = 'active' ORDER BY created_at DESC",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(Goal {
                    id: row.get(0)?,
                    goal: row.get(1)?,
                    deadline: row.get(2)?,
                    status: row.get(3)?,
                    created_at: row.get(4)?,
                    completed_at: row.get(5)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Complete a goal.
    ///
    /// # Errors
    ///
    /// Returns [`Error::GoalNotFound`] if the id does not resolve.
    pub fn complete_goal(&mut self, id: i64, actor: &str) -> Result<()> {
        let now_ms = Utc::now().timestamp_millis();
        self.mutate(actor, |tx, ctx| {
            let rows = tx.execute(
                "UPDATE goals SET status = 'completed', completed_at = ?1 WHERE id = ?2",
                rusqlite::params![now_ms, id],
            )?;
            if rows == 0 {
                return Err(Error::GoalNotFound { id });
            }
            ctx.record_event("goal", id, EventType::GoalCompleted);
            Ok(())
        })
    }

    /// Save a conversation transcript.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn save_conversation(
        &mut self,
        topic: &str,
        transcript: &str,
        message_count: i64,
        actor: &str,
    ) -> Result<i64> {
        let now_ms = Utc::now().timestamp_millis();
        self.mutate(actor, |tx, ctx| {
            tx.execute(
                "INSERT INTO conversations (topic, transcript, message_count, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![topic, transcript, message_count, now_ms],
            )?;
            let id = tx.last_insert_rowid();
            ctx.record_event("conversation", id, EventType::ConversationSaved);
            Ok(id)
        })
    }

    /// Get a conversation by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_conversation(&self, id: i64) -> Result<Option<Conversation>> {
        let row = self
            .conn
            .prepare(
                "SELECT id, topic, transcript, message_count, created_at
                 FROM conversations WHERE id = ?1",
            )?
            .query_row([id], |row| {
                Ok(Conversation {
                    id: row.get(0)?,
                    topic: row.get(1)?,
                    transcript: row.get(2)?,
                    message_count: row.get(3)?,
                    created_at: row.get(4)?,
                })
            })
            .optional()?;
        Ok(row)
    }

    /// Conversations whose saved timestamp falls on `date` (UTC).
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn conversations_on(&self, date: NaiveDate) -> Result<Vec<Conversation>> {
        let start = date
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc().timestamp_millis())
            .unwrap_or(0);
        let end = start + 24 * 60 * 60 * 1000;

        let mut stmt = self.conn.prepare(
            "SELECT id, topic, transcript, message_count, created_at
             FROM conversations WHERE created_at >= ?1 AND created_at < ?2
             ORDER BY created_at ASC",
        )?;
        let rows = stmt
            .query_map(rusqlite::params![start, end], |row| {
                Ok(Conversation {
                    id: row.get(0)?,
                    topic: row.get(1)?,
                    transcript: row.get(2)?,
                    message_count: row.get(3)?,
                    created_at: row.get(4)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Keyword fallback search over conversations.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn search_conversations(&self, query: &str, limit: u32) -> Result<Vec<Conversation>> {
        let pattern = format!("%{query}%");
        let mut stmt = self.conn.prepare(
            "SELECT id, topic, transcript, message_count, created_at
             FROM conversations WHERE topic LIKE ?1 OR transcript LIKE ?1
             ORDER BY created_at DESC LIMIT ?2",
        )?;
        let rows = stmt
            .query_map(rusqlite::params![pattern, limit], |row| {
                Ok(Conversation {
                    id: row.get(0)?,
                    topic: row.get(1)?,
                    transcript: row.get(2)?,
                    message_count: row.get(3)?,
                    created_at: row.get(4)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Index a file's content and summary for search.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn index_file(
        &mut self,
        path: &str,
        summary: Option<&str>,
        content: &str,
        actor: &str,
    ) -> Result<i64> {
        let now_ms = Utc::now().timestamp_millis();
        self.mutate(actor, |tx, ctx| {
            tx.execute(
                "INSERT INTO indexed_files (path, summary, content, indexed_at)
                 VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![path, summary, content, now_ms],
            )?;
            let id = tx.last_insert_rowid();
            ctx.record_event("file", id, EventType::FileIndexed);
            Ok(id)
        })
    }

    /// Get an indexed file by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_indexed_file(&self, id: i64) -> Result<Option<IndexedFile>> {
        let row = self
            .conn
            .prepare(
                "SELECT id, path, summary, content, indexed_at FROM indexed_files WHERE id = ?1",
            )?
            .query_row([id], |row| {
                Ok(IndexedFile {
                    id: row.get(0)?,
                    path: row.get(1)?,
                    summary: row.get(2)?,
                    content: row.get(3)?,
                    indexed_at: row.get(4)?,
                })
            })
            .optional()?;
        Ok(row)
    }

    /// Keyword fallback search over indexed files.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn search_files_keyword(&self, query: &str, limit: u32) -> Result<Vec<IndexedFile>> {
        let pattern = format!("%{query}%");
        let mut stmt = self.conn.prepare(
            "SELECT id, path, summary, content, indexed_at FROM indexed_files
             WHERE path LIKE ?1 OR summary LIKE ?1 OR content LIKE ?1
             ORDER BY indexed_at DESC LIMIT ?2",
        )?;
        let rows = stmt
            .query_map(rusqlite::params![pattern, limit], |row| {
                Ok(IndexedFile {
                    id: row.get(0)?,
                    path: row.get(1)?,
                    summary: row.get(2)?,
                    content: row.get(3)?,
                    indexed_at: row.get(4)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    // ====================
    // Embedding Operations
    // ====================

    /// Store (upsert) an embedding for a `(kind, ref_id)` pair.
    ///
    /// Vectors are stored as little-endian f32 BLOBs.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn store_embedding(
        &mut self,
        kind: &str,
        ref_id: i64,
        embedding: &[f32],
        provider: &str,
        model: &str,
    ) -> Result<()> {
        let now_ms = Utc::now().timestamp_millis();
        let blob: Vec<u8> = embedding.iter().flat_map(|f| f.to_le_bytes()).collect();

        self.conn.execute(
            "INSERT INTO embedding_chunks (kind, ref_id, embedding, dimensions, provider, model, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(kind, ref_id) DO UPDATE SET
               embedding = excluded.embedding,
               dimensions = excluded.dimensions,
               provider = excluded.provider,
               model = excluded.model,
               created_at = excluded.created_at",
            rusqlite::params![kind, ref_id, blob, embedding.len() as i64, provider, model, now_ms],
        )?;
        Ok(())
    }

    /// Load all embeddings of one kind, decoded back to f32 vectors.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn embeddings_for_kind(&self, kind: &str) -> Result<Vec<(i64, Vec<f32>)>> {
        let mut stmt = self
            .conn
            .prepare("SELECT ref_id, embedding FROM embedding_chunks WHERE kind = ?1")?;
        let rows = stmt
            .query_map([kind], |row| {
                let ref_id: i64 = row.get(0)?;
                let blob: Vec<u8> = row.get(1)?;
                let vector = blob
                    .chunks_exact(4)
                    .map(|bytes| f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
                    .collect();
                Ok((ref_id, vector))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACTOR: &str = "test";

    fn storage() -> SqliteStorage {
        SqliteStorage::open_memory().unwrap()
    }

    fn seed_skill(storage: &mut SqliteStorage, name: &str) -> i64 {
        storage
            .add_skill(name, None, SkillDifficulty::Beginner, None, None, ACTOR)
            .unwrap()
            .0
    }

    fn count(storage: &SqliteStorage, table: &str) -> i64 {
        storage
            .conn()
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))
            .unwrap()
    }

    #[test]
    fn test_add_skill_duplicate_is_idempotent() {
        let mut storage = storage();

        let (first, existed) = storage
            .add_skill("Python", None, SkillDifficulty::Beginner, None, None, ACTOR)
            .unwrap();
        assert!(!existed);

        let (second, existed) = storage
            .add_skill("Python", Some("programming"), SkillDifficulty::Advanced, None, None, ACTOR)
            .unwrap();
        assert!(existed);
        assert_eq!(first, second);
        assert_eq!(count(&storage, "skills"), 1);
    }

    #[test]
    fn test_new_skill_has_next_review_tomorrow() {
        let mut storage = storage();
        let id = seed_skill(&mut storage, "Rust");
        let skill = storage.get_skill(id).unwrap().unwrap();

        let next = skill.next_review.unwrap();
        let expected = Utc::now().timestamp_millis() + 24 * 60 * 60 * 1000;
        assert!((next - expected).abs() < 5_000);
    }

    #[test]
    fn test_log_session_updates_skill() {
        let mut storage = storage();
        let id = seed_skill(&mut storage, "Rust");

        storage
            .log_session(id, 45, "ownership, borrowing", 4, None, None, ACTOR)
            .unwrap();
        storage
            .log_session(id, 15, "lifetimes", 2, None, None, ACTOR)
            .unwrap();

        let skill = storage.get_skill(id).unwrap().unwrap();
        assert_eq!(skill.total_time_minutes, 60);
        assert!(skill.last_reviewed.is_some());

        // Understanding 2 schedules three days out.
        let expected = Utc::now().timestamp_millis() + 3 * 24 * 60 * 60 * 1000;
        assert!((skill.next_review.unwrap() - expected).abs() < 5_000);
    }

    #[test]
    fn test_log_session_missing_skill_writes_nothing() {
        let mut storage = storage();
        seed_skill(&mut storage, "Rust");
        let sessions_before = count(&storage, "study_sessions");

        let err = storage
            .log_session(999, 30, "nothing", 3, None, None, ACTOR)
            .unwrap_err();
        assert!(matches!(err, Error::SkillNotFound { id: 999 }));
        assert_eq!(count(&storage, "study_sessions"), sessions_before);
    }

    #[test]
    fn test_get_skill_details() {
        let mut storage = storage();
        let id = seed_skill(&mut storage, "Rust");
        for i in 0..7 {
            storage
                .log_session(id, 10, &format!("topic {i}"), 3, None, None, ACTOR)
                .unwrap();
        }
        storage
            .add_learning_item(id, "traits are interfaces", None, ItemType::Concept, 3, None, None, ACTOR)
            .unwrap();

        let details = storage.get_skill_details(id).unwrap();
        assert_eq!(details.recent_sessions.len(), 5);
        assert_eq!(details.stats.item_count, 1);

        assert!(matches!(
            storage.get_skill_details(404),
            Err(Error::SkillNotFound { id: 404 })
        ));
    }

    #[test]
    fn test_due_items_filtering_and_order() {
        let mut storage = storage();
        let skill = seed_skill(&mut storage, "Rust");

        let a = storage
            .add_learning_item(skill, "a", None, ItemType::Fact, 3, None, None, ACTOR)
            .unwrap();
        let b = storage
            .add_learning_item(skill, "b", None, ItemType::Fact, 3, None, None, ACTOR)
            .unwrap();
        let c = storage
            .add_learning_item(skill, "c", None, ItemType::Fact, 3, None, None, ACTOR)
            .unwrap();

        let now = Utc::now().timestamp_millis();
        // a: overdue, low confidence. b: overdue, higher confidence.
        // c: far future, must not appear.
        storage
            .conn()
            .execute(
                "UPDATE learning_items SET next_review = ?1, confidence_level = 1 WHERE id = ?2",
                rusqlite::params![now - 1000, a],
            )
            .unwrap();
        storage
            .conn()
            .execute(
                "UPDATE learning_items SET next_review = ?1, confidence_level = 4 WHERE id = ?2",
                rusqlite::params![now - 1000, b],
            )
            .unwrap();
        storage
            .conn()
            .execute(
                "UPDATE learning_items SET next_review = ?1 WHERE id = ?2",
                rusqlite::params![now + 86_400_000, c],
            )
            .unwrap();

        let due = storage.get_items_due_for_review(None, 10).unwrap();
        let ids: Vec<i64> = due.iter().map(|d| d.item.id).collect();
        assert!(!ids.contains(&c));
        let pos_a = ids.iter().position(|&i| i == a).unwrap();
        let pos_b = ids.iter().position(|&i| i == b).unwrap();
        assert!(pos_a < pos_b, "lower confidence surfaces first on equal due time");

        for d in &due {
            if let Some(nr) = d.item.next_review {
                assert!(nr <= Utc::now().timestamp_millis());
            }
        }
    }

    #[test]
    fn test_due_items_exclude_archived_skills() {
        let mut storage = storage();
        let skill = seed_skill(&mut storage, "Old Skill");
        let item = storage
            .add_learning_item(skill, "stale", None, ItemType::Fact, 3, None, None, ACTOR)
            .unwrap();
        storage
            .conn()
            .execute(
                "UPDATE learning_items SET next_review = 0 WHERE id = ?1",
                [item],
            )
            .unwrap();

        storage.archive_skill(skill, ACTOR).unwrap();
        assert!(storage.get_items_due_for_review(None, 10).unwrap().is_empty());

        // Explicit skill filter still reaches the archived skill's items.
        assert_eq!(
            storage
                .get_items_due_for_review(Some(skill), 10)
                .unwrap()
                .len(),
            1
        );
    }

    #[test]
    fn test_qa_item_requires_question() {
        let mut storage = storage();
        let skill = seed_skill(&mut storage, "Rust");

        let err = storage
            .add_learning_item(skill, "an answer", None, ItemType::Qa, 3, None, None, ACTOR)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert_eq!(count(&storage, "learning_items"), 0);

        storage
            .add_learning_item(skill, "an answer", Some("the question?"), ItemType::Qa, 3, None, None, ACTOR)
            .unwrap();
        assert_eq!(count(&storage, "learning_items"), 1);
    }

    #[test]
    fn test_record_review_updates_item() {
        let mut storage = storage();
        let skill = seed_skill(&mut storage, "Rust");
        let item = storage
            .add_learning_item(skill, "answer", Some("question?"), ItemType::Qa, 3, None, None, ACTOR)
            .unwrap();

        storage
            .record_review(item, true, 2, 4, Some(30), ACTOR)
            .unwrap();
        storage
            .record_review(item, false, 4, 5, None, ACTOR)
            .unwrap();

        let due = storage.get_items_due_for_review(Some(skill), 10).unwrap();
        // Incorrect review schedules +4h, so the item is not due now.
        assert!(due.is_empty());

        let (reviewed, correct, confidence): (i64, i64, i64) = storage
            .conn()
            .query_row(
                "SELECT times_reviewed, times_correct, confidence_level FROM learning_items WHERE id = ?1",
                [item],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .unwrap();
        assert_eq!(reviewed, 2);
        assert_eq!(correct, 1);
        assert_eq!(confidence, 5);
        assert_eq!(count(&storage, "review_events"), 2);

        let history = storage.get_review_history(item, 10).unwrap();
        assert_eq!(history.len(), 2);
        assert!(!history[0].was_correct, "newest first");
        assert!(history[1].was_correct);

        assert!(matches!(
            storage.get_review_history(999, 10),
            Err(Error::ItemNotFound { id: 999 })
        ));
    }

    #[test]
    fn test_challenge_lists_round_trip() {
        let mut storage = storage();
        let skill = seed_skill(&mut storage, "Rust");

        let id = storage
            .add_challenge(
                skill,
                "KV Store",
                "build it",
                ChallengeDifficulty::Intermediate,
                8,
                &["a".to_string(), "b".to_string()],
                &[],
                &["Job Queue".to_string()],
                ACTOR,
            )
            .unwrap();

        let challenge = storage.get_challenge(id).unwrap().unwrap();
        assert_eq!(challenge.skills_taught, vec!["a".to_string(), "b".to_string()]);
        assert!(challenge.prerequisites.is_empty());
        assert_eq!(challenge.unlocks, vec!["Job Queue".to_string()]);
        assert_eq!(challenge.status, ChallengeStatus::NotStarted);
    }

    #[test]
    fn test_challenge_lifecycle() {
        let mut storage = storage();
        let skill = seed_skill(&mut storage, "Rust");
        let id = storage
            .add_challenge(skill, "Project", "desc", ChallengeDifficulty::Beginner, 3, &[], &[], &[], ACTOR)
            .unwrap();

        assert!(storage.start_challenge(id, ACTOR).unwrap());
        assert!(!storage.start_challenge(999, ACTOR).unwrap());

        // Progress may move backward; both writes succeed.
        assert!(storage
            .update_challenge_progress(id, 60, 30, None, ACTOR)
            .unwrap());
        assert!(storage
            .update_challenge_progress(id, 40, 15, Some("rewrote the parser"), ACTOR)
            .unwrap());

        let challenge = storage.get_challenge(id).unwrap().unwrap();
        assert_eq!(challenge.progress_percent, 40);
        assert_eq!(challenge.time_spent, 45);
        assert_eq!(challenge.status, ChallengeStatus::InProgress);
    }

    #[test]
    fn test_complete_challenge_appends_final_notes() {
        let mut storage = storage();
        let skill = seed_skill(&mut storage, "Rust");
        let id = storage
            .add_challenge(skill, "Project", "desc", ChallengeDifficulty::Beginner, 3, &[], &[], &[], ACTOR)
            .unwrap();
        storage.start_challenge(id, ACTOR).unwrap();
        storage
            .update_challenge_progress(id, 50, 10, Some("X"), ACTOR)
            .unwrap();

        storage
            .complete_challenge(id, Some("https://github.com/u/r"), Some("Y"), ACTOR)
            .unwrap();

        let challenge = storage.get_challenge(id).unwrap().unwrap();
        assert_eq!(challenge.status, ChallengeStatus::Completed);
        assert_eq!(challenge.progress_percent, 100);
        assert!(challenge.completed_at.is_some());

        let notes = challenge.notes.unwrap();
        let x = notes.find('X').unwrap();
        let y = notes.find("Final notes: Y").unwrap();
        assert!(x < y);

        let evidence: i64 = storage
            .conn()
            .query_row(
                "SELECT COUNT(*) FROM skill_evidence WHERE evidence_type = 'project_completed'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(evidence, 1);

        assert!(matches!(
            storage.complete_challenge(999, None, None, ACTOR),
            Err(Error::ChallengeNotFound { id: 999 })
        ));
    }

    #[test]
    fn test_obstacle_lifecycle_emits_evidence() {
        let mut storage = storage();
        let skill = seed_skill(&mut storage, "Rust");
        let challenge = storage
            .add_challenge(skill, "Project", "desc", ChallengeDifficulty::Beginner, 3, &[], &[], &[], ACTOR)
            .unwrap();

        let obstacle = storage
            .log_obstacle(challenge, "borrow checker fight", ACTOR)
            .unwrap();
        let listed = storage.get_obstacles(challenge).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].status, ObstacleStatus::Blocking);

        let long_solution = "s".repeat(500);
        storage
            .solve_obstacle(obstacle, &long_solution, Some("clone less"), Some(25), None, false, ACTOR)
            .unwrap();

        let solved = &storage.get_obstacles(challenge).unwrap()[0];
        assert_eq!(solved.status, ObstacleStatus::Solved);
        assert!(solved.solved_at.is_some());

        let description: String = storage
            .conn()
            .query_row(
                "SELECT description FROM skill_evidence WHERE evidence_type = 'obstacle_overcome'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(description.chars().count(), 200);

        let evidence = storage.list_evidence(skill, 10).unwrap();
        assert_eq!(evidence.len(), 1);
        assert_eq!(evidence[0].evidence_type, EvidenceType::ObstacleOvercome);

        assert!(matches!(
            storage.log_obstacle(999, "nope", ACTOR),
            Err(Error::ChallengeNotFound { id: 999 })
        ));
    }

    #[test]
    fn test_skill_progression_competency() {
        let mut storage = storage();
        let skill = seed_skill(&mut storage, "Rust");

        for i in 0..5 {
            let id = storage
                .add_challenge(skill, &format!("C{i}"), "d", ChallengeDifficulty::Beginner, 1, &[], &[], &[], ACTOR)
                .unwrap();
            storage.complete_challenge(id, None, None, ACTOR).unwrap();
        }

        let progression = storage.get_skill_progression(skill).unwrap();
        assert_eq!(progression.completed, 5);
        assert_eq!(progression.competency_level, CompetencyLevel::Intermediate);
        assert_eq!(progression.competency_percent, 70);
        assert_eq!(progression.evidence_count, 5);
    }

    #[test]
    fn test_recommendation_respects_prerequisites() {
        let mut storage = storage();
        let skill = seed_skill(&mut storage, "Rust");

        let basics = storage
            .add_challenge(skill, "Basics", "d", ChallengeDifficulty::Beginner, 2, &[], &[], &[], ACTOR)
            .unwrap();
        storage
            .add_challenge(
                skill,
                "Advanced Build",
                "d",
                ChallengeDifficulty::Advanced,
                9,
                &[],
                &["Basics".to_string()],
                &[],
                ACTOR,
            )
            .unwrap();

        // Nothing completed yet: only Basics is eligible.
        let rec = storage.get_recommended_challenge(skill).unwrap().unwrap();
        assert_eq!(rec.challenge.title, "Basics");

        storage.complete_challenge(basics, None, None, ACTOR).unwrap();
        let rec = storage.get_recommended_challenge(skill).unwrap().unwrap();
        assert_eq!(rec.challenge.title, "Advanced Build");

        // Everything done: no recommendation, not an error.
        let advanced = rec.challenge.id;
        storage.complete_challenge(advanced, None, None, ACTOR).unwrap();
        assert!(storage.get_recommended_challenge(skill).unwrap().is_none());

        assert!(matches!(
            storage.get_recommended_challenge(999),
            Err(Error::SkillNotFound { id: 999 })
        ));
    }

    #[test]
    fn test_streak_upsert_and_stats() {
        let mut storage = storage();
        let jan1: NaiveDate = "2024-01-01".parse().unwrap();
        let jan3: NaiveDate = "2024-01-03".parse().unwrap();

        storage
            .log_daily_streak(jan1, 30, None, 1, 0, Some("morning"), ACTOR)
            .unwrap();
        storage
            .log_daily_streak(jan1, 20, None, 0, 1, Some("evening"), ACTOR)
            .unwrap();

        let entry = storage.get_streak_entry(jan1).unwrap().unwrap();
        assert_eq!(entry.minutes_worked, 50);
        assert_eq!(entry.obstacles_encountered, 1);
        assert_eq!(entry.obstacles_solved, 1);
        let notes = entry.notes.unwrap();
        assert!(notes.contains("morning") && notes.contains("evening"));

        // Checked on Jan 1: streak of one day.
        let stats = storage.get_streak_stats(jan1).unwrap();
        assert_eq!(stats.current_streak, 1);

        // Checked on Jan 3 with no entry that day: streak broken.
        let stats = storage.get_streak_stats(jan3).unwrap();
        assert_eq!(stats.current_streak, 0);
        assert_eq!(stats.total_days, 1);
    }

    #[test]
    fn test_facts_and_preferences() {
        let mut storage = storage();

        storage
            .remember_fact("rust", "the borrow checker is a friend", None, ACTOR)
            .unwrap();
        storage
            .remember_fact("coffee", "two cups max", Some("health chat"), ACTOR)
            .unwrap();

        let hits = storage.search_facts("borrow", 5).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].entity, "rust");

        assert_eq!(storage.facts_about("coffee").unwrap().len(), 1);
        assert_eq!(storage.recent_facts(10).unwrap().len(), 2);

        storage
            .save_preference("writing_style", "terse", None, ACTOR)
            .unwrap();
        storage
            .save_preference("writing_style", "casual, concise", None, ACTOR)
            .unwrap();
        assert_eq!(
            storage.get_preference("writing_style").unwrap().unwrap(),
            "casual, concise"
        );
        assert_eq!(storage.list_preferences().unwrap().len(), 1);
    }

    #[test]
    fn test_goals_lifecycle() {
        let mut storage = storage();
        let id = storage.add_goal("ship the CLI", Some("2024-12-01"), ACTOR).unwrap();
        assert_eq!(storage.active_goals().unwrap().len(), 1);

        storage.complete_goal(id, ACTOR).unwrap();
        assert!(storage.active_goals().unwrap().is_empty());

        assert!(matches!(
            storage.complete_goal(999, ACTOR),
            Err(Error::GoalNotFound { id: 999 })
        ));
    }

    #[test]
    fn test_embedding_blob_round_trip() {
        let mut storage = storage();
        let id = storage.remember_fact("x", "y", None, ACTOR).unwrap();

        let vector = vec![0.25f32, -1.5, 3.0];
        storage
            .store_embedding("fact", id, &vector, "ollama", "nomic-embed-text")
            .unwrap();

        let loaded = storage.embeddings_for_kind("fact").unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].0, id);
        assert_eq!(loaded[0].1, vector);

        // Upsert replaces in place.
        storage
            .store_embedding("fact", id, &[9.0], "ollama", "nomic-embed-text")
            .unwrap();
        let loaded = storage.embeddings_for_kind("fact").unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].1, vec![9.0]);
    }

    #[test]
    fn test_milestones() {
        let mut storage = storage();
        let skill = seed_skill(&mut storage, "Rust");

        let id = storage
            .add_milestone(skill, "first crate published", Some("2024-06-01"), None, ACTOR)
            .unwrap();
        assert_eq!(storage.get_milestones(skill, false).unwrap().len(), 1);

        storage.complete_milestone(id, ACTOR).unwrap();
        assert!(storage.get_milestones(skill, false).unwrap().is_empty());
        let all = storage.get_milestones(skill, true).unwrap();
        assert!(all[0].completed);
        assert!(all[0].completed_date.is_some());

        assert!(matches!(
            storage.add_milestone(999, "m", None, None, ACTOR),
            Err(Error::SkillNotFound { id: 999 })
        ));
    }

    #[test]
    fn test_mutation_writes_audit_events() {
        let mut storage = storage();
        let skill = seed_skill(&mut storage, "Rust");
        storage
            .log_session(skill, 30, "t", 3, None, None, ACTOR)
            .unwrap();

        let events = crate::storage::events::get_events(storage.conn(), "skill", skill, 10).unwrap();
        let types: Vec<&str> = events.iter().map(|e| e.0.as_str()).collect();
        assert!(types.contains(&"skill_created"));
        assert!(types.contains(&"session_logged"));
    }
}
