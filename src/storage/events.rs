//! Audit event storage and retrieval.
//!
//! Every mutation records what happened, to what, and by whom. Events are
//! written inside the same transaction as the mutation they describe, so
//! the trail never disagrees with the data.

use rusqlite::{Connection, Result};

/// Event types for audit logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventType {
    // Skill events
    SkillCreated,
    SkillArchived,
    SessionLogged,
    RoadmapGenerated,

    // Learning item events
    ItemCreated,
    ItemReviewed,

    // Milestone events
    MilestoneCreated,
    MilestoneCompleted,

    // Challenge events
    ChallengeCreated,
    ChallengeStarted,
    ChallengeProgressed,
    ChallengeCompleted,
    ChallengeAbandoned,

    // Obstacle events
    ObstacleLogged,
    ObstacleResolved,

    // Streak events
    StreakLogged,

    // Memory events
    FactSaved,
    PreferenceSaved,
    GoalCreated,
    GoalCompleted,
    ConversationSaved,
    FileIndexed,
}

impl EventType {
    /// Get the string representation for storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SkillCreated => "skill_created",
            Self::SkillArchived => "skill_archived",
            Self::SessionLogged => "session_logged",
            Self::RoadmapGenerated => "roadmap_generated",
            Self::ItemCreated => "item_created",
            Self::ItemReviewed => "item_reviewed",
            Self::MilestoneCreated => "milestone_created",
            Self::MilestoneCompleted => "milestone_completed",
            Self::ChallengeCreated => "challenge_created",
            Self::ChallengeStarted => "challenge_started",
            Self::ChallengeProgressed => "challenge_progressed",
            Self::ChallengeCompleted => "challenge_completed",
            Self::ChallengeAbandoned => "challenge_abandoned",
            Self::ObstacleLogged => "obstacle_logged",
            Self::ObstacleResolved => "obstacle_resolved",
            Self::StreakLogged => "streak_logged",
            Self::FactSaved => "fact_saved",
            Self::PreferenceSaved => "preference_saved",
            Self::GoalCreated => "goal_created",
            Self::GoalCompleted => "goal_completed",
            Self::ConversationSaved => "conversation_saved",
            Self::FileIndexed => "file_indexed",
        }
    }
}

/// An audit event record.
///
/// `entity_id` is the integer row id of the affected entity (0 for keyed
/// rows like streak dates and preferences, which have no rowid of their
/// own).
#[derive(Debug, Clone)]
pub struct Event {
    pub entity_type: String,
    pub entity_id: i64,
    pub event_type: EventType,
    pub actor: String,
    pub comment: Option<String>,
    pub created_at: i64,
}

impl Event {
    /// Create a new event stamped at the current time.
    #[must_use]
    pub fn new(entity_type: &str, entity_id: i64, event_type: EventType, actor: &str) -> Self {
        Self {
            entity_type: entity_type.to_string(),
            entity_id,
            event_type,
            actor: actor.to_string(),
            comment: None,
            created_at: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Add a comment to the event.
    #[must_use]
    pub fn with_comment(mut self, comment: &str) -> Self {
        self.comment = Some(comment.to_string());
        self
    }
}

/// Insert an event into the database.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_event(conn: &Connection, event: &Event) -> Result<i64> {
    conn.execute(
        "INSERT INTO events (entity_type, entity_id, event_type, actor, comment, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        rusqlite::params![
            event.entity_type,
            event.entity_id,
            event.event_type.as_str(),
            event.actor,
            event.comment,
            event.created_at,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Recent `(event_type, actor, created_at)` rows for an entity, newest
/// first.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn get_events(
    conn: &Connection,
    entity_type: &str,
    entity_id: i64,
    limit: u32,
) -> Result<Vec<(String, String, i64)>> {
    let mut stmt = conn.prepare(
        "SELECT event_type, actor, created_at
         FROM events
         WHERE entity_type = ?1 AND entity_id = ?2
         ORDER BY created_at DESC, id DESC
         LIMIT ?3",
    )?;

    let rows = stmt.query_map(rusqlite::params![entity_type, entity_id, limit], |row| {
        Ok((row.get(0)?, row.get(1)?, row.get(2)?))
    })?;

    rows.collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::schema::apply_schema;

    #[test]
    fn test_event_insert_and_get() {
        let conn = Connection::open_in_memory().unwrap();
        apply_schema(&conn).unwrap();

        let event = Event::new("skill", 12, EventType::SkillCreated, "test-actor")
            .with_comment("Rust");

        let id = insert_event(&conn, &event).unwrap();
        assert!(id > 0);

        let events = get_events(&conn, "skill", 12, 10).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].0, "skill_created");
        assert_eq!(events[0].1, "test-actor");

        // Same id under a different entity type stays separate.
        assert!(get_events(&conn, "challenge", 12, 10).unwrap().is_empty());
    }
}
