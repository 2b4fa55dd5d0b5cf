//! Milestone command implementations.

use std::path::PathBuf;

use super::{format_ts, open_storage, resolve_actor};
use crate::cli::MilestoneCommands;
use crate::error::Result;

/// Execute milestone commands.
pub fn execute(
    command: &MilestoneCommands,
    db: Option<&PathBuf>,
    actor: Option<&str>,
    json: bool,
) -> Result<()> {
    match command {
        MilestoneCommands::Add {
            skill_id,
            text,
            target,
            notes,
        } => add(*skill_id, text, target.as_deref(), notes.as_deref(), db, actor, json),
        MilestoneCommands::List { skill_id, all } => list(*skill_id, *all, db, json),
        MilestoneCommands::Complete { id } => complete(*id, db, actor, json),
    }
}

fn add(
    skill_id: i64,
    text: &str,
    target: Option<&str>,
    notes: Option<&str>,
    db: Option<&PathBuf>,
    actor: Option<&str>,
    json: bool,
) -> Result<()> {
    let mut storage = open_storage(db)?;
    let actor = resolve_actor(actor);
    let id = storage.add_milestone(skill_id, text, target, notes, &actor)?;

    if json {
        println!("{}", serde_json::json!({ "milestone_id": id, "skill_id": skill_id }));
    } else {
        println!("Milestone {id} added.");
    }

    Ok(())
}

fn list(skill_id: i64, all: bool, db: Option<&PathBuf>, json: bool) -> Result<()> {
    let storage = open_storage(db)?;
    let milestones = storage.get_milestones(skill_id, all)?;

    if json {
        println!("{}", serde_json::to_string(&milestones)?);
        return Ok(());
    }

    if milestones.is_empty() {
        println!("No milestones for skill {skill_id}.");
        return Ok(());
    }

    println!("Milestones for skill {skill_id}:");
    for m in &milestones {
        let marker = if m.completed { "✓" } else { "○" };
        print!("  {marker} #{} {}", m.id, m.milestone);
        if let Some(target) = &m.target_date {
            print!(" (target {target})");
        }
        if let Some(done) = m.completed_date {
            print!(" - done {}", format_ts(done));
        }
        println!();
    }

    Ok(())
}

fn complete(id: i64, db: Option<&PathBuf>, actor: Option<&str>, json: bool) -> Result<()> {
    let mut storage = open_storage(db)?;
    let actor = resolve_actor(actor);
    storage.complete_milestone(id, &actor)?;

    if json {
        println!("{}", serde_json::json!({ "id": id, "completed": true }));
    } else {
        println!("Milestone {id} completed!");
    }

    Ok(())
}
