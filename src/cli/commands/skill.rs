//! Skill command implementations.

use std::path::PathBuf;

use colored::Colorize;
use serde::Serialize;

use super::{format_ts, open_storage, resolve_actor};
use crate::cli::SkillCommands;
use crate::error::Result;
use crate::model::SkillStatus;
use crate::validate::normalize_skill_difficulty;

#[derive(Serialize)]
struct SkillAddOutput {
    id: i64,
    name: String,
    already_existed: bool,
}

/// Execute skill commands.
pub fn execute(
    command: &SkillCommands,
    db: Option<&PathBuf>,
    actor: Option<&str>,
    json: bool,
) -> Result<()> {
    match command {
        SkillCommands::Add {
            name,
            category,
            difficulty,
            target,
            notes,
        } => add(
            name,
            category.as_deref(),
            difficulty,
            target.as_deref(),
            notes.as_deref(),
            db,
            actor,
            json,
        ),
        SkillCommands::List { archived } => list(*archived, db, json),
        SkillCommands::Show { id } => show(*id, db, json),
        SkillCommands::Archive { id } => archive(*id, db, actor, json),
    }
}

#[allow(clippy::too_many_arguments)]
fn add(
    name: &str,
    category: Option<&str>,
    difficulty: &str,
    target: Option<&str>,
    notes: Option<&str>,
    db: Option<&PathBuf>,
    actor: Option<&str>,
    json: bool,
) -> Result<()> {
    let mut storage = open_storage(db)?;
    let actor = resolve_actor(actor);
    let difficulty = normalize_skill_difficulty(difficulty);

    let (id, existed) = storage.add_skill(name, category, difficulty, target, notes, &actor)?;

    if existed {
        tracing::warn!("skill '{name}' already exists (id {id})");
    }

    if json {
        let output = SkillAddOutput {
            id,
            name: name.to_string(),
            already_existed: existed,
        };
        println!("{}", serde_json::to_string(&output)?);
    } else if existed {
        println!(
            "{} Skill '{name}' already exists (id {id})",
            "warning:".yellow()
        );
    } else {
        println!("Tracking new skill '{name}' (id {id})");
        println!("First review scheduled for tomorrow.");
    }

    Ok(())
}

fn list(archived: bool, db: Option<&PathBuf>, json: bool) -> Result<()> {
    let storage = open_storage(db)?;
    let status = if archived {
        SkillStatus::Archived
    } else {
        SkillStatus::Active
    };

    let skills = storage.list_skills(status)?;

    if json {
        println!("{}", serde_json::to_string(&skills)?);
        return Ok(());
    }

    if skills.is_empty() {
        println!("No {} skills. Add one: mindkeep skill add <name>", status.as_str());
        return Ok(());
    }

    println!("{} skills ({}):", status.as_str(), skills.len());
    println!();
    for overview in &skills {
        let s = &overview.skill;
        println!(
            "  {} {} [{}] - {} sessions, {} items, {} min total",
            format!("#{}", s.id).bold(),
            s.name,
            s.difficulty.as_str(),
            overview.session_count,
            overview.item_count,
            s.total_time_minutes
        );
        if let Some(next) = s.next_review {
            println!("     next review: {}", format_ts(next));
        }
    }

    Ok(())
}

fn show(id: i64, db: Option<&PathBuf>, json: bool) -> Result<()> {
    let storage = open_storage(db)?;
    let details = storage.get_skill_details(id)?;

    if json {
        println!("{}", serde_json::to_string(&details)?);
        return Ok(());
    }

    let s = &details.skill;
    println!("{} {}", format!("#{}", s.id).bold(), s.name.bold());
    println!("  difficulty: {}", s.difficulty.as_str());
    if let Some(category) = &s.category {
        println!("  category:   {category}");
    }
    if let Some(target) = &s.target_level {
        println!("  target:     {target}");
    }
    println!("  total time: {} min", s.total_time_minutes);
    if let Some(last) = s.last_reviewed {
        println!("  last reviewed: {}", format_ts(last));
    }
    if let Some(next) = s.next_review {
        println!("  next review:   {}", format_ts(next));
    }
    if s.roadmap_generated {
        println!("  roadmap: generated ({})", s.current_level.as_deref().unwrap_or("-"));
    }

    let stats = &details.stats;
    println!();
    println!(
        "  items: {} (avg confidence {:.1}), reviews: {} ({} correct)",
        stats.item_count,
        stats.avg_confidence.unwrap_or(0.0),
        stats.total_reviews,
        stats.total_correct
    );

    if !details.recent_sessions.is_empty() {
        println!();
        println!("  recent sessions:");
        for session in &details.recent_sessions {
            println!(
                "    {} - {} min, understanding {}/5: {}",
                format_ts(session.session_date),
                session.duration_minutes,
                session.understanding_level,
                session.topics_covered
            );
        }
    }

    Ok(())
}

fn archive(id: i64, db: Option<&PathBuf>, actor: Option<&str>, json: bool) -> Result<()> {
    let mut storage = open_storage(db)?;
    let actor = resolve_actor(actor);
    storage.archive_skill(id, &actor)?;

    if json {
        println!("{}", serde_json::json!({ "id": id, "archived": true }));
    } else {
        println!("Archived skill {id}");
    }

    Ok(())
}
