//! Challenge command implementations.

use std::path::PathBuf;

use colored::Colorize;
use serde::Serialize;

use super::{open_storage, resolve_actor, split_flag_list};
use crate::cli::ChallengeCommands;
use crate::error::{Error, Result};
use crate::library;
use crate::model::{ChallengeStatus, ObstacleStatus};
use crate::validate::normalize_challenge_difficulty;

#[derive(Serialize)]
struct ChallengeAddOutput {
    challenge_id: i64,
    skill_id: i64,
    title: String,
}

/// Execute challenge commands.
pub fn execute(
    command: &ChallengeCommands,
    db: Option<&PathBuf>,
    actor: Option<&str>,
    json: bool,
) -> Result<()> {
    match command {
        ChallengeCommands::Add {
            skill_id,
            title,
            description,
            difficulty,
            hours,
            teaches,
            prerequisites,
            unlocks,
        } => add(
            *skill_id,
            title,
            description,
            difficulty,
            *hours,
            teaches.as_deref(),
            prerequisites.as_deref(),
            unlocks.as_deref(),
            db,
            actor,
            json,
        ),
        ChallengeCommands::List { skill, status } => list(*skill, status.as_deref(), db, json),
        ChallengeCommands::Show { id } => show(*id, db, json),
        ChallengeCommands::Start { id } => start(*id, db, actor, json),
        ChallengeCommands::Progress {
            id,
            percent,
            minutes,
            notes,
        } => progress(*id, *percent, *minutes, notes.as_deref(), db, actor, json),
        ChallengeCommands::Complete { id, github, notes } => {
            complete(*id, github.as_deref(), notes.as_deref(), db, actor, json)
        }
        ChallengeCommands::Abandon { id } => abandon(*id, db, actor, json),
        ChallengeCommands::Recommend { skill_id } => recommend(*skill_id, db, json),
        ChallengeCommands::Progression { skill_id } => progression(*skill_id, db, json),
        ChallengeCommands::Browse { category, search } => {
            browse(category.as_deref(), search.as_deref(), json)
        }
        ChallengeCommands::Adopt { skill_id, title } => adopt(*skill_id, title, db, actor, json),
    }
}

#[allow(clippy::too_many_arguments)]
fn add(
    skill_id: i64,
    title: &str,
    description: &str,
    difficulty: &str,
    hours: i64,
    teaches: Option<&str>,
    prerequisites: Option<&str>,
    unlocks: Option<&str>,
    db: Option<&PathBuf>,
    actor: Option<&str>,
    json: bool,
) -> Result<()> {
    let mut storage = open_storage(db)?;
    let actor = resolve_actor(actor);
    let difficulty = normalize_challenge_difficulty(difficulty);

    let challenge_id = storage.add_challenge(
        skill_id,
        title,
        description,
        difficulty,
        hours,
        &split_flag_list(teaches),
        &split_flag_list(prerequisites),
        &split_flag_list(unlocks),
        &actor,
    )?;

    if json {
        let output = ChallengeAddOutput {
            challenge_id,
            skill_id,
            title: title.to_string(),
        };
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!("Added challenge '{title}' (id {challenge_id})");
        println!("Start it: mindkeep challenge start {challenge_id}");
    }

    Ok(())
}

fn parse_status_filter(status: Option<&str>) -> Result<Option<ChallengeStatus>> {
    match status {
        None => Ok(None),
        Some(s) => ChallengeStatus::parse(&s.to_lowercase()).map(Some).ok_or_else(|| {
            Error::InvalidArgument(format!("unknown challenge status '{s}'"))
        }),
    }
}

fn list(
    skill: Option<i64>,
    status: Option<&str>,
    db: Option<&PathBuf>,
    json: bool,
) -> Result<()> {
    let storage = open_storage(db)?;
    let status = parse_status_filter(status)?;
    let challenges = storage.list_challenges(skill, status)?;

    if json {
        println!("{}", serde_json::to_string(&challenges)?);
        return Ok(());
    }

    if challenges.is_empty() {
        println!("No challenges found.");
        return Ok(());
    }

    println!("{} challenge(s):", challenges.len());
    println!();
    for c in &challenges {
        let marker = match c.status {
            ChallengeStatus::NotStarted => "○",
            ChallengeStatus::InProgress => "◐",
            ChallengeStatus::Completed => "●",
            ChallengeStatus::Abandoned => "✕",
        };
        println!(
            "  {marker} {} {} [{}] ~{}h, {}%",
            format!("#{}", c.id).bold(),
            c.title,
            c.difficulty.as_str(),
            c.estimated_hours,
            c.progress_percent
        );
    }

    Ok(())
}

fn show(id: i64, db: Option<&PathBuf>, json: bool) -> Result<()> {
    let storage = open_storage(db)?;
    let challenge = storage
        .get_challenge(id)?
        .ok_or(Error::ChallengeNotFound { id })?;
    let obstacles = storage.get_obstacles(id)?;

    if json {
        let output = serde_json::json!({
            "challenge": challenge,
            "obstacles": obstacles,
        });
        println!("{output}");
        return Ok(());
    }

    println!("{} {}", format!("#{}", challenge.id).bold(), challenge.title.bold());
    println!(
        "  {} | ~{}h estimated | {}% done | {} min spent",
        challenge.status.as_str(),
        challenge.estimated_hours,
        challenge.progress_percent,
        challenge.time_spent
    );
    if !challenge.description.is_empty() {
        println!();
        println!("  {}", challenge.description);
    }
    if !challenge.skills_taught.is_empty() {
        println!();
        println!("  teaches: {}", challenge.skills_taught.join(", "));
    }
    if !challenge.prerequisites.is_empty() {
        println!("  prerequisites: {}", challenge.prerequisites.join(", "));
    }
    if !challenge.unlocks.is_empty() {
        println!("  unlocks: {}", challenge.unlocks.join(", "));
    }
    if let Some(link) = &challenge.github_link {
        println!("  github: {link}");
    }
    if let Some(notes) = &challenge.notes {
        println!();
        println!("  notes:\n    {}", notes.replace('\n', "\n    "));
    }

    let blocking: Vec<_> = obstacles
        .iter()
        .filter(|o| o.status == ObstacleStatus::Blocking)
        .collect();
    if !blocking.is_empty() {
        println!();
        println!("  {} blocking obstacle(s):", blocking.len());
        for o in blocking {
            println!("    #{} {}", o.id, o.description);
        }
    }

    Ok(())
}

fn start(id: i64, db: Option<&PathBuf>, actor: Option<&str>, json: bool) -> Result<()> {
    let mut storage = open_storage(db)?;
    let actor = resolve_actor(actor);
    let started = storage.start_challenge(id, &actor)?;

    if json {
        println!("{}", serde_json::json!({ "id": id, "started": started }));
    } else if started {
        println!("Challenge {id} started. Log obstacles as you hit them!");
    } else {
        println!("{} no challenge with id {id}", "warning:".yellow());
    }

    Ok(())
}

fn progress(
    id: i64,
    percent: i64,
    minutes: i64,
    notes: Option<&str>,
    db: Option<&PathBuf>,
    actor: Option<&str>,
    json: bool,
) -> Result<()> {
    let mut storage = open_storage(db)?;
    let actor = resolve_actor(actor);
    let updated = storage.update_challenge_progress(id, percent, minutes, notes, &actor)?;

    if updated && minutes > 0 {
        // Working a challenge counts toward today's streak.
        let today = chrono::Local::now().date_naive();
        storage.log_daily_streak(today, minutes, Some(id), 0, 0, None, &actor)?;
    }

    if json {
        println!("{}", serde_json::json!({ "id": id, "updated": updated }));
    } else if updated {
        println!("Challenge {id} at {percent}% (+{minutes} min)");
    } else {
        println!("{} no challenge with id {id}", "warning:".yellow());
    }

    Ok(())
}

fn complete(
    id: i64,
    github: Option<&str>,
    notes: Option<&str>,
    db: Option<&PathBuf>,
    actor: Option<&str>,
    json: bool,
) -> Result<()> {
    let mut storage = open_storage(db)?;
    let actor = resolve_actor(actor);
    storage.complete_challenge(id, github, notes, &actor)?;

    if json {
        println!("{}", serde_json::json!({ "id": id, "completed": true }));
    } else {
        println!("{} Challenge {id} completed!", "🏆".bold());
        println!("Check your progression: mindkeep challenge progression <skill>");
    }

    Ok(())
}

fn abandon(id: i64, db: Option<&PathBuf>, actor: Option<&str>, json: bool) -> Result<()> {
    let mut storage = open_storage(db)?;
    let actor = resolve_actor(actor);
    storage.abandon_challenge(id, &actor)?;

    if json {
        println!("{}", serde_json::json!({ "id": id, "abandoned": true }));
    } else {
        println!("Challenge {id} abandoned.");
    }

    Ok(())
}

fn recommend(skill_id: i64, db: Option<&PathBuf>, json: bool) -> Result<()> {
    let storage = open_storage(db)?;
    let recommendation = storage.get_recommended_challenge(skill_id)?;

    if json {
        println!("{}", serde_json::to_string(&recommendation)?);
        return Ok(());
    }

    match recommendation {
        Some(rec) => {
            println!("Recommended: {} (id {})", rec.challenge.title.bold(), rec.challenge.id);
            println!("  {}", rec.reason);
            if !rec.unlocks.is_empty() {
                println!("  completing it unlocks: {}", rec.unlocks.join(", "));
            }
            println!("  start it: mindkeep challenge start {}", rec.challenge.id);
        }
        None => {
            println!("No eligible challenge right now.");
            println!("Add one, or generate a roadmap: mindkeep roadmap generate {skill_id}");
        }
    }

    Ok(())
}

fn progression(skill_id: i64, db: Option<&PathBuf>, json: bool) -> Result<()> {
    let storage = open_storage(db)?;
    let progression = storage.get_skill_progression(skill_id)?;

    if json {
        println!("{}", serde_json::to_string(&progression)?);
        return Ok(());
    }

    println!(
        "Competency: {} ({}%)",
        progression.competency_level.as_str().bold(),
        progression.competency_percent
    );
    println!(
        "  challenges: {} completed, {} in progress, {} total",
        progression.completed, progression.in_progress, progression.total_challenges
    );
    println!(
        "  obstacles: {} solved of {}",
        progression.solved_obstacles, progression.total_obstacles
    );
    println!("  evidence records: {}", progression.evidence_count);
    println!("  time in challenges: {} min", progression.total_minutes);

    let evidence = storage.list_evidence(skill_id, 5)?;
    if !evidence.is_empty() {
        println!();
        println!("  recent evidence:");
        for record in &evidence {
            println!(
                "    [{}] {}",
                record.evidence_type.as_str(),
                record.description.as_deref().unwrap_or("-")
            );
        }
    }

    Ok(())
}

fn browse(category: Option<&str>, search: Option<&str>, json: bool) -> Result<()> {
    let templates = match (category, search) {
        (_, Some(keyword)) => library::search(keyword),
        (Some(cat), None) => library::for_category(cat),
        (None, None) => library::TEMPLATES.iter().collect(),
    };

    if json {
        let items: Vec<_> = templates
            .iter()
            .map(|t| {
                serde_json::json!({
                    "category": t.category,
                    "title": t.title,
                    "difficulty": t.difficulty.as_str(),
                    "estimated_hours": t.estimated_hours,
                    "skills_taught": t.skills_taught,
                    "prerequisites": t.prerequisites,
                })
            })
            .collect();
        println!("{}", serde_json::Value::Array(items));
        return Ok(());
    }

    if templates.is_empty() {
        println!("No library challenges match.");
        return Ok(());
    }

    println!("Challenge library ({}):", templates.len());
    println!();
    for t in templates {
        println!(
            "  [{}] {} - {} (~{}h)",
            t.category,
            t.title.bold(),
            t.difficulty.as_str(),
            t.estimated_hours
        );
        println!("      teaches: {}", t.skills_taught.join(", "));
    }
    println!();
    println!("Adopt one: mindkeep challenge adopt <skill-id> \"<title>\"");

    Ok(())
}

fn adopt(
    skill_id: i64,
    title: &str,
    db: Option<&PathBuf>,
    actor: Option<&str>,
    json: bool,
) -> Result<()> {
    let template = library::TEMPLATES
        .iter()
        .find(|t| t.title.eq_ignore_ascii_case(title))
        .ok_or_else(|| {
            Error::InvalidArgument(format!(
                "no library challenge titled '{title}'; see mindkeep challenge browse"
            ))
        })?;

    let mut storage = open_storage(db)?;
    let actor = resolve_actor(actor);

    let to_vec = |items: &[&str]| items.iter().map(|s| (*s).to_string()).collect::<Vec<_>>();

    let challenge_id = storage.add_challenge(
        skill_id,
        template.title,
        template.description,
        template.difficulty,
        template.estimated_hours,
        &to_vec(template.skills_taught),
        &to_vec(template.prerequisites),
        &to_vec(template.unlocks),
        &actor,
    )?;

    if json {
        let output = ChallengeAddOutput {
            challenge_id,
            skill_id,
            title: template.title.to_string(),
        };
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!("Adopted '{}' as challenge {challenge_id}", template.title);
        println!("Start it: mindkeep challenge start {challenge_id}");
    }

    Ok(())
}
