//! Obstacle command implementations.

use std::path::PathBuf;

use colored::Colorize;
use serde::Serialize;

use super::{format_ts, open_storage, resolve_actor};
use crate::cli::ObstacleCommands;
use crate::error::Result;
use crate::model::ObstacleStatus;

#[derive(Serialize)]
struct ObstacleLogOutput {
    obstacle_id: i64,
    challenge_id: i64,
}

/// Execute obstacle commands.
pub fn execute(
    command: &ObstacleCommands,
    db: Option<&PathBuf>,
    actor: Option<&str>,
    json: bool,
) -> Result<()> {
    match command {
        ObstacleCommands::Log {
            challenge_id,
            description,
        } => log(*challenge_id, description, db, actor, json),
        ObstacleCommands::Solve {
            id,
            solution,
            insight,
            minutes,
            resources,
            workaround,
        } => solve(
            *id,
            solution,
            insight.as_deref(),
            *minutes,
            resources.as_deref(),
            *workaround,
            db,
            actor,
            json,
        ),
        ObstacleCommands::List { challenge_id } => list(*challenge_id, db, json),
        ObstacleCommands::Search { keyword } => search(keyword, db, json),
    }
}

fn log(
    challenge_id: i64,
    description: &str,
    db: Option<&PathBuf>,
    actor: Option<&str>,
    json: bool,
) -> Result<()> {
    let mut storage = open_storage(db)?;
    let actor = resolve_actor(actor);
    let obstacle_id = storage.log_obstacle(challenge_id, description, &actor)?;

    if json {
        let output = ObstacleLogOutput {
            obstacle_id,
            challenge_id,
        };
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!("Obstacle {obstacle_id} logged.");
        println!("When you beat it: mindkeep obstacle solve {obstacle_id} \"<solution>\"");
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn solve(
    id: i64,
    solution: &str,
    insight: Option<&str>,
    minutes: Option<i64>,
    resources: Option<&str>,
    workaround: bool,
    db: Option<&PathBuf>,
    actor: Option<&str>,
    json: bool,
) -> Result<()> {
    let mut storage = open_storage(db)?;
    let actor = resolve_actor(actor);
    storage.solve_obstacle(id, solution, insight, minutes, resources, workaround, &actor)?;

    let status = if workaround { "workaround" } else { "solved" };

    if json {
        println!("{}", serde_json::json!({ "id": id, "status": status }));
    } else {
        println!("Obstacle {id} marked {status}. {}", "Nice work.".green());
    }

    Ok(())
}

fn list(challenge_id: i64, db: Option<&PathBuf>, json: bool) -> Result<()> {
    let storage = open_storage(db)?;
    let obstacles = storage.get_obstacles(challenge_id)?;

    if json {
        println!("{}", serde_json::to_string(&obstacles)?);
        return Ok(());
    }

    if obstacles.is_empty() {
        println!("No obstacles logged for challenge {challenge_id}.");
        return Ok(());
    }

    println!("{} obstacle(s) for challenge {challenge_id}:", obstacles.len());
    println!();
    for o in &obstacles {
        let marker = match o.status {
            ObstacleStatus::Blocking => "⛔".to_string(),
            ObstacleStatus::Solved => "✓".to_string(),
            ObstacleStatus::Workaround => "~".to_string(),
        };
        println!("  {marker} #{} {} ({})", o.id, o.description, o.status.as_str());
        if let Some(solution) = &o.solution {
            println!("     solution: {solution}");
        }
        if let Some(insight) = &o.insight {
            println!("     insight:  {insight}");
        }
    }

    Ok(())
}

fn search(keyword: &str, db: Option<&PathBuf>, json: bool) -> Result<()> {
    let storage = open_storage(db)?;
    let hits = storage.search_obstacles(keyword)?;

    if json {
        println!("{}", serde_json::to_string(&hits)?);
        return Ok(());
    }

    if hits.is_empty() {
        println!("No past obstacles matching '{keyword}'.");
        return Ok(());
    }

    println!("{} past obstacle(s) matching '{keyword}':", hits.len());
    println!();
    for hit in &hits {
        let o = &hit.obstacle;
        println!(
            "  #{} [{} / {}] {}",
            o.id, hit.skill_name, hit.challenge_title, o.description
        );
        if let Some(solution) = &o.solution {
            println!("     solved: {solution}");
        }
        if let Some(solved_at) = o.solved_at {
            println!("     when:   {}", format_ts(solved_at));
        }
    }

    Ok(())
}
