//! Streak command implementations.

use std::path::PathBuf;

use colored::Colorize;

use super::{open_storage, resolve_actor};
use crate::cli::StreakCommands;
use crate::error::Result;

/// Execute streak commands.
pub fn execute(
    command: &StreakCommands,
    db: Option<&PathBuf>,
    actor: Option<&str>,
    json: bool,
) -> Result<()> {
    match command {
        StreakCommands::Log {
            minutes,
            challenge,
            encountered,
            solved,
            notes,
        } => log(*minutes, *challenge, *encountered, *solved, notes.as_deref(), db, actor, json),
        StreakCommands::Stats => stats(db, json),
    }
}

fn log(
    minutes: i64,
    challenge: Option<i64>,
    encountered: i64,
    solved: i64,
    notes: Option<&str>,
    db: Option<&PathBuf>,
    actor: Option<&str>,
    json: bool,
) -> Result<()> {
    let mut storage = open_storage(db)?;
    let actor = resolve_actor(actor);
    let today = chrono::Local::now().date_naive();

    storage.log_daily_streak(today, minutes, challenge, encountered, solved, notes, &actor)?;
    let entry = storage.get_streak_entry(today)?;

    if json {
        println!("{}", serde_json::to_string(&entry)?);
    } else if let Some(entry) = entry {
        println!(
            "Logged. Today: {} min, {} obstacle(s) hit, {} solved.",
            entry.minutes_worked, entry.obstacles_encountered, entry.obstacles_solved
        );
    }

    Ok(())
}

fn stats(db: Option<&PathBuf>, json: bool) -> Result<()> {
    let storage = open_storage(db)?;
    let today = chrono::Local::now().date_naive();
    let stats = storage.get_streak_stats(today)?;

    if json {
        println!("{}", serde_json::to_string(&stats)?);
        return Ok(());
    }

    if stats.current_streak > 0 {
        println!(
            "{} {} day streak!",
            "🔥".bold(),
            stats.current_streak
        );
    } else {
        println!("No active streak. Log some work today to start one.");
    }
    println!("  longest streak: {} days", stats.longest_streak);
    println!("  total days logged: {}", stats.total_days);

    Ok(())
}
