//! Learning statistics command implementation.

use std::path::PathBuf;

use super::open_storage;
use crate::error::Result;

/// Show the daily summary plus trailing-window learning stats.
pub fn execute(days: i64, db: Option<&PathBuf>, json: bool) -> Result<()> {
    let storage = open_storage(db)?;
    let summary = storage.daily_summary()?;
    let stats = storage.learning_stats(days.max(1))?;

    if json {
        let output = serde_json::json!({
            "today": summary,
            "window_days": days,
            "stats": stats,
        });
        println!("{output}");
        return Ok(());
    }

    println!("Today:");
    println!("  items due for review:     {}", summary.items_due_for_review);
    println!("  skills needing attention: {}", summary.skills_needing_attention);
    println!(
        "  this week: {} sessions, {} min",
        summary.sessions_this_week, summary.minutes_this_week
    );

    println!();
    println!("Last {days} days:");
    println!(
        "  {} min total ({} h), {} min/day average",
        stats.total_minutes, stats.total_hours, stats.avg_minutes_per_day
    );
    println!(
        "  {} reviews, {}% accuracy",
        stats.total_reviews, stats.review_accuracy
    );

    if !stats.by_skill.is_empty() {
        println!();
        println!("  by skill:");
        for entry in &stats.by_skill {
            println!(
                "    {} - {} sessions, {} min",
                entry.skill_name, entry.session_count, entry.total_minutes
            );
        }
    }

    Ok(())
}
