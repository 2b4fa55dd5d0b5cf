//! Learning item command implementations.

use std::path::PathBuf;

use colored::Colorize;
use serde::Serialize;

use super::{format_ts, open_storage, resolve_actor};
use crate::cli::ItemCommands;
use crate::error::Result;
use crate::validate::normalize_item_type;

#[derive(Serialize)]
struct ItemAddOutput {
    item_id: i64,
    skill_id: i64,
}

/// Execute item commands.
pub fn execute(
    command: &ItemCommands,
    db: Option<&PathBuf>,
    actor: Option<&str>,
    json: bool,
) -> Result<()> {
    match command {
        ItemCommands::Add {
            skill_id,
            answer,
            question,
            item_type,
            difficulty,
            tags,
            source,
        } => add(
            *skill_id,
            answer,
            question.as_deref(),
            item_type,
            *difficulty,
            tags.as_deref(),
            source.as_deref(),
            db,
            actor,
            json,
        ),
        ItemCommands::Due { skill, limit } => due(*skill, *limit, db, json),
        ItemCommands::Review {
            id,
            correct,
            incorrect,
            before,
            after,
            seconds,
        } => {
            if !correct && !incorrect {
                return Err(crate::error::Error::InvalidArgument(
                    "pass --correct or --incorrect".to_string(),
                ));
            }
            review(*id, *correct, *before, *after, *seconds, db, actor, json)
        }
        ItemCommands::Search { query, skill } => search(query, *skill, db, json),
        ItemCommands::History { id, limit } => history(*id, *limit, db, json),
    }
}

fn history(id: i64, limit: u32, db: Option<&PathBuf>, json: bool) -> Result<()> {
    let storage = open_storage(db)?;
    let events = storage.get_review_history(id, limit)?;

    if json {
        println!("{}", serde_json::to_string(&events)?);
        return Ok(());
    }

    if events.is_empty() {
        println!("Item {id} has not been reviewed yet.");
        return Ok(());
    }

    println!("Review history for item {id}:");
    for event in &events {
        let verdict = if event.was_correct {
            "correct".green()
        } else {
            "incorrect".red()
        };
        print!(
            "  {} {verdict}, confidence {} -> {}",
            format_ts(event.review_date),
            event.confidence_before,
            event.confidence_after
        );
        if let Some(seconds) = event.time_taken_seconds {
            print!(" ({seconds}s)");
        }
        println!();
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn add(
    skill_id: i64,
    answer: &str,
    question: Option<&str>,
    item_type: &str,
    difficulty: i64,
    tags: Option<&str>,
    source: Option<&str>,
    db: Option<&PathBuf>,
    actor: Option<&str>,
    json: bool,
) -> Result<()> {
    let mut storage = open_storage(db)?;
    let actor = resolve_actor(actor);
    let item_type = normalize_item_type(item_type);

    let item_id = storage.add_learning_item(
        skill_id, answer, question, item_type, difficulty, tags, source, &actor,
    )?;

    if json {
        let output = ItemAddOutput { item_id, skill_id };
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!("Added {} item {item_id}; first review tomorrow.", item_type.as_str());
    }

    Ok(())
}

fn due(skill: Option<i64>, limit: u32, db: Option<&PathBuf>, json: bool) -> Result<()> {
    let storage = open_storage(db)?;
    let items = storage.get_items_due_for_review(skill, limit)?;

    if json {
        println!("{}", serde_json::to_string(&items)?);
        return Ok(());
    }

    if items.is_empty() {
        println!("Nothing due for review. Nice.");
        return Ok(());
    }

    println!("{} item(s) due:", items.len());
    println!();
    for due in &items {
        let item = &due.item;
        println!(
            "  {} [{}] {}",
            format!("#{}", item.id).bold(),
            due.skill_name,
            item.question.as_deref().unwrap_or(&item.answer)
        );
        println!(
            "     confidence {}/5, reviewed {} times, due {}",
            item.confidence_level,
            item.times_reviewed,
            item.next_review.map_or_else(|| "now".to_string(), format_ts)
        );
    }
    println!();
    println!("Review one: mindkeep item review <id> --correct --after <1-5>");

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn review(
    id: i64,
    was_correct: bool,
    before: i64,
    after: i64,
    seconds: Option<i64>,
    db: Option<&PathBuf>,
    actor: Option<&str>,
    json: bool,
) -> Result<()> {
    let mut storage = open_storage(db)?;
    let actor = resolve_actor(actor);

    storage.record_review(id, was_correct, before, after, seconds, &actor)?;

    let next_review: Option<i64> = storage
        .conn()
        .query_row(
            "SELECT next_review FROM learning_items WHERE id = ?1",
            [id],
            |row| row.get(0),
        )
        .ok()
        .flatten();

    if json {
        let output = serde_json::json!({
            "item_id": id,
            "was_correct": was_correct,
            "next_review": next_review,
        });
        println!("{output}");
    } else {
        let verdict = if was_correct {
            "correct".green()
        } else {
            "incorrect".red()
        };
        println!("Recorded {verdict} review for item {id}");
        if let Some(next) = next_review {
            println!("Next review: {}", format_ts(next));
        }
    }

    Ok(())
}

fn search(query: &str, skill: Option<i64>, db: Option<&PathBuf>, json: bool) -> Result<()> {
    let storage = open_storage(db)?;
    let hits = storage.search_learning_items(query, skill, 20)?;

    if json {
        println!("{}", serde_json::to_string(&hits)?);
        return Ok(());
    }

    if hits.is_empty() {
        println!("No items matching '{query}'");
        return Ok(());
    }

    println!("{} item(s) matching '{query}':", hits.len());
    for hit in &hits {
        let item = &hit.item;
        println!(
            "  #{} [{}] {} (confidence {}/5)",
            item.id,
            hit.skill_name,
            item.question.as_deref().unwrap_or(&item.answer),
            item.confidence_level
        );
    }

    Ok(())
}
