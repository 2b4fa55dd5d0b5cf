//! Saved-conversation command implementations.

use std::path::PathBuf;

use colored::Colorize;

use super::{format_ts, open_storage};
use crate::cli::ConversationCommands;
use crate::error::{Error, Result};

/// Execute conversation commands.
pub fn execute(command: &ConversationCommands, db: Option<&PathBuf>, json: bool) -> Result<()> {
    match command {
        ConversationCommands::List { date } => list(date.as_deref(), db, json),
        ConversationCommands::Search { query, limit } => search(query, *limit, db, json),
    }
}

fn list(date: Option<&str>, db: Option<&PathBuf>, json: bool) -> Result<()> {
    let storage = open_storage(db)?;

    let date = match date {
        Some(raw) => raw
            .parse()
            .map_err(|_| Error::InvalidArgument(format!("invalid date '{raw}' (use YYYY-MM-DD)")))?,
        None => chrono::Local::now().date_naive(),
    };

    let conversations = storage.conversations_on(date)?;

    if json {
        println!("{}", serde_json::to_string(&conversations)?);
        return Ok(());
    }

    if conversations.is_empty() {
        println!("No conversations saved on {date}.");
        return Ok(());
    }

    println!("Conversations on {date}:");
    for conv in &conversations {
        println!(
            "  #{} {} ({} messages, {})",
            conv.id,
            conv.topic.bold(),
            conv.message_count,
            format_ts(conv.created_at)
        );
    }

    Ok(())
}

fn search(query: &str, limit: u32, db: Option<&PathBuf>, json: bool) -> Result<()> {
    let storage = open_storage(db)?;
    let conversations = storage.search_conversations(query, limit)?;

    if json {
        println!("{}", serde_json::to_string(&conversations)?);
        return Ok(());
    }

    if conversations.is_empty() {
        println!("No saved conversations matching '{query}'.");
        return Ok(());
    }

    println!("{} conversation(s) matching '{query}':", conversations.len());
    for conv in &conversations {
        println!();
        println!(
            "  #{} {} ({})",
            conv.id,
            conv.topic.bold(),
            format_ts(conv.created_at)
        );
        let preview: String = conv.transcript.chars().take(200).collect();
        println!("  {preview}...");
    }

    Ok(())
}
