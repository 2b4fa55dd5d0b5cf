//! Interactive chat command.
//!
//! A blocking prompt loop around the completion service, augmented with
//! recalled facts, active goals, and the writing-style preference. The
//! transcript auto-saves every few messages and on exit or interrupt via
//! the one-shot [`Lifecycle`].

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use colored::Colorize;

use super::memory::recall_facts;
use super::{require_db_path, resolve_actor};
use crate::error::{Error, Result};
use crate::lifecycle::Lifecycle;
use crate::llm::{AnthropicClient, CompletionProvider, Role};
use crate::model::memory::extract_entity;
use crate::storage::SqliteStorage;

const CHAT_MAX_TOKENS: u32 = 4096;

const BASE_SYSTEM_PROMPT: &str = "You are a personal assistant with persistent memory.\n\
    You help the user learn, remember facts, track goals, and think things through.\n\
    Be conversational, helpful, and proactive.";

/// Run the interactive chat loop.
pub fn execute(db: Option<&PathBuf>, actor: Option<&str>) -> Result<()> {
    let db_path = require_db_path(db)?;
    let actor = resolve_actor(actor);

    let client = AnthropicClient::from_env()?;
    let lifecycle = Arc::new(Lifecycle::new(db_path.clone(), actor.clone()));

    {
        let lifecycle = Arc::clone(&lifecycle);
        ctrlc::set_handler(move || {
            eprintln!("\ninterrupt received, saving conversation...");
            lifecycle.shutdown();
            std::process::exit(130);
        })
        .map_err(|e| Error::Other(format!("failed to register interrupt handler: {e}")))?;
    }

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| Error::Other(format!("failed to create async runtime: {e}")))?;

    println!("Chatting with {} (quit, clear, or Ctrl-C to leave)", client.model());
    println!("Conversations auto-save as you go.\n");

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("{} ", "you>".bold());
        std::io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let input = line?.trim().to_string();

        if input.is_empty() {
            continue;
        }
        if input.eq_ignore_ascii_case("quit") || input.eq_ignore_ascii_case("exit") {
            break;
        }
        if input.eq_ignore_ascii_case("clear") {
            if let Err(e) = lifecycle.flush() {
                tracing::warn!("failed to save before clearing: {e}");
            }
            lifecycle.reset();
            println!("Conversation cleared.\n");
            continue;
        }

        let storage = SqliteStorage::open(&db_path)?;
        let system = build_system_prompt(&storage, &input);

        let mut turns = lifecycle.turns();
        turns.push(crate::llm::ChatTurn {
            role: Role::User,
            content: input.clone(),
        });

        match rt.block_on(client.chat(&turns, Some(&system), CHAT_MAX_TOKENS)) {
            Ok(response) => {
                println!();
                println!("{response}");
                println!();

                lifecycle.push_turn(Role::User, &input);
                lifecycle.push_turn(Role::Assistant, &response);

                capture_memory_command(&db_path, &actor, &input);

                if lifecycle.save_due() {
                    if let Err(e) = lifecycle.flush() {
                        tracing::warn!("periodic save failed: {e}");
                    }
                }
            }
            Err(e) => {
                eprintln!("{} {e}", "error:".red());
                if let Some(hint) = e.hint() {
                    eprintln!("  {hint}");
                }
                // The transcript survives a failed call; save what we have.
                if let Err(e) = lifecycle.flush() {
                    tracing::warn!("failed to save after error: {e}");
                }
            }
        }
    }

    lifecycle.shutdown();
    if !lifecycle.is_empty() {
        println!("Conversation saved. Goodbye!");
    } else {
        println!("Goodbye!");
    }

    Ok(())
}

/// Augment the base system prompt with memories, goals, and style.
fn build_system_prompt(storage: &SqliteStorage, user_message: &str) -> String {
    let mut system = BASE_SYSTEM_PROMPT.to_string();

    match recall_facts(storage, user_message, 3) {
        Ok(memories) if !memories.is_empty() => {
            system.push_str("\n\nRelevant memories:\n");
            for memory in memories {
                system.push_str(&format!("- {}: {}\n", memory.entity, memory.fact));
            }
        }
        Ok(_) => {}
        Err(e) => tracing::warn!("memory recall failed for prompt: {e}"),
    }

    match storage.active_goals() {
        Ok(goals) if !goals.is_empty() => {
            system.push_str("\nUser's active goals:\n");
            for goal in goals.iter().take(3) {
                system.push_str(&format!("- {}", goal.goal));
                if let Some(deadline) = &goal.deadline {
                    system.push_str(&format!(" (deadline: {deadline})"));
                }
                system.push('\n');
            }
        }
        Ok(_) => {}
        Err(e) => tracing::warn!("failed to load goals for prompt: {e}"),
    }

    if let Ok(Some(style)) = storage.get_preference("writing_style") {
        system.push_str(&format!("\nUser's writing style: {style}\n"));
    }

    system
}

/// Capture "remember that ..." phrasing as a fact.
fn capture_memory_command(db_path: &std::path::Path, actor: &str, user_message: &str) {
    let lower = user_message.to_lowercase();
    let Some(rest) = lower.split_once("remember that").map(|(_, rest)| rest) else {
        return;
    };

    let fact = rest.trim();
    if fact.is_empty() {
        return;
    }

    let entity = extract_entity(fact);
    match SqliteStorage::open(db_path) {
        Ok(mut storage) => {
            if let Err(e) = storage.remember_fact(&entity, fact, Some(user_message), actor) {
                tracing::warn!("failed to capture fact from chat: {e}");
            }
        }
        Err(e) => tracing::warn!("failed to open storage for fact capture: {e}"),
    }
}
