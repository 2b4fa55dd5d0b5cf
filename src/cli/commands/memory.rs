//! Memory command implementations: facts, recall, goals, style.

use std::path::PathBuf;

use colored::Colorize;

use super::{open_storage, resolve_actor};
use crate::cli::{GoalCommands, StyleCommands};
use crate::embeddings::{self, rank_by_similarity, EmbeddingProvider};
use crate::error::Result;
use crate::model::memory::extract_entity;
use crate::model::Fact;
use crate::storage::SqliteStorage;

/// Remember a fact, with best-effort semantic indexing.
pub fn execute_remember(
    fact: &str,
    about: Option<&str>,
    db: Option<&PathBuf>,
    actor: Option<&str>,
    json: bool,
) -> Result<()> {
    let mut storage = open_storage(db)?;
    let actor = resolve_actor(actor);
    let entity = about.map_or_else(|| extract_entity(fact), ToString::to_string);

    let id = storage.remember_fact(&entity, fact, None, &actor)?;

    // Indexing is best-effort; a missing embedding server never fails the
    // save.
    index_fact(&mut storage, id, &entity, fact);

    if json {
        println!("{}", serde_json::json!({ "fact_id": id, "entity": entity }));
    } else {
        println!("Remembered (about {entity}).");
    }

    Ok(())
}

fn index_fact(storage: &mut SqliteStorage, id: i64, entity: &str, fact: &str) {
    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::warn!("skipping semantic index: {e}");
            return;
        }
    };

    rt.block_on(async {
        let Some(provider) = embeddings::create_embedding_provider().await else {
            tracing::warn!("embedding provider unavailable; fact saved without semantic index");
            return;
        };

        match provider.generate_embedding(&format!("{entity}: {fact}")).await {
            Ok(vector) => {
                let info = provider.info();
                if let Err(e) = storage.store_embedding("fact", id, &vector, &info.name, &info.model)
                {
                    tracing::warn!("failed to store embedding: {e}");
                }
            }
            Err(e) => tracing::warn!("failed to embed fact: {e}"),
        }
    });
}

/// Search memories semantically, falling back to keyword search.
///
/// With `--about`, lists everything known about one entity; with no query
/// at all, lists the most recent facts.
pub fn execute_recall(
    query: Option<&str>,
    about: Option<&str>,
    limit: u32,
    db: Option<&PathBuf>,
    json: bool,
) -> Result<()> {
    let storage = open_storage(db)?;

    let facts = match (about, query) {
        (Some(entity), _) => storage.facts_about(entity)?,
        (None, Some(query)) => recall_facts(&storage, query, limit)?,
        (None, None) => storage.recent_facts(limit)?,
    };

    if json {
        println!("{}", serde_json::to_string(&facts)?);
        return Ok(());
    }

    if facts.is_empty() {
        println!("No memories found.");
        return Ok(());
    }

    println!("Found memories:");
    for fact in &facts {
        println!("  • {}: {}", fact.entity.bold(), fact.fact);
    }

    Ok(())
}

/// Semantic recall with the keyword degraded path.
///
/// Used both by the `recall` command and by chat prompt augmentation.
pub(crate) fn recall_facts(
    storage: &SqliteStorage,
    query: &str,
    limit: u32,
) -> Result<Vec<Fact>> {
    let rt = tokio::runtime::Runtime::new();

    let semantic: Option<Vec<Fact>> = match rt {
        Err(e) => {
            tracing::warn!("semantic recall unavailable: {e}");
            None
        }
        Ok(rt) => rt.block_on(async {
            let provider = embeddings::create_embedding_provider().await?;
            let query_vector = match provider.generate_embedding(query).await {
                Ok(v) => v,
                Err(e) => {
                    tracing::warn!("semantic recall failed, falling back to keywords: {e}");
                    return None;
                }
            };

            let candidates = match storage.embeddings_for_kind("fact") {
                Ok(c) => c,
                Err(e) => {
                    tracing::warn!("could not load embeddings: {e}");
                    return None;
                }
            };
            if candidates.is_empty() {
                return None;
            }

            let ranked = rank_by_similarity(&query_vector, candidates, limit as usize);
            let mut facts = Vec::new();
            for (ref_id, _score) in ranked {
                if let Ok(Some(fact)) = storage.get_fact(ref_id) {
                    facts.push(fact);
                }
            }
            Some(facts)
        }),
    };

    match semantic {
        Some(facts) => Ok(facts),
        None => {
            tracing::warn!("using keyword search for recall");
            storage.search_facts(query, limit)
        }
    }
}

/// Execute goal commands.
pub fn execute_goal(
    command: &GoalCommands,
    db: Option<&PathBuf>,
    actor: Option<&str>,
    json: bool,
) -> Result<()> {
    match command {
        GoalCommands::Add { text, deadline } => {
            let mut storage = open_storage(db)?;
            let actor = resolve_actor(actor);
            let id = storage.add_goal(text, deadline.as_deref(), &actor)?;

            if json {
                println!("{}", serde_json::json!({ "goal_id": id }));
            } else {
                println!("Goal {id} added.");
            }
            Ok(())
        }
        GoalCommands::List => {
            let storage = open_storage(db)?;
            let goals = storage.active_goals()?;

            if json {
                println!("{}", serde_json::to_string(&goals)?);
                return Ok(());
            }

            if goals.is_empty() {
                println!("No active goals.");
                return Ok(());
            }

            println!("Active goals:");
            for goal in &goals {
                print!("  #{} {}", goal.id, goal.goal);
                if let Some(deadline) = &goal.deadline {
                    print!(" (deadline {deadline})");
                }
                println!();
            }
            Ok(())
        }
        GoalCommands::Complete { id } => {
            let mut storage = open_storage(db)?;
            let actor = resolve_actor(actor);
            storage.complete_goal(*id, &actor)?;

            if json {
                println!("{}", serde_json::json!({ "id": id, "completed": true }));
            } else {
                println!("Goal {id} completed! 🎉");
            }
            Ok(())
        }
    }
}

/// Execute style commands.
pub fn execute_style(
    command: &StyleCommands,
    db: Option<&PathBuf>,
    actor: Option<&str>,
    json: bool,
) -> Result<()> {
    match command {
        StyleCommands::Set { style } => {
            let mut storage = open_storage(db)?;
            let actor = resolve_actor(actor);
            storage.save_preference("writing_style", style, Some("preferred writing style"), &actor)?;

            if json {
                println!("{}", serde_json::json!({ "writing_style": style }));
            } else {
                println!("Style saved.");
            }
            Ok(())
        }
        StyleCommands::Show => {
            let storage = open_storage(db)?;
            let style = storage.get_preference("writing_style")?;

            if json {
                println!("{}", serde_json::json!({ "writing_style": style }));
            } else {
                match style {
                    Some(style) => println!("writing style: {style}"),
                    None => println!("No writing style set. Set one: mindkeep style set \"...\""),
                }
            }
            Ok(())
        }
        StyleCommands::List => {
            let storage = open_storage(db)?;
            let preferences = storage.list_preferences()?;

            if json {
                println!("{}", serde_json::to_string(&preferences)?);
                return Ok(());
            }

            if preferences.is_empty() {
                println!("No preferences saved.");
                return Ok(());
            }

            println!("Preferences:");
            for pref in &preferences {
                println!("  {} = {}", pref.key, pref.value);
            }
            Ok(())
        }
    }
}
