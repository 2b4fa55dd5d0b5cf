//! Explanation command implementations.

use std::path::PathBuf;

use super::open_storage;
use crate::cli::ExplainCommands;
use crate::error::{Error, Result};
use crate::explanations;
use crate::llm::{AnthropicClient, CompletionProvider};

const EXPLAIN_MAX_TOKENS: u32 = 2048;

/// Execute explain commands.
pub fn execute(command: &ExplainCommands, db: Option<&PathBuf>, json: bool) -> Result<()> {
    match command {
        ExplainCommands::Topic {
            skill_id,
            topic,
            refresh,
        } => self::topic(*skill_id, topic, *refresh, db, json),
        ExplainCommands::List { skill_id } => list(*skill_id, db, json),
    }
}

fn topic(skill_id: i64, topic: &str, refresh: bool, db: Option<&PathBuf>, json: bool) -> Result<()> {
    let storage = open_storage(db)?;
    let skill = storage
        .get_skill(skill_id)?
        .ok_or(Error::SkillNotFound { id: skill_id })?;

    let store = explanations::default_store()
        .ok_or_else(|| Error::Config("could not determine a home directory".to_string()))?;

    let (content, from_cache) = if !refresh && store.exists(skill_id, &skill.name, topic) {
        (store.get(skill_id, &skill.name, topic)?, true)
    } else {
        let client = AnthropicClient::from_env()?;
        let prompt = format!(
            "Explain '{topic}' in the context of learning {}. \
             Assume a motivated beginner: define terms, give one concrete \
             example, and end with a two-line summary.",
            skill.name
        );

        let rt = tokio::runtime::Runtime::new()
            .map_err(|e| Error::Other(format!("failed to create async runtime: {e}")))?;
        let response = rt.block_on(client.generate(&prompt, None, EXPLAIN_MAX_TOKENS))?;

        store.save(skill_id, &skill.name, topic, &response)?;
        (response, false)
    };

    if json {
        println!(
            "{}",
            serde_json::json!({
                "skill_id": skill_id,
                "topic": topic,
                "from_cache": from_cache,
                "content": content,
            })
        );
    } else {
        if from_cache {
            println!("(saved explanation; use --refresh to regenerate)\n");
        }
        println!("{content}");
    }

    Ok(())
}

fn list(skill_id: i64, db: Option<&PathBuf>, json: bool) -> Result<()> {
    let storage = open_storage(db)?;
    let skill = storage
        .get_skill(skill_id)?
        .ok_or(Error::SkillNotFound { id: skill_id })?;

    let store = explanations::default_store()
        .ok_or_else(|| Error::Config("could not determine a home directory".to_string()))?;
    let topics = store.list(skill_id, &skill.name)?;

    if json {
        println!("{}", serde_json::to_string(&topics)?);
        return Ok(());
    }

    if topics.is_empty() {
        println!("No saved explanations for {}.", skill.name);
        return Ok(());
    }

    println!("Saved explanations for {}:", skill.name);
    for topic in &topics {
        println!("  • {topic}");
    }

    Ok(())
}
