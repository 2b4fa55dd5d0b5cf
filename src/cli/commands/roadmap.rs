//! Roadmap command implementations.

use std::path::PathBuf;

use colored::Colorize;
use serde::Serialize;

use super::{open_storage, resolve_actor};
use crate::cli::RoadmapCommands;
use crate::error::{Error, Result};
use crate::llm::{AnthropicClient, CompletionProvider};
use crate::roadmap::{build_roadmap_prompt, parse_challenges};

const ROADMAP_MAX_TOKENS: u32 = 4096;

#[derive(Serialize)]
struct RoadmapOutput {
    skill_id: i64,
    challenges_created: usize,
    challenge_ids: Vec<i64>,
}

/// Execute roadmap commands.
pub fn execute(
    command: &RoadmapCommands,
    db: Option<&PathBuf>,
    actor: Option<&str>,
    json: bool,
) -> Result<()> {
    match command {
        RoadmapCommands::Generate {
            skill_id,
            level,
            goals,
            timeline,
        } => generate(*skill_id, level, goals, timeline, db, actor, json),
    }
}

fn generate(
    skill_id: i64,
    level: &str,
    goals: &str,
    timeline: &str,
    db: Option<&PathBuf>,
    actor: Option<&str>,
    json: bool,
) -> Result<()> {
    let mut storage = open_storage(db)?;
    let actor = resolve_actor(actor);

    let skill = storage
        .get_skill(skill_id)?
        .ok_or(Error::SkillNotFound { id: skill_id })?;

    let client = AnthropicClient::from_env()?;
    let prompt = build_roadmap_prompt(&skill.name, level, goals, timeline);

    if !json {
        println!("Asking {} for a {} roadmap...", client.model(), skill.name);
    }

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| Error::Other(format!("failed to create async runtime: {e}")))?;
    let response = rt.block_on(client.generate(&prompt, None, ROADMAP_MAX_TOKENS))?;

    // Tolerant parse: bad blocks are skipped, never fatal. Zero drafts is
    // reported as a count.
    let drafts = parse_challenges(&response);

    let mut challenge_ids = Vec::with_capacity(drafts.len());
    for draft in &drafts {
        let id = storage.add_challenge(
            skill_id,
            &draft.title,
            &draft.description,
            draft.difficulty,
            draft.estimated_hours,
            &draft.skills_taught,
            &draft.prerequisites,
            &[],
            &actor,
        )?;
        challenge_ids.push(id);
    }

    if !drafts.is_empty() {
        storage.set_roadmap_metadata(skill_id, level, goals, timeline, &actor)?;
    }

    if json {
        let output = RoadmapOutput {
            skill_id,
            challenges_created: challenge_ids.len(),
            challenge_ids,
        };
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    if drafts.is_empty() {
        println!(
            "{} the model's response contained no parseable challenges; try again",
            "warning:".yellow()
        );
        return Ok(());
    }

    println!("Created {} challenge(s):", drafts.len());
    for (draft, id) in drafts.iter().zip(&challenge_ids) {
        println!(
            "  #{id} {} [{}] ~{}h",
            draft.title,
            draft.difficulty.as_str(),
            draft.estimated_hours
        );
    }
    println!();
    println!("See what to start first: mindkeep challenge recommend {skill_id}");

    Ok(())
}
