//! Study session command implementations.

use std::path::PathBuf;

use serde::Serialize;

use super::{format_ts, open_storage, resolve_actor};
use crate::cli::{SessionCommands, SessionLogArgs};
use crate::error::Result;

#[derive(Serialize)]
struct SessionLogOutput {
    session_id: i64,
    skill_id: i64,
    minutes: i64,
    next_review: Option<i64>,
}

/// Execute session commands.
pub fn execute(
    command: &SessionCommands,
    db: Option<&PathBuf>,
    actor: Option<&str>,
    json: bool,
) -> Result<()> {
    match command {
        SessionCommands::Log(args) => log(args, db, actor, json),
    }
}

fn log(args: &SessionLogArgs, db: Option<&PathBuf>, actor: Option<&str>, json: bool) -> Result<()> {
    let mut storage = open_storage(db)?;
    let actor = resolve_actor(actor);

    let session_id = storage.log_session(
        args.skill_id,
        args.minutes,
        &args.topics,
        args.understanding,
        args.notes.as_deref(),
        args.takeaways.as_deref(),
        &actor,
    )?;

    let next_review = storage
        .get_skill(args.skill_id)?
        .and_then(|s| s.next_review);

    if json {
        let output = SessionLogOutput {
            session_id,
            skill_id: args.skill_id,
            minutes: args.minutes,
            next_review,
        };
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!("Logged {} min on skill {}", args.minutes, args.skill_id);
        if let Some(next) = next_review {
            println!("Next review: {}", format_ts(next));
        }
    }

    Ok(())
}
