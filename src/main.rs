//! Mindkeep CLI entry point.

use clap::Parser;
use mindkeep::cli::commands;
use mindkeep::cli::{Cli, Commands};
use mindkeep::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet);

    // JSON output when asked for, or when stdout is piped.
    let json = cli.json || !std::io::IsTerminal::is_terminal(&std::io::stdout());

    match run(&cli, json) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if json {
                eprintln!("{}", e.to_structured_json());
            } else if !cli.quiet {
                if let Some(hint) = e.hint() {
                    eprintln!("Error: {e}\n  Hint: {hint}");
                } else {
                    eprintln!("Error: {e}");
                }
            }
            ExitCode::from(e.exit_code())
        }
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    if quiet {
        return;
    }

    // Honor RUST_LOG if set, otherwise use the verbosity flag.
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug,rusqlite=info"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn run(cli: &Cli, json: bool) -> Result<(), Error> {
    let db = cli.db.as_ref();
    let actor = cli.actor.as_deref();

    match &cli.command {
        Commands::Init { force } => commands::init::execute(*force, db, json),
        Commands::Version => commands::version::execute(json),

        Commands::Chat => commands::chat::execute(db, actor),

        Commands::Remember { fact, about } => {
            commands::memory::execute_remember(fact, about.as_deref(), db, actor, json)
        }
        Commands::Recall { query, about, limit } => {
            commands::memory::execute_recall(query.as_deref(), about.as_deref(), *limit, db, json)
        }

        Commands::Skill { command } => commands::skill::execute(command, db, actor, json),
        Commands::Session { command } => commands::session::execute(command, db, actor, json),
        Commands::Item { command } => commands::item::execute(command, db, actor, json),
        Commands::Challenge { command } => commands::challenge::execute(command, db, actor, json),
        Commands::Obstacle { command } => commands::obstacle::execute(command, db, actor, json),
        Commands::Roadmap { command } => commands::roadmap::execute(command, db, actor, json),
        Commands::Streak { command } => commands::streak::execute(command, db, actor, json),
        Commands::Milestone { command } => commands::milestone::execute(command, db, actor, json),
        Commands::Goal { command } => commands::memory::execute_goal(command, db, actor, json),
        Commands::Style { command } => commands::memory::execute_style(command, db, actor, json),
        Commands::Stats { days } => commands::stats::execute(*days, db, json),
        Commands::Conversations { command } => {
            commands::conversations::execute(command, db, json)
        }
        Commands::Files { command } => commands::files::execute(command, db, actor, json),
        Commands::Explain { command } => commands::explain::execute(command, db, json),
        Commands::Completions { shell } => commands::completions::execute(*shell),
    }
}
