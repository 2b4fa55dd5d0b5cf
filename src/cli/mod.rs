//! CLI definitions using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

/// Mindkeep CLI - a memory-augmented learning assistant
#[derive(Parser, Debug)]
#[command(name = "mindkeep", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Database path (default: ~/.mindkeep/data/mindkeep.db)
    #[arg(long, global = true, env = "MINDKEEP_DB")]
    pub db: Option<PathBuf>,

    /// Actor name for the audit trail
    #[arg(long, global = true, env = "MINDKEEP_ACTOR")]
    pub actor: Option<String>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize the Mindkeep database
    Init {
        /// Overwrite an existing database
        #[arg(long)]
        force: bool,
    },

    /// Print version information
    Version,

    /// Interactive memory-augmented chat
    Chat,

    /// Remember a fact
    Remember {
        /// The fact to remember
        fact: String,

        /// Entity the fact is about (extracted from the text if omitted)
        #[arg(long)]
        about: Option<String>,
    },

    /// Search your memories (semantic, with keyword fallback)
    Recall {
        /// What to search for; omit to list recent facts
        query: Option<String>,

        /// List everything known about one entity instead
        #[arg(long)]
        about: Option<String>,

        /// Maximum results
        #[arg(long, default_value_t = 5)]
        limit: u32,
    },

    /// Skill tracking
    Skill {
        #[command(subcommand)]
        command: SkillCommands,
    },

    /// Study session logging
    Session {
        #[command(subcommand)]
        command: SessionCommands,
    },

    /// Spaced-repetition learning items
    Item {
        #[command(subcommand)]
        command: ItemCommands,
    },

    /// Challenge lab
    Challenge {
        #[command(subcommand)]
        command: ChallengeCommands,
    },

    /// Obstacles hit while working challenges
    Obstacle {
        #[command(subcommand)]
        command: ObstacleCommands,
    },

    /// AI-generated challenge roadmaps
    Roadmap {
        #[command(subcommand)]
        command: RoadmapCommands,
    },

    /// Daily work streaks
    Streak {
        #[command(subcommand)]
        command: StreakCommands,
    },

    /// Skill milestones
    Milestone {
        #[command(subcommand)]
        command: MilestoneCommands,
    },

    /// Goals
    Goal {
        #[command(subcommand)]
        command: GoalCommands,
    },

    /// Writing style preference
    Style {
        #[command(subcommand)]
        command: StyleCommands,
    },

    /// Learning statistics
    Stats {
        /// Trailing window in days
        #[arg(long, default_value_t = 30)]
        days: i64,
    },

    /// Saved conversations
    Conversations {
        #[command(subcommand)]
        command: ConversationCommands,
    },

    /// Indexed files
    Files {
        #[command(subcommand)]
        command: FilesCommands,
    },

    /// Get and save AI explanations per skill topic
    Explain {
        #[command(subcommand)]
        command: ExplainCommands,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate for
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum SkillCommands {
    /// Start tracking a skill
    Add {
        /// Skill name (unique)
        name: String,

        /// Category (e.g. "programming")
        #[arg(long)]
        category: Option<String>,

        /// beginner, intermediate, or advanced
        #[arg(long, default_value = "beginner")]
        difficulty: String,

        /// What you're aiming for
        #[arg(long)]
        target: Option<String>,

        #[arg(long)]
        notes: Option<String>,
    },

    /// List tracked skills
    List {
        /// Show archived skills instead of active ones
        #[arg(long)]
        archived: bool,
    },

    /// Show one skill with recent sessions and stats
    Show {
        /// Skill ID
        id: i64,
    },

    /// Archive a skill
    Archive {
        /// Skill ID
        id: i64,
    },
}

#[derive(Subcommand, Debug)]
pub enum SessionCommands {
    /// Log a study session
    Log(SessionLogArgs),
}

#[derive(Args, Debug)]
pub struct SessionLogArgs {
    /// Skill ID
    pub skill_id: i64,

    /// Minutes studied
    pub minutes: i64,

    /// Topics covered
    pub topics: String,

    /// Self-rated understanding 1-5
    #[arg(long, default_value_t = 3)]
    pub understanding: i64,

    #[arg(long)]
    pub notes: Option<String>,

    /// Key takeaways
    #[arg(long)]
    pub takeaways: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum ItemCommands {
    /// Add a learning item
    Add {
        /// Skill ID
        skill_id: i64,

        /// The answer / content to learn
        answer: String,

        /// Question (required for Q&A items)
        #[arg(long)]
        question: Option<String>,

        /// concept, fact, qa, or example
        #[arg(long = "type", default_value = "concept")]
        item_type: String,

        /// Difficulty 1-5
        #[arg(long, default_value_t = 3)]
        difficulty: i64,

        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,

        /// Where this came from
        #[arg(long)]
        source: Option<String>,
    },

    /// List items due for review
    Due {
        /// Restrict to one skill
        #[arg(long)]
        skill: Option<i64>,

        #[arg(long, default_value_t = 10)]
        limit: u32,
    },

    /// Record a review of an item
    Review {
        /// Item ID
        id: i64,

        /// The answer was recalled correctly
        #[arg(long, conflicts_with = "incorrect")]
        correct: bool,

        /// The answer was missed
        #[arg(long)]
        incorrect: bool,

        /// Confidence before the review (1-5)
        #[arg(long, default_value_t = 3)]
        before: i64,

        /// Confidence after the review (1-5)
        #[arg(long, default_value_t = 3)]
        after: i64,

        /// Seconds taken
        #[arg(long)]
        seconds: Option<i64>,
    },

    /// Search learning items
    Search {
        query: String,

        /// Restrict to one skill
        #[arg(long)]
        skill: Option<i64>,
    },

    /// Show the review history of an item
    History {
        /// Item ID
        id: i64,

        #[arg(long, default_value_t = 20)]
        limit: u32,
    },
}

#[derive(Subcommand, Debug)]
pub enum ChallengeCommands {
    /// Add a custom challenge to a skill
    Add {
        /// Skill ID
        skill_id: i64,

        title: String,

        #[arg(long, default_value = "")]
        description: String,

        /// beginner, intermediate, or advanced
        #[arg(long, default_value = "intermediate")]
        difficulty: String,

        /// Estimated hours
        #[arg(long, default_value_t = 5)]
        hours: i64,

        /// Comma-separated skills this teaches
        #[arg(long)]
        teaches: Option<String>,

        /// Comma-separated prerequisite challenge titles
        #[arg(long)]
        prerequisites: Option<String>,

        /// Comma-separated titles this unlocks
        #[arg(long)]
        unlocks: Option<String>,
    },

    /// List challenges
    List {
        /// Restrict to one skill
        #[arg(long)]
        skill: Option<i64>,

        /// not_started, in_progress, completed, or abandoned
        #[arg(long)]
        status: Option<String>,
    },

    /// Show one challenge with its obstacles
    Show {
        /// Challenge ID
        id: i64,
    },

    /// Start a challenge
    Start {
        /// Challenge ID
        id: i64,
    },

    /// Update progress on a challenge
    Progress {
        /// Challenge ID
        id: i64,

        /// Progress percent (0-100)
        percent: i64,

        /// Minutes worked this session
        #[arg(long, default_value_t = 0)]
        minutes: i64,

        #[arg(long)]
        notes: Option<String>,
    },

    /// Complete a challenge
    Complete {
        /// Challenge ID
        id: i64,

        /// GitHub link for the finished project
        #[arg(long)]
        github: Option<String>,

        /// Final notes / learnings
        #[arg(long)]
        notes: Option<String>,
    },

    /// Abandon a challenge
    Abandon {
        /// Challenge ID
        id: i64,
    },

    /// Recommend the next challenge for a skill
    Recommend {
        /// Skill ID
        skill_id: i64,
    },

    /// Show challenge-based skill progression
    Progression {
        /// Skill ID
        skill_id: i64,
    },

    /// Browse the built-in challenge library
    Browse {
        /// Filter by category (programming, data, systems)
        #[arg(long)]
        category: Option<String>,

        /// Keyword search
        #[arg(long)]
        search: Option<String>,
    },

    /// Copy a built-in library challenge onto a skill
    Adopt {
        /// Skill ID
        skill_id: i64,

        /// Library challenge title
        title: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum ObstacleCommands {
    /// Log a blocking obstacle
    Log {
        /// Challenge ID
        challenge_id: i64,

        /// What's blocking you
        description: String,
    },

    /// Mark an obstacle solved
    Solve {
        /// Obstacle ID
        id: i64,

        /// How you solved it
        solution: String,

        /// What you learned
        #[arg(long)]
        insight: Option<String>,

        /// Minutes it took to solve
        #[arg(long)]
        minutes: Option<i64>,

        /// Resources that helped
        #[arg(long)]
        resources: Option<String>,

        /// Record as a workaround rather than a full solve
        #[arg(long)]
        workaround: bool,
    },

    /// List obstacles for a challenge
    List {
        /// Challenge ID
        challenge_id: i64,
    },

    /// Search past obstacles and solutions
    Search {
        keyword: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum RoadmapCommands {
    /// Generate a challenge roadmap for a skill with the completion service
    Generate {
        /// Skill ID
        skill_id: i64,

        /// Your current level in this skill
        #[arg(long, default_value = "beginner")]
        level: String,

        /// What you want to achieve
        #[arg(long, default_value = "general proficiency")]
        goals: String,

        /// Rough timeline
        #[arg(long, default_value = "3 months")]
        timeline: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum StreakCommands {
    /// Log today's work
    Log {
        /// Minutes worked
        minutes: i64,

        /// Challenge worked on
        #[arg(long)]
        challenge: Option<i64>,

        /// Obstacles encountered today
        #[arg(long, default_value_t = 0)]
        encountered: i64,

        /// Obstacles solved today
        #[arg(long, default_value_t = 0)]
        solved: i64,

        #[arg(long)]
        notes: Option<String>,
    },

    /// Show streak statistics
    Stats,
}

#[derive(Subcommand, Debug)]
pub enum MilestoneCommands {
    /// Add a milestone to a skill
    Add {
        /// Skill ID
        skill_id: i64,

        /// The milestone
        text: String,

        /// Target date
        #[arg(long)]
        target: Option<String>,

        #[arg(long)]
        notes: Option<String>,
    },

    /// List milestones for a skill
    List {
        /// Skill ID
        skill_id: i64,

        /// Include completed milestones
        #[arg(long)]
        all: bool,
    },

    /// Complete a milestone
    Complete {
        /// Milestone ID
        id: i64,
    },
}

#[derive(Subcommand, Debug)]
pub enum GoalCommands {
    /// Add a goal
    Add {
        /// The goal
        text: String,

        /// Deadline
        #[arg(long)]
        deadline: Option<String>,
    },

    /// List active goals
    List,

    /// Complete a goal
    Complete {
        /// Goal ID
        id: i64,
    },
}

#[derive(Subcommand, Debug)]
pub enum StyleCommands {
    /// Set your writing style preference
    Set {
        /// Style description ("casual, concise, active voice")
        style: String,
    },

    /// Show the current writing style
    Show,

    /// List all saved preferences
    List,
}

#[derive(Subcommand, Debug)]
pub enum ConversationCommands {
    /// List conversations saved on a date (default today)
    List {
        /// Date as YYYY-MM-DD
        #[arg(long)]
        date: Option<String>,
    },

    /// Search saved conversations
    Search {
        query: String,

        #[arg(long, default_value_t = 5)]
        limit: u32,
    },
}

#[derive(Subcommand, Debug)]
pub enum FilesCommands {
    /// Summarize and index a file for search
    Index {
        /// Path to the file
        path: PathBuf,
    },

    /// Search indexed files
    Search {
        query: String,

        #[arg(long, default_value_t = 3)]
        limit: u32,
    },
}

#[derive(Subcommand, Debug)]
pub enum ExplainCommands {
    /// Get an explanation for a topic (saved for later re-reading)
    Topic {
        /// Skill ID
        skill_id: i64,

        /// Topic to explain
        topic: String,

        /// Regenerate even if an explanation is already saved
        #[arg(long)]
        refresh: bool,
    },

    /// List saved explanations for a skill
    List {
        /// Skill ID
        skill_id: i64,
    },
}
