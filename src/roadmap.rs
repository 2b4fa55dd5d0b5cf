//! Roadmap text parsing and prompt construction.
//!
//! The completion service is asked for a challenge roadmap in a fixed
//! `CHALLENGE:` / `DIFFICULTY:` / `HOURS:` / ... field format, but model
//! output is prose, not protocol: markers arrive wrapped in markdown
//! emphasis, fields go missing, values get garbled. The parser here
//! degrades per block; a malformed block is skipped (or patched with
//! defaults) without failing the batch. Zero parsed drafts is a count the
//! caller reports, never an error.

use crate::model::ChallengeDifficulty;
use crate::validate::normalize_challenge_difficulty;

/// Default estimated hours when HOURS is absent or non-numeric.
const DEFAULT_HOURS: i64 = 5;

/// Minimum title length for a block to count as a challenge.
const MIN_TITLE_LEN: usize = 3;

/// Field markers recognized inside a challenge block.
const FIELD_MARKERS: [&str; 5] = [
    "DIFFICULTY:",
    "HOURS:",
    "DESCRIPTION:",
    "SKILLS:",
    "PREREQUISITES:",
];

/// A parsed challenge ready for insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengeDraft {
    pub title: String,
    pub description: String,
    pub difficulty: ChallengeDifficulty,
    pub estimated_hours: i64,
    pub skills_taught: Vec<String>,
    pub prerequisites: Vec<String>,
}

/// Strip markdown emphasis noise from a marker line or value.
fn strip_emphasis(s: &str) -> String {
    s.trim_start_matches('#')
        .replace(['*', '_', '`'], "")
        .trim()
        .to_string()
}

/// Recognize a field marker at the start of a (cleaned) line.
///
/// Returns the marker and the remainder of the line after it.
fn split_marker(line: &str) -> Option<(&'static str, String)> {
    for marker in FIELD_MARKERS {
        if let Some(rest) = line.strip_prefix(marker) {
            return Some((marker, rest.trim().to_string()));
        }
    }
    None
}

/// Split a comma-separated field into trimmed, non-empty entries.
fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Prerequisites variant: a value carrying the standalone word "none"
/// (any case) reads as an empty list.
///
/// The word has to stand alone so entries that merely start with it
/// ("nonblocking IO") survive.
fn split_prerequisites(value: &str) -> Vec<String> {
    let says_none = value.split_whitespace().any(|word| {
        word.trim_matches(|c: char| !c.is_alphanumeric())
            .eq_ignore_ascii_case("none")
    });
    if says_none {
        return Vec::new();
    }
    split_list(value)
}

/// Pull the first integer out of a value like "6", "about 6 hours", "6-8".
fn parse_hours(value: &str) -> i64 {
    let digits: String = value
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().unwrap_or(DEFAULT_HOURS)
}

/// Parse one block (everything after a `CHALLENGE:` marker up to the next).
fn parse_block(block: &str) -> Option<ChallengeDraft> {
    let mut lines = block.lines();

    let title = strip_emphasis(lines.next().unwrap_or(""));
    if title.len() < MIN_TITLE_LEN {
        tracing::warn!(title = %title, "skipping roadmap block with unusable title");
        return None;
    }

    let mut difficulty_raw = String::new();
    let mut hours_raw = String::new();
    let mut description = String::new();
    let mut skills_raw = String::new();
    let mut prereqs_raw = String::new();

    // Field-terminated scan: a value runs from its marker to the next
    // recognized marker or the end of the block.
    let mut current: Option<&'static str> = None;
    for raw_line in lines {
        let line = strip_emphasis(raw_line);

        if let Some((marker, rest)) = split_marker(&line) {
            current = Some(marker);
            let target = match marker {
                "DIFFICULTY:" => &mut difficulty_raw,
                "HOURS:" => &mut hours_raw,
                "DESCRIPTION:" => &mut description,
                "SKILLS:" => &mut skills_raw,
                _ => &mut prereqs_raw,
            };
            *target = rest;
            continue;
        }

        // Continuation line of the current field.
        if let Some(marker) = current {
            if line.is_empty() {
                continue;
            }
            let target = match marker {
                "DIFFICULTY:" => &mut difficulty_raw,
                "HOURS:" => &mut hours_raw,
                "DESCRIPTION:" => &mut description,
                "SKILLS:" => &mut skills_raw,
                _ => &mut prereqs_raw,
            };
            if !target.is_empty() {
                target.push(' ');
            }
            target.push_str(&line);
        }
    }

    let description = if description.trim().is_empty() {
        title.clone()
    } else {
        description.trim().to_string()
    };

    Some(ChallengeDraft {
        description,
        difficulty: normalize_challenge_difficulty(&difficulty_raw),
        estimated_hours: parse_hours(&hours_raw),
        skills_taught: split_list(&skills_raw),
        prerequisites: split_prerequisites(&prereqs_raw),
        title,
    })
}

/// Parse free-form roadmap text into challenge drafts.
///
/// Splits on `CHALLENGE:` markers (tolerating markdown emphasis around
/// them), discarding any preamble before the first. Malformed blocks are
/// logged and skipped; the call itself never fails.
#[must_use]
pub fn parse_challenges(raw_text: &str) -> Vec<ChallengeDraft> {
    let mut blocks: Vec<String> = Vec::new();
    let mut current: Option<String> = None;

    for raw_line in raw_text.lines() {
        let cleaned = strip_emphasis(raw_line);
        if let Some(rest) = cleaned.strip_prefix("CHALLENGE:") {
            if let Some(done) = current.take() {
                blocks.push(done);
            }
            current = Some(rest.trim().to_string());
        } else if let Some(block) = current.as_mut() {
            block.push('\n');
            block.push_str(raw_line);
        }
        // Text before the first marker falls through and is discarded.
    }
    if let Some(done) = current {
        blocks.push(done);
    }

    blocks.iter().filter_map(|b| parse_block(b)).collect()
}

/// Build the roadmap-generation prompt for the completion service.
#[must_use]
pub fn build_roadmap_prompt(
    skill_name: &str,
    current_level: &str,
    goals: &str,
    timeline: &str,
) -> String {
    format!(
        "Create a progressive project roadmap for learning {skill_name}.\n\
         Current level: {current_level}\n\
         Goals: {goals}\n\
         Timeline: {timeline}\n\n\
         Propose 5-8 hands-on challenges ordered from easiest to hardest.\n\
         Format each challenge EXACTLY like this:\n\n\
         CHALLENGE: <short project title>\n\
         DIFFICULTY: <beginner|intermediate|advanced>\n\
         HOURS: <estimated hours as a number>\n\
         DESCRIPTION: <what to build and why it teaches something>\n\
         SKILLS: <comma-separated skills this teaches>\n\
         PREREQUISITES: <comma-separated titles of earlier challenges, or none>\n\n\
         Do not add anything after the last challenge."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_formed_blocks() {
        let text = "Here is your roadmap!\n\n\
            CHALLENGE: CLI Todo App\n\
            DIFFICULTY: beginner\n\
            HOURS: 3\n\
            DESCRIPTION: Build a todo app with add, list, done.\n\
            SKILLS: argument parsing, file IO\n\
            PREREQUISITES: none\n\n\
            CHALLENGE: Web Scraper\n\
            DIFFICULTY: intermediate\n\
            HOURS: 6\n\
            DESCRIPTION: Scrape headlines and save them as CSV.\n\
            SKILLS: http, parsing\n\
            PREREQUISITES: CLI Todo App\n";

        let drafts = parse_challenges(text);
        assert_eq!(drafts.len(), 2);

        assert_eq!(drafts[0].title, "CLI Todo App");
        assert_eq!(drafts[0].difficulty, ChallengeDifficulty::Beginner);
        assert_eq!(drafts[0].estimated_hours, 3);
        assert_eq!(
            drafts[0].skills_taught,
            vec!["argument parsing".to_string(), "file IO".to_string()]
        );
        assert!(drafts[0].prerequisites.is_empty());

        assert_eq!(drafts[1].prerequisites, vec!["CLI Todo App".to_string()]);
    }

    #[test]
    fn test_malformed_block_degrades_not_fails() {
        // Two good blocks plus one with a garbled difficulty and no
        // description. All three must come back.
        let text = "\
            CHALLENGE: First Project of Many\n\
            DIFFICULTY: beginner\n\
            HOURS: 2\n\
            DESCRIPTION: Something real.\n\
            SKILLS: a, b\n\
            PREREQUISITES: none\n\
            CHALLENGE: Mystery Build\n\
            DIFFICULTY: SuperHard\n\
            SKILLS: grit\n\
            CHALLENGE: Third Project\n\
            DIFFICULTY: advanced\n\
            HOURS: 12\n\
            DESCRIPTION: The big one.\n\
            SKILLS: x\n\
            PREREQUISITES: Mystery Build\n";

        let drafts = parse_challenges(text);
        assert_eq!(drafts.len(), 3);

        let odd = &drafts[1];
        assert_eq!(odd.title, "Mystery Build");
        assert_eq!(odd.difficulty, ChallengeDifficulty::Intermediate);
        assert_eq!(odd.estimated_hours, 5);
        assert_eq!(odd.description, "Mystery Build");
    }

    #[test]
    fn test_markdown_noise_tolerated() {
        let text = "\
            ### **CHALLENGE: Emphasized Title**\n\
            **DIFFICULTY:** *advanced*\n\
            **HOURS:** about 8 hours\n\
            **DESCRIPTION:** Markdown everywhere.\n\
            **SKILLS:** `parsing`, resilience\n\
            **PREREQUISITES:** None at all\n";

        let drafts = parse_challenges(text);
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].title, "Emphasized Title");
        assert_eq!(drafts[0].difficulty, ChallengeDifficulty::Advanced);
        assert_eq!(drafts[0].estimated_hours, 8);
        assert_eq!(
            drafts[0].skills_taught,
            vec!["parsing".to_string(), "resilience".to_string()]
        );
        assert!(drafts[0].prerequisites.is_empty());
    }

    #[test]
    fn test_none_rule_applies_only_to_prerequisites() {
        // SKILLS keeps a literal "none" entry; only PREREQUISITES reads
        // it as "no prerequisites".
        let text = "\
            CHALLENGE: Edge Case Study\n\
            SKILLS: nonblocking IO, none\n\
            PREREQUISITES: none\n";
        let drafts = parse_challenges(text);
        assert_eq!(
            drafts[0].skills_taught,
            vec!["nonblocking IO".to_string(), "none".to_string()]
        );
        assert!(drafts[0].prerequisites.is_empty());
    }

    #[test]
    fn test_none_must_stand_alone_in_prerequisites() {
        // "none" inside a larger word is not the none marker.
        let text = "\
            CHALLENGE: Real Dependency\n\
            PREREQUISITES: Nonexistent-API basics\n\
            CHALLENGE: No Dependency\n\
            PREREQUISITES: None needed.\n";
        let drafts = parse_challenges(text);
        assert_eq!(
            drafts[0].prerequisites,
            vec!["Nonexistent-API basics".to_string()]
        );
        assert!(drafts[1].prerequisites.is_empty());
    }

    #[test]
    fn test_short_title_block_skipped() {
        let text = "\
            CHALLENGE: ab\n\
            DESCRIPTION: too short to keep\n\
            CHALLENGE: Real Project\n\
            DESCRIPTION: fine\n";
        let drafts = parse_challenges(text);
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].title, "Real Project");
    }

    #[test]
    fn test_no_markers_yields_empty() {
        assert!(parse_challenges("The model rambled and gave no roadmap.").is_empty());
        assert!(parse_challenges("").is_empty());
    }

    #[test]
    fn test_multiline_description_accumulates() {
        let text = "\
            CHALLENGE: Long One\n\
            DESCRIPTION: First line\n\
            second line continues\n\
            HOURS: 4\n";
        let drafts = parse_challenges(text);
        assert_eq!(drafts[0].description, "First line second line continues");
        assert_eq!(drafts[0].estimated_hours, 4);
    }

    #[test]
    fn test_prompt_mentions_format_markers() {
        let prompt = build_roadmap_prompt("Rust", "beginner", "ship a CLI", "3 months");
        assert!(prompt.contains("CHALLENGE:"));
        assert!(prompt.contains("PREREQUISITES:"));
        assert!(prompt.contains("Rust"));
    }
}
