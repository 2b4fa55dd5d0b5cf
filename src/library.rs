//! Built-in challenge library.
//!
//! A small curated set of starter projects per category, available before
//! the user has generated any AI roadmap. `challenge browse` lists these
//! and `challenge adopt` copies one onto a skill.

use crate::model::ChallengeDifficulty;

/// A challenge template from the built-in library.
#[derive(Debug, Clone)]
pub struct ChallengeTemplate {
    pub category: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub difficulty: ChallengeDifficulty,
    pub estimated_hours: i64,
    pub skills_taught: &'static [&'static str],
    pub prerequisites: &'static [&'static str],
    pub unlocks: &'static [&'static str],
}

/// All built-in templates, grouped loosely by skill category.
pub const TEMPLATES: &[ChallengeTemplate] = &[
    ChallengeTemplate {
        category: "programming",
        title: "CLI Todo App",
        description: "Build a command-line todo application: add tasks, list them, \
                      mark them done, delete them, and persist everything to a file.",
        difficulty: ChallengeDifficulty::Beginner,
        estimated_hours: 3,
        skills_taught: &["functions", "collections", "file IO", "user input"],
        prerequisites: &[],
        unlocks: &["Web Scraper with Error Handling"],
    },
    ChallengeTemplate {
        category: "programming",
        title: "Web Scraper with Error Handling",
        description: "Fetch a page of headlines, parse out the titles, handle network \
                      and parse failures gracefully, and write the results to CSV.",
        difficulty: ChallengeDifficulty::Beginner,
        estimated_hours: 4,
        skills_taught: &["http requests", "parsing", "error handling", "csv"],
        prerequisites: &["CLI Todo App"],
        unlocks: &["Simple REST API"],
    },
    ChallengeTemplate {
        category: "programming",
        title: "Simple REST API",
        description: "Expose CRUD endpoints over a small data model with JSON \
                      responses, proper status codes, and basic authentication.",
        difficulty: ChallengeDifficulty::Intermediate,
        estimated_hours: 5,
        skills_taught: &["rest", "http", "json", "authentication"],
        prerequisites: &["Web Scraper with Error Handling"],
        unlocks: &[],
    },
    ChallengeTemplate {
        category: "data",
        title: "Public Dataset Analysis",
        description: "Pick a public dataset, clean and explore it, chart the three \
                      most interesting patterns, and write a one-page summary.",
        difficulty: ChallengeDifficulty::Beginner,
        estimated_hours: 5,
        skills_taught: &["data cleaning", "exploration", "visualization"],
        prerequisites: &[],
        unlocks: &["Automated Report Generator"],
    },
    ChallengeTemplate {
        category: "data",
        title: "Automated Report Generator",
        description: "Load data from CSV on a schedule, run the analysis, render \
                      charts, and emit an HTML report without manual steps.",
        difficulty: ChallengeDifficulty::Intermediate,
        estimated_hours: 6,
        skills_taught: &["automation", "reporting", "pipelines"],
        prerequisites: &["Public Dataset Analysis"],
        unlocks: &[],
    },
    ChallengeTemplate {
        category: "systems",
        title: "Key-Value Store",
        description: "Build an on-disk key-value store with get/set/delete, an \
                      append-only log, and crash recovery on startup.",
        difficulty: ChallengeDifficulty::Intermediate,
        estimated_hours: 8,
        skills_taught: &["file formats", "durability", "indexes"],
        prerequisites: &[],
        unlocks: &["Concurrent Job Queue"],
    },
    ChallengeTemplate {
        category: "systems",
        title: "Concurrent Job Queue",
        description: "A worker pool that pulls jobs from a queue, retries failures \
                      with backoff, and shuts down cleanly on interrupt.",
        difficulty: ChallengeDifficulty::Advanced,
        estimated_hours: 10,
        skills_taught: &["concurrency", "retries", "graceful shutdown"],
        prerequisites: &["Key-Value Store"],
        unlocks: &[],
    },
];

/// Templates for one category; empty slice category returns everything.
#[must_use]
pub fn for_category(category: &str) -> Vec<&'static ChallengeTemplate> {
    let lower = category.to_lowercase();
    TEMPLATES
        .iter()
        .filter(|t| t.category == lower)
        .collect()
}

/// Case-insensitive keyword search over titles, descriptions, and skills.
#[must_use]
pub fn search(keyword: &str) -> Vec<&'static ChallengeTemplate> {
    let needle = keyword.to_lowercase();
    TEMPLATES
        .iter()
        .filter(|t| {
            t.title.to_lowercase().contains(&needle)
                || t.description.to_lowercase().contains(&needle)
                || t.skills_taught
                    .iter()
                    .any(|s| s.to_lowercase().contains(&needle))
        })
        .collect()
}

/// Map a free-text skill name onto a library category, if one fits.
#[must_use]
pub fn category_for_skill(skill_name: &str) -> Option<&'static str> {
    let lower = skill_name.to_lowercase();
    if lower.contains("data") || lower.contains("analysis") {
        Some("data")
    } else if lower.contains("system") || lower.contains("backend") || lower.contains("infra") {
        Some("systems")
    } else if lower.contains("python")
        || lower.contains("rust")
        || lower.contains("program")
        || lower.contains("coding")
    {
        Some("programming")
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_category() {
        let programming = for_category("programming");
        assert_eq!(programming.len(), 3);
        assert!(for_category("underwater basket weaving").is_empty());
    }

    #[test]
    fn test_search_matches_skills() {
        let hits = search("concurrency");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Concurrent Job Queue");
    }

    #[test]
    fn test_category_for_skill() {
        assert_eq!(category_for_skill("Python"), Some("programming"));
        assert_eq!(category_for_skill("Data Analysis"), Some("data"));
        assert_eq!(category_for_skill("watercolor"), None);
    }

    #[test]
    fn test_prerequisites_reference_real_titles() {
        for template in TEMPLATES {
            for prereq in template.prerequisites {
                assert!(
                    TEMPLATES.iter().any(|t| t.title == *prereq),
                    "{} references unknown prerequisite {prereq}",
                    template.title
                );
            }
        }
    }
}
