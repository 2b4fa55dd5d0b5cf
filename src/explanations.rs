//! Saved explanations on disk.
//!
//! Explanations are markdown files under
//! `~/.mindkeep/explanations/<skill_id>_<skill-slug>/<topic-slug>.md`, one
//! folder per skill. Files rather than rows so they're greppable and
//! editable outside the tool.

use std::fs;
use std::path::PathBuf;

use crate::error::{Error, Result};

/// Manages explanation files under a base directory.
pub struct ExplanationStore {
    base: PathBuf,
}

/// Turn free text into a filesystem-safe slug.
fn slugify(text: &str) -> String {
    let slug: String = text
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect();

    let slug = slug
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-");

    slug.chars().take(60).collect()
}

impl ExplanationStore {
    #[must_use]
    pub fn new(base: PathBuf) -> Self {
        Self { base }
    }

    fn skill_dir(&self, skill_id: i64, skill_name: &str) -> PathBuf {
        self.base.join(format!("{skill_id}_{}", slugify(skill_name)))
    }

    fn topic_path(&self, skill_id: i64, skill_name: &str, topic: &str) -> PathBuf {
        self.skill_dir(skill_id, skill_name)
            .join(format!("{}.md", slugify(topic)))
    }

    /// Save an explanation, overwriting any previous one for the topic.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub fn save(
        &self,
        skill_id: i64,
        skill_name: &str,
        topic: &str,
        content: &str,
    ) -> Result<PathBuf> {
        let dir = self.skill_dir(skill_id, skill_name);
        fs::create_dir_all(&dir)?;

        let path = self.topic_path(skill_id, skill_name, topic);
        let body = format!("# {topic}\n\n{content}\n");
        fs::write(&path, body)?;
        Ok(path)
    }

    /// Load a saved explanation.
    ///
    /// # Errors
    ///
    /// Returns an error when no explanation exists for the topic.
    pub fn get(&self, skill_id: i64, skill_name: &str, topic: &str) -> Result<String> {
        let path = self.topic_path(skill_id, skill_name, topic);
        if !path.exists() {
            return Err(Error::Other(format!(
                "No saved explanation for '{topic}'"
            )));
        }
        Ok(fs::read_to_string(path)?)
    }

    /// Whether an explanation exists for the topic.
    #[must_use]
    pub fn exists(&self, skill_id: i64, skill_name: &str, topic: &str) -> bool {
        self.topic_path(skill_id, skill_name, topic).exists()
    }

    /// List saved topic slugs for a skill.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be read.
    pub fn list(&self, skill_id: i64, skill_name: &str) -> Result<Vec<String>> {
        let dir = self.skill_dir(skill_id, skill_name);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut topics: Vec<String> = fs::read_dir(dir)?
            .filter_map(std::result::Result::ok)
            .filter_map(|entry| {
                let path = entry.path();
                if path.extension().is_some_and(|e| e == "md") {
                    path.file_stem()
                        .map(|s| s.to_string_lossy().to_string())
                } else {
                    None
                }
            })
            .collect();
        topics.sort();
        Ok(topics)
    }
}

/// Store rooted at the configured explanations directory.
#[must_use]
pub fn default_store() -> Option<ExplanationStore> {
    crate::config::explanations_dir().map(ExplanationStore::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Rust Ownership & Borrowing!"), "rust-ownership-borrowing");
        assert_eq!(slugify("  spaces  "), "spaces");
        assert_eq!(slugify("///"), "");
    }

    #[test]
    fn test_save_get_list() {
        let dir = tempdir().unwrap();
        let store = ExplanationStore::new(dir.path().to_path_buf());

        assert!(!store.exists(1, "Rust", "lifetimes"));
        let path = store.save(1, "Rust", "lifetimes", "they are regions").unwrap();
        assert!(path.ends_with("1_rust/lifetimes.md"));

        let content = store.get(1, "Rust", "lifetimes").unwrap();
        assert!(content.contains("# lifetimes"));
        assert!(content.contains("they are regions"));

        store.save(1, "Rust", "Traits", "interfaces").unwrap();
        let topics = store.list(1, "Rust").unwrap();
        assert_eq!(topics, vec!["lifetimes".to_string(), "traits".to_string()]);

        assert!(store.list(2, "Go").unwrap().is_empty());
        assert!(store.get(1, "Rust", "missing").is_err());
    }
}
