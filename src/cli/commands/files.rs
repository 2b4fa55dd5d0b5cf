//! Indexed-files command implementations.

use std::path::PathBuf;

use super::{open_storage, resolve_actor};
use crate::embeddings::{self, rank_by_similarity, EmbeddingProvider};
use crate::error::{Error, Result};
use crate::llm::{AnthropicClient, CompletionProvider};
use crate::model::IndexedFile;
use crate::storage::SqliteStorage;

const SUMMARY_MAX_TOKENS: u32 = 1024;

/// Maximum file bytes shipped to the completion service for a summary.
const SUMMARY_CONTENT_LIMIT: usize = 5000;

/// Execute files commands.
pub fn execute(
    command: &crate::cli::FilesCommands,
    db: Option<&PathBuf>,
    actor: Option<&str>,
    json: bool,
) -> Result<()> {
    match command {
        crate::cli::FilesCommands::Index { path } => index(path, db, actor, json),
        crate::cli::FilesCommands::Search { query, limit } => search(query, *limit, db, json),
    }
}

fn index(path: &PathBuf, db: Option<&PathBuf>, actor: Option<&str>, json: bool) -> Result<()> {
    let content = std::fs::read_to_string(path)?;
    let filename = path.display().to_string();

    let mut storage = open_storage(db)?;
    let actor = resolve_actor(actor);

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| Error::Other(format!("failed to create async runtime: {e}")))?;

    // Summarization wants the completion service but indexing still works
    // without it.
    let summary = match AnthropicClient::from_env() {
        Ok(client) => {
            let head: String = content.chars().take(SUMMARY_CONTENT_LIMIT).collect();
            let prompt =
                format!("Summarize this file ({filename}) in 2-3 sentences:\n\n{head}");
            match rt.block_on(client.generate(&prompt, None, SUMMARY_MAX_TOKENS)) {
                Ok(summary) => Some(summary),
                Err(e) => {
                    tracing::warn!("summarization failed, indexing without summary: {e}");
                    None
                }
            }
        }
        Err(e) => {
            tracing::warn!("no completion service ({e}); indexing without summary");
            None
        }
    };

    let id = storage.index_file(&filename, summary.as_deref(), &content, &actor)?;

    // Best-effort semantic index of the summary (or the content head).
    rt.block_on(async {
        let Some(provider) = embeddings::create_embedding_provider().await else {
            tracing::warn!("embedding provider unavailable; file searchable by keyword only");
            return;
        };
        let text = summary.clone().unwrap_or_else(|| {
            content.chars().take(SUMMARY_CONTENT_LIMIT).collect::<String>()
        });
        match provider.generate_embedding(&text).await {
            Ok(vector) => {
                let info = provider.info();
                if let Err(e) =
                    storage.store_embedding("file", id, &vector, &info.name, &info.model)
                {
                    tracing::warn!("failed to store file embedding: {e}");
                }
            }
            Err(e) => tracing::warn!("failed to embed file: {e}"),
        }
    });

    if json {
        println!(
            "{}",
            serde_json::json!({ "file_id": id, "path": filename, "summary": summary })
        );
    } else {
        println!("Indexed {filename} (id {id})");
        if let Some(summary) = summary {
            println!("  {summary}");
        }
    }

    Ok(())
}

fn search(query: &str, limit: u32, db: Option<&PathBuf>, json: bool) -> Result<()> {
    let storage = open_storage(db)?;
    let files = search_semantic(&storage, query, limit)
        .unwrap_or_else(|| storage.search_files_keyword(query, limit).unwrap_or_default());

    if json {
        println!("{}", serde_json::to_string(&files)?);
        return Ok(());
    }

    if files.is_empty() {
        println!("No indexed files matching '{query}'.");
        return Ok(());
    }

    println!("Found files:");
    for file in &files {
        println!();
        println!("  {}", file.path);
        if let Some(summary) = &file.summary {
            println!("  summary: {summary}");
        }
        let preview: String = file.content.chars().take(200).collect();
        println!("  preview: {preview}...");
    }

    Ok(())
}

fn search_semantic(storage: &SqliteStorage, query: &str, limit: u32) -> Option<Vec<IndexedFile>> {
    let rt = tokio::runtime::Runtime::new().ok()?;
    rt.block_on(async {
        let provider = embeddings::create_embedding_provider().await?;
        let query_vector = provider.generate_embedding(query).await.ok()?;
        let candidates = storage.embeddings_for_kind("file").ok()?;
        if candidates.is_empty() {
            return None;
        }

        let ranked = rank_by_similarity(&query_vector, candidates, limit as usize);
        let mut files = Vec::new();
        for (ref_id, _score) in ranked {
            if let Ok(Some(file)) = storage.get_indexed_file(ref_id) {
                files.push(file);
            }
        }
        Some(files)
    })
}
