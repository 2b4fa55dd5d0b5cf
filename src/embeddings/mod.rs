//! Embedding generation and similarity search.
//!
//! Semantic recall is best-effort: when the embedding provider is
//! unavailable the caller logs a warning and falls back to keyword search
//! over the relational store. Nothing in here is allowed to fail a recall
//! request outright.

pub mod index;
pub mod ollama;
pub mod provider;

pub use index::{cosine_similarity, rank_by_similarity};
pub use ollama::OllamaProvider;
pub use provider::{EmbeddingProvider, ProviderInfo};

/// Create the embedding provider if one is reachable.
///
/// Checks the configured Ollama server; returns `None` when it is down or
/// the model is missing, which switches recall to the keyword fallback.
pub async fn create_embedding_provider() -> Option<OllamaProvider> {
    let provider = OllamaProvider::new();
    if provider.is_available().await {
        Some(provider)
    } else {
        None
    }
}
