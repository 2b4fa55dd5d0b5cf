//! Embedding provider trait.
//!
//! The narrow seam between recall and whatever produces vectors, so the
//! backing service can change without touching storage or search code.

use crate::error::Result;

/// Provider metadata for status displays.
#[derive(Debug, Clone)]
pub struct ProviderInfo {
    pub name: String,
    pub model: String,
    pub endpoint: String,
}

/// Trait for embedding providers.
pub trait EmbeddingProvider: Send + Sync {
    /// Get provider metadata.
    fn info(&self) -> ProviderInfo;

    /// Check if the provider is reachable and has its model.
    fn is_available(&self) -> impl std::future::Future<Output = bool> + Send;

    /// Generate an embedding for a single text.
    fn generate_embedding(
        &self,
        text: &str,
    ) -> impl std::future::Future<Output = Result<Vec<f32>>> + Send;
}
