//! Ollama embedding provider.
//!
//! Talks to a local Ollama server over its HTTP API. Availability is probed
//! before use so a stopped server downgrades recall to keyword search
//! instead of erroring.

use serde::{Deserialize, Serialize};

use super::provider::{EmbeddingProvider, ProviderInfo};
use crate::config::{embed_model, ollama_endpoint};
use crate::error::{Error, Result};

/// Probe timeout for the availability check.
const PROBE_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(2);

/// Ollama embedding provider.
pub struct OllamaProvider {
    client: reqwest::Client,
    endpoint: String,
    model: String,
}

impl OllamaProvider {
    /// Create a provider from the configured endpoint and model.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(None, None)
    }

    /// Create a provider with explicit configuration.
    #[must_use]
    pub fn with_config(endpoint: Option<String>, model: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.unwrap_or_else(ollama_endpoint),
            model: model.unwrap_or_else(embed_model),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.endpoint)
    }

    /// Whether the server lists our embedding model.
    ///
    /// Ollama reports tagged names ("nomic-embed-text:latest"), so a bare
    /// configured name matches any tag of itself.
    fn model_listed(&self, tags: &TagList) -> bool {
        let prefix = format!("{}:", self.model);
        tags.models.as_deref().unwrap_or_default().iter().any(|m| {
            m.name == self.model || m.name.starts_with(&prefix)
        })
    }
}

impl Default for OllamaProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct TagList {
    models: Option<Vec<TaggedModel>>,
}

#[derive(Debug, Deserialize)]
struct TaggedModel {
    name: String,
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

impl EmbeddingProvider for OllamaProvider {
    fn info(&self) -> ProviderInfo {
        ProviderInfo {
            name: "ollama".to_string(),
            model: self.model.clone(),
            endpoint: self.endpoint.clone(),
        }
    }

    async fn is_available(&self) -> bool {
        let probe = self
            .client
            .get(self.url("/api/tags"))
            .timeout(PROBE_TIMEOUT)
            .send()
            .await;

        let Ok(response) = probe else { return false };
        if !response.status().is_success() {
            return false;
        }

        match response.json::<TagList>().await {
            Ok(tags) => self.model_listed(&tags),
            Err(_) => false,
        }
    }

    async fn generate_embedding(&self, text: &str) -> Result<Vec<f32>> {
        let request = EmbedRequest {
            model: &self.model,
            input: text,
        };

        let response = self
            .client
            .post(self.url("/api/embed"))
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Embedding(format!("embed request to Ollama failed: {e}")))?;

        if !response.status().is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(Error::Embedding(format!("Ollama rejected the embed: {detail}")));
        }

        let data: EmbedResponse = response
            .json()
            .await
            .map_err(|e| Error::Embedding(format!("unreadable Ollama response: {e}")))?;

        data.embeddings
            .into_iter()
            .next()
            .ok_or_else(|| Error::Embedding("Ollama returned an empty embedding list".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_info() {
        let provider = OllamaProvider::with_config(
            Some("http://custom:11434".to_string()),
            Some("mxbai-embed-large".to_string()),
        );
        let info = provider.info();
        assert_eq!(info.name, "ollama");
        assert_eq!(info.model, "mxbai-embed-large");
        assert_eq!(info.endpoint, "http://custom:11434");
    }

    #[test]
    fn test_model_listed_matches_tagged_names() {
        let provider =
            OllamaProvider::with_config(None, Some("nomic-embed-text".to_string()));

        let tags = TagList {
            models: Some(vec![
                TaggedModel { name: "llama3:8b".to_string() },
                TaggedModel { name: "nomic-embed-text:latest".to_string() },
            ]),
        };
        assert!(provider.model_listed(&tags));

        let empty = TagList { models: None };
        assert!(!provider.model_listed(&empty));
    }
}
