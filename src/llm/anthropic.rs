//! Anthropic completion client.
//!
//! Minimal Messages API client: no streaming, no tools, no retries. A
//! transient failure maps to [`Error::Completion`] and is surfaced to the
//! caller.

use serde::{Deserialize, Serialize};

use super::{ChatTurn, CompletionProvider, Role};
use crate::config::{anthropic_api_key, completion_model};
use crate::error::{Error, Result};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic Messages API client.
pub struct AnthropicClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl AnthropicClient {
    /// Create a client from the environment.
    ///
    /// # Errors
    ///
    /// Returns a config error when `ANTHROPIC_API_KEY` is unset.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            client: reqwest::Client::new(),
            api_key: anthropic_api_key()?,
            model: completion_model(),
        })
    }

    /// The model this client targets.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    async fn send(&self, body: &MessagesRequest<'_>) -> Result<String> {
        let response = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(body)
            .send()
            .await
            .map_err(|e| Error::Completion(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(Error::Completion(format!("API returned {status}: {detail}")));
        }

        let data: MessagesResponse = response
            .json()
            .await
            .map_err(|e| Error::Completion(format!("failed to parse response: {e}")))?;

        data.content
            .into_iter()
            .find_map(|block| match block {
                ContentBlock::Text { text } => Some(text),
            })
            .ok_or_else(|| Error::Completion("response contained no text".into()))
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: Vec<MessageParam<'a>>,
}

#[derive(Debug, Serialize)]
struct MessageParam<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text { text: String },
}

impl CompletionProvider for AnthropicClient {
    async fn generate(
        &self,
        prompt: &str,
        system: Option<&str>,
        max_tokens: u32,
    ) -> Result<String> {
        let body = MessagesRequest {
            model: &self.model,
            max_tokens,
            system,
            messages: vec![MessageParam {
                role: Role::User.as_str(),
                content: prompt,
            }],
        };
        self.send(&body).await
    }

    async fn chat(
        &self,
        turns: &[ChatTurn],
        system: Option<&str>,
        max_tokens: u32,
    ) -> Result<String> {
        let messages = turns
            .iter()
            .map(|t| MessageParam {
                role: t.role.as_str(),
                content: &t.content,
            })
            .collect();

        let body = MessagesRequest {
            model: &self.model,
            max_tokens,
            system,
            messages,
        };
        self.send(&body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization() {
        let body = MessagesRequest {
            model: "claude-sonnet-4-5",
            max_tokens: 1024,
            system: None,
            messages: vec![MessageParam {
                role: "user",
                content: "hello",
            }],
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "claude-sonnet-4-5");
        assert!(json.get("system").is_none());
        assert_eq!(json["messages"][0]["role"], "user");
    }

    #[test]
    fn test_response_text_extraction() {
        let raw = r#"{"content":[{"type":"text","text":"hi there"}]}"#;
        let parsed: MessagesResponse = serde_json::from_str(raw).unwrap();
        match &parsed.content[0] {
            ContentBlock::Text { text } => assert_eq!(text, "hi there"),
        }
    }
}
