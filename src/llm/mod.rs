//! Completion service clients.
//!
//! The rest of the crate consumes a completion service as a black box:
//! prompt and optional system prompt in, text out. Failures surface as
//! [`crate::Error::Completion`] and are never retried here; callers decide
//! whether a failed call ends their flow.

pub mod anthropic;

pub use anthropic::AnthropicClient;

/// A chat turn sent to the completion service.
#[derive(Debug, Clone)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

/// Who produced a chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// Trait for completion providers.
pub trait CompletionProvider: Send + Sync {
    /// Generate a completion for a single prompt.
    fn generate(
        &self,
        prompt: &str,
        system: Option<&str>,
        max_tokens: u32,
    ) -> impl std::future::Future<Output = crate::Result<String>> + Send;

    /// Generate the next assistant turn for a conversation.
    fn chat(
        &self,
        turns: &[ChatTurn],
        system: Option<&str>,
        max_tokens: u32,
    ) -> impl std::future::Future<Output = crate::Result<String>> + Send;
}
