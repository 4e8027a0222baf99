//! ChatBackend trait — the abstraction over the model backend.
//!
//! A ChatBackend knows how to send an ordered sequence of role-tagged
//! messages to a language model and get a single text reply back. The
//! conversation manager calls it without knowing which backend is in
//! use, and treats any failure as data rather than a propagated fault.

use crate::error::BackendError;
use crate::message::ChatMessage;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A chat completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The model to use (e.g., "llama3.2")
    pub model: String,

    /// The assembled context window, in order
    pub messages: Vec<ChatMessage>,

    /// Temperature (0.0 = deterministic)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

fn default_temperature() -> f32 {
    0.7
}

impl ChatRequest {
    pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            temperature: default_temperature(),
            max_tokens: None,
        }
    }
}

/// A complete reply from the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    /// The generated reply text
    pub content: String,

    /// Which model actually responded (may differ from requested)
    pub model: String,

    /// Token usage statistics, when the backend reports them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
}

/// Token usage information.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// The model backend trait.
///
/// Implementations: Ollama (native API), or any test double. One request,
/// one reply — no streaming, no retries (accepted limitations of the
/// interaction model).
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// A human-readable name for this backend (e.g., "ollama").
    fn name(&self) -> &str;

    /// Send a request and get a complete reply.
    async fn chat(&self, request: ChatRequest) -> std::result::Result<ChatReply, BackendError>;

    /// List available models on this backend.
    async fn list_models(&self) -> std::result::Result<Vec<String>, BackendError> {
        Ok(Vec::new())
    }

    /// Health check — can we reach the backend?
    async fn health_check(&self) -> std::result::Result<bool, BackendError> {
        Ok(true)
    }
}
