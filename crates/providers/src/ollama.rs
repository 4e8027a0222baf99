//! Ollama backend — talks to a local Ollama server over its native API.
//!
//! Endpoints used:
//! - `POST /api/chat` (non-streaming) for completions
//! - `GET /api/tags` for model listing and health checks
//!
//! No API key, no auth: Ollama binds to localhost by default.

use async_trait::async_trait;
use confab_core::backend::{ChatBackend, ChatReply, ChatRequest, TokenUsage};
use confab_core::error::BackendError;
use confab_core::message::ChatMessage;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// A chat backend speaking the native Ollama REST API.
pub struct OllamaBackend {
    base_url: String,
    client: reqwest::Client,
}

impl OllamaBackend {
    /// Create a backend against the given base URL
    /// (e.g. `http://localhost:11434`).
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .unwrap_or_default();

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Convenience constructor for the default local server.
    pub fn local() -> Self {
        Self::new(DEFAULT_OLLAMA_URL)
    }

    /// Convert our messages to Ollama's wire format.
    fn to_api_messages(messages: &[ChatMessage]) -> Vec<ApiMessage> {
        messages
            .iter()
            .map(|m| ApiMessage {
                role: m.role.as_str().into(),
                content: m.content.clone(),
            })
            .collect()
    }
}

#[async_trait]
impl ChatBackend for OllamaBackend {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatReply, BackendError> {
        let url = format!("{}/api/chat", self.base_url);

        let mut options = serde_json::json!({ "temperature": request.temperature });
        if let Some(max_tokens) = request.max_tokens {
            options["num_predict"] = serde_json::json!(max_tokens);
        }

        let body = serde_json::json!({
            "model": request.model,
            "messages": Self::to_api_messages(&request.messages),
            "stream": false,
            "options": options,
        });

        debug!(
            model = %request.model,
            messages = request.messages.len(),
            "Sending chat request to Ollama"
        );

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    BackendError::Timeout(e.to_string())
                } else {
                    BackendError::Network(e.to_string())
                }
            })?;

        let status = response.status().as_u16();

        if status == 404 {
            // Ollama answers 404 for models that were never pulled
            return Err(BackendError::ModelNotFound(request.model));
        }

        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Ollama returned error");
            return Err(BackendError::Api {
                status_code: status,
                message: error_body,
            });
        }

        let api_response: ApiChatResponse =
            response.json().await.map_err(|e| BackendError::Api {
                status_code: 200,
                message: format!("Failed to parse response: {e}"),
            })?;

        let usage = match (api_response.prompt_eval_count, api_response.eval_count) {
            (Some(prompt), Some(completion)) => Some(TokenUsage {
                prompt_tokens: prompt,
                completion_tokens: completion,
                total_tokens: prompt + completion,
            }),
            _ => None,
        };

        Ok(ChatReply {
            content: api_response.message.content,
            model: api_response.model,
            usage,
        })
    }

    async fn list_models(&self) -> Result<Vec<String>, BackendError> {
        let url = format!("{}/api/tags", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Ok(Vec::new());
        }

        let body: ApiTagsResponse = response
            .json()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        Ok(body.models.into_iter().map(|m| m.name).collect())
    }

    async fn health_check(&self) -> Result<bool, BackendError> {
        let url = format!("{}/api/tags", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        Ok(response.status().is_success())
    }
}

// --- Ollama API types (internal) ---

#[derive(Debug, Serialize, Deserialize)]
struct ApiMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ApiChatResponse {
    model: String,
    message: ApiMessage,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ApiTagsResponse {
    #[serde(default)]
    models: Vec<ApiModelTag>,
}

#[derive(Debug, Deserialize)]
struct ApiModelTag {
    name: String,
}
