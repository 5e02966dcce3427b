//! Outbound gateway to the remote text-completion service.
//!
//! The pipeline talks to a Groq-style OpenAI-compatible chat-completions
//! endpoint: one synchronous request per report, no retries, no timeout. The
//! gateway trait keeps the orchestrator testable without network access.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::LlmConfig;

#[derive(Debug, thiserror::Error)]
pub enum ReportGenerationError {
    #[error("completion service is not configured: {0}")]
    NotConfigured(String),
    #[error("completion request failed: {0}")]
    Transport(String),
    #[error("completion service returned status {0}")]
    Status(u16),
    #[error("completion service returned an empty report")]
    EmptyCompletion,
    #[error("completion response could not be parsed: {0}")]
    MalformedResponse(String),
}

/// Single-turn completion seam. Implementations must be callable from a
/// blocking context; the HTTP layer dispatches through `spawn_blocking`.
pub trait CompletionGateway: Send + Sync {
    fn complete(&self, prompt: &str) -> Result<String, ReportGenerationError>;
}

/// Blocking HTTP client for the Groq chat-completions API.
#[derive(Debug)]
pub struct GroqCompletionClient {
    client: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GroqCompletionClient {
    pub fn from_config(config: &LlmConfig) -> Result<Self, ReportGenerationError> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| ReportGenerationError::NotConfigured("GROQ_API_KEY is not set".to_string()))?;

        Ok(Self {
            client: reqwest::blocking::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            model: config.model.clone(),
        })
    }
}

impl CompletionGateway for GroqCompletionClient {
    fn complete(&self, prompt: &str) -> Result<String, ReportGenerationError> {
        let url = format!("{}/openai/v1/chat/completions", self.base_url);
        debug!(%url, model = %self.model, prompt_bytes = prompt.len(), "requesting completion");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&ChatRequest {
                model: &self.model,
                messages: vec![ChatMessage {
                    role: "user",
                    content: prompt,
                }],
            })
            .send()
            .map_err(|err| ReportGenerationError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ReportGenerationError::Status(status.as_u16()));
        }

        let body: ChatResponse = response
            .json()
            .map_err(|err| ReportGenerationError::MalformedResponse(err.to_string()))?;

        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(ReportGenerationError::EmptyCompletion);
        }

        Ok(content)
    }
}

/// Stand-in gateway for installs without an API key and for the CLI's
/// `--offline` mode; every call reports the service as unconfigured so the
/// orchestrator falls back to the deterministic local report.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledCompletionGateway;

impl CompletionGateway for DisabledCompletionGateway {
    fn complete(&self, _prompt: &str) -> Result<String, ReportGenerationError> {
        Err(ReportGenerationError::NotConfigured(
            "no completion API key configured".to_string(),
        ))
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}
