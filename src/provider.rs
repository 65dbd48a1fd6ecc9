//! Model provider boundary.
//!
//! Everything that can go wrong while talking to the provider (connection
//! failures, timeouts, non-2xx statuses, unparseable payloads, empty choices)
//! is reported as a [`ProviderError`]. Callers never see `reqwest` types.

use crate::config::ProviderConfig;
use crate::protocols::openai::{
    ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ResponseFormat,
};
use async_trait::async_trait;
use std::fmt;
use std::time::Duration;
use tracing::debug;

const MAX_ERROR_BODY_CHARS: usize = 512;

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Provider request timed out after {0}s")]
    Timeout(u64),

    #[error("Failed to reach provider: {0}")]
    Connection(String),

    #[error("Provider returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed provider payload: {0}")]
    MalformedPayload(String),

    #[error("Provider returned no message content")]
    EmptyReply,

    #[error("Failed to build provider client: {0}")]
    ClientBuild(String),
}

/// Parameters of a single completion call
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionParams {
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Ask the provider for strict JSON output
    pub json_output: bool,
}

/// A chat-completion backend returning the raw text of the first choice
#[async_trait]
pub trait ChatProvider: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    async fn complete(&self, params: &CompletionParams) -> Result<String, ProviderError>;
}

/// OpenAI-compatible `/chat/completions` client
#[derive(Debug, Clone)]
pub struct OpenAIProvider {
    client: reqwest::Client,
    config: ProviderConfig,
    url: String,
}

impl OpenAIProvider {
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .pool_idle_timeout(Some(Duration::from_secs(50)))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ProviderError::ClientBuild(e.to_string()))?;

        Ok(Self::with_client(config, client))
    }

    pub fn with_client(config: ProviderConfig, client: reqwest::Client) -> Self {
        let url = config.chat_completions_url();
        Self {
            client,
            config,
            url,
        }
    }

    pub fn build_request(&self, params: &CompletionParams) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage::user(params.prompt.clone())],
            temperature: Some(params.temperature),
            max_tokens: Some(params.max_tokens),
            response_format: params.json_output.then_some(ResponseFormat::JsonObject),
        }
    }

    fn map_transport_error(&self, err: reqwest::Error) -> ProviderError {
        if err.is_timeout() {
            ProviderError::Timeout(self.config.request_timeout_secs)
        } else {
            ProviderError::Connection(err.to_string())
        }
    }
}

#[async_trait]
impl ChatProvider for OpenAIProvider {
    fn name(&self) -> &str {
        &self.config.model
    }

    async fn complete(&self, params: &CompletionParams) -> Result<String, ProviderError> {
        let request = self.build_request(params);

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let completion: ChatCompletionResponse = serde_json::from_slice(&body)
            .map_err(|e| ProviderError::MalformedPayload(e.to_string()))?;

        if let Some(usage) = &completion.usage {
            debug!(
                model = %completion.model,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Provider call completed"
            );
        }

        completion
            .first_content()
            .map(str::to_string)
            .ok_or(ProviderError::EmptyReply)
    }
}
