//! Classification pipeline: input truncation, prompt construction, the
//! provider call and validation of the model's reply.

pub mod prompt;
pub mod reply;
pub mod request;

pub use request::ClassificationRequest;

use crate::config::{ClassificationMode, ClassifierConfig};
use crate::protocols::ResponseEnvelope;
use crate::provider::{ChatProvider, OpenAIProvider, ProviderError};
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error};

/// Every way an `/analyze` call can fail.
///
/// `Display` carries internal detail for logs; [`AnalyzeError::public_message`]
/// is what callers see.
#[derive(Debug, thiserror::Error)]
pub enum AnalyzeError {
    #[error("Request must be JSON")]
    NotJson,

    #[error("Missing 'text' field in request body")]
    MissingText,

    #[error("Request body exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },

    #[error("Model reply is not valid JSON: {0}")]
    InvalidModelJson(String),

    #[error("Model reply is not an object with a boolean is_political")]
    InvalidModelStructure,

    #[error("Model reply has an invalid political_leaning")]
    InvalidLeaning,

    #[error("Model replied with unexpected label: {0}")]
    UnexpectedLabel(String),

    #[error("Provider call failed: {0}")]
    Provider(#[from] ProviderError),
}

impl AnalyzeError {
    pub fn public_message(&self) -> String {
        match self {
            AnalyzeError::NotJson => "Request must be JSON".to_string(),
            AnalyzeError::MissingText => "Missing 'text' field in request body".to_string(),
            AnalyzeError::PayloadTooLarge { limit } => {
                format!("Request body exceeds the {} byte limit", limit)
            }
            AnalyzeError::InvalidModelJson(_) => {
                "Invalid JSON response from analysis model".to_string()
            }
            AnalyzeError::InvalidModelStructure => {
                "Invalid data structure received from analysis model".to_string()
            }
            AnalyzeError::InvalidLeaning => {
                "Invalid political leaning value received from analysis model".to_string()
            }
            AnalyzeError::UnexpectedLabel(label) => {
                format!("Unexpected response from classification model: {}", label)
            }
            AnalyzeError::Provider(_) => {
                "Failed to analyze text due to an internal error".to_string()
            }
        }
    }

    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AnalyzeError::NotJson | AnalyzeError::MissingText | AnalyzeError::PayloadTooLarge { .. }
        )
    }
}

impl ResponseError for AnalyzeError {
    fn status_code(&self) -> StatusCode {
        match self {
            AnalyzeError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            _ if self.is_client_error() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ResponseEnvelope::failure(self.public_message()))
    }
}

/// Shared, read-only classification service
#[derive(Debug, Clone)]
pub struct Classifier {
    provider: Arc<dyn ChatProvider>,
    mode: ClassificationMode,
    max_input_length: Option<usize>,
}

impl Classifier {
    pub fn new(
        provider: Arc<dyn ChatProvider>,
        mode: ClassificationMode,
        max_input_length: Option<usize>,
    ) -> Self {
        Self {
            provider,
            mode,
            max_input_length,
        }
    }

    /// Build the classifier with an OpenAI-compatible provider from config
    pub fn from_config(config: &ClassifierConfig) -> Result<Self, ProviderError> {
        let provider = OpenAIProvider::new(config.provider.clone())?;
        Ok(Self::new(
            Arc::new(provider),
            config.mode,
            config.max_input_length,
        ))
    }

    /// Run one classification and return the `data` payload of the envelope
    pub async fn classify(&self, text: &str) -> Result<Value, AnalyzeError> {
        let input = prompt::truncate_input(text, self.max_input_length);
        if input.len() < text.len() {
            debug!(
                original_chars = text.chars().count(),
                max_input_length = ?self.max_input_length,
                "Truncated input text"
            );
        }

        let params = prompt::completion_params(self.mode, input);

        let raw = self.provider.complete(&params).await.map_err(|e| {
            error!(provider = self.provider.name(), error = %e, "Error calling model provider");
            AnalyzeError::Provider(e)
        })?;

        let result = match self.mode {
            ClassificationMode::Structured => reply::validate_structured(&raw),
            ClassificationMode::SingleToken => reply::validate_single_token(&raw),
        };

        if let Err(e) = &result {
            error!(mode = %self.mode, raw_reply = %raw, error = %e, "Model reply failed validation");
        }

        result
    }
}
