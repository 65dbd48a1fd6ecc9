use super::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Environment variable holding the model provider credential
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Headers checked, in order, for a caller-supplied request id
pub const DEFAULT_REQUEST_ID_HEADERS: [&str; 3] = ["x-request-id", "x-correlation-id", "request-id"];

/// Output contract requested from the model
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClassificationMode {
    /// JSON object with `is_political` and `political_leaning`
    #[default]
    Structured,
    /// A single bare label, the text is assumed to be political
    SingleToken,
}

impl ClassificationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClassificationMode::Structured => "structured",
            ClassificationMode::SingleToken => "single-token",
        }
    }
}

impl FromStr for ClassificationMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "structured" | "json" => Ok(ClassificationMode::Structured),
            "single-token" | "single_token" | "label" => Ok(ClassificationMode::SingleToken),
            other => Err(ConfigError::InvalidValue {
                field: "mode".to_string(),
                value: other.to_string(),
                reason: "Must be one of: structured, single-token".to_string(),
            }),
        }
    }
}

impl fmt::Display for ClassificationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Connection settings for the OpenAI-compatible chat completion provider
#[derive(Clone, Serialize, Deserialize, PartialEq)]
pub struct ProviderConfig {
    /// Base URL of the API, e.g. `https://api.openai.com/v1`
    pub api_base: String,
    /// Model identifier sent with every request
    pub model: String,
    /// Bearer credential; never serialized
    #[serde(skip_serializing, default)]
    pub api_key: String,
    /// Upper bound for one provider round-trip, in seconds
    pub request_timeout_secs: u64,
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("api_key", &"<redacted>")
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key: String::new(),
            request_timeout_secs: 30,
        }
    }
}

impl ProviderConfig {
    /// Create a provider config with the default endpoint and model
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    /// Resolve the credential, treating an absent or blank value as a startup error
    pub fn require_api_key(api_key: Option<String>) -> ConfigResult<String> {
        match api_key {
            Some(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(ConfigError::MissingRequired {
                field: API_KEY_ENV.to_string(),
            }),
        }
    }

    pub fn chat_completions_url(&self) -> String {
        format!("{}/chat/completions", self.api_base.trim_end_matches('/'))
    }
}

/// Main service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Output contract requested from the model
    pub mode: ClassificationMode,
    /// Model provider settings
    pub provider: ProviderConfig,
    /// Inputs longer than this many characters are truncated (None = no limit)
    pub max_input_length: Option<usize>,
    /// CORS allowed origins (empty = any origin)
    pub cors_allowed_origins: Vec<String>,
    /// Maximum request body size in bytes
    pub max_payload_size: usize,
    /// Number of HTTP worker threads (None = actix default)
    pub workers: Option<usize>,
    /// Log directory (None = stdout only)
    pub log_dir: Option<String>,
    /// Log level (None = info)
    pub log_level: Option<String>,
    /// Emit logs as JSON
    #[serde(default)]
    pub log_json: bool,
    /// Custom request ID headers to check (defaults to common headers)
    pub request_id_headers: Option<Vec<String>>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            mode: ClassificationMode::default(),
            provider: ProviderConfig::default(),
            max_input_length: None,
            cors_allowed_origins: vec![],
            max_payload_size: 1024 * 1024,
            workers: None,
            log_dir: None,
            log_level: None,
            log_json: false,
            request_id_headers: None,
        }
    }
}

impl ClassifierConfig {
    /// Create a new configuration around a provider
    pub fn new(provider: ProviderConfig) -> Self {
        Self {
            provider,
            ..Default::default()
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> ConfigResult<()> {
        crate::config::validation::ConfigValidator::validate(self)
    }

    pub fn effective_request_id_headers(&self) -> Vec<String> {
        self.request_id_headers.clone().unwrap_or_else(|| {
            DEFAULT_REQUEST_ID_HEADERS
                .iter()
                .map(|h| h.to_string())
                .collect()
        })
    }
}
