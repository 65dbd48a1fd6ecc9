use anyhow::Context;
use clap::Parser;
use leaning_classifier::config::{
    API_KEY_ENV, ClassificationMode, ClassifierConfig, ConfigResult, ProviderConfig,
};
use leaning_classifier::server;

#[derive(Parser, Debug)]
#[command(name = "leaning-classifier")]
#[command(about = "Classify the political leaning of text through an OpenAI-compatible model")]
#[command(long_about = r#"
Political leaning classifier

Serves POST /analyze, which forwards the submitted text to a chat completion
model and returns {"success": ..., "data": ..., "error": ...}.

Examples:
  # Structured mode with truncation and a CORS allow-list
  OPENAI_API_KEY=sk-... leaning-classifier --max-input-length 300 \
    --cors-allowed-origins https://app.example.com

  # Legacy single-label mode against a local OpenAI-compatible server
  OPENAI_API_KEY=unused leaning-classifier --mode single-token \
    --api-base http://127.0.0.1:8000/v1 --model qwen2.5-7b-instruct
"#)]
struct CliArgs {
    /// Host address to bind the server
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server
    #[arg(long, env = "PORT", default_value_t = 5000)]
    port: u16,

    /// Output contract requested from the model
    #[arg(long, env = "CLASSIFIER_MODE", default_value = "structured", value_parser = ["structured", "single-token"])]
    mode: String,

    /// Model identifier sent to the provider
    #[arg(long, env = "OPENAI_MODEL", default_value = "gpt-4o-mini")]
    model: String,

    /// Base URL of the OpenAI-compatible API
    #[arg(long, env = "OPENAI_BASE_URL", default_value = "https://api.openai.com/v1")]
    api_base: String,

    /// Provider credential (environment only)
    #[arg(skip = std::env::var(API_KEY_ENV).ok())]
    api_key: Option<String>,

    /// Truncate input text to this many characters before classification
    #[arg(long, env = "MAX_INPUT_LENGTH")]
    max_input_length: Option<usize>,

    /// Origins allowed to call the API cross-origin (comma separated)
    #[arg(long, env = "CORS_ALLOWED_ORIGINS", value_delimiter = ',', num_args = 0..)]
    cors_allowed_origins: Vec<String>,

    /// Timeout in seconds for one provider call
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    request_timeout_secs: u64,

    /// Maximum request body size in bytes
    #[arg(long, default_value_t = 1048576)] // 1MB
    max_payload_size: usize,

    /// Number of HTTP worker threads
    #[arg(long)]
    workers: Option<usize>,

    /// Directory to store log files
    #[arg(long)]
    log_dir: Option<String>,

    /// Set the logging level
    #[arg(long, default_value = "info", value_parser = ["trace", "debug", "info", "warn", "error"])]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, default_value_t = false)]
    log_json: bool,

    /// Custom HTTP headers to check for request IDs
    #[arg(long, num_args = 0..)]
    request_id_headers: Vec<String>,
}

impl CliArgs {
    fn to_classifier_config(&self) -> ConfigResult<ClassifierConfig> {
        let mode: ClassificationMode = self.mode.parse()?;
        let api_key = ProviderConfig::require_api_key(self.api_key.clone())?;

        Ok(ClassifierConfig {
            host: self.host.clone(),
            port: self.port,
            mode,
            provider: ProviderConfig {
                api_base: self.api_base.clone(),
                model: self.model.clone(),
                api_key,
                request_timeout_secs: self.request_timeout_secs,
            },
            max_input_length: self.max_input_length,
            cors_allowed_origins: self
                .cors_allowed_origins
                .iter()
                .map(|origin| origin.trim().to_string())
                .filter(|origin| !origin.is_empty())
                .collect(),
            max_payload_size: self.max_payload_size,
            workers: self.workers,
            log_dir: self.log_dir.clone(),
            log_level: Some(self.log_level.clone()),
            log_json: self.log_json,
            request_id_headers: if self.request_id_headers.is_empty() {
                None
            } else {
                Some(self.request_id_headers.clone())
            },
        })
    }
}

fn main() -> anyhow::Result<()> {
    let cli_args = CliArgs::parse();

    println!("Political leaning classifier starting...");
    println!("Host: {}:{}", cli_args.host, cli_args.port);
    println!("Mode: {}", cli_args.mode);
    println!("Model: {} @ {}", cli_args.model, cli_args.api_base);

    let config = cli_args
        .to_classifier_config()
        .context("Invalid configuration")?;
    config.validate().context("Invalid configuration")?;

    actix_web::rt::System::new()
        .block_on(server::startup(config))
        .context("Server terminated with an error")?;

    Ok(())
}
