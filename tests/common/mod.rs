// These modules are used by several test binaries
#![allow(dead_code)]

pub mod mock_openai_server;

use leaning_classifier::config::{ClassificationMode, ClassifierConfig, ProviderConfig};
use leaning_classifier::server::AppState;

pub const TEST_API_KEY: &str = "sk-test-key";

/// Provider settings pointing at a mock server
pub fn provider_config(api_base: String) -> ProviderConfig {
    ProviderConfig {
        api_base,
        model: "gpt-4o-mini".to_string(),
        api_key: TEST_API_KEY.to_string(),
        request_timeout_secs: 2,
    }
}

pub fn classifier_config(
    api_base: String,
    mode: ClassificationMode,
    max_input_length: Option<usize>,
) -> ClassifierConfig {
    let mut config = ClassifierConfig::new(provider_config(api_base));
    config.mode = mode;
    config.max_input_length = max_input_length;
    config
}

/// Build shared state the same way the server does
pub fn create_test_state(config: &ClassifierConfig) -> AppState {
    config.validate().expect("test config must be valid");
    AppState::new(config).expect("Failed to build classifier in test")
}

/// A base URL nothing is listening on
pub fn unreachable_api_base() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/v1", addr)
}
