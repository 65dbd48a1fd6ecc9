use super::*;

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate(config: &ClassifierConfig) -> ConfigResult<()> {
        Self::validate_server_settings(config)?;
        Self::validate_provider(&config.provider)?;
        Self::validate_input_limits(config)?;
        Self::validate_cors(&config.cors_allowed_origins)?;
        Self::validate_logging(config)?;

        Ok(())
    }

    fn validate_server_settings(config: &ClassifierConfig) -> ConfigResult<()> {
        if config.host.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "host".to_string(),
                value: config.host.clone(),
                reason: "Host cannot be empty".to_string(),
            });
        }

        if config.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "port".to_string(),
                value: config.port.to_string(),
                reason: "Port must be > 0".to_string(),
            });
        }

        if config.max_payload_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_payload_size".to_string(),
                value: config.max_payload_size.to_string(),
                reason: "Must be > 0".to_string(),
            });
        }

        if let Some(workers) = config.workers {
            if workers == 0 {
                return Err(ConfigError::InvalidValue {
                    field: "workers".to_string(),
                    value: workers.to_string(),
                    reason: "Must be > 0 when specified".to_string(),
                });
            }
        }

        Ok(())
    }

    fn validate_provider(provider: &ProviderConfig) -> ConfigResult<()> {
        if provider.api_key.trim().is_empty() {
            return Err(ConfigError::MissingRequired {
                field: API_KEY_ENV.to_string(),
            });
        }

        if !provider.api_base.starts_with("http://") && !provider.api_base.starts_with("https://")
        {
            return Err(ConfigError::InvalidValue {
                field: "provider.api_base".to_string(),
                value: provider.api_base.clone(),
                reason: "URL must start with http:// or https://".to_string(),
            });
        }

        if provider.model.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "provider.model".to_string(),
                value: provider.model.clone(),
                reason: "Model cannot be empty".to_string(),
            });
        }

        if provider.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "provider.request_timeout_secs".to_string(),
                value: provider.request_timeout_secs.to_string(),
                reason: "Must be > 0".to_string(),
            });
        }

        Ok(())
    }

    fn validate_input_limits(config: &ClassifierConfig) -> ConfigResult<()> {
        if let Some(max_input_length) = config.max_input_length {
            if max_input_length == 0 {
                return Err(ConfigError::InvalidValue {
                    field: "max_input_length".to_string(),
                    value: max_input_length.to_string(),
                    reason: "Must be > 0 when specified".to_string(),
                });
            }
        }

        Ok(())
    }

    fn validate_cors(origins: &[String]) -> ConfigResult<()> {
        for origin in origins {
            let rest = origin
                .strip_prefix("http://")
                .or_else(|| origin.strip_prefix("https://"));

            match rest {
                Some(host) if !host.is_empty() && !host.contains('/') => {}
                _ => {
                    return Err(ConfigError::InvalidValue {
                        field: "cors_allowed_origins".to_string(),
                        value: origin.clone(),
                        reason: "Origin must be scheme://host[:port] with no path".to_string(),
                    });
                }
            }
        }

        Ok(())
    }

    fn validate_logging(config: &ClassifierConfig) -> ConfigResult<()> {
        if let Some(level) = &config.log_level {
            match level.to_ascii_lowercase().as_str() {
                "trace" | "debug" | "info" | "warn" | "error" => {}
                _ => {
                    return Err(ConfigError::InvalidValue {
                        field: "log_level".to_string(),
                        value: level.clone(),
                        reason: "Must be one of: trace, debug, info, warn, error".to_string(),
                    });
                }
            }
        }

        if let Some(log_dir) = &config.log_dir {
            if log_dir.trim().is_empty() {
                return Err(ConfigError::ValidationFailed {
                    reason: "log_dir cannot be blank when specified".to_string(),
                });
            }
        }

        Ok(())
    }
}
