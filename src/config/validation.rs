use crate::config::types::{Config, MonitorConfig, NotifyConfig, SourceConfig, UserAgentConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_monitor_config(&config.monitor)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_notify_config(&config.notify)?;

    match &config.source {
        Some(source) => validate_source_config(source)?,
        None if config.pages.is_empty() => {
            return Err(ConfigError::Validation(
                "no pages to monitor: add a [source] section or [[page]] entries".to_string(),
            ));
        }
        None => {}
    }

    for entry in &config.pages {
        if entry.label.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "page '{}' has an empty label",
                entry.url
            )));
        }
    }

    Ok(())
}

/// Validates polling engine configuration
fn validate_monitor_config(config: &MonitorConfig) -> Result<(), ConfigError> {
    if config.fetch_timeout_secs < 1 || config.fetch_timeout_secs > 300 {
        return Err(ConfigError::Validation(format!(
            "fetch_timeout_secs must be between 1 and 300, got {}",
            config.fetch_timeout_secs
        )));
    }

    if config.max_concurrent_fetches < 1 || config.max_concurrent_fetches > 500 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_fetches must be between 1 and 500, got {}",
            config.max_concurrent_fetches
        )));
    }

    if config.warmup_cycles > 1000 {
        return Err(ConfigError::Validation(format!(
            "warmup_cycles must be <= 1000, got {}",
            config.warmup_cycles
        )));
    }

    Ok(())
}

fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.value.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user agent cannot be empty".to_string(),
        ));
    }

    if config.value.chars().any(|c| c.is_control()) {
        return Err(ConfigError::Validation(
            "user agent cannot contain control characters".to_string(),
        ));
    }

    Ok(())
}

fn validate_source_config(config: &SourceConfig) -> Result<(), ConfigError> {
    match (&config.path, &config.url) {
        (None, None) => Err(ConfigError::Validation(
            "[source] needs either path or url".to_string(),
        )),
        (Some(_), Some(_)) => Err(ConfigError::Validation(
            "[source] path and url are mutually exclusive".to_string(),
        )),
        (Some(path), None) => {
            if path.is_empty() {
                return Err(ConfigError::Validation(
                    "source path cannot be empty".to_string(),
                ));
            }
            Ok(())
        }
        (None, Some(url)) => {
            validate_http_url("source url", url)?;
            match &config.cache_path {
                Some(cache) if !cache.is_empty() => Ok(()),
                _ => Err(ConfigError::Validation(
                    "a remote source needs a cache-path".to_string(),
                )),
            }
        }
    }
}

fn validate_notify_config(config: &NotifyConfig) -> Result<(), ConfigError> {
    if let Some(webhook) = &config.webhook_url {
        validate_http_url("webhook-url", webhook)?;
    }
    Ok(())
}

/// Checks that `value` parses as an http(s) URL
fn validate_http_url(field: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", field, value, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' must use http or https",
            field, value
        )));
    }

    Ok(())
}
