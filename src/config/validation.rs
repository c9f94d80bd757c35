use crate::config::types::{Config, EndpointConfig, NetworkConfig, OutputConfig, SearchConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_search_config(&config.search)?;
    validate_endpoint_config(&config.endpoints)?;
    validate_network_config(&config.network)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates search configuration
///
/// An empty keyword list is the one configuration error that must abort the
/// crawl before it starts: with no seeds there is nothing to do.
fn validate_search_config(config: &SearchConfig) -> Result<(), ConfigError> {
    if config.keywords.is_empty() {
        return Err(ConfigError::Validation(
            "at least one seed keyword is required".to_string(),
        ));
    }

    if config.keywords.iter().any(|k| k.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "seed keywords cannot be blank".to_string(),
        ));
    }

    if config.allowed_categories.is_empty() {
        return Err(ConfigError::Validation(
            "allowed-categories cannot be empty".to_string(),
        ));
    }

    if config.max_pages_per_keyword < 1 {
        return Err(ConfigError::Validation(format!(
            "max-pages-per-keyword must be >= 1, got {}",
            config.max_pages_per_keyword
        )));
    }

    if config.results_per_page < 1 || config.results_per_page > 240 {
        return Err(ConfigError::Validation(format!(
            "results-per-page must be between 1 and 240, got {}",
            config.results_per_page
        )));
    }

    Ok(())
}

/// Validates endpoint configuration
fn validate_endpoint_config(config: &EndpointConfig) -> Result<(), ConfigError> {
    for (name, value) in [
        ("search-base-url", &config.search_base_url),
        ("suggestion-base-url", &config.suggestion_base_url),
    ] {
        Url::parse(value)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {}: {}", name, e)))?;
    }

    Ok(())
}

/// Validates network configuration
fn validate_network_config(config: &NetworkConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "request-timeout-secs must be >= 1, got {}",
            config.request_timeout_secs
        )));
    }

    if config.max_concurrent_fetches < 1 || config.max_concurrent_fetches > 100 {
        return Err(ConfigError::Validation(format!(
            "max-concurrent-fetches must be between 1 and 100, got {}",
            config.max_concurrent_fetches
        )));
    }

    if let Some(proxy) = &config.proxy_url {
        Url::parse(proxy)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid proxy-url: {}", e)))?;
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.records_path.is_empty() {
        return Err(ConfigError::Validation(
            "records-path cannot be empty".to_string(),
        ));
    }

    if config.images_dir.is_empty() {
        return Err(ConfigError::Validation(
            "images-dir cannot be empty".to_string(),
        ));
    }

    if config.debug_dir.is_empty() {
        return Err(ConfigError::Validation(
            "debug-dir cannot be empty".to_string(),
        ));
    }

    Ok(())
}
