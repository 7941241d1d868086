use crate::config::types::{Config, CrawlerConfig, DatabaseConfig, UserAgentConfig};
use crate::ConfigError;
use reqwest::header::HeaderValue;
use scraper::Selector;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_database_config(&config.database)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    let domain = Url::parse(&config.domain)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid domain '{}': {}", config.domain, e)))?;

    if domain.scheme() != "http" && domain.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "domain '{}' must use http or https",
            config.domain
        )));
    }

    if !config.root_path.starts_with('/') {
        return Err(ConfigError::Validation(format!(
            "root_path must start with '/', got '{}'",
            config.root_path
        )));
    }

    if config.max_attempts < 1 || config.max_attempts > 100 {
        return Err(ConfigError::Validation(format!(
            "max_attempts must be between 1 and 100, got {}",
            config.max_attempts
        )));
    }

    if config.max_connections < 1 || config.max_connections > 100 {
        return Err(ConfigError::Validation(format!(
            "max_connections must be between 1 and 100, got {}",
            config.max_connections
        )));
    }

    validate_selector("body_selector", &config.body_selector)?;
    validate_selector("list_selector", &config.list_selector)?;

    if config.child_list_class.is_empty()
        || !config
            .child_list_class
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ConfigError::Validation(format!(
            "child_list_class must be a plain class name, got '{}'",
            config.child_list_class
        )));
    }

    Ok(())
}

/// Checks that a CSS selector parses
fn validate_selector(field: &str, selector: &str) -> Result<(), ConfigError> {
    Selector::parse(selector).map_err(|e| {
        ConfigError::Validation(format!("{} '{}' is not a valid selector: {:?}", field, selector, e))
    })?;
    Ok(())
}

/// Validates request headers
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.accept.trim().is_empty() {
        return Err(ConfigError::Validation("accept cannot be empty".to_string()));
    }

    for (field, value) in [("user_agent", &config.user_agent), ("accept", &config.accept)] {
        if HeaderValue::from_str(value).is_err() {
            return Err(ConfigError::Validation(format!(
                "{} is not a valid header value: {:?}",
                field, value
            )));
        }
    }

    Ok(())
}

/// Validates database configuration
fn validate_database_config(config: &DatabaseConfig) -> Result<(), ConfigError> {
    if config.name.is_empty() {
        return Err(ConfigError::Validation(
            "database name cannot be empty".to_string(),
        ));
    }

    if config.poll_interval_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "poll_interval_secs must be >= 1, got {}",
            config.poll_interval_secs
        )));
    }

    Ok(())
}
