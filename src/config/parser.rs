use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use std::path::Path;
use std::str::FromStr;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    validate(&config)?;
    Ok(config)
}

/// Builds the run configuration: optional file, then process environment
///
/// Every field has a default, so a run with neither a file nor any
/// environment variables crawls the public catalog into `medical_codes.db`.
pub fn load_runtime_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let base = match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => Config::default(),
    };

    let config = apply_env_overrides(base, |name| std::env::var(name).ok())?;
    validate(&config)?;
    Ok(config)
}

/// Applies the recognised environment variables on top of `config`
///
/// `lookup` stands in for `std::env::var` so overrides can be tested
/// without touching the process environment.
///
/// | Variable | Field |
/// |----------|-------|
/// | `REST` | `crawler.retry_delay_secs` |
/// | `CATALOG_DOMAIN` | `crawler.domain` |
/// | `DB_HOST` | `database.host` |
/// | `DB_PORT` | `database.port` |
/// | `DB_USER` | `database.user` |
/// | `DB_PASSWORD` | `database.password` |
/// | `DB_NAME` | `database.name` |
/// | `DB_POLL_INTERVAL` | `database.poll_interval_secs` |
pub fn apply_env_overrides<F>(mut config: Config, lookup: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup("REST") {
        config.crawler.retry_delay_secs = parse_env("REST", value)?;
    }
    if let Some(value) = lookup("CATALOG_DOMAIN") {
        config.crawler.domain = value;
    }
    if let Some(value) = lookup("DB_HOST") {
        config.database.host = Some(value);
    }
    if let Some(value) = lookup("DB_PORT") {
        config.database.port = Some(parse_env("DB_PORT", value)?);
    }
    if let Some(value) = lookup("DB_USER") {
        config.database.user = Some(value);
    }
    if let Some(value) = lookup("DB_PASSWORD") {
        config.database.password = Some(value);
    }
    if let Some(value) = lookup("DB_NAME") {
        config.database.name = value;
    }
    if let Some(value) = lookup("DB_POLL_INTERVAL") {
        config.database.poll_interval_secs = parse_env("DB_POLL_INTERVAL", value)?;
    }
    Ok(config)
}

fn parse_env<T: FromStr>(name: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidEnv { name, value })
}
