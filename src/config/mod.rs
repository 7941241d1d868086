//! Configuration module for ICD-Harvest
//!
//! A run is configured from an optional TOML file followed by environment
//! overrides (`REST`, `DB_NAME`, `DB_POLL_INTERVAL`, ...). Every value has a
//! default, so the file may be omitted entirely.
//!
//! # Example
//!
//! ```no_run
//! use icd_harvest::config::load_runtime_config;
//!
//! let config = load_runtime_config(None).unwrap();
//! println!("Retry sleep: {}s", config.crawler.retry_delay_secs);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, DatabaseConfig, UserAgentConfig, DEFAULT_ACCEPT, DEFAULT_USER_AGENT,
};

// Re-export parser functions
pub use parser::{apply_env_overrides, load_config, load_runtime_config};
pub use validation::validate;
