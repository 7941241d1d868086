//! ICD-Harvest: a three-level medical code catalog crawler
//!
//! This crate walks a hierarchical public code catalog (category →
//! subcategory → code pages), extracts the listed entries from each page,
//! flattens the leaf codes into fixed-shape records and bulk-inserts them
//! into a relational store.

pub mod catalog;
pub mod config;
pub mod crawler;
pub mod storage;

use thiserror::Error;

/// Main error type for a harvest run
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Linkage error: {0}")]
    Linkage(#[from] LinkageError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid value for environment variable {name}: {value:?}")]
    InvalidEnv { name: &'static str, value: String },
}

/// Page retrieval errors
///
/// Transient failures never surface here; they are retried inside the
/// fetcher. What does surface is terminal for the branch that requested it.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Giving up on {url} after {attempts} attempts: {reason}")]
    Exhausted {
        url: String,
        attempts: u32,
        reason: String,
    },

    #[error("Invalid request for {url}: {source}")]
    InvalidRequest {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Page-shape mismatches found while extracting entries
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Invalid selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },

    #[error("No element matching '{selector}' on {url}")]
    MissingElement { selector: String, url: String },

    #[error("Entry '{name}' has no link to expand")]
    Unlinked { name: String },

    #[error("Cannot resolve link '{href}' against {base}: {source}")]
    InvalidLink {
        href: String,
        base: String,
        #[source]
        source: ::url::ParseError,
    },
}

/// A back-reference was missing while flattening leaf entries
#[derive(Debug, Error)]
#[error("Code '{code}' has no {missing} back-reference")]
pub struct LinkageError {
    pub code: String,
    pub missing: &'static str,
}

/// Result type alias for harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use catalog::{flatten, Category, Disease, Entry, MedicalCode, SubCategory};
pub use config::Config;
