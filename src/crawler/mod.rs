//! Crawler module for catalog fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with fixed-delay retry
//! - Listing page parsing into catalog entries
//! - Level-by-level concurrent traversal of the catalog
//! - The crawl-then-persist pipeline

mod fetcher;
mod parser;
mod walker;

pub use fetcher::{build_http_client, PageFetcher, RetryPolicy};
pub use parser::{extract_entries, strip_code_prefix, ListingSelectors};
pub use walker::{Catalog, HierarchyWalker, Stage};

use crate::catalog::{flatten, MedicalCode};
use crate::config::Config;
use crate::storage::{persist, SqliteSink};
use crate::HarvestError;
use std::path::Path;
use std::time::Duration;

/// Crawls the catalog and flattens the leaf codes
///
/// The database is not touched. Any terminal failure (a URL that kept
/// failing, a page with an unexpected shape, a broken back-reference)
/// ends the harvest with no partial result.
///
/// # Arguments
///
/// * `config` - The run configuration
///
/// # Returns
///
/// * `Ok(Vec<MedicalCode>)` - One record per leaf code
/// * `Err(HarvestError)` - Harvest failed
pub async fn harvest(config: &Config) -> Result<Vec<MedicalCode>, HarvestError> {
    let client = build_http_client(&config.user_agent, config.crawler.max_connections)?;
    let fetcher = PageFetcher::new(
        client,
        RetryPolicy::from(&config.crawler),
        config.crawler.max_connections,
    );

    let walker = HierarchyWalker::new(&fetcher, &config.crawler)?;
    let catalog = walker.walk().await?;
    let records = flatten(&catalog.diseases)?;

    tracing::info!(
        "Harvested {} codes under {} categories ({} entries read)",
        records.len(),
        catalog.categories.len(),
        walker.produced()
    );

    Ok(records)
}

/// Runs the complete crawl-then-persist pipeline once
///
/// This is the main entry point for a run. It will:
/// 1. Walk the catalog and flatten the leaf codes
/// 2. Wait for the database to answer its health probe
/// 3. Create the table if needed
/// 4. Insert the whole batch in one transaction
///
/// The database is only opened once the crawl has succeeded.
///
/// # Example
///
/// ```no_run
/// use icd_harvest::config::load_runtime_config;
/// use icd_harvest::crawler::run;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_runtime_config(None)?;
/// let stored = run(&config).await?;
/// println!("{} codes stored", stored);
/// # Ok(())
/// # }
/// ```
pub async fn run(config: &Config) -> Result<usize, HarvestError> {
    let records = harvest(config).await?;

    let ignored = config.database.ignored_settings();
    if !ignored.is_empty() {
        tracing::warn!(
            "Database {} is not used by the embedded SQLite store",
            ignored.join(", ")
        );
    }

    tracing::info!("Connecting to database {}", config.database.label());
    let mut sink = SqliteSink::connect_when_ready(
        Path::new(&config.database.name),
        Duration::from_secs(config.database.poll_interval_secs),
    )
    .await;

    Ok(persist(&mut sink, &records)?)
}
