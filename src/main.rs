//! ICD-Harvest main entry point
//!
//! Runs the crawl-then-persist pipeline once and exits.

use anyhow::Context;
use clap::Parser;
use icd_harvest::config::load_runtime_config;
use icd_harvest::crawler::run;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// ICD-Harvest: crawl the code catalog into a relational table
///
/// Everything else is configured through the environment: REST (retry
/// sleep in seconds), DB_NAME, DB_POLL_INTERVAL, DB_HOST, DB_PORT,
/// DB_USER, DB_PASSWORD and CATALOG_DOMAIN.
#[derive(Parser, Debug)]
#[command(name = "icd-harvest")]
#[command(version = "1.0.0")]
#[command(about = "Crawl the ICD code catalog into a relational table", long_about = None)]
struct Cli {
    /// Optional TOML configuration file applied before the environment
    #[arg(value_name = "CONFIG", env = "ICD_HARVEST_CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = load_runtime_config(cli.config.as_deref())
        .context("Failed to load configuration")?;

    tracing::info!(
        "Crawling {}{} (retry sleep {}s, {} attempts, {} connections)",
        config.crawler.domain,
        config.crawler.root_path,
        config.crawler.retry_delay_secs,
        config.crawler.max_attempts,
        config.crawler.max_connections
    );

    match run(&config).await {
        Ok(stored) => {
            tracing::info!("Run completed: {} codes stored", stored);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Run failed: {}", e);
            Err(e).context("Harvest run failed")
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("icd_harvest=info,warn"),
            1 => EnvFilter::new("icd_harvest=debug,info"),
            2 => EnvFilter::new("icd_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
