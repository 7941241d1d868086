//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the shared HTTP client with fixed identification headers
//! - Capping the number of exchanges in flight
//! - Fixed-delay retry of transient failures up to an attempt ceiling

use crate::config::{CrawlerConfig, UserAgentConfig};
use crate::FetchError;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client, StatusCode};
use std::fmt;
use std::time::Duration;
use tokio::sync::Semaphore;

/// How often and how patiently a URL is retried
///
/// The delay is fixed: no jitter, no growth between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts for one URL, the first one included
    pub max_attempts: u32,

    /// Sleep after each failed attempt that will be followed by another
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            delay: Duration::from_secs(180),
        }
    }
}

impl From<&CrawlerConfig> for RetryPolicy {
    fn from(config: &CrawlerConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            delay: Duration::from_secs(config.retry_delay_secs),
        }
    }
}

/// Why a single attempt did not produce a page
#[derive(Debug)]
enum AttemptFailure {
    /// The server answered with a non-success status
    Status(StatusCode),

    /// Connection, protocol or body transfer failure
    Transport(reqwest::Error),
}

impl fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status(status) => write!(f, "response status code {}", status),
            Self::Transport(e) => write!(f, "{}", e),
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// No request timeout is set: the catalog may take arbitrarily long to
/// answer, and only failures trigger a retry.
///
/// # Arguments
///
/// * `config` - The request identification headers
/// * `max_connections` - Idle connections kept per host
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(
    config: &UserAgentConfig,
    max_connections: usize,
) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    match HeaderValue::from_str(&config.accept) {
        Ok(accept) => {
            headers.insert(ACCEPT, accept);
        }
        Err(e) => tracing::warn!("Not sending Accept header {:?}: {}", config.accept, e),
    }

    Client::builder()
        .user_agent(config.user_agent.as_str())
        .default_headers(headers)
        .pool_max_idle_per_host(max_connections)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Retrieves raw pages, retrying transient failures
///
/// A single fetcher is shared by reference across every concurrent
/// expansion of a run.
pub struct PageFetcher {
    client: Client,
    policy: RetryPolicy,
    permits: Semaphore,
}

impl PageFetcher {
    pub fn new(client: Client, policy: RetryPolicy, max_connections: usize) -> Self {
        Self {
            client,
            policy,
            permits: Semaphore::new(max_connections.max(1)),
        }
    }

    /// Fetches `url` and returns its body
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | 2xx | Return body |
    /// | Non-2xx status | Sleep `delay`, retry |
    /// | Connection / protocol / body error | Sleep `delay`, retry |
    /// | Malformed URL | Fail immediately |
    /// | Attempt `max_attempts` fails | Fail with `FetchError::Exhausted` |
    ///
    /// No sleep follows the final attempt.
    pub async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let mut attempt = 1;

        loop {
            let failure = match self.fetch_once(url).await? {
                Ok(body) => return Ok(body),
                Err(failure) => failure,
            };

            if attempt >= self.policy.max_attempts {
                tracing::error!(
                    "Attempt {} to request {} failed: {}; giving up",
                    attempt,
                    url,
                    failure
                );
                return Err(FetchError::Exhausted {
                    url: url.to_string(),
                    attempts: attempt,
                    reason: failure.to_string(),
                });
            }

            tracing::warn!(
                "Attempt {} to request {} failed: {}; sleeping {}s before retrying",
                attempt,
                url,
                failure,
                self.policy.delay.as_secs_f64()
            );
            tokio::time::sleep(self.policy.delay).await;
            attempt += 1;
        }
    }

    /// Performs one GET while holding a connection permit
    ///
    /// The outer `Result` carries failures that retrying cannot fix.
    async fn fetch_once(&self, url: &str) -> Result<Result<String, AttemptFailure>, FetchError> {
        // The semaphore is never closed, so a permit is always granted
        let _permit = self.permits.acquire().await.ok();

        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) if e.is_builder() => {
                return Err(FetchError::InvalidRequest {
                    url: url.to_string(),
                    source: e,
                })
            }
            Err(e) => return Ok(Err(AttemptFailure::Transport(e))),
        };

        let status = response.status();
        if !status.is_success() {
            return Ok(Err(AttemptFailure::Status(status)));
        }

        Ok(response.text().await.map_err(AttemptFailure::Transport))
    }
}
