//! Three-level catalog traversal
//!
//! The walker moves through fixed stages:
//!
//! ```text
//! Root ──► Subcategories ──► Codes ──► Done
//! ```
//!
//! Each stage after the root expands every parent from the previous stage
//! concurrently and waits for all of them before the next stage starts.

use crate::catalog::{Category, Child, Disease, Entry, Listing, SubCategory};
use crate::config::CrawlerConfig;
use crate::crawler::fetcher::PageFetcher;
use crate::crawler::parser::{extract_entries, ListingSelectors};
use crate::{ExtractionError, HarvestError};
use futures::future::join_all;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use url::Url;

/// Where the walker is in the hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Root,
    Subcategories,
    Codes,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Root => "root",
            Self::Subcategories => "subcategories",
            Self::Codes => "codes",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// Every entry read during one walk
///
/// Holding the upper levels here is what keeps the children's
/// back-references valid until the codes are flattened.
#[derive(Debug, Default)]
pub struct Catalog {
    pub categories: Vec<Arc<Category>>,
    pub subcategories: Vec<Arc<SubCategory>>,
    pub diseases: Vec<Disease>,
}

/// Drives fetching and extraction over the three levels
pub struct HierarchyWalker<'a> {
    fetcher: &'a PageFetcher,
    domain: Url,
    root_url: Url,
    root_selectors: ListingSelectors,
    child_selectors: ListingSelectors,
    produced: AtomicUsize,
}

impl<'a> HierarchyWalker<'a> {
    /// Creates a walker for the catalog described by `config`
    pub fn new(fetcher: &'a PageFetcher, config: &CrawlerConfig) -> Result<Self, HarvestError> {
        let domain = Url::parse(&config.domain).map_err(|e| {
            crate::ConfigError::InvalidUrl(format!("Invalid domain '{}': {}", config.domain, e))
        })?;
        let root_url = resolve(&domain, &config.root_path)?;

        Ok(Self {
            fetcher,
            domain,
            root_url,
            root_selectors: ListingSelectors::new(
                &config.body_selector,
                &config.list_selector,
                None,
            )?,
            child_selectors: ListingSelectors::new(
                &config.body_selector,
                &config.list_selector,
                Some(config.child_list_class.as_str()),
            )?,
            produced: AtomicUsize::new(0),
        })
    }

    /// Number of entries extracted so far, across all levels
    pub fn produced(&self) -> usize {
        self.produced.load(Ordering::Relaxed)
    }

    /// Walks the whole catalog
    ///
    /// Any terminal failure in any branch ends the walk with that error
    /// once the current stage's in-flight expansions have all finished;
    /// nothing is returned from a partial walk.
    pub async fn walk(&self) -> Result<Catalog, HarvestError> {
        let mut catalog = Catalog::default();
        let mut stage = Stage::Root;

        loop {
            tracing::info!("Entering stage: {}", stage);
            stage = match stage {
                Stage::Root => {
                    let entries = self
                        .read_listing(self.root_url.as_str(), &self.root_selectors)
                        .await?;
                    catalog.categories = entries
                        .into_iter()
                        .map(|entry| Arc::new(Category::new(entry)))
                        .collect();
                    tracing::info!("Found {} categories", catalog.categories.len());
                    Stage::Subcategories
                }
                Stage::Subcategories => {
                    let subcategories: Vec<SubCategory> =
                        self.expand(&catalog.categories).await?;
                    catalog.subcategories = subcategories.into_iter().map(Arc::new).collect();
                    tracing::info!("Found {} subcategories", catalog.subcategories.len());
                    Stage::Codes
                }
                Stage::Codes => {
                    catalog.diseases = self.expand(&catalog.subcategories).await?;
                    tracing::info!("Found {} codes", catalog.diseases.len());
                    Stage::Done
                }
                Stage::Done => return Ok(catalog),
            };
        }
    }

    /// Expands every parent concurrently and joins on all of them
    ///
    /// Children come back grouped by parent. If any expansion failed, the
    /// first failure in parent order is returned after the join.
    async fn expand<C>(&self, parents: &[Arc<C::Parent>]) -> Result<Vec<C>, HarvestError>
    where
        C: Child,
    {
        let expansions = parents.iter().map(|parent| self.expand_one::<C>(parent));
        let results = join_all(expansions).await;

        let mut children = Vec::new();
        for result in results {
            children.extend(result?);
        }
        Ok(children)
    }

    /// Fetches one parent's listing and links its children back to it
    async fn expand_one<C>(&self, parent: &Arc<C::Parent>) -> Result<Vec<C>, HarvestError>
    where
        C: Child,
    {
        let entry = parent.entry();
        let href = entry
            .child_url()
            .filter(|_| !entry.name.trim().is_empty())
            .ok_or_else(|| ExtractionError::Unlinked {
                name: entry.name.clone(),
            })?;
        let url = resolve(&self.domain, href)?;

        tracing::debug!("Expanding {} into {} entries", entry.name, C::LEVEL);
        let entries = self.read_listing(url.as_str(), &self.child_selectors).await?;

        Ok(entries
            .into_iter()
            .map(|entry| C::attach(entry, parent))
            .collect())
    }

    /// Fetches and extracts one page, numbering each entry as it is read
    async fn read_listing(
        &self,
        url: &str,
        selectors: &ListingSelectors,
    ) -> Result<Vec<Entry>, HarvestError> {
        let html = self.fetcher.fetch(url).await?;
        let entries = extract_entries(&html, selectors, url)?;

        for entry in &entries {
            let seq = self.produced.fetch_add(1, Ordering::Relaxed) + 1;
            tracing::debug!("{}\t{} {}", seq, entry.name, entry.description);
        }

        Ok(entries)
    }
}

/// Joins a catalog link onto the domain
fn resolve(domain: &Url, href: &str) -> Result<Url, ExtractionError> {
    domain.join(href).map_err(|source| ExtractionError::InvalidLink {
        href: href.to_string(),
        base: domain.to_string(),
        source,
    })
}
