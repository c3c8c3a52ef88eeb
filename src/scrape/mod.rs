//! Scrape pipeline for GitHub's dependents listing
//!
//! This module contains the core pipeline:
//! - HTTP fetching with cache short-circuit and 429 backoff
//! - HTML parsing of counter, listing rows, and pagination
//! - Package name resolution to a `package_id` query parameter
//! - Sequential pagination aggregation
//! - Dedup, star ranking, and truncation

mod aggregator;
mod fetcher;
mod parser;
mod ranking;
mod resolver;

pub use aggregator::{AggregateStats, Aggregator, ScrapeOutcome};
pub use fetcher::PageFetcher;
pub use parser::{DependentEntry, DependentsParser, PageEntries, SelectorTable};
pub use ranking::{dedup_by_url, rank_by_stars};
pub use resolver::{PackageInfo, PackageResolver};

use crate::cache::{HttpCache, NoopCache, ResponseCache};
use crate::config::{validate_client_config, validate_options, ClientConfig, PackageMissPolicy, ScrapeOptions};
use crate::output::{NoopProgress, ProgressSink};
use crate::repo::RepoRef;
use crate::{Result, StardepsError};
use serde::Serialize;
use url::Url;

/// Final result of a scrape run
#[derive(Debug, Clone, Serialize)]
pub struct DependentsReport {
    /// Dependents sorted by stars descending, deduplicated, capped at the
    /// requested row count
    pub repositories: Vec<DependentEntry>,

    /// The same accumulated set in natural discovery order (GitHub's own
    /// listing order), capped at the same row count
    pub latest_dependents: Vec<DependentEntry>,

    /// Row totals across all fetched pages
    pub stats: AggregateStats,
}

/// Scraper for a GitHub-style dependents listing
///
/// Holds the HTTP client, compiled selectors, and site base URL; individual
/// runs are parameterized by [`ScrapeOptions`].
pub struct DependentsScraper {
    fetcher: PageFetcher,
    parser: DependentsParser,
    base_url: Url,
}

impl DependentsScraper {
    /// Creates a scraper from boundary-constructed configuration and a
    /// response cache implementation
    pub fn new(config: &ClientConfig, cache: Box<dyn ResponseCache>) -> Result<Self> {
        validate_client_config(config)?;
        let base_url = Url::parse(&config.base_url)?;
        let fetcher = PageFetcher::new(&config.http, cache)?;
        let selectors = SelectorTable::compile(&config.selectors)?;
        let parser = DependentsParser::new(selectors, base_url.clone());

        Ok(Self {
            fetcher,
            parser,
            base_url,
        })
    }

    /// Scrapes all dependents of `repo` and returns the ranked report.
    ///
    /// `repo` is `owner/name` or a full repository URL; malformed input
    /// fails before any network activity. Progress events go to `progress`
    /// as pages arrive.
    pub async fn get_dependents(
        &self,
        repo: &str,
        options: &ScrapeOptions,
        progress: &mut dyn ProgressSink,
    ) -> Result<DependentsReport> {
        validate_options(options)?;
        let repo_ref = RepoRef::parse(repo)?;
        let repo_url = repo_ref.canonical_url(&self.base_url)?;
        tracing::info!("Scraping dependents of {}", repo_url);

        let initial_url = self.build_initial_url(&repo_url, options).await?;

        let aggregator = Aggregator::new(
            &self.fetcher,
            &self.parser,
            options.min_stars,
            options.max_pages,
        );
        let outcome = aggregator.run(&initial_url, &repo_url, progress).await?;

        let latest = dedup_by_url(outcome.entries);
        let repositories = rank_by_stars(&latest, options.rows);
        let mut latest_dependents = latest;
        latest_dependents.truncate(options.rows);

        Ok(DependentsReport {
            repositories,
            latest_dependents,
            stats: outcome.stats,
        })
    }

    /// Computes the first page URL, resolving the package filter if one was
    /// requested.
    ///
    /// With a package name the base page is fetched once (cache applies) to
    /// check that filtering exists and is not already in effect before
    /// resolving the name to an id. A resolution miss is handled per the
    /// configured [`PackageMissPolicy`].
    async fn build_initial_url(&self, repo_url: &str, options: &ScrapeOptions) -> Result<String> {
        let unfiltered = format!(
            "{repo_url}/network/dependents?dependent_type={}",
            options.dependent_type.query_value()
        );

        let Some(package_name) = &options.package_name else {
            return Ok(unfiltered);
        };

        tracing::info!("Looking for package: {}", package_name);
        let html = self.fetcher.fetch(&unfiltered).await?;
        let resolver =
            PackageResolver::new(&self.fetcher, self.parser.selectors(), self.parser.base_url());

        if !resolver.has_package_filter(&html) {
            tracing::warn!(
                "Package filtering is not available for this repository; continuing unfiltered"
            );
            return Ok(unfiltered);
        }

        if resolver.is_already_filtered_by(&html, package_name) {
            tracing::info!("Listing already scoped to package '{}'", package_name);
            return Ok(unfiltered);
        }

        let info = resolver.resolve(repo_url, package_name).await?;
        match info.resolved_id {
            Some(id) => {
                tracing::info!("Resolved package '{}' to id {}", package_name, id);
                Ok(format!(
                    "{repo_url}/network/dependents?package_id={id}&dependent_type={}",
                    options.dependent_type.query_value()
                ))
            }
            None => match options.on_package_miss {
                PackageMissPolicy::Abort => Err(StardepsError::PackageNotFound {
                    package: package_name.clone(),
                    available: info.available_packages,
                }),
                PackageMissPolicy::FallbackUnfiltered => {
                    tracing::warn!(
                        "Package '{}' not found (available: {:?}); continuing unfiltered",
                        package_name,
                        info.available_packages
                    );
                    Ok(unfiltered)
                }
            },
        }
    }
}

/// Convenience entry point: scrapes with default configuration, the default
/// on-disk cache, and no progress reporting.
///
/// Embedders wanting a progress bar, a custom cache, or a different base URL
/// construct a [`DependentsScraper`] directly.
pub async fn get_dependents(repo: &str, options: &ScrapeOptions) -> Result<DependentsReport> {
    let cache: Box<dyn ResponseCache> = match HttpCache::open_default() {
        Ok(cache) => Box::new(cache),
        Err(e) => {
            tracing::warn!("Response cache unavailable ({}); running uncached", e);
            Box::new(NoopCache)
        }
    };
    let scraper = DependentsScraper::new(&ClientConfig::default(), cache)?;
    scraper.get_dependents(repo, options, &mut NoopProgress).await
}
