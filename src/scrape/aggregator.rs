//! Pagination aggregator
//!
//! Drives fetch + parse across the listing's pages, strictly sequentially:
//! each page's URL comes from the previous page's Next link, so nothing can
//! be in flight concurrently. Accumulates entries and running totals, feeds
//! a progress sink, and stops when the parser reports no next link. A page
//! ceiling guards against markup changes that would otherwise loop forever.
//!
//! The run is all-or-nothing: any fetch failure propagates out and the
//! partial accumulation is discarded.

use crate::output::ProgressSink;
use crate::scrape::fetcher::PageFetcher;
use crate::scrape::parser::{DependentEntry, DependentsParser};
use crate::{Result, StardepsError};
use serde::Serialize;

/// Running totals across all fetched pages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AggregateStats {
    /// Listing rows encountered, including rows excluded for having no
    /// visible star count
    pub total_count: u64,

    /// Rows with more than zero stars, regardless of the threshold
    pub with_stars_count: u64,
}

/// Accumulated output of a full pagination run, prior to ranking
#[derive(Debug, Clone)]
pub struct ScrapeOutcome {
    /// All emitted entries in discovery order (page order, then document
    /// order within each page)
    pub entries: Vec<DependentEntry>,

    pub stats: AggregateStats,
}

/// Sequential page-by-page aggregator
pub struct Aggregator<'a> {
    fetcher: &'a PageFetcher,
    parser: &'a DependentsParser,
    min_stars: u32,
    max_pages: usize,
}

impl<'a> Aggregator<'a> {
    pub fn new(
        fetcher: &'a PageFetcher,
        parser: &'a DependentsParser,
        min_stars: u32,
        max_pages: usize,
    ) -> Self {
        Self {
            fetcher,
            parser,
            min_stars,
            max_pages,
        }
    }

    /// Runs the full pagination loop starting from `initial_url`.
    ///
    /// The first page is fetched once and reused for both the total-count
    /// estimate and the first parse pass. The estimate feeds progress
    /// reporting only; loop termination relies solely on the parser
    /// reporting no next link. Progress is clamped to the estimate, which
    /// GitHub may over- or undershoot, and snapped to 100% on the final
    /// page.
    pub async fn run(
        &self,
        initial_url: &str,
        self_url: &str,
        progress: &mut dyn ProgressSink,
    ) -> Result<ScrapeOutcome> {
        let first_html = self.fetcher.fetch(initial_url).await?;
        let expected_total = self.parser.parse_total_count(&first_html);
        tracing::info!("Expecting roughly {} dependents", expected_total);
        progress.start(expected_total);

        let mut entries: Vec<DependentEntry> = Vec::new();
        let mut stats = AggregateStats::default();
        let mut pages_fetched: usize = 0;
        let mut html = first_html;

        loop {
            pages_fetched += 1;
            if pages_fetched > self.max_pages {
                progress.stop();
                return Err(StardepsError::PageLimitExceeded {
                    limit: self.max_pages,
                });
            }

            let page = self.parser.parse_entries(&html, self.min_stars, self_url);
            tracing::debug!(
                "Page {}: {} rows, {} entries kept",
                pages_fetched,
                page.total_rows_seen,
                page.entries.len()
            );
            entries.extend(page.entries);
            stats.total_count += page.total_rows_seen;
            stats.with_stars_count += page.with_stars_count;

            match self.parser.parse_next_page_url(&html) {
                Some(next_url) => {
                    progress.update(stats.total_count.min(expected_total));
                    html = self.fetcher.fetch(&next_url).await?;
                }
                None => {
                    progress.update(expected_total);
                    break;
                }
            }
        }

        progress.stop();
        tracing::info!(
            "Aggregated {} entries over {} pages ({} rows seen)",
            entries.len(),
            pages_fetched,
            stats.total_count
        );
        Ok(ScrapeOutcome { entries, stats })
    }
}
