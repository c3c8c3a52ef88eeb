//! Package name resolution
//!
//! Multi-package repositories let the dependents listing be narrowed to one
//! package via a `package_id` query parameter. The id is not guessable from
//! the name; it has to be read out of the package dropdown embedded in the
//! dependents page. A name that is not among the options is a normal result,
//! not an error; the orchestrator decides what to do with a miss.

use crate::scrape::fetcher::PageFetcher;
use crate::scrape::parser::SelectorTable;
use crate::Result;
use scraper::Html;
use url::Url;

/// Outcome of resolving a package name against the dropdown options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageInfo {
    /// The `package_id` query value for the requested name, if found
    pub resolved_id: Option<String>,

    /// Every package name present in the dropdown, in document order;
    /// reported to the user on a miss
    pub available_packages: Vec<String>,
}

/// Resolves package names to `package_id` query values
pub struct PackageResolver<'a> {
    fetcher: &'a PageFetcher,
    selectors: &'a SelectorTable,
    base_url: &'a Url,
}

impl<'a> PackageResolver<'a> {
    pub fn new(fetcher: &'a PageFetcher, selectors: &'a SelectorTable, base_url: &'a Url) -> Self {
        Self {
            fetcher,
            selectors,
            base_url,
        }
    }

    /// Fetches the base dependents page (through the fetcher, so the cache
    /// applies) and scans its package dropdown for `package_name`.
    pub async fn resolve(&self, repo_url: &str, package_name: &str) -> Result<PackageInfo> {
        let html = self
            .fetcher
            .fetch(&format!("{repo_url}/network/dependents"))
            .await?;
        Ok(self.scan_packages(&html, package_name))
    }

    /// Scans an already-fetched document's dropdown for `package_name`.
    ///
    /// Each option contributes its display name; the id is taken from the
    /// `package_id` query parameter of the exactly-matching option's href.
    pub fn scan_packages(&self, html: &str, package_name: &str) -> PackageInfo {
        let document = Html::parse_document(html);
        let mut available_packages = Vec::new();
        let mut resolved_id = None;

        for option in document.select(&self.selectors.package_option) {
            let name = option
                .select(&self.selectors.package_name)
                .next()
                .map(|e| e.text().collect::<String>().trim().to_string())
                .unwrap_or_default();
            if name.is_empty() {
                continue;
            }

            if name == package_name && resolved_id.is_none() {
                resolved_id = option
                    .value()
                    .attr("href")
                    .and_then(|href| self.package_id_from_href(href));
            }
            available_packages.push(name);
        }

        PackageInfo {
            resolved_id,
            available_packages,
        }
    }

    /// Whether the document offers package-scoped filtering at all.
    /// Single-package repositories render no dropdown.
    pub fn has_package_filter(&self, html: &str) -> bool {
        let document = Html::parse_document(html);
        document
            .select(&self.selectors.package_filter_summary)
            .next()
            .is_some()
    }

    /// Whether the currently-loaded page is already scoped to
    /// `package_name`, making a resolve-and-refetch round trip redundant
    pub fn is_already_filtered_by(&self, html: &str, package_name: &str) -> bool {
        let document = Html::parse_document(html);
        document
            .select(&self.selectors.package_filter_summary)
            .next()
            .map(|summary| {
                summary
                    .text()
                    .collect::<String>()
                    .trim()
                    .contains(package_name)
            })
            .unwrap_or(false)
    }

    fn package_id_from_href(&self, href: &str) -> Option<String> {
        let url = self.base_url.join(href).ok()?;
        url.query_pairs()
            .find(|(key, _)| key == "package_id")
            .map(|(_, value)| value.into_owned())
    }
}
