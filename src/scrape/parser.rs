//! HTML parser for GitHub's dependents listing
//!
//! Three independent operations over one fetched document:
//! - total dependents counter (progress estimate)
//! - listing rows (URL + star count per dependent)
//! - next-page link (pagination termination)
//!
//! Extraction is best-effort throughout: a missing counter parses as zero and
//! a row without a star badge is skipped, never an error. GitHub renders
//! private or inaccessible dependents without a star badge, so absence is a
//! normal state of the page.

use crate::config::SelectorConfig;
use crate::{Result, StardepsError};
use regex::Regex;
use scraper::{Html, Selector};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::LazyLock;
use url::Url;

static DIGIT_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\d,]+").expect("valid literal regex"));

/// One dependent parsed from a listing row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependentEntry {
    /// Absolute repository URL
    pub url: String,
    /// Star count shown next to the row
    pub stars: u32,
}

/// Everything extracted from one page's listing rows
#[derive(Debug, Clone, Default)]
pub struct PageEntries {
    /// Entries that passed the star threshold and self/duplicate checks,
    /// in document order
    pub entries: Vec<DependentEntry>,

    /// Every listing row encountered, including rows skipped for having no
    /// star badge
    pub total_rows_seen: u64,

    /// Rows with a star count greater than zero, regardless of threshold
    pub with_stars_count: u64,
}

/// Compiled selectors for the dependents page markup.
///
/// Built once from a [`SelectorConfig`] data table; an invalid selector
/// string is caught here, at construction, rather than at parse time.
#[derive(Debug, Clone)]
pub struct SelectorTable {
    pub dependents_count: Selector,
    pub pagination_link: Selector,
    pub dependent_row: Selector,
    pub repo_link: Selector,
    pub stars: Selector,
    pub package_option: Selector,
    pub package_name: Selector,
    pub package_filter_summary: Selector,
}

impl SelectorTable {
    pub fn compile(config: &SelectorConfig) -> Result<Self> {
        Ok(Self {
            dependents_count: compile_selector(&config.dependents_count)?,
            pagination_link: compile_selector(&config.pagination_link)?,
            dependent_row: compile_selector(&config.dependent_row)?,
            repo_link: compile_selector(&config.repo_link)?,
            stars: compile_selector(&config.stars)?,
            package_option: compile_selector(&config.package_option)?,
            package_name: compile_selector(&config.package_name)?,
            package_filter_summary: compile_selector(&config.package_filter_summary)?,
        })
    }
}

fn compile_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| StardepsError::Selector {
        selector: selector.to_string(),
        message: e.to_string(),
    })
}

/// Parser for one dependents listing document
#[derive(Debug, Clone)]
pub struct DependentsParser {
    selectors: SelectorTable,
    base_url: Url,
}

impl DependentsParser {
    pub fn new(selectors: SelectorTable, base_url: Url) -> Self {
        Self {
            selectors,
            base_url,
        }
    }

    /// Extracts the total dependents count GitHub displays above the listing.
    ///
    /// Takes the first run of digits (commas stripped) from the counter
    /// element's text. Returns 0 if the element or digits are absent; the
    /// count is a display estimate, so "unknown" and "zero" are equivalent.
    pub fn parse_total_count(&self, html: &str) -> u64 {
        let document = Html::parse_document(html);
        let Some(element) = document.select(&self.selectors.dependents_count).next() else {
            return 0;
        };
        let text = element.text().collect::<String>();
        DIGIT_RUN
            .find(&text)
            .and_then(|m| m.as_str().replace(',', "").parse().ok())
            .unwrap_or(0)
    }

    /// Extracts dependent entries from every listing row in the document.
    ///
    /// Rows are walked top to bottom and output order matches document order.
    /// A row is emitted only if its star count passes `min_stars`, its link
    /// resolves to an absolute URL distinct from `self_url`, and that URL has
    /// not already been emitted from this page (intra-page dedup; cross-page
    /// dedup happens after aggregation).
    pub fn parse_entries(&self, html: &str, min_stars: u32, self_url: &str) -> PageEntries {
        let document = Html::parse_document(html);
        let mut page = PageEntries::default();
        let mut seen: HashSet<String> = HashSet::new();

        for row in document.select(&self.selectors.dependent_row) {
            page.total_rows_seen += 1;

            // Private or inaccessible dependents render without a star badge
            let Some(star_element) = row.select(&self.selectors.stars).next() else {
                continue;
            };
            let star_text = star_element.text().collect::<String>();
            let Some(stars) = parse_star_count(&star_text) else {
                continue;
            };

            if stars > 0 {
                page.with_stars_count += 1;
            }
            if stars < min_stars {
                continue;
            }

            let Some(href) = row
                .select(&self.selectors.repo_link)
                .next()
                .and_then(|link| link.value().attr("href"))
            else {
                continue;
            };
            let Some(url) = resolve_repo_url(href, &self.base_url) else {
                continue;
            };

            if url == self_url || !seen.insert(url.clone()) {
                continue;
            }
            page.entries.push(DependentEntry { url, stars });
        }

        page
    }

    /// Extracts the next-page URL from the pagination controls.
    ///
    /// The document exposes zero, one, or two pagination links. Two means
    /// Previous and Next are both present, so the second is Next. One means
    /// either a lone Previous (terminal page) or a lone Next (first page of
    /// several); the link's visible label disambiguates. Zero means a
    /// single-page listing.
    pub fn parse_next_page_url(&self, html: &str) -> Option<String> {
        let document = Html::parse_document(html);
        let links: Vec<_> = document.select(&self.selectors.pagination_link).collect();

        match links.as_slice() {
            [_, next] => next.value().attr("href").map(str::to_string),
            [only] => {
                let label = only.text().collect::<String>();
                if label.trim() == "Next" {
                    only.value().attr("href").map(str::to_string)
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    pub(crate) fn selectors(&self) -> &SelectorTable {
        &self.selectors
    }

    pub(crate) fn base_url(&self) -> &Url {
        &self.base_url
    }
}

/// Parses a star badge's text into a count.
///
/// Thousands separators are stripped and the leading digit run is taken, so
/// `" 1,205 "` parses to 1205. Returns `None` when no digits lead the text.
fn parse_star_count(text: &str) -> Option<u32> {
    let cleaned = text.trim().replace(',', "");
    let digits: String = cleaned.chars().take_while(char::is_ascii_digit).collect();
    if digits.is_empty() {
        None
    } else {
        digits.parse().ok()
    }
}

/// Resolves a row's href into an absolute URL against the site base
fn resolve_repo_url(href: &str, base: &Url) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    base.join(href).ok().map(|url| url.to_string())
}
