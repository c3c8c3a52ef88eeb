//! Post-aggregation ranking
//!
//! Collapses cross-page duplicates (GitHub's pagination can overlap when the
//! listing changes mid-run), sorts by stars descending, and caps the row
//! count. Sorting is stable, so entries with equal stars keep their
//! discovery order and identical input always ranks identically.

use crate::scrape::parser::DependentEntry;
use std::collections::HashSet;

/// Removes entries whose URL was already seen, keeping the first-seen star
/// count and the original order
pub fn dedup_by_url(entries: Vec<DependentEntry>) -> Vec<DependentEntry> {
    let mut seen: HashSet<String> = HashSet::new();
    entries
        .into_iter()
        .filter(|entry| seen.insert(entry.url.clone()))
        .collect()
}

/// Sorts by stars descending (stable) and truncates to `rows`
pub fn rank_by_stars(entries: &[DependentEntry], rows: usize) -> Vec<DependentEntry> {
    let mut ranked = entries.to_vec();
    ranked.sort_by(|a, b| b.stars.cmp(&a.stars));
    ranked.truncate(rows);
    ranked
}
