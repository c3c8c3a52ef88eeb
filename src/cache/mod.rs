//! Response caching for fetched pages
//!
//! The fetcher consults a cache before touching the network and writes every
//! successful body back into it. The cache operates purely on raw response
//! bodies keyed by exact request URL; freshness and storage medium are its
//! own concern, opaque to the fetcher.

mod http_cache;

pub use http_cache::HttpCache;

/// Storage abstraction for raw HTTP response bodies keyed by request URL
pub trait ResponseCache: Send + Sync {
    /// Returns the cached body for `url`, or `None` on miss or staleness
    fn get(&self, url: &str) -> Option<String>;

    /// Stores the body for `url`. Failures are the implementation's problem;
    /// they must never abort the run.
    fn set(&self, url: &str, body: &str);
}

/// Cache that never hits and never stores; used by tests and `--no-cache`
pub struct NoopCache;

impl ResponseCache for NoopCache {
    fn get(&self, _url: &str) -> Option<String> {
        None
    }

    fn set(&self, _url: &str, _body: &str) {}
}
