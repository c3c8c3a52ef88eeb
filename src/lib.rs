//! Stardeps: rank a GitHub repository's dependents by stars
//!
//! This crate scrapes GitHub's "dependents" listing page (an HTML page GitHub
//! renders, not a documented API), paginates through it, extracts dependent
//! repository URLs and star counts, and produces a star-ranked result set
//! alongside a natural-discovery-order view.

pub mod cache;
pub mod config;
pub mod output;
pub mod repo;
pub mod scrape;

use thiserror::Error;

/// Main error type for stardeps operations
#[derive(Debug, Error)]
pub enum StardepsError {
    #[error("Invalid input: {0}")]
    Input(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTTP status {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Rate limited on {url} after {attempts} attempts")]
    RateLimited { url: String, attempts: u32 },

    #[error("Package '{package}' not found; available packages: {available:?}")]
    PackageNotFound {
        package: String,
        available: Vec<String>,
    },

    #[error("Pagination exceeded the {limit} page limit; GitHub's markup may have changed")]
    PageLimitExceeded { limit: usize },

    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for stardeps operations
pub type Result<T> = std::result::Result<T, StardepsError>;

// Re-export commonly used types
pub use cache::{HttpCache, NoopCache, ResponseCache};
pub use config::{
    ClientConfig, DependentType, HttpConfig, PackageMissPolicy, ScrapeOptions, SelectorConfig,
};
pub use output::{BarProgress, NoopProgress, OutputFormat, ProgressSink};
pub use repo::RepoRef;
pub use scrape::{
    get_dependents, AggregateStats, DependentEntry, DependentsReport, DependentsScraper,
    PackageInfo,
};
