use std::time::Duration;

/// Which kind of dependents to scrape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DependentType {
    #[default]
    Repositories,
    Packages,
}

impl DependentType {
    /// Value of the `dependent_type` query parameter GitHub expects
    pub fn query_value(&self) -> &'static str {
        match self {
            Self::Repositories => "REPOSITORY",
            Self::Packages => "PACKAGE",
        }
    }

    /// Human-readable entity label for output ("repositories" or "packages")
    pub fn entity_label(&self) -> &'static str {
        match self {
            Self::Repositories => "repositories",
            Self::Packages => "packages",
        }
    }
}

/// What to do when a requested package name cannot be resolved to a
/// `package_id`.
///
/// Both behaviors exist in the wild; the caller picks one explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PackageMissPolicy {
    /// Abort the run with an error carrying the available package names
    #[default]
    Abort,
    /// Log the available names and scrape the unfiltered listing instead
    FallbackUnfiltered,
}

/// Options for a single scrape run
#[derive(Debug, Clone)]
pub struct ScrapeOptions {
    /// Kind of dependents to list
    pub dependent_type: DependentType,

    /// Maximum number of rows in the final result set
    pub rows: usize,

    /// Minimum star count for an entry to be included
    pub min_stars: u32,

    /// Restrict the listing to dependents of this named package
    pub package_name: Option<String>,

    /// Behavior when `package_name` cannot be resolved
    pub on_package_miss: PackageMissPolicy,

    /// Hard ceiling on pages fetched; exceeding it is an error rather than
    /// an unbounded loop if GitHub's pagination markup changes
    pub max_pages: usize,

    /// GitHub token, accepted and validated at the boundary. The dependents
    /// listing itself is served unauthenticated, so the scrape flow never
    /// sends it.
    pub token: Option<String>,
}

impl Default for ScrapeOptions {
    fn default() -> Self {
        Self {
            dependent_type: DependentType::Repositories,
            rows: 10,
            min_stars: 5,
            package_name: None,
            on_package_miss: PackageMissPolicy::Abort,
            max_pages: 1000,
            token: None,
        }
    }
}

/// HTTP client behavior
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Identifying `User-Agent` header sent with every request
    pub user_agent: String,

    /// Per-request timeout
    pub timeout: Duration,

    /// Connection timeout
    pub connect_timeout: Duration,

    /// Maximum request attempts on HTTP 429 before giving up
    pub max_retries: u32,

    /// Base backoff delay; retry N waits `base * 2^N`. Production keeps the
    /// 1s default; tests shrink it.
    pub backoff_base: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            max_retries: 15,
            backoff_base: Duration::from_secs(1),
        }
    }
}

/// CSS selector strings coupling the parser to GitHub's dependents markup.
///
/// Kept as a plain data table so a markup change means updating strings, not
/// logic, and so tests can substitute fixture-specific tables.
#[derive(Debug, Clone)]
pub struct SelectorConfig {
    /// Element whose text holds the total dependents counter
    pub dependents_count: String,

    /// Pagination links (zero, one, or two: Previous and/or Next)
    pub pagination_link: String,

    /// One listing row per dependent
    pub dependent_row: String,

    /// Repository link within a row
    pub repo_link: String,

    /// Star count badge within a row
    pub stars: String,

    /// One dropdown option per package, carrying a `package_id` href
    pub package_option: String,

    /// Display name within a package option
    pub package_name: String,

    /// Dropdown button that exists only when package filtering is available
    pub package_filter_summary: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            dependents_count: ".table-list-header-toggle .btn-link.selected".to_string(),
            pagination_link: "#dependents > div.paginate-container > div > a".to_string(),
            dependent_row: "#dependents > div.Box > div.flex-items-center".to_string(),
            repo_link: "span > a.text-bold".to_string(),
            stars: "div > span:nth-child(1)".to_string(),
            package_option: r#"a.select-menu-item[href*="package_id"]"#.to_string(),
            package_name: ".select-menu-item-text".to_string(),
            package_filter_summary: "#dependents .select-menu .select-menu-button".to_string(),
        }
    }
}

/// Everything a scraper instance needs beyond per-run options
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Site base URL; relative listing links are resolved against it
    pub base_url: String,

    pub http: HttpConfig,
    pub selectors: SelectorConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://github.com".to_string(),
            http: HttpConfig::default(),
            selectors: SelectorConfig::default(),
        }
    }
}
