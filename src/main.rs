//! stardeps main entry point
//!
//! Command-line interface for scraping a GitHub repository's dependents
//! listing and ranking the results by stars.

use anyhow::Context;
use clap::Parser;
use stardeps::cache::{HttpCache, NoopCache, ResponseCache};
use stardeps::config::{ClientConfig, DependentType, PackageMissPolicy, ScrapeOptions};
use stardeps::output::{
    display_project_info, display_report, BarProgress, NoopProgress, OutputFormat, ProgressSink,
};
use stardeps::scrape::DependentsScraper;
use tracing_subscriber::EnvFilter;

/// Rank a GitHub repository's dependents by stars
///
/// Scrapes GitHub's dependents listing page by page and prints the
/// top dependents as a table or JSON.
#[derive(Parser, Debug)]
#[command(name = "stardeps")]
#[command(version)]
#[command(about = "Rank a GitHub repository's dependents by stars", long_about = None)]
struct Cli {
    /// Repository to query: "owner/repo" or a full GitHub URL
    #[arg(value_name = "REPO")]
    repo: String,

    /// List dependent packages instead of repositories
    #[arg(long)]
    packages: bool,

    /// Emit JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Number of rows to show
    #[arg(long, default_value_t = 10)]
    rows: usize,

    /// Minimum number of stars
    #[arg(long = "minstar", default_value_t = 5)]
    min_stars: u32,

    /// Restrict to dependents of this named package
    #[arg(long = "package", value_name = "NAME")]
    package_name: Option<String>,

    /// Continue unfiltered when the requested package is not found,
    /// instead of aborting
    #[arg(long, requires = "package_name")]
    fallback_unfiltered: bool,

    /// Upper bound on pages fetched before the run fails loudly
    #[arg(long, default_value_t = 1000)]
    max_pages: usize,

    /// GitHub token (also read from GITHUB_TOKEN or GHTOPDEP_TOKEN)
    #[arg(long, env = "GITHUB_TOKEN")]
    token: Option<String>,

    /// Skip the on-disk response cache for this run
    #[arg(long)]
    no_cache: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    // Token is accepted and validated here at the boundary; the dependents
    // listing itself is served unauthenticated.
    let token = cli
        .token
        .clone()
        .or_else(|| std::env::var("GHTOPDEP_TOKEN").ok());
    if token.is_none() {
        anyhow::bail!(
            "GitHub token is required. Use --token or set the GITHUB_TOKEN environment variable"
        );
    }

    let options = ScrapeOptions {
        dependent_type: if cli.packages {
            DependentType::Packages
        } else {
            DependentType::Repositories
        },
        rows: cli.rows,
        min_stars: cli.min_stars,
        package_name: cli.package_name.clone(),
        on_package_miss: if cli.fallback_unfiltered {
            PackageMissPolicy::FallbackUnfiltered
        } else {
            PackageMissPolicy::Abort
        },
        max_pages: cli.max_pages,
        token,
    };

    let cache: Box<dyn ResponseCache> = if cli.no_cache {
        Box::new(NoopCache)
    } else {
        match HttpCache::open_default() {
            Ok(cache) => Box::new(cache),
            Err(e) => {
                tracing::warn!("Response cache unavailable ({}); running uncached", e);
                Box::new(NoopCache)
            }
        }
    };

    let scraper = DependentsScraper::new(&ClientConfig::default(), cache)
        .context("Failed to initialize scraper")?;

    // The bar would garble piped JSON output
    let mut progress: Box<dyn ProgressSink> = if cli.json || cli.quiet {
        Box::new(NoopProgress)
    } else {
        Box::new(BarProgress::new())
    };

    let report = scraper
        .get_dependents(&cli.repo, &options, progress.as_mut())
        .await?;

    let entity_label = options.dependent_type.entity_label();
    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Table
    };

    if format == OutputFormat::Table {
        display_project_info(&cli.repo, entity_label, options.package_name.as_deref());
    }
    display_report(&report, entity_label, format);

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("stardeps=warn"),
            1 => EnvFilter::new("stardeps=info,warn"),
            2 => EnvFilter::new("stardeps=debug,info"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
