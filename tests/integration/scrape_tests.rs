//! Integration tests for the dependents scrape pipeline
//!
//! These tests use wiremock to stand in for GitHub and exercise the full
//! fetch → parse → aggregate → rank cycle end-to-end.

use std::time::{Duration, Instant};

use stardeps::cache::{HttpCache, NoopCache};
use stardeps::config::{ClientConfig, HttpConfig, PackageMissPolicy, ScrapeOptions};
use stardeps::output::NoopProgress;
use stardeps::scrape::{DependentsScraper, PageFetcher};
use stardeps::StardepsError;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Builds a listing row the way GitHub renders one: avatar, repository link,
/// star/fork badges. `stars: None` renders a private dependent (no badge).
fn row(href: &str, stars: Option<&str>) -> String {
    match stars {
        Some(stars) => format!(
            r#"<div class="flex-items-center">
                <img class="avatar" src="/avatar.png" />
                <span><a class="text-bold" href="{href}">{href}</a></span>
                <div><span>{stars}</span><span>4</span></div>
            </div>"#
        ),
        None => format!(
            r#"<div class="flex-items-center">
                <img class="avatar" src="/avatar.png" />
                <span><a class="text-bold" href="{href}">{href}</a></span>
            </div>"#
        ),
    }
}

/// Builds a dependents page document around the given rows, pagination links,
/// and optional extra markup (the package dropdown)
fn page(count_text: &str, rows: &[String], pagination: &str, extra: &str) -> String {
    format!(
        r#"<html><body><div id="dependents">
            {extra}
            <div class="table-list-header-toggle">
                <a class="btn-link selected">{count_text}</a>
            </div>
            <div class="Box">{}</div>
            <div class="paginate-container"><div>{pagination}</div></div>
        </div></body></html>"#,
        rows.join("\n")
    )
}

fn package_dropdown(current: &str, options: &[(&str, &str)]) -> String {
    let items: String = options
        .iter()
        .map(|(name, id)| {
            format!(
                r#"<a class="select-menu-item" href="/self/repo/network/dependents?package_id={id}">
                    <span class="select-menu-item-text">{name}</span>
                </a>"#
            )
        })
        .collect();
    format!(
        r#"<div class="select-menu">
            <button class="select-menu-button">Package: {current}</button>
            {items}
        </div>"#
    )
}

/// Scraper pointed at the mock server, uncached, with fast backoff
fn test_scraper(server: &MockServer) -> DependentsScraper {
    let config = ClientConfig {
        base_url: server.uri(),
        http: HttpConfig {
            backoff_base: Duration::from_millis(20),
            ..Default::default()
        },
        ..Default::default()
    };
    DependentsScraper::new(&config, Box::new(NoopCache)).expect("Failed to create scraper")
}

fn test_fetcher(backoff_base: Duration, max_retries: u32) -> PageFetcher {
    let http = HttpConfig {
        backoff_base,
        max_retries,
        ..Default::default()
    };
    PageFetcher::new(&http, Box::new(NoopCache)).expect("Failed to create fetcher")
}

#[tokio::test]
async fn test_single_page_scrape_thresholds_and_stats() {
    let server = MockServer::start().await;

    // Four rows: 500 and 1,200 pass the 100-star threshold, the 0-star row
    // is excluded by it, the badge-less row is skipped entirely
    let rows = vec![
        row("/dep/five-hundred", Some("500")),
        row("/dep/zero", Some("0")),
        row("/dep/twelve-hundred", Some("1,200")),
        row("/dep/private", None),
    ];
    let body = page("4 Repositories", &rows, "", "");

    Mock::given(method("GET"))
        .and(path("/self/repo/network/dependents"))
        .and(query_param("dependent_type", "REPOSITORY"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(1)
        .mount(&server)
        .await;

    let scraper = test_scraper(&server);
    let options = ScrapeOptions {
        min_stars: 100,
        ..Default::default()
    };
    let report = scraper
        .get_dependents("self/repo", &options, &mut NoopProgress)
        .await
        .unwrap();

    assert_eq!(report.stats.total_count, 4);
    assert_eq!(report.stats.with_stars_count, 2);

    // Popularity view: stars descending
    let stars: Vec<_> = report.repositories.iter().map(|e| e.stars).collect();
    assert_eq!(stars, [1200, 500]);
    for entry in &report.repositories {
        assert!(entry.stars >= 100);
    }

    // Recency view: document order
    let latest: Vec<_> = report
        .latest_dependents
        .iter()
        .map(|e| e.stars)
        .collect();
    assert_eq!(latest, [500, 1200]);
}

#[tokio::test]
async fn test_two_page_pagination_terminates_after_second_fetch() {
    let server = MockServer::start().await;
    let page2_url = format!("{}/self/repo/network/dependents?page=2", server.uri());

    // Page 1: Previous + Next present, take the second link
    let page1 = page(
        "4 Repositories",
        &[row("/dep/a", Some("10")), row("/dep/b", Some("30"))],
        &format!(
            r#"<a href="{0}/ignored">Previous</a><a href="{page2_url}">Next</a>"#,
            server.uri()
        ),
        "",
    );
    // Page 2: lone Previous link, terminal
    let page2 = page(
        "4 Repositories",
        &[row("/dep/c", Some("20")), row("/dep/a", Some("10"))],
        &format!(r#"<a href="{}/ignored">Previous</a>"#, server.uri()),
        "",
    );

    Mock::given(method("GET"))
        .and(path("/self/repo/network/dependents"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page2))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/self/repo/network/dependents"))
        .and(query_param("dependent_type", "REPOSITORY"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page1))
        .expect(1)
        .mount(&server)
        .await;

    let scraper = test_scraper(&server);
    let options = ScrapeOptions {
        min_stars: 0,
        ..Default::default()
    };
    let report = scraper
        .get_dependents("self/repo", &options, &mut NoopProgress)
        .await
        .unwrap();

    // /dep/a appears on both pages; cross-page dedup keeps the first
    let urls: Vec<_> = report
        .latest_dependents
        .iter()
        .map(|e| e.url.as_str())
        .collect();
    assert_eq!(
        urls,
        [
            format!("{}/dep/a", server.uri()),
            format!("{}/dep/b", server.uri()),
            format!("{}/dep/c", server.uri()),
        ]
    );
    assert_eq!(report.stats.total_count, 4);

    let stars: Vec<_> = report.repositories.iter().map(|e| e.stars).collect();
    assert_eq!(stars, [30, 20, 10]);

    // Mock expectations verify exactly one fetch per page on drop
}

#[tokio::test]
async fn test_self_reference_never_included() {
    let server = MockServer::start().await;

    let rows = vec![row("/self/repo", Some("9999")), row("/dep/other", Some("10"))];
    let body = page("2 Repositories", &rows, "", "");

    Mock::given(method("GET"))
        .and(path("/self/repo/network/dependents"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&server)
        .await;

    let scraper = test_scraper(&server);
    let options = ScrapeOptions {
        min_stars: 0,
        ..Default::default()
    };
    let report = scraper
        .get_dependents("self/repo", &options, &mut NoopProgress)
        .await
        .unwrap();

    assert_eq!(report.repositories.len(), 1);
    assert_eq!(
        report.repositories[0].url,
        format!("{}/dep/other", server.uri())
    );
}

#[tokio::test]
async fn test_rows_cap_applies_to_both_views() {
    let server = MockServer::start().await;

    let rows: Vec<_> = (1..=8)
        .map(|i| row(&format!("/dep/r{i}"), Some(&(i * 10).to_string())))
        .collect();
    let body = page("8 Repositories", &rows, "", "");

    Mock::given(method("GET"))
        .and(path("/self/repo/network/dependents"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&server)
        .await;

    let scraper = test_scraper(&server);
    let options = ScrapeOptions {
        min_stars: 0,
        rows: 3,
        ..Default::default()
    };
    let report = scraper
        .get_dependents("self/repo", &options, &mut NoopProgress)
        .await
        .unwrap();

    assert_eq!(report.repositories.len(), 3);
    assert_eq!(report.latest_dependents.len(), 3);
    // Top of the popularity view is the global maximum, not the cap's
    assert_eq!(report.repositories[0].stars, 80);
    // Recency view keeps discovery order from the top of the listing
    assert_eq!(report.latest_dependents[0].stars, 10);
}

#[tokio::test]
async fn test_backoff_retries_three_429s_then_succeeds() {
    let server = MockServer::start().await;
    let url = format!("{}/rate-limited", server.uri());

    Mock::given(method("GET"))
        .and(path("/rate-limited"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(3)
        .expect(3)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rate-limited"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let base = Duration::from_millis(20);
    let fetcher = test_fetcher(base, 15);

    let started = Instant::now();
    let body = fetcher.fetch(&url).await.unwrap();
    let elapsed = started.elapsed();

    assert_eq!(body, "ok");
    // Waits of base * (1 + 2 + 4) must have elapsed before the success
    assert!(elapsed >= base * 7, "elapsed only {elapsed:?}");
}

#[tokio::test]
async fn test_rate_limit_exhaustion_fails_with_last_error() {
    let server = MockServer::start().await;
    let url = format!("{}/always-429", server.uri());

    Mock::given(method("GET"))
        .and(path("/always-429"))
        .respond_with(ResponseTemplate::new(429))
        .expect(3)
        .mount(&server)
        .await;

    let fetcher = test_fetcher(Duration::from_millis(1), 3);
    let result = fetcher.fetch(&url).await;

    match result {
        Err(StardepsError::RateLimited { attempts, .. }) => assert_eq!(attempts, 3),
        other => panic!("Expected RateLimited, got {other:?}"),
    }
}

#[tokio::test]
async fn test_non_429_error_propagates_without_retry() {
    let server = MockServer::start().await;
    let url = format!("{}/broken", server.uri());

    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = test_fetcher(Duration::from_millis(1), 15);
    let result = fetcher.fetch(&url).await;

    match result {
        Err(StardepsError::HttpStatus { status, .. }) => assert_eq!(status, 500),
        other => panic!("Expected HttpStatus, got {other:?}"),
    }
}

#[tokio::test]
async fn test_cache_hit_short_circuits_network() {
    let server = MockServer::start().await;
    let url = format!("{}/cached-page", server.uri());

    Mock::given(method("GET"))
        .and(path("/cached-page"))
        .respond_with(ResponseTemplate::new(200).set_body_string("fresh"))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::TempDir::new().unwrap();
    let cache = HttpCache::new(dir.path(), Duration::from_secs(3600)).unwrap();
    let fetcher = PageFetcher::new(&HttpConfig::default(), Box::new(cache)).unwrap();

    assert_eq!(fetcher.fetch(&url).await.unwrap(), "fresh");
    // Second call must be served from the cache; the mock allows one hit
    assert_eq!(fetcher.fetch(&url).await.unwrap(), "fresh");
}

#[tokio::test]
async fn test_page_limit_guard_fails_loudly() {
    let server = MockServer::start().await;
    let loop_url = format!("{}/self/repo/network/dependents?page=loop", server.uri());

    let looping_page = page(
        "100 Repositories",
        &[row("/dep/x", Some("5"))],
        &format!(r#"<a href="{loop_url}">Previous</a><a href="{loop_url}">Next</a>"#),
        "",
    );

    Mock::given(method("GET"))
        .and(path("/self/repo/network/dependents"))
        .respond_with(ResponseTemplate::new(200).set_body_string(looping_page))
        .mount(&server)
        .await;

    let scraper = test_scraper(&server);
    let options = ScrapeOptions {
        min_stars: 0,
        max_pages: 3,
        ..Default::default()
    };
    let result = scraper
        .get_dependents("self/repo", &options, &mut NoopProgress)
        .await;

    assert!(matches!(
        result,
        Err(StardepsError::PageLimitExceeded { limit: 3 })
    ));
}

#[tokio::test]
async fn test_malformed_repo_fails_before_any_request() {
    let server = MockServer::start().await;
    let scraper = test_scraper(&server);

    let result = scraper
        .get_dependents("not a repo!", &ScrapeOptions::default(), &mut NoopProgress)
        .await;

    assert!(matches!(result, Err(StardepsError::Input(_))));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_package_filter_rewrites_initial_url() {
    let server = MockServer::start().await;

    let dropdown = package_dropdown("core", &[("core", "id-core"), ("cli", "id-cli")]);
    let base_page = page(
        "2 Repositories",
        &[row("/dep/unfiltered", Some("7"))],
        "",
        &dropdown,
    );
    let filtered_page = page(
        "1 Repositories",
        &[row("/dep/cli-user", Some("42"))],
        "",
        &dropdown,
    );

    // Most specific first: wiremock picks the first mounted match
    Mock::given(method("GET"))
        .and(path("/self/repo/network/dependents"))
        .and(query_param("package_id", "id-cli"))
        .respond_with(ResponseTemplate::new(200).set_body_string(filtered_page))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/self/repo/network/dependents"))
        .respond_with(ResponseTemplate::new(200).set_body_string(base_page))
        .mount(&server)
        .await;

    let scraper = test_scraper(&server);
    let options = ScrapeOptions {
        min_stars: 0,
        package_name: Some("cli".to_string()),
        ..Default::default()
    };
    let report = scraper
        .get_dependents("self/repo", &options, &mut NoopProgress)
        .await
        .unwrap();

    assert_eq!(report.repositories.len(), 1);
    assert_eq!(
        report.repositories[0].url,
        format!("{}/dep/cli-user", server.uri())
    );
}

#[tokio::test]
async fn test_package_miss_abort_lists_available_names() {
    let server = MockServer::start().await;

    let dropdown = package_dropdown("core", &[("core", "id-core"), ("cli", "id-cli")]);
    let base_page = page("1 Repositories", &[row("/dep/a", Some("3"))], "", &dropdown);

    Mock::given(method("GET"))
        .and(path("/self/repo/network/dependents"))
        .respond_with(ResponseTemplate::new(200).set_body_string(base_page))
        .mount(&server)
        .await;

    let scraper = test_scraper(&server);
    let options = ScrapeOptions {
        package_name: Some("nope".to_string()),
        on_package_miss: PackageMissPolicy::Abort,
        ..Default::default()
    };
    let result = scraper
        .get_dependents("self/repo", &options, &mut NoopProgress)
        .await;

    match result {
        Err(StardepsError::PackageNotFound { package, available }) => {
            assert_eq!(package, "nope");
            assert_eq!(available, ["core", "cli"]);
        }
        other => panic!("Expected PackageNotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn test_package_miss_fallback_scrapes_unfiltered() {
    let server = MockServer::start().await;

    let dropdown = package_dropdown("core", &[("core", "id-core")]);
    let base_page = page(
        "1 Repositories",
        &[row("/dep/unfiltered", Some("11"))],
        "",
        &dropdown,
    );

    Mock::given(method("GET"))
        .and(path("/self/repo/network/dependents"))
        .respond_with(ResponseTemplate::new(200).set_body_string(base_page))
        .mount(&server)
        .await;

    let scraper = test_scraper(&server);
    let options = ScrapeOptions {
        min_stars: 0,
        package_name: Some("nope".to_string()),
        on_package_miss: PackageMissPolicy::FallbackUnfiltered,
        ..Default::default()
    };
    let report = scraper
        .get_dependents("self/repo", &options, &mut NoopProgress)
        .await
        .unwrap();

    assert_eq!(report.repositories.len(), 1);
    assert_eq!(
        report.repositories[0].url,
        format!("{}/dep/unfiltered", server.uri())
    );
}

#[tokio::test]
async fn test_package_request_without_filter_continues_unfiltered() {
    let server = MockServer::start().await;

    // No dropdown anywhere: single-package repository
    let base_page = page("1 Repositories", &[row("/dep/only", Some("6"))], "", "");

    Mock::given(method("GET"))
        .and(path("/self/repo/network/dependents"))
        .respond_with(ResponseTemplate::new(200).set_body_string(base_page))
        .mount(&server)
        .await;

    let scraper = test_scraper(&server);
    let options = ScrapeOptions {
        min_stars: 0,
        package_name: Some("anything".to_string()),
        ..Default::default()
    };
    let report = scraper
        .get_dependents("self/repo", &options, &mut NoopProgress)
        .await
        .unwrap();

    assert_eq!(report.repositories.len(), 1);
}

#[tokio::test]
async fn test_already_filtered_page_skips_resolution() {
    let server = MockServer::start().await;

    // Dropdown button already reads the requested package
    let dropdown = package_dropdown("cli", &[("core", "id-core"), ("cli", "id-cli")]);
    let base_page = page(
        "1 Repositories",
        &[row("/dep/cli-user", Some("42"))],
        "",
        &dropdown,
    );

    Mock::given(method("GET"))
        .and(path("/self/repo/network/dependents"))
        .respond_with(ResponseTemplate::new(200).set_body_string(base_page))
        .mount(&server)
        .await;

    let scraper = test_scraper(&server);
    let options = ScrapeOptions {
        min_stars: 0,
        package_name: Some("cli".to_string()),
        ..Default::default()
    };
    let report = scraper
        .get_dependents("self/repo", &options, &mut NoopProgress)
        .await
        .unwrap();

    assert_eq!(report.repositories.len(), 1);
    // No request carried a package_id parameter
    let requests = server.received_requests().await.unwrap();
    assert!(requests
        .iter()
        .all(|r| !r.url.query().unwrap_or("").contains("package_id")));
}
