//! HTTP fetcher for listing pages
//!
//! Consults the response cache before the network, then issues a GET with a
//! fixed identifying user agent and bounded timeouts. Only HTTP 429 is
//! retried, with exponential backoff; every other failure propagates on
//! first occurrence. Successful bodies are written back to the cache so
//! repeat runs within the freshness window skip the network entirely.

use crate::cache::ResponseCache;
use crate::config::HttpConfig;
use crate::{Result, StardepsError};
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// Cache-fronted page fetcher with 429 retry
pub struct PageFetcher {
    client: Client,
    cache: Box<dyn ResponseCache>,
    max_retries: u32,
    backoff_base: Duration,
}

impl PageFetcher {
    pub fn new(config: &HttpConfig, cache: Box<dyn ResponseCache>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self {
            client,
            cache,
            max_retries: config.max_retries,
            backoff_base: config.backoff_base,
        })
    }

    /// Fetches the raw body for `url`.
    ///
    /// A cache hit short-circuits the network call and returns the cached
    /// body unchanged. On a miss the request is attempted up to
    /// `max_retries` times, sleeping `backoff_base * 2^n` before retry `n`;
    /// retries happen only for HTTP 429. No parsing happens here.
    pub async fn fetch(&self, url: &str) -> Result<String> {
        if let Some(body) = self.cache.get(url) {
            tracing::debug!("Cache hit for {}", url);
            return Ok(body);
        }

        let mut attempt: u32 = 0;
        loop {
            let response =
                self.client
                    .get(url)
                    .send()
                    .await
                    .map_err(|source| StardepsError::Http {
                        url: url.to_string(),
                        source,
                    })?;

            let status = response.status();
            if status == StatusCode::TOO_MANY_REQUESTS {
                attempt += 1;
                if attempt >= self.max_retries {
                    return Err(StardepsError::RateLimited {
                        url: url.to_string(),
                        attempts: attempt,
                    });
                }
                let delay = backoff_delay(self.backoff_base, attempt - 1);
                tracing::warn!(
                    "Rate limited on {}; waiting {:.1}s before retry {}",
                    url,
                    delay.as_secs_f64(),
                    attempt
                );
                tokio::time::sleep(delay).await;
                continue;
            }

            if !status.is_success() {
                return Err(StardepsError::HttpStatus {
                    url: url.to_string(),
                    status: status.as_u16(),
                });
            }

            let body = response.text().await.map_err(|source| StardepsError::Http {
                url: url.to_string(),
                source,
            })?;
            self.cache.set(url, &body);
            return Ok(body);
        }
    }
}

/// Delay before the retry following 429 number `attempt` (zero-based):
/// `base * 2^attempt`, uncapped except by the retry ceiling
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base * 2u32.saturating_pow(attempt)
}
