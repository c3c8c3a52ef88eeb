use crate::config::types::{ClientConfig, ScrapeOptions};
use crate::StardepsError;
use url::Url;

/// Validates per-run scrape options
pub fn validate_options(options: &ScrapeOptions) -> Result<(), StardepsError> {
    if options.rows == 0 {
        return Err(StardepsError::Config(
            "rows must be greater than zero".to_string(),
        ));
    }

    if options.max_pages == 0 {
        return Err(StardepsError::Config(
            "max_pages must be greater than zero".to_string(),
        ));
    }

    if let Some(name) = &options.package_name {
        if name.trim().is_empty() {
            return Err(StardepsError::Config(
                "package_name cannot be empty".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates scraper-level configuration
pub fn validate_client_config(config: &ClientConfig) -> Result<(), StardepsError> {
    Url::parse(&config.base_url)
        .map_err(|e| StardepsError::Config(format!("Invalid base_url '{}': {}", config.base_url, e)))?;

    if config.http.user_agent.is_empty() {
        return Err(StardepsError::Config(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.http.max_retries == 0 {
        return Err(StardepsError::Config(
            "max_retries must be at least 1".to_string(),
        ));
    }

    Ok(())
}
