use crate::config::types::{
    Config, CrawlerConfig, OutputConfig, PolitenessConfig, RequestConfig, RetryConfig,
    ScopeConfig, SiteConfig,
};
use crate::ConfigError;
use reqwest::header::{HeaderName, HeaderValue};
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_request_config(&config.request)?;
    validate_politeness_config(&config.politeness)?;
    validate_retry_config(&config.retry)?;
    validate_crawler_config(&config.crawler)?;
    validate_scope_config(&config.scope)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates the storefront location
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url '{}' must use HTTP or HTTPS scheme",
            config.base_url
        )));
    }

    // Relative paths join against the last directory, so a base without a
    // trailing slash would silently lose its final segment
    if !url.path().ends_with('/') {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url '{}' must end with '/'",
            config.base_url
        )));
    }

    url.join(&config.catalog_path).map_err(|e| {
        ConfigError::InvalidUrl(format!(
            "catalog_path '{}' does not resolve against base_url: {}",
            config.catalog_path, e
        ))
    })?;

    if config.page_param.trim().is_empty() {
        return Err(ConfigError::Validation(
            "page_param cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates the outbound request settings
fn validate_request_config(config: &RequestConfig) -> Result<(), ConfigError> {
    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "timeout_secs must be >= 1".to_string(),
        ));
    }

    for (name, value) in &config.headers {
        HeaderName::from_bytes(name.as_bytes()).map_err(|_| {
            ConfigError::Validation(format!("Invalid header name '{}'", name))
        })?;
        HeaderValue::from_str(value).map_err(|_| {
            ConfigError::Validation(format!("Invalid value for header '{}'", name))
        })?;
    }

    Ok(())
}

/// Validates pacing intervals and cooldown
fn validate_politeness_config(config: &PolitenessConfig) -> Result<(), ConfigError> {
    // The pacing delay must be strictly positive on every request
    if config.pacing_min_ms < 1 {
        return Err(ConfigError::Validation(format!(
            "pacing_min_ms must be >= 1ms, got {}ms",
            config.pacing_min_ms
        )));
    }

    validate_interval("pacing", config.pacing_min_ms, config.pacing_max_ms)?;
    validate_interval(
        "listing_delay",
        config.listing_delay_min_ms,
        config.listing_delay_max_ms,
    )?;
    validate_interval(
        "detail_delay",
        config.detail_delay_min_ms,
        config.detail_delay_max_ms,
    )?;

    Ok(())
}

fn validate_interval(name: &str, min: u64, max: u64) -> Result<(), ConfigError> {
    if min > max {
        return Err(ConfigError::Validation(format!(
            "{}_min_ms ({}) must not exceed {}_max_ms ({})",
            name, min, name, max
        )));
    }
    Ok(())
}

/// Validates the retry policy
fn validate_retry_config(config: &RetryConfig) -> Result<(), ConfigError> {
    if config.max_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "max_attempts must be >= 1, got {}",
            config.max_attempts
        )));
    }

    if !config.multiplier.is_finite() || config.multiplier < 1.0 {
        return Err(ConfigError::Validation(format!(
            "multiplier must be a finite number >= 1.0, got {}",
            config.multiplier
        )));
    }

    if config.initial_backoff_ms > config.max_backoff_ms {
        return Err(ConfigError::Validation(format!(
            "initial_backoff_ms ({}) must not exceed max_backoff_ms ({})",
            config.initial_backoff_ms, config.max_backoff_ms
        )));
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_concurrent_requests < 1 || config.max_concurrent_requests > 100 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_requests must be between 1 and 100, got {}",
            config.max_concurrent_requests
        )));
    }

    if config.page_count_ceiling < 1 {
        return Err(ConfigError::Validation(
            "page_count_ceiling must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates scope limits; a limit of zero would make the run a no-op
fn validate_scope_config(config: &ScopeConfig) -> Result<(), ConfigError> {
    if config.max_categories == Some(0) {
        return Err(ConfigError::Validation(
            "max_categories must be >= 1 when set".to_string(),
        ));
    }

    if config.max_pages_per_category == Some(0) {
        return Err(ConfigError::Validation(
            "max_pages_per_category must be >= 1 when set".to_string(),
        ));
    }

    if config.max_products == Some(0) {
        return Err(ConfigError::Validation(
            "max_products must be >= 1 when set".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.csv_path.is_empty() {
        return Err(ConfigError::Validation(
            "csv_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}
