//! HTTP fetch gateway
//!
//! This module wraps a single outbound request:
//! - Building HTTP clients with the configured browser-like header set
//! - A randomized pacing delay before every request
//! - Status interpretation (2xx is content, everything else is a failure)
//! - A fixed cooldown after every failure before reporting it
//!
//! The gateway never loops. Retrying is the caller's decision, see
//! [`crate::crawler::retry`].

use crate::config::{Config, RequestConfig};
use crate::crawler::pacing::PacingInterval;
use crate::{ConfigError, HarvestError};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

/// A failed fetch; every variant asks the caller to retry or give up
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchFailure {
    /// The server answered with a non-success status
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    /// The request never produced a usable response (timeout, refused, DNS)
    #[error("transport error for {url}: {message}")]
    Transport { url: String, message: String },
}

impl FetchFailure {
    pub fn url(&self) -> &str {
        match self {
            Self::Status { url, .. } | Self::Transport { url, .. } => url,
        }
    }
}

/// Fetch capability used by every pipeline stage
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches `url` and returns the response body
    async fn fetch(&self, url: &str) -> Result<String, FetchFailure>;
}

/// Builds the header map sent with every request
pub fn build_headers(config: &RequestConfig) -> Result<HeaderMap, ConfigError> {
    let mut headers = HeaderMap::with_capacity(config.headers.len());

    for (name, value) in &config.headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| ConfigError::Validation(format!("Invalid header name '{}'", name)))?;
        let value = HeaderValue::from_str(value).map_err(|_| {
            ConfigError::Validation(format!("Invalid value for header '{}'", name))
        })?;
        headers.insert(name, value);
    }

    Ok(headers)
}

/// Builds an HTTP client with the configured headers and timeouts
///
/// # Example
///
/// ```no_run
/// use catalog_harvest::config::RequestConfig;
/// use catalog_harvest::crawler::build_http_client;
///
/// let client = build_http_client(&RequestConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &RequestConfig) -> Result<Client, HarvestError> {
    let headers = build_headers(config)?;

    let client = Client::builder()
        .default_headers(headers)
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()?;

    Ok(client)
}

/// Paced, status-aware wrapper around one HTTP client
pub struct FetchGateway {
    client: Client,
    pacing: PacingInterval,
    cooldown: Duration,
}

impl FetchGateway {
    pub fn new(client: Client, pacing: PacingInterval, cooldown: Duration) -> Self {
        Self {
            client,
            pacing,
            cooldown,
        }
    }

    /// Opens a gateway with a fresh client
    ///
    /// Each stage opens its own gateway, so connection pools are never shared
    /// across stages.
    pub fn from_config(config: &Config) -> Result<Self, HarvestError> {
        let client = build_http_client(&config.request)?;
        Ok(Self::new(
            client,
            PacingInterval::request_pacing(&config.politeness),
            config.politeness.cooldown(),
        ))
    }

    /// Reports a failure, waits the cooldown, then hands it to the caller
    async fn fail(&self, failure: FetchFailure) -> Result<String, FetchFailure> {
        tracing::warn!(
            "{}; cooling down for {}ms",
            failure,
            self.cooldown.as_millis()
        );
        tokio::time::sleep(self.cooldown).await;
        Err(failure)
    }
}

#[async_trait]
impl Fetcher for FetchGateway {
    async fn fetch(&self, url: &str) -> Result<String, FetchFailure> {
        let delay = self.pacing.wait().await;
        tracing::trace!("Paced {}ms before GET {}", delay.as_millis(), url);

        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                return self
                    .fail(FetchFailure::Transport {
                        url: url.to_string(),
                        message: describe_transport_error(&e),
                    })
                    .await
            }
        };

        let status = response.status();
        if !status.is_success() {
            return self
                .fail(FetchFailure::Status {
                    url: url.to_string(),
                    status: status.as_u16(),
                })
                .await;
        }

        match response.text().await {
            Ok(body) => {
                tracing::debug!("Fetched {} ({} bytes)", url, body.len());
                Ok(body)
            }
            Err(e) => {
                self.fail(FetchFailure::Transport {
                    url: url.to_string(),
                    message: describe_transport_error(&e),
                })
                .await
            }
        }
    }
}

/// Classifies a transport error into a short description
fn describe_transport_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "request timeout".to_string()
    } else if e.is_connect() {
        format!("connection failed: {}", e)
    } else {
        e.to_string()
    }
}
