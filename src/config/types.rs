use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

/// Main configuration structure for a harvest run
///
/// Every section falls back to its defaults, so an empty file (or no file at
/// all) describes a complete run against the default storefront.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub request: RequestConfig,
    #[serde(default)]
    pub politeness: PolitenessConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub scope: ScopeConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Target storefront location
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Base URL of the storefront, with a trailing slash
    #[serde(rename = "base-url", default = "default_base_url")]
    pub base_url: String,

    /// Catalog index path, relative to the base URL
    #[serde(rename = "catalog-path", default = "default_catalog_path")]
    pub catalog_path: String,

    /// Query parameter carrying the listing page number
    #[serde(rename = "page-param", default = "default_page_param")]
    pub page_param: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            catalog_path: default_catalog_path(),
            page_param: default_page_param(),
        }
    }
}

/// Outbound request settings
#[derive(Debug, Clone, Deserialize)]
pub struct RequestConfig {
    /// Whole-request timeout (seconds)
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Header set sent with every request
    #[serde(default = "default_headers")]
    pub headers: BTreeMap<String, String>,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            headers: default_headers(),
        }
    }
}

/// Request pacing and cooldown (all values in milliseconds)
#[derive(Debug, Clone, Deserialize)]
pub struct PolitenessConfig {
    /// Lower bound of the jitter applied before every request
    #[serde(rename = "pacing-min-ms", default = "default_pacing_min")]
    pub pacing_min_ms: u64,

    /// Upper bound of the jitter applied before every request
    #[serde(rename = "pacing-max-ms", default = "default_pacing_max")]
    pub pacing_max_ms: u64,

    /// Fixed wait after a failed request
    #[serde(rename = "cooldown-ms", default = "default_cooldown")]
    pub cooldown_ms: u64,

    /// Extra per-task delay before each listing page fetch
    #[serde(rename = "listing-delay-min-ms", default = "default_listing_delay")]
    pub listing_delay_min_ms: u64,

    #[serde(rename = "listing-delay-max-ms", default = "default_listing_delay")]
    pub listing_delay_max_ms: u64,

    /// Extra per-task delay before each detail page fetch
    #[serde(rename = "detail-delay-min-ms", default = "default_detail_delay_min")]
    pub detail_delay_min_ms: u64,

    #[serde(rename = "detail-delay-max-ms", default = "default_detail_delay_max")]
    pub detail_delay_max_ms: u64,
}

impl Default for PolitenessConfig {
    fn default() -> Self {
        Self {
            pacing_min_ms: default_pacing_min(),
            pacing_max_ms: default_pacing_max(),
            cooldown_ms: default_cooldown(),
            listing_delay_min_ms: default_listing_delay(),
            listing_delay_max_ms: default_listing_delay(),
            detail_delay_min_ms: default_detail_delay_min(),
            detail_delay_max_ms: default_detail_delay_max(),
        }
    }
}

impl PolitenessConfig {
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }
}

/// Caller-side retry policy for gateway failures
#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    /// Total attempts per URL, including the first one
    #[serde(rename = "max-attempts", default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(rename = "initial-backoff-ms", default = "default_initial_backoff")]
    pub initial_backoff_ms: u64,

    #[serde(default = "default_multiplier")]
    pub multiplier: f64,

    #[serde(rename = "max-backoff-ms", default = "default_max_backoff")]
    pub max_backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff(),
            multiplier: default_multiplier(),
            max_backoff_ms: default_max_backoff(),
        }
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum number of in-flight tasks within one stage
    #[serde(rename = "max-concurrent-requests", default = "default_concurrency")]
    pub max_concurrent_requests: u32,

    /// Largest page count a listing may announce; higher counts are clamped
    #[serde(rename = "page-count-ceiling", default = "default_page_count_ceiling")]
    pub page_count_ceiling: u32,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_requests: default_concurrency(),
            page_count_ceiling: default_page_count_ceiling(),
        }
    }
}

/// Limits on how much of the catalog a run covers
///
/// Unset limits mean the whole catalog.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScopeConfig {
    #[serde(rename = "max-categories", default)]
    pub max_categories: Option<usize>,

    #[serde(rename = "max-pages-per-category", default)]
    pub max_pages_per_category: Option<u32>,

    #[serde(rename = "max-products", default)]
    pub max_products: Option<usize>,

    /// Drop repeated product links before the detail harvest
    #[serde(rename = "dedupe-links", default)]
    pub dedupe_links: bool,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the CSV file with harvested products
    #[serde(rename = "csv-path", default = "default_csv_path")]
    pub csv_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            csv_path: default_csv_path(),
        }
    }
}

fn default_base_url() -> String {
    "https://example.com/".to_string()
}

fn default_catalog_path() -> String {
    "catalogue/".to_string()
}

fn default_page_param() -> String {
    "PAGEN_1".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_headers() -> BTreeMap<String, String> {
    [
        (
            "User-Agent",
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
             (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
        ),
        (
            "Accept",
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        ),
        ("Accept-Language", "ru-RU,ru;q=0.9,en-US;q=0.8,en;q=0.7"),
    ]
    .into_iter()
    .map(|(name, value)| (name.to_string(), value.to_string()))
    .collect()
}

fn default_pacing_min() -> u64 {
    1000
}

fn default_pacing_max() -> u64 {
    3000
}

fn default_cooldown() -> u64 {
    5000
}

fn default_listing_delay() -> u64 {
    2000
}

fn default_detail_delay_min() -> u64 {
    2000
}

fn default_detail_delay_max() -> u64 {
    4000
}

fn default_max_attempts() -> u32 {
    1
}

fn default_initial_backoff() -> u64 {
    1000
}

fn default_multiplier() -> f64 {
    2.0
}

fn default_max_backoff() -> u64 {
    30_000
}

fn default_concurrency() -> u32 {
    8
}

fn default_page_count_ceiling() -> u32 {
    10_000
}

fn default_csv_path() -> String {
    "output.csv".to_string()
}
