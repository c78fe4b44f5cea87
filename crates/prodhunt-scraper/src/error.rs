use std::time::Duration;

use thiserror::Error;

/// Why a single page fetch failed. Returned by every
/// [`PageFetcher`](crate::PageFetcher); the crawler treats any variant as the
/// end of that source's crawl.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} timed out after {timeout:?}")]
    Timeout { url: String, timeout: Duration },

    #[error("HTTP error fetching {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("rate limited by {domain} (retry after {retry_after_secs}s)")]
    RateLimited {
        domain: String,
        retry_after_secs: u64,
    },

    #[error("page not found: {url}")]
    NotFound { url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("invalid URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// Errors raised while building scraper components from configuration.
#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("invalid {field} selector {selector:?} for source {source_name}: {reason}")]
    InvalidSelector {
        source_name: String,
        field: &'static str,
        selector: String,
        reason: String,
    },

    #[error("invalid base URL \"{url}\" for source {source_name}: {reason}")]
    InvalidBaseUrl {
        source_name: String,
        url: String,
        reason: String,
    },
}
