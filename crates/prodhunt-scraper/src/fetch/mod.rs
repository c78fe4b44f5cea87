//! HTTP page fetching with rotating browser identities.

mod origin;

use std::future::Future;
use std::time::Duration;

use prodhunt_core::{AppConfig, DEFAULT_USER_AGENTS};
use rand::seq::IndexedRandom;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, REFERER, RETRY_AFTER, USER_AGENT};
use reqwest::{Client, StatusCode};

use crate::error::{FetchError, ScraperError};

pub use origin::extract_origin;
use origin::extract_domain;

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const ACCEPT_LANGUAGE_VALUE: &str = "en-US,en;q=0.5";

/// Seconds assumed when a 429 response carries no parseable `Retry-After`.
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Source of raw page bodies for the crawler.
///
/// [`HttpFetcher`] is the production implementation; tests substitute
/// in-memory fetchers that serve canned HTML.
pub trait PageFetcher: Send + Sync {
    /// Fetches `url` and returns the response body.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] for timeouts, transport failures, non-2xx
    /// statuses, and unparseable URLs. No retry is attempted.
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, FetchError>> + Send;
}

/// Connection settings for [`HttpFetcher`].
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User-Agent pool; one entry is picked at random per request.
    pub user_agents: Vec<String>,
    /// Whole-request timeout.
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agents: DEFAULT_USER_AGENTS.iter().map(|s| (*s).to_owned()).collect(),
            timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl FetchConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            user_agents: config.scraper_user_agents.clone(),
            timeout: config.request_timeout(),
            ..Self::default()
        }
    }
}

/// Fetches HTML pages over HTTP(S), presenting a browser-like identity.
///
/// Every request carries a randomly chosen `User-Agent`, an HTML `Accept`
/// header, `Accept-Language: en-US,en;q=0.5`, and a `Referer` equal to the
/// origin of the requested URL. Status handling:
///
/// - 429 maps to [`FetchError::RateLimited`] using `Retry-After` (default 60s).
/// - 404 maps to [`FetchError::NotFound`].
/// - any other non-2xx status maps to [`FetchError::UnexpectedStatus`].
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    user_agents: Vec<String>,
    timeout: Duration,
}

impl HttpFetcher {
    /// Builds the underlying `reqwest::Client` with the configured timeouts.
    ///
    /// An empty `user_agents` list falls back to the built-in browser pool.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Client`] if the client cannot be constructed.
    pub fn new(config: &FetchConfig) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()?;

        let user_agents = if config.user_agents.is_empty() {
            FetchConfig::default().user_agents
        } else {
            config.user_agents.clone()
        };

        Ok(Self {
            client,
            user_agents,
            timeout: config.timeout,
        })
    }

    /// Picks one User-Agent from the pool, uniformly at random.
    #[must_use]
    pub fn pick_user_agent(&self) -> &str {
        self.user_agents
            .choose(&mut rand::rng())
            .map_or(DEFAULT_USER_AGENTS[0], String::as_str)
    }

    fn classify_transport_error(&self, url: &str, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout {
                url: url.to_owned(),
                timeout: self.timeout,
            }
        } else {
            FetchError::Http {
                url: url.to_owned(),
                source: err,
            }
        }
    }

    async fn get_page(&self, url: &str) -> Result<String, FetchError> {
        let parsed = reqwest::Url::parse(url).map_err(|e| FetchError::InvalidUrl {
            url: url.to_owned(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(FetchError::InvalidUrl {
                url: url.to_owned(),
                reason: format!("unsupported scheme \"{}\"", parsed.scheme()),
            });
        }

        let referer = extract_origin(url);
        let user_agent = self.pick_user_agent().to_owned();

        let response = self
            .client
            .get(parsed)
            .header(USER_AGENT, user_agent)
            .header(ACCEPT, ACCEPT_HTML)
            .header(ACCEPT_LANGUAGE, ACCEPT_LANGUAGE_VALUE)
            .header(REFERER, referer)
            .send()
            .await
            .map_err(|e| self.classify_transport_error(url, e))?;

        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.trim().parse::<u64>().ok())
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
            return Err(FetchError::RateLimited {
                domain: extract_domain(url),
                retry_after_secs,
            });
        }

        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound {
                url: url.to_owned(),
            });
        }

        if !status.is_success() {
            return Err(FetchError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| self.classify_transport_error(url, e))
    }
}

impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let result = self.get_page(url).await;
        match &result {
            Ok(body) => tracing::debug!(url, bytes = body.len(), "fetched page"),
            Err(e) => tracing::warn!(url, error = %e, "page fetch failed"),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_user_agent_pool_falls_back_to_defaults() {
        let fetcher = HttpFetcher::new(&FetchConfig {
            user_agents: Vec::new(),
            ..FetchConfig::default()
        })
        .expect("client builds");
        assert!(DEFAULT_USER_AGENTS.contains(&fetcher.pick_user_agent()));
    }

    #[test]
    fn pick_user_agent_draws_from_configured_pool() {
        let pool = vec!["agent-one".to_owned(), "agent-two".to_owned()];
        let fetcher = HttpFetcher::new(&FetchConfig {
            user_agents: pool.clone(),
            ..FetchConfig::default()
        })
        .expect("client builds");
        for _ in 0..20 {
            let ua = fetcher.pick_user_agent();
            assert!(pool.iter().any(|p| p == ua), "unexpected agent {ua}");
        }
    }

    #[tokio::test]
    async fn malformed_url_is_rejected_before_sending() {
        let fetcher = HttpFetcher::new(&FetchConfig::default()).expect("client builds");
        let err = fetcher.fetch("not a url").await.unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl { .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn non_http_scheme_is_rejected() {
        let fetcher = HttpFetcher::new(&FetchConfig::default()).expect("client builds");
        let err = fetcher.fetch("ftp://example.com/list").await.unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl { .. }), "got {err:?}");
    }
}
