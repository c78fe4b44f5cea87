use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// User agents rotated by the fetcher when `PRODHUNT_SCRAPER_USER_AGENTS` is unset.
pub const DEFAULT_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/104.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.114 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:89.0) Gecko/20100101 Firefox/89.0",
];

#[derive(Clone)]
pub struct AppConfig {
    /// Only commands that touch Postgres need it; see [`AppConfig::database_url`].
    pub database_url: Option<String>,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub sources_path: PathBuf,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub scraper_request_timeout_secs: u64,
    pub scraper_user_agents: Vec<String>,
    pub scraper_politeness_gap_ms: u64,
    pub scraper_max_pages: usize,
    pub scraper_max_concurrent_sources: usize,
    pub rank_sentiment_weight: f64,
    pub rank_price_weight: f64,
}

impl AppConfig {
    /// The Postgres URL, for commands that open a pool.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] when `DATABASE_URL` was not set.
    pub fn database_url(&self) -> Result<&str, ConfigError> {
        self.database_url
            .as_deref()
            .ok_or_else(|| ConfigError::MissingEnvVar("DATABASE_URL".to_string()))
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.scraper_request_timeout_secs)
    }

    #[must_use]
    pub fn politeness_gap(&self) -> Duration {
        Duration::from_millis(self.scraper_politeness_gap_ms)
    }

    #[must_use]
    pub fn ranking_weights(&self) -> crate::RankingWeights {
        crate::RankingWeights {
            sentiment: self.rank_sentiment_weight,
            price: self.rank_price_weight,
        }
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("sources_path", &self.sources_path)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field(
                "scraper_request_timeout_secs",
                &self.scraper_request_timeout_secs,
            )
            .field("scraper_user_agents", &self.scraper_user_agents.len())
            .field("scraper_politeness_gap_ms", &self.scraper_politeness_gap_ms)
            .field("scraper_max_pages", &self.scraper_max_pages)
            .field(
                "scraper_max_concurrent_sources",
                &self.scraper_max_concurrent_sources,
            )
            .field("rank_sentiment_weight", &self.rank_sentiment_weight)
            .field("rank_price_weight", &self.rank_price_weight)
            .finish()
    }
}
