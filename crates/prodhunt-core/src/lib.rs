//! Shared domain types and configuration for prodhunt.

pub mod app_config;
pub mod config;
pub mod price;
pub mod ranking;
pub mod records;
pub mod scoring;
pub mod sink;
pub mod sources;

use thiserror::Error;

pub use app_config::{AppConfig, Environment, DEFAULT_USER_AGENTS};
pub use config::{load_app_config, load_app_config_from_env};
pub use price::parse_price;
pub use ranking::{best, composite_score, Rankable, RankingWeights};
pub use records::{ProductRecord, RawRecord};
pub use scoring::{SentimentScorer, NEUTRAL_SCORE};
pub use sink::{MemorySink, ProductSink, RecordId, SourceId, StoredProduct, StoredSource};
pub use sources::{
    load_sources, parse_sources, SelectorConfig, SourceConfig, SourcesFile, KEYWORD_PLACEHOLDER,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read sources file {path}: {source}")]
    SourcesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse sources file: {0}")]
    SourcesFileParse(#[source] serde_yaml::Error),

    #[error("invalid sources configuration: {0}")]
    Validation(String),
}
