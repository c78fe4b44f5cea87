pub mod crawl;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod ingest;
mod pagination;
mod rate_limit;

#[cfg(test)]
mod test_support;

pub use crawl::{CrawlReport, CrawlSettings, Crawler, StopReason};
pub use error::{FetchError, ScraperError};
pub use extract::{Extract, PageExtraction, SelectorExtractor};
pub use fetch::{extract_origin, FetchConfig, HttpFetcher, PageFetcher};
pub use ingest::{ingest_keyword, IngestSummary, SourceOutcome};
