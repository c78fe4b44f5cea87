//! Keyword ingest across every configured source: crawl, then persist.

use futures::stream::{self, StreamExt};
use prodhunt_core::{ProductSink, SentimentScorer, SourceConfig};
use serde::Serialize;

use crate::crawl::{CrawlReport, CrawlSettings, Crawler, StopReason};
use crate::extract::SelectorExtractor;
use crate::fetch::PageFetcher;

/// Result of ingesting one source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceOutcome {
    pub name: String,
    pub pages_fetched: usize,
    /// Complete records produced by the crawl.
    pub records: usize,
    /// Records the sink accepted.
    pub persisted: usize,
    /// `None` when the crawl never started (bad selector configuration).
    pub stop_reason: Option<StopReason>,
    /// Set when the source failed as a whole.
    pub error: Option<String>,
}

impl SourceOutcome {
    fn failed(name: &str, error: String) -> Self {
        Self {
            name: name.to_owned(),
            pages_fetched: 0,
            records: 0,
            persisted: 0,
            stop_reason: None,
            error: Some(error),
        }
    }

    fn from_report(report: &CrawlReport) -> Self {
        Self {
            name: report.source.clone(),
            pages_fetched: report.pages_fetched,
            records: report.records.len(),
            persisted: 0,
            stop_reason: Some(report.stop_reason),
            error: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestSummary {
    pub keyword: String,
    /// One entry per source, in the order the sources were given.
    pub sources: Vec<SourceOutcome>,
    pub records_persisted: usize,
}

/// Crawls every source in `sources` for `keyword` and persists the complete
/// records through `sink`.
///
/// Up to `settings.max_concurrent_sources` sources run at once, each with its
/// own crawl state. A failing source never aborts the others: a bad selector
/// or a sink error on the source lookup marks that source failed, and a sink
/// error on a single record skips that record. A source whose crawl produced
/// no records is never registered with the sink.
pub async fn ingest_keyword<F, K, S>(
    fetcher: &F,
    sink: &K,
    scorer: &S,
    sources: &[SourceConfig],
    keyword: &str,
    settings: CrawlSettings,
) -> IngestSummary
where
    F: PageFetcher,
    K: ProductSink,
    S: SentimentScorer,
{
    let max_concurrent = settings.max_concurrent_sources.max(1);

    // Collected eagerly so the stream state holds no closure and stays Send.
    let tasks: Vec<_> = sources
        .iter()
        .enumerate()
        .map(|(index, source)| {
            let fut = ingest_source(fetcher, sink, scorer, source, keyword, settings);
            async move { (index, fut.await) }
        })
        .collect();

    let mut results: Vec<(usize, SourceOutcome)> = stream::iter(tasks)
        .buffer_unordered(max_concurrent)
        .collect()
        .await;
    results.sort_by_key(|(index, _)| *index);

    let outcomes: Vec<SourceOutcome> = results.into_iter().map(|(_, o)| o).collect();
    let records_persisted = outcomes.iter().map(|o| o.persisted).sum();
    let failed = outcomes.iter().filter(|o| o.error.is_some()).count();

    tracing::info!(
        keyword,
        sources = outcomes.len(),
        failed,
        records_persisted,
        "ingest finished"
    );

    IngestSummary {
        keyword: keyword.to_owned(),
        sources: outcomes,
        records_persisted,
    }
}

async fn ingest_source<F, K, S>(
    fetcher: &F,
    sink: &K,
    scorer: &S,
    source: &SourceConfig,
    keyword: &str,
    settings: CrawlSettings,
) -> SourceOutcome
where
    F: PageFetcher,
    K: ProductSink,
    S: SentimentScorer,
{
    let extractor = match SelectorExtractor::from_source(source) {
        Ok(extractor) => extractor,
        Err(e) => {
            tracing::error!(source = %source.name, error = %e, "skipping source");
            return SourceOutcome::failed(&source.name, e.to_string());
        }
    };

    let report = Crawler::new(fetcher, &extractor, scorer, settings.politeness_gap)
        .run_with_report(source, keyword, settings.max_pages)
        .await;
    let mut outcome = SourceOutcome::from_report(&report);

    if report.records.is_empty() {
        return outcome;
    }

    let source_id = match sink.get_or_create_source(&source.name, &source.base_url).await {
        Ok(id) => id,
        Err(e) => {
            tracing::error!(source = %source.name, error = %e, "failed to register source");
            outcome.error = Some(format!("failed to register source: {e}"));
            return outcome;
        }
    };

    for record in &report.records {
        match sink.persist(record, source_id).await {
            Ok(_) => outcome.persisted += 1,
            Err(e) => {
                tracing::warn!(
                    source = %source.name,
                    product_url = record.product_url.as_deref().unwrap_or_default(),
                    error = %e,
                    "failed to persist record; skipping"
                );
            }
        }
    }

    tracing::info!(
        source = %source.name,
        keyword,
        persisted = outcome.persisted,
        "source ingested"
    );
    outcome
}

#[cfg(test)]
#[path = "ingest_test.rs"]
mod tests;
