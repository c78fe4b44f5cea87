//! Per-source crawl loop: fetch a results page, extract it, follow the next
//! link, and stop on the first of the conditions in [`StopReason`].

use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

use prodhunt_core::{AppConfig, ProductRecord, RawRecord, SentimentScorer, SourceConfig};
use serde::Serialize;

use crate::extract::Extract;
use crate::fetch::PageFetcher;
use crate::pagination::PageTracker;
use crate::rate_limit::PolitenessGate;

/// Knobs shared by [`Crawler`] and [`ingest_keyword`](crate::ingest_keyword).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlSettings {
    /// Upper bound on fetches per source per keyword.
    pub max_pages: usize,
    /// Minimum delay between consecutive fetches to one source.
    pub politeness_gap: Duration,
    /// How many sources may be crawled at once.
    pub max_concurrent_sources: usize,
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            max_pages: 5,
            politeness_gap: Duration::from_secs(1),
            max_concurrent_sources: 3,
        }
    }
}

impl CrawlSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            max_pages: config.scraper_max_pages,
            politeness_gap: config.politeness_gap(),
            max_concurrent_sources: config.scraper_max_concurrent_sources,
        }
    }
}

/// Why a crawl stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// `max_pages` fetches were made.
    BudgetExhausted,
    /// The last page had no result items.
    EmptyPage,
    /// The last page had no next link.
    NoNextPage,
    /// The next link was already visited, or the page repeated an earlier one.
    DuplicatePage,
    FetchFailed,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::BudgetExhausted => "budget_exhausted",
            Self::EmptyPage => "empty_page",
            Self::NoNextPage => "no_next_page",
            Self::DuplicatePage => "duplicate_page",
            Self::FetchFailed => "fetch_failed",
        };
        f.write_str(label)
    }
}

/// Outcome of one crawl.
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlReport {
    pub source: String,
    /// Complete, deduplicated, scored records in page order.
    pub records: Vec<ProductRecord>,
    pub pages_fetched: usize,
    pub stop_reason: StopReason,
    /// Raw items extracted across all pages, before filtering.
    pub items_seen: usize,
    pub incomplete_dropped: usize,
    pub duplicates_dropped: usize,
}

enum CrawlState {
    Fetching { url: String },
    Extracting { url: String, html: String },
    Stopped(StopReason),
}

/// Drives one source through its result pages for one keyword.
///
/// The crawler borrows its collaborators, so one fetcher and one scorer can
/// serve many concurrent crawls. Fetches are strictly sequential: at most one
/// request per crawl is outstanding.
pub struct Crawler<'a, F, E, S> {
    fetcher: &'a F,
    extractor: &'a E,
    scorer: &'a S,
    politeness_gap: Duration,
}

impl<'a, F, E, S> Crawler<'a, F, E, S>
where
    F: PageFetcher,
    E: Extract,
    S: SentimentScorer,
{
    pub fn new(fetcher: &'a F, extractor: &'a E, scorer: &'a S, politeness_gap: Duration) -> Self {
        Self {
            fetcher,
            extractor,
            scorer,
            politeness_gap,
        }
    }

    /// Crawls `source` for `keyword` and returns the scored records.
    ///
    /// Never fails: fetch errors end the crawl early and whatever was
    /// collected before the failure is still returned.
    pub async fn run(
        &self,
        source: &SourceConfig,
        keyword: &str,
        max_pages: usize,
    ) -> Vec<ProductRecord> {
        self.run_with_report(source, keyword, max_pages).await.records
    }

    /// Same as [`Crawler::run`], also reporting page count and stop reason.
    pub async fn run_with_report(
        &self,
        source: &SourceConfig,
        keyword: &str,
        max_pages: usize,
    ) -> CrawlReport {
        let mut gate = PolitenessGate::new(self.politeness_gap);
        let mut tracker = PageTracker::default();
        let mut collected: Vec<RawRecord> = Vec::new();
        let mut pages_fetched = 0usize;

        let mut state = CrawlState::Fetching {
            url: source.search_url_for(keyword),
        };

        let stop_reason = loop {
            state = match state {
                CrawlState::Fetching { url } => {
                    if pages_fetched >= max_pages {
                        CrawlState::Stopped(StopReason::BudgetExhausted)
                    } else {
                        gate.wait().await;
                        pages_fetched += 1;
                        tracker.visit(&url);
                        let fetched = self.fetcher.fetch(&url).await;
                        gate.mark();
                        match fetched {
                            Ok(html) => CrawlState::Extracting { url, html },
                            Err(e) => {
                                tracing::warn!(
                                    source = %source.name,
                                    page = pages_fetched,
                                    url = %url,
                                    error = %e,
                                    "fetch failed; ending crawl"
                                );
                                CrawlState::Stopped(StopReason::FetchFailed)
                            }
                        }
                    }
                }
                CrawlState::Extracting { url, html } => {
                    let page = self.extractor.extract(&html);
                    tracing::debug!(
                        source = %source.name,
                        page = pages_fetched,
                        url = %url,
                        items = page.records.len(),
                        has_next = page.next_page.is_some(),
                        "extracted page"
                    );

                    if page.records.is_empty() {
                        CrawlState::Stopped(StopReason::EmptyPage)
                    } else if !tracker.record_page(&page.records) {
                        CrawlState::Stopped(StopReason::DuplicatePage)
                    } else {
                        collected.extend(page.records);
                        match page.next_page {
                            None => CrawlState::Stopped(StopReason::NoNextPage),
                            Some(next) if tracker.was_visited(&next) => {
                                CrawlState::Stopped(StopReason::DuplicatePage)
                            }
                            Some(next) => CrawlState::Fetching { url: next },
                        }
                    }
                }
                CrawlState::Stopped(reason) => break reason,
            };
        };

        let items_seen = collected.len();
        let mut seen_urls: HashSet<String> = HashSet::new();
        let mut incomplete_dropped = 0usize;
        let mut duplicates_dropped = 0usize;

        let records: Vec<ProductRecord> = collected
            .into_iter()
            .map(|raw| ProductRecord::from_raw(raw, &source.name, keyword))
            .filter(|record| {
                if !record.is_complete() {
                    incomplete_dropped += 1;
                    return false;
                }
                let url = record.product_url.clone().unwrap_or_default();
                if seen_urls.insert(url) {
                    true
                } else {
                    duplicates_dropped += 1;
                    false
                }
            })
            .map(|record| {
                let score = self.scorer.score(record.review_text.as_deref());
                record.with_sentiment(score)
            })
            .collect();

        tracing::info!(
            source = %source.name,
            keyword,
            pages_fetched,
            items_seen,
            records = records.len(),
            incomplete_dropped,
            duplicates_dropped,
            stop_reason = %stop_reason,
            "crawl finished"
        );

        CrawlReport {
            source: source.name.clone(),
            records,
            pages_fetched,
            stop_reason,
            items_seen,
            incomplete_dropped,
            duplicates_dropped,
        }
    }
}

#[cfg(test)]
#[path = "crawl_test.rs"]
mod tests;
