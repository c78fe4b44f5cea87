//! `scrape` command: crawl sources for one keyword and store the results.
//!
//! Per-source failures are reported in the summary rather than propagated,
//! so one blocked marketplace does not abort the run.

use prodhunt_core::{AppConfig, MemorySink, SourceConfig};
use prodhunt_db::PgSink;
use prodhunt_scraper::{ingest_keyword, CrawlSettings, FetchConfig, HttpFetcher, IngestSummary};
use prodhunt_sentiment::LexiconScorer;

#[derive(Debug, Clone, Copy)]
pub(crate) struct ScrapeOptions<'a> {
    pub keyword: &'a str,
    pub source_filter: Option<&'a str>,
    pub max_pages: Option<usize>,
    pub dry_run: bool,
}

/// Resolves the sources to crawl from the sources file.
///
/// # Errors
///
/// Returns an error if the file cannot be loaded, or if a filter was given
/// and no enabled source matches it.
pub(crate) fn select_sources(
    config: &AppConfig,
    source_filter: Option<&str>,
) -> anyhow::Result<Vec<SourceConfig>> {
    let file = prodhunt_core::load_sources(&config.sources_path)?;
    let sources = file.select(source_filter);

    if sources.is_empty() {
        match source_filter {
            Some(name) => anyhow::bail!("source '{name}' not found or disabled"),
            None => anyhow::bail!(
                "no enabled sources in {}",
                config.sources_path.display()
            ),
        }
    }
    Ok(sources)
}

fn crawl_settings(config: &AppConfig, max_pages: Option<usize>) -> anyhow::Result<CrawlSettings> {
    let mut settings = CrawlSettings::from_app_config(config);
    if let Some(pages) = max_pages {
        if pages == 0 {
            anyhow::bail!("--max-pages must be at least 1");
        }
        settings.max_pages = pages;
    }
    Ok(settings)
}

/// Runs the `scrape` command.
///
/// With `dry_run` the records are collected into memory and printed as JSON;
/// the database is never contacted.
///
/// # Errors
///
/// Returns an error for an empty keyword, unusable configuration, or (when
/// not a dry run) a database connection failure.
pub(crate) async fn run_scrape(config: &AppConfig, options: ScrapeOptions<'_>) -> anyhow::Result<()> {
    let keyword = options.keyword.trim();
    if keyword.is_empty() {
        anyhow::bail!("--keyword must not be blank");
    }

    let sources = select_sources(config, options.source_filter)?;
    let settings = crawl_settings(config, options.max_pages)?;
    let fetcher = HttpFetcher::new(&FetchConfig::from_app_config(config))
        .map_err(|e| anyhow::anyhow!("failed to build HTTP fetcher: {e}"))?;

    tracing::info!(
        keyword,
        sources = sources.len(),
        max_pages = settings.max_pages,
        dry_run = options.dry_run,
        "starting scrape"
    );

    let summary = if options.dry_run {
        let sink = MemorySink::new();
        let summary =
            ingest_keyword(&fetcher, &sink, &LexiconScorer, &sources, keyword, settings).await;
        for product in sink.products() {
            println!("{}", serde_json::to_string(&product.record)?);
        }
        summary
    } else {
        let pool = crate::connect(config).await?;
        let sink = PgSink::new(pool);
        ingest_keyword(&fetcher, &sink, &LexiconScorer, &sources, keyword, settings).await
    };

    print_summary(&summary, options.dry_run);
    Ok(())
}

fn print_summary(summary: &IngestSummary, dry_run: bool) {
    let verb = if dry_run { "would store" } else { "stored" };
    println!(
        "scrape '{}': {verb} {} record(s) from {} source(s)",
        summary.keyword,
        summary.records_persisted,
        summary.sources.len()
    );
    for outcome in &summary.sources {
        let stop = outcome
            .stop_reason
            .map_or_else(|| "not started".to_string(), |r| r.to_string());
        match &outcome.error {
            Some(error) => println!("  {:<12} FAILED: {error}", outcome.name),
            None => println!(
                "  {:<12} pages={} records={} persisted={} stop={stop}",
                outcome.name, outcome.pages_fetched, outcome.records, outcome.persisted
            ),
        }
    }
}
