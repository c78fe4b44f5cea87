use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use prodhunt_db::PgSink;
use prodhunt_scraper::{ingest_keyword, CrawlSettings, IngestSummary};
use prodhunt_sentiment::LexiconScorer;
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct ScrapeRequest {
    #[serde(default)]
    keyword: Option<String>,
}

/// Crawls every enabled source for the keyword and stores what it finds.
///
/// Source failures are reported per source in the response body; the request
/// itself only fails on invalid input.
pub(super) async fn scrape(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    payload: Result<Json<ScrapeRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<IngestSummary>>, ApiError> {
    let Json(body) = payload.map_err(|rejection| {
        ApiError::new(req_id.0.clone(), "bad_request", rejection.body_text())
    })?;

    let keyword = body
        .keyword
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .ok_or_else(|| {
            ApiError::new(
                req_id.0.clone(),
                "validation_error",
                "keyword must be a non-empty string",
            )
        })?;

    tracing::info!(keyword, sources = state.sources.len(), "scrape requested");

    let sink = PgSink::new(state.pool.clone());
    let summary = ingest_keyword(
        state.fetcher.as_ref(),
        &sink,
        &LexiconScorer,
        &state.sources,
        keyword,
        CrawlSettings::from_app_config(&state.config),
    )
    .await;

    Ok(Json(ApiResponse {
        data: summary,
        meta: ResponseMeta::new(req_id.0),
    }))
}
