use axum::{
    extract::{Query, State},
    Extension, Json,
};
use prodhunt_db::ProductSearch;
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{map_db_error, normalize_limit, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct SearchQuery {
    pub query: Option<String>,
    pub limit: Option<i64>,
}

pub(super) async fn search(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<ApiResponse<ProductSearch>>, ApiError> {
    let query = params
        .query
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| {
            ApiError::new(
                req_id.0.clone(),
                "validation_error",
                "query parameter is required",
            )
        })?;

    let results = prodhunt_db::search_products(
        &state.pool,
        query,
        normalize_limit(params.limit),
        state.config.ranking_weights(),
    )
    .await
    .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    if results.products.is_empty() {
        return Err(ApiError::new(req_id.0, "not_found", "No products found"));
    }

    Ok(Json(ApiResponse {
        data: results,
        meta: ResponseMeta::new(req_id.0),
    }))
}
