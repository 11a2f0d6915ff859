use axum::extract::{
    rejection::{PathRejection, QueryRejection},
    Path, Query, State,
};
use serde::Deserialize;

use crate::{
    api::ApiResponse,
    error::AppResult,
    models::{RecommendationRow, RecommendationStats, RefreshEvent},
    services::RecommendationService,
};

#[derive(Debug, Deserialize)]
pub struct RecommendationQuery {
    pub limit: Option<i64>,
    pub shuffle: Option<bool>,
}

/// GET /api/recommendations/:username
pub async fn list(
    State(service): State<RecommendationService>,
    path: Result<Path<String>, PathRejection>,
    query: Result<Query<RecommendationQuery>, QueryRejection>,
) -> AppResult<ApiResponse<Vec<RecommendationRow>>> {
    let Path(username) = path?;
    let Query(query) = query?;

    let rows = service
        .for_profile(&username, query.limit, query.shuffle)
        .await?;
    Ok(ApiResponse::ok(rows))
}

/// GET /api/recommendations/:username/stats
pub async fn stats(
    State(service): State<RecommendationService>,
    path: Result<Path<String>, PathRejection>,
) -> AppResult<ApiResponse<RecommendationStats>> {
    let Path(username) = path?;
    Ok(ApiResponse::ok(service.stats(&username).await?))
}

/// POST /api/recommendations/:username/refresh
pub async fn refresh(
    State(service): State<RecommendationService>,
    path: Result<Path<String>, PathRejection>,
) -> AppResult<ApiResponse<RefreshEvent>> {
    let Path(username) = path?;
    let event = service.request_refresh(&username)?;
    Ok(ApiResponse::accepted(event).with_message("Refresh queued"))
}
