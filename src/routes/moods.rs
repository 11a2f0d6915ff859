use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use serde::{Deserialize, Serialize};

use super::required;
use crate::{
    api::ApiResponse,
    error::AppResult,
    models::{Mood, MoodSelection, DEFAULT_PAGE},
    services::{mood_gate::page_or_default, MoodGate},
};

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RecordMoodRequest {
    pub mood: Option<String>,
    pub page: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ShouldShowResponse {
    pub should_show: bool,
    pub page: String,
}

/// GET /api/moods/user/:user_id/should-show
pub async fn should_show(
    State(gate): State<MoodGate>,
    path: Result<Path<i32>, PathRejection>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> AppResult<ApiResponse<ShouldShowResponse>> {
    let Path(user_id) = path?;
    let Query(query) = query?;
    let page = page_or_default(query.page);

    let should_show = gate.should_show(user_id, &page).await;
    Ok(ApiResponse::ok(ShouldShowResponse { should_show, page }))
}

/// GET /api/moods/user/:user_id/latest
pub async fn latest(
    State(gate): State<MoodGate>,
    path: Result<Path<i32>, PathRejection>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> AppResult<ApiResponse<Option<MoodSelection>>> {
    let Path(user_id) = path?;
    let Query(query) = query?;

    let selection = gate.latest(user_id, &page_or_default(query.page)).await?;
    Ok(ApiResponse::ok(selection))
}

/// GET /api/moods/user/:user_id
pub async fn history(
    State(gate): State<MoodGate>,
    path: Result<Path<i32>, PathRejection>,
) -> AppResult<ApiResponse<Vec<MoodSelection>>> {
    let Path(user_id) = path?;
    Ok(ApiResponse::ok(gate.history(user_id).await?))
}

/// POST /api/moods/user/:user_id
pub async fn record(
    State(gate): State<MoodGate>,
    path: Result<Path<i32>, PathRejection>,
    body: Result<Json<RecordMoodRequest>, JsonRejection>,
) -> AppResult<ApiResponse<MoodSelection>> {
    let Path(user_id) = path?;
    let Json(body) = body?;

    let mood: Mood = required(body.mood, "mood")?.parse()?;
    // Query strings fall back to the main page on blank input; an explicit
    // body value is validated as given
    let page = body.page.unwrap_or_else(|| DEFAULT_PAGE.to_string());

    let selection = gate.record_selection(user_id, &page, mood).await?;
    Ok(ApiResponse::ok(selection).with_message("Mood selection saved"))
}
