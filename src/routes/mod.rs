use std::str::FromStr;

use axum::{http::StatusCode, Json};
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};

pub mod moods;
pub mod recommendations;
pub mod users;
pub mod voice;
pub mod watched_movies;

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({ "success": true, "status": "healthy" })),
    )
}

/// Parses an optional query-string enum, e.g. a `?rating=` filter
///
/// An empty parameter (`?rating=`) counts as absent. Body fields go through
/// [`parse_field`] instead, where an empty string is an invalid value.
pub(crate) fn parse_optional<T>(value: Option<String>) -> AppResult<Option<T>>
where
    T: FromStr<Err = AppError>,
{
    value
        .filter(|v| !v.is_empty())
        .map(|v| v.parse())
        .transpose()
}

/// Parses an optional JSON body enum; a present value must be valid
pub(crate) fn parse_field<T>(value: Option<String>) -> AppResult<Option<T>>
where
    T: FromStr<Err = AppError>,
{
    value.as_deref().map(str::parse).transpose()
}

/// Unwraps a body field the handler cannot do without
pub(crate) fn required<T>(value: Option<T>, field: &str) -> AppResult<T> {
    value.ok_or_else(|| AppError::InvalidInput(format!("{} is required", field)))
}
