use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Json,
};
use serde::Deserialize;

use crate::{
    api::ApiResponse,
    error::AppResult,
    models::{User, UserPreferences},
    services::{SignupRequest, UserService},
};

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub username: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub preferences: Option<UserPreferences>,
}

impl From<CreateUserRequest> for SignupRequest {
    fn from(body: CreateUserRequest) -> Self {
        Self {
            username: body.username,
            email: body.email,
            display_name: body.display_name,
            avatar_url: body.avatar_url,
            preferences: body.preferences,
        }
    }
}

/// GET /api/users
pub async fn list(State(users): State<UserService>) -> AppResult<ApiResponse<Vec<User>>> {
    Ok(ApiResponse::ok(users.list().await?))
}

/// POST /api/users
pub async fn create(
    State(users): State<UserService>,
    body: Result<Json<CreateUserRequest>, JsonRejection>,
) -> AppResult<ApiResponse<User>> {
    let Json(body) = body?;
    let user = users.create(body.into()).await?;
    Ok(ApiResponse::created(user).with_message("User created"))
}

/// GET /api/users/:id
pub async fn get(
    State(users): State<UserService>,
    path: Result<Path<i32>, PathRejection>,
) -> AppResult<ApiResponse<User>> {
    let Path(id) = path?;
    Ok(ApiResponse::ok(users.get(id).await?))
}

/// GET /api/users/username/:username
pub async fn get_by_username(
    State(users): State<UserService>,
    path: Result<Path<String>, PathRejection>,
) -> AppResult<ApiResponse<User>> {
    let Path(username) = path?;
    Ok(ApiResponse::ok(users.get_by_username(&username).await?))
}

/// PUT /api/users/:id/preferences
pub async fn update_preferences(
    State(users): State<UserService>,
    path: Result<Path<i32>, PathRejection>,
    body: Result<Json<UserPreferences>, JsonRejection>,
) -> AppResult<ApiResponse<User>> {
    let Path(id) = path?;
    let Json(preferences) = body?;

    let user = users.update_preferences(id, preferences).await?;
    Ok(ApiResponse::ok(user).with_message("Preferences updated"))
}

/// DELETE /api/users/:id
pub async fn delete(
    State(users): State<UserService>,
    path: Result<Path<i32>, PathRejection>,
) -> AppResult<ApiResponse<()>> {
    let Path(id) = path?;
    users.delete(id).await?;
    Ok(ApiResponse::message("User deleted"))
}
