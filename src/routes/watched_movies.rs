use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use serde::{Deserialize, Serialize};

use super::{parse_field, parse_optional, required};
use crate::{
    api::ApiResponse,
    error::AppResult,
    models::{
        NewWatchedMovie, WatchedMovie, WatchedMovieFilter, WatchedMovieUpdate,
        WatchedMovieWithUser, WatchedStats,
    },
    services::WatchedMovieTracker,
};

#[derive(Debug, Deserialize)]
pub struct MarkWatchedRequest {
    pub movie_id: Option<i32>,
    pub tmdb_id: Option<i32>,
    pub title: Option<String>,
    pub rating: Option<String>,
    pub current_mood: Option<String>,
}

impl MarkWatchedRequest {
    fn into_new_movie(self) -> AppResult<NewWatchedMovie> {
        Ok(NewWatchedMovie {
            movie_id: required(self.movie_id, "movie_id")?,
            tmdb_id: required(self.tmdb_id, "tmdb_id")?,
            title: required(self.title, "title")?,
            rating: required(self.rating, "rating")?.parse()?,
            current_mood: parse_field(self.current_mood)?,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateWatchedRequest {
    pub rating: Option<String>,
    pub current_mood: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WatchedFilterQuery {
    pub rating: Option<String>,
    pub mood: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct WatchedStatus {
    pub is_watched: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub movie: Option<WatchedMovie>,
}

/// GET /api/watched-movies
pub async fn list_all(
    State(tracker): State<WatchedMovieTracker>,
) -> AppResult<ApiResponse<Vec<WatchedMovieWithUser>>> {
    Ok(ApiResponse::ok(tracker.list_all().await?))
}

/// GET /api/watched-movies/user/:user_id
pub async fn list_for_user(
    State(tracker): State<WatchedMovieTracker>,
    path: Result<Path<i32>, PathRejection>,
    query: Result<Query<WatchedFilterQuery>, QueryRejection>,
) -> AppResult<ApiResponse<Vec<WatchedMovie>>> {
    let Path(user_id) = path?;
    let Query(query) = query?;

    let filter = WatchedMovieFilter {
        rating: parse_optional(query.rating)?,
        mood: parse_optional(query.mood)?,
    };
    Ok(ApiResponse::ok(tracker.list_for_user(user_id, filter).await?))
}

/// GET /api/watched-movies/user/:user_id/stats
pub async fn stats(
    State(tracker): State<WatchedMovieTracker>,
    path: Result<Path<i32>, PathRejection>,
) -> AppResult<ApiResponse<WatchedStats>> {
    let Path(user_id) = path?;
    Ok(ApiResponse::ok(tracker.stats_for_user(user_id).await?))
}

/// GET /api/watched-movies/user/:user_id/status/:tmdb_id
pub async fn status(
    State(tracker): State<WatchedMovieTracker>,
    path: Result<Path<(i32, i32)>, PathRejection>,
) -> AppResult<ApiResponse<WatchedStatus>> {
    let Path((user_id, tmdb_id)) = path?;

    let movie = tracker.status(user_id, tmdb_id).await?;
    Ok(ApiResponse::ok(WatchedStatus {
        is_watched: movie.is_some(),
        movie,
    }))
}

/// POST /api/watched-movies/user/:user_id
pub async fn mark_watched(
    State(tracker): State<WatchedMovieTracker>,
    path: Result<Path<i32>, PathRejection>,
    body: Result<Json<MarkWatchedRequest>, JsonRejection>,
) -> AppResult<ApiResponse<WatchedMovie>> {
    let Path(user_id) = path?;
    let Json(body) = body?;

    let movie = tracker
        .mark_watched(user_id, body.into_new_movie()?)
        .await?;
    Ok(ApiResponse::created(movie).with_message("Movie marked as watched"))
}

/// PUT /api/watched-movies/user/:user_id/:tmdb_id
pub async fn update(
    State(tracker): State<WatchedMovieTracker>,
    path: Result<Path<(i32, i32)>, PathRejection>,
    body: Result<Json<UpdateWatchedRequest>, JsonRejection>,
) -> AppResult<ApiResponse<WatchedMovie>> {
    let Path((user_id, tmdb_id)) = path?;
    let Json(body) = body?;

    let update = WatchedMovieUpdate {
        rating: parse_field(body.rating)?,
        current_mood: parse_field(body.current_mood)?,
    };

    let movie = tracker.update(user_id, tmdb_id, update).await?;
    Ok(ApiResponse::ok(movie).with_message("Watched movie updated"))
}

/// DELETE /api/watched-movies/user/:user_id/:tmdb_id
pub async fn remove(
    State(tracker): State<WatchedMovieTracker>,
    path: Result<Path<(i32, i32)>, PathRejection>,
) -> AppResult<ApiResponse<()>> {
    let Path((user_id, tmdb_id)) = path?;
    tracker.remove(user_id, tmdb_id).await?;
    Ok(ApiResponse::message("Movie removed from watched list"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::{Mood, MovieRating};

    fn request() -> MarkWatchedRequest {
        MarkWatchedRequest {
            movie_id: Some(550),
            tmdb_id: Some(550),
            title: Some("Fight Club".to_string()),
            rating: Some("loved".to_string()),
            current_mood: Some("very_happy".to_string()),
        }
    }

    #[test]
    fn test_mark_watched_request_parses_enums() {
        let movie = request().into_new_movie().unwrap();
        assert_eq!(movie.rating, MovieRating::Loved);
        assert_eq!(movie.current_mood, Some(Mood::VeryHappy));
    }

    #[test]
    fn test_mark_watched_request_requires_rating() {
        let body = MarkWatchedRequest {
            rating: None,
            ..request()
        };
        assert!(matches!(
            body.into_new_movie(),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_mark_watched_request_rejects_empty_mood() {
        let body = MarkWatchedRequest {
            current_mood: Some(String::new()),
            ..request()
        };
        assert!(matches!(
            body.into_new_movie(),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_mark_watched_request_rejects_unknown_mood() {
        let body = MarkWatchedRequest {
            current_mood: Some("ecstatic".to_string()),
            ..request()
        };
        assert!(matches!(
            body.into_new_movie(),
            Err(AppError::InvalidInput(_))
        ));
    }
}
