use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{Mood, MovieRating};

/// A user's watched/rating record for one TMDB movie
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct WatchedMovie {
    pub id: i32,
    pub user_id: i32,
    pub movie_id: i32,
    pub tmdb_id: i32,
    pub title: String,
    pub watched_at: DateTime<Utc>,
    pub rating: MovieRating,
    pub current_mood: Option<Mood>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Watched record joined with its owner
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct WatchedMovieWithUser {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub movie: WatchedMovie,
    pub username: String,
    pub display_name: String,
}

/// Input for marking a movie as watched
#[derive(Debug, Clone, PartialEq)]
pub struct NewWatchedMovie {
    pub movie_id: i32,
    pub tmdb_id: i32,
    pub title: String,
    pub rating: MovieRating,
    pub current_mood: Option<Mood>,
}

/// Partial update of a watched record; `None` fields are left untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WatchedMovieUpdate {
    pub rating: Option<MovieRating>,
    pub current_mood: Option<Mood>,
}

impl WatchedMovieUpdate {
    pub fn is_empty(&self) -> bool {
        self.rating.is_none() && self.current_mood.is_none()
    }
}

/// Optional filters for listing a user's watched movies
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WatchedMovieFilter {
    pub rating: Option<MovieRating>,
    pub mood: Option<Mood>,
}

/// Per-rating totals for one user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct WatchedStats {
    pub total: i64,
    pub disliked: i64,
    pub good: i64,
    pub loved: i64,
}
