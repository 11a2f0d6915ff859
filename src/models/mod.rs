use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

use crate::error::AppError;

mod mood_selection;
mod recommendation;
mod refresh_event;
mod user;
mod watched_movie;

pub use mood_selection::{MoodSelection, DEFAULT_PAGE};
pub use recommendation::{RecommendationRow, RecommendationStats};
pub use refresh_event::{RefreshAction, RefreshEvent};
pub use user::{NewUser, User, UserPreferences};
pub use watched_movie::{
    NewWatchedMovie, WatchedMovie, WatchedMovieFilter, WatchedMovieUpdate, WatchedMovieWithUser,
    WatchedStats,
};

// ============================================================================
// Enumerations shared with the database (`mood_type`, `movie_rating`)
// ============================================================================

/// Self-reported mood, captured per page and optionally per watched movie
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "mood_type", rename_all = "snake_case")]
pub enum Mood {
    Sad,
    JustFine,
    Neutral,
    Cheerful,
    VeryHappy,
}

impl Mood {
    pub const ALL: [Mood; 5] = [
        Mood::Sad,
        Mood::JustFine,
        Mood::Neutral,
        Mood::Cheerful,
        Mood::VeryHappy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Sad => "sad",
            Mood::JustFine => "just_fine",
            Mood::Neutral => "neutral",
            Mood::Cheerful => "cheerful",
            Mood::VeryHappy => "very_happy",
        }
    }
}

impl Display for Mood {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mood {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mood::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| {
                AppError::InvalidInput(format!(
                    "Invalid mood '{}'. Must be one of: {}",
                    s,
                    join(Mood::ALL.iter().map(Mood::as_str))
                ))
            })
    }
}

/// How a user rated a watched movie
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "movie_rating", rename_all = "snake_case")]
pub enum MovieRating {
    Disliked,
    Good,
    Loved,
}

impl MovieRating {
    pub const ALL: [MovieRating; 3] = [MovieRating::Disliked, MovieRating::Good, MovieRating::Loved];

    pub fn as_str(&self) -> &'static str {
        match self {
            MovieRating::Disliked => "disliked",
            MovieRating::Good => "good",
            MovieRating::Loved => "loved",
        }
    }
}

impl Display for MovieRating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MovieRating {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MovieRating::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| {
                AppError::InvalidInput(format!(
                    "Invalid rating '{}'. Must be one of: {}",
                    s,
                    join(MovieRating::ALL.iter().map(MovieRating::as_str))
                ))
            })
    }
}

fn join<'a>(values: impl Iterator<Item = &'a str>) -> String {
    values.collect::<Vec<_>>().join(", ")
}
