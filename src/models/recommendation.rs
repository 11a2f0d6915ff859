use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One cached recommendation from a profile's dashboard table
///
/// Rows are produced by the external recommender; this service only reads them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct RecommendationRow {
    pub tmdb_id: i32,
    pub title: String,
    pub genres: Vec<String>,
    pub vote_average: Option<f64>,
    pub popularity: Option<f64>,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub similarity_score: f64,
    pub recommendation_reason: Option<String>,
    pub added_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct RecommendationStats {
    pub active_recommendations: i64,
    pub total_recommendations: i64,
    pub average_similarity_score: f64,
}
