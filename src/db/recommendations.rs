use sqlx::PgPool;

use crate::{
    error::AppResult,
    models::{RecommendationRow, RecommendationStats},
};

/// Read access to the per-profile recommendation tables
///
/// `table` must come from [`crate::config::Profiles::dashboard_table`]; it is
/// spliced into the SQL as an identifier.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RecommendationStore: Send + Sync {
    /// Top `limit` active rows by score, optionally in random order
    async fn active(
        &self,
        table: &str,
        limit: i64,
        shuffle: bool,
    ) -> AppResult<Vec<RecommendationRow>>;

    async fn stats(&self, table: &str) -> AppResult<RecommendationStats>;
}

#[derive(Clone)]
pub struct PgRecommendationStore {
    pool: PgPool,
}

impl PgRecommendationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl RecommendationStore for PgRecommendationStore {
    /// Reads the best `limit` active rows of a profile dashboard
    ///
    /// `table` must come from the profile allow-list; it is interpolated into
    /// the statement because identifiers cannot be bound. Shuffling happens
    /// after the top-N cut, so it reorders the best rows rather than sampling
    /// the whole table.
    async fn active(
        &self,
        table: &str,
        limit: i64,
        shuffle: bool,
    ) -> AppResult<Vec<RecommendationRow>> {
        let order = if shuffle {
            "RANDOM()"
        } else {
            "similarity_score DESC, added_at DESC"
        };
        let sql = format!(
            r#"
            SELECT * FROM (
                SELECT tmdb_id, title, genres, vote_average, popularity, overview,
                       poster_path, similarity_score, recommendation_reason, added_at
                FROM "{table}"
                WHERE is_active = TRUE
                ORDER BY similarity_score DESC, added_at DESC
                LIMIT $1
            ) top
            ORDER BY {order}
            "#
        );

        let rows = sqlx::query_as::<_, RecommendationRow>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    async fn stats(&self, table: &str) -> AppResult<RecommendationStats> {
        let sql = format!(
            r#"
            SELECT
                COUNT(*) FILTER (WHERE is_active) AS active_recommendations,
                COUNT(*) AS total_recommendations,
                COALESCE(AVG(similarity_score) FILTER (WHERE is_active), 0)::DOUBLE PRECISION
                    AS average_similarity_score
            FROM "{table}"
            "#
        );

        let stats = sqlx::query_as::<_, RecommendationStats>(&sql)
            .fetch_one(&self.pool)
            .await?;

        Ok(stats)
    }
}
