use sqlx::PgPool;

use crate::{
    error::AppResult,
    models::{Mood, MoodSelection},
};

/// Persistence for mood selections
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MoodStore: Send + Sync {
    /// Inserts or overwrites the selection for `(user_id, page)`, stamping `selected_at` now
    async fn upsert(&self, user_id: i32, page: &str, mood: Mood) -> AppResult<MoodSelection>;

    async fn latest(&self, user_id: i32, page: &str) -> AppResult<Option<MoodSelection>>;

    /// All selections of a user, newest first
    async fn list_for_user(&self, user_id: i32) -> AppResult<Vec<MoodSelection>>;
}

#[derive(Clone)]
pub struct PgMoodStore {
    pool: PgPool,
}

impl PgMoodStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl MoodStore for PgMoodStore {
    async fn upsert(&self, user_id: i32, page: &str, mood: Mood) -> AppResult<MoodSelection> {
        let selection = sqlx::query_as::<_, MoodSelection>(
            r#"
            INSERT INTO mood_selections (user_id, mood, page, selected_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (user_id, page)
            DO UPDATE SET mood = EXCLUDED.mood, selected_at = EXCLUDED.selected_at
            RETURNING id, user_id, mood, selected_at, page
            "#,
        )
        .bind(user_id)
        .bind(mood)
        .bind(page)
        .fetch_one(&self.pool)
        .await?;

        Ok(selection)
    }

    async fn latest(&self, user_id: i32, page: &str) -> AppResult<Option<MoodSelection>> {
        let selection = sqlx::query_as::<_, MoodSelection>(
            r#"
            SELECT id, user_id, mood, selected_at, page
            FROM mood_selections
            WHERE user_id = $1 AND page = $2
            ORDER BY selected_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(page)
        .fetch_optional(&self.pool)
        .await?;

        Ok(selection)
    }

    async fn list_for_user(&self, user_id: i32) -> AppResult<Vec<MoodSelection>> {
        let selections = sqlx::query_as::<_, MoodSelection>(
            r#"
            SELECT id, user_id, mood, selected_at, page
            FROM mood_selections
            WHERE user_id = $1
            ORDER BY selected_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(selections)
    }
}
