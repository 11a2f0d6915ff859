use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::{
    error::AppResult,
    models::{
        NewWatchedMovie, WatchedMovie, WatchedMovieFilter, WatchedMovieUpdate,
        WatchedMovieWithUser, WatchedStats,
    },
};

const WATCHED_COLUMNS: &str = "id, user_id, movie_id, tmdb_id, title, watched_at, rating, \
                               current_mood, created_at, updated_at";

/// Persistence for watched-movie records
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait WatchedMovieStore: Send + Sync {
    /// Inserts or overwrites the record for `(user_id, tmdb_id)`, renewing `watched_at`
    async fn upsert(&self, user_id: i32, movie: NewWatchedMovie) -> AppResult<WatchedMovie>;

    /// Applies a non-empty partial update; `None` when no row matched
    async fn update(
        &self,
        user_id: i32,
        tmdb_id: i32,
        update: WatchedMovieUpdate,
    ) -> AppResult<Option<WatchedMovie>>;

    async fn find(&self, user_id: i32, tmdb_id: i32) -> AppResult<Option<WatchedMovie>>;

    /// Returns the number of deleted rows
    async fn delete(&self, user_id: i32, tmdb_id: i32) -> AppResult<u64>;

    async fn list_for_user(
        &self,
        user_id: i32,
        filter: WatchedMovieFilter,
    ) -> AppResult<Vec<WatchedMovie>>;

    async fn stats_for_user(&self, user_id: i32) -> AppResult<WatchedStats>;

    async fn list_all(&self) -> AppResult<Vec<WatchedMovieWithUser>>;
}

#[derive(Clone)]
pub struct PgWatchedMovieStore {
    pool: PgPool,
}

impl PgWatchedMovieStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl WatchedMovieStore for PgWatchedMovieStore {
    async fn upsert(&self, user_id: i32, movie: NewWatchedMovie) -> AppResult<WatchedMovie> {
        let sql = format!(
            r#"
            INSERT INTO watched_movies (user_id, movie_id, tmdb_id, title, rating, current_mood, watched_at)
            VALUES ($1, $2, $3, $4, $5, $6, NOW())
            ON CONFLICT (user_id, tmdb_id)
            DO UPDATE SET
                rating = EXCLUDED.rating,
                current_mood = EXCLUDED.current_mood,
                watched_at = NOW(),
                updated_at = NOW()
            RETURNING {WATCHED_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, WatchedMovie>(&sql)
            .bind(user_id)
            .bind(movie.movie_id)
            .bind(movie.tmdb_id)
            .bind(movie.title)
            .bind(movie.rating)
            .bind(movie.current_mood)
            .fetch_one(&self.pool)
            .await?;

        Ok(row)
    }

    /// Applies a partial edit to one watched row
    ///
    /// Only the fields present in `update` are written. `watched_at` is left
    /// alone; re-marking the movie is what renews it. Returns `None` when the
    /// user has no row for `tmdb_id`.
    async fn update(
        &self,
        user_id: i32,
        tmdb_id: i32,
        update: WatchedMovieUpdate,
    ) -> AppResult<Option<WatchedMovie>> {
        // SET list grows with the supplied fields; updated_at is always bumped
        // so the statement is valid even when the caller sent nothing
        let mut query = QueryBuilder::<Postgres>::new("UPDATE watched_movies SET ");
        {
            let mut set = query.separated(", ");
            if let Some(rating) = update.rating {
                set.push("rating = ").push_bind_unseparated(rating);
            }
            if let Some(mood) = update.current_mood {
                set.push("current_mood = ").push_bind_unseparated(mood);
            }
            set.push("updated_at = NOW()");
        }
        // Scope to the user's own row
        query
            .push(" WHERE user_id = ")
            .push_bind(user_id)
            .push(" AND tmdb_id = ")
            .push_bind(tmdb_id)
            .push(" RETURNING ")
            .push(WATCHED_COLUMNS);

        let row = query
            .build_query_as::<WatchedMovie>()
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    async fn find(&self, user_id: i32, tmdb_id: i32) -> AppResult<Option<WatchedMovie>> {
        let sql = format!(
            "SELECT {WATCHED_COLUMNS} FROM watched_movies WHERE user_id = $1 AND tmdb_id = $2"
        );

        let row = sqlx::query_as::<_, WatchedMovie>(&sql)
            .bind(user_id)
            .bind(tmdb_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    async fn delete(&self, user_id: i32, tmdb_id: i32) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM watched_movies WHERE user_id = $1 AND tmdb_id = $2")
            .bind(user_id)
            .bind(tmdb_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn list_for_user(
        &self,
        user_id: i32,
        filter: WatchedMovieFilter,
    ) -> AppResult<Vec<WatchedMovie>> {
        let mut query = QueryBuilder::<Postgres>::new("SELECT ");
        query
            .push(WATCHED_COLUMNS)
            .push(" FROM watched_movies WHERE user_id = ")
            .push_bind(user_id);

        if let Some(rating) = filter.rating {
            query.push(" AND rating = ").push_bind(rating);
        }
        if let Some(mood) = filter.mood {
            query.push(" AND current_mood = ").push_bind(mood);
        }
        query.push(" ORDER BY watched_at DESC");

        let rows = query
            .build_query_as::<WatchedMovie>()
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    async fn stats_for_user(&self, user_id: i32) -> AppResult<WatchedStats> {
        let stats = sqlx::query_as::<_, WatchedStats>(
            r#"
            SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE rating = 'disliked') AS disliked,
                COUNT(*) FILTER (WHERE rating = 'good') AS good,
                COUNT(*) FILTER (WHERE rating = 'loved') AS loved
            FROM watched_movies
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(stats)
    }

    async fn list_all(&self) -> AppResult<Vec<WatchedMovieWithUser>> {
        let rows = sqlx::query_as::<_, WatchedMovieWithUser>(
            r#"
            SELECT wm.id, wm.user_id, wm.movie_id, wm.tmdb_id, wm.title, wm.watched_at,
                   wm.rating, wm.current_mood, wm.created_at, wm.updated_at,
                   u.username, u.display_name
            FROM watched_movies wm
            JOIN users u ON u.id = wm.user_id
            ORDER BY wm.watched_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
