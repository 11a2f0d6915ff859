use std::sync::Arc;

use sqlx::PgPool;

pub mod moods;
pub mod postgres;
pub mod recommendations;
pub mod redis;
pub mod users;
pub mod watched_movies;

pub use moods::{MoodStore, PgMoodStore};
pub use postgres::{create_pool, run_migrations};
pub use recommendations::{PgRecommendationStore, RecommendationStore};
pub use self::redis::{create_redis_client, QueueKey, RedisRefreshQueue, RefreshQueue};
pub use users::{PgUserStore, UserStore};
pub use watched_movies::{PgWatchedMovieStore, WatchedMovieStore};

/// Every store the services depend on
#[derive(Clone)]
pub struct Stores {
    pub moods: Arc<dyn MoodStore>,
    pub watched_movies: Arc<dyn WatchedMovieStore>,
    pub users: Arc<dyn UserStore>,
    pub recommendations: Arc<dyn RecommendationStore>,
}

impl Stores {
    /// Postgres-backed stores sharing one pool
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            moods: Arc::new(PgMoodStore::new(pool.clone())),
            watched_movies: Arc::new(PgWatchedMovieStore::new(pool.clone())),
            users: Arc::new(PgUserStore::new(pool.clone())),
            recommendations: Arc::new(PgRecommendationStore::new(pool)),
        }
    }
}
