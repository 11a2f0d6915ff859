use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::config::Config;

/// Creates a PostgreSQL connection pool
///
/// Pool size and timeouts are fixed at start-up; the driver handles
/// connection reuse and health checks.
pub async fn create_pool(config: &Config) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
        .idle_timeout(Duration::from_secs(config.database_idle_timeout_secs))
        .connect(&config.database_url)
        .await?;

    tracing::info!(
        max_connections = config.database_max_connections,
        connect_timeout_secs = config.database_connect_timeout_secs,
        idle_timeout_secs = config.database_idle_timeout_secs,
        "Database pool ready"
    );

    Ok(pool)
}

/// Applies the embedded schema migrations
pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    tracing::info!("Database migrations applied");
    Ok(())
}
