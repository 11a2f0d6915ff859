use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;

use firetv_api::{
    api::{create_router, AppState},
    config::{Config, Profiles},
    db::{self, RedisRefreshQueue, Stores},
    services::refresh::QueuePublisher,
    telemetry,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    telemetry::init_tracing();

    let profiles = Profiles::new(config.profiles.clone())?;
    tracing::info!(profiles = ?profiles.names(), "Configuration loaded");

    let pool = db::create_pool(&config).await?;
    if config.run_migrations {
        db::run_migrations(&pool).await?;
    }

    let redis = db::create_redis_client(&config.redis_url)?;
    let queue = Arc::new(RedisRefreshQueue::new(redis, &config.refresh_queue_prefix));
    let (publisher, publisher_handle) = QueuePublisher::start(queue);

    let state = AppState::new(
        Stores::postgres(pool.clone()),
        Arc::new(publisher),
        profiles,
        &config,
    );
    let app = create_router(state);

    let address = config.address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind to {}", address))?;
    tracing::info!(%address, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(telemetry::shutdown_signal())
        .await?;

    // Write out any refresh events still buffered before the pool goes away
    publisher_handle.shutdown().await;
    pool.close().await;
    tracing::info!("Server shutdown complete");

    Ok(())
}
