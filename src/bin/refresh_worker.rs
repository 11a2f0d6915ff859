//! Consumes the refresh queue and runs the external recommender for each event.

use std::sync::Arc;

use firetv_api::{
    config::Config,
    db::{self, RedisRefreshQueue},
    services::refresh::{RefreshWorker, ScriptRunner},
    telemetry,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    telemetry::init_tracing();

    let redis = db::create_redis_client(&config.redis_url)?;
    let queue = Arc::new(RedisRefreshQueue::new(redis, &config.refresh_queue_prefix));
    let runner = Arc::new(ScriptRunner::from_config(&config));

    tracing::info!(
        program = %config.recommender_program,
        script = %config.recommender_script,
        timeout_secs = config.recommender_timeout_secs,
        queue = %config.refresh_queue_prefix,
        "Starting refresh worker"
    );

    RefreshWorker::new(queue, runner, config.refresh_max_attempts)
        .run(telemetry::shutdown_signal())
        .await;

    Ok(())
}
