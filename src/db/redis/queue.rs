use redis::AsyncCommands;
use redis::Client;
use std::fmt::Display;

use crate::error::AppResult;
use crate::models::RefreshEvent;

/// Redis keys used by the refresh pipeline
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueueKey {
    /// Events waiting for the worker
    Pending(String),
    /// Events that exhausted their attempts or could not be parsed
    DeadLetter(String),
}

impl Display for QueueKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueueKey::Pending(prefix) => write!(f, "{}:pending", prefix),
            QueueKey::DeadLetter(prefix) => write!(f, "{}:dead", prefix),
        }
    }
}

/// Creates a Redis client for the refresh queue
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

/// A FIFO of refresh events shared by the API and the refresh worker
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RefreshQueue: Send + Sync {
    async fn push(&self, event: &RefreshEvent) -> AppResult<()>;

    /// Waits up to `timeout_secs` for the oldest event
    async fn pop(&self, timeout_secs: u64) -> AppResult<Option<RefreshEvent>>;

    async fn dead_letter(&self, event: &RefreshEvent) -> AppResult<()>;
}

/// Refresh queue stored as Redis lists (LPUSH / BRPOP)
#[derive(Clone)]
pub struct RedisRefreshQueue {
    client: Client,
    pending: String,
    dead: String,
}

impl RedisRefreshQueue {
    pub fn new(client: Client, prefix: &str) -> Self {
        Self {
            client,
            pending: QueueKey::Pending(prefix.to_string()).to_string(),
            dead: QueueKey::DeadLetter(prefix.to_string()).to_string(),
        }
    }

    async fn push_raw(&self, key: &str, payload: String) -> AppResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let _: () = conn.lpush(key, payload).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl RefreshQueue for RedisRefreshQueue {
    async fn push(&self, event: &RefreshEvent) -> AppResult<()> {
        let payload = encode(event)?;
        self.push_raw(&self.pending, payload).await
    }

    /// Blocks on BRPOP for up to `timeout_secs`
    ///
    /// LPUSH on one end and BRPOP on the other keeps the list FIFO. A payload
    /// that does not decode is moved to the dead-letter list as-is and reported
    /// as an empty pop, so one bad message cannot wedge the worker.
    async fn pop(&self, timeout_secs: u64) -> AppResult<Option<RefreshEvent>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let popped: Option<(String, String)> = redis::cmd("BRPOP")
            .arg(&self.pending)
            .arg(timeout_secs)
            .query_async(&mut conn)
            .await?;

        // BRPOP replies with (key, value), or nil on timeout
        let Some((_, payload)) = popped else {
            return Ok(None);
        };

        match serde_json::from_str::<RefreshEvent>(&payload) {
            Ok(event) => Ok(Some(event)),
            Err(e) => {
                tracing::error!(error = %e, payload = %payload, "Discarding malformed refresh event");
                self.push_raw(&self.dead, payload).await?;
                Ok(None)
            }
        }
    }

    async fn dead_letter(&self, event: &RefreshEvent) -> AppResult<()> {
        let payload = encode(event)?;
        self.push_raw(&self.dead, payload).await
    }
}

fn encode(event: &RefreshEvent) -> AppResult<String> {
    serde_json::to_string(event).map_err(|e| {
        crate::error::AppError::Internal(format!("Refresh event serialization error: {}", e))
    })
}
