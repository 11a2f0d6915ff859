pub mod queue;

pub use queue::create_redis_client;
pub use queue::QueueKey;
pub use queue::RedisRefreshQueue;
pub use queue::RefreshQueue;
