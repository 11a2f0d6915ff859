//! Recommendation refresh pipeline: API-side publisher and queue-side worker.

mod publisher;
mod runner;
mod worker;

pub use publisher::{PublisherHandle, QueuePublisher, RefreshPublisher};
pub use runner::{RecommenderRunner, ScriptRunner};
pub use worker::{disposition, Disposition, RefreshWorker};

#[cfg(test)]
pub use publisher::MockRefreshPublisher;
