use std::{future::Future, sync::Arc, time::Duration};

use crate::{
    db::RefreshQueue,
    error::AppResult,
    models::RefreshEvent,
};

use super::RecommenderRunner;

const POLL_TIMEOUT_SECS: u64 = 5;
const ERROR_BACKOFF: Duration = Duration::from_secs(2);

/// What happened to an event after one attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Completed,
    Retried,
    DeadLettered,
}

/// Decides the fate of an event given the outcome of its latest attempt
pub fn disposition(event: &RefreshEvent, succeeded: bool, max_attempts: u32) -> Disposition {
    if succeeded {
        Disposition::Completed
    } else if event.attempt + 1 < max_attempts {
        Disposition::Retried
    } else {
        Disposition::DeadLettered
    }
}

/// Consumes refresh events and drives the external recommender
pub struct RefreshWorker {
    queue: Arc<dyn RefreshQueue>,
    runner: Arc<dyn RecommenderRunner>,
    max_attempts: u32,
}

impl RefreshWorker {
    pub fn new(
        queue: Arc<dyn RefreshQueue>,
        runner: Arc<dyn RecommenderRunner>,
        max_attempts: u32,
    ) -> Self {
        Self {
            queue,
            runner,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Processes events until `shutdown` resolves
    ///
    /// Shutdown is only observed between pops, so an event that has left the
    /// queue is always run and completed, re-queued or dead-lettered first.
    /// The worker therefore stops within one poll timeout plus the run time of
    /// the event in hand.
    pub async fn run(self, shutdown: impl Future<Output = ()>) {
        tracing::info!(max_attempts = self.max_attempts, "Refresh worker started");
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => break,
                _ = std::future::ready(()) => {}
            }

            if let Err(e) = self.process_next().await {
                tracing::error!(error = %e, "Refresh queue unavailable, backing off");
                tokio::time::sleep(ERROR_BACKOFF).await;
            }
        }

        tracing::info!("Refresh worker stopped");
    }

    /// Pops and handles at most one event
    pub async fn process_next(&self) -> AppResult<Option<Disposition>> {
        match self.queue.pop(POLL_TIMEOUT_SECS).await? {
            Some(event) => self.handle(event).await.map(Some),
            None => Ok(None),
        }
    }

    /// Runs one attempt for `event` and re-queues or dead-letters it on failure
    ///
    /// A failed attempt goes back on the queue with its attempt counter bumped
    /// until `max_attempts` is reached; after that the event is parked on the
    /// dead-letter list untouched. Only a queue error is returned, never the
    /// runner's own failure.
    pub async fn handle(&self, event: RefreshEvent) -> AppResult<Disposition> {
        let outcome = self.runner.run(&event.username, event.action).await;
        let next = disposition(&event, outcome.is_ok(), self.max_attempts);

        match (&outcome, next) {
            (_, Disposition::Completed) => {
                tracing::info!(
                    event_id = %event.id,
                    username = %event.username,
                    action = event.action.name(),
                    attempt = event.attempt,
                    "Recommender action completed"
                );
            }
            (Err(e), Disposition::Retried) => {
                tracing::warn!(
                    error = %e,
                    event_id = %event.id,
                    username = %event.username,
                    action = event.action.name(),
                    attempt = event.attempt,
                    "Recommender action failed, re-queueing"
                );
                self.queue.push(&event.next_attempt()).await?;
            }
            (outcome, _) => {
                tracing::error!(
                    error = ?outcome.as_ref().err(),
                    event_id = %event.id,
                    username = %event.username,
                    action = event.action.name(),
                    attempt = event.attempt,
                    "Recommender action failed permanently"
                );
                self.queue.dead_letter(&event).await?;
            }
        }

        Ok(next)
    }
}
