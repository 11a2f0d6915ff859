use std::sync::Arc;

use tokio::{sync::mpsc, task::JoinHandle};

use crate::db::RefreshQueue;
use crate::models::RefreshEvent;

/// Outbound side of the refresh pipeline
///
/// `publish` never blocks and never fails the caller; delivery problems are
/// logged by the implementation.
#[cfg_attr(test, mockall::automock)]
pub trait RefreshPublisher: Send + Sync {
    fn publish(&self, event: RefreshEvent);
}

/// Publisher that hands events to a background task which writes them to the queue
#[derive(Clone)]
pub struct QueuePublisher {
    event_tx: mpsc::UnboundedSender<RefreshEvent>,
}

/// Handle for flushing and stopping the publisher's writer task
pub struct PublisherHandle {
    shutdown_tx: mpsc::Sender<()>,
    task: JoinHandle<()>,
}

impl PublisherHandle {
    /// Signals the writer task and waits until queued events are written
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "Refresh publisher task panicked");
        }
        tracing::info!("Refresh publisher stopped");
    }
}

impl QueuePublisher {
    /// Creates the publisher and spawns its writer task
    pub fn start(queue: Arc<dyn RefreshQueue>) -> (Self, PublisherHandle) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let task = tokio::spawn(Self::writer_task(queue, event_rx, shutdown_rx));

        (Self { event_tx }, PublisherHandle { shutdown_tx, task })
    }

    /// Drains the event channel into the queue until told to stop
    ///
    /// Events are written one at a time in the order they were published. A
    /// failed push is logged and the task moves on to the next event. On
    /// shutdown every event already sitting in the channel is written before
    /// the task returns, so a graceful stop loses nothing that was published.
    async fn writer_task(
        queue: Arc<dyn RefreshQueue>,
        mut event_rx: mpsc::UnboundedReceiver<RefreshEvent>,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        tracing::info!("Refresh publisher task started");

        loop {
            tokio::select! {
                Some(event) = event_rx.recv() => {
                    Self::write(queue.as_ref(), event).await;
                }
                _ = shutdown_rx.recv() => {
                    // Flush whatever is buffered without waiting for new senders
                    let mut flushed = 0;
                    while let Ok(event) = event_rx.try_recv() {
                        Self::write(queue.as_ref(), event).await;
                        flushed += 1;
                    }
                    tracing::info!(flushed, "Refresh publisher flushed pending events");
                    break;
                }
                // Every sender is gone and the channel is empty
                else => break,
            }
        }
    }

    async fn write(queue: &dyn RefreshQueue, event: RefreshEvent) {
        match queue.push(&event).await {
            Ok(()) => tracing::info!(
                event_id = %event.id,
                username = %event.username,
                action = event.action.name(),
                "Refresh event queued"
            ),
            Err(e) => tracing::error!(
                error = %e,
                event_id = %event.id,
                username = %event.username,
                action = event.action.name(),
                "Failed to queue refresh event"
            ),
        }
    }
}

impl RefreshPublisher for QueuePublisher {
    fn publish(&self, event: RefreshEvent) {
        if let Err(e) = self.event_tx.send(event) {
            tracing::error!(
                event_id = %e.0.id,
                username = %e.0.username,
                "Refresh publisher is closed, event dropped"
            );
        }
    }
}
