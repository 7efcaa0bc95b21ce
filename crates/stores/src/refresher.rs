//! Keeps the history store in step with generation events.
//!
//! On `Submitted` a placeholder is added so the new task shows up at once;
//! on `Concluded` the task waits for the settle delay and then silently
//! re-fetches history so the confirmed record replaces the placeholder.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::events::GenerationEvent;
use crate::history::HistoryStore;

/// Spawn the refresher. It runs until `cancel` fires or the event channel
/// closes.
pub fn spawn_history_refresher(
    history: Arc<HistoryStore>,
    mut events: broadcast::Receiver<GenerationEvent>,
    delay: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let event = tokio::select! {
                _ = cancel.cancelled() => break,
                event = events.recv() => event,
            };

            match event {
                Ok(GenerationEvent::Submitted { task_id, request }) => {
                    history.add_placeholder(&task_id, &request).await;
                }
                Ok(GenerationEvent::Concluded { task_id }) => {
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = tokio::time::sleep(delay) => {}
                    }
                    tracing::debug!(task_id = %task_id, "Refreshing history after task concluded");
                    history.refresh().await;
                }
                Ok(GenerationEvent::StatusChanged { .. }) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "History refresher lagged behind generation events");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
        tracing::debug!("History refresher stopped");
    })
}
