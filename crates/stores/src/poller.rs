//! Status polling for one accepted task.
//!
//! [`run_poll_loop`] queries `GET /status/{task_id}` until the task reaches
//! a terminal state or [`PollConfig::max_attempts`] queries have been made.
//! The loop's [`CancellationToken`] is checked before each query, during
//! each wait and (under the state lock) before each mutation; a cancelled
//! loop leaves the store untouched and never signals completion.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use vidgen_client::dto::StatusResponse;
use vidgen_core::status::TaskStatus;

use crate::events::GenerationEvent;
use crate::generation::GenerationShared;

/// Failure text used when the backend reports a failure without a reason.
pub const DEFAULT_FAILURE_MESSAGE: &str = "Video generation failed";

/// Error recorded when the attempt budget runs out.
pub const TIMEOUT_MESSAGE: &str = "Video generation timed out";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Upper bound on status queries for one task.
    pub max_attempts: u32,
    /// Wait between consecutive queries.
    pub interval: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            max_attempts: 60,
            interval: Duration::from_millis(5_000),
        }
    }
}

/// How a polling loop ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PollOutcome {
    Completed { video_url: String },
    Failed { message: String },
    /// Every query succeeded but the task never reached a terminal state.
    TimedOut,
    /// The last allowed query failed.
    QueryFailed { message: String },
    Cancelled,
}

/// Interpretation of one status response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PollStep {
    Completed(String),
    Failed(String),
    Waiting(TaskStatus),
}

/// A `done` status only counts once the video reference is present;
/// until then the task is shown as processing.
pub(crate) fn classify(response: &StatusResponse) -> PollStep {
    match response.status {
        TaskStatus::Done => match response.video_url.as_deref().filter(|u| !u.is_empty()) {
            Some(url) => PollStep::Completed(url.to_string()),
            None => PollStep::Waiting(TaskStatus::Processing),
        },
        TaskStatus::Failed => PollStep::Failed(
            response
                .failure_message()
                .unwrap_or(DEFAULT_FAILURE_MESSAGE)
                .to_string(),
        ),
        other => PollStep::Waiting(other),
    }
}

/// Poll `task_id` until it concludes, the budget is spent, or `cancel`
/// fires.
pub(crate) async fn run_poll_loop(
    shared: Arc<GenerationShared>,
    task_id: String,
    config: PollConfig,
    cancel: CancellationToken,
) -> PollOutcome {
    let max_attempts = config.max_attempts.max(1);
    let mut attempts = 0u32;

    loop {
        if cancel.is_cancelled() {
            return PollOutcome::Cancelled;
        }

        let result = tokio::select! {
            _ = cancel.cancelled() => return PollOutcome::Cancelled,
            result = shared.backend.status(&task_id) => result,
        };
        attempts += 1;

        match result {
            Ok(response) => {
                tracing::debug!(
                    task_id = %task_id,
                    attempt = attempts,
                    status = %response.status,
                    "Polled task status",
                );
                match classify(&response) {
                    PollStep::Completed(video_url) => {
                        let applied = shared
                            .mutate(&cancel, |state, events| {
                                if let Some(task) = state.task_mut(&task_id) {
                                    if task.complete(video_url.clone()) {
                                        let _ = events.send(GenerationEvent::StatusChanged {
                                            task_id: task_id.clone(),
                                            status: TaskStatus::Done,
                                        });
                                    }
                                }
                                let _ = events.send(GenerationEvent::Concluded {
                                    task_id: task_id.clone(),
                                });
                            })
                            .await;
                        if applied.is_none() {
                            return PollOutcome::Cancelled;
                        }
                        tracing::info!(task_id = %task_id, attempt = attempts, "Video generation completed");
                        return PollOutcome::Completed { video_url };
                    }
                    PollStep::Failed(message) => {
                        let applied = shared
                            .mutate(&cancel, |state, events| {
                                fail_task(state, events, &task_id, &message);
                                let _ = events.send(GenerationEvent::Concluded {
                                    task_id: task_id.clone(),
                                });
                            })
                            .await;
                        if applied.is_none() {
                            return PollOutcome::Cancelled;
                        }
                        tracing::warn!(task_id = %task_id, error = %message, "Video generation failed");
                        return PollOutcome::Failed { message };
                    }
                    PollStep::Waiting(status) => {
                        let applied = shared
                            .mutate(&cancel, |state, events| {
                                if let Some(task) = state.task_mut(&task_id) {
                                    task.message = response.message.clone();
                                    task.error = None;
                                    if task.apply_progress(status) {
                                        let _ = events.send(GenerationEvent::StatusChanged {
                                            task_id: task_id.clone(),
                                            status,
                                        });
                                    }
                                }
                            })
                            .await;
                        if applied.is_none() {
                            return PollOutcome::Cancelled;
                        }
                    }
                }
            }
            Err(e) => {
                let message = e.to_string();
                tracing::warn!(
                    task_id = %task_id,
                    attempt = attempts,
                    error = %e,
                    "Status query failed",
                );
                let exhausted = attempts >= max_attempts;
                let applied = shared
                    .mutate(&cancel, |state, events| {
                        if let Some(task) = state.task_mut(&task_id) {
                            if !task.is_terminal() {
                                task.error = Some(message.clone());
                            }
                        }
                        if exhausted {
                            let _ = events.send(GenerationEvent::Concluded {
                                task_id: task_id.clone(),
                            });
                        }
                    })
                    .await;
                if applied.is_none() {
                    return PollOutcome::Cancelled;
                }
                if exhausted {
                    return PollOutcome::QueryFailed { message };
                }
            }
        }

        if attempts >= max_attempts {
            let applied = shared
                .mutate(&cancel, |state, events| {
                    fail_task(state, events, &task_id, TIMEOUT_MESSAGE);
                    let _ = events.send(GenerationEvent::Concluded {
                        task_id: task_id.clone(),
                    });
                })
                .await;
            if applied.is_none() {
                return PollOutcome::Cancelled;
            }
            tracing::warn!(task_id = %task_id, attempts, "Gave up waiting for task");
            return PollOutcome::TimedOut;
        }

        tokio::select! {
            _ = cancel.cancelled() => return PollOutcome::Cancelled,
            _ = tokio::time::sleep(config.interval) => {}
        }
    }
}

fn fail_task(
    state: &mut crate::generation::GenerationState,
    events: &tokio::sync::broadcast::Sender<GenerationEvent>,
    task_id: &str,
    message: &str,
) {
    state.error = Some(message.to_string());
    if let Some(task) = state.task_mut(task_id) {
        if task.fail(message) {
            let _ = events.send(GenerationEvent::StatusChanged {
                task_id: task_id.to_string(),
                status: TaskStatus::Failed,
            });
        }
    }
}
