//! The generation store: submission, retry and task tracking.
//!
//! [`GenerationStore::generate`] validates a request, submits it with
//! linear-backoff retry, records the accepted task and spawns exactly one
//! polling loop for it. Every loop gets a child of the store's master
//! [`CancellationToken`], so loops can be stopped per task
//! ([`cancel_polling`](GenerationStore::cancel_polling)) or all at once
//! ([`shutdown`](GenerationStore::shutdown)).
//!
//! Task transitions are broadcast as [`GenerationEvent`]s. Call
//! [`GenerationStore::subscribe`] to receive them.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{broadcast, Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;
use vidgen_client::dto::SubmitResponse;
use vidgen_client::{VideoApiError, VideoBackend};
use vidgen_core::error::CoreError;
use vidgen_core::generation::{GenerationRequest, GenerationTask};

use crate::config::StoreConfig;
use crate::events::GenerationEvent;
use crate::poller::{run_poll_loop, PollConfig, PollOutcome};
use crate::retry::{retry, RetryPolicy};

/// Broadcast channel capacity for generation events.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// How long `shutdown` waits for each loop to exit.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// User-facing messages for submission failures without a backend reason.
pub const UNREACHABLE_MESSAGE: &str =
    "Cannot reach the video backend. Check that the service is running.";
pub const SERVER_ERROR_MESSAGE: &str = "The video backend hit an internal error. Try again later.";
pub const ENDPOINT_MISSING_MESSAGE: &str =
    "The generation endpoint was not found. Check BACKEND_URL.";
pub const GENERIC_SUBMIT_MESSAGE: &str = "Failed to submit the generation request.";

/// Used when the backend declines a request without saying why.
const NOT_ACCEPTED_MESSAGE: &str = "The backend did not accept the request";

/// Errors returned by [`GenerationStore::generate`].
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("Invalid generation request: {0}")]
    Invalid(#[from] CoreError),

    /// Submission failed after every retry. `message` is the user-facing
    /// text also stored in [`GenerationState::error`].
    #[error("{message}")]
    Submit {
        message: String,
        #[source]
        source: VideoApiError,
    },
}

/// Observable state of the generation store.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerationState {
    /// Id of the most recently accepted task.
    pub current_task_id: Option<String>,
    /// Accepted tasks, newest first.
    pub tasks: Vec<GenerationTask>,
    pub is_generating: bool,
    /// Last user-facing error (submission failure, task failure, timeout).
    pub error: Option<String>,
}

impl GenerationState {
    pub fn current_task(&self) -> Option<&GenerationTask> {
        let id = self.current_task_id.as_deref()?;
        self.task(id)
    }

    pub fn task(&self, task_id: &str) -> Option<&GenerationTask> {
        self.tasks.iter().find(|t| t.task_id == task_id)
    }

    pub(crate) fn task_mut(&mut self, task_id: &str) -> Option<&mut GenerationTask> {
        self.tasks.iter_mut().find(|t| t.task_id == task_id)
    }
}

/// State shared between the store and its polling loops.
pub(crate) struct GenerationShared {
    pub(crate) backend: Arc<dyn VideoBackend>,
    state: RwLock<GenerationState>,
    event_tx: broadcast::Sender<GenerationEvent>,
}

impl GenerationShared {
    /// Apply `f` under the write lock unless `cancel` has fired.
    ///
    /// Returns `None` (and leaves the state untouched) for a cancelled
    /// loop. The check happens after the lock is taken, so a loop
    /// cancelled while waiting for the lock does not mutate either.
    pub(crate) async fn mutate<R>(
        &self,
        cancel: &CancellationToken,
        f: impl FnOnce(&mut GenerationState, &broadcast::Sender<GenerationEvent>) -> R,
    ) -> Option<R> {
        let mut state = self.state.write().await;
        if cancel.is_cancelled() {
            return None;
        }
        Some(f(&mut state, &self.event_tx))
    }
}

/// Bookkeeping for one running polling loop.
struct PollHandle {
    loop_id: Uuid,
    task_id: String,
    cancel: CancellationToken,
    handle: JoinHandle<PollOutcome>,
}

pub struct GenerationStore {
    shared: Arc<GenerationShared>,
    retry: RetryPolicy,
    poll: PollConfig,
    loops: Mutex<Vec<PollHandle>>,
    /// Master cancellation token; every loop token is a child of it.
    cancel: CancellationToken,
}

impl GenerationStore {
    pub fn new(backend: Arc<dyn VideoBackend>, config: &StoreConfig) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            shared: Arc::new(GenerationShared {
                backend,
                state: RwLock::new(GenerationState::default()),
                event_tx,
            }),
            retry: config.retry,
            poll: config.poll,
            loops: Mutex::new(Vec::new()),
            cancel: CancellationToken::new(),
        }
    }

    /// Subscribe to task lifecycle events.
    pub fn subscribe(&self) -> broadcast::Receiver<GenerationEvent> {
        self.shared.event_tx.subscribe()
    }

    /// Immutable copy of the current state.
    pub async fn snapshot(&self) -> GenerationState {
        self.shared.state.read().await.clone()
    }

    /// Submit `request` and start polling the resulting task.
    ///
    /// Returns the submission response as soon as the backend accepts the
    /// request; the outcome of the task arrives later as events. Every
    /// transport error, 5xx and rejected response is retried.
    pub async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<SubmitResponse, GenerationError> {
        let payload = match request.to_payload() {
            Ok(payload) => payload,
            Err(e) => {
                self.shared.state.write().await.error = Some(e.to_string());
                return Err(GenerationError::Invalid(e));
            }
        };

        {
            let mut state = self.shared.state.write().await;
            state.is_generating = true;
            state.error = None;
        }

        let backend = &self.shared.backend;
        let result = retry(&self.retry, "submit generation", |attempt| {
            let payload = &payload;
            async move {
                tracing::debug!(attempt, "Submitting generation request");
                let response = backend.submit(payload).await?;
                let Some(task_id) = response.accepted_task_id().map(str::to_string) else {
                    return Err(VideoApiError::Rejected(
                        response
                            .explicit_message()
                            .unwrap_or(NOT_ACCEPTED_MESSAGE)
                            .to_string(),
                    ));
                };
                Ok::<_, VideoApiError>((task_id, response))
            }
        })
        .await;

        let mut state = self.shared.state.write().await;
        state.is_generating = false;

        match result {
            Ok((task_id, response)) => {
                let mut task = GenerationTask::new(&task_id);
                task.message = response.message.clone();
                if let Some(status) = response.status {
                    task.apply_progress(status);
                }
                state.tasks.insert(0, task);
                state.current_task_id = Some(task_id.clone());
                let _ = self.shared.event_tx.send(GenerationEvent::Submitted {
                    task_id: task_id.clone(),
                    request,
                });
                drop(state);

                tracing::info!(task_id = %task_id, "Generation request accepted");
                self.spawn_poll_loop(task_id).await;
                Ok(response)
            }
            Err(source) => {
                let message = user_message(&source);
                state.error = Some(message.clone());
                tracing::error!(error = %source, "Generation request failed");
                Err(GenerationError::Submit { message, source })
            }
        }
    }

    /// Cancel every polling loop for `task_id`. Returns how many were
    /// cancelled.
    pub async fn cancel_polling(&self, task_id: &str) -> usize {
        let mut loops = self.loops.lock().await;
        let mut cancelled = 0;
        loops.retain(|l| {
            if l.task_id != task_id {
                return true;
            }
            l.cancel.cancel();
            tracing::info!(task_id, loop_id = %l.loop_id, "Polling cancelled");
            cancelled += 1;
            false
        });
        cancelled
    }

    /// Wait for the polling loop of `task_id` to finish.
    ///
    /// Returns `None` if no loop is tracked for the task. With several
    /// loops for the same task, the oldest is awaited.
    pub async fn wait_for(&self, task_id: &str) -> Option<PollOutcome> {
        let handle = {
            let mut loops = self.loops.lock().await;
            let index = loops.iter().position(|l| l.task_id == task_id)?;
            loops.remove(index)
        };
        match handle.handle.await {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                tracing::error!(task_id, error = %e, "Polling task panicked");
                None
            }
        }
    }

    /// Cancel all polling loops and wait for them to exit.
    pub async fn shutdown(&self) {
        tracing::info!("Shutting down generation store");
        self.cancel.cancel();

        let mut loops = self.loops.lock().await;
        for l in loops.drain(..) {
            l.cancel.cancel();
            let _ = tokio::time::timeout(SHUTDOWN_GRACE, l.handle).await;
        }
    }

    // ---- private helpers ----

    async fn spawn_poll_loop(&self, task_id: String) {
        let loop_id = Uuid::new_v4();
        let cancel = self.cancel.child_token();
        let handle = tokio::spawn(run_poll_loop(
            Arc::clone(&self.shared),
            task_id.clone(),
            self.poll,
            cancel.clone(),
        ));

        tracing::debug!(task_id = %task_id, loop_id = %loop_id, "Polling started");

        self.loops.lock().await.push(PollHandle {
            loop_id,
            task_id,
            cancel,
            handle,
        });
    }
}

/// Map a submission failure to the text shown to the user.
///
/// Precedence: explicit backend message, unreachable backend, 5xx, 404,
/// generic fallback.
pub fn user_message(error: &VideoApiError) -> String {
    if let Some(message) = error.backend_message() {
        return message;
    }
    if error.is_unreachable() {
        UNREACHABLE_MESSAGE.to_string()
    } else if error.is_server_error() {
        SERVER_ERROR_MESSAGE.to_string()
    } else if error.is_not_found() {
        ENDPOINT_MISSING_MESSAGE.to_string()
    } else {
        GENERIC_SUBMIT_MESSAGE.to_string()
    }
}
