//! Events broadcast by the generation store.

use serde::Serialize;
use vidgen_core::generation::GenerationRequest;
use vidgen_core::status::TaskStatus;

/// A task lifecycle transition.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GenerationEvent {
    /// The backend accepted a request and assigned it a task id.
    Submitted {
        task_id: String,
        request: GenerationRequest,
    },

    /// The displayed status of a task changed.
    StatusChanged { task_id: String, status: TaskStatus },

    /// Polling for a task has finished, whatever the outcome. Consumers
    /// re-fetch history to learn the result.
    Concluded { task_id: String },
}

impl GenerationEvent {
    pub fn task_id(&self) -> &str {
        match self {
            Self::Submitted { task_id, .. }
            | Self::StatusChanged { task_id, .. }
            | Self::Concluded { task_id } => task_id,
        }
    }
}
