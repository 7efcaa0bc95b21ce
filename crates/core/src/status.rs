//! Task status vocabulary.
//!
//! The backend reports status with two overlapping vocabularies: the
//! generation endpoints use `pending | processing | done | failed` while the
//! status and history endpoints use `completed` and sometimes `error`.
//! [`TaskStatus`] folds both into one enum at the deserialization boundary.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Canonical lifecycle state of a generation task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TaskStatus {
    #[default]
    Pending,
    Processing,
    /// Finished successfully (`done` or `completed` on the wire).
    Done,
    /// Finished unsuccessfully (`failed` or `error` on the wire).
    Failed,
}

impl TaskStatus {
    /// Parse any backend spelling. Unknown values are treated as
    /// [`TaskStatus::Pending`], matching how the backend reports tasks that
    /// have been accepted but not picked up yet.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "processing" | "running" => Self::Processing,
            "done" | "completed" => Self::Done,
            "failed" | "error" => Self::Failed,
            _ => Self::Pending,
        }
    }

    /// Canonical name used when this crate serializes a status.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }

    /// Value accepted by the history endpoint's `status` query parameter.
    pub fn query_value(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Done => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for TaskStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TaskStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}
