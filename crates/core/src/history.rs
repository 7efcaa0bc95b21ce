//! History records as returned by `GET /api/v1/video/history`.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::generation::GenerationRequest;
use crate::status::TaskStatus;
use crate::types::{DbId, Timestamp};

/// One past (or in-flight) generation as shown in the history view.
///
/// A negative `id` marks a placeholder created on the client at submission
/// time; it is replaced once the backend returns a record for the same
/// `task_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryItem {
    pub id: DbId,
    pub task_id: String,
    pub prompt: String,
    pub duration: u32,
    pub fps: u32,
    pub width: u32,
    pub height: u32,
    pub status: TaskStatus,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub video_name: Option<String>,
    #[serde(default)]
    pub first_frame_url: Option<String>,
    #[serde(default)]
    pub last_frame_url: Option<String>,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: Timestamp,
    #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
    pub completed_at: Option<Timestamp>,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub is_ultra_hd: bool,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub is_favorite: bool,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub is_liked: bool,
    /// Completion percentage (0-100), when the backend reports it.
    #[serde(default)]
    pub progress: Option<u8>,
    #[serde(default)]
    pub version: Option<String>,
}

impl HistoryItem {
    /// Build a placeholder for a task the backend has accepted but not yet
    /// listed. `id` must be negative.
    pub fn placeholder(
        id: DbId,
        task_id: impl Into<String>,
        request: &GenerationRequest,
        created_at: Timestamp,
    ) -> Self {
        let (width, height) = request.dimensions();
        Self {
            id,
            task_id: task_id.into(),
            prompt: request.prompt.clone(),
            duration: request.duration,
            fps: request.fps.unwrap_or(crate::generation::DEFAULT_FPS),
            width,
            height,
            status: TaskStatus::Pending,
            video_url: None,
            video_name: None,
            first_frame_url: request.first_frame.clone(),
            last_frame_url: request.last_frame.clone(),
            created_at,
            completed_at: None,
            is_ultra_hd: false,
            is_favorite: false,
            is_liked: false,
            progress: Some(0),
            version: Some(request.version.clone()),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.id < 0
    }
}

/// One page of history as returned by the list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPage {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub items: Vec<HistoryItem>,
    #[serde(default)]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
}

/* --------------------------------------------------------------------------
Lenient field decoding
-------------------------------------------------------------------------- */

/// Parse RFC 3339, falling back to a naive ISO-8601 datetime interpreted
/// as UTC (the backend serializes database timestamps without an offset).
pub fn parse_timestamp(raw: &str) -> Option<Timestamp> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

fn deserialize_timestamp<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Timestamp, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}")))
}

fn deserialize_optional_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Timestamp>, D::Error> {
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) => parse_timestamp(&raw)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}"))),
        None => Ok(None),
    }
}

/// `null` and absent flags both read as `false`.
fn deserialize_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}
