//! Generation requests and the client-side view of a submitted task.
//!
//! [`GenerationRequest`] is what a caller asks for; [`GenerationPayload`]
//! is the exact JSON body sent to `POST /api/v1/video/generate`; and
//! [`GenerationTask`] tracks one accepted submission while it is polled.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::resolution::{validate_dimensions, ResolutionPreset};
use crate::status::TaskStatus;

/// Frame rate sent when the request does not specify one.
pub const DEFAULT_FPS: u32 = 24;

/// Model version sent when the request does not specify one.
pub const DEFAULT_VERSION: &str = "3.0";

/// Upper bound on requested clip length, in seconds.
const MAX_DURATION_SECS: u32 = 60;

/* --------------------------------------------------------------------------
Request
-------------------------------------------------------------------------- */

/// A video generation request as built by the caller.
///
/// Constructed via [`GenerationRequest::new`] and refined with the
/// `with_*` builder methods. Immutable once handed to the generation store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub prompt: String,
    /// Clip length in seconds.
    pub duration: u32,
    pub fps: Option<u32>,
    /// Explicit width; derived from `resolution` when `None`.
    pub width: Option<u32>,
    /// Explicit height; derived from `resolution` when `None`.
    pub height: Option<u32>,
    /// First reference frame (URL or base64 image).
    pub first_frame: Option<String>,
    /// Last reference frame (URL or base64 image).
    pub last_frame: Option<String>,
    pub seed: Option<i64>,
    pub negative_prompt: Option<String>,
    pub resolution: ResolutionPreset,
    pub version: String,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>, duration: u32) -> Self {
        Self {
            prompt: prompt.into(),
            duration,
            fps: None,
            width: None,
            height: None,
            first_frame: None,
            last_frame: None,
            seed: None,
            negative_prompt: None,
            resolution: ResolutionPreset::default(),
            version: DEFAULT_VERSION.to_string(),
        }
    }

    pub fn with_resolution(mut self, resolution: ResolutionPreset) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_fps(mut self, fps: u32) -> Self {
        self.fps = Some(fps);
        self
    }

    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_frames(mut self, first: Option<String>, last: Option<String>) -> Self {
        self.first_frame = first;
        self.last_frame = last;
        self
    }

    pub fn with_seed(mut self, seed: i64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_negative_prompt(mut self, negative_prompt: impl Into<String>) -> Self {
        self.negative_prompt = Some(negative_prompt.into());
        self
    }

    /// Effective `(width, height)`: explicit values win, the preset fills
    /// in whichever side is missing.
    pub fn dimensions(&self) -> (u32, u32) {
        let (preset_w, preset_h) = self.resolution.dimensions();
        (
            self.width.unwrap_or(preset_w),
            self.height.unwrap_or(preset_h),
        )
    }

    /// Check the request before it is sent anywhere.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.prompt.trim().is_empty() {
            return Err(CoreError::Validation("Prompt must not be empty".to_string()));
        }
        if self.duration == 0 || self.duration > MAX_DURATION_SECS {
            return Err(CoreError::Validation(format!(
                "Duration must be between 1 and {MAX_DURATION_SECS} seconds (got {})",
                self.duration
            )));
        }
        if self.fps == Some(0) {
            return Err(CoreError::Validation("FPS must be greater than 0".to_string()));
        }
        let (width, height) = self.dimensions();
        validate_dimensions(width, height)
    }

    /// Validate and build the submission body.
    pub fn to_payload(&self) -> Result<GenerationPayload, CoreError> {
        self.validate()?;
        let (width, height) = self.dimensions();
        Ok(GenerationPayload {
            prompt: self.prompt.clone(),
            duration: self.duration,
            fps: self.fps.unwrap_or(DEFAULT_FPS),
            width,
            height,
            first_frame: self.first_frame.clone(),
            last_frame: self.last_frame.clone(),
            seed: self.seed,
            negative_prompt: self.negative_prompt.clone(),
            resolution: self.resolution,
            version: self.version.clone(),
        })
    }
}

/// JSON body for `POST /api/v1/video/generate`.
///
/// Optional fields are sent as explicit `null`s; the backend treats a
/// missing key and `null` the same way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationPayload {
    pub prompt: String,
    pub duration: u32,
    pub fps: u32,
    pub width: u32,
    pub height: u32,
    pub first_frame: Option<String>,
    pub last_frame: Option<String>,
    pub seed: Option<i64>,
    pub negative_prompt: Option<String>,
    pub resolution: ResolutionPreset,
    pub version: String,
}

/* --------------------------------------------------------------------------
Task
-------------------------------------------------------------------------- */

/// Client-side state of one accepted submission.
///
/// Status only moves toward a terminal state. Once the task is `Done` or
/// `Failed`, every mutator is a no-op and returns `false`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationTask {
    pub task_id: String,
    pub status: TaskStatus,
    pub video_url: Option<String>,
    /// Last informational message from the backend.
    pub message: Option<String>,
    /// Failure reason, set when the task fails or times out.
    pub error: Option<String>,
}

impl GenerationTask {
    pub fn new(task_id: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            status: TaskStatus::Pending,
            video_url: None,
            message: None,
            error: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Overwrite the displayed non-terminal status.
    ///
    /// Terminal statuses are ignored here; use [`complete`](Self::complete)
    /// or [`fail`](Self::fail).
    pub fn apply_progress(&mut self, status: TaskStatus) -> bool {
        if self.is_terminal() || status.is_terminal() || self.status == status {
            return false;
        }
        self.status = status;
        true
    }

    pub fn complete(&mut self, video_url: impl Into<String>) -> bool {
        if self.is_terminal() {
            return false;
        }
        self.status = TaskStatus::Done;
        self.video_url = Some(video_url.into());
        true
    }

    pub fn fail(&mut self, error: impl Into<String>) -> bool {
        if self.is_terminal() {
            return false;
        }
        self.status = TaskStatus::Failed;
        self.error = Some(error.into());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn payload_derives_dimensions_from_preset() {
        let payload = GenerationRequest::new("a cat surfing", 5)
            .with_resolution(ResolutionPreset::Hd1080)
            .to_payload()
            .unwrap();
        assert_eq!((payload.width, payload.height), (1920, 1080));
        assert_eq!(payload.fps, DEFAULT_FPS);
        assert_eq!(payload.version, DEFAULT_VERSION);
    }

    #[test]
    fn explicit_dimensions_override_preset() {
        let request = GenerationRequest::new("city at night", 5).with_dimensions(960, 540);
        assert_eq!(request.dimensions(), (960, 540));
    }

    #[test]
    fn payload_sends_nulls_for_missing_optionals() {
        let payload = GenerationRequest::new("forest", 4).to_payload().unwrap();
        let json = serde_json::to_value(&payload).unwrap();
        assert!(json["first_frame"].is_null());
        assert!(json["seed"].is_null());
        assert_eq!(json["resolution"], "720p");
    }

    #[test]
    fn blank_prompt_is_rejected() {
        let result = GenerationRequest::new("   ", 5).to_payload();
        assert_matches!(result, Err(CoreError::Validation(_)));
    }

    #[test]
    fn zero_duration_is_rejected() {
        assert!(GenerationRequest::new("waves", 0).validate().is_err());
    }

    #[test]
    fn task_progress_is_overwritable_until_terminal() {
        let mut task = GenerationTask::new("t1");
        assert!(task.apply_progress(TaskStatus::Processing));
        assert!(task.apply_progress(TaskStatus::Pending));
        assert!(task.complete("https://cdn.example/v.mp4"));
        assert_eq!(task.status, TaskStatus::Done);

        assert!(!task.apply_progress(TaskStatus::Processing));
        assert!(!task.fail("late failure"));
        assert_eq!(task.status, TaskStatus::Done);
        assert!(task.error.is_none());
    }

    #[test]
    fn apply_progress_ignores_terminal_status() {
        let mut task = GenerationTask::new("t1");
        assert!(!task.apply_progress(TaskStatus::Done));
        assert_eq!(task.status, TaskStatus::Pending);
    }
}
