//! Request and response bodies for the backend's REST endpoints.
//!
//! Field names follow the backend's JSON exactly. Status strings are
//! normalized through [`TaskStatus`] as they are decoded.

use serde::{Deserialize, Serialize};
use vidgen_core::status::TaskStatus;

/// Response from `POST /api/v1/video/generate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub success: bool,
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub status: Option<TaskStatus>,
}

impl SubmitResponse {
    /// Task id of an accepted submission, or `None` if the backend did not
    /// accept it.
    pub fn accepted_task_id(&self) -> Option<&str> {
        if !self.success {
            return None;
        }
        self.task_id.as_deref().filter(|id| !id.is_empty())
    }

    /// Backend-provided explanation, preferring `message` over `error`.
    pub fn explicit_message(&self) -> Option<&str> {
        self.message
            .as_deref()
            .or(self.error.as_deref())
            .filter(|m| !m.trim().is_empty())
    }
}

/// Response from `GET /api/v1/video/status/{task_id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: TaskStatus,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl StatusResponse {
    /// Failure explanation, preferring `message` over `error`.
    pub fn failure_message(&self) -> Option<&str> {
        self.message
            .as_deref()
            .or(self.error.as_deref())
            .filter(|m| !m.trim().is_empty())
    }
}

/// Response from `PATCH /api/v1/video/history/{id}/favorite`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoriteResponse {
    pub success: bool,
    pub is_favorite: bool,
}

/// Response from `PATCH /api/v1/video/history/{id}/like`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LikeResponse {
    pub success: bool,
    pub is_liked: bool,
}

/// Response from `PATCH /api/v1/video/history/{id}/ultra-hd`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UltraHdResponse {
    pub success: bool,
    pub is_ultra_hd: bool,
}

/// Response from `DELETE /api/v1/video/history/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

/// Super-resolution model used by the enhance-resolution endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpscaleMethod {
    #[default]
    RealEsrgan,
    Waifu2x,
}

/// Frame interpolation model used by the enhance-fps endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterpolationMethod {
    #[default]
    Rife,
    Film,
}

/// Body for `POST /api/v1/video/history/{id}/enhance-resolution`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnhanceResolutionRequest {
    pub method: UpscaleMethod,
    /// Upscale factor (2 turns 1080p into 4K).
    pub scale: u32,
}

impl EnhanceResolutionRequest {
    pub fn new(method: UpscaleMethod) -> Self {
        Self { method, scale: 2 }
    }
}

impl Default for EnhanceResolutionRequest {
    fn default() -> Self {
        Self::new(UpscaleMethod::default())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnhanceResolutionResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    pub output_url: String,
    /// `(width, height)` before upscaling.
    pub original_resolution: (u32, u32),
    /// `(width, height)` after upscaling.
    pub enhanced_resolution: (u32, u32),
    pub method: String,
    /// Seconds spent on the backend.
    #[serde(default)]
    pub processing_time: f64,
}

/// Body for `POST /api/v1/video/history/{id}/enhance-fps`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnhanceFpsRequest {
    pub target_fps: u32,
    pub method: InterpolationMethod,
    /// Let the backend switch models when it detects large motion.
    pub auto_switch: bool,
}

impl EnhanceFpsRequest {
    pub fn new(method: InterpolationMethod) -> Self {
        Self {
            target_fps: 60,
            method,
            auto_switch: true,
        }
    }
}

impl Default for EnhanceFpsRequest {
    fn default() -> Self {
        Self::new(InterpolationMethod::default())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnhanceFpsResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    pub output_url: String,
    pub original_fps: u32,
    pub enhanced_fps: u32,
    pub method: String,
    #[serde(default)]
    pub auto_switched: bool,
    #[serde(default)]
    pub processing_time: f64,
    #[serde(default)]
    pub warning: Option<String>,
}

/// Response from `GET /health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Pagination and server-side filter for the history list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryListQuery {
    pub limit: u32,
    pub offset: u32,
    pub status: Option<TaskStatus>,
}

impl Default for HistoryListQuery {
    fn default() -> Self {
        Self {
            limit: 20,
            offset: 0,
            status: None,
        }
    }
}
