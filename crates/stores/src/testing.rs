//! Scripted in-memory [`VideoBackend`] for store tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use vidgen_client::dto::{
    DeleteResponse, EnhanceFpsRequest, EnhanceFpsResponse, EnhanceResolutionRequest,
    EnhanceResolutionResponse, FavoriteResponse, HealthResponse, HistoryListQuery, LikeResponse,
    StatusResponse, SubmitResponse, UltraHdResponse,
};
use vidgen_client::{VideoApiError, VideoBackend};
use vidgen_core::generation::{GenerationPayload, GenerationRequest};
use vidgen_core::history::{HistoryItem, HistoryPage};
use vidgen_core::status::TaskStatus;
use vidgen_core::types::DbId;

pub fn api_error(status: u16, body: &str) -> VideoApiError {
    VideoApiError::ApiError {
        status,
        body: body.to_string(),
    }
}

pub fn submit_ok(task_id: &str) -> SubmitResponse {
    SubmitResponse {
        success: true,
        task_id: Some(task_id.to_string()),
        message: None,
        error: None,
        video_url: None,
        status: Some(TaskStatus::Pending),
    }
}

pub fn status(status: TaskStatus, video_url: Option<&str>) -> StatusResponse {
    StatusResponse {
        status,
        video_url: video_url.map(str::to_string),
        message: None,
        error: None,
    }
}

/// A confirmed (or, with a negative id, placeholder) record created
/// `age_days` ago.
pub fn history_item(id: DbId, task_id: &str, age_days: i64) -> HistoryItem {
    let mut item = HistoryItem::placeholder(
        id,
        task_id,
        &GenerationRequest::new("a quiet harbor at dawn", 5),
        Utc::now() - Duration::days(age_days),
    );
    if id >= 0 {
        item.status = TaskStatus::Done;
        item.video_url = Some(format!("https://cdn.example/{id}.mp4"));
    }
    item
}

pub fn page(items: Vec<HistoryItem>) -> HistoryPage {
    HistoryPage {
        total: items.len() as u64,
        limit: 20,
        offset: 0,
        items,
    }
}

/// Responses are consumed in order. Once the status queue is empty every
/// query answers `processing`; an empty page queue answers an empty page.
#[derive(Default)]
pub struct FakeBackend {
    submits: Mutex<VecDeque<Result<SubmitResponse, VideoApiError>>>,
    statuses: Mutex<VecDeque<Result<StatusResponse, VideoApiError>>>,
    pages: Mutex<VecDeque<Result<HistoryPage, VideoApiError>>>,
    records: Mutex<Vec<HistoryItem>>,
    list_queries: Mutex<Vec<HistoryListQuery>>,
    submit_calls: AtomicU32,
    status_calls: AtomicU32,
    delete_declined: Mutex<bool>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_submit(&self, response: Result<SubmitResponse, VideoApiError>) {
        self.submits.lock().unwrap().push_back(response);
    }

    pub fn push_status(&self, response: Result<StatusResponse, VideoApiError>) {
        self.statuses.lock().unwrap().push_back(response);
    }

    pub fn push_page(&self, response: Result<HistoryPage, VideoApiError>) {
        self.pages.lock().unwrap().push_back(response);
    }

    /// Records served by `history_by_task_id`.
    pub fn add_record(&self, item: HistoryItem) {
        self.records.lock().unwrap().push(item);
    }

    pub fn decline_deletes(&self) {
        *self.delete_declined.lock().unwrap() = true;
    }

    pub fn submit_calls(&self) -> u32 {
        self.submit_calls.load(Ordering::SeqCst)
    }

    pub fn status_calls(&self) -> u32 {
        self.status_calls.load(Ordering::SeqCst)
    }

    pub fn list_queries(&self) -> Vec<HistoryListQuery> {
        self.list_queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl VideoBackend for FakeBackend {
    async fn submit(&self, _payload: &GenerationPayload) -> Result<SubmitResponse, VideoApiError> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        self.submits
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(api_error(500, "no scripted submit response")))
    }

    async fn status(&self, _task_id: &str) -> Result<StatusResponse, VideoApiError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        self.statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(status(TaskStatus::Processing, None)))
    }

    async fn list_history(&self, query: &HistoryListQuery) -> Result<HistoryPage, VideoApiError> {
        self.list_queries.lock().unwrap().push(*query);
        self.pages
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(page(Vec::new())))
    }

    async fn history_by_task_id(&self, task_id: &str) -> Result<HistoryItem, VideoApiError> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .find(|item| item.task_id == task_id)
            .cloned()
            .ok_or_else(|| api_error(404, r#"{"detail": "History record not found"}"#))
    }

    async fn toggle_favorite(&self, _id: DbId) -> Result<FavoriteResponse, VideoApiError> {
        Ok(FavoriteResponse {
            success: true,
            is_favorite: true,
        })
    }

    async fn toggle_like(&self, _id: DbId) -> Result<LikeResponse, VideoApiError> {
        Ok(LikeResponse {
            success: true,
            is_liked: true,
        })
    }

    async fn toggle_ultra_hd(&self, id: DbId) -> Result<UltraHdResponse, VideoApiError> {
        if id < 0 {
            return Err(api_error(404, r#"{"detail": "History record not found"}"#));
        }
        Ok(UltraHdResponse {
            success: true,
            is_ultra_hd: true,
        })
    }

    async fn delete_history(&self, _id: DbId) -> Result<DeleteResponse, VideoApiError> {
        let declined = *self.delete_declined.lock().unwrap();
        Ok(DeleteResponse {
            success: !declined,
            message: String::new(),
        })
    }

    async fn enhance_resolution(
        &self,
        id: DbId,
        body: &EnhanceResolutionRequest,
    ) -> Result<EnhanceResolutionResponse, VideoApiError> {
        Ok(EnhanceResolutionResponse {
            success: true,
            message: "upscaled".to_string(),
            output_url: format!("https://cdn.example/{id}-x{}.mp4", body.scale),
            original_resolution: (1280, 720),
            enhanced_resolution: (1280 * body.scale, 720 * body.scale),
            method: "real_esrgan".to_string(),
            processing_time: 12.0,
        })
    }

    async fn enhance_fps(
        &self,
        id: DbId,
        body: &EnhanceFpsRequest,
    ) -> Result<EnhanceFpsResponse, VideoApiError> {
        Ok(EnhanceFpsResponse {
            success: true,
            message: "interpolated".to_string(),
            output_url: format!("https://cdn.example/{id}-{}fps.mp4", body.target_fps),
            original_fps: 24,
            enhanced_fps: body.target_fps,
            method: "rife".to_string(),
            auto_switched: false,
            processing_time: 4.5,
            warning: None,
        })
    }

    async fn health(&self) -> Result<HealthResponse, VideoApiError> {
        Ok(HealthResponse {
            status: "healthy".to_string(),
        })
    }
}
