//! The seam between the stores and the HTTP client.
//!
//! Stores depend on [`VideoBackend`] rather than on [`VideoApi`] directly
//! so they can be driven by an in-memory fake in tests.

use async_trait::async_trait;
use vidgen_core::generation::GenerationPayload;
use vidgen_core::history::{HistoryItem, HistoryPage};
use vidgen_core::types::DbId;

use crate::api::{VideoApi, VideoApiError};
use crate::dto::{
    DeleteResponse, EnhanceFpsRequest, EnhanceFpsResponse, EnhanceResolutionRequest,
    EnhanceResolutionResponse, FavoriteResponse, HealthResponse, HistoryListQuery, LikeResponse,
    StatusResponse, SubmitResponse, UltraHdResponse,
};

/// Every backend operation the stores use.
#[async_trait]
pub trait VideoBackend: Send + Sync {
    async fn submit(&self, payload: &GenerationPayload) -> Result<SubmitResponse, VideoApiError>;

    async fn status(&self, task_id: &str) -> Result<StatusResponse, VideoApiError>;

    async fn list_history(&self, query: &HistoryListQuery) -> Result<HistoryPage, VideoApiError>;

    async fn history_by_task_id(&self, task_id: &str) -> Result<HistoryItem, VideoApiError>;

    async fn toggle_favorite(&self, id: DbId) -> Result<FavoriteResponse, VideoApiError>;

    async fn toggle_like(&self, id: DbId) -> Result<LikeResponse, VideoApiError>;

    async fn toggle_ultra_hd(&self, id: DbId) -> Result<UltraHdResponse, VideoApiError>;

    async fn delete_history(&self, id: DbId) -> Result<DeleteResponse, VideoApiError>;

    async fn enhance_resolution(
        &self,
        id: DbId,
        body: &EnhanceResolutionRequest,
    ) -> Result<EnhanceResolutionResponse, VideoApiError>;

    async fn enhance_fps(
        &self,
        id: DbId,
        body: &EnhanceFpsRequest,
    ) -> Result<EnhanceFpsResponse, VideoApiError>;

    async fn health(&self) -> Result<HealthResponse, VideoApiError>;
}

#[async_trait]
impl VideoBackend for VideoApi {
    async fn submit(&self, payload: &GenerationPayload) -> Result<SubmitResponse, VideoApiError> {
        VideoApi::submit(self, payload).await
    }

    async fn status(&self, task_id: &str) -> Result<StatusResponse, VideoApiError> {
        VideoApi::status(self, task_id).await
    }

    async fn list_history(&self, query: &HistoryListQuery) -> Result<HistoryPage, VideoApiError> {
        VideoApi::list_history(self, query).await
    }

    async fn history_by_task_id(&self, task_id: &str) -> Result<HistoryItem, VideoApiError> {
        VideoApi::history_by_task_id(self, task_id).await
    }

    async fn toggle_favorite(&self, id: DbId) -> Result<FavoriteResponse, VideoApiError> {
        VideoApi::toggle_favorite(self, id).await
    }

    async fn toggle_like(&self, id: DbId) -> Result<LikeResponse, VideoApiError> {
        VideoApi::toggle_like(self, id).await
    }

    async fn toggle_ultra_hd(&self, id: DbId) -> Result<UltraHdResponse, VideoApiError> {
        VideoApi::toggle_ultra_hd(self, id).await
    }

    async fn delete_history(&self, id: DbId) -> Result<DeleteResponse, VideoApiError> {
        VideoApi::delete_history(self, id).await
    }

    async fn enhance_resolution(
        &self,
        id: DbId,
        body: &EnhanceResolutionRequest,
    ) -> Result<EnhanceResolutionResponse, VideoApiError> {
        VideoApi::enhance_resolution(self, id, body).await
    }

    async fn enhance_fps(
        &self,
        id: DbId,
        body: &EnhanceFpsRequest,
    ) -> Result<EnhanceFpsResponse, VideoApiError> {
        VideoApi::enhance_fps(self, id, body).await
    }

    async fn health(&self) -> Result<HealthResponse, VideoApiError> {
        VideoApi::health(self).await
    }
}
