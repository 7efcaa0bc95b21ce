//! The history store: paginated listing, reconciliation and filtering.
//!
//! `items` is the reconciled list (placeholders plus confirmed records);
//! `visible` is `items` with the active filters applied. Filtering never
//! touches `items`, so changing filters can always bring hidden entries
//! (including placeholders) back.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tokio::sync::RwLock;
use vidgen_client::dto::{
    DeleteResponse, EnhanceFpsRequest, EnhanceFpsResponse, EnhanceResolutionRequest,
    EnhanceResolutionResponse, FavoriteResponse, HistoryListQuery, LikeResponse, UltraHdResponse,
};
use vidgen_client::{VideoApiError, VideoBackend};
use vidgen_core::filters::{FilterUpdate, HistoryFilters};
use vidgen_core::generation::GenerationRequest;
use vidgen_core::history::HistoryItem;
use vidgen_core::reconcile::reconcile;
use vidgen_core::types::DbId;

/// Shown when a list fetch fails; the underlying error is logged.
pub const FETCH_FAILED_MESSAGE: &str = "Failed to load video history";

#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error(transparent)]
    Backend(#[from] VideoApiError),

    #[error("No history record for task '{0}'")]
    NotFound(String),
}

/// Parameters for [`HistoryStore::fetch`].
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryQuery {
    pub limit: u32,
    pub offset: u32,
    /// Filters for this fetch only; the stored filters are used when `None`.
    pub filters: Option<HistoryFilters>,
    /// Skip the loading indicator once the first load has happened.
    pub silent: bool,
}

impl Default for HistoryQuery {
    fn default() -> Self {
        Self {
            limit: 20,
            offset: 0,
            filters: None,
            silent: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct HistoryState {
    /// Placeholders and confirmed records, at most one per task id.
    pub items: Vec<HistoryItem>,
    /// `items` after filtering.
    pub visible: Vec<HistoryItem>,
    pub total: u64,
    pub loading: bool,
    pub error: Option<String>,
    pub filters: HistoryFilters,
    /// Page of the most recent fetch, reused by [`HistoryStore::refresh`].
    pub limit: u32,
    pub offset: u32,
    #[serde(skip)]
    loaded_once: bool,
}

impl HistoryState {
    fn items_with_id(&mut self, id: DbId) -> impl Iterator<Item = &mut HistoryItem> {
        self.items
            .iter_mut()
            .chain(self.visible.iter_mut())
            .filter(move |item| item.id == id)
    }

    fn refilter(&mut self) {
        self.visible = self.filters.apply(&self.items, Utc::now());
    }
}

pub struct HistoryStore {
    backend: Arc<dyn VideoBackend>,
    state: RwLock<HistoryState>,
}

impl HistoryStore {
    pub fn new(backend: Arc<dyn VideoBackend>) -> Self {
        let state = HistoryState {
            limit: HistoryQuery::default().limit,
            ..Default::default()
        };
        Self {
            backend,
            state: RwLock::new(state),
        }
    }

    /// Immutable copy of the current state.
    pub async fn snapshot(&self) -> HistoryState {
        self.state.read().await.clone()
    }

    /// Fetch one page, reconcile it with local placeholders and return the
    /// visible items.
    ///
    /// Errors are absorbed: the list is emptied, the error is recorded in
    /// [`HistoryState::error`] and an empty list is returned.
    pub async fn fetch(&self, query: HistoryQuery) -> Vec<HistoryItem> {
        let filters = {
            let mut state = self.state.write().await;
            if !(query.silent && state.loaded_once) {
                state.loading = true;
            }
            state.limit = query.limit;
            state.offset = query.offset;
            query.filters.clone().unwrap_or_else(|| state.filters.clone())
        };

        let list_query = HistoryListQuery {
            limit: query.limit,
            offset: query.offset,
            status: filters.status,
        };
        let result = self.backend.list_history(&list_query).await;

        let mut state = self.state.write().await;
        state.loading = false;
        state.loaded_once = true;

        match result {
            Ok(page) => {
                tracing::debug!(
                    total = page.total,
                    received = page.items.len(),
                    "History page fetched",
                );
                state.items = reconcile(&state.items, page.items);
                state.total = page.total;
                state.error = None;
                state.visible = filters.apply(&state.items, Utc::now());
                state.visible.clone()
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to fetch history");
                state.items.clear();
                state.visible.clear();
                state.total = 0;
                state.error = Some(FETCH_FAILED_MESSAGE.to_string());
                Vec::new()
            }
        }
    }

    /// Silent re-fetch of the most recently requested page with the stored
    /// filters.
    pub async fn refresh(&self) -> Vec<HistoryItem> {
        let (limit, offset) = {
            let state = self.state.read().await;
            (state.limit, state.offset)
        };
        self.fetch(HistoryQuery {
            limit,
            offset,
            filters: None,
            silent: true,
        })
        .await
    }

    /// Look up the record for one task on the backend.
    pub async fn find_by_task_id(&self, task_id: &str) -> Result<HistoryItem, HistoryError> {
        self.backend
            .history_by_task_id(task_id)
            .await
            .map_err(|e| match e.status() {
                Some(404) => HistoryError::NotFound(task_id.to_string()),
                _ => HistoryError::Backend(e),
            })
    }

    /// Insert a placeholder for a freshly accepted task at the top of the
    /// list. It is replaced once a fetch returns the confirmed record.
    pub async fn add_placeholder(&self, task_id: &str, request: &GenerationRequest) -> HistoryItem {
        let mut state = self.state.write().await;
        if let Some(existing) = state.items.iter().find(|item| item.task_id == task_id) {
            return existing.clone();
        }

        let lowest = state.items.iter().map(|item| item.id).min().unwrap_or(0);
        let id = lowest.min(0) - 1;
        let item = HistoryItem::placeholder(id, task_id, request, Utc::now());
        state.items.insert(0, item.clone());
        state.refilter();

        tracing::debug!(task_id, id, "Added history placeholder");
        item
    }

    /// Merge `update` into the stored filters and re-filter the current
    /// items without contacting the backend.
    pub async fn set_filters(&self, update: FilterUpdate) -> Vec<HistoryItem> {
        let mut state = self.state.write().await;
        state.filters = state.filters.merged(update);
        state.refilter();
        state.visible.clone()
    }

    /// Re-apply the stored filters, e.g. after time has passed.
    pub async fn apply_filters(&self) -> Vec<HistoryItem> {
        let mut state = self.state.write().await;
        state.refilter();
        state.visible.clone()
    }

    /// Flip the favorite flag on the backend. The local list is not
    /// updated; fetch again to see the change.
    pub async fn toggle_favorite(&self, id: DbId) -> Result<FavoriteResponse, HistoryError> {
        Ok(self.backend.toggle_favorite(id).await?)
    }

    pub async fn toggle_like(&self, id: DbId) -> Result<LikeResponse, HistoryError> {
        Ok(self.backend.toggle_like(id).await?)
    }

    pub async fn toggle_ultra_hd(&self, id: DbId) -> Result<UltraHdResponse, HistoryError> {
        Ok(self.backend.toggle_ultra_hd(id).await?)
    }

    /// Delete a record. Once the backend confirms, the item is dropped
    /// locally and the total decremented (never below zero).
    pub async fn delete(&self, id: DbId) -> Result<DeleteResponse, HistoryError> {
        let response = self.backend.delete_history(id).await?;
        if response.success {
            let mut state = self.state.write().await;
            let before = state.items.len();
            state.items.retain(|item| item.id != id);
            state.visible.retain(|item| item.id != id);
            if state.items.len() < before {
                state.total = state.total.saturating_sub(1);
            }
            tracing::info!(id, "History record deleted");
        } else {
            tracing::warn!(id, message = %response.message, "Backend declined delete");
        }
        Ok(response)
    }

    /// Upscale a video. On success the item points at the new file and
    /// carries the new dimensions.
    pub async fn enhance_resolution(
        &self,
        id: DbId,
        request: &EnhanceResolutionRequest,
    ) -> Result<EnhanceResolutionResponse, HistoryError> {
        let response = self.backend.enhance_resolution(id, request).await?;
        if response.success {
            let (width, height) = response.enhanced_resolution;
            let mut state = self.state.write().await;
            for item in state.items_with_id(id) {
                item.video_url = Some(response.output_url.clone());
                item.width = width;
                item.height = height;
            }
            tracing::info!(id, width, height, "Resolution enhanced");
        }
        Ok(response)
    }

    /// Interpolate frames. On success the item points at the new file and
    /// carries the new frame rate.
    pub async fn enhance_fps(
        &self,
        id: DbId,
        request: &EnhanceFpsRequest,
    ) -> Result<EnhanceFpsResponse, HistoryError> {
        let response = self.backend.enhance_fps(id, request).await?;
        if response.success {
            let mut state = self.state.write().await;
            for item in state.items_with_id(id) {
                item.video_url = Some(response.output_url.clone());
                item.fps = response.enhanced_fps;
            }
            if let Some(warning) = &response.warning {
                tracing::warn!(id, warning = %warning, "FPS enhancement warning");
            }
            tracing::info!(id, fps = response.enhanced_fps, "FPS enhanced");
        }
        Ok(response)
    }
}
