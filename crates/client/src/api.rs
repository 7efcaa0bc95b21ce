//! REST API client for the video-generation backend.
//!
//! Wraps the backend HTTP API (submission, status polling, history
//! listing and the per-record mutations) using [`reqwest`].

use std::time::Duration;

use reqwest::Method;
use vidgen_core::generation::GenerationPayload;
use vidgen_core::history::{HistoryItem, HistoryPage};
use vidgen_core::types::DbId;

use crate::config::ClientConfig;
use crate::dto::{
    DeleteResponse, EnhanceFpsRequest, EnhanceFpsResponse, EnhanceResolutionRequest,
    EnhanceResolutionResponse, FavoriteResponse, HealthResponse, HistoryListQuery, LikeResponse,
    StatusResponse, SubmitResponse, UltraHdResponse,
};

/// Header carrying the optional per-user API key.
pub const API_KEY_HEADER: &str = "X-API-Key";

/// HTTP client for one backend deployment.
#[derive(Clone)]
pub struct VideoApi {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    submit_timeout: Duration,
}

/// Errors from the backend REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum VideoApiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout, decode).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend returned a non-2xx status code.
    #[error("Backend API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The backend answered 2xx but declined the request
    /// (`success: false` or no task id).
    #[error("{0}")]
    Rejected(String),
}

impl VideoApiError {
    /// HTTP status code, when the backend answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::ApiError { status, .. } => Some(*status),
            Self::Request(e) => e.status().map(|s| s.as_u16()),
            Self::Rejected(_) => None,
        }
    }

    /// The backend could not be reached (connection refused, DNS, timeout).
    pub fn is_unreachable(&self) -> bool {
        match self {
            Self::Request(e) => e.is_connect() || e.is_timeout(),
            _ => false,
        }
    }

    pub fn is_server_error(&self) -> bool {
        self.status().is_some_and(|s| (500..600).contains(&s))
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Explanation supplied by the backend itself, if any.
    ///
    /// For error responses this is the `message`, `detail` or `error`
    /// field of a JSON body (FastAPI reports errors under `detail`).
    pub fn backend_message(&self) -> Option<String> {
        match self {
            Self::Rejected(message) => Some(message.clone()),
            Self::ApiError { body, .. } => {
                let json: serde_json::Value = serde_json::from_str(body).ok()?;
                ["message", "detail", "error"]
                    .iter()
                    .find_map(|key| json.get(key).and_then(|v| v.as_str()))
                    .filter(|m| !m.trim().is_empty())
                    .map(str::to_string)
            }
            Self::Request(_) => None,
        }
    }
}

impl VideoApi {
    /// Create a client from connection settings.
    pub fn new(config: &ClientConfig) -> Result<Self, VideoApiError> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self::with_client(client, config))
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, config: &ClientConfig) -> Self {
        Self {
            client,
            base_url: config.backend_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            submit_timeout: config.submit_timeout,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Submit a generation request.
    ///
    /// Sends `POST /api/v1/video/generate` with the per-request submit
    /// timeout. The response is returned as-is; callers decide whether a
    /// `success: false` body counts as a failure.
    pub async fn submit(&self, payload: &GenerationPayload) -> Result<SubmitResponse, VideoApiError> {
        let response = self
            .request(Method::POST, "/api/v1/video/generate")
            .timeout(self.submit_timeout)
            .json(payload)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Query the current status of a task via
    /// `GET /api/v1/video/status/{task_id}`.
    pub async fn status(&self, task_id: &str) -> Result<StatusResponse, VideoApiError> {
        let response = self
            .request(Method::GET, &format!("/api/v1/video/status/{task_id}"))
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// List one page of history via `GET /api/v1/video/history`.
    ///
    /// Only `status` is filtered server-side.
    pub async fn list_history(&self, query: &HistoryListQuery) -> Result<HistoryPage, VideoApiError> {
        let mut params = vec![
            ("limit", query.limit.to_string()),
            ("offset", query.offset.to_string()),
        ];
        if let Some(status) = query.status {
            params.push(("status", status.query_value().to_string()));
        }

        let response = self
            .request(Method::GET, "/api/v1/video/history")
            .query(&params)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Fetch the history record for one task via
    /// `GET /api/v1/video/history/{task_id}`.
    pub async fn history_by_task_id(&self, task_id: &str) -> Result<HistoryItem, VideoApiError> {
        let response = self
            .request(Method::GET, &format!("/api/v1/video/history/{task_id}"))
            .send()
            .await?;

        Self::parse_response(response).await
    }

    pub async fn toggle_favorite(&self, id: DbId) -> Result<FavoriteResponse, VideoApiError> {
        let response = self
            .request(Method::PATCH, &format!("/api/v1/video/history/{id}/favorite"))
            .send()
            .await?;

        Self::parse_response(response).await
    }

    pub async fn toggle_like(&self, id: DbId) -> Result<LikeResponse, VideoApiError> {
        let response = self
            .request(Method::PATCH, &format!("/api/v1/video/history/{id}/like"))
            .send()
            .await?;

        Self::parse_response(response).await
    }

    pub async fn toggle_ultra_hd(&self, id: DbId) -> Result<UltraHdResponse, VideoApiError> {
        let response = self
            .request(Method::PATCH, &format!("/api/v1/video/history/{id}/ultra-hd"))
            .send()
            .await?;

        Self::parse_response(response).await
    }

    pub async fn delete_history(&self, id: DbId) -> Result<DeleteResponse, VideoApiError> {
        let response = self
            .request(Method::DELETE, &format!("/api/v1/video/history/{id}"))
            .send()
            .await?;

        Self::parse_response(response).await
    }

    pub async fn enhance_resolution(
        &self,
        id: DbId,
        body: &EnhanceResolutionRequest,
    ) -> Result<EnhanceResolutionResponse, VideoApiError> {
        let response = self
            .request(
                Method::POST,
                &format!("/api/v1/video/history/{id}/enhance-resolution"),
            )
            .json(body)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    pub async fn enhance_fps(
        &self,
        id: DbId,
        body: &EnhanceFpsRequest,
    ) -> Result<EnhanceFpsResponse, VideoApiError> {
        let response = self
            .request(Method::POST, &format!("/api/v1/video/history/{id}/enhance-fps"))
            .json(body)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Liveness probe via `GET /health`.
    pub async fn health(&self) -> Result<HealthResponse, VideoApiError> {
        let response = self.request(Method::GET, "/health").send().await?;
        Self::parse_response(response).await
    }

    // ---- private helpers ----

    /// Start a request against `path`, attaching the API key if configured.
    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let builder = self
            .client
            .request(method, format!("{}{}", self.base_url, path));
        match &self.api_key {
            Some(key) => builder.header(API_KEY_HEADER, key),
            None => builder,
        }
    }

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or a [`VideoApiError::ApiError`]
    /// containing the status and body text on failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, VideoApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            tracing::debug!(status = status.as_u16(), body = %body, "Backend returned an error");
            return Err(VideoApiError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, VideoApiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}
