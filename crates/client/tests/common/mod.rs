use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde_json::{json, Value};

use vidgen_client::{ClientConfig, VideoApi};

/// One request as seen by the stub server.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub api_key: Option<String>,
    pub body: Option<Value>,
}

/// In-process stand-in for the backend.
///
/// Canned responses are keyed by method and path; anything else answers
/// 404 with a FastAPI-style `detail` body. Every request is recorded.
#[derive(Clone, Default)]
pub struct StubBackend {
    routes: Arc<Mutex<HashMap<(Method, String), (StatusCode, Value)>>>,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl StubBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, method: Method, path: &str, status: u16, body: Value) -> &Self {
        let status = StatusCode::from_u16(status).unwrap();
        self.routes
            .lock()
            .unwrap()
            .insert((method, path.to_string()), (status, body));
        self
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    /// Bind an ephemeral port and serve in the background. Returns the
    /// base URL.
    pub async fn serve(&self) -> String {
        let app = Router::new().fallback(handle).with_state(self.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }
}

async fn handle(
    State(stub): State<StubBackend>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path().to_string();
    stub.requests.lock().unwrap().push(Recorded {
        method: method.clone(),
        path: path.clone(),
        query: uri.query().map(str::to_string),
        api_key: headers
            .get("x-api-key")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body: serde_json::from_slice(&body).ok(),
    });

    let canned = stub.routes.lock().unwrap().get(&(method, path)).cloned();
    match canned {
        Some((status, body)) => (status, Json(body)).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({ "detail": "Not Found" }))).into_response(),
    }
}

/// Client pointed at `base_url`, optionally with an API key.
pub fn client(base_url: &str, api_key: Option<&str>) -> VideoApi {
    let config = ClientConfig {
        backend_url: base_url.to_string(),
        api_key: api_key.map(str::to_string),
        ..Default::default()
    };
    VideoApi::new(&config).unwrap()
}

/// A history record the way the backend serializes it.
pub fn history_json(id: i64, task_id: &str) -> Value {
    json!({
        "id": id,
        "task_id": task_id,
        "prompt": "a paper boat on a river",
        "duration": 5,
        "fps": 24,
        "width": 1280,
        "height": 720,
        "status": "completed",
        "video_url": format!("https://cdn.example/{id}.mp4"),
        "created_at": "2024-05-01T08:00:00",
        "completed_at": "2024-05-01T08:01:10",
        "is_ultra_hd": false,
        "is_favorite": null,
        "is_liked": false
    })
}
