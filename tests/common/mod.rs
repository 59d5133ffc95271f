//! Mock Gemini server for integration tests.

#![allow(dead_code)]

use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

/// A captured request for assertions.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub method: String,
    pub path: String,
    pub api_key: Option<String>,
    pub body: Value,
}

/// A canned response.
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub status: u16,
    pub body: String,
    pub delay_ms: u64,
}

impl MockResponse {
    pub fn json(body: &str) -> Self {
        Self {
            status: 200,
            body: body.to_string(),
            delay_ms: 0,
        }
    }

    pub fn image(mime_type: &str, data: &str) -> Self {
        Self::json(
            &serde_json::json!({
                "candidates": [{
                    "content": {
                        "parts": [{"inlineData": {"mimeType": mime_type, "data": data}}]
                    },
                    "finishReason": "STOP"
                }]
            })
            .to_string(),
        )
    }

    pub fn error(status: u16, message: &str) -> Self {
        Self {
            status,
            body: serde_json::json!({"error": {"code": status, "message": message}}).to_string(),
            delay_ms: 0,
        }
    }

    pub fn with_delay(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }
}

#[derive(Debug)]
struct Inner {
    response: MockResponse,
    requests: Vec<CapturedRequest>,
}

/// Handle to a running mock server.
#[derive(Debug, Clone)]
pub struct MockGemini {
    pub base_url: String,
    inner: Arc<Mutex<Inner>>,
}

impl MockGemini {
    /// Starts a server on an ephemeral port answering every request with `response`.
    pub async fn start(response: MockResponse) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock server");
        let addr = listener.local_addr().unwrap();

        let mock = Self {
            base_url: format!("http://{addr}"),
            inner: Arc::new(Mutex::new(Inner {
                response,
                requests: Vec::new(),
            })),
        };

        let app = Router::new().fallback(handle).with_state(mock.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        mock
    }

    pub async fn requests(&self) -> Vec<CapturedRequest> {
        self.inner.lock().await.requests.clone()
    }

    pub async fn request_count(&self) -> usize {
        self.inner.lock().await.requests.len()
    }
}

async fn handle(State(mock): State<MockGemini>, request: Request<Body>) -> Response<Body> {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let api_key = request
        .headers()
        .get("x-goog-api-key")
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    let bytes = axum::body::to_bytes(request.into_body(), usize::MAX)
        .await
        .unwrap_or_default();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    let response = {
        let mut inner = mock.inner.lock().await;
        inner.requests.push(CapturedRequest {
            method,
            path,
            api_key,
            body,
        });
        inner.response.clone()
    };

    if response.delay_ms > 0 {
        tokio::time::sleep(Duration::from_millis(response.delay_ms)).await;
    }

    Response::builder()
        .status(StatusCode::from_u16(response.status).unwrap())
        .header("content-type", "application/json")
        .body(Body::from(response.body))
        .unwrap()
}

/// A tiny but well-formed PNG signature followed by filler bytes.
pub const PNG_BYTES: [u8; 16] = [
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 13, b'I', b'H', b'D', b'R',
];

/// Returns a base URL nothing is listening on.
pub fn closed_base_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind");
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}
