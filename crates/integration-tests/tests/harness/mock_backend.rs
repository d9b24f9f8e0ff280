//! Mock native backend for integration tests
//!
//! Implements a minimal Messages API that records what it receives and
//! returns canned responses

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::{Json, Router, routing};
use tokio_util::sync::CancellationToken;

/// One recorded backend call
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// Raw `authorization` header value
    pub authorization: Option<String>,
    /// Raw `anthropic-version` header value
    pub anthropic_version: Option<String>,
    /// Raw `anthropic-beta` header value
    pub anthropic_beta: Option<String>,
    /// Parsed request body
    pub body: serde_json::Value,
}

/// Mock native backend that returns predictable responses
pub struct MockBackend {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockBackendState>,
}

struct MockBackendState {
    request_count: AtomicU32,
    requests: Mutex<Vec<RecordedRequest>>,
    /// Content blocks for the canned non-streaming response
    reply_content: Mutex<serde_json::Value>,
    reply_stop_reason: Mutex<String>,
    /// When set, every call fails with this status and body
    error: Mutex<Option<(StatusCode, serde_json::Value)>>,
}

impl MockBackend {
    /// Start the mock server, returning immediately
    pub async fn start() -> anyhow::Result<Self> {
        let state = Arc::new(MockBackendState {
            request_count: AtomicU32::new(0),
            requests: Mutex::new(Vec::new()),
            reply_content: Mutex::new(serde_json::json!([
                {"type": "text", "text": "Hello from the mock backend"}
            ])),
            reply_stop_reason: Mutex::new("end_turn".to_owned()),
            error: Mutex::new(None),
        });

        let app = Router::new()
            .route("/v1/messages", routing::post(handle_messages))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self { addr, shutdown, state })
    }

    /// Base URL for configuring the mock as the upstream backend
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Number of calls received
    pub fn request_count(&self) -> u32 {
        self.state.request_count.load(Ordering::Relaxed)
    }

    /// The most recent recorded call, if any
    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.state.requests.lock().unwrap().last().cloned()
    }

    /// Replace the canned reply content blocks and stop reason
    pub fn set_reply(&self, content: serde_json::Value, stop_reason: &str) {
        *self.state.reply_content.lock().unwrap() = content;
        *self.state.reply_stop_reason.lock().unwrap() = stop_reason.to_owned();
    }

    /// Make every subsequent call fail with the given status and body
    pub fn set_error(&self, status: StatusCode, body: serde_json::Value) {
        *self.state.error.lock().unwrap() = Some((status, body));
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn handle_messages(
    State(state): State<Arc<MockBackendState>>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> impl IntoResponse {
    state.request_count.fetch_add(1, Ordering::Relaxed);

    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
    };

    state.requests.lock().unwrap().push(RecordedRequest {
        authorization: header("authorization"),
        anthropic_version: header("anthropic-version"),
        anthropic_beta: header("anthropic-beta"),
        body: body.clone(),
    });

    if let Some((status, error_body)) = state.error.lock().unwrap().clone() {
        return (status, Json(error_body)).into_response();
    }

    let model = body
        .get("model")
        .and_then(|m| m.as_str())
        .unwrap_or("unknown")
        .to_owned();

    if body.get("stream").and_then(serde_json::Value::as_bool) == Some(true) {
        return streaming_response(&model).into_response();
    }

    let response = serde_json::json!({
        "id": "msg_mock_01",
        "type": "message",
        "role": "assistant",
        "content": state.reply_content.lock().unwrap().clone(),
        "model": model,
        "stop_reason": state.reply_stop_reason.lock().unwrap().clone(),
        "stop_sequence": null,
        "usage": {"input_tokens": 12, "output_tokens": 5}
    });

    Json(response).into_response()
}

/// Build the canned native SSE stream
///
/// Two text fragments, input usage on `message_start`, output usage on
/// `message_delta`
fn streaming_response(model: &str) -> impl IntoResponse {
    let events = [
        (
            "message_start",
            serde_json::json!({
                "type": "message_start",
                "message": {
                    "id": "msg_mock_stream",
                    "type": "message",
                    "role": "assistant",
                    "content": [],
                    "model": model,
                    "usage": {"input_tokens": 28, "output_tokens": 0}
                }
            }),
        ),
        (
            "content_block_start",
            serde_json::json!({
                "type": "content_block_start",
                "index": 0,
                "content_block": {"type": "text", "text": ""}
            }),
        ),
        (
            "content_block_delta",
            serde_json::json!({
                "type": "content_block_delta",
                "index": 0,
                "delta": {"type": "text_delta", "text": "He"}
            }),
        ),
        (
            "content_block_delta",
            serde_json::json!({
                "type": "content_block_delta",
                "index": 0,
                "delta": {"type": "text_delta", "text": "llo"}
            }),
        ),
        (
            "content_block_stop",
            serde_json::json!({
                "type": "content_block_stop",
                "index": 0
            }),
        ),
        (
            "message_delta",
            serde_json::json!({
                "type": "message_delta",
                "delta": {"stop_reason": "end_turn", "stop_sequence": null},
                "usage": {"output_tokens": 2}
            }),
        ),
        ("message_stop", serde_json::json!({"type": "message_stop"})),
    ];

    let mut body = String::new();
    for (name, payload) in events {
        body.push_str(&format!("event: {name}\ndata: {payload}\n\n"));
    }

    (
        StatusCode::OK,
        [(axum::http::header::CONTENT_TYPE, "text/event-stream")],
        body,
    )
}
