//! In-process mock of the canvas REST API for tests.
//!
//! Records every request and answers from a scripted reply queue. When the
//! queue is empty, JSON bodies are echoed back with a generated `id`, which
//! is what the real server does for successful creates.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use serde_json::Value;

use super::client::{AUTH_HEADER, CanvasClient};
use crate::config::CanvasCredentials;

pub const TEST_API_KEY: &str = "test-key";

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub token: Option<String>,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("recorded body should be JSON")
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[derive(Debug, Clone)]
pub struct MockReply {
    pub status: StatusCode,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl MockReply {
    pub fn json(status: StatusCode, value: Value) -> Self {
        Self { status, content_type: "application/json", body: value.to_string().into_bytes() }
    }

    pub fn ok(value: Value) -> Self {
        Self::json(StatusCode::OK, value)
    }

    pub fn status(status: StatusCode, body: &str) -> Self {
        Self { status, content_type: "text/plain", body: body.as_bytes().to_vec() }
    }

    pub fn bytes(body: &[u8]) -> Self {
        Self { status: StatusCode::OK, content_type: "application/octet-stream", body: body.to_vec() }
    }
}

#[derive(Clone, Default)]
pub struct MockCanvas {
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    replies: Arc<Mutex<VecDeque<MockReply>>>,
}

impl MockCanvas {
    /// Queue the reply for the next unanswered request.
    pub fn push(&self, reply: MockReply) -> &Self {
        self.replies.lock().expect("mock mutex should lock").push_back(reply);
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().expect("mock mutex should lock").clone()
    }

    /// Bind to an ephemeral port and return the base URL.
    pub async fn serve(&self) -> String {
        let app = Router::new().fallback(handle).with_state(self.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("mock canvas should bind");
        let addr = listener.local_addr().expect("mock canvas should have an address");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        format!("http://{addr}")
    }

    /// Start the server and return a client pointed at it.
    pub async fn client(&self) -> CanvasClient {
        let base = self.serve().await;
        CanvasClient::new(
            reqwest::Client::new(),
            CanvasCredentials::new(base, TEST_API_KEY),
            std::time::Duration::from_secs(5),
        )
        .expect("test credentials are set")
    }
}

async fn handle(
    State(mock): State<MockCanvas>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let header_str = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
    };
    let recorded = RecordedRequest {
        method,
        path: uri.path().to_string(),
        query: uri.query().map(str::to_owned),
        token: header_str(AUTH_HEADER),
        content_type: header_str(header::CONTENT_TYPE.as_str()),
        body: body.to_vec(),
    };

    let index = {
        let mut requests = mock.requests.lock().expect("mock mutex should lock");
        requests.push(recorded.clone());
        requests.len()
    };

    let scripted = mock.replies.lock().expect("mock mutex should lock").pop_front();
    let reply = scripted.unwrap_or_else(|| echo(&recorded, index));

    (reply.status, [(header::CONTENT_TYPE, reply.content_type)], reply.body).into_response()
}

fn echo(request: &RecordedRequest, index: usize) -> MockReply {
    match serde_json::from_slice::<Value>(&request.body) {
        Ok(Value::Object(mut map)) => {
            map.insert("id".into(), Value::String(format!("w-{index}")));
            MockReply::ok(Value::Object(map))
        }
        _ => MockReply::ok(serde_json::json!({})),
    }
}
