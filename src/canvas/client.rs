//! Canvas REST client.
//!
//! DESIGN
//! ======
//! Thin typed wrapper over `{server}/api/v1/canvases/{canvas_id}/...`. Every
//! request carries the `Private-Token` header, JSON in and JSON out, except
//! file uploads (multipart `json` + `data` parts), downloads (raw bytes) and
//! subscriptions (raw byte stream).
//!
//! Any status outside 2xx becomes `CanvasError::Api` with the raw body so
//! callers can branch on the code. The only remediation done here is the
//! note color conflict: see [`CanvasClient::update_note`].
//!
//! Non-streaming requests carry a per-request timeout. Subscriptions only
//! inherit the connect timeout, since they are meant to stay open.

use std::time::Duration;

use futures::StreamExt;
use futures::stream::BoxStream;
use reqwest::{Method, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use tracing::{debug, warn};

use super::types::{AUTO_TEXT_COLOR, BACKGROUND_COLOR, CanvasError, NotePayload, Widget, WidgetKind};
use crate::config::{CanvasCredentials, CanvasTimeouts};

pub const AUTH_HEADER: &str = "Private-Token";
const API_PREFIX: &str = "/api/v1/canvases";

/// Raw chunks of a subscription response. Dropping it closes the connection.
pub type WidgetStream = BoxStream<'static, Result<Vec<u8>, CanvasError>>;

/// Build the shared HTTP client. Only the connect timeout is global; request
/// deadlines are applied per call.
///
/// # Errors
///
/// Returns `HttpClientBuild` if the TLS backend fails to initialize.
pub fn build_http_client(timeouts: CanvasTimeouts) -> Result<reqwest::Client, CanvasError> {
    reqwest::Client::builder()
        .connect_timeout(timeouts.connect())
        .build()
        .map_err(|e| CanvasError::HttpClientBuild(e.to_string()))
}

// =============================================================================
// CLIENT
// =============================================================================

#[derive(Clone)]
pub struct CanvasClient {
    http: reqwest::Client,
    server: String,
    api_key: String,
    request_timeout: Duration,
}

impl CanvasClient {
    /// Bind a client to one set of credentials.
    ///
    /// # Errors
    ///
    /// Returns `CredentialsNotSet` if the server or key is blank; no request
    /// is ever attempted in that case.
    pub fn new(
        http: reqwest::Client,
        credentials: CanvasCredentials,
        request_timeout: Duration,
    ) -> Result<Self, CanvasError> {
        let credentials = credentials.require()?;
        Ok(Self {
            http,
            server: credentials.server.trim().trim_end_matches('/').to_string(),
            api_key: credentials.api_key,
            request_timeout,
        })
    }

    #[must_use]
    pub fn server(&self) -> &str {
        &self.server
    }

    // -------------------------------------------------------------------------
    // URLs
    // -------------------------------------------------------------------------

    /// `{server}/api/v1/canvases`
    pub(crate) fn canvases_url(&self) -> String {
        format!("{}{API_PREFIX}", self.server)
    }

    /// `{server}/api/v1/canvases/{canvas_id}{endpoint}`
    pub(crate) fn canvas_url(&self, canvas_id: &str, endpoint: &str) -> String {
        format!("{}{API_PREFIX}/{canvas_id}{endpoint}", self.server)
    }

    fn collection_url(&self, canvas_id: &str, kind: WidgetKind) -> String {
        self.canvas_url(canvas_id, &format!("/{}", kind.resource()))
    }

    fn widget_url(&self, canvas_id: &str, kind: WidgetKind, id: &str) -> String {
        self.canvas_url(canvas_id, &format!("/{}/{id}", kind.resource()))
    }

    // -------------------------------------------------------------------------
    // TRANSPORT
    // -------------------------------------------------------------------------

    /// Attach auth, send, and turn non-2xx into `CanvasError::Api`.
    async fn send(&self, builder: RequestBuilder) -> Result<Response, CanvasError> {
        let response = builder
            .header(AUTH_HEADER, &self.api_key)
            .send()
            .await
            .map_err(|e| CanvasError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        debug!(status = status.as_u16(), %body, "canvas API returned error status");
        Err(CanvasError::Api { status: status.as_u16(), body })
    }

    fn build(&self, method: Method, url: &str, body: Option<&Value>) -> RequestBuilder {
        debug!(%method, url, "canvas request");
        let builder = self.http.request(method, url).timeout(self.request_timeout);
        match body {
            Some(body) => builder.json(body),
            None => builder,
        }
    }

    /// Send a request and decode the JSON response into `T`.
    pub(crate) async fn fetch<T: DeserializeOwned>(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
    ) -> Result<T, CanvasError> {
        let response = self.send(self.build(method, url, body)).await?;
        let text = response
            .text()
            .await
            .map_err(|e| CanvasError::Transport(e.to_string()))?;
        serde_json::from_str(&text).map_err(|e| CanvasError::Decode(e.to_string()))
    }

    /// Send a request whose response body is not needed.
    async fn execute(&self, method: Method, url: &str, body: Option<&Value>) -> Result<(), CanvasError> {
        self.send(self.build(method, url, body)).await?;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // CANVAS
    // -------------------------------------------------------------------------

    /// `GET /canvases/{id}`: canvas metadata as returned by the server.
    ///
    /// # Errors
    ///
    /// Returns `Api` on a non-2xx answer and `Transport` or `Decode` when the
    /// request or body fails.
    pub async fn canvas_info(&self, canvas_id: &str) -> Result<Map<String, Value>, CanvasError> {
        self.fetch(Method::GET, &self.canvas_url(canvas_id, ""), None).await
    }

    // -------------------------------------------------------------------------
    // WIDGETS BY KIND
    // -------------------------------------------------------------------------

    /// Create a JSON-bodied widget (note, browser, connector, anchor).
    ///
    /// # Errors
    ///
    /// Returns `Unsupported` for file-backed kinds; use [`Self::upload`].
    pub async fn create<P: Serialize>(
        &self,
        canvas_id: &str,
        kind: WidgetKind,
        payload: &P,
    ) -> Result<Widget, CanvasError> {
        if kind.is_file_backed() {
            return Err(CanvasError::Unsupported { kind, operation: "JSON create" });
        }
        let body = to_json(payload)?;
        self.fetch(Method::POST, &self.collection_url(canvas_id, kind), Some(&body))
            .await
    }

    /// Create one note.
    ///
    /// # Errors
    ///
    /// Same as [`Self::create`].
    pub async fn create_note(&self, canvas_id: &str, payload: &NotePayload) -> Result<Widget, CanvasError> {
        self.create(canvas_id, WidgetKind::Note, payload).await
    }

    /// Fetch one widget of a known kind.
    ///
    /// # Errors
    ///
    /// Returns `Api` on a non-2xx answer, including 404 for an unknown id.
    pub async fn get(&self, canvas_id: &str, kind: WidgetKind, id: &str) -> Result<Widget, CanvasError> {
        self.fetch(Method::GET, &self.widget_url(canvas_id, kind, id), None)
            .await
    }

    /// Partially update a widget. Note updates go through the conflict-aware
    /// [`Self::update_note`].
    ///
    /// # Errors
    ///
    /// Returns `Api` on a non-2xx answer.
    pub async fn update(
        &self,
        canvas_id: &str,
        kind: WidgetKind,
        id: &str,
        payload: &Map<String, Value>,
    ) -> Result<Widget, CanvasError> {
        if kind == WidgetKind::Note {
            return self.update_note(canvas_id, id, payload).await;
        }
        let body = Value::Object(payload.clone());
        self.fetch(Method::PATCH, &self.widget_url(canvas_id, kind, id), Some(&body))
            .await
    }

    /// Update a note, recovering once from a color conflict.
    ///
    /// The server refuses an explicit `background_color` with 409 while it
    /// still derives the note's text color automatically. On that exact
    /// combination this disables `auto_text_color` and replays the original
    /// update once. A failure of the disable step is returned as is and the
    /// replay is skipped.
    ///
    /// # Errors
    ///
    /// Returns `Api` when the update fails for any reason other than the
    /// recoverable conflict, or when the replay fails too.
    pub async fn update_note(
        &self,
        canvas_id: &str,
        note_id: &str,
        payload: &Map<String, Value>,
    ) -> Result<Widget, CanvasError> {
        let url = self.widget_url(canvas_id, WidgetKind::Note, note_id);
        let body = Value::Object(payload.clone());

        match self.fetch(Method::PATCH, &url, Some(&body)).await {
            Err(err) if err.is_conflict() && payload.contains_key(BACKGROUND_COLOR) => {
                warn!(note_id, "note color update conflicted; disabling auto text color and retrying");
                let disable = json!({ AUTO_TEXT_COLOR: false });
                self.execute(Method::PATCH, &url, Some(&disable)).await?;
                self.fetch(Method::PATCH, &url, Some(&body)).await
            }
            result => result,
        }
    }

    /// Delete one widget of a known kind.
    ///
    /// # Errors
    ///
    /// Returns `Api` on a non-2xx answer.
    pub async fn delete(&self, canvas_id: &str, kind: WidgetKind, id: &str) -> Result<(), CanvasError> {
        self.execute(Method::DELETE, &self.widget_url(canvas_id, kind, id), None)
            .await
    }

    // -------------------------------------------------------------------------
    // FILES
    // -------------------------------------------------------------------------

    /// Create a file-backed widget (image, pdf, video) by multipart upload.
    ///
    /// The form carries the metadata as a `json` text part and the file as a
    /// `data` part.
    ///
    /// # Errors
    ///
    /// Returns `Unsupported` for JSON-bodied kinds and `Encode` when the
    /// metadata cannot be serialized.
    pub async fn upload(
        &self,
        canvas_id: &str,
        kind: WidgetKind,
        file_name: &str,
        data: Vec<u8>,
        metadata: &Map<String, Value>,
    ) -> Result<Widget, CanvasError> {
        if !kind.is_file_backed() {
            return Err(CanvasError::Unsupported { kind, operation: "upload" });
        }
        let metadata = serde_json::to_string(metadata).map_err(|e| CanvasError::Encode(e.to_string()))?;
        let form = reqwest::multipart::Form::new()
            .text("json", metadata)
            .part("data", reqwest::multipart::Part::bytes(data).file_name(file_name.to_string()));

        let url = self.collection_url(canvas_id, kind);
        debug!(url, file_name, "canvas upload");
        let builder = self
            .http
            .post(&url)
            .timeout(self.request_timeout)
            .multipart(form);
        let response = self.send(builder).await?;
        let text = response
            .text()
            .await
            .map_err(|e| CanvasError::Transport(e.to_string()))?;
        serde_json::from_str(&text).map_err(|e| CanvasError::Decode(e.to_string()))
    }

    /// Download the raw content behind a pdf, image, video or browser widget.
    ///
    /// # Errors
    ///
    /// Returns `Unsupported` for kinds without downloadable content.
    pub async fn download(&self, canvas_id: &str, kind: WidgetKind, id: &str) -> Result<Vec<u8>, CanvasError> {
        if !kind.is_downloadable() {
            return Err(CanvasError::Unsupported { kind, operation: "download" });
        }
        let url = format!("{}/download", self.widget_url(canvas_id, kind, id));
        let response = self.send(self.build(Method::GET, &url, None)).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| CanvasError::Transport(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    // -------------------------------------------------------------------------
    // GENERIC WIDGETS
    // -------------------------------------------------------------------------

    /// Every widget on a canvas, regardless of kind.
    ///
    /// # Errors
    ///
    /// Returns `Api` on a non-2xx answer and `Decode` on a malformed list.
    pub async fn list_widgets(&self, canvas_id: &str) -> Result<Vec<Widget>, CanvasError> {
        self.fetch(Method::GET, &self.canvas_url(canvas_id, "/widgets"), None)
            .await
    }

    /// # Errors
    ///
    /// Returns `Api` on a non-2xx answer.
    pub async fn get_widget(&self, canvas_id: &str, id: &str) -> Result<Widget, CanvasError> {
        self.fetch(Method::GET, &self.canvas_url(canvas_id, &format!("/widgets/{id}")), None)
            .await
    }

    /// # Errors
    ///
    /// Returns `Api` on a non-2xx answer.
    pub async fn delete_widget(&self, canvas_id: &str, id: &str) -> Result<(), CanvasError> {
        self.execute(Method::DELETE, &self.canvas_url(canvas_id, &format!("/widgets/{id}")), None)
            .await
    }

    // -------------------------------------------------------------------------
    // SUBSCRIPTIONS
    // -------------------------------------------------------------------------

    /// Open a long-lived subscription on all widgets of a canvas, or on one
    /// widget when `target` is given. The caller iterates the stream and may
    /// drop it at any point.
    ///
    /// # Errors
    ///
    /// Returns `Api` or `Transport` when the subscription cannot be opened.
    /// Failures after that arrive as stream items.
    pub async fn subscribe(
        &self,
        canvas_id: &str,
        target: Option<(WidgetKind, &str)>,
    ) -> Result<WidgetStream, CanvasError> {
        let base = match target {
            Some((kind, id)) => self.widget_url(canvas_id, kind, id),
            None => self.canvas_url(canvas_id, "/widgets"),
        };
        let url = format!("{base}?subscribe=true");
        debug!(url, "canvas subscribe");

        let response = self.send(self.http.get(&url)).await?;
        Ok(response
            .bytes_stream()
            .map(|chunk| {
                chunk
                    .map(|bytes| bytes.to_vec())
                    .map_err(|e| CanvasError::Transport(e.to_string()))
            })
            .boxed())
    }
}

fn to_json<P: Serialize>(payload: &P) -> Result<Value, CanvasError> {
    serde_json::to_value(payload).map_err(|e| CanvasError::Encode(e.to_string()))
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
