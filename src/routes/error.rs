//! JSON error responses for the HTTP layer.
//!
//! Every failure leaves as `{error, code, retryable}` with a status derived
//! from the error's variant. Canvas and vision failures are upstream faults
//! and map to 502; bad input maps to 400. Extractor rejections are folded
//! into the same shape so the browser can always parse the body.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::{Value, json};

use crate::canvas::CanvasError;
use crate::error::{ERROR_CODE, ERROR_MESSAGE, ERROR_RETRYABLE, ErrorCode, error_body};
use crate::services::SyncError;
use crate::vision::VisionError;

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: Value,
}

impl ApiError {
    #[must_use]
    pub fn new(status: StatusCode, err: &(impl ErrorCode + ?Sized)) -> Self {
        Self { status, body: error_body(err) }
    }

    /// A 400 for input the handler rejected itself.
    #[must_use]
    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::plain(StatusCode::BAD_REQUEST, code, message)
    }

    #[must_use]
    pub fn plain(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        let body = json!({
            ERROR_MESSAGE: message.into(),
            ERROR_CODE: code,
            ERROR_RETRYABLE: false,
        });
        Self { status, body }
    }

    /// Attach an extra top-level field to the body.
    #[must_use]
    pub fn with(mut self, key: &str, value: Value) -> Self {
        if let Value::Object(map) = &mut self.body {
            map.insert(key.to_string(), value);
        }
        self
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    #[must_use]
    pub fn body(&self) -> &Value {
        &self.body
    }

    #[must_use]
    pub fn code(&self) -> Option<&str> {
        self.body.get(ERROR_CODE).and_then(Value::as_str)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<CanvasError> for ApiError {
    fn from(err: CanvasError) -> Self {
        Self::new(canvas_error_to_status(&err), &err)
    }
}

impl From<VisionError> for ApiError {
    fn from(err: VisionError) -> Self {
        Self::new(vision_error_to_status(&err), &err)
    }
}

impl From<SyncError> for ApiError {
    fn from(err: SyncError) -> Self {
        let status = sync_error_to_status(&err);
        let api = Self::new(status, &err);
        match &err {
            SyncError::NoteFailed { index, created, .. } => {
                api.with("index", json!(index)).with("created", json!(created))
            }
            _ => api,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request("E_INVALID_JSON", format!("Invalid JSON: {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request("E_INVALID_QUERY", format!("Invalid query: {}", rejection.body_text()))
    }
}

// =============================================================================
// STATUS MAPPING
// =============================================================================

pub(crate) fn canvas_error_to_status(err: &CanvasError) -> StatusCode {
    match err {
        CanvasError::CredentialsNotSet | CanvasError::Unsupported { .. } => StatusCode::BAD_REQUEST,
        CanvasError::NotFound(_) => StatusCode::NOT_FOUND,
        CanvasError::Transport(_) | CanvasError::Api { .. } | CanvasError::Decode(_) => StatusCode::BAD_GATEWAY,
        CanvasError::Encode(_) | CanvasError::HttpClientBuild(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub(crate) fn vision_error_to_status(err: &VisionError) -> StatusCode {
    match err {
        VisionError::MissingApiKey { .. } => StatusCode::SERVICE_UNAVAILABLE,
        VisionError::ApiRequest(_)
        | VisionError::ApiResponse { .. }
        | VisionError::ApiParse(_)
        | VisionError::NoNoteArray => StatusCode::BAD_GATEWAY,
        VisionError::HttpClientBuild(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub(crate) fn sync_error_to_status(err: &SyncError) -> StatusCode {
    match err {
        SyncError::InvalidImageFrame { .. } => StatusCode::BAD_REQUEST,
        SyncError::Anchor(source) | SyncError::NoteFailed { source, .. } => canvas_error_to_status(source),
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
