//! Canvas wire types: widget kinds, widgets, note payloads and errors.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::geometry::{Point, Size};

/// Wire key carrying a note's background color.
pub const BACKGROUND_COLOR: &str = "background_color";

/// Wire key toggling the server's text-color derivation on notes.
pub const AUTO_TEXT_COLOR: &str = "auto_text_color";

pub const NOTE_WIDGET_TYPE: &str = "Note";
pub const NOTE_STATE_NORMAL: &str = "normal";

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by canvas API operations.
#[derive(Debug, thiserror::Error)]
pub enum CanvasError {
    /// Server URL or API key is blank. Raised before any network call.
    #[error("canvas credentials not set")]
    CredentialsNotSet,

    /// The HTTP request could not be sent or its body could not be read.
    #[error("canvas request failed: {0}")]
    Transport(String),

    /// The canvas service answered outside the 2xx range.
    #[error("canvas API error {status}: {body}")]
    Api { status: u16, body: String },

    /// The response body was not the expected JSON shape.
    #[error("canvas response parse failed: {0}")]
    Decode(String),

    /// A request payload could not be serialized.
    #[error("canvas request encode failed: {0}")]
    Encode(String),

    /// The operation does not exist for this widget kind.
    #[error("{operation} is not supported for {kind} widgets")]
    Unsupported { kind: WidgetKind, operation: &'static str },

    /// A lookup over listed widgets found nothing.
    #[error("not found: {0}")]
    NotFound(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl CanvasError {
    /// HTTP status of an API error, if this is one.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_conflict(&self) -> bool {
        self.status() == Some(409)
    }
}

impl crate::error::ErrorCode for CanvasError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::CredentialsNotSet => "E_CREDENTIALS_NOT_SET",
            Self::Transport(_) => "E_CANVAS_TRANSPORT",
            Self::Api { status: 409, .. } => "E_CANVAS_CONFLICT",
            Self::Api { .. } => "E_CANVAS_API",
            Self::Decode(_) => "E_CANVAS_DECODE",
            Self::Encode(_) => "E_CANVAS_ENCODE",
            Self::Unsupported { .. } => "E_UNSUPPORTED",
            Self::NotFound(_) => "E_NOT_FOUND",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Api { status: 429 | 500..=599, .. })
    }
}

// =============================================================================
// WIDGET KIND
// =============================================================================

/// Every widget family the canvas API exposes as its own resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidgetKind {
    Note,
    Image,
    Pdf,
    Video,
    Browser,
    Connector,
    Anchor,
}

impl WidgetKind {
    pub const ALL: [WidgetKind; 7] = [
        Self::Note,
        Self::Image,
        Self::Pdf,
        Self::Video,
        Self::Browser,
        Self::Connector,
        Self::Anchor,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Note => "note",
            Self::Image => "image",
            Self::Pdf => "pdf",
            Self::Video => "video",
            Self::Browser => "browser",
            Self::Connector => "connector",
            Self::Anchor => "anchor",
        }
    }

    /// Collection path segment under `/api/v1/canvases/{id}`.
    #[must_use]
    pub fn resource(self) -> &'static str {
        match self {
            Self::Note => "notes",
            Self::Image => "images",
            Self::Pdf => "pdfs",
            Self::Video => "videos",
            Self::Browser => "browsers",
            Self::Connector => "connectors",
            Self::Anchor => "anchors",
        }
    }

    /// Kinds created by multipart upload instead of a JSON body.
    #[must_use]
    pub fn is_file_backed(self) -> bool {
        matches!(self, Self::Image | Self::Pdf | Self::Video)
    }

    /// Kinds exposing a raw `/download` endpoint.
    #[must_use]
    pub fn is_downloadable(self) -> bool {
        matches!(self, Self::Image | Self::Pdf | Self::Video | Self::Browser)
    }
}

impl fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// WIDGET
// =============================================================================

/// A widget as returned by the canvas service.
///
/// Only the fields this crate reads are typed. Everything else the server
/// sends lands in `extra` and survives a serialize round trip untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Widget {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub widget_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Widget {
    /// The widget as a flat JSON object, typed fields included.
    #[must_use]
    pub fn to_map(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }

    #[must_use]
    pub fn is_type(&self, widget_type: &str) -> bool {
        self.widget_type.as_deref() == Some(widget_type)
    }
}

// =============================================================================
// NOTE PAYLOAD
// =============================================================================

/// Body of a note creation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotePayload {
    pub background_color: String,
    pub text: String,
    pub location: Point,
    pub size: Size,
    #[serde(default = "default_scale")]
    pub scale: f64,
    #[serde(default = "default_widget_type")]
    pub widget_type: String,
    #[serde(default = "default_state")]
    pub state: String,
}

impl NotePayload {
    #[must_use]
    pub fn new(text: impl Into<String>, background_color: impl Into<String>, location: Point, size: Size) -> Self {
        Self {
            background_color: background_color.into(),
            text: text.into(),
            location,
            size,
            scale: default_scale(),
            widget_type: default_widget_type(),
            state: default_state(),
        }
    }

    #[must_use]
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }
}

fn default_scale() -> f64 {
    1.0
}

fn default_widget_type() -> String {
    NOTE_WIDGET_TYPE.to_string()
}

fn default_state() -> String {
    NOTE_STATE_NORMAL.to_string()
}

// =============================================================================
// CANVAS SUMMARY
// =============================================================================

/// One entry of the server-wide canvas list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasSummary {
    pub id: String,
    pub name: String,
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
