//! Vision types: extractor trait and errors.

use crate::mapping::Detection;

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by note extraction.
#[derive(Debug, thiserror::Error)]
pub enum VisionError {
    /// The required API key environment variable is not set.
    #[error("missing API key: env var {var} not set")]
    MissingApiKey { var: String },

    /// The request to the vision provider failed or timed out.
    #[error("vision request failed: {0}")]
    ApiRequest(String),

    /// The vision provider returned a non-success HTTP status.
    #[error("vision response error: status {status}")]
    ApiResponse { status: u16, body: String },

    /// The provider response could not be deserialized.
    #[error("vision response parse failed: {0}")]
    ApiParse(String),

    /// No candidate part held a JSON array of notes.
    #[error("no JSON note array found in vision response")]
    NoNoteArray,

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl crate::error::ErrorCode for VisionError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::MissingApiKey { .. } => "E_MISSING_API_KEY",
            Self::ApiRequest(_) => "E_VISION_REQUEST",
            Self::ApiResponse { .. } => "E_VISION_RESPONSE",
            Self::ApiParse(_) => "E_VISION_PARSE",
            Self::NoNoteArray => "E_VISION_NO_NOTES",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::ApiRequest(_) | Self::ApiResponse { status: 429 | 500..=599, .. })
    }
}

// =============================================================================
// EXTRACTOR TRAIT
// =============================================================================

/// Anything that can turn a photo into pixel-space note detections.
///
/// Implemented by [`super::gemini::GeminiExtractor`] in production and by
/// in-memory mocks in tests.
#[async_trait::async_trait]
pub trait NoteExtractor: Send + Sync {
    /// Detect sticky notes in `image` (raw bytes of type `mime_type`).
    ///
    /// # Errors
    ///
    /// Returns a [`VisionError`] if the provider call fails or its answer
    /// holds no note array.
    async fn extract(&self, image: &[u8], mime_type: &str) -> Result<Vec<Detection>, VisionError>;
}
