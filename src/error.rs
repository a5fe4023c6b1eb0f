//! Error code contract shared by every module error type.
//!
//! DESIGN
//! ======
//! Each `thiserror` enum in the crate implements `ErrorCode` so the HTTP
//! layer can render a grepable code and a retry hint without matching on
//! concrete variants.

use serde_json::{Value, json};

/// Response body key for the human-readable error message.
pub const ERROR_MESSAGE: &str = "error";

/// Response body key for grepable error codes.
pub const ERROR_CODE: &str = "code";

/// Response body key for the retryable flag.
pub const ERROR_RETRYABLE: &str = "retryable";

/// Stable machine-readable identity for an error value.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}

/// Render an error as the JSON body returned by the HTTP layer.
#[must_use]
pub fn error_body(err: &(impl ErrorCode + ?Sized)) -> Value {
    json!({
        ERROR_MESSAGE: err.to_string(),
        ERROR_CODE: err.error_code(),
        ERROR_RETRYABLE: err.retryable(),
    })
}
