//! Credential route.

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::response::Json;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use super::error::ApiError;
use crate::config::CanvasCredentials;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetCredentialsBody {
    #[serde(default)]
    pub mcs_server: String,
    #[serde(default)]
    pub api_key: String,
}

/// `POST /api/set-credentials`: replace the canvas server and API key.
///
/// Blank values are stored as given; later canvas calls reject them with
/// `E_CREDENTIALS_NOT_SET`.
///
/// # Errors
///
/// 400 `E_INVALID_JSON` for a malformed body.
pub async fn set_credentials(
    State(state): State<AppState>,
    body: Result<Json<SetCredentialsBody>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(body) = body?;
    let credentials = CanvasCredentials::new(body.mcs_server, body.api_key);
    info!(server = %credentials.server, complete = credentials.is_set(), "credentials updated");
    state.credentials.set(credentials).await;
    Ok(Json(json!({ "status": "ok" })))
}

#[cfg(test)]
#[path = "credentials_test.rs"]
mod tests;
