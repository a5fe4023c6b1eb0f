//! Canvas and anchor lookup routes.
//!
//! Thin wrappers over `AnchorRepository`. Anchors are flattened to
//! `{id, name, x, y, width, height, scale}` for the browser.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::response::Json;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::error::ApiError;
use crate::canvas::{Anchor, AnchorRepository};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct CanvasQuery {
    #[serde(rename = "canvasID", default)]
    pub canvas_id: Option<String>,
    #[serde(rename = "anchorID", default)]
    pub anchor_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnchorResponse {
    pub id: String,
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub scale: f64,
}

fn to_response(anchor: Anchor) -> AnchorResponse {
    AnchorResponse {
        id: anchor.id,
        name: anchor.name,
        x: anchor.position.x,
        y: anchor.position.y,
        width: anchor.size.width,
        height: anchor.size.height,
        scale: anchor.scale,
    }
}

/// A non-blank query parameter or a 400 naming it.
pub(crate) fn required<'a>(value: Option<&'a str>, name: &str) -> Result<&'a str, ApiError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::bad_request("E_MISSING_PARAMS", format!("{name} required")))
}

/// `GET /api/get-canvases`: every canvas on the configured server.
///
/// # Errors
///
/// 400 without credentials; upstream failures per [`ApiError`].
pub async fn get_canvases(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let client = state.canvas_client().await?;
    let canvases = AnchorRepository::new(&client).list_canvases().await?;
    Ok(Json(json!({ "canvases": canvases })))
}

/// `GET /api/get-anchors?canvasID=`: anchors of one canvas.
///
/// # Errors
///
/// 400 `E_MISSING_PARAMS` without `canvasID`.
pub async fn get_anchors(
    State(state): State<AppState>,
    query: Result<Query<CanvasQuery>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let Query(query) = query?;
    let client = state.canvas_client().await?;
    let canvas_id = required(query.canvas_id.as_deref(), "canvasID")?;
    let anchors: Vec<AnchorResponse> = AnchorRepository::new(&client)
        .list_anchors(canvas_id)
        .await?
        .into_iter()
        .map(to_response)
        .collect();
    Ok(Json(json!({ "anchors": anchors })))
}

/// `GET /api/get-anchor-info?canvasID=&anchorID=`: one anchor's geometry.
///
/// # Errors
///
/// 400 `E_MISSING_PARAMS` unless both ids are present.
pub async fn get_anchor_info(
    State(state): State<AppState>,
    query: Result<Query<CanvasQuery>, QueryRejection>,
) -> Result<Json<AnchorResponse>, ApiError> {
    let Query(query) = query?;
    let client = state.canvas_client().await?;
    let (Ok(canvas_id), Ok(anchor_id)) = (
        required(query.canvas_id.as_deref(), "canvasID"),
        required(query.anchor_id.as_deref(), "anchorID"),
    ) else {
        return Err(ApiError::bad_request("E_MISSING_PARAMS", "canvasID and anchorID required"));
    };
    let anchor = AnchorRepository::new(&client)
        .get_anchor(canvas_id, anchor_id)
        .await?;
    Ok(Json(to_response(anchor)))
}

/// `GET /api/get-canvas-size?canvasID=`: `{width, height}` of the canvas.
///
/// # Errors
///
/// 404 when the canvas has no `SharedCanvas` widget.
pub async fn get_canvas_size(
    State(state): State<AppState>,
    query: Result<Query<CanvasQuery>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let Query(query) = query?;
    let client = state.canvas_client().await?;
    let canvas_id = required(query.canvas_id.as_deref(), "canvasID")?;
    let size = AnchorRepository::new(&client).canvas_size(canvas_id).await?;
    Ok(Json(json!({ "width": size.width, "height": size.height })))
}

#[cfg(test)]
#[path = "canvases_test.rs"]
mod tests;
