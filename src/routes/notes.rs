//! Note routes: scan a photo, then create the chosen notes.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{info, warn};

use super::canvases::required;
use super::error::ApiError;
use crate::canvas::NotePayload;
use crate::mapping::{ImageFrame, Zone};
use crate::services::scan::{DEFAULT_IMAGE_FRAME, DEFAULT_IMAGE_MIME};
use crate::services::{NoteSynchronizer, ScanRequest, scan_notes as run_scan};
use crate::state::AppState;

/// Upper bound on the scan form, photo included.
pub const MAX_SCAN_BODY_BYTES: usize = 32 * 1024 * 1024;

/// Largest magnitude accepted for any zone or image geometry value.
pub const MAX_GEOMETRY: f64 = 1.0e9;

// =============================================================================
// SCAN
// =============================================================================

/// `POST /api/scan-notes`: multipart form with `image` plus optional
/// `zoneDimensions` (`[w, h]`), `zoneLocation` (`[x, y]`), `zoneScale`,
/// `imageWidth` and `imageHeight`. The image frame must be given whole or
/// not at all; without it the default frame applies.
///
/// # Errors
///
/// 503 without an extractor, 400 for a bad form and 502 when extraction
/// fails.
pub async fn scan_notes(State(state): State<AppState>, multipart: Multipart) -> Result<Json<Value>, ApiError> {
    let Some(extractor) = state.extractor.clone() else {
        return Err(ApiError::plain(
            StatusCode::SERVICE_UNAVAILABLE,
            "E_SCAN_UNAVAILABLE",
            "note extraction is not configured",
        ));
    };

    let request = read_scan_form(multipart).await?;
    info!(bytes = request.image.len(), mime_type = %request.mime_type, "scan: request received");

    let result = run_scan(extractor.as_ref(), &request).await?;
    info!(count = result.notes.len(), "scan: complete");

    Ok(Json(json!({
        "status": "complete",
        "notes": result.notes,
        "imageWidth": result.frame.width,
        "imageHeight": result.frame.height,
        "fitScale": result.fit_scale,
    })))
}

async fn read_scan_form(mut multipart: Multipart) -> Result<ScanRequest, ApiError> {
    let mut image: Option<(Vec<u8>, String)> = None;
    let mut dimensions = [0.0, 0.0];
    let mut location = [0.0, 0.0];
    let mut zone_scale = 1.0;
    let mut width: Option<f64> = None;
    let mut height: Option<f64> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request("E_INVALID_FORM", e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == "image" {
            let mime = field.content_type().unwrap_or(DEFAULT_IMAGE_MIME).to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::bad_request("E_INVALID_FORM", e.body_text()))?;
            image = Some((bytes.to_vec(), mime));
            continue;
        }

        let text = field
            .text()
            .await
            .map_err(|e| ApiError::bad_request("E_INVALID_FORM", e.body_text()))?;
        if text.trim().is_empty() {
            continue;
        }
        match name.as_str() {
            "zoneDimensions" => dimensions = parse_field(&name, &text)?,
            "zoneLocation" => location = parse_field(&name, &text)?,
            "zoneScale" => zone_scale = parse_field(&name, &text)?,
            "imageWidth" => width = Some(parse_field(&name, &text)?),
            "imageHeight" => height = Some(parse_field(&name, &text)?),
            other => warn!(field = other, "scan: ignoring unknown form field"),
        }
    }

    let Some((image, mime_type)) = image.filter(|(bytes, _)| !bytes.is_empty()) else {
        return Err(ApiError::bad_request("E_IMAGE_REQUIRED", "image file required"));
    };
    let frame = match (width, height) {
        (Some(w), Some(h)) => ImageFrame::new(geometry_px("imageWidth", w)?, geometry_px("imageHeight", h)?),
        (None, None) => DEFAULT_IMAGE_FRAME,
        _ => {
            return Err(ApiError::bad_request(
                "E_INVALID_FIELD",
                "imageWidth and imageHeight must be sent together",
            ));
        }
    };
    let zone = Zone::new(
        geometry_px("zoneDimensions", dimensions[0])?,
        geometry_px("zoneDimensions", dimensions[1])?,
        geometry_px("zoneLocation", location[0])?,
        geometry_px("zoneLocation", location[1])?,
    );

    Ok(ScanRequest { image, mime_type, frame, zone, zone_scale })
}

fn parse_field<T: DeserializeOwned>(name: &str, text: &str) -> Result<T, ApiError> {
    serde_json::from_str(text).map_err(|e| ApiError::bad_request("E_INVALID_FIELD", format!("{name}: {e}")))
}

/// Round a form value to whole pixels, rejecting anything outside
/// `±MAX_GEOMETRY`.
fn geometry_px(name: &str, v: f64) -> Result<i64, ApiError> {
    if v.abs() > MAX_GEOMETRY {
        return Err(ApiError::bad_request("E_INVALID_FIELD", format!("{name}: {v} out of range")));
    }
    Ok(round_px(v))
}

#[allow(clippy::cast_possible_truncation)]
fn round_px(v: f64) -> i64 {
    v.round() as i64
}

// =============================================================================
// CREATE
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNotesBody {
    #[serde(rename = "canvasID", default)]
    pub canvas_id: String,
    #[serde(rename = "zoneID", default)]
    pub zone_id: String,
    #[serde(default)]
    pub notes: Vec<NotePayload>,
    #[serde(default)]
    pub image_width: f64,
    #[serde(default)]
    pub image_height: f64,
}

/// `POST /api/create-notes`: project `notes` into anchor `zoneID` and
/// create them one by one. Echo mismatches come back as `warnings`.
///
/// # Errors
///
/// 400 for a malformed body or missing ids. A failed create reports the
/// failing `index` and how many notes were `created`.
pub async fn create_notes(
    State(state): State<AppState>,
    body: Result<Json<CreateNotesBody>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(body) = body?;
    let client = state.canvas_client().await?;
    let canvas_id = required(Some(body.canvas_id.as_str()), "canvasID")?;
    let zone_id = required(Some(body.zone_id.as_str()), "zoneID")?;
    let frame = ImageFrame::new(
        geometry_px("imageWidth", body.image_width)?,
        geometry_px("imageHeight", body.image_height)?,
    );

    let report = NoteSynchronizer::new(&client)
        .create_notes(canvas_id, zone_id, frame, &body.notes)
        .await?;

    let warnings: Vec<Value> = report
        .notes
        .iter()
        .flat_map(|outcome| {
            outcome
                .mismatches
                .iter()
                .map(move |m| json!({ "index": outcome.index, "field": m.field, "sent": m.sent, "received": m.received }))
        })
        .collect();

    Ok(Json(json!({
        "status": "notes created",
        "created": report.created(),
        "finalScale": report.final_scale,
        "ids": report.notes.iter().map(|n| n.widget_id.clone()).collect::<Vec<_>>(),
        "warnings": warnings,
    })))
}

#[cfg(test)]
#[path = "notes_test.rs"]
mod tests;
