//! Note synchronizer: anchor-projected note creation on a canvas.
//!
//! DESIGN
//! ======
//! One request drives one sequential loop: fetch the anchor once, then for
//! each note project → create → validate, strictly in input order so the
//! sent/echoed logs line up by index.
//!
//! Creation success is defined by the transport: a 2xx is success even when
//! the echoed widget differs from what was sent, because the server is free
//! to normalize fields (colors in particular). Such drift is collected as
//! `FieldMismatch` warnings and returned in the report.
//!
//! The first failed create aborts the batch. Notes already created stay on
//! the canvas; there is no rollback.

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::canvas::{Anchor, AnchorRepository, CanvasClient, CanvasError, NotePayload, Widget};
use crate::error::ErrorCode;
use crate::mapping::{AnchorProjector, ImageFrame};

/// Server-assigned identity fields excluded from echo validation.
const IDENTITY_FIELDS: [&str; 2] = ["id", "parent_id"];

/// Numeric tolerance when comparing sent and echoed coordinates.
const NUMERIC_TOLERANCE: f64 = 1e-6;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("image frame {width}x{height} cannot be projected")]
    InvalidImageFrame { width: i64, height: i64 },
    #[error("anchor lookup failed: {0}")]
    Anchor(#[source] CanvasError),
    #[error("note {index} failed after {created} created: {source}")]
    NoteFailed {
        index: usize,
        created: usize,
        #[source]
        source: CanvasError,
    },
}

impl ErrorCode for SyncError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidImageFrame { .. } => "E_INVALID_IMAGE_FRAME",
            Self::Anchor(_) => "E_ANCHOR_LOOKUP",
            Self::NoteFailed { .. } => "E_NOTE_CREATE",
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::InvalidImageFrame { .. } => false,
            Self::Anchor(source) | Self::NoteFailed { source, .. } => source.retryable(),
        }
    }
}

/// A field the server echoed back differently from what was sent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldMismatch {
    pub field: String,
    pub sent: Value,
    pub received: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoteOutcome {
    pub index: usize,
    pub widget_id: Option<String>,
    pub mismatches: Vec<FieldMismatch>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncReport {
    pub anchor: Anchor,
    pub final_scale: f64,
    pub notes: Vec<NoteOutcome>,
}

impl SyncReport {
    #[must_use]
    pub fn created(&self) -> usize {
        self.notes.len()
    }

    #[must_use]
    pub fn mismatch_count(&self) -> usize {
        self.notes.iter().map(|n| n.mismatches.len()).sum()
    }
}

// =============================================================================
// SYNCHRONIZER
// =============================================================================

pub struct NoteSynchronizer<'a> {
    client: &'a CanvasClient,
}

impl<'a> NoteSynchronizer<'a> {
    #[must_use]
    pub fn new(client: &'a CanvasClient) -> Self {
        Self { client }
    }

    /// Create `notes` inside anchor `zone_id` on `canvas_id`.
    ///
    /// # Errors
    ///
    /// - `InvalidImageFrame` before any network call if `frame` has a zero side.
    /// - `Anchor` if the anchor cannot be fetched; nothing is created.
    /// - `NoteFailed` on the first failed create; earlier notes remain.
    pub async fn create_notes(
        &self,
        canvas_id: &str,
        zone_id: &str,
        frame: ImageFrame,
        notes: &[NotePayload],
    ) -> Result<SyncReport, SyncError> {
        if !frame.is_usable() {
            return Err(SyncError::InvalidImageFrame { width: frame.width, height: frame.height });
        }

        let anchor = AnchorRepository::new(self.client)
            .get_anchor(canvas_id, zone_id)
            .await
            .map_err(SyncError::Anchor)?;
        let projector = AnchorProjector::new(&anchor, frame);
        info!(
            canvas_id,
            zone_id,
            anchor_x = anchor.position.x,
            anchor_y = anchor.position.y,
            anchor_width = anchor.size.width,
            anchor_height = anchor.size.height,
            anchor_scale = anchor.scale,
            final_scale = projector.final_scale(),
            count = notes.len(),
            "creating notes"
        );

        let mut outcomes = Vec::with_capacity(notes.len());
        for (index, note) in notes.iter().enumerate() {
            let target = projector.project_note(note);
            debug!(index, source = ?note, target = ?target, "projected note");

            let widget = self
                .client
                .create_note(canvas_id, &target)
                .await
                .map_err(|source| {
                    warn!(index, created = outcomes.len(), error = %source, "note creation failed; aborting batch");
                    SyncError::NoteFailed { index, created: outcomes.len(), source }
                })?;

            let mismatches = validate_echo(&target, &widget);
            if mismatches.is_empty() {
                debug!(index, id = ?widget.id, "note validated");
            } else {
                for m in &mismatches {
                    warn!(index, field = %m.field, sent = %m.sent, received = ?m.received, "echoed note differs");
                }
            }

            outcomes.push(NoteOutcome { index, widget_id: widget.id.clone(), mismatches });
        }

        info!(canvas_id, created = outcomes.len(), "notes created");
        Ok(SyncReport { anchor, final_scale: projector.final_scale(), notes: outcomes })
    }
}

// =============================================================================
// VALIDATION
// =============================================================================

/// Compare every field that was sent against the server's echo, skipping
/// identity fields. Nested objects compare only the keys that were sent.
#[must_use]
pub fn validate_echo(sent: &NotePayload, echoed: &Widget) -> Vec<FieldMismatch> {
    let Ok(Value::Object(sent)) = serde_json::to_value(sent) else {
        return Vec::new();
    };
    let received = echoed.to_map();
    diff_fields(&sent, &received)
}

fn diff_fields(sent: &Map<String, Value>, received: &Map<String, Value>) -> Vec<FieldMismatch> {
    sent.iter()
        .filter(|(key, _)| !IDENTITY_FIELDS.contains(&key.as_str()))
        .filter_map(|(key, value)| {
            let echoed = received.get(key);
            match echoed {
                Some(echoed) if values_match(value, echoed) => None,
                _ => Some(FieldMismatch { field: key.clone(), sent: value.clone(), received: echoed.cloned() }),
            }
        })
        .collect()
}

fn values_match(sent: &Value, received: &Value) -> bool {
    match (sent, received) {
        (Value::Number(a), Value::Number(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(a), Some(b)) => (a - b).abs() <= NUMERIC_TOLERANCE,
            _ => a == b,
        },
        (Value::Object(a), Value::Object(b)) => a
            .iter()
            .all(|(k, v)| b.get(k).is_some_and(|r| values_match(v, r))),
        _ => sent == received,
    }
}

#[cfg(test)]
#[path = "notes_test.rs"]
mod tests;
