//! Anchor repository: read-only canvas and anchor queries.
//!
//! DESIGN
//! ======
//! Anchors define the coordinate frame placed notes must land inside, and
//! they can be moved between sessions. Nothing here caches: every call goes
//! to the server. Wire parsing lives in pure `parse_*` functions.

use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::client::CanvasClient;
use super::types::{CanvasError, CanvasSummary, Widget, WidgetKind};
use crate::geometry::{Point, Size};

/// Widget type of the root widget that spans the whole canvas.
pub const SHARED_CANVAS_TYPE: &str = "SharedCanvas";

// =============================================================================
// TYPES
// =============================================================================

/// An anchor's absolute geometry and zoom on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    pub id: String,
    pub name: String,
    pub position: Point,
    pub size: Size,
    pub scale: f64,
}

#[derive(Deserialize)]
struct RawCanvas {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

// =============================================================================
// REPOSITORY
// =============================================================================

pub struct AnchorRepository<'a> {
    client: &'a CanvasClient,
}

impl<'a> AnchorRepository<'a> {
    #[must_use]
    pub fn new(client: &'a CanvasClient) -> Self {
        Self { client }
    }

    /// List every canvas on the server. Entries without an id or a name
    /// are skipped.
    ///
    /// # Errors
    ///
    /// Returns `Api` on a non-2xx answer and `Decode` on a malformed list.
    pub async fn list_canvases(&self) -> Result<Vec<CanvasSummary>, CanvasError> {
        let raw: Vec<RawCanvas> = self
            .client
            .fetch(Method::GET, &self.client.canvases_url(), None)
            .await?;
        Ok(parse_canvases(raw))
    }

    /// List the anchors of one canvas, in server order.
    ///
    /// # Errors
    ///
    /// Returns `Api` on a non-2xx answer and `Decode` on a malformed list.
    pub async fn list_anchors(&self, canvas_id: &str) -> Result<Vec<Anchor>, CanvasError> {
        let url = self
            .client
            .canvas_url(canvas_id, &format!("/{}", WidgetKind::Anchor.resource()));
        let raw: Vec<Widget> = self.client.fetch(Method::GET, &url, None).await?;
        let anchors: Vec<Anchor> = raw.iter().map(parse_anchor).collect();
        debug!(canvas_id, count = anchors.len(), "listed anchors");
        Ok(anchors)
    }

    /// Fetch one anchor's current absolute position, size and scale.
    ///
    /// # Errors
    ///
    /// Returns `Api` on a non-2xx answer, including 404 for an unknown anchor.
    pub async fn get_anchor(&self, canvas_id: &str, anchor_id: &str) -> Result<Anchor, CanvasError> {
        let widget = self
            .client
            .get(canvas_id, WidgetKind::Anchor, anchor_id)
            .await?;
        Ok(parse_anchor(&widget))
    }

    /// Size of the `SharedCanvas` root widget.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the canvas has no such widget.
    pub async fn canvas_size(&self, canvas_id: &str) -> Result<Size, CanvasError> {
        let widgets = self.client.list_widgets(canvas_id).await?;
        shared_canvas_size(&widgets).ok_or_else(|| CanvasError::NotFound(format!("{SHARED_CANVAS_TYPE} widget")))
    }
}

// =============================================================================
// PARSING
// =============================================================================

fn parse_canvases(raw: Vec<RawCanvas>) -> Vec<CanvasSummary> {
    raw.into_iter()
        .filter_map(|c| match (c.id, c.name) {
            (Some(id), Some(name)) if !id.is_empty() && !name.is_empty() => Some(CanvasSummary { id, name }),
            _ => None,
        })
        .collect()
}

/// Build an `Anchor` from its widget. The display name lives in
/// `anchor_name`; a missing scale means the anchor is unzoomed.
pub(crate) fn parse_anchor(widget: &Widget) -> Anchor {
    Anchor {
        id: widget.id.clone().unwrap_or_default(),
        name: widget
            .extra
            .get("anchor_name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        position: widget.location.unwrap_or_default(),
        size: widget.size.unwrap_or_default(),
        scale: widget.scale.unwrap_or(1.0),
    }
}

/// Prefer the nested `size` object; older servers put `width`/`height` at
/// the top level.
fn shared_canvas_size(widgets: &[Widget]) -> Option<Size> {
    let canvas = widgets.iter().find(|w| w.is_type(SHARED_CANVAS_TYPE))?;
    if let Some(size) = canvas.size {
        return Some(size);
    }
    let dim = |key: &str| canvas.extra.get(key).and_then(Value::as_f64).unwrap_or_default();
    Some(Size::new(dim("width"), dim("height")))
}

#[cfg(test)]
#[path = "anchors_test.rs"]
mod tests;
