//! Anchor projector: zone space → absolute canvas space.
//!
//! DESIGN
//! ======
//! Two scale factors compose here: fitting the photo frame into the anchor
//! rectangle, and the anchor's own zoom on the canvas. Their product is
//! baked into location and size, and the outgoing widget scale is pinned to
//! `1` so the canvas renderer applies nothing further.

use crate::canvas::{Anchor, NotePayload};
use crate::geometry::{Point, Size};

use super::zone::ImageFrame;

/// Widget scale sent with every projected note.
pub const PROJECTED_NOTE_SCALE: f64 = 1.0;

/// `min(anchor_w / image_w, anchor_h / image_h) * anchor.scale`.
///
/// An anchor without positive bounds is treated as already canvas-scale and
/// yields `anchor.scale`. So does an unusable image frame.
#[must_use]
pub fn composite_scale(anchor: &Anchor, image: ImageFrame) -> f64 {
    if !anchor.size.is_positive() || !image.is_usable() {
        return anchor.scale;
    }
    image.as_size().fit_scale(anchor.size) * anchor.scale
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnchorProjector {
    origin: Point,
    final_scale: f64,
}

impl AnchorProjector {
    #[must_use]
    pub fn new(anchor: &Anchor, image: ImageFrame) -> Self {
        Self { origin: anchor.position, final_scale: composite_scale(anchor, image) }
    }

    #[must_use]
    pub fn final_scale(&self) -> f64 {
        self.final_scale
    }

    #[must_use]
    pub fn project_point(&self, p: Point) -> Point {
        Point::new(self.origin.x + p.x * self.final_scale, self.origin.y + p.y * self.final_scale)
    }

    #[must_use]
    pub fn project_size(&self, s: Size) -> Size {
        Size::new(s.width * self.final_scale, s.height * self.final_scale)
    }

    /// Project a note's geometry and pin its scale to `1`.
    #[must_use]
    pub fn project_note(&self, note: &NotePayload) -> NotePayload {
        NotePayload {
            location: self.project_point(note.location),
            size: self.project_size(note.size),
            scale: PROJECTED_NOTE_SCALE,
            ..note.clone()
        }
    }
}

#[cfg(test)]
#[path = "projector_test.rs"]
mod tests;
