//! Coordinate mapper: image pixel space → zone space.
//!
//! DESIGN
//! ======
//! Uniform scale-to-fit: the whole photo is scaled by
//! `min(zone_w / image_w, zone_h / image_h)` and centered on the short axis,
//! then translated to the zone origin plus a fixed interior margin so notes
//! never touch the anchor border.
//!
//! Every pixel result is rounded with `floor`. Integer arithmetic saturates
//! at the `i64` bounds. Output order always matches input order; later
//! stages correlate notes by index.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::geometry::{PixelPoint, PixelSize, Size};

/// Interior margin, in zone units, between the zone edge and mapped notes.
pub const ZONE_MARGIN: i64 = 10;

// =============================================================================
// TYPES
// =============================================================================

/// One sticky note as reported by the vision model, in source pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub text: String,
    #[serde(rename = "background_color")]
    pub color: String,
    /// Top-left corner.
    pub location: PixelPoint,
    pub size: PixelSize,
    #[serde(default = "default_scale")]
    pub scale: f64,
}

fn default_scale() -> f64 {
    1.0
}

/// A detection whose geometry has been rewritten into zone space.
pub type MappedNote = Detection;

/// Pixel dimensions of the photo detections were taken from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageFrame {
    pub width: i64,
    pub height: i64,
}

impl ImageFrame {
    #[must_use]
    pub fn new(width: i64, height: i64) -> Self {
        Self { width, height }
    }

    /// `false` when either side is zero (or negative), in which case no
    /// mapping can be derived from it.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn as_size(&self) -> Size {
        Size::new(self.width as f64, self.height as f64)
    }
}

/// Target rectangle in canvas space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    pub dimensions: PixelSize,
    pub location: PixelPoint,
}

impl Zone {
    #[must_use]
    pub fn new(width: i64, height: i64, x: i64, y: i64) -> Self {
        Self { dimensions: PixelSize { width, height }, location: PixelPoint { x, y } }
    }

    #[must_use]
    pub fn is_usable(&self) -> bool {
        self.dimensions.width > 0 && self.dimensions.height > 0
    }
}

/// Result of [`map_to_zone`].
#[derive(Debug, Clone, PartialEq)]
pub enum ZoneMapping {
    /// Geometry was rewritten with the given uniform scale.
    Mapped { scale: f64, notes: Vec<MappedNote> },
    /// Image or zone geometry was zero or negative; notes are returned untouched.
    Passthrough(Vec<Detection>),
}

impl ZoneMapping {
    #[must_use]
    pub fn is_mapped(&self) -> bool {
        matches!(self, Self::Mapped { .. })
    }

    #[must_use]
    pub fn scale(&self) -> Option<f64> {
        match self {
            Self::Mapped { scale, .. } => Some(*scale),
            Self::Passthrough(_) => None,
        }
    }

    #[must_use]
    pub fn notes(&self) -> &[Detection] {
        match self {
            Self::Mapped { notes, .. } | Self::Passthrough(notes) => notes,
        }
    }

    #[must_use]
    pub fn into_notes(self) -> Vec<Detection> {
        match self {
            Self::Mapped { notes, .. } | Self::Passthrough(notes) => notes,
        }
    }
}

// =============================================================================
// MAPPING
// =============================================================================

/// Fit `notes` (in `image` pixels) into `zone`.
///
/// With a zero or negative image or zone dimension this is a no-op that returns
/// [`ZoneMapping::Passthrough`] holding the input unchanged.
#[must_use]
pub fn map_to_zone(notes: &[Detection], image: ImageFrame, zone: Zone) -> ZoneMapping {
    if !image.is_usable() || !zone.is_usable() {
        warn!(
            image_width = image.width,
            image_height = image.height,
            zone_width = zone.dimensions.width,
            zone_height = zone.dimensions.height,
            "zone mapping skipped: geometry unavailable"
        );
        return ZoneMapping::Passthrough(notes.to_vec());
    }

    let image_size = image.as_size();
    let zone_size = Size::new(px(zone.dimensions.width), px(zone.dimensions.height));
    let scale = image_size.fit_scale(zone_size);
    let offset_x = (zone_size.width - image_size.width * scale) / 2.0;
    let offset_y = (zone_size.height - image_size.height * scale) / 2.0;
    let origin_x = zone.location.x.saturating_add(ZONE_MARGIN);
    let origin_y = zone.location.y.saturating_add(ZONE_MARGIN);

    let mapped = notes
        .iter()
        .map(|note| MappedNote {
            location: PixelPoint {
                x: floor_px(px(note.location.x) * scale + offset_x).saturating_add(origin_x),
                y: floor_px(px(note.location.y) * scale + offset_y).saturating_add(origin_y),
            },
            size: PixelSize {
                width: floor_px(px(note.size.width) * scale),
                height: floor_px(px(note.size.height) * scale),
            },
            ..note.clone()
        })
        .collect();

    ZoneMapping::Mapped { scale, notes: mapped }
}

#[allow(clippy::cast_precision_loss)]
fn px(v: i64) -> f64 {
    v as f64
}

#[allow(clippy::cast_possible_truncation)]
fn floor_px(v: f64) -> i64 {
    v.floor() as i64
}

#[cfg(test)]
#[path = "zone_test.rs"]
mod tests;
