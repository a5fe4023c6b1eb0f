//! Scan service: photo → zone-space note payloads.
//!
//! DESIGN
//! ======
//! Extraction, zone mapping and payload conversion, in that order. The
//! result is what the browser previews and later posts back to
//! create-notes, so every note already carries canvas wire field names.
//! Mapped notes take the zone's scale, not the detection's.

use serde::Serialize;
use tracing::info;

use crate::canvas::NotePayload;
use crate::geometry::{Point, Size};
use crate::mapping::{Detection, ImageFrame, Zone, map_to_zone};
use crate::vision::{NoteExtractor, VisionError};

/// Frame assumed when the client does not report the photo's dimensions.
pub const DEFAULT_IMAGE_FRAME: ImageFrame = ImageFrame { width: 1280, height: 720 };

/// MIME type assumed for uploads without a content type.
pub const DEFAULT_IMAGE_MIME: &str = "image/png";

#[derive(Debug, Clone)]
pub struct ScanRequest {
    pub image: Vec<u8>,
    pub mime_type: String,
    pub frame: ImageFrame,
    pub zone: Zone,
    pub zone_scale: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanResult {
    pub notes: Vec<NotePayload>,
    pub frame: ImageFrame,
    /// Scale-to-fit factor, `None` when zone mapping was skipped.
    pub fit_scale: Option<f64>,
}

/// Run one photo through the extractor and map the detections into `zone`.
///
/// # Errors
///
/// Returns the extractor's [`VisionError`] unchanged.
pub async fn scan_notes(extractor: &dyn NoteExtractor, request: &ScanRequest) -> Result<ScanResult, VisionError> {
    let detections = extractor.extract(&request.image, &request.mime_type).await?;
    info!(
        count = detections.len(),
        frame_width = request.frame.width,
        frame_height = request.frame.height,
        zone_width = request.zone.dimensions.width,
        zone_height = request.zone.dimensions.height,
        zone_scale = request.zone_scale,
        "scan: mapping detections"
    );

    let mapping = map_to_zone(&detections, request.frame, request.zone);
    let fit_scale = mapping.scale();
    let notes = mapping
        .into_notes()
        .into_iter()
        .map(|d| to_payload(d, request.zone_scale))
        .collect();

    Ok(ScanResult { notes, frame: request.frame, fit_scale })
}

#[allow(clippy::cast_precision_loss)]
fn to_payload(detection: Detection, scale: f64) -> NotePayload {
    let location = Point::new(detection.location.x as f64, detection.location.y as f64);
    let size = Size::new(detection.size.width as f64, detection.size.height as f64);
    NotePayload::new(detection.text, detection.color, location, size).with_scale(scale)
}

#[cfg(test)]
#[path = "scan_test.rs"]
mod tests;
