//! Mapping: the two geometric stages between a photo and the canvas.
//!
//! DESIGN
//! ======
//! Three coordinate systems are involved: the vision model's pixel frame,
//! the logical drop zone, and the canvas's zoomable space. `zone` handles
//! pixels → zone, `projector` handles zone → canvas through an anchor. They
//! stay separate so each stage can be reasoned about and tested alone.

pub mod projector;
pub mod zone;

pub use projector::{AnchorProjector, composite_scale};
pub use zone::{Detection, ImageFrame, MappedNote, ZONE_MARGIN, Zone, ZoneMapping, map_to_zone};
