//! Vision: photo → pixel-space note detections.
//!
//! DESIGN
//! ======
//! The rest of the crate only sees the `NoteExtractor` trait, so the scan
//! pipeline is tested with in-memory extractors and the provider can be
//! swapped without touching mapping code. The one production adapter talks
//! to Gemini over plain HTTPS.

pub mod config;
pub mod gemini;
pub mod types;

pub use config::VisionConfig;
pub use gemini::GeminiExtractor;
pub use types::{NoteExtractor, VisionError};
