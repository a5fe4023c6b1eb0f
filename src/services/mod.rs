//! Services: the two request pipelines behind the HTTP routes.
//!
//! `scan` turns a photo into zone-space note payloads; `notes` projects
//! payloads through an anchor and creates them on the canvas.

pub mod notes;
pub mod scan;

pub use notes::{FieldMismatch, NoteOutcome, NoteSynchronizer, SyncError, SyncReport};
pub use scan::{ScanRequest, ScanResult, scan_notes};
