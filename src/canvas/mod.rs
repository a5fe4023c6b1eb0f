//! Canvas: REST access to the remote canvas workspace.
//!
//! DESIGN
//! ======
//! `client` is the transport and per-kind widget CRUD, `anchors` the
//! read-only queries the note pipeline needs, `types` the wire format.
//! Callers build a `CanvasClient` per request from a credentials snapshot.

pub mod anchors;
pub mod client;
pub mod types;

#[cfg(test)]
pub(crate) mod test_server;

pub use anchors::{Anchor, AnchorRepository};
pub use client::{CanvasClient, WidgetStream, build_http_client};
pub use types::{CanvasError, CanvasSummary, NotePayload, Widget, WidgetKind};
