//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! The browser UI drives a two-step flow: scan a photo into note payloads,
//! then create the chosen payloads inside an anchor. Everything else here
//! exists to let the UI pick a canvas and an anchor first. All routes share
//! one `AppState`; credentials are read per request.

pub mod canvases;
pub mod credentials;
pub mod error;
pub mod notes;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use error::ApiError;

use crate::state::AppState;

/// Every HTTP route, with CORS and request tracing.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/set-credentials", post(credentials::set_credentials))
        .route("/api/get-canvases", get(canvases::get_canvases))
        .route("/api/get-anchors", get(canvases::get_anchors))
        .route("/api/get-anchor-info", get(canvases::get_anchor_info))
        .route("/api/get-canvas-size", get(canvases::get_canvas_size))
        .route(
            "/api/scan-notes",
            post(notes::scan_notes).layer(DefaultBodyLimit::max(notes::MAX_SCAN_BODY_BYTES)),
        )
        .route("/api/create-notes", post(notes::create_notes))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
