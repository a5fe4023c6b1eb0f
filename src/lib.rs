//! notemapper: turn a photo of sticky notes into notes on a shared canvas.
//!
//! Photo → vision detections (pixel space) → zone mapping → anchor
//! projection → sequential note creation over the canvas REST API.

pub mod canvas;
pub mod config;
pub mod error;
pub mod geometry;
pub mod mapping;
pub mod routes;
pub mod services;
pub mod state;
pub mod vision;
