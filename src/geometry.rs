//! Plain geometry value types shared by the canvas wire format and the
//! coordinate mappers.

use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "geometry_test.rs"]
mod tests;

/// A point in pixel, zone or canvas space. The space is implied by the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Width and height of a rectangle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
}

impl Size {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// `true` when both sides are strictly positive.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    /// Uniform factor that fits `self` inside `target` without distortion.
    ///
    /// Callers must check that `self` is positive first.
    #[must_use]
    pub fn fit_scale(&self, target: Size) -> f64 {
        (target.width / self.width).min(target.height / self.height)
    }
}

/// Integer pixel location, as reported by the vision model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: i64,
    pub y: i64,
}

/// Integer pixel size, as reported by the vision model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelSize {
    pub width: i64,
    pub height: i64,
}
