//! Screen-to-canvas coordinate mapping.
//!
//! Pointer events report CSS-pixel client coordinates. The overlay canvas has
//! a backing store sized `declared * dpr`, and its on-screen box may be scaled
//! further by layout and by the viewport zoom on its container. Mapping goes
//! through the element's live bounding rect, which already includes all of
//! that scaling, so the result lands in logical canvas pixels (the layer
//! image's pixel grid). The viewport zoom must not be divided out again here.

#[cfg(test)]
#[path = "mapper_test.rs"]
mod mapper_test;

use serde::{Deserialize, Serialize};

use crate::viewport::Point;

/// A point in logical canvas pixels, as sent to the server.
///
/// Serializes as a two-element array `[x, y]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[i32; 2]", into = "[i32; 2]")]
pub struct PixelPoint {
    pub x: i32,
    pub y: i32,
}

impl PixelPoint {
    #[must_use]
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// This point as a CSS-pixel [`Point`] for drawing.
    #[must_use]
    pub fn to_point(self) -> Point {
        Point::new(f64::from(self.x), f64::from(self.y))
    }
}

impl From<[i32; 2]> for PixelPoint {
    fn from([x, y]: [i32; 2]) -> Self {
        Self { x, y }
    }
}

impl From<PixelPoint> for [i32; 2] {
    fn from(p: PixelPoint) -> Self {
        [p.x, p.y]
    }
}

/// An element's bounding client rect, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClientRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl ClientRect {
    /// Translate the rect by `(dx, dy)`.
    #[must_use]
    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self { left: self.left + dx, top: self.top + dy, ..self }
    }
}

/// Canvas backing-store dimensions in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackingSize {
    pub width: u32,
    pub height: u32,
}

impl BackingSize {
    /// Backing store for a canvas declared at `width` x `height` CSS pixels.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn for_declared(width: u32, height: u32, dpr: f64) -> Self {
        let dpr = normalize_dpr(dpr);
        Self {
            width: (f64::from(width) * dpr).round() as u32,
            height: (f64::from(height) * dpr).round() as u32,
        }
    }
}

/// `window.devicePixelRatio || 1`, also rejecting negatives and NaN.
#[must_use]
pub fn normalize_dpr(dpr: f64) -> f64 {
    if dpr.is_finite() && dpr > 0.0 { dpr } else { 1.0 }
}

/// Map a client-space pointer position to logical canvas pixels.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn to_canvas_xy(screen: Point, rect: ClientRect, backing: BackingSize, dpr: f64) -> PixelPoint {
    let dpr = normalize_dpr(dpr);
    let sx = axis_scale(f64::from(backing.width) / dpr, rect.width);
    let sy = axis_scale(f64::from(backing.height) / dpr, rect.height);
    PixelPoint {
        x: ((screen.x - rect.left) * sx).round() as i32,
        y: ((screen.y - rect.top) * sy).round() as i32,
    }
}

fn axis_scale(logical: f64, on_screen: f64) -> f64 {
    if on_screen > 0.0 && on_screen.is_finite() { logical / on_screen } else { 1.0 }
}
