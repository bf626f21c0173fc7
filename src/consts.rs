//! Shared numeric and string constants for the paint canvas.

use crate::color::Color;

// ── Zoom ────────────────────────────────────────────────────────

/// Smallest allowed viewport zoom factor.
pub const ZOOM_MIN: f64 = 0.2;

/// Largest allowed viewport zoom factor.
pub const ZOOM_MAX: f64 = 5.0;

/// Multiplicative step for zoom in/out buttons and wheel notches.
pub const ZOOM_STEP: f64 = 0.10;

/// Zoom slider domain, in integer percent.
pub const ZOOM_SLIDER_MIN_PERCENT: i32 = 20;
pub const ZOOM_SLIDER_MAX_PERCENT: i32 = 500;
pub const ZOOM_SLIDER_STEP_PERCENT: i32 = 1;

// ── Tools ───────────────────────────────────────────────────────

/// Stroke width on load, in logical canvas pixels.
pub const DEFAULT_SIZE: u32 = 10;

pub const DEFAULT_BRUSH_COLOR: Color = Color::rgb(0xff, 0x00, 0x00);
pub const DEFAULT_BUCKET_COLOR: Color = Color::rgb(0x00, 0xff, 0x00);

/// Color the eraser previews and submits with.
pub const ERASE_COLOR: Color = Color::rgb(0xff, 0xff, 0xff);

// ── Server ──────────────────────────────────────────────────────

pub const STROKE_PATH: &str = "/api/v1/tools/stroke";
pub const FILL_PATH: &str = "/api/v1/tools/bucket_fill";

/// Layer `<img>` elements are `id="layer0"`, `id="layer1"`, ... in panel order.
pub const LAYER_IMAGE_ID_PREFIX: &str = "layer";

/// Query parameter appended to layer image URLs to defeat the browser cache.
pub const CACHE_BUST_PARAM: &str = "t";
