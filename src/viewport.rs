//! Viewport zoom: a single scale factor and pivot applied to the whole image stack.
//!
//! The zoom scales the container element that wraps the layer images and the
//! overlay canvas. It never touches canvas backing stores, so pointer positions
//! reported by the browser are already post-zoom screen coordinates (see
//! [`crate::mapper`]).

#[cfg(test)]
#[path = "viewport_test.rs"]
mod viewport_test;

use crate::consts::{
    ZOOM_MAX, ZOOM_MIN, ZOOM_SLIDER_MAX_PERCENT, ZOOM_SLIDER_MIN_PERCENT, ZOOM_SLIDER_STEP_PERCENT, ZOOM_STEP,
};
use crate::mapper::ClientRect;

/// A point in screen or container space, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Origin held fixed by the scale transform.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Pivot {
    /// Geometric center of the container.
    #[default]
    Center,
    /// Container-local point in CSS pixels.
    At(Point),
}

/// The transform to apply to the container after a zoom change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomTransform {
    pub zoom: f64,
    pub pivot: Pivot,
}

impl ZoomTransform {
    /// CSS `transform` value.
    #[must_use]
    pub fn css_transform(&self) -> String {
        format!("scale({})", self.zoom)
    }

    /// CSS `transform-origin` value.
    #[must_use]
    pub fn css_origin(&self) -> String {
        match self.pivot {
            Pivot::Center => "center center".to_owned(),
            Pivot::At(p) => format!("{}px {}px", p.x, p.y),
        }
    }

    /// Zoom in whole percent, used for the slider position.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn percent(&self) -> i32 {
        (self.zoom * 100.0).round() as i32
    }

    /// Text for the numeric zoom readout.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{}%", self.percent())
    }
}

/// Zoom state for the image stack.
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    zoom: f64,
    pivot: Pivot,
    min: f64,
    max: f64,
    step: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::with_limits(ZOOM_MIN, ZOOM_MAX, ZOOM_STEP)
    }
}

impl Viewport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A viewport at zoom 1.0 with custom limits. Callers validate the limits
    /// (see [`crate::config::EditorConfig`]).
    #[must_use]
    pub fn with_limits(min: f64, max: f64, step: f64) -> Self {
        Self { zoom: 1.0, pivot: Pivot::Center, min, max, step }
    }

    #[must_use]
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    #[must_use]
    pub fn pivot(&self) -> Pivot {
        self.pivot
    }

    #[must_use]
    pub fn transform(&self) -> ZoomTransform {
        ZoomTransform { zoom: self.zoom, pivot: self.pivot }
    }

    /// Clamp `target` into the zoom limits and make it current.
    ///
    /// `pivot` is container-local; `None` anchors at the center. A non-finite
    /// target leaves the zoom factor unchanged but still updates the pivot.
    pub fn set_zoom(&mut self, target: f64, pivot: Option<Point>) -> ZoomTransform {
        if target.is_finite() {
            self.zoom = target.clamp(self.min, self.max);
        }
        self.pivot = pivot.map_or(Pivot::Center, Pivot::At);
        self.transform()
    }

    /// Same as `set_zoom(z, None)`.
    pub fn set(&mut self, zoom: f64) -> ZoomTransform {
        self.set_zoom(zoom, None)
    }

    pub fn zoom_in(&mut self) -> ZoomTransform {
        self.set_zoom(self.zoom * (1.0 + self.step), None)
    }

    pub fn zoom_out(&mut self) -> ZoomTransform {
        self.set_zoom(self.zoom * (1.0 - self.step), None)
    }

    /// Wheel gesture: scroll up zooms in, anything else zooms out, anchored at
    /// the cursor position relative to the container.
    pub fn on_wheel(&mut self, delta_y: f64, cursor: Point, container: ClientRect) -> ZoomTransform {
        let factor = if delta_y < 0.0 { 1.0 + self.step } else { 1.0 - self.step };
        let pivot = Point::new(cursor.x - container.left, cursor.y - container.top);
        self.set_zoom(self.zoom * factor, Some(pivot))
    }

    /// Slider input in integer percent.
    pub fn set_percent(&mut self, percent: i32) -> ZoomTransform {
        let percent = SliderDomain::ZOOM.clamp(percent);
        self.set_zoom(f64::from(percent) / 100.0, None)
    }

    pub fn reset(&mut self) -> ZoomTransform {
        self.set_zoom(1.0, None)
    }
}

/// Integer range of a range input, written to its `min`/`max`/`step`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliderDomain {
    pub min: i32,
    pub max: i32,
    pub step: i32,
}

impl SliderDomain {
    /// The zoom slider, in percent.
    pub const ZOOM: Self = Self {
        min: ZOOM_SLIDER_MIN_PERCENT,
        max: ZOOM_SLIDER_MAX_PERCENT,
        step: ZOOM_SLIDER_STEP_PERCENT,
    };

    #[must_use]
    pub fn clamp(self, value: i32) -> i32 {
        value.clamp(self.min, self.max)
    }

    /// `(min, max, step)` as attribute strings.
    #[must_use]
    pub fn attributes(self) -> (String, String, String) {
        (self.min.to_string(), self.max.to_string(), self.step.to_string())
    }
}
