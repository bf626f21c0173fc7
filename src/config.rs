//! Editor configuration, handed over by the host page as JSON.
//!
//! Every field has a default, so `{}` (or an empty string) yields the stock
//! editor: zoom 20%–500% in 10% steps, a 10px red brush, a green bucket, and
//! same-origin `/api/v1/tools/*` endpoints.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use serde::Deserialize;

use crate::color::Color;
use crate::consts::{
    DEFAULT_BRUSH_COLOR, DEFAULT_BUCKET_COLOR, DEFAULT_SIZE, FILL_PATH, STROKE_PATH, ZOOM_MAX, ZOOM_MIN, ZOOM_STEP,
};
use crate::tool::{Tool, ToolState};
use crate::viewport::Viewport;

/// Error returned by [`EditorConfig::from_json`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid zoom limits: min={min} max={max}")]
    ZoomLimits { min: f64, max: f64 },
    #[error("invalid zoom step: {0}")]
    ZoomStep(f64),
    #[error("invalid {field} color: {value:?}")]
    Color { field: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Prefix for the endpoint paths; empty means same origin.
    pub api_base: String,
    pub stroke_path: String,
    pub fill_path: String,
    pub zoom_min: f64,
    pub zoom_max: f64,
    pub zoom_step: f64,
    pub default_size: u32,
    pub brush_color: String,
    pub bucket_color: String,
    /// `log` level name for the console logger (`error` .. `trace`).
    pub log_level: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            api_base: String::new(),
            stroke_path: STROKE_PATH.to_owned(),
            fill_path: FILL_PATH.to_owned(),
            zoom_min: ZOOM_MIN,
            zoom_max: ZOOM_MAX,
            zoom_step: ZOOM_STEP,
            default_size: DEFAULT_SIZE,
            brush_color: DEFAULT_BRUSH_COLOR.to_hex(),
            bucket_color: DEFAULT_BUCKET_COLOR.to_hex(),
            log_level: "info".to_owned(),
        }
    }
}

impl EditorConfig {
    /// Parse and validate a JSON config. Blank input yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for malformed JSON, inverted or non-positive
    /// zoom limits, a step outside `(0, 1)`, or an unparseable color.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config = if raw.trim().is_empty() { Self::default() } else { serde_json::from_str(raw)? };
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// See [`EditorConfig::from_json`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        let limits_ok = self.zoom_min.is_finite()
            && self.zoom_max.is_finite()
            && self.zoom_min > 0.0
            && self.zoom_min <= self.zoom_max;
        if !limits_ok {
            return Err(ConfigError::ZoomLimits { min: self.zoom_min, max: self.zoom_max });
        }
        if !(self.zoom_step > 0.0 && self.zoom_step < 1.0) {
            return Err(ConfigError::ZoomStep(self.zoom_step));
        }
        parse_color("brush", &self.brush_color)?;
        parse_color("bucket", &self.bucket_color)?;
        Ok(())
    }

    #[must_use]
    pub fn stroke_url(&self) -> String {
        join_url(&self.api_base, &self.stroke_path)
    }

    #[must_use]
    pub fn fill_url(&self) -> String {
        join_url(&self.api_base, &self.fill_path)
    }

    /// Initial viewport built from the zoom limits.
    #[must_use]
    pub fn viewport(&self) -> Viewport {
        Viewport::with_limits(self.zoom_min, self.zoom_max, self.zoom_step)
    }

    /// Initial tool state. Invalid colors fall back to the stock defaults.
    #[must_use]
    pub fn tools(&self) -> ToolState {
        let stock = ToolState::default();
        ToolState::new(
            self.default_size,
            parse_color("brush", &self.brush_color).unwrap_or(stock.color(Tool::Brush)),
            parse_color("bucket", &self.bucket_color).unwrap_or(stock.color(Tool::Bucket)),
        )
    }

    /// The configured log level, `Info` if unrecognized.
    #[must_use]
    pub fn log_level(&self) -> log::Level {
        self.log_level.parse().unwrap_or(log::Level::Info)
    }
}

fn parse_color(field: &'static str, value: &str) -> Result<Color, ConfigError> {
    Color::parse(value).map_err(|_| ConfigError::Color { field, value: value.to_owned() })
}

fn join_url(base: &str, path: &str) -> String {
    if base.is_empty() {
        return path.to_owned();
    }
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}
