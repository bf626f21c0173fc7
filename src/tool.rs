//! Tool selection: which tool is active, its size, and each tool's remembered color.

#[cfg(test)]
#[path = "tool_test.rs"]
mod tool_test;

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::consts::{DEFAULT_BRUSH_COLOR, DEFAULT_BUCKET_COLOR, DEFAULT_SIZE, ERASE_COLOR};

/// Which tool is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    /// Freehand colored stroke (default).
    #[default]
    Brush,
    /// Freehand stroke that clears pixels server-side.
    Eraser,
    /// Flood fill from a single point.
    Bucket,
}

impl Tool {
    /// Whether a pointer drag with this tool produces a stroke.
    #[must_use]
    pub fn is_stroke(self) -> bool {
        matches!(self, Self::Brush | Self::Eraser)
    }

    /// Whether this tool keeps its own user-chosen color.
    #[must_use]
    pub fn is_colorable(self) -> bool {
        matches!(self, Self::Brush | Self::Bucket)
    }

    /// Parse the `data-tool` name used by the toolbar.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim() {
            "brush" => Some(Self::Brush),
            "eraser" => Some(Self::Eraser),
            "bucket" => Some(Self::Bucket),
            _ => None,
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Brush => "brush",
            Self::Eraser => "eraser",
            Self::Bucket => "bucket",
        }
    }
}

/// Color and width used to draw and submit a stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrokeStyle {
    pub color: Color,
    pub size: u32,
}

/// Result of selecting a tool, for updating the toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolSelection {
    pub tool: Tool,
    /// Color to pre-fill and open the color picker with; `None` for tools
    /// without a user color.
    pub picker_color: Option<Color>,
}

/// Active tool and its parameters.
#[derive(Debug, Clone)]
pub struct ToolState {
    active: Tool,
    size: u32,
    brush_color: Color,
    bucket_color: Color,
    erase_color: Color,
}

impl Default for ToolState {
    fn default() -> Self {
        Self::new(DEFAULT_SIZE, DEFAULT_BRUSH_COLOR, DEFAULT_BUCKET_COLOR)
    }
}

impl ToolState {
    /// Brush is active on creation.
    #[must_use]
    pub fn new(size: u32, brush_color: Color, bucket_color: Color) -> Self {
        Self {
            active: Tool::Brush,
            size: size.max(1),
            brush_color,
            bucket_color,
            erase_color: ERASE_COLOR,
        }
    }

    #[must_use]
    pub fn active(&self) -> Tool {
        self.active
    }

    #[must_use]
    pub fn size(&self) -> u32 {
        self.size
    }

    /// The remembered color for `tool`; the eraser always reports the erase color.
    #[must_use]
    pub fn color(&self, tool: Tool) -> Color {
        match tool {
            Tool::Brush => self.brush_color,
            Tool::Bucket => self.bucket_color,
            Tool::Eraser => self.erase_color,
        }
    }

    pub fn select_tool(&mut self, tool: Tool) -> ToolSelection {
        self.active = tool;
        log::debug!("tool selected: {}", tool.name());
        ToolSelection { tool, picker_color: tool.is_colorable().then(|| self.color(tool)) }
    }

    /// Remember `color` for `tool`. Returns `false` for the eraser, whose
    /// color is fixed.
    pub fn set_color(&mut self, tool: Tool, color: Color) -> bool {
        match tool {
            Tool::Brush => self.brush_color = color,
            Tool::Bucket => self.bucket_color = color,
            Tool::Eraser => return false,
        }
        true
    }

    /// Color picker input: applies to whichever tool is active.
    pub fn set_active_color(&mut self, color: Color) -> bool {
        self.set_color(self.active, color)
    }

    /// Set the stroke width, clamped to at least 1.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn set_size(&mut self, size: i64) -> u32 {
        self.size = size.clamp(1, i64::from(u32::MAX)) as u32;
        self.size
    }

    /// Size slider input. Anything that does not start with an integer
    /// becomes 1.
    pub fn set_size_from_input(&mut self, raw: &str) -> u32 {
        self.set_size(parse_leading_int(raw).unwrap_or(1))
    }

    /// Style for live preview and stroke submission with the active tool.
    #[must_use]
    pub fn current_stroke_style(&self) -> StrokeStyle {
        StrokeStyle { color: self.color(self.active), size: self.size }
    }
}

/// Parse an optional sign and leading decimal digits, ignoring any trailing text.
fn parse_leading_int(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let end = digits.find(|c: char| !c.is_ascii_digit()).unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    let value = digits[..end].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -value } else { value })
}
