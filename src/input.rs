//! Pointer input and the stroke capture state machine.
//!
//! `StrokeCapture` tracks one gesture between pointer-down and pointer-up.
//! Brush and eraser drags accumulate a point sequence and emit a preview
//! segment per move; release turns the sequence into a stroke submission.
//! A bucket press submits a fill immediately and never leaves `Idle`.
//!
//! Only the pointer that started a stroke can move, finish, or cancel it,
//! mirroring the browser's exclusive pointer capture.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::engine::Action;
use crate::mapper::PixelPoint;
use crate::sync::{FillRequest, StrokeRequest, SyncOp};
use crate::tool::{StrokeStyle, Tool, ToolState};

/// Browser `PointerEvent.pointerId`.
pub type PointerId = i32;

/// Identifies one submission so its completion can be matched back to it.
pub type SubmitId = u64;

/// Internal state for the capture state machine.
#[derive(Debug, Clone, Default)]
pub enum CaptureState {
    /// No stroke in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// A brush or eraser stroke is being dragged.
    Drawing {
        /// The pointer that owns this stroke.
        pointer_id: PointerId,
        /// Tool active at pointer-down.
        tool: Tool,
        /// Color and width at pointer-down; used for both preview and submit.
        style: StrokeStyle,
        /// Logical canvas points in arrival order. Never empty.
        points: Vec<PixelPoint>,
    },
}

/// Stroke capture for the overlay canvas.
#[derive(Debug, Clone, Default)]
pub struct StrokeCapture {
    state: CaptureState,
    next_submit: SubmitId,
}

impl StrokeCapture {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> &CaptureState {
        &self.state
    }

    #[must_use]
    pub fn is_drawing(&self) -> bool {
        matches!(self.state, CaptureState::Drawing { .. })
    }

    /// Points accumulated so far; empty while idle.
    #[must_use]
    pub fn points(&self) -> &[PixelPoint] {
        match &self.state {
            CaptureState::Drawing { points, .. } => points,
            CaptureState::Idle => &[],
        }
    }

    pub fn pointer_down(&mut self, pointer_id: PointerId, at: PixelPoint, tools: &ToolState) -> Vec<Action> {
        if self.is_drawing() {
            return Vec::new();
        }
        let tool = tools.active();
        if !tool.is_stroke() {
            log::debug!("fill requested at ({}, {})", at.x, at.y);
            let request = FillRequest { color: tools.color(Tool::Bucket), start_point: at };
            return vec![self.submit(SyncOp::Fill(request))];
        }
        self.state = CaptureState::Drawing {
            pointer_id,
            tool,
            style: tools.current_stroke_style(),
            points: vec![at],
        };
        vec![Action::CapturePointer(pointer_id)]
    }

    pub fn pointer_move(&mut self, pointer_id: PointerId, at: PixelPoint) -> Vec<Action> {
        let CaptureState::Drawing { pointer_id: owner, style, points, .. } = &mut self.state else {
            return Vec::new();
        };
        if *owner != pointer_id {
            return Vec::new();
        }
        let Some(&from) = points.last() else {
            return Vec::new();
        };
        points.push(at);
        vec![Action::DrawSegment { from, to: at, style: *style }]
    }

    /// Finish the stroke. The overlay keeps the preview until the layer
    /// image reloads.
    pub fn pointer_up(&mut self, pointer_id: PointerId, at: PixelPoint) -> Vec<Action> {
        if !self.owns(pointer_id) {
            return Vec::new();
        }
        let CaptureState::Drawing { tool, style, mut points, .. } = std::mem::take(&mut self.state) else {
            return Vec::new();
        };
        points.push(at);
        log::debug!("stroke finished: tool={} points={}", tool.name(), points.len());
        let request = StrokeRequest { tool, color: style.color, size: style.size, points };
        vec![self.submit(SyncOp::Stroke(request))]
    }

    /// Abort the stroke without submitting it.
    pub fn pointer_cancel(&mut self, pointer_id: PointerId) -> Vec<Action> {
        if !self.owns(pointer_id) {
            return Vec::new();
        }
        self.state = CaptureState::Idle;
        log::debug!("stroke cancelled");
        vec![Action::ClearOverlay]
    }

    /// Segments that redraw the in-progress stroke on a freshly cleared overlay.
    #[must_use]
    pub fn preview_segments(&self) -> Vec<Action> {
        let CaptureState::Drawing { style, points, .. } = &self.state else {
            return Vec::new();
        };
        segments(points, *style)
    }

    fn submit(&mut self, op: SyncOp) -> Action {
        let id = self.next_submit;
        self.next_submit += 1;
        Action::Submit { id, op }
    }

    fn owns(&self, pointer_id: PointerId) -> bool {
        matches!(self.state, CaptureState::Drawing { pointer_id: owner, .. } if owner == pointer_id)
    }
}

/// One `DrawSegment` per consecutive pair of `points`.
#[must_use]
pub fn segments(points: &[PixelPoint], style: StrokeStyle) -> Vec<Action> {
    points.windows(2).map(|pair| Action::DrawSegment { from: pair[0], to: pair[1], style }).collect()
}
