//! Browser drawing and DOM updates.
//!
//! This module is the only place that touches [`web_sys::CanvasRenderingContext2d`]
//! and the toolbar/zoom controls. It receives values computed by
//! [`crate::engine::EngineCore`] and produces pixels and DOM changes; it does
//! not mutate any engine state.
//!
//! All fallible browser calls propagate errors via `Result<(), JsValue>`.
//! The top-level caller ([`crate::engine::dispatch`]) logs the result.

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, Document, Element, HtmlCanvasElement, HtmlElement, HtmlInputElement};

use crate::color::Color;
use crate::mapper::{BackingSize, ClientRect, PixelPoint};
use crate::tool::{StrokeStyle, Tool, ToolSelection};
use crate::viewport::{SliderDomain, ZoomTransform};

const TOOL_BUTTON_SELECTOR: &str = "[data-tool]";
const COLOR_PICKER_ID: &str = "color-picker";
const SIZE_VALUE_ID: &str = "size-value";
const ZOOM_SLIDER_SELECTOR: &str = ".zoom input[type=\"range\"]";
const ZOOM_VALUE_SELECTOR: &str = ".zoom .zoom-value";

/// Fetch the overlay's 2D context.
///
/// # Errors
///
/// Returns `Err` if the browser refuses or returns a non-2D context.
pub fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, JsValue> {
    canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(JsValue::from)
}

/// The canvas's declared size from its markup attribute, else `fallback`.
#[must_use]
pub fn declared_dimension(canvas: &HtmlCanvasElement, attr: &str, fallback: u32) -> u32 {
    canvas
        .get_attribute(attr)
        .map_or(fallback, |v| v.trim().parse().unwrap_or(fallback))
}

/// Reallocate the backing store and rescale the context to device pixels.
///
/// Resizing the backing store resets the context, so the transform is set
/// afterwards.
///
/// # Errors
///
/// Returns `Err` if a style write or `setTransform` fails.
pub fn setup_overlay(
    canvas: &HtmlCanvasElement,
    ctx: &CanvasRenderingContext2d,
    declared_width: u32,
    declared_height: u32,
    backing: BackingSize,
    dpr: f64,
) -> Result<(), JsValue> {
    canvas.set_width(backing.width);
    canvas.set_height(backing.height);
    let style = canvas.style();
    style.set_property("width", &format!("{declared_width}px"))?;
    style.set_property("height", &format!("{declared_height}px"))?;
    ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0)
}

#[must_use]
pub fn client_rect(element: &Element) -> ClientRect {
    let rect = element.get_bounding_client_rect();
    ClientRect { left: rect.left(), top: rect.top(), width: rect.width(), height: rect.height() }
}

/// Draw one round-capped preview segment in logical pixels.
pub fn draw_segment(ctx: &CanvasRenderingContext2d, from: PixelPoint, to: PixelPoint, style: StrokeStyle) {
    ctx.set_line_cap("round");
    ctx.set_line_join("round");
    ctx.set_line_width(f64::from(style.size));
    ctx.set_stroke_style_str(&style.color.to_hex());
    ctx.begin_path();
    let (from, to) = (from.to_point(), to.to_point());
    ctx.move_to(from.x, from.y);
    ctx.line_to(to.x, to.y);
    ctx.stroke();
}

/// Wipe the whole overlay.
pub fn clear(ctx: &CanvasRenderingContext2d, canvas: &HtmlCanvasElement) {
    ctx.clear_rect(0.0, 0.0, f64::from(canvas.width()), f64::from(canvas.height()));
}

/// Scale the image stack and sync the zoom slider and readout.
///
/// # Errors
///
/// Returns `Err` if a style write fails.
pub fn apply_zoom(stack: &HtmlElement, transform: &ZoomTransform) -> Result<(), JsValue> {
    let style = stack.style();
    style.set_property("transform-origin", &transform.css_origin())?;
    style.set_property("transform", &transform.css_transform())?;

    let Some(document) = document() else {
        return Ok(());
    };
    if let Some(slider) = document.query_selector(ZOOM_SLIDER_SELECTOR)? {
        if let Some(input) = slider.dyn_ref::<HtmlInputElement>() {
            input.set_value(&transform.percent().to_string());
        }
    }
    if let Some(label) = document.query_selector(ZOOM_VALUE_SELECTOR)? {
        label.set_text_content(Some(&transform.label()));
    }
    Ok(())
}

/// Write the zoom slider's `min`/`max`/`step` so the control and
/// [`crate::viewport::Viewport::set_percent`] share one range.
///
/// # Errors
///
/// Returns `Err` if the slider query fails.
pub fn init_zoom_slider(domain: SliderDomain) -> Result<(), JsValue> {
    let Some(document) = document() else {
        return Ok(());
    };
    let Some(slider) = document.query_selector(ZOOM_SLIDER_SELECTOR)? else {
        log::debug!("no zoom slider in page");
        return Ok(());
    };
    if let Some(input) = slider.dyn_ref::<HtmlInputElement>() {
        let (min, max, step) = domain.attributes();
        input.set_min(&min);
        input.set_max(&max);
        input.set_step(&step);
    }
    Ok(())
}

/// Mark the selected tool button and open the color picker for colorable tools.
///
/// # Errors
///
/// Returns `Err` if a DOM query or style write fails.
pub fn show_tool_selection(selection: ToolSelection) -> Result<(), JsValue> {
    let Some(document) = document() else {
        return Ok(());
    };
    let buttons = document.query_selector_all(TOOL_BUTTON_SELECTOR)?;
    for i in 0..buttons.length() {
        let Some(button) = buttons.item(i).and_then(|n| n.dyn_ref::<HtmlElement>().cloned()) else {
            continue;
        };
        let is_active = button.get_attribute("data-tool").as_deref() == Some(selection.tool.name());
        button.class_list().toggle_with_force("active", is_active)?;
        match selection.picker_color.filter(|_| is_active) {
            Some(color) => {
                button.style().set_property("background-color", &color.to_hex())?;
                button.style().set_property("opacity", "1")?;
            }
            None => {
                button.style().remove_property("background-color")?;
                button.style().remove_property("opacity")?;
            }
        }
    }

    if let Some(color) = selection.picker_color {
        if let Some(picker) = color_picker(&document) {
            picker.set_value(&color.to_hex());
            picker.click();
        }
    }
    Ok(())
}

/// Re-tint every toolbar button for `tool`.
///
/// # Errors
///
/// Returns `Err` if a DOM query or style write fails.
pub fn tint_tool(tool: Tool, color: Color) -> Result<(), JsValue> {
    let Some(document) = document() else {
        return Ok(());
    };
    let buttons = document.query_selector_all(&format!("[data-tool=\"{}\"]", tool.name()))?;
    for i in 0..buttons.length() {
        if let Some(button) = buttons.item(i).and_then(|n| n.dyn_ref::<HtmlElement>().cloned()) {
            button.style().set_property("background-color", &color.to_hex())?;
        }
    }
    Ok(())
}

/// Show the stroke size next to the size slider.
pub fn show_size(size: u32) {
    if let Some(label) = document().and_then(|d| d.get_element_by_id(SIZE_VALUE_ID)) {
        label.set_text_content(Some(&size.to_string()));
    }
}

fn document() -> Option<Document> {
    web_sys::window()?.document()
}

fn color_picker(document: &Document) -> Option<HtmlInputElement> {
    document.get_element_by_id(COLOR_PICKER_ID)?.dyn_ref::<HtmlInputElement>().cloned()
}
