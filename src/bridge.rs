//! JavaScript entry point.
//!
//! The host page constructs one [`PaintEditor`] per canvas and forwards DOM
//! events to it. Each method turns the event into an engine call and runs the
//! resulting actions.

use std::cell::RefCell;
use std::rc::Rc;

use futures::StreamExt;
use futures::channel::mpsc::UnboundedReceiver;
use wasm_bindgen::prelude::*;
use web_sys::{Event, HtmlCanvasElement, HtmlElement, PointerEvent, WheelEvent};

use crate::color::Color;
use crate::config::EditorConfig;
use crate::engine::{Action, Engine, dispatch};
use crate::sync::SyncFailure;
use crate::tool::Tool;
use crate::viewport::Point;

#[wasm_bindgen]
pub struct PaintEditor {
    engine: Rc<RefCell<Engine>>,
    failures: Option<UnboundedReceiver<SyncFailure>>,
}

#[wasm_bindgen]
impl PaintEditor {
    /// Bind to the overlay canvas and the element holding the layer images.
    ///
    /// `config_json` may be empty for defaults.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the config is invalid or the overlay has no 2D context.
    #[wasm_bindgen(constructor)]
    pub fn new(overlay: HtmlCanvasElement, stack: HtmlElement, config_json: &str) -> Result<PaintEditor, JsValue> {
        let config = EditorConfig::from_json(config_json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        init_logging(config.log_level());
        let (engine, failures) = Engine::new(overlay, stack, &config)?;
        log::info!("paint canvas ready, posting to {}", config.api_base);
        Ok(Self { engine: Rc::new(RefCell::new(engine)), failures: Some(failures) })
    }

    // --- Pointer input on the overlay ---

    pub fn pointer_down(&self, ev: &PointerEvent) {
        ev.prevent_default();
        let rect = self.engine.borrow().overlay_rect();
        let actions = self.engine.borrow_mut().core.on_pointer_down(ev.pointer_id(), client_point(ev), rect);
        self.run(actions);
    }

    pub fn pointer_move(&self, ev: &PointerEvent) {
        let rect = self.engine.borrow().overlay_rect();
        let actions = self.engine.borrow_mut().core.on_pointer_move(ev.pointer_id(), client_point(ev), rect);
        self.run(actions);
    }

    pub fn pointer_up(&self, ev: &PointerEvent) {
        let rect = self.engine.borrow().overlay_rect();
        let actions = self.engine.borrow_mut().core.on_pointer_up(ev.pointer_id(), client_point(ev), rect);
        self.run(actions);
    }

    pub fn pointer_cancel(&self, ev: &PointerEvent) {
        let actions = self.engine.borrow_mut().core.on_pointer_cancel(ev.pointer_id());
        self.run(actions);
    }

    /// Native image dragging would steal the pointer stream.
    pub fn drag_start(&self, ev: &Event) {
        ev.prevent_default();
    }

    // --- Zoom ---

    /// Wheel over the image stack.
    pub fn wheel(&self, ev: &WheelEvent) {
        ev.prevent_default();
        let rect = self.engine.borrow().stack_rect();
        let cursor = Point::new(f64::from(ev.client_x()), f64::from(ev.client_y()));
        let actions = self.engine.borrow_mut().core.on_wheel(ev.delta_y(), cursor, rect);
        self.run(actions);
    }

    pub fn zoom_in(&self) {
        let actions = self.engine.borrow_mut().core.zoom_in();
        self.run(actions);
    }

    pub fn zoom_out(&self) {
        let actions = self.engine.borrow_mut().core.zoom_out();
        self.run(actions);
    }

    pub fn set_zoom(&self, zoom: f64) {
        let actions = self.engine.borrow_mut().core.set_zoom(zoom, None);
        self.run(actions);
    }

    /// Zoom slider input, in percent.
    pub fn set_zoom_percent(&self, percent: i32) {
        let actions = self.engine.borrow_mut().core.set_zoom_percent(percent);
        self.run(actions);
    }

    /// Back to 100%, centered.
    pub fn reset_zoom(&self) {
        let actions = self.engine.borrow_mut().core.reset_zoom();
        self.run(actions);
    }

    #[must_use]
    pub fn get_zoom(&self) -> f64 {
        self.engine.borrow().core.zoom()
    }

    // --- Toolbar ---

    /// Select a tool by its `data-tool` name.
    ///
    /// # Errors
    ///
    /// Returns `Err` for an unknown tool name.
    pub fn select_tool(&self, name: &str) -> Result<(), JsValue> {
        let tool = Tool::from_name(name).ok_or_else(|| JsValue::from_str(&format!("unknown tool: {name}")))?;
        let actions = self.engine.borrow_mut().core.select_tool(tool);
        self.run(actions);
        Ok(())
    }

    /// Color picker input.
    ///
    /// # Errors
    ///
    /// Returns `Err` if `hex` is not a `#rgb` or `#rrggbb` color.
    pub fn set_color(&self, hex: &str) -> Result<(), JsValue> {
        let color = Color::parse(hex).map_err(|e| JsValue::from_str(&e.to_string()))?;
        let actions = self.engine.borrow_mut().core.set_color(color);
        self.run(actions);
        Ok(())
    }

    /// Size slider input, raw.
    pub fn set_size_input(&self, raw: &str) {
        let actions = self.engine.borrow_mut().core.set_size_from_input(raw);
        self.run(actions);
    }

    // --- Layers ---

    /// Replace the layer image URLs, in panel order.
    pub fn set_layers(&self, urls: Vec<String>) {
        self.engine.borrow_mut().core.layers.set_layers(urls);
    }

    pub fn set_active_layer(&self, index: Option<u32>) {
        let index = index.map(|i| i as usize);
        self.engine.borrow_mut().core.layers.set_active(index);
    }

    /// Reload the active layer now, e.g. after an edit made elsewhere.
    pub fn invalidate(&self) {
        let actions = self.engine.borrow_mut().core.invalidate_active_layer(crate::engine::now_ms());
        self.run(actions);
    }

    /// Reallocate the overlay after a device-pixel-ratio change.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the context cannot be rescaled.
    pub fn resize(&self) -> Result<(), JsValue> {
        self.engine.borrow_mut().resize()
    }

    /// Call `callback(kind, message)` for every failed stroke or fill.
    /// Only the first registration takes effect.
    pub fn on_failure(&mut self, callback: js_sys::Function) {
        let Some(mut failures) = self.failures.take() else {
            log::warn!("failure callback already registered");
            return;
        };
        wasm_bindgen_futures::spawn_local(async move {
            while let Some(failure) = failures.next().await {
                let kind = JsValue::from_str(failure.kind.name());
                let message = JsValue::from_str(&failure.error.to_string());
                if let Err(e) = callback.call2(&JsValue::NULL, &kind, &message) {
                    log::warn!("failure callback threw: {e:?}");
                }
            }
        });
    }
}

impl PaintEditor {
    fn run(&self, actions: Vec<Action>) {
        dispatch(&self.engine, actions);
    }
}

fn client_point(ev: &PointerEvent) -> Point {
    Point::new(f64::from(ev.client_x()), f64::from(ev.client_y()))
}

fn init_logging(level: log::Level) {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(level).is_err() {
        log::debug!("logger already installed");
    }
}
