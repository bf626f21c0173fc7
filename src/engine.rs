#[cfg(feature = "hydrate")]
use std::cell::RefCell;
use std::collections::HashMap;
#[cfg(feature = "hydrate")]
use std::rc::Rc;

#[cfg(feature = "hydrate")]
use wasm_bindgen::{JsCast, JsValue};
#[cfg(feature = "hydrate")]
use wasm_bindgen::closure::Closure;
#[cfg(feature = "hydrate")]
use web_sys::{AddEventListenerOptions, CanvasRenderingContext2d, HtmlCanvasElement, HtmlElement, HtmlImageElement};

use crate::color::Color;
use crate::config::EditorConfig;
use crate::input::{PointerId, StrokeCapture, SubmitId, segments};
use crate::layer::{CacheBuster, LayerQuery, LayerTable};
#[cfg(feature = "hydrate")]
use crate::layer::ReloadSlots;
use crate::mapper::{BackingSize, ClientRect, PixelPoint, normalize_dpr, to_canvas_xy};
#[cfg(feature = "hydrate")]
use crate::net::GlooTransport;
#[cfg(feature = "hydrate")]
use crate::render;
use crate::sync::{SyncError, SyncKind, SyncOp};
#[cfg(feature = "hydrate")]
use crate::sync::{SyncClient, SyncFailure};
use crate::tool::{StrokeStyle, Tool, ToolSelection, ToolState};
use crate::viewport::{Point, Viewport, ZoomTransform};
#[cfg(feature = "hydrate")]
use crate::viewport::SliderDomain;

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Route further events of this pointer to the overlay canvas.
    CapturePointer(PointerId),
    /// Draw one preview segment on the overlay.
    DrawSegment { from: PixelPoint, to: PixelPoint, style: StrokeStyle },
    /// Wipe the overlay.
    ClearOverlay,
    /// Send an operation to the server, then call [`EngineCore::on_sync_complete`].
    Submit { id: SubmitId, op: SyncOp },
    /// Apply a new scale transform to the image stack and zoom controls.
    ApplyZoom(ZoomTransform),
    /// Mark the selected tool in the toolbar and open the color picker if present.
    ToolSelected(ToolSelection),
    /// Re-tint toolbar indicators for `tool`.
    ToolColorChanged { tool: Tool, color: Color },
    /// Update the size readout.
    SizeChanged(u32),
    /// Point the layer's image at `url`, then call [`EngineCore::on_layer_loaded`].
    ReloadLayer { index: usize, url: String },
}

/// Engine state and logic that does not depend on the browser.
///
/// Separated from `Engine` so it can be tested without WASM/browser dependencies.
pub struct EngineCore<L = LayerTable> {
    pub viewport: Viewport,
    pub tools: ToolState,
    pub capture: StrokeCapture,
    pub layers: L,
    cache: CacheBuster,
    /// Latest image URL issued per layer index, with its reload generation.
    issued: HashMap<usize, (String, u64)>,
    /// Bumped by every issued reload.
    generation: u64,
    /// Released strokes whose preview stays on the overlay until a reload
    /// issued after their sync has loaded.
    pending: Vec<PendingStroke>,
    backing: BackingSize,
    dpr: f64,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self::new(&EditorConfig::default())
    }
}

impl EngineCore {
    #[must_use]
    pub fn new(config: &EditorConfig) -> Self {
        Self::with_layers(config, LayerTable::new())
    }
}

impl<L: LayerQuery> EngineCore<L> {
    /// An engine reading the active layer from `layers`.
    #[must_use]
    pub fn with_layers(config: &EditorConfig, layers: L) -> Self {
        Self {
            viewport: config.viewport(),
            tools: config.tools(),
            capture: StrokeCapture::new(),
            layers,
            cache: CacheBuster::new(),
            issued: HashMap::new(),
            generation: 0,
            pending: Vec::new(),
            backing: BackingSize { width: 0, height: 0 },
            dpr: 1.0,
        }
    }

    // --- Canvas geometry ---

    /// Record the overlay's declared size and the device pixel ratio.
    ///
    /// Returns the backing-store size the host must allocate.
    pub fn set_canvas_size(&mut self, width: u32, height: u32, dpr: f64) -> BackingSize {
        self.dpr = normalize_dpr(dpr);
        self.backing = BackingSize::for_declared(width, height, self.dpr);
        log::debug!("overlay backing store {}x{} at dpr {}", self.backing.width, self.backing.height, self.dpr);
        self.backing
    }

    #[must_use]
    pub fn backing(&self) -> BackingSize {
        self.backing
    }

    #[must_use]
    pub fn dpr(&self) -> f64 {
        self.dpr
    }

    /// Map a client-space point using the overlay's current bounding rect.
    #[must_use]
    pub fn map_point(&self, screen: Point, rect: ClientRect) -> PixelPoint {
        to_canvas_xy(screen, rect, self.backing, self.dpr)
    }

    // --- Pointer input ---

    pub fn on_pointer_down(&mut self, pointer_id: PointerId, screen: Point, rect: ClientRect) -> Vec<Action> {
        let at = self.map_point(screen, rect);
        self.capture.pointer_down(pointer_id, at, &self.tools)
    }

    pub fn on_pointer_move(&mut self, pointer_id: PointerId, screen: Point, rect: ClientRect) -> Vec<Action> {
        let at = self.map_point(screen, rect);
        self.capture.pointer_move(pointer_id, at)
    }

    pub fn on_pointer_up(&mut self, pointer_id: PointerId, screen: Point, rect: ClientRect) -> Vec<Action> {
        let at = self.map_point(screen, rect);
        let actions = self.capture.pointer_up(pointer_id, at);
        for action in &actions {
            if let Action::Submit { id, op: SyncOp::Stroke(req) } = action {
                let style = StrokeStyle { color: req.color, size: req.size };
                self.pending.push(PendingStroke { id: *id, segments: segments(&req.points, style), synced_at: None });
            }
        }
        actions
    }

    /// Abort the stroke being dragged. Released strokes still awaiting
    /// their reload are redrawn on the cleared overlay.
    pub fn on_pointer_cancel(&mut self, pointer_id: PointerId) -> Vec<Action> {
        let mut actions = self.capture.pointer_cancel(pointer_id);
        if !actions.is_empty() {
            actions.extend(self.pending_segments());
        }
        actions
    }

    // --- Zoom ---

    /// Wheel over the image stack. The host must suppress native scrolling.
    pub fn on_wheel(&mut self, delta_y: f64, cursor: Point, container: ClientRect) -> Vec<Action> {
        vec![Action::ApplyZoom(self.viewport.on_wheel(delta_y, cursor, container))]
    }

    pub fn zoom_in(&mut self) -> Vec<Action> {
        vec![Action::ApplyZoom(self.viewport.zoom_in())]
    }

    pub fn zoom_out(&mut self) -> Vec<Action> {
        vec![Action::ApplyZoom(self.viewport.zoom_out())]
    }

    pub fn set_zoom(&mut self, zoom: f64, pivot: Option<Point>) -> Vec<Action> {
        vec![Action::ApplyZoom(self.viewport.set_zoom(zoom, pivot))]
    }

    pub fn set_zoom_percent(&mut self, percent: i32) -> Vec<Action> {
        vec![Action::ApplyZoom(self.viewport.set_percent(percent))]
    }

    pub fn reset_zoom(&mut self) -> Vec<Action> {
        vec![Action::ApplyZoom(self.viewport.reset())]
    }

    #[must_use]
    pub fn zoom(&self) -> f64 {
        self.viewport.zoom()
    }

    // --- Tools ---

    pub fn select_tool(&mut self, tool: Tool) -> Vec<Action> {
        vec![Action::ToolSelected(self.tools.select_tool(tool))]
    }

    /// Color picker input for the active tool. Ignored while the eraser is active.
    pub fn set_color(&mut self, color: Color) -> Vec<Action> {
        let tool = self.tools.active();
        if self.tools.set_active_color(color) {
            vec![Action::ToolColorChanged { tool, color }]
        } else {
            Vec::new()
        }
    }

    pub fn set_size(&mut self, size: i64) -> Vec<Action> {
        vec![Action::SizeChanged(self.tools.set_size(size))]
    }

    pub fn set_size_from_input(&mut self, raw: &str) -> Vec<Action> {
        vec![Action::SizeChanged(self.tools.set_size_from_input(raw))]
    }

    // --- Sync and invalidation ---

    /// Submission `id` finished, successfully or not. Either way the
    /// active layer is reloaded so the overlay preview gets replaced by the
    /// server's pixels. The failure itself was already reported by the sync
    /// client.
    pub fn on_sync_complete(
        &mut self,
        id: SubmitId,
        kind: SyncKind,
        result: &Result<(), SyncError>,
        now_ms: u64,
    ) -> Vec<Action> {
        if result.is_ok() {
            log::debug!("{} {id} complete, invalidating active layer", kind.name());
        }
        let generation = self.generation;
        if let Some(stroke) = self.pending.iter_mut().find(|p| p.id == id) {
            stroke.synced_at = Some(generation);
        }
        let actions = self.invalidate_active_layer(now_ms);
        if actions.is_empty() {
            // No reload will ever cover these, so stop redrawing them.
            self.pending.retain(|p| p.synced_at.is_none());
        }
        actions
    }

    /// Reload the active layer's image under a fresh cache-busting URL.
    /// No-op when no layer is active.
    pub fn invalidate_active_layer(&mut self, now_ms: u64) -> Vec<Action> {
        let Some(index) = self.layers.active_layer_index() else {
            log::debug!("no active layer to invalidate");
            return Vec::new();
        };
        let Some(base) = self.layers.layer_image_url(index) else {
            log::debug!("active layer {index} has no image");
            return Vec::new();
        };
        let url = self.cache.bust(&base, now_ms);
        self.generation += 1;
        self.issued.insert(index, (url.clone(), self.generation));
        vec![Action::ReloadLayer { index, url }]
    }

    /// The layer image finished loading `url`. Clears the overlay only if
    /// this is the most recent address issued for that layer. Strokes whose
    /// sync finished before that reload was issued are now part of the image
    /// and are dropped; released strokes still in flight and any stroke being
    /// dragged are redrawn.
    pub fn on_layer_loaded(&mut self, index: usize, url: &str) -> Vec<Action> {
        let generation = match self.issued.get(&index) {
            Some((issued, generation)) if issued == url => *generation,
            _ => {
                log::debug!("ignoring stale load for layer {index}");
                return Vec::new();
            }
        };
        self.issued.remove(&index);
        self.pending.retain(|p| p.synced_at.is_none_or(|at| at >= generation));
        let mut actions = vec![Action::ClearOverlay];
        actions.extend(self.pending_segments());
        actions.extend(self.capture.preview_segments());
        actions
    }

    /// Most recent image URL issued for `index` and not yet loaded.
    #[must_use]
    pub fn pending_reload(&self, index: usize) -> Option<&str> {
        self.issued.get(&index).map(|(url, _)| url.as_str())
    }

    /// Number of released strokes whose preview is still kept.
    #[must_use]
    pub fn pending_strokes(&self) -> usize {
        self.pending.len()
    }

    fn pending_segments(&self) -> impl Iterator<Item = Action> + '_ {
        self.pending.iter().flat_map(|p| p.segments.iter().cloned())
    }
}

/// A released stroke kept for redrawing until the server image includes it.
struct PendingStroke {
    id: SubmitId,
    segments: Vec<Action>,
    /// Reload generation current when its sync completed.
    synced_at: Option<u64>,
}

/// The full paint engine. Wraps `EngineCore` and owns the browser elements.
#[cfg(feature = "hydrate")]
pub struct Engine {
    overlay: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    stack: HtmlElement,
    declared_width: u32,
    declared_height: u32,
    client: Rc<SyncClient<GlooTransport>>,
    /// Outstanding image `load` listener per layer index.
    load_listeners: ReloadSlots<LoadListener>,
    pub core: EngineCore,
}

#[cfg(feature = "hydrate")]
impl Engine {
    /// Bind to the overlay canvas and the image-stack container.
    ///
    /// The canvas's `width`/`height` attributes are its declared size.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the 2D context is unavailable.
    pub fn new(
        overlay: HtmlCanvasElement,
        stack: HtmlElement,
        config: &EditorConfig,
    ) -> Result<(Self, futures::channel::mpsc::UnboundedReceiver<SyncFailure>), JsValue> {
        let ctx = render::context_2d(&overlay)?;
        let declared_width = render::declared_dimension(&overlay, "width", overlay.width());
        let declared_height = render::declared_dimension(&overlay, "height", overlay.height());
        let (client, failures) = SyncClient::new(GlooTransport, config).with_failure_channel();
        let mut engine = Self {
            overlay,
            ctx,
            stack,
            declared_width,
            declared_height,
            client: Rc::new(client),
            load_listeners: ReloadSlots::new(),
            core: EngineCore::new(config),
        };
        engine.resize()?;
        render::init_zoom_slider(SliderDomain::ZOOM)?;
        render::apply_zoom(&engine.stack, &engine.core.viewport.transform())?;
        Ok((engine, failures))
    }

    /// Reallocate the overlay backing store for the current device pixel ratio.
    ///
    /// # Errors
    ///
    /// Returns `Err` if resetting the context transform fails.
    pub fn resize(&mut self) -> Result<(), JsValue> {
        let dpr = web_sys::window().map_or(1.0, |w| w.device_pixel_ratio());
        let backing = self.core.set_canvas_size(self.declared_width, self.declared_height, dpr);
        render::setup_overlay(&self.overlay, &self.ctx, self.declared_width, self.declared_height, backing, self.core.dpr())
    }

    /// The overlay's current bounding client rect.
    #[must_use]
    pub fn overlay_rect(&self) -> ClientRect {
        render::client_rect(&self.overlay)
    }

    /// The image stack's current bounding client rect.
    #[must_use]
    pub fn stack_rect(&self) -> ClientRect {
        render::client_rect(&self.stack)
    }

    /// Execute one action that needs no async follow-up.
    fn apply(&self, action: &Action) -> Result<(), JsValue> {
        match action {
            Action::CapturePointer(id) => self.overlay.set_pointer_capture(*id),
            Action::DrawSegment { from, to, style } => {
                render::draw_segment(&self.ctx, *from, *to, *style);
                Ok(())
            }
            Action::ClearOverlay => {
                render::clear(&self.ctx, &self.overlay);
                Ok(())
            }
            Action::ApplyZoom(transform) => render::apply_zoom(&self.stack, transform),
            Action::ToolSelected(selection) => render::show_tool_selection(*selection),
            Action::ToolColorChanged { tool, color } => render::tint_tool(*tool, *color),
            Action::SizeChanged(size) => {
                render::show_size(*size);
                Ok(())
            }
            Action::Submit { .. } | Action::ReloadLayer { .. } => Ok(()),
        }
    }
}

/// Run `actions` against the engine, spawning network calls and image reloads.
#[cfg(feature = "hydrate")]
pub fn dispatch(engine: &Rc<RefCell<Engine>>, actions: Vec<Action>) {
    for action in actions {
        match action {
            Action::Submit { id, op } => spawn_submit(engine, id, op),
            Action::ReloadLayer { index, url } => reload_layer(engine, index, url),
            other => {
                if let Err(e) = engine.borrow().apply(&other) {
                    log::warn!("action {other:?} failed: {e:?}");
                }
            }
        }
    }
}

#[cfg(feature = "hydrate")]
fn spawn_submit(engine: &Rc<RefCell<Engine>>, id: SubmitId, op: SyncOp) {
    let client = Rc::clone(&engine.borrow().client);
    let engine = Rc::clone(engine);
    wasm_bindgen_futures::spawn_local(async move {
        let result = client.submit(&op).await;
        let next = engine.borrow_mut().core.on_sync_complete(id, op.kind(), &result, now_ms());
        dispatch(&engine, next);
    });
}

/// Point layer `index` at `url` and call back into the engine once it loads.
///
/// The listener fires at most once. A previous listener for the same layer
/// that has not fired yet is detached and dropped.
#[cfg(feature = "hydrate")]
fn reload_layer(engine: &Rc<RefCell<Engine>>, index: usize, url: String) {
    let Some(img) = layer_image(index) else {
        log::debug!("layer {index} has no image element");
        return;
    };
    let weak = Rc::downgrade(engine);
    let loaded_url = url.clone();
    let on_load = Closure::<dyn FnMut()>::new(move || {
        let Some(engine) = weak.upgrade() else {
            return;
        };
        let next = engine.borrow_mut().core.on_layer_loaded(index, &loaded_url);
        dispatch(&engine, next);
    });

    let options = AddEventListenerOptions::new();
    options.set_once(true);
    if let Err(e) =
        img.add_event_listener_with_callback_and_add_event_listener_options("load", on_load.as_ref().unchecked_ref(), &options)
    {
        log::warn!("layer {index}: cannot listen for load: {e:?}");
        return;
    }

    let previous = engine.borrow_mut().load_listeners.replace(index, LoadListener { img: img.clone(), on_load });
    if let Some(previous) = previous {
        previous.detach();
    }
    img.set_src(&url);
}

/// A one-shot `load` listener on a layer image.
#[cfg(feature = "hydrate")]
struct LoadListener {
    img: HtmlImageElement,
    on_load: Closure<dyn FnMut()>,
}

#[cfg(feature = "hydrate")]
impl LoadListener {
    /// Remove the listener if it has not fired. Dropping `self` frees the closure.
    fn detach(self) {
        let callback: &js_sys::Function = self.on_load.as_ref().unchecked_ref();
        if let Err(e) = self.img.remove_event_listener_with_callback("load", callback) {
            log::debug!("removing stale load listener failed: {e:?}");
        }
    }
}

#[cfg(feature = "hydrate")]
fn layer_image(index: usize) -> Option<HtmlImageElement> {
    web_sys::window()?
        .document()?
        .get_element_by_id(&format!("{}{index}", crate::consts::LAYER_IMAGE_ID_PREFIX))?
        .dyn_ref::<HtmlImageElement>()
        .cloned()
}

#[cfg(feature = "hydrate")]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(crate) fn now_ms() -> u64 {
    js_sys::Date::now().max(0.0) as u64
}
