//! Browser host: `requestAnimationFrame` scheduling and 2D canvas drawing.
//!
//! Nothing here is unit-tested; everything it draws is read from a [`Stage`]
//! whose behavior is covered natively.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlElement, Window};

use crate::config::EditorConfig;
use crate::coords::{Coords, TileBounds};
use crate::elements::NodeElement;
use crate::grid::Grid;
use crate::render::{FrameCallback, FrameHandle, FrameScheduler, RenderError, Surface};
use crate::renderer::Renderer;
use crate::scene::Connector;
use crate::stage::Stage;
use crate::transform::tile_bounds;

const BACKGROUND: &str = "#f6f7f9";
const GRID_STROKE: &str = "#d8dde3";
const CURSOR_FILL: &str = "rgba(30, 144, 255, 0.18)";
const CONNECTOR_STROKE: &str = "#5a6270";
const NODE_FILL: &str = "#ffffff";
const NODE_STROKE: &str = "#5a6270";
const FOCUS_STROKE: &str = "#1E90FF";
const LABEL_FILL: &str = "#1f2328";
const LABEL_FONT_PX: f64 = 14.0;
const LABEL_MAX_WIDTH_PX: f64 = 160.0;
const CONNECTOR_WIDTH_PX: f64 = 3.0;

// =============================================================
// Frame scheduling
// =============================================================

type RafClosure = Closure<dyn FnMut(f64)>;

/// [`FrameScheduler`] backed by `window.requestAnimationFrame`.
///
/// Closures are kept alive until they have run or been cancelled. A closure
/// is only dropped on a later `request_frame`, never while it is executing.
pub struct RafScheduler {
    window: Window,
    closures: HashMap<i32, RafClosure>,
    ran: Rc<RefCell<Vec<i32>>>,
}

impl RafScheduler {
    #[must_use]
    pub fn new(window: Window) -> Self {
        Self { window, closures: HashMap::new(), ran: Rc::new(RefCell::new(Vec::new())) }
    }

    fn release_finished(&mut self) {
        for id in self.ran.borrow_mut().drain(..) {
            self.closures.remove(&id);
        }
    }
}

impl FrameScheduler for RafScheduler {
    fn request_frame(&mut self, callback: FrameCallback) -> Option<FrameHandle> {
        self.release_finished();

        let own_id: Rc<Cell<Option<i32>>> = Rc::new(Cell::new(None));
        let id_for_cb = Rc::clone(&own_id);
        let ran = Rc::clone(&self.ran);
        let closure: RafClosure = Closure::once(move |ts: f64| {
            callback(ts);
            if let Some(id) = id_for_cb.get() {
                ran.borrow_mut().push(id);
            }
        });

        match self.window.request_animation_frame(closure.as_ref().unchecked_ref()) {
            Ok(id) => {
                own_id.set(Some(id));
                self.closures.insert(id, closure);
                Some(FrameHandle(id))
            }
            Err(err) => {
                tracing::warn!(error = ?err, "requestAnimationFrame failed");
                None
            }
        }
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if let Err(err) = self.window.cancel_animation_frame(handle.0) {
            tracing::warn!(error = ?err, "cancelAnimationFrame failed");
        }
        self.closures.remove(&handle.0);
    }
}

// =============================================================
// Canvas surface
// =============================================================

/// [`Surface`] drawing onto an HTML canvas element.
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    dpr: f64,
}

impl CanvasSurface {
    #[must_use]
    pub fn new(canvas: HtmlCanvasElement, ctx: CanvasRenderingContext2d, dpr: f64) -> Self {
        Self { canvas, ctx, dpr: if dpr > 0.0 { dpr } else { 1.0 } }
    }

    /// Keep the backing store at CSS size times device pixel ratio.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn sync_backing_size(&self, size: Coords) {
        let width = (size.x * self.dpr).round().max(0.0) as u32;
        let height = (size.y * self.dpr).round().max(0.0) as u32;
        if self.canvas.width() != width {
            self.canvas.set_width(width);
        }
        if self.canvas.height() != height {
            self.canvas.set_height(height);
        }
    }

    fn draw(&self, stage: &Stage) -> Result<(), JsValue> {
        let ctx = &self.ctx;
        let viewport = stage.viewport();
        let size = viewport.size();
        self.sync_backing_size(size);

        ctx.set_transform(self.dpr, 0.0, 0.0, self.dpr, 0.0, 0.0)?;
        ctx.set_fill_style_str(BACKGROUND);
        ctx.fill_rect(0.0, 0.0, size.x, size.y);

        // World origin sits at the group position; picking uses the same transform.
        let origin = viewport.group_position() + viewport.group_offset();
        let zoom = viewport.visual_zoom();
        ctx.save();
        ctx.translate(origin.x, origin.y)?;
        ctx.scale(zoom, zoom)?;

        draw_grid(ctx, stage.grid(), zoom);
        if let Some(tile) = stage.cursor() {
            diamond_path(ctx, &tile_bounds(tile));
            ctx.set_fill_style_str(CURSOR_FILL);
            ctx.fill();
        }
        for connector in stage.connectors() {
            draw_connector(ctx, connector, zoom);
        }

        // Back to front, so nearer tiles overlap farther ones.
        let mut elements: Vec<&NodeElement> = stage.elements().iter().collect();
        elements.sort_by(|a, b| depth(a).total_cmp(&depth(b)));
        for element in elements {
            draw_node(ctx, element, zoom)?;
        }

        ctx.restore();
        Ok(())
    }
}

impl Surface for CanvasSurface {
    fn flush(&mut self, stage: &Stage) -> Result<(), RenderError> {
        self.draw(stage).map_err(|err| RenderError::Surface(format!("{err:?}")))
    }

    fn detach(&mut self) {
        self.canvas.remove();
    }
}

fn depth(element: &NodeElement) -> f64 {
    element.node.position.x + element.node.position.y
}

fn diamond_path(ctx: &CanvasRenderingContext2d, bounds: &TileBounds) {
    ctx.begin_path();
    ctx.move_to(bounds.top.x, bounds.top.y);
    ctx.line_to(bounds.right.x, bounds.right.y);
    ctx.line_to(bounds.bottom.x, bounds.bottom.y);
    ctx.line_to(bounds.left.x, bounds.left.y);
    ctx.close_path();
}

fn draw_grid(ctx: &CanvasRenderingContext2d, grid: &Grid, zoom: f64) {
    ctx.begin_path();
    for tile in grid.tiles() {
        let b = tile_bounds(tile);
        ctx.move_to(b.top.x, b.top.y);
        ctx.line_to(b.right.x, b.right.y);
        ctx.line_to(b.bottom.x, b.bottom.y);
        ctx.line_to(b.left.x, b.left.y);
        ctx.close_path();
    }
    ctx.set_stroke_style_str(GRID_STROKE);
    ctx.set_line_width(1.0 / zoom);
    ctx.stroke();
}

fn draw_connector(ctx: &CanvasRenderingContext2d, connector: &Connector, zoom: f64) {
    let mut points = connector.path.iter();
    let Some(first) = points.next() else {
        return;
    };
    ctx.begin_path();
    ctx.move_to(first.x, first.y);
    for point in points {
        ctx.line_to(point.x, point.y);
    }
    ctx.set_stroke_style_str(CONNECTOR_STROKE);
    ctx.set_line_width(CONNECTOR_WIDTH_PX / zoom);
    ctx.stroke();
}

fn draw_node(ctx: &CanvasRenderingContext2d, element: &NodeElement, zoom: f64) -> Result<(), JsValue> {
    let node = &element.node;
    let bounds = tile_bounds(node.position);

    diamond_path(ctx, &bounds);
    ctx.set_fill_style_str(NODE_FILL);
    ctx.fill();
    if element.focused {
        ctx.set_stroke_style_str(FOCUS_STROKE);
        ctx.set_line_width(2.0 / zoom);
    } else {
        ctx.set_stroke_style_str(NODE_STROKE);
        ctx.set_line_width(1.0 / zoom);
    }
    ctx.stroke();

    let label = node.label.trim();
    if label.is_empty() {
        return Ok(());
    }

    // Stem from the tile center up to the label.
    let label_y = bounds.center.y - node.label_height;
    ctx.begin_path();
    ctx.move_to(bounds.center.x, bounds.center.y);
    ctx.line_to(bounds.center.x, label_y);
    ctx.set_stroke_style_str(NODE_STROKE);
    ctx.set_line_width(1.0 / zoom);
    ctx.stroke();

    ctx.set_fill_style_str(LABEL_FILL);
    ctx.set_text_align("center");
    ctx.set_text_baseline("bottom");
    ctx.set_font(&format!("{LABEL_FONT_PX}px sans-serif"));
    let text = fit_label(ctx, label, LABEL_MAX_WIDTH_PX);
    ctx.fill_text(&text, bounds.center.x, label_y)?;
    Ok(())
}

fn fit_label(ctx: &CanvasRenderingContext2d, text: &str, max_w: f64) -> String {
    if text_width(ctx, text) <= max_w {
        return text.to_owned();
    }
    let mut chars: Vec<char> = text.chars().collect();
    while chars.pop().is_some() {
        let candidate = format!("{}...", chars.iter().collect::<String>().trim_end());
        if text_width(ctx, &candidate) <= max_w {
            return candidate;
        }
    }
    "...".to_owned()
}

fn text_width(ctx: &CanvasRenderingContext2d, text: &str) -> f64 {
    ctx.measure_text(text).map_or(f64::INFINITY, |metrics| metrics.width())
}

// =============================================================
// Mounting
// =============================================================

/// Create a full-size canvas inside `container` and start rendering onto it.
///
/// # Errors
///
/// Returns the DOM error if there is no window or document, the canvas
/// cannot be created, or it has no 2D context.
pub fn mount(container: &HtmlElement, config: &EditorConfig) -> Result<Renderer, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window.document().ok_or_else(|| JsValue::from_str("no document"))?;

    let canvas: HtmlCanvasElement = document.create_element("canvas")?.dyn_into()?;
    let style = canvas.style();
    style.set_property("position", "absolute")?;
    style.set_property("left", "0")?;
    style.set_property("top", "0")?;
    style.set_property("width", "100%")?;
    style.set_property("height", "100%")?;
    container.append_child(&canvas)?;

    let ctx: CanvasRenderingContext2d = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("canvas has no 2d context"))?
        .dyn_into()?;
    let dpr = window.device_pixel_ratio();

    let width = f64::from(container.client_width());
    let height = f64::from(container.client_height());
    let dom_offset = Coords::new(f64::from(canvas.offset_left()), f64::from(canvas.offset_top()));

    let surface = CanvasSurface::new(canvas, ctx, dpr);
    let mut renderer = Renderer::new(config, Box::new(RafScheduler::new(window)), Box::new(surface));
    renderer.resize(width, height);
    renderer.set_dom_offset(dom_offset);
    tracing::info!(width, height, dpr, "scene renderer mounted");
    Ok(renderer)
}
