//! Renderer: the host-facing facade over the stage, render loop and event bus.
//!
//! `Renderer` owns a shared [`Stage`], keeps a [`RenderLoop`] drawing it, and
//! publishes the [`SceneEvent`]s stage operations produce. Events are emitted
//! only after the stage borrow is released.

#[cfg(test)]
#[path = "renderer_test.rs"]
mod renderer_test;

use std::cell::{Ref, RefCell};
use std::rc::Rc;
use std::sync::Arc;

use crate::config::EditorConfig;
use crate::coords::Coords;
use crate::events::{EventBus, SceneEvent, SubscriptionId};
use crate::render::{FrameScheduler, RenderLoop, Surface};
use crate::scene::{Icon, Node, Scene};
use crate::stage::{Stage, StageError};

pub struct Renderer {
    stage: Rc<RefCell<Stage>>,
    render_loop: RenderLoop,
    events: EventBus,
}

impl Renderer {
    /// Build a stage from `config` and start drawing it onto `surface`.
    #[must_use]
    pub fn new(config: &EditorConfig, scheduler: Box<dyn FrameScheduler>, surface: Box<dyn Surface>) -> Self {
        let stage = Rc::new(RefCell::new(Stage::new(config)));
        let render_loop = RenderLoop::new(Rc::clone(&stage), scheduler, surface);
        render_loop.start();
        Self { stage, render_loop, events: EventBus::new() }
    }

    // --- Events ---

    pub fn subscribe(&mut self, handler: impl FnMut(&SceneEvent) + 'static) -> SubscriptionId {
        self.events.subscribe(handler)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    fn publish(&mut self, events: Vec<SceneEvent>) {
        self.events.emit_all(events);
    }

    // --- Scene data ---

    /// Show `scene` on the stage.
    ///
    /// # Errors
    ///
    /// Returns `OutOfGrid` for a node off the grid and `Element` if two nodes
    /// share a tile; the stage keeps its previous contents.
    pub fn load_scene(&mut self, scene: &Scene) -> Result<(), StageError> {
        self.stage.borrow_mut().load_scene(scene)
    }

    /// Listener for `SceneStore::subscribe` that mirrors every committed
    /// scene onto this renderer's stage.
    pub fn scene_listener(&self) -> impl FnMut(&Arc<Scene>) + use<> {
        let stage = Rc::clone(&self.stage);
        move |scene: &Arc<Scene>| {
            if let Err(err) = stage.borrow_mut().load_scene(scene) {
                tracing::warn!(error = %err, "committed scene could not be staged");
            }
        }
    }

    #[must_use]
    pub fn export_scene(&self) -> Scene {
        self.stage.borrow().export_scene()
    }

    /// # Errors
    ///
    /// Returns `IconNotFound` if the loaded scene has no icon `id`.
    pub fn icon(&self, id: &str) -> Result<Icon, StageError> {
        self.stage.borrow().icon(id).cloned()
    }

    #[must_use]
    pub fn items_by_tile(&self, tile: Coords) -> Vec<Node> {
        self.stage.borrow().items_by_tile(tile).into_iter().cloned().collect()
    }

    /// Remove all scene content from the stage.
    pub fn clear(&mut self) {
        self.stage.borrow_mut().clear();
    }

    // --- Geometry ---

    #[must_use]
    pub fn mouse_to_tile(&self, mouse: Coords) -> Coords {
        self.stage.borrow().mouse_to_tile(mouse)
    }

    #[must_use]
    pub fn tile_to_screen(&self, tile: Coords) -> Coords {
        self.stage.borrow().tile_to_screen(tile)
    }

    // --- Viewport ---

    pub fn set_zoom(&mut self, level: f64) {
        let events = self.stage.borrow_mut().set_zoom(level);
        self.publish(events);
    }

    pub fn scroll_to(&mut self, x: f64, y: f64) {
        self.stage.borrow_mut().scroll_to(x, y);
    }

    pub fn scroll_to_delta(&mut self, dx: f64, dy: f64) {
        self.stage.borrow_mut().scroll_to_delta(dx, dy);
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.stage.borrow_mut().resize(width, height);
    }

    pub fn set_dom_offset(&mut self, offset: Coords) {
        self.stage.borrow_mut().set_dom_offset(offset);
    }

    // --- Pointer ---

    pub fn hover(&mut self, mouse: Coords) {
        let events = self.stage.borrow_mut().hover(mouse);
        self.publish(events);
    }

    pub fn select_at(&mut self, mouse: Coords) {
        let events = self.stage.borrow_mut().select_at(mouse);
        self.publish(events);
    }

    pub fn unfocus_all(&mut self) {
        let events = self.stage.borrow_mut().unfocus_all();
        self.publish(events);
    }

    // --- Lifecycle ---

    /// Read access to the stage. Do not hold the borrow across other
    /// renderer calls.
    #[must_use]
    pub fn stage(&self) -> Ref<'_, Stage> {
        self.stage.borrow()
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.render_loop.is_running()
    }

    /// Stop drawing and detach the surface. Safe to call more than once.
    pub fn destroy(&mut self) {
        self.render_loop.destroy();
    }
}
