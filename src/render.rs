//! Render loop: redraws the stage once per display frame.
//!
//! Each cycle schedules the next one before drawing, so a slow or failing
//! flush never stalls the loop. There is no dirty tracking; every frame
//! redraws. The loop only reads scene data, advancing visual animations
//! (the zoom tween) is the one thing it changes on the stage.
//!
//! Host specifics live behind two traits: [`FrameScheduler`] wraps the
//! frame-scheduling primitive (`requestAnimationFrame` in the browser) and
//! [`Surface`] turns the stage into pixels.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::stage::Stage;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("surface error: {0}")]
    Surface(String),
}

/// Opaque id of a scheduled frame, used to cancel it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub i32);

/// Callback run by the scheduler with the frame timestamp in milliseconds.
pub type FrameCallback = Box<dyn FnOnce(f64)>;

/// Host primitive that runs a callback before the next repaint.
///
/// Implementations must defer the callback; calling it from inside
/// `request_frame` would re-enter the loop.
pub trait FrameScheduler {
    /// Schedule `callback`. Returns `None` if the host cannot schedule frames,
    /// in which case the loop draws once and stops.
    fn request_frame(&mut self, callback: FrameCallback) -> Option<FrameHandle>;

    /// Cancel a scheduled frame. Unknown or already-run handles are ignored.
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Something that can draw the stage.
pub trait Surface {
    /// Draw the current stage state.
    ///
    /// # Errors
    ///
    /// Returns `Surface` if the host drawing API fails.
    fn flush(&mut self, stage: &Stage) -> Result<(), RenderError>;

    /// Release host resources (e.g. remove the canvas element).
    fn detach(&mut self) {}
}

struct LoopState {
    stage: Rc<RefCell<Stage>>,
    scheduler: Box<dyn FrameScheduler>,
    surface: Option<Box<dyn Surface>>,
    pending: Option<FrameHandle>,
    last_timestamp: Option<f64>,
    frames: u64,
}

/// Continuously rescheduled redraw of a [`Stage`].
pub struct RenderLoop {
    state: Rc<RefCell<LoopState>>,
}

impl RenderLoop {
    #[must_use]
    pub fn new(stage: Rc<RefCell<Stage>>, scheduler: Box<dyn FrameScheduler>, surface: Box<dyn Surface>) -> Self {
        let state = LoopState {
            stage,
            scheduler,
            surface: Some(surface),
            pending: None,
            last_timestamp: None,
            frames: 0,
        };
        Self { state: Rc::new(RefCell::new(state)) }
    }

    /// Draw the first frame now and keep drawing every frame after.
    /// Has no effect once the loop is running or destroyed.
    pub fn start(&self) {
        let already_running = {
            let state = self.state.borrow();
            state.pending.is_some() || state.surface.is_none()
        };
        if already_running {
            return;
        }
        tracing::debug!("render loop started");
        run_frame(&self.state, None);
    }

    /// Whether a next frame is scheduled.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state.borrow().pending.is_some()
    }

    /// Number of frames flushed so far.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.state.borrow().frames
    }

    /// Cancel the pending frame and detach the surface. Safe to call more
    /// than once; nothing is drawn afterwards.
    pub fn destroy(&self) {
        let mut guard = self.state.borrow_mut();
        let LoopState { scheduler, surface, pending, frames, .. } = &mut *guard;

        if let Some(handle) = pending.take() {
            scheduler.cancel_frame(handle);
        }
        if let Some(mut detached) = surface.take() {
            detached.detach();
            tracing::debug!(frames = *frames, "render loop destroyed");
        }
    }
}

impl Drop for RenderLoop {
    fn drop(&mut self) {
        self.destroy();
    }
}

fn run_frame(state: &Rc<RefCell<LoopState>>, timestamp: Option<f64>) {
    let mut guard = state.borrow_mut();
    let LoopState { stage, scheduler, surface, pending, last_timestamp, frames } = &mut *guard;

    let Some(surface) = surface.as_mut() else {
        *pending = None;
        return;
    };

    let weak: Weak<RefCell<LoopState>> = Rc::downgrade(state);
    *pending = scheduler.request_frame(Box::new(move |ts| {
        if let Some(state) = weak.upgrade() {
            run_frame(&state, Some(ts));
        }
    }));

    let dt_ms = match (timestamp, *last_timestamp) {
        (Some(now), Some(previous)) => (now - previous).max(0.0),
        _ => 0.0,
    };
    if timestamp.is_some() {
        *last_timestamp = timestamp;
    }

    stage.borrow_mut().advance(dt_ms);
    if let Err(err) = surface.flush(&stage.borrow()) {
        tracing::warn!(error = %err, "frame flush failed");
    }
    *frames += 1;
}
