//! Zoom and scroll state for the scene canvas.
//!
//! The logical zoom and scroll values drive all coordinate math and change
//! synchronously. Zoom changes additionally start a short visual tween
//! ([`ZoomTween`]); the renderer draws with [`Viewport::visual_zoom`] while it
//! runs, so visual and logical zoom differ for the tween's duration.

#[cfg(test)]
#[path = "viewport_test.rs"]
mod viewport_test;

use crate::config::EditorConfig;
use crate::consts::{MAX_ZOOM, MIN_ZOOM};
use crate::coords::Coords;
use crate::events::SceneEvent;
use crate::grid::Grid;
use crate::transform::{self, ScreenProjection};

/// An in-flight visual zoom animation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomTween {
    from: f64,
    to: f64,
    elapsed_ms: f64,
    duration_ms: f64,
}

impl ZoomTween {
    #[must_use]
    pub fn new(from: f64, to: f64, duration_ms: f64) -> Self {
        Self { from, to, elapsed_ms: 0.0, duration_ms }
    }

    /// Step the tween forward. Returns `true` once it has finished.
    pub fn advance(&mut self, dt_ms: f64) -> bool {
        self.elapsed_ms = (self.elapsed_ms + dt_ms.max(0.0)).min(self.duration_ms);
        self.is_finished()
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.elapsed_ms >= self.duration_ms
    }

    /// Current value, eased out quadratically.
    #[must_use]
    pub fn value(&self) -> f64 {
        if self.duration_ms <= 0.0 {
            return self.to;
        }
        let t = (self.elapsed_ms / self.duration_ms).clamp(0.0, 1.0);
        let eased = 1.0 - (1.0 - t) * (1.0 - t);
        self.from + (self.to - self.from) * eased
    }

    #[must_use]
    pub fn target(&self) -> f64 {
        self.to
    }
}

#[derive(Debug, Clone)]
pub struct Viewport {
    zoom: f64,
    scroll: Coords,
    size: Coords,
    dom_offset: Coords,
    group_offset: Coords,
    /// Where the world origin sits on the canvas, in CSS pixels.
    group_position: Coords,
    tween: Option<ZoomTween>,
    tween_ms: f64,
    min_zoom: f64,
    max_zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(&EditorConfig::default())
    }
}

impl Viewport {
    #[must_use]
    pub fn new(config: &EditorConfig) -> Self {
        let (min_zoom, max_zoom) = (config.min_zoom, config.max_zoom);
        let (min_zoom, max_zoom) = if min_zoom > 0.0 && min_zoom <= max_zoom && max_zoom.is_finite() {
            (min_zoom, max_zoom)
        } else {
            tracing::warn!(min_zoom, max_zoom, "invalid zoom bounds, using defaults");
            (MIN_ZOOM, MAX_ZOOM)
        };
        Self {
            zoom: 1.0,
            scroll: Coords::ZERO,
            size: Coords::ZERO,
            dom_offset: Coords::ZERO,
            group_offset: Coords::ZERO,
            group_position: Coords::ZERO,
            tween: None,
            tween_ms: config.zoom_tween_ms,
            min_zoom,
            max_zoom,
        }
    }

    // --- Queries ---

    #[must_use]
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Zoom the renderer should draw with; lags [`Self::zoom`] during a tween.
    #[must_use]
    pub fn visual_zoom(&self) -> f64 {
        self.tween.map_or(self.zoom, |tween| tween.value())
    }

    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.tween.is_some()
    }

    #[must_use]
    pub fn scroll(&self) -> Coords {
        self.scroll
    }

    #[must_use]
    pub fn size(&self) -> Coords {
        self.size
    }

    #[must_use]
    pub fn group_position(&self) -> Coords {
        self.group_position
    }

    #[must_use]
    pub fn group_offset(&self) -> Coords {
        self.group_offset
    }

    #[must_use]
    pub fn projection(&self) -> ScreenProjection {
        ScreenProjection {
            scroll: self.scroll,
            group_offset: self.group_offset,
            viewport_size: self.size,
            zoom: self.zoom,
            dom_offset: self.dom_offset,
        }
    }

    /// Tile under a canvas-space mouse position, clamped into `grid`.
    #[must_use]
    pub fn mouse_to_tile(&self, mouse: Coords, grid: &Grid) -> Coords {
        transform::world_to_tile(mouse, self.zoom, self.group_position, grid)
    }

    /// Page position of a tile's center.
    #[must_use]
    pub fn tile_to_screen(&self, tile: Coords) -> Coords {
        transform::tile_to_screen(tile, &self.projection())
    }

    // --- Mutations ---

    /// Set the logical zoom and start a visual tween toward it.
    ///
    /// Non-finite or non-positive levels are ignored and return `None`.
    /// Accepted levels are clamped into the configured zoom range.
    pub fn set_zoom(&mut self, level: f64) -> Option<SceneEvent> {
        if !level.is_finite() || level <= 0.0 {
            tracing::warn!(level, "ignoring invalid zoom level");
            return None;
        }
        let level = level.clamp(self.min_zoom, self.max_zoom);
        let from = self.visual_zoom();
        self.zoom = level;
        self.tween = Some(ZoomTween::new(from, level, self.tween_ms));

        Some(SceneEvent::ZoomChanged { level })
    }

    /// Scroll to an absolute position. Applied immediately.
    pub fn scroll_to(&mut self, x: f64, y: f64) {
        self.scroll = Coords::new(x, y);
        self.group_position = self.scroll + self.size * 0.5;
    }

    /// Scroll by a pixel delta, divided by zoom so a drag moves the scene by
    /// the same on-screen distance at any zoom level.
    pub fn scroll_to_delta(&mut self, dx: f64, dy: f64) {
        let delta = Coords::new(dx, dy) * (1.0 / self.zoom);
        let target = self.scroll + delta;
        self.scroll_to(target.x, target.y);
    }

    /// Update the canvas size and re-center on the current scroll.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.size = Coords::new(width.max(0.0), height.max(0.0));
        self.scroll_to(self.scroll.x, self.scroll.y);
    }

    pub fn set_dom_offset(&mut self, offset: Coords) {
        self.dom_offset = offset;
    }

    pub fn set_group_offset(&mut self, offset: Coords) {
        self.group_offset = offset;
    }

    /// Step the zoom tween. Finished tweens are dropped.
    pub fn advance(&mut self, dt_ms: f64) {
        if let Some(tween) = self.tween.as_mut()
            && tween.advance(dt_ms)
        {
            self.tween = None;
        }
    }
}
