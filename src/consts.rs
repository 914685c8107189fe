//! Shared numeric constants for the isometric scene.

// ── Tile geometry ───────────────────────────────────────────────

/// Width of a tile's diamond footprint once projected, in world units.
pub const PROJECTED_TILE_WIDTH: f64 = 128.0;

/// Height of a tile's diamond footprint once projected, in world units.
pub const PROJECTED_TILE_HEIGHT: f64 = 64.0;

/// Default grid dimensions in tiles (both axes).
pub const DEFAULT_GRID_SIZE: u32 = 51;

// ── Viewport ────────────────────────────────────────────────────

/// Duration of the visual zoom tween, in milliseconds.
pub const ZOOM_TWEEN_MS: f64 = 300.0;

/// Smallest zoom factor accepted by default.
pub const MIN_ZOOM: f64 = 0.1;

/// Largest zoom factor accepted by default.
pub const MAX_ZOOM: f64 = 10.0;

// ── Labels ──────────────────────────────────────────────────────

/// Smallest pixel height a node may reserve for its label.
pub const LABEL_HEIGHT_MIN: f64 = 60.0;

/// Largest pixel height a node may reserve for its label.
pub const LABEL_HEIGHT_MAX: f64 = 280.0;

/// Label height given to nodes created without one.
pub const LABEL_HEIGHT_DEFAULT: f64 = 100.0;
