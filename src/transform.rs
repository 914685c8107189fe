//! Conversions between tile, world, and screen space.
//!
//! Tile space is the integer diamond grid. World space is the continuous
//! isometric projection of tile space, before any scroll or zoom. Screen space
//! is the final pixel position on the page. Every function here is pure; the
//! viewport supplies the scroll/zoom state as arguments.

#[cfg(test)]
#[path = "transform_test.rs"]
mod transform_test;

use crate::consts::{PROJECTED_TILE_HEIGHT, PROJECTED_TILE_WIDTH};
use crate::coords::{Coords, TileBounds};
use crate::grid::Grid;

const HALF_W: f64 = PROJECTED_TILE_WIDTH / 2.0;
const HALF_H: f64 = PROJECTED_TILE_HEIGHT / 2.0;

/// Viewport state needed to place a tile on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenProjection {
    /// Current scroll position.
    pub scroll: Coords,
    /// Local-to-global translation of the group that holds scene elements.
    pub group_offset: Coords,
    /// Viewport size in CSS pixels.
    pub viewport_size: Coords,
    /// Logical zoom factor.
    pub zoom: f64,
    /// Offset of the canvas element inside its container, in CSS pixels.
    pub dom_offset: Coords,
}

/// Project a tile onto world space.
#[must_use]
pub fn tile_to_world(tile: Coords) -> Coords {
    Coords::new(tile.x * HALF_W - tile.y * HALF_W, tile.x * HALF_H + tile.y * HALF_H)
}

/// Find the tile under a canvas-space mouse position.
///
/// `viewport_offset` is where the world origin currently sits on the canvas.
/// The result is clamped into `grid`, so positions beyond the edge resolve to
/// the nearest border tile.
#[must_use]
pub fn world_to_tile(mouse: Coords, zoom: f64, viewport_offset: Coords, grid: &Grid) -> Coords {
    let mouse_x = (mouse.x - viewport_offset.x) * (1.0 / zoom);
    let mouse_y = (mouse.y - viewport_offset.y) * (1.0 / zoom) + HALF_H;

    let row = ((mouse_x / HALF_W + mouse_y / HALF_H) / 2.0).floor();
    let col = ((mouse_y / HALF_H - mouse_x / HALF_W) / 2.0).floor();

    grid.clamp_tile(Coords::new(row, col))
}

/// Edge midpoints and center of a tile in world space.
#[must_use]
pub fn tile_bounds(tile: Coords) -> TileBounds {
    let center = tile_to_world(tile);

    TileBounds {
        left: Coords::new(center.x - HALF_W, center.y),
        right: Coords::new(center.x + HALF_W, center.y),
        top: Coords::new(center.x, center.y - HALF_H),
        bottom: Coords::new(center.x, center.y + HALF_H),
        center,
    }
}

/// Screen position of a tile's center.
///
/// Scroll, group offset and the half viewport are summed in world units and
/// scaled by zoom together; the DOM offset is added afterwards because it
/// moves the canvas element itself.
#[must_use]
pub fn tile_to_screen(tile: Coords, projection: &ScreenProjection) -> Coords {
    let center = tile_bounds(tile).center;
    let scene = center + projection.scroll + projection.group_offset + projection.viewport_size * 0.5;

    scene * projection.zoom + projection.dom_offset
}
