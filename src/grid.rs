//! Fixed-size tile grid centered on the world origin.

#[cfg(test)]
#[path = "grid_test.rs"]
mod grid_test;

use crate::coords::Coords;

/// Logical grid dimensions in tiles.
///
/// A grid of width `w` spans tile x-indices `-floor(w/2) ..= floor(w/2)`, and
/// likewise for height. Dimensions are fixed for the lifetime of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    width: u32,
    height: u32,
}

impl Grid {
    /// Create a grid. Zero dimensions are raised to one tile.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width: width.max(1), height: height.max(1) }
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Largest valid tile index on each axis.
    #[must_use]
    pub fn half_extent(&self) -> Coords {
        Coords::new(f64::from(self.width / 2), f64::from(self.height / 2))
    }

    /// Clamp a tile position into the grid. Always produces a valid tile.
    #[must_use]
    pub fn clamp_tile(&self, tile: Coords) -> Coords {
        let half = self.half_extent();
        tile.clamp(-half, half)
    }

    #[must_use]
    pub fn contains(&self, tile: Coords) -> bool {
        let half = self.half_extent();
        tile.x.abs() <= half.x && tile.y.abs() <= half.y
    }

    /// Every tile in the grid, row by row from the top-left corner.
    pub fn tiles(&self) -> impl Iterator<Item = Coords> {
        let half = self.half_extent().tile_key();
        (-half.1..=half.1).flat_map(move |y| {
            #[allow(clippy::cast_precision_loss)]
            (-half.0..=half.0).map(move |x| Coords::new(x as f64, y as f64))
        })
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new(crate::consts::DEFAULT_GRID_SIZE, crate::consts::DEFAULT_GRID_SIZE)
    }
}
