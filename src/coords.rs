#[cfg(test)]
#[path = "coords_test.rs"]
mod coords_test;

use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

/// A pair of values in tile, world, or screen space.
///
/// Which space a `Coords` lives in is decided by the function that produced
/// it; arithmetic and clamping are always component-wise.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coords {
    pub x: f64,
    pub y: f64,
}

impl Coords {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Clamp each component into `[min, max]` of the matching component.
    #[must_use]
    pub fn clamp(self, min: Self, max: Self) -> Self {
        Self {
            x: self.x.clamp(min.x, max.x),
            y: self.y.clamp(min.y, max.y),
        }
    }

    #[must_use]
    pub fn floor(self) -> Self {
        Self { x: self.x.floor(), y: self.y.floor() }
    }

    /// Both components are finite whole numbers, i.e. a valid tile index.
    #[must_use]
    pub fn is_integral(self) -> bool {
        [self.x, self.y].iter().all(|v| v.is_finite() && v.fract() == 0.0)
    }

    /// Integer key for hashing a tile position. Fractional parts are floored.
    #[allow(clippy::cast_possible_truncation)]
    #[must_use]
    pub fn tile_key(self) -> (i64, i64) {
        (self.x.floor() as i64, self.y.floor() as i64)
    }
}

impl fmt::Display for Coords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl Add for Coords {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self { x: self.x + rhs.x, y: self.y + rhs.y }
    }
}

impl Sub for Coords {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self { x: self.x - rhs.x, y: self.y - rhs.y }
    }
}

impl Mul<f64> for Coords {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self { x: self.x * rhs, y: self.y * rhs }
    }
}

impl Neg for Coords {
    type Output = Self;

    fn neg(self) -> Self {
        Self { x: -self.x, y: -self.y }
    }
}

/// Edge midpoints and center of a tile's diamond footprint in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileBounds {
    pub left: Coords,
    pub right: Coords,
    pub top: Coords,
    pub bottom: Coords,
    pub center: Coords,
}
