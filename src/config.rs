//! Editor configuration supplied by the host.
//!
//! Every field has a default, so hosts only pass what they override:
//!
//! ```json
//! { "gridWidth": 31, "gridHeight": 31, "zoomTweenMs": 150 }
//! ```

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_GRID_SIZE, MAX_ZOOM, MIN_ZOOM, ZOOM_TWEEN_MS};
use crate::grid::Grid;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("grid dimensions must be at least 1x1, got {width}x{height}")]
    EmptyGrid { width: u32, height: u32 },
    #[error("zoom bounds must satisfy 0 < min <= max, got {min}..{max}")]
    ZoomBounds { min: f64, max: f64 },
    #[error("zoom tween duration must be a non-negative number, got {0}")]
    TweenDuration(f64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    pub grid_width: u32,
    pub grid_height: u32,
    pub zoom_tween_ms: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            grid_width: DEFAULT_GRID_SIZE,
            grid_height: DEFAULT_GRID_SIZE,
            zoom_tween_ms: ZOOM_TWEEN_MS,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
        }
    }
}

impl EditorConfig {
    /// Parse and validate a JSON config object.
    ///
    /// # Errors
    ///
    /// Returns `Json` for malformed input and a specific variant for values
    /// outside their allowed range.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns the first range violation found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_width == 0 || self.grid_height == 0 {
            return Err(ConfigError::EmptyGrid { width: self.grid_width, height: self.grid_height });
        }
        let zoom_ok = self.min_zoom.is_finite()
            && self.max_zoom.is_finite()
            && self.min_zoom > 0.0
            && self.min_zoom <= self.max_zoom;
        if !zoom_ok {
            return Err(ConfigError::ZoomBounds { min: self.min_zoom, max: self.max_zoom });
        }
        if !self.zoom_tween_ms.is_finite() || self.zoom_tween_ms < 0.0 {
            return Err(ConfigError::TweenDuration(self.zoom_tween_ms));
        }
        Ok(())
    }

    #[must_use]
    pub fn grid(&self) -> Grid {
        Grid::new(self.grid_width, self.grid_height)
    }
}
