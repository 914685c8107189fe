//! Stage: the visual scene the renderer draws.
//!
//! `Stage` holds everything the canvas shows (grid, viewport, placed node
//! elements, connector paths, hover cursor) and answers geometry queries for
//! pointer input. It is separated from [`crate::renderer::Renderer`] so it can
//! be tested without a browser. Methods that change something observable
//! return the [`SceneEvent`]s to publish; the owner publishes them.

#[cfg(test)]
#[path = "stage_test.rs"]
mod stage_test;

use crate::config::EditorConfig;
use crate::coords::Coords;
use crate::elements::{ElementError, SceneElements};
use crate::events::SceneEvent;
use crate::grid::Grid;
use crate::scene::{Connector, Group, Icon, Node, NodeId, Scene};
use crate::viewport::Viewport;

#[derive(Debug, thiserror::Error)]
pub enum StageError {
    #[error("icon not found: {0}")]
    IconNotFound(String),
    #[error("node {id} at ({}, {}) is outside the grid", .tile.x, .tile.y)]
    OutOfGrid { id: NodeId, tile: Coords },
    #[error(transparent)]
    Element(#[from] ElementError),
}

pub struct Stage {
    grid: Grid,
    viewport: Viewport,
    elements: SceneElements,
    connectors: Vec<Connector>,
    groups: Vec<Group>,
    icons: Vec<Icon>,
    cursor: Option<Coords>,
}

impl Default for Stage {
    fn default() -> Self {
        Self::new(&EditorConfig::default())
    }
}

impl Stage {
    #[must_use]
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            grid: config.grid(),
            viewport: Viewport::new(config),
            elements: SceneElements::new(),
            connectors: Vec::new(),
            groups: Vec::new(),
            icons: Vec::new(),
            cursor: None,
        }
    }

    // --- Scene data ---

    /// Show `scene`. Nodes that stay on stage keep their focus.
    ///
    /// # Errors
    ///
    /// Returns `OutOfGrid` if a node lies off the grid and `Element` if two
    /// nodes share a tile; the stage is unchanged either way.
    pub fn load_scene(&mut self, scene: &Scene) -> Result<(), StageError> {
        let mut elements = SceneElements::new();
        for node in &scene.nodes {
            if !self.grid.contains(node.position) {
                return Err(StageError::OutOfGrid { id: node.id.clone(), tile: node.position });
            }
            elements.add_node(node.clone())?;
        }
        for id in self.elements.focused() {
            elements.focus(id);
        }

        self.elements = elements;
        self.connectors.clone_from(&scene.connectors);
        self.groups.clone_from(&scene.groups);
        self.icons.clone_from(&scene.icons);
        tracing::debug!(nodes = self.elements.len(), connectors = self.connectors.len(), "stage loaded");
        Ok(())
    }

    /// Current stage contents in the form accepted by `SceneStore::set_scene`.
    #[must_use]
    pub fn export_scene(&self) -> Scene {
        Scene {
            nodes: self.elements.export(),
            connectors: self.connectors.clone(),
            groups: self.groups.clone(),
            icons: self.icons.clone(),
        }
    }

    /// Look up an icon of the loaded scene.
    ///
    /// # Errors
    ///
    /// Returns `IconNotFound`. Icons are load-time data, so callers should
    /// treat this as a bug rather than a user error.
    pub fn icon(&self, id: &str) -> Result<&Icon, StageError> {
        self.icons
            .iter()
            .find(|icon| icon.id == id)
            .ok_or_else(|| StageError::IconNotFound(id.to_owned()))
    }

    /// Everything occupying `tile`.
    #[must_use]
    pub fn items_by_tile(&self, tile: Coords) -> Vec<&Node> {
        self.elements.node_by_tile(tile).into_iter().collect()
    }

    /// Remove all scene content from the stage. Icons stay loaded.
    pub fn clear(&mut self) {
        self.elements.clear();
        self.connectors.clear();
        self.groups.clear();
    }

    // --- Geometry ---

    #[must_use]
    pub fn mouse_to_tile(&self, mouse: Coords) -> Coords {
        self.viewport.mouse_to_tile(mouse, &self.grid)
    }

    #[must_use]
    pub fn tile_to_screen(&self, tile: Coords) -> Coords {
        self.viewport.tile_to_screen(tile)
    }

    // --- Viewport ---

    pub fn set_zoom(&mut self, level: f64) -> Vec<SceneEvent> {
        self.viewport.set_zoom(level).into_iter().collect()
    }

    pub fn scroll_to(&mut self, x: f64, y: f64) {
        self.viewport.scroll_to(x, y);
    }

    pub fn scroll_to_delta(&mut self, dx: f64, dy: f64) {
        self.viewport.scroll_to_delta(dx, dy);
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.viewport.resize(width, height);
    }

    pub fn set_dom_offset(&mut self, offset: Coords) {
        self.viewport.set_dom_offset(offset);
    }

    /// Step animations by `dt_ms` milliseconds.
    pub fn advance(&mut self, dt_ms: f64) {
        self.viewport.advance(dt_ms);
    }

    // --- Pointer ---

    /// Move the hover cursor to the tile under `mouse`.
    pub fn hover(&mut self, mouse: Coords) -> Vec<SceneEvent> {
        let tile = self.mouse_to_tile(mouse);
        if self.cursor == Some(tile) {
            return Vec::new();
        }
        self.cursor = Some(tile);
        vec![SceneEvent::TileHovered { tile }]
    }

    /// Focus the node under `mouse`, or clear focus on an empty tile.
    pub fn select_at(&mut self, mouse: Coords) -> Vec<SceneEvent> {
        let tile = self.mouse_to_tile(mouse);
        let hit = self.elements.node_by_tile(tile).map(|node| node.id.clone());
        let had_focus = !self.elements.focused().is_empty();
        self.elements.unfocus_all();

        match hit {
            Some(id) => {
                self.elements.focus(&id);
                vec![SceneEvent::NodeSelected { id }]
            }
            None if had_focus => vec![SceneEvent::SelectionCleared],
            None => Vec::new(),
        }
    }

    pub fn unfocus_all(&mut self) -> Vec<SceneEvent> {
        if self.elements.focused().is_empty() {
            return Vec::new();
        }
        self.elements.unfocus_all();
        vec![SceneEvent::SelectionCleared]
    }

    // --- Read access for surfaces ---

    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[must_use]
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    #[must_use]
    pub fn elements(&self) -> &SceneElements {
        &self.elements
    }

    #[must_use]
    pub fn connectors(&self) -> &[Connector] {
        &self.connectors
    }

    #[must_use]
    pub fn cursor(&self) -> Option<Coords> {
        self.cursor
    }
}
