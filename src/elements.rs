//! Spatial index of the node elements currently on the stage.
//!
//! Each element mirrors a node from the committed scene plus its visual state
//! (focus). Elements are keyed by node id and by tile; at most one node may
//! occupy a tile.

#[cfg(test)]
#[path = "elements_test.rs"]
mod elements_test;

use std::collections::HashMap;

use crate::coords::Coords;
use crate::scene::{Node, NodeId};

#[derive(Debug, thiserror::Error)]
pub enum ElementError {
    #[error("tile {tile} is already occupied by node {occupant}")]
    TileOccupied { tile: Coords, occupant: NodeId },
}

/// A node as placed on the stage.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeElement {
    pub node: Node,
    pub focused: bool,
}

#[derive(Debug, Default)]
pub struct SceneElements {
    elements: HashMap<NodeId, NodeElement>,
    by_tile: HashMap<(i64, i64), NodeId>,
    /// Insertion order, so exports are stable.
    order: Vec<NodeId>,
}

impl SceneElements {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a node. A node with the same id is replaced.
    ///
    /// # Errors
    ///
    /// Returns `TileOccupied` if a different node already sits on the tile.
    pub fn add_node(&mut self, node: Node) -> Result<(), ElementError> {
        let key = node.position.tile_key();
        if let Some(occupant) = self.by_tile.get(&key)
            && *occupant != node.id
        {
            return Err(ElementError::TileOccupied { tile: node.position, occupant: occupant.clone() });
        }

        let focused = match self.elements.remove(&node.id) {
            Some(previous) => {
                self.by_tile.remove(&previous.node.position.tile_key());
                previous.focused
            }
            None => {
                self.order.push(node.id.clone());
                false
            }
        };

        self.by_tile.insert(key, node.id.clone());
        self.elements.insert(node.id.clone(), NodeElement { node, focused });
        Ok(())
    }

    /// Remove a node, returning it if it was present.
    pub fn remove_node(&mut self, id: &str) -> Option<Node> {
        let element = self.elements.remove(id)?;
        self.by_tile.remove(&element.node.position.tile_key());
        self.order.retain(|existing| existing != id);
        Some(element.node)
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&NodeElement> {
        self.elements.get(id)
    }

    /// The node occupying `tile`, if any.
    #[must_use]
    pub fn node_by_tile(&self, tile: Coords) -> Option<&Node> {
        let id = self.by_tile.get(&tile.tile_key())?;
        self.elements.get(id).map(|element| &element.node)
    }

    /// Focus one node. Returns `false` if the id is unknown.
    pub fn focus(&mut self, id: &str) -> bool {
        match self.elements.get_mut(id) {
            Some(element) => {
                element.focused = true;
                true
            }
            None => false,
        }
    }

    /// Ids of every focused node, in insertion order.
    #[must_use]
    pub fn focused(&self) -> Vec<&str> {
        self.iter().filter(|element| element.focused).map(|element| element.node.id.as_str()).collect()
    }

    pub fn unfocus_all(&mut self) {
        for element in self.elements.values_mut() {
            element.focused = false;
        }
    }

    pub fn clear(&mut self) {
        self.elements.clear();
        self.by_tile.clear();
        self.order.clear();
    }

    /// Canonical nodes in insertion order.
    #[must_use]
    pub fn export(&self) -> Vec<Node> {
        self.iter().map(|element| element.node.clone()).collect()
    }

    /// Elements in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &NodeElement> {
        self.order.iter().filter_map(|id| self.elements.get(id))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}
