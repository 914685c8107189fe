//! Scene store: the single source of truth for scene data.
//!
//! DESIGN
//! ======
//! The store holds the current snapshot as an `Arc<Scene>`. Every action
//! clones the snapshot, applies its change to the clone, re-derives any
//! affected connector paths, and only then swaps the new snapshot in and
//! notifies subscribers. Earlier snapshots handed out to callers are never
//! touched, and a failed action leaves the committed snapshot as it was.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use std::sync::Arc;

use serde_json::Value;

use crate::grid::Grid;
use crate::scene::{
    Connector, ConnectorInput, Group, GroupInput, Icon, Node, NodeId, NodeInput, NodeUpdate, Scene,
    SceneUpdate, connector_path,
};
use crate::validation::{
    ValidationError, validate_connector_input, validate_group_input, validate_node_input, validate_scene,
    validate_tile,
};

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),
    #[error("connector not found: {0}")]
    ConnectorNotFound(NodeId),
    #[error("group not found: {0}")]
    GroupNotFound(NodeId),
    #[error("icon not found: {0}")]
    IconNotFound(String),
}

/// Handle returned by [`SceneStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StoreSubscription(u64);

type Listener = Box<dyn FnMut(&Arc<Scene>)>;

pub struct SceneStore {
    state: Arc<Scene>,
    /// Bounds every node position must lie in.
    grid: Grid,
    listeners: Vec<(StoreSubscription, Listener)>,
    next_subscription: u64,
}

impl Default for SceneStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneStore {
    /// Create a store holding an empty scene on the default grid.
    #[must_use]
    pub fn new() -> Self {
        Self::with_grid(Grid::default())
    }

    /// Create a store whose nodes must stay inside `grid`.
    #[must_use]
    pub fn with_grid(grid: Grid) -> Self {
        Self { state: Arc::new(Scene::default()), grid, listeners: Vec::new(), next_subscription: 0 }
    }

    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    // =========================================================================
    // SELECTORS
    // =========================================================================

    /// The current snapshot.
    #[must_use]
    pub fn scene(&self) -> Arc<Scene> {
        Arc::clone(&self.state)
    }

    #[must_use]
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.state.node(id)
    }

    #[must_use]
    pub fn connector(&self, id: &str) -> Option<&Connector> {
        self.state.connector(id)
    }

    /// Look up an icon.
    ///
    /// # Errors
    ///
    /// Returns `IconNotFound` if no icon has this id.
    pub fn icon(&self, id: &str) -> Result<&Icon, StoreError> {
        self.state.icon(id).ok_or_else(|| StoreError::IconNotFound(id.to_owned()))
    }

    // =========================================================================
    // SUBSCRIPTIONS
    // =========================================================================

    /// Call `listener` with every newly committed snapshot.
    pub fn subscribe(&mut self, listener: impl FnMut(&Arc<Scene>) + 'static) -> StoreSubscription {
        let id = StoreSubscription(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: StoreSubscription) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sub, _)| *sub != id);
        self.listeners.len() != before
    }

    fn commit(&mut self, scene: Scene) -> Arc<Scene> {
        self.state = Arc::new(scene);
        tracing::debug!(
            nodes = self.state.nodes.len(),
            connectors = self.state.connectors.len(),
            groups = self.state.groups.len(),
            "scene committed"
        );
        for (_, listener) in &mut self.listeners {
            listener(&self.state);
        }
        Arc::clone(&self.state)
    }

    // =========================================================================
    // WHOLE-SCENE ACTIONS
    // =========================================================================

    /// Validate raw scene JSON and replace the whole scene with it.
    ///
    /// # Errors
    ///
    /// Returns `Validation` listing every violation; the store is unchanged.
    pub fn set_scene(&mut self, raw: &Value) -> Result<Arc<Scene>, StoreError> {
        let input = validate_scene(raw, &self.grid)?;
        Ok(self.commit(Scene::from_input(input)))
    }

    /// Replace the fields present in `update`. The input is not validated,
    /// but every connector path is re-derived from the resulting nodes.
    pub fn update_scene(&mut self, update: impl Into<SceneUpdate>) -> Arc<Scene> {
        let mut next = Scene::clone(&self.state);
        update.into().apply_to(&mut next);
        self.commit(next)
    }

    // =========================================================================
    // NODE ACTIONS
    // =========================================================================

    /// Merge `updates` into node `id` and commit.
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` for an unknown id and `Validation` when the new
    /// position is not a whole tile inside the grid or is another node's tile.
    pub fn update_node(&mut self, id: &str, updates: &NodeUpdate) -> Result<Arc<Scene>, StoreError> {
        let next = apply_node_update(&self.state, &self.grid, id, updates)?;
        Ok(self.commit(next))
    }

    /// Compute the result of [`Self::update_node`] against `base` without
    /// committing it. Used for previews while dragging.
    ///
    /// # Errors
    ///
    /// Same as [`Self::update_node`].
    pub fn preview_node_update(&self, base: &Scene, id: &str, updates: &NodeUpdate) -> Result<Scene, StoreError> {
        apply_node_update(base, &self.grid, id, updates)
    }

    /// Add a new node.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a duplicate id, out-of-range label height,
    /// occupied, fractional or off-grid tile, or unknown icon.
    pub fn create_node(&mut self, input: NodeInput) -> Result<Arc<Scene>, StoreError> {
        validate_node_input(&input, &self.state, &self.grid)?;
        let mut next = Scene::clone(&self.state);
        next.nodes.push(Node::from(input));
        Ok(self.commit(next))
    }

    /// Remove a node, every connector anchored to it, and its group memberships.
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` for an unknown id.
    pub fn delete_node(&mut self, id: &str) -> Result<Arc<Scene>, StoreError> {
        if self.state.node(id).is_none() {
            return Err(StoreError::NodeNotFound(id.to_owned()));
        }
        let mut next = Scene::clone(&self.state);
        next.nodes.retain(|node| node.id != id);
        next.connectors.retain(|connector| !connector.references_node(id));
        for group in &mut next.groups {
            group.node_ids.retain(|node_id| node_id != id);
        }
        Ok(self.commit(next))
    }

    // =========================================================================
    // CONNECTOR ACTIONS
    // =========================================================================

    /// Add a connector with a freshly derived path.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a duplicate id, fewer than two anchors, or an
    /// anchor on an unknown node.
    pub fn create_connector(&mut self, input: ConnectorInput) -> Result<Arc<Scene>, StoreError> {
        validate_connector_input(&input, &self.state)?;
        let mut next = Scene::clone(&self.state);
        let path = connector_path(&input.anchors, &next.nodes);
        next.connectors.push(Connector { id: input.id, anchors: input.anchors, path });
        Ok(self.commit(next))
    }

    /// # Errors
    ///
    /// Returns `ConnectorNotFound` for an unknown id.
    pub fn delete_connector(&mut self, id: &str) -> Result<Arc<Scene>, StoreError> {
        if self.state.connector(id).is_none() {
            return Err(StoreError::ConnectorNotFound(id.to_owned()));
        }
        let mut next = Scene::clone(&self.state);
        next.connectors.retain(|connector| connector.id != id);
        Ok(self.commit(next))
    }

    // =========================================================================
    // GROUP ACTIONS
    // =========================================================================

    /// Append a group built from `input` and commit.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a duplicate id or unknown node ids.
    pub fn create_group(&mut self, input: GroupInput) -> Result<Arc<Scene>, StoreError> {
        validate_group_input(&input, &self.state)?;
        let mut next = Scene::clone(&self.state);
        next.groups.push(Group::from_input(input));
        Ok(self.commit(next))
    }

    /// # Errors
    ///
    /// Returns `GroupNotFound` for an unknown id.
    pub fn delete_group(&mut self, id: &str) -> Result<Arc<Scene>, StoreError> {
        if self.state.group(id).is_none() {
            return Err(StoreError::GroupNotFound(id.to_owned()));
        }
        let mut next = Scene::clone(&self.state);
        next.groups.retain(|group| group.id != id);
        Ok(self.commit(next))
    }
}

/// Build the snapshot that results from applying `updates` to node `id` of
/// `base`, with every connector anchored to that node re-derived.
fn apply_node_update(base: &Scene, grid: &Grid, id: &str, updates: &NodeUpdate) -> Result<Scene, StoreError> {
    let index = base
        .nodes
        .iter()
        .position(|node| node.id == id)
        .ok_or_else(|| StoreError::NodeNotFound(id.to_owned()))?;

    if let Some(target) = updates.position {
        validate_tile(target, grid)?;
    }
    if let Some(target) = updates.position
        && let Some(occupant) = base.node_at(target)
        && occupant.id != id
    {
        return Err(ValidationError::single("position", format!("tile is already occupied by {:?}", occupant.id)).into());
    }

    let mut next = base.clone();
    updates.apply_to(&mut next.nodes[index]);
    next.refresh_connectors_for(id);
    Ok(next)
}
