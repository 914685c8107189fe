//! Scene model: nodes, connectors, groups, icons, and the aggregate `Scene`.
//!
//! A `Scene` is an immutable snapshot; the store produces a new one for every
//! mutation. Connector paths are derived from the positions of the nodes their
//! anchors reference and are never authored directly.

#[cfg(test)]
#[path = "scene_test.rs"]
mod scene_test;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::consts::{LABEL_HEIGHT_DEFAULT, LABEL_HEIGHT_MAX, LABEL_HEIGHT_MIN};
use crate::coords::Coords;
use crate::transform::tile_bounds;

/// Identifier of a node, connector, group, or icon.
pub type NodeId = String;

// =============================================================
// Node
// =============================================================

/// An entity placed on a tile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: NodeId,
    pub label: String,
    /// Rich-text (markdown) description.
    pub description: String,
    /// Pixel height reserved above the node for its label.
    pub label_height: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_id: Option<String>,
    /// Tile position.
    pub position: Coords,
    /// Fields this crate does not interpret, carried through unchanged.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Node {
    /// A node with an empty label and description and the default label height.
    #[must_use]
    pub fn new(id: impl Into<NodeId>, position: Coords) -> Self {
        Self {
            id: id.into(),
            label: String::new(),
            description: String::new(),
            label_height: LABEL_HEIGHT_DEFAULT,
            icon_id: None,
            position,
            extra: Map::new(),
        }
    }
}

/// Clamp a label height into the allowed range.
#[must_use]
pub fn clamp_label_height(height: f64) -> f64 {
    if height.is_nan() {
        return LABEL_HEIGHT_DEFAULT;
    }
    height.clamp(LABEL_HEIGHT_MIN, LABEL_HEIGHT_MAX)
}

/// Sparse update for a node. Only present fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Coords>,
    /// Extra keys to merge; `null` values remove the key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra: Option<Map<String, Value>>,
}

impl NodeUpdate {
    /// Update that only moves the node.
    #[must_use]
    pub fn position(tile: Coords) -> Self {
        Self { position: Some(tile), ..Self::default() }
    }

    /// Merge this update into `node`. The label height is clamped.
    pub fn apply_to(&self, node: &mut Node) {
        if let Some(label) = &self.label {
            node.label.clone_from(label);
        }
        if let Some(description) = &self.description {
            node.description.clone_from(description);
        }
        if let Some(height) = self.label_height {
            node.label_height = clamp_label_height(height);
        }
        if let Some(icon_id) = &self.icon_id {
            node.icon_id = Some(icon_id.clone());
        }
        if let Some(position) = self.position {
            node.position = position;
        }
        if let Some(extra) = &self.extra {
            for (key, value) in extra {
                if value.is_null() {
                    node.extra.remove(key);
                } else {
                    node.extra.insert(key.clone(), value.clone());
                }
            }
        }
    }
}

// =============================================================
// Connector
// =============================================================

/// What an anchor points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnchorKind {
    Node,
}

/// A typed reference from a connector to the entity it tracks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anchor {
    #[serde(rename = "type")]
    pub kind: AnchorKind,
    pub id: NodeId,
}

impl Anchor {
    #[must_use]
    pub fn node(id: impl Into<NodeId>) -> Self {
        Self { kind: AnchorKind::Node, id: id.into() }
    }

    /// Whether this anchor tracks the node `id`.
    #[must_use]
    pub fn references_node(&self, id: &str) -> bool {
        self.kind == AnchorKind::Node && self.id == id
    }
}

/// An edge between anchors with a derived world-space path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connector {
    pub id: NodeId,
    pub anchors: Vec<Anchor>,
    /// World-space path through each anchor, recomputed on every change to an
    /// anchored node.
    #[serde(default)]
    pub path: Vec<Coords>,
}

impl Connector {
    #[must_use]
    pub fn references_node(&self, id: &str) -> bool {
        self.anchors.iter().any(|anchor| anchor.references_node(id))
    }
}

/// World-space path through the tile centers of every anchored node.
///
/// Anchors whose node is missing contribute no point.
#[must_use]
pub fn connector_path(anchors: &[Anchor], nodes: &[Node]) -> Vec<Coords> {
    anchors
        .iter()
        .filter_map(|anchor| match anchor.kind {
            AnchorKind::Node => nodes.iter().find(|node| node.id == anchor.id),
        })
        .map(|node| tile_bounds(node.position).center)
        .collect()
}

// =============================================================
// Group / Icon
// =============================================================

/// A named set of nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: NodeId,
    #[serde(default)]
    pub name: String,
    pub node_ids: Vec<NodeId>,
}

/// Descriptor for a new group. A random id is assigned when `id` is absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<NodeId>,
    #[serde(default)]
    pub name: String,
    pub node_ids: Vec<NodeId>,
}

impl Group {
    #[must_use]
    pub fn from_input(input: GroupInput) -> Self {
        Self {
            id: input.id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            name: input.name,
            node_ids: input.node_ids,
        }
    }
}

/// Catalog entry describing how a node can look.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Icon {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// =============================================================
// Scene
// =============================================================

/// The aggregate root: everything the editor shows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub nodes: Vec<Node>,
    pub connectors: Vec<Connector>,
    pub groups: Vec<Group>,
    pub icons: Vec<Icon>,
}

impl Scene {
    /// Canonical scene for validated input, with every connector path derived.
    #[must_use]
    pub fn from_input(input: SceneInput) -> Self {
        let nodes = input.nodes;
        let connectors = input
            .connectors
            .into_iter()
            .map(|connector| {
                let path = connector_path(&connector.anchors, &nodes);
                Connector { id: connector.id, anchors: connector.anchors, path }
            })
            .collect();

        Self {
            nodes,
            connectors,
            groups: input.groups.into_iter().map(Group::from_input).collect(),
            icons: input.icons,
        }
    }

    #[must_use]
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == id)
    }

    #[must_use]
    pub fn connector(&self, id: &str) -> Option<&Connector> {
        self.connectors.iter().find(|connector| connector.id == id)
    }

    #[must_use]
    pub fn group(&self, id: &str) -> Option<&Group> {
        self.groups.iter().find(|group| group.id == id)
    }

    #[must_use]
    pub fn icon(&self, id: &str) -> Option<&Icon> {
        self.icons.iter().find(|icon| icon.id == id)
    }

    /// Node occupying `tile`, if any.
    #[must_use]
    pub fn node_at(&self, tile: Coords) -> Option<&Node> {
        let key = tile.tile_key();
        self.nodes.iter().find(|node| node.position.tile_key() == key)
    }

    /// Connectors with at least one anchor on node `id`.
    pub fn connectors_for_node<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Connector> + 'a {
        self.connectors.iter().filter(move |connector| connector.references_node(id))
    }

    /// Recompute the path of every connector.
    pub fn refresh_all_connectors(&mut self) {
        let Self { nodes, connectors, .. } = self;
        for connector in connectors.iter_mut() {
            connector.path = connector_path(&connector.anchors, nodes);
        }
    }

    /// Recompute the path of every connector anchored to node `id`.
    pub fn refresh_connectors_for(&mut self, id: &str) {
        let Self { nodes, connectors, .. } = self;
        for connector in connectors.iter_mut().filter(|c| c.references_node(id)) {
            connector.path = connector_path(&connector.anchors, nodes);
        }
    }
}

// =============================================================
// Input forms
// =============================================================

/// Node as accepted by `set_scene` and `create_node`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeInput {
    pub id: NodeId,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_label_height")]
    pub label_height: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_id: Option<String>,
    pub position: Coords,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_label_height() -> f64 {
    LABEL_HEIGHT_DEFAULT
}

impl From<NodeInput> for Node {
    fn from(input: NodeInput) -> Self {
        Self {
            id: input.id,
            label: input.label,
            description: input.description,
            label_height: input.label_height,
            icon_id: input.icon_id,
            position: input.position,
            extra: input.extra,
        }
    }
}

/// Connector as accepted by `set_scene` and `create_connector`. Any `path`
/// supplied is ignored; it is always derived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorInput {
    pub id: NodeId,
    pub anchors: Vec<Anchor>,
}

/// Scene as accepted by `set_scene`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneInput {
    pub nodes: Vec<Node>,
    pub connectors: Vec<ConnectorInput>,
    pub groups: Vec<GroupInput>,
    pub icons: Vec<Icon>,
}

/// Partial or full scene replacement. Present fields replace their
/// counterpart wholesale; connector paths are then re-derived.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nodes: Option<Vec<Node>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connectors: Option<Vec<Connector>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub groups: Option<Vec<Group>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icons: Option<Vec<Icon>>,
}

impl SceneUpdate {
    /// Apply present fields to `scene`.
    pub fn apply_to(self, scene: &mut Scene) {
        if let Some(nodes) = self.nodes {
            scene.nodes = nodes;
        }
        if let Some(connectors) = self.connectors {
            scene.connectors = connectors;
        }
        if let Some(groups) = self.groups {
            scene.groups = groups;
        }
        if let Some(icons) = self.icons {
            scene.icons = icons;
        }
        scene.refresh_all_connectors();
    }
}

impl From<Scene> for SceneUpdate {
    fn from(scene: Scene) -> Self {
        Self {
            nodes: Some(scene.nodes),
            connectors: Some(scene.connectors),
            groups: Some(scene.groups),
            icons: Some(scene.icons),
        }
    }
}
