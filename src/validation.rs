//! Structural validation of raw scene input.
//!
//! `serde` stops at the first error, but callers need every problem at once,
//! so the raw JSON is walked by hand and each violation recorded with a dotted
//! path. Only input that passes is deserialized into [`SceneInput`].

#[cfg(test)]
#[path = "validation_test.rs"]
mod validation_test;

use std::collections::HashSet;
use std::fmt;

use serde_json::{Map, Value};

use crate::consts::{LABEL_HEIGHT_MAX, LABEL_HEIGHT_MIN};
use crate::coords::Coords;
use crate::grid::Grid;
use crate::scene::{AnchorKind, ConnectorInput, GroupInput, NodeInput, Scene, SceneInput};

/// One violated constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Dotted path to the offending value, e.g. `nodes[2].labelHeight`.
    pub path: String,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Input failed validation. Lists every violation found.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid scene ({} violation(s)): {}", .violations.len(), join(.violations))]
pub struct ValidationError {
    pub violations: Vec<Violation>,
}

fn join(violations: &[Violation]) -> String {
    violations.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

impl ValidationError {
    #[must_use]
    pub fn single(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self { violations: vec![Violation { path: path.into(), message: message.into() }] }
    }
}

/// Collects violations while walking input.
#[derive(Default)]
struct Report {
    violations: Vec<Violation>,
}

impl Report {
    fn push(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.violations.push(Violation { path: path.into(), message: message.into() });
    }

    fn finish<T>(self, value: T) -> Result<T, ValidationError> {
        if self.violations.is_empty() {
            Ok(value)
        } else {
            Err(ValidationError { violations: self.violations })
        }
    }
}

// =============================================================
// Scene
// =============================================================

/// Validate raw scene JSON against `grid` and convert it into [`SceneInput`].
///
/// # Errors
///
/// Returns a [`ValidationError`] listing every violated constraint.
pub fn validate_scene(raw: &Value, grid: &Grid) -> Result<SceneInput, ValidationError> {
    let mut report = Report::default();

    let Some(root) = raw.as_object() else {
        return Err(ValidationError::single("$", "expected an object"));
    };

    let icons = array_field(root, "icons", "icons", &mut report);
    let nodes = array_field(root, "nodes", "nodes", &mut report);
    let connectors = array_field(root, "connectors", "connectors", &mut report);
    let groups = array_field(root, "groups", "groups", &mut report);

    let icon_ids = check_icons(icons, &mut report);
    let node_ids = check_nodes(nodes, &icon_ids, grid, &mut report);
    check_connectors(connectors, &node_ids, &mut report);
    check_groups(groups, &node_ids, &mut report);

    if !report.violations.is_empty() {
        return report.finish(SceneInput::default());
    }

    serde_json::from_value(raw.clone()).map_err(|err| ValidationError::single("$", err.to_string()))
}

fn array_field<'a>(obj: &'a Map<String, Value>, key: &str, path: &str, report: &mut Report) -> &'a [Value] {
    match obj.get(key) {
        Some(Value::Array(items)) => items,
        Some(_) => {
            report.push(path, "expected an array");
            &[]
        }
        None => {
            report.push(path, "required");
            &[]
        }
    }
}

fn check_icons(icons: &[Value], report: &mut Report) -> HashSet<String> {
    let mut ids = HashSet::new();
    for (i, icon) in icons.iter().enumerate() {
        let path = format!("icons[{i}]");
        let Some(obj) = icon.as_object() else {
            report.push(path, "expected an object");
            continue;
        };
        if let Some(id) = required_id(obj, &path, report)
            && !ids.insert(id.to_owned())
        {
            report.push(format!("{path}.id"), format!("duplicate icon id {id:?}"));
        }
        for key in ["name", "url", "category"] {
            if obj.get(key).is_some_and(|v| !v.is_string()) {
                report.push(format!("{path}.{key}"), "expected a string");
            }
        }
    }
    ids
}

fn check_nodes(nodes: &[Value], icon_ids: &HashSet<String>, grid: &Grid, report: &mut Report) -> HashSet<String> {
    let mut ids = HashSet::new();
    let mut tiles = HashSet::new();
    for (i, node) in nodes.iter().enumerate() {
        let path = format!("nodes[{i}]");
        let Some(obj) = node.as_object() else {
            report.push(path, "expected an object");
            continue;
        };
        if let Some(id) = required_id(obj, &path, report)
            && !ids.insert(id.to_owned())
        {
            report.push(format!("{path}.id"), format!("duplicate node id {id:?}"));
        }
        required_string(obj, "label", &path, report);
        required_string(obj, "description", &path, report);
        check_label_height(obj.get("labelHeight"), &format!("{path}.labelHeight"), report);
        if let Some(tile) = check_position(obj.get("position"), &format!("{path}.position"), grid, report)
            && !tiles.insert(tile)
        {
            report.push(format!("{path}.position"), format!("tile ({}, {}) is already occupied", tile.0, tile.1));
        }
        check_icon_ref(obj.get("iconId"), &format!("{path}.iconId"), icon_ids, report);
    }
    ids
}

fn check_connectors(connectors: &[Value], node_ids: &HashSet<String>, report: &mut Report) {
    let mut ids = HashSet::new();
    for (i, connector) in connectors.iter().enumerate() {
        let path = format!("connectors[{i}]");
        let Some(obj) = connector.as_object() else {
            report.push(path, "expected an object");
            continue;
        };
        if let Some(id) = required_id(obj, &path, report)
            && !ids.insert(id.to_owned())
        {
            report.push(format!("{path}.id"), format!("duplicate connector id {id:?}"));
        }
        check_anchors(obj.get("anchors"), &format!("{path}.anchors"), node_ids, report);
    }
}

fn check_groups(groups: &[Value], node_ids: &HashSet<String>, report: &mut Report) {
    let mut ids = HashSet::new();
    for (i, group) in groups.iter().enumerate() {
        let path = format!("groups[{i}]");
        let Some(obj) = group.as_object() else {
            report.push(path, "expected an object");
            continue;
        };
        match obj.get("id") {
            None => {}
            Some(Value::String(id)) if !id.is_empty() => {
                if !ids.insert(id.clone()) {
                    report.push(format!("{path}.id"), format!("duplicate group id {id:?}"));
                }
            }
            Some(_) => report.push(format!("{path}.id"), "expected a non-empty string"),
        }
        if obj.get("name").is_some_and(|v| !v.is_string()) {
            report.push(format!("{path}.name"), "expected a string");
        }
        check_node_refs(obj.get("nodeIds"), &format!("{path}.nodeIds"), node_ids, report);
    }
}

// =============================================================
// Incremental inputs
// =============================================================

/// Validate a node about to be added to `scene`.
///
/// # Errors
///
/// Returns every violation: duplicate id, label height out of range,
/// non-integral position, occupied tile, unknown icon.
pub fn validate_node_input(input: &NodeInput, scene: &Scene, grid: &Grid) -> Result<(), ValidationError> {
    let mut report = Report::default();
    if input.id.is_empty() {
        report.push("id", "expected a non-empty string");
    } else if scene.node(&input.id).is_some() {
        report.push("id", format!("duplicate node id {:?}", input.id));
    }
    if !(LABEL_HEIGHT_MIN..=LABEL_HEIGHT_MAX).contains(&input.label_height) {
        report.push("labelHeight", label_height_message());
    }
    if let Some(problem) = tile_problem(input.position, grid) {
        report.push("position", problem);
    } else if let Some(occupant) = scene.node_at(input.position) {
        report.push("position", format!("tile is already occupied by {:?}", occupant.id));
    }
    if let Some(icon_id) = &input.icon_id
        && scene.icon(icon_id).is_none()
    {
        report.push("iconId", format!("unknown icon {icon_id:?}"));
    }
    report.finish(())
}

/// Validate a connector about to be added to `scene`.
///
/// # Errors
///
/// Returns every violation: duplicate id, too few anchors, unknown nodes.
pub fn validate_connector_input(input: &ConnectorInput, scene: &Scene) -> Result<(), ValidationError> {
    let mut report = Report::default();
    if input.id.is_empty() {
        report.push("id", "expected a non-empty string");
    } else if scene.connector(&input.id).is_some() {
        report.push("id", format!("duplicate connector id {:?}", input.id));
    }
    if input.anchors.len() < 2 {
        report.push("anchors", "expected at least two anchors");
    }
    for (i, anchor) in input.anchors.iter().enumerate() {
        match anchor.kind {
            AnchorKind::Node => {
                if scene.node(&anchor.id).is_none() {
                    report.push(format!("anchors[{i}].id"), format!("unknown node {:?}", anchor.id));
                }
            }
        }
    }
    report.finish(())
}

/// Validate a group descriptor against `scene`.
///
/// # Errors
///
/// Returns every violation: duplicate id, unknown node ids.
pub fn validate_group_input(input: &GroupInput, scene: &Scene) -> Result<(), ValidationError> {
    let mut report = Report::default();
    if let Some(id) = &input.id {
        if id.is_empty() {
            report.push("id", "expected a non-empty string");
        } else if scene.group(id).is_some() {
            report.push("id", format!("duplicate group id {id:?}"));
        }
    }
    for (i, node_id) in input.node_ids.iter().enumerate() {
        if scene.node(node_id).is_none() {
            report.push(format!("nodeIds[{i}]"), format!("unknown node {node_id:?}"));
        }
    }
    report.finish(())
}

// =============================================================
// Field checks
// =============================================================

fn required_id<'a>(obj: &'a Map<String, Value>, path: &str, report: &mut Report) -> Option<&'a str> {
    match obj.get("id") {
        Some(Value::String(id)) if !id.is_empty() => Some(id),
        Some(_) => {
            report.push(format!("{path}.id"), "expected a non-empty string");
            None
        }
        None => {
            report.push(format!("{path}.id"), "required");
            None
        }
    }
}

fn required_string(obj: &Map<String, Value>, key: &str, path: &str, report: &mut Report) {
    match obj.get(key) {
        Some(Value::String(_)) => {}
        Some(_) => report.push(format!("{path}.{key}"), "expected a string"),
        None => report.push(format!("{path}.{key}"), "required"),
    }
}

fn label_height_message() -> String {
    format!("expected a number between {LABEL_HEIGHT_MIN} and {LABEL_HEIGHT_MAX}")
}

fn check_label_height(value: Option<&Value>, path: &str, report: &mut Report) {
    match value.map(Value::as_f64) {
        None => report.push(path, "required"),
        Some(Some(height)) if (LABEL_HEIGHT_MIN..=LABEL_HEIGHT_MAX).contains(&height) => {}
        Some(_) => report.push(path, label_height_message()),
    }
}

/// Validate a tile position, returning its integer key when well-formed.
#[allow(clippy::cast_possible_truncation)]
fn check_position(value: Option<&Value>, path: &str, grid: &Grid, report: &mut Report) -> Option<(i64, i64)> {
    let Some(value) = value else {
        report.push(path, "required");
        return None;
    };
    let Some(obj) = value.as_object() else {
        report.push(path, "expected an object with x and y");
        return None;
    };
    let mut axis = |key: &str| -> Option<i64> {
        match obj.get(key).and_then(Value::as_f64) {
            Some(v) if v.is_finite() && v.fract() == 0.0 => Some(v as i64),
            Some(_) => {
                report.push(format!("{path}.{key}"), "expected an integral tile coordinate");
                None
            }
            None => {
                report.push(format!("{path}.{key}"), "expected a number");
                None
            }
        }
    };
    let x = axis("x");
    let y = axis("y");
    let (x, y) = (x?, y?);
    #[allow(clippy::cast_precision_loss)]
    let tile = Coords::new(x as f64, y as f64);
    if !grid.contains(tile) {
        report.push(path, outside_grid_message(grid));
        return None;
    }
    Some((x, y))
}

/// Check that `tile` names a grid tile: integral, finite and inside `grid`.
///
/// # Errors
///
/// Returns a single `position` violation otherwise.
pub fn validate_tile(tile: Coords, grid: &Grid) -> Result<(), ValidationError> {
    match tile_problem(tile, grid) {
        Some(problem) => Err(ValidationError::single("position", problem)),
        None => Ok(()),
    }
}

fn tile_problem(tile: Coords, grid: &Grid) -> Option<String> {
    if !tile.is_integral() {
        return Some("expected integral tile coordinates".to_owned());
    }
    if !grid.contains(tile) {
        return Some(outside_grid_message(grid));
    }
    None
}

fn outside_grid_message(grid: &Grid) -> String {
    format!("expected a tile inside the {}x{} grid", grid.width(), grid.height())
}

fn check_icon_ref(value: Option<&Value>, path: &str, icon_ids: &HashSet<String>, report: &mut Report) {
    match value {
        None | Some(Value::Null) => {}
        Some(Value::String(id)) => {
            if !icon_ids.contains(id) {
                report.push(path, format!("unknown icon {id:?}"));
            }
        }
        Some(_) => report.push(path, "expected a string"),
    }
}

fn check_anchors(value: Option<&Value>, path: &str, node_ids: &HashSet<String>, report: &mut Report) {
    let Some(value) = value else {
        report.push(path, "required");
        return;
    };
    let Some(anchors) = value.as_array() else {
        report.push(path, "expected an array");
        return;
    };
    if anchors.len() < 2 {
        report.push(path, "expected at least two anchors");
    }
    for (i, anchor) in anchors.iter().enumerate() {
        let anchor_path = format!("{path}[{i}]");
        let Some(obj) = anchor.as_object() else {
            report.push(anchor_path, "expected an object");
            continue;
        };
        match obj.get("type").and_then(Value::as_str) {
            Some("NODE") => {}
            Some(other) => report.push(format!("{anchor_path}.type"), format!("unsupported anchor type {other:?}")),
            None => report.push(format!("{anchor_path}.type"), "required"),
        }
        match obj.get("id").and_then(Value::as_str) {
            Some(id) if node_ids.contains(id) => {}
            Some(id) => report.push(format!("{anchor_path}.id"), format!("unknown node {id:?}")),
            None => report.push(format!("{anchor_path}.id"), "required"),
        }
    }
}

fn check_node_refs(value: Option<&Value>, path: &str, node_ids: &HashSet<String>, report: &mut Report) {
    let Some(value) = value else {
        report.push(path, "required");
        return;
    };
    let Some(refs) = value.as_array() else {
        report.push(path, "expected an array");
        return;
    };
    for (i, node_ref) in refs.iter().enumerate() {
        match node_ref.as_str() {
            Some(id) if node_ids.contains(id) => {}
            Some(id) => report.push(format!("{path}[{i}]"), format!("unknown node {id:?}")),
            None => report.push(format!("{path}[{i}]"), "expected a string"),
        }
    }
}
