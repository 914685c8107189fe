use serde_json::{Value, json};

use super::*;
use crate::coords::Coords;
use crate::scene::{Anchor, Node};

fn valid_scene() -> Value {
    json!({
        "icons": [{"id": "server", "name": "Server", "url": "https://example.com/server.svg"}],
        "nodes": [
            {"id": "n1", "label": "A", "description": "", "labelHeight": 100, "iconId": "server", "position": {"x": 0, "y": 0}},
            {"id": "n2", "label": "B", "description": "*md*", "labelHeight": 60, "position": {"x": 2, "y": 0}}
        ],
        "connectors": [{"id": "c1", "anchors": [{"type": "NODE", "id": "n1"}, {"type": "NODE", "id": "n2"}]}],
        "groups": [{"id": "g1", "name": "pair", "nodeIds": ["n1", "n2"]}]
    })
}

fn paths(err: &ValidationError) -> Vec<&str> {
    err.violations.iter().map(|v| v.path.as_str()).collect()
}

// =============================================================
// validate_scene
// =============================================================

#[test]
fn valid_scene_passes() {
    let input = validate_scene(&valid_scene(), &Grid::default()).unwrap();
    assert_eq!(input.nodes.len(), 2);
    assert_eq!(input.connectors[0].anchors[1], Anchor::node("n2"));
    assert_eq!(input.groups[0].id.as_deref(), Some("g1"));
    assert_eq!(input.icons[0].name.as_deref(), Some("Server"));
}

#[test]
fn empty_scene_passes() {
    let input = validate_scene(&json!({"nodes": [], "connectors": [], "groups": [], "icons": []}), &Grid::default()).unwrap();
    assert!(input.nodes.is_empty());
}

#[test]
fn non_object_is_rejected() {
    let err = validate_scene(&json!([1, 2]), &Grid::default()).unwrap_err();
    assert_eq!(paths(&err), vec!["$"]);
}

#[test]
fn missing_collections_are_each_reported() {
    let err = validate_scene(&json!({"nodes": "nope"}), &Grid::default()).unwrap_err();
    assert_eq!(paths(&err), vec!["icons", "nodes", "connectors", "groups"]);
}

#[test]
fn every_node_violation_is_listed() {
    let mut scene = valid_scene();
    scene["nodes"][0]["labelHeight"] = json!(500);
    scene["nodes"][1]["label"] = json!(7);
    scene["nodes"][1]["position"] = json!({"x": 1.5, "y": "a"});
    let err = validate_scene(&scene, &Grid::default()).unwrap_err();
    assert_eq!(
        paths(&err),
        vec!["nodes[0].labelHeight", "nodes[1].label", "nodes[1].position.x", "nodes[1].position.y"]
    );
}

#[test]
fn duplicate_node_ids_are_rejected() {
    let mut scene = valid_scene();
    scene["nodes"][1]["id"] = json!("n1");
    let err = validate_scene(&scene, &Grid::default()).unwrap_err();
    assert!(err.violations.iter().any(|v| v.path == "nodes[1].id" && v.message.contains("duplicate")));
}

#[test]
fn two_nodes_on_one_tile_are_rejected() {
    let mut scene = valid_scene();
    scene["nodes"][1]["position"] = json!({"x": 0, "y": 0});
    let err = validate_scene(&scene, &Grid::default()).unwrap_err();
    assert_eq!(paths(&err), vec!["nodes[1].position"]);
}

#[test]
fn nodes_outside_the_grid_are_rejected() {
    let mut scene = valid_scene();
    scene["nodes"][1]["position"] = json!({"x": 100, "y": 100});
    let err = validate_scene(&scene, &Grid::default()).unwrap_err();
    assert_eq!(paths(&err), vec!["nodes[1].position"]);
    assert!(err.violations[0].message.contains("51x51"));
}

#[test]
fn unknown_icon_is_rejected() {
    let mut scene = valid_scene();
    scene["nodes"][0]["iconId"] = json!("router");
    let err = validate_scene(&scene, &Grid::default()).unwrap_err();
    assert_eq!(paths(&err), vec!["nodes[0].iconId"]);
}

#[test]
fn dangling_anchor_and_bad_type_are_both_reported() {
    let mut scene = valid_scene();
    scene["connectors"][0]["anchors"][0] = json!({"type": "TILE", "id": "ghost"});
    let err = validate_scene(&scene, &Grid::default()).unwrap_err();
    assert_eq!(paths(&err), vec!["connectors[0].anchors[0].type", "connectors[0].anchors[0].id"]);
}

#[test]
fn single_anchor_connector_is_rejected() {
    let mut scene = valid_scene();
    scene["connectors"][0]["anchors"] = json!([{"type": "NODE", "id": "n1"}]);
    let err = validate_scene(&scene, &Grid::default()).unwrap_err();
    assert_eq!(paths(&err), vec!["connectors[0].anchors"]);
}

#[test]
fn group_with_unknown_node_is_rejected() {
    let mut scene = valid_scene();
    scene["groups"][0]["nodeIds"] = json!(["n1", "n9"]);
    let err = validate_scene(&scene, &Grid::default()).unwrap_err();
    assert_eq!(paths(&err), vec!["groups[0].nodeIds[1]"]);
}

#[test]
fn connector_path_field_is_accepted_and_ignored() {
    let mut scene = valid_scene();
    scene["connectors"][0]["path"] = json!([{"x": 999, "y": 999}]);
    assert!(validate_scene(&scene, &Grid::default()).is_ok());
}

#[test]
fn error_display_lists_all_violations() {
    let mut scene = valid_scene();
    scene["nodes"][0]["id"] = json!("");
    scene["icons"][0]["id"] = json!(3);
    scene["nodes"][0]["iconId"] = Value::Null;
    let err = validate_scene(&scene, &Grid::default()).unwrap_err();
    let text = err.to_string();
    assert!(text.starts_with("invalid scene (2 violation(s))"));
    assert!(text.contains("icons[0].id"));
    assert!(text.contains("nodes[0].id"));
}

// =============================================================
// Incremental inputs
// =============================================================

fn scene_with_node() -> Scene {
    Scene { nodes: vec![Node::new("n1", Coords::ZERO)], ..Scene::default() }
}

fn node_input(id: &str, x: f64, y: f64) -> NodeInput {
    NodeInput {
        id: id.into(),
        label: String::new(),
        description: String::new(),
        label_height: 100.0,
        icon_id: None,
        position: Coords::new(x, y),
        extra: Map::new(),
    }
}

#[test]
fn node_input_on_free_tile_passes() {
    assert!(validate_node_input(&node_input("n2", 1.0, 0.0), &scene_with_node(), &Grid::default()).is_ok());
}

#[test]
fn node_input_collects_all_problems() {
    let mut input = node_input("n1", 0.0, 0.0);
    input.label_height = 10.0;
    input.icon_id = Some("nope".into());
    let err = validate_node_input(&input, &scene_with_node(), &Grid::default()).unwrap_err();
    assert_eq!(paths(&err), vec!["id", "labelHeight", "position", "iconId"]);
}

#[test]
fn node_input_rejects_fractional_tile() {
    let err = validate_node_input(&node_input("n2", 0.5, 0.0), &scene_with_node(), &Grid::default()).unwrap_err();
    assert_eq!(paths(&err), vec!["position"]);
}

#[test]
fn node_input_rejects_off_grid_and_non_finite_tiles() {
    let err = validate_node_input(&node_input("n2", 26.0, 0.0), &scene_with_node(), &Grid::default()).unwrap_err();
    assert_eq!(paths(&err), vec!["position"]);
    let err = validate_node_input(&node_input("n2", f64::NAN, 1.0), &scene_with_node(), &Grid::default()).unwrap_err();
    assert_eq!(paths(&err), vec!["position"]);
}

#[test]
fn validate_tile_accepts_grid_edges_only() {
    let grid = Grid::new(5, 5);
    assert!(validate_tile(Coords::new(-2.0, 2.0), &grid).is_ok());
    assert!(validate_tile(Coords::new(3.0, 0.0), &grid).is_err());
    assert!(validate_tile(Coords::new(1.5, 0.0), &grid).is_err());
}

#[test]
fn connector_input_checks_anchors() {
    let input = ConnectorInput { id: "c".into(), anchors: vec![Anchor::node("n1"), Anchor::node("n7")] };
    let err = validate_connector_input(&input, &scene_with_node()).unwrap_err();
    assert_eq!(paths(&err), vec!["anchors[1].id"]);
}

#[test]
fn group_input_checks_node_ids() {
    let ok = GroupInput { id: None, name: "x".into(), node_ids: vec!["n1".into()] };
    assert!(validate_group_input(&ok, &scene_with_node()).is_ok());

    let bad = GroupInput { id: Some(String::new()), name: String::new(), node_ids: vec!["zz".into()] };
    let err = validate_group_input(&bad, &scene_with_node()).unwrap_err();
    assert_eq!(paths(&err), vec!["id", "nodeIds[0]"]);
}
