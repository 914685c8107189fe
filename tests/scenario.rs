//! End-to-end editing scenarios across store, renderer and stage.
#![allow(clippy::float_cmp)]

use std::cell::RefCell;
use std::rc::Rc;

use isoscene::config::EditorConfig;
use isoscene::coords::Coords;
use isoscene::events::SceneEvent;
use isoscene::grid::Grid;
use isoscene::render::{FrameCallback, FrameHandle, FrameScheduler, RenderError, Surface};
use isoscene::renderer::Renderer;
use isoscene::scene::{Anchor, ConnectorInput, GroupInput, NodeInput, NodeUpdate};
use isoscene::stage::Stage;
use isoscene::store::{SceneStore, StoreError};
use isoscene::transform::{tile_bounds, tile_to_world, world_to_tile};
use serde_json::{Map, Value, json};

struct Idle;

impl FrameScheduler for Idle {
    fn request_frame(&mut self, _callback: FrameCallback) -> Option<FrameHandle> {
        None
    }

    fn cancel_frame(&mut self, _handle: FrameHandle) {}
}

struct Blank;

impl Surface for Blank {
    fn flush(&mut self, _stage: &Stage) -> Result<(), RenderError> {
        Ok(())
    }
}

fn renderer() -> Renderer {
    let mut renderer = Renderer::new(&EditorConfig::default(), Box::new(Idle), Box::new(Blank));
    renderer.resize(1024.0, 768.0);
    renderer
}

fn node(id: &str, x: f64, y: f64) -> NodeInput {
    NodeInput {
        id: id.into(),
        label: format!("Node {id}"),
        description: String::new(),
        label_height: 100.0,
        icon_id: None,
        position: Coords::new(x, y),
        extra: Map::new(),
    }
}

fn center(x: f64, y: f64) -> Coords {
    tile_bounds(Coords::new(x, y)).center
}

#[test]
fn connector_follows_moved_node() {
    let mut store = SceneStore::new();
    store.create_node(node("N1", 0.0, 0.0)).unwrap();
    store.create_node(node("N2", 2.0, 0.0)).unwrap();
    let scene = store
        .create_connector(ConnectorInput { id: "C".into(), anchors: vec![Anchor::node("N1"), Anchor::node("N2")] })
        .unwrap();
    assert_eq!(scene.connectors[0].path, vec![center(0.0, 0.0), center(2.0, 0.0)]);

    let scene = store.update_node("N2", &NodeUpdate::position(Coords::new(5.0, 0.0))).unwrap();
    assert_eq!(scene.connectors[0].path.last(), Some(&center(5.0, 0.0)));
}

#[test]
fn out_of_range_pointer_clamps_to_grid_edge() {
    let grid = Grid::new(51, 51);
    let mouse = tile_to_world(Coords::new(100.0, 100.0));
    assert_eq!(world_to_tile(mouse, 1.0, Coords::ZERO, &grid), Coords::new(25.0, 25.0));
}

#[test]
fn store_to_stage_round_trip() {
    let raw = json!({
        "icons": [{"id": "server", "name": "Server", "category": "infra"}],
        "nodes": [
            {"id": "web", "label": "Web", "description": "**front**", "labelHeight": 120, "iconId": "server", "position": {"x": -3, "y": 2}},
            {"id": "db", "label": "DB", "description": "", "labelHeight": 80, "position": {"x": 4, "y": 4}, "color": "#ffcc00"}
        ],
        "connectors": [
            {"id": "web-db", "anchors": [{"type": "NODE", "id": "web"}, {"type": "NODE", "id": "db"}]}
        ],
        "groups": [{"id": "backend", "name": "Backend", "nodeIds": ["web", "db"]}]
    });

    let mut store = SceneStore::new();
    let mut renderer = renderer();
    store.subscribe(renderer.scene_listener());
    let original = store.set_scene(&raw).unwrap();

    let exported = serde_json::to_value(renderer.export_scene()).unwrap();
    let mut second = SceneStore::new();
    let reloaded = second.set_scene(&exported).unwrap();
    assert_eq!(*reloaded, *original);
    assert_eq!(reloaded.node("db").and_then(|n| n.extra.get("color")), Some(&json!("#ffcc00")));

    renderer.clear();
    assert!(renderer.stage().elements().is_empty());
}

#[test]
fn pointer_selection_reports_node_under_cursor() {
    let mut store = SceneStore::new();
    let mut renderer = renderer();
    store.subscribe(renderer.scene_listener());
    store.create_node(node("a", 1.0, 1.0)).unwrap();

    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    renderer.subscribe(move |event| sink.borrow_mut().push(event.clone()));

    renderer.scroll_to(0.0, 0.0);
    let mouse = tile_to_world(Coords::new(1.0, 1.0)) + Coords::new(512.0, 384.0);
    renderer.select_at(mouse);
    renderer.select_at(mouse + Coords::new(0.0, 400.0));

    assert_eq!(
        *events.borrow(),
        vec![SceneEvent::NodeSelected { id: "a".into() }, SceneEvent::SelectionCleared]
    );
}

#[test]
fn failed_actions_leave_snapshot_untouched() {
    let mut store = SceneStore::new();
    store.create_node(node("a", 0.0, 0.0)).unwrap();
    store.create_node(node("b", 1.0, 0.0)).unwrap();
    let before = store.scene();

    assert!(matches!(
        store.update_node("b", &NodeUpdate::position(Coords::ZERO)),
        Err(StoreError::Validation(_))
    ));
    assert!(matches!(store.update_node("ghost", &NodeUpdate::default()), Err(StoreError::NodeNotFound(_))));
    assert!(store.set_scene(&json!({"nodes": "nope"})).is_err());
    assert!(
        store
            .create_group(GroupInput { id: None, name: "g".into(), node_ids: vec!["missing".into()] })
            .is_err()
    );

    assert!(std::sync::Arc::ptr_eq(&before, &store.scene()));
}

#[test]
fn delete_node_cascades_to_connectors_and_groups() {
    let mut store = SceneStore::new();
    store.create_node(node("a", 0.0, 0.0)).unwrap();
    store.create_node(node("b", 3.0, 0.0)).unwrap();
    store
        .create_connector(ConnectorInput { id: "ab".into(), anchors: vec![Anchor::node("a"), Anchor::node("b")] })
        .unwrap();
    store
        .create_group(GroupInput { id: Some("g".into()), name: "pair".into(), node_ids: vec!["a".into(), "b".into()] })
        .unwrap();

    let scene = store.delete_node("a").unwrap();
    assert!(scene.connectors.is_empty());
    assert_eq!(scene.groups[0].node_ids, vec!["b".to_owned()]);
    let as_json: Value = serde_json::to_value(&*scene).unwrap();
    assert_eq!(as_json["nodes"].as_array().map(Vec::len), Some(1));
}
