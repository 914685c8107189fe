#![allow(clippy::float_cmp)]

use super::*;

const EPSILON: f64 = 1e-9;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn sized(width: f64, height: f64) -> Viewport {
    let mut viewport = Viewport::default();
    viewport.resize(width, height);
    viewport
}

// --- ZoomTween ---

#[test]
fn tween_starts_at_from_and_ends_at_to() {
    let mut tween = ZoomTween::new(1.0, 2.0, 300.0);
    assert_eq!(tween.value(), 1.0);
    assert!(tween.advance(300.0));
    assert_eq!(tween.value(), 2.0);
}

#[test]
fn tween_eases_out() {
    let mut tween = ZoomTween::new(0.0, 1.0, 100.0);
    tween.advance(50.0);
    // Ease-out covers more than half the distance by the halfway point.
    assert!(approx_eq(tween.value(), 0.75));
}

#[test]
fn tween_ignores_negative_steps() {
    let mut tween = ZoomTween::new(1.0, 3.0, 100.0);
    assert!(!tween.advance(-50.0));
    assert_eq!(tween.value(), 1.0);
}

#[test]
fn zero_length_tween_is_already_at_target() {
    let tween = ZoomTween::new(1.0, 4.0, 0.0);
    assert_eq!(tween.value(), 4.0);
    assert_eq!(tween.target(), 4.0);
}

// --- set_zoom ---

#[test]
fn default_zoom_is_one() {
    let viewport = Viewport::default();
    assert_eq!(viewport.zoom(), 1.0);
    assert_eq!(viewport.visual_zoom(), 1.0);
    assert!(!viewport.is_animating());
}

#[test]
fn set_zoom_updates_logical_zoom_immediately() {
    let mut viewport = Viewport::default();
    let event = viewport.set_zoom(2.0);

    assert_eq!(event, Some(SceneEvent::ZoomChanged { level: 2.0 }));
    assert_eq!(viewport.zoom(), 2.0);
    assert_eq!(viewport.visual_zoom(), 1.0);
    assert!(viewport.is_animating());
}

#[test]
fn visual_zoom_converges_after_tween() {
    let mut viewport = Viewport::default();
    viewport.set_zoom(2.0);
    viewport.advance(150.0);
    let mid = viewport.visual_zoom();
    assert!(mid > 1.0 && mid < 2.0);

    viewport.advance(150.0);
    assert_eq!(viewport.visual_zoom(), 2.0);
    assert!(!viewport.is_animating());
}

#[test]
fn new_zoom_replaces_in_flight_tween() {
    let mut viewport = Viewport::default();
    viewport.set_zoom(3.0);
    viewport.advance(150.0);
    let mid = viewport.visual_zoom();

    viewport.set_zoom(0.5);
    // The replacement starts where the old tween was, not where it was going.
    assert!(approx_eq(viewport.visual_zoom(), mid));
    viewport.advance(300.0);
    assert_eq!(viewport.visual_zoom(), 0.5);
}

#[test]
fn invalid_zoom_is_ignored() {
    let mut viewport = Viewport::default();
    assert_eq!(viewport.set_zoom(0.0), None);
    assert_eq!(viewport.set_zoom(-2.0), None);
    assert_eq!(viewport.set_zoom(f64::NAN), None);
    assert_eq!(viewport.zoom(), 1.0);
    assert!(!viewport.is_animating());
}

#[test]
fn zoom_is_clamped_to_configured_range() {
    let mut viewport = Viewport::default();
    assert_eq!(viewport.set_zoom(1000.0), Some(SceneEvent::ZoomChanged { level: 10.0 }));
    assert_eq!(viewport.set_zoom(0.001), Some(SceneEvent::ZoomChanged { level: 0.1 }));
}

#[test]
fn inverted_zoom_bounds_fall_back_to_defaults() {
    let config = EditorConfig { min_zoom: 5.0, max_zoom: 2.0, ..EditorConfig::default() };
    let mut viewport = Viewport::new(&config);
    assert_eq!(viewport.set_zoom(50.0), Some(SceneEvent::ZoomChanged { level: MAX_ZOOM }));
}

// --- scroll ---

#[test]
fn scroll_to_recenters_group() {
    let mut viewport = sized(800.0, 600.0);
    viewport.scroll_to(10.0, -20.0);
    assert_eq!(viewport.scroll(), Coords::new(10.0, -20.0));
    assert_eq!(viewport.group_position(), Coords::new(410.0, 280.0));
}

#[test]
fn scroll_is_not_animated() {
    let mut viewport = sized(800.0, 600.0);
    viewport.scroll_to(5.0, 5.0);
    assert!(!viewport.is_animating());
}

#[test]
fn scroll_delta_is_divided_by_zoom() {
    let mut viewport = sized(800.0, 600.0);
    viewport.set_zoom(2.0);
    viewport.scroll_to_delta(100.0, -50.0);
    assert_eq!(viewport.scroll(), Coords::new(50.0, -25.0));
}

#[test]
fn resize_keeps_scroll() {
    let mut viewport = sized(800.0, 600.0);
    viewport.scroll_to(30.0, 40.0);
    viewport.resize(400.0, 200.0);
    assert_eq!(viewport.scroll(), Coords::new(30.0, 40.0));
    assert_eq!(viewport.group_position(), Coords::new(230.0, 140.0));
}

// --- composed queries ---

#[test]
fn mouse_at_group_position_hits_origin_tile() {
    let mut viewport = sized(800.0, 600.0);
    viewport.scroll_to(-100.0, 40.0);
    let tile = viewport.mouse_to_tile(viewport.group_position(), &Grid::default());
    assert_eq!(tile, Coords::ZERO);
}

#[test]
fn tile_to_screen_uses_logical_zoom_during_tween() {
    let mut viewport = sized(800.0, 600.0);
    viewport.set_dom_offset(Coords::new(7.0, 9.0));
    viewport.set_zoom(2.0);
    assert_eq!(viewport.tile_to_screen(Coords::ZERO), Coords::new(807.0, 609.0));
}

#[test]
fn projection_reflects_state() {
    let mut viewport = sized(100.0, 50.0);
    viewport.set_group_offset(Coords::new(1.0, 2.0));
    viewport.scroll_to(3.0, 4.0);
    let projection = viewport.projection();
    assert_eq!(projection.scroll, Coords::new(3.0, 4.0));
    assert_eq!(projection.group_offset, Coords::new(1.0, 2.0));
    assert_eq!(projection.viewport_size, Coords::new(100.0, 50.0));
    assert_eq!(viewport.group_offset(), Coords::new(1.0, 2.0));
    assert_eq!(viewport.size(), Coords::new(100.0, 50.0));
}
