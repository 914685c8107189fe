#![allow(clippy::float_cmp)]

use super::*;

#[test]
fn defaults_match_constants() {
    let config = EditorConfig::default();
    assert_eq!(config.grid_width, 51);
    assert_eq!(config.grid_height, 51);
    assert_eq!(config.zoom_tween_ms, 300.0);
    assert!(config.validate().is_ok());
}

#[test]
fn empty_object_uses_defaults() {
    let config = EditorConfig::from_json("{}").unwrap();
    assert_eq!(config, EditorConfig::default());
}

#[test]
fn partial_override_keeps_other_defaults() {
    let config = EditorConfig::from_json(r#"{"gridWidth": 11, "zoomTweenMs": 0}"#).unwrap();
    assert_eq!(config.grid_width, 11);
    assert_eq!(config.grid_height, 51);
    assert_eq!(config.zoom_tween_ms, 0.0);
    assert_eq!(config.grid().half_extent().x, 5.0);
}

#[test]
fn malformed_json_is_rejected() {
    let err = EditorConfig::from_json("{gridWidth").unwrap_err();
    assert!(matches!(err, ConfigError::Json(_)));
}

#[test]
fn zero_grid_is_rejected() {
    let err = EditorConfig::from_json(r#"{"gridHeight": 0}"#).unwrap_err();
    assert!(matches!(err, ConfigError::EmptyGrid { width: 51, height: 0 }));
}

#[test]
fn inverted_zoom_bounds_are_rejected() {
    let err = EditorConfig::from_json(r#"{"minZoom": 4, "maxZoom": 2}"#).unwrap_err();
    assert!(matches!(err, ConfigError::ZoomBounds { .. }));
}

#[test]
fn negative_tween_is_rejected() {
    let err = EditorConfig::from_json(r#"{"zoomTweenMs": -1}"#).unwrap_err();
    assert!(matches!(err, ConfigError::TweenDuration(_)));
    assert!(err.to_string().contains("-1"));
}
