//! Core of an isometric scene editor.
//!
//! Nodes sit on the tiles of a fixed isometric grid and are joined by
//! connectors. A reactive [`store::SceneStore`] owns the validated scene and
//! publishes immutable snapshots; a [`renderer::Renderer`] mirrors them onto a
//! [`stage::Stage`], redraws it every frame, and turns pointer and viewport
//! input into [`events::SceneEvent`]s. Only [`web`] touches the browser;
//! everything else runs (and is tested) natively.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`coords`] | 2D value type shared by tiles, world and screen space |
//! | [`grid`] | Grid dimensions and tile clamping |
//! | [`transform`] | Tile/world/screen projections |
//! | [`viewport`] | Zoom (with tween), scroll and canvas size |
//! | [`events`] | Scene events and the subscriber bus |
//! | [`scene`] | Scene data model and partial updates |
//! | [`validation`] | Schema and reference checks for raw scene JSON |
//! | [`store`] | Copy-on-write scene store and editing actions |
//! | [`elements`] | Node elements indexed by tile |
//! | [`stage`] | What the renderer shows, plus pointer picking |
//! | [`render`] | Frame loop and host traits |
//! | [`renderer`] | Host-facing facade over stage, loop and events |
//! | [`web`] | `requestAnimationFrame` scheduler and canvas surface |
//! | [`config`] | Editor configuration |
//! | [`consts`] | Tile size, zoom limits, label limits |

pub mod config;
pub mod consts;
pub mod coords;
pub mod elements;
pub mod events;
pub mod grid;
pub mod render;
pub mod renderer;
pub mod scene;
pub mod stage;
pub mod store;
pub mod transform;
pub mod validation;
pub mod viewport;
pub mod web;
