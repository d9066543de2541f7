//! Floor canvas engine for restaurant floor plans.
//!
//! Compiled to WebAssembly and run in the browser, one [`engine::Engine`] per
//! canvas. The same engine backs the floor-plan builder (select, drag, resize,
//! rotate, place from the catalog) and the read-only live floor map that shows
//! per-table service status. The host wires DOM events and a clock into the
//! engine and acts on the returned [`engine::Action`]s: persisting poses,
//! opening table detail, animating camera moves.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level engine and testable [`engine::EngineCore`] |
//! | [`doc`] | Placed elements, templates, and the element store |
//! | [`camera`] | Screen/world transforms and zoom anchoring |
//! | [`viewport`] | Fit, focus, center zoom, transition timing |
//! | [`input`] | Input event types and the gesture state |
//! | [`gesture`] | Pan, pinch, wheel, and tap/long-press classification |
//! | [`manipulate`] | Move/resize sessions with grid snapping |
//! | [`hit`] | Hit-testing elements and resize handles |
//! | [`overlay`] | Adaptive status overlay layout |
//! | [`status`] | Per-table service status snapshot |
//! | [`render`] | Scene building and 2D canvas painting |
//! | [`timer`] | Host-driven timer queue (long press, transition end) |
//! | [`config`] | Tunable engine configuration |
//! | [`consts`] | Default numeric constants |
//! | [`error`] | Crate error type |

pub mod camera;
pub mod config;
pub mod consts;
pub mod doc;
pub mod engine;
pub mod error;
pub mod gesture;
pub mod hit;
pub mod input;
pub mod manipulate;
pub mod overlay;
pub mod render;
pub mod status;
pub mod timer;
pub mod viewport;
