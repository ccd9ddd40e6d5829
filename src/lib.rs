//! Layer, transform and interaction engine for the image/text composer canvas.
//!
//! This crate is compiled to WebAssembly and runs in the browser. It owns the
//! layer data model, turns each layer's style into a composed 3D transform and
//! clip region, drives drag-to-move and drag-to-crop gestures from raw pointer
//! events, and decides which layers actually need repainting each frame. The
//! host application owns ingestion (uploads, templates), the style panels and
//! persistence; it consumes the [`engine::Action`]s emitted here.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level engine and testable [`engine::EngineCore`] |
//! | [`doc`] | Layer model, style records and the ordered layer store |
//! | [`compose`] | Pure style → transform/clip/appearance composition |
//! | [`gate`] | Render gate: skip-or-redraw decisions per layer |
//! | [`input`] | Gesture state machine (drag, crop) and selection |
//! | [`hit`] | Pointer targets (layer body, crop handle) |
//! | [`render`] | Scene construction in paint order |
//! | [`dom`] | Browser surface: paints scenes, owns gesture listeners |
//! | [`config`] | Host-supplied canvas configuration |
//! | [`geom`] | Points and sizes |
//! | [`consts`] | Shared numeric constants (perspective, crop limits, etc.) |

pub mod compose;
pub mod config;
pub mod consts;
pub mod doc;
pub mod dom;
pub mod engine;
pub mod gate;
pub mod geom;
pub mod hit;
pub mod input;
pub mod render;
