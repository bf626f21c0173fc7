//! Interactive canvas input for the browser raster editor.
//!
//! This crate is compiled to WebAssembly and runs in the browser. It turns
//! pointer, wheel and toolbar input into a live stroke preview on a
//! transparent overlay canvas, zooms the stack of layer images, and posts
//! finished strokes and bucket fills to the raster server. The server owns
//! the pixels; after each operation the active layer's image is reloaded and
//! the preview is cleared once the new image arrives. The host JavaScript
//! layer only wires DOM events to [`bridge::PaintEditor`].
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level engine and testable [`engine::EngineCore`] |
//! | [`input`] | Pointer capture state machine for strokes and fills |
//! | [`tool`] | Active tool, per-tool colors and stroke size |
//! | [`mapper`] | Client-to-canvas coordinate mapping with device pixel ratio |
//! | [`viewport`] | Zoom level and pivot for the image stack |
//! | [`sync`] | Stroke and fill requests and the HTTP seam |
//! | [`layer`] | Active layer lookup and cache-busted reloads |
//! | [`config`] | Editor configuration loaded from the host |
//! | [`color`] | `#rrggbb` colors |
//! | [`consts`] | Shared constants (zoom limits, defaults, endpoints) |
//! | `render` | Overlay drawing and DOM updates (`hydrate` only) |
//! | `net` | `gloo-net` transport (`hydrate` only) |
//! | `bridge` | `wasm-bindgen` entry point (`hydrate` only) |

pub mod color;
pub mod config;
pub mod consts;
pub mod engine;
pub mod input;
pub mod layer;
pub mod mapper;
pub mod sync;
pub mod tool;
pub mod viewport;

#[cfg(feature = "hydrate")]
pub mod bridge;
#[cfg(feature = "hydrate")]
pub mod net;
#[cfg(feature = "hydrate")]
pub mod render;
