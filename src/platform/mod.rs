//! Platform layer
//!
//! Browser bindings live in `web` and only build for wasm32. The core
//! (`fx`, `rank`, `camera`, `stage`) never depends on them.

#[cfg(target_arch = "wasm32")]
pub mod web;
