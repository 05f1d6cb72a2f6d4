//! pclview: a small desktop viewer for OBJ files rendered as point
//! clouds.
//!
//! Geometry is loaded with `tobj` and drawn with wgpu as instanced
//! billboard quads whose screen size falls off with camera distance.
//! A fly camera (WASD plus right-mouse free look) moves through the
//! scene, and an optional ImGui panel exposes shading and point size
//! settings at runtime.

pub mod app;
pub mod config;
pub mod error;
pub mod gfx;
pub mod timing;
pub mod ui;
pub mod wgpu_utils;

pub use app::ViewerApp;
pub use config::ViewerConfig;
pub use error::ViewerError;
