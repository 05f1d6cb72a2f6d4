//! Shared GPU resources: the global uniform block and depth textures.

pub mod global_bindings;
pub mod texture_resource;

pub use global_bindings::{update_global_ubo, GlobalBindings, GlobalUbo, GlobalUboContent};
pub use texture_resource::TextureResource;
