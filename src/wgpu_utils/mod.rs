//! Small wgpu helpers shared across the renderer.

pub mod uniform_buffer;

pub use uniform_buffer::UniformBuffer;
