//! Rendering: the wgpu engine, pipeline management and built-in
//! shaders.

pub mod pipeline_manager;
pub mod render_engine;
pub mod shaders;

pub use pipeline_manager::{validate_wgsl, PipelineConfig, PipelineManager, VertexStream};
pub use render_engine::RenderEngine;
pub use shaders::ShaderId;
