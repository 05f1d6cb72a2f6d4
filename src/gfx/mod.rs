//! Graphics stack: camera, scene data, GPU resources and rendering.

pub mod camera;
pub mod rendering;
pub mod resources;
pub mod scene;

pub use camera::CameraManager;
pub use rendering::RenderEngine;
pub use scene::Scene;
