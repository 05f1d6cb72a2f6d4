//! Startup configuration for the viewer application.

/// Options fixed at startup. Everything that can change at runtime
/// (lighting, draw mode, point sizing) lives in
/// [`ShadingSettings`](crate::gfx::scene::ShadingSettings) instead.
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    /// Window title.
    pub title: String,
    /// Initial window size in logical pixels.
    pub width: u32,
    pub height: u32,
    /// Target frame rate for the pacing loop.
    pub target_fps: u32,
    /// Whether the settings panel and file dialog are available.
    pub ui_enabled: bool,
    /// Camera translation speed in units per second.
    pub move_speed: f32,
    /// Radians of look rotation per pixel of mouse drag.
    pub look_sensitivity: f32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            title: "pclview".to_string(),
            width: 1200,
            height: 800,
            target_fps: 60,
            ui_enabled: true,
            move_speed: 2.0,
            look_sensitivity: 0.005,
        }
    }
}
