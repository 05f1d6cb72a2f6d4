//! Application shell: window, event loop and per-frame orchestration.

use std::path::PathBuf;
use std::sync::Arc;

use cgmath::Vector3;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{DeviceEvent, ElementState, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowAttributes},
};

use crate::config::ViewerConfig;
use crate::error::ViewerError;
use crate::gfx::{
    camera::{CameraController, CameraManager, FlyCamera},
    rendering::RenderEngine,
    scene::Scene,
};
use crate::timing::FramePacer;
use crate::ui::{settings_panel, PanelAction, UiManager};

/// The viewer application. Wraps the winit event loop and the state
/// that lives across frames.
pub struct ViewerApp {
    event_loop: Option<EventLoop<()>>,
    state: AppState,
}

struct AppState {
    window: Option<Arc<Window>>,
    render_engine: Option<RenderEngine>,
    ui_manager: Option<UiManager>,
    scene: Scene,
    pacer: FramePacer,
    /// File load requested by the UI, applied at the top of the next
    /// frame so the scene is never swapped mid-draw.
    pending_load: Option<PathBuf>,
    config: ViewerConfig,
}

impl ViewerApp {
    pub fn new(config: ViewerConfig) -> Self {
        let event_loop = EventLoop::new().expect("Failed to create event loop");

        let aspect = config.width as f32 / config.height.max(1) as f32;
        let camera = FlyCamera::new(Vector3::new(0.0, 0.0, -1.0), aspect);
        let controller = CameraController::new(config.move_speed, config.look_sensitivity);
        let scene = Scene::new(CameraManager::new(camera, controller));

        let pacer = FramePacer::from_fps(config.target_fps);

        Self {
            event_loop: Some(event_loop),
            state: AppState {
                window: None,
                render_engine: None,
                ui_manager: None,
                scene,
                pacer,
                pending_load: None,
                config,
            },
        }
    }

    /// Loads an OBJ file before the event loop starts. Errors bubble
    /// up so the binary can exit with a parse failure status.
    pub fn load_obj(&mut self, path: &std::path::Path) -> Result<(), ViewerError> {
        self.state.scene.load(path)
    }

    /// Runs the application, consuming self and blocking until the
    /// window closes.
    pub fn run(mut self) {
        let event_loop = self.event_loop.take().expect("Event loop already consumed");
        event_loop.set_control_flow(ControlFlow::Poll);

        event_loop
            .run_app(&mut self.state)
            .expect("Failed to run event loop");
    }
}

impl AppState {
    fn apply_pending_load(&mut self) {
        let Some(path) = self.pending_load.take() else {
            return;
        };
        match self.scene.load(&path) {
            Ok(()) => {
                if let Some(engine) = self.render_engine.as_ref() {
                    self.scene.init_gpu_resources(engine.device());
                }
            }
            // keep showing the previous scene
            Err(err) => log::error!("failed to load {}: {}", path.display(), err),
        }
    }

    fn redraw(&mut self) {
        if self.render_engine.is_none() {
            return;
        }
        let Some(window) = self.window.as_ref().cloned() else {
            return;
        };

        let dt = self.pacer.pace();

        self.apply_pending_load();
        self.scene.update(dt);

        let Some(render_engine) = self.render_engine.as_mut() else {
            return;
        };

        let camera = &self.scene.camera_manager.camera;
        render_engine.update(camera.uniform, &self.scene.shading, camera.distance_to_origin());

        if let Some(ui_manager) = self.ui_manager.as_mut() {
            let loaded: Option<PathBuf> = self.scene.source_path().map(|p| p.to_path_buf());
            let stats = (self.scene.meshes.len(), self.scene.total_vertices());
            let shading = &mut self.scene.shading;

            let mut action = None;
            ui_manager.update_logic(&window, |ui| {
                action = settings_panel(ui, shading, loaded.as_deref(), stats);
            });

            match action {
                Some(PanelAction::Open(path)) => self.pending_load = Some(path),
                Some(PanelAction::Reload) => self.pending_load = loaded,
                None => {}
            }

            render_engine.render_frame(
                &self.scene,
                Some(|device: &wgpu::Device,
                      queue: &wgpu::Queue,
                      encoder: &mut wgpu::CommandEncoder,
                      view: &wgpu::TextureView| {
                    ui_manager.render_display_only(device, queue, encoder, view);
                }),
            );
        } else {
            render_engine.render_frame(
                &self.scene,
                None::<fn(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView)>,
            );
        }
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attributes = WindowAttributes::default()
            .with_title(&self.config.title)
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.config.width,
                self.config.height,
            ));

        if let Ok(window) = event_loop.create_window(attributes) {
            let window_handle = Arc::new(window);
            self.window = Some(window_handle.clone());

            let (width, height) = window_handle.inner_size().into();

            let window_clone = window_handle.clone();
            let renderer = pollster::block_on(async move {
                RenderEngine::new(window_clone, width, height).await
            });

            self.scene.init_gpu_resources(renderer.device());
            self.scene
                .camera_manager
                .camera
                .resize_projection(width, height);

            if self.config.ui_enabled {
                self.ui_manager = Some(UiManager::new(
                    renderer.device(),
                    renderer.queue(),
                    renderer.surface_format(),
                    &window_handle,
                ));
            }

            self.render_engine = Some(renderer);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let Some(window) = self.window.as_ref().cloned() else {
            return;
        };

        // UI gets first refusal on input events
        if let Some(ui_manager) = self.ui_manager.as_mut() {
            let ui_event: winit::event::Event<()> = winit::event::Event::WindowEvent {
                window_id,
                event: event.clone(),
            };
            ui_manager.handle_input(&window, &ui_event);
        }

        match event {
            WindowEvent::KeyboardInput { event: key_event, .. } => {
                let ui_wants_keyboard = self
                    .ui_manager
                    .as_ref()
                    .is_some_and(UiManager::want_capture_keyboard);
                if !ui_wants_keyboard
                    && matches!(
                        key_event.physical_key,
                        winit::keyboard::PhysicalKey::Code(winit::keyboard::KeyCode::Escape)
                    )
                {
                    event_loop.exit();
                    return;
                }
                if camera_sees_key_state(ui_wants_keyboard, key_event.state) {
                    self.scene.camera_manager.process_key_event(&key_event);
                }
            }
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                self.scene
                    .camera_manager
                    .camera
                    .resize_projection(width, height);
                if let Some(engine) = self.render_engine.as_mut() {
                    engine.resize(width, height);
                }
                if let Some(ui_manager) = self.ui_manager.as_mut() {
                    ui_manager.update_display_size(width, height);
                }
            }
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => {
                self.redraw();
            }
            _ => (),
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: winit::event::DeviceEvent,
    ) {
        let ui_captures_mouse = self
            .ui_manager
            .as_ref()
            .is_some_and(UiManager::want_capture_mouse);
        if camera_sees_device_event(ui_captures_mouse, &event) {
            self.scene.camera_manager.process_device_event(&event);
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(ref window) = self.window {
            window.request_redraw();
        }
    }
}

/// Whether a device event may reach the camera while the UI has the
/// mouse. Presses and motion are the UI's, but button releases must
/// always get through: the controller latches free look on press, and
/// a swallowed release would leave it stuck on.
fn camera_sees_device_event(ui_captures_mouse: bool, event: &DeviceEvent) -> bool {
    if !ui_captures_mouse {
        return true;
    }
    matches!(
        event,
        DeviceEvent::Button {
            state: ElementState::Released,
            ..
        }
    )
}

/// Same rule for keyboard state: key releases always reach the camera
/// so held movement keys cannot stay latched after the UI takes the
/// keyboard.
fn camera_sees_key_state(ui_captures_keyboard: bool, state: ElementState) -> bool {
    !ui_captures_keyboard || state == ElementState::Released
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::camera::CameraController;

    #[test]
    fn button_release_reaches_camera_during_ui_capture() {
        // right-drag into the settings panel, then release over it
        let mut controller = CameraController::new(2.0, 0.005);
        let press = DeviceEvent::Button {
            button: 1,
            state: ElementState::Pressed,
        };
        let release = DeviceEvent::Button {
            button: 1,
            state: ElementState::Released,
        };

        assert!(camera_sees_device_event(false, &press));
        controller.process_device_event(&press);
        assert!(controller.is_free_look());

        // cursor now over the panel; only the release may pass
        assert!(!camera_sees_device_event(true, &press));
        assert!(!camera_sees_device_event(
            true,
            &DeviceEvent::MouseMotion { delta: (4.0, 4.0) }
        ));
        assert!(camera_sees_device_event(true, &release));
        controller.process_device_event(&release);
        assert!(!controller.is_free_look());
    }

    #[test]
    fn key_release_reaches_camera_during_ui_capture() {
        assert!(camera_sees_key_state(false, ElementState::Pressed));
        assert!(camera_sees_key_state(false, ElementState::Released));
        // a held key released while an input field has focus must
        // still clear the movement intent
        assert!(!camera_sees_key_state(true, ElementState::Pressed));
        assert!(camera_sees_key_state(true, ElementState::Released));
    }
}
