//! WGPU-based rendering engine for the point cloud viewer.
//!
//! Owns the surface, device and the two draw pipelines (point clouds
//! and the bounding box wireframe), and records one render pass per
//! frame with an optional UI overlay on top.

use std::sync::Arc;

use wgpu::TextureFormat;

use crate::gfx::{
    camera::camera_utils::CameraUniform,
    resources::{
        global_bindings::{update_global_ubo, GlobalBindings, GlobalUbo},
        texture_resource::TextureResource,
    },
    scene::{mesh::DrawPointCloud, scene::Scene, ShadingSettings},
};

use super::pipeline_manager::{PipelineConfig, PipelineManager, VertexStream};
use super::shaders::ShaderId;

const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.1,
    g: 0.1,
    b: 0.1,
    a: 1.0,
};

pub const POINTS_PIPELINE: &str = "points";
pub const BOUNDS_PIPELINE: &str = "bounds";

/// Core rendering engine managing GPU resources and draw calls.
pub struct RenderEngine {
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    depth_texture: TextureResource,
    format: TextureFormat,
    pub pipeline_manager: PipelineManager,
    global_ubo: GlobalUbo,
    global_bindings: GlobalBindings,
}

impl RenderEngine {
    /// Creates a new render engine for the given window.
    ///
    /// # Panics
    /// Panics if unable to create the wgpu adapter or device; there is
    /// nothing useful the viewer can do without a GPU.
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
    ) -> RenderEngine {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window).unwrap();

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .expect("Failed to request adapter!");

        let (device, queue) = {
            adapter
                .request_device(&wgpu::DeviceDescriptor {
                    label: Some("WGPU Device"),
                    required_features: wgpu::Features::default(),
                    required_limits: wgpu::Limits::downlevel_defaults(),
                    memory_hints: wgpu::MemoryHints::default(),
                    trace: wgpu::Trace::Off,
                })
                .await
                .expect("Failed to request a device!")
        };

        let surface_capabilities = surface.get_capabilities(&adapter);
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .unwrap_or(surface_capabilities.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            // the frame pacer owns timing, so present immediately
            present_mode: wgpu::PresentMode::Immediate,
            alpha_mode: surface_capabilities.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_texture =
            TextureResource::create_depth_texture(&device, &config, "depth_texture");

        let device = Arc::new(device);
        let queue = Arc::new(queue);

        let global_ubo = GlobalUbo::new(&device);
        let mut global_bindings = GlobalBindings::new(&device);
        global_bindings.create_bind_group(&device, &global_ubo);

        let mut pipeline_manager = PipelineManager::new(device.clone());

        // A shader that fails validation is logged and skipped; the
        // viewer keeps running and the affected draws never happen.
        for shader in ShaderId::ALL {
            if let Err(err) = pipeline_manager.load_shader(shader) {
                log::error!("{}", err);
            }
        }

        pipeline_manager.register_pipeline(
            POINTS_PIPELINE,
            PipelineConfig::new("Point Cloud Pipeline", ShaderId::Points, format)
                .with_topology(wgpu::PrimitiveTopology::TriangleStrip)
                .with_vertex_stream(VertexStream::PointInstances)
                .with_depth_format(TextureResource::DEPTH_FORMAT)
                .with_bind_group_layouts(vec![global_bindings.layout().clone()]),
        );

        pipeline_manager.register_pipeline(
            BOUNDS_PIPELINE,
            PipelineConfig::new("Bounds Wireframe Pipeline", ShaderId::Wireframe, format)
                .with_topology(wgpu::PrimitiveTopology::LineList)
                .with_vertex_stream(VertexStream::Positions)
                .with_depth_format(TextureResource::DEPTH_FORMAT)
                .with_bind_group_layouts(vec![global_bindings.layout().clone()]),
        );

        RenderEngine {
            surface,
            device,
            queue,
            config,
            depth_texture,
            format,
            pipeline_manager,
            global_ubo,
            global_bindings,
        }
    }

    /// Updates the global uniform buffer for this frame.
    pub fn update(
        &mut self,
        camera_uniform: CameraUniform,
        shading: &ShadingSettings,
        camera_distance: f32,
    ) {
        let point_size = shading.point_size(camera_distance);
        update_global_ubo(
            &mut self.global_ubo,
            &self.queue,
            camera_uniform,
            shading,
            (self.config.width, self.config.height),
            point_size,
        );
    }

    /// Renders one frame: point clouds, the bounding box, then the
    /// optional UI overlay on top of the same surface texture.
    pub fn render_frame<F>(&mut self, scene: &Scene, ui_callback: Option<F>)
    where
        F: FnOnce(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView),
    {
        let surface_texture = self
            .surface
            .get_current_texture()
            .expect("Failed to get surface texture!");

        let surface_texture_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Main Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_texture_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_bind_group(0, self.global_bindings.bind_group(), &[]);

            if let Some(pipeline) = self.pipeline_manager.get_pipeline(POINTS_PIPELINE) {
                render_pass.set_pipeline(pipeline);
                for mesh in &scene.meshes {
                    render_pass.draw_point_mesh(mesh);
                }
            }

            if scene.shading.show_bounds {
                if let Some(pipeline) = self.pipeline_manager.get_pipeline(BOUNDS_PIPELINE) {
                    if let Some((vertices, indices)) = scene.bounds.buffers() {
                        render_pass.set_pipeline(pipeline);
                        render_pass.set_vertex_buffer(0, vertices.slice(..));
                        render_pass
                            .set_index_buffer(indices.slice(..), wgpu::IndexFormat::Uint32);
                        render_pass.draw_indexed(0..scene.bounds.index_count(), 0, 0..1);
                    }
                }
            }
        }

        if let Some(callback) = ui_callback {
            callback(
                &self.device,
                &self.queue,
                &mut encoder,
                &surface_texture_view,
            );
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
    }

    /// Resizes the surface and recreates the depth buffer. Zero-sized
    /// requests (minimized window) are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }

        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth_texture =
            TextureResource::create_depth_texture(&self.device, &self.config, "depth_texture");
    }

    pub fn surface_size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    pub fn surface_format(&self) -> TextureFormat {
        self.format
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }
}
