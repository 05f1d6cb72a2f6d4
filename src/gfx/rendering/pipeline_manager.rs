//! Render pipeline management for wgpu.
//!
//! Pipelines are registered as configurations and created lazily on
//! first use. Shader sources are validated with naga before a module
//! is handed to the device, so a broken shader surfaces as a logged
//! error and a missing pipeline rather than a device loss.

use std::{collections::HashMap, sync::Arc};

use crate::error::ViewerError;
use crate::gfx::scene::bounds::SceneBounds;
use crate::gfx::scene::vertex::Vertex3D;

use super::shaders::ShaderId;

/// Upper bound on the shader diagnostic text kept in logs.
const MAX_SHADER_LOG: usize = 1024;

/// Which vertex stream layout a pipeline consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexStream {
    /// Per-instance position/normal pairs, corners from vertex_index.
    PointInstances,
    /// Plain per-vertex positions.
    Positions,
}

impl VertexStream {
    fn layout(&self) -> wgpu::VertexBufferLayout<'static> {
        match self {
            VertexStream::PointInstances => Vertex3D::instance_layout(),
            VertexStream::Positions => SceneBounds::vertex_layout(),
        }
    }
}

/// Configuration for creating a render pipeline.
#[derive(Clone)]
pub struct PipelineConfig {
    pub label: String,
    pub shader: ShaderId,
    pub topology: wgpu::PrimitiveTopology,
    pub vertex_stream: VertexStream,
    pub color_format: wgpu::TextureFormat,
    pub depth_format: Option<wgpu::TextureFormat>,
    pub bind_group_layouts: Vec<wgpu::BindGroupLayout>,
}

impl PipelineConfig {
    pub fn new(label: &str, shader: ShaderId, color_format: wgpu::TextureFormat) -> Self {
        Self {
            label: label.to_string(),
            shader,
            topology: wgpu::PrimitiveTopology::TriangleList,
            vertex_stream: VertexStream::PointInstances,
            color_format,
            depth_format: None,
            bind_group_layouts: Vec::new(),
        }
    }

    pub fn with_topology(mut self, topology: wgpu::PrimitiveTopology) -> Self {
        self.topology = topology;
        self
    }

    pub fn with_vertex_stream(mut self, stream: VertexStream) -> Self {
        self.vertex_stream = stream;
        self
    }

    pub fn with_depth_format(mut self, format: wgpu::TextureFormat) -> Self {
        self.depth_format = Some(format);
        self
    }

    pub fn with_bind_group_layouts(mut self, layouts: Vec<wgpu::BindGroupLayout>) -> Self {
        self.bind_group_layouts = layouts;
        self
    }
}

/// Manages shader modules and render pipelines with lazy creation.
pub struct PipelineManager {
    device: Arc<wgpu::Device>,
    shader_modules: HashMap<ShaderId, wgpu::ShaderModule>,
    pipeline_configs: HashMap<String, PipelineConfig>,
    pipelines: HashMap<String, wgpu::RenderPipeline>,
}

impl PipelineManager {
    pub fn new(device: Arc<wgpu::Device>) -> Self {
        Self {
            device,
            shader_modules: HashMap::new(),
            pipeline_configs: HashMap::new(),
            pipelines: HashMap::new(),
        }
    }

    /// Validates and compiles one of the built-in shaders.
    ///
    /// On a validation failure the module is not created; the caller
    /// decides whether that is fatal. Pipelines referencing the shader
    /// will simply never become available.
    pub fn load_shader(&mut self, shader: ShaderId) -> Result<(), ViewerError> {
        if let Err(message) = validate_wgsl(shader.source()) {
            return Err(ViewerError::ShaderCompile {
                name: shader.name().to_string(),
                message: cap(&message, MAX_SHADER_LOG),
            });
        }

        let module = self
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(shader.name()),
                source: wgpu::ShaderSource::Wgsl(shader.source().into()),
            });
        self.shader_modules.insert(shader, module);
        Ok(())
    }

    /// Registers a pipeline configuration without creating it.
    pub fn register_pipeline(&mut self, name: &str, config: PipelineConfig) {
        self.pipeline_configs.insert(name.to_string(), config);
    }

    /// Gets or creates a pipeline.
    ///
    /// Returns `None` when the config is missing or its shader never
    /// compiled; callers skip the corresponding draw in that case.
    pub fn get_pipeline(&mut self, name: &str) -> Option<&wgpu::RenderPipeline> {
        if self.pipelines.contains_key(name) {
            return self.pipelines.get(name);
        }

        let config = self.pipeline_configs.get(name)?.clone();
        match self.create_pipeline(name, &config) {
            Some(pipeline) => {
                self.pipelines.insert(name.to_string(), pipeline);
                self.pipelines.get(name)
            }
            None => None,
        }
    }

    fn create_pipeline(&self, name: &str, config: &PipelineConfig) -> Option<wgpu::RenderPipeline> {
        let shader = match self.shader_modules.get(&config.shader) {
            Some(module) => module,
            None => {
                log::warn!(
                    "pipeline '{}' skipped: shader '{}' is not loaded",
                    name,
                    config.shader.name()
                );
                return None;
            }
        };

        let bind_group_layout_refs: Vec<&wgpu::BindGroupLayout> =
            config.bind_group_layouts.iter().collect();
        let pipeline_layout = self
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some(&format!("{} Layout", name)),
                bind_group_layouts: &bind_group_layout_refs,
                push_constant_ranges: &[],
            });

        let depth_stencil = config
            .depth_format
            .map(|format| wgpu::DepthStencilState {
                format,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            });

        let pipeline = self
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(&config.label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: shader,
                    entry_point: Some("vs_main"),
                    buffers: &[config.vertex_stream.layout()],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: config.color_format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: config.topology,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    // billboard quads face the camera either way
                    cull_mode: None,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil,
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            });

        Some(pipeline)
    }

    /// Checks if a pipeline configuration is registered.
    pub fn has_pipeline(&self, name: &str) -> bool {
        self.pipeline_configs.contains_key(name)
    }
}

/// Parses and validates WGSL without touching the device.
pub fn validate_wgsl(source: &str) -> Result<(), String> {
    let module = naga::front::wgsl::parse_str(source).map_err(|err| err.emit_to_string(source))?;
    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    );
    validator
        .validate(&module)
        .map(|_| ())
        .map_err(|err| format!("{err:?}"))
}

fn cap(message: &str, limit: usize) -> String {
    if message.len() <= limit {
        return message.to_string();
    }
    let mut end = limit;
    while end > 0 && !message.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... (truncated)", &message[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_wgsl_passes() {
        let source = "\
@vertex
fn vs_main(@builtin(vertex_index) index: u32) -> @builtin(position) vec4<f32> {
    return vec4<f32>(0.0, 0.0, 0.0, 1.0);
}
";
        assert!(validate_wgsl(source).is_ok());
    }

    #[test]
    fn broken_wgsl_is_rejected() {
        assert!(validate_wgsl("fn vs_main( -> {").is_err());
    }

    #[test]
    fn type_errors_are_caught_by_validation() {
        // parses fine but the return type is wrong
        let source = "\
@vertex
fn vs_main() -> @builtin(position) vec4<f32> {
    return 1.0;
}
";
        assert!(validate_wgsl(source).is_err());
    }

    #[test]
    fn diagnostics_are_capped() {
        let long = "é".repeat(2000);
        let capped = cap(&long, MAX_SHADER_LOG);
        assert!(capped.len() <= MAX_SHADER_LOG + "... (truncated)".len());
        assert!(capped.ends_with("(truncated)"));
    }
}
