//! The per-frame uniform block shared by every pipeline.

use crate::gfx::camera::CameraUniform;
use crate::gfx::scene::ShadingSettings;
use crate::wgpu_utils::UniformBuffer;

/// Contents of the global uniform buffer.
///
/// Field order and padding must match the `Globals` struct declared in
/// both WGSL programs; the vec4/mat4 fields keep everything on 16-byte
/// boundaries until the trailing scalars.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlobalUboContent {
    pub view_position: [f32; 4],
    pub view_proj: [[f32; 4]; 4],
    pub light_dir: [f32; 4],
    pub light_color: [f32; 4],
    pub ambient_color: [f32; 4],
    pub diffuse_color: [f32; 4],
    pub wire_color: [f32; 4],
    pub viewport: [f32; 2],
    pub light_intensity: f32,
    pub point_size: f32,
    pub draw_mode: u32,
    pub _padding: [u32; 3],
}

pub type GlobalUbo = UniformBuffer<GlobalUboContent>;

/// Packs camera and shading state into the uniform buffer. The buffer
/// wrapper skips the GPU write when nothing changed since last frame.
pub fn update_global_ubo(
    ubo: &mut GlobalUbo,
    queue: &wgpu::Queue,
    camera: CameraUniform,
    shading: &ShadingSettings,
    viewport: (u32, u32),
    point_size: f32,
) {
    let light_dir = shading.light_dir;
    ubo.update_content(
        queue,
        GlobalUboContent {
            view_position: camera.view_position,
            view_proj: camera.view_proj,
            light_dir: [light_dir[0], light_dir[1], light_dir[2], 0.0],
            light_color: shading.light_color,
            ambient_color: shading.ambient_color,
            diffuse_color: shading.diffuse_color,
            wire_color: shading.wire_color,
            viewport: [viewport.0 as f32, viewport.1 as f32],
            light_intensity: shading.light_intensity,
            point_size,
            draw_mode: shading.draw_mode.index(),
            _padding: [0; 3],
        },
    );
}

/// Bind group layout and bind group for the global uniform block,
/// always bound at group 0.
pub struct GlobalBindings {
    layout: wgpu::BindGroupLayout,
    bind_group: Option<wgpu::BindGroup>,
}

impl GlobalBindings {
    pub fn new(device: &wgpu::Device) -> Self {
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Global Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        Self {
            layout,
            bind_group: None,
        }
    }

    pub fn create_bind_group(&mut self, device: &wgpu::Device, ubo: &GlobalUbo) {
        self.bind_group = Some(device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Global Bind Group"),
            layout: &self.layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: ubo.binding_resource(),
            }],
        }));
    }

    pub fn layout(&self) -> &wgpu::BindGroupLayout {
        &self.layout
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        self.bind_group
            .as_ref()
            .expect("create_bind_group must be called first")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ubo_content_size_matches_wgsl_layout() {
        // 7 vec4s + mat4 + vec2 + 3 scalars + padding
        assert_eq!(std::mem::size_of::<GlobalUboContent>(), 192);
    }
}
