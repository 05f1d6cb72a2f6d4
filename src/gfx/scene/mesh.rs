//! GPU-side point cloud mesh and its draw helper.

use wgpu::util::DeviceExt;

use super::loader::MeshData;
use super::vertex::Vertex3D;

/// One OBJ shape rendered as a cloud of screen-space points.
///
/// The vertex data is fed to the pipeline as an instance stream, one
/// instance per point, with the billboard corners generated in the
/// vertex shader.
pub struct PointMesh {
    pub name: String,
    vertices: Vec<Vertex3D>,
    vertex_count: u32,
    vertex_buffer: Option<wgpu::Buffer>,
}

impl PointMesh {
    pub fn new(data: MeshData) -> Self {
        let vertices: Vec<Vertex3D> = data
            .positions
            .chunks_exact(3)
            .zip(data.normals.chunks_exact(3))
            .map(|(position, normal)| Vertex3D {
                position: [position[0], position[1], position[2]],
                normal: [normal[0], normal[1], normal[2]],
            })
            .collect();

        Self {
            name: data.name,
            vertex_count: vertices.len() as u32,
            vertices,
            vertex_buffer: None,
        }
    }

    /// Uploads the instance buffer. Point data never changes after
    /// load, so this is a write-once buffer.
    pub fn upload(&mut self, device: &wgpu::Device) {
        self.vertex_buffer = Some(device.create_buffer_init(
            &wgpu::util::BufferInitDescriptor {
                label: Some(&format!("Point Mesh Buffer ({})", self.name)),
                contents: bytemuck::cast_slice(&self.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            },
        ));
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    pub fn is_uploaded(&self) -> bool {
        self.vertex_buffer.is_some()
    }
}

/// Draw helper in the style of a `DrawModel` trait: lets a render
/// pass consume a [`PointMesh`] directly.
pub trait DrawPointCloud<'a> {
    fn draw_point_mesh(&mut self, mesh: &'a PointMesh);
}

impl<'a, 'b> DrawPointCloud<'b> for wgpu::RenderPass<'a>
where
    'b: 'a,
{
    fn draw_point_mesh(&mut self, mesh: &'b PointMesh) {
        if let Some(buffer) = &mesh.vertex_buffer {
            self.set_vertex_buffer(0, buffer.slice(..));
            // four strip corners per instance, one instance per point
            self.draw(0..4, 0..mesh.vertex_count);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_count_matches_positions() {
        let data = MeshData {
            name: "tri".into(),
            positions: vec![0.0; 9],
            normals: vec![0.0; 9],
        };
        let mesh = PointMesh::new(data);
        assert_eq!(mesh.vertex_count(), 3);
        assert!(!mesh.is_uploaded());
    }
}
