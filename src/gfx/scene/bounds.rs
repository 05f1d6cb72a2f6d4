//! Axis-aligned scene bounds and the wireframe box drawn around them.

use wgpu::util::DeviceExt;

use super::loader::MeshData;

/// Edge list for the eight box corners, as line-list index pairs.
pub const BOX_EDGES: [u32; 24] = [
    0, 1, 1, 2, 2, 3, 3, 0, // near face
    4, 5, 5, 6, 6, 7, 7, 4, // far face
    0, 4, 1, 5, 2, 6, 3, 7, // connecting edges
];

/// Axis-aligned bounding box over the loaded geometry.
///
/// The accumulator is seeded from the origin rather than from the
/// first vertex, so the box always contains (0, 0, 0) even when the
/// geometry sits entirely away from it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self {
            min: [0.0; 3],
            max: [0.0; 3],
        }
    }
}

impl BoundingBox {
    pub fn from_meshes(meshes: &[MeshData]) -> Self {
        let mut bbox = Self::default();
        for mesh in meshes {
            for position in mesh.positions.chunks_exact(3) {
                for axis in 0..3 {
                    bbox.min[axis] = bbox.min[axis].min(position[axis]);
                    bbox.max[axis] = bbox.max[axis].max(position[axis]);
                }
            }
        }
        bbox
    }

    pub fn contains(&self, point: [f32; 3]) -> bool {
        (0..3).all(|axis| point[axis] >= self.min[axis] && point[axis] <= self.max[axis])
    }

    /// The eight corners, lower z face first, counter-clockwise from
    /// the minimum corner. [`BOX_EDGES`] indexes into this order.
    pub fn corners(&self) -> [[f32; 3]; 8] {
        let (min, max) = (self.min, self.max);
        [
            [min[0], min[1], min[2]],
            [max[0], min[1], min[2]],
            [max[0], max[1], min[2]],
            [min[0], max[1], min[2]],
            [min[0], min[1], max[2]],
            [max[0], min[1], max[2]],
            [max[0], max[1], max[2]],
            [min[0], max[1], max[2]],
        ]
    }
}

/// Bounding box plus its GPU line geometry.
pub struct SceneBounds {
    pub bbox: BoundingBox,
    vertex_buffer: Option<wgpu::Buffer>,
    index_buffer: Option<wgpu::Buffer>,
}

impl SceneBounds {
    pub fn new(bbox: BoundingBox) -> Self {
        Self {
            bbox,
            vertex_buffer: None,
            index_buffer: None,
        }
    }

    /// Uploads the corner and edge buffers. Called once after load;
    /// a reload builds a fresh `SceneBounds` instead of mutating.
    pub fn upload(&mut self, device: &wgpu::Device) {
        let corners = self.bbox.corners();
        self.vertex_buffer = Some(device.create_buffer_init(
            &wgpu::util::BufferInitDescriptor {
                label: Some("Bounds Vertex Buffer"),
                contents: bytemuck::cast_slice(&corners),
                usage: wgpu::BufferUsages::VERTEX,
            },
        ));
        self.index_buffer = Some(device.create_buffer_init(
            &wgpu::util::BufferInitDescriptor {
                label: Some("Bounds Index Buffer"),
                contents: bytemuck::cast_slice(&BOX_EDGES),
                usage: wgpu::BufferUsages::INDEX,
            },
        ));
    }

    pub fn buffers(&self) -> Option<(&wgpu::Buffer, &wgpu::Buffer)> {
        self.vertex_buffer
            .as_ref()
            .zip(self.index_buffer.as_ref())
    }

    pub fn index_count(&self) -> u32 {
        BOX_EDGES.len() as u32
    }

    /// Layout for the plain position stream the wireframe shader reads.
    pub fn vertex_layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: (std::mem::size_of::<f32>() * 3) as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x3,
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mesh(positions: Vec<f32>) -> MeshData {
        let normals = vec![0.0; positions.len()];
        MeshData {
            name: "test".into(),
            positions,
            normals,
        }
    }

    #[test]
    fn box_spans_cube() {
        let mut positions = Vec::new();
        for z in [-1.0f32, 1.0] {
            for y in [-1.0f32, 1.0] {
                for x in [-1.0f32, 1.0] {
                    positions.extend_from_slice(&[x, y, z]);
                }
            }
        }
        let bbox = BoundingBox::from_meshes(&[mesh(positions)]);
        assert_eq!(bbox.min, [-1.0, -1.0, -1.0]);
        assert_eq!(bbox.max, [1.0, 1.0, 1.0]);
    }

    #[test]
    fn box_always_contains_origin() {
        // Geometry entirely in the positive octant still yields a box
        // anchored at the origin.
        let bbox = BoundingBox::from_meshes(&[mesh(vec![2.0, 3.0, 4.0, 5.0, 6.0, 7.0])]);
        assert_eq!(bbox.min, [0.0, 0.0, 0.0]);
        assert_eq!(bbox.max, [5.0, 6.0, 7.0]);
        assert!(bbox.contains([0.0, 0.0, 0.0]));
    }

    #[test]
    fn min_never_exceeds_max() {
        let bbox = BoundingBox::from_meshes(&[mesh(vec![-3.0, 1.0, -0.5])]);
        for axis in 0..3 {
            assert!(bbox.min[axis] <= bbox.max[axis]);
        }
    }

    #[test]
    fn edges_index_valid_corners() {
        assert!(BOX_EDGES.iter().all(|&i| i < 8));
        assert_eq!(BOX_EDGES.len() % 2, 0);
    }
}
