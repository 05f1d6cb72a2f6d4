//! Scene management: OBJ loading, point cloud meshes, bounds and
//! shading state.

pub mod bounds;
pub mod loader;
pub mod mesh;
pub mod scene;
pub mod vertex;

pub use bounds::{BoundingBox, SceneBounds, BOX_EDGES};
pub use loader::{load_obj_meshes, MeshData};
pub use mesh::{DrawPointCloud, PointMesh};
pub use scene::{DrawMode, Scene, ShadingSettings};
pub use vertex::Vertex3D;
