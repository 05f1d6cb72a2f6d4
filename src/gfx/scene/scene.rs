//! Scene state: camera, loaded point clouds, bounds and shading.

use std::path::{Path, PathBuf};

use crate::error::ViewerError;
use crate::gfx::camera::CameraManager;

use super::bounds::{BoundingBox, SceneBounds};
use super::loader::load_obj_meshes;
use super::mesh::PointMesh;

/// How point fragments are shaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawMode {
    /// Flat diffuse color, no lighting.
    Unlit,
    /// Absolute normal visualized as color.
    Normals,
    /// Lambertian diffuse plus ambient.
    Lit,
}

impl DrawMode {
    pub const ALL: [DrawMode; 3] = [DrawMode::Unlit, DrawMode::Normals, DrawMode::Lit];

    pub fn label(&self) -> &'static str {
        match self {
            DrawMode::Unlit => "Unlit",
            DrawMode::Normals => "Normals",
            DrawMode::Lit => "Lit",
        }
    }

    /// Index pushed into the uniform buffer and switched on in WGSL.
    pub fn index(&self) -> u32 {
        match self {
            DrawMode::Unlit => 0,
            DrawMode::Normals => 1,
            DrawMode::Lit => 2,
        }
    }
}

/// Lighting and point appearance, all editable from the settings panel.
#[derive(Debug, Clone, PartialEq)]
pub struct ShadingSettings {
    pub light_dir: [f32; 3],
    pub light_color: [f32; 4],
    pub ambient_color: [f32; 4],
    pub diffuse_color: [f32; 4],
    pub wire_color: [f32; 4],
    pub light_intensity: f32,
    pub draw_mode: DrawMode,
    /// Numerator of the distance-based point size.
    pub point_scale: f32,
    /// Exponent applied to the camera distance in the denominator.
    pub point_exponent: f32,
    pub show_bounds: bool,
}

impl Default for ShadingSettings {
    fn default() -> Self {
        Self {
            light_dir: [0.0, -1.0, 0.0],
            light_color: [1.0, 1.0, 1.0, 1.0],
            ambient_color: [0.01, 0.01, 0.01, 1.0],
            diffuse_color: [0.8, 0.8, 0.8, 1.0],
            wire_color: [1.0, 1.0, 1.0, 1.0],
            light_intensity: 1.0,
            draw_mode: DrawMode::Lit,
            point_scale: 20.0,
            point_exponent: 0.8,
            show_bounds: true,
        }
    }
}

impl ShadingSettings {
    /// Pixel size for a point given the camera's distance from the
    /// origin. Points shrink as the camera backs away, but sub-linearly
    /// so distant clouds stay visible.
    pub fn point_size(&self, camera_distance: f32) -> f32 {
        self.point_scale / camera_distance.max(1e-4).powf(self.point_exponent)
    }
}

/// The viewer's world: camera, point clouds and their shared bounds.
pub struct Scene {
    pub camera_manager: CameraManager,
    pub meshes: Vec<PointMesh>,
    pub bounds: SceneBounds,
    pub shading: ShadingSettings,
    source_path: Option<PathBuf>,
}

impl Scene {
    pub fn new(camera_manager: CameraManager) -> Self {
        Self {
            camera_manager,
            meshes: Vec::new(),
            bounds: SceneBounds::new(BoundingBox::default()),
            shading: ShadingSettings::default(),
            source_path: None,
        }
    }

    /// Replaces the scene content with the shapes from an OBJ file.
    ///
    /// On error the current content is left untouched. Old GPU buffers
    /// are dropped with the meshes they belong to.
    pub fn load(&mut self, path: &Path) -> Result<(), ViewerError> {
        let mesh_data = load_obj_meshes(path)?;
        let bbox = BoundingBox::from_meshes(&mesh_data);

        let total: usize = mesh_data
            .iter()
            .map(|data| data.vertex_count() as usize)
            .sum();
        log::info!(
            "loaded {}: {} shape(s), {} vertices",
            path.display(),
            mesh_data.len(),
            total
        );

        self.meshes = mesh_data.into_iter().map(PointMesh::new).collect();
        self.bounds = SceneBounds::new(bbox);
        self.source_path = Some(path.to_path_buf());
        Ok(())
    }

    /// Uploads any mesh or bounds geometry that is not on the GPU yet.
    pub fn init_gpu_resources(&mut self, device: &wgpu::Device) {
        for mesh in &mut self.meshes {
            if !mesh.is_uploaded() {
                mesh.upload(device);
            }
        }
        if self.bounds.buffers().is_none() {
            self.bounds.upload(device);
        }
    }

    /// Per-frame update, currently just the camera.
    pub fn update(&mut self, delta_time: f32) {
        self.camera_manager.update(delta_time);
    }

    pub fn total_vertices(&self) -> u32 {
        self.meshes.iter().map(PointMesh::vertex_count).sum()
    }

    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::scene::loader::tests::{write_obj, CUBE_OBJ};

    const TWO_SHAPES_OBJ: &str = "\
o first
v 0 0 0
v 1 0 0
v 0 1 0
f 1 2 3
o second
v 0 0 2
v 1 0 2
v 0 1 2
f 4 5 6
";

    fn test_scene() -> Scene {
        use crate::gfx::camera::{CameraController, FlyCamera};
        let camera = FlyCamera::new(cgmath::Vector3::new(0.0, 0.0, -1.0), 1.5);
        Scene::new(CameraManager::new(camera, CameraController::new(2.0, 0.005)))
    }

    #[test]
    fn load_replaces_previous_content() {
        let dir = tempfile::tempdir().unwrap();
        let cube = write_obj(dir.path(), "cube.obj", CUBE_OBJ);
        let pair = write_obj(dir.path(), "pair.obj", TWO_SHAPES_OBJ);

        let mut scene = test_scene();
        scene.load(&cube).unwrap();
        assert_eq!(scene.meshes.len(), 1);
        assert_eq!(scene.total_vertices(), 8);
        assert_eq!(scene.bounds.bbox.min, [-1.0, -1.0, -1.0]);

        scene.load(&pair).unwrap();
        assert_eq!(scene.meshes.len(), 2);
        assert_eq!(scene.total_vertices(), 6);
        assert_eq!(scene.bounds.bbox.max, [1.0, 1.0, 2.0]);
        assert_eq!(scene.source_path(), Some(pair.as_path()));
    }

    #[test]
    fn failed_load_leaves_scene_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let cube = write_obj(dir.path(), "cube.obj", CUBE_OBJ);

        let mut scene = test_scene();
        scene.load(&cube).unwrap();
        assert!(scene.load(Path::new("/nonexistent/missing.obj")).is_err());
        assert_eq!(scene.meshes.len(), 1);
        assert_eq!(scene.source_path(), Some(cube.as_path()));
    }

    #[test]
    fn point_size_falls_off_with_distance() {
        let shading = ShadingSettings::default();
        assert!(shading.point_size(1.0) > shading.point_size(10.0));
        // falloff is sub-linear
        assert!(shading.point_size(10.0) > shading.point_size(1.0) / 10.0);
        // degenerate distance does not blow up
        assert!(shading.point_size(0.0).is_finite());
    }
}
