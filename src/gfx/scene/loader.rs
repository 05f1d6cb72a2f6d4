//! OBJ loading and conversion into flat point data.
//!
//! Parsing is delegated to `tobj`; this module only flattens the
//! parsed shapes into position/normal arrays and reconstructs normals
//! when the file carries none.

use std::path::Path;

use crate::error::ViewerError;

/// One parsed OBJ shape as flat CPU-side arrays.
#[derive(Debug, Clone)]
pub struct MeshData {
    pub name: String,
    /// Position triples, x/y/z interleaved.
    pub positions: Vec<f32>,
    /// Normal triples, same length as `positions`.
    pub normals: Vec<f32>,
}

impl MeshData {
    pub fn vertex_count(&self) -> u32 {
        (self.positions.len() / 3) as u32
    }
}

/// Parses an OBJ file into one [`MeshData`] per shape.
///
/// Material problems are logged and ignored; a parse failure or an
/// empty model list is an error.
pub fn load_obj_meshes(path: &Path) -> Result<Vec<MeshData>, ViewerError> {
    let (models, materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
    )?;

    if let Err(err) = materials {
        log::warn!("{}: material load warning: {}", path.display(), err);
    }

    if models.is_empty() {
        return Err(ViewerError::EmptyScene {
            path: path.to_path_buf(),
        });
    }

    Ok(models.into_iter().map(convert_model).collect())
}

fn convert_model(model: tobj::Model) -> MeshData {
    let mesh = model.mesh;
    let normals = if !mesh.normals.is_empty() && mesh.normals.len() == mesh.positions.len() {
        mesh.normals
    } else {
        log::debug!("shape '{}' has no usable normals, reconstructing", model.name);
        vertex_normals(&mesh.positions, &mesh.indices)
    };

    MeshData {
        name: model.name,
        positions: mesh.positions,
        normals,
    }
}

/// Area-weighted vertex normals from triangle geometry. Each face
/// normal (unnormalized cross product, so larger faces weigh more) is
/// accumulated onto its three vertices, then the sums are normalized.
/// Vertices referenced by no triangle keep a zero normal.
pub fn vertex_normals(positions: &[f32], indices: &[u32]) -> Vec<f32> {
    let mut normals = vec![0.0f32; positions.len()];

    for triangle in indices.chunks_exact(3) {
        let [i0, i1, i2] = [
            triangle[0] as usize,
            triangle[1] as usize,
            triangle[2] as usize,
        ];
        let v0 = [positions[i0 * 3], positions[i0 * 3 + 1], positions[i0 * 3 + 2]];
        let v1 = [positions[i1 * 3], positions[i1 * 3 + 1], positions[i1 * 3 + 2]];
        let v2 = [positions[i2 * 3], positions[i2 * 3 + 1], positions[i2 * 3 + 2]];

        let e1 = [v1[0] - v0[0], v1[1] - v0[1], v1[2] - v0[2]];
        let e2 = [v2[0] - v0[0], v2[1] - v0[1], v2[2] - v0[2]];
        let face = [
            e1[1] * e2[2] - e1[2] * e2[1],
            e1[2] * e2[0] - e1[0] * e2[2],
            e1[0] * e2[1] - e1[1] * e2[0],
        ];

        for &index in &[i0, i1, i2] {
            normals[index * 3] += face[0];
            normals[index * 3 + 1] += face[1];
            normals[index * 3 + 2] += face[2];
        }
    }

    for normal in normals.chunks_exact_mut(3) {
        let length =
            (normal[0] * normal[0] + normal[1] * normal[1] + normal[2] * normal[2]).sqrt();
        if length > 0.0 {
            normal[0] /= length;
            normal[1] /= length;
            normal[2] /= length;
        }
    }

    normals
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::io::Write;

    // Unit-right-triangle in the xy plane, normal +z.
    const TRIANGLE: ([f32; 9], [u32; 3]) =
        ([0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0], [0, 1, 2]);

    pub(crate) const CUBE_OBJ: &str = "\
o cube
v -1 -1 -1
v 1 -1 -1
v 1 1 -1
v -1 1 -1
v -1 -1 1
v 1 -1 1
v 1 1 1
v -1 1 1
f 1 2 3
f 1 3 4
f 5 7 6
f 5 8 7
f 1 5 6
f 1 6 2
f 4 3 7
f 4 7 8
f 1 4 8
f 1 8 5
f 2 6 7
f 2 7 3
";

    pub(crate) fn write_obj(dir: &std::path::Path, name: &str, text: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(text.as_bytes()).unwrap();
        path
    }

    #[test]
    fn reconstructed_normals_are_unit_length() {
        let (positions, indices) = TRIANGLE;
        let normals = vertex_normals(&positions, &indices);
        assert_eq!(normals.len(), positions.len());
        for normal in normals.chunks_exact(3) {
            assert_relative_eq!(normal[0], 0.0);
            assert_relative_eq!(normal[1], 0.0);
            assert_relative_eq!(normal[2], 1.0);
        }
    }

    #[test]
    fn unreferenced_vertices_keep_zero_normals() {
        let positions = [0.0f32; 9];
        let normals = vertex_normals(&positions, &[]);
        assert!(normals.iter().all(|&n| n == 0.0));
    }

    #[test]
    fn cube_loads_as_one_shape() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_obj(dir.path(), "cube.obj", CUBE_OBJ);

        let meshes = load_obj_meshes(&path).unwrap();
        assert_eq!(meshes.len(), 1);
        assert_eq!(meshes[0].vertex_count(), 8);
        // normals were reconstructed to match the positions
        assert_eq!(meshes[0].normals.len(), meshes[0].positions.len());
    }

    #[test]
    fn empty_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_obj(dir.path(), "empty.obj", "# nothing here\n");

        match load_obj_meshes(&path) {
            Err(crate::error::ViewerError::EmptyScene { .. }) => {}
            other => panic!("expected EmptyScene, got {other:?}"),
        }
    }

    #[test]
    fn missing_file_is_a_load_error() {
        let err = load_obj_meshes(std::path::Path::new("/nonexistent/missing.obj"));
        assert!(matches!(err, Err(crate::error::ViewerError::MeshLoad(_))));
    }
}
