//! The WGSL programs shipped with the viewer.

/// Identifies one of the built-in shader programs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderId {
    /// Instanced billboard quads for point clouds.
    Points,
    /// Plain lines for the bounding box.
    Wireframe,
}

impl ShaderId {
    pub const ALL: [ShaderId; 2] = [ShaderId::Points, ShaderId::Wireframe];

    pub fn name(&self) -> &'static str {
        match self {
            ShaderId::Points => "points",
            ShaderId::Wireframe => "wireframe",
        }
    }

    pub fn source(&self) -> &'static str {
        match self {
            ShaderId::Points => include_str!("points.wgsl"),
            ShaderId::Wireframe => include_str!("wireframe.wgsl"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::rendering::pipeline_manager::validate_wgsl;

    #[test]
    fn shipped_shaders_validate() {
        for shader in ShaderId::ALL {
            if let Err(message) = validate_wgsl(shader.source()) {
                panic!("shader '{}' failed validation: {}", shader.name(), message);
            }
        }
    }

    #[test]
    fn shaders_declare_expected_entry_points() {
        for shader in ShaderId::ALL {
            assert!(shader.source().contains("fn vs_main"));
            assert!(shader.source().contains("fn fs_main"));
        }
    }
}
