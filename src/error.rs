//! Error types for the viewer.

use std::path::PathBuf;
use thiserror::Error;

/// Failures the viewer can recover from or report cleanly.
///
/// Window and GPU bring-up failures are not represented here; those
/// abort startup directly, matching how the rest of the stack treats
/// an unusable adapter or surface.
#[derive(Debug, Error)]
pub enum ViewerError {
    /// The OBJ parser rejected the file.
    #[error("failed to parse OBJ file: {0}")]
    MeshLoad(#[from] tobj::LoadError),

    /// The file parsed but produced nothing to draw.
    #[error("OBJ file '{}' contains no shapes", path.display())]
    EmptyScene { path: PathBuf },

    /// A WGSL source failed parsing or validation.
    #[error("shader '{name}' failed to compile: {message}")]
    ShaderCompile { name: String, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
