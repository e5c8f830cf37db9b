//! Asset import
//!
//! File-format concerns live here: OBJ geometry, MTL material skimming, and
//! image decoding. The scene core consumes geometry through the
//! [`MeshImporter`] capability so document loading never hard-codes a format.

pub mod image_loader;
pub mod obj_loader;

pub use image_loader::ImageData;
pub use obj_loader::ObjImporter;

use crate::render::mesh::Mesh;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Mesh-import capability consumed during scene loading
///
/// Given a path (relative to the implementation's asset root), produce a
/// mesh of one or more sub-meshes with any material texture paths the file
/// referenced.
pub trait MeshImporter {
    /// Import the mesh stored at `path`
    fn import(&self, path: &Path) -> Result<Mesh, AssetError>;
}

/// Resolve an asset path against a root, leaving absolute paths alone
pub(crate) fn resolve_path(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

/// Asset loading errors
#[derive(Error, Debug)]
pub enum AssetError {
    /// An asset file could not be read
    #[error("failed to read asset {}", .path.display())]
    Read {
        /// Offending path
        path: PathBuf,
        /// Underlying I/O failure
        source: std::io::Error,
    },

    /// OBJ data that could not be parsed
    #[error("malformed OBJ data: {0}")]
    ObjParse(String),

    /// An OBJ file with no usable faces
    #[error("OBJ data contains no geometry")]
    NoGeometry,

    /// Image data that could not be decoded
    #[error("failed to decode image {}", .path.display())]
    ImageDecode {
        /// Offending path
        path: PathBuf,
        /// Underlying decoder failure
        source: image::ImageError,
    },
}
