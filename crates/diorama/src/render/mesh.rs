//! Mesh data structures
//!
//! Meshes hold CPU-side geometry only; GPU residency is the renderer's
//! business via [`GraphicsDevice`](crate::render::GraphicsDevice). A mesh
//! loaded from a file remembers its source path so scene documents can
//! reference it instead of embedding geometry.

use crate::foundation::math::Vec3;
use std::path::{Path, PathBuf};

/// Vertex data for 3D meshes
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    /// Position in 3D space
    pub position: [f32; 3],
    /// Normal vector
    pub normal: [f32; 3],
    /// Texture coordinates
    pub tex_coord: [f32; 2],
}

/// One draw call's worth of geometry
#[derive(Debug, Clone)]
pub struct SubMesh {
    /// Vertex data
    pub vertices: Vec<Vertex>,
    /// Triangle indices into `vertices`
    pub indices: Vec<u32>,
    /// Diffuse texture path the source material referenced, if any
    pub texture: Option<PathBuf>,
}

/// Conservative spherical bound of a mesh's local-space extent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    /// Sphere center in mesh local space
    pub center: Vec3,
    /// Sphere radius
    pub radius: f32,
}

/// A complete mesh: one or more sub-meshes plus an optional source path
#[derive(Debug, Clone)]
pub struct Mesh {
    submeshes: Vec<SubMesh>,
    source: Option<PathBuf>,
}

impl Mesh {
    /// Build a mesh from sub-meshes
    ///
    /// `source` is the project-relative path the mesh was imported from;
    /// procedural meshes pass `None` and cannot be referenced from scene
    /// documents.
    pub fn from_submeshes(submeshes: Vec<SubMesh>, source: Option<PathBuf>) -> Self {
        Self { submeshes, source }
    }

    /// The sub-meshes making up this mesh
    pub fn submeshes(&self) -> &[SubMesh] {
        &self.submeshes
    }

    /// The path this mesh was imported from, if any
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Total vertex count across sub-meshes
    pub fn vertex_count(&self) -> usize {
        self.submeshes.iter().map(|s| s.vertices.len()).sum()
    }

    /// Total triangle count across sub-meshes
    pub fn triangle_count(&self) -> usize {
        self.submeshes.iter().map(|s| s.indices.len() / 3).sum()
    }

    /// Compute the bounding sphere of all vertex positions
    ///
    /// Center is the midpoint of the axis-aligned min/max corners and the
    /// radius is half their diagonal. An empty mesh yields a zero sphere at
    /// the origin.
    pub fn bounding_sphere(&self) -> BoundingSphere {
        let mut min = Vec3::from_element(f32::INFINITY);
        let mut max = Vec3::from_element(f32::NEG_INFINITY);
        let mut any = false;

        for submesh in &self.submeshes {
            for vertex in &submesh.vertices {
                any = true;
                for axis in 0..3 {
                    min[axis] = min[axis].min(vertex.position[axis]);
                    max[axis] = max[axis].max(vertex.position[axis]);
                }
            }
        }

        if !any {
            return BoundingSphere {
                center: Vec3::zeros(),
                radius: 0.0,
            };
        }

        BoundingSphere {
            center: (min + max) * 0.5,
            radius: (max - min).norm() * 0.5,
        }
    }

    /// Create a unit cube centered on the origin (procedural, no source path)
    pub fn cube() -> Self {
        let faces: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
            // (normal, tangent u, tangent v) per face
            ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
            ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
            ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
            ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
            ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
            ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
        ];

        let mut vertices = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);

        for (normal, u, v) in faces {
            let n = Vec3::from(normal);
            let u = Vec3::from(u);
            let v = Vec3::from(v);
            let base = vertices.len() as u32;

            for (du, dv, tex) in [
                (-0.5, -0.5, [0.0, 0.0]),
                (0.5, -0.5, [1.0, 0.0]),
                (0.5, 0.5, [1.0, 1.0]),
                (-0.5, 0.5, [0.0, 1.0]),
            ] {
                let position = n * 0.5 + u * du + v * dv;
                vertices.push(Vertex {
                    position: [position.x, position.y, position.z],
                    normal,
                    tex_coord: tex,
                });
            }
            indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }

        Self {
            submeshes: vec![SubMesh {
                vertices,
                indices,
                texture: None,
            }],
            source: None,
        }
    }
}
