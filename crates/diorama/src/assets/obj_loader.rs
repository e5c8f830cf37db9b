//! OBJ file import
//!
//! Hand-rolled parser covering the subset scene files use: positions,
//! normals, texture coordinates, polygonal faces (fan triangulated),
//! `usemtl` sub-mesh splits, and diffuse texture paths skimmed from any
//! referenced MTL library.

use crate::assets::{AssetError, MeshImporter};
use crate::render::mesh::{Mesh, SubMesh, Vertex};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// OBJ-backed implementation of [`MeshImporter`]
///
/// Relative import paths resolve against the importer's asset root; the
/// path as given becomes the mesh's source path in persisted documents.
pub struct ObjImporter {
    root: PathBuf,
}

impl ObjImporter {
    /// Create an importer resolving relative paths against `root`
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    /// The asset root this importer resolves against
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        super::resolve_path(&self.root, path)
    }
}

impl MeshImporter for ObjImporter {
    fn import(&self, path: &Path) -> Result<Mesh, AssetError> {
        let full = self.resolve(path);
        log::debug!("importing OBJ mesh from {}", full.display());

        let source = fs::read_to_string(&full).map_err(|e| AssetError::Read {
            path: full.clone(),
            source: e,
        })?;
        let submeshes = parse_obj(&source, full.parent())?;

        log::info!(
            "imported {} ({} sub-meshes, {} triangles)",
            path.display(),
            submeshes.len(),
            submeshes.iter().map(|s| s.indices.len() / 3).sum::<usize>()
        );
        Ok(Mesh::from_submeshes(submeshes, Some(path.to_path_buf())))
    }
}

/// Parse OBJ text into sub-meshes
///
/// `base_dir` anchors `mtllib` lookups; with `None`, material libraries are
/// skipped. A missing or unreadable library is logged and skipped rather
/// than failing the import, since geometry is still usable without its
/// textures.
pub fn parse_obj(source: &str, base_dir: Option<&Path>) -> Result<Vec<SubMesh>, AssetError> {
    let mut positions: Vec<[f32; 3]> = Vec::new();
    let mut normals: Vec<[f32; 3]> = Vec::new();
    let mut tex_coords: Vec<[f32; 2]> = Vec::new();
    let mut material_textures: HashMap<String, PathBuf> = HashMap::new();

    let mut submeshes = Vec::new();
    let mut current = SubMeshBuilder::new(None);

    for line in source.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        match parts[0] {
            "v" => positions.push(parse_triple(&parts)?),
            "vn" => normals.push(parse_triple(&parts)?),
            "vt" => tex_coords.push(parse_pair(&parts)?),
            "mtllib" => {
                if let Some(dir) = base_dir {
                    for name in &parts[1..] {
                        let mtl_path = dir.join(name);
                        match fs::read_to_string(&mtl_path) {
                            Ok(text) => material_textures.extend(parse_mtl(&text)),
                            Err(e) => log::warn!(
                                "skipping material library {}: {}",
                                mtl_path.display(),
                                e
                            ),
                        }
                    }
                }
            }
            "usemtl" => {
                let texture = parts
                    .get(1)
                    .and_then(|name| material_textures.get(*name).cloned());
                let finished = std::mem::replace(&mut current, SubMeshBuilder::new(texture));
                if let Some(done) = finished.finish() {
                    submeshes.push(done);
                }
            }
            "f" => current.push_face(&parts[1..], &positions, &normals, &tex_coords)?,
            _ => {}
        }
    }

    if let Some(done) = current.finish() {
        submeshes.push(done);
    }
    if submeshes.is_empty() {
        return Err(AssetError::NoGeometry);
    }
    Ok(submeshes)
}

struct SubMeshBuilder {
    texture: Option<PathBuf>,
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    corner_cache: HashMap<(usize, Option<usize>, Option<usize>), u32>,
}

impl SubMeshBuilder {
    fn new(texture: Option<PathBuf>) -> Self {
        Self {
            texture,
            vertices: Vec::new(),
            indices: Vec::new(),
            corner_cache: HashMap::new(),
        }
    }

    fn push_face(
        &mut self,
        corners: &[&str],
        positions: &[[f32; 3]],
        normals: &[[f32; 3]],
        tex_coords: &[[f32; 2]],
    ) -> Result<(), AssetError> {
        if corners.len() < 3 {
            return Err(AssetError::ObjParse(format!(
                "face with only {} corners",
                corners.len()
            )));
        }

        let mut face = Vec::with_capacity(corners.len());
        for corner in corners {
            face.push(self.corner_index(corner, positions, normals, tex_coords)?);
        }

        // Fan triangulation; OBJ faces may be arbitrary convex polygons.
        for i in 1..face.len() - 1 {
            self.indices
                .extend_from_slice(&[face[0], face[i], face[i + 1]]);
        }
        Ok(())
    }

    fn corner_index(
        &mut self,
        corner: &str,
        positions: &[[f32; 3]],
        normals: &[[f32; 3]],
        tex_coords: &[[f32; 2]],
    ) -> Result<u32, AssetError> {
        let mut fields = corner.split('/');

        let pos_field = fields
            .next()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AssetError::ObjParse(format!("face corner '{corner}' has no position")))?;
        let pos = parse_obj_index(pos_field, positions.len())?;
        let tex = match fields.next().filter(|s| !s.is_empty()) {
            Some(s) => Some(parse_obj_index(s, tex_coords.len())?),
            None => None,
        };
        let norm = match fields.next().filter(|s| !s.is_empty()) {
            Some(s) => Some(parse_obj_index(s, normals.len())?),
            None => None,
        };

        let key = (pos, tex, norm);
        if let Some(&index) = self.corner_cache.get(&key) {
            return Ok(index);
        }

        let position = *positions
            .get(pos)
            .ok_or_else(|| AssetError::ObjParse(format!("position index {} out of range", pos + 1)))?;
        let tex_coord = match tex {
            Some(t) => *tex_coords.get(t).ok_or_else(|| {
                AssetError::ObjParse(format!("texture coordinate index {} out of range", t + 1))
            })?,
            None => [0.0, 0.0],
        };
        let normal = match norm {
            Some(n) => *normals.get(n).ok_or_else(|| {
                AssetError::ObjParse(format!("normal index {} out of range", n + 1))
            })?,
            None => [0.0, 1.0, 0.0],
        };

        let index = self.vertices.len() as u32;
        self.vertices.push(Vertex {
            position,
            normal,
            tex_coord,
        });
        self.corner_cache.insert(key, index);
        Ok(index)
    }

    fn finish(self) -> Option<SubMesh> {
        if self.indices.is_empty() {
            return None;
        }
        Some(SubMesh {
            vertices: self.vertices,
            indices: self.indices,
            texture: self.texture,
        })
    }
}

/// Resolve a 1-based (or negative, end-relative) OBJ index to 0-based
fn parse_obj_index(text: &str, len: usize) -> Result<usize, AssetError> {
    let value: isize = text
        .parse()
        .map_err(|_| AssetError::ObjParse(format!("bad index '{text}'")))?;
    if value > 0 {
        Ok(value as usize - 1)
    } else if value < 0 {
        len.checked_sub(value.unsigned_abs())
            .ok_or_else(|| AssetError::ObjParse(format!("negative index {value} out of range")))
    } else {
        Err(AssetError::ObjParse("index 0 is not valid in OBJ".to_string()))
    }
}

fn parse_triple(parts: &[&str]) -> Result<[f32; 3], AssetError> {
    if parts.len() < 4 {
        return Err(AssetError::ObjParse(format!(
            "'{}' needs three values",
            parts[0]
        )));
    }
    Ok([
        parse_float(parts[1])?,
        parse_float(parts[2])?,
        parse_float(parts[3])?,
    ])
}

fn parse_pair(parts: &[&str]) -> Result<[f32; 2], AssetError> {
    if parts.len() < 3 {
        return Err(AssetError::ObjParse(format!(
            "'{}' needs two values",
            parts[0]
        )));
    }
    Ok([parse_float(parts[1])?, parse_float(parts[2])?])
}

fn parse_float(text: &str) -> Result<f32, AssetError> {
    text.parse()
        .map_err(|_| AssetError::ObjParse(format!("bad number '{text}'")))
}

fn parse_mtl(source: &str) -> HashMap<String, PathBuf> {
    let mut textures = HashMap::new();
    let mut current: Option<String> = None;

    for line in source.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let parts: Vec<&str> = line.split_whitespace().collect();
        match parts[0] {
            "newmtl" => current = parts.get(1).map(|s| (*s).to_string()),
            "map_Kd" => {
                if let (Some(name), Some(path)) = (current.as_ref(), parts.get(1)) {
                    textures.insert(name.clone(), PathBuf::from(path));
                }
            }
            _ => {}
        }
    }
    textures
}
