//! Shader programs
//!
//! A [`ShaderDesc`] names one of the built-in shading modes and carries its
//! parameters: source file paths for every mode, plus a texture path and a
//! light position for the lit ones. It is also the form shaders take inside
//! scene documents, so a saved scene can reconstruct its shaders from
//! descriptions alone. A [`Shader`] pairs a description with the resources
//! compiled from it on a device.

use crate::assets::{self, ImageData};
use crate::foundation::math::{Mat4, Vec3};
use crate::render::device::{
    DeviceResult, GraphicsDevice, ProgramHandle, RenderError, TextureHandle,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Description of a shading mode and its parameters
///
/// Serializes under the mode's document tag, so values of this type appear
/// directly in saved scenes. Paths are resolved against the asset root at
/// compile time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ShaderDesc {
    /// Flat shading with the color baked into the fragment source
    #[serde(rename = "generic shader")]
    Generic {
        /// Vertex shader source path
        vertex: PathBuf,
        /// Fragment shader source path
        fragment: PathBuf,
    },
    /// Unlit texture sampling
    #[serde(rename = "texture shader")]
    Texture {
        /// Vertex shader source path
        vertex: PathBuf,
        /// Fragment shader source path
        fragment: PathBuf,
        /// Diffuse texture path
        texture: PathBuf,
    },
    /// Texture sampling with diffuse lighting from a point light
    #[serde(rename = "texture and lighting shader")]
    TextureAndLighting {
        /// Vertex shader source path
        vertex: PathBuf,
        /// Fragment shader source path
        fragment: PathBuf,
        /// Diffuse texture path
        texture: PathBuf,
        /// Light position in world space
        light_position: Vec3,
    },
    /// Debug mode that colors fragments by surface normal
    #[serde(rename = "fragment normal shader")]
    FragmentNormal {
        /// Vertex shader source path
        vertex: PathBuf,
        /// Fragment shader source path
        fragment: PathBuf,
    },
}

impl ShaderDesc {
    /// The document tag naming this mode
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Generic { .. } => "generic shader",
            Self::Texture { .. } => "texture shader",
            Self::TextureAndLighting { .. } => "texture and lighting shader",
            Self::FragmentNormal { .. } => "fragment normal shader",
        }
    }

    /// Whether this mode samples a texture on unit 0
    pub fn uses_texture(&self) -> bool {
        matches!(self, Self::Texture { .. } | Self::TextureAndLighting { .. })
    }

    /// Vertex and fragment source paths
    pub fn source_paths(&self) -> (&Path, &Path) {
        match self {
            Self::Generic { vertex, fragment }
            | Self::Texture {
                vertex, fragment, ..
            }
            | Self::TextureAndLighting {
                vertex, fragment, ..
            }
            | Self::FragmentNormal { vertex, fragment } => (vertex, fragment),
        }
    }

    /// The mode's texture path, if it has one
    pub fn texture_path(&self) -> Option<&Path> {
        match self {
            Self::Texture { texture, .. } | Self::TextureAndLighting { texture, .. } => {
                Some(texture)
            }
            Self::Generic { .. } | Self::FragmentNormal { .. } => None,
        }
    }
}

/// A shading mode together with the device resources compiled from it
#[derive(Debug)]
pub struct Shader {
    desc: ShaderDesc,
    program: Option<ProgramHandle>,
    texture: Option<TextureHandle>,
}

impl Shader {
    /// Create an uncompiled shader for the given mode
    pub fn new(desc: ShaderDesc) -> Self {
        Self {
            desc,
            program: None,
            texture: None,
        }
    }

    /// The mode description this shader was built from
    pub fn desc(&self) -> &ShaderDesc {
        &self.desc
    }

    /// The document tag naming this shader's mode
    pub fn tag(&self) -> &'static str {
        self.desc.tag()
    }

    /// Whether [`compile`](Self::compile) has run
    pub fn is_compiled(&self) -> bool {
        self.program.is_some()
    }

    /// The texture uploaded for this shader's mode, if any
    pub fn texture(&self) -> Option<TextureHandle> {
        self.texture
    }

    /// Read the sources, build the program, and upload the mode's texture
    ///
    /// Paths in the description resolve against `asset_root` unless
    /// absolute. Idempotent; a shader shared by several renderers compiles
    /// once.
    pub fn compile(
        &mut self,
        device: &mut dyn GraphicsDevice,
        asset_root: &Path,
    ) -> DeviceResult<()> {
        if self.program.is_some() {
            return Ok(());
        }
        let (vertex_path, fragment_path) = self.desc.source_paths();
        let vertex = read_source(asset_root, vertex_path)?;
        let fragment = read_source(asset_root, fragment_path)?;
        let program = device.create_program(&vertex, &fragment)?;
        log::debug!("compiled '{}' as program {:?}", self.tag(), program);

        if let Some(texture_path) = self.desc.texture_path() {
            let image = ImageData::from_file(&assets::resolve_path(asset_root, texture_path))?;
            self.texture = Some(device.create_texture(&image)?);
        }
        self.program = Some(program);
        Ok(())
    }

    /// Make this shader's program current on the device
    pub fn activate(&self, device: &mut dyn GraphicsDevice) -> DeviceResult<()> {
        let program = self.program.ok_or(RenderError::ProgramNotCompiled)?;
        device.bind_program(program)
    }

    /// Push the transform uniforms plus this mode's extra parameters
    ///
    /// Expects the program to be active; textured modes sample unit 0.
    pub fn apply(
        &self,
        device: &mut dyn GraphicsDevice,
        model: &Mat4,
        view: &Mat4,
        projection: &Mat4,
    ) -> DeviceResult<()> {
        if self.program.is_none() {
            return Err(RenderError::ProgramNotCompiled);
        }
        device.set_uniform_mat4("u_model", model)?;
        device.set_uniform_mat4("u_view", view)?;
        device.set_uniform_mat4("u_projection", projection)?;
        match &self.desc {
            ShaderDesc::Texture { .. } => device.set_uniform_i32("u_texture", 0)?,
            ShaderDesc::TextureAndLighting { light_position, .. } => {
                device.set_uniform_i32("u_texture", 0)?;
                device.set_uniform_vec3("u_light_position", *light_position)?;
            }
            ShaderDesc::Generic { .. } | ShaderDesc::FragmentNormal { .. } => {}
        }
        Ok(())
    }

    /// Destroy the compiled program and texture, returning to the
    /// uncompiled state
    pub fn release(&mut self, device: &mut dyn GraphicsDevice) -> DeviceResult<()> {
        if let Some(program) = self.program.take() {
            device.destroy_program(program)?;
        }
        if let Some(texture) = self.texture.take() {
            device.destroy_texture(texture)?;
        }
        Ok(())
    }
}

fn read_source(asset_root: &Path, path: &Path) -> Result<String, RenderError> {
    let full = assets::resolve_path(asset_root, path);
    fs::read_to_string(&full).map_err(|source| RenderError::ShaderSource { path: full, source })
}
