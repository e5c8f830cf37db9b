//! Graphics-device abstraction
//!
//! The engine core never talks to a concrete graphics API. Everything it
//! needs from one is collected in [`GraphicsDevice`]: resource creation,
//! uniform upload, indexed draws, and a little pipeline state. Backends
//! implement the trait; the core treats handles as opaque tokens.

use crate::assets::{AssetError, ImageData};
use crate::foundation::math::{Mat4, Vec3};
use crate::render::mesh::Vertex;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for device operations
pub type DeviceResult<T> = Result<T, RenderError>;

/// Handle to a vertex or index buffer stored in the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferHandle(pub u64);

/// Handle to a texture stored in the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u64);

/// Handle to a compiled and linked shader program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramHandle(pub u64);

/// Abstract graphics-resource capability consumed by the renderer
///
/// One implementation drives a real API; [`NullDevice`](crate::render::NullDevice)
/// records calls for headless runs and tests.
pub trait GraphicsDevice {
    /// Upload vertex data and return a handle to the new buffer
    fn create_vertex_buffer(&mut self, vertices: &[Vertex]) -> DeviceResult<BufferHandle>;

    /// Upload index data and return a handle to the new buffer
    fn create_index_buffer(&mut self, indices: &[u32]) -> DeviceResult<BufferHandle>;

    /// Release a buffer
    fn destroy_buffer(&mut self, buffer: BufferHandle) -> DeviceResult<()>;

    /// Upload RGBA8 image data and return a handle to the new texture
    fn create_texture(&mut self, image: &ImageData) -> DeviceResult<TextureHandle>;

    /// Release a texture
    fn destroy_texture(&mut self, texture: TextureHandle) -> DeviceResult<()>;

    /// Compile and link a shader program from vertex/fragment sources
    fn create_program(&mut self, vertex_source: &str, fragment_source: &str)
        -> DeviceResult<ProgramHandle>;

    /// Release a shader program
    fn destroy_program(&mut self, program: ProgramHandle) -> DeviceResult<()>;

    /// Make a program current; uniform calls target it until the next bind
    fn bind_program(&mut self, program: ProgramHandle) -> DeviceResult<()>;

    /// Set a float uniform on the bound program
    fn set_uniform_f32(&mut self, name: &str, value: f32) -> DeviceResult<()>;

    /// Set an integer uniform on the bound program
    fn set_uniform_i32(&mut self, name: &str, value: i32) -> DeviceResult<()>;

    /// Set a 3-vector uniform on the bound program
    fn set_uniform_vec3(&mut self, name: &str, value: Vec3) -> DeviceResult<()>;

    /// Set a 4x4 matrix uniform on the bound program
    fn set_uniform_mat4(&mut self, name: &str, value: &Mat4) -> DeviceResult<()>;

    /// Bind a texture to a sampler unit
    fn bind_texture(&mut self, unit: u32, texture: TextureHandle) -> DeviceResult<()>;

    /// Issue one indexed triangle draw over the given buffers
    fn draw_indexed(
        &mut self,
        vertices: BufferHandle,
        indices: BufferHandle,
        index_count: u32,
    ) -> DeviceResult<()>;

    /// Enable or disable depth testing
    fn set_depth_test(&mut self, enabled: bool);

    /// Enable or disable back-face culling
    fn set_backface_culling(&mut self, enabled: bool);

    /// Clear the frame to the given color
    fn clear(&mut self, color: [f32; 4]);
}

/// Rendering and GPU-resource errors
#[derive(Error, Debug)]
pub enum RenderError {
    /// Shader compilation or linking failed
    #[error("shader program failed to build: {0}")]
    ProgramBuild(String),

    /// A shader source file could not be read
    #[error("failed to read shader source {}", .path.display())]
    ShaderSource {
        /// Offending source path
        path: PathBuf,
        /// Underlying I/O failure
        source: std::io::Error,
    },

    /// A shader's texture could not be loaded
    #[error("shader texture load failed")]
    Texture(#[from] AssetError),

    /// An operation referenced a handle the device never issued (or already
    /// destroyed)
    #[error("unknown {kind} handle {id}")]
    UnknownHandle {
        /// Resource kind ("buffer", "texture", "program")
        kind: &'static str,
        /// The stale handle value
        id: u64,
    },

    /// A uniform was set with no program bound
    #[error("uniform '{0}' set with no program bound")]
    NoProgramBound(String),

    /// A draw or uniform push happened before the shader was compiled
    #[error("shader used before it was compiled")]
    ProgramNotCompiled,

    /// Frame presentation failed
    #[error("presentation failed: {0}")]
    Present(String),
}
