//! Rendering subsystem
//!
//! The scene layer drives rendering entirely through the
//! [`GraphicsDevice`] trait, so everything here is portable across
//! backends: mesh and shader data live on the CPU and refer to device
//! resources by opaque handle. [`NullDevice`] is the bundled backend for
//! headless runs and tests.

pub mod device;
pub mod mesh;
pub mod null_device;
pub mod shader;

pub use device::{
    BufferHandle, DeviceResult, GraphicsDevice, ProgramHandle, RenderError, TextureHandle,
};
pub use mesh::{BoundingSphere, Mesh, SubMesh, Vertex};
pub use null_device::{DeviceStats, NullDevice};
pub use shader::{Shader, ShaderDesc};
