//! Headless graphics device
//!
//! [`NullDevice`] implements [`GraphicsDevice`] without any GPU behind it.
//! It issues handles, tracks which ones are live, and counts what the
//! renderer asked for, which is enough to run scenes in tests and in
//! windowless environments while still catching protocol mistakes such as
//! stale handles or uniforms pushed with no program bound.

use crate::assets::ImageData;
use crate::foundation::math::{Mat4, Vec3};
use crate::render::device::{
    BufferHandle, DeviceResult, GraphicsDevice, ProgramHandle, RenderError, TextureHandle,
};
use crate::render::mesh::Vertex;
use std::collections::HashSet;

/// Counters accumulated by a [`NullDevice`] over its lifetime
#[derive(Debug, Clone, Default)]
pub struct DeviceStats {
    /// Vertex and index buffers created
    pub buffers_created: usize,
    /// Textures created
    pub textures_created: usize,
    /// Programs compiled
    pub programs_created: usize,
    /// Indexed draw calls issued
    pub draw_calls: usize,
    /// Triangles covered by those draw calls
    pub triangles_drawn: usize,
    /// Uniform writes of any type
    pub uniform_writes: usize,
    /// Texture bind calls
    pub texture_binds: usize,
    /// Frame clears
    pub clears: usize,
}

/// A [`GraphicsDevice`] that draws nothing and remembers everything
#[derive(Debug, Default)]
pub struct NullDevice {
    next_handle: u64,
    buffers: HashSet<u64>,
    textures: HashSet<u64>,
    programs: HashSet<u64>,
    bound_program: Option<ProgramHandle>,
    stats: DeviceStats,
}

impl NullDevice {
    /// Create a device with no live resources
    pub fn new() -> Self {
        Self::default()
    }

    /// Counters accumulated so far
    pub fn stats(&self) -> &DeviceStats {
        &self.stats
    }

    /// Number of buffers, textures, and programs still live
    pub fn live_resources(&self) -> usize {
        self.buffers.len() + self.textures.len() + self.programs.len()
    }

    fn issue(&mut self) -> u64 {
        self.next_handle += 1;
        self.next_handle
    }

    fn check(set: &HashSet<u64>, kind: &'static str, id: u64) -> DeviceResult<()> {
        if set.contains(&id) {
            Ok(())
        } else {
            Err(RenderError::UnknownHandle { kind, id })
        }
    }

    fn uniform_target(&mut self, name: &str) -> DeviceResult<()> {
        if self.bound_program.is_none() {
            return Err(RenderError::NoProgramBound(name.to_owned()));
        }
        self.stats.uniform_writes += 1;
        Ok(())
    }
}

impl GraphicsDevice for NullDevice {
    fn create_vertex_buffer(&mut self, vertices: &[Vertex]) -> DeviceResult<BufferHandle> {
        let id = self.issue();
        self.buffers.insert(id);
        self.stats.buffers_created += 1;
        log::trace!("null device: vertex buffer {id} ({} vertices)", vertices.len());
        Ok(BufferHandle(id))
    }

    fn create_index_buffer(&mut self, indices: &[u32]) -> DeviceResult<BufferHandle> {
        let id = self.issue();
        self.buffers.insert(id);
        self.stats.buffers_created += 1;
        log::trace!("null device: index buffer {id} ({} indices)", indices.len());
        Ok(BufferHandle(id))
    }

    fn destroy_buffer(&mut self, buffer: BufferHandle) -> DeviceResult<()> {
        Self::check(&self.buffers, "buffer", buffer.0)?;
        self.buffers.remove(&buffer.0);
        Ok(())
    }

    fn create_texture(&mut self, image: &ImageData) -> DeviceResult<TextureHandle> {
        let id = self.issue();
        self.textures.insert(id);
        self.stats.textures_created += 1;
        log::trace!(
            "null device: texture {id} ({}x{})",
            image.width,
            image.height
        );
        Ok(TextureHandle(id))
    }

    fn destroy_texture(&mut self, texture: TextureHandle) -> DeviceResult<()> {
        Self::check(&self.textures, "texture", texture.0)?;
        self.textures.remove(&texture.0);
        Ok(())
    }

    fn create_program(
        &mut self,
        _vertex_source: &str,
        _fragment_source: &str,
    ) -> DeviceResult<ProgramHandle> {
        let id = self.issue();
        self.programs.insert(id);
        self.stats.programs_created += 1;
        Ok(ProgramHandle(id))
    }

    fn destroy_program(&mut self, program: ProgramHandle) -> DeviceResult<()> {
        Self::check(&self.programs, "program", program.0)?;
        self.programs.remove(&program.0);
        if self.bound_program == Some(program) {
            self.bound_program = None;
        }
        Ok(())
    }

    fn bind_program(&mut self, program: ProgramHandle) -> DeviceResult<()> {
        Self::check(&self.programs, "program", program.0)?;
        self.bound_program = Some(program);
        Ok(())
    }

    fn set_uniform_f32(&mut self, name: &str, _value: f32) -> DeviceResult<()> {
        self.uniform_target(name)
    }

    fn set_uniform_i32(&mut self, name: &str, _value: i32) -> DeviceResult<()> {
        self.uniform_target(name)
    }

    fn set_uniform_vec3(&mut self, name: &str, _value: Vec3) -> DeviceResult<()> {
        self.uniform_target(name)
    }

    fn set_uniform_mat4(&mut self, name: &str, _value: &Mat4) -> DeviceResult<()> {
        self.uniform_target(name)
    }

    fn bind_texture(&mut self, _unit: u32, texture: TextureHandle) -> DeviceResult<()> {
        Self::check(&self.textures, "texture", texture.0)?;
        self.stats.texture_binds += 1;
        Ok(())
    }

    fn draw_indexed(
        &mut self,
        vertices: BufferHandle,
        indices: BufferHandle,
        index_count: u32,
    ) -> DeviceResult<()> {
        Self::check(&self.buffers, "buffer", vertices.0)?;
        Self::check(&self.buffers, "buffer", indices.0)?;
        if self.bound_program.is_none() {
            return Err(RenderError::NoProgramBound("draw".to_owned()));
        }
        self.stats.draw_calls += 1;
        self.stats.triangles_drawn += index_count as usize / 3;
        Ok(())
    }

    fn set_depth_test(&mut self, _enabled: bool) {}

    fn set_backface_culling(&mut self, _enabled: bool) {}

    fn clear(&mut self, _color: [f32; 4]) {
        self.stats.clears += 1;
    }
}
