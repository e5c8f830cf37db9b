//! Mesh renderer component state
//!
//! Owns a shared mesh and shader, holds a weak reference to the camera it
//! renders through, and caches the mesh's bounding sphere at construction.
//! The sphere never changes afterwards; at cull time it is pushed through
//! the transform's world matrix and scaled by the largest world-scale
//! component, which keeps the test conservative under non-uniform scale.

use crate::assets::{self, ImageData};
use crate::foundation::math::Vec3;
use crate::render::{
    BoundingSphere, BufferHandle, GraphicsDevice, Mesh, Shader, TextureHandle,
};
use crate::scene::component::{Component, WeakComponent};
use crate::scene::error::{SceneError, SceneResult};
use crate::scene::transform::Transform;
use crate::scene::uid::Uid;
use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

#[derive(Debug)]
struct GpuSubMesh {
    vertex_buffer: BufferHandle,
    index_buffer: BufferHandle,
    index_count: u32,
    texture: Option<TextureHandle>,
}

/// Mesh renderer state
#[derive(Debug)]
pub struct MeshRenderer {
    pub(crate) mesh: Rc<Mesh>,
    pub(crate) shader: Rc<RefCell<Shader>>,
    pub(crate) camera: WeakComponent,
    pub(crate) camera_uid: Uid,
    pub(crate) bounding_sphere: BoundingSphere,
    pub(crate) culling_enabled: bool,
    gpu: Option<Vec<GpuSubMesh>>,
}

impl MeshRenderer {
    /// Build renderer state; the bounding sphere is computed here, once
    pub(crate) fn new(
        mesh: Rc<Mesh>,
        shader: Rc<RefCell<Shader>>,
        camera: WeakComponent,
        camera_uid: Uid,
        culling_enabled: bool,
    ) -> Self {
        let bounding_sphere = mesh.bounding_sphere();
        Self {
            mesh,
            shader,
            camera,
            camera_uid,
            bounding_sphere,
            culling_enabled,
            gpu: None,
        }
    }

    pub(crate) fn camera_bound(&self) -> bool {
        self.camera.upgrade().is_some()
    }

    pub(crate) fn bind_camera(&mut self, camera: &Component) {
        self.camera = camera.downgrade();
    }

    /// The cached sphere mapped to world space: center through the world
    /// matrix, radius scaled by the largest world-scale component
    pub(crate) fn world_bounding_sphere(&self, transform: &Transform) -> (Vec3, f32) {
        let center = transform.transform_point_to_world_space(self.bounding_sphere.center);
        let scale = transform.world_scale();
        let factor = scale.x.abs().max(scale.y.abs()).max(scale.z.abs());
        (center, self.bounding_sphere.radius * factor)
    }

    /// Compile the shader and upload geometry and textures
    pub(crate) fn initialize(
        &mut self,
        device: &mut dyn GraphicsDevice,
        asset_root: &Path,
    ) -> SceneResult<()> {
        if self.gpu.is_some() {
            return Ok(());
        }
        self.shader.borrow_mut().compile(device, asset_root)?;

        let wants_texture = self.shader.borrow().desc().uses_texture();
        let mut gpu = Vec::with_capacity(self.mesh.submeshes().len());
        for submesh in self.mesh.submeshes() {
            let vertex_buffer = device.create_vertex_buffer(&submesh.vertices)?;
            let index_buffer = device.create_index_buffer(&submesh.indices)?;
            let texture = match (&submesh.texture, wants_texture) {
                (Some(path), true) => {
                    let image = ImageData::from_file(&assets::resolve_path(asset_root, path))?;
                    Some(device.create_texture(&image)?)
                }
                _ => None,
            };
            gpu.push(GpuSubMesh {
                vertex_buffer,
                index_buffer,
                index_count: submesh.indices.len() as u32,
                texture,
            });
        }
        self.gpu = Some(gpu);
        Ok(())
    }

    /// Cull against the bound camera's frustum, then draw every sub-mesh
    pub(crate) fn frame_end(
        &self,
        device: &mut dyn GraphicsDevice,
        transform: &Transform,
        uid: Uid,
    ) -> SceneResult<()> {
        let camera = self.camera.upgrade().ok_or(SceneError::Unbound {
            what: "camera",
            uid: self.camera_uid,
        })?;

        if self.culling_enabled {
            let (center, radius) = self.world_bounding_sphere(transform);
            if !camera.frustum()?.contains_sphere(center, radius) {
                return Ok(());
            }
        }

        let gpu = self.gpu.as_ref().ok_or(SceneError::NotInitialized { uid })?;

        let model = transform.world_model_matrix();
        let view = camera.view_matrix()?;
        let projection = camera.projection_matrix()?;

        let shader = self.shader.borrow();
        shader.activate(device)?;
        shader.apply(device, &model, &view, &projection)?;
        let fallback_texture = shader.texture();
        for submesh in gpu {
            if shader.desc().uses_texture() {
                if let Some(texture) = submesh.texture.or(fallback_texture) {
                    device.bind_texture(0, texture)?;
                }
            }
            device.draw_indexed(submesh.vertex_buffer, submesh.index_buffer, submesh.index_count)?;
        }
        Ok(())
    }

    /// Free this renderer's buffers and textures
    ///
    /// The shared shader is left alone; the scene releases it once all
    /// renderers using it are gone.
    pub(crate) fn shutdown(&mut self, device: &mut dyn GraphicsDevice) -> SceneResult<()> {
        if let Some(gpu) = self.gpu.take() {
            for submesh in gpu {
                device.destroy_buffer(submesh.vertex_buffer)?;
                device.destroy_buffer(submesh.index_buffer)?;
                if let Some(texture) = submesh.texture {
                    device.destroy_texture(texture)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::ShaderDesc;
    use approx::assert_relative_eq;
    use std::path::PathBuf;

    const EPSILON: f32 = 1e-5;

    fn cube_renderer() -> MeshRenderer {
        let shader = Shader::new(ShaderDesc::FragmentNormal {
            vertex: PathBuf::from("basic.vert"),
            fragment: PathBuf::from("basic.frag"),
        });
        MeshRenderer::new(
            Rc::new(Mesh::cube()),
            Rc::new(RefCell::new(shader)),
            WeakComponent::new(),
            42,
            true,
        )
    }

    #[test]
    fn test_bounding_sphere_cached_at_construction() {
        let renderer = cube_renderer();
        assert_relative_eq!(
            renderer.bounding_sphere.radius,
            0.75_f32.sqrt(),
            epsilon = EPSILON
        );
    }

    #[test]
    fn test_world_sphere_scales_with_largest_axis() {
        let renderer = cube_renderer();
        let mut transform = Transform::new();
        transform
            .set_local_scale(Vec3::new(1.0, -4.0, 2.0))
            .unwrap();
        transform
            .set_local_position(Vec3::new(3.0, 0.0, 0.0))
            .unwrap();

        let (center, radius) = renderer.world_bounding_sphere(&transform);
        assert_relative_eq!(center.x, 3.0, epsilon = EPSILON);
        assert_relative_eq!(radius, 4.0 * 0.75_f32.sqrt(), epsilon = EPSILON);
    }

    #[test]
    fn test_unbound_camera_is_fatal_on_draw() {
        let renderer = cube_renderer();
        let transform = Transform::new();
        let mut device = crate::render::NullDevice::new();
        let err = renderer
            .frame_end(&mut device, &transform, 1)
            .unwrap_err();
        assert!(matches!(
            err,
            SceneError::Unbound {
                what: "camera",
                uid: 42
            }
        ));
    }
}
