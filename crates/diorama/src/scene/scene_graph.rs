//! Scene graph
//!
//! A [`Scene`] owns one root transform and drives everything hanging off
//! it. Each frame runs four depth-first phases over the whole tree, in
//! component order within each game object: input handling, frame start,
//! frame update, frame end. A phase finishes for every component before
//! the next phase begins, so cross-object reads during frame end always
//! see fully updated transforms.
//!
//! Uid lookups walk the tree; they are linear and only meant for the
//! late-binding pass after a document load.

use crate::input::InputState;
use crate::render::{GraphicsDevice, Shader};
use crate::scene::component::{Component, ComponentKind};
use crate::scene::error::SceneResult;
use crate::scene::transform::Transform;
use crate::scene::uid::Uid;
use std::cell::RefCell;
use std::collections::HashSet;
use std::path::Path;
use std::rc::Rc;

/// A transform hierarchy with the machinery to update and persist it
#[derive(Debug)]
pub struct Scene {
    root: Transform,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Create a scene with an empty root transform
    pub fn new() -> Self {
        Self {
            root: Transform::new(),
        }
    }

    /// Wrap an already-built hierarchy
    pub(crate) fn from_root(root: Transform) -> Self {
        Self { root }
    }

    /// The root transform; new entities hang off this
    pub fn root(&self) -> &Transform {
        &self.root
    }

    /// Number of transforms in the hierarchy, root included
    pub fn transform_count(&self) -> usize {
        let mut count = 0;
        Self::visit(&self.root, &mut |_| count += 1);
        count
    }

    /// Number of components across all game objects
    pub fn component_count(&self) -> usize {
        self.collect_components().len()
    }

    /// Resolve persisted cross-references for every component
    ///
    /// Runs after a document load, before the first frame. Fails naming
    /// the offending uid if any reference cannot be resolved.
    pub fn late_bind(&self) -> SceneResult<()> {
        for component in self.collect_components() {
            component.late_bind(self)?;
        }
        Ok(())
    }

    /// Acquire device resources for every component
    pub fn initialize(
        &mut self,
        device: &mut dyn GraphicsDevice,
        asset_root: &Path,
    ) -> SceneResult<()> {
        for component in self.collect_components() {
            component.initialize(device, asset_root)?;
        }
        Ok(())
    }

    /// Advance the scene by one frame
    ///
    /// The four phases each walk the tree depth-first from the root.
    pub fn update(
        &mut self,
        input: &InputState,
        device: &mut dyn GraphicsDevice,
        delta_time: f32,
    ) -> SceneResult<()> {
        for component in self.collect_components() {
            component.handle_input(input, delta_time)?;
        }
        for component in self.collect_components() {
            component.frame_start(delta_time)?;
        }
        for component in self.collect_components() {
            component.frame_update(delta_time)?;
        }
        for component in self.collect_components() {
            component.frame_end(device)?;
        }
        Ok(())
    }

    /// Release every component's device resources, then the shaders they
    /// shared
    pub fn shutdown(&mut self, device: &mut dyn GraphicsDevice) -> SceneResult<()> {
        let mut seen = HashSet::new();
        let mut shaders: Vec<Rc<RefCell<Shader>>> = Vec::new();
        for component in self.collect_components() {
            component.shutdown(device)?;
            component.with_kind(|kind| {
                if let ComponentKind::MeshRenderer(renderer) = kind {
                    let shader = renderer.shader.clone();
                    if seen.insert(Rc::as_ptr(&shader)) {
                        shaders.push(shader);
                    }
                }
            });
        }
        for shader in shaders {
            shader.borrow_mut().release(device)?;
        }
        Ok(())
    }

    /// Find the camera component with this uid, if any
    ///
    /// Non-camera components never match, whatever their uid.
    pub fn find_camera(&self, uid: Uid) -> Option<Component> {
        self.collect_components()
            .into_iter()
            .find(|component| component.is_camera() && component.uid() == uid)
    }

    /// Find the transform with this uid, if any
    pub fn find_transform(&self, uid: Uid) -> Option<Transform> {
        let mut found = None;
        Self::visit(&self.root, &mut |transform| {
            if found.is_none() && transform.uid() == uid {
                found = Some(transform.clone());
            }
        });
        found
    }

    /// Write the scene document to `path`
    pub fn save(&self, path: &Path) -> SceneResult<()> {
        crate::io::codec::save_scene(self, path)
    }

    /// Read a scene document from `path`
    ///
    /// Mesh and shader paths inside the document resolve against
    /// `asset_root`. Cross-references are late-bound before returning.
    pub fn load(path: &Path, asset_root: &Path) -> SceneResult<Self> {
        crate::io::codec::load_scene(path, asset_root)
    }

    /// All components in depth-first tree order, component order within
    /// each game object
    fn collect_components(&self) -> Vec<Component> {
        let mut components = Vec::new();
        Self::visit(&self.root, &mut |transform| {
            if let Some(game_object) = transform.game_object() {
                components.extend(game_object.components());
            }
        });
        components
    }

    fn visit(transform: &Transform, f: &mut impl FnMut(&Transform)) {
        f(transform);
        for child in transform.children() {
            Self::visit(&child, f);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;
    use crate::render::{Mesh, NullDevice, ShaderDesc};
    use crate::scene::component::WeakComponent;
    use crate::scene::components::{MeshRenderer, Projection};
    use crate::scene::error::SceneError;
    use crate::scene::game_object::GameObject;
    use approx::assert_relative_eq;
    use std::fs;
    use std::path::PathBuf;

    const EPSILON: f32 = 1e-5;

    fn scratch_root(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("diorama-scene-{}-{name}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("basic.vert"), "void main() {}").unwrap();
        fs::write(dir.join("basic.frag"), "void main() {}").unwrap();
        dir
    }

    fn plain_shader() -> Rc<RefCell<Shader>> {
        Rc::new(RefCell::new(Shader::new(ShaderDesc::FragmentNormal {
            vertex: PathBuf::from("basic.vert"),
            fragment: PathBuf::from("basic.frag"),
        })))
    }

    fn attach_entity(scene: &Scene, name: &str) -> (Transform, GameObject) {
        let mut transform = Transform::new();
        let game_object = GameObject::new(name);
        transform.attach_game_object(&game_object).unwrap();
        scene.root().clone().add_child(&transform).unwrap();
        (transform, game_object)
    }

    fn add_camera(scene: &Scene) -> (Transform, Component) {
        let (mut transform, mut owner) = attach_entity(scene, "camera");
        transform
            .set_local_position(Vec3::new(0.0, 0.0, 5.0))
            .unwrap();
        let camera = Component::camera(
            &owner,
            Projection::Perspective {
                fov: std::f32::consts::FRAC_PI_2,
                aspect_ratio: 1.0,
            },
            0.1,
            100.0,
        )
        .unwrap();
        owner.add_component(&camera).unwrap();
        (transform, camera)
    }

    #[test]
    fn test_counts_cover_the_whole_tree() {
        let scene = Scene::new();
        let (_t, camera) = add_camera(&scene);
        let (_t2, mut owner) = attach_entity(&scene, "prop");
        let renderer = Component::mesh_renderer(
            &owner,
            Rc::new(Mesh::cube()),
            plain_shader(),
            &camera,
            true,
        )
        .unwrap();
        owner.add_component(&renderer).unwrap();

        assert_eq!(scene.transform_count(), 3);
        assert_eq!(scene.component_count(), 2);
    }

    #[test]
    fn test_update_advances_movers() {
        let mut scene = Scene::new();
        let (transform, mut owner) = attach_entity(&scene, "drifter");
        let mover = Component::test_movement(&owner, Vec3::new(1.0, 0.0, 0.0)).unwrap();
        owner.add_component(&mover).unwrap();

        let input = InputState::new();
        let mut device = NullDevice::new();
        scene.update(&input, &mut device, 0.25).unwrap();
        scene.update(&input, &mut device, 0.25).unwrap();

        assert_relative_eq!(transform.local_position().x, 0.5, epsilon = EPSILON);
    }

    #[test]
    fn test_update_draws_initialized_renderers() {
        let root = scratch_root("draw");
        let mut scene = Scene::new();
        let (_ct, camera) = add_camera(&scene);
        let (_t, mut owner) = attach_entity(&scene, "prop");
        let renderer = Component::mesh_renderer(
            &owner,
            Rc::new(Mesh::cube()),
            plain_shader(),
            &camera,
            true,
        )
        .unwrap();
        owner.add_component(&renderer).unwrap();

        let mut device = NullDevice::new();
        scene.initialize(&mut device, &root).unwrap();
        scene
            .update(&InputState::new(), &mut device, 0.016)
            .unwrap();

        assert_eq!(device.stats().draw_calls, 1);
        assert!(device.stats().triangles_drawn > 0);
    }

    #[test]
    fn test_uninitialized_renderer_fails_the_frame() {
        let mut scene = Scene::new();
        let (_ct, camera) = add_camera(&scene);
        let (_t, mut owner) = attach_entity(&scene, "prop");
        let renderer = Component::mesh_renderer(
            &owner,
            Rc::new(Mesh::cube()),
            plain_shader(),
            &camera,
            false,
        )
        .unwrap();
        owner.add_component(&renderer).unwrap();

        let mut device = NullDevice::new();
        let err = scene
            .update(&InputState::new(), &mut device, 0.016)
            .unwrap_err();
        assert!(matches!(err, SceneError::NotInitialized { .. }));
    }

    #[test]
    fn test_culled_renderer_issues_no_draw() {
        let root = scratch_root("cull");
        let mut scene = Scene::new();
        let (_ct, camera) = add_camera(&scene);
        // Camera at z=5 looks down -z; a prop far behind it is invisible.
        let (mut prop, mut owner) = attach_entity(&scene, "prop");
        prop.set_local_position(Vec3::new(0.0, 0.0, 100.0)).unwrap();
        let renderer = Component::mesh_renderer(
            &owner,
            Rc::new(Mesh::cube()),
            plain_shader(),
            &camera,
            true,
        )
        .unwrap();
        owner.add_component(&renderer).unwrap();

        let mut device = NullDevice::new();
        scene.initialize(&mut device, &root).unwrap();
        scene
            .update(&InputState::new(), &mut device, 0.016)
            .unwrap();

        assert_eq!(device.stats().draw_calls, 0);
    }

    #[test]
    fn test_find_camera_ignores_other_kinds() {
        let scene = Scene::new();
        let (_ct, camera) = add_camera(&scene);
        let (_t, mut owner) = attach_entity(&scene, "prop");
        let mover = Component::test_movement(&owner, Vec3::x()).unwrap();
        owner.add_component(&mover).unwrap();

        assert_eq!(
            scene.find_camera(camera.uid()).map(|c| c.uid()),
            Some(camera.uid())
        );
        assert!(scene.find_camera(mover.uid()).is_none());
        assert!(scene.find_camera(999_999).is_none());
    }

    #[test]
    fn test_find_transform_walks_depth_first() {
        let scene = Scene::new();
        let (parent, _go) = attach_entity(&scene, "parent");
        let mut child = Transform::new();
        parent.clone().add_child(&child).unwrap();
        child.set_local_position(Vec3::y()).unwrap();

        let found = scene.find_transform(child.uid()).unwrap();
        assert_eq!(found, child);
        assert!(scene.find_transform(999_999).is_none());
    }

    #[test]
    fn test_late_bind_resolves_restored_camera_reference() {
        let root = scratch_root("bind");
        let mut scene = Scene::new();
        let (_ct, camera) = add_camera(&scene);
        let (_t, mut owner) = attach_entity(&scene, "prop");
        let state = MeshRenderer::new(
            Rc::new(Mesh::cube()),
            plain_shader(),
            WeakComponent::new(),
            camera.uid(),
            true,
        );
        let renderer =
            Component::restore(7001, &owner, ComponentKind::MeshRenderer(state)).unwrap();
        owner.add_component(&renderer).unwrap();

        scene.late_bind().unwrap();
        let mut device = NullDevice::new();
        scene.initialize(&mut device, &root).unwrap();
        scene
            .update(&InputState::new(), &mut device, 0.016)
            .unwrap();
        assert_eq!(device.stats().draw_calls, 1);
    }

    #[test]
    fn test_late_bind_names_the_missing_camera() {
        let scene = Scene::new();
        let (_t, mut owner) = attach_entity(&scene, "prop");
        let state = MeshRenderer::new(
            Rc::new(Mesh::cube()),
            plain_shader(),
            WeakComponent::new(),
            424_242,
            true,
        );
        let renderer =
            Component::restore(7002, &owner, ComponentKind::MeshRenderer(state)).unwrap();
        owner.add_component(&renderer).unwrap();

        let err = scene.late_bind().unwrap_err();
        assert!(matches!(
            err,
            SceneError::UnresolvedCamera { uid: 424_242 }
        ));
    }

    #[test]
    fn test_shutdown_releases_every_device_resource() {
        let root = scratch_root("release");
        let mut scene = Scene::new();
        let (_ct, camera) = add_camera(&scene);
        let shader = plain_shader();
        for name in ["one", "two"] {
            let (_t, mut owner) = attach_entity(&scene, name);
            let renderer = Component::mesh_renderer(
                &owner,
                Rc::new(Mesh::cube()),
                shader.clone(),
                &camera,
                true,
            )
            .unwrap();
            owner.add_component(&renderer).unwrap();
        }

        let mut device = NullDevice::new();
        scene.initialize(&mut device, &root).unwrap();
        assert!(device.live_resources() > 0);
        scene.shutdown(&mut device).unwrap();
        assert_eq!(device.live_resources(), 0);
    }
}
