//! Polymorphic components
//!
//! A [`Component`] is a uid-carrying shared handle around one behaviour
//! out of a closed set ([`ComponentKind`]). Components are constructed
//! against a [`GameObject`] that is already attached to a transform; the
//! handle keeps weak references to both and dispatches the lifecycle
//! hooks to its behaviour with the owner's transform in hand.
//!
//! Lifecycle: constructed, late-bound (loaded scenes only), initialized,
//! then per frame input handling, frame start, frame update, frame end,
//! and finally shutdown. Cross-references recorded as uids in a document
//! (a renderer's camera, a skybox's follow target) stay unbound until
//! [`Component::late_bind`] resolves them against the scene; hitting an
//! unbound reference during a frame is fatal and names the missing uid.

use crate::foundation::math::{Mat4, Vec3};
use crate::input::InputState;
use crate::render::{GraphicsDevice, Mesh, Shader};
use crate::scene::components::{
    Camera, CameraController, MeshRenderer, Projection, SkyboxFollowCamera, TestMovement,
    TestRotation,
};
use crate::scene::error::{SceneError, SceneResult};
use crate::scene::frustum::Frustum;
use crate::scene::game_object::{GameObject, WeakGameObject};
use crate::scene::scene_graph::Scene;
use crate::scene::transform::{Transform, WeakTransform};
use crate::scene::uid::{self, Uid};
use std::cell::RefCell;
use std::path::Path;
use std::rc::{Rc, Weak};

/// The closed set of component behaviours
#[derive(Debug)]
pub enum ComponentKind {
    /// Viewpoint with a projection mode
    Camera(Camera),
    /// Keyboard-driven fly camera
    CameraController(CameraController),
    /// Draws a mesh through a camera, with frustum culling
    MeshRenderer(MeshRenderer),
    /// Pins its owner to a followed transform
    SkyboxFollowCamera(SkyboxFollowCamera),
    /// Constant-velocity mover
    TestMovement(TestMovement),
    /// Constant-rate spinner
    TestRotation(TestRotation),
}

impl ComponentKind {
    /// The document tag naming this behaviour
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Camera(_) => "camera",
            Self::CameraController(_) => "camera controller",
            Self::MeshRenderer(_) => "mesh renderer",
            Self::SkyboxFollowCamera(_) => "skybox follow camera",
            Self::TestMovement(_) => "test movement",
            Self::TestRotation(_) => "test rotation",
        }
    }
}

#[derive(Debug)]
struct ComponentData {
    uid: Uid,
    owner: WeakGameObject,
    transform: WeakTransform,
    initialized: bool,
    kind: ComponentKind,
}

/// Shared handle to one component instance
#[derive(Debug, Clone)]
pub struct Component {
    data: Rc<RefCell<ComponentData>>,
}

/// Non-owning handle to a [`Component`]
#[derive(Debug, Clone, Default)]
pub struct WeakComponent {
    data: Weak<RefCell<ComponentData>>,
}

impl WeakComponent {
    /// Create a handle bound to nothing
    pub fn new() -> Self {
        Self::default()
    }

    /// The live component, if it still exists
    pub fn upgrade(&self) -> Option<Component> {
        self.data.upgrade().map(|data| Component { data })
    }
}

impl PartialEq for Component {
    fn eq(&self, other: &Self) -> bool {
        self.uid() == other.uid()
    }
}

impl Eq for Component {}

impl Component {
    /// Create a camera with its projection mode already set
    pub fn camera(
        owner: &GameObject,
        projection: Projection,
        znear: f32,
        zfar: f32,
    ) -> SceneResult<Self> {
        Self::from_kind(
            uid::next_component_uid(),
            owner,
            ComponentKind::Camera(Camera::new(Some(projection), znear, zfar)),
        )
    }

    /// Create a keyboard fly controller for the owner's transform
    ///
    /// `move_speed` is in units per second, `look_speed` in degrees per
    /// second.
    pub fn camera_controller(
        owner: &GameObject,
        move_speed: f32,
        look_speed: f32,
    ) -> SceneResult<Self> {
        Self::from_kind(
            uid::next_component_uid(),
            owner,
            ComponentKind::CameraController(CameraController::new(move_speed, look_speed)),
        )
    }

    /// Create a renderer drawing `mesh` with `shader` through `camera`
    ///
    /// Fails if `camera` is not actually a camera component.
    pub fn mesh_renderer(
        owner: &GameObject,
        mesh: Rc<Mesh>,
        shader: Rc<RefCell<Shader>>,
        camera: &Component,
        culling_enabled: bool,
    ) -> SceneResult<Self> {
        if !camera.is_camera() {
            return Err(SceneError::NotACamera { uid: camera.uid() });
        }
        let state = MeshRenderer::new(
            mesh,
            shader,
            camera.downgrade(),
            camera.uid(),
            culling_enabled,
        );
        Self::from_kind(
            uid::next_component_uid(),
            owner,
            ComponentKind::MeshRenderer(state),
        )
    }

    /// Create a follower that pins the owner onto `target` every frame
    pub fn skybox_follow_camera(owner: &GameObject, target: &Transform) -> SceneResult<Self> {
        let state = SkyboxFollowCamera::new(target.downgrade(), target.uid());
        Self::from_kind(
            uid::next_component_uid(),
            owner,
            ComponentKind::SkyboxFollowCamera(state),
        )
    }

    /// Create a constant-velocity mover
    pub fn test_movement(owner: &GameObject, velocity: Vec3) -> SceneResult<Self> {
        Self::from_kind(
            uid::next_component_uid(),
            owner,
            ComponentKind::TestMovement(TestMovement::new(velocity)),
        )
    }

    /// Create a constant-rate spinner
    pub fn test_rotation(
        owner: &GameObject,
        axis: Vec3,
        degrees_per_second: f32,
    ) -> SceneResult<Self> {
        Self::from_kind(
            uid::next_component_uid(),
            owner,
            ComponentKind::TestRotation(TestRotation::new(axis, degrees_per_second)),
        )
    }

    /// Rebuild a component with a known uid; cross-references may still be
    /// unbound and must be resolved by [`late_bind`](Self::late_bind)
    pub(crate) fn restore(uid: Uid, owner: &GameObject, kind: ComponentKind) -> SceneResult<Self> {
        uid::observe_component_uid(uid);
        Self::from_kind(uid, owner, kind)
    }

    fn from_kind(uid: Uid, owner: &GameObject, kind: ComponentKind) -> SceneResult<Self> {
        let transform = owner.transform().ok_or(SceneError::Unbound {
            what: "owner transform",
            uid: owner.uid(),
        })?;
        Ok(Self {
            data: Rc::new(RefCell::new(ComponentData {
                uid,
                owner: owner.downgrade(),
                transform: transform.downgrade(),
                initialized: false,
                kind,
            })),
        })
    }

    /// Non-owning handle to this component
    pub fn downgrade(&self) -> WeakComponent {
        WeakComponent {
            data: Rc::downgrade(&self.data),
        }
    }

    /// This component's uid
    pub fn uid(&self) -> Uid {
        self.data.borrow().uid
    }

    /// The document tag naming this component's behaviour
    pub fn tag(&self) -> &'static str {
        self.data.borrow().kind.tag()
    }

    /// Whether this component is a camera
    pub fn is_camera(&self) -> bool {
        matches!(self.data.borrow().kind, ComponentKind::Camera(_))
    }

    /// Whether [`initialize`](Self::initialize) has run
    pub fn is_initialized(&self) -> bool {
        self.data.borrow().initialized
    }

    /// The game object this component belongs to, if it is alive
    pub fn owner(&self) -> Option<GameObject> {
        self.data.borrow().owner.upgrade()
    }

    /// Read-only access to the behaviour, for serialization
    pub(crate) fn with_kind<R>(&self, f: impl FnOnce(&ComponentKind) -> R) -> R {
        f(&self.data.borrow().kind)
    }

    fn owner_transform(&self) -> SceneResult<Transform> {
        let data = self.data.borrow();
        data.transform.upgrade().ok_or(SceneError::Unbound {
            what: "component transform",
            uid: data.uid,
        })
    }

    /// Resolve persisted cross-references against the live scene
    ///
    /// Repeated calls are harmless; references already bound are left
    /// untouched. Fails naming the uid when the referenced entity does not
    /// exist in the scene.
    pub fn late_bind(&self, scene: &Scene) -> SceneResult<()> {
        let missing_camera = {
            let data = self.data.borrow();
            match &data.kind {
                ComponentKind::MeshRenderer(renderer) if !renderer.camera_bound() => {
                    Some(renderer.camera_uid)
                }
                _ => None,
            }
        };
        if let Some(camera_uid) = missing_camera {
            let camera = scene
                .find_camera(camera_uid)
                .ok_or(SceneError::UnresolvedCamera { uid: camera_uid })?;
            if let ComponentKind::MeshRenderer(renderer) = &mut self.data.borrow_mut().kind {
                renderer.bind_camera(&camera);
            }
        }

        let missing_target = {
            let data = self.data.borrow();
            match &data.kind {
                ComponentKind::SkyboxFollowCamera(follow) if !follow.target_bound() => {
                    Some(follow.target_uid)
                }
                _ => None,
            }
        };
        if let Some(target_uid) = missing_target {
            let target = scene
                .find_transform(target_uid)
                .ok_or(SceneError::UnresolvedTransform { uid: target_uid })?;
            if let ComponentKind::SkyboxFollowCamera(follow) = &mut self.data.borrow_mut().kind {
                follow.bind_target(&target);
            }
        }
        Ok(())
    }

    /// Acquire device resources and mark the component live
    pub fn initialize(
        &self,
        device: &mut dyn GraphicsDevice,
        asset_root: &Path,
    ) -> SceneResult<()> {
        let mut data = self.data.borrow_mut();
        if let ComponentKind::MeshRenderer(renderer) = &mut data.kind {
            renderer.initialize(device, asset_root)?;
        }
        data.initialized = true;
        Ok(())
    }

    /// Input phase; only controllers react
    pub fn handle_input(&self, input: &InputState, delta_time: f32) -> SceneResult<()> {
        let mut transform = self.owner_transform()?;
        let data = self.data.borrow();
        if let ComponentKind::CameraController(controller) = &data.kind {
            controller.handle_input(input, &mut transform, delta_time)?;
        }
        Ok(())
    }

    /// Frame-start phase; followers snap to their targets here
    pub fn frame_start(&self, _delta_time: f32) -> SceneResult<()> {
        let mut transform = self.owner_transform()?;
        let data = self.data.borrow();
        if let ComponentKind::SkyboxFollowCamera(follow) = &data.kind {
            follow.frame_start(&mut transform)?;
        }
        Ok(())
    }

    /// Frame-update phase; movers and spinners advance their owners
    pub fn frame_update(&self, delta_time: f32) -> SceneResult<()> {
        let mut transform = self.owner_transform()?;
        let data = self.data.borrow();
        match &data.kind {
            ComponentKind::TestMovement(mover) => mover.frame_update(&mut transform, delta_time),
            ComponentKind::TestRotation(spinner) => {
                spinner.frame_update(&mut transform, delta_time)
            }
            _ => Ok(()),
        }
    }

    /// Frame-end phase; renderers cull and draw
    pub fn frame_end(&self, device: &mut dyn GraphicsDevice) -> SceneResult<()> {
        let transform = self.owner_transform()?;
        let data = self.data.borrow();
        if let ComponentKind::MeshRenderer(renderer) = &data.kind {
            renderer.frame_end(device, &transform, data.uid)?;
        }
        Ok(())
    }

    /// Release device resources and return to the uninitialized state
    pub fn shutdown(&self, device: &mut dyn GraphicsDevice) -> SceneResult<()> {
        let mut data = self.data.borrow_mut();
        data.initialized = false;
        if let ComponentKind::MeshRenderer(renderer) = &mut data.kind {
            renderer.shutdown(device)?;
        }
        Ok(())
    }

    /// View matrix of a camera component
    pub fn view_matrix(&self) -> SceneResult<Mat4> {
        let transform = self.owner_transform()?;
        let data = self.data.borrow();
        match &data.kind {
            ComponentKind::Camera(camera) => Ok(camera.view_matrix(&transform)),
            _ => Err(SceneError::NotACamera { uid: data.uid }),
        }
    }

    /// Projection matrix of a camera component
    pub fn projection_matrix(&self) -> SceneResult<Mat4> {
        let data = self.data.borrow();
        match &data.kind {
            ComponentKind::Camera(camera) => camera.projection_matrix(data.uid),
            _ => Err(SceneError::NotACamera { uid: data.uid }),
        }
    }

    /// View frustum of a camera component, in world space
    pub fn frustum(&self) -> SceneResult<Frustum> {
        let transform = self.owner_transform()?;
        let data = self.data.borrow();
        match &data.kind {
            ComponentKind::Camera(camera) => camera.frustum(&transform, data.uid),
            _ => Err(SceneError::NotACamera { uid: data.uid }),
        }
    }
}
