//! Hierarchical spatial transforms
//!
//! A [`Transform`] is a shared handle to one node of the scene graph. Each
//! node carries local position, rotation, and scale plus cached world-space
//! derivatives; parents own their children, children point back through
//! weak references. Handles compare equal when they refer to the same node
//! (uid identity), and cloning a handle never copies the node.
//!
//! Every mutation recomputes the node's cached world transform from its
//! ancestors' local values and pushes fresh values through the whole
//! subtree, so cached world state is never stale between mutations. The
//! recompute walks ancestor locals rather than their cached products, which
//! keeps any mutation order consistent.

use crate::foundation::math::{Mat4, Point3, Quat, Vec3};
use crate::scene::error::{SceneError, SceneResult};
use crate::scene::game_object::GameObject;
use crate::scene::uid::{self, Uid};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// The data contained by a [`Transform`] node
#[derive(Debug)]
pub struct TransformData {
    uid: Uid,
    local_position: Vec3,
    local_rotation: Quat,
    local_scale: Vec3,
    local_to_world: Mat4,
    world_to_local: Mat4,
    world_rotation: Quat,
    world_scale: Vec3,
    parent: Option<WeakTransform>,
    children: Vec<Transform>,
    game_object: Option<GameObject>,
}

impl TransformData {
    fn local_model_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.local_position)
            * self.local_rotation.to_homogeneous()
            * Mat4::new_nonuniform_scaling(&self.local_scale)
    }
}

/// A node of the transform hierarchy
///
/// This is a cheap, clonable handle; all clones refer to the same node.
#[derive(Debug, Clone)]
pub struct Transform {
    data: Rc<RefCell<TransformData>>,
}

/// Non-owning handle to a [`Transform`]
///
/// Never keeps the node alive; [`upgrade`](Self::upgrade) yields `None`
/// once the node has been destroyed.
#[derive(Debug, Clone, Default)]
pub struct WeakTransform {
    data: Weak<RefCell<TransformData>>,
}

impl WeakTransform {
    /// Create a handle bound to nothing
    pub fn new() -> Self {
        Self::default()
    }

    /// The live node, if it still exists
    pub fn upgrade(&self) -> Option<Transform> {
        self.data.upgrade().map(|data| Transform { data })
    }
}

impl PartialEq for Transform {
    fn eq(&self, other: &Self) -> bool {
        self.uid() == other.uid()
    }
}

impl Eq for Transform {}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

impl Transform {
    /// Create a detached node with identity position, rotation, and scale
    pub fn new() -> Self {
        Self::restore(
            uid::next_transform_uid(),
            Vec3::zeros(),
            Quat::identity(),
            Vec3::new(1.0, 1.0, 1.0),
        )
    }

    /// Rebuild a detached node with a known uid and local values
    ///
    /// The uid is observed so ids issued later never collide with it.
    pub(crate) fn restore(uid: Uid, position: Vec3, rotation: Quat, scale: Vec3) -> Self {
        uid::observe_transform_uid(uid);
        let transform = Self {
            data: Rc::new(RefCell::new(TransformData {
                uid,
                local_position: position,
                local_rotation: rotation,
                local_scale: scale,
                local_to_world: Mat4::identity(),
                world_to_local: Mat4::identity(),
                world_rotation: Quat::identity(),
                world_scale: Vec3::new(1.0, 1.0, 1.0),
                parent: None,
                children: Vec::new(),
                game_object: None,
            })),
        };
        // A detached node's world values are its local values.
        transform.apply_parent_world(&Mat4::identity(), &Quat::identity(), &Vec3::new(1.0, 1.0, 1.0));
        transform
    }

    /// Non-owning handle to this node
    pub fn downgrade(&self) -> WeakTransform {
        WeakTransform {
            data: Rc::downgrade(&self.data),
        }
    }

    /// This node's uid
    pub fn uid(&self) -> Uid {
        self.data.borrow().uid
    }

    // --- local accessors -------------------------------------------------

    /// Position relative to the parent
    pub fn local_position(&self) -> Vec3 {
        self.data.borrow().local_position
    }

    /// Rotation relative to the parent
    pub fn local_rotation(&self) -> Quat {
        self.data.borrow().local_rotation
    }

    /// Scale relative to the parent
    pub fn local_scale(&self) -> Vec3 {
        self.data.borrow().local_scale
    }

    /// Translation, rotation, and scale composed into one local matrix,
    /// scale applied innermost
    pub fn local_model_matrix(&self) -> Mat4 {
        self.data.borrow().local_model_matrix()
    }

    // --- world accessors -------------------------------------------------

    /// Position in world space
    pub fn world_position(&self) -> Vec3 {
        let matrix = self.data.borrow().local_to_world;
        Vec3::new(matrix[(0, 3)], matrix[(1, 3)], matrix[(2, 3)])
    }

    /// Rotation accumulated down the ancestor chain
    pub fn world_rotation(&self) -> Quat {
        self.data.borrow().world_rotation
    }

    /// Scale accumulated down the ancestor chain
    pub fn world_scale(&self) -> Vec3 {
        self.data.borrow().world_scale
    }

    /// Cached local-to-world matrix
    ///
    /// Equal to the product of every ancestor's local model matrix (root
    /// first) with this node's own.
    pub fn local_to_world_matrix(&self) -> Mat4 {
        self.data.borrow().local_to_world
    }

    /// Cached world-to-local matrix
    pub fn world_to_local_matrix(&self) -> Mat4 {
        self.data.borrow().world_to_local
    }

    /// The world model matrix used for rendering
    pub fn world_model_matrix(&self) -> Mat4 {
        self.local_to_world_matrix()
    }

    /// World-space forward axis (canonical forward is -Z)
    pub fn forwards(&self) -> Vec3 {
        self.world_rotation() * -Vec3::z()
    }

    /// World-space right axis (canonical right is +X)
    pub fn right(&self) -> Vec3 {
        self.world_rotation() * Vec3::x()
    }

    /// World-space up axis (canonical up is +Y)
    pub fn up(&self) -> Vec3 {
        self.world_rotation() * Vec3::y()
    }

    /// Map a point from this node's local space to world space
    pub fn transform_point_to_world_space(&self, point: Vec3) -> Vec3 {
        self.data
            .borrow()
            .local_to_world
            .transform_point(&Point3::from(point))
            .coords
    }

    /// Map a point from world space to this node's local space
    pub fn transform_point_to_local_space(&self, point: Vec3) -> Vec3 {
        self.data
            .borrow()
            .world_to_local
            .transform_point(&Point3::from(point))
            .coords
    }

    // --- mutators --------------------------------------------------------

    /// Set position relative to the parent
    pub fn set_local_position(&mut self, position: Vec3) -> SceneResult<()> {
        self.data.borrow_mut().local_position = position;
        self.refresh_world_transforms()
    }

    /// Set rotation relative to the parent
    pub fn set_local_rotation(&mut self, rotation: Quat) -> SceneResult<()> {
        self.data.borrow_mut().local_rotation = rotation;
        self.refresh_world_transforms()
    }

    /// Set scale relative to the parent
    pub fn set_local_scale(&mut self, scale: Vec3) -> SceneResult<()> {
        self.data.borrow_mut().local_scale = scale;
        self.refresh_world_transforms()
    }

    /// Move the node to a world-space position
    ///
    /// Converts through the parent's cached world-to-local matrix and then
    /// behaves as [`set_local_position`](Self::set_local_position).
    pub fn set_world_position(&mut self, position: Vec3) -> SceneResult<()> {
        let local = match self.parent_handle()? {
            Some(parent) => parent.transform_point_to_local_space(position),
            None => position,
        };
        self.set_local_position(local)
    }

    /// Rotate the node to a world-space orientation
    pub fn set_world_rotation(&mut self, rotation: Quat) -> SceneResult<()> {
        let local = match self.parent_handle()? {
            Some(parent) => parent.world_rotation().inverse() * rotation,
            None => rotation,
        };
        self.set_local_rotation(local)
    }

    /// Scale the node to a world-space scale
    pub fn set_world_scale(&mut self, scale: Vec3) -> SceneResult<()> {
        let local = match self.parent_handle()? {
            Some(parent) => scale.component_div(&parent.world_scale()),
            None => scale,
        };
        self.set_local_scale(local)
    }

    // --- hierarchy -------------------------------------------------------

    /// The parent node, if any
    pub fn parent(&self) -> Option<Transform> {
        self.data
            .borrow()
            .parent
            .as_ref()
            .and_then(WeakTransform::upgrade)
    }

    /// Handles to the node's children, in order
    pub fn children(&self) -> Vec<Transform> {
        self.data.borrow().children.clone()
    }

    /// Number of direct children
    pub fn child_count(&self) -> usize {
        self.data.borrow().children.len()
    }

    /// Append a child to this node
    ///
    /// Fails if the child is already present, already has a parent, or is
    /// an ancestor of this node.
    pub fn add_child(&mut self, child: &Transform) -> SceneResult<()> {
        let position = self.data.borrow().children.len();
        self.insert_child(child, position)
    }

    /// Insert a child at a position in the child list
    pub fn add_child_at(&mut self, child: &Transform, position: usize) -> SceneResult<()> {
        let len = self.data.borrow().children.len();
        if position > len {
            return Err(SceneError::IndexOutOfRange {
                index: position,
                len,
            });
        }
        self.insert_child(child, position)
    }

    /// Detach a child from this node
    ///
    /// The caller's handle keeps the detached subtree alive; without one it
    /// is destroyed here.
    pub fn remove_child(&mut self, child: &Transform) -> SceneResult<()> {
        let child_uid = child.uid();
        let position = self
            .data
            .borrow()
            .children
            .iter()
            .position(|c| c.uid() == child_uid)
            .ok_or(SceneError::ChildNotFound { uid: child_uid })?;
        self.remove_child_at(position)?;
        Ok(())
    }

    /// Detach the child at a position and return its handle
    pub fn remove_child_at(&mut self, position: usize) -> SceneResult<Transform> {
        let len = self.data.borrow().children.len();
        if position >= len {
            return Err(SceneError::IndexOutOfRange {
                index: position,
                len,
            });
        }
        let removed = self.data.borrow_mut().children.remove(position);
        removed.data.borrow_mut().parent = None;
        removed.refresh_world_transforms()?;
        Ok(removed)
    }

    /// Move this node under a new parent, or detach it entirely
    ///
    /// Local values are preserved, so the node's world placement follows
    /// its new ancestry. Use the world setters afterwards when a particular
    /// world placement must survive the reparent.
    pub fn set_parent(&mut self, new_parent: Option<&Transform>) -> SceneResult<()> {
        if let Some(parent) = new_parent {
            if parent.uid() == self.uid() || parent.has_ancestor(self.uid())? {
                return Err(SceneError::CyclicParent {
                    child: self.uid(),
                    parent: parent.uid(),
                });
            }
        }
        self.detach_from_parent()?;
        if let Some(parent) = new_parent {
            parent.clone().add_child(self)?;
        }
        Ok(())
    }

    // --- game object -----------------------------------------------------

    /// The game object attached to this node, if any
    pub fn game_object(&self) -> Option<GameObject> {
        self.data.borrow().game_object.clone()
    }

    /// Attach a game object to this node
    ///
    /// A node holds at most one game object and a game object belongs to at
    /// most one node, for its whole lifetime.
    pub fn attach_game_object(&mut self, game_object: &GameObject) -> SceneResult<()> {
        if self.data.borrow().game_object.is_some() {
            return Err(SceneError::GameObjectAlreadyAttached { uid: self.uid() });
        }
        if game_object.transform().is_some() {
            return Err(SceneError::GameObjectReattached {
                uid: game_object.uid(),
            });
        }
        game_object.bind_transform(self);
        self.data.borrow_mut().game_object = Some(game_object.clone());
        Ok(())
    }

    // --- cache maintenance -----------------------------------------------

    /// Upgrade the parent reference, treating a dead target as fatal
    fn parent_handle(&self) -> SceneResult<Option<Transform>> {
        let weak = self.data.borrow().parent.clone();
        match weak {
            None => Ok(None),
            Some(weak) => weak
                .upgrade()
                .map(Some)
                .ok_or_else(|| SceneError::Unbound {
                    what: "parent transform",
                    uid: self.uid(),
                }),
        }
    }

    fn has_ancestor(&self, uid: Uid) -> SceneResult<bool> {
        let mut cursor = self.parent_handle()?;
        while let Some(ancestor) = cursor {
            if ancestor.uid() == uid {
                return Ok(true);
            }
            cursor = ancestor.parent_handle()?;
        }
        Ok(false)
    }

    fn insert_child(&mut self, child: &Transform, position: usize) -> SceneResult<()> {
        let child_uid = child.uid();
        if self
            .data
            .borrow()
            .children
            .iter()
            .any(|c| c.uid() == child_uid)
        {
            return Err(SceneError::DuplicateChild { uid: child_uid });
        }
        if child.parent_handle()?.is_some() {
            return Err(SceneError::ChildAlreadyParented { uid: child_uid });
        }
        if child_uid == self.uid() || self.has_ancestor(child_uid)? {
            return Err(SceneError::CyclicParent {
                child: child_uid,
                parent: self.uid(),
            });
        }
        self.data.borrow_mut().children.insert(position, child.clone());
        child.data.borrow_mut().parent = Some(self.downgrade());
        child.refresh_world_transforms()
    }

    fn detach_from_parent(&mut self) -> SceneResult<()> {
        if let Some(mut parent) = self.parent_handle()? {
            parent.remove_child(self)?;
        }
        Ok(())
    }

    /// Recompute this node's cached world values from ancestor locals and
    /// push the result through every descendant
    fn refresh_world_transforms(&self) -> SceneResult<()> {
        let (matrix, rotation, scale) = self.parent_world_from_locals()?;
        self.apply_parent_world(&matrix, &rotation, &scale);
        Ok(())
    }

    /// Accumulate the ancestor chain's local model matrices, rotations, and
    /// scales, root first
    fn parent_world_from_locals(&self) -> SceneResult<(Mat4, Quat, Vec3)> {
        let mut chain = Vec::new();
        let mut cursor = self.parent_handle()?;
        while let Some(ancestor) = cursor {
            cursor = ancestor.parent_handle()?;
            chain.push(ancestor);
        }

        let mut matrix = Mat4::identity();
        let mut rotation = Quat::identity();
        let mut scale = Vec3::new(1.0, 1.0, 1.0);
        for ancestor in chain.iter().rev() {
            let data = ancestor.data.borrow();
            matrix *= data.local_model_matrix();
            rotation *= data.local_rotation;
            scale.component_mul_assign(&data.local_scale);
        }
        Ok((matrix, rotation, scale))
    }

    fn apply_parent_world(&self, parent_matrix: &Mat4, parent_rotation: &Quat, parent_scale: &Vec3) {
        let matrix;
        let rotation;
        let scale;
        let children;
        {
            let mut data = self.data.borrow_mut();
            matrix = parent_matrix * data.local_model_matrix();
            rotation = parent_rotation * data.local_rotation;
            scale = parent_scale.component_mul(&data.local_scale);
            data.local_to_world = matrix;
            data.world_to_local = matrix.try_inverse().unwrap_or_else(|| {
                log::warn!(
                    "transform {}: singular local-to-world matrix, world-to-local left as identity",
                    data.uid
                );
                Mat4::identity()
            });
            data.world_rotation = rotation;
            data.world_scale = scale;
            children = data.children.clone();
        }
        for child in children {
            child.apply_parent_world(&matrix, &rotation, &scale);
        }
    }
}
