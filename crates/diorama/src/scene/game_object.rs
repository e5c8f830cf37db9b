//! Game objects
//!
//! A [`GameObject`] is a named, uid-carrying bag of components attached to
//! one transform node for its whole lifetime. Component order is
//! significant: it is update order, and it survives serialization. Like
//! [`Transform`](crate::scene::Transform), a `GameObject` is a cheap shared
//! handle comparing equal by uid.

use crate::scene::component::Component;
use crate::scene::error::{SceneError, SceneResult};
use crate::scene::transform::{Transform, WeakTransform};
use crate::scene::uid::{self, Uid};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

#[derive(Debug)]
struct GameObjectData {
    uid: Uid,
    name: String,
    transform: WeakTransform,
    components: Vec<Component>,
}

/// A named entity in the scene graph
#[derive(Debug, Clone)]
pub struct GameObject {
    data: Rc<RefCell<GameObjectData>>,
}

/// Non-owning handle to a [`GameObject`]
#[derive(Debug, Clone, Default)]
pub struct WeakGameObject {
    data: Weak<RefCell<GameObjectData>>,
}

impl WeakGameObject {
    /// Create a handle bound to nothing
    pub fn new() -> Self {
        Self::default()
    }

    /// The live game object, if it still exists
    pub fn upgrade(&self) -> Option<GameObject> {
        self.data.upgrade().map(|data| GameObject { data })
    }
}

impl PartialEq for GameObject {
    fn eq(&self, other: &Self) -> bool {
        self.uid() == other.uid()
    }
}

impl Eq for GameObject {}

impl GameObject {
    /// Create a detached game object with a fresh uid
    pub fn new(name: &str) -> Self {
        Self::restore(uid::next_game_object_uid(), name)
    }

    /// Rebuild a game object with a known uid
    ///
    /// The uid is observed so ids issued later never collide with it.
    pub(crate) fn restore(uid: Uid, name: &str) -> Self {
        uid::observe_game_object_uid(uid);
        Self {
            data: Rc::new(RefCell::new(GameObjectData {
                uid,
                name: name.to_owned(),
                transform: WeakTransform::new(),
                components: Vec::new(),
            })),
        }
    }

    /// Non-owning handle to this game object
    pub fn downgrade(&self) -> WeakGameObject {
        WeakGameObject {
            data: Rc::downgrade(&self.data),
        }
    }

    /// This game object's uid
    pub fn uid(&self) -> Uid {
        self.data.borrow().uid
    }

    /// The game object's name
    pub fn name(&self) -> String {
        self.data.borrow().name.clone()
    }

    /// The transform this game object is attached to, if it is alive
    pub fn transform(&self) -> Option<Transform> {
        self.data.borrow().transform.upgrade()
    }

    /// Record the owning transform; driven by
    /// [`Transform::attach_game_object`]
    pub(crate) fn bind_transform(&self, transform: &Transform) {
        self.data.borrow_mut().transform = transform.downgrade();
    }

    /// Handles to the components, in update order
    pub fn components(&self) -> Vec<Component> {
        self.data.borrow().components.clone()
    }

    /// Number of attached components
    pub fn component_count(&self) -> usize {
        self.data.borrow().components.len()
    }

    /// Append a component
    ///
    /// Fails if this exact component instance is already attached.
    pub fn add_component(&mut self, component: &Component) -> SceneResult<()> {
        let position = self.data.borrow().components.len();
        self.insert_component(component, position)
    }

    /// Insert a component at a position in the update order
    pub fn add_component_at(&mut self, component: &Component, position: usize) -> SceneResult<()> {
        let len = self.data.borrow().components.len();
        if position > len {
            return Err(SceneError::IndexOutOfRange {
                index: position,
                len,
            });
        }
        self.insert_component(component, position)
    }

    /// Detach a component
    pub fn remove_component(&mut self, component: &Component) -> SceneResult<()> {
        let component_uid = component.uid();
        let position = self
            .data
            .borrow()
            .components
            .iter()
            .position(|c| c.uid() == component_uid)
            .ok_or(SceneError::ComponentNotFound { uid: component_uid })?;
        self.remove_component_at(position)?;
        Ok(())
    }

    /// Detach the component at a position and return its handle
    pub fn remove_component_at(&mut self, position: usize) -> SceneResult<Component> {
        let len = self.data.borrow().components.len();
        if position >= len {
            return Err(SceneError::IndexOutOfRange {
                index: position,
                len,
            });
        }
        Ok(self.data.borrow_mut().components.remove(position))
    }

    fn insert_component(&mut self, component: &Component, position: usize) -> SceneResult<()> {
        let component_uid = component.uid();
        if self
            .data
            .borrow()
            .components
            .iter()
            .any(|c| c.uid() == component_uid)
        {
            return Err(SceneError::DuplicateComponent { uid: component_uid });
        }
        self.data
            .borrow_mut()
            .components
            .insert(position, component.clone());
        Ok(())
    }
}
