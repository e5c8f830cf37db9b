//! Scene graph, game objects, and components
//!
//! The transform hierarchy is the scene's spine: every game object hangs
//! off a [`Transform`], every component hangs off a [`GameObject`], and
//! the [`Scene`] drives the whole tree through its frame phases. All of
//! these are cheap shared handles over reference-counted state, compared
//! by uid; parents are held weakly so a subtree drops cleanly when its
//! owning handle goes away.

pub mod component;
pub mod components;
pub mod error;
pub mod frustum;
pub mod game_object;
pub mod scene_graph;
pub mod transform;
pub mod uid;

pub use component::{Component, ComponentKind, WeakComponent};
pub use components::{
    Camera, CameraController, MeshRenderer, Projection, SkyboxFollowCamera, TestMovement,
    TestRotation,
};
pub use error::{SceneError, SceneResult};
pub use frustum::{Frustum, Plane};
pub use game_object::{GameObject, WeakGameObject};
pub use scene_graph::Scene;
pub use transform::{Transform, WeakTransform};
pub use uid::Uid;
