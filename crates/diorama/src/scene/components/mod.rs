//! Concrete component behaviours
//!
//! Each submodule holds the state and per-frame logic for one component
//! kind. Construction, ownership, lifecycle dispatch, and late binding
//! all live in [`crate::scene::component`]; these types are only the
//! payloads it dispatches to.

pub mod camera;
pub mod camera_controller;
pub mod mesh_renderer;
pub mod skybox_follow_camera;
pub mod test_movement;
pub mod test_rotation;

pub use camera::{Camera, Projection};
pub use camera_controller::CameraController;
pub use mesh_renderer::MeshRenderer;
pub use skybox_follow_camera::SkyboxFollowCamera;
pub use test_movement::TestMovement;
pub use test_rotation::TestRotation;
