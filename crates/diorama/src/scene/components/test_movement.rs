//! Constant-velocity mover used by scene tests and demos

use crate::foundation::math::Vec3;
use crate::scene::error::SceneResult;
use crate::scene::transform::Transform;

/// Constant-velocity mover state
#[derive(Debug)]
pub struct TestMovement {
    pub(crate) velocity: Vec3,
}

impl TestMovement {
    pub(crate) fn new(velocity: Vec3) -> Self {
        Self { velocity }
    }

    /// Advance the owner along its velocity, framerate independent
    pub(crate) fn frame_update(
        &self,
        transform: &mut Transform,
        delta_time: f32,
    ) -> SceneResult<()> {
        let position = transform.local_position() + self.velocity * delta_time;
        transform.set_local_position(position)
    }
}
