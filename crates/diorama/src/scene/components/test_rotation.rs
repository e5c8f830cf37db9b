//! Constant-rate spinner used by scene tests and demos

use crate::foundation::math::{utils, Quat, Unit, Vec3};
use crate::scene::error::SceneResult;
use crate::scene::transform::Transform;

/// Constant-rate spinner state
#[derive(Debug)]
pub struct TestRotation {
    pub(crate) axis: Vec3,
    pub(crate) degrees_per_second: f32,
}

impl TestRotation {
    pub(crate) fn new(axis: Vec3, degrees_per_second: f32) -> Self {
        Self {
            axis,
            degrees_per_second,
        }
    }

    /// Spin the owner around its axis; a degenerate axis spins nothing
    pub(crate) fn frame_update(
        &self,
        transform: &mut Transform,
        delta_time: f32,
    ) -> SceneResult<()> {
        let Some(axis) = Unit::try_new(self.axis, 1e-6) else {
            return Ok(());
        };
        let angle = utils::deg_to_rad(self.degrees_per_second) * delta_time;
        let spin = Quat::from_axis_angle(&axis, angle);
        transform.set_local_rotation(transform.local_rotation() * spin)
    }
}
