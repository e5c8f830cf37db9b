//! Skybox follow state
//!
//! Pins its owner's world position to a target transform (normally the
//! active camera) at the start of every frame, so the skybox geometry
//! never drifts relative to the viewpoint while rotation still applies.

use crate::scene::error::{SceneError, SceneResult};
use crate::scene::transform::{Transform, WeakTransform};
use crate::scene::uid::Uid;

/// Skybox follow state
#[derive(Debug)]
pub struct SkyboxFollowCamera {
    pub(crate) target: WeakTransform,
    pub(crate) target_uid: Uid,
}

impl SkyboxFollowCamera {
    pub(crate) fn new(target: WeakTransform, target_uid: Uid) -> Self {
        Self { target, target_uid }
    }

    pub(crate) fn target_bound(&self) -> bool {
        self.target.upgrade().is_some()
    }

    pub(crate) fn bind_target(&mut self, target: &Transform) {
        self.target = target.downgrade();
    }

    /// Snap the owner onto the target's world position
    pub(crate) fn frame_start(&self, transform: &mut Transform) -> SceneResult<()> {
        let target = self.target.upgrade().ok_or(SceneError::Unbound {
            what: "follow target",
            uid: self.target_uid,
        })?;
        transform.set_world_position(target.world_position())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn test_owner_snaps_to_target_world_position() {
        let mut target = Transform::new();
        target
            .set_local_position(Vec3::new(4.0, -2.0, 9.0))
            .unwrap();

        let mut skybox = Transform::new();
        let follow = SkyboxFollowCamera::new(target.downgrade(), target.uid());
        follow.frame_start(&mut skybox).unwrap();

        assert_relative_eq!(skybox.world_position().x, 4.0, epsilon = EPSILON);
        assert_relative_eq!(skybox.world_position().y, -2.0, epsilon = EPSILON);
        assert_relative_eq!(skybox.world_position().z, 9.0, epsilon = EPSILON);
    }

    #[test]
    fn test_dropped_target_is_fatal() {
        let target = Transform::new();
        let uid = target.uid();
        let follow = SkyboxFollowCamera::new(target.downgrade(), uid);
        drop(target);

        let mut skybox = Transform::new();
        let err = follow.frame_start(&mut skybox).unwrap_err();
        assert!(matches!(
            err,
            SceneError::Unbound {
                what: "follow target",
                ..
            }
        ));
    }
}
