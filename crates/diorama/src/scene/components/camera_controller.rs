//! Free-flight camera controller
//!
//! WASD translates in the transform's own frame, Q and E move down and up,
//! and holding shift sprints. Arrow keys steer: left/right yaw about the
//! world Y axis so the horizon stays level, up/down pitch about the
//! camera's local X axis. Movement is in units per second and the look
//! rate in degrees per second; both scale with the frame's delta time.

use crate::foundation::math::{utils, Quat, Vec3};
use crate::input::{InputState, KeyCode, Modifiers};
use crate::scene::error::SceneResult;
use crate::scene::transform::Transform;

const SPRINT_MULTIPLIER: f32 = 3.0;

/// Camera controller state: movement and look rates
#[derive(Debug, Clone)]
pub struct CameraController {
    pub(crate) move_speed: f32,
    pub(crate) look_speed: f32,
}

impl CameraController {
    pub(crate) fn new(move_speed: f32, look_speed: f32) -> Self {
        Self {
            move_speed,
            look_speed,
        }
    }

    pub(crate) fn handle_input(
        &self,
        input: &InputState,
        transform: &mut Transform,
        delta_time: f32,
    ) -> SceneResult<()> {
        let mut translation = Vec3::zeros();
        if input.key_held(KeyCode::W) {
            translation += transform.forwards();
        }
        if input.key_held(KeyCode::S) {
            translation -= transform.forwards();
        }
        if input.key_held(KeyCode::D) {
            translation += transform.right();
        }
        if input.key_held(KeyCode::A) {
            translation -= transform.right();
        }
        if input.key_held(KeyCode::E) {
            translation += transform.up();
        }
        if input.key_held(KeyCode::Q) {
            translation -= transform.up();
        }

        if translation.norm_squared() > f32::EPSILON {
            let sprint = if input.modifiers().contains(Modifiers::SHIFT) {
                SPRINT_MULTIPLIER
            } else {
                1.0
            };
            let step = translation.normalize() * self.move_speed * sprint * delta_time;
            transform.set_world_position(transform.world_position() + step)?;
        }

        let look_rate = utils::deg_to_rad(self.look_speed);
        let mut yaw = 0.0;
        if input.key_held(KeyCode::Left) {
            yaw += look_rate * delta_time;
        }
        if input.key_held(KeyCode::Right) {
            yaw -= look_rate * delta_time;
        }
        if yaw != 0.0 {
            let turn = Quat::from_axis_angle(&Vec3::y_axis(), yaw);
            transform.set_world_rotation(turn * transform.world_rotation())?;
        }

        let mut pitch = 0.0;
        if input.key_held(KeyCode::Up) {
            pitch += look_rate * delta_time;
        }
        if input.key_held(KeyCode::Down) {
            pitch -= look_rate * delta_time;
        }
        if pitch != 0.0 {
            let tilt = Quat::from_axis_angle(&Vec3::x_axis(), pitch);
            transform.set_local_rotation(transform.local_rotation() * tilt)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-5;

    fn held(keys: &[KeyCode]) -> InputState {
        let mut input = InputState::new();
        for key in keys {
            input.handle_key_input(*key, true);
        }
        input
    }

    #[test]
    fn test_w_moves_along_forward_axis() {
        let controller = CameraController::new(2.0, 1.0);
        let mut transform = Transform::new();
        controller
            .handle_input(&held(&[KeyCode::W]), &mut transform, 1.0)
            .unwrap();
        let position = transform.world_position();
        assert_relative_eq!(position.z, -2.0, epsilon = EPSILON);
        assert_relative_eq!(position.x, 0.0, epsilon = EPSILON);
    }

    #[test]
    fn test_sprint_multiplies_speed() {
        let controller = CameraController::new(2.0, 1.0);
        let mut transform = Transform::new();
        let mut input = held(&[KeyCode::W]);
        input.handle_modifiers(Modifiers::SHIFT);
        controller.handle_input(&input, &mut transform, 1.0).unwrap();
        assert_relative_eq!(transform.world_position().z, -6.0, epsilon = EPSILON);
    }

    #[test]
    fn test_opposing_keys_cancel() {
        let controller = CameraController::new(2.0, 1.0);
        let mut transform = Transform::new();
        controller
            .handle_input(&held(&[KeyCode::W, KeyCode::S]), &mut transform, 1.0)
            .unwrap();
        assert_relative_eq!(transform.world_position().norm(), 0.0, epsilon = EPSILON);
    }

    #[test]
    fn test_diagonal_movement_is_normalized() {
        let controller = CameraController::new(1.0, 1.0);
        let mut transform = Transform::new();
        controller
            .handle_input(&held(&[KeyCode::W, KeyCode::D]), &mut transform, 1.0)
            .unwrap();
        assert_relative_eq!(transform.world_position().norm(), 1.0, epsilon = EPSILON);
    }

    #[test]
    fn test_left_arrow_yaws_about_world_y() {
        let controller = CameraController::new(1.0, 90.0);
        let mut transform = Transform::new();
        controller
            .handle_input(&held(&[KeyCode::Left]), &mut transform, 1.0)
            .unwrap();
        let forwards = transform.forwards();
        assert_relative_eq!(forwards.x, -1.0, epsilon = EPSILON);
        assert_relative_eq!(forwards.z, 0.0, epsilon = EPSILON);
    }

    #[test]
    fn test_up_arrow_pitches_camera() {
        let controller = CameraController::new(1.0, 90.0);
        let mut transform = Transform::new();
        controller
            .handle_input(&held(&[KeyCode::Up]), &mut transform, 1.0)
            .unwrap();
        let forwards = transform.forwards();
        assert_relative_eq!(forwards.y, 1.0, epsilon = EPSILON);
    }

    #[test]
    fn test_look_speed_is_in_degrees_per_second() {
        let controller = CameraController::new(1.0, 45.0);
        let mut transform = Transform::new();
        let input = held(&[KeyCode::Left]);
        controller.handle_input(&input, &mut transform, 1.0).unwrap();
        controller.handle_input(&input, &mut transform, 1.0).unwrap();

        // Two seconds at 45 degrees per second is a quarter turn.
        let forwards = transform.forwards();
        assert_relative_eq!(forwards.x, -1.0, epsilon = EPSILON);
        assert_relative_eq!(forwards.z, 0.0, epsilon = EPSILON);
    }
}
