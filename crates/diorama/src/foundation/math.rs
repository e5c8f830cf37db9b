//! Math utilities and types
//!
//! Provides fundamental math types for 3D graphics, re-exported from
//! nalgebra under short aliases, plus the projection/view matrix
//! constructors the camera needs.

pub use nalgebra::{
    Vector2, Vector3, Vector4,
    Matrix3, Matrix4,
    Quaternion,
    Unit,
};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// 2 * Pi
    pub const TAU: f32 = 2.0 * PI;

    /// Pi / 2
    pub const HALF_PI: f32 = PI * 0.5;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;

    /// Radians to degrees conversion factor
    pub const RAD_TO_DEG: f32 = 180.0 / PI;
}

/// Math utility functions
pub mod utils {
    use super::constants;

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// Convert radians to degrees
    pub fn rad_to_deg(radians: f32) -> f32 {
        radians * constants::RAD_TO_DEG
    }

    /// Linear interpolation
    pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
        a + (b - a) * t
    }
}

/// Extension trait for Mat4 with additional convenience methods
pub trait Mat4Ext {
    /// Create a rotation matrix around the X axis
    fn rotation_x(angle: f32) -> Mat4;

    /// Create a rotation matrix around the Y axis
    fn rotation_y(angle: f32) -> Mat4;

    /// Create a rotation matrix around the Z axis
    fn rotation_z(angle: f32) -> Mat4;

    /// Create a right-handed perspective projection matrix
    ///
    /// `fov_y` is the vertical field of view in radians. Depth maps to the
    /// [-1, 1] clip range.
    fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4;

    /// Create a right-handed orthographic projection matrix over the given
    /// view-volume extents
    fn orthographic(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4;

    /// Create a right-handed look-at view matrix
    fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4;
}

impl Mat4Ext for Mat4 {
    fn rotation_x(angle: f32) -> Mat4 {
        Mat4::from_axis_angle(&Vec3::x_axis(), angle)
    }

    fn rotation_y(angle: f32) -> Mat4 {
        Mat4::from_axis_angle(&Vec3::y_axis(), angle)
    }

    fn rotation_z(angle: f32) -> Mat4 {
        Mat4::from_axis_angle(&Vec3::z_axis(), angle)
    }

    fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
        let tan_half_fovy = (fov_y * 0.5).tan();

        let mut result = Mat4::zeros();
        result[(0, 0)] = 1.0 / (aspect * tan_half_fovy);
        result[(1, 1)] = 1.0 / tan_half_fovy;
        result[(2, 2)] = (far + near) / (near - far);
        result[(2, 3)] = (2.0 * far * near) / (near - far);
        result[(3, 2)] = -1.0;

        result
    }

    fn orthographic(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4 {
        let mut result = Mat4::identity();
        result[(0, 0)] = 2.0 / (right - left);
        result[(1, 1)] = 2.0 / (top - bottom);
        result[(2, 2)] = -2.0 / (far - near);
        result[(0, 3)] = -(right + left) / (right - left);
        result[(1, 3)] = -(top + bottom) / (top - bottom);
        result[(2, 3)] = -(far + near) / (far - near);

        result
    }

    fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
        let forward = (target - eye).normalize();
        let right = forward.cross(&up).normalize();
        let camera_up = right.cross(&forward);

        let translation = Mat4::new(
            1.0, 0.0, 0.0, -eye.x,
            0.0, 1.0, 0.0, -eye.y,
            0.0, 0.0, 1.0, -eye.z,
            0.0, 0.0, 0.0, 1.0,
        );

        let rotation = Mat4::new(
            right.x, right.y, right.z, 0.0,
            camera_up.x, camera_up.y, camera_up.z, 0.0,
            -forward.x, -forward.y, -forward.z, 0.0,
            0.0, 0.0, 0.0, 1.0,
        );

        rotation * translation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-6;

    #[test]
    fn test_deg_rad_round_trip() {
        assert_relative_eq!(utils::deg_to_rad(180.0), constants::PI, epsilon = EPSILON);
        assert_relative_eq!(utils::rad_to_deg(constants::HALF_PI), 90.0, epsilon = EPSILON);
    }

    #[test]
    fn test_look_at_moves_eye_to_origin() {
        let eye = Vec3::new(3.0, 2.0, 5.0);
        let view = Mat4::look_at(eye, Vec3::zeros(), Vec3::y());
        let transformed = view.transform_point(&Point3::new(eye.x, eye.y, eye.z));
        assert_relative_eq!(transformed.x, 0.0, epsilon = EPSILON);
        assert_relative_eq!(transformed.y, 0.0, epsilon = EPSILON);
        assert_relative_eq!(transformed.z, 0.0, epsilon = EPSILON);
    }

    #[test]
    fn test_look_at_faces_negative_z() {
        // A point straight ahead of the camera lands on the view-space -Z axis.
        let view = Mat4::look_at(Vec3::zeros(), Vec3::new(0.0, 0.0, -10.0), Vec3::y());
        let ahead = view.transform_point(&Point3::new(0.0, 0.0, -4.0));
        assert_relative_eq!(ahead.z, -4.0, epsilon = EPSILON);
        assert_relative_eq!(ahead.x, 0.0, epsilon = EPSILON);
    }

    #[test]
    fn test_perspective_depth_range() {
        let proj = Mat4::perspective(utils::deg_to_rad(60.0), 1.0, 0.1, 100.0);

        let near_point = proj.transform_point(&Point3::new(0.0, 0.0, -0.1));
        let far_point = proj.transform_point(&Point3::new(0.0, 0.0, -100.0));
        assert_relative_eq!(near_point.z, -1.0, epsilon = 1e-4);
        assert_relative_eq!(far_point.z, 1.0, epsilon = 1e-4);
    }

    #[test]
    fn test_orthographic_maps_extents_to_unit_cube() {
        let proj = Mat4::orthographic(-2.0, 2.0, -1.0, 1.0, 0.0, 10.0);

        let corner = proj.transform_point(&Point3::new(2.0, 1.0, -10.0));
        assert_relative_eq!(corner.x, 1.0, epsilon = EPSILON);
        assert_relative_eq!(corner.y, 1.0, epsilon = EPSILON);
        assert_relative_eq!(corner.z, 1.0, epsilon = EPSILON);
    }

    #[test]
    fn test_rotation_y_turns_x_toward_negative_z() {
        let rot = Mat4::rotation_y(constants::HALF_PI);
        let v = rot.transform_vector(&Vec3::x());
        assert_relative_eq!(v.x, 0.0, epsilon = EPSILON);
        assert_relative_eq!(v.z, -1.0, epsilon = EPSILON);
    }
}
