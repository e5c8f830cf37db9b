//! View frustum and sphere culling test
//!
//! Six planes, each a normal plus a point, with normals facing into the
//! viewed volume. A sphere counts as visible when its signed distance to
//! every plane is at least `-radius`, so spheres exactly tangent to a
//! plane are still visible. The test is conservative: near the corners it
//! can admit spheres that are actually outside, which only costs a wasted
//! draw.

use crate::foundation::math::Vec3;

/// An oriented plane in world space
#[derive(Debug, Clone, Copy)]
pub struct Plane {
    /// Unit normal, pointing into the visible side
    pub normal: Vec3,
    /// Any point on the plane
    pub point: Vec3,
}

impl Plane {
    /// Create a plane from a normal and a point on it
    pub fn new(normal: Vec3, point: Vec3) -> Self {
        Self { normal, point }
    }

    /// Distance from the plane, positive on the visible side
    pub fn signed_distance(&self, point: Vec3) -> f32 {
        self.normal.dot(&(point - self.point))
    }
}

/// The volume a camera can see, as six inward-facing planes
#[derive(Debug, Clone, Copy)]
pub struct Frustum {
    planes: [Plane; 6],
}

impl Frustum {
    /// Build the frustum of a perspective camera
    ///
    /// `forwards`, `right`, and `up` are the camera transform's world axes;
    /// `fov_y` is the full vertical field of view in radians.
    pub fn perspective(
        eye: Vec3,
        forwards: Vec3,
        right: Vec3,
        up: Vec3,
        fov_y: f32,
        aspect_ratio: f32,
        znear: f32,
        zfar: f32,
    ) -> Self {
        let tan_v = (fov_y * 0.5).tan();
        let tan_h = tan_v * aspect_ratio;

        let near = Plane::new(forwards, eye + forwards * znear);
        let far = Plane::new(-forwards, eye + forwards * zfar);
        // Side planes pass through the eye; their normals tilt inward by
        // the half-angle, built from the boundary direction and the
        // perpendicular axis.
        let left = Plane::new((forwards - right * tan_h).cross(&up).normalize(), eye);
        let right_plane = Plane::new(up.cross(&(forwards + right * tan_h)).normalize(), eye);
        let top = Plane::new((forwards + up * tan_v).cross(&right).normalize(), eye);
        let bottom = Plane::new(right.cross(&(forwards - up * tan_v)).normalize(), eye);

        Self {
            planes: [near, far, left, right_plane, top, bottom],
        }
    }

    /// Build the frustum of an orthographic camera
    pub fn orthographic(
        eye: Vec3,
        forwards: Vec3,
        right: Vec3,
        up: Vec3,
        xmin: f32,
        xmax: f32,
        ymin: f32,
        ymax: f32,
        znear: f32,
        zfar: f32,
    ) -> Self {
        let near = Plane::new(forwards, eye + forwards * znear);
        let far = Plane::new(-forwards, eye + forwards * zfar);
        let left = Plane::new(right, eye + right * xmin);
        let right_plane = Plane::new(-right, eye + right * xmax);
        let bottom = Plane::new(up, eye + up * ymin);
        let top = Plane::new(-up, eye + up * ymax);

        Self {
            planes: [near, far, left, right_plane, top, bottom],
        }
    }

    /// The planes in near, far, left, right, top, bottom order
    pub fn planes(&self) -> &[Plane; 6] {
        &self.planes
    }

    /// Whether a sphere is at least partly on the visible side of every
    /// plane; tangent spheres are visible
    pub fn contains_sphere(&self, center: Vec3, radius: f32) -> bool {
        self.planes
            .iter()
            .all(|plane| plane.signed_distance(center) >= -radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::constants;

    // Eye at the origin looking down -Z with a 90 degree square frustum:
    // at depth d the cross-section spans [-d, d] on both axes.
    fn square_frustum() -> Frustum {
        Frustum::perspective(
            Vec3::zeros(),
            Vec3::new(0.0, 0.0, -1.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            constants::HALF_PI,
            1.0,
            1.0,
            10.0,
        )
    }

    #[test]
    fn test_sphere_ahead_is_visible() {
        let frustum = square_frustum();
        assert!(frustum.contains_sphere(Vec3::new(0.0, 0.0, -5.0), 1.0));
    }

    #[test]
    fn test_sphere_behind_camera_is_culled() {
        let frustum = square_frustum();
        assert!(!frustum.contains_sphere(Vec3::new(0.0, 0.0, 5.0), 1.0));
    }

    #[test]
    fn test_sphere_beyond_far_is_culled() {
        let frustum = square_frustum();
        assert!(!frustum.contains_sphere(Vec3::new(0.0, 0.0, -15.0), 1.0));
    }

    #[test]
    fn test_sphere_outside_side_planes_is_culled() {
        let frustum = square_frustum();
        assert!(!frustum.contains_sphere(Vec3::new(8.0, 0.0, -5.0), 1.0));
        assert!(!frustum.contains_sphere(Vec3::new(-8.0, 0.0, -5.0), 1.0));
        assert!(!frustum.contains_sphere(Vec3::new(0.0, 8.0, -5.0), 1.0));
        assert!(!frustum.contains_sphere(Vec3::new(0.0, -8.0, -5.0), 1.0));
    }

    #[test]
    fn test_sphere_straddling_a_plane_is_visible() {
        let frustum = square_frustum();
        // Center behind the near plane, surface poking through it.
        assert!(frustum.contains_sphere(Vec3::new(0.0, 0.0, -0.8), 0.5));
    }

    #[test]
    fn test_tangent_sphere_is_visible() {
        let frustum = square_frustum();
        // Signed distance to the near plane is exactly -radius.
        assert!(frustum.contains_sphere(Vec3::new(0.0, 0.0, -0.5), 0.5));
        // A little further back it drops below -radius and is culled.
        assert!(!frustum.contains_sphere(Vec3::new(0.0, 0.0, -0.35), 0.5));
    }

    #[test]
    fn test_corner_false_positive_is_admitted() {
        let frustum = square_frustum();
        // Outside the volume but within -radius of every plane; the plane
        // test is conservative near corners and admits it.
        assert!(frustum.contains_sphere(Vec3::new(2.3, 2.3, -2.0), 0.35));
    }

    #[test]
    fn test_orthographic_band() {
        let frustum = Frustum::orthographic(
            Vec3::zeros(),
            Vec3::new(0.0, 0.0, -1.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            -2.0,
            2.0,
            -1.0,
            1.0,
            0.1,
            50.0,
        );
        assert!(frustum.contains_sphere(Vec3::new(0.0, 0.0, -25.0), 0.5));
        assert!(frustum.contains_sphere(Vec3::new(2.4, 0.0, -25.0), 0.5));
        assert!(!frustum.contains_sphere(Vec3::new(3.0, 0.0, -25.0), 0.5));
        assert!(!frustum.contains_sphere(Vec3::new(0.0, -1.6, -25.0), 0.5));
    }

    #[test]
    fn test_frustum_follows_camera_axes() {
        // Camera looking down +X instead of -Z.
        let frustum = Frustum::perspective(
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(0.0, 1.0, 0.0),
            constants::HALF_PI,
            1.0,
            1.0,
            10.0,
        );
        assert!(frustum.contains_sphere(Vec3::new(6.0, 0.0, 0.0), 1.0));
        assert!(!frustum.contains_sphere(Vec3::new(-6.0, 0.0, 0.0), 1.0));
    }
}
