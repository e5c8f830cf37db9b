//! Camera component state
//!
//! A camera pairs a projection mode with near/far clip distances and
//! derives everything else from its transform: the view matrix looks along
//! the transform's forward axis and the frustum planes follow its world
//! axes. A camera may be built with no projection mode; asking such a
//! camera for a projection matrix or frustum fails.

use crate::foundation::math::{Mat4, Mat4Ext};
use crate::scene::error::{SceneError, SceneResult};
use crate::scene::frustum::Frustum;
use crate::scene::transform::Transform;
use crate::scene::uid::Uid;
use serde::{Deserialize, Serialize};

/// Projection mode of a camera
///
/// Serializes under its document tag inside camera records.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Projection {
    /// Perspective projection
    #[serde(rename = "perspective")]
    Perspective {
        /// Full vertical field of view, in radians
        fov: f32,
        /// Viewport width over height
        aspect_ratio: f32,
    },
    /// Orthographic projection over explicit view-volume extents
    #[serde(rename = "orthographic")]
    Orthographic {
        /// Left extent
        xmin: f32,
        /// Right extent
        xmax: f32,
        /// Bottom extent
        ymin: f32,
        /// Top extent
        ymax: f32,
    },
}

/// Camera state: optional projection mode plus shared clip distances
#[derive(Debug, Clone)]
pub struct Camera {
    pub(crate) projection: Option<Projection>,
    pub(crate) znear: f32,
    pub(crate) zfar: f32,
}

impl Camera {
    pub(crate) fn new(projection: Option<Projection>, znear: f32, zfar: f32) -> Self {
        Self {
            projection,
            znear,
            zfar,
        }
    }

    /// View matrix looking along the transform's forward axis
    pub(crate) fn view_matrix(&self, transform: &Transform) -> Mat4 {
        let eye = transform.world_position();
        Mat4::look_at(eye, eye + transform.forwards(), transform.up())
    }

    /// Projection matrix for the current mode; fails with no mode set
    pub(crate) fn projection_matrix(&self, uid: Uid) -> SceneResult<Mat4> {
        match self.projection {
            Some(Projection::Perspective { fov, aspect_ratio }) => {
                Ok(Mat4::perspective(fov, aspect_ratio, self.znear, self.zfar))
            }
            Some(Projection::Orthographic {
                xmin,
                xmax,
                ymin,
                ymax,
            }) => Ok(Mat4::orthographic(
                xmin, xmax, ymin, ymax, self.znear, self.zfar,
            )),
            None => Err(SceneError::ProjectionUnset { uid }),
        }
    }

    /// Culling frustum in world space; fails with no mode set
    pub(crate) fn frustum(&self, transform: &Transform, uid: Uid) -> SceneResult<Frustum> {
        let eye = transform.world_position();
        match self.projection {
            Some(Projection::Perspective { fov, aspect_ratio }) => Ok(Frustum::perspective(
                eye,
                transform.forwards(),
                transform.right(),
                transform.up(),
                fov,
                aspect_ratio,
                self.znear,
                self.zfar,
            )),
            Some(Projection::Orthographic {
                xmin,
                xmax,
                ymin,
                ymax,
            }) => Ok(Frustum::orthographic(
                eye,
                transform.forwards(),
                transform.right(),
                transform.up(),
                xmin,
                xmax,
                ymin,
                ymax,
                self.znear,
                self.zfar,
            )),
            None => Err(SceneError::ProjectionUnset { uid }),
        }
    }
}
