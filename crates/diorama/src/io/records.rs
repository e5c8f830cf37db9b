//! Scene document records
//!
//! The serde-facing shapes of a scene document, mirroring the live tree
//! one node per record. Documents store local values and uids only; world
//! caches are rebuilt on load and cross-references are re-bound from the
//! recorded uids afterwards.
//!
//! Rotations are stored scalar-first as `[w, x, y, z]`. Component records
//! serialize under a single-key wrapper naming their tag, and a game
//! object with no components omits its `components` key entirely.

use crate::foundation::math::Vec3;
use crate::render::ShaderDesc;
use crate::scene::components::Projection;
use crate::scene::uid::Uid;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One transform node with everything hanging off it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformRecord {
    /// Persisted uid, stable across save and load
    pub uid: Uid,
    /// Local translation
    pub local_position: Vec3,
    /// Local rotation quaternion, scalar first
    pub local_rotation: [f32; 4],
    /// Local scale
    pub local_scale: Vec3,
    /// Child nodes in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TransformRecord>,
    /// The game object attached to this node, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_object: Option<GameObjectRecord>,
}

/// A named game object and its components, in update order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameObjectRecord {
    /// Persisted uid
    pub uid: Uid,
    /// Display name
    pub name: String,
    /// Components in update order; the key is absent when there are none
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<ComponentRecord>,
}

/// One component under its tag
///
/// An unknown or missing tag fails the whole document parse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ComponentRecord {
    /// `camera`
    #[serde(rename = "camera")]
    Camera(CameraRecord),
    /// `camera controller`
    #[serde(rename = "camera controller")]
    CameraController(CameraControllerRecord),
    /// `mesh renderer`
    #[serde(rename = "mesh renderer")]
    MeshRenderer(MeshRendererRecord),
    /// `skybox follow camera`
    #[serde(rename = "skybox follow camera")]
    SkyboxFollowCamera(SkyboxFollowCameraRecord),
    /// `test movement`
    #[serde(rename = "test movement")]
    TestMovement(TestMovementRecord),
    /// `test rotation`
    #[serde(rename = "test rotation")]
    TestRotation(TestRotationRecord),
}

/// Camera component record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraRecord {
    /// Persisted uid; renderers reference cameras by this number
    pub uid: Uid,
    /// Projection mode; may be absent for a camera configured at runtime
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub projection: Option<Projection>,
    /// Near clip distance
    pub znear: f32,
    /// Far clip distance
    pub zfar: f32,
}

/// Camera controller component record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraControllerRecord {
    /// Persisted uid
    pub uid: Uid,
    /// Translation speed in units per second
    pub move_speed: f32,
    /// Turn rate in degrees per second
    pub look_speed: f32,
}

/// Mesh renderer component record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshRendererRecord {
    /// Persisted uid
    pub uid: Uid,
    /// Mesh file path, relative to the asset root
    pub mesh: PathBuf,
    /// Shading mode and its parameters
    pub shader: ShaderDesc,
    /// Uid of the camera this renderer draws through
    pub camera: Uid,
    /// Whether frustum culling applies
    #[serde(default = "default_true")]
    pub culling: bool,
}

/// Skybox follow component record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkyboxFollowCameraRecord {
    /// Persisted uid
    pub uid: Uid,
    /// Uid of the transform to follow
    pub target: Uid,
}

/// Constant-velocity mover record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestMovementRecord {
    /// Persisted uid
    pub uid: Uid,
    /// Velocity in local units per second
    pub velocity: Vec3,
}

/// Constant-rate spinner record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestRotationRecord {
    /// Persisted uid
    pub uid: Uid,
    /// Spin axis in local space
    pub axis: Vec3,
    /// Spin rate
    pub degrees_per_second: f32,
}

fn default_true() -> bool {
    true
}
