//! Scene document persistence
//!
//! Scenes persist as JSON documents of nested transform records. The
//! [`records`] module holds the serde shapes; [`codec`] converts between
//! records and the live tree and does the file I/O.

pub mod codec;
pub mod records;

pub use records::{
    CameraControllerRecord, CameraRecord, ComponentRecord, GameObjectRecord, MeshRendererRecord,
    SkyboxFollowCameraRecord, TestMovementRecord, TestRotationRecord, TransformRecord,
};
