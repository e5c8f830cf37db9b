//! Scene-graph and scene-document errors
//!
//! Everything here is fatal at the point raised. Layers add context by
//! wrapping rather than swallowing, so the chain of `source()` links tells
//! the whole story; only the application entry point should catch and
//! print it.

use crate::assets::AssetError;
use crate::render::RenderError;
use crate::scene::uid::Uid;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for scene operations
pub type SceneResult<T> = Result<T, SceneError>;

/// Errors from scene-graph mutation, lifecycle, and document I/O
#[derive(Error, Debug)]
pub enum SceneError {
    /// A transform was added to a child list it is already in
    #[error("transform {uid} is already a child of this transform")]
    DuplicateChild {
        /// Uid of the transform being added
        uid: Uid,
    },

    /// A transform with a parent was added to another child list
    #[error("transform {uid} already has a parent")]
    ChildAlreadyParented {
        /// Uid of the transform being added
        uid: Uid,
    },

    /// A transform was removed from a child list it is not in
    #[error("transform {uid} is not a child of this transform")]
    ChildNotFound {
        /// Uid of the transform being removed
        uid: Uid,
    },

    /// A positional insert or removal fell outside the list
    #[error("index {index} out of range for list of length {len}")]
    IndexOutOfRange {
        /// Requested index
        index: usize,
        /// Current list length
        len: usize,
    },

    /// A reparent would make a transform its own ancestor
    #[error("reparenting transform {child} under {parent} would create a cycle")]
    CyclicParent {
        /// Uid of the transform being reparented
        child: Uid,
        /// Uid of the requested parent
        parent: Uid,
    },

    /// A component instance was added to a game object twice
    #[error("component {uid} is already attached to this game object")]
    DuplicateComponent {
        /// Uid of the component being added
        uid: Uid,
    },

    /// A component was removed from a game object it is not attached to
    #[error("component {uid} is not attached to this game object")]
    ComponentNotFound {
        /// Uid of the component being removed
        uid: Uid,
    },

    /// A transform was given a second game object
    #[error("transform {uid} already has a game object attached")]
    GameObjectAlreadyAttached {
        /// Uid of the transform
        uid: Uid,
    },

    /// A game object was attached to a second transform
    #[error("game object {uid} is already attached to a transform")]
    GameObjectReattached {
        /// Uid of the game object
        uid: Uid,
    },

    /// A weak reference's target no longer exists
    ///
    /// `uid` names the referent when it is known (a bound camera), else the
    /// entity holding the dead reference.
    #[error("unbound {what} reference (uid {uid})")]
    Unbound {
        /// What the reference pointed at
        what: &'static str,
        /// Best-known uid for diagnostics
        uid: Uid,
    },

    /// Late-bind found no camera with the recorded uid
    #[error("no camera with uid {uid} in the scene")]
    UnresolvedCamera {
        /// The missing camera uid
        uid: Uid,
    },

    /// Late-bind found no transform with the recorded uid
    #[error("no transform with uid {uid} in the scene")]
    UnresolvedTransform {
        /// The missing transform uid
        uid: Uid,
    },

    /// A camera reference resolved to a component of another kind
    #[error("component {uid} is not a camera")]
    NotACamera {
        /// Uid of the offending component
        uid: Uid,
    },

    /// A projection matrix was requested from a camera with no mode set
    #[error("camera {uid} has no projection mode set")]
    ProjectionUnset {
        /// Uid of the camera component
        uid: Uid,
    },

    /// A procedural mesh (no source path) cannot appear in a document
    #[error("mesh has no source path to serialize")]
    MeshWithoutSource,

    /// A document carried a rotation that cannot be normalized
    #[error("transform {uid} has a degenerate local rotation")]
    DegenerateRotation {
        /// Uid of the offending transform
        uid: Uid,
    },

    /// A frame hook ran on a component that was never initialized
    #[error("component {uid} used before initialization")]
    NotInitialized {
        /// Uid of the component
        uid: Uid,
    },

    /// A scene file could not be read
    #[error("failed to read scene file {}", .path.display())]
    ReadScene {
        /// Offending path
        path: PathBuf,
        /// Underlying I/O failure
        source: std::io::Error,
    },

    /// A scene file could not be written
    #[error("failed to write scene file {}", .path.display())]
    WriteScene {
        /// Offending path
        path: PathBuf,
        /// Underlying I/O failure
        source: std::io::Error,
    },

    /// A scene file held a malformed or unrecognized document
    #[error("failed to parse scene document {}", .path.display())]
    ParseScene {
        /// Offending path
        path: PathBuf,
        /// Underlying decode failure
        source: serde_json::Error,
    },

    /// A scene could not be encoded to a document
    #[error("failed to encode scene document")]
    EncodeScene(#[from] serde_json::Error),

    /// The graphics device rejected an operation
    #[error("render backend error")]
    Render(#[from] RenderError),

    /// An asset could not be imported
    #[error("asset import error")]
    Asset(#[from] AssetError),
}
