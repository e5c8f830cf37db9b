//! # Diorama
//!
//! A small real-time 3D scene engine: a transform hierarchy with cached
//! world matrices, behavior components on named game objects, JSON scene
//! documents with uid cross-references, and frustum-culled mesh rendering
//! over a pluggable graphics device.
//!
//! ## Features
//!
//! - **Scene Graph**: parent/child transforms with cached local-to-world
//!   matrices kept fresh on every mutation
//! - **Components**: a closed set of behaviors driven through four frame
//!   phases in tree order
//! - **Persistence**: scenes save to JSON and load back with uids intact;
//!   cross-references re-bind against the loaded tree
//! - **Culling**: per-renderer bounding spheres tested against the camera
//!   frustum before any draw is issued
//! - **Headless**: the null device and headless window run the whole
//!   engine in tests and tools
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use diorama::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = EngineConfig::default();
//!     let scene = Scene::load(
//!         std::path::Path::new("scenes/orrery.json"),
//!         &config.assets.root,
//!     )?;
//!
//!     let mut engine = Engine::new(config, HeadlessWindow::new(), NullDevice::new(), scene)?;
//!     engine.run()?;
//!     engine.shutdown()?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::module_name_repetitions,
    clippy::similar_names,
    clippy::too_many_arguments,
    clippy::needless_pass_by_ref_mut
)]

pub mod assets;
pub mod config;
pub mod foundation;
pub mod input;
pub mod io;
pub mod render;
pub mod scene;

mod engine;

pub use engine::{Engine, EngineError, HeadlessWindow, WindowBackend};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        assets::{MeshImporter, ObjImporter},
        config::{Config, ConfigError, EngineConfig},
        foundation::{
            math::{Mat4, Quat, Vec2, Vec3},
            time::{Stopwatch, Timer},
        },
        input::{InputState, KeyCode, Modifiers, MouseButton},
        render::{GraphicsDevice, Mesh, NullDevice, RenderError, Shader, ShaderDesc},
        scene::{
            Component, Frustum, GameObject, Projection, Scene, SceneError, SceneResult, Transform,
            Uid,
        },
        Engine, EngineError, HeadlessWindow, WindowBackend,
    };
}
