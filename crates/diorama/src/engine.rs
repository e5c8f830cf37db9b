//! Engine loop
//!
//! [`Engine`] ties a window backend, a graphics device, and a scene into
//! a frame loop: pump input, clear, run the scene's frame phases, present.
//! Backends are generic so the same loop drives a real window or a
//! headless run; tests and tools use [`HeadlessWindow`] with the null
//! render device.

use crate::config::EngineConfig;
use crate::foundation::time::Timer;
use crate::input::InputState;
use crate::render::{GraphicsDevice, RenderError};
use crate::scene::{Scene, SceneError};
use thiserror::Error;

const CLEAR_COLOR: [f32; 4] = [0.02, 0.02, 0.05, 1.0];

/// Windowing capability the engine drives once per frame
pub trait WindowBackend {
    /// Pump the platform event queue into `input`
    fn poll_events(&mut self, input: &mut InputState);

    /// Whether the user asked to close the window
    fn should_close(&self) -> bool;

    /// Show the finished frame
    fn present(&mut self) -> Result<(), RenderError>;
}

/// Window backend with no window
///
/// Never closes on its own; pair it with a frame cap.
#[derive(Debug, Default)]
pub struct HeadlessWindow {
    frames_presented: u64,
}

impl HeadlessWindow {
    /// Create a headless backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames presented so far
    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }
}

impl WindowBackend for HeadlessWindow {
    fn poll_events(&mut self, _input: &mut InputState) {}

    fn should_close(&self) -> bool {
        false
    }

    fn present(&mut self) -> Result<(), RenderError> {
        self.frames_presented += 1;
        Ok(())
    }
}

/// Engine failures
#[derive(Error, Debug)]
pub enum EngineError {
    /// Bringing the scene up failed
    #[error("engine initialization failed")]
    Initialize(#[source] SceneError),

    /// A frame's scene update failed
    #[error("frame {frame} failed")]
    Frame {
        /// Frame number, counted from zero
        frame: u64,
        /// The failure that ended the frame
        source: SceneError,
    },

    /// Presenting a finished frame failed
    #[error("presenting frame {frame} failed")]
    Present {
        /// Frame number, counted from zero
        frame: u64,
        /// The backend failure
        source: RenderError,
    },

    /// Releasing scene resources failed
    #[error("engine shutdown failed")]
    Shutdown(#[source] SceneError),
}

/// The frame loop around a scene
#[derive(Debug)]
pub struct Engine<W: WindowBackend, D: GraphicsDevice> {
    window: W,
    device: D,
    input: InputState,
    timer: Timer,
    scene: Scene,
    config: EngineConfig,
    frame: u64,
}

impl<W: WindowBackend, D: GraphicsDevice> Engine<W, D> {
    /// Set up the device and initialize every component in the scene
    pub fn new(
        config: EngineConfig,
        window: W,
        mut device: D,
        mut scene: Scene,
    ) -> Result<Self, EngineError> {
        device.set_depth_test(true);
        device.set_backface_culling(true);
        scene
            .initialize(&mut device, &config.assets.root)
            .map_err(EngineError::Initialize)?;
        log::info!(
            "engine up: '{}' {}x{}, {} transforms, {} components",
            config.window.title,
            config.window.width,
            config.window.height,
            scene.transform_count(),
            scene.component_count()
        );
        Ok(Self {
            window,
            device,
            input: InputState::new(),
            timer: Timer::new(),
            scene,
            config,
            frame: 0,
        })
    }

    /// The running scene
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// The graphics device
    pub fn device(&self) -> &D {
        &self.device
    }

    /// The window backend
    pub fn window(&self) -> &W {
        &self.window
    }

    /// Frames completed so far
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Run one frame
    pub fn step(&mut self) -> Result<(), EngineError> {
        self.timer.update();
        let delta_time = self.timer.delta_time();

        self.input.begin_frame();
        self.window.poll_events(&mut self.input);

        self.device.clear(CLEAR_COLOR);
        self.scene
            .update(&self.input, &mut self.device, delta_time)
            .map_err(|source| EngineError::Frame {
                frame: self.frame,
                source,
            })?;
        self.window.present().map_err(|source| EngineError::Present {
            frame: self.frame,
            source,
        })?;

        self.frame += 1;
        Ok(())
    }

    /// Run frames until the window closes or the configured cap is hit
    pub fn run(&mut self) -> Result<(), EngineError> {
        loop {
            if self.window.should_close() {
                break;
            }
            if let Some(cap) = self.config.scene.frame_cap {
                if self.frame >= cap {
                    break;
                }
            }
            self.step()?;
        }
        log::info!(
            "ran {} frames, {:.1} fps average",
            self.frame,
            self.timer.average_fps()
        );
        Ok(())
    }

    /// Release scene resources held on the device
    pub fn shutdown(&mut self) -> Result<(), EngineError> {
        self.scene
            .shutdown(&mut self.device)
            .map_err(EngineError::Shutdown)
    }
}
