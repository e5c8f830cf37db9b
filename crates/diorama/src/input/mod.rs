//! Input management system
//!
//! Window backends push events into an [`InputState`] while polling; the
//! scene reads it during the input phase of the frame. Edge queries
//! (pressed/released) compare against the previous frame, so the engine
//! rolls the state over with [`InputState::begin_frame`] before polling.

use crate::foundation::math::Vec2;
use bitflags::bitflags;
use std::collections::HashSet;

/// Key codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum KeyCode {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    P,
    Q,
    R,
    S,
    T,
    U,
    V,
    W,
    X,
    Y,
    Z,
    /// Space key
    Space,
    /// Enter key
    Enter,
    /// Escape key
    Escape,
    /// Up arrow
    Up,
    /// Down arrow
    Down,
    /// Left arrow
    Left,
    /// Right arrow
    Right,
}

/// Mouse buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Left mouse button
    Left,
    /// Right mouse button
    Right,
    /// Middle mouse button
    Middle,
}

bitflags! {
    /// Keyboard modifier state
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Modifiers: u8 {
        /// Either shift key
        const SHIFT = 1;
        /// Either control key
        const CONTROL = 1 << 1;
        /// Either alt key
        const ALT = 1 << 2;
    }
}

/// Keyboard, mouse button, and cursor state for the current frame
#[derive(Debug)]
pub struct InputState {
    keys: HashSet<KeyCode>,
    previous_keys: HashSet<KeyCode>,
    buttons: HashSet<MouseButton>,
    previous_buttons: HashSet<MouseButton>,
    modifiers: Modifiers,
    cursor: Vec2,
    previous_cursor: Vec2,
}

impl Default for InputState {
    fn default() -> Self {
        Self {
            keys: HashSet::new(),
            previous_keys: HashSet::new(),
            buttons: HashSet::new(),
            previous_buttons: HashSet::new(),
            modifiers: Modifiers::empty(),
            cursor: Vec2::zeros(),
            previous_cursor: Vec2::zeros(),
        }
    }
}

impl InputState {
    /// Create an empty input state
    pub fn new() -> Self {
        Self::default()
    }

    /// Roll the current frame's state into the previous frame's
    ///
    /// Call once per frame, before the backend delivers new events.
    pub fn begin_frame(&mut self) {
        self.previous_keys = self.keys.clone();
        self.previous_buttons = self.buttons.clone();
        self.previous_cursor = self.cursor;
    }

    /// Handle key input
    pub fn handle_key_input(&mut self, key: KeyCode, pressed: bool) {
        if pressed {
            self.keys.insert(key);
        } else {
            self.keys.remove(&key);
        }
    }

    /// Handle mouse button input
    pub fn handle_mouse_button(&mut self, button: MouseButton, pressed: bool) {
        if pressed {
            self.buttons.insert(button);
        } else {
            self.buttons.remove(&button);
        }
    }

    /// Handle mouse movement
    pub fn handle_mouse_move(&mut self, x: f64, y: f64) {
        self.cursor = Vec2::new(x as f32, y as f32);
    }

    /// Handle a modifier state change
    pub fn handle_modifiers(&mut self, modifiers: Modifiers) {
        self.modifiers = modifiers;
    }

    /// Whether the key is currently down
    pub fn key_held(&self, key: KeyCode) -> bool {
        self.keys.contains(&key)
    }

    /// Whether the key went down this frame
    pub fn key_pressed(&self, key: KeyCode) -> bool {
        self.keys.contains(&key) && !self.previous_keys.contains(&key)
    }

    /// Whether the key came up this frame
    pub fn key_released(&self, key: KeyCode) -> bool {
        !self.keys.contains(&key) && self.previous_keys.contains(&key)
    }

    /// Whether the mouse button is currently down
    pub fn button_held(&self, button: MouseButton) -> bool {
        self.buttons.contains(&button)
    }

    /// Whether the mouse button went down this frame
    pub fn button_pressed(&self, button: MouseButton) -> bool {
        self.buttons.contains(&button) && !self.previous_buttons.contains(&button)
    }

    /// Current modifier state
    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    /// Cursor position in window coordinates
    pub fn cursor_position(&self) -> Vec2 {
        self.cursor
    }

    /// Cursor movement since the previous frame
    pub fn cursor_delta(&self) -> Vec2 {
        self.cursor - self.previous_cursor
    }
}
