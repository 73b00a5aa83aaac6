//! Keyboard, mouse button, cursor, and scroll state.
//!
//! The window loop feeds winit events into an [`InputState`] resource;
//! systems read it through the query methods. `just_*` sets and the scroll
//! accumulator are cleared at the end of every frame, after user systems
//! have run.

use std::collections::HashSet;
use std::hash::Hash;

pub use winit::event::MouseButton;
pub use winit::keyboard::KeyCode;

/// Pressed / just-pressed / just-released tracking for one input kind.
pub struct Input<T: Copy + Eq + Hash> {
    pressed: HashSet<T>,
    just_pressed: HashSet<T>,
    just_released: HashSet<T>,
}

impl<T: Copy + Eq + Hash> Input<T> {
    pub fn new() -> Self {
        Self {
            pressed: HashSet::new(),
            just_pressed: HashSet::new(),
            just_released: HashSet::new(),
        }
    }

    pub fn pressed(&self, value: T) -> bool {
        self.pressed.contains(&value)
    }

    /// True only on the frame the press happened.
    pub fn just_pressed(&self, value: T) -> bool {
        self.just_pressed.contains(&value)
    }

    pub fn just_released(&self, value: T) -> bool {
        self.just_released.contains(&value)
    }

    pub(crate) fn press(&mut self, value: T) {
        if self.pressed.insert(value) {
            self.just_pressed.insert(value);
        }
    }

    pub(crate) fn release(&mut self, value: T) {
        if self.pressed.remove(&value) {
            self.just_released.insert(value);
        }
    }

    pub(crate) fn clear_just(&mut self) {
        self.just_pressed.clear();
        self.just_released.clear();
    }
}

impl<T: Copy + Eq + Hash> Default for Input<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Cursor position in window pixels, top-left origin. Separate resource so
/// systems that only care about pointer position take no input borrow.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CursorPosition {
    pub x: f32,
    pub y: f32,
}

/// Combined keyboard and mouse state for the current frame.
pub struct InputState {
    pub(crate) keys: Input<KeyCode>,
    pub(crate) mouse: Input<MouseButton>,
    pub(crate) scroll: f32,
}

impl InputState {
    pub fn new() -> Self {
        Self {
            keys: Input::new(),
            mouse: Input::new(),
            scroll: 0.0,
        }
    }

    pub fn pressed(&self, key: KeyCode) -> bool {
        self.keys.pressed(key)
    }

    pub fn just_pressed(&self, key: KeyCode) -> bool {
        self.keys.just_pressed(key)
    }

    pub fn just_released(&self, key: KeyCode) -> bool {
        self.keys.just_released(key)
    }

    pub fn mouse_pressed(&self, button: MouseButton) -> bool {
        self.mouse.pressed(button)
    }

    pub fn mouse_just_pressed(&self, button: MouseButton) -> bool {
        self.mouse.just_pressed(button)
    }

    pub fn mouse_just_released(&self, button: MouseButton) -> bool {
        self.mouse.just_released(button)
    }

    /// Scroll wheel movement accumulated this frame, in lines. Positive is
    /// away from the user.
    pub fn scroll(&self) -> f32 {
        self.scroll
    }

    pub(crate) fn clear_frame(&mut self) {
        self.keys.clear_just();
        self.mouse.clear_just();
        self.scroll = 0.0;
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}
