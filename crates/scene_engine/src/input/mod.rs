//! Pointer and keyboard input
//!
//! The host translates its platform events into [`InputEvent`]s. The engine
//! folds them into a [`PointerState`] whose position is what region events and
//! hover checks test against.

use crate::foundation::math::Vec2;

/// Key codes the engine forwards to applications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// Printable character key (lowercase)
    Char(char),
    /// Escape key
    Escape,
}

/// Input delivered by the host between frames
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Pointer moved to a new position (field coordinates)
    PointerMoved {
        /// X coordinate
        x: f32,
        /// Y coordinate
        y: f32,
    },
    /// Primary pointer button went down
    PointerPressed,
    /// Primary pointer button was released
    PointerReleased,
    /// A key was pressed
    KeyPressed(KeyCode),
}

/// Pointer state sampled once per frame
#[derive(Debug, Clone)]
pub struct PointerState {
    position: Vec2,
    button_down: bool,
    pressed_this_frame: bool,
}

impl PointerState {
    /// Create a pointer resting at the origin
    pub fn new() -> Self {
        Self {
            position: Vec2::zeros(),
            button_down: false,
            pressed_this_frame: false,
        }
    }

    /// Current pointer position
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Whether the primary button is held
    pub fn is_down(&self) -> bool {
        self.button_down
    }

    /// Whether the primary button went down since the last [`begin_frame`](Self::begin_frame)
    pub fn pressed_this_frame(&self) -> bool {
        self.pressed_this_frame
    }

    /// Update pointer position from host events
    pub fn update_position(&mut self, x: f32, y: f32) {
        self.position = Vec2::new(x, y);
    }

    /// Fold a host event into the pointer state
    pub fn apply(&mut self, event: &InputEvent) {
        match *event {
            InputEvent::PointerMoved { x, y } => self.update_position(x, y),
            InputEvent::PointerPressed => {
                self.button_down = true;
                self.pressed_this_frame = true;
            }
            InputEvent::PointerReleased => self.button_down = false,
            InputEvent::KeyPressed(_) => {}
        }
    }

    /// Reset per-frame edge flags
    pub fn begin_frame(&mut self) {
        self.pressed_this_frame = false;
    }
}

impl Default for PointerState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pointer_tracks_position_and_press_edges() {
        let mut pointer = PointerState::new();
        pointer.apply(&InputEvent::PointerMoved { x: 12.0, y: 7.5 });
        pointer.apply(&InputEvent::PointerPressed);

        assert_eq!(pointer.position(), Vec2::new(12.0, 7.5));
        assert!(pointer.is_down());
        assert!(pointer.pressed_this_frame());

        pointer.begin_frame();
        assert!(!pointer.pressed_this_frame());
        assert!(pointer.is_down());

        pointer.apply(&InputEvent::PointerReleased);
        assert!(!pointer.is_down());
    }
}
