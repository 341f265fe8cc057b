//! Input model: mouse buttons and the press/drag/release gesture state.
//!
//! Only the primary button drives the overlay. A gesture starts on
//! pointer-down with the pointer snapped to its square center, tracks the raw
//! pointer while dragging, and resolves on pointer-up into a circle toggle
//! (released on the starting square) or an arrow (released elsewhere).

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::geometry::Point;

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button (or two-finger tap).
    Secondary,
}

impl Button {
    /// Map a DOM `MouseEvent.button` code. Unknown codes map to `None`.
    #[must_use]
    pub fn from_dom(code: i16) -> Option<Self> {
        match code {
            0 => Some(Self::Primary),
            1 => Some(Self::Middle),
            2 => Some(Self::Secondary),
            _ => None,
        }
    }
}

/// Gesture state between pointer-down and pointer-up.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InputState {
    /// No gesture in progress; waiting for the next primary pointer-down.
    #[default]
    Idle,
    /// Primary button is held.
    Pressing {
        /// Pointer-down position snapped to its square center.
        initial: Point,
        /// Latest raw pointer position, unquantized for smooth drag feedback.
        last: Point,
    },
}

impl InputState {
    #[must_use]
    pub fn is_pressing(&self) -> bool {
        matches!(self, Self::Pressing { .. })
    }
}
