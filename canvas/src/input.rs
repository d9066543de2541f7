//! Input model: modifier keys, buttons, touches, and the gesture state machine.
//!
//! This module defines the types consumed by the input engine. `Modifiers`,
//! `Button`, `Key`, and `Touch` describe raw host events. `InputState` is the
//! single active gesture tracked between press and release; at most one
//! exists per canvas, which is what keeps manipulation single-writer.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::camera::Point;
use crate::doc::{ElementId, ElementTemplate};
use crate::gesture::PinchStart;
use crate::manipulate::ManipulationSession;

/// Modifier keys held during an event. Only Alt changes behavior: a primary
/// drag with Alt held pans instead of manipulating.
#[derive(Debug, Clone, Copy, Default)]
pub struct Modifiers {
    /// Alt / Option key is held.
    pub alt: bool,
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger touch).
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button.
    Secondary,
}

/// A keyboard key as reported by the browser (e.g. `"Delete"`, `"Escape"`, `" "`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

impl Key {
    #[must_use]
    pub fn is_delete(&self) -> bool {
        matches!(self.0.as_str(), "Delete" | "Backspace")
    }

    #[must_use]
    pub fn is_escape(&self) -> bool {
        self.0 == "Escape"
    }

    /// Space bar; held down it turns primary drags into pans.
    #[must_use]
    pub fn is_space(&self) -> bool {
        matches!(self.0.as_str(), " " | "Space" | "Spacebar")
    }

    /// `R` rotates the selected element by one step.
    #[must_use]
    pub fn is_rotate(&self) -> bool {
        matches!(self.0.as_str(), "r" | "R")
    }
}

/// Wheel / trackpad scroll delta. Horizontal scroll is ignored.
#[derive(Debug, Clone, Copy)]
pub struct WheelDelta {
    /// Vertical scroll amount in pixels (positive = down).
    pub dy: f64,
}

/// One active touch point in screen space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Touch {
    /// Browser touch identifier, stable for the life of the touch.
    pub id: i32,
    pub point: Point,
}

/// Persistent UI state visible to the renderer.
#[derive(Debug, Clone, Default)]
pub struct UiState {
    /// The id of the currently selected element, if any.
    pub selected_id: Option<ElementId>,
    /// Template armed for placement by the next press on empty canvas.
    pub pending_template: Option<ElementTemplate>,
    /// Keyboard focus is inside a text field; delete keys go to the field.
    pub text_input_focused: bool,
    /// Space bar is held down.
    pub space_held: bool,
}

/// Internal state for the gesture state machine.
///
/// Each active variant carries the context needed to compute the next update
/// from the captured start values and the latest pointer position.
#[derive(Debug, Clone, Default)]
pub enum InputState {
    /// No gesture in progress; waiting for the next press.
    #[default]
    Idle,
    /// The canvas is being dragged.
    Panning {
        /// Screen-space pointer position at gesture start.
        start_screen: Point,
        /// Camera pan at gesture start.
        start_pan: Point,
    },
    /// Two touches are zooming (and translating) the canvas.
    Pinching(PinchStart),
    /// An element is being moved or resized.
    Manipulating(ManipulationSession),
    /// A template is being dropped; the element is created on release.
    Placing {
        template: ElementTemplate,
    },
}

impl InputState {
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}
