//! Input model: tools, modifier keys, mouse buttons, and the gesture state machine.
//!
//! `Tool` and `Modifiers` capture the user's intent at the time of a pointer
//! event. `InputState` is the gesture being tracked between pointer-down and
//! pointer-up, carrying what is needed to compute incremental deltas.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::camera::Point;
use crate::consts::WHEEL_ZOOM_STEP;
use crate::doc::ElementId;
use crate::tail::BubbleType;

/// Which tool is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    /// Select and move elements (default).
    #[default]
    Select,
    /// Drag pans the page regardless of what is under the pointer.
    Hand,
    /// Click places a new bubble of the given type.
    Bubble(BubbleType),
}

/// Keyboard/mouse modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    /// Ctrl on most platforms, Command on macOS. Trackpad pinch also arrives
    /// as a ctrl-wheel.
    #[must_use]
    pub fn zoom_intent(self) -> bool {
        self.ctrl || self.meta
    }
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Primary,
    Middle,
    Secondary,
}

/// Wheel / trackpad scroll delta in pixels.
#[derive(Debug, Clone, Copy)]
pub struct WheelDelta {
    pub dx: f64,
    /// Positive = down.
    pub dy: f64,
}

impl WheelDelta {
    /// Zoom multiplier for this delta: one step per event, in on scroll up.
    #[must_use]
    pub fn zoom_factor(self) -> f64 {
        if self.dy < 0.0 {
            WHEEL_ZOOM_STEP
        } else if self.dy > 0.0 {
            1.0 / WHEEL_ZOOM_STEP
        } else {
            1.0
        }
    }
}

/// Persistent UI state visible to the renderer.
#[derive(Debug, Clone, Default)]
pub struct UiState {
    pub tool: Tool,
    pub selected_id: Option<ElementId>,
}

/// Active gesture.
#[derive(Debug, Clone, Default)]
pub enum InputState {
    #[default]
    Idle,
    /// Dragging the page around.
    Panning {
        /// Screen position at the previous pointer event.
        last_screen: Point,
    },
    /// Moving an element across the page.
    DraggingElement {
        id: ElementId,
        /// Canvas position at the previous pointer event.
        last_canvas: Point,
        /// Whether the element has actually moved since pointer-down.
        moved: bool,
    },
}
