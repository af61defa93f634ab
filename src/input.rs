//! Input model: pointer events, modifier keys, and the gesture state.
//!
//! The controller consumes an explicit event enum rather than raw UI
//! callbacks, so the whole gesture state machine is drivable from tests and
//! from recorded event streams. [`InputEvent`] carries serde derives for
//! exactly that reason: the CLI replays gestures from JSONL.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use serde::{Deserialize, Serialize};

use crate::scene::{Pos, ShapeId};

/// Keyboard modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    /// Shift key is held. Selects rotate over scale on wheel ticks.
    pub shift: bool,
    /// Ctrl key is held.
    pub ctrl: bool,
    /// Alt / Option key is held.
    pub alt: bool,
    /// Meta / Command key is held.
    pub meta: bool,
}

/// Scroll direction of one wheel tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WheelDirection {
    /// Scroll up: grow (scale) or positive rotation.
    Up,
    /// Scroll down: shrink (scale) or negative rotation.
    Down,
}

/// One input event fed to the drag/transform controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum InputEvent {
    /// Pointer pressed at a pixel coordinate; may open a drag session.
    #[serde(rename = "down")]
    PointerDown { x: i64, y: i64 },
    /// Pointer moved while pressed; drives incremental translation.
    #[serde(rename = "move")]
    PointerMove { x: i64, y: i64 },
    /// Pointer released; closes the drag session.
    #[serde(rename = "up")]
    PointerUp,
    /// One wheel notch; scale by default, rotate with shift held.
    #[serde(rename = "wheel")]
    WheelTick {
        direction: WheelDirection,
        #[serde(default)]
        modifiers: Modifiers,
    },
    /// Explicit deselect (escape key or tool-mode change).
    #[serde(rename = "deselect")]
    Deselect,
}

/// The drag session, alive between a pointer-down that hit a shape and the
/// matching pointer-up. Owned by the controller, not the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Gesture {
    /// No session; waiting for the next pointer-down.
    #[default]
    Idle,
    /// A shape is being manipulated.
    Active {
        /// Shape under manipulation.
        id: ShapeId,
        /// Last acknowledged pointer position; the next delta is measured
        /// from here, so deltas are incremental, not cumulative.
        anchor: Pos,
    },
}
