//! Input model: modifier keys, mouse buttons, dwell tracking, and the
//! engine-level gesture state machine.
//!
//! `Modifiers` and `Button` capture the user's intent at the time of a pointer
//! event. `GestureState` is the per-gesture dwell record shared by the hover
//! and drag controllers. `Gesture` is the single active gesture; there is never
//! more than one.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::cascade::StyleCascade;
use crate::config::SolverConfig;
use crate::drag::DragSession;
use crate::geom::Point;
use crate::hover::ConnectDrag;
use crate::model::CellId;
use crate::overlay::Affordance;
use crate::selection::SelectionModel;

/// Keyboard/mouse modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    /// Shift key is held. Disables style replace and edge split during a drag.
    pub shift: bool,
    /// Ctrl key is held.
    pub ctrl: bool,
    /// Alt / Option key is held. Suppresses drop targets entirely.
    pub alt: bool,
    /// Meta / Command key is held.
    pub meta: bool,
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    /// Middle mouse button. Starts panning.
    Middle,
    /// Right mouse button (or two-finger tap).
    Secondary,
}

/// A keyboard key name as reported by the browser (e.g. `"Escape"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

impl Key {
    #[must_use]
    pub fn is_escape(&self) -> bool {
        self.0 == "Escape" || self.0 == "Esc"
    }
}

/// Wheel / trackpad scroll delta in screen pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WheelDelta {
    pub dx: f64,
    /// Positive scrolls down.
    pub dy: f64,
}

/// Dwell bookkeeping for one hover or drag gesture.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GestureState {
    /// Target the affordances currently belong to.
    pub current_target: Option<CellId>,
    /// Affordance under the pointer, at most one.
    pub active_affordance: Option<Affordance>,
    /// When the pointer arrived on `last_target`.
    pub dwell_start_ms: Option<u64>,
    /// Target resolved by the previous observation.
    pub last_target: Option<CellId>,
}

impl GestureState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the target resolved at `now_ms` and return the time on target.
    ///
    /// The result is 0 on the first observation and whenever the target
    /// differs from the previous one; otherwise it never decreases.
    pub fn observe(&mut self, target: Option<CellId>, now_ms: u64) -> u64 {
        match self.dwell_start_ms {
            Some(start) if self.last_target == target => now_ms.saturating_sub(start),
            _ => {
                self.restart(target, now_ms);
                0
            }
        }
    }

    /// Start a new dwell on `target` at `now_ms`.
    pub fn restart(&mut self, target: Option<CellId>, now_ms: u64) {
        self.last_target = target;
        self.dwell_start_ms = Some(now_ms);
    }

    /// Time on the last observed target, without recording anything.
    #[must_use]
    pub fn time_on_target(&self, now_ms: u64) -> u64 {
        self.dwell_start_ms.map_or(0, |start| now_ms.saturating_sub(start))
    }
}

/// Read-only surroundings a controller evaluates against.
pub struct GestureEnv<'a, V: ?Sized> {
    pub view: &'a V,
    pub selection: &'a SelectionModel,
    pub cascade: &'a StyleCascade,
    pub solver: &'a SolverConfig,
}

/// The single active gesture.
#[derive(Debug, Default)]
pub enum Gesture {
    /// No gesture in progress; idle hover is allowed.
    #[default]
    Idle,
    /// Pointer pressed on a hover affordance. Stays a click until the pointer
    /// travels past the click tolerance.
    Pressed {
        /// Vertex the affordance belongs to.
        source: CellId,
        affordance: Affordance,
        /// Screen-space position of the press.
        down: Point,
    },
    /// Dragging a new edge out of a hover affordance.
    Connecting(ConnectDrag),
    /// Dragging an insertable payload.
    Dragging(Box<DragSession>),
    /// Panning the view with the middle button.
    Panning {
        /// Screen-space position of the previous pointer event.
        last_screen: Point,
    },
}

impl Gesture {
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Short name for logging.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Pressed { .. } => "pressed",
            Self::Connecting(_) => "connecting",
            Self::Dragging(_) => "dragging",
            Self::Panning { .. } => "panning",
        }
    }
}
