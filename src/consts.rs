//! Shared numeric constants for the gesture engine.
//!
//! Everything here is a default; the tunable subset is mirrored in
//! [`crate::config::EngineConfig`].

// ── Timing ──────────────────────────────────────────────────────

/// Idle time on a new target before hover arrows are shown, in milliseconds.
pub const HOVER_UPDATE_DELAY_MS: u64 = 500;

/// Time without a target change before a hover target counts as settled.
pub const HOVER_ACTIVATION_DELAY_MS: u64 = 140;

/// Dwell before directional drop arrows appear during a drag.
pub const DROP_TARGET_DELAY_MS: u64 = 200;

/// Dwell before the style-replace badge appears for unrelated shapes.
pub const STYLE_REPLACE_DELAY_MS: u64 = 1500;

/// Extra slack added when a timer re-runs an evaluation, so the threshold
/// comparison is strictly past the delay.
pub const TIMER_SLACK_MS: u64 = 10;

// ── Hit-testing ─────────────────────────────────────────────────

/// Screen-space hit slop in pixels for thin edges and decorated bounds.
pub const GRAPH_TOLERANCE_PX: f64 = 4.0;

/// Side length of a selection resize handle in screen pixels.
pub const HANDLE_SIZE_PX: f64 = 7.0;

/// Radius of the rotation handle in screen pixels.
pub const ROTATE_HANDLE_RADIUS_PX: f64 = 8.0;

/// Distance from the bounding box edge to the rotate handle, in screen pixels.
pub const ROTATE_HANDLE_OFFSET_PX: f64 = 24.0;

// ── Affordances ─────────────────────────────────────────────────

/// Gap between the decorated bounds and a hover arrow.
pub const ARROW_SPACING_PX: f64 = 2.0;

/// Long side of a directional arrow (across the direction of travel).
pub const ARROW_LENGTH_PX: f64 = 26.0;

/// Short side of a directional arrow (along the direction of travel).
pub const ARROW_DEPTH_PX: f64 = 14.0;

/// Side length of the style-replace badge.
pub const BADGE_SIZE_PX: f64 = 30.0;

/// Radius of an edge endpoint marker.
pub const ENDPOINT_RADIUS_PX: f64 = 10.0;

/// Side length of the hover drag handle.
pub const DRAG_HANDLE_SIZE_PX: f64 = 12.0;

/// Opacity of affordances that are shown but not under the pointer.
pub const INACTIVE_OPACITY: u8 = 20;

/// Pointer travel that turns a press on an affordance into a drag.
pub const CLICK_TOLERANCE_PX: f64 = 4.0;

/// A colliding neighbour this many times larger (both axes) does not hide an arrow.
pub const COLLISION_SIZE_RATIO: f64 = 3.0;

/// Extra margin around the affordance union that keeps a hover target alive.
pub const HOVER_BBOX_MARGIN_PX: f64 = 10.0;

// ── Geometry ────────────────────────────────────────────────────

/// Gap between a source shape and a newly connected shape, in graph units.
pub const DEFAULT_EDGE_LENGTH: f64 = 80.0;

/// Grid size used for snapping, in graph units.
pub const GRID_SIZE: f64 = 10.0;

/// Shapes at or below this size on an axis are never proportionally resized.
pub const MIN_MATCH_SIZE: f64 = 45.0;

/// Half-extent of the probe used to find an existing neighbour in a direction.
pub const NEIGHBOUR_PROBE: f64 = 40.0;
