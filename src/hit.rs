//! Hit-test index: target resolution and affordance geometry.
//!
//! All queries run against the current [`View`] on demand; nothing is cached
//! between pointer events. Points and rectangles are in screen space unless a
//! function says otherwise.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::geom::{Direction, Point, Rect};
use crate::model::{CellId, ModelRead};
use crate::selection::SelectionChrome;
use crate::style::StyleKey;
use crate::view::{View, ViewState};

// =============================================================
// Cell predicates
// =============================================================

/// Locked cells accept no drops, connects, or hover arrows. Read from the
/// resolved style, so a named style can lock a cell.
#[must_use]
pub fn is_locked<V: View + ?Sized>(view: &V, id: CellId) -> bool {
    view.resolved_style(id).is_some_and(|s| s.flag(StyleKey::Locked, false))
}

/// An unlocked vertex whose resolved style has not opted out of connections.
#[must_use]
pub fn is_connectable<V: View + ?Sized>(view: &V, id: CellId) -> bool {
    view.is_vertex(id)
        && !view.is_layer_or_root(id)
        && view
            .resolved_style(id)
            .is_some_and(|s| !s.flag(StyleKey::Locked, false) && s.flag(StyleKey::Connectable, true))
}

/// Swimlanes are containers by shape; anything else opts in with `container=1`.
#[must_use]
pub fn is_swimlane<V: View + ?Sized>(view: &V, id: CellId) -> bool {
    view.state_for(id).is_some_and(|s| s.style.get(StyleKey::Shape) == Some("swimlane"))
}

/// Whether dropped cells may become children of `id`.
#[must_use]
pub fn is_valid_drop_container<V: View + ?Sized>(view: &V, id: CellId) -> bool {
    if !view.is_vertex(id) || view.is_layer_or_root(id) || is_locked(view, id) {
        return false;
    }
    view.state_for(id)
        .is_some_and(|s| s.style.flag(StyleKey::Container, false) || s.style.get(StyleKey::Shape) == Some("swimlane"))
}

// =============================================================
// Ancestor-loop guard
// =============================================================

/// `None` if `target` is one of `origins`, an ancestor of one, or a
/// descendant of one. `origins` are the existing cells a dragged payload was
/// copied from, or the source of a connect.
#[must_use]
pub fn guard_target<M: ModelRead + ?Sized>(model: &M, target: Option<CellId>, origins: &[CellId]) -> Option<CellId> {
    let target = target?;
    let looped = origins
        .iter()
        .any(|o| model.is_ancestor(target, *o) || model.is_ancestor(*o, target));
    (!looped).then_some(target)
}

// =============================================================
// Target resolution
// =============================================================

/// Resolve the drop/connect target under the screen point `p`.
///
/// Starting from the topmost hit, walks up to the parent while the hit is not
/// a valid drop container and the parent is a vertex. Stops with `None` at a
/// locked cell; stops with the current cell at an edge or at the layer.
/// Targets that would close an ancestor loop with `origins` resolve to `None`.
#[must_use]
pub fn resolve_drop_target<V: View + ?Sized>(view: &V, p: Point, origins: &[CellId]) -> Option<CellId> {
    let mut current = view.cell_at(p)?;
    loop {
        if is_locked(view, current) {
            return None;
        }
        if view.is_edge(current) || is_valid_drop_container(view, current) {
            break;
        }
        match view.parent(current) {
            Some(parent) if view.is_vertex(parent) && !view.is_layer_or_root(parent) => current = parent,
            _ => break,
        }
    }
    guard_target(view, Some(current), origins)
}

/// Parent that a plain drop on `target` inserts into: the target itself when
/// it is a valid container, otherwise the default layer.
#[must_use]
pub fn drop_parent<V: View + ?Sized>(view: &V, target: Option<CellId>) -> CellId {
    match target {
        Some(t) if is_valid_drop_container(view, t) => t,
        _ => view.default_parent(),
    }
}

/// Normalise a hovered cell to the vertex that should carry hover arrows.
///
/// A non-connectable vertex defers to a connectable vertex parent. Edges,
/// locked cells, and cells that stay non-connectable yield `None`. A relative
/// child of an edge (an edge label) is ignored.
#[must_use]
pub fn hover_target<V: View + ?Sized>(view: &V, cell: Option<CellId>) -> Option<CellId> {
    let mut id = cell?;
    if view.geometry(id).is_some_and(|g| g.relative) && view.parent(id).is_some_and(|p| view.is_edge(p)) {
        return None;
    }
    if view.is_vertex(id) && !is_connectable(view, id) {
        if let Some(parent) = view.parent(id) {
            if is_connectable(view, parent) {
                id = parent;
            }
        }
    }
    if view.is_edge(id) || is_locked(view, id) || !is_connectable(view, id) {
        return None;
    }
    Some(id)
}

// =============================================================
// Decorated bounds and affordance placement
// =============================================================

/// Bounding box of `state` grown by `tolerance + spacing`, padded by any
/// selection-handle offsets, and extended over a visible rotation handle.
#[must_use]
pub fn decorated_bounds(state: &ViewState, chrome: Option<&SelectionChrome>, tolerance: f64, spacing: f64) -> Rect {
    let mut bds = state.bounding_box.grow(tolerance + spacing);
    if let Some(chrome) = chrome {
        bds.x -= chrome.horizontal_offset / 2.0;
        bds.y -= chrome.vertical_offset / 2.0;
        bds.width += chrome.horizontal_offset;
        bds.height += chrome.vertical_offset;
        if let Some(rotation) = chrome.rotation_handle {
            bds = bds.union(&rotation);
        }
    }
    bds
}

/// Rectangle of the directional affordance for `dir`, touching the outside
/// of `decorated` and centred on the target's `center` across the direction
/// of travel. `length` runs across travel, `depth` along it.
#[must_use]
pub fn arrow_bounds(decorated: Rect, center: Point, dir: Direction, length: f64, depth: f64) -> Rect {
    match dir {
        Direction::North => Rect::new(center.x - length / 2.0, decorated.y - depth, length, depth),
        Direction::East => Rect::new(decorated.right(), center.y - length / 2.0, depth, length),
        Direction::South => Rect::new(center.x - length / 2.0, decorated.bottom(), length, depth),
        Direction::West => Rect::new(decorated.x - depth, center.y - length / 2.0, depth, length),
    }
}

/// Probe point just beyond `decorated` in `dir`, at half the affordance depth.
#[must_use]
pub fn collision_probe(decorated: Rect, center: Point, dir: Direction, depth: f64) -> Point {
    match dir {
        Direction::North => Point::new(center.x, decorated.y - depth / 2.0),
        Direction::East => Point::new(decorated.right() + depth / 2.0, center.y),
        Direction::South => Point::new(center.x, decorated.bottom() + depth / 2.0),
        Direction::West => Point::new(decorated.x - depth / 2.0, center.y),
    }
}

/// Whether `portConstraint=eastwest` hides this direction.
#[must_use]
pub fn direction_allowed(state: &ViewState, dir: Direction) -> bool {
    !(dir.is_vertical() && state.style.get(StyleKey::PortConstraint) == Some("eastwest"))
}
