//! Geometry solver: placement, sizing, and terminal points for inserted and
//! connected cells.
//!
//! Everything here is a pure function of the view and its inputs. Results are
//! in graph units, absolute (relative to the layer origin). The solver never
//! fails loudly: missing states come back as `None` and the caller falls back
//! to [`compute_insertion_point`].

#[cfg(test)]
#[path = "solver_test.rs"]
mod solver_test;

use std::collections::HashSet;

use crate::config::SolverConfig;
use crate::geom::{Direction, Point, Rect};
use crate::hit;
use crate::model::{Cell, CellId, EdgeEnd, Geometry};
use crate::view::View;

// =============================================================
// Grid
// =============================================================

/// Round to the nearest grid line.
#[must_use]
pub fn snap(value: f64, grid: f64) -> f64 {
    if grid > 0.0 { (value / grid).round() * grid } else { value }
}

/// Round up to the next grid line (identity on a grid line).
#[must_use]
pub fn snap_up(value: f64, grid: f64) -> f64 {
    if grid > 0.0 { (value / grid).ceil() * grid } else { value }
}

/// Top-left corner for a plain drop with the pointer at `pointer` (graph).
///
/// The corner is snapped upwards so it is never left of or above the pointer
/// and at most one grid unit away.
#[must_use]
pub fn drop_origin(pointer: Point, config: &SolverConfig) -> Point {
    if !config.grid_enabled {
        return pointer;
    }
    Point::new(snap_up(pointer.x, config.grid_size), snap_up(pointer.y, config.grid_size))
}

// =============================================================
// Payload helpers
// =============================================================

/// Cells of `payload` whose parent is not itself in the payload.
#[must_use]
pub fn top_level(payload: &[Cell]) -> Vec<&Cell> {
    let ids: HashSet<CellId> = payload.iter().map(|c| c.id).collect();
    payload.iter().filter(|c| c.parent.is_none_or(|p| !ids.contains(&p))).collect()
}

/// Index of the payload cell that gets connected: the first top-level vertex,
/// or the first cell when there is none.
#[must_use]
pub fn drop_cell_index(payload: &[Cell]) -> usize {
    let tops: HashSet<CellId> = top_level(payload).iter().map(|c| c.id).collect();
    payload
        .iter()
        .position(|c| c.is_vertex() && tops.contains(&c.id))
        .unwrap_or(0)
}

/// Bounds of one cell's own geometry, including an edge's points.
#[must_use]
pub fn cell_extent(cell: &Cell) -> Option<Rect> {
    let geo = cell.geometry.as_ref()?;
    if cell.is_vertex() {
        return Some(geo.bounds());
    }
    let mut pts: Vec<Point> = geo.points.clone();
    pts.extend(geo.source_point);
    pts.extend(geo.target_point);
    Rect::from_points(&pts)
}

/// Union of the top-level payload extents, in payload coordinates.
#[must_use]
pub fn payload_bounds(payload: &[Cell]) -> Option<Rect> {
    top_level(payload)
        .into_iter()
        .filter_map(cell_extent)
        .reduce(|a, b| a.union(&b))
}

/// Absolute graph bounds of a live cell.
#[must_use]
pub fn graph_bounds_of<V: View + ?Sized>(view: &V, id: CellId) -> Option<Rect> {
    let state = view.state_for(id)?;
    Some(view.transform().rect_to_graph(state.bounds))
}

/// Direction that addresses an edge end: north is the start, south the end.
#[must_use]
pub fn end_direction(end: EdgeEnd) -> Direction {
    match end {
        EdgeEnd::Source => Direction::North,
        EdgeEnd::Target => Direction::South,
    }
}

// =============================================================
// Connect geometry
// =============================================================

/// Geometry for the payload's drop cell when it is connected from `source`
/// in `direction`.
///
/// * Edge source: the drop cell is centred on the edge's start (north) or end
///   (any other direction).
/// * Vertex source, edge drop cell with both terminal points: the edge keeps
///   its length and is laid out from the source's centre along `direction`.
/// * Vertex source otherwise: the drop cell is centred on the source, moved by
///   half of both sizes plus the default edge length. A single drop cell is
///   matched to the source height unless either shape is at or under the
///   minimum match size.
///
/// Returns `None` if the source has no view state or the drop cell has no
/// geometry.
#[must_use]
pub fn compute_connect_geometry<V: View + ?Sized>(
    view: &V,
    source: CellId,
    payload: &[Cell],
    direction: Direction,
    config: &SolverConfig,
) -> Option<Geometry> {
    let cell = payload.get(drop_cell_index(payload))?;
    let mut geo2 = cell.geometry.clone()?;
    let state = view.state_for(source)?;
    let t = view.transform();

    if view.is_edge(source) {
        let (p0, pe) = state.end_points()?;
        let anchor = t.screen_to_graph(if direction == Direction::North { p0 } else { pe });
        geo2.x = anchor.x - geo2.width / 2.0;
        geo2.y = anchor.y - geo2.height / 2.0;
        return Some(geo2);
    }

    let geo = t.rect_to_graph(state.bounds);
    let length = config.default_edge_length;

    if cell.is_edge() {
        if let (Some(p0), Some(pe)) = (geo2.source_point, geo2.target_point) {
            return Some(edge_from(geo, p0.distance(pe), direction));
        }
    }

    let keep_size = top_level(payload).len() > 1;
    let min = config.min_match_size;
    if !keep_size && geo2.width > min && geo2.height > min && geo.width > min && geo.height > min {
        geo2.width *= geo.height / geo2.height;
        geo2.height = geo.height;
    }

    geo2.x = geo.x + geo.width / 2.0 - geo2.width / 2.0;
    geo2.y = geo.y + geo.height / 2.0 - geo2.height / 2.0;
    match direction {
        Direction::North => geo2.y -= geo.height / 2.0 + geo2.height / 2.0 + length,
        Direction::East => geo2.x += geo.width / 2.0 + geo2.width / 2.0 + length,
        Direction::South => geo2.y += geo.height / 2.0 + geo2.height / 2.0 + length,
        Direction::West => geo2.x -= geo.width / 2.0 + geo2.width / 2.0 + length,
    }

    // A dangling-source edge that already ends in a payload vertex is shifted
    // so that vertex lines up with the chain instead of the edge's raw origin.
    if cell.is_edge() && geo2.source_point.is_some() {
        let attached = cell
            .target
            .and_then(|id| payload.iter().find(|c| c.id == id))
            .and_then(|c| c.geometry.as_ref());
        if let Some(tg) = attached {
            let c = tg.center();
            match direction {
                Direction::North => {
                    geo2.x -= c.x;
                    geo2.y -= c.y + tg.height / 2.0;
                }
                Direction::East => {
                    geo2.x -= c.x - tg.width / 2.0;
                    geo2.y -= c.y;
                }
                Direction::South => {
                    geo2.x -= c.x;
                    geo2.y -= c.y - tg.height / 2.0;
                }
                Direction::West => {
                    geo2.x -= c.x + tg.width / 2.0;
                    geo2.y -= c.y;
                }
            }
        }
    }
    Some(geo2)
}

/// Straight edge of `length` leaving the side of `source` that faces `direction`.
fn edge_from(source: Rect, length: f64, direction: Direction) -> Geometry {
    let c = source.center();
    let (start, end) = match direction {
        Direction::North => (Point::new(c.x, source.y), Point::new(c.x, source.y - length)),
        Direction::East => (Point::new(source.right(), c.y), Point::new(source.right() + length, c.y)),
        Direction::South => (Point::new(c.x, source.bottom()), Point::new(c.x, source.bottom() + length)),
        Direction::West => (Point::new(source.x, c.y), Point::new(source.x - length, c.y)),
    };
    Geometry::line(start, end)
}

// =============================================================
// Click-to-clone
// =============================================================

/// Point `length` beyond the middle of the side of `source` facing `direction`.
#[must_use]
pub fn connect_point(source: Rect, direction: Direction, length: f64) -> Point {
    let c = source.center();
    match direction {
        Direction::North => Point::new(c.x, source.y - length),
        Direction::East => Point::new(source.right() + length, c.y),
        Direction::South => Point::new(c.x, source.bottom() + length),
        Direction::West => Point::new(source.x - length, c.y),
    }
}

/// Bounds for a clone of size `width × height` connected from `source`: centred
/// on the connect point, then pushed out by half its own size so the gap to
/// the source equals `length`.
#[must_use]
pub fn compute_clone_geometry(source: Rect, width: f64, height: f64, direction: Direction, length: f64) -> Rect {
    let pt = connect_point(source, direction, length);
    let mut r = Rect::centered(pt, width, height);
    match direction {
        Direction::North => r.y -= height / 2.0,
        Direction::East => r.x += width / 2.0,
        Direction::South => r.y += height / 2.0,
        Direction::West => r.x -= width / 2.0,
    }
    r
}

/// Topmost connectable vertex near the connect point of `source` in
/// `direction`, if any. The probe is a square of `neighbour_probe` units
/// centred on the connect point. Cells on the source's ancestor chain or
/// inside it are never returned.
#[must_use]
pub fn find_neighbour<V: View + ?Sized>(
    view: &V,
    source: CellId,
    direction: Direction,
    config: &SolverConfig,
) -> Option<CellId> {
    let bounds = graph_bounds_of(view, source)?;
    let pt = connect_point(bounds, direction, config.default_edge_length);
    let probe = Rect::centered(pt, config.neighbour_probe, config.neighbour_probe);
    view.cells_in_order()
        .into_iter()
        .rev()
        .filter(|id| hit::is_connectable(view, *id))
        .filter(|id| hit::guard_target(view, Some(*id), &[source]).is_some())
        .find(|id| graph_bounds_of(view, *id).is_some_and(|b| b.intersects(&probe) || b.contains(pt)))
}

// =============================================================
// Free insertion point
// =============================================================

/// Canvas point for inserting a shape with no explicit location: just right
/// of the content's left edge (or two grid units in on an empty page) and two
/// grid units below the content, never above or left of the visible origin,
/// snapped to the grid.
#[must_use]
pub fn compute_insertion_point<V: View + ?Sized>(view: &V, grid: f64) -> Point {
    let t = view.transform();
    let s = t.scale;
    let origin = t.screen_to_graph(Point::default());
    let pt = Point::new(snap(origin.x + grid, grid), snap(origin.y + grid, grid));
    let bds = view.graph_bounds();
    let empty_shift = if bds.width == 0.0 { 2.0 * grid } else { 0.0 };
    let x = pt.x.max(bds.x / s - t.translate.x + empty_shift);
    let y = pt.y.max(bds.bottom() / s - t.translate.y + 2.0 * grid);
    Point::new(snap(x.round(), grid), snap(y.round(), grid))
}
