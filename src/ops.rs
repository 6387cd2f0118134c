//! Commit plans and their transactional execution.
//!
//! The controllers decide *what* a gesture commits as a [`CommitPlan`]; the
//! same plan drives the drag preview and the final mutation, so what the user
//! sees before release is what lands in the model. [`execute`] applies a plan
//! inside one model transaction: the inserted cells, the new edge, the cascade
//! styling, and the `CellsInserted` event either all land or none do.

#[cfg(test)]
#[path = "ops_test.rs"]
mod ops_test;

use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::cascade::StyleCascade;
use crate::config::SolverConfig;
use crate::geom::{Direction, Point};
use crate::input::GestureEnv;
use crate::model::{Cell, CellId, CellKind, EdgeEnd, Geometry, Model, ModelError, ModelEvent, transact};
use crate::solver;
use crate::style::{Style, StyleKey};
use crate::view::View;

/// Keys a restyled cell keeps from its own style when the target's
/// appearance is preserved.
pub const APPEARANCE_KEYS: &[StyleKey] = &[
    StyleKey::Shadow,
    StyleKey::Dashed,
    StyleKey::DashPattern,
    StyleKey::FontFamily,
    StyleKey::FontSize,
    StyleKey::FontColor,
    StyleKey::FontStyle,
    StyleKey::Align,
    StyleKey::VerticalAlign,
    StyleKey::LabelBackgroundColor,
    StyleKey::StartFill,
    StyleKey::StartSize,
    StyleKey::EndFill,
    StyleKey::EndSize,
    StyleKey::StrokeColor,
    StyleKey::StrokeWidth,
    StyleKey::FillColor,
    StyleKey::GradientColor,
    StyleKey::GradientDirection,
    StyleKey::Opacity,
    StyleKey::Html,
    StyleKey::EdgeStyle,
    StyleKey::Elbow,
    StyleKey::Container,
    StyleKey::Connectable,
];

// =============================================================
// Plans
// =============================================================

/// Parent that inserted cells are attached to, with its absolute graph
/// origin. Plans carry absolute coordinates; execution subtracts the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub parent: CellId,
    pub origin: Point,
}

impl Placement {
    /// Insert under `parent`.
    #[must_use]
    pub fn under<V: View + ?Sized>(view: &V, parent: CellId) -> Self {
        let origin = if view.is_vertex(parent) && !view.is_layer_or_root(parent) {
            solver::graph_bounds_of(view, parent).map_or(Point::default(), |r| Point::new(r.x, r.y))
        } else {
            Point::default()
        };
        Self { parent, origin }
    }

    /// Insert next to `cell`: into its container if it has one, otherwise
    /// into the default layer.
    #[must_use]
    pub fn beside<V: View + ?Sized>(view: &V, cell: CellId) -> Self {
        match view.parent(cell) {
            Some(parent) if view.is_vertex(parent) && !view.is_layer_or_root(parent) => Self::under(view, parent),
            _ => Self::under(view, view.default_parent()),
        }
    }
}

/// One gesture's worth of model changes.
#[derive(Debug, Clone, PartialEq)]
pub enum CommitPlan {
    /// Insert `payload` with the top-left of its bounds at `origin`.
    Insert { payload: Vec<Cell>, origin: Point, placement: Placement },
    /// Insert `payload` so its drop cell has `geometry`, then connect it to
    /// `source`. A vertex source gets a new edge; an edge source has the end
    /// addressed by `direction` rewired to the drop cell.
    Connect {
        source: CellId,
        direction: Direction,
        payload: Vec<Cell>,
        geometry: Geometry,
        placement: Placement,
        edge_style: Style,
    },
    /// Connect two existing vertices with a new edge.
    ConnectExisting { source: CellId, target: CellId, edge_style: Style },
    /// Insert `payload` centred on `center` and route `edge` through its drop
    /// vertex. Waypoints before `split_index` stay on the original edge.
    SplitEdge { edge: CellId, payload: Vec<Cell>, center: Point, split_index: usize, placement: Placement },
    /// Replace the style of every `kind` cell in `cells`, geometry untouched.
    ReplaceStyle { style: Style, kind: CellKind, cells: Vec<CellId>, keep_appearance: bool },
}

impl CommitPlan {
    /// Short name for logging.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Insert { .. } => "insert",
            Self::Connect { .. } => "connect",
            Self::ConnectExisting { .. } => "connect_existing",
            Self::SplitEdge { .. } => "split_edge",
            Self::ReplaceStyle { .. } => "replace_style",
        }
    }
}

/// Plan inserting `payload` at the free insertion point.
#[must_use]
pub fn plan_free_insert<V: View + ?Sized>(view: &V, payload: Vec<Cell>, solver: &SolverConfig) -> CommitPlan {
    let origin = solver::compute_insertion_point(view, solver.grid_size);
    CommitPlan::Insert { payload, origin, placement: Placement::under(view, view.default_parent()) }
}

/// Plan connecting `payload` from `source` in `direction`. A source that is
/// gone falls back to the free insertion point.
#[must_use]
pub fn plan_connect<V: View + ?Sized>(
    env: &GestureEnv<'_, V>,
    source: CellId,
    direction: Direction,
    payload: Vec<Cell>,
) -> CommitPlan {
    match solver::compute_connect_geometry(env.view, source, &payload, direction, env.solver) {
        Some(geometry) => CommitPlan::Connect {
            source,
            direction,
            placement: Placement::beside(env.view, source),
            payload,
            geometry,
            edge_style: env.cascade.create_current_edge_style(),
        },
        None => {
            warn!(%source, ?direction, "connect source unavailable; inserting at free point");
            plan_free_insert(env.view, payload, env.solver)
        }
    }
}

// =============================================================
// Execution
// =============================================================

/// What a committed plan changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Commit {
    /// Every cell the commit inserted, nested cells and new edges included.
    pub inserted: Vec<CellId>,
    pub restyled: Vec<CellId>,
    /// Cells that should become the selection.
    pub select: Vec<CellId>,
}

/// Apply `plan` in one transaction.
///
/// # Errors
///
/// Propagates the first model error after rolling the whole plan back.
pub fn execute<M: Model + ?Sized>(model: &mut M, cascade: &StyleCascade, plan: CommitPlan) -> Result<Commit, ModelError> {
    let kind = plan.kind();
    debug!(kind, "ops: executing plan");
    let commit = transact(model, |m| {
        let commit = match plan {
            CommitPlan::Insert { payload, origin, placement } => insert(m, payload, origin, placement)?,
            CommitPlan::Connect { source, direction, payload, geometry, placement, edge_style } => {
                connect(m, source, direction, payload, &geometry, placement, edge_style)?
            }
            CommitPlan::ConnectExisting { source, target, edge_style } => {
                let edge = new_edge(m, edge_style, source, target)?;
                Commit { inserted: vec![edge], restyled: Vec::new(), select: vec![target] }
            }
            CommitPlan::SplitEdge { edge, payload, center, split_index, placement } => {
                split(m, edge, payload, center, split_index, placement)?
            }
            CommitPlan::ReplaceStyle { style, kind, cells, keep_appearance } => {
                replace_style(m, &style, kind, &cells, keep_appearance)?
            }
        };
        if !commit.inserted.is_empty() {
            cascade.apply_to_inserted(m, &commit.inserted)?;
            m.emit(ModelEvent::CellsInserted(commit.inserted.clone()));
        }
        Ok(commit)
    })?;
    info!(kind, inserted = commit.inserted.len(), restyled = commit.restyled.len(), "gesture committed");
    Ok(commit)
}

/// Insert `payload` under `placement`, moving its top-level cells by
/// `(dx, dy)` in absolute graph units. Returns all inserted ids.
fn place<M: Model + ?Sized>(
    m: &mut M,
    mut payload: Vec<Cell>,
    dx: f64,
    dy: f64,
    placement: Placement,
) -> Result<Vec<CellId>, ModelError> {
    let tops: HashSet<CellId> = solver::top_level(&payload).iter().map(|c| c.id).collect();
    for cell in payload.iter_mut().filter(|c| tops.contains(&c.id)) {
        if let Some(geo) = cell.geometry.as_mut() {
            geo.translate(dx - placement.origin.x, dy - placement.origin.y);
        }
    }
    let ids: Vec<CellId> = payload.iter().map(|c| c.id).collect();
    m.insert_cells(payload, placement.parent, None)?;
    Ok(ids)
}

fn insert<M: Model + ?Sized>(m: &mut M, payload: Vec<Cell>, origin: Point, placement: Placement) -> Result<Commit, ModelError> {
    let bounds = solver::payload_bounds(&payload).unwrap_or_default();
    let tops: Vec<CellId> = solver::top_level(&payload).iter().map(|c| c.id).collect();
    let inserted = place(m, payload, origin.x - bounds.x, origin.y - bounds.y, placement)?;
    Ok(Commit { inserted, restyled: Vec::new(), select: tops })
}

fn connect<M: Model + ?Sized>(
    m: &mut M,
    source: CellId,
    direction: Direction,
    mut payload: Vec<Cell>,
    geometry: &Geometry,
    placement: Placement,
    edge_style: Style,
) -> Result<Commit, ModelError> {
    if !m.contains(source) {
        return Err(ModelError::CellNotFound(source));
    }
    let index = solver::drop_cell_index(&payload);
    let Some(drop) = payload.get_mut(index) else {
        return Err(ModelError::Rejected("empty payload".to_owned()));
    };
    let drop_id = drop.id;
    let drop_is_vertex = drop.is_vertex();
    let current = drop.geometry.clone().unwrap_or_default();
    // The drop cell lands on `geometry` exactly; its payload siblings follow
    // by the same offset.
    let (dx, dy) = (geometry.x - current.x, geometry.y - current.y);
    let mut exact = geometry.clone();
    exact.translate(-placement.origin.x, -placement.origin.y);
    drop.geometry = Some(exact);

    let tops: Vec<CellId> = solver::top_level(&payload).iter().map(|c| c.id).collect();
    for cell in payload.iter_mut().filter(|c| c.id != drop_id && tops.contains(&c.id)) {
        if let Some(geo) = cell.geometry.as_mut() {
            geo.translate(dx - placement.origin.x, dy - placement.origin.y);
        }
    }
    let mut inserted: Vec<CellId> = payload.iter().map(|c| c.id).collect();
    m.insert_cells(payload, placement.parent, None)?;

    if m.is_edge(source) {
        if drop_is_vertex {
            let end = if direction == Direction::North { EdgeEnd::Source } else { EdgeEnd::Target };
            m.set_terminal(source, Some(drop_id), end)?;
        }
    } else if drop_is_vertex {
        inserted.push(new_edge(m, edge_style, source, drop_id)?);
    } else {
        m.set_terminal(drop_id, Some(source), EdgeEnd::Source)?;
    }
    Ok(Commit { inserted, restyled: Vec::new(), select: vec![drop_id] })
}

/// Insert a plain edge from `source` to `target` into the default layer.
fn new_edge<M: Model + ?Sized>(m: &mut M, style: Style, source: CellId, target: CellId) -> Result<CellId, ModelError> {
    let mut edge = Cell::edge(style, Geometry { relative: true, ..Geometry::default() });
    edge.source = Some(source);
    edge.target = Some(target);
    let id = edge.id;
    let layer = m.default_parent();
    m.insert_cells(vec![edge], layer, None)?;
    Ok(id)
}

fn split<M: Model + ?Sized>(
    m: &mut M,
    edge: CellId,
    payload: Vec<Cell>,
    center: Point,
    split_index: usize,
    placement: Placement,
) -> Result<Commit, ModelError> {
    let original = m.cell(edge).cloned().ok_or(ModelError::CellNotFound(edge))?;
    if !original.is_edge() {
        return Err(ModelError::NotAnEdge(edge));
    }
    let vertex = payload
        .get(solver::drop_cell_index(&payload))
        .filter(|c| c.is_vertex())
        .map(|c| c.id)
        .ok_or_else(|| ModelError::Rejected("split needs a vertex payload".to_owned()))?;
    let bounds = solver::payload_bounds(&payload).unwrap_or_default();
    let c = bounds.center();
    let mut inserted = place(m, payload, center.x - c.x, center.y - c.y, placement)?;

    let geo = original.geometry.clone().unwrap_or_default();
    let at = split_index.min(geo.points.len());
    let mut head = geo.clone();
    head.points.truncate(at);
    head.target_point = None;
    let tail = Geometry {
        relative: true,
        points: geo.points[at..].to_vec(),
        target_point: geo.target_point,
        ..Geometry::default()
    };

    m.set_geometry(edge, head)?;
    m.set_terminal(edge, Some(vertex), EdgeEnd::Target)?;

    let mut second = Cell::edge(original.style.clone(), tail);
    second.source = Some(vertex);
    second.target = original.target.filter(|t| m.contains(*t));
    let second_id = second.id;
    let parent = original.parent.unwrap_or_else(|| m.default_parent());
    let index = m.children(parent).iter().position(|id| *id == edge).map(|i| i + 1);
    m.insert_cells(vec![second], parent, index)?;
    inserted.push(second_id);
    debug!(%edge, %vertex, at, "ops: edge split");
    Ok(Commit { inserted, restyled: Vec::new(), select: vec![vertex] })
}

fn replace_style<M: Model + ?Sized>(
    m: &mut M,
    style: &Style,
    kind: CellKind,
    cells: &[CellId],
    keep_appearance: bool,
) -> Result<Commit, ModelError> {
    let mut restyled = Vec::new();
    for id in cells {
        let cell = m.cell(*id).ok_or(ModelError::CellNotFound(*id))?;
        if cell.kind != kind {
            continue;
        }
        let mut next = style.clone();
        if keep_appearance {
            for key in APPEARANCE_KEYS {
                next.put(*key, cell.style.get(*key));
            }
        }
        m.replace_style(*id, next)?;
        restyled.push(*id);
    }
    Ok(Commit { inserted: Vec::new(), select: restyled.clone(), restyled })
}
