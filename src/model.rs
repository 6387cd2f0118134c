//! Diagram model: cells, their geometry, and the in-memory store.
//!
//! This module defines the graph data the gesture engine edits (`Cell`,
//! `Geometry`), the capability traits the engine mutates it through
//! (`ModelRead`, `Model`), and the runtime store that owns all live cells
//! (`DocStore`).
//!
//! Cells form a tree: every cell except the root is exclusively owned by its
//! parent. Edge terminals are *not* ownership; an edge stores the terminal's
//! id and resolves it on every lookup, and removing a terminal explicitly
//! detaches or removes its dependent edges.
//!
//! Mutations run inside transactions. The outermost `begin_update` snapshots
//! the store; `end_update` releases the queued [`ModelEvent`]s, `rollback`
//! restores the snapshot and drops them.

#[cfg(test)]
#[path = "model_test.rs"]
mod model_test;

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::geom::{Point, Rect};
use crate::style::{Style, StyleKey};

/// Unique identifier for a cell.
pub type CellId = Uuid;

// =============================================================================
// TYPES
// =============================================================================

/// Whether a cell is a shape or a connector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellKind {
    Vertex,
    Edge,
}

/// Which end of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeEnd {
    Source,
    Target,
}

/// Cell geometry, relative to the parent's origin.
///
/// Vertices use `x, y, width, height`. Edges use the optional terminal points
/// for dangling ends plus intermediate `points`. A `relative` geometry places
/// a child at a fraction of its parent (labels, ports) with `offset` in
/// absolute units.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Geometry {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub relative: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<Point>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub points: Vec<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_point: Option<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_point: Option<Point>,
}

impl Geometry {
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height, ..Default::default() }
    }

    /// Geometry for an edge with two fixed terminal points.
    #[must_use]
    pub fn line(source: Point, target: Point) -> Self {
        let bounds = Rect::from_points(&[source, target]).unwrap_or_default();
        Self {
            x: bounds.x,
            y: bounds.y,
            width: bounds.width,
            height: bounds.height,
            relative: true,
            source_point: Some(source),
            target_point: Some(target),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    #[must_use]
    pub fn center(&self) -> Point {
        self.bounds().center()
    }

    #[must_use]
    pub fn terminal_point(&self, end: EdgeEnd) -> Option<Point> {
        match end {
            EdgeEnd::Source => self.source_point,
            EdgeEnd::Target => self.target_point,
        }
    }

    pub fn set_terminal_point(&mut self, end: EdgeEnd, point: Option<Point>) {
        match end {
            EdgeEnd::Source => self.source_point = point,
            EdgeEnd::Target => self.target_point = point,
        }
    }

    /// Move the geometry and every point it carries.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.x += dx;
        self.y += dy;
        for p in &mut self.points {
            *p = p.offset(dx, dy);
        }
        self.source_point = self.source_point.map(|p| p.offset(dx, dy));
        self.target_point = self.target_point.map(|p| p.offset(dx, dy));
    }
}

/// A vertex or edge in the diagram graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub id: CellId,
    pub kind: CellKind,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub style: Style,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Geometry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<CellId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<CellId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<CellId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<CellId>,
}

impl Cell {
    /// A detached vertex with a fresh id.
    #[must_use]
    pub fn vertex(style: impl Into<Style>, geometry: Geometry) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: CellKind::Vertex,
            value: String::new(),
            style: style.into(),
            geometry: Some(geometry),
            parent: None,
            children: Vec::new(),
            source: None,
            target: None,
        }
    }

    /// A detached edge with a fresh id.
    #[must_use]
    pub fn edge(style: impl Into<Style>, geometry: Geometry) -> Self {
        Self { kind: CellKind::Edge, ..Self::vertex(style, geometry) }
    }

    /// A bare container cell without geometry (root and layers).
    #[must_use]
    pub fn container() -> Self {
        Self { geometry: None, ..Self::vertex(Style::new(), Geometry::default()) }
    }

    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    #[must_use]
    pub fn is_vertex(&self) -> bool {
        self.kind == CellKind::Vertex
    }

    #[must_use]
    pub fn is_edge(&self) -> bool {
        self.kind == CellKind::Edge
    }

    #[must_use]
    pub fn terminal_id(&self, end: EdgeEnd) -> Option<CellId> {
        match end {
            EdgeEnd::Source => self.source,
            EdgeEnd::Target => self.target,
        }
    }
}

/// Change notifications, released when the outermost transaction commits.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelEvent {
    /// New cells were inserted by a gesture or an import.
    CellsInserted(Vec<CellId>),
    /// A style edit: parallel `keys`/`values` applied to `cells`. `None` removes the key.
    StyleChanged { keys: Vec<StyleKey>, values: Vec<Option<String>>, cells: Vec<CellId> },
    /// Cells (and their descendants) were removed.
    CellsRemoved(Vec<CellId>),
}

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("cell not found: {0}")]
    CellNotFound(CellId),
    #[error("cell already exists: {0}")]
    DuplicateCell(CellId),
    #[error("invalid parent: {0}")]
    InvalidParent(CellId),
    #[error("not an edge: {0}")]
    NotAnEdge(CellId),
    #[error("mutation rejected: {0}")]
    Rejected(String),
}

impl ModelError {
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::CellNotFound(_) => "E_CELL_NOT_FOUND",
            Self::DuplicateCell(_) => "E_DUPLICATE_CELL",
            Self::InvalidParent(_) => "E_INVALID_PARENT",
            Self::NotAnEdge(_) => "E_NOT_AN_EDGE",
            Self::Rejected(_) => "E_REJECTED",
        }
    }
}

// =============================================================================
// CAPABILITY TRAITS
// =============================================================================

/// Read access to the cell graph.
pub trait ModelRead {
    /// Resolve a cell id. Removed cells resolve to `None`.
    fn cell(&self, id: CellId) -> Option<&Cell>;

    /// The invisible root of the tree.
    fn root(&self) -> CellId;

    /// The layer new cells are inserted into; the top of target resolution.
    fn default_parent(&self) -> CellId;

    fn parent(&self, id: CellId) -> Option<CellId> {
        self.cell(id).and_then(|c| c.parent)
    }

    fn contains(&self, id: CellId) -> bool {
        self.cell(id).is_some()
    }

    fn is_vertex(&self, id: CellId) -> bool {
        self.cell(id).is_some_and(Cell::is_vertex)
    }

    fn is_edge(&self, id: CellId) -> bool {
        self.cell(id).is_some_and(Cell::is_edge)
    }

    /// Root or a layer directly under it.
    fn is_layer_or_root(&self, id: CellId) -> bool {
        id == self.root() || self.parent(id) == Some(self.root())
    }

    /// Whether `ancestor` is `descendant` or lies on its parent chain.
    fn is_ancestor(&self, ancestor: CellId, descendant: CellId) -> bool {
        let mut current = Some(descendant);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    fn children(&self, id: CellId) -> &[CellId] {
        self.cell(id).map(|c| c.children.as_slice()).unwrap_or(&[])
    }

    fn geometry(&self, id: CellId) -> Option<&Geometry> {
        self.cell(id).and_then(|c| c.geometry.as_ref())
    }

    fn style(&self, id: CellId) -> Option<&Style> {
        self.cell(id).map(|c| &c.style)
    }

    /// Resolve an edge terminal. A dangling reference to a removed cell yields `None`.
    fn terminal(&self, edge: CellId, end: EdgeEnd) -> Option<CellId> {
        let id = self.cell(edge)?.terminal_id(end)?;
        self.contains(id).then_some(id)
    }

    /// All cells below the root in draw order (parents before children).
    fn cells_in_order(&self) -> Vec<CellId> {
        let mut out = Vec::new();
        let mut stack: Vec<CellId> = self.children(self.root()).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    /// Edges whose source or target is `id`.
    fn edges_of(&self, id: CellId) -> Vec<CellId> {
        self.cells_in_order()
            .into_iter()
            .filter(|e| self.terminal(*e, EdgeEnd::Source) == Some(id) || self.terminal(*e, EdgeEnd::Target) == Some(id))
            .collect()
    }
}

/// Mutation capability. Every gesture commit goes through one transaction.
pub trait Model: ModelRead {
    fn begin_update(&mut self);

    /// Close one transaction level. The outermost level releases queued events.
    fn end_update(&mut self);

    /// Restore the state captured by the outermost `begin_update`.
    fn rollback(&mut self);

    /// Insert detached cells under `parent` at `index` (appended when `None`).
    ///
    /// Cells whose `parent` names another cell in the same batch stay nested
    /// under it. Returns the ids of the top-level inserted cells.
    ///
    /// # Errors
    ///
    /// `InvalidParent` if `parent` is missing, `DuplicateCell` if an id is taken.
    fn insert_cells(&mut self, cells: Vec<Cell>, parent: CellId, index: Option<usize>) -> Result<Vec<CellId>, ModelError>;

    /// Set (or with `None` remove) one style key. Does not emit
    /// `StyleChanged`; user-facing style edits emit it explicitly.
    ///
    /// # Errors
    ///
    /// `CellNotFound` if the cell is missing.
    fn set_style(&mut self, cell: CellId, key: StyleKey, value: Option<&str>) -> Result<(), ModelError>;

    /// Replace a cell's entire style.
    ///
    /// # Errors
    ///
    /// `CellNotFound` if the cell is missing.
    fn replace_style(&mut self, cell: CellId, style: Style) -> Result<(), ModelError>;

    /// # Errors
    ///
    /// `CellNotFound` if the cell is missing.
    fn set_geometry(&mut self, cell: CellId, geometry: Geometry) -> Result<(), ModelError>;

    /// Connect (or with `None` disconnect) one end of an edge.
    ///
    /// # Errors
    ///
    /// `NotAnEdge` if `edge` is a vertex, `CellNotFound` for missing cells.
    fn set_terminal(&mut self, edge: CellId, terminal: Option<CellId>, end: EdgeEnd) -> Result<(), ModelError>;

    /// Remove cells with their descendants. Dependent edges are removed when
    /// `include_edges` is set, otherwise detached at their current position.
    ///
    /// # Errors
    ///
    /// `CellNotFound` if a listed cell is missing.
    fn remove_cells(&mut self, ids: &[CellId], include_edges: bool) -> Result<Vec<CellId>, ModelError>;

    /// Queue an event for release on commit.
    fn emit(&mut self, event: ModelEvent);
}

/// Run `f` inside one transaction, rolling back everything on error.
///
/// # Errors
///
/// Propagates the error returned by `f` after the rollback.
pub fn transact<M, T, F>(model: &mut M, f: F) -> Result<T, ModelError>
where
    M: Model + ?Sized,
    F: FnOnce(&mut M) -> Result<T, ModelError>,
{
    model.begin_update();
    match f(model) {
        Ok(value) => {
            model.end_update();
            Ok(value)
        }
        Err(e) => {
            warn!(error = %e, code = e.error_code(), "model: transaction rolled back");
            model.rollback();
            Err(e)
        }
    }
}

/// Copy `cells` with fresh ids, remapping parent, child, and terminal
/// references that point inside the batch. References to cells outside the
/// batch are kept.
#[must_use]
pub fn clone_cells(cells: &[Cell]) -> Vec<Cell> {
    let mapping: HashMap<CellId, CellId> = cells.iter().map(|c| (c.id, Uuid::new_v4())).collect();
    let remap = |id: CellId| mapping.get(&id).copied().unwrap_or(id);
    cells
        .iter()
        .map(|c| {
            let mut copy = c.clone();
            copy.id = remap(c.id);
            copy.parent = c.parent.map(remap);
            copy.children = c.children.iter().copied().map(remap).collect();
            copy.source = c.source.map(remap);
            copy.target = c.target.map(remap);
            copy
        })
        .collect()
}

/// Detached copy of `id` and its subtree with fresh ids, parents first. The
/// copy's top cell has no parent; terminals outside the subtree are kept.
#[must_use]
pub fn duplicate_subtree<M: ModelRead + ?Sized>(model: &M, id: CellId) -> Vec<Cell> {
    let mut subtree = Vec::new();
    let mut stack = vec![id];
    while let Some(current) = stack.pop() {
        if let Some(cell) = model.cell(current) {
            stack.extend(cell.children.iter().rev().copied());
            subtree.push(cell.clone());
        }
    }
    let mut copies = clone_cells(&subtree);
    if let Some(top) = copies.first_mut() {
        top.parent = None;
    }
    copies
}

// =============================================================================
// STORE
// =============================================================================

struct Snapshot {
    cells: HashMap<CellId, Cell>,
}

/// In-memory cell store.
pub struct DocStore {
    cells: HashMap<CellId, Cell>,
    root: CellId,
    layer: CellId,
    depth: usize,
    snapshot: Option<Snapshot>,
    queued: Vec<ModelEvent>,
    released: Vec<ModelEvent>,
}

impl DocStore {
    /// Create a store holding only a root and one default layer.
    #[must_use]
    pub fn new() -> Self {
        let mut root = Cell::container();
        let mut layer = Cell::container();
        layer.parent = Some(root.id);
        root.children.push(layer.id);
        let (root_id, layer_id) = (root.id, layer.id);
        let mut cells = HashMap::new();
        cells.insert(root_id, root);
        cells.insert(layer_id, layer);
        Self {
            cells,
            root: root_id,
            layer: layer_id,
            depth: 0,
            snapshot: None,
            queued: Vec::new(),
            released: Vec::new(),
        }
    }

    /// Replace the document with `cells`, inserted under the default layer.
    ///
    /// Any open transaction and pending events are discarded.
    ///
    /// # Errors
    ///
    /// Propagates insertion errors; the store is left empty in that case.
    pub fn load(&mut self, cells: Vec<Cell>) -> Result<(), ModelError> {
        *self = Self::new();
        let layer = self.layer;
        let result = self.insert_cells(cells, layer, None).map(|_| ());
        self.released.clear();
        if result.is_err() {
            *self = Self::new();
        }
        result
    }

    /// Convenience: insert a vertex under `parent`.
    ///
    /// # Errors
    ///
    /// `InvalidParent` if `parent` is missing.
    pub fn add_vertex(&mut self, parent: CellId, style: &str, geometry: Geometry) -> Result<CellId, ModelError> {
        let cell = Cell::vertex(style, geometry);
        let id = cell.id;
        self.insert_cells(vec![cell], parent, None)?;
        Ok(id)
    }

    /// Convenience: insert an edge between two terminals under `parent`.
    ///
    /// # Errors
    ///
    /// `InvalidParent` or `CellNotFound` for missing cells.
    pub fn add_edge(
        &mut self,
        parent: CellId,
        style: &str,
        source: Option<CellId>,
        target: Option<CellId>,
    ) -> Result<CellId, ModelError> {
        let mut cell = Cell::edge(style, Geometry { relative: true, ..Geometry::default() });
        cell.source = source;
        cell.target = target;
        let id = cell.id;
        self.insert_cells(vec![cell], parent, None)?;
        Ok(id)
    }

    /// Detached copy of `id` and its subtree with fresh ids.
    #[must_use]
    pub fn duplicate(&self, id: CellId) -> Vec<Cell> {
        duplicate_subtree(self, id)
    }

    /// Take the events released by committed transactions.
    pub fn drain_events(&mut self) -> Vec<ModelEvent> {
        std::mem::take(&mut self.released)
    }

    /// Whether a transaction is open.
    #[must_use]
    pub fn in_transaction(&self) -> bool {
        self.depth > 0
    }

    /// Number of cells below the root (layers included).
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len() - 1
    }

    /// Returns `true` if the document holds no cells besides root and layer.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.len() <= 2
    }

    fn cell_mut(&mut self, id: CellId) -> Result<&mut Cell, ModelError> {
        self.cells.get_mut(&id).ok_or(ModelError::CellNotFound(id))
    }

    fn queue(&mut self, event: ModelEvent) {
        if self.depth > 0 {
            self.queued.push(event);
        } else {
            self.released.push(event);
        }
    }

    fn subtree(&self, id: CellId, out: &mut Vec<CellId>) {
        out.push(id);
        for child in self.children(id) {
            self.subtree(*child, out);
        }
    }

    /// Absolute graph-space point of a cell's center, walking vertex parents.
    fn absolute_center(&self, id: CellId) -> Option<Point> {
        let geo = self.geometry(id)?;
        let mut center = geo.center();
        let mut parent = self.parent(id);
        while let Some(p) = parent {
            if !self.is_vertex(p) || self.is_layer_or_root(p) {
                break;
            }
            if let Some(pg) = self.geometry(p) {
                center = center.offset(pg.x, pg.y);
            }
            parent = self.parent(p);
        }
        Some(center)
    }
}

impl Default for DocStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelRead for DocStore {
    fn cell(&self, id: CellId) -> Option<&Cell> {
        self.cells.get(&id)
    }

    fn root(&self) -> CellId {
        self.root
    }

    fn default_parent(&self) -> CellId {
        self.layer
    }
}

impl Model for DocStore {
    fn begin_update(&mut self) {
        if self.depth == 0 {
            self.snapshot = Some(Snapshot { cells: self.cells.clone() });
        }
        self.depth += 1;
    }

    fn end_update(&mut self) {
        if self.depth == 0 {
            return;
        }
        self.depth -= 1;
        if self.depth == 0 {
            self.snapshot = None;
            let events = std::mem::take(&mut self.queued);
            debug!(events = events.len(), "model: transaction committed");
            self.released.extend(events);
        }
    }

    fn rollback(&mut self) {
        if let Some(snapshot) = self.snapshot.take() {
            self.cells = snapshot.cells;
        }
        self.queued.clear();
        self.depth = 0;
    }

    fn insert_cells(&mut self, cells: Vec<Cell>, parent: CellId, index: Option<usize>) -> Result<Vec<CellId>, ModelError> {
        if !self.cells.contains_key(&parent) {
            return Err(ModelError::InvalidParent(parent));
        }
        let batch: HashSet<CellId> = cells.iter().map(|c| c.id).collect();
        for cell in &cells {
            if self.cells.contains_key(&cell.id) {
                return Err(ModelError::DuplicateCell(cell.id));
            }
            for terminal in [cell.source, cell.target].into_iter().flatten() {
                if !batch.contains(&terminal) && !self.cells.contains_key(&terminal) {
                    return Err(ModelError::CellNotFound(terminal));
                }
            }
        }

        let mut top = Vec::new();
        for mut cell in cells {
            let nested = cell.parent.is_some_and(|p| batch.contains(&p));
            if !nested {
                cell.parent = Some(parent);
                top.push(cell.id);
            }
            self.cells.insert(cell.id, cell);
        }

        let parent_cell = self.cell_mut(parent)?;
        let at = index.unwrap_or(parent_cell.children.len()).min(parent_cell.children.len());
        for (offset, id) in top.iter().enumerate() {
            parent_cell.children.insert(at + offset, *id);
        }
        debug!(count = top.len(), %parent, "model: cells inserted");
        Ok(top)
    }

    fn set_style(&mut self, cell: CellId, key: StyleKey, value: Option<&str>) -> Result<(), ModelError> {
        self.cell_mut(cell)?.style.put(key, value);
        Ok(())
    }

    fn replace_style(&mut self, cell: CellId, style: Style) -> Result<(), ModelError> {
        self.cell_mut(cell)?.style = style;
        Ok(())
    }

    fn set_geometry(&mut self, cell: CellId, geometry: Geometry) -> Result<(), ModelError> {
        self.cell_mut(cell)?.geometry = Some(geometry);
        Ok(())
    }

    fn set_terminal(&mut self, edge: CellId, terminal: Option<CellId>, end: EdgeEnd) -> Result<(), ModelError> {
        if let Some(t) = terminal {
            if !self.cells.contains_key(&t) {
                return Err(ModelError::CellNotFound(t));
            }
        }
        let cell = self.cell_mut(edge)?;
        if !cell.is_edge() {
            return Err(ModelError::NotAnEdge(edge));
        }
        match end {
            EdgeEnd::Source => cell.source = terminal,
            EdgeEnd::Target => cell.target = terminal,
        }
        Ok(())
    }

    fn remove_cells(&mut self, ids: &[CellId], include_edges: bool) -> Result<Vec<CellId>, ModelError> {
        let mut doomed = Vec::new();
        for id in ids {
            if !self.cells.contains_key(id) {
                return Err(ModelError::CellNotFound(*id));
            }
            if *id == self.root || *id == self.layer {
                return Err(ModelError::Rejected(format!("cannot remove root or layer {id}")));
            }
            if !doomed.contains(id) {
                self.subtree(*id, &mut doomed);
            }
        }
        let doomed_set: HashSet<CellId> = doomed.iter().copied().collect();

        // Dependent edges outside the removed set.
        let mut dependents = Vec::new();
        for removed in &doomed {
            for edge in self.edges_of(*removed) {
                if !doomed_set.contains(&edge) && !dependents.contains(&edge) {
                    dependents.push(edge);
                }
            }
        }

        if include_edges {
            for edge in dependents {
                self.subtree(edge, &mut doomed);
            }
        } else {
            for edge in dependents {
                for end in [EdgeEnd::Source, EdgeEnd::Target] {
                    let Some(terminal) = self.terminal(edge, end) else {
                        continue;
                    };
                    if !doomed_set.contains(&terminal) {
                        continue;
                    }
                    let anchor = self.absolute_center(terminal);
                    let cell = self.cell_mut(edge)?;
                    match end {
                        EdgeEnd::Source => cell.source = None,
                        EdgeEnd::Target => cell.target = None,
                    }
                    if let Some(geo) = cell.geometry.as_mut() {
                        geo.set_terminal_point(end, anchor);
                    }
                }
            }
        }

        for id in &doomed {
            if let Some(parent) = self.parent(*id) {
                if let Some(p) = self.cells.get_mut(&parent) {
                    p.children.retain(|c| c != id);
                }
            }
        }
        for id in &doomed {
            self.cells.remove(id);
        }
        debug!(count = doomed.len(), include_edges, "model: cells removed");
        self.queue(ModelEvent::CellsRemoved(doomed.clone()));
        Ok(doomed)
    }

    fn emit(&mut self, event: ModelEvent) {
        self.queue(event);
    }
}
