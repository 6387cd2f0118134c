//! View projection: scale/translate, per-cell view states, and the `View`
//! capability the gesture controllers read from.
//!
//! A [`ViewState`] is derived from a cell, its ancestors, and the stylesheet
//! every time it is requested, so it can never go stale after a geometry,
//! style, or re-parenting change.

#[cfg(test)]
#[path = "view_test.rs"]
mod view_test;

use crate::consts::GRAPH_TOLERANCE_PX;
use crate::geom::{Point, Rect, nearest_on_segment};
use crate::model::{CellId, DocStore, EdgeEnd, ModelRead};
use crate::style::{Style, StyleKey, Stylesheet};

/// View scale and translation.
///
/// `translate` is in graph units; `scale` is a factor (1.0 = no zoom).
/// A graph point maps to the screen as `(p + translate) * scale`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    pub scale: f64,
    pub translate: Point,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self { scale: 1.0, translate: Point::default() }
    }
}

impl ViewTransform {
    /// Convert a screen-space point to graph coordinates.
    #[must_use]
    pub fn screen_to_graph(&self, screen: Point) -> Point {
        Point::new(screen.x / self.scale - self.translate.x, screen.y / self.scale - self.translate.y)
    }

    /// Convert a graph-space point to screen coordinates.
    #[must_use]
    pub fn graph_to_screen(&self, graph: Point) -> Point {
        Point::new((graph.x + self.translate.x) * self.scale, (graph.y + self.translate.y) * self.scale)
    }

    /// Convert a graph-space rectangle to screen coordinates.
    #[must_use]
    pub fn rect_to_screen(&self, r: Rect) -> Rect {
        let origin = self.graph_to_screen(Point::new(r.x, r.y));
        Rect::new(origin.x, origin.y, r.width * self.scale, r.height * self.scale)
    }

    /// Convert a screen-space rectangle to graph coordinates.
    #[must_use]
    pub fn rect_to_graph(&self, r: Rect) -> Rect {
        let origin = self.screen_to_graph(Point::new(r.x, r.y));
        Rect::new(origin.x, origin.y, r.width / self.scale, r.height / self.scale)
    }

    /// Convert a screen-space distance to graph units.
    #[must_use]
    pub fn screen_dist_to_graph(&self, screen_dist: f64) -> f64 {
        screen_dist / self.scale
    }
}

/// Screen-space projection of one cell.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub cell: CellId,
    /// Unrotated absolute bounds.
    pub bounds: Rect,
    /// Clockwise rotation in degrees around the bounds center.
    pub rotation: f64,
    /// Outer bounds after rotation.
    pub bounding_box: Rect,
    /// Absolute points for edges, source first. Empty for vertices.
    pub absolute_points: Vec<Point>,
    /// Cell style merged over the stylesheet defaults.
    pub style: Style,
}

impl ViewState {
    #[must_use]
    pub fn center(&self) -> Point {
        self.bounds.center()
    }

    #[must_use]
    pub fn is_edge(&self) -> bool {
        !self.absolute_points.is_empty()
    }

    /// First and last visible points of an edge.
    #[must_use]
    pub fn end_points(&self) -> Option<(Point, Point)> {
        Some((*self.absolute_points.first()?, *self.absolute_points.last()?))
    }

    /// Point halfway along the edge's visible path, or the center of a vertex.
    #[must_use]
    pub fn midpoint(&self) -> Point {
        let pts = &self.absolute_points;
        if pts.len() < 2 {
            return self.center();
        }
        let total: f64 = pts.windows(2).map(|w| w[0].distance(w[1])).sum();
        let mut remaining = total / 2.0;
        for w in pts.windows(2) {
            let len = w[0].distance(w[1]);
            if len >= remaining && len > 0.0 {
                let t = remaining / len;
                return Point::new(w[0].x + (w[1].x - w[0].x) * t, w[0].y + (w[1].y - w[0].y) * t);
            }
            remaining -= len;
        }
        self.center()
    }

    /// Whether `p` hits this state: inside the rotated shape, or within
    /// `tolerance` of an edge's path.
    #[must_use]
    pub fn hits(&self, p: Point, tolerance: f64) -> bool {
        if self.is_edge() {
            let tol_sq = tolerance * tolerance;
            return self
                .absolute_points
                .windows(2)
                .any(|w| nearest_on_segment(p, w[0], w[1]).1 <= tol_sq);
        }
        let local = p.rotate_around(self.center(), -self.rotation);
        self.bounds.contains(local)
    }
}

/// Read-only view capability consumed by the gesture controllers.
pub trait View: ModelRead {
    /// Projection of `cell`, or `None` for missing, invisible, or structural cells.
    fn state_for(&self, cell: CellId) -> Option<ViewState>;

    /// Topmost cell under the screen point `p` for which `accept` holds.
    fn cell_at_filtered(&self, p: Point, accept: &dyn Fn(CellId) -> bool) -> Option<CellId>;

    fn scale(&self) -> f64;

    fn translate(&self) -> Point;

    /// Hit slop in screen pixels.
    fn tolerance(&self) -> f64;

    /// `style` layered over the stylesheet defaults and its named entries.
    fn resolve_style(&self, style: &Style, is_edge: bool) -> Style;

    /// Resolved style of `cell`, visible or not.
    fn resolved_style(&self, cell: CellId) -> Option<Style> {
        self.cell(cell).map(|c| self.resolve_style(&c.style, c.is_edge()))
    }

    /// Topmost cell under the screen point `p`.
    fn cell_at(&self, p: Point) -> Option<CellId> {
        self.cell_at_filtered(p, &|_| true)
    }

    fn transform(&self) -> ViewTransform {
        ViewTransform { scale: self.scale(), translate: self.translate() }
    }

    /// Union of all cell bounding boxes in screen space. Empty documents
    /// yield a zero rectangle at the origin.
    fn graph_bounds(&self) -> Rect {
        self.cells_in_order()
            .into_iter()
            .filter_map(|id| self.state_for(id))
            .map(|s| s.bounding_box)
            .reduce(|a, b| a.union(&b))
            .unwrap_or_default()
    }
}

/// [`View`] over any [`ModelRead`] store.
pub struct GraphView<'a, M: ModelRead = DocStore> {
    model: &'a M,
    transform: ViewTransform,
    stylesheet: &'a Stylesheet,
    tolerance: f64,
}

impl<'a, M: ModelRead> GraphView<'a, M> {
    #[must_use]
    pub fn new(model: &'a M, transform: ViewTransform, stylesheet: &'a Stylesheet) -> Self {
        Self { model, transform, stylesheet, tolerance: GRAPH_TOLERANCE_PX }
    }

    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Graph-space origin that a child of `parent` is positioned against.
    fn origin_of(&self, parent: Option<CellId>) -> Point {
        let mut origin = Point::default();
        let mut current = parent;
        while let Some(id) = current {
            if self.model.is_layer_or_root(id) || !self.model.is_vertex(id) {
                break;
            }
            if let Some(geo) = self.model.geometry(id) {
                origin = origin.offset(geo.x, geo.y);
            }
            current = self.model.parent(id);
        }
        origin
    }

    /// Absolute graph-space bounds of a vertex.
    fn vertex_graph_bounds(&self, id: CellId) -> Option<Rect> {
        let cell = self.model.cell(id)?;
        let geo = cell.geometry.as_ref()?;
        if geo.relative {
            let parent = cell.parent?;
            let parent_bounds = self.vertex_graph_bounds(parent)?;
            let offset = geo.offset.unwrap_or_default();
            let x = parent_bounds.x + parent_bounds.width * geo.x + offset.x;
            let y = parent_bounds.y + parent_bounds.height * geo.y + offset.y;
            return Some(Rect::new(x, y, geo.width, geo.height));
        }
        let origin = self.origin_of(cell.parent);
        Some(Rect::new(origin.x + geo.x, origin.y + geo.y, geo.width, geo.height))
    }

    /// Where an edge leaves or enters a terminal vertex, heading towards `toward`.
    fn perimeter_point(&self, terminal: CellId, toward: Point) -> Option<Point> {
        let bounds = self.transform.rect_to_screen(self.vertex_graph_bounds(terminal)?);
        let style = self.stylesheet.resolve(self.model.style(terminal)?, false);
        let c = bounds.center();
        let (dx, dy) = (toward.x - c.x, toward.y - c.y);
        if dx == 0.0 && dy == 0.0 {
            return Some(c);
        }
        let hw = bounds.width / 2.0;
        let hh = bounds.height / 2.0;
        let t = if style.get(StyleKey::Shape) == Some("ellipse") {
            1.0 / ((dx / hw).powi(2) + (dy / hh).powi(2)).sqrt()
        } else {
            let tx = if dx == 0.0 { f64::INFINITY } else { hw / dx.abs() };
            let ty = if dy == 0.0 { f64::INFINITY } else { hh / dy.abs() };
            tx.min(ty)
        };
        Some(Point::new(c.x + dx * t, c.y + dy * t))
    }

    /// Screen-space points of an edge: terminal ends projected onto their
    /// vertices' perimeters, dangling ends taken from the geometry.
    fn edge_points(&self, id: CellId) -> Option<Vec<Point>> {
        let cell = self.model.cell(id)?;
        let geo = cell.geometry.clone().unwrap_or_default();
        let origin = self.origin_of(cell.parent);
        let to_screen = |p: Point| self.transform.graph_to_screen(p.offset(origin.x, origin.y));

        let terminal_center = |end: EdgeEnd| -> Option<Point> {
            let t = self.model.terminal(id, end)?;
            self.model.is_vertex(t).then_some(())?;
            Some(self.transform.rect_to_screen(self.vertex_graph_bounds(t)?).center())
        };
        let free_point = |end: EdgeEnd| geo.terminal_point(end).map(to_screen);

        let waypoints: Vec<Point> = geo.points.iter().copied().map(to_screen).collect();
        let source_anchor = terminal_center(EdgeEnd::Source).or_else(|| free_point(EdgeEnd::Source))?;
        let target_anchor = terminal_center(EdgeEnd::Target).or_else(|| free_point(EdgeEnd::Target))?;

        let source = match self.model.terminal(id, EdgeEnd::Source).filter(|t| self.model.is_vertex(*t)) {
            Some(t) => {
                let toward = waypoints.first().copied().unwrap_or(target_anchor);
                self.perimeter_point(t, toward)?
            }
            None => source_anchor,
        };
        let target = match self.model.terminal(id, EdgeEnd::Target).filter(|t| self.model.is_vertex(*t)) {
            Some(t) => {
                let toward = waypoints.last().copied().unwrap_or(source_anchor);
                self.perimeter_point(t, toward)?
            }
            None => target_anchor,
        };

        let mut pts = Vec::with_capacity(waypoints.len() + 2);
        pts.push(source);
        pts.extend(waypoints);
        pts.push(target);
        Some(pts)
    }
}

impl<M: ModelRead> ModelRead for GraphView<'_, M> {
    fn cell(&self, id: CellId) -> Option<&crate::model::Cell> {
        self.model.cell(id)
    }

    fn root(&self) -> CellId {
        self.model.root()
    }

    fn default_parent(&self) -> CellId {
        self.model.default_parent()
    }
}

impl<M: ModelRead> View for GraphView<'_, M> {
    fn state_for(&self, id: CellId) -> Option<ViewState> {
        let cell = self.model.cell(id)?;
        if self.model.is_layer_or_root(id) {
            return None;
        }
        let style = self.resolve_style(&cell.style, cell.is_edge());
        if cell.is_edge() {
            let absolute_points = self.edge_points(id)?;
            let bounds = Rect::from_points(&absolute_points)?;
            return Some(ViewState { cell: id, bounds, rotation: 0.0, bounding_box: bounds, absolute_points, style });
        }
        let bounds = self.transform.rect_to_screen(self.vertex_graph_bounds(id)?);
        let rotation = style.number(StyleKey::Rotation).unwrap_or(0.0);
        Some(ViewState {
            cell: id,
            bounds,
            rotation,
            bounding_box: bounds.rotated_bounds(rotation),
            absolute_points: Vec::new(),
            style,
        })
    }

    fn cell_at_filtered(&self, p: Point, accept: &dyn Fn(CellId) -> bool) -> Option<CellId> {
        self.model
            .cells_in_order()
            .into_iter()
            .rev()
            .filter(|id| !self.model.is_layer_or_root(*id) && accept(*id))
            .find(|id| self.state_for(*id).is_some_and(|s| s.hits(p, self.tolerance)))
    }

    fn scale(&self) -> f64 {
        self.transform.scale
    }

    fn translate(&self) -> Point {
        self.transform.translate
    }

    fn tolerance(&self) -> f64 {
        self.tolerance
    }

    fn resolve_style(&self, style: &Style, is_edge: bool) -> Style {
        self.stylesheet.resolve(style, is_edge)
    }
}
