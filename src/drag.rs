//! Drag-connect gesture: an insertable payload dragged across the canvas.
//!
//! Every pointer move runs the same pipeline:
//!
//! 1. resolve the drop target under the pointer (Alt suppresses it);
//! 2. update the dwell on that target;
//! 3. keep the current target while the pointer is inside its affordance
//!    box, otherwise switch and tear down every transient visual;
//! 4. show the style-replace badge, the directional arrows, or the edge
//!    endpoint markers once their dwell thresholds pass;
//! 5. pick exactly one intent, in priority order: style replace,
//!    directional connect, endpoint reassignment, edge split, plain drop;
//! 6. build the commit plan for that intent and derive the preview from it.
//!
//! A `DropTarget` timer is armed for the next threshold still ahead so the
//! affordances appear without further movement.

#[cfg(test)]
#[path = "drag_test.rs"]
mod drag_test;

use tracing::debug;

use crate::config::DragConfig;
use crate::consts::{HOVER_BBOX_MARGIN_PX, TIMER_SLACK_MS};
use crate::geom::{Direction, Point, Rect, nearest_segment};
use crate::hit;
use crate::input::{GestureEnv, GestureState, Modifiers};
use crate::model::{Cell, CellId, EdgeEnd, ModelRead, clone_cells, duplicate_subtree};
use crate::ops::{self, CommitPlan, Placement};
use crate::overlay::{Affordance, AffordanceVisual, Overlay, Preview};
use crate::schedule::{Scheduler, TimerPurpose};
use crate::selection::{HandlesHidden, Selection};
use crate::solver;
use crate::style::StyleKey;
use crate::view::View;

// =============================================================
// Payload
// =============================================================

/// Cells carried by a drag, in payload coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct DragPayload {
    pub cells: Vec<Cell>,
    /// Existing cells the payload was copied from. Targets on their ancestor
    /// chain or inside them are rejected.
    pub origins: Vec<CellId>,
}

impl DragPayload {
    /// Payload from palette cells. The cells are copied with fresh ids so the
    /// same palette entry can be dropped repeatedly.
    #[must_use]
    pub fn from_cells(cells: &[Cell]) -> Self {
        Self { cells: clone_cells(cells), origins: Vec::new() }
    }

    /// Payload copied from live cells of `model`.
    #[must_use]
    pub fn copy_of<M: ModelRead + ?Sized>(model: &M, ids: &[CellId]) -> Self {
        let cells = ids.iter().flat_map(|id| duplicate_subtree(model, *id)).collect();
        Self { cells, origins: ids.to_vec() }
    }

    #[must_use]
    pub fn bounds(&self) -> Option<Rect> {
        solver::payload_bounds(&self.cells)
    }

    /// The only top-level cell, if there is exactly one.
    #[must_use]
    pub fn single(&self) -> Option<&Cell> {
        match solver::top_level(&self.cells).as_slice() {
            [only] => Some(*only),
            _ => None,
        }
    }

    /// Vertex-only payload with at least one connectable vertex, judged on
    /// styles resolved through `view`.
    #[must_use]
    pub fn is_splittable<V: View + ?Sized>(&self, view: &V) -> bool {
        !self.cells.iter().any(Cell::is_edge)
            && self.cells.iter().any(|c| {
                let style = view.resolve_style(&c.style, false);
                style.flag(StyleKey::Connectable, true) && !style.flag(StyleKey::Locked, false)
            })
    }
}

// =============================================================
// Session
// =============================================================

/// The outcome the drag would commit if released now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Drop { target: Option<CellId> },
    Connect { source: CellId, direction: Direction },
    Reconnect { edge: CellId, end: EdgeEnd },
    Split { edge: CellId },
    ReplaceStyle { target: CellId },
}

#[derive(Debug)]
pub struct DragSession {
    payload: DragPayload,
    config: DragConfig,
    /// Graph hit slop in screen pixels.
    tolerance: f64,
    gesture: GestureState,
    /// Directional or endpoint affordances of the current target, placed when
    /// they first appeared.
    connect_rects: Vec<(Affordance, Rect)>,
    affordance_box: Option<Rect>,
    handles_hidden: Option<HandlesHidden>,
    intent: Intent,
    overlay: Overlay,
    last_pointer: Point,
}

impl DragSession {
    #[must_use]
    pub fn new(payload: DragPayload, config: DragConfig, tolerance: f64) -> Self {
        Self {
            payload,
            config,
            tolerance,
            gesture: GestureState::new(),
            connect_rects: Vec::new(),
            affordance_box: None,
            handles_hidden: None,
            intent: Intent::Drop { target: None },
            overlay: Overlay::default(),
            last_pointer: Point::default(),
        }
    }

    #[must_use]
    pub fn payload(&self) -> &DragPayload {
        &self.payload
    }

    #[must_use]
    pub fn intent(&self) -> Intent {
        self.intent
    }

    #[must_use]
    pub fn current_target(&self) -> Option<CellId> {
        self.gesture.current_target
    }

    #[must_use]
    pub fn active_affordance(&self) -> Option<Affordance> {
        self.gesture.active_affordance
    }

    #[must_use]
    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    #[must_use]
    pub fn hides_handles(&self) -> bool {
        self.handles_hidden.is_some()
    }

    #[must_use]
    pub fn last_pointer(&self) -> Point {
        self.last_pointer
    }

    /// Evaluate the pointer at the screen point `p`.
    pub fn drag_over<V: View + ?Sized>(
        &mut self,
        env: &GestureEnv<'_, V>,
        scheduler: &mut Scheduler,
        now_ms: u64,
        p: Point,
        modifiers: Modifiers,
    ) {
        let view = env.view;
        self.last_pointer = p;
        let hit = if modifiers.alt { None } else { hit::resolve_drop_target(view, p, &self.payload.origins) };
        let time_on_target = self.gesture.observe(hit, now_ms);

        let inside = self.affordance_box.is_some_and(|b| b.contains(p));
        if self.gesture.current_target != hit && !inside {
            self.retarget(hit);
        }
        let target = self.gesture.current_target;
        let dwelling = target.is_some() && hit == target;

        let mut visuals = Vec::new();
        let mut active = None;
        let mut badge = None;

        if let Some(t) = target.filter(|_| dwelling) {
            badge = self.style_badge(view, t, time_on_target, modifiers);
            if badge.is_some_and(|b| b.contains(p)) {
                active = Some(Affordance::StyleReplace);
            }
            if self.connect_rects.is_empty()
                && time_on_target > self.config.drop_target_delay_ms
                && self.accepts_connect(view, t)
            {
                self.show_connect_affordances(env, t);
            }
        }

        let rects = self.connect_rects.clone();
        for (affordance, rect) in rects {
            let on = active.is_none() && rect.contains(p);
            if on {
                active = Some(affordance);
            }
            visuals.push(self.visual(affordance, rect, on));
        }

        // A long hold anywhere on the target replaces its style unless an arrow has the pointer.
        if let Some(rect) = badge {
            if active.is_none() && time_on_target > self.config.style_replace_delay_ms {
                active = Some(Affordance::StyleReplace);
            }
            visuals.insert(0, self.visual(Affordance::StyleReplace, rect, active == Some(Affordance::StyleReplace)));
        }
        if active != self.gesture.active_affordance {
            debug!(?active, "drag: active affordance changed");
        }
        self.gesture.active_affordance = active;

        self.intent = match (active, target) {
            (Some(Affordance::StyleReplace), Some(t)) => Intent::ReplaceStyle { target: t },
            (Some(Affordance::Arrow(direction)), Some(t)) => Intent::Connect { source: t, direction },
            (Some(Affordance::Endpoint(end)), Some(t)) => Intent::Reconnect { edge: t, end },
            _ => match hit {
                Some(h) if view.is_edge(h) && !modifiers.shift && self.payload.is_splittable(view) => Intent::Split { edge: h },
                _ => Intent::Drop { target: hit },
            },
        };

        let preview = self.plan(env).map(|plan| preview_of(view, &plan)).unwrap_or_default();
        let highlight = target.and_then(|t| view.state_for(t)).map(|s| s.bounding_box);
        self.overlay = Overlay { affordances: visuals, preview, highlight };

        self.arm_timer(scheduler, now_ms, hit, time_on_target);
    }

    /// Re-run the last evaluation after the dwell timer fired.
    pub fn timer_fired<V: View + ?Sized>(
        &mut self,
        env: &GestureEnv<'_, V>,
        scheduler: &mut Scheduler,
        now_ms: u64,
        modifiers: Modifiers,
    ) {
        let p = self.last_pointer;
        self.drag_over(env, scheduler, now_ms, p, modifiers);
    }

    /// Release at `p`. Returns the plan to commit, or `None` when the release
    /// happened outside `viewport` (screen space).
    #[must_use]
    pub fn finish<V: View + ?Sized>(
        self,
        env: &GestureEnv<'_, V>,
        scheduler: &mut Scheduler,
        p: Point,
        viewport: Option<Rect>,
    ) -> Option<CommitPlan> {
        scheduler.cancel_purpose(TimerPurpose::DropTarget);
        if viewport.is_some_and(|v| !v.contains(p)) {
            debug!(x = p.x, y = p.y, "drag: released outside the view");
            return None;
        }
        debug!(intent = ?self.intent, "drag: released");
        self.plan(env)
    }

    /// Abort without committing.
    pub fn cancel(self, scheduler: &mut Scheduler) {
        scheduler.cancel_purpose(TimerPurpose::DropTarget);
        debug!("drag: cancelled");
    }

    // =============================================================
    // Affordances
    // =============================================================

    /// Switch to `target`, dropping every visual of the previous one.
    fn retarget(&mut self, target: Option<CellId>) {
        debug!(?target, previous = ?self.gesture.current_target, "drag: target changed");
        self.gesture.current_target = target;
        self.gesture.active_affordance = None;
        self.connect_rects.clear();
        self.affordance_box = None;
        self.handles_hidden = None;
    }

    fn visual(&self, affordance: Affordance, bounds: Rect, active: bool) -> AffordanceVisual {
        let opacity = if active { 100 } else { self.config.inactive_opacity };
        AffordanceVisual { affordance, bounds, opacity }
    }

    /// Whether directional arrows (vertex target) or endpoint markers (edge
    /// target) are offered for `target`.
    fn accepts_connect<V: View + ?Sized>(&self, view: &V, target: CellId) -> bool {
        let Some(first) = self.payload.cells.get(solver::drop_cell_index(&self.payload.cells)) else {
            return false;
        };
        if first.is_vertex() && !view.resolve_style(&first.style, false).flag(StyleKey::Connectable, true) {
            return false;
        }
        if view.is_edge(target) {
            return first.is_vertex();
        }
        hit::is_connectable(view, target)
    }

    /// Place the arrows or endpoint markers for `target` and hide its
    /// selection handles while they are up.
    fn show_connect_affordances<V: View + ?Sized>(&mut self, env: &GestureEnv<'_, V>, target: CellId) {
        let Some(state) = env.view.state_for(target) else {
            return;
        };
        let rects: Vec<(Affordance, Rect)> = if state.is_edge() {
            let Some((start, end)) = state.end_points() else {
                return;
            };
            let d = 2.0 * self.config.endpoint_radius;
            vec![
                (Affordance::Endpoint(EdgeEnd::Source), Rect::centered(start, d, d)),
                (Affordance::Endpoint(EdgeEnd::Target), Rect::centered(end, d, d)),
            ]
        } else {
            // Chrome is measured before the handles are hidden.
            let chrome = env.selection.chrome_for(&state, self.tolerance);
            let bds = hit::decorated_bounds(&state, chrome.as_ref(), self.tolerance, 0.0);
            let center = state.center();
            Direction::ALL
                .into_iter()
                .filter(|d| hit::direction_allowed(&state, *d))
                .map(|d| {
                    let rect = hit::arrow_bounds(bds, center, d, self.config.arrow_length, self.config.arrow_depth);
                    (Affordance::Arrow(d), rect)
                })
                .collect()
        };
        let area = rects.iter().fold(state.bounding_box, |acc, (_, r)| acc.union(r));
        self.affordance_box = Some(area.grow(HOVER_BBOX_MARGIN_PX));
        self.connect_rects = rects;
        if !state.is_edge() && env.selection.is_selected(target) {
            self.handles_hidden = Some(env.selection.handles().hide());
        }
        debug!(%target, count = self.connect_rects.len(), "drag: connect affordances shown");
    }

    /// Badge bounds if style replace is offered for `target` right now.
    fn style_badge<V: View + ?Sized>(&self, view: &V, target: CellId, time_on_target: u64, modifiers: Modifiers) -> Option<Rect> {
        if !self.config.style_replace_enabled || modifiers.shift || hit::is_valid_drop_container(view, target) {
            return None;
        }
        let cell = self.payload.single()?;
        if cell.is_edge() != view.is_edge(target) {
            return None;
        }
        let state = view.state_for(target)?;
        let same_family = cell.style.shape_family() == state.style.shape_family();
        let no_stroke = state.style.get(StyleKey::StrokeColor).is_none_or(|v| v == "none");
        let due = time_on_target > self.config.style_replace_delay_ms || same_family || no_stroke || state.is_edge();
        if !due {
            return None;
        }
        let at = if state.is_edge() { state.midpoint() } else { state.center() };
        Some(Rect::centered(at, self.config.badge_size, self.config.badge_size))
    }

    /// Arm the dwell timer for the next threshold still ahead on `hit`.
    fn arm_timer(&self, scheduler: &mut Scheduler, now_ms: u64, hit: Option<CellId>, time_on_target: u64) {
        scheduler.cancel_purpose(TimerPurpose::DropTarget);
        if hit.is_none() {
            return;
        }
        let next = [self.config.drop_target_delay_ms, self.config.style_replace_delay_ms]
            .into_iter()
            .filter(|d| *d >= time_on_target)
            .min();
        if let Some(delay) = next {
            scheduler.after(now_ms, delay - time_on_target + TIMER_SLACK_MS, TimerPurpose::DropTarget);
        }
    }

    // =============================================================
    // Planning
    // =============================================================

    /// Plan for the current intent. Targets that vanished since the last
    /// evaluation fall back to the free insertion point.
    fn plan<V: View + ?Sized>(&self, env: &GestureEnv<'_, V>) -> Option<CommitPlan> {
        let view = env.view;
        let payload = self.payload.cells.clone();
        let pointer = view.transform().screen_to_graph(self.last_pointer);
        let plan = match self.intent {
            Intent::ReplaceStyle { target } => {
                let cell = self.payload.single()?;
                let selected = env.selection.current();
                let cells = if selected.contains(&target) { selected.to_vec() } else { vec![target] };
                if !view.contains(target) {
                    return Some(ops::plan_free_insert(view, payload, env.solver));
                }
                CommitPlan::ReplaceStyle {
                    style: cell.style.clone(),
                    kind: cell.kind,
                    cells,
                    keep_appearance: self.config.keep_target_appearance,
                }
            }
            Intent::Connect { source, direction } => ops::plan_connect(env, source, direction, payload),
            Intent::Reconnect { edge, end } => ops::plan_connect(env, edge, solver::end_direction(end), payload),
            Intent::Split { edge } => {
                let Some(state) = view.state_for(edge) else {
                    return Some(ops::plan_free_insert(view, payload, env.solver));
                };
                let split_index = nearest_segment(&state.absolute_points, self.last_pointer).map_or(0, |(i, _)| i);
                CommitPlan::SplitEdge {
                    edge,
                    payload,
                    center: pointer,
                    split_index,
                    placement: Placement::beside(view, edge),
                }
            }
            Intent::Drop { target } => {
                let parent = hit::drop_parent(view, target.filter(|t| view.contains(*t)));
                CommitPlan::Insert {
                    payload,
                    origin: solver::drop_origin(pointer, env.solver),
                    placement: Placement::under(view, parent),
                }
            }
        };
        Some(plan)
    }
}

/// Screen-space preview of what `plan` would change.
fn preview_of<V: View + ?Sized>(view: &V, plan: &CommitPlan) -> Preview {
    let t = view.transform();
    match plan {
        CommitPlan::Insert { payload, origin, .. } => Preview {
            bounds: solver::payload_bounds(payload).map(|b| t.rect_to_screen(Rect::new(origin.x, origin.y, b.width, b.height))),
            connector: None,
        },
        CommitPlan::Connect { source, payload, geometry, .. } => {
            let drop_is_edge = payload.get(solver::drop_cell_index(payload)).is_some_and(Cell::is_edge);
            let extent = if drop_is_edge {
                let mut pts = geometry.points.clone();
                pts.extend(geometry.source_point);
                pts.extend(geometry.target_point);
                Rect::from_points(&pts)
            } else {
                Some(geometry.bounds())
            };
            let bounds = extent.map(|b| t.rect_to_screen(b));
            let from = view.state_for(*source).map(|s| if s.is_edge() { s.midpoint() } else { s.center() });
            let connector = from.zip(bounds.map(|b| b.center()));
            Preview { bounds, connector }
        }
        CommitPlan::SplitEdge { payload, center, .. } => Preview {
            bounds: solver::payload_bounds(payload).map(|b| t.rect_to_screen(Rect::centered(*center, b.width, b.height))),
            connector: None,
        },
        CommitPlan::ReplaceStyle { cells, .. } => Preview {
            bounds: cells.iter().filter_map(|c| view.state_for(*c)).map(|s| s.bounding_box).reduce(|a, b| a.union(&b)),
            connector: None,
        },
        CommitPlan::ConnectExisting { .. } => Preview::default(),
    }
}
