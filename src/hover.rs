//! Hover arrows: four directional affordances and a drag handle around an
//! idle, connectable vertex.
//!
//! `HoverIcons` is driven by pointer moves and by its `HoverUpdate` timer.
//! Showing arrows for a new target is gated twice:
//!
//! - the **update delay** must pass on the same target (the timer re-runs the
//!   update without pointer movement), or the pointer must leave the current
//!   affordance box;
//! - a target change within the **activation delay** of the last change keeps
//!   the current arrows while the pointer is still inside their box.
//!
//! Pressing an arrow and releasing without moving is a click: it connects to
//! an existing neighbour in that direction or to a fresh clone of the target.
//! Pressing and dragging turns into a [`ConnectDrag`].

#[cfg(test)]
#[path = "hover_test.rs"]
mod hover_test;

use tracing::debug;

use crate::config::HoverConfig;
use crate::consts::{HOVER_BBOX_MARGIN_PX, TIMER_SLACK_MS};
use crate::geom::{Direction, Point, Rect};
use crate::hit;
use crate::input::{GestureEnv, GestureState};
use crate::model::{CellId, duplicate_subtree};
use crate::ops::{CommitPlan, Placement};
use crate::overlay::{Affordance, AffordanceVisual, Overlay, Preview};
use crate::schedule::{Scheduler, TimerPurpose};
use crate::solver;
use crate::view::{View, ViewState};

#[derive(Debug)]
pub struct HoverIcons {
    config: HoverConfig,
    /// Graph hit slop in screen pixels.
    tolerance: f64,
    state: GestureState,
    affordances: Vec<AffordanceVisual>,
    /// Union of the decorated target and its affordances, plus a margin.
    bbox: Option<Rect>,
    /// Target and pointer captured when the update timer was armed.
    pending: Option<(CellId, Point)>,
    mouse_down: Option<Point>,
}

impl HoverIcons {
    #[must_use]
    pub fn new(config: HoverConfig, tolerance: f64) -> Self {
        Self {
            config,
            tolerance,
            state: GestureState::new(),
            affordances: Vec::new(),
            bbox: None,
            pending: None,
            mouse_down: None,
        }
    }

    /// Vertex the arrows are shown for.
    #[must_use]
    pub fn current(&self) -> Option<CellId> {
        self.state.current_target
    }

    /// Whether an affordance is pressed.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.mouse_down.is_some()
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        !self.affordances.is_empty()
    }

    #[must_use]
    pub fn affordances(&self) -> &[AffordanceVisual] {
        &self.affordances
    }

    #[must_use]
    pub fn bbox(&self) -> Option<Rect> {
        self.bbox
    }

    #[must_use]
    pub fn active_affordance(&self) -> Option<Affordance> {
        self.state.active_affordance
    }

    /// Visible affordance containing the screen point `p`.
    #[must_use]
    pub fn affordance_at(&self, p: Point) -> Option<Affordance> {
        self.affordances
            .iter()
            .find(|a| a.bounds.grow(self.config.tolerance).contains(p))
            .map(|a| a.affordance)
    }

    #[must_use]
    pub fn overlay(&self) -> Overlay {
        Overlay { affordances: self.affordances.clone(), preview: Preview::default(), highlight: None }
    }

    // =============================================================
    // Pointer and timer input
    // =============================================================

    /// Feed one pointer move. `cell` is the raw cell under the pointer.
    pub fn pointer_moved<V: View + ?Sized>(
        &mut self,
        env: &GestureEnv<'_, V>,
        scheduler: &mut Scheduler,
        now_ms: u64,
        cell: Option<CellId>,
        p: Point,
    ) {
        if self.is_active() {
            return;
        }
        let target = hit::hover_target(env.view, cell);
        self.update(env, scheduler, now_ms, target, p);
        self.state.active_affordance = self.affordance_at(p);
    }

    /// The update timer fired: re-run the update for the captured target as
    /// if the pointer had stayed put.
    pub fn timer_fired<V: View + ?Sized>(&mut self, env: &GestureEnv<'_, V>, scheduler: &mut Scheduler, now_ms: u64) {
        let Some((target, p)) = self.pending.take() else {
            return;
        };
        if self.is_active() {
            return;
        }
        self.state.last_target = Some(target);
        self.update(env, scheduler, now_ms, Some(target), p);
    }

    fn update<V: View + ?Sized>(
        &mut self,
        env: &GestureEnv<'_, V>,
        scheduler: &mut Scheduler,
        now_ms: u64,
        target: Option<CellId>,
        p: Point,
    ) {
        let time_on_target = if self.state.last_target != target || self.is_active() {
            self.state.restart(target, now_ms);
            scheduler.cancel_purpose(TimerPurpose::HoverUpdate);
            self.pending = None;
            if let Some(t) = target {
                scheduler.after(now_ms, self.config.update_delay_ms + TIMER_SLACK_MS, TimerPurpose::HoverUpdate);
                self.pending = Some((t, p));
            }
            0
        } else {
            self.state.time_on_target(now_ms)
        };

        let current = self.state.current_target;
        let inside = self.bbox.is_some_and(|b| b.contains(p));
        if current.is_some()
            && current != target
            && time_on_target < self.config.activation_delay_ms
            && self.bbox.is_some()
            && !inside
        {
            self.reset(scheduler, false);
        } else if (current.is_some() || time_on_target > self.config.activation_delay_ms) && current != target {
            match target {
                Some(t) if time_on_target > self.config.update_delay_ms => {
                    debug!(target = %t, time_on_target, "hover: target shown");
                    self.state.current_target = Some(t);
                    self.repaint(env);
                }
                // New target not yet due: hide the old arrows and leave the update timer armed.
                Some(_) if self.bbox.is_some() && !inside => self.reset(scheduler, false),
                Some(_) => {}
                None if self.bbox.is_none() || !inside => self.reset(scheduler, true),
                None => {}
            }
        }
    }

    /// Remove every affordance and forget the target. With `clear_timer` the
    /// pending update is cancelled too.
    pub fn reset(&mut self, scheduler: &mut Scheduler, clear_timer: bool) {
        if clear_timer {
            scheduler.cancel_purpose(TimerPurpose::HoverUpdate);
            self.pending = None;
        }
        self.mouse_down = None;
        self.state.current_target = None;
        self.state.active_affordance = None;
        self.affordances.clear();
        self.bbox = None;
    }

    /// Reset and discard the dwell record. Used when a competing gesture
    /// starts or on escape.
    pub fn cancel(&mut self, scheduler: &mut Scheduler) {
        self.reset(scheduler, true);
        self.state = GestureState::new();
    }

    // =============================================================
    // Layout
    // =============================================================

    /// Recompute the affordances for the current target. A target that is
    /// gone or no longer connectable resets the controller.
    pub fn repaint<V: View + ?Sized>(&mut self, env: &GestureEnv<'_, V>) {
        let Some(current) = self.state.current_target else {
            return;
        };
        let view = env.view;
        let Some(state) = view.state_for(current).filter(|_| hit::is_connectable(view, current)) else {
            debug!(target = %current, "hover: target gone");
            self.state.current_target = None;
            self.state.active_affordance = None;
            self.affordances.clear();
            self.bbox = None;
            return;
        };
        let cfg = &self.config;
        let chrome = env.selection.chrome_for(&state, self.tolerance);
        let bds = hit::decorated_bounds(&state, chrome.as_ref(), self.tolerance, cfg.arrow_spacing);
        let center = state.center();

        let neighbours: Vec<Option<CellId>> = Direction::ALL
            .iter()
            .map(|d| {
                if cfg.check_collisions {
                    view.cell_at(hit::collision_probe(bds, center, *d, cfg.arrow_depth))
                } else {
                    None
                }
            })
            .collect();
        // One cell under all four probes is a background shape, not a neighbour.
        let surrounded = neighbours.first().is_some_and(|first| first.is_some() && neighbours.iter().all(|n| n == first));

        let mut affordances = Vec::with_capacity(5);
        for (dir, neighbour) in Direction::ALL.into_iter().zip(&neighbours) {
            if !hit::direction_allowed(&state, dir) {
                continue;
            }
            if !surrounded && neighbour.is_some_and(|n| self.blocks(view, &state, n)) {
                continue;
            }
            affordances.push(AffordanceVisual {
                affordance: Affordance::Arrow(dir),
                bounds: hit::arrow_bounds(bds, center, dir, cfg.arrow_length, cfg.arrow_depth),
                opacity: 100,
            });
        }
        affordances.push(AffordanceVisual {
            affordance: Affordance::DragHandle,
            bounds: Rect::centered(Point::new(bds.right(), bds.y), cfg.drag_handle_size, cfg.drag_handle_size),
            opacity: 100,
        });

        let bbox = affordances.iter().fold(bds, |acc, a| acc.union(&a.bounds));
        self.bbox = Some(bbox.grow(HOVER_BBOX_MARGIN_PX));
        self.affordances = affordances;
    }

    /// Whether `neighbour` hides the arrow pointing at it: anything but an
    /// ancestor, a swimlane, or a vertex much larger than the target.
    fn blocks<V: View + ?Sized>(&self, view: &V, state: &ViewState, neighbour: CellId) -> bool {
        if view.is_ancestor(neighbour, state.cell) || hit::is_swimlane(view, neighbour) {
            return false;
        }
        if !view.is_vertex(neighbour) {
            return true;
        }
        let ratio = self.config.collision_size_ratio;
        view.state_for(neighbour).is_none_or(|n| {
            n.bounds.width < ratio * state.bounds.width && n.bounds.height < ratio * state.bounds.height
        })
    }

    // =============================================================
    // Press and click
    // =============================================================

    /// Press at `p`. Returns the affordance hit, which makes the controller
    /// active until [`HoverIcons::release`].
    pub fn press(&mut self, p: Point) -> Option<Affordance> {
        let affordance = self.affordance_at(p)?;
        self.mouse_down = Some(p);
        self.state.active_affordance = Some(affordance);
        Some(affordance)
    }

    /// End a press without committing anything.
    pub fn release(&mut self) {
        self.mouse_down = None;
    }

    /// Plan for a click on the arrow for `direction`: connect to an existing
    /// neighbour in that direction, or to a clone of the target placed
    /// `default_edge_length` away.
    #[must_use]
    pub fn click<V: View + ?Sized>(&self, env: &GestureEnv<'_, V>, direction: Direction) -> Option<CommitPlan> {
        let source = self.current()?;
        let view = env.view;
        let edge_style = env.cascade.create_current_edge_style();
        if let Some(target) = solver::find_neighbour(view, source, direction, env.solver) {
            debug!(%source, %target, ?direction, "hover: click connects existing neighbour");
            return Some(CommitPlan::ConnectExisting { source, target, edge_style });
        }
        let bounds = solver::graph_bounds_of(view, source)?;
        let mut payload = duplicate_subtree(view, source);
        let geo = payload.first_mut()?.geometry.as_mut()?;
        let placed = solver::compute_clone_geometry(bounds, geo.width, geo.height, direction, env.solver.default_edge_length);
        geo.x = placed.x;
        geo.y = placed.y;
        let geometry = geo.clone();
        debug!(%source, ?direction, "hover: click clones target");
        Some(CommitPlan::Connect {
            source,
            direction,
            payload,
            geometry,
            placement: Placement::beside(view, source),
            edge_style,
        })
    }
}

// =============================================================
// Connect drag
// =============================================================

/// A new edge being dragged out of a hover affordance.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectDrag {
    pub source: CellId,
    /// Arrow the drag started from; `None` for the drag handle.
    pub direction: Option<Direction>,
    pub start: Point,
    pub current: Point,
}

impl ConnectDrag {
    #[must_use]
    pub fn new(source: CellId, direction: Option<Direction>, start: Point) -> Self {
        Self { source, direction, start, current: start }
    }

    /// Connectable vertex under the pointer that is not the source or on its
    /// ancestor chain.
    #[must_use]
    pub fn target<V: View + ?Sized>(&self, view: &V) -> Option<CellId> {
        let hovered = hit::hover_target(view, view.cell_at(self.current));
        hit::guard_target(view, hovered, &[self.source])
    }

    #[must_use]
    pub fn overlay<V: View + ?Sized>(&self, view: &V) -> Overlay {
        let from = view.state_for(self.source).map_or(self.start, |s| s.center());
        let highlight = self.target(view).and_then(|t| view.state_for(t)).map(|s| s.bounding_box);
        Overlay {
            affordances: Vec::new(),
            preview: Preview { bounds: None, connector: Some((from, self.current)) },
            highlight,
        }
    }

    /// Plan for releasing at the current point: connect to the vertex under
    /// the pointer, or to a clone of the source centred on the pointer.
    #[must_use]
    pub fn finish<V: View + ?Sized>(&self, env: &GestureEnv<'_, V>) -> Option<CommitPlan> {
        let view = env.view;
        let edge_style = env.cascade.create_current_edge_style();
        if let Some(target) = self.target(view) {
            return Some(CommitPlan::ConnectExisting { source: self.source, target, edge_style });
        }
        if !view.contains(self.source) {
            return None;
        }
        let p = view.transform().screen_to_graph(self.current);
        let mut payload = duplicate_subtree(view, self.source);
        let geo = payload.first_mut()?.geometry.as_mut()?;
        let grid = if env.solver.grid_enabled { env.solver.grid_size } else { 0.0 };
        geo.x = solver::snap(p.x - geo.width / 2.0, grid);
        geo.y = solver::snap(p.y - geo.height / 2.0, grid);
        let geometry = geo.clone();
        Some(CommitPlan::Connect {
            source: self.source,
            direction: self.direction.unwrap_or(Direction::East),
            payload,
            geometry,
            placement: Placement::beside(view, self.source),
            edge_style,
        })
    }
}
