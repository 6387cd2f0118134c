use tracing::{debug, info, warn};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::cascade::StyleCascade;
use crate::clock::{Clock, PerformanceClock, SystemClock};
use crate::config::EngineConfig;
use crate::drag::{DragPayload, DragSession, Intent};
use crate::geom::{Point, Rect};
use crate::hover::{ConnectDrag, HoverIcons};
use crate::input::{Button, Gesture, GestureEnv, Key, Modifiers, WheelDelta};
use crate::model::{Cell, CellId, DocStore, Model, ModelError, ModelEvent, ModelRead, clone_cells, transact};
use crate::ops::{self, CommitPlan};
use crate::overlay::{Affordance, Overlay};
use crate::render;
use crate::schedule::{Scheduler, TimerPurpose};
use crate::selection::{Selection, SelectionModel};
use crate::solver;
use crate::style::{Style, StyleKey, Stylesheet};
use crate::view::{GraphView, View, ViewTransform};

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    CellsInserted(Vec<CellId>),
    StyleChanged { cells: Vec<CellId>, keys: Vec<StyleKey> },
    CellsRemoved(Vec<CellId>),
    SelectionChanged(Vec<CellId>),
    SetCursor(String),
    RenderNeeded,
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("another gesture is active")]
    GestureActive,
    #[error(transparent)]
    Model(#[from] ModelError),
}

impl EngineError {
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::GestureActive => "E_GESTURE_ACTIVE",
            Self::Model(e) => e.error_code(),
        }
    }
}

/// View over the document with the engine's transform and hit slop.
fn view_of<'a>(doc: &'a DocStore, transform: ViewTransform, stylesheet: &'a Stylesheet, tolerance: f64) -> GraphView<'a> {
    GraphView::new(doc, transform, stylesheet).with_tolerance(tolerance)
}

fn cursor(name: &str) -> Action {
    Action::SetCursor(name.to_owned())
}

/// Core engine state: everything that doesn't depend on the canvas element.
///
/// Separated from `Engine` so it can be tested without WASM/browser
/// dependencies. Time comes from `C`; tests drive a `ManualClock`.
pub struct EngineCore<C: Clock = SystemClock> {
    pub doc: DocStore,
    pub transform: ViewTransform,
    pub stylesheet: Stylesheet,
    pub selection: SelectionModel,
    pub cascade: StyleCascade,
    pub config: EngineConfig,
    pub viewport_width: f64,
    pub viewport_height: f64,
    pub dpr: f64,
    scheduler: Scheduler,
    clock: C,
    hover: HoverIcons,
    gesture: Gesture,
    modifiers: Modifiers,
}

impl Default for EngineCore<SystemClock> {
    fn default() -> Self {
        Self::with_clock(SystemClock::new(), EngineConfig::default())
    }
}

impl EngineCore<SystemClock> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: Clock> EngineCore<C> {
    #[must_use]
    pub fn with_clock(clock: C, config: EngineConfig) -> Self {
        Self {
            doc: DocStore::new(),
            transform: ViewTransform::default(),
            stylesheet: Stylesheet::default(),
            selection: SelectionModel::new(),
            cascade: StyleCascade::new(),
            hover: HoverIcons::new(config.hover.clone(), config.graph_tolerance),
            config,
            viewport_width: 0.0,
            viewport_height: 0.0,
            dpr: 1.0,
            scheduler: Scheduler::new(),
            clock,
            gesture: Gesture::Idle,
            modifiers: Modifiers::default(),
        }
    }

    // --- Data inputs ---

    /// Replace the document. Cancels any gesture and resets the cascade.
    ///
    /// # Errors
    ///
    /// Propagates model errors; the document is left empty in that case.
    pub fn load_document(&mut self, cells: Vec<Cell>) -> Result<(), EngineError> {
        self.cancel_gesture();
        self.cascade.reset();
        self.selection.set(Vec::new());
        self.doc.load(cells)?;
        info!(cells = self.doc.len(), "document loaded");
        Ok(())
    }

    /// Seed the cascade with explicitly chosen default styles.
    pub fn set_default_styles(&mut self, vertex: Style, edge: Style) {
        self.cascade.seed(vertex, edge);
    }

    pub fn set_selection(&mut self, cells: Vec<CellId>) -> Vec<Action> {
        self.selection.set(cells.clone());
        self.repaint_hover();
        vec![Action::SelectionChanged(cells), Action::RenderNeeded]
    }

    /// Set one style key on `cells` as a user edit: the change is announced
    /// and the cascade learns from it.
    ///
    /// # Errors
    ///
    /// Rolls back and propagates model errors.
    pub fn set_cell_style(&mut self, cells: &[CellId], key: StyleKey, value: Option<&str>) -> Result<Vec<Action>, EngineError> {
        transact(&mut self.doc, |m| {
            for cell in cells {
                m.set_style(*cell, key, value)?;
            }
            m.emit(ModelEvent::StyleChanged {
                keys: vec![key],
                values: vec![value.map(str::to_owned)],
                cells: cells.to_vec(),
            });
            Ok(())
        })?;
        Ok(self.after_mutation(Vec::new()))
    }

    /// Remove cells; dependent edges are removed or detached per `include_edges`.
    ///
    /// # Errors
    ///
    /// Rolls back and propagates model errors.
    pub fn remove_cells(&mut self, ids: &[CellId], include_edges: bool) -> Result<Vec<Action>, EngineError> {
        transact(&mut self.doc, |m| m.remove_cells(ids, include_edges))?;
        Ok(self.after_mutation(Vec::new()))
    }

    /// Insert palette cells at the free insertion point.
    ///
    /// # Errors
    ///
    /// Rolls back and propagates model errors.
    pub fn insert_payload(&mut self, cells: &[Cell]) -> Result<Vec<Action>, EngineError> {
        let view = view_of(&self.doc, self.transform, &self.stylesheet, self.config.graph_tolerance);
        let plan = ops::plan_free_insert(&view, clone_cells(cells), &self.config.solver);
        self.commit(Some(plan))
    }

    // --- Viewport ---

    /// Update viewport dimensions (CSS pixels) and device pixel ratio.
    pub fn set_viewport(&mut self, width_css: f64, height_css: f64, dpr: f64) {
        self.viewport_width = width_css;
        self.viewport_height = height_css;
        self.dpr = dpr;
    }

    fn viewport(&self) -> Option<Rect> {
        (self.viewport_width > 0.0 && self.viewport_height > 0.0)
            .then(|| Rect::new(0.0, 0.0, self.viewport_width, self.viewport_height))
    }

    // --- Gestures ---

    /// Start dragging `payload` with the pointer at `p`.
    ///
    /// # Errors
    ///
    /// `GestureActive` if another gesture is in progress.
    pub fn begin_drag(&mut self, payload: DragPayload, p: Point, modifiers: Modifiers) -> Result<Vec<Action>, EngineError> {
        if !self.gesture.is_idle() {
            warn!(active = self.gesture.name(), "drag rejected: gesture active");
            return Err(EngineError::GestureActive);
        }
        self.hover.cancel(&mut self.scheduler);
        self.modifiers = modifiers;
        let mut session = DragSession::new(payload, self.config.drag.clone(), self.config.graph_tolerance);
        let now = self.clock.now_ms();
        let view = view_of(&self.doc, self.transform, &self.stylesheet, self.config.graph_tolerance);
        let env = GestureEnv { view: &view, selection: &self.selection, cascade: &self.cascade, solver: &self.config.solver };
        session.drag_over(&env, &mut self.scheduler, now, p, modifiers);
        self.gesture = Gesture::Dragging(Box::new(session));
        debug!(x = p.x, y = p.y, "drag started");
        Ok(vec![cursor("copy"), Action::RenderNeeded])
    }

    pub fn on_pointer_down(&mut self, p: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        self.modifiers = modifiers;
        match button {
            Button::Middle => {
                self.cancel_gesture();
                self.gesture = Gesture::Panning { last_screen: p };
                return vec![cursor("grabbing"), Action::RenderNeeded];
            }
            Button::Secondary => return Vec::new(),
            Button::Primary => {}
        }
        if !self.gesture.is_idle() {
            return Vec::new();
        }
        let Some(source) = self.hover.current() else {
            return Vec::new();
        };
        match self.hover.press(p) {
            Some(affordance) => {
                self.gesture = Gesture::Pressed { source, affordance, down: p };
                vec![Action::RenderNeeded]
            }
            None => Vec::new(),
        }
    }

    pub fn on_pointer_move(&mut self, p: Point, modifiers: Modifiers) -> Vec<Action> {
        self.modifiers = modifiers;
        let now = self.clock.now_ms();
        let view = view_of(&self.doc, self.transform, &self.stylesheet, self.config.graph_tolerance);
        let env = GestureEnv { view: &view, selection: &self.selection, cascade: &self.cascade, solver: &self.config.solver };
        let mut next = None;
        let actions = match &mut self.gesture {
            Gesture::Idle => {
                let was_visible = self.hover.is_visible();
                self.hover.pointer_moved(&env, &mut self.scheduler, now, view.cell_at(p), p);
                let name = match self.hover.active_affordance() {
                    Some(Affordance::DragHandle) => "move",
                    Some(_) => "pointer",
                    None => "default",
                };
                let mut actions = vec![cursor(name)];
                if was_visible || self.hover.is_visible() {
                    actions.push(Action::RenderNeeded);
                }
                actions
            }
            Gesture::Pressed { source, affordance, down } => {
                if down.distance(p) > self.config.hover.click_tolerance {
                    let direction = match affordance {
                        Affordance::Arrow(d) => Some(*d),
                        _ => None,
                    };
                    let mut drag = ConnectDrag::new(*source, direction, *down);
                    drag.current = p;
                    debug!(source = %drag.source, ?direction, "connect drag started");
                    next = Some(Gesture::Connecting(drag));
                }
                vec![Action::RenderNeeded]
            }
            Gesture::Connecting(drag) => {
                drag.current = p;
                vec![cursor("crosshair"), Action::RenderNeeded]
            }
            Gesture::Dragging(session) => {
                session.drag_over(&env, &mut self.scheduler, now, p, modifiers);
                let name = if session.active_affordance().is_some() { "pointer" } else { "copy" };
                vec![cursor(name), Action::RenderNeeded]
            }
            Gesture::Panning { last_screen } => {
                let scale = self.transform.scale;
                self.transform.translate.x += (p.x - last_screen.x) / scale;
                self.transform.translate.y += (p.y - last_screen.y) / scale;
                *last_screen = p;
                vec![Action::RenderNeeded]
            }
        };
        if let Some(gesture) = next {
            self.hover.cancel(&mut self.scheduler);
            self.gesture = gesture;
        }
        actions
    }

    /// Finish the active gesture at `p`, committing whatever it planned.
    ///
    /// # Errors
    ///
    /// Propagates model errors from the commit; the transaction is rolled back.
    pub fn on_pointer_up(&mut self, p: Point, _button: Button, modifiers: Modifiers) -> Result<Vec<Action>, EngineError> {
        self.modifiers = modifiers;
        let viewport = self.viewport();
        let gesture = std::mem::take(&mut self.gesture);
        let view = view_of(&self.doc, self.transform, &self.stylesheet, self.config.graph_tolerance);
        let env = GestureEnv { view: &view, selection: &self.selection, cascade: &self.cascade, solver: &self.config.solver };
        let plan = match gesture {
            Gesture::Idle => return Ok(Vec::new()),
            Gesture::Panning { .. } => return Ok(vec![cursor("default"), Action::RenderNeeded]),
            Gesture::Pressed { affordance, .. } => {
                let plan = match affordance {
                    Affordance::Arrow(direction) => self.hover.click(&env, direction),
                    _ => None,
                };
                self.hover.release();
                plan
            }
            Gesture::Connecting(mut drag) => {
                drag.current = p;
                drag.finish(&env)
            }
            Gesture::Dragging(session) => session.finish(&env, &mut self.scheduler, p, viewport),
        };
        self.hover.cancel(&mut self.scheduler);
        let mut actions = self.commit(plan)?;
        actions.insert(0, cursor("default"));
        Ok(actions)
    }

    /// Scroll pans the view and ends hover.
    pub fn on_wheel(&mut self, delta: WheelDelta) -> Vec<Action> {
        if matches!(self.gesture, Gesture::Dragging(_) | Gesture::Connecting(_)) {
            return Vec::new();
        }
        self.hover.cancel(&mut self.scheduler);
        let scale = self.transform.scale;
        self.transform.translate.x -= delta.dx / scale;
        self.transform.translate.y -= delta.dy / scale;
        vec![Action::RenderNeeded]
    }

    pub fn on_key_down(&mut self, key: &Key, modifiers: Modifiers) -> Vec<Action> {
        self.modifiers = modifiers;
        if key.is_escape() {
            self.cancel_gesture();
            return vec![cursor("default"), Action::RenderNeeded];
        }
        Vec::new()
    }

    /// Fire due timers. Hosts call this from their animation frame.
    pub fn tick(&mut self) -> Vec<Action> {
        let now = self.clock.now_ms();
        let fired = self.scheduler.fire_due(now);
        if fired.is_empty() {
            return Vec::new();
        }
        let view = view_of(&self.doc, self.transform, &self.stylesheet, self.config.graph_tolerance);
        let env = GestureEnv { view: &view, selection: &self.selection, cascade: &self.cascade, solver: &self.config.solver };
        for token in fired {
            debug!(purpose = ?token.purpose, now, "timer fired");
            match (token.purpose, &mut self.gesture) {
                (TimerPurpose::HoverUpdate, Gesture::Idle) => self.hover.timer_fired(&env, &mut self.scheduler, now),
                (TimerPurpose::DropTarget, Gesture::Dragging(session)) => {
                    session.timer_fired(&env, &mut self.scheduler, now, self.modifiers);
                }
                _ => {}
            }
        }
        vec![Action::RenderNeeded]
    }

    /// Abort the active gesture and clear hover. Nothing is committed.
    pub fn cancel_gesture(&mut self) {
        let gesture = std::mem::take(&mut self.gesture);
        if !gesture.is_idle() {
            debug!(gesture = gesture.name(), "gesture cancelled");
        }
        if let Gesture::Dragging(session) = gesture {
            session.cancel(&mut self.scheduler);
        }
        self.hover.cancel(&mut self.scheduler);
    }

    // --- Commit ---

    fn commit(&mut self, plan: Option<CommitPlan>) -> Result<Vec<Action>, EngineError> {
        let Some(plan) = plan else {
            return Ok(vec![Action::RenderNeeded]);
        };
        let commit = ops::execute(&mut self.doc, &self.cascade, plan)?;
        let mut actions = Vec::new();
        if !commit.select.is_empty() {
            self.selection.set(commit.select.clone());
            actions.push(Action::SelectionChanged(commit.select));
        }
        Ok(self.after_mutation(actions))
    }

    /// Route released model events to the cascade and the host.
    fn after_mutation(&mut self, mut tail: Vec<Action>) -> Vec<Action> {
        let mut actions = Vec::new();
        for event in self.doc.drain_events() {
            match event {
                ModelEvent::CellsInserted(ids) => actions.push(Action::CellsInserted(ids)),
                ModelEvent::StyleChanged { keys, values, cells } => {
                    let has_vertex = cells.iter().any(|c| self.doc.is_vertex(*c));
                    let has_edge = cells.iter().any(|c| self.doc.is_edge(*c));
                    self.cascade.observe_style_change(&keys, &values, has_vertex, has_edge);
                    actions.push(Action::StyleChanged { cells, keys });
                }
                ModelEvent::CellsRemoved(ids) => {
                    self.selection.retain_existing(&self.doc);
                    actions.push(Action::CellsRemoved(ids));
                }
            }
        }
        self.repaint_hover();
        actions.append(&mut tail);
        actions.push(Action::RenderNeeded);
        actions
    }

    fn repaint_hover(&mut self) {
        let view = view_of(&self.doc, self.transform, &self.stylesheet, self.config.graph_tolerance);
        let env = GestureEnv { view: &view, selection: &self.selection, cascade: &self.cascade, solver: &self.config.solver };
        self.hover.repaint(&env);
    }

    // --- Queries ---

    /// What a renderer should draw on top of the diagram.
    #[must_use]
    pub fn overlay(&self) -> Overlay {
        match &self.gesture {
            Gesture::Dragging(session) => session.overlay().clone(),
            Gesture::Connecting(drag) => {
                let view = view_of(&self.doc, self.transform, &self.stylesheet, self.config.graph_tolerance);
                drag.overlay(&view)
            }
            _ => self.hover.overlay(),
        }
    }

    /// Graph point for an insert with no explicit location.
    #[must_use]
    pub fn insertion_point(&self) -> Point {
        let view = view_of(&self.doc, self.transform, &self.stylesheet, self.config.graph_tolerance);
        solver::compute_insertion_point(&view, self.config.solver.grid_size)
    }

    #[must_use]
    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    /// Vertex currently carrying hover arrows.
    #[must_use]
    pub fn hover_target(&self) -> Option<CellId> {
        self.hover.current()
    }

    /// Intent the active drag would commit.
    #[must_use]
    pub fn drag_intent(&self) -> Option<Intent> {
        match &self.gesture {
            Gesture::Dragging(session) => Some(session.intent()),
            _ => None,
        }
    }

    #[must_use]
    pub fn cell(&self, id: CellId) -> Option<&Cell> {
        self.doc.cell(id)
    }

    #[must_use]
    pub fn clock(&self) -> &C {
        &self.clock
    }
}

/// The full canvas engine. Wraps `EngineCore` and owns the browser canvas element.
pub struct Engine {
    canvas: HtmlCanvasElement,
    pub core: EngineCore<PerformanceClock>,
}

impl Engine {
    /// Create a new engine bound to the given canvas element.
    #[must_use]
    pub fn new(canvas: HtmlCanvasElement, config: EngineConfig) -> Self {
        Self { canvas, core: EngineCore::with_clock(PerformanceClock, config) }
    }

    // --- Delegated inputs ---

    /// # Errors
    ///
    /// See [`EngineCore::load_document`].
    pub fn load_document(&mut self, cells: Vec<Cell>) -> Result<(), EngineError> {
        self.core.load_document(cells)
    }

    pub fn set_viewport(&mut self, width_css: f64, height_css: f64, dpr: f64) {
        self.core.set_viewport(width_css, height_css, dpr);
    }

    /// # Errors
    ///
    /// See [`EngineCore::begin_drag`].
    pub fn begin_drag(&mut self, payload: DragPayload, p: Point, modifiers: Modifiers) -> Result<Vec<Action>, EngineError> {
        self.core.begin_drag(payload, p, modifiers)
    }

    pub fn on_pointer_down(&mut self, p: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_pointer_down(p, button, modifiers)
    }

    pub fn on_pointer_move(&mut self, p: Point, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_pointer_move(p, modifiers)
    }

    /// # Errors
    ///
    /// See [`EngineCore::on_pointer_up`].
    pub fn on_pointer_up(&mut self, p: Point, button: Button, modifiers: Modifiers) -> Result<Vec<Action>, EngineError> {
        self.core.on_pointer_up(p, button, modifiers)
    }

    pub fn on_wheel(&mut self, delta: WheelDelta) -> Vec<Action> {
        self.core.on_wheel(delta)
    }

    pub fn on_key_down(&mut self, key: &Key, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_key_down(key, modifiers)
    }

    pub fn tick(&mut self) -> Vec<Action> {
        self.core.tick()
    }

    // --- Render ---

    /// Draw the overlay onto the canvas.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the 2D context is unavailable or a `Canvas2D` call fails.
    pub fn render(&self) -> Result<(), JsValue> {
        let ctx = self
            .canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(JsValue::from)?;
        render::draw_overlay(
            &ctx,
            &self.core.overlay(),
            self.core.viewport_width,
            self.core.viewport_height,
            self.core.dpr,
        )
    }
}
