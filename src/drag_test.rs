#![allow(clippy::float_cmp)]

use super::*;
use crate::cascade::StyleCascade;
use crate::config::SolverConfig;
use crate::consts::GRAPH_TOLERANCE_PX;
use crate::model::{DocStore, Geometry};
use crate::selection::SelectionModel;
use crate::style::Stylesheet;
use crate::view::{GraphView, ViewTransform};

// =============================================================
// Helpers
// =============================================================

struct Fixture {
    doc: DocStore,
    sheet: Stylesheet,
    selection: SelectionModel,
    cascade: StyleCascade,
    solver: SolverConfig,
}

impl Fixture {
    fn new() -> Self {
        Self {
            doc: DocStore::new(),
            sheet: Stylesheet::default(),
            selection: SelectionModel::new(),
            cascade: StyleCascade::new(),
            solver: SolverConfig::default(),
        }
    }

    fn add(&mut self, style: &str, x: f64, y: f64, w: f64, h: f64) -> CellId {
        let layer = self.doc.default_parent();
        self.doc.add_vertex(layer, style, Geometry::new(x, y, w, h)).unwrap()
    }

    fn connected_pair(&mut self) -> CellId {
        let a = self.add("", 0.0, 0.0, 40.0, 40.0);
        let b = self.add("", 200.0, 0.0, 40.0, 40.0);
        let layer = self.doc.default_parent();
        self.doc.add_edge(layer, "", Some(a), Some(b)).unwrap()
    }

    fn view(&self) -> GraphView<'_> {
        GraphView::new(&self.doc, ViewTransform::default(), &self.sheet)
    }
}

fn env_for<'a>(fx: &'a Fixture, view: &'a GraphView<'a>) -> GestureEnv<'a, GraphView<'a>> {
    GestureEnv { view, selection: &fx.selection, cascade: &fx.cascade, solver: &fx.solver }
}

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

fn none() -> Modifiers {
    Modifiers::default()
}

fn shift() -> Modifiers {
    Modifiers { shift: true, ..Modifiers::default() }
}

fn ellipse() -> Cell {
    Cell::vertex("ellipse", Geometry::new(0.0, 0.0, 40.0, 40.0))
}

fn session(cells: &[Cell]) -> DragSession {
    DragSession::new(DragPayload::from_cells(cells), DragConfig::default(), GRAPH_TOLERANCE_PX)
}

fn active_count(s: &DragSession) -> usize {
    s.overlay().affordances.iter().filter(|a| a.opacity == 100).count()
}

// =============================================================
// DragPayload
// =============================================================

#[test]
fn payload_from_cells_uses_fresh_ids() {
    let cell = ellipse();
    let a = DragPayload::from_cells(std::slice::from_ref(&cell));
    let b = DragPayload::from_cells(std::slice::from_ref(&cell));
    assert_ne!(a.cells[0].id, cell.id);
    assert_ne!(a.cells[0].id, b.cells[0].id);
    assert!(a.origins.is_empty());
    assert_eq!(a.bounds(), Some(Rect::new(0.0, 0.0, 40.0, 40.0)));
}

#[test]
fn payload_copy_of_records_origins() {
    let mut fx = Fixture::new();
    let v = fx.add("", 10.0, 10.0, 40.0, 40.0);
    let p = DragPayload::copy_of(&fx.doc, &[v]);
    assert_eq!(p.origins, vec![v]);
    assert_eq!(p.cells.len(), 1);
    assert_ne!(p.cells[0].id, v);
}

#[test]
fn payload_single_and_splittable() {
    let fx = Fixture::new();
    let view = fx.view();
    let one = DragPayload::from_cells(&[ellipse()]);
    assert!(one.single().is_some());
    assert!(one.is_splittable(&view));

    let two = DragPayload::from_cells(&[ellipse(), ellipse()]);
    assert!(two.single().is_none());

    let edge = DragPayload::from_cells(&[Cell::edge("", Geometry::line(pt(0.0, 0.0), pt(50.0, 0.0)))]);
    assert!(!edge.is_splittable(&view));

    let locked = DragPayload::from_cells(&[Cell::vertex("locked=1", Geometry::new(0.0, 0.0, 10.0, 10.0))]);
    assert!(!locked.is_splittable(&view));

    let group = DragPayload::from_cells(&[Cell::vertex("group", Geometry::new(0.0, 0.0, 10.0, 10.0))]);
    assert!(!group.is_splittable(&view));
}

// =============================================================
// Plain drop
// =============================================================

#[test]
fn drop_on_empty_canvas_previews_snapped_insert() {
    let fx = Fixture::new();
    let view = fx.view();
    let env = env_for(&fx, &view);
    let mut sched = Scheduler::new();
    let mut s = session(&[ellipse()]);
    s.drag_over(&env, &mut sched, 0, pt(333.0, 241.0), none());
    assert_eq!(s.intent(), Intent::Drop { target: None });
    assert_eq!(s.overlay().preview.bounds, Some(Rect::new(340.0, 250.0, 40.0, 40.0)));
    assert!(s.overlay().affordances.is_empty());
    assert!(sched.is_idle());

    match s.finish(&env, &mut sched, pt(333.0, 241.0), None).unwrap() {
        CommitPlan::Insert { origin, placement, .. } => {
            assert_eq!(origin, pt(340.0, 250.0));
            assert_eq!(placement.parent, fx.doc.default_parent());
        }
        other => panic!("unexpected plan {other:?}"),
    }
}

#[test]
fn drop_into_container_targets_it() {
    let mut fx = Fixture::new();
    let lane = fx.add("swimlane", 100.0, 100.0, 300.0, 200.0);
    let view = fx.view();
    let env = env_for(&fx, &view);
    let mut sched = Scheduler::new();
    let mut s = session(&[ellipse()]);
    s.drag_over(&env, &mut sched, 0, pt(200.0, 200.0), none());
    assert_eq!(s.intent(), Intent::Drop { target: Some(lane) });
    match s.finish(&env, &mut sched, pt(200.0, 200.0), None).unwrap() {
        CommitPlan::Insert { placement, .. } => {
            assert_eq!(placement.parent, lane);
            assert_eq!(placement.origin, pt(100.0, 100.0));
        }
        other => panic!("unexpected plan {other:?}"),
    }
}

#[test]
fn alt_suppresses_targets() {
    let mut fx = Fixture::new();
    fx.add("", 100.0, 100.0, 80.0, 40.0);
    let view = fx.view();
    let env = env_for(&fx, &view);
    let mut sched = Scheduler::new();
    let mut s = session(&[ellipse()]);
    let alt = Modifiers { alt: true, ..Modifiers::default() };
    s.drag_over(&env, &mut sched, 0, pt(140.0, 120.0), alt);
    assert_eq!(s.intent(), Intent::Drop { target: None });
    assert_eq!(s.current_target(), None);
}

#[test]
fn release_outside_viewport_aborts() {
    let fx = Fixture::new();
    let view = fx.view();
    let env = env_for(&fx, &view);
    let mut sched = Scheduler::new();
    let mut s = session(&[ellipse()]);
    s.drag_over(&env, &mut sched, 0, pt(900.0, 100.0), none());
    let viewport = Some(Rect::new(0.0, 0.0, 800.0, 600.0));
    assert!(s.finish(&env, &mut sched, pt(900.0, 100.0), viewport).is_none());
}

// =============================================================
// Directional connect
// =============================================================

#[test]
fn first_evaluation_arms_drop_target_timer() {
    let mut fx = Fixture::new();
    fx.add("", 100.0, 100.0, 80.0, 40.0);
    let view = fx.view();
    let env = env_for(&fx, &view);
    let mut sched = Scheduler::new();
    let mut s = session(&[ellipse()]);
    s.drag_over(&env, &mut sched, 0, pt(140.0, 120.0), none());
    assert!(s.overlay().affordances.is_empty());
    assert_eq!(sched.due_at(TimerPurpose::DropTarget), Some(210));
}

#[test]
fn arrows_appear_after_dwell_and_connect_on_hover() {
    let mut fx = Fixture::new();
    let v = fx.add("", 100.0, 100.0, 80.0, 40.0);
    let view = fx.view();
    let env = env_for(&fx, &view);
    let mut sched = Scheduler::new();
    let mut s = session(&[ellipse()]);
    s.drag_over(&env, &mut sched, 0, pt(140.0, 120.0), none());
    s.timer_fired(&env, &mut sched, 210, none());

    let arrows = s.overlay().affordances.iter().filter(|a| matches!(a.affordance, Affordance::Arrow(_))).count();
    assert_eq!(arrows, 4);
    assert_eq!(active_count(&s), 0);
    assert_eq!(s.intent(), Intent::Drop { target: Some(v) });
    let east = s.overlay().find(Affordance::Arrow(Direction::East)).unwrap().bounds;
    assert_eq!(east, Rect::new(184.0, 107.0, 14.0, 26.0));

    s.drag_over(&env, &mut sched, 300, east.center(), none());
    assert_eq!(s.current_target(), Some(v));
    assert_eq!(s.intent(), Intent::Connect { source: v, direction: Direction::East });
    assert_eq!(active_count(&s), 1);
    assert_eq!(s.overlay().preview.bounds, Some(Rect::new(260.0, 100.0, 40.0, 40.0)));
    assert_eq!(s.overlay().preview.connector, Some((pt(140.0, 120.0), pt(280.0, 120.0))));

    let plan = s.finish(&env, &mut sched, east.center(), None).unwrap();
    assert!(matches!(plan, CommitPlan::Connect { source, direction: Direction::East, .. } if source == v));
}

#[test]
fn leaving_affordance_box_tears_down_visuals() {
    let mut fx = Fixture::new();
    fx.add("", 100.0, 100.0, 80.0, 40.0);
    let view = fx.view();
    let env = env_for(&fx, &view);
    let mut sched = Scheduler::new();
    let mut s = session(&[ellipse()]);
    s.drag_over(&env, &mut sched, 0, pt(140.0, 120.0), none());
    s.timer_fired(&env, &mut sched, 210, none());
    assert!(!s.overlay().affordances.is_empty());

    s.drag_over(&env, &mut sched, 300, pt(600.0, 600.0), none());
    assert!(s.overlay().affordances.is_empty());
    assert_eq!(s.current_target(), None);
    assert_eq!(s.intent(), Intent::Drop { target: None });
}

#[test]
fn non_connectable_target_gets_no_arrows() {
    let mut fx = Fixture::new();
    fx.add("connectable=0", 100.0, 100.0, 80.0, 40.0);
    let view = fx.view();
    let env = env_for(&fx, &view);
    let mut sched = Scheduler::new();
    let mut s = session(&[ellipse()]);
    s.drag_over(&env, &mut sched, 0, pt(140.0, 120.0), none());
    s.timer_fired(&env, &mut sched, 210, none());
    assert!(s.overlay().find(Affordance::Arrow(Direction::North)).is_none());
}

#[test]
fn selected_target_handles_hidden_until_retarget() {
    let mut fx = Fixture::new();
    let v = fx.add("", 100.0, 100.0, 80.0, 40.0);
    fx.selection.set(vec![v]);
    let view = fx.view();
    let env = env_for(&fx, &view);
    let mut sched = Scheduler::new();
    let mut s = session(&[ellipse()]);
    s.drag_over(&env, &mut sched, 0, pt(140.0, 120.0), none());
    s.timer_fired(&env, &mut sched, 210, none());
    assert!(s.hides_handles());
    assert!(!fx.selection.handles().visible());

    s.drag_over(&env, &mut sched, 300, pt(600.0, 600.0), none());
    assert!(!s.hides_handles());
    assert!(fx.selection.handles().visible());
}

#[test]
fn cancel_restores_handles_and_timer() {
    let mut fx = Fixture::new();
    let v = fx.add("", 100.0, 100.0, 80.0, 40.0);
    fx.selection.set(vec![v]);
    let view = fx.view();
    let env = env_for(&fx, &view);
    let mut sched = Scheduler::new();
    let mut s = session(&[ellipse()]);
    s.drag_over(&env, &mut sched, 0, pt(140.0, 120.0), none());
    s.timer_fired(&env, &mut sched, 210, none());
    assert!(!fx.selection.handles().visible());
    s.cancel(&mut sched);
    assert!(fx.selection.handles().visible());
    assert!(sched.is_idle());
}

// =============================================================
// Style replace
// =============================================================

#[test]
fn same_family_badge_shows_immediately() {
    let mut fx = Fixture::new();
    let v = fx.add("", 100.0, 100.0, 80.0, 40.0);
    let view = fx.view();
    let env = env_for(&fx, &view);
    let mut sched = Scheduler::new();
    let mut s = session(&[Cell::vertex("rounded=1;fillColor=#FF0000", Geometry::new(0.0, 0.0, 40.0, 40.0))]);
    s.drag_over(&env, &mut sched, 0, pt(140.0, 120.0), none());
    let badge = s.overlay().find(Affordance::StyleReplace).unwrap();
    assert_eq!(badge.bounds, Rect::new(125.0, 105.0, 30.0, 30.0));
    assert_eq!(s.intent(), Intent::ReplaceStyle { target: v });
    assert_eq!(s.overlay().preview.bounds, Some(Rect::new(100.0, 100.0, 80.0, 40.0)));

    match s.finish(&env, &mut sched, pt(140.0, 120.0), None).unwrap() {
        CommitPlan::ReplaceStyle { style, cells, .. } => {
            assert_eq!(cells, vec![v]);
            assert_eq!(style.get(crate::style::StyleKey::FillColor), Some("#FF0000"));
        }
        other => panic!("unexpected plan {other:?}"),
    }
}

#[test]
fn unrelated_shape_badge_waits_for_long_dwell() {
    let mut fx = Fixture::new();
    let v = fx.add("", 100.0, 100.0, 80.0, 40.0);
    let view = fx.view();
    let env = env_for(&fx, &view);
    let mut sched = Scheduler::new();
    let mut s = session(&[ellipse()]);
    s.drag_over(&env, &mut sched, 0, pt(140.0, 120.0), none());
    assert!(s.overlay().find(Affordance::StyleReplace).is_none());
    s.timer_fired(&env, &mut sched, 210, none());
    assert!(s.overlay().find(Affordance::StyleReplace).is_none());
    assert_eq!(sched.due_at(TimerPurpose::DropTarget), Some(1_510));
    s.timer_fired(&env, &mut sched, 1_510, none());
    assert!(s.overlay().find(Affordance::StyleReplace).is_some());
    assert_eq!(s.intent(), Intent::ReplaceStyle { target: v });
    assert_eq!(active_count(&s), 1);
}

#[test]
fn long_hold_off_badge_replaces_style() {
    let mut fx = Fixture::new();
    let v = fx.add("", 100.0, 100.0, 80.0, 40.0);
    let view = fx.view();
    let env = env_for(&fx, &view);
    let mut sched = Scheduler::new();
    let mut s = session(&[ellipse()]);
    s.drag_over(&env, &mut sched, 0, pt(110.0, 110.0), none());
    s.timer_fired(&env, &mut sched, 210, none());
    assert_eq!(s.intent(), Intent::Drop { target: Some(v) });
    s.timer_fired(&env, &mut sched, 1_510, none());

    let badge = s.overlay().find(Affordance::StyleReplace).unwrap();
    assert!(!badge.bounds.contains(pt(110.0, 110.0)));
    assert_eq!(badge.opacity, 100);
    assert_eq!(s.intent(), Intent::ReplaceStyle { target: v });
    assert_eq!(active_count(&s), 1);
}

#[test]
fn immediate_badge_needs_the_pointer_until_long_dwell() {
    let mut fx = Fixture::new();
    let v = fx.add("", 100.0, 100.0, 80.0, 40.0);
    let view = fx.view();
    let env = env_for(&fx, &view);
    let mut sched = Scheduler::new();
    let mut s = session(&[Cell::vertex("rounded=1", Geometry::new(0.0, 0.0, 40.0, 40.0))]);
    s.drag_over(&env, &mut sched, 0, pt(110.0, 110.0), none());
    assert!(s.overlay().find(Affordance::StyleReplace).is_some());
    assert_eq!(s.intent(), Intent::Drop { target: Some(v) });
    assert_eq!(active_count(&s), 0);

    s.timer_fired(&env, &mut sched, 1_510, none());
    assert_eq!(s.intent(), Intent::ReplaceStyle { target: v });
}

#[test]
fn arrow_under_pointer_beats_long_hold() {
    let mut fx = Fixture::new();
    let v = fx.add("", 100.0, 100.0, 80.0, 40.0);
    let view = fx.view();
    let env = env_for(&fx, &view);
    let mut sched = Scheduler::new();
    let mut s = session(&[ellipse()]);
    s.drag_over(&env, &mut sched, 0, pt(140.0, 120.0), none());
    s.timer_fired(&env, &mut sched, 1_510, none());
    s.drag_over(&env, &mut sched, 1_600, pt(190.0, 120.0), none());
    assert_eq!(s.intent(), Intent::Connect { source: v, direction: Direction::East });
    assert_eq!(active_count(&s), 1);
}

#[test]
fn shift_disables_style_replace() {
    let mut fx = Fixture::new();
    fx.add("", 100.0, 100.0, 80.0, 40.0);
    let view = fx.view();
    let env = env_for(&fx, &view);
    let mut sched = Scheduler::new();
    let mut s = session(&[Cell::vertex("rounded=1", Geometry::new(0.0, 0.0, 40.0, 40.0))]);
    s.drag_over(&env, &mut sched, 0, pt(140.0, 120.0), shift());
    assert!(s.overlay().find(Affordance::StyleReplace).is_none());
}

#[test]
fn container_targets_never_offer_style_replace() {
    let mut fx = Fixture::new();
    fx.add("swimlane", 100.0, 100.0, 300.0, 200.0);
    let view = fx.view();
    let env = env_for(&fx, &view);
    let mut sched = Scheduler::new();
    let mut s = session(&[Cell::vertex("swimlane", Geometry::new(0.0, 0.0, 40.0, 40.0))]);
    s.drag_over(&env, &mut sched, 0, pt(250.0, 200.0), none());
    assert!(s.overlay().find(Affordance::StyleReplace).is_none());
}

#[test]
fn replace_style_uses_selection_containing_target() {
    let mut fx = Fixture::new();
    let v = fx.add("", 100.0, 100.0, 80.0, 40.0);
    let w = fx.add("", 300.0, 100.0, 80.0, 40.0);
    fx.selection.set(vec![v, w]);
    let view = fx.view();
    let env = env_for(&fx, &view);
    let mut sched = Scheduler::new();
    let mut s = session(&[Cell::vertex("rounded=1", Geometry::new(0.0, 0.0, 40.0, 40.0))]);
    s.drag_over(&env, &mut sched, 0, pt(140.0, 120.0), none());
    match s.finish(&env, &mut sched, pt(140.0, 120.0), None).unwrap() {
        CommitPlan::ReplaceStyle { cells, .. } => assert_eq!(cells, vec![v, w]),
        other => panic!("unexpected plan {other:?}"),
    }
}

// =============================================================
// Edge targets
// =============================================================

#[test]
fn drop_on_edge_splits_it() {
    let mut fx = Fixture::new();
    let e = fx.connected_pair();
    let view = fx.view();
    let env = env_for(&fx, &view);
    let mut sched = Scheduler::new();
    let mut s = session(&[ellipse()]);
    s.drag_over(&env, &mut sched, 0, pt(120.0, 20.0), none());
    assert_eq!(s.intent(), Intent::Split { edge: e });
    assert_eq!(s.overlay().preview.bounds, Some(Rect::new(100.0, 0.0, 40.0, 40.0)));
    match s.finish(&env, &mut sched, pt(120.0, 20.0), None).unwrap() {
        CommitPlan::SplitEdge { edge, center, split_index, .. } => {
            assert_eq!(edge, e);
            assert_eq!(center, pt(120.0, 20.0));
            assert_eq!(split_index, 0);
        }
        other => panic!("unexpected plan {other:?}"),
    }
}

#[test]
fn shift_drop_on_edge_does_not_split() {
    let mut fx = Fixture::new();
    let e = fx.connected_pair();
    let view = fx.view();
    let env = env_for(&fx, &view);
    let mut sched = Scheduler::new();
    let mut s = session(&[ellipse()]);
    s.drag_over(&env, &mut sched, 0, pt(120.0, 20.0), shift());
    assert_eq!(s.intent(), Intent::Drop { target: Some(e) });
}

#[test]
fn edge_target_offers_endpoints_and_reconnects() {
    let mut fx = Fixture::new();
    let e = fx.connected_pair();
    let view = fx.view();
    let env = env_for(&fx, &view);
    let mut sched = Scheduler::new();
    let mut s = session(&[ellipse()]);
    s.drag_over(&env, &mut sched, 0, pt(120.0, 20.0), none());
    s.timer_fired(&env, &mut sched, 210, none());
    let start = s.overlay().find(Affordance::Endpoint(EdgeEnd::Source)).unwrap().bounds;
    assert_eq!(start.center(), pt(40.0, 20.0));
    assert!(s.overlay().find(Affordance::Endpoint(EdgeEnd::Target)).is_some());

    s.drag_over(&env, &mut sched, 250, pt(40.0, 20.0), none());
    assert_eq!(s.intent(), Intent::Reconnect { edge: e, end: EdgeEnd::Source });
    match s.finish(&env, &mut sched, pt(40.0, 20.0), None).unwrap() {
        CommitPlan::Connect { source, direction, geometry, .. } => {
            assert_eq!(source, e);
            assert_eq!(direction, Direction::North);
            assert_eq!(geometry.center(), pt(40.0, 20.0));
        }
        other => panic!("unexpected plan {other:?}"),
    }
}

#[test]
fn edge_payload_gets_no_endpoints() {
    let mut fx = Fixture::new();
    fx.connected_pair();
    let view = fx.view();
    let env = env_for(&fx, &view);
    let mut sched = Scheduler::new();
    let mut s = session(&[Cell::edge("", Geometry::line(pt(0.0, 0.0), pt(50.0, 0.0)))]);
    s.drag_over(&env, &mut sched, 0, pt(120.0, 20.0), none());
    s.timer_fired(&env, &mut sched, 210, none());
    assert!(s.overlay().find(Affordance::Endpoint(EdgeEnd::Source)).is_none());
}

// =============================================================
// Exclusivity
// =============================================================

#[test]
fn at_most_one_affordance_is_active() {
    let mut fx = Fixture::new();
    fx.add("", 100.0, 100.0, 80.0, 40.0);
    let view = fx.view();
    let env = env_for(&fx, &view);
    let mut sched = Scheduler::new();
    let mut s = session(&[Cell::vertex("rounded=1", Geometry::new(0.0, 0.0, 40.0, 40.0))]);
    let path = [
        (0, pt(140.0, 120.0)),
        (210, pt(140.0, 120.0)),
        (250, pt(191.0, 120.0)),
        (300, pt(140.0, 89.0)),
        (350, pt(140.0, 120.0)),
        (400, pt(600.0, 600.0)),
    ];
    for (now, p) in path {
        s.drag_over(&env, &mut sched, now, p, none());
        assert!(active_count(&s) <= 1, "at {now}ms");
    }
}
