#![allow(clippy::clone_on_copy, clippy::float_cmp)]

use super::*;
use crate::cascade::StyleCascade;
use crate::config::SolverConfig;
use crate::consts::GRAPH_TOLERANCE_PX;
use crate::model::{DocStore, Geometry, Model, ModelRead};
use crate::selection::{Selection, SelectionModel};
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

fn icons() -> HoverIcons {
    HoverIcons::new(HoverConfig::default(), GRAPH_TOLERANCE_PX)
}

/// Hover `target` and let the update timer fire.
fn shown(fx: &Fixture, target: CellId) -> (HoverIcons, Scheduler) {
    let view = fx.view();
    let env = env_for(fx, &view);
    let mut hover = icons();
    let mut sched = Scheduler::new();
    let p = view.state_for(target).unwrap().center();
    hover.pointer_moved(&env, &mut sched, 0, Some(target), p);
    let fired = sched.fire_due(510);
    assert_eq!(fired.len(), 1);
    hover.timer_fired(&env, &mut sched, 510);
    (hover, sched)
}

fn arrows(hover: &HoverIcons) -> Vec<Direction> {
    hover
        .affordances()
        .iter()
        .filter_map(|a| match a.affordance {
            Affordance::Arrow(d) => Some(d),
            _ => None,
        })
        .collect()
}

// =============================================================
// Dwell gating
// =============================================================

#[test]
fn first_move_arms_update_timer_only() {
    let mut fx = Fixture::new();
    let v = fx.add("", 100.0, 100.0, 80.0, 40.0);
    let view = fx.view();
    let env = env_for(&fx, &view);
    let mut hover = icons();
    let mut sched = Scheduler::new();
    hover.pointer_moved(&env, &mut sched, 0, Some(v), pt(140.0, 120.0));
    assert!(!hover.is_visible());
    assert_eq!(sched.due_at(TimerPurpose::HoverUpdate), Some(510));
}

#[test]
fn timer_shows_arrows_after_update_delay() {
    let mut fx = Fixture::new();
    let v = fx.add("", 100.0, 100.0, 80.0, 40.0);
    let (hover, _) = shown(&fx, v);
    assert_eq!(hover.current(), Some(v));
    assert_eq!(arrows(&hover), Direction::ALL.to_vec());
    assert!(hover.affordances().iter().any(|a| a.affordance == Affordance::DragHandle));
    assert!(hover.affordances().iter().all(|a| a.opacity == 100));
}

#[test]
fn moving_on_target_waits_for_update_delay() {
    let mut fx = Fixture::new();
    let v = fx.add("", 100.0, 100.0, 80.0, 40.0);
    let view = fx.view();
    let env = env_for(&fx, &view);
    let mut hover = icons();
    let mut sched = Scheduler::new();
    hover.pointer_moved(&env, &mut sched, 0, Some(v), pt(140.0, 120.0));
    hover.pointer_moved(&env, &mut sched, 100, Some(v), pt(141.0, 120.0));
    hover.pointer_moved(&env, &mut sched, 150, Some(v), pt(142.0, 120.0));
    hover.pointer_moved(&env, &mut sched, 450, Some(v), pt(143.0, 120.0));
    assert!(!hover.is_visible());
    hover.pointer_moved(&env, &mut sched, 501, Some(v), pt(144.0, 120.0));
    assert!(hover.is_visible());
    assert_eq!(hover.current(), Some(v));
}

#[test]
fn moving_to_new_target_hides_old_arrows_until_due() {
    let mut fx = Fixture::new();
    let v = fx.add("", 100.0, 100.0, 80.0, 40.0);
    let w = fx.add("", 400.0, 300.0, 80.0, 40.0);
    let (mut hover, mut sched) = shown(&fx, v);
    let view = fx.view();
    let env = env_for(&fx, &view);
    hover.pointer_moved(&env, &mut sched, 600, Some(w), pt(440.0, 320.0));
    hover.pointer_moved(&env, &mut sched, 800, Some(w), pt(441.0, 320.0));
    assert!(!hover.is_visible());
    assert_eq!(sched.due_at(TimerPurpose::HoverUpdate), Some(1_110));
    assert_eq!(sched.fire_due(1_110).len(), 1);
    hover.timer_fired(&env, &mut sched, 1_110);
    assert_eq!(hover.current(), Some(w));
}

#[test]
fn locked_vertex_gets_no_arrows() {
    let mut fx = Fixture::new();
    let v = fx.add("locked=1", 100.0, 100.0, 80.0, 40.0);
    let view = fx.view();
    let env = env_for(&fx, &view);
    let mut hover = icons();
    let mut sched = Scheduler::new();
    hover.pointer_moved(&env, &mut sched, 0, Some(v), pt(140.0, 120.0));
    hover.pointer_moved(&env, &mut sched, 1_000, Some(v), pt(140.0, 120.0));
    assert!(!hover.is_visible());
    assert!(sched.is_idle());
}

#[test]
fn quick_exit_outside_box_resets() {
    let mut fx = Fixture::new();
    let v = fx.add("", 100.0, 100.0, 80.0, 40.0);
    let (mut hover, mut sched) = shown(&fx, v);
    let view = fx.view();
    let env = env_for(&fx, &view);
    hover.pointer_moved(&env, &mut sched, 520, None, pt(500.0, 500.0));
    assert!(!hover.is_visible());
    assert_eq!(hover.current(), None);
}

#[test]
fn pointer_on_arrow_keeps_arrows_and_activates_it() {
    let mut fx = Fixture::new();
    let v = fx.add("", 100.0, 100.0, 80.0, 40.0);
    let (mut hover, mut sched) = shown(&fx, v);
    let north = hover.affordances().iter().find(|a| a.affordance == Affordance::Arrow(Direction::North)).unwrap().bounds;
    let view = fx.view();
    let env = env_for(&fx, &view);
    hover.pointer_moved(&env, &mut sched, 600, None, north.center());
    assert!(hover.is_visible());
    assert_eq!(hover.active_affordance(), Some(Affordance::Arrow(Direction::North)));
}

#[test]
fn cancel_clears_timer_and_state() {
    let mut fx = Fixture::new();
    let v = fx.add("", 100.0, 100.0, 80.0, 40.0);
    let view = fx.view();
    let env = env_for(&fx, &view);
    let mut hover = icons();
    let mut sched = Scheduler::new();
    hover.pointer_moved(&env, &mut sched, 0, Some(v), pt(140.0, 120.0));
    hover.cancel(&mut sched);
    assert!(sched.is_idle());
    hover.timer_fired(&env, &mut sched, 510);
    assert!(!hover.is_visible());
}

// =============================================================
// Layout
// =============================================================

#[test]
fn arrows_sit_symmetrically_outside_decorated_bounds() {
    let mut fx = Fixture::new();
    let v = fx.add("", 100.0, 100.0, 80.0, 40.0);
    let (hover, _) = shown(&fx, v);
    let find = |d| hover.affordances().iter().find(|a| a.affordance == Affordance::Arrow(d)).unwrap().bounds;
    assert_eq!(find(Direction::North), Rect::new(127.0, 80.0, 26.0, 14.0));
    assert_eq!(find(Direction::South), Rect::new(127.0, 146.0, 26.0, 14.0));
    assert_eq!(find(Direction::East), Rect::new(186.0, 107.0, 14.0, 26.0));
    assert_eq!(find(Direction::West), Rect::new(80.0, 107.0, 14.0, 26.0));
    assert_eq!(hover.bbox(), Some(Rect::new(70.0, 70.0, 140.0, 100.0)));
}

#[test]
fn drag_handle_sits_on_top_right_corner() {
    let mut fx = Fixture::new();
    let v = fx.add("", 100.0, 100.0, 80.0, 40.0);
    let (hover, _) = shown(&fx, v);
    let handle = hover.affordances().iter().find(|a| a.affordance == Affordance::DragHandle).unwrap();
    assert_eq!(handle.bounds.center(), pt(186.0, 94.0));
}

#[test]
fn small_neighbour_hides_arrow() {
    let mut fx = Fixture::new();
    let v = fx.add("", 100.0, 100.0, 80.0, 40.0);
    fx.add("", 190.0, 100.0, 40.0, 40.0);
    let (hover, _) = shown(&fx, v);
    assert_eq!(arrows(&hover), vec![Direction::North, Direction::South, Direction::West]);
}

#[test]
fn large_neighbour_does_not_hide_arrow() {
    let mut fx = Fixture::new();
    let v = fx.add("", 100.0, 100.0, 80.0, 40.0);
    fx.add("", 190.0, 0.0, 400.0, 400.0);
    let (hover, _) = shown(&fx, v);
    assert!(arrows(&hover).contains(&Direction::East));
}

#[test]
fn shape_under_every_probe_is_background() {
    let mut fx = Fixture::new();
    fx.add("", 80.0, 80.0, 120.0, 80.0);
    let v = fx.add("", 100.0, 100.0, 80.0, 40.0);
    let (hover, _) = shown(&fx, v);
    assert_eq!(arrows(&hover).len(), 4);
}

#[test]
fn collision_check_can_be_disabled() {
    let mut fx = Fixture::new();
    let v = fx.add("", 100.0, 100.0, 80.0, 40.0);
    fx.add("", 190.0, 100.0, 40.0, 40.0);
    let view = fx.view();
    let env = env_for(&fx, &view);
    let config = HoverConfig { check_collisions: false, ..HoverConfig::default() };
    let mut hover = HoverIcons::new(config, GRAPH_TOLERANCE_PX);
    let mut sched = Scheduler::new();
    hover.pointer_moved(&env, &mut sched, 0, Some(v), pt(140.0, 120.0));
    hover.timer_fired(&env, &mut sched, 510);
    assert_eq!(arrows(&hover).len(), 4);
}

#[test]
fn eastwest_constraint_shows_horizontal_arrows() {
    let mut fx = Fixture::new();
    let v = fx.add("portConstraint=eastwest", 100.0, 100.0, 80.0, 40.0);
    let (hover, _) = shown(&fx, v);
    assert_eq!(arrows(&hover), vec![Direction::East, Direction::West]);
}

#[test]
fn selected_target_arrows_clear_rotation_handle() {
    let mut fx = Fixture::new();
    let v = fx.add("", 100.0, 100.0, 80.0, 40.0);
    fx.selection.set(vec![v]);
    let (hover, _) = shown(&fx, v);
    let north = hover.affordances().iter().find(|a| a.affordance == Affordance::Arrow(Direction::North)).unwrap();
    assert!(north.bounds.bottom() <= 100.0 - crate::consts::ROTATE_HANDLE_OFFSET_PX);
}

#[test]
fn repaint_resets_when_target_removed() {
    let mut fx = Fixture::new();
    let v = fx.add("", 100.0, 100.0, 80.0, 40.0);
    let (mut hover, _) = shown(&fx, v);
    fx.doc.remove_cells(&[v], true).unwrap();
    let view = fx.view();
    hover.repaint(&env_for(&fx, &view));
    assert!(!hover.is_visible());
    assert_eq!(hover.current(), None);
}

// =============================================================
// Press and click
// =============================================================

#[test]
fn press_on_arrow_activates_and_freezes_hover() {
    let mut fx = Fixture::new();
    let v = fx.add("", 100.0, 100.0, 80.0, 40.0);
    let (mut hover, mut sched) = shown(&fx, v);
    assert_eq!(hover.press(pt(193.0, 120.0)), Some(Affordance::Arrow(Direction::East)));
    assert!(hover.is_active());

    let view = fx.view();
    let env = env_for(&fx, &view);
    hover.pointer_moved(&env, &mut sched, 700, None, pt(900.0, 900.0));
    assert!(hover.is_visible());

    hover.release();
    assert!(!hover.is_active());
}

#[test]
fn press_off_affordance_is_none() {
    let mut fx = Fixture::new();
    let v = fx.add("", 100.0, 100.0, 80.0, 40.0);
    let (mut hover, _) = shown(&fx, v);
    assert_eq!(hover.press(pt(600.0, 600.0)), None);
    assert!(!hover.is_active());
}

#[test]
fn click_clones_target_in_direction() {
    let mut fx = Fixture::new();
    let v = fx.add("ellipse", 100.0, 100.0, 80.0, 40.0);
    let (hover, _) = shown(&fx, v);
    let view = fx.view();
    let plan = hover.click(&env_for(&fx, &view), Direction::East).unwrap();
    match plan {
        CommitPlan::Connect { source, direction, payload, geometry, placement, .. } => {
            assert_eq!(source, v);
            assert_eq!(direction, Direction::East);
            assert_eq!(payload.len(), 1);
            assert_ne!(payload[0].id, v);
            assert_eq!(payload[0].style.names(), ["ellipse".to_owned()]);
            assert_eq!(geometry.bounds(), Rect::new(260.0, 100.0, 80.0, 40.0));
            assert_eq!(placement.parent, fx.doc.default_parent());
        }
        other => panic!("unexpected plan {other:?}"),
    }
}

#[test]
fn click_connects_existing_neighbour() {
    let mut fx = Fixture::new();
    let v = fx.add("", 100.0, 100.0, 80.0, 40.0);
    let w = fx.add("", 260.0, 100.0, 80.0, 40.0);
    let (hover, _) = shown(&fx, v);
    let view = fx.view();
    let plan = hover.click(&env_for(&fx, &view), Direction::East).unwrap();
    assert!(matches!(plan, CommitPlan::ConnectExisting { source, target, .. } if source == v && target == w));
}

#[test]
fn click_without_target_is_none() {
    let fx = Fixture::new();
    let view = fx.view();
    assert!(icons().click(&env_for(&fx, &view), Direction::North).is_none());
}

// =============================================================
// ConnectDrag
// =============================================================

#[test]
fn connect_drag_onto_vertex_connects_existing() {
    let mut fx = Fixture::new();
    let v = fx.add("", 100.0, 100.0, 80.0, 40.0);
    let w = fx.add("", 300.0, 100.0, 80.0, 40.0);
    let view = fx.view();
    let mut drag = ConnectDrag::new(v, Some(Direction::East), pt(193.0, 120.0));
    drag.current = pt(340.0, 120.0);
    assert_eq!(drag.target(&view), Some(w));

    let overlay = drag.overlay(&view);
    assert_eq!(overlay.preview.connector, Some((pt(140.0, 120.0), pt(340.0, 120.0))));
    assert_eq!(overlay.highlight, Some(Rect::new(300.0, 100.0, 80.0, 40.0)));

    let plan = drag.finish(&env_for(&fx, &view)).unwrap();
    assert!(matches!(plan, CommitPlan::ConnectExisting { target, .. } if target == w));
}

#[test]
fn connect_drag_never_targets_source() {
    let mut fx = Fixture::new();
    let v = fx.add("", 100.0, 100.0, 80.0, 40.0);
    let view = fx.view();
    let mut drag = ConnectDrag::new(v, None, pt(186.0, 94.0));
    drag.current = pt(140.0, 120.0);
    assert_eq!(drag.target(&view), None);
}

#[test]
fn connect_drag_into_space_clones_at_pointer() {
    let mut fx = Fixture::new();
    let v = fx.add("", 100.0, 100.0, 80.0, 40.0);
    let view = fx.view();
    let mut drag = ConnectDrag::new(v, None, pt(186.0, 94.0));
    drag.current = pt(400.0, 300.0);
    match drag.finish(&env_for(&fx, &view)).unwrap() {
        CommitPlan::Connect { direction, geometry, .. } => {
            assert_eq!(direction, Direction::East);
            assert_eq!(geometry.bounds(), Rect::new(360.0, 280.0, 80.0, 40.0));
        }
        other => panic!("unexpected plan {other:?}"),
    }
}

#[test]
fn connect_drag_from_removed_source_is_none() {
    let mut fx = Fixture::new();
    let v = fx.add("", 100.0, 100.0, 80.0, 40.0);
    fx.doc.remove_cells(&[v], true).unwrap();
    let view = fx.view();
    let mut drag = ConnectDrag::new(v, None, pt(0.0, 0.0));
    drag.current = pt(400.0, 300.0);
    assert!(drag.finish(&env_for(&fx, &view)).is_none());
}
