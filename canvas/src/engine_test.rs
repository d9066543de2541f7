#![allow(clippy::clone_on_copy, clippy::float_cmp)]

use super::*;
use crate::doc::{ElementCategory, ShapeFamily};
use crate::hit::ResizeAnchor;

// =============================================================
// Helpers
// =============================================================

const EPSILON: f64 = 1e-9;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn element(id: &str, category: ElementCategory, x: f64, y: f64, w: f64, h: f64) -> PlacedElement {
    PlacedElement {
        id: id.to_owned(),
        category,
        shape: ShapeFamily::Rectangle,
        template_id: None,
        label: String::new(),
        x,
        y,
        width: w,
        height: h,
        rotation: 0.0,
        opacity: 1.0,
        capacity: None,
        locked: false,
        section: None,
    }
}

fn table(id: &str, x: f64, y: f64, w: f64, h: f64) -> PlacedElement {
    let mut el = element(id, ElementCategory::Table, x, y, w, h);
    el.capacity = Some(4);
    el
}

/// Core with one 80×60 table at (100, 100) and an 800×600 viewport.
fn core_with_table() -> EngineCore {
    let mut core = EngineCore::new();
    core.set_viewport(800.0, 600.0, 1.0);
    core.load_elements(vec![table("t1", 100.0, 100.0, 80.0, 60.0)]).unwrap();
    core
}

fn round_template() -> ElementTemplate {
    ElementTemplate {
        id: "round-4".into(),
        name: "Round 4-top".into(),
        category: ElementCategory::Table,
        shape: ShapeFamily::Circle,
        default_width: 80.0,
        default_height: 80.0,
        capacity: Some(4),
    }
}

fn no_modifiers() -> Modifiers {
    Modifiers::default()
}

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

fn touch(id: i32, x: f64, y: f64) -> Touch {
    Touch { id, point: pt(x, y) }
}

fn key(name: &str) -> Key {
    Key(name.to_owned())
}

fn down(core: &mut EngineCore, x: f64, y: f64, now: f64) -> Vec<Action> {
    core.on_pointer_down(pt(x, y), Button::Primary, no_modifiers(), now)
}

fn drag_to(core: &mut EngineCore, x: f64, y: f64, now: f64) -> Vec<Action> {
    core.on_pointer_move(pt(x, y), no_modifiers(), now)
}

fn up(core: &mut EngineCore, x: f64, y: f64, now: f64) -> Vec<Action> {
    core.on_pointer_up(pt(x, y), Button::Primary, no_modifiers(), now)
}

fn has_action<F>(actions: &[Action], pred: F) -> bool
where
    F: Fn(&Action) -> bool,
{
    actions.iter().any(pred)
}

fn updated_pose(actions: &[Action], id: &str) -> Option<Pose> {
    actions.iter().find_map(|a| match a {
        Action::ElementUpdated { id: updated, pose } if updated == id => Some(*pose),
        _ => None,
    })
}

fn has_tap(actions: &[Action]) -> bool {
    has_action(actions, |a| matches!(a, Action::ElementTapped { .. } | Action::CanvasTapped { .. }))
}

// =============================================================
// Construction and data inputs
// =============================================================

#[test]
fn core_new_is_empty_and_idle() {
    let core = EngineCore::new();
    assert!(core.selection().is_none());
    assert!(core.input.is_idle());
    assert!(core.store.is_empty());
    assert!(!core.is_transitioning());
    assert_eq!(core.mode, CanvasMode::Edit);
}

#[test]
fn core_default_view_state() {
    let core = EngineCore::new();
    assert_eq!(core.view_state(), CanvasViewState { zoom: 1.0, pan_x: 0.0, pan_y: 0.0, grid_size: 10.0 });
}

#[test]
fn load_with_duplicate_ids_keeps_previous_list() {
    let mut core = core_with_table();
    let err = core.load_elements(vec![table("a", 0.0, 0.0, 50.0, 50.0), table("a", 60.0, 0.0, 50.0, 50.0)]);
    assert!(matches!(err, Err(CanvasError::DuplicateElementId(id)) if id == "a"));
    assert!(core.element("t1").is_some());
}

#[test]
fn reload_drops_stale_selection() {
    let mut core = core_with_table();
    core.ui.selected_id = Some("t1".into());
    core.load_elements(vec![table("t2", 0.0, 0.0, 50.0, 50.0)]).unwrap();
    assert!(core.selection().is_none());
}

#[test]
fn load_plan_json_accepts_wrapped_blob() {
    let mut core = EngineCore::new();
    let blob = serde_json::json!({
        "version": 3,
        "elements": [{ "id": "bar", "category": "fixture", "shape": "rectangle", "x": 0, "y": 0, "width": 200, "height": 40 }]
    });
    core.load_plan_json(&blob).unwrap();
    assert_eq!(core.store.len(), 1);
}

#[test]
fn external_remove_clears_selection() {
    let mut core = core_with_table();
    core.ui.selected_id = Some("t1".into());
    let actions = core.remove_element("t1");
    assert!(actions.contains(&Action::SelectionChanged(None)));
    assert!(core.store.is_empty());
    assert!(core.remove_element("t1").is_empty());
}

// =============================================================
// Panning
// =============================================================

#[test]
fn press_on_empty_floor_pans() {
    let mut core = core_with_table();
    let actions = down(&mut core, 500.0, 500.0, 0.0);
    assert!(matches!(core.input, InputState::Panning { .. }));
    assert!(actions.contains(&Action::SetCursor("grabbing".into())));

    let actions = drag_to(&mut core, 530.0, 480.0, 16.0);
    assert_eq!((core.camera.pan_x, core.camera.pan_y), (30.0, -20.0));
    assert!(has_action(&actions, |a| matches!(a, Action::ViewChanged(v) if v.pan_x == 30.0)));

    up(&mut core, 530.0, 480.0, 32.0);
    assert!(core.input.is_idle());
}

#[test]
fn pan_is_absolute_from_gesture_start() {
    let mut core = core_with_table();
    core.camera.pan_x = 10.0;
    down(&mut core, 500.0, 500.0, 0.0);
    drag_to(&mut core, 600.0, 500.0, 10.0);
    drag_to(&mut core, 520.0, 500.0, 20.0);
    assert_eq!(core.camera.pan_x, 30.0);
}

#[test]
fn middle_button_pans_even_over_element() {
    let mut core = core_with_table();
    core.on_pointer_down(pt(120.0, 120.0), Button::Middle, no_modifiers(), 0.0);
    assert!(matches!(core.input, InputState::Panning { .. }));
    assert!(core.selection().is_none());
}

#[test]
fn space_held_turns_primary_press_into_pan() {
    let mut core = core_with_table();
    core.on_key_down(&key(" "), no_modifiers());
    down(&mut core, 120.0, 120.0, 0.0);
    assert!(matches!(core.input, InputState::Panning { .. }));
    assert!(core.selection().is_none());
    up(&mut core, 120.0, 120.0, 10.0);

    core.on_key_up(&key(" "), no_modifiers());
    down(&mut core, 120.0, 120.0, 20.0);
    assert!(matches!(core.input, InputState::Manipulating(_)));
}

#[test]
fn alt_press_pans() {
    let mut core = core_with_table();
    core.on_pointer_down(pt(120.0, 120.0), Button::Primary, Modifiers { alt: true }, 0.0);
    assert!(matches!(core.input, InputState::Panning { .. }));
}

#[test]
fn secondary_button_does_nothing() {
    let mut core = core_with_table();
    let actions = core.on_pointer_down(pt(120.0, 120.0), Button::Secondary, no_modifiers(), 0.0);
    assert!(actions.is_empty());
    assert!(core.input.is_idle());
}

// =============================================================
// Move sessions
// =============================================================

#[test]
fn press_on_body_selects_and_starts_move() {
    let mut core = core_with_table();
    let actions = down(&mut core, 120.0, 120.0, 0.0);
    assert_eq!(core.selection(), Some("t1"));
    assert!(actions.contains(&Action::SelectionChanged(Some("t1".into()))));
    match &core.input {
        InputState::Manipulating(session) => {
            assert_eq!(session.kind, SessionKind::Move);
            assert_eq!(session.start_pose.x, 100.0);
            assert_eq!(session.start_world, pt(120.0, 120.0));
        }
        other => panic!("expected a move session, got {other:?}"),
    }
}

#[test]
fn move_snaps_to_grid_and_reports_on_release() {
    let mut core = core_with_table();
    down(&mut core, 120.0, 120.0, 0.0);
    drag_to(&mut core, 143.0, 127.0, 100.0);
    let el = core.element("t1").unwrap();
    assert_eq!((el.x, el.y), (120.0, 110.0));

    let actions = up(&mut core, 143.0, 127.0, 400.0);
    let pose = updated_pose(&actions, "t1").unwrap();
    assert_eq!((pose.x, pose.y, pose.width, pose.height), (120.0, 110.0, 80.0, 60.0));
    assert!(!has_tap(&actions));
    assert!(core.input.is_idle());
}

#[test]
fn move_under_zoom_uses_world_delta() {
    let mut core = core_with_table();
    core.camera = Camera { pan_x: 0.0, pan_y: 0.0, zoom: 2.0 };
    down(&mut core, 240.0, 240.0, 0.0);
    drag_to(&mut core, 280.0, 240.0, 50.0);
    assert_eq!(core.element("t1").unwrap().x, 120.0);
}

#[test]
fn release_without_movement_reports_nothing() {
    let mut core = core_with_table();
    down(&mut core, 120.0, 120.0, 0.0);
    let actions = up(&mut core, 120.0, 120.0, 400.0);
    assert!(updated_pose(&actions, "t1").is_none());
}

#[test]
fn locked_element_selects_but_never_moves() {
    let mut core = EngineCore::new();
    let mut locked = table("t1", 100.0, 100.0, 80.0, 60.0);
    locked.locked = true;
    core.load_elements(vec![locked]).unwrap();

    down(&mut core, 120.0, 120.0, 0.0);
    assert_eq!(core.selection(), Some("t1"));
    assert!(core.input.is_idle());
    drag_to(&mut core, 200.0, 200.0, 100.0);
    let actions = up(&mut core, 200.0, 200.0, 400.0);
    assert_eq!(core.element("t1").unwrap().x, 100.0);
    assert!(updated_pose(&actions, "t1").is_none());
}

#[test]
fn only_one_session_at_a_time() {
    let mut core = core_with_table();
    down(&mut core, 120.0, 120.0, 0.0);
    let actions = down(&mut core, 500.0, 500.0, 10.0);
    assert!(actions.is_empty());
    assert!(matches!(core.input, InputState::Manipulating(_)));
}

// =============================================================
// Resize sessions
// =============================================================

#[test]
fn se_handle_scenario() {
    let mut core = core_with_table();
    core.ui.selected_id = Some("t1".into());
    down(&mut core, 180.0, 160.0, 0.0);
    assert!(matches!(
        &core.input,
        InputState::Manipulating(s) if s.kind == SessionKind::Resize(ResizeAnchor::Se)
    ));
    drag_to(&mut core, 200.0, 170.0, 50.0);
    let actions = up(&mut core, 200.0, 170.0, 400.0);
    let pose = updated_pose(&actions, "t1").unwrap();
    assert_eq!((pose.x, pose.y, pose.width, pose.height), (100.0, 100.0, 100.0, 70.0));
}

#[test]
fn w_handle_keeps_right_edge() {
    let mut core = core_with_table();
    core.ui.selected_id = Some("t1".into());
    down(&mut core, 100.0, 130.0, 0.0);
    drag_to(&mut core, 73.0, 130.0, 50.0);
    let el = core.element("t1").unwrap();
    assert_eq!(el.width, 110.0);
    assert!(approx_eq(el.x + el.width, 180.0));
    assert_eq!(el.y, 100.0);
}

#[test]
fn resize_never_goes_below_minimum() {
    let mut core = core_with_table();
    core.ui.selected_id = Some("t1".into());
    down(&mut core, 180.0, 160.0, 0.0);
    drag_to(&mut core, -400.0, -400.0, 50.0);
    let el = core.element("t1").unwrap();
    assert!(el.width >= 20.0 && el.height >= 20.0);
    assert_eq!((el.x, el.y), (100.0, 100.0));
}

#[test]
fn handle_cursor_on_hover() {
    let mut core = core_with_table();
    core.ui.selected_id = Some("t1".into());
    let actions = drag_to(&mut core, 180.0, 130.0, 0.0);
    assert!(actions.contains(&Action::SetCursor("ew-resize".into())));
    let actions = drag_to(&mut core, 140.0, 130.0, 10.0);
    assert!(actions.contains(&Action::SetCursor("move".into())));
    // Unchanged cursor is not re-sent.
    assert!(drag_to(&mut core, 141.0, 130.0, 20.0).is_empty());
}

// =============================================================
// Tap / long press
// =============================================================

#[test]
fn quick_press_on_element_taps() {
    let mut core = core_with_table();
    down(&mut core, 120.0, 120.0, 0.0);
    let actions = up(&mut core, 121.0, 121.0, 120.0);
    assert!(actions.contains(&Action::ElementTapped { id: "t1".into() }));
}

#[test]
fn tap_on_empty_floor_clears_selection() {
    let mut core = core_with_table();
    core.ui.selected_id = Some("t1".into());
    down(&mut core, 500.0, 500.0, 0.0);
    let actions = up(&mut core, 500.0, 500.0, 80.0);
    assert!(actions.contains(&Action::CanvasTapped { world: pt(500.0, 500.0) }));
    assert!(actions.contains(&Action::SelectionChanged(None)));
    assert!(core.selection().is_none());
}

#[test]
fn drag_on_floor_keeps_selection() {
    let mut core = core_with_table();
    core.ui.selected_id = Some("t1".into());
    down(&mut core, 500.0, 500.0, 0.0);
    drag_to(&mut core, 540.0, 500.0, 40.0);
    let actions = up(&mut core, 540.0, 500.0, 80.0);
    assert!(!has_tap(&actions));
    assert_eq!(core.selection(), Some("t1"));
}

#[test]
fn slow_press_is_not_a_tap() {
    let mut core = core_with_table();
    down(&mut core, 500.0, 500.0, 0.0);
    let actions = up(&mut core, 500.0, 500.0, 450.0);
    assert!(!has_tap(&actions));
}

#[test]
fn long_press_fires_once_and_suppresses_tap() {
    let mut core = core_with_table();
    down(&mut core, 120.0, 120.0, 0.0);
    assert!(core.tick(499.0).is_empty());
    let actions = core.tick(500.0);
    assert_eq!(actions, [Action::ElementLongPressed { id: "t1".into() }]);
    assert!(core.tick(2_000.0).is_empty());

    let actions = up(&mut core, 120.0, 120.0, 800.0);
    assert!(!has_tap(&actions));
}

#[test]
fn movement_cancels_long_press() {
    let mut core = core_with_table();
    down(&mut core, 120.0, 120.0, 0.0);
    drag_to(&mut core, 135.0, 120.0, 100.0);
    assert!(core.tick(600.0).is_empty());
    assert!(core.timers.is_empty());
}

#[test]
fn release_cancels_long_press() {
    let mut core = core_with_table();
    down(&mut core, 120.0, 120.0, 0.0);
    up(&mut core, 120.0, 120.0, 100.0);
    assert!(core.timers.is_empty());
    assert!(core.tick(600.0).is_empty());
}

#[test]
fn pointer_leave_cancels_and_keeps_live_pose() {
    let mut core = core_with_table();
    down(&mut core, 120.0, 120.0, 0.0);
    drag_to(&mut core, 160.0, 120.0, 50.0);
    let actions = core.on_pointer_leave();
    assert_eq!(updated_pose(&actions, "t1").unwrap().x, 140.0);
    assert!(core.input.is_idle());
    assert!(core.press.is_none());
    assert!(core.tick(1_000.0).is_empty());

    // Release after leaving is inert.
    let actions = up(&mut core, 160.0, 120.0, 1_100.0);
    assert!(!has_tap(&actions));
    assert!(updated_pose(&actions, "t1").is_none());
}

// =============================================================
// Wheel
// =============================================================

#[test]
fn wheel_zooms_about_cursor() {
    let mut core = core_with_table();
    let actions = core.on_wheel(pt(200.0, 100.0), WheelDelta { dy: -120.0 }, no_modifiers());
    assert!(approx_eq(core.camera.zoom, 1.1));
    let world = core.camera.screen_to_world(pt(200.0, 100.0));
    assert!(approx_eq(world.x, 200.0));
    assert!(approx_eq(world.y, 100.0));
    assert!(has_action(&actions, |a| matches!(a, Action::ViewChanged(_))));
}

#[test]
fn wheel_at_max_zoom_is_noop() {
    let mut core = core_with_table();
    core.camera.zoom = 5.0;
    assert!(core.on_wheel(pt(0.0, 0.0), WheelDelta { dy: -1.0 }, no_modifiers()).is_empty());
}

#[test]
fn wheel_ignored_during_manipulation() {
    let mut core = core_with_table();
    down(&mut core, 120.0, 120.0, 0.0);
    assert!(core.on_wheel(pt(0.0, 0.0), WheelDelta { dy: -1.0 }, no_modifiers()).is_empty());
    assert_eq!(core.camera.zoom, 1.0);
}

// =============================================================
// Touch
// =============================================================

#[test]
fn pinch_scenario_zooms_to_one_and_a_half() {
    let mut core = core_with_table();
    core.on_touch_start(&[touch(1, 100.0, 400.0)], 0.0);
    core.on_touch_start(&[touch(1, 100.0, 400.0), touch(2, 200.0, 400.0)], 10.0);
    assert!(matches!(core.input, InputState::Pinching(_)));

    let actions = core.on_touch_move(&[touch(1, 75.0, 400.0), touch(2, 225.0, 400.0)], 20.0);
    assert!(approx_eq(core.camera.zoom, 1.5));
    let world = core.camera.screen_to_world(pt(150.0, 400.0));
    assert!(approx_eq(world.x, 150.0));
    assert!(approx_eq(world.y, 400.0));
    assert!(has_action(&actions, |a| matches!(a, Action::RenderNeeded)));

    core.on_touch_end(&[touch(2, 225.0, 400.0)], pt(75.0, 400.0), 30.0);
    assert!(core.input.is_idle());
    let actions = core.on_touch_end(&[], pt(225.0, 400.0), 40.0);
    assert!(!has_tap(&actions));
}

#[test]
fn pinch_clamps_zoom() {
    let mut core = core_with_table();
    core.on_touch_start(&[touch(1, 300.0, 300.0), touch(2, 310.0, 300.0)], 0.0);
    core.on_touch_move(&[touch(1, 0.0, 300.0), touch(2, 800.0, 300.0)], 10.0);
    assert_eq!(core.camera.zoom, 5.0);
}

#[test]
fn second_finger_takes_over_manipulation() {
    let mut core = core_with_table();
    core.on_touch_start(&[touch(1, 120.0, 120.0)], 0.0);
    assert!(matches!(core.input, InputState::Manipulating(_)));
    core.on_touch_move(&[touch(1, 150.0, 120.0)], 20.0);

    let actions = core.on_touch_start(&[touch(1, 150.0, 120.0), touch(2, 300.0, 300.0)], 40.0);
    assert_eq!(updated_pose(&actions, "t1").unwrap().x, 130.0);
    assert!(matches!(core.input, InputState::Pinching(_)));
    assert!(core.timers.is_empty());
}

#[test]
fn single_touch_tap_on_element() {
    let mut core = core_with_table();
    core.on_touch_start(&[touch(1, 120.0, 120.0)], 0.0);
    let actions = core.on_touch_end(&[], pt(120.0, 120.0), 90.0);
    assert!(actions.contains(&Action::ElementTapped { id: "t1".into() }));
}

// =============================================================
// Keyboard
// =============================================================

#[test]
fn delete_removes_selected() {
    let mut core = core_with_table();
    core.ui.selected_id = Some("t1".into());
    let actions = core.on_key_down(&key("Delete"), no_modifiers());
    assert!(actions.contains(&Action::ElementDeleted { id: "t1".into() }));
    assert!(core.element("t1").is_none());
    assert!(core.selection().is_none());
}

#[test]
fn delete_ignored_in_text_field() {
    let mut core = core_with_table();
    core.ui.selected_id = Some("t1".into());
    core.set_text_input_focused(true);
    assert!(core.on_key_down(&key("Backspace"), no_modifiers()).is_empty());
    assert!(core.element("t1").is_some());
}

#[test]
fn delete_during_drag_ends_session_first() {
    let mut core = core_with_table();
    down(&mut core, 120.0, 120.0, 0.0);
    let actions = core.on_key_down(&key("Delete"), no_modifiers());
    assert!(actions.contains(&Action::ElementDeleted { id: "t1".into() }));
    assert!(core.input.is_idle());
}

#[test]
fn escape_clears_selection_and_pending_template() {
    let mut core = core_with_table();
    core.ui.selected_id = Some("t1".into());
    core.begin_placement(round_template());
    let actions = core.on_key_down(&key("Escape"), no_modifiers());
    assert!(core.ui.pending_template.is_none());
    assert!(core.selection().is_none());
    assert!(actions.contains(&Action::SelectionChanged(None)));
    assert!(actions.contains(&Action::SetCursor("default".into())));
}

#[test]
fn escape_mid_drag_reports_live_pose() {
    let mut core = core_with_table();
    down(&mut core, 120.0, 120.0, 0.0);
    drag_to(&mut core, 120.0, 150.0, 30.0);
    let actions = core.on_key_down(&key("Escape"), no_modifiers());
    assert_eq!(updated_pose(&actions, "t1").unwrap().y, 130.0);
    assert!(core.input.is_idle());
}

#[test]
fn rotate_key_steps_quarter_turns() {
    let mut core = core_with_table();
    core.ui.selected_id = Some("t1".into());
    let actions = core.on_key_down(&key("r"), no_modifiers());
    assert_eq!(updated_pose(&actions, "t1").unwrap().rotation, 90.0);
    for _ in 0..3 {
        core.on_key_down(&key("R"), no_modifiers());
    }
    assert_eq!(core.element("t1").unwrap().rotation, 0.0);
}

#[test]
fn rotate_ignores_locked() {
    let mut core = EngineCore::new();
    let mut locked = table("t1", 0.0, 0.0, 80.0, 60.0);
    locked.locked = true;
    core.load_elements(vec![locked]).unwrap();
    core.ui.selected_id = Some("t1".into());
    assert!(core.rotate_selected(90.0).is_empty());
}

// =============================================================
// Template placement
// =============================================================

#[test]
fn placement_snaps_top_left_near_release() {
    let mut core = core_with_table();
    let actions = core.begin_placement(round_template());
    assert!(actions.contains(&Action::SetCursor("copy".into())));

    down(&mut core, 303.0, 207.0, 0.0);
    assert!(matches!(core.input, InputState::Placing { .. }));
    let actions = up(&mut core, 303.0, 207.0, 60.0);

    let created = actions
        .iter()
        .find_map(|a| match a {
            Action::ElementCreated(el) => Some(el.clone()),
            _ => None,
        })
        .unwrap();
    assert_eq!((created.x, created.y, created.width, created.height), (260.0, 170.0, 80.0, 80.0));
    assert_eq!(created.template_id.as_deref(), Some("round-4"));
    assert_eq!(core.selection(), Some(created.id.as_str()));
    assert!(core.ui.pending_template.is_none());
    assert_eq!(core.store.len(), 2);
    assert!(!has_tap(&actions));
}

#[test]
fn placement_ids_are_unique() {
    let mut core = EngineCore::new();
    for i in 0..3 {
        core.begin_placement(round_template());
        let x = 100.0 + f64::from(i) * 200.0;
        down(&mut core, x, 100.0, 0.0);
        up(&mut core, x, 100.0, 10.0);
    }
    let mut ids: Vec<&str> = core.store.elements().iter().map(|e| e.id.as_str()).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 3);
}

#[test]
fn pending_placement_still_selects_existing_elements() {
    let mut core = core_with_table();
    core.begin_placement(round_template());
    down(&mut core, 120.0, 120.0, 0.0);
    assert!(matches!(core.input, InputState::Manipulating(_)));
    assert!(core.ui.pending_template.is_some());
}

#[test]
fn placement_keeps_small_templates_on_grid() {
    let mut core = core_with_table();
    core.begin_placement(ElementTemplate { id: "two-top".into(), default_width: 50.0, default_height: 50.0, ..round_template() });
    down(&mut core, 303.0, 207.0, 0.0);
    let actions = up(&mut core, 303.0, 207.0, 60.0);
    let created = actions
        .iter()
        .find_map(|a| match a {
            Action::ElementCreated(el) => Some(el.clone()),
            _ => None,
        })
        .unwrap();
    assert_eq!((created.x, created.y, created.width, created.height), (280.0, 180.0, 50.0, 50.0));
}

#[test]
fn place_template_at_uses_catalog() {
    let mut core = EngineCore::new();
    core.set_catalog(TemplateCatalog::new(vec![round_template()]));
    let actions = core.place_template_at("round-4", pt(55.0, 55.0)).unwrap();
    assert!(has_action(&actions, |a| matches!(a, Action::ElementCreated(el) if el.x == 20.0 && el.y == 20.0)));

    let err = core.place_template_at("booth-6", pt(0.0, 0.0)).unwrap_err();
    assert!(matches!(err, CanvasError::UnknownTemplate(id) if id == "booth-6"));
}

// =============================================================
// Camera operations
// =============================================================

fn two_tables() -> EngineCore {
    let mut core = EngineCore::new();
    core.set_viewport(400.0, 300.0, 1.0);
    let mut a = table("a", 0.0, 0.0, 100.0, 100.0);
    a.section = Some("patio".into());
    core.load_elements(vec![a, table("b", 100.0, 0.0, 100.0, 100.0)]).unwrap();
    core
}

#[test]
fn fit_scenario() {
    let mut core = two_tables();
    let actions = core.fit_to_content(0.0);
    assert!(approx_eq(core.camera.zoom, 1.68));
    assert!(approx_eq(core.camera.pan_x, 32.0));
    assert!(approx_eq(core.camera.pan_y, 66.0));
    // 400 px wide is below the reference width: 0.75 × 400 ms.
    assert!(actions.contains(&Action::CameraTransition { duration_ms: 300.0 }));
    assert!(core.is_transitioning());
}

#[test]
fn fit_twice_is_identical() {
    let mut core = two_tables();
    core.fit_to_content(0.0);
    let first = core.camera;
    core.fit_to_content(0.0);
    assert_eq!(core.camera, first);
}

#[test]
fn fit_on_empty_plan_is_noop() {
    let mut core = EngineCore::new();
    core.set_viewport(400.0, 300.0, 1.0);
    core.camera.pan_x = 17.0;
    assert!(core.fit_to_content(0.0).is_empty());
    assert_eq!(core.camera.pan_x, 17.0);
    assert!(!core.is_transitioning());
}

#[test]
fn transition_refuses_gestures_until_timer() {
    let mut core = two_tables();
    core.fit_to_content(0.0);
    assert!(down(&mut core, 380.0, 280.0, 100.0).is_empty());
    assert!(core.input.is_idle());
    assert!(core.on_wheel(pt(0.0, 0.0), WheelDelta { dy: -1.0 }, no_modifiers()).is_empty());

    assert!(core.tick(299.0).is_empty());
    assert_eq!(core.tick(300.0), [Action::RenderNeeded]);
    assert!(!core.is_transitioning());
    down(&mut core, 380.0, 280.0, 400.0);
    assert!(matches!(core.input, InputState::Panning { .. }));
}

#[test]
fn transition_runs_from_the_operation_clock() {
    let mut core = two_tables();
    down(&mut core, 380.0, 280.0, 1_000.0);
    up(&mut core, 380.0, 280.0, 1_050.0);

    core.fit_to_content(60_000.0);
    assert!(core.tick(60_016.0).is_empty());
    assert!(core.is_transitioning());
    assert!(down(&mut core, 380.0, 280.0, 60_100.0).is_empty());

    assert_eq!(core.tick(60_300.0), [Action::RenderNeeded]);
    assert!(!core.is_transitioning());
}

#[test]
fn host_can_end_transition_early() {
    let mut core = two_tables();
    core.fit_to_content(0.0);
    core.on_transition_end();
    assert!(!core.is_transitioning());
    assert!(core.timers.is_empty());
    assert!(core.tick(10_000.0).is_empty());
    assert!(core.on_transition_end().is_empty());
}

#[test]
fn new_transition_replaces_old_timer() {
    let mut core = two_tables();
    core.zoom_in(1_000.0);
    core.zoom_in(1_000.0);
    assert_eq!(core.timers.len(), 1);
    assert_eq!(core.tick(1_300.0), [Action::RenderNeeded]);
}

#[test]
fn reduced_motion_shortens_transitions() {
    let mut core = EngineCore::with_config(CanvasConfig { reduced_motion: true, ..CanvasConfig::default() }).unwrap();
    core.set_viewport(1920.0, 1080.0, 1.0);
    core.load_elements(vec![table("a", 0.0, 0.0, 100.0, 100.0)]).unwrap();
    let actions = core.fit_to_content(0.0);
    assert!(actions.contains(&Action::CameraTransition { duration_ms: 120.0 }));
}

#[test]
fn inverted_zoom_limits_are_rejected() {
    let err = EngineCore::with_config(CanvasConfig { min_zoom: 3.0, max_zoom: 1.0, ..CanvasConfig::default() }).unwrap_err();
    assert!(matches!(err, CanvasError::InvalidConfig(msg) if msg.contains("min_zoom")));
}

#[test]
fn transition_cancels_active_drag() {
    let mut core = two_tables();
    down(&mut core, 50.0, 50.0, 0.0);
    drag_to(&mut core, 50.0, 80.0, 20.0);
    let actions = core.fit_to_content(0.0);
    assert_eq!(updated_pose(&actions, "a").unwrap().y, 30.0);
    assert!(core.input.is_idle());
}

#[test]
fn focus_section_lands_below_center() {
    let mut core = two_tables();
    core.focus_section("patio", 0.0);
    assert!(approx_eq(core.camera.zoom, 2.36));
    let center = core.camera.world_to_screen(pt(50.0, 50.0));
    assert!(approx_eq(center.x, 200.0));
    assert!(approx_eq(center.y, 190.0));
}

#[test]
fn focus_unknown_section_is_noop() {
    let mut core = two_tables();
    assert!(core.focus_section("rooftop", 0.0).is_empty());
    assert!(core.focus_element("nope", 0.0).is_empty());
}

#[test]
fn focus_element_caps_zoom() {
    let mut core = EngineCore::new();
    core.set_viewport(1280.0, 800.0, 1.0);
    core.load_elements(vec![table("t9", 500.0, 500.0, 40.0, 40.0)]).unwrap();
    core.focus_element("t9", 0.0);
    assert_eq!(core.camera.zoom, 2.5);
}

#[test]
fn zoom_buttons_keep_center() {
    let mut core = core_with_table();
    let center_world = core.camera.screen_to_world(pt(400.0, 300.0));
    core.zoom_in(0.0);
    assert!(approx_eq(core.camera.zoom, 1.2));
    let now = core.camera.screen_to_world(pt(400.0, 300.0));
    assert!(approx_eq(now.x, center_world.x));
    assert!(approx_eq(now.y, center_world.y));

    core.zoom_out(0.0);
    assert!(approx_eq(core.camera.zoom, 1.0));
}

#[test]
fn reset_zoom_returns_to_unit() {
    let mut core = core_with_table();
    core.camera.zoom = 3.0;
    core.reset_zoom(0.0);
    assert_eq!(core.camera.zoom, 1.0);
    core.on_transition_end();
    assert!(core.reset_zoom(0.0).is_empty());
}

// =============================================================
// Live floor map (view mode)
// =============================================================

fn live_map() -> EngineCore {
    let mut core = EngineCore::new();
    core.set_viewport(800.0, 600.0, 1.0);
    core.load_elements(vec![
        element("floor", ElementCategory::Structural, 0.0, 0.0, 600.0, 400.0),
        table("t1", 100.0, 100.0, 80.0, 60.0),
    ])
    .unwrap();
    core.set_mode(CanvasMode::View);
    core
}

#[test]
fn view_mode_press_on_table_pans_and_taps() {
    let mut core = live_map();
    down(&mut core, 120.0, 120.0, 0.0);
    assert!(matches!(core.input, InputState::Panning { .. }));
    assert!(core.selection().is_none());
    let actions = up(&mut core, 120.0, 120.0, 100.0);
    assert!(actions.contains(&Action::ElementTapped { id: "t1".into() }));
}

#[test]
fn view_mode_decorative_geometry_is_floor() {
    let mut core = live_map();
    down(&mut core, 400.0, 300.0, 0.0);
    let actions = up(&mut core, 400.0, 300.0, 100.0);
    assert!(actions.contains(&Action::CanvasTapped { world: pt(400.0, 300.0) }));
}

#[test]
fn view_mode_long_press_on_table() {
    let mut core = live_map();
    down(&mut core, 120.0, 120.0, 0.0);
    assert_eq!(core.tick(500.0), [Action::ElementLongPressed { id: "t1".into() }]);
}

#[test]
fn view_mode_ignores_edit_keys_and_placement() {
    let mut core = live_map();
    core.ui.selected_id = Some("t1".into());
    assert!(core.on_key_down(&key("Delete"), no_modifiers()).is_empty());
    assert!(core.begin_placement(round_template()).is_empty());
    assert!(core.element("t1").is_some());
}

#[test]
fn switching_to_view_clears_selection() {
    let mut core = core_with_table();
    core.ui.selected_id = Some("t1".into());
    let actions = core.set_mode(CanvasMode::View);
    assert!(actions.contains(&Action::SelectionChanged(None)));
    assert!(core.set_mode(CanvasMode::View).is_empty());
}

// =============================================================
// Scene and lifecycle
// =============================================================

#[test]
fn scene_shows_handles_for_unlocked_selection() {
    let mut core = core_with_table();
    core.ui.selected_id = Some("t1".into());
    let scene = core.scene(0.0);
    assert_eq!(scene.nodes.len(), 1);
    assert!(scene.nodes[0].state.selected);
    assert!(scene.selection.unwrap().show_handles);
    assert_eq!(scene.grid_size, 10.0);
}

#[test]
fn live_scene_hides_grid() {
    let core = live_map();
    let scene = core.scene(0.0);
    assert_eq!(scene.grid_size, 0.0);
    assert!(scene.selection.is_none());
    assert_eq!(scene.nodes[0].id, "floor");
}

#[test]
fn set_grid_size_reports_view_state() {
    let mut core = EngineCore::new();
    let actions = core.set_grid_size(25.0);
    assert!(has_action(&actions, |a| matches!(a, Action::ViewChanged(v) if v.grid_size == 25.0)));
}

#[test]
fn teardown_drops_pending_work() {
    let mut core = core_with_table();
    down(&mut core, 120.0, 120.0, 0.0);
    core.teardown();
    assert!(core.timers.is_empty());
    assert!(core.input.is_idle());
    assert!(core.tick(10_000.0).is_empty());
}
