use super::*;

fn long_press(id: &str) -> TimerTask {
    TimerTask::LongPress { id: id.to_owned() }
}

#[test]
fn new_registry_is_empty() {
    let timers = Timers::new();
    assert!(timers.is_empty());
    assert_eq!(timers.len(), 0);
}

#[test]
fn handles_are_unique() {
    let mut timers = Timers::new();
    let a = timers.schedule(100.0, TimerTask::TransitionEnd);
    let b = timers.schedule(100.0, TimerTask::TransitionEnd);
    assert_ne!(a, b);
}

#[test]
fn task_does_not_fire_early() {
    let mut timers = Timers::new();
    timers.schedule(500.0, long_press("t1"));
    assert!(timers.fire_due(499.9).is_empty());
    assert_eq!(timers.len(), 1);
}

#[test]
fn task_fires_at_due_time_once() {
    let mut timers = Timers::new();
    let h = timers.schedule(500.0, long_press("t1"));
    let fired = timers.fire_due(500.0);
    assert_eq!(fired, vec![(h, long_press("t1"))]);
    assert!(timers.fire_due(10_000.0).is_empty());
}

#[test]
fn cancelled_task_never_fires() {
    let mut timers = Timers::new();
    let mut slot = Some(timers.schedule(500.0, long_press("t1")));
    assert!(timers.cancel(&mut slot));
    assert!(slot.is_none());
    assert!(timers.fire_due(1_000.0).is_empty());
}

#[test]
fn cancel_empty_slot_is_noop() {
    let mut timers = Timers::new();
    let mut slot = None;
    assert!(!timers.cancel(&mut slot));
}

#[test]
fn cancel_after_fire_reports_nothing_pending() {
    let mut timers = Timers::new();
    let h = timers.schedule(10.0, TimerTask::TransitionEnd);
    timers.fire_due(20.0);
    let mut slot = Some(h);
    assert!(!timers.cancel(&mut slot));
    assert!(!timers.is_pending(h));
}

#[test]
fn fires_in_due_order_then_schedule_order() {
    let mut timers = Timers::new();
    let late = timers.schedule(300.0, long_press("late"));
    let first = timers.schedule(100.0, long_press("first"));
    let second = timers.schedule(100.0, long_press("second"));
    let fired: Vec<TimerHandle> = timers.fire_due(1_000.0).into_iter().map(|(h, _)| h).collect();
    assert_eq!(fired, vec![first, second, late]);
}

#[test]
fn partial_fire_keeps_future_tasks() {
    let mut timers = Timers::new();
    timers.schedule(100.0, long_press("now"));
    let later = timers.schedule(900.0, TimerTask::TransitionEnd);
    assert_eq!(timers.fire_due(150.0).len(), 1);
    assert!(timers.is_pending(later));
}

#[test]
fn clear_drops_everything() {
    let mut timers = Timers::new();
    timers.schedule(1.0, TimerTask::TransitionEnd);
    timers.schedule(2.0, long_press("x"));
    timers.clear();
    assert!(timers.fire_due(f64::MAX).is_empty());
}
