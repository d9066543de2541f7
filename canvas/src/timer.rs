//! Scheduled tasks with explicit handles.
//!
//! The engine runs on the UI thread and has no clock of its own. Work that
//! must happen later (long-press detection, clearing the camera transition
//! flag) is scheduled here with a due time; the host calls
//! [`Timers::fire_due`] (via `EngineCore::tick`) with the current time.
//!
//! Every task is owned by whoever holds its [`TimerHandle`]. Terminating
//! events cancel the handle synchronously, so a cancelled task can never fire
//! late.

#[cfg(test)]
#[path = "timer_test.rs"]
mod timer_test;

use crate::doc::ElementId;

/// Opaque handle to a scheduled task. Handles are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

/// What a task does when it fires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerTask {
    /// The press on this element has been held long enough.
    LongPress { id: ElementId },
    /// The camera transition has run its declared duration.
    TransitionEnd,
}

#[derive(Debug, Clone)]
struct Scheduled {
    handle: TimerHandle,
    due_ms: f64,
    task: TimerTask,
}

/// Pending task registry.
#[derive(Debug, Default)]
pub struct Timers {
    next_id: u64,
    pending: Vec<Scheduled>,
}

impl Timers {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `task` to fire at `due_ms`.
    pub fn schedule(&mut self, due_ms: f64, task: TimerTask) -> TimerHandle {
        self.next_id += 1;
        let handle = TimerHandle(self.next_id);
        self.pending.push(Scheduled { handle, due_ms, task });
        handle
    }

    /// Cancel the task held in `slot`, leaving the slot empty.
    ///
    /// Returns `true` when a still-pending task was removed.
    pub fn cancel(&mut self, slot: &mut Option<TimerHandle>) -> bool {
        let Some(handle) = slot.take() else {
            return false;
        };
        let before = self.pending.len();
        self.pending.retain(|s| s.handle != handle);
        self.pending.len() != before
    }

    /// Whether `handle` is still waiting to fire.
    #[must_use]
    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.pending.iter().any(|s| s.handle == handle)
    }

    /// Remove and return every task due at or before `now_ms`, earliest first.
    /// Tasks with equal due times fire in scheduling order.
    pub fn fire_due(&mut self, now_ms: f64) -> Vec<(TimerHandle, TimerTask)> {
        let (mut due, rest): (Vec<Scheduled>, Vec<Scheduled>) =
            self.pending.drain(..).partition(|s| s.due_ms <= now_ms);
        self.pending = rest;
        due.sort_by(|a, b| a.due_ms.total_cmp(&b.due_ms).then_with(|| a.handle.0.cmp(&b.handle.0)));
        due.into_iter().map(|s| (s.handle, s.task)).collect()
    }

    /// Drop every pending task (canvas teardown).
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Number of pending tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
