//! Element manipulation: move and 8-handle resize sessions with grid snapping.
//!
//! A session captures the element's pose and the pointer's world position at
//! press time. Every move event recomputes the pose from those captured values
//! and the total pointer delta, never from the previous event, so rounding
//! never accumulates and snapping is stable under jitter.

#[cfg(test)]
#[path = "manipulate_test.rs"]
mod manipulate_test;

use crate::camera::Point;
use crate::consts::MIN_ELEMENT_SIZE;
use crate::doc::{ElementId, PlacedElement, Pose};
use crate::hit::ResizeAnchor;

/// Round `value` to the nearest multiple of `grid`. A non-positive grid disables snapping.
#[must_use]
pub fn snap(value: f64, grid: f64) -> f64 {
    if grid <= 0.0 || !grid.is_finite() {
        return value;
    }
    (value / grid).round() * grid
}

/// Snap a width or height, never going below [`MIN_ELEMENT_SIZE`].
///
/// The value is floored at the minimum first; if rounding then lands below the
/// minimum, the smallest grid multiple at or above it is used instead.
#[must_use]
pub fn snap_dimension(value: f64, grid: f64) -> f64 {
    let floored = value.max(MIN_ELEMENT_SIZE);
    let snapped = snap(floored, grid);
    if snapped >= MIN_ELEMENT_SIZE {
        snapped
    } else {
        (MIN_ELEMENT_SIZE / grid).ceil() * grid
    }
}

/// Pose after dragging the whole element by `(dx, dy)` world units.
#[must_use]
pub fn moved_pose(start: &Pose, dx: f64, dy: f64, grid: f64) -> Pose {
    Pose { x: snap(start.x + dx, grid), y: snap(start.y + dy, grid), ..*start }
}

/// Pose after dragging `anchor` by `(dx, dy)` world units.
///
/// East/south handles grow the box; west/north handles shrink it and shift the
/// origin so the opposite edge stays exactly where it was. Edges the handle
/// does not touch are left alone.
#[must_use]
pub fn resized_pose(start: &Pose, anchor: ResizeAnchor, dx: f64, dy: f64, grid: f64) -> Pose {
    let mut pose = *start;

    if anchor.moves_east() {
        pose.width = snap_dimension(start.width + dx, grid);
    } else if anchor.moves_west() {
        let right = start.x + start.width;
        pose.width = snap_dimension(start.width - dx, grid);
        pose.x = right - pose.width;
    }

    if anchor.moves_south() {
        pose.height = snap_dimension(start.height + dy, grid);
    } else if anchor.moves_north() {
        let bottom = start.y + start.height;
        pose.height = snap_dimension(start.height - dy, grid);
        pose.y = bottom - pose.height;
    }

    pose
}

/// Normalize a rotation in degrees into `[0, 360)`.
#[must_use]
pub fn normalize_rotation(deg: f64) -> f64 {
    if !deg.is_finite() {
        return 0.0;
    }
    let r = deg.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs.
    if r >= 360.0 { 0.0 } else { r }
}

/// What an active session does with pointer movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionKind {
    Move,
    Resize(ResizeAnchor),
}

/// Transient state between pointer-down and pointer-up on an element.
#[derive(Debug, Clone, PartialEq)]
pub struct ManipulationSession {
    pub kind: SessionKind,
    /// Element being manipulated.
    pub id: ElementId,
    /// World-space pointer position at press time.
    pub start_world: Point,
    /// Element pose at press time.
    pub start_pose: Pose,
}

impl ManipulationSession {
    /// Start a session on `el`. Locked elements never start one.
    #[must_use]
    pub fn begin(el: &PlacedElement, kind: SessionKind, start_world: Point) -> Option<Self> {
        if el.locked {
            return None;
        }
        Some(Self { kind, id: el.id.clone(), start_world, start_pose: el.pose() })
    }

    /// Pose for the pointer currently at `world`.
    #[must_use]
    pub fn pose_at(&self, world: Point, grid: f64) -> Pose {
        let dx = world.x - self.start_world.x;
        let dy = world.y - self.start_world.y;
        match self.kind {
            SessionKind::Move => moved_pose(&self.start_pose, dx, dy, grid),
            SessionKind::Resize(anchor) => resized_pose(&self.start_pose, anchor, dx, dy, grid),
        }
    }

    /// CSS cursor for the duration of the session.
    #[must_use]
    pub fn cursor(&self) -> &'static str {
        match self.kind {
            SessionKind::Move => "grabbing",
            SessionKind::Resize(anchor) => anchor.cursor(),
        }
    }
}
