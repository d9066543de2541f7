//! Gesture math: pan, pinch, wheel zoom, and tap/drag discrimination.
//!
//! These are the pure pieces of the gesture controller. The state machine that
//! decides which of them applies to an event lives in [`crate::engine`]; each
//! function here maps captured gesture-start values plus the latest input to
//! a new camera, so results never depend on event frequency.

#[cfg(test)]
#[path = "gesture_test.rs"]
mod gesture_test;

use crate::camera::{Camera, Point, zoom_to_point};
use crate::consts::{PINCH_MIN_START_DISTANCE_PX, WHEEL_ZOOM_IN, WHEEL_ZOOM_OUT};
use crate::doc::ElementId;
use crate::input::Touch;
use crate::timer::TimerHandle;

// =============================================================
// Pan
// =============================================================

/// `start_pan + (current - start_screen)`.
#[must_use]
pub fn pan_offset(start_pan: Point, start_screen: Point, current: Point) -> Point {
    Point::new(start_pan.x + (current.x - start_screen.x), start_pan.y + (current.y - start_screen.y))
}

// =============================================================
// Pinch
// =============================================================

/// Values captured when the second touch lands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinchStart {
    /// Touch ids of the two fingers, in landing order.
    pub touch_ids: (i32, i32),
    pub start_distance: f64,
    pub start_zoom: f64,
    pub start_mid: Point,
    pub start_pan: Point,
}

impl PinchStart {
    #[must_use]
    pub fn new(a: Touch, b: Touch, camera: &Camera) -> Self {
        Self {
            touch_ids: (a.id, b.id),
            start_distance: a.point.distance_to(b.point),
            start_zoom: camera.zoom,
            start_mid: a.point.midpoint(b.point),
            start_pan: camera.pan(),
        }
    }

    /// Current positions of this pinch's two fingers, if both are still down.
    #[must_use]
    pub fn find_points(&self, touches: &[Touch]) -> Option<(Point, Point)> {
        let find = |id: i32| touches.iter().find(|t| t.id == id).map(|t| t.point);
        Some((find(self.touch_ids.0)?, find(self.touch_ids.1)?))
    }

    /// Camera for the fingers now at `a` and `b`.
    ///
    /// Zoom follows the distance ratio, anchored at the starting midpoint;
    /// the midpoint's movement then translates the result, so the content
    /// that started under the fingers stays under them.
    #[must_use]
    pub fn camera_for(&self, a: Point, b: Point, min_zoom: f64, max_zoom: f64) -> Camera {
        let zoom = pinch_zoom(self.start_zoom, self.start_distance, a.distance_to(b), min_zoom, max_zoom);
        let anchored = zoom_to_point(self.start_zoom, zoom, self.start_mid, self.start_pan);
        let pan = pan_offset(anchored, self.start_mid, a.midpoint(b));
        Camera { pan_x: pan.x, pan_y: pan.y, zoom }
    }
}

/// `start_zoom * current / start`, clamped. A degenerate start distance keeps the zoom.
#[must_use]
pub fn pinch_zoom(start_zoom: f64, start_distance: f64, current_distance: f64, min_zoom: f64, max_zoom: f64) -> f64 {
    if start_distance < PINCH_MIN_START_DISTANCE_PX || !current_distance.is_finite() {
        return start_zoom.clamp(min_zoom, max_zoom);
    }
    (start_zoom * (current_distance / start_distance)).clamp(min_zoom, max_zoom)
}

// =============================================================
// Wheel
// =============================================================

/// Zoom multiplier for one wheel event, or `None` for a purely horizontal scroll.
#[must_use]
pub fn wheel_factor(dy: f64) -> Option<f64> {
    if dy < 0.0 {
        Some(WHEEL_ZOOM_IN)
    } else if dy > 0.0 {
        Some(WHEEL_ZOOM_OUT)
    } else {
        None
    }
}

/// Camera after one wheel tick at `anchor`, or `None` when nothing changes.
#[must_use]
pub fn wheel_zoom(camera: &Camera, anchor: Point, dy: f64, min_zoom: f64, max_zoom: f64) -> Option<Camera> {
    let factor = wheel_factor(dy)?;
    let zoom = (camera.zoom * factor).clamp(min_zoom, max_zoom);
    if (zoom - camera.zoom).abs() < f64::EPSILON {
        return None;
    }
    Some(camera.zoomed_about(zoom, anchor))
}

// =============================================================
// Tap / drag discrimination
// =============================================================

/// Thresholds separating taps from drags.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TapThresholds {
    pub max_travel_px: f64,
    pub max_duration_ms: f64,
}

/// How a press ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressOutcome {
    /// Short and still: forward to tap handlers.
    Tap,
    /// Moved or held too long: a completed drag, no tap.
    Drag,
    /// The long-press timer already fired for this press.
    LongPress,
}

/// Bookkeeping for the press currently held down.
#[derive(Debug, Clone, PartialEq)]
pub struct PressRecord {
    pub start_screen: Point,
    pub start_ms: f64,
    /// Element under the pointer at press time.
    pub target: Option<ElementId>,
    /// Furthest screen distance from the start seen so far.
    pub max_travel: f64,
    /// Pending long-press task, owned by this press.
    pub long_press: Option<TimerHandle>,
    pub long_press_fired: bool,
}

impl PressRecord {
    #[must_use]
    pub fn new(start_screen: Point, start_ms: f64, target: Option<ElementId>) -> Self {
        Self { start_screen, start_ms, target, max_travel: 0.0, long_press: None, long_press_fired: false }
    }

    /// Record pointer movement. Returns `true` the first time travel passes the tap threshold.
    pub fn track(&mut self, screen: Point, thresholds: &TapThresholds) -> bool {
        let was_still = self.max_travel <= thresholds.max_travel_px;
        self.max_travel = self.max_travel.max(self.start_screen.distance_to(screen));
        was_still && self.max_travel > thresholds.max_travel_px
    }

    #[must_use]
    pub fn classify(&self, release_screen: Point, now_ms: f64, thresholds: &TapThresholds) -> PressOutcome {
        if self.long_press_fired {
            return PressOutcome::LongPress;
        }
        let travel = self.max_travel.max(self.start_screen.distance_to(release_screen));
        let duration = now_ms - self.start_ms;
        if travel <= thresholds.max_travel_px && duration <= thresholds.max_duration_ms {
            PressOutcome::Tap
        } else {
            PressOutcome::Drag
        }
    }
}
