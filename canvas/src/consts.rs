//! Shared numeric constants for the floor canvas crate.

// ── Geometry ────────────────────────────────────────────────────

/// Smallest width or height an element may have, in world units.
pub const MIN_ELEMENT_SIZE: f64 = 20.0;

/// Default snapping unit in world units.
pub const DEFAULT_GRID_SIZE: f64 = 10.0;

// ── Zoom ────────────────────────────────────────────────────────

/// Lower zoom bound.
pub const MIN_ZOOM: f64 = 0.2;

/// Upper zoom bound.
pub const MAX_ZOOM: f64 = 5.0;

/// Zoom multiplier for one wheel tick towards the user (zoom in).
pub const WHEEL_ZOOM_IN: f64 = 1.1;

/// Zoom multiplier for one wheel tick away from the user (zoom out).
pub const WHEEL_ZOOM_OUT: f64 = 0.9;

/// Multiplier used by the programmatic zoom-in / zoom-out buttons.
pub const ZOOM_STEP: f64 = 1.2;

// ── Gestures ────────────────────────────────────────────────────

/// A press that travels further than this (screen pixels) is a drag, not a tap.
pub const TAP_MAX_TRAVEL_PX: f64 = 6.0;

/// A press held longer than this is not a tap.
pub const TAP_MAX_DURATION_MS: f64 = 300.0;

/// Hold time before a press on an element becomes a long press.
pub const LONG_PRESS_MS: f64 = 500.0;

/// Pinches starting with fingers closer than this are ignored (ratio is unstable).
pub const PINCH_MIN_START_DISTANCE_PX: f64 = 1.0;

// ── Hit-testing ─────────────────────────────────────────────────

/// Screen-space hit slop in pixels for resize handles.
pub const HANDLE_RADIUS_PX: f64 = 8.0;

// ── Camera operations ───────────────────────────────────────────

/// Padding kept on each side of the viewport by fit-to-content.
pub const FIT_PADDING_PX: f64 = 32.0;

/// Maximum zoom reached when focusing a floor section or a single element.
pub const FOCUS_MAX_ZOOM: f64 = 2.5;

/// Focused regions land this far below the viewport center, leaving room for top chrome.
pub const FOCUS_VERTICAL_OFFSET_PX: f64 = 40.0;

/// Camera transition length at the reference viewport width.
pub const TRANSITION_BASE_MS: f64 = 400.0;

/// Camera transition length when the user prefers reduced motion.
pub const TRANSITION_REDUCED_MS: f64 = 120.0;

/// Viewport width at which a transition takes exactly `TRANSITION_BASE_MS`.
pub const TRANSITION_REFERENCE_WIDTH_PX: f64 = 1280.0;

/// Step applied by the rotate button / `R` key.
pub const ROTATE_STEP_DEG: f64 = 90.0;
