//! Programmatic camera moves: fit-to-content, focus-on-region, zoom steps, and
//! transition timing.
//!
//! Everything here is a pure function of bounds, viewport size, and config,
//! returning the target [`Camera`]. The engine applies the result and marks a
//! transition; calling any of these twice with the same inputs gives the same
//! camera.

#[cfg(test)]
#[path = "viewport_test.rs"]
mod viewport_test;

use crate::camera::{Camera, Point, center_origin_offset, center_origin_to_pan};
use crate::config::CanvasConfig;
use crate::consts::TRANSITION_REFERENCE_WIDTH_PX;
use crate::doc::Bounds;

/// Viewport size in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportSize {
    pub width: f64,
    pub height: f64,
}

impl ViewportSize {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.width * 0.5, self.height * 0.5)
    }

    fn is_usable(&self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }
}

/// Largest scale at which `bounds` fits inside `viewport` minus `padding` on every side.
fn fitting_scale(bounds: &Bounds, viewport: ViewportSize, padding: f64) -> Option<f64> {
    let (cw, ch) = (bounds.width(), bounds.height());
    if cw <= 0.0 || ch <= 0.0 || !viewport.is_usable() {
        return None;
    }
    let avail_w = viewport.width - 2.0 * padding;
    let avail_h = viewport.height - 2.0 * padding;
    if avail_w <= 0.0 || avail_h <= 0.0 {
        return None;
    }
    Some((avail_w / cw).min(avail_h / ch))
}

/// Camera at `scale` that puts world point `world` at screen point `target`.
///
/// Solves the center-origin form for its offset and converts to a top-left pan.
fn camera_placing(world: Point, target: Point, viewport: ViewportSize, scale: f64) -> Camera {
    let pivot = viewport.center();
    let offset = center_origin_offset(world, target, pivot, scale);
    let pan = center_origin_to_pan(offset, pivot, scale);
    Camera { pan_x: pan.x, pan_y: pan.y, zoom: scale }
}

/// Camera that shows all of `bounds`, centered, with `padding` px on each side.
///
/// `None` when the content or the padded viewport has no area.
#[must_use]
pub fn fit_to_content(
    bounds: &Bounds,
    viewport: ViewportSize,
    padding: f64,
    min_zoom: f64,
    max_zoom: f64,
) -> Option<Camera> {
    let scale = fitting_scale(bounds, viewport, padding)?.clamp(min_zoom, max_zoom);
    Some(camera_placing(bounds.center(), viewport.center(), viewport, scale))
}

/// Camera that shows `bounds` at no more than `config.focus_max_zoom`, with the
/// region's center `config.focus_vertical_offset_px` below the viewport center.
#[must_use]
pub fn focus_region(bounds: &Bounds, viewport: ViewportSize, config: &CanvasConfig) -> Option<Camera> {
    let scale = fitting_scale(bounds, viewport, config.fit_padding_px)?
        .min(config.focus_max_zoom)
        .clamp(config.min_zoom, config.max_zoom);
    let center = viewport.center();
    let target = Point::new(center.x, center.y + config.focus_vertical_offset_px);
    Some(camera_placing(bounds.center(), target, viewport, scale))
}

/// Camera zoomed by `factor` about the viewport center, or `None` at a limit.
#[must_use]
pub fn zoom_about_center(camera: &Camera, factor: f64, viewport: ViewportSize, config: &CanvasConfig) -> Option<Camera> {
    if factor <= 0.0 || !factor.is_finite() {
        return None;
    }
    zoom_to_about_center(camera, camera.zoom * factor, viewport, config)
}

/// Camera at exactly `zoom` (clamped) about the viewport center, or `None` if unchanged.
#[must_use]
pub fn zoom_to_about_center(camera: &Camera, zoom: f64, viewport: ViewportSize, config: &CanvasConfig) -> Option<Camera> {
    let zoom = config.clamp_zoom(zoom);
    if (zoom - camera.zoom).abs() < f64::EPSILON {
        return None;
    }
    Some(camera.zoomed_about(zoom, viewport.center()))
}

/// How long the host should animate a camera move.
///
/// Reduced motion gets a fixed short duration; otherwise the base duration
/// scales with viewport width so long sweeps on wide screens don't feel rushed.
#[must_use]
pub fn transition_duration_ms(config: &CanvasConfig, viewport_width: f64) -> f64 {
    if config.reduced_motion {
        return config.transition_reduced_ms;
    }
    let ratio = if viewport_width.is_finite() && viewport_width > 0.0 {
        viewport_width / TRANSITION_REFERENCE_WIDTH_PX
    } else {
        1.0
    };
    config.transition_base_ms * ratio.clamp(0.75, 1.5)
}
