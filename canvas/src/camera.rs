//! Transform math: screen ↔ world conversion and zoom anchoring.
//!
//! Screen space is CSS pixels inside the viewport; world space is the fixed
//! coordinate system element poses are stored in. The live camera uses a
//! top-left pivot (`screen = pan + world * zoom`). Camera operations that
//! reason about the viewport center use the center-origin form instead,
//! which maps onto the same pan through [`center_origin_to_pan`].

#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use serde::{Deserialize, Serialize};

/// A point in either screen or world space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance_to(self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Point halfway between `self` and `other`.
    #[must_use]
    pub fn midpoint(self, other: Point) -> Point {
        Point::new((self.x + other.x) * 0.5, (self.y + other.y) * 0.5)
    }
}

/// Camera state for pan/zoom on the floor canvas.
///
/// `pan_x` / `pan_y` are in CSS pixels.
/// `zoom` is a scale factor (1.0 = no zoom).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub pan_x: f64,
    pub pan_y: f64,
    pub zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self { pan_x: 0.0, pan_y: 0.0, zoom: 1.0 }
    }
}

impl Camera {
    /// Pan offset as a point.
    #[must_use]
    pub fn pan(&self) -> Point {
        Point::new(self.pan_x, self.pan_y)
    }

    /// Convert a screen-space point (CSS pixels) to world coordinates.
    #[must_use]
    pub fn screen_to_world(&self, screen: Point) -> Point {
        screen_to_world(screen, self.pan(), self.zoom)
    }

    /// Convert a world-space point to screen coordinates (CSS pixels).
    #[must_use]
    pub fn world_to_screen(&self, world: Point) -> Point {
        world_to_screen(world, self.pan(), self.zoom)
    }

    /// Convert a screen-space distance (pixels) to world-space distance.
    #[must_use]
    pub fn screen_dist_to_world(&self, screen_dist: f64) -> f64 {
        screen_dist / self.zoom
    }

    /// Camera at `new_zoom` that keeps the world point under `anchor` fixed.
    #[must_use]
    pub fn zoomed_about(&self, new_zoom: f64, anchor: Point) -> Camera {
        let pan = zoom_to_point(self.zoom, new_zoom, anchor, self.pan());
        Camera { pan_x: pan.x, pan_y: pan.y, zoom: new_zoom }
    }
}

/// `world = (screen - pan) / zoom`.
#[must_use]
pub fn screen_to_world(screen: Point, pan: Point, zoom: f64) -> Point {
    Point::new((screen.x - pan.x) / zoom, (screen.y - pan.y) / zoom)
}

/// `screen = world * zoom + pan`.
#[must_use]
pub fn world_to_screen(world: Point, pan: Point, zoom: f64) -> Point {
    Point::new(world.x * zoom + pan.x, world.y * zoom + pan.y)
}

/// Pan that keeps the world point under `anchor` fixed when zoom changes
/// from `old_zoom` to `new_zoom`.
#[must_use]
pub fn zoom_to_point(old_zoom: f64, new_zoom: f64, anchor: Point, old_pan: Point) -> Point {
    let ratio = new_zoom / old_zoom;
    Point::new(
        anchor.x - (anchor.x - old_pan.x) * ratio,
        anchor.y - (anchor.y - old_pan.y) * ratio,
    )
}

/// Screen position of `world` when scaling pivots on `container_center`:
/// `screen = offset + center * (1 - scale) + world * scale`.
#[must_use]
pub fn center_origin_transform(world: Point, offset: Point, container_center: Point, scale: f64) -> Point {
    Point::new(
        offset.x + container_center.x * (1.0 - scale) + world.x * scale,
        offset.y + container_center.y * (1.0 - scale) + world.y * scale,
    )
}

/// Inverse of [`center_origin_transform`] for the offset: the offset that
/// places `world` at `screen_target`.
#[must_use]
pub fn center_origin_offset(world: Point, screen_target: Point, container_center: Point, scale: f64) -> Point {
    Point::new(
        screen_target.x - container_center.x * (1.0 - scale) - world.x * scale,
        screen_target.y - container_center.y * (1.0 - scale) - world.y * scale,
    )
}

/// Top-left pan equivalent to a center-origin offset.
#[must_use]
pub fn center_origin_to_pan(offset: Point, container_center: Point, scale: f64) -> Point {
    Point::new(
        offset.x + container_center.x * (1.0 - scale),
        offset.y + container_center.y * (1.0 - scale),
    )
}
