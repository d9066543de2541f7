//! Hit-testing: which element, and which part of it, is under a world point.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::camera::{Camera, Point};
use crate::consts::HANDLE_RADIUS_PX;
use crate::doc::{ElementId, ElementStore, FillShape, PlacedElement, Pose, Role};
use crate::render;

/// Which part of an element was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    Body,
    ResizeHandle(ResizeAnchor),
}

/// Anchor position for resize handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeAnchor {
    N,
    Ne,
    E,
    Se,
    S,
    Sw,
    W,
    Nw,
}

impl ResizeAnchor {
    /// All handles, clockwise from the top edge.
    pub const ALL: [ResizeAnchor; 8] = [
        Self::N,
        Self::Ne,
        Self::E,
        Self::Se,
        Self::S,
        Self::Sw,
        Self::W,
        Self::Nw,
    ];

    /// Dragging this handle moves the right edge.
    #[must_use]
    pub fn moves_east(self) -> bool {
        matches!(self, Self::Ne | Self::E | Self::Se)
    }

    /// Dragging this handle moves the left edge.
    #[must_use]
    pub fn moves_west(self) -> bool {
        matches!(self, Self::Nw | Self::W | Self::Sw)
    }

    /// Dragging this handle moves the bottom edge.
    #[must_use]
    pub fn moves_south(self) -> bool {
        matches!(self, Self::Se | Self::S | Self::Sw)
    }

    /// Dragging this handle moves the top edge.
    #[must_use]
    pub fn moves_north(self) -> bool {
        matches!(self, Self::Ne | Self::N | Self::Nw)
    }

    /// CSS cursor shown while hovering or dragging this handle.
    #[must_use]
    pub fn cursor(self) -> &'static str {
        match self {
            Self::N | Self::S => "ns-resize",
            Self::E | Self::W => "ew-resize",
            Self::Ne | Self::Sw => "nesw-resize",
            Self::Nw | Self::Se => "nwse-resize",
        }
    }

    /// Parse the short handle name used by the host (`"nw"`, `"e"`, ...).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "n" => Some(Self::N),
            "ne" => Some(Self::Ne),
            "e" => Some(Self::E),
            "se" => Some(Self::Se),
            "s" => Some(Self::S),
            "sw" => Some(Self::Sw),
            "w" => Some(Self::W),
            "nw" => Some(Self::Nw),
            _ => None,
        }
    }
}

/// Which elements a body hit may land on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitFilter {
    /// Every element (floor-plan builder).
    All,
    /// Only seated elements; decorative geometry behaves like empty floor (live floor map).
    Seated,
}

impl HitFilter {
    fn accepts(self, el: &PlacedElement) -> bool {
        match self {
            Self::All => true,
            Self::Seated => matches!(el.kind().role, Role::Seated(_)),
        }
    }
}

/// Result of a hit test.
#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    pub element_id: ElementId,
    pub part: HitPart,
}

/// Handle centers in [`ResizeAnchor::ALL`] order.
///
/// Resizing works on the world-axis box, so handles sit on the unrotated box.
#[must_use]
pub fn resize_handle_positions(pose: &Pose) -> [Point; 8] {
    let Pose { x, y, width: w, height: h, .. } = *pose;
    let cx = x + w * 0.5;
    let cy = y + h * 0.5;
    [
        Point::new(cx, y),
        Point::new(x + w, y),
        Point::new(x + w, cy),
        Point::new(x + w, y + h),
        Point::new(cx, y + h),
        Point::new(x, y + h),
        Point::new(x, cy),
        Point::new(x, y),
    ]
}

/// Whether `world_pt` lies inside the element's rotated silhouette.
#[must_use]
pub fn point_in_element(world_pt: Point, el: &PlacedElement) -> bool {
    let center = el.pose().center();
    let (sin, cos) = (-el.rotation.to_radians()).sin_cos();
    let dx = world_pt.x - center.x;
    let dy = world_pt.y - center.y;
    let lx = dx * cos - dy * sin;
    let ly = dx * sin + dy * cos;
    let hw = el.width * 0.5;
    let hh = el.height * 0.5;
    if hw <= 0.0 || hh <= 0.0 {
        return false;
    }
    match el.kind().fill {
        FillShape::Rectangle => lx.abs() <= hw && ly.abs() <= hh,
        FillShape::Ellipse => (lx / hw).powi(2) + (ly / hh).powi(2) <= 1.0,
    }
}

/// Test which element (if any) is under `world_pt`.
///
/// Handles of the selected element win over bodies; among bodies the topmost
/// in draw order wins. Locked elements expose no handles.
/// `filter` applies to bodies only.
#[must_use]
pub fn hit_test(
    world_pt: Point,
    store: &ElementStore,
    camera: &Camera,
    selected_id: Option<&str>,
    filter: HitFilter,
) -> Option<Hit> {
    if let Some(sel) = selected_id.and_then(|id| store.get(id))
        && !sel.locked
    {
        let slop = camera.screen_dist_to_world(HANDLE_RADIUS_PX);
        let positions = resize_handle_positions(&sel.pose());
        for (anchor, pos) in ResizeAnchor::ALL.iter().zip(positions) {
            if (world_pt.x - pos.x).abs() <= slop && (world_pt.y - pos.y).abs() <= slop {
                return Some(Hit { element_id: sel.id.clone(), part: HitPart::ResizeHandle(*anchor) });
            }
        }
    }

    render::draw_order(store.elements())
        .into_iter()
        .rev()
        .find(|el| filter.accepts(el) && point_in_element(world_pt, el))
        .map(|el| Hit { element_id: el.id.clone(), part: HitPart::Body })
}
