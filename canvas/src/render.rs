//! Rendering: category z-order, render nodes, and the 2D-context painter.
//!
//! Scene building is pure: [`build_scene`] turns the element list, the status
//! snapshot, and caller-supplied highlight flags into an ordered list of
//! [`RenderNode`]s. [`draw`] is the only place that touches
//! [`web_sys::CanvasRenderingContext2d`]; it paints those nodes through the
//! camera transform and mutates no application state.
//!
//! All fallible `Canvas2D` calls propagate errors via `Result<(), JsValue>`.
//! The top-level caller ([`crate::engine::Engine::render`]) handles the result.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use std::collections::HashSet;
use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use crate::camera::Camera;
use crate::consts::HANDLE_RADIUS_PX;
use crate::doc::{Bounds, ElementCategory, ElementId, ElementStore, FillShape, PlacedElement, Pose, Role};
use crate::hit;
use crate::overlay::{OverlayLayout, OverlayOrientation, OverlayThresholds, layout_overlay};
use crate::status::{StatusMap, WaveState};
use crate::viewport::ViewportSize;

/// Opacity multiplier for dimmed elements.
const DIM_FACTOR: f64 = 0.35;

/// Corner radius of rectangular seated elements, in world units.
const SEATED_CORNER_RADIUS: f64 = 6.0;

/// Corner radius of rectangular background geometry, in world units.
const DECORATIVE_CORNER_RADIUS: f64 = 2.0;

/// Selection dash segment length in screen pixels.
const SELECTION_DASH_PX: f64 = 4.0;

/// Grid lines closer than this on screen are skipped.
const MIN_GRID_SPACING_PX: f64 = 8.0;

// =============================================================
// Z-order
// =============================================================

/// Paint layer. Lower layers draw first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RenderLayer {
    /// Walls, zones, and fixtures.
    Structural,
    /// Tables without seats.
    DecorativeTable,
    Seating,
    /// Tables with seats: always on top.
    Table,
}

#[must_use]
pub fn render_layer(el: &PlacedElement) -> RenderLayer {
    match (el.category, el.kind().role) {
        (ElementCategory::Structural | ElementCategory::Fixture, _) => RenderLayer::Structural,
        (ElementCategory::Table, Role::Decorative) => RenderLayer::DecorativeTable,
        (ElementCategory::Seating, _) => RenderLayer::Seating,
        (ElementCategory::Table, Role::Seated(_)) => RenderLayer::Table,
    }
}

/// Elements bottom-first. List order breaks ties within a layer.
#[must_use]
pub fn draw_order(elements: &[PlacedElement]) -> Vec<&PlacedElement> {
    let mut ordered: Vec<&PlacedElement> = elements.iter().collect();
    ordered.sort_by_key(|el| render_layer(el));
    ordered
}

// =============================================================
// Scene
// =============================================================

/// Purely visual modifiers supplied by the caller.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VisualState {
    pub selected: bool,
    pub highlighted: bool,
    pub dimmed: bool,
    /// Assigned to the viewing staff member.
    pub own: bool,
}

/// Caller-owned flag sets for one render pass.
#[derive(Debug, Clone, Default)]
pub struct SceneHighlights {
    pub selected: Option<ElementId>,
    pub highlighted: HashSet<ElementId>,
    pub dimmed: HashSet<ElementId>,
    pub own: HashSet<ElementId>,
}

impl SceneHighlights {
    /// Only a selection, as in the floor-plan builder.
    #[must_use]
    pub fn selection(selected: Option<ElementId>) -> Self {
        Self { selected, ..Self::default() }
    }

    #[must_use]
    pub fn state_of(&self, id: &str) -> VisualState {
        VisualState {
            selected: self.selected.as_deref() == Some(id),
            highlighted: self.highlighted.contains(id),
            dimmed: self.dimmed.contains(id),
            own: self.own.contains(id),
        }
    }
}

/// One element, resolved for painting.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct RenderNode {
    pub id: ElementId,
    #[serde(skip)]
    pub layer: RenderLayer,
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub rotation: f64,
    pub fill: FillShape,
    /// Rounding for rectangular fills, in world units.
    pub corner_radius: f64,
    pub opacity: f64,
    #[serde(skip)]
    pub state: VisualState,
    pub occupied: bool,
    pub overlay: Option<OverlayLayout>,
    /// States of the wave dots the overlay shows, in course order.
    #[serde(skip)]
    pub wave_states: Vec<WaveState>,
}

fn corner_radius(el: &PlacedElement) -> f64 {
    let kind = el.kind();
    match (kind.fill, kind.role) {
        (FillShape::Ellipse, _) => 0.0,
        (FillShape::Rectangle, Role::Seated(_)) => SEATED_CORNER_RADIUS,
        (FillShape::Rectangle, Role::Decorative) => DECORATIVE_CORNER_RADIUS,
    }
}

/// Resolve every element into a paint-ready node, bottom-first.
///
/// Seated elements get an overlay layout computed from their own pose; a
/// missing status entry lays out the identifier and an empty count.
#[must_use]
pub fn build_scene(
    store: &ElementStore,
    statuses: Option<&StatusMap>,
    highlights: &SceneHighlights,
    now_ms: f64,
    thresholds: &OverlayThresholds,
) -> Vec<RenderNode> {
    draw_order(store.elements())
        .into_iter()
        .map(|el| {
            let status = statuses.and_then(|m| m.get(&el.id));
            let state = highlights.state_of(&el.id);
            let overlay = layout_overlay(el, status, now_ms, thresholds);
            let wave_states = match (&overlay, status) {
                (Some(layout), Some(status)) if layout.show_waves => {
                    status.waves.iter().take(layout.visible_waves).map(|w| w.state).collect()
                }
                _ => Vec::new(),
            };
            RenderNode {
                id: el.id.clone(),
                layer: render_layer(el),
                left: el.x,
                top: el.y,
                width: el.width,
                height: el.height,
                rotation: el.rotation,
                fill: el.kind().fill,
                corner_radius: corner_radius(el),
                opacity: if state.dimmed { el.opacity * DIM_FACTOR } else { el.opacity },
                state,
                occupied: status.is_some_and(crate::status::StatusInfo::is_occupied),
                overlay,
                wave_states,
            }
        })
        .collect()
}

/// Selection chrome for the selected element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionBox {
    pub pose: Pose,
    /// Locked elements get the outline but no handles.
    pub show_handles: bool,
}

/// Everything [`draw`] paints in one frame.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub nodes: Vec<RenderNode>,
    pub selection: Option<SelectionBox>,
    /// Builder grid spacing in world units; `0` hides the grid.
    pub grid_size: f64,
}

// =============================================================
// Painter
// =============================================================

/// Draw the full scene: grid, elements with overlays, and selection UI.
///
/// `viewport` is in CSS pixels. `dpr` is the device pixel ratio.
///
/// # Errors
///
/// Returns `Err` if any `Canvas2D` call fails (e.g. invalid context state).
pub fn draw(
    ctx: &CanvasRenderingContext2d,
    scene: &Scene,
    camera: &Camera,
    viewport: ViewportSize,
    dpr: f64,
) -> Result<(), JsValue> {
    ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0)?;
    ctx.clear_rect(0.0, 0.0, viewport.width, viewport.height);
    ctx.translate(camera.pan_x, camera.pan_y)?;
    ctx.scale(camera.zoom, camera.zoom)?;

    if scene.grid_size > 0.0 && scene.grid_size * camera.zoom >= MIN_GRID_SPACING_PX {
        draw_grid(ctx, camera, viewport, scene.grid_size);
    }

    for node in &scene.nodes {
        draw_node(ctx, node, camera.zoom)?;
    }

    if let Some(sel) = scene.selection {
        draw_selection(ctx, &sel, camera.zoom)?;
    }
    Ok(())
}

fn draw_grid(ctx: &CanvasRenderingContext2d, camera: &Camera, viewport: ViewportSize, grid: f64) {
    let top_left = camera.screen_to_world(crate::camera::Point::new(0.0, 0.0));
    let bottom_right = camera.screen_to_world(crate::camera::Point::new(viewport.width, viewport.height));

    ctx.save();
    ctx.set_stroke_style_str("rgba(31, 26, 23, 0.06)");
    ctx.set_line_width(1.0 / camera.zoom);
    ctx.begin_path();
    let mut x = (top_left.x / grid).floor() * grid;
    while x <= bottom_right.x {
        ctx.move_to(x, top_left.y);
        ctx.line_to(x, bottom_right.y);
        x += grid;
    }
    let mut y = (top_left.y / grid).floor() * grid;
    while y <= bottom_right.y {
        ctx.move_to(top_left.x, y);
        ctx.line_to(bottom_right.x, y);
        y += grid;
    }
    ctx.stroke();
    ctx.restore();
}

fn fill_color(node: &RenderNode) -> &'static str {
    match node.layer {
        RenderLayer::Structural => "#E8E4DF",
        RenderLayer::DecorativeTable => "#D9D3CC",
        RenderLayer::Seating => "#CBB9A6",
        RenderLayer::Table if node.occupied => "#FDEBD3",
        RenderLayer::Table => "#FFFFFF",
    }
}

fn stroke_style(node: &RenderNode) -> (&'static str, f64) {
    let s = node.state;
    if s.selected {
        ("#1E90FF", 2.0)
    } else if s.highlighted {
        ("#F5A623", 2.5)
    } else if s.own {
        ("#2E7D32", 2.0)
    } else {
        ("#8C8279", 1.0)
    }
}

fn draw_node(ctx: &CanvasRenderingContext2d, node: &RenderNode, zoom: f64) -> Result<(), JsValue> {
    if node.width <= 0.0 || node.height <= 0.0 {
        return Ok(());
    }
    ctx.save();
    translate_and_rotate(ctx, node.left, node.top, node.width, node.height, node.rotation)?;
    ctx.set_global_alpha(node.opacity);

    let hw = node.width / 2.0;
    let hh = node.height / 2.0;
    ctx.begin_path();
    match node.fill {
        FillShape::Ellipse => ctx.ellipse(0.0, 0.0, hw, hh, 0.0, 0.0, 2.0 * PI)?,
        FillShape::Rectangle => rounded_rect_path(ctx, -hw, -hh, node.width, node.height, node.corner_radius)?,
    }
    ctx.set_fill_style_str(fill_color(node));
    ctx.fill();

    let (stroke, width_px) = stroke_style(node);
    ctx.set_stroke_style_str(stroke);
    ctx.set_line_width(width_px / zoom.max(f64::MIN_POSITIVE));
    ctx.stroke();

    if let Some(layout) = &node.overlay {
        ctx.rotate(layout.rotation.to_radians())?;
        draw_overlay(ctx, layout, &node.wave_states)?;
    }

    ctx.restore();
    Ok(())
}

fn rounded_rect_path(ctx: &CanvasRenderingContext2d, x: f64, y: f64, w: f64, h: f64, r: f64) -> Result<(), JsValue> {
    let r = r.min(w / 2.0).min(h / 2.0).max(0.0);
    ctx.move_to(x + r, y);
    ctx.arc_to(x + w, y, x + w, y + h, r)?;
    ctx.arc_to(x + w, y + h, x, y + h, r)?;
    ctx.arc_to(x, y + h, x, y, r)?;
    ctx.arc_to(x, y, x + w, y, r)?;
    ctx.close_path();
    Ok(())
}

// =============================================================
// Overlay painter
// =============================================================

/// One row of an overlay.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Block<'a> {
    Text { text: &'a str, font: f64, bold: bool, color: &'static str },
    Dots,
}

fn wave_color(state: WaveState) -> &'static str {
    match state {
        WaveState::Pending => "#C7C2BC",
        WaveState::Fired => "#F5A623",
        WaveState::Served => "#2E7D32",
    }
}

/// Blocks grouped the way a horizontal overlay lays them out: identifier and
/// count, stage dots, timer and alert, staff. Empty groups are dropped.
fn horizontal_segments<'a>(layout: &'a OverlayLayout) -> Vec<Vec<Block<'a>>> {
    let s = &layout.sizes;
    let secondary = |text: &'a str| Block::Text { text, font: s.secondary_font, bold: false, color: "#5C534B" };

    let mut ident = vec![Block::Text { text: &layout.label, font: s.id_font, bold: true, color: "#1F1A17" }];
    if layout.show_count {
        ident.push(secondary(&layout.count_text));
    }
    let mut stages = Vec::new();
    if layout.show_waves {
        stages.push(Block::Dots);
    }
    let mut timing = Vec::new();
    if layout.show_timer {
        timing.push(secondary(&layout.timer_text));
    }
    if layout.show_alert {
        timing.push(Block::Text { text: &layout.alert_text, font: s.secondary_font, bold: true, color: "#C62828" });
    }
    let mut staff = Vec::new();
    if layout.show_staff {
        staff.push(secondary(&layout.staff_text));
    }

    [ident, stages, timing, staff].into_iter().filter(|seg| !seg.is_empty()).collect()
}

/// Rows of a vertical overlay, top to bottom.
fn overlay_blocks<'a>(layout: &'a OverlayLayout) -> Vec<Block<'a>> {
    horizontal_segments(layout).into_iter().flatten().collect()
}

fn block_height(block: &Block<'_>, layout: &OverlayLayout) -> f64 {
    match block {
        Block::Text { font, .. } => font * 1.2,
        Block::Dots => layout.sizes.dot,
    }
}

/// Stack `blocks` top to bottom, centered on `(cx, 0)`.
fn draw_stack(
    ctx: &CanvasRenderingContext2d,
    blocks: &[Block<'_>],
    layout: &OverlayLayout,
    waves: &[WaveState],
    cx: f64,
) -> Result<(), JsValue> {
    let gap = layout.sizes.gap;
    let total: f64 =
        blocks.iter().map(|b| block_height(b, layout)).sum::<f64>() + gap * blocks.len().saturating_sub(1) as f64;
    let mut y = -total / 2.0;
    for block in blocks {
        let h = block_height(block, layout);
        draw_block(ctx, block, layout, waves, cx, y + h / 2.0)?;
        y += h + gap;
    }
    Ok(())
}

fn draw_overlay(ctx: &CanvasRenderingContext2d, layout: &OverlayLayout, waves: &[WaveState]) -> Result<(), JsValue> {
    ctx.set_text_align("center");
    ctx.set_text_baseline("middle");

    match layout.orientation {
        OverlayOrientation::Vertical => draw_stack(ctx, &overlay_blocks(layout), layout, waves, 0.0)?,
        OverlayOrientation::Horizontal => {
            let segments = horizontal_segments(layout);
            let segment_w = layout.effective_width / segments.len() as f64;
            let left = -layout.effective_width / 2.0;
            for (idx, segment) in segments.iter().enumerate() {
                draw_stack(ctx, segment, layout, waves, left + segment_w * (idx as f64 + 0.5))?;
                if idx > 0 {
                    let x = left + segment_w * idx as f64;
                    let half = layout.effective_height * 0.3;
                    ctx.set_stroke_style_str("rgba(31, 26, 23, 0.2)");
                    ctx.begin_path();
                    ctx.move_to(x, -half);
                    ctx.line_to(x, half);
                    ctx.stroke();
                }
            }
        }
    }
    Ok(())
}

fn draw_block(
    ctx: &CanvasRenderingContext2d,
    block: &Block<'_>,
    layout: &OverlayLayout,
    waves: &[WaveState],
    cx: f64,
    cy: f64,
) -> Result<(), JsValue> {
    match block {
        Block::Text { text, font, bold, color } => {
            let weight = if *bold { "600 " } else { "" };
            ctx.set_font(&format!("{weight}{font:.0}px sans-serif"));
            ctx.set_fill_style_str(color);
            ctx.fill_text(text, cx, cy)?;
        }
        Block::Dots => {
            let dot = layout.sizes.dot;
            let gap = layout.sizes.gap;
            let n = waves.len() as f64;
            let row_w = n * dot + (n - 1.0).max(0.0) * gap;
            let mut x = cx - row_w / 2.0 + dot / 2.0;
            for state in waves {
                ctx.begin_path();
                ctx.arc(x, cy, dot / 2.0, 0.0, 2.0 * PI)?;
                ctx.set_fill_style_str(wave_color(*state));
                ctx.fill();
                x += dot + gap;
            }
            if layout.hidden_waves > 0 {
                ctx.set_font(&format!("{:.0}px sans-serif", layout.sizes.secondary_font * 0.8));
                ctx.set_fill_style_str("#5C534B");
                ctx.set_text_align("left");
                ctx.fill_text(&format!("+{}", layout.hidden_waves), x - dot / 2.0, cy)?;
                ctx.set_text_align("center");
            }
        }
    }
    Ok(())
}

// =============================================================
// Selection UI
// =============================================================

/// World-axis box the dashed outline traces. Resize handles sit on its edges,
/// so it ignores the element's rotation.
#[must_use]
pub fn selection_outline(pose: &Pose) -> Bounds {
    Bounds { min_x: pose.x, min_y: pose.y, max_x: pose.x + pose.width, max_y: pose.y + pose.height }
}

fn draw_selection(ctx: &CanvasRenderingContext2d, sel: &SelectionBox, zoom: f64) -> Result<(), JsValue> {
    let pose = sel.pose;
    let outline = selection_outline(&pose);
    ctx.save();
    let dash_world = SELECTION_DASH_PX / zoom;
    ctx.set_stroke_style_str("#1E90FF");
    ctx.set_line_width(1.0 / zoom);
    let dash_array = js_sys::Array::new();
    dash_array.push(&dash_world.into());
    dash_array.push(&dash_world.into());
    ctx.set_line_dash(&dash_array)?;
    ctx.stroke_rect(outline.min_x, outline.min_y, outline.width(), outline.height());
    ctx.set_line_dash(&js_sys::Array::new())?;
    ctx.restore();

    if !sel.show_handles {
        return Ok(());
    }

    let half = HANDLE_RADIUS_PX / zoom;
    ctx.save();
    ctx.set_fill_style_str("#fff");
    ctx.set_stroke_style_str("#1E90FF");
    ctx.set_line_width(1.0 / zoom);
    for pos in hit::resize_handle_positions(&pose) {
        ctx.fill_rect(pos.x - half, pos.y - half, half * 2.0, half * 2.0);
        ctx.stroke_rect(pos.x - half, pos.y - half, half * 2.0, half * 2.0);
    }
    ctx.restore();
    Ok(())
}

fn translate_and_rotate(
    ctx: &CanvasRenderingContext2d,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    rotation: f64,
) -> Result<(), JsValue> {
    ctx.translate(x + width / 2.0, y + height / 2.0)?;
    ctx.rotate(rotation.to_radians())?;
    Ok(())
}
