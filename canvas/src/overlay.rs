//! Adaptive status overlay layout.
//!
//! Overlays are drawn inside an element's own local box and counter-rotated
//! so text stays upright, which means the space they can use is not the raw
//! `width × height`. The layout works in four steps:
//!
//! 1. **Usable box.** Reduce the rotation modulo 180° and take the
//!    axis-aligned footprint of the rotated box:
//!    `w·|cos| + h·|sin|` by `w·|sin| + h·|cos|`. Round shapes shrink both
//!    sides by [`OverlayThresholds::round_inset`] to stay inside the curve.
//! 2. **Sizing.** `unit = min(usable) / 10`; every font, icon, dot, and gap is
//!    `unit × coefficient`, clamped to fixed pixel bounds.
//! 3. **Disclosure.** Each information layer is shown only when the usable
//!    box clears its threshold (see [`OverlayThresholds`]) and the status
//!    snapshot has something to show for it.
//! 4. **Orientation.** Usable boxes wider than `horizontal_aspect × height`
//!    lay the layers out in a row instead of a column.
//!
//! Layout is independent of camera zoom: it is computed in world units and
//! scaled together with the element.

#[cfg(test)]
#[path = "overlay_test.rs"]
mod overlay_test;

use serde::{Deserialize, Serialize};

use crate::doc::{FillShape, PlacedElement, Role};
use crate::status::StatusInfo;

// ── Size coefficients (× unit) and clamps ───────────────────────

const ID_FONT_COEF: f64 = 2.2;
const ID_FONT_RANGE: (f64, f64) = (9.0, 28.0);
const SECONDARY_FONT_COEF: f64 = 1.5;
const SECONDARY_FONT_RANGE: (f64, f64) = (8.0, 18.0);
const ICON_COEF: f64 = 1.6;
const ICON_RANGE: (f64, f64) = (8.0, 20.0);
const DOT_COEF: f64 = 0.8;
const DOT_RANGE: (f64, f64) = (4.0, 10.0);
const GAP_COEF: f64 = 0.6;
const GAP_RANGE: (f64, f64) = (2.0, 10.0);

/// Share of the usable width a row of wave dots may take.
const WAVE_ROW_SHARE_VERTICAL: f64 = 0.8;
const WAVE_ROW_SHARE_HORIZONTAL: f64 = 0.35;
/// Share of the usable width the alert line may take.
const ALERT_SHARE_VERTICAL: f64 = 0.85;
const ALERT_SHARE_HORIZONTAL: f64 = 0.3;
/// Average glyph advance as a fraction of the font size.
const GLYPH_ADVANCE: f64 = 0.6;

/// Cutoffs for progressive disclosure, in world units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayThresholds {
    /// Smaller usable side needed to show the guest count.
    pub count_min_dim: f64,
    /// Smaller usable side needed to show the seated timer.
    pub timer_min_dim: f64,
    /// Usable area needed to show order-wave dots.
    pub waves_min_area: f64,
    /// Usable area needed to show the assigned server.
    pub staff_min_area: f64,
    /// Usable area needed to show alert text.
    pub alert_min_area: f64,
    /// Width/height ratio above which layers are laid out in a row.
    pub horizontal_aspect: f64,
    /// Shrink factor for round shapes (approximate inscribed rectangle).
    pub round_inset: f64,
}

impl Default for OverlayThresholds {
    fn default() -> Self {
        Self {
            count_min_dim: 40.0,
            timer_min_dim: 60.0,
            waves_min_area: 6_400.0,
            staff_min_area: 9_000.0,
            alert_min_area: 12_000.0,
            horizontal_aspect: 1.5,
            round_inset: 0.7,
        }
    }
}

/// Usable upright content box of a rotated, possibly round shape.
#[must_use]
pub fn effective_size(width: f64, height: f64, rotation_deg: f64, round: bool, round_inset: f64) -> (f64, f64) {
    let reduced = if rotation_deg.is_finite() { rotation_deg.rem_euclid(180.0) } else { 0.0 };
    let (sin, cos) = reduced.to_radians().sin_cos();
    let (sin, cos) = (sin.abs(), cos.abs());
    let mut ew = width * cos + height * sin;
    let mut eh = width * sin + height * cos;
    if round {
        ew *= round_inset;
        eh *= round_inset;
    }
    (ew, eh)
}

/// Pixel sizes derived from the usable box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OverlaySizes {
    pub unit: f64,
    pub id_font: f64,
    pub secondary_font: f64,
    pub icon: f64,
    pub dot: f64,
    pub gap: f64,
}

fn scaled(unit: f64, coef: f64, range: (f64, f64)) -> f64 {
    (unit * coef).clamp(range.0, range.1)
}

#[must_use]
pub fn overlay_sizes(effective_width: f64, effective_height: f64) -> OverlaySizes {
    let unit = (effective_width.min(effective_height) / 10.0).max(0.0);
    OverlaySizes {
        unit,
        id_font: scaled(unit, ID_FONT_COEF, ID_FONT_RANGE),
        secondary_font: scaled(unit, SECONDARY_FONT_COEF, SECONDARY_FONT_RANGE),
        icon: scaled(unit, ICON_COEF, ICON_RANGE),
        dot: scaled(unit, DOT_COEF, DOT_RANGE),
        gap: scaled(unit, GAP_COEF, GAP_RANGE),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlayOrientation {
    /// Layers stacked top to bottom (default).
    Vertical,
    /// Identifier and count, then waves, then timer/alert, then staff, separated by dividers.
    Horizontal,
}

/// Everything the host needs to draw one element's status overlay.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayLayout {
    pub effective_width: f64,
    pub effective_height: f64,
    pub orientation: OverlayOrientation,
    pub sizes: OverlaySizes,
    /// Rotation to apply to the overlay so it reads upright: the negated element rotation.
    pub rotation: f64,
    pub label: String,
    pub show_count: bool,
    /// `guests/capacity`.
    pub count_text: String,
    pub show_timer: bool,
    pub timer_text: String,
    pub show_waves: bool,
    /// Wave dots that fit on the row, in course order.
    pub visible_waves: usize,
    /// Waves summarized as `+n` after the dots.
    pub hidden_waves: usize,
    pub show_alert: bool,
    /// First alert, truncated to the space available.
    pub alert_text: String,
    pub show_staff: bool,
    pub staff_text: String,
}

/// Format whole minutes as `42m` or `1h 05m`.
#[must_use]
pub fn format_elapsed(minutes: u64) -> String {
    if minutes < 60 {
        format!("{minutes}m")
    } else {
        format!("{}h {:02}m", minutes / 60, minutes % 60)
    }
}

/// Cut `text` to `max_chars`, ending in an ellipsis when shortened.
#[must_use]
pub fn truncate_to(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_owned();
    }
    let mut out: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    out.push('…');
    out
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn slots_that_fit(budget: f64, item: f64, gap: f64) -> usize {
    if budget <= 0.0 || item <= 0.0 {
        return 0;
    }
    ((budget + gap) / (item + gap)).floor().max(0.0) as usize
}

/// Compute the overlay for `el`, or `None` for elements that take no part in
/// service (decorative geometry never shows status).
#[must_use]
pub fn layout_overlay(
    el: &PlacedElement,
    status: Option<&StatusInfo>,
    now_ms: f64,
    thresholds: &OverlayThresholds,
) -> Option<OverlayLayout> {
    let kind = el.kind();
    let Role::Seated(capacity) = kind.role else {
        return None;
    };
    let round = kind.fill == FillShape::Ellipse;
    let (ew, eh) = effective_size(el.width, el.height, el.rotation, round, thresholds.round_inset);
    let sizes = overlay_sizes(ew, eh);
    let empty = StatusInfo::default();
    let status = status.unwrap_or(&empty);

    let mut layout = OverlayLayout {
        effective_width: ew,
        effective_height: eh,
        orientation: OverlayOrientation::Vertical,
        sizes,
        rotation: -el.rotation,
        label: el.display_label().to_owned(),
        show_count: false,
        count_text: format!("{}/{capacity}", status.guests),
        show_timer: false,
        timer_text: String::new(),
        show_waves: false,
        visible_waves: 0,
        hidden_waves: 0,
        show_alert: false,
        alert_text: String::new(),
        show_staff: false,
        staff_text: String::new(),
    };

    // A collapsed box gets the identifier only.
    if ew <= 0.0 || eh <= 0.0 {
        return Some(layout);
    }

    let horizontal = ew / eh > thresholds.horizontal_aspect;
    if horizontal {
        layout.orientation = OverlayOrientation::Horizontal;
    }
    let min_dim = ew.min(eh);
    let area = ew * eh;

    layout.show_count = min_dim >= thresholds.count_min_dim;

    if min_dim >= thresholds.timer_min_dim
        && let Some(minutes) = status.elapsed_minutes(now_ms)
    {
        layout.show_timer = true;
        layout.timer_text = format_elapsed(minutes);
    }

    if area >= thresholds.waves_min_area && !status.waves.is_empty() {
        let share = if horizontal { WAVE_ROW_SHARE_HORIZONTAL } else { WAVE_ROW_SHARE_VERTICAL };
        let fit = slots_that_fit(ew * share, sizes.dot, sizes.gap);
        layout.visible_waves = fit.min(status.waves.len());
        layout.hidden_waves = status.waves.len() - layout.visible_waves;
        layout.show_waves = layout.visible_waves > 0;
    }

    if area >= thresholds.alert_min_area
        && let Some(alert) = status.alerts.first()
    {
        let share = if horizontal { ALERT_SHARE_HORIZONTAL } else { ALERT_SHARE_VERTICAL };
        let max_chars = slots_that_fit(ew * share, sizes.secondary_font * GLYPH_ADVANCE, 0.0);
        if max_chars >= 2 {
            layout.show_alert = true;
            layout.alert_text = truncate_to(alert, max_chars);
        }
    }

    if area >= thresholds.staff_min_area
        && let Some(staff) = status.staff.as_deref()
    {
        layout.show_staff = true;
        layout.staff_text = staff.to_owned();
    }

    Some(layout)
}
