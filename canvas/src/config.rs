//! Per-canvas tuning.
//!
//! Every field has a default, so an empty JSON object is a valid config.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_GRID_SIZE, FIT_PADDING_PX, FOCUS_MAX_ZOOM, FOCUS_VERTICAL_OFFSET_PX, LONG_PRESS_MS, MAX_ZOOM, MIN_ZOOM,
    TAP_MAX_DURATION_MS, TAP_MAX_TRAVEL_PX, TRANSITION_BASE_MS, TRANSITION_REDUCED_MS, ZOOM_STEP,
};
use crate::error::CanvasError;
use crate::gesture::TapThresholds;
use crate::overlay::OverlayThresholds;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// Snapping unit in world units. `<= 0` disables snapping.
    pub grid_size: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub tap_max_travel_px: f64,
    pub tap_max_duration_ms: f64,
    pub long_press_ms: f64,
    pub fit_padding_px: f64,
    pub focus_max_zoom: f64,
    /// Focused regions land this far below the viewport center.
    pub focus_vertical_offset_px: f64,
    pub zoom_step: f64,
    pub transition_base_ms: f64,
    pub transition_reduced_ms: f64,
    pub reduced_motion: bool,
    pub overlay: OverlayThresholds,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
            tap_max_travel_px: TAP_MAX_TRAVEL_PX,
            tap_max_duration_ms: TAP_MAX_DURATION_MS,
            long_press_ms: LONG_PRESS_MS,
            fit_padding_px: FIT_PADDING_PX,
            focus_max_zoom: FOCUS_MAX_ZOOM,
            focus_vertical_offset_px: FOCUS_VERTICAL_OFFSET_PX,
            zoom_step: ZOOM_STEP,
            transition_base_ms: TRANSITION_BASE_MS,
            transition_reduced_ms: TRANSITION_REDUCED_MS,
            reduced_motion: false,
            overlay: OverlayThresholds::default(),
        }
    }
}

impl CanvasConfig {
    /// Decode and validate a config blob.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::Decode`] when the blob doesn't match the shape and
    /// [`CanvasError::InvalidConfig`] when it fails [`CanvasConfig::validate`].
    pub fn from_json(value: &serde_json::Value) -> Result<Self, CanvasError> {
        let config: Self = serde_json::from_value(value.clone())?;
        config.validate()?;
        Ok(config)
    }

    /// Check zoom limits and step sizes.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::InvalidConfig`] naming the first bad field.
    pub fn validate(&self) -> Result<(), CanvasError> {
        let positive = [
            ("min_zoom", self.min_zoom),
            ("max_zoom", self.max_zoom),
            ("focus_max_zoom", self.focus_max_zoom),
            ("overlay.round_inset", self.overlay.round_inset),
            ("overlay.horizontal_aspect", self.overlay.horizontal_aspect),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(CanvasError::InvalidConfig(format!("{name} must be positive, got {value}")));
            }
        }
        if self.min_zoom > self.max_zoom {
            return Err(CanvasError::InvalidConfig(format!(
                "min_zoom {} exceeds max_zoom {}",
                self.min_zoom, self.max_zoom
            )));
        }
        if !(self.zoom_step.is_finite() && self.zoom_step > 1.0) {
            return Err(CanvasError::InvalidConfig(format!("zoom_step must exceed 1, got {}", self.zoom_step)));
        }
        let non_negative = [
            ("grid_size", self.grid_size),
            ("tap_max_travel_px", self.tap_max_travel_px),
            ("tap_max_duration_ms", self.tap_max_duration_ms),
            ("long_press_ms", self.long_press_ms),
            ("fit_padding_px", self.fit_padding_px),
            ("transition_base_ms", self.transition_base_ms),
            ("transition_reduced_ms", self.transition_reduced_ms),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(CanvasError::InvalidConfig(format!("{name} must be non-negative, got {value}")));
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn tap_thresholds(&self) -> TapThresholds {
        TapThresholds { max_travel_px: self.tap_max_travel_px, max_duration_ms: self.tap_max_duration_ms }
    }

    #[must_use]
    pub fn clamp_zoom(&self, zoom: f64) -> f64 {
        zoom.clamp(self.min_zoom, self.max_zoom)
    }
}
