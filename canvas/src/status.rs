//! Read-only per-element service status supplied by the floor map.
//!
//! The engine never mutates these; it only consults them when laying out
//! overlays for a render pass.

#[cfg(test)]
#[path = "status_test.rs"]
mod status_test;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::doc::ElementId;

/// Progress of one order wave (drinks, apps, mains, dessert).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaveState {
    Pending,
    Fired,
    Served,
}

/// One order wave in course order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wave {
    pub label: String,
    pub state: WaveState,
}

/// Snapshot of a table's live status.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusInfo {
    /// Guests currently seated. Zero means the table is free.
    #[serde(default)]
    pub guests: u32,
    /// When the party was seated, in epoch milliseconds.
    #[serde(default)]
    pub seated_at_ms: Option<f64>,
    #[serde(default)]
    pub waves: Vec<Wave>,
    #[serde(default)]
    pub alerts: Vec<String>,
    /// Display name of the assigned server.
    #[serde(default)]
    pub staff: Option<String>,
}

impl StatusInfo {
    #[must_use]
    pub fn is_occupied(&self) -> bool {
        self.guests > 0
    }

    /// Whole minutes since seating, or `None` when unseated or the clock runs backwards.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn elapsed_minutes(&self, now_ms: f64) -> Option<u64> {
        let seated = self.seated_at_ms?;
        let elapsed = now_ms - seated;
        if !self.is_occupied() || !elapsed.is_finite() || elapsed < 0.0 {
            return None;
        }
        Some((elapsed / 60_000.0).floor() as u64)
    }
}

/// Status snapshot for one render pass, keyed by element id.
pub type StatusMap = HashMap<ElementId, StatusInfo>;
