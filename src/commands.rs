//! Headless engine runs behind the CLI subcommands.

#[cfg(test)]
#[path = "commands_test.rs"]
mod commands_test;

use std::fs;
use std::path::Path;

use floor_canvas::config::CanvasConfig;
use floor_canvas::engine::{Action, EngineCore};
use floor_canvas::error::CanvasError;
use floor_canvas::overlay::layout_overlay;
use floor_canvas::render::draw_order;
use floor_canvas::status::StatusMap;
use serde_json::{Value, json};
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON: {0}")]
    Decode(#[from] serde_json::Error),
    #[error(transparent)]
    Canvas(#[from] CanvasError),
    #[error("plan has no elements")]
    EmptyPlan,
    #[error("no elements in section `{0}`")]
    UnknownSection(String),
}

pub fn read_json(path: &Path) -> Result<Value, CliError> {
    let text = fs::read_to_string(path).map_err(|source| CliError::Io { path: path.display().to_string(), source })?;
    Ok(serde_json::from_str(&text)?)
}

/// Config from `path` (defaults when absent), with the padding flag applied on top.
pub fn load_config(path: Option<&Path>, padding: Option<f64>) -> Result<CanvasConfig, CliError> {
    let mut config = match path {
        Some(path) => CanvasConfig::from_json(&read_json(path)?)?,
        None => CanvasConfig::default(),
    };
    if let Some(padding) = padding {
        config.fit_padding_px = padding;
    }
    config.validate()?;
    Ok(config)
}

pub fn load_statuses(path: Option<&Path>) -> Result<StatusMap, CliError> {
    match path {
        Some(path) => Ok(serde_json::from_value(read_json(path)?)?),
        None => Ok(StatusMap::new()),
    }
}

/// Engine settings shared by every subcommand.
#[derive(Debug, Clone)]
pub struct Headless {
    config: CanvasConfig,
    viewport_width: f64,
    viewport_height: f64,
}

impl Headless {
    pub fn new(config: CanvasConfig, viewport_width: f64, viewport_height: f64) -> Self {
        Self { config, viewport_width, viewport_height }
    }

    fn engine(&self, plan: &Value) -> Result<EngineCore, CliError> {
        let mut core = EngineCore::with_config(self.config.clone())?;
        core.set_viewport(self.viewport_width, self.viewport_height, 1.0);
        core.load_plan_json(plan)?;
        info!(elements = core.store.len(), "plan loaded");
        Ok(core)
    }

    pub fn fit(&self, plan: &Value) -> Result<Value, CliError> {
        let mut core = self.engine(plan)?;
        if core.store.is_empty() {
            return Err(CliError::EmptyPlan);
        }
        let actions = core.fit_to_content(0.0);
        Ok(camera_report(&core, &actions))
    }

    pub fn focus(&self, plan: &Value, section: &str) -> Result<Value, CliError> {
        let mut core = self.engine(plan)?;
        let actions = core.focus_section(section, 0.0);
        if actions.is_empty() {
            return Err(CliError::UnknownSection(section.to_owned()));
        }
        Ok(camera_report(&core, &actions))
    }

    pub fn scene(&self, plan: &Value, statuses: StatusMap, now_ms: f64) -> Result<Value, CliError> {
        let mut core = self.engine(plan)?;
        core.set_statuses(statuses);
        let scene = core.scene(now_ms);
        debug!(nodes = scene.nodes.len(), "scene built");
        Ok(json!({ "grid_size": scene.grid_size, "nodes": scene.nodes }))
    }

    /// One entry per seated element, in draw order.
    pub fn overlays(&self, plan: &Value, statuses: &StatusMap, now_ms: f64) -> Result<Value, CliError> {
        let core = self.engine(plan)?;
        let entries: Vec<Value> = draw_order(core.store.elements())
            .into_iter()
            .filter_map(|el| {
                let layout = layout_overlay(el, statuses.get(&el.id), now_ms, &self.config.overlay)?;
                Some(json!({ "id": el.id, "overlay": layout }))
            })
            .collect();
        Ok(Value::Array(entries))
    }
}

fn camera_report(core: &EngineCore, actions: &[Action]) -> Value {
    let duration_ms = actions.iter().find_map(|a| match a {
        Action::CameraTransition { duration_ms } => Some(*duration_ms),
        _ => None,
    });
    json!({ "view": core.view_state(), "transition_ms": duration_ms })
}
