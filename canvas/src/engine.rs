//! Canvas controller: one [`EngineCore`] per open canvas.
//!
//! The core owns the element store, camera, selection, the single active
//! gesture, the press being tracked for tap/long-press, and the scheduled
//! timers. Host events go in through the `on_*` handlers and come back out as
//! [`Action`]s for the host to persist, forward, or render. Nothing here is
//! global, so any number of canvases can coexist.

use serde::Serialize;
use tracing::{debug, trace};
use uuid::Uuid;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::camera::{Camera, Point};
use crate::config::CanvasConfig;
use crate::consts::ROTATE_STEP_DEG;
use crate::doc::{ElementId, ElementStore, ElementTemplate, PlacedElement, Pose, TemplateCatalog};
use crate::error::CanvasError;
use crate::gesture::{PinchStart, PressOutcome, PressRecord, pan_offset, wheel_zoom};
use crate::hit::{self, Hit, HitFilter, HitPart};
use crate::input::{Button, InputState, Key, Modifiers, Touch, UiState, WheelDelta};
use crate::manipulate::{ManipulationSession, SessionKind, normalize_rotation, snap};
use crate::render::{self, Scene, SceneHighlights, SelectionBox};
use crate::status::StatusMap;
use crate::timer::{TimerHandle, TimerTask, Timers};
use crate::viewport::{self, ViewportSize};

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    RenderNeeded,
    SetCursor(String),
    SelectionChanged(Option<ElementId>),
    ElementCreated(PlacedElement),
    /// A manipulation session (or rotate step) changed this element's pose.
    ElementUpdated { id: ElementId, pose: Pose },
    ElementDeleted { id: ElementId },
    ElementTapped { id: ElementId },
    ElementLongPressed { id: ElementId },
    /// Tap on empty floor, in world coordinates.
    CanvasTapped { world: Point },
    ViewChanged(CanvasViewState),
    /// The camera jumped to a new target; animate over `duration_ms`.
    CameraTransition { duration_ms: f64 },
}

/// Camera and grid state for chrome (zoom readout, mini-map).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CanvasViewState {
    pub zoom: f64,
    pub pan_x: f64,
    pub pan_y: f64,
    pub grid_size: f64,
}

/// Which surface this canvas backs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CanvasMode {
    /// Floor-plan builder: select, move, resize, place, delete.
    #[default]
    Edit,
    /// Live floor map: pan and zoom only; taps and long presses are reported.
    View,
}

/// Core engine state: all logic that doesn't depend on the canvas element.
///
/// Separated from `Engine` so it can be tested without WASM/browser dependencies.
#[derive(Debug)]
pub struct EngineCore {
    pub store: ElementStore,
    pub catalog: TemplateCatalog,
    /// Status snapshot for the next render pass. Never written by the engine.
    pub statuses: StatusMap,
    /// Caller-supplied highlight/dim/own flags. The selection comes from `ui`.
    pub highlights: SceneHighlights,
    pub camera: Camera,
    pub config: CanvasConfig,
    pub mode: CanvasMode,
    pub ui: UiState,
    pub input: InputState,
    /// Press being watched for tap, drag, or long press.
    pub press: Option<PressRecord>,
    pub timers: Timers,
    /// Pending end of the current camera transition.
    transition: Option<TimerHandle>,
    cursor: String,
    pub viewport_width: f64,
    pub viewport_height: f64,
    pub dpr: f64,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self::from_valid_config(CanvasConfig::default())
    }
}

impl EngineCore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Core with a host-supplied config.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::InvalidConfig`] when `config` fails
    /// [`CanvasConfig::validate`], e.g. `min_zoom` above `max_zoom`.
    pub fn with_config(config: CanvasConfig) -> Result<Self, CanvasError> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: CanvasConfig) -> Self {
        Self {
            store: ElementStore::new(),
            catalog: TemplateCatalog::default(),
            statuses: StatusMap::new(),
            highlights: SceneHighlights::default(),
            camera: Camera::default(),
            config,
            mode: CanvasMode::default(),
            ui: UiState::default(),
            input: InputState::default(),
            press: None,
            timers: Timers::new(),
            transition: None,
            cursor: "default".to_owned(),
            viewport_width: 0.0,
            viewport_height: 0.0,
            dpr: 1.0,
        }
    }

    // --- Data inputs ---

    /// Replace the element list with a full snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::DuplicateElementId`]; the previous list is kept.
    pub fn load_elements(&mut self, elements: Vec<PlacedElement>) -> Result<(), CanvasError> {
        self.cancel_gesture();
        self.store.load_elements(elements)?;
        self.drop_stale_selection();
        debug!(count = self.store.len(), "elements loaded");
        Ok(())
    }

    /// Replace the element list from a persisted plan blob.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::Decode`] or [`CanvasError::DuplicateElementId`];
    /// the previous list is kept.
    pub fn load_plan_json(&mut self, blob: &serde_json::Value) -> Result<(), CanvasError> {
        let store = ElementStore::from_json(blob)?;
        self.cancel_gesture();
        self.store = store;
        self.drop_stale_selection();
        debug!(count = self.store.len(), "plan loaded");
        Ok(())
    }

    /// Apply an external add or edit.
    pub fn upsert_element(&mut self, el: PlacedElement) {
        self.store.insert(el);
    }

    /// Apply an external delete.
    pub fn remove_element(&mut self, id: &str) -> Vec<Action> {
        let mut actions = Vec::new();
        if self.session_targets(id) {
            actions.extend(self.cancel_gesture());
        }
        if self.store.remove(id).is_none() {
            return actions;
        }
        if self.ui.selected_id.as_deref() == Some(id) {
            self.ui.selected_id = None;
            actions.push(Action::SelectionChanged(None));
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    pub fn set_catalog(&mut self, catalog: TemplateCatalog) {
        self.catalog = catalog;
    }

    pub fn set_statuses(&mut self, statuses: StatusMap) {
        self.statuses = statuses;
    }

    pub fn set_mode(&mut self, mode: CanvasMode) -> Vec<Action> {
        if self.mode == mode {
            return Vec::new();
        }
        let mut actions = self.cancel_gesture();
        self.mode = mode;
        self.ui.pending_template = None;
        if mode == CanvasMode::View && self.ui.selected_id.take().is_some() {
            actions.push(Action::SelectionChanged(None));
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Update viewport dimensions and device pixel ratio.
    pub fn set_viewport(&mut self, width_css: f64, height_css: f64, dpr: f64) {
        self.viewport_width = width_css;
        self.viewport_height = height_css;
        self.dpr = dpr;
    }

    pub fn set_grid_size(&mut self, grid_size: f64) -> Vec<Action> {
        self.config.grid_size = grid_size.max(0.0);
        vec![Action::ViewChanged(self.view_state()), Action::RenderNeeded]
    }

    /// While a text field has focus, Delete/Backspace/R belong to the field.
    pub fn set_text_input_focused(&mut self, focused: bool) {
        self.ui.text_input_focused = focused;
    }

    // --- Queries ---

    #[must_use]
    pub fn selection(&self) -> Option<&str> {
        self.ui.selected_id.as_deref()
    }

    #[must_use]
    pub fn camera(&self) -> Camera {
        self.camera
    }

    #[must_use]
    pub fn element(&self, id: &str) -> Option<&PlacedElement> {
        self.store.get(id)
    }

    #[must_use]
    pub fn view_state(&self) -> CanvasViewState {
        CanvasViewState {
            zoom: self.camera.zoom,
            pan_x: self.camera.pan_x,
            pan_y: self.camera.pan_y,
            grid_size: self.config.grid_size,
        }
    }

    #[must_use]
    pub fn is_transitioning(&self) -> bool {
        self.transition.is_some()
    }

    #[must_use]
    pub fn viewport(&self) -> ViewportSize {
        ViewportSize::new(self.viewport_width, self.viewport_height)
    }

    /// Paint-ready scene for the current state.
    #[must_use]
    pub fn scene(&self, now_ms: f64) -> Scene {
        let mut highlights = self.highlights.clone();
        highlights.selected.clone_from(&self.ui.selected_id);
        let nodes = render::build_scene(&self.store, Some(&self.statuses), &highlights, now_ms, &self.config.overlay);
        let selection = self.ui.selected_id.as_deref().and_then(|id| self.store.get(id)).map(|el| SelectionBox {
            pose: el.pose(),
            show_handles: self.mode == CanvasMode::Edit && !el.locked,
        });
        let grid_size = if self.mode == CanvasMode::Edit { self.config.grid_size } else { 0.0 };
        Scene { nodes, selection, grid_size }
    }

    // --- Pointer input ---

    pub fn on_pointer_down(&mut self, screen_pt: Point, button: Button, modifiers: Modifiers, now_ms: f64) -> Vec<Action> {
        let mut actions = Vec::new();
        if self.is_transitioning() || !self.input.is_idle() {
            return actions;
        }

        match button {
            Button::Secondary => return actions,
            Button::Middle => {
                self.start_pan(screen_pt, &mut actions);
                return actions;
            }
            Button::Primary => {}
        }

        if self.ui.space_held || modifiers.alt {
            self.start_pan(screen_pt, &mut actions);
            return actions;
        }

        let world = self.camera.screen_to_world(screen_pt);
        let hit = self.hit_at(world);

        match (self.mode, hit) {
            (CanvasMode::Edit, Some(Hit { element_id, part: HitPart::ResizeHandle(anchor) })) => {
                self.press = Some(PressRecord::new(screen_pt, now_ms, Some(element_id.clone())));
                self.begin_session(&element_id, SessionKind::Resize(anchor), world, &mut actions);
            }
            (CanvasMode::Edit, Some(Hit { element_id, part: HitPart::Body })) => {
                self.select(Some(element_id.clone()), &mut actions);
                self.begin_press(screen_pt, now_ms, Some(element_id.clone()));
                self.begin_session(&element_id, SessionKind::Move, world, &mut actions);
            }
            (CanvasMode::View, Some(Hit { element_id, .. })) => {
                self.begin_press(screen_pt, now_ms, Some(element_id));
                self.start_pan(screen_pt, &mut actions);
            }
            (CanvasMode::Edit, None) if self.ui.pending_template.is_some() => {
                if let Some(template) = self.ui.pending_template.clone() {
                    debug!(template = %template.id, "placement started");
                    self.input = InputState::Placing { template };
                    self.press = Some(PressRecord::new(screen_pt, now_ms, None));
                }
            }
            (_, None) => {
                self.press = Some(PressRecord::new(screen_pt, now_ms, None));
                self.start_pan(screen_pt, &mut actions);
            }
        }
        actions
    }

    pub fn on_pointer_move(&mut self, screen_pt: Point, _modifiers: Modifiers, _now_ms: f64) -> Vec<Action> {
        let mut actions = Vec::new();
        let thresholds = self.config.tap_thresholds();
        if let Some(press) = &mut self.press
            && press.track(screen_pt, &thresholds)
        {
            self.timers.cancel(&mut press.long_press);
        }

        if self.input.is_idle() {
            let cursor = self.hover_cursor(screen_pt);
            self.set_cursor(cursor, &mut actions);
            return actions;
        }

        match &self.input {
            InputState::Panning { start_screen, start_pan } => {
                let pan = pan_offset(*start_pan, *start_screen, screen_pt);
                self.camera.pan_x = pan.x;
                self.camera.pan_y = pan.y;
                actions.push(Action::ViewChanged(self.view_state()));
                actions.push(Action::RenderNeeded);
            }
            InputState::Manipulating(session) => {
                let world = self.camera.screen_to_world(screen_pt);
                let pose = session.pose_at(world, self.config.grid_size);
                let id = session.id.clone();
                if self.store.get(&id).is_some_and(|el| el.pose() != pose) {
                    trace!(id = %id, x = pose.x, y = pose.y, w = pose.width, h = pose.height, "pose");
                    self.store.set_pose(&id, pose);
                    actions.push(Action::RenderNeeded);
                }
            }
            InputState::Idle | InputState::Pinching(_) | InputState::Placing { .. } => {}
        }
        actions
    }

    pub fn on_pointer_up(&mut self, screen_pt: Point, _button: Button, _modifiers: Modifiers, now_ms: f64) -> Vec<Action> {
        let mut actions = Vec::new();
        let thresholds = self.config.tap_thresholds();
        let outcome = self.press.take().map(|mut press| {
            self.timers.cancel(&mut press.long_press);
            (press.classify(screen_pt, now_ms, &thresholds), press.target)
        });

        let placed = match std::mem::take(&mut self.input) {
            InputState::Manipulating(session) => {
                actions.extend(self.end_session(&session));
                false
            }
            InputState::Placing { template } => {
                let world = self.camera.screen_to_world(screen_pt);
                actions.extend(self.place(&template, world));
                true
            }
            InputState::Panning { .. } | InputState::Pinching(_) | InputState::Idle => false,
        };
        let cursor = if self.ui.pending_template.is_some() { "copy" } else { "default" };
        self.set_cursor(cursor, &mut actions);

        if !placed && let Some((PressOutcome::Tap, target)) = outcome {
            match target {
                Some(id) => actions.push(Action::ElementTapped { id }),
                None => {
                    actions.push(Action::CanvasTapped { world: self.camera.screen_to_world(screen_pt) });
                    if self.mode == CanvasMode::Edit {
                        self.select(None, &mut actions);
                    }
                }
            }
        }
        actions
    }

    /// Pointer left the canvas: abandon whatever was in progress.
    pub fn on_pointer_leave(&mut self) -> Vec<Action> {
        self.cancel_gesture()
    }

    pub fn on_wheel(&mut self, screen_pt: Point, delta: WheelDelta, _modifiers: Modifiers) -> Vec<Action> {
        if self.is_transitioning() || matches!(self.input, InputState::Manipulating(_) | InputState::Pinching(_)) {
            return Vec::new();
        }
        let Some(camera) = wheel_zoom(&self.camera, screen_pt, delta.dy, self.config.min_zoom, self.config.max_zoom)
        else {
            return Vec::new();
        };
        self.camera = camera;
        // A pan in progress continues from the new camera.
        if let InputState::Panning { start_screen, start_pan } = &mut self.input {
            *start_screen = screen_pt;
            *start_pan = camera.pan();
        }
        vec![Action::ViewChanged(self.view_state()), Action::RenderNeeded]
    }

    // --- Touch input ---

    /// `touches` lists every finger currently down, including the new one.
    pub fn on_touch_start(&mut self, touches: &[Touch], now_ms: f64) -> Vec<Action> {
        match touches {
            [single] => self.on_pointer_down(single.point, Button::Primary, Modifiers::default(), now_ms),
            [a, b, ..] => {
                let mut actions = self.cancel_gesture();
                if !self.is_transitioning() {
                    debug!(zoom = self.camera.zoom, "pinch started");
                    self.input = InputState::Pinching(PinchStart::new(*a, *b, &self.camera));
                }
                actions.push(Action::RenderNeeded);
                actions
            }
            [] => Vec::new(),
        }
    }

    pub fn on_touch_move(&mut self, touches: &[Touch], now_ms: f64) -> Vec<Action> {
        if let InputState::Pinching(start) = &self.input {
            let Some((a, b)) = start.find_points(touches) else {
                return Vec::new();
            };
            self.camera = start.camera_for(a, b, self.config.min_zoom, self.config.max_zoom);
            return vec![Action::ViewChanged(self.view_state()), Action::RenderNeeded];
        }
        match touches {
            [single] => self.on_pointer_move(single.point, Modifiers::default(), now_ms),
            _ => Vec::new(),
        }
    }

    /// `remaining` lists fingers still down; `lifted` is where the finger left.
    pub fn on_touch_end(&mut self, remaining: &[Touch], lifted: Point, now_ms: f64) -> Vec<Action> {
        if matches!(self.input, InputState::Pinching(_)) {
            debug!(zoom = self.camera.zoom, "pinch ended");
            self.input = InputState::Idle;
            return vec![Action::ViewChanged(self.view_state())];
        }
        if remaining.is_empty() {
            return self.on_pointer_up(lifted, Button::Primary, Modifiers::default(), now_ms);
        }
        Vec::new()
    }

    // --- Keyboard input ---

    pub fn on_key_down(&mut self, key: &Key, _modifiers: Modifiers) -> Vec<Action> {
        if key.is_space() {
            if !self.ui.text_input_focused {
                self.ui.space_held = true;
            }
            return Vec::new();
        }
        if key.is_escape() {
            let mut actions = self.cancel_gesture();
            if self.ui.pending_template.take().is_some() {
                self.set_cursor("default", &mut actions);
            }
            self.select(None, &mut actions);
            return actions;
        }
        if self.ui.text_input_focused || self.mode != CanvasMode::Edit {
            return Vec::new();
        }
        if key.is_delete() {
            return self.delete_selected();
        }
        if key.is_rotate() {
            return self.rotate_selected(ROTATE_STEP_DEG);
        }
        Vec::new()
    }

    pub fn on_key_up(&mut self, key: &Key, _modifiers: Modifiers) -> Vec<Action> {
        if key.is_space() {
            self.ui.space_held = false;
        }
        Vec::new()
    }

    // --- Editing ---

    /// Remove the selected element.
    pub fn delete_selected(&mut self) -> Vec<Action> {
        let Some(id) = self.ui.selected_id.clone() else {
            return Vec::new();
        };
        let mut actions = Vec::new();
        if self.session_targets(&id) {
            actions.extend(self.cancel_gesture());
        }
        self.ui.selected_id = None;
        if self.store.remove(&id).is_some() {
            debug!(id = %id, "element deleted");
            actions.push(Action::ElementDeleted { id });
        }
        actions.push(Action::SelectionChanged(None));
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Rotate the selected unlocked element by `step_deg`, normalized into `[0, 360)`.
    pub fn rotate_selected(&mut self, step_deg: f64) -> Vec<Action> {
        let Some(id) = self.ui.selected_id.clone() else {
            return Vec::new();
        };
        if self.session_targets(&id) {
            return Vec::new();
        }
        let Some(el) = self.store.get(&id).filter(|el| !el.locked) else {
            return Vec::new();
        };
        let pose = Pose { rotation: normalize_rotation(el.rotation + step_deg), ..el.pose() };
        self.store.set_pose(&id, pose);
        debug!(id = %id, rotation = pose.rotation, "element rotated");
        vec![Action::ElementUpdated { id, pose }, Action::RenderNeeded]
    }

    /// Arm `template` for placement by the next press on empty canvas.
    pub fn begin_placement(&mut self, template: ElementTemplate) -> Vec<Action> {
        let mut actions = Vec::new();
        if self.mode != CanvasMode::Edit {
            return actions;
        }
        self.ui.pending_template = Some(template);
        self.set_cursor("copy", &mut actions);
        actions
    }

    /// Drop catalog template `template_id` at `screen_pt` (HTML drag-and-drop).
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::UnknownTemplate`] when the catalog lacks the id.
    pub fn place_template_at(&mut self, template_id: &str, screen_pt: Point) -> Result<Vec<Action>, CanvasError> {
        let template = self.catalog.get(template_id)?.clone();
        if self.mode != CanvasMode::Edit {
            return Ok(Vec::new());
        }
        let world = self.camera.screen_to_world(screen_pt);
        Ok(self.place(&template, world))
    }

    // --- Camera operations ---

    /// Fit every element into the viewport. No-op on an empty plan.
    pub fn fit_to_content(&mut self, now_ms: f64) -> Vec<Action> {
        let Some(bounds) = self.store.bounds() else {
            return Vec::new();
        };
        let target = viewport::fit_to_content(
            &bounds,
            self.viewport(),
            self.config.fit_padding_px,
            self.config.min_zoom,
            self.config.max_zoom,
        );
        debug!(found = target.is_some(), "fit to content");
        self.transition_to(target, now_ms)
    }

    /// Focus floor section `name`. No-op if it has no elements.
    pub fn focus_section(&mut self, name: &str, now_ms: f64) -> Vec<Action> {
        let target = self
            .store
            .section_bounds(name)
            .and_then(|b| viewport::focus_region(&b, self.viewport(), &self.config));
        debug!(section = name, found = target.is_some(), "focus section");
        self.transition_to(target, now_ms)
    }

    /// Focus a single element (search jump).
    pub fn focus_element(&mut self, id: &str, now_ms: f64) -> Vec<Action> {
        let target = self
            .store
            .get(id)
            .and_then(|el| viewport::focus_region(&el.bounds(), self.viewport(), &self.config));
        debug!(id = id, found = target.is_some(), "focus element");
        self.transition_to(target, now_ms)
    }

    pub fn zoom_in(&mut self, now_ms: f64) -> Vec<Action> {
        let target = viewport::zoom_about_center(&self.camera, self.config.zoom_step, self.viewport(), &self.config);
        self.transition_to(target, now_ms)
    }

    pub fn zoom_out(&mut self, now_ms: f64) -> Vec<Action> {
        let target =
            viewport::zoom_about_center(&self.camera, 1.0 / self.config.zoom_step, self.viewport(), &self.config);
        self.transition_to(target, now_ms)
    }

    pub fn reset_zoom(&mut self, now_ms: f64) -> Vec<Action> {
        let target = viewport::zoom_to_about_center(&self.camera, 1.0, self.viewport(), &self.config);
        self.transition_to(target, now_ms)
    }

    /// The host finished animating the current camera move.
    pub fn on_transition_end(&mut self) -> Vec<Action> {
        if self.transition.is_none() {
            return Vec::new();
        }
        self.timers.cancel(&mut self.transition);
        vec![Action::RenderNeeded]
    }

    // --- Timers and lifecycle ---

    /// Fire every scheduled task due at `now_ms`.
    pub fn tick(&mut self, now_ms: f64) -> Vec<Action> {
        let mut actions = Vec::new();
        for (handle, task) in self.timers.fire_due(now_ms) {
            match task {
                TimerTask::LongPress { id } => {
                    let Some(press) = self.press.as_mut().filter(|p| p.long_press == Some(handle)) else {
                        continue;
                    };
                    press.long_press = None;
                    press.long_press_fired = true;
                    debug!(id = %id, "long press");
                    actions.push(Action::ElementLongPressed { id });
                }
                TimerTask::TransitionEnd => {
                    if self.transition == Some(handle) {
                        self.transition = None;
                        actions.push(Action::RenderNeeded);
                    }
                }
            }
        }
        actions
    }

    /// Drop all pending work; the canvas is going away.
    pub fn teardown(&mut self) {
        self.timers.clear();
        self.press = None;
        self.transition = None;
        self.input = InputState::Idle;
        self.ui.space_held = false;
    }

    // --- Internals ---

    fn hit_at(&self, world: Point) -> Option<Hit> {
        match self.mode {
            CanvasMode::Edit => hit::hit_test(world, &self.store, &self.camera, self.selection(), HitFilter::All),
            CanvasMode::View => hit::hit_test(world, &self.store, &self.camera, None, HitFilter::Seated),
        }
    }

    fn hover_cursor(&self, screen_pt: Point) -> &'static str {
        if self.ui.space_held {
            return "grab";
        }
        if self.ui.pending_template.is_some() {
            return "copy";
        }
        let world = self.camera.screen_to_world(screen_pt);
        match (self.mode, self.hit_at(world)) {
            (CanvasMode::Edit, Some(Hit { part: HitPart::ResizeHandle(anchor), .. })) => anchor.cursor(),
            (CanvasMode::Edit, Some(Hit { element_id, .. })) => {
                if self.store.get(&element_id).is_some_and(|el| el.locked) { "not-allowed" } else { "move" }
            }
            (CanvasMode::View, Some(_)) => "pointer",
            (_, None) => "default",
        }
    }

    fn set_cursor(&mut self, cursor: &str, actions: &mut Vec<Action>) {
        if self.cursor != cursor {
            cursor.clone_into(&mut self.cursor);
            actions.push(Action::SetCursor(cursor.to_owned()));
        }
    }

    fn select(&mut self, id: Option<ElementId>, actions: &mut Vec<Action>) {
        if self.ui.selected_id != id {
            self.ui.selected_id.clone_from(&id);
            actions.push(Action::SelectionChanged(id));
            actions.push(Action::RenderNeeded);
        }
    }

    fn drop_stale_selection(&mut self) {
        if self.ui.selected_id.as_deref().is_some_and(|id| !self.store.contains(id)) {
            self.ui.selected_id = None;
        }
    }

    fn session_targets(&self, id: &str) -> bool {
        matches!(&self.input, InputState::Manipulating(s) if s.id == id)
    }

    fn start_pan(&mut self, screen_pt: Point, actions: &mut Vec<Action>) {
        self.input = InputState::Panning { start_screen: screen_pt, start_pan: self.camera.pan() };
        self.set_cursor("grabbing", actions);
    }

    /// Track a press on an element and arm its long-press timer.
    fn begin_press(&mut self, screen_pt: Point, now_ms: f64, target: Option<ElementId>) {
        let mut press = PressRecord::new(screen_pt, now_ms, target.clone());
        if let Some(id) = target {
            press.long_press = Some(self.timers.schedule(now_ms + self.config.long_press_ms, TimerTask::LongPress { id }));
        }
        self.press = Some(press);
    }

    fn begin_session(&mut self, id: &str, kind: SessionKind, world: Point, actions: &mut Vec<Action>) {
        let Some(session) = self.store.get(id).and_then(|el| ManipulationSession::begin(el, kind, world)) else {
            trace!(id = id, "locked element, no session");
            return;
        };
        debug!(id = id, kind = ?session.kind, "session started");
        self.set_cursor(session.cursor(), actions);
        self.input = InputState::Manipulating(session);
    }

    /// Close a session. Poses were written live; report the result if it moved.
    fn end_session(&mut self, session: &ManipulationSession) -> Vec<Action> {
        let mut actions = Vec::new();
        if let Some(el) = self.store.get(&session.id) {
            let pose = el.pose();
            if pose != session.start_pose {
                debug!(id = %session.id, x = pose.x, y = pose.y, w = pose.width, h = pose.height, "session committed");
                actions.push(Action::ElementUpdated { id: session.id.clone(), pose });
            } else {
                debug!(id = %session.id, "session ended unchanged");
            }
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Abandon the current gesture, keeping whatever was already written.
    fn cancel_gesture(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();
        if let Some(mut press) = self.press.take() {
            self.timers.cancel(&mut press.long_press);
        }
        match std::mem::take(&mut self.input) {
            InputState::Manipulating(session) => {
                debug!(id = %session.id, "session cancelled");
                actions.extend(self.end_session(&session));
            }
            InputState::Idle => return actions,
            InputState::Panning { .. } => actions.push(Action::ViewChanged(self.view_state())),
            InputState::Pinching(_) | InputState::Placing { .. } => {}
        }
        let cursor = if self.ui.pending_template.is_some() { "copy" } else { "default" };
        self.set_cursor(cursor, &mut actions);
        actions
    }

    /// Instantiate `template` around the `world` point with its top-left snapped, and select it.
    fn place(&mut self, template: &ElementTemplate, world: Point) -> Vec<Action> {
        let grid = self.config.grid_size;
        let mut el = template.instantiate(Uuid::new_v4().to_string(), world);
        // Top-left lands on the grid; the release point stays roughly central.
        el.x = snap(el.x, grid);
        el.y = snap(el.y, grid);
        debug!(id = %el.id, template = %template.id, x = el.x, y = el.y, "element placed");
        self.store.insert(el.clone());
        self.ui.pending_template = None;
        let mut actions = vec![Action::ElementCreated(el.clone())];
        self.select(Some(el.id), &mut actions);
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Jump the camera to `target` and mark a transition of the computed duration,
    /// ending `duration_ms` after `now_ms`.
    fn transition_to(&mut self, target: Option<Camera>, now_ms: f64) -> Vec<Action> {
        let Some(target) = target else {
            return Vec::new();
        };
        let mut actions = self.cancel_gesture();
        self.timers.cancel(&mut self.transition);
        let duration_ms = viewport::transition_duration_ms(&self.config, self.viewport_width);
        self.camera = target;
        self.transition = Some(self.timers.schedule(now_ms + duration_ms, TimerTask::TransitionEnd));
        debug!(zoom = target.zoom, pan_x = target.pan_x, pan_y = target.pan_y, duration_ms, "camera transition");
        actions.push(Action::CameraTransition { duration_ms });
        actions.push(Action::ViewChanged(self.view_state()));
        actions.push(Action::RenderNeeded);
        actions
    }
}

/// The full canvas engine. Wraps `EngineCore` and owns the browser canvas element.
pub struct Engine {
    canvas: HtmlCanvasElement,
    pub core: EngineCore,
}

impl Engine {
    /// Create a new engine bound to the given canvas element.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::InvalidConfig`] for a config that fails validation.
    pub fn new(canvas: HtmlCanvasElement, config: CanvasConfig) -> Result<Self, CanvasError> {
        Ok(Self { canvas, core: EngineCore::with_config(config)? })
    }

    /// Update viewport dimensions and resize the backing store for `dpr`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn set_viewport(&mut self, width_css: f64, height_css: f64, dpr: f64) {
        self.core.set_viewport(width_css, height_css, dpr);
        self.canvas.set_width((width_css * dpr).round().max(0.0) as u32);
        self.canvas.set_height((height_css * dpr).round().max(0.0) as u32);
    }

    /// Draw the current state to the canvas.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the 2D context is unavailable or a draw call fails.
    pub fn render(&self, now_ms: f64) -> Result<(), JsValue> {
        let Some(ctx) = self.canvas.get_context("2d")? else {
            return Err(JsValue::from_str("2d context unavailable"));
        };
        let ctx: CanvasRenderingContext2d = ctx.dyn_into()?;
        let scene = self.core.scene(now_ms);
        render::draw(&ctx, &scene, &self.core.camera, self.core.viewport(), self.core.dpr)
    }

    /// Drop pending timers; call before discarding the engine.
    pub fn teardown(&mut self) {
        self.core.teardown();
    }
}
