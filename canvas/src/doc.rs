//! Document model: placed elements, templates, and the ordered element store.
//!
//! This module defines what sits on the floor canvas (`PlacedElement`), the
//! catalog entries new elements are stamped from (`ElementTemplate`), and the
//! runtime store that owns the live element list (`ElementStore`).
//!
//! The persisted plan is an opaque JSON blob owned by the caller. It is decoded
//! here as-is; the only normalization is clamping dimensions to
//! [`MIN_ELEMENT_SIZE`] and opacity to `[0, 1]` so the size invariant holds
//! from the moment an element enters the store.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use serde::{Deserialize, Serialize};

use crate::camera::Point;
use crate::consts::MIN_ELEMENT_SIZE;
use crate::error::CanvasError;

/// Stable identifier for a placed element.
pub type ElementId = String;

/// Broad role of an element on the floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementCategory {
    /// Walls, floor zones, and other background geometry.
    Structural,
    /// Bars, host stands, plants, kitchen pass.
    Fixture,
    /// Stools, booths, and standalone seats.
    Seating,
    /// Dining tables (may be decorative when they carry no capacity).
    Table,
}

/// Shape family of a template. Decides the fill rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeFamily {
    Rectangle,
    Circle,
    Ellipse,
}

impl ShapeFamily {
    #[must_use]
    pub fn fill(self) -> FillShape {
        match self {
            Self::Rectangle => FillShape::Rectangle,
            Self::Circle | Self::Ellipse => FillShape::Ellipse,
        }
    }
}

/// Fill rule used for drawing and hit-testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FillShape {
    Rectangle,
    Ellipse,
}

/// Whether an element takes part in service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Seats guests; carries the seat count. Receives status overlays.
    Seated(u32),
    /// Background or decorative geometry.
    Decorative,
}

/// Fill shape × role: the only dispatch key the renderer and hit-tester use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementKind {
    pub fill: FillShape,
    pub role: Role,
}

/// Position, size, and rotation of an element in world units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// Left edge of the unrotated box.
    pub x: f64,
    /// Top edge of the unrotated box.
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Clockwise rotation in degrees around the box center.
    pub rotation: f64,
}

impl Pose {
    /// Center of the box.
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    /// Copy with width and height raised to at least [`MIN_ELEMENT_SIZE`].
    #[must_use]
    pub fn clamped(self) -> Self {
        Self {
            width: self.width.max(MIN_ELEMENT_SIZE),
            height: self.height.max(MIN_ELEMENT_SIZE),
            ..self
        }
    }
}

fn default_opacity() -> f64 {
    1.0
}

/// A shape instance on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedElement {
    /// Unique identifier for this element.
    pub id: ElementId,
    pub category: ElementCategory,
    pub shape: ShapeFamily,
    /// Catalog template this element was stamped from, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    /// Identifier shown to staff (table number, bar name). Falls back to `id`.
    #[serde(default)]
    pub label: String,
    /// Left edge of the bounding box in world coordinates.
    pub x: f64,
    /// Top edge of the bounding box in world coordinates.
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Clockwise rotation in degrees around the bounding-box center.
    #[serde(default)]
    pub rotation: f64,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    /// Seat count. Elements without one never receive status overlays.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
    /// Locked elements ignore move and resize gestures.
    #[serde(default)]
    pub locked: bool,
    /// Floor section name (patio, bar, main room).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
}

impl PlacedElement {
    #[must_use]
    pub fn pose(&self) -> Pose {
        Pose { x: self.x, y: self.y, width: self.width, height: self.height, rotation: self.rotation }
    }

    /// Overwrite the pose, clamping dimensions to the minimum.
    pub fn set_pose(&mut self, pose: Pose) {
        let pose = pose.clamped();
        self.x = pose.x;
        self.y = pose.y;
        self.width = pose.width;
        self.height = pose.height;
        self.rotation = pose.rotation;
    }

    #[must_use]
    pub fn kind(&self) -> ElementKind {
        let role = match (self.category, self.capacity) {
            (ElementCategory::Table | ElementCategory::Seating, Some(seats)) if seats > 0 => Role::Seated(seats),
            _ => Role::Decorative,
        };
        ElementKind { fill: self.shape.fill(), role }
    }

    /// Label to display, falling back to the id when no label is set.
    #[must_use]
    pub fn display_label(&self) -> &str {
        if self.label.is_empty() { &self.id } else { &self.label }
    }

    /// Unrotated bounding box.
    #[must_use]
    pub fn bounds(&self) -> Bounds {
        Bounds { min_x: self.x, min_y: self.y, max_x: self.x + self.width, max_y: self.y + self.height }
    }

    fn normalize(&mut self) {
        self.width = self.width.max(MIN_ELEMENT_SIZE);
        self.height = self.height.max(MIN_ELEMENT_SIZE);
        self.opacity = if self.opacity.is_finite() { self.opacity.clamp(0.0, 1.0) } else { 1.0 };
        if !self.rotation.is_finite() {
            self.rotation = 0.0;
        }
    }
}

/// Axis-aligned box in world units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    #[must_use]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point::new((self.min_x + self.max_x) * 0.5, (self.min_y + self.max_y) * 0.5)
    }

    #[must_use]
    pub fn union(self, other: Bounds) -> Bounds {
        Bounds {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Bounding box of all `elements`, or `None` when the iterator is empty.
    pub fn enclosing<'a>(elements: impl IntoIterator<Item = &'a PlacedElement>) -> Option<Bounds> {
        elements.into_iter().map(PlacedElement::bounds).reduce(Bounds::union)
    }
}

/// Catalog entry new elements are instantiated from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementTemplate {
    pub id: String,
    pub name: String,
    pub category: ElementCategory,
    pub shape: ShapeFamily,
    pub default_width: f64,
    pub default_height: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
}

impl ElementTemplate {
    /// Build a fresh element of the template's default size centered on `center`.
    #[must_use]
    pub fn instantiate(&self, id: ElementId, center: Point) -> PlacedElement {
        let mut el = PlacedElement {
            id,
            category: self.category,
            shape: self.shape,
            template_id: Some(self.id.clone()),
            label: String::new(),
            x: center.x - self.default_width * 0.5,
            y: center.y - self.default_height * 0.5,
            width: self.default_width,
            height: self.default_height,
            rotation: 0.0,
            opacity: 1.0,
            capacity: self.capacity,
            locked: false,
            section: None,
        };
        el.normalize();
        el
    }
}

/// Template lookup by id.
#[derive(Debug, Clone, Default)]
pub struct TemplateCatalog {
    templates: Vec<ElementTemplate>,
}

impl TemplateCatalog {
    #[must_use]
    pub fn new(templates: Vec<ElementTemplate>) -> Self {
        Self { templates }
    }

    /// Decode a catalog from a JSON array of templates.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::Decode`] when the blob is not a template array.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, CanvasError> {
        let templates: Vec<ElementTemplate> = serde_json::from_value(value.clone())?;
        Ok(Self { templates })
    }

    /// Look up a template by id.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::UnknownTemplate`] when no template has this id.
    pub fn get(&self, id: &str) -> Result<&ElementTemplate, CanvasError> {
        self.templates
            .iter()
            .find(|t| t.id == id)
            .ok_or_else(|| CanvasError::UnknownTemplate(id.to_owned()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ElementTemplate> {
        self.templates.iter()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PlanBlob {
    List(Vec<PlacedElement>),
    Wrapped { elements: Vec<PlacedElement> },
}

/// Ordered store of placed elements. List order is insertion order and breaks
/// ties inside a render layer.
#[derive(Debug, Clone, Default)]
pub struct ElementStore {
    elements: Vec<PlacedElement>,
}

impl ElementStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self { elements: Vec::new() }
    }

    /// Decode a persisted plan: either a bare element array or an object with
    /// an `elements` array. Other keys are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::Decode`] for an undecodable blob and
    /// [`CanvasError::DuplicateElementId`] when two elements share an id.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, CanvasError> {
        let elements = match serde_json::from_value::<PlanBlob>(value.clone())? {
            PlanBlob::List(elements) | PlanBlob::Wrapped { elements } => elements,
        };
        let mut store = Self::new();
        store.load_elements(elements)?;
        Ok(store)
    }

    /// Replace all elements with a full snapshot. On error the store is left unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::DuplicateElementId`] when two elements share an id.
    pub fn load_elements(&mut self, elements: Vec<PlacedElement>) -> Result<(), CanvasError> {
        let mut seen = std::collections::HashSet::new();
        for el in &elements {
            if !seen.insert(el.id.as_str()) {
                return Err(CanvasError::DuplicateElementId(el.id.clone()));
            }
        }
        self.elements = elements;
        for el in &mut self.elements {
            el.normalize();
        }
        Ok(())
    }

    /// Insert an element, replacing any element with the same id in place.
    pub fn insert(&mut self, mut el: PlacedElement) {
        el.normalize();
        if let Some(slot) = self.elements.iter_mut().find(|e| e.id == el.id) {
            *slot = el;
        } else {
            self.elements.push(el);
        }
    }

    /// Remove an element by id, returning it if it was present.
    pub fn remove(&mut self, id: &str) -> Option<PlacedElement> {
        let idx = self.elements.iter().position(|e| e.id == id)?;
        Some(self.elements.remove(idx))
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&PlacedElement> {
        self.elements.iter().find(|e| e.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Write a pose, clamped to the minimum size. Returns false if the element doesn't exist.
    pub fn set_pose(&mut self, id: &str, pose: Pose) -> bool {
        let Some(el) = self.elements.iter_mut().find(|e| e.id == id) else {
            return false;
        };
        el.set_pose(pose);
        true
    }

    /// All elements in list order.
    #[must_use]
    pub fn elements(&self) -> &[PlacedElement] {
        &self.elements
    }

    /// Bounding box of every element.
    #[must_use]
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::enclosing(&self.elements)
    }

    /// Bounding box of the elements in floor section `section`.
    #[must_use]
    pub fn section_bounds(&self, section: &str) -> Option<Bounds> {
        Bounds::enclosing(self.elements.iter().filter(|e| e.section.as_deref() == Some(section)))
    }

    /// Number of elements currently in the store.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns `true` if the store contains no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}
