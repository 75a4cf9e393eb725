//! Page layout model: placed elements and the in-memory layout store.
//!
//! This module defines what sits on a manga page (`Element`, `ElementKind`),
//! the per-element canvas-space transform, the layer classification that
//! drives draw order, and the runtime store that owns every element of the
//! page being edited (`PageLayout`).
//!
//! Layouts arrive as JSON written by earlier editor versions. Those may carry
//! bubble tails in the old position-keyword form; [`PageLayout::from_json`]
//! converts them once at load time so nothing downstream has to.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::camera::{CanvasSize, Point};
use crate::tail::{BubbleType, QueueConfig};
use crate::text::Font;

/// Opaque element identifier, unique within a page.
pub type ElementId = String;

/// Classification used for z-ordering. Lower layers draw first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerType {
    Background,
    Panel,
    Character,
    Effect,
    Bubble,
    Text,
}

impl LayerType {
    #[must_use]
    pub fn rank(self) -> u8 {
        match self {
            Self::Background => 0,
            Self::Panel => 1,
            Self::Character => 2,
            Self::Effect => 3,
            Self::Bubble => 4,
            Self::Text => 5,
        }
    }
}

/// Placement of an element in canvas space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementTransform {
    /// Left edge of the bounding box.
    pub x: f64,
    /// Top edge of the bounding box.
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Clockwise rotation in degrees around the bounding-box center.
    #[serde(default)]
    pub rotation: f64,
    /// Opacity in `[0, 1]`.
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    /// Stacking order within the element's layer.
    #[serde(default)]
    pub z_index: i64,
}

fn default_alpha() -> f64 {
    1.0
}

impl ElementTransform {
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height, rotation: 0.0, alpha: 1.0, z_index: 0 }
    }

    /// Whether `pt` lies inside the (possibly rotated) bounding box.
    #[must_use]
    pub fn contains(&self, pt: Point) -> bool {
        let cx = self.x + self.width * 0.5;
        let cy = self.y + self.height * 0.5;
        let (sin, cos) = (-self.rotation.to_radians()).sin_cos();
        let dx = pt.x - cx;
        let dy = pt.y - cy;
        let lx = dx * cos - dy * sin;
        let ly = dx * sin + dy * cos;
        lx.abs() <= self.width.abs() * 0.5 && ly.abs() <= self.height.abs() * 0.5
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelData {
    #[serde(default = "default_border_width")]
    pub border_width: f64,
    #[serde(default = "default_border_color")]
    pub border_color: String,
}

fn default_border_width() -> f64 {
    3.0
}

fn default_border_color() -> String {
    "#000000".to_owned()
}

/// A dialogue bubble.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BubbleData {
    pub text: String,
    #[serde(default)]
    pub bubble_type: BubbleType,
    #[serde(default)]
    pub font: Font,
    /// Tail shape. Always present once the layout has been migrated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queue: Option<QueueConfig>,
    /// Panel this bubble belongs to. Lookup only; the panel does not own it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_panel_id: Option<ElementId>,
    /// Pre-angle tail direction keyword (`"bottom-left"`). Read, never written.
    #[serde(default, skip_serializing)]
    pub tail_position: Option<String>,
    /// Pre-queue tail angle in degrees. Read, never written.
    #[serde(default, skip_serializing)]
    pub tail_angle: Option<f64>,
}

impl BubbleData {
    #[must_use]
    pub fn new(text: impl Into<String>, bubble_type: BubbleType, font: Font) -> Self {
        Self {
            text: text.into(),
            bubble_type,
            font,
            queue: Some(QueueConfig::for_bubble_type(bubble_type)),
            parent_panel_id: None,
            tail_position: None,
            tail_angle: None,
        }
    }

    /// Convert legacy tail fields into a queue configuration.
    /// Returns `true` when anything changed.
    pub fn migrate_legacy_tail(&mut self) -> bool {
        let position = self.tail_position.take();
        let angle = self.tail_angle.take();
        if self.queue.is_some() {
            return position.is_some() || angle.is_some();
        }
        let mut queue = QueueConfig::from_legacy(self.bubble_type, position.as_deref());
        if let Some(angle) = angle.filter(|a| a.is_finite()) {
            queue.angle = angle.rem_euclid(360.0);
        }
        self.queue = Some(queue);
        true
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpriteData {
    /// Generated or uploaded image backing the sprite.
    pub asset_url: String,
    #[serde(default)]
    pub flip_x: bool,
}

/// What an element is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ElementKind {
    Panel(PanelData),
    Bubble(BubbleData),
    Sprite(SpriteData),
}

impl ElementKind {
    fn id_prefix(&self) -> &'static str {
        match self {
            Self::Panel(_) => "panel",
            Self::Bubble(_) => "bubble",
            Self::Sprite(_) => "sprite",
        }
    }
}

/// Anything placed on a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub id: ElementId,
    pub layer_type: LayerType,
    pub transform: ElementTransform,
    #[serde(flatten)]
    pub kind: ElementKind,
}

impl Element {
    #[must_use]
    pub fn as_bubble(&self) -> Option<&BubbleData> {
        match &self.kind {
            ElementKind::Bubble(bubble) => Some(bubble),
            _ => None,
        }
    }

    pub fn as_bubble_mut(&mut self) -> Option<&mut BubbleData> {
        match &mut self.kind {
            ElementKind::Bubble(bubble) => Some(bubble),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_panel(&self) -> bool {
        matches!(self.kind, ElementKind::Panel(_))
    }
}

/// Issues `"{kind}-{seq}-{random}"` element ids.
#[derive(Debug, Default)]
pub struct ElementIdGenerator {
    seq: u64,
}

impl ElementIdGenerator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_for(&mut self, kind: &ElementKind) -> ElementId {
        self.seq += 1;
        let suffix: String = Uuid::new_v4().simple().to_string().chars().take(8).collect();
        format!("{}-{}-{suffix}", kind.id_prefix(), self.seq)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error("invalid layout json: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("duplicate element id: {0}")]
    DuplicateId(ElementId),
    #[error("element not found: {0}")]
    NotFound(ElementId),
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredLayout {
    canvas_size: CanvasSize,
    #[serde(default)]
    elements: Vec<Element>,
}

/// In-memory store of the elements on one page.
pub struct PageLayout {
    canvas_size: CanvasSize,
    elements: HashMap<ElementId, Element>,
}

impl PageLayout {
    #[must_use]
    pub fn new(canvas_size: CanvasSize) -> Self {
        Self { canvas_size, elements: HashMap::new() }
    }

    /// Parse a persisted layout and migrate legacy bubble tails.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError`] for malformed JSON or duplicate ids.
    pub fn from_json(json: &str) -> Result<Self, LayoutError> {
        let stored: StoredLayout = serde_json::from_str(json)?;
        let mut layout = Self::new(stored.canvas_size);
        for element in stored.elements {
            layout.insert(element)?;
        }
        let migrated = layout.migrate_legacy_tails();
        if migrated > 0 {
            info!(migrated, "migrated legacy bubble tails");
        }
        Ok(layout)
    }

    /// Serialize in draw order.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::Parse`] if serialization fails.
    pub fn to_json(&self) -> Result<String, LayoutError> {
        let stored = StoredLayout {
            canvas_size: self.canvas_size,
            elements: self.sorted_elements().into_iter().cloned().collect(),
        };
        Ok(serde_json::to_string(&stored)?)
    }

    /// One-time conversion of every bubble's legacy tail fields.
    /// Returns the number of bubbles changed.
    pub fn migrate_legacy_tails(&mut self) -> usize {
        self.elements
            .values_mut()
            .filter_map(Element::as_bubble_mut)
            .map(BubbleData::migrate_legacy_tail)
            .filter(|changed| *changed)
            .count()
    }

    #[must_use]
    pub fn canvas_size(&self) -> CanvasSize {
        self.canvas_size
    }

    /// Add a new element.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::DuplicateId`] if the id is taken.
    pub fn insert(&mut self, element: Element) -> Result<(), LayoutError> {
        if self.elements.contains_key(&element.id) {
            return Err(LayoutError::DuplicateId(element.id));
        }
        self.elements.insert(element.id.clone(), element);
        Ok(())
    }

    /// Remove an element. Removing a panel clears the back-references of
    /// bubbles that pointed at it.
    pub fn remove(&mut self, id: &str) -> Option<Element> {
        let removed = self.elements.remove(id)?;
        if removed.is_panel() {
            for bubble in self.elements.values_mut().filter_map(Element::as_bubble_mut) {
                if bubble.parent_panel_id.as_deref() == Some(id) {
                    bubble.parent_panel_id = None;
                }
            }
        }
        Some(removed)
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Element> {
        self.elements.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Element> {
        self.elements.get_mut(id)
    }

    /// Replace an element's transform.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::NotFound`] for unknown ids.
    pub fn update_transform(&mut self, id: &str, transform: ElementTransform) -> Result<(), LayoutError> {
        let element = self.elements.get_mut(id).ok_or_else(|| LayoutError::NotFound(id.to_owned()))?;
        element.transform = transform;
        Ok(())
    }

    /// The panel a bubble points at, if it still exists and is a panel.
    #[must_use]
    pub fn parent_panel(&self, element: &Element) -> Option<&Element> {
        let parent_id = element.as_bubble()?.parent_panel_id.as_deref()?;
        self.elements.get(parent_id).filter(|e| e.is_panel())
    }

    /// All elements sorted by `(layer, z_index, id)` for draw order.
    #[must_use]
    pub fn sorted_elements(&self) -> Vec<&Element> {
        let mut elements: Vec<&Element> = self.elements.values().collect();
        elements.sort_by(|a, b| {
            a.layer_type
                .rank()
                .cmp(&b.layer_type.rank())
                .then_with(|| a.transform.z_index.cmp(&b.transform.z_index))
                .then_with(|| a.id.cmp(&b.id))
        });
        elements
    }

    /// Topmost element under a canvas-space point.
    #[must_use]
    pub fn hit_test(&self, pt: Point) -> Option<&Element> {
        self.sorted_elements()
            .into_iter()
            .rev()
            .find(|e| e.transform.contains(pt))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}
