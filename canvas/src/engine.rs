use std::cell::RefCell;
use std::rc::Rc;

use serde::Serialize;
use tracing::warn;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlElement};

use crate::bubble::BubbleGeometry;
use crate::camera::{CanvasSize, Point, Transform, TransformError, Viewport};
use crate::consts::{DEFAULT_BUBBLE_PADDING, FIT_MARGIN_PX};
use crate::doc::{
    BubbleData, Element, ElementId, ElementIdGenerator, ElementKind, ElementTransform, LayerType, LayoutError,
    PageLayout,
};
use crate::dom::{CanvasTextMeasurer, DomOverlay};
use crate::input::{Button, InputState, Modifiers, Tool, UiState, WheelDelta};
use crate::overlay::HtmlLayerSync;
use crate::render;
use crate::store::TransformStore;
use crate::tail::BubbleType;
use crate::text::{Font, TextMeasurer};

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    ElementCreated(Element),
    ElementUpdated(Element),
    ElementDeleted { id: ElementId },
    EditTextRequested { id: ElementId, text: String },
    TransformChanged(Transform),
    RenderNeeded,
}

/// Core editor state: all logic that doesn't depend on the browser.
///
/// Separated from `Engine` so it can be tested without WASM/browser dependencies.
pub struct EditorCore<M: TextMeasurer> {
    pub layout: PageLayout,
    pub transforms: TransformStore,
    pub bubbles: BubbleGeometry<M>,
    pub ids: ElementIdGenerator,
    pub ui: UiState,
    pub input: InputState,
    pub viewport: Viewport,
    pub dpr: f64,
}

impl<M: TextMeasurer> EditorCore<M> {
    pub fn new(measurer: M, canvas_size: CanvasSize) -> Self {
        Self {
            layout: PageLayout::new(canvas_size),
            transforms: TransformStore::default(),
            bubbles: BubbleGeometry::new(measurer),
            ids: ElementIdGenerator::new(),
            ui: UiState::default(),
            input: InputState::default(),
            viewport: Viewport::default(),
            dpr: 1.0,
        }
    }

    // --- Data inputs ---

    /// Replace the page with a persisted layout.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError`] if the JSON cannot be loaded.
    pub fn load_layout(&mut self, json: &str) -> Result<(), LayoutError> {
        self.layout = PageLayout::from_json(json)?;
        self.ui.selected_id = None;
        self.input = InputState::Idle;
        self.bubbles.clear_cache();
        Ok(())
    }

    /// Set the active tool.
    pub fn set_tool(&mut self, tool: Tool) {
        self.ui.tool = tool;
        self.input = InputState::Idle;
    }

    // --- Viewport ---

    /// Record the viewport size in CSS pixels and the device pixel ratio.
    pub fn set_viewport(&mut self, width_css: f64, height_css: f64, dpr: f64) -> Vec<Action> {
        self.viewport = Viewport::new(width_css.max(0.0), height_css.max(0.0));
        self.dpr = if dpr.is_finite() && dpr > 0.0 { dpr } else { 1.0 };
        vec![Action::RenderNeeded]
    }

    /// Center the page in the viewport at the largest scale that fits.
    pub fn fit_to_view(&mut self) -> Vec<Action> {
        let fitted = Transform::fit(self.viewport, self.layout.canvas_size(), FIT_MARGIN_PX);
        self.set_transform(fitted)
    }

    /// Screen point (relative to the canvas element) to canvas space, through
    /// the same device-pixel snapped transform the renderer draws with.
    ///
    /// # Errors
    ///
    /// Returns an error when the current transform or the point is invalid.
    pub fn screen_to_canvas(&self, screen_pt: Point) -> Result<Point, TransformError> {
        self.transforms.current().snapped(self.dpr).to_canvas(screen_pt)
    }

    // --- Input events ---

    pub fn on_wheel(&mut self, screen_pt: Point, delta: WheelDelta, modifiers: Modifiers) -> Vec<Action> {
        let current = self.transforms.current();
        if !modifiers.zoom_intent() {
            return self.set_transform(current.pan_by(-delta.dx, -delta.dy));
        }
        match current.zoom_at(screen_pt, delta.zoom_factor()) {
            Ok(next) => self.set_transform(next),
            Err(err) => {
                warn!(%err, "wheel zoom ignored");
                Vec::new()
            }
        }
    }

    /// Pan by a screen-space delta (touch drag, keyboard arrows).
    pub fn on_pan(&mut self, dx: f64, dy: f64) -> Vec<Action> {
        let next = self.transforms.current().pan_by(dx, dy);
        self.set_transform(next)
    }

    pub fn on_pointer_down(&mut self, screen_pt: Point, button: Button, _modifiers: Modifiers) -> Vec<Action> {
        if button == Button::Middle || self.ui.tool == Tool::Hand {
            self.input = InputState::Panning { last_screen: screen_pt };
            return Vec::new();
        }
        if button != Button::Primary {
            return Vec::new();
        }
        let world = match self.screen_to_canvas(screen_pt) {
            Ok(world) => world,
            Err(err) => {
                warn!(%err, "pointer down ignored");
                return Vec::new();
            }
        };

        match self.ui.tool {
            Tool::Bubble(bubble_type) => match self.add_bubble("", bubble_type, world) {
                Ok(created) => {
                    let mut actions = vec![created];
                    if let Some(id) = self.ui.selected_id.clone() {
                        actions.push(Action::EditTextRequested { id, text: String::new() });
                    }
                    actions.push(Action::RenderNeeded);
                    actions
                }
                Err(err) => {
                    warn!(%err, "bubble placement failed");
                    Vec::new()
                }
            },
            Tool::Select | Tool::Hand => {
                let hit = self.layout.hit_test(world).map(|e| e.id.clone());
                if let Some(id) = hit {
                    self.ui.selected_id = Some(id.clone());
                    self.input = InputState::DraggingElement { id, last_canvas: world, moved: false };
                } else {
                    self.ui.selected_id = None;
                    self.input = InputState::Panning { last_screen: screen_pt };
                }
                vec![Action::RenderNeeded]
            }
        }
    }

    pub fn on_pointer_move(&mut self, screen_pt: Point, _modifiers: Modifiers) -> Vec<Action> {
        match std::mem::take(&mut self.input) {
            InputState::Idle => Vec::new(),
            InputState::Panning { last_screen } => {
                self.input = InputState::Panning { last_screen: screen_pt };
                self.on_pan(screen_pt.x - last_screen.x, screen_pt.y - last_screen.y)
            }
            InputState::DraggingElement { id, last_canvas, moved } => {
                let Ok(world) = self.screen_to_canvas(screen_pt) else {
                    self.input = InputState::DraggingElement { id, last_canvas, moved };
                    return Vec::new();
                };
                let dx = world.x - last_canvas.x;
                let dy = world.y - last_canvas.y;
                if let Some(element) = self.layout.get_mut(&id) {
                    element.transform.x += dx;
                    element.transform.y += dy;
                }
                self.input = InputState::DraggingElement { id, last_canvas: world, moved: moved || dx != 0.0 || dy != 0.0 };
                vec![Action::RenderNeeded]
            }
        }
    }

    pub fn on_pointer_up(&mut self, _screen_pt: Point, _button: Button, _modifiers: Modifiers) -> Vec<Action> {
        match std::mem::take(&mut self.input) {
            InputState::DraggingElement { id, moved: true, .. } => {
                self.layout.get(&id).map(|e| Action::ElementUpdated(e.clone())).into_iter().collect()
            }
            _ => Vec::new(),
        }
    }

    // --- Bubbles ---

    /// Place a new bubble centered on `center` (canvas space), sized to its
    /// text. A bubble dropped onto a panel is linked to that panel.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError`] if the element cannot be inserted.
    pub fn add_bubble(&mut self, text: &str, bubble_type: BubbleType, center: Point) -> Result<Action, LayoutError> {
        let fitted = self.bubbles.fit_text(text, &Font::default(), DEFAULT_BUBBLE_PADDING, bubble_type);
        let parent_panel_id = self
            .layout
            .sorted_elements()
            .into_iter()
            .rev()
            .find(|e| e.is_panel() && e.transform.contains(center))
            .map(|e| e.id.clone());

        let mut data = BubbleData::new(text, bubble_type, fitted.font);
        data.parent_panel_id = parent_panel_id;
        let kind = ElementKind::Bubble(data);

        let width = fitted.size.width;
        let height = fitted.size.height;
        let element = Element {
            id: self.ids.next_for(&kind),
            layer_type: LayerType::Bubble,
            transform: ElementTransform {
                z_index: self.next_z(LayerType::Bubble),
                ..ElementTransform::new(center.x - width * 0.5, center.y - height * 0.5, width, height)
            },
            kind,
        };
        self.layout.insert(element.clone())?;
        self.ui.selected_id = Some(element.id.clone());
        Ok(Action::ElementCreated(element))
    }

    /// Commit edited text and resize the bubble around its current center.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::NotFound`] if `id` is not a bubble on this page.
    pub fn set_bubble_text(&mut self, id: &str, text: &str) -> Result<Action, LayoutError> {
        let Some(bubble_type) = self.layout.get(id).and_then(Element::as_bubble).map(|b| b.bubble_type) else {
            return Err(LayoutError::NotFound(id.to_owned()));
        };
        let fitted = self.bubbles.fit_text(text, &Font::default(), DEFAULT_BUBBLE_PADDING, bubble_type);
        let element = self.layout.get_mut(id).ok_or_else(|| LayoutError::NotFound(id.to_owned()))?;
        let t = &mut element.transform;
        let cx = t.x + t.width * 0.5;
        let cy = t.y + t.height * 0.5;
        t.width = fitted.size.width;
        t.height = fitted.size.height;
        t.x = cx - t.width * 0.5;
        t.y = cy - t.height * 0.5;
        if let Some(bubble) = element.as_bubble_mut() {
            bubble.text = text.to_owned();
            bubble.font = fitted.font;
        }
        Ok(Action::ElementUpdated(element.clone()))
    }

    /// Remove an element and drop it from the selection.
    pub fn delete_element(&mut self, id: &str) -> Vec<Action> {
        if self.layout.remove(id).is_none() {
            return Vec::new();
        }
        if self.ui.selected_id.as_deref() == Some(id) {
            self.ui.selected_id = None;
        }
        vec![Action::ElementDeleted { id: id.to_owned() }, Action::RenderNeeded]
    }

    // --- Queries ---

    #[must_use]
    pub fn transform(&self) -> Transform {
        self.transforms.current()
    }

    #[must_use]
    pub fn selection(&self) -> Option<&ElementId> {
        self.ui.selected_id.as_ref()
    }

    #[must_use]
    pub fn element(&self, id: &str) -> Option<&Element> {
        self.layout.get(id)
    }

    fn set_transform(&mut self, next: Transform) -> Vec<Action> {
        if let Err(err) = next.validate() {
            warn!(%err, "transform update rejected");
            return Vec::new();
        }
        self.transforms.set(next);
        vec![Action::TransformChanged(next), Action::RenderNeeded]
    }

    fn next_z(&self, layer: LayerType) -> i64 {
        self.layout
            .sorted_elements()
            .into_iter()
            .filter(|e| e.layer_type == layer)
            .map(|e| e.transform.z_index)
            .max()
            .map_or(0, |z| z + 1)
    }
}

/// The full editor. Wraps `EditorCore` and owns the browser elements.
pub struct Engine {
    ctx: CanvasRenderingContext2d,
    overlay: Rc<RefCell<HtmlLayerSync<DomOverlay>>>,
    pub core: EditorCore<CanvasTextMeasurer>,
}

impl Engine {
    /// Bind to a canvas element and the HTML overlay stacked above it.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the canvas has no 2D context.
    pub fn new(canvas: &HtmlCanvasElement, overlay: HtmlElement, canvas_size: CanvasSize) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("canvas has no 2d context"))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(JsValue::from)?;
        let mut core = EditorCore::new(CanvasTextMeasurer::new(ctx.clone()), canvas_size);
        let overlay = Rc::new(RefCell::new(HtmlLayerSync::new(DomOverlay::new(overlay), core.dpr)));
        HtmlLayerSync::attach(&overlay, &mut core.transforms);
        Ok(Self { ctx, overlay, core })
    }

    /// Update viewport dimensions and device pixel ratio.
    pub fn set_viewport(&mut self, width_css: f64, height_css: f64, dpr: f64) -> Vec<Action> {
        let actions = self.core.set_viewport(width_css, height_css, dpr);
        self.overlay.borrow_mut().set_device_pixel_ratio(self.core.dpr);
        self.core.transforms.notify();
        actions
    }

    /// Client coordinates of a DOM event to canvas space, through the overlay.
    ///
    /// # Errors
    ///
    /// Returns an error when the applied transform or the point is invalid.
    pub fn convert_event_coordinates(&self, client: Point) -> Result<Point, TransformError> {
        self.overlay.borrow().convert_event_coordinates(client)
    }

    /// Draw the current state to the canvas.
    ///
    /// # Errors
    ///
    /// Returns `Err` if any `Canvas2D` call fails.
    pub fn render(&mut self) -> Result<(), JsValue> {
        let core = &mut self.core;
        render::draw(
            &self.ctx,
            &core.layout,
            &mut core.bubbles,
            &core.transforms.current(),
            core.ui.selected_id.as_deref(),
            core.viewport,
            core.dpr,
        )
    }

    /// Detach the overlay from transform updates and clear its CSS transform.
    pub fn destroy(&mut self) {
        self.overlay.borrow_mut().destroy(&mut self.core.transforms);
    }
}
