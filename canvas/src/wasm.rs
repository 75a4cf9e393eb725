//! JavaScript entry point.
//!
//! The host page constructs one [`EditorHandle`] per open page and forwards
//! DOM events to it. Every handler that changes state returns the resulting
//! [`Action`]s as a JSON array, each tagged by an `action` field:
//!
//! ```text
//! [{"action":"transform_changed","x":12,"y":0,"scale":1.1},{"action":"render_needed"}]
//! ```
//!
//! Modifier keys arrive as a bitmask (see [`MOD_SHIFT`] and friends) and
//! pointer buttons as the DOM `MouseEvent.button` code.

use wasm_bindgen::prelude::*;
use web_sys::{HtmlCanvasElement, HtmlElement};

use crate::camera::{CanvasSize, Point};
use crate::engine::{Action, Engine};
use crate::input::{Button, Modifiers, Tool, WheelDelta};
use crate::tail::BubbleType;

#[cfg(test)]
#[path = "wasm_test.rs"]
mod wasm_test;

pub const MOD_SHIFT: u8 = 1;
pub const MOD_CTRL: u8 = 1 << 1;
pub const MOD_ALT: u8 = 1 << 2;
pub const MOD_META: u8 = 1 << 3;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BindingError {
    #[error("unknown tool: {0}")]
    UnknownTool(String),
    #[error("unknown bubble type: {0}")]
    UnknownBubbleType(String),
}

/// `select`, `hand`, or a bubble type name (`speech`, `shout`, ...).
///
/// # Errors
///
/// Returns [`BindingError::UnknownTool`] for any other name.
pub fn parse_tool(name: &str) -> Result<Tool, BindingError> {
    match name {
        "select" => Ok(Tool::Select),
        "hand" => Ok(Tool::Hand),
        other => parse_bubble_type(other)
            .map(Tool::Bubble)
            .map_err(|_| BindingError::UnknownTool(other.to_owned())),
    }
}

/// # Errors
///
/// Returns [`BindingError::UnknownBubbleType`] for names outside [`BubbleType`].
pub fn parse_bubble_type(name: &str) -> Result<BubbleType, BindingError> {
    serde_json::from_value(serde_json::Value::String(name.to_owned()))
        .map_err(|_| BindingError::UnknownBubbleType(name.to_owned()))
}

/// DOM `MouseEvent.button` code. Back/forward buttons map to `None`.
#[must_use]
pub fn button_from_code(code: i16) -> Option<Button> {
    match code {
        0 => Some(Button::Primary),
        1 => Some(Button::Middle),
        2 => Some(Button::Secondary),
        _ => None,
    }
}

#[must_use]
pub fn modifiers_from_bits(bits: u8) -> Modifiers {
    Modifiers {
        shift: bits & MOD_SHIFT != 0,
        ctrl: bits & MOD_CTRL != 0,
        alt: bits & MOD_ALT != 0,
        meta: bits & MOD_META != 0,
    }
}

/// # Errors
///
/// Returns the serializer error if an element cannot be encoded.
pub fn actions_json(actions: &[Action]) -> Result<String, serde_json::Error> {
    serde_json::to_string(actions)
}

fn js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn to_js(actions: &[Action]) -> Result<String, JsValue> {
    actions_json(actions).map_err(js_error)
}

/// Editor bound to one canvas and its HTML overlay.
#[wasm_bindgen]
pub struct EditorHandle {
    engine: Engine,
}

#[wasm_bindgen]
impl EditorHandle {
    /// # Errors
    ///
    /// Returns `Err` if the canvas has no 2D context.
    #[wasm_bindgen(constructor)]
    pub fn new(
        canvas: &HtmlCanvasElement,
        overlay: HtmlElement,
        width: f64,
        height: f64,
    ) -> Result<EditorHandle, JsValue> {
        let engine = Engine::new(canvas, overlay, CanvasSize::new(width, height))?;
        Ok(Self { engine })
    }

    /// Replace the page with a saved layout.
    ///
    /// # Errors
    ///
    /// Returns `Err` for malformed layout JSON or duplicate element ids.
    pub fn load_layout(&mut self, json: &str) -> Result<(), JsValue> {
        self.engine.core.load_layout(json).map_err(js_error)
    }

    /// # Errors
    ///
    /// Returns `Err` if the layout cannot be encoded.
    pub fn layout_json(&self) -> Result<String, JsValue> {
        self.engine.core.layout.to_json().map_err(js_error)
    }

    /// # Errors
    ///
    /// Returns `Err` for an unknown tool name.
    pub fn set_tool(&mut self, name: &str) -> Result<(), JsValue> {
        let tool = parse_tool(name).map_err(js_error)?;
        self.engine.core.set_tool(tool);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `Err` if the actions cannot be encoded.
    pub fn set_viewport(&mut self, width_css: f64, height_css: f64, dpr: f64) -> Result<String, JsValue> {
        to_js(&self.engine.set_viewport(width_css, height_css, dpr))
    }

    /// # Errors
    ///
    /// Returns `Err` if the actions cannot be encoded.
    pub fn fit_to_view(&mut self) -> Result<String, JsValue> {
        to_js(&self.engine.core.fit_to_view())
    }

    /// # Errors
    ///
    /// Returns `Err` if the actions cannot be encoded.
    pub fn on_wheel(&mut self, x: f64, y: f64, dx: f64, dy: f64, modifiers: u8) -> Result<String, JsValue> {
        let actions =
            self.engine.core.on_wheel(Point::new(x, y), WheelDelta { dx, dy }, modifiers_from_bits(modifiers));
        to_js(&actions)
    }

    /// # Errors
    ///
    /// Returns `Err` if the actions cannot be encoded.
    pub fn pointer_down(&mut self, x: f64, y: f64, button: i16, modifiers: u8) -> Result<String, JsValue> {
        let Some(button) = button_from_code(button) else {
            return to_js(&[]);
        };
        to_js(&self.engine.core.on_pointer_down(Point::new(x, y), button, modifiers_from_bits(modifiers)))
    }

    /// # Errors
    ///
    /// Returns `Err` if the actions cannot be encoded.
    pub fn pointer_move(&mut self, x: f64, y: f64, modifiers: u8) -> Result<String, JsValue> {
        to_js(&self.engine.core.on_pointer_move(Point::new(x, y), modifiers_from_bits(modifiers)))
    }

    /// # Errors
    ///
    /// Returns `Err` if the actions cannot be encoded.
    pub fn pointer_up(&mut self, x: f64, y: f64, button: i16, modifiers: u8) -> Result<String, JsValue> {
        let Some(button) = button_from_code(button) else {
            return to_js(&[]);
        };
        to_js(&self.engine.core.on_pointer_up(Point::new(x, y), button, modifiers_from_bits(modifiers)))
    }

    /// Place a bubble centered on a canvas-space point.
    ///
    /// # Errors
    ///
    /// Returns `Err` for an unknown bubble type or a rejected insert.
    pub fn add_bubble(&mut self, text: &str, bubble_type: &str, x: f64, y: f64) -> Result<String, JsValue> {
        let bubble_type = parse_bubble_type(bubble_type).map_err(js_error)?;
        let action = self.engine.core.add_bubble(text, bubble_type, Point::new(x, y)).map_err(js_error)?;
        to_js(&[action])
    }

    /// # Errors
    ///
    /// Returns `Err` if `id` is not a bubble.
    pub fn set_bubble_text(&mut self, id: &str, text: &str) -> Result<String, JsValue> {
        let action = self.engine.core.set_bubble_text(id, text).map_err(js_error)?;
        to_js(&[action])
    }

    /// # Errors
    ///
    /// Returns `Err` if the actions cannot be encoded.
    pub fn delete_element(&mut self, id: &str) -> Result<String, JsValue> {
        to_js(&self.engine.core.delete_element(id))
    }

    /// Client coordinates of a DOM event to canvas space, as `[x, y]`.
    ///
    /// # Errors
    ///
    /// Returns `Err` when the overlay transform or the point is invalid.
    pub fn convert_event_coordinates(&self, client_x: f64, client_y: f64) -> Result<Box<[f64]>, JsValue> {
        let point = self.engine.convert_event_coordinates(Point::new(client_x, client_y)).map_err(js_error)?;
        Ok(Box::new([point.x, point.y]))
    }

    /// # Errors
    ///
    /// Returns `Err` if any `Canvas2D` call fails.
    pub fn render(&mut self) -> Result<(), JsValue> {
        self.engine.render()
    }

    pub fn destroy(&mut self) {
        self.engine.destroy();
    }
}
