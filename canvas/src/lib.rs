//! Page editor core for the manga layout canvas.
//!
//! This crate is compiled to WebAssembly and runs in the browser. It owns the
//! view transform of the page being edited, converts between screen and
//! canvas coordinates, keeps the HTML overlay registered with the rendered
//! canvas, and sizes dialogue bubbles around their text. The host JavaScript
//! layer wires DOM events to a [`wasm::EditorHandle`] and persists the resulting
//! [`engine::Action`]s to the server.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level engine and testable [`engine::EditorCore`] |
//! | [`camera`] | View transform and coordinate conversions |
//! | [`store`] | Observable transform store |
//! | [`overlay`] | HTML layer synchronizer |
//! | [`doc`] | Page layout store and element types |
//! | [`bubble`] | Bubble sizing with a measurement cache |
//! | [`tail`] | Bubble tail configuration and geometry |
//! | [`text`] | Fonts, text measurement, word wrap |
//! | [`input`] | Input event types and the gesture state machine |
//! | [`render`] | Scene rendering |
//! | [`dom`] | `web_sys` implementations of the DOM-facing traits |
//! | [`wasm`] | `wasm_bindgen` handle the host page drives |
//! | [`consts`] | Shared numeric constants (zoom limits, bubble bounds, etc.) |

pub mod bubble;
pub mod camera;
pub mod consts;
pub mod doc;
pub mod dom;
pub mod engine;
pub mod input;
pub mod overlay;
pub mod render;
pub mod store;
pub mod tail;
pub mod text;
pub mod wasm;
