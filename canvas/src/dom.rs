//! Browser bindings for the DOM-facing traits.
//!
//! Nothing in here is unit tested; the logic lives behind [`OverlaySurface`]
//! and [`TextMeasurer`] and is tested against in-memory fakes.

use tracing::warn;
use web_sys::{CanvasRenderingContext2d, HtmlElement};

use crate::camera::Rect;
use crate::overlay::OverlaySurface;
use crate::text::{ApproxMetrics, Font, TextMeasurer};

/// An overlay `<div>` positioned over the rendering canvas.
pub struct DomOverlay {
    element: HtmlElement,
}

impl DomOverlay {
    #[must_use]
    pub fn new(element: HtmlElement) -> Self {
        Self { element }
    }
}

impl OverlaySurface for DomOverlay {
    fn is_connected(&self) -> bool {
        self.element.is_connected()
    }

    fn host_rect(&self) -> Rect {
        // The overlay itself is transformed; its parent is the stable host.
        let rect = match self.element.parent_element() {
            Some(host) => host.get_bounding_client_rect(),
            None => self.element.get_bounding_client_rect(),
        };
        Rect::new(rect.left(), rect.top(), rect.width(), rect.height())
    }

    fn set_style(&mut self, property: &str, value: &str) {
        if let Err(err) = self.element.style().set_property(property, value) {
            warn!(?err, property, "overlay style write failed");
        }
    }

    fn remove_style(&mut self, property: &str) {
        if let Err(err) = self.element.style().remove_property(property) {
            warn!(?err, property, "overlay style removal failed");
        }
    }
}

/// Text metrics from the canvas 2D context.
pub struct CanvasTextMeasurer {
    ctx: CanvasRenderingContext2d,
}

impl CanvasTextMeasurer {
    #[must_use]
    pub fn new(ctx: CanvasRenderingContext2d) -> Self {
        Self { ctx }
    }
}

impl TextMeasurer for CanvasTextMeasurer {
    fn text_width(&self, font: &Font, text: &str) -> f64 {
        self.ctx.set_font(&font.css());
        match self.ctx.measure_text(text) {
            Ok(metrics) => metrics.width(),
            Err(err) => {
                warn!(?err, "measureText failed; using approximate metrics");
                ApproxMetrics.text_width(font, text)
            }
        }
    }
}
