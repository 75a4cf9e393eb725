//! Rendering: draws a page layout to a 2D context.
//!
//! This module is the only place that draws to a
//! [`web_sys::CanvasRenderingContext2d`]. It reads layout state and the
//! current transform and produces pixels; it does not mutate application
//! state apart from warming the bubble measurement cache.
//!
//! The view transform is snapped to the device-pixel grid with
//! [`Transform::snapped`] and applied translate-then-scale, the same way
//! [`crate::overlay::HtmlLayerSync`] writes it to the DOM overlay.
//!
//! All fallible `Canvas2D` calls propagate errors via `Result<(), JsValue>`.

use std::f64::consts::PI;

use js_sys::Array;
use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use crate::bubble::BubbleGeometry;
use crate::camera::{Point, Rect, Transform, Viewport};
use crate::consts::DEFAULT_BUBBLE_PADDING;
use crate::doc::{BubbleData, Element, ElementKind, PageLayout, PanelData, SpriteData};
use crate::tail::{self, BubbleType, QueueConfig, QueueStyle};
use crate::text::TextMeasurer;

/// Selection outline dash length in screen pixels.
const SELECTION_DASH_PX: f64 = 4.0;

/// Spikes around a shout or explosion outline.
const SPIKE_COUNT: u32 = 16;

/// Draw the page: background, elements in layer order, selection outline.
///
/// `viewport` is in CSS pixels. `dpr` is the device pixel ratio.
///
/// # Errors
///
/// Returns `Err` if any `Canvas2D` call fails.
pub fn draw<M: TextMeasurer>(
    ctx: &CanvasRenderingContext2d,
    layout: &PageLayout,
    bubbles: &mut BubbleGeometry<M>,
    transform: &Transform,
    selected: Option<&str>,
    viewport: Viewport,
    dpr: f64,
) -> Result<(), JsValue> {
    let t = transform.snapped(dpr);

    ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0)?;
    ctx.clear_rect(0.0, 0.0, viewport.width, viewport.height);
    ctx.translate(t.x, t.y)?;
    ctx.scale(t.scale, t.scale)?;

    let page = layout.canvas_size();
    ctx.set_fill_style_str("#ffffff");
    ctx.fill_rect(0.0, 0.0, page.width, page.height);

    for element in layout.sorted_elements() {
        draw_element(ctx, element, bubbles)?;
    }

    if let Some(element) = selected.and_then(|id| layout.get(id)) {
        draw_selection(ctx, element, t.scale)?;
    }
    Ok(())
}

// =============================================================
// Element dispatch
// =============================================================

fn draw_element<M: TextMeasurer>(
    ctx: &CanvasRenderingContext2d,
    element: &Element,
    bubbles: &mut BubbleGeometry<M>,
) -> Result<(), JsValue> {
    let t = &element.transform;
    if t.width <= 0.0 || t.height <= 0.0 {
        return Ok(());
    }
    ctx.save();
    ctx.set_global_alpha(t.alpha.clamp(0.0, 1.0));
    translate_and_rotate(ctx, element)?;
    let frame = Rect::new(-t.width * 0.5, -t.height * 0.5, t.width, t.height);
    let drawn = match &element.kind {
        ElementKind::Panel(panel) => {
            draw_panel(ctx, frame, panel);
            Ok(())
        }
        ElementKind::Bubble(bubble) => draw_bubble(ctx, frame, bubble, bubbles),
        ElementKind::Sprite(sprite) => draw_sprite_placeholder(ctx, frame, sprite),
    };
    ctx.restore();
    drawn
}

fn draw_panel(ctx: &CanvasRenderingContext2d, frame: Rect, panel: &PanelData) {
    ctx.set_fill_style_str("#ffffff");
    ctx.fill_rect(frame.x, frame.y, frame.width, frame.height);
    ctx.set_stroke_style_str(&panel.border_color);
    ctx.set_line_width(panel.border_width.max(0.0));
    ctx.stroke_rect(frame.x, frame.y, frame.width, frame.height);
}

/// Sprites are composited by the host from `asset_url`; the canvas only
/// marks their footprint.
fn draw_sprite_placeholder(ctx: &CanvasRenderingContext2d, frame: Rect, sprite: &SpriteData) -> Result<(), JsValue> {
    if sprite.flip_x {
        ctx.scale(-1.0, 1.0)?;
    }
    ctx.set_stroke_style_str("rgba(31, 26, 23, 0.25)");
    ctx.set_line_width(1.0);
    ctx.stroke_rect(frame.x, frame.y, frame.width, frame.height);
    // Corner notch shows which way the sprite faces.
    ctx.begin_path();
    ctx.move_to(frame.x, frame.y + frame.height * 0.2);
    ctx.line_to(frame.x, frame.y);
    ctx.line_to(frame.x + frame.width * 0.2, frame.y);
    ctx.stroke();
    Ok(())
}

// =============================================================
// Bubbles
// =============================================================

fn draw_bubble<M: TextMeasurer>(
    ctx: &CanvasRenderingContext2d,
    frame: Rect,
    bubble: &BubbleData,
    bubbles: &mut BubbleGeometry<M>,
) -> Result<(), JsValue> {
    let fallback;
    let queue = match &bubble.queue {
        Some(q) => q,
        None => {
            fallback = QueueConfig::for_bubble_type(bubble.bubble_type);
            &fallback
        }
    };

    ctx.set_fill_style_str("#ffffff");
    ctx.set_stroke_style_str("#000000");
    ctx.set_line_width(if bubble.bubble_type == BubbleType::Whisper { 1.0 } else { 2.0 });
    if bubble.bubble_type == BubbleType::Whisper {
        let dash = js_dash(6.0, 4.0);
        ctx.set_line_dash(&dash)?;
    }

    ctx.begin_path();
    match bubble.bubble_type {
        BubbleType::Shout | BubbleType::Explosion => trace_spiked(ctx, frame, bubble.bubble_type),
        BubbleType::Speech | BubbleType::Thought | BubbleType::Whisper => {
            let c = frame.center();
            ctx.ellipse(c.x, c.y, frame.width * 0.5, frame.height * 0.5, 0.0, 0.0, 2.0 * PI)?;
        }
    }
    ctx.fill();
    ctx.stroke();

    if let Some(geometry) = tail::tail_geometry(frame, queue) {
        draw_tail(ctx, &geometry, queue.style);
    }

    draw_bubble_text(ctx, frame, bubble, bubbles)
}

fn draw_tail(ctx: &CanvasRenderingContext2d, geometry: &tail::TailGeometry, style: QueueStyle) {
    let Some((first, rest)) = geometry.points.split_first() else {
        return;
    };
    ctx.begin_path();
    ctx.move_to(first.x, first.y);
    match (style, geometry.control) {
        (QueueStyle::Curved, Some(control)) => {
            ctx.quadratic_curve_to(control.x, control.y, geometry.tip.x, geometry.tip.y);
            for p in rest.iter().skip(1) {
                ctx.line_to(p.x, p.y);
            }
        }
        _ => {
            for p in rest {
                ctx.line_to(p.x, p.y);
            }
        }
    }
    ctx.close_path();
    ctx.fill();
    ctx.stroke();
    // Paint over the outline where the tail joins the body.
    ctx.begin_path();
    ctx.move_to(first.x, first.y);
    if let Some(last) = rest.last() {
        ctx.line_to(last.x, last.y);
    }
    ctx.save();
    ctx.set_stroke_style_str("#ffffff");
    ctx.stroke();
    ctx.restore();
}

fn trace_spiked(ctx: &CanvasRenderingContext2d, frame: Rect, bubble_type: BubbleType) {
    let c = frame.center();
    let (n, depth) = if bubble_type == BubbleType::Explosion { (SPIKE_COUNT / 2, 0.7) } else { (SPIKE_COUNT, 0.88) };
    for i in 0..n * 2 {
        let angle = PI * f64::from(i) / f64::from(n);
        let r = if i % 2 == 0 { 1.0 } else { depth };
        let p = Point::new(c.x + angle.cos() * frame.width * 0.5 * r, c.y + angle.sin() * frame.height * 0.5 * r);
        if i == 0 {
            ctx.move_to(p.x, p.y);
        } else {
            ctx.line_to(p.x, p.y);
        }
    }
    ctx.close_path();
}

fn draw_bubble_text<M: TextMeasurer>(
    ctx: &CanvasRenderingContext2d,
    frame: Rect,
    bubble: &BubbleData,
    bubbles: &mut BubbleGeometry<M>,
) -> Result<(), JsValue> {
    if bubble.text.is_empty() {
        return Ok(());
    }
    let max_w = (frame.width - DEFAULT_BUBBLE_PADDING * 2.0).max(1.0);
    let block = bubbles.measure(&bubble.text, &bubble.font, max_w);
    let line_height = bubble.font.line_height();

    ctx.set_fill_style_str("#000000");
    ctx.set_text_align("center");
    ctx.set_text_baseline("middle");
    ctx.set_font(&bubble.font.css());

    let c = frame.center();
    let first_y = c.y - block.height * 0.5 + line_height * 0.5;
    let mut y = first_y;
    for line in &block.lines {
        ctx.fill_text(line, c.x, y)?;
        y += line_height;
    }
    Ok(())
}

// =============================================================
// Selection
// =============================================================

fn draw_selection(ctx: &CanvasRenderingContext2d, element: &Element, scale: f64) -> Result<(), JsValue> {
    let t = &element.transform;
    let px = 1.0 / scale.max(f64::EPSILON);
    ctx.save();
    translate_and_rotate(ctx, element)?;
    ctx.set_stroke_style_str("#1e6fff");
    ctx.set_line_width(px);
    let dash = js_dash(SELECTION_DASH_PX * px, SELECTION_DASH_PX * px);
    ctx.set_line_dash(&dash)?;
    ctx.stroke_rect(-t.width * 0.5, -t.height * 0.5, t.width, t.height);
    ctx.restore();
    Ok(())
}

// =============================================================
// Helpers
// =============================================================

fn translate_and_rotate(ctx: &CanvasRenderingContext2d, element: &Element) -> Result<(), JsValue> {
    let t = &element.transform;
    ctx.translate(t.x + t.width * 0.5, t.y + t.height * 0.5)?;
    ctx.rotate(t.rotation.to_radians())?;
    Ok(())
}

fn js_dash(on: f64, off: f64) -> Array {
    Array::of2(&JsValue::from_f64(on), &JsValue::from_f64(off))
}
