#![allow(clippy::float_cmp)]

use std::cell::Cell;

use super::*;
use crate::consts::DEFAULT_BUBBLE_PADDING;
use crate::text::ApproxMetrics;

/// Delegates to `ApproxMetrics` and counts how often it is asked.
#[derive(Default)]
struct CountingMetrics {
    calls: Cell<usize>,
}

impl TextMeasurer for CountingMetrics {
    fn text_width(&self, font: &Font, text: &str) -> f64 {
        self.calls.set(self.calls.get() + 1);
        ApproxMetrics.text_width(font, text)
    }
}

fn font16() -> Font {
    Font { size: 16.0, ..Font::default() }
}

const LINE: &str = "Watch out behind you";

// --- measurement cache ---

#[test]
fn identical_measurements_hit_the_cache() {
    let mut geo = BubbleGeometry::new(CountingMetrics::default());
    let first = geo.measure("Ora ora ora ora", &font16(), 120.0);
    let calls = geo.measurer().calls.get();
    assert!(calls > 0);

    let second = geo.measure("Ora ora ora ora", &font16(), 120.0);
    assert_eq!(first, second);
    assert_eq!(geo.measurer().calls.get(), calls);
    assert_eq!(geo.cache_len(), 1);
}

#[test]
fn any_key_component_change_remeasures() {
    let mut geo = BubbleGeometry::new(CountingMetrics::default());
    geo.measure("Hey", &font16(), 120.0);
    geo.measure("Hey", &font16(), 121.0);
    geo.measure("Hey", &font16().with_size(17.0), 120.0);
    geo.measure("Hey", &Font { weight: 700, ..font16() }, 120.0);
    geo.measure("Hey", &Font { style: FontStyle::Italic, ..font16() }, 120.0);
    geo.measure("Hey", &Font { family: "Bangers".into(), ..font16() }, 120.0);
    geo.measure("Hey!", &font16(), 120.0);
    assert_eq!(geo.cache_len(), 7);
}

#[test]
fn clear_cache_forces_remeasure() {
    let mut geo = BubbleGeometry::new(CountingMetrics::default());
    geo.measure("Hey", &font16(), 120.0);
    let calls = geo.measurer().calls.get();
    geo.clear_cache();
    assert_eq!(geo.cache_len(), 0);
    geo.measure("Hey", &font16(), 120.0);
    assert!(geo.measurer().calls.get() > calls);
}

// --- clamping ---

#[test]
fn short_text_yields_minimum_bubble() {
    let mut geo = BubbleGeometry::new(ApproxMetrics);
    let size = geo.compute_bubble_size("Hi", &font16(), DEFAULT_BUBBLE_PADDING, BubbleType::Speech);
    assert_eq!(size.width, MIN_BUBBLE_WIDTH);
    assert_eq!(size.height, MIN_BUBBLE_HEIGHT);
    assert!(size.recommended_font_size.is_none());
}

#[test]
fn long_single_word_clamps_and_recommends_smaller_font() {
    let mut geo = BubbleGeometry::new(ApproxMetrics);
    let word = "A".repeat(80);
    let size = geo.compute_bubble_size(&word, &font16(), DEFAULT_BUBBLE_PADDING, BubbleType::Speech);
    assert_eq!(size.width, MAX_BUBBLE_WIDTH);
    let recommended = size.recommended_font_size.expect("oversized text should recommend a font size");
    assert!(recommended < 16.0);
    // 80 * 0.55 * 16 = 704 text + 20 padding
    assert!((recommended - 16.0 * (400.0 / 724.0) * 0.9).abs() < 1e-9);
}

#[test]
fn tall_text_clamps_height() {
    let mut geo = BubbleGeometry::new(ApproxMetrics);
    let text = vec!["line"; 30].join("\n");
    let size = geo.compute_bubble_size(&text, &font16(), DEFAULT_BUBBLE_PADDING, BubbleType::Speech);
    assert_eq!(size.height, MAX_BUBBLE_HEIGHT);
    assert!(size.recommended_font_size.is_some_and(|s| s < 16.0));
}

#[test]
fn negative_padding_is_treated_as_zero() {
    let mut geo = BubbleGeometry::new(ApproxMetrics);
    let a = geo.compute_bubble_size(LINE, &font16(), -5.0, BubbleType::Speech);
    let b = geo.compute_bubble_size(LINE, &font16(), 0.0, BubbleType::Speech);
    assert_eq!(a, b);
}

// --- type adjustments ---

#[test]
fn shout_is_wider_than_speech() {
    let mut geo = BubbleGeometry::new(ApproxMetrics);
    let speech = geo.compute_bubble_size(LINE, &font16(), DEFAULT_BUBBLE_PADDING, BubbleType::Speech);
    let shout = geo.compute_bubble_size(LINE, &font16(), DEFAULT_BUBBLE_PADDING, BubbleType::Shout);
    assert!(shout.width >= speech.width * 1.1);
}

#[test]
fn whisper_is_narrower_than_speech() {
    let mut geo = BubbleGeometry::new(ApproxMetrics);
    let speech = geo.compute_bubble_size(LINE, &font16(), DEFAULT_BUBBLE_PADDING, BubbleType::Speech);
    let whisper = geo.compute_bubble_size(LINE, &font16(), DEFAULT_BUBBLE_PADDING, BubbleType::Whisper);
    assert!(whisper.width <= speech.width * 0.95);
}

#[test]
fn type_scaling_holds_at_the_minimum_size() {
    let mut geo = BubbleGeometry::new(ApproxMetrics);
    let speech = geo.compute_bubble_size("Hi", &font16(), DEFAULT_BUBBLE_PADDING, BubbleType::Speech);
    let shout = geo.compute_bubble_size("Hi", &font16(), DEFAULT_BUBBLE_PADDING, BubbleType::Shout);
    let whisper = geo.compute_bubble_size("Hi", &font16(), DEFAULT_BUBBLE_PADDING, BubbleType::Whisper);

    assert_eq!(speech.width, MIN_BUBBLE_WIDTH);
    assert!(shout.width >= speech.width * 1.1);
    assert!(whisper.width <= speech.width * 0.95);
}

#[test]
fn type_scaling_holds_at_the_maximum_size() {
    let mut geo = BubbleGeometry::new(ApproxMetrics);
    let word = "A".repeat(80);
    let speech = geo.compute_bubble_size(&word, &font16(), DEFAULT_BUBBLE_PADDING, BubbleType::Speech);
    let shout = geo.compute_bubble_size(&word, &font16(), DEFAULT_BUBBLE_PADDING, BubbleType::Shout);
    let whisper = geo.compute_bubble_size(&word, &font16(), DEFAULT_BUBBLE_PADDING, BubbleType::Whisper);

    assert_eq!(speech.width, MAX_BUBBLE_WIDTH);
    assert!(shout.width >= speech.width * 1.1);
    assert!(whisper.width <= speech.width * 0.95);
}

#[test]
fn shout_recommendation_uses_adjusted_unclamped_width() {
    let mut geo = BubbleGeometry::new(ApproxMetrics);
    let word = "A".repeat(80);
    let shout = geo.compute_bubble_size(&word, &font16(), DEFAULT_BUBBLE_PADDING, BubbleType::Shout);
    let recommended = shout.recommended_font_size.expect("oversized shout should recommend a font size");
    // (704 text + 20 padding) * 1.2
    assert!((recommended - 16.0 * (400.0 / (724.0 * 1.2)) * 0.9).abs() < 1e-9);
}

#[test]
fn thought_bubble_is_square() {
    let mut geo = BubbleGeometry::new(ApproxMetrics);
    let size = geo.compute_bubble_size(LINE, &font16(), DEFAULT_BUBBLE_PADDING, BubbleType::Thought);
    assert_eq!(size.width, size.height);
}

#[test]
fn adjust_for_type_constants() {
    assert_eq!(adjust_for_type(BubbleType::Speech, 100.0, 50.0), (100.0, 50.0));
    assert_eq!(adjust_for_type(BubbleType::Thought, 100.0, 50.0), (100.0, 100.0));
    let (w, h) = adjust_for_type(BubbleType::Explosion, 100.0, 50.0);
    assert!((w - 130.0).abs() < 1e-9 && (h - 60.0).abs() < 1e-9);
    let (w, h) = adjust_for_type(BubbleType::Shout, 100.0, 50.0);
    assert!((w - 120.0).abs() < 1e-9 && (h - 55.0).abs() < 1e-9);
}

// --- fitting ---

#[test]
fn fit_text_keeps_font_when_it_fits() {
    let mut geo = BubbleGeometry::new(ApproxMetrics);
    let fitted = geo.fit_text(LINE, &font16(), DEFAULT_BUBBLE_PADDING, BubbleType::Speech);
    assert_eq!(fitted.font, font16());
    assert_eq!(fitted.lines, vec![LINE]);
}

#[test]
fn fit_text_shrinks_oversized_text() {
    let mut geo = BubbleGeometry::new(ApproxMetrics);
    let text = "NOOO ".repeat(200);
    let fitted = geo.fit_text(&text, &font16(), DEFAULT_BUBBLE_PADDING, BubbleType::Speech);
    assert!(fitted.font.size < 16.0);
    assert!(fitted.lines.len() > 1);
}
