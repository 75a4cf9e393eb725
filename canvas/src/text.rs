//! Font description, the text-measurement seam, and greedy word wrapping.

#[cfg(test)]
#[path = "text_test.rs"]
mod text_test;

use serde::{Deserialize, Serialize};

use crate::consts::LINE_HEIGHT_RATIO;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

/// Font used to set bubble text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Font {
    /// Size in canvas pixels.
    pub size: f64,
    pub family: String,
    /// CSS numeric weight (400 regular, 700 bold).
    #[serde(default = "default_weight")]
    pub weight: u16,
    #[serde(default)]
    pub style: FontStyle,
}

fn default_weight() -> u16 {
    400
}

impl Default for Font {
    fn default() -> Self {
        Self { size: 16.0, family: "Comic Neue".to_owned(), weight: 400, style: FontStyle::Normal }
    }
}

impl Font {
    #[must_use]
    pub fn with_size(&self, size: f64) -> Self {
        Self { size, ..self.clone() }
    }

    /// CSS shorthand accepted by `CanvasRenderingContext2d::set_font`.
    #[must_use]
    pub fn css(&self) -> String {
        let style = match self.style {
            FontStyle::Normal => "normal",
            FontStyle::Italic => "italic",
        };
        format!("{style} {} {}px \"{}\"", self.weight, self.size, self.family)
    }

    #[must_use]
    pub fn line_height(&self) -> f64 {
        self.size * LINE_HEIGHT_RATIO
    }
}

/// Font metrics provider: pixel width of a single line of text.
pub trait TextMeasurer {
    fn text_width(&self, font: &Font, text: &str) -> f64;
}

/// Deterministic metrics from per-character advance estimates.
///
/// Used wherever no real font backend exists (server-side layout, tests).
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproxMetrics;

impl TextMeasurer for ApproxMetrics {
    fn text_width(&self, font: &Font, text: &str) -> f64 {
        let em: f64 = text.chars().map(advance_em).sum();
        let bold = if font.weight >= 600 { 1.05 } else { 1.0 };
        em * font.size * bold
    }
}

fn advance_em(ch: char) -> f64 {
    match ch {
        ' ' | 'i' | 'l' | 'j' | '.' | ',' | '\'' | '!' | '|' => 0.3,
        'm' | 'w' | 'M' | 'W' => 0.85,
        c if is_wide(c) => 1.0,
        _ => 0.55,
    }
}

fn is_wide(ch: char) -> bool {
    matches!(ch as u32,
        0x1100..=0x115F | 0x2E80..=0xA4CF | 0xAC00..=0xD7A3 | 0xF900..=0xFAFF | 0xFE30..=0xFE4F | 0xFF00..=0xFF60 | 0xFFE0..=0xFFE6)
}

/// A measured, wrapped block of text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub width: f64,
    pub height: f64,
    pub lines: Vec<String>,
}

/// Greedy word-wrap of `text` at `max_width`.
///
/// Explicit newlines always break. A single word wider than `max_width` stays
/// on its own line and overflows; it is never split.
pub fn measure<M: TextMeasurer + ?Sized>(measurer: &M, text: &str, font: &Font, max_width: f64) -> TextBlock {
    let mut lines = Vec::new();
    for raw_line in text.lines() {
        let mut current = String::new();
        for word in raw_line.split_whitespace() {
            if current.is_empty() {
                current.push_str(word);
                continue;
            }
            let candidate = format!("{current} {word}");
            if measurer.text_width(font, &candidate) <= max_width {
                current = candidate;
            } else {
                lines.push(std::mem::replace(&mut current, word.to_owned()));
            }
        }
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }

    let width = lines
        .iter()
        .map(|line| measurer.text_width(font, line))
        .fold(0.0_f64, f64::max);
    #[allow(clippy::cast_precision_loss)]
    let height = lines.len() as f64 * font.line_height();
    TextBlock { width, height, lines }
}
