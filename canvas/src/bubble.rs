//! Dialogue bubble sizing.
//!
//! Text is wrapped and measured through an injected [`TextMeasurer`]; results
//! are cached per `(text, font, max width)` for the lifetime of the
//! [`BubbleGeometry`] instance because measuring is the expensive part. The
//! cache never evicts on its own; callers that feed unbounded distinct text
//! should call [`BubbleGeometry::clear_cache`] periodically.
//!
//! Sizing runs in a fixed order: measure, add padding, clamp to the bubble
//! bounds, then apply the per-type adjustment, so a shout stays larger than a
//! speech bubble even at the floor or the ceiling. When the adjusted, unclamped
//! size does not fit the maximum bubble, a smaller font size is recommended
//! instead of clipping text.

#[cfg(test)]
#[path = "bubble_test.rs"]
mod bubble_test;

use std::collections::HashMap;

use crate::consts::{FONT_SHRINK_MARGIN, MAX_BUBBLE_HEIGHT, MAX_BUBBLE_WIDTH, MIN_BUBBLE_HEIGHT, MIN_BUBBLE_WIDTH};
use crate::tail::BubbleType;
use crate::text::{self, Font, FontStyle, TextBlock, TextMeasurer};

/// Final bubble dimensions in canvas units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BubbleSize {
    pub width: f64,
    pub height: f64,
    /// Present when the text needs a smaller font to fit the maximum bubble.
    pub recommended_font_size: Option<f64>,
}

/// Bubble size together with the font that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct FittedBubble {
    pub size: BubbleSize,
    pub font: Font,
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct MeasureKey {
    text: String,
    font_size: u64,
    family: String,
    weight: u16,
    style: FontStyle,
    max_width: u64,
}

impl MeasureKey {
    fn new(text: &str, font: &Font, max_width: f64) -> Self {
        Self {
            text: text.to_owned(),
            font_size: font.size.to_bits(),
            family: font.family.clone(),
            weight: font.weight,
            style: font.style,
            max_width: max_width.to_bits(),
        }
    }
}

/// Per-type size adjustment, applied to the clamped base size.
#[must_use]
pub fn adjust_for_type(bubble_type: BubbleType, width: f64, height: f64) -> (f64, f64) {
    match bubble_type {
        BubbleType::Speech => (width, height),
        BubbleType::Thought => {
            let side = width.max(height);
            (side, side)
        }
        BubbleType::Shout => (width * 1.2, height * 1.1),
        BubbleType::Whisper => (width * 0.9, height * 0.9),
        BubbleType::Explosion => (width * 1.3, height * 1.2),
    }
}

pub struct BubbleGeometry<M: TextMeasurer> {
    measurer: M,
    cache: HashMap<MeasureKey, TextBlock>,
}

impl<M: TextMeasurer> BubbleGeometry<M> {
    pub fn new(measurer: M) -> Self {
        Self { measurer, cache: HashMap::new() }
    }

    #[must_use]
    pub fn measurer(&self) -> &M {
        &self.measurer
    }

    #[must_use]
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Wrap and measure `text`, reusing a cached result for identical input.
    pub fn measure(&mut self, text: &str, font: &Font, max_width: f64) -> TextBlock {
        let key = MeasureKey::new(text, font, max_width);
        if let Some(block) = self.cache.get(&key) {
            return block.clone();
        }
        let block = text::measure(&self.measurer, text, font, max_width);
        self.cache.insert(key, block.clone());
        block
    }

    /// Size a bubble for `text`.
    pub fn compute_bubble_size(&mut self, text: &str, font: &Font, padding: f64, bubble_type: BubbleType) -> BubbleSize {
        self.layout(text, font, padding, bubble_type).0
    }

    /// Size a bubble and, when the text does not fit, re-set it once at the
    /// recommended font size.
    pub fn fit_text(&mut self, text: &str, font: &Font, padding: f64, bubble_type: BubbleType) -> FittedBubble {
        let (size, lines) = self.layout(text, font, padding, bubble_type);
        let Some(smaller) = size.recommended_font_size else {
            return FittedBubble { size, font: font.clone(), lines };
        };
        let font = font.with_size(smaller);
        let (size, lines) = self.layout(text, &font, padding, bubble_type);
        FittedBubble { size, font, lines }
    }

    fn layout(&mut self, text: &str, font: &Font, padding: f64, bubble_type: BubbleType) -> (BubbleSize, Vec<String>) {
        let padding = padding.max(0.0);
        let max_text_width = (MAX_BUBBLE_WIDTH - padding * 2.0).max(1.0);
        let block = self.measure(text, font, max_text_width);

        let base_width = block.width + padding * 2.0;
        let base_height = block.height + padding * 2.0;

        let (wanted_width, wanted_height) = adjust_for_type(bubble_type, base_width, base_height);
        let recommended_font_size = if wanted_width > MAX_BUBBLE_WIDTH || wanted_height > MAX_BUBBLE_HEIGHT {
            let ratio = (MAX_BUBBLE_WIDTH / wanted_width).min(MAX_BUBBLE_HEIGHT / wanted_height);
            Some(font.size * ratio * FONT_SHRINK_MARGIN)
        } else {
            None
        };

        let (width, height) = adjust_for_type(
            bubble_type,
            base_width.clamp(MIN_BUBBLE_WIDTH, MAX_BUBBLE_WIDTH),
            base_height.clamp(MIN_BUBBLE_HEIGHT, MAX_BUBBLE_HEIGHT),
        );
        let size = BubbleSize { width, height, recommended_font_size };
        (size, block.lines)
    }
}
