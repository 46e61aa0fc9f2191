//! Font-backed text measurement with cosmic-text.

use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use cosmic_text::{Attrs, Buffer, Family, FontSystem, Metrics, Shaping, Style, Weight};
use log::{info, trace};

use crate::draw::{TextMetrics, TextStyle};

/// Advance width per character, relative to the font size, used when
/// shaping yields no glyphs.
const FALLBACK_CHAR_WIDTH: f32 = 0.55;
const FALLBACK_ASCENT: f32 = 0.8;
const FALLBACK_DESCENT: f32 = 0.2;

static FONT_MEASURER: OnceLock<FontMeasurer> = OnceLock::new();

/// Measures text runs against the system fonts.
///
/// A single [`FontSystem`] is shared process-wide; creating one scans the
/// installed fonts and is expensive.
pub struct FontMeasurer {
    font_system: Arc<Mutex<FontSystem>>,
}

impl FontMeasurer {
    fn new() -> Self {
        info!("Initializing FontSystem");
        Self {
            font_system: Arc::new(Mutex::new(FontSystem::new())),
        }
    }

    /// Returns the shared measurer, initializing it on first use.
    pub fn global() -> &'static Self {
        FONT_MEASURER.get_or_init(Self::new)
    }

    /// Measures a single-line run.
    ///
    /// Always reports ascent and descent: taken from the shaped line when
    /// available, estimated from the font size otherwise.
    pub fn measure(&self, text: &str, style: &TextStyle) -> TextMetrics {
        let font_size = style.font_size();
        let spacing = style.letter_spacing() * text.chars().count() as f32;
        if text.is_empty() || font_size <= 0.0 {
            return Self::estimate(text, style);
        }

        let mut font_system = self
            .font_system
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let metrics = Metrics::new(font_size, font_size);
        let mut buffer = Buffer::new(&mut font_system, metrics);
        let mut buffer = buffer.borrow_with(&mut font_system);

        let mut attrs = Attrs::new().family(Family::Name(style.font_family()));
        if style.bold() {
            attrs = attrs.weight(Weight::BOLD);
        }
        if style.italic() {
            attrs = attrs.style(Style::Italic);
        }

        buffer.set_size(None, None);
        buffer.set_text(text, &attrs, Shaping::Advanced, None);
        buffer.shape_until_scroll(true);

        let Some(run) = buffer.layout_runs().next() else {
            return Self::estimate(text, style);
        };
        let width = run.glyphs.last().map_or(0.0, |glyph| glyph.x + glyph.w);
        let ascent = run.line_y - run.line_top;
        let descent = run.line_top + run.line_height - run.line_y;

        trace!(text, width, ascent, descent; "Measured text run");
        TextMetrics::new(width + spacing, ascent, descent)
    }

    fn estimate(text: &str, style: &TextStyle) -> TextMetrics {
        let font_size = style.font_size();
        let chars = text.chars().count() as f32;
        TextMetrics::new(
            chars * (font_size * FALLBACK_CHAR_WIDTH + style.letter_spacing()),
            font_size * FALLBACK_ASCENT,
            font_size * FALLBACK_DESCENT,
        )
    }
}

#[cfg(test)]
mod tests {
    use std::ptr;

    use float_cmp::assert_approx_eq;

    use super::*;

    #[test]
    fn test_global_is_shared() {
        assert!(ptr::eq(FontMeasurer::global(), FontMeasurer::global()));
    }

    #[test]
    fn test_empty_text_has_metrics() {
        let style = TextStyle::new("sans-serif", 10.0);
        let metrics = FontMeasurer::global().measure("", &style);
        assert_approx_eq!(f32, metrics.width, 0.0);
        assert_approx_eq!(f32, metrics.font_ascent.unwrap_or_default(), 8.0);
        assert_approx_eq!(f32, metrics.font_descent.unwrap_or_default(), 2.0);
    }

    #[test]
    fn test_longer_text_is_wider() {
        let style = TextStyle::new("sans-serif", 12.0);
        let measurer = FontMeasurer::global();
        let short = measurer.measure("ab", &style);
        let long = measurer.measure("abcdefgh", &style);
        assert!(long.width > short.width);
        assert!(long.font_ascent.is_some());
        assert!(long.font_descent.is_some());
    }

    #[test]
    fn test_letter_spacing_adds_width() {
        let plain = TextStyle::new("sans-serif", 12.0);
        let spaced = plain.clone().with_letter_spacing(2.0);
        let measurer = FontMeasurer::global();
        let delta = measurer.measure("abcd", &spaced).width - measurer.measure("abcd", &plain).width;
        assert_approx_eq!(f32, delta, 8.0, epsilon = 0.01);
    }
}
