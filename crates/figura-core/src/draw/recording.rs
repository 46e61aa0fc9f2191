//! A deterministic [`RenderContext`] that records draw calls.
//!
//! Text is measured with fixed per-character metrics, so layout results do
//! not depend on the fonts installed on the machine. Every draw call is
//! appended to an in-memory log that tests (and hosts that only need
//! measurement) can inspect.

use crate::{
    color::Color,
    draw::{Layer, MarkerShape, RenderContext, Rotation, StrokeDefinition, TextMetrics, TextStyle},
    geometry::{Bounds, Path, Point},
};

/// A recorded drawing operation.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    EnterLayer(Layer),
    Rect {
        bounds: Bounds,
        fill: Option<Color>,
        stroke: Option<StrokeDefinition>,
    },
    Line {
        points: Vec<Point>,
        stroke: StrokeDefinition,
    },
    Area {
        path: Path,
        fill: Option<Color>,
    },
    Marker {
        center: Point,
        radius: f32,
        shape: MarkerShape,
    },
    Text {
        text: String,
        origin: Point,
        style: TextStyle,
        rotation: Rotation,
    },
}

/// Fixed-metrics measuring context with a draw log.
///
/// A character advances `char_width × font_size` (plus letter spacing);
/// ascent and descent are `0.8` and `0.2` of the font size.
///
/// # Examples
///
/// ```
/// # use figura_core::draw::{RecordingContext, RenderContext, TextStyle};
/// let ctx = RecordingContext::new().with_char_width(0.5);
/// let metrics = ctx.measure_text("abcd", &TextStyle::new("any", 10.0));
/// assert_eq!(metrics.width, 20.0);
/// assert_eq!(metrics.font_ascent, Some(8.0));
/// ```
#[derive(Debug, Clone)]
pub struct RecordingContext {
    char_width: f32,
    font_metrics: bool,
    calls: Vec<DrawCall>,
}

impl Default for RecordingContext {
    fn default() -> Self {
        Self {
            char_width: 0.6,
            font_metrics: true,
            calls: Vec::new(),
        }
    }
}

impl RecordingContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the advance of one character relative to the font size.
    pub fn with_char_width(mut self, char_width: f32) -> Self {
        self.char_width = char_width;
        self
    }

    /// A context that measures widths but cannot report ascent or descent.
    pub fn without_font_metrics(mut self) -> Self {
        self.font_metrics = false;
        self
    }

    pub fn calls(&self) -> &[DrawCall] {
        &self.calls
    }

    /// Drains the draw log.
    pub fn take_calls(&mut self) -> Vec<DrawCall> {
        std::mem::take(&mut self.calls)
    }

    /// Layers entered so far, in order.
    pub fn layers(&self) -> Vec<Layer> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                DrawCall::EnterLayer(layer) => Some(*layer),
                _ => None,
            })
            .collect()
    }

    /// Texts drawn so far, in order.
    pub fn texts(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                DrawCall::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl RenderContext for RecordingContext {
    fn measure_text(&self, text: &str, style: &TextStyle) -> TextMetrics {
        let chars = text.chars().count() as f32;
        let width = chars * (style.font_size() * self.char_width + style.letter_spacing());
        if self.font_metrics {
            TextMetrics::new(width, style.font_size() * 0.8, style.font_size() * 0.2)
        } else {
            TextMetrics::width_only(width)
        }
    }

    fn enter_layer(&mut self, layer: Layer) {
        self.calls.push(DrawCall::EnterLayer(layer));
    }

    fn draw_rect(
        &mut self,
        bounds: Bounds,
        fill: Option<Color>,
        stroke: Option<&StrokeDefinition>,
        _corner_radius: f32,
    ) {
        self.calls.push(DrawCall::Rect {
            bounds,
            fill,
            stroke: stroke.cloned(),
        });
    }

    fn draw_line(&mut self, points: &[Point], stroke: &StrokeDefinition) {
        self.calls.push(DrawCall::Line {
            points: points.to_vec(),
            stroke: stroke.clone(),
        });
    }

    fn draw_area(&mut self, path: &Path, fill: Option<Color>, _stroke: Option<&StrokeDefinition>) {
        self.calls.push(DrawCall::Area {
            path: path.clone(),
            fill,
        });
    }

    fn draw_marker(
        &mut self,
        center: Point,
        radius: f32,
        shape: MarkerShape,
        _fill: Color,
        _stroke: Option<&StrokeDefinition>,
    ) {
        self.calls.push(DrawCall::Marker {
            center,
            radius,
            shape,
        });
    }

    fn draw_text(&mut self, text: &str, origin: Point, style: &TextStyle, rotation: Rotation) {
        self.calls.push(DrawCall::Text {
            text: text.to_string(),
            origin,
            style: style.clone(),
            rotation,
        });
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;

    #[test]
    fn test_fixed_metrics_scale_with_font_size() {
        let ctx = RecordingContext::new().with_char_width(0.5);
        let metrics = ctx.measure_text("abc", &TextStyle::new("x", 20.0));
        assert_approx_eq!(f32, metrics.width, 30.0);
        assert_approx_eq!(f32, metrics.font_ascent.unwrap_or_default(), 16.0);
        assert_approx_eq!(f32, metrics.font_descent.unwrap_or_default(), 4.0);
    }

    #[test]
    fn test_without_font_metrics() {
        let ctx = RecordingContext::new().without_font_metrics();
        let metrics = ctx.measure_text("abc", &TextStyle::new("x", 10.0));
        assert!(metrics.font_ascent.is_none());
        assert!(metrics.width > 0.0);
    }

    #[test]
    fn test_calls_are_recorded_in_order() {
        let mut ctx = RecordingContext::new();
        ctx.enter_layer(Layer::Grid);
        ctx.draw_line(
            &[Point::new(0.0, 0.0), Point::new(1.0, 0.0)],
            &StrokeDefinition::default(),
        );
        ctx.enter_layer(Layer::Label);
        ctx.draw_text(
            "hi",
            Point::default(),
            &TextStyle::new("x", 10.0),
            Rotation::Horizontal,
        );

        assert_eq!(ctx.layers(), vec![Layer::Grid, Layer::Label]);
        assert_eq!(ctx.texts(), vec!["hi"]);
        assert_eq!(ctx.take_calls().len(), 4);
        assert!(ctx.calls().is_empty());
    }
}
