//! The rendering-context capability.
//!
//! Figures never talk to an output format directly. They measure text and
//! issue draw calls through a [`RenderContext`] that the host injects: an
//! SVG canvas, a deterministic measuring context for tests, or anything else
//! that can measure a string and draw a handful of shapes.

use serde::Deserialize;

use crate::{
    color::Color,
    draw::{Layer, Rotation, StrokeDefinition, TextStyle},
    geometry::{Bounds, Path, Point},
};

/// Result of measuring a single-line text run.
///
/// Contexts that cannot report font metrics leave `font_ascent` and
/// `font_descent` empty; text layout treats that as a fatal capability gap.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TextMetrics {
    pub width: f32,
    pub font_ascent: Option<f32>,
    pub font_descent: Option<f32>,
}

impl TextMetrics {
    pub fn new(width: f32, font_ascent: f32, font_descent: f32) -> Self {
        Self {
            width,
            font_ascent: Some(font_ascent),
            font_descent: Some(font_descent),
        }
    }

    /// Metrics carrying only an advance width.
    pub fn width_only(width: f32) -> Self {
        Self {
            width,
            font_ascent: None,
            font_descent: None,
        }
    }
}

/// Horizontal alignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HAlign {
    #[default]
    Left,
    Center,
    Right,
}

impl HAlign {
    /// Offset of an item of `extent` inside a slot of `available` length.
    pub fn offset(self, available: f32, extent: f32) -> f32 {
        match self {
            Self::Left => 0.0,
            Self::Center => (available - extent) / 2.0,
            Self::Right => available - extent,
        }
    }
}

/// Vertical alignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VAlign {
    #[default]
    Top,
    Middle,
    Bottom,
}

impl VAlign {
    /// Offset of an item of `extent` inside a slot of `available` length.
    pub fn offset(self, available: f32, extent: f32) -> f32 {
        match self {
            Self::Top => 0.0,
            Self::Middle => (available - extent) / 2.0,
            Self::Bottom => available - extent,
        }
    }
}

/// Alignment of a text block relative to its anchor point.
///
/// `horizontal` also aligns the lines inside a horizontal block. For
/// rotated text, line alignment is derived from `vertical` instead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TextAlign {
    pub horizontal: HAlign,
    pub vertical: VAlign,
}

impl TextAlign {
    pub fn new(horizontal: HAlign, vertical: VAlign) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }

    pub fn top_left() -> Self {
        Self::new(HAlign::Left, VAlign::Top)
    }

    pub fn centered() -> Self {
        Self::new(HAlign::Center, VAlign::Middle)
    }
}

/// Marker drawn at a chart data point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerShape {
    #[default]
    Circle,
    Square,
    Diamond,
}

/// Measurement and drawing capability injected into figure renderers.
///
/// Measurement takes `&self` so a context can be shared while figures are
/// measured; drawing takes `&mut self`.
pub trait RenderContext {
    /// Measures a single-line run of text.
    fn measure_text(&self, text: &str, style: &TextStyle) -> TextMetrics;

    /// Called by the render pipeline before the first primitive of each
    /// layer is drawn.
    fn enter_layer(&mut self, _layer: Layer) {}

    fn draw_rect(
        &mut self,
        bounds: Bounds,
        fill: Option<Color>,
        stroke: Option<&StrokeDefinition>,
        corner_radius: f32,
    );

    /// Draws an open polyline.
    fn draw_line(&mut self, points: &[Point], stroke: &StrokeDefinition);

    /// Fills (and optionally outlines) a closed path.
    fn draw_area(&mut self, path: &Path, fill: Option<Color>, stroke: Option<&StrokeDefinition>);

    fn draw_marker(
        &mut self,
        center: Point,
        radius: f32,
        shape: MarkerShape,
        fill: Color,
        stroke: Option<&StrokeDefinition>,
    );

    /// Draws a single run with its baseline starting at `origin`, rotated
    /// around `origin`.
    fn draw_text(&mut self, text: &str, origin: Point, style: &TextStyle, rotation: Rotation);
}
