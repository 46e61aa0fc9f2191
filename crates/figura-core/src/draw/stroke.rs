//! Stroke and line-style definitions.
//!
//! Grid lines, axes, series lines and cell borders all share
//! [`StrokeDefinition`]. The naming follows SVG/CSS terminology.
//!
//! | Rust Property | SVG Attribute | Example Values |
//! |--------------|---------------|----------------|
//! | `color` | `stroke`, `stroke-opacity` | `"#000000"`, `0.5` |
//! | `width` | `stroke-width` | `2.0` |
//! | `style` | `stroke-dasharray` | `"5,5"`, `"10,5,2,5"` |

use std::str::FromStr;

use serde::Deserialize;

use crate::color::Color;

/// Visual style of a stroke, including dash patterns.
///
/// - `Solid`: No dasharray attribute
/// - `Dashed`: "5,5"
/// - `Dotted`: "2,3"
/// - `Custom(pattern)`: Uses the provided pattern string
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(from = "String")]
pub enum StrokeStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
    /// Custom SVG dasharray pattern, e.g. `"10,5,2,3"`
    Custom(String),
}

impl FromStr for StrokeStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s.to_string()))
    }
}

impl From<String> for StrokeStyle {
    fn from(s: String) -> Self {
        match s.as_str() {
            "solid" => Self::Solid,
            "dashed" => Self::Dashed,
            "dotted" => Self::Dotted,
            // Any other value is treated as a custom dasharray pattern
            _ => Self::Custom(s),
        }
    }
}

impl StrokeStyle {
    /// Returns the SVG dasharray value for this style, or None for solid lines
    pub fn to_svg_value(&self) -> Option<String> {
        match self {
            Self::Solid => None,
            Self::Dashed => Some("5,5".to_string()),
            Self::Dotted => Some("2,3".to_string()),
            Self::Custom(pattern) => Some(pattern.clone()),
        }
    }
}

/// A stroke definition for lines and borders.
///
/// # Examples
///
/// ```
/// use figura_core::draw::{StrokeDefinition, StrokeStyle};
/// use figura_core::color::Color;
///
/// let grid = StrokeDefinition::dashed(Color::new("#dddddd").unwrap(), 0.5);
/// assert_eq!(grid.style(), &StrokeStyle::Dashed);
///
/// let axis = StrokeDefinition::solid(Color::new("black").unwrap(), 1.0).scaled(2.0);
/// assert_eq!(axis.width(), 2.0);
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StrokeDefinition {
    #[serde(default)]
    color: Color,
    #[serde(default = "default_width")]
    width: f32,
    #[serde(default)]
    style: StrokeStyle,
}

fn default_width() -> f32 {
    1.0
}

impl StrokeDefinition {
    /// Creates a new solid stroke with the given color and width.
    pub fn new(color: Color, width: f32) -> Self {
        Self {
            color,
            width,
            style: StrokeStyle::Solid,
        }
    }

    /// Creates a solid stroke.
    pub fn solid(color: Color, width: f32) -> Self {
        Self::new(color, width)
    }

    /// Creates a dashed stroke.
    pub fn dashed(color: Color, width: f32) -> Self {
        let mut stroke = Self::new(color, width);
        stroke.set_style(StrokeStyle::Dashed);
        stroke
    }

    /// Returns the stroke color.
    pub fn color(&self) -> Color {
        self.color
    }

    /// Returns the stroke width.
    pub fn width(&self) -> f32 {
        self.width
    }

    /// Returns the stroke style.
    pub fn style(&self) -> &StrokeStyle {
        &self.style
    }

    /// Sets the stroke style.
    pub fn set_style(&mut self, style: StrokeStyle) {
        self.style = style;
    }

    /// Returns a copy with the width multiplied by `factor`.
    pub fn scaled(&self, factor: f32) -> Self {
        Self {
            width: self.width * factor,
            ..self.clone()
        }
    }

    /// Returns a copy with a different color.
    pub fn with_color(&self, color: Color) -> Self {
        Self {
            color,
            ..self.clone()
        }
    }
}

impl Default for StrokeDefinition {
    fn default() -> Self {
        Self::new(Color::default(), default_width())
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;

    #[test]
    fn test_stroke_style_from_str() {
        assert_eq!("solid".parse::<StrokeStyle>().unwrap(), StrokeStyle::Solid);
        assert_eq!("dashed".parse::<StrokeStyle>().unwrap(), StrokeStyle::Dashed);
        assert_eq!("dotted".parse::<StrokeStyle>().unwrap(), StrokeStyle::Dotted);
        assert_eq!(
            "4,2".parse::<StrokeStyle>().unwrap(),
            StrokeStyle::Custom("4,2".to_string())
        );
    }

    #[test]
    fn test_stroke_style_svg_value() {
        assert_eq!(StrokeStyle::Solid.to_svg_value(), None);
        assert_eq!(StrokeStyle::Dashed.to_svg_value().as_deref(), Some("5,5"));
        assert_eq!(StrokeStyle::Dotted.to_svg_value().as_deref(), Some("2,3"));
        assert_eq!(
            StrokeStyle::Custom("1,1".to_string()).to_svg_value().as_deref(),
            Some("1,1")
        );
    }

    #[test]
    fn test_stroke_default() {
        let stroke = StrokeDefinition::default();
        assert_eq!(stroke.color(), Color::default());
        assert_approx_eq!(f32, stroke.width(), 1.0);
        assert_eq!(stroke.style(), &StrokeStyle::Solid);
    }

    #[test]
    fn test_stroke_scaled_keeps_style() {
        let stroke = StrokeDefinition::dashed(Color::new("red").unwrap(), 1.5).scaled(2.0);
        assert_approx_eq!(f32, stroke.width(), 3.0);
        assert_eq!(stroke.style(), &StrokeStyle::Dashed);
    }

    #[test]
    fn test_stroke_with_color() {
        let blue = Color::new("blue").unwrap();
        let stroke = StrokeDefinition::default().with_color(blue);
        assert_eq!(stroke.color(), blue);
    }
}
