//! Text style definitions.
//!
//! - [`RichTextStyle`] - The base style of a piece of rich text, including
//!   line spacing and optional bold/italic font families.
//! - [`TextStyle`] - A fully resolved style for a single run of text; this is
//!   what a [`RenderContext`](crate::draw::RenderContext) measures and draws.

use serde::Deserialize;

use crate::color::Color;

/// Fully resolved style of a single text run.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    font_family: String,
    font_size: f32,
    bold: bool,
    italic: bool,
    letter_spacing: f32,
    color: Color,
}

impl TextStyle {
    pub fn new(font_family: impl Into<String>, font_size: f32) -> Self {
        Self {
            font_family: font_family.into(),
            font_size,
            bold: false,
            italic: false,
            letter_spacing: 0.0,
            color: Color::default(),
        }
    }

    pub fn font_family(&self) -> &str {
        &self.font_family
    }

    /// Font size in pixels.
    pub fn font_size(&self) -> f32 {
        self.font_size
    }

    pub fn bold(&self) -> bool {
        self.bold
    }

    pub fn italic(&self) -> bool {
        self.italic
    }

    /// Extra space added after every character, in pixels.
    pub fn letter_spacing(&self) -> f32 {
        self.letter_spacing
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }

    pub fn with_italic(mut self, italic: bool) -> Self {
        self.italic = italic;
        self
    }

    pub fn with_letter_spacing(mut self, letter_spacing: f32) -> Self {
        self.letter_spacing = letter_spacing;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }
}

/// Base style of a piece of rich text.
///
/// Segments marked bold or italic resolve against this style through
/// [`RichTextStyle::resolve`]: an explicit font variant family wins when one
/// is configured, otherwise the base family is used with the weight/slant
/// flags set so the renderer can synthesize the emphasis.
///
/// # Default Values
///
/// | Property | Default |
/// |----------|---------|
/// | Font family | `"sans-serif"` |
/// | Font size | `12` |
/// | Line height | `1.2` × the tallest run on a line |
/// | Letter spacing | `0` |
/// | Line-break gap | `0` |
/// | Color | black |
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RichTextStyle {
    font_family: String,
    font_size: f32,
    line_height: f32,
    letter_spacing: f32,
    line_break_gap: f32,
    color: Color,
    bold_family: Option<String>,
    italic_family: Option<String>,
    bold_italic_family: Option<String>,
}

impl Default for RichTextStyle {
    fn default() -> Self {
        Self {
            font_family: "sans-serif".to_string(),
            font_size: 12.0,
            line_height: 1.2,
            letter_spacing: 0.0,
            line_break_gap: 0.0,
            color: Color::default(),
            bold_family: None,
            italic_family: None,
            bold_italic_family: None,
        }
    }
}

impl RichTextStyle {
    pub fn new(font_family: impl Into<String>, font_size: f32) -> Self {
        Self {
            font_family: font_family.into(),
            font_size,
            ..Self::default()
        }
    }

    pub fn font_family(&self) -> &str {
        &self.font_family
    }

    pub fn font_size(&self) -> f32 {
        self.font_size
    }

    /// Line height as a multiple of the tallest run (ascent + descent).
    pub fn line_height(&self) -> f32 {
        self.line_height
    }

    pub fn letter_spacing(&self) -> f32 {
        self.letter_spacing
    }

    /// Extra vertical space inserted after every explicit line break.
    pub fn line_break_gap(&self) -> f32 {
        self.line_break_gap
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn with_font_family(mut self, family: impl Into<String>) -> Self {
        self.font_family = family.into();
        self
    }

    pub fn with_font_size(mut self, size: f32) -> Self {
        self.font_size = size;
        self
    }

    pub fn with_line_height(mut self, line_height: f32) -> Self {
        self.line_height = line_height;
        self
    }

    pub fn with_letter_spacing(mut self, letter_spacing: f32) -> Self {
        self.letter_spacing = letter_spacing;
        self
    }

    pub fn with_line_break_gap(mut self, gap: f32) -> Self {
        self.line_break_gap = gap;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_bold_family(mut self, family: impl Into<String>) -> Self {
        self.bold_family = Some(family.into());
        self
    }

    pub fn with_italic_family(mut self, family: impl Into<String>) -> Self {
        self.italic_family = Some(family.into());
        self
    }

    pub fn with_bold_italic_family(mut self, family: impl Into<String>) -> Self {
        self.bold_italic_family = Some(family.into());
        self
    }

    /// Returns a copy with every length multiplied by `factor`.
    ///
    /// The line height is a ratio and stays unchanged.
    pub fn scaled(&self, factor: f32) -> Self {
        Self {
            font_size: self.font_size * factor,
            letter_spacing: self.letter_spacing * factor,
            line_break_gap: self.line_break_gap * factor,
            ..self.clone()
        }
    }

    /// Resolves the style of a run with the given emphasis.
    ///
    /// # Examples
    ///
    /// ```
    /// # use figura_core::draw::RichTextStyle;
    /// let base = RichTextStyle::new("Inter", 14.0).with_bold_family("Inter Bold");
    ///
    /// let bold = base.resolve(true, false);
    /// assert_eq!(bold.font_family(), "Inter Bold");
    ///
    /// // No italic variant configured: base family, synthesized slant
    /// let italic = base.resolve(false, true);
    /// assert_eq!(italic.font_family(), "Inter");
    /// assert!(italic.italic());
    /// ```
    pub fn resolve(&self, bold: bool, italic: bool) -> TextStyle {
        let variant = match (bold, italic) {
            (true, true) => self
                .bold_italic_family
                .as_ref()
                .or(self.bold_family.as_ref())
                .or(self.italic_family.as_ref()),
            (true, false) => self.bold_family.as_ref(),
            (false, true) => self.italic_family.as_ref(),
            (false, false) => None,
        };
        let family = variant.unwrap_or(&self.font_family);

        TextStyle::new(family.clone(), self.font_size)
            .with_bold(bold)
            .with_italic(italic)
            .with_letter_spacing(self.letter_spacing)
            .with_color(self.color)
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;

    #[test]
    fn test_rich_text_style_defaults() {
        let style = RichTextStyle::default();
        assert_eq!(style.font_family(), "sans-serif");
        assert_approx_eq!(f32, style.font_size(), 12.0);
        assert_approx_eq!(f32, style.line_height(), 1.2);
        assert_approx_eq!(f32, style.line_break_gap(), 0.0);
    }

    #[test]
    fn test_resolve_plain_uses_base_family() {
        let style = RichTextStyle::new("Inter", 10.0).with_bold_family("Inter Bold");
        let resolved = style.resolve(false, false);
        assert_eq!(resolved.font_family(), "Inter");
        assert!(!resolved.bold());
        assert!(!resolved.italic());
    }

    #[test]
    fn test_resolve_bold_italic_prefers_combined_variant() {
        let style = RichTextStyle::new("Inter", 10.0)
            .with_bold_family("Inter Bold")
            .with_bold_italic_family("Inter Bold Italic");
        assert_eq!(style.resolve(true, true).font_family(), "Inter Bold Italic");

        let fallback = RichTextStyle::new("Inter", 10.0).with_italic_family("Inter Italic");
        assert_eq!(fallback.resolve(true, true).font_family(), "Inter Italic");
    }

    #[test]
    fn test_resolve_carries_spacing_and_color() {
        let red = Color::new("red").unwrap();
        let style = RichTextStyle::new("Inter", 10.0)
            .with_letter_spacing(0.5)
            .with_color(red);
        let resolved = style.resolve(true, false);
        assert_approx_eq!(f32, resolved.letter_spacing(), 0.5);
        assert_eq!(resolved.color(), red);
        assert!(resolved.bold());
    }

    #[test]
    fn test_scaled_keeps_line_height_ratio() {
        let style = RichTextStyle::new("Inter", 10.0)
            .with_line_height(1.5)
            .with_line_break_gap(4.0)
            .scaled(2.0);
        assert_approx_eq!(f32, style.font_size(), 20.0);
        assert_approx_eq!(f32, style.line_break_gap(), 8.0);
        assert_approx_eq!(f32, style.line_height(), 1.5);
    }
}
