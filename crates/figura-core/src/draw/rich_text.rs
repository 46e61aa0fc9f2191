//! Rich text: styled segments before and after measurement.
//!
//! A [`RichText`] is what figure inputs carry (captions, labels, cell
//! values). Measuring it against a width budget produces a
//! [`MeasuredRichText`], an immutable description of broken lines and
//! positioned runs that renderers and export writers consume.

use crate::{
    draw::{RichTextStyle, TextStyle},
    geometry::Size,
    markup,
};

/// A run of text with uniform emphasis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledSegment {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
}

impl StyledSegment {
    pub fn new(text: impl Into<String>, bold: bool, italic: bool) -> Self {
        Self {
            text: text.into(),
            bold,
            italic,
        }
    }

    /// A segment without emphasis.
    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, false, false)
    }
}

/// Ordered styled segments sharing one base style.
///
/// # Examples
///
/// ```
/// # use figura_core::draw::{RichText, RichTextStyle};
/// let caption = RichText::parse("Sales **2024**", RichTextStyle::default());
/// assert_eq!(caption.segments().len(), 2);
/// assert_eq!(caption.to_plain_string(), "Sales 2024");
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RichText {
    segments: Vec<StyledSegment>,
    style: RichTextStyle,
}

impl RichText {
    pub fn new(segments: Vec<StyledSegment>, style: RichTextStyle) -> Self {
        Self { segments, style }
    }

    /// Builds rich text from emphasis markup.
    pub fn parse(source: &str, style: RichTextStyle) -> Self {
        Self::new(markup::parse_emphasis(source), style)
    }

    /// Builds rich text from a string taken literally.
    pub fn plain(text: impl Into<String>, style: RichTextStyle) -> Self {
        let text = text.into();
        let segments = if text.is_empty() {
            Vec::new()
        } else {
            vec![StyledSegment::plain(text)]
        };
        Self::new(segments, style)
    }

    pub fn segments(&self) -> &[StyledSegment] {
        &self.segments
    }

    pub fn style(&self) -> &RichTextStyle {
        &self.style
    }

    /// Returns `true` when there is no text to lay out.
    pub fn is_empty(&self) -> bool {
        self.segments.iter().all(|segment| segment.text.is_empty())
    }

    /// Concatenated text of all segments, emphasis dropped.
    pub fn to_plain_string(&self) -> String {
        self.segments
            .iter()
            .map(|segment| segment.text.as_str())
            .collect()
    }
}

/// Reading direction of measured text on the page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Rotation {
    #[default]
    Horizontal,
    /// Rotated 90° clockwise; reads top to bottom.
    Clockwise,
    /// Rotated 90° anticlockwise; reads bottom to top.
    Anticlockwise,
}

impl Rotation {
    pub fn is_rotated(self) -> bool {
        !matches!(self, Self::Horizontal)
    }

    /// Rotation angle in degrees, positive meaning clockwise (SVG convention).
    pub fn degrees(self) -> f32 {
        match self {
            Self::Horizontal => 0.0,
            Self::Clockwise => 90.0,
            Self::Anticlockwise => -90.0,
        }
    }
}

/// A positioned run inside a measured line.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasuredSegment {
    text: String,
    x: f32,
    width: f32,
    style: TextStyle,
}

impl MeasuredSegment {
    pub fn new(text: impl Into<String>, x: f32, width: f32, style: TextStyle) -> Self {
        Self {
            text: text.into(),
            x,
            width,
            style,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Horizontal offset from the start of the line.
    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn style(&self) -> &TextStyle {
        &self.style
    }
}

/// One broken line of measured text.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasuredLine {
    y: f32,
    baseline: f32,
    width: f32,
    height: f32,
    segments: Vec<MeasuredSegment>,
}

impl MeasuredLine {
    pub fn new(y: f32, baseline: f32, width: f32, height: f32, segments: Vec<MeasuredSegment>) -> Self {
        Self {
            y,
            baseline,
            width,
            height,
            segments,
        }
    }

    /// Offset of the line's top edge from the top of the text block.
    pub fn y(&self) -> f32 {
        self.y
    }

    /// Offset of the baseline from the line's top edge.
    pub fn baseline(&self) -> f32 {
        self.baseline
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn segments(&self) -> &[MeasuredSegment] {
        &self.segments
    }

    /// Text of the whole line.
    pub fn text(&self) -> String {
        self.segments.iter().map(MeasuredSegment::text).collect()
    }
}

/// The immutable result of measuring a [`RichText`].
///
/// `width` and `height` are local dimensions, i.e. along and across the
/// reading direction. [`MeasuredRichText::size`] reports the on-page size.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MeasuredRichText {
    lines: Vec<MeasuredLine>,
    width: f32,
    height: f32,
    rotation: Rotation,
}

impl MeasuredRichText {
    pub fn new(lines: Vec<MeasuredLine>, width: f32, height: f32, rotation: Rotation) -> Self {
        Self {
            lines,
            width,
            height,
            rotation,
        }
    }

    pub fn lines(&self) -> &[MeasuredLine] {
        &self.lines
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn is_empty(&self) -> bool {
        self.lines.iter().all(|line| line.segments.is_empty())
    }

    /// Size occupied on the page, transposed for rotated text.
    pub fn size(&self) -> Size {
        let local = Size::new(self.width, self.height);
        if self.rotation.is_rotated() {
            local.transpose()
        } else {
            local
        }
    }

    /// Line texts joined with `\n`.
    pub fn plain_text(&self) -> String {
        self.lines
            .iter()
            .map(MeasuredLine::text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;

    fn measured(rotation: Rotation) -> MeasuredRichText {
        let style = RichTextStyle::default().resolve(false, false);
        let line = MeasuredLine::new(
            0.0,
            9.6,
            40.0,
            14.4,
            vec![MeasuredSegment::new("label", 0.0, 40.0, style)],
        );
        MeasuredRichText::new(vec![line], 40.0, 14.4, rotation)
    }

    #[test]
    fn test_plain_text_keeps_markers() {
        let text = RichText::plain("**not bold**", RichTextStyle::default());
        assert_eq!(text.segments().len(), 1);
        assert!(!text.segments()[0].bold);
        assert_eq!(text.to_plain_string(), "**not bold**");
    }

    #[test]
    fn test_empty_rich_text() {
        assert!(RichText::plain("", RichTextStyle::default()).is_empty());
        assert!(RichText::parse("", RichTextStyle::default()).is_empty());
        assert!(!RichText::parse("*x*", RichTextStyle::default()).is_empty());
    }

    #[test]
    fn test_measured_size_transposes_when_rotated() {
        let horizontal = measured(Rotation::Horizontal).size();
        assert_approx_eq!(f32, horizontal.width(), 40.0);
        assert_approx_eq!(f32, horizontal.height(), 14.4);

        let rotated = measured(Rotation::Anticlockwise).size();
        assert_approx_eq!(f32, rotated.width(), 14.4);
        assert_approx_eq!(f32, rotated.height(), 40.0);
    }

    #[test]
    fn test_rotation_degrees() {
        assert_approx_eq!(f32, Rotation::Horizontal.degrees(), 0.0);
        assert_approx_eq!(f32, Rotation::Clockwise.degrees(), 90.0);
        assert_approx_eq!(f32, Rotation::Anticlockwise.degrees(), -90.0);
        assert!(!Rotation::default().is_rotated());
    }

    #[test]
    fn test_plain_text_of_measured() {
        assert_eq!(measured(Rotation::Horizontal).plain_text(), "label");
    }
}
