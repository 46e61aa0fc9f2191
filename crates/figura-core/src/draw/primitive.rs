//! The closed set of drawable primitives.
//!
//! Measuring a figure yields a flat list of [`Primitive`]s. Each one is plain
//! data: a stable key, the [`Layer`] it renders on, an optional z-index
//! tie-break and a [`Shape`]. Nothing here knows how to draw itself; the
//! render pipeline matches on [`Shape`] exhaustively.

use std::fmt;

use crate::{
    color::Color,
    draw::{Layer, MarkerShape, MeasuredRichText, StrokeDefinition, TextAlign},
    geometry::{Bounds, Path, Point, Size},
};

/// Stable identity of a primitive within one measured figure.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PrimitiveKey(String);

impl PrimitiveKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PrimitiveKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PrimitiveKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for PrimitiveKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

/// Position of chart content inside a multi-panel layout.
///
/// - `pane`: grid cell of the chart
/// - `tier`: value-axis band inside the pane
/// - `lane`: category-axis band inside the pane
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlotIndex {
    pub pane: usize,
    pub tier: usize,
    pub lane: usize,
}

impl PlotIndex {
    pub fn new(pane: usize, tier: usize, lane: usize) -> Self {
        Self { pane, tier, lane }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// Measured text anchored on the page.
///
/// `align` states which point of the text block sits on `position`: for
/// `HAlign::Center` and `VAlign::Middle` the anchor is the block's center.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedText {
    pub text: MeasuredRichText,
    pub position: Point,
    pub align: TextAlign,
}

impl PlacedText {
    pub fn new(text: MeasuredRichText, position: Point, align: TextAlign) -> Self {
        Self {
            text,
            position,
            align,
        }
    }

    /// The on-page box occupied by the text.
    pub fn bounds(&self) -> Bounds {
        let size = self.text.size();
        let min_x = self.position.x() - self.align.horizontal.offset(size.width(), 0.0);
        let min_y = self.position.y() - self.align.vertical.offset(size.height(), 0.0);
        Bounds::new_from_top_left(Point::new(min_x, min_y), size)
    }
}

/// A filled and/or outlined rectangle.
#[derive(Debug, Clone, PartialEq)]
pub struct RectShape {
    pub bounds: Bounds,
    pub fill: Option<Color>,
    pub stroke: Option<StrokeDefinition>,
    pub corner_radius: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridLineShape {
    pub from: Point,
    pub to: Point,
    pub orientation: Orientation,
    pub stroke: StrokeDefinition,
    pub index: PlotIndex,
}

/// A tick mark with an optional label.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisTick {
    pub from: Point,
    pub to: Point,
    pub label: Option<PlacedText>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AxisShape {
    pub from: Point,
    pub to: Point,
    pub orientation: Orientation,
    pub stroke: StrokeDefinition,
    pub ticks: Vec<AxisTick>,
    pub index: PlotIndex,
}

/// One legend entry: a swatch (or marker) followed by its label.
#[derive(Debug, Clone, PartialEq)]
pub struct LegendShape {
    pub swatch: Bounds,
    pub color: Color,
    pub marker: Option<MarkerShape>,
    pub label: PlacedText,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurroundRole {
    Caption,
    SubCaption,
    Footnote,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SurroundShape {
    pub role: SurroundRole,
    pub text: PlacedText,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarShape {
    pub bounds: Bounds,
    pub fill: Color,
    pub stroke: Option<StrokeDefinition>,
    pub series: usize,
    pub value: f64,
    pub index: PlotIndex,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinePrimitiveShape {
    pub points: Vec<Point>,
    pub stroke: StrokeDefinition,
    pub series: usize,
    pub index: PlotIndex,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AreaShape {
    pub path: Path,
    pub fill: Color,
    pub series: usize,
    pub index: PlotIndex,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PointShape {
    pub center: Point,
    pub radius: f32,
    pub marker: MarkerShape,
    pub fill: Color,
    pub stroke: Option<StrokeDefinition>,
    pub series: usize,
    pub index: PlotIndex,
}

/// A data label, axis title or node label.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelShape {
    pub text: PlacedText,
    pub index: PlotIndex,
}

/// A header or data cell of a table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableCellShape {
    pub bounds: Bounds,
    pub fill: Option<Color>,
    pub text: Option<PlacedText>,
    pub row: usize,
    pub column: usize,
    pub header: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeShape {
    pub id: String,
    pub bounds: Bounds,
    pub fill: Color,
    pub column: usize,
    pub value: f64,
}

/// The vertical extent a link occupies on one side of a node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkPort {
    pub x: f32,
    pub top: f32,
    pub bottom: f32,
}

impl LinkPort {
    pub fn new(x: f32, top: f32, bottom: f32) -> Self {
        Self { x, top, bottom }
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinkShape {
    pub source: String,
    pub target: String,
    pub source_port: LinkPort,
    pub target_port: LinkPort,
    pub fill: Color,
    pub value: f64,
}

impl LinkShape {
    /// The ribbon outline: two cubic curves with their control points at
    /// the horizontal midpoint, joined by the port edges.
    ///
    /// # Examples
    ///
    /// ```
    /// # use figura_core::color::Color;
    /// # use figura_core::draw::{LinkPort, LinkShape};
    /// let link = LinkShape {
    ///     source: "a".into(),
    ///     target: "b".into(),
    ///     source_port: LinkPort::new(0.0, 0.0, 10.0),
    ///     target_port: LinkPort::new(100.0, 50.0, 60.0),
    ///     fill: Color::default(),
    ///     value: 1.0,
    /// };
    /// assert_eq!(
    ///     link.path().to_svg_data(),
    ///     "M 0 0 C 50 0, 50 50, 100 50 L 100 60 C 50 60, 50 10, 0 10 Z"
    /// );
    /// ```
    pub fn path(&self) -> Path {
        let source = self.source_port;
        let target = self.target_port;
        let mid_x = (source.x + target.x) / 2.0;

        let mut path = Path::new();
        path.move_to(Point::new(source.x, source.top));
        path.cubic_to(
            Point::new(mid_x, source.top),
            Point::new(mid_x, target.top),
            Point::new(target.x, target.top),
        );
        path.line_to(Point::new(target.x, target.bottom));
        path.cubic_to(
            Point::new(mid_x, target.bottom),
            Point::new(mid_x, source.bottom),
            Point::new(source.x, source.bottom),
        );
        path.close();
        path
    }
}

/// Shape-specific payload of a [`Primitive`].
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Background(RectShape),
    GridLine(GridLineShape),
    Axis(AxisShape),
    Legend(LegendShape),
    Surround(SurroundShape),
    Bar(BarShape),
    Line(LinePrimitiveShape),
    Area(AreaShape),
    Point(PointShape),
    Label(LabelShape),
    TableCell(TableCellShape),
    Node(NodeShape),
    Link(LinkShape),
}

impl Shape {
    /// The layer a shape renders on unless overridden.
    pub fn default_layer(&self) -> Layer {
        match self {
            Self::Background(_) | Self::TableCell(_) => Layer::Background,
            Self::GridLine(_) => Layer::Grid,
            Self::Axis(_) => Layer::Axis,
            Self::Area(_) | Self::Link(_) => Layer::Area,
            Self::Line(_) => Layer::Line,
            Self::Bar(_) | Self::Node(_) => Layer::Bar,
            Self::Point(_) => Layer::Point,
            Self::Label(_) => Layer::Label,
            Self::Legend(_) => Layer::Legend,
            Self::Surround(_) => Layer::Surround,
        }
    }

    /// Short tag used in keys and log output.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Background(_) => "background",
            Self::GridLine(_) => "grid-line",
            Self::Axis(_) => "axis",
            Self::Legend(_) => "legend",
            Self::Surround(_) => "surround",
            Self::Bar(_) => "bar",
            Self::Line(_) => "line",
            Self::Area(_) => "area",
            Self::Point(_) => "point",
            Self::Label(_) => "label",
            Self::TableCell(_) => "table-cell",
            Self::Node(_) => "node",
            Self::Link(_) => "link",
        }
    }

    /// Plot position of chart content, if the shape has one.
    pub fn plot_index(&self) -> Option<PlotIndex> {
        match self {
            Self::GridLine(s) => Some(s.index),
            Self::Axis(s) => Some(s.index),
            Self::Bar(s) => Some(s.index),
            Self::Line(s) => Some(s.index),
            Self::Area(s) => Some(s.index),
            Self::Point(s) => Some(s.index),
            Self::Label(s) => Some(s.index),
            Self::Background(_)
            | Self::Legend(_)
            | Self::Surround(_)
            | Self::TableCell(_)
            | Self::Node(_)
            | Self::Link(_) => None,
        }
    }
}

/// An immutable drawable produced by figure measurement.
#[derive(Debug, Clone, PartialEq)]
pub struct Primitive {
    key: PrimitiveKey,
    layer: Layer,
    z_index: Option<i32>,
    shape: Shape,
}

impl Primitive {
    /// Creates a primitive on its shape's default layer.
    pub fn new(key: impl Into<PrimitiveKey>, shape: Shape) -> Self {
        Self {
            key: key.into(),
            layer: shape.default_layer(),
            z_index: None,
            shape,
        }
    }

    pub fn with_layer(mut self, layer: Layer) -> Self {
        self.layer = layer;
        self
    }

    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = Some(z_index);
        self
    }

    pub fn key(&self) -> &PrimitiveKey {
        &self.key
    }

    pub fn layer(&self) -> Layer {
        self.layer
    }

    pub fn z_index(&self) -> Option<i32> {
        self.z_index
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Approximate on-page extent, used for overlap checks and tests.
    pub fn bounds(&self) -> Option<Bounds> {
        let points = |pts: &[Point]| {
            pts.iter()
                .map(|p| Bounds::new_from_top_left(*p, Size::default()))
                .reduce(|a, b| a.merge(&b))
        };
        match &self.shape {
            Shape::Background(s) => Some(s.bounds),
            Shape::GridLine(s) => points(&[s.from, s.to]),
            Shape::Axis(s) => points(&[s.from, s.to]),
            Shape::Legend(s) => Some(s.swatch.merge(&s.label.bounds())),
            Shape::Surround(s) => Some(s.text.bounds()),
            Shape::Bar(s) => Some(s.bounds),
            Shape::Line(s) => points(&s.points),
            Shape::Area(_) => None,
            Shape::Point(s) => Some(Bounds::from_corners(
                Point::new(s.center.x() - s.radius, s.center.y() - s.radius),
                Point::new(s.center.x() + s.radius, s.center.y() + s.radius),
            )),
            Shape::Label(s) => Some(s.text.bounds()),
            Shape::TableCell(s) => Some(s.bounds),
            Shape::Node(s) => Some(s.bounds),
            Shape::Link(s) => Some(Bounds::from_corners(
                Point::new(s.source_port.x, s.source_port.top.min(s.target_port.top)),
                Point::new(
                    s.target_port.x,
                    s.source_port.bottom.max(s.target_port.bottom),
                ),
            )),
        }
    }
}
