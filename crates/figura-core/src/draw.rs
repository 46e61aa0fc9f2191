//! Drawing model for figure rendering.
//!
//! Everything a figure produces is described here as plain data: render
//! layers, strokes, text styles, measured rich text and the closed set of
//! [`Primitive`] shapes. Actual drawing goes through the [`RenderContext`]
//! capability, which hosts implement (or pick one of the provided ones).

mod context;
mod font;
mod layer;
mod primitive;
mod recording;
mod rich_text;
mod stroke;
mod text_style;

pub use context::{HAlign, MarkerShape, RenderContext, TextAlign, TextMetrics, VAlign};
pub use font::FontMeasurer;
pub use layer::Layer;
pub use primitive::{
    AreaShape, AxisShape, AxisTick, BarShape, GridLineShape, LabelShape, LegendShape,
    LinePrimitiveShape, LinkPort, LinkShape, NodeShape, Orientation, PlacedText, PlotIndex,
    PointShape, Primitive, PrimitiveKey, RectShape, Shape, SurroundRole, SurroundShape,
    TableCellShape,
};
pub use recording::{DrawCall, RecordingContext};
pub use rich_text::{
    MeasuredLine, MeasuredRichText, MeasuredSegment, RichText, Rotation, StyledSegment,
};
pub use stroke::{StrokeDefinition, StrokeStyle};
pub use text_style::{RichTextStyle, TextStyle};
