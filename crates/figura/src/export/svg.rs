//! SVG output.
//!
//! [`SvgCanvas`] is a [`RenderContext`]: figures are measured against it
//! (text metrics come from system fonts through [`FontMeasurer`]) and then
//! drawn into it. Each render layer becomes a `<g data-layer="…">` group,
//! so the document keeps the pipeline's bottom-to-top order.

use std::{fs::File, io::Write};

use log::{debug, error, info};
use svg::{
    node::{element as svg_element, Text as SvgText},
    Document, Node,
};

use figura_core::{
    color::Color,
    draw::{
        FontMeasurer, Layer, MarkerShape, RecordingContext, RenderContext, Rotation,
        StrokeDefinition, TextMetrics, TextStyle,
    },
    geometry::{Bounds, Path, Point, Size},
};

use super::{Error, Exporter};
use crate::{figure::MeasuredFigure, pipeline};

/// Where text metrics come from.
enum Metrics {
    Fonts(&'static FontMeasurer),
    /// Fixed per-character metrics, independent of installed fonts.
    Fixed(RecordingContext),
}

/// A layered SVG drawing surface.
pub struct SvgCanvas {
    size: Size,
    metrics: Metrics,
    /// Elements drawn before any layer was entered.
    loose: Vec<Box<dyn Node>>,
    layers: Vec<(Layer, svg_element::Group)>,
}

impl SvgCanvas {
    /// A canvas measuring text with the system fonts.
    pub fn new(size: Size) -> Self {
        Self::with_metrics(size, Metrics::Fonts(FontMeasurer::global()))
    }

    /// A canvas measuring every character as `char_width × font_size` wide.
    ///
    /// Output does not depend on the fonts of the machine, which keeps
    /// snapshots and tests stable.
    pub fn with_fixed_metrics(size: Size, char_width: f32) -> Self {
        Self::with_metrics(
            size,
            Metrics::Fixed(RecordingContext::new().with_char_width(char_width)),
        )
    }

    fn with_metrics(size: Size, metrics: Metrics) -> Self {
        Self {
            size,
            metrics,
            loose: Vec::new(),
            layers: Vec::new(),
        }
    }

    pub fn size(&self) -> Size {
        self.size
    }

    fn push(&mut self, node: impl Node + 'static) {
        match self.layers.last_mut() {
            Some((_, group)) => group.append(node),
            None => self.loose.push(Box::new(node)),
        }
    }

    /// Finishes the drawing.
    pub fn into_document(self) -> Document {
        let (width, height) = (self.size.width(), self.size.height());
        let mut doc = Document::new()
            .set("viewBox", format!("0 0 {width} {height}"))
            .set("width", width)
            .set("height", height);
        for node in self.loose {
            doc = doc.add(node);
        }
        let layer_count = self.layers.len();
        for (_, group) in self.layers {
            doc = doc.add(group);
        }
        debug!(width, height, layers = layer_count; "SVG document assembled");
        doc
    }
}

fn with_fill<T: Node>(mut node: T, fill: Option<Color>) -> T {
    match fill {
        Some(color) => {
            node.assign("fill", color.to_opaque_string());
            if color.alpha() < 1.0 {
                node.assign("fill-opacity", color.alpha());
            }
        }
        None => node.assign("fill", "none"),
    }
    node
}

fn with_stroke<T: Node>(mut node: T, stroke: Option<&StrokeDefinition>) -> T {
    if let Some(stroke) = stroke {
        let color = stroke.color();
        node.assign("stroke", color.to_opaque_string());
        if color.alpha() < 1.0 {
            node.assign("stroke-opacity", color.alpha());
        }
        node.assign("stroke-width", stroke.width());
        if let Some(dasharray) = stroke.style().to_svg_value() {
            node.assign("stroke-dasharray", dasharray);
        }
    }
    node
}

impl RenderContext for SvgCanvas {
    fn measure_text(&self, text: &str, style: &TextStyle) -> TextMetrics {
        match &self.metrics {
            Metrics::Fonts(measurer) => measurer.measure(text, style),
            Metrics::Fixed(recording) => recording.measure_text(text, style),
        }
    }

    fn enter_layer(&mut self, layer: Layer) {
        let group = svg_element::Group::new().set("data-layer", layer.name());
        self.layers.push((layer, group));
    }

    fn draw_rect(
        &mut self,
        bounds: Bounds,
        fill: Option<Color>,
        stroke: Option<&StrokeDefinition>,
        corner_radius: f32,
    ) {
        let mut rect = svg_element::Rectangle::new()
            .set("x", bounds.min_x())
            .set("y", bounds.min_y())
            .set("width", bounds.width())
            .set("height", bounds.height());
        if corner_radius > 0.0 {
            rect = rect.set("rx", corner_radius);
        }
        let rect = with_stroke(with_fill(rect, fill), stroke);
        self.push(rect);
    }

    fn draw_line(&mut self, points: &[Point], stroke: &StrokeDefinition) {
        if points.len() < 2 {
            return;
        }
        let points = points
            .iter()
            .map(|p| format!("{},{}", p.x(), p.y()))
            .collect::<Vec<_>>()
            .join(" ");
        let line = svg_element::Polyline::new().set("points", points);
        let line = with_stroke(with_fill(line, None), Some(stroke));
        self.push(line);
    }

    fn draw_area(&mut self, path: &Path, fill: Option<Color>, stroke: Option<&StrokeDefinition>) {
        let area = svg_element::Path::new().set("d", path.to_svg_data());
        let area = with_stroke(with_fill(area, fill), stroke);
        self.push(area);
    }

    fn draw_marker(
        &mut self,
        center: Point,
        radius: f32,
        shape: MarkerShape,
        fill: Color,
        stroke: Option<&StrokeDefinition>,
    ) {
        let (x, y) = (center.x(), center.y());
        match shape {
            MarkerShape::Circle => {
                let circle = svg_element::Circle::new()
                    .set("cx", x)
                    .set("cy", y)
                    .set("r", radius);
                self.push(with_stroke(with_fill(circle, Some(fill)), stroke));
            }
            MarkerShape::Square => {
                let square = svg_element::Rectangle::new()
                    .set("x", x - radius)
                    .set("y", y - radius)
                    .set("width", radius * 2.0)
                    .set("height", radius * 2.0);
                self.push(with_stroke(with_fill(square, Some(fill)), stroke));
            }
            MarkerShape::Diamond => {
                let points = format!(
                    "{},{} {},{} {},{} {},{}",
                    x,
                    y - radius,
                    x + radius,
                    y,
                    x,
                    y + radius,
                    x - radius,
                    y
                );
                let diamond = svg_element::Polygon::new().set("points", points);
                self.push(with_stroke(with_fill(diamond, Some(fill)), stroke));
            }
        }
    }

    fn draw_text(&mut self, text: &str, origin: Point, style: &TextStyle, rotation: Rotation) {
        let mut element = svg_element::Text::new("")
            .set("x", origin.x())
            .set("y", origin.y())
            .set("font-family", style.font_family())
            .set("font-size", style.font_size())
            .set("xml:space", "preserve");
        if style.bold() {
            element = element.set("font-weight", "bold");
        }
        if style.italic() {
            element = element.set("font-style", "italic");
        }
        if style.letter_spacing() != 0.0 {
            element = element.set("letter-spacing", style.letter_spacing());
        }
        if rotation.is_rotated() {
            element = element.set(
                "transform",
                format!("rotate({} {} {})", rotation.degrees(), origin.x(), origin.y()),
            );
        }
        let element = with_fill(element, Some(style.color())).add(SvgText::new(text));
        self.push(element);
    }
}

/// Draws a measured figure into a fresh document of the figure's size.
///
/// The canvas only draws here; it never measures, so the metrics choice
/// does not matter.
pub fn render_document(figure: &MeasuredFigure) -> Document {
    let mut canvas = SvgCanvas::with_fixed_metrics(figure.bounds().to_size(), 0.6);
    pipeline::render_primitives(&mut canvas, figure.primitives());
    canvas.into_document()
}

/// Writes figures as SVG files.
pub struct SvgExporter {
    file_name: String,
}

impl SvgExporter {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Writes an SVG document to the exporter's file.
    pub fn write_document(&self, doc: &Document) -> Result<(), Error> {
        info!(file_name = self.file_name.as_str(); "Creating SVG file");
        let mut file = match File::create(&self.file_name) {
            Ok(file) => file,
            Err(err) => {
                error!(file_name = self.file_name.as_str(), err:err; "Failed to create SVG file");
                return Err(Error::Io(err));
            }
        };
        if let Err(err) = write!(file, "{doc}") {
            error!(file_name = self.file_name.as_str(), err:err; "Failed to write SVG content");
            return Err(Error::Io(err));
        }
        Ok(())
    }
}

impl Exporter for SvgExporter {
    fn export_figure(&mut self, figure: &MeasuredFigure) -> Result<(), Error> {
        let doc = render_document(figure);
        debug!(primitives = figure.primitives().len(); "SVG document rendered");
        self.write_document(&doc)
    }
}

#[cfg(test)]
mod tests {
    use figura_core::draw::{Primitive, RectShape, Shape};

    use super::*;

    fn canvas() -> SvgCanvas {
        SvgCanvas::with_fixed_metrics(Size::new(200.0, 100.0), 0.6)
    }

    #[test]
    fn test_layers_become_groups() {
        let mut canvas = canvas();
        canvas.enter_layer(Layer::Background);
        canvas.draw_rect(
            Bounds::from_size(Size::new(200.0, 100.0)),
            Color::new("white").ok(),
            None,
            0.0,
        );
        canvas.enter_layer(Layer::Label);
        canvas.draw_text(
            "Total",
            Point::new(10.0, 20.0),
            &TextStyle::new("sans-serif", 12.0).with_bold(true),
            Rotation::Horizontal,
        );
        let out = canvas.into_document().to_string();

        let background = out.find(r#"data-layer="background""#).unwrap();
        let label = out.find(r#"data-layer="label""#).unwrap();
        assert!(background < label);
        assert!(out.contains("font-weight=\"bold\""));
        assert!(out.contains("Total"));
        assert!(out.contains(r#"viewBox="0 0 200 100""#));
    }

    #[test]
    fn test_rotated_text_transform() {
        let mut canvas = canvas();
        canvas.draw_text(
            "up",
            Point::new(5.0, 50.0),
            &TextStyle::new("sans-serif", 10.0),
            Rotation::Anticlockwise,
        );
        let out = canvas.into_document().to_string();
        assert!(out.contains(r#"transform="rotate(-90 5 50)""#));
    }

    #[test]
    fn test_translucent_fill_and_dashes() {
        let mut canvas = canvas();
        let stroke = StrokeDefinition::dashed(Color::default(), 2.0);
        canvas.draw_area(
            &Path::polygon(&[
                Point::new(0.0, 0.0),
                Point::new(10.0, 0.0),
                Point::new(10.0, 10.0),
            ]),
            Color::new("red").ok().map(|c| c.with_alpha(0.5)),
            Some(&stroke),
        );
        canvas.draw_line(&[Point::new(0.0, 0.0), Point::new(5.0, 5.0)], &stroke);
        let out = canvas.into_document().to_string();
        assert!(out.contains(r#"fill-opacity="0.5""#));
        assert!(out.contains(r#"stroke-dasharray="5,5""#));
        assert!(out.contains(r#"points="0,0 5,5""#));
    }

    #[test]
    fn test_markers() {
        let mut canvas = canvas();
        for shape in [MarkerShape::Circle, MarkerShape::Square, MarkerShape::Diamond] {
            canvas.draw_marker(Point::new(50.0, 50.0), 4.0, shape, Color::default(), None);
        }
        let out = canvas.into_document().to_string();
        assert!(out.contains("<circle"));
        assert!(out.contains("<rect"));
        assert!(out.contains("<polygon"));
    }

    #[test]
    fn test_render_document_from_primitives() {
        let measured = crate::table::MeasuredTable {
            bounds: Bounds::from_size(Size::new(50.0, 40.0)),
            style: crate::style::FigureStyle::default(),
            scale: 1.0,
            surrounds: crate::surround::MeasuredSurrounds {
                plot: Bounds::from_size(Size::new(50.0, 40.0)),
                primitives: Vec::new(),
                height: 0.0,
            },
            rows: 0,
            columns: 0,
            row_heights: Vec::new(),
            primitives: vec![Primitive::new(
                "background",
                Shape::Background(RectShape {
                    bounds: Bounds::from_size(Size::new(50.0, 40.0)),
                    fill: Color::new("white").ok(),
                    stroke: None,
                    corner_radius: 0.0,
                }),
            )],
        };
        let out = render_document(&MeasuredFigure::Table(measured)).to_string();
        assert!(out.contains(r#"width="50""#));
        assert!(out.contains(r#"data-layer="background""#));
    }
}
