//! Draws primitive lists through a render context.

use log::trace;

use figura_core::draw::{Primitive, RenderContext, Shape};

use crate::text;

/// Draws `primitives` in layer order, then by `z_index`.
///
/// The sort is stable, so primitives sharing a layer and z-index keep their
/// list order. The context is told about each layer before its first
/// primitive.
pub fn render_primitives(ctx: &mut dyn RenderContext, primitives: &[Primitive]) {
    let mut ordered: Vec<&Primitive> = primitives.iter().collect();
    ordered.sort_by_key(|p| (p.layer(), p.z_index().unwrap_or(0)));

    let mut current = None;
    for primitive in ordered {
        if current != Some(primitive.layer()) {
            current = Some(primitive.layer());
            ctx.enter_layer(primitive.layer());
        }
        trace!(key = primitive.key().as_str(), kind = primitive.shape().kind(); "Drawing primitive");
        draw_shape(ctx, primitive.shape());
    }
}

fn draw_shape(ctx: &mut dyn RenderContext, shape: &Shape) {
    match shape {
        Shape::Background(rect) => {
            ctx.draw_rect(rect.bounds, rect.fill, rect.stroke.as_ref(), rect.corner_radius)
        }
        Shape::GridLine(line) => ctx.draw_line(&[line.from, line.to], &line.stroke),
        Shape::Axis(axis) => {
            ctx.draw_line(&[axis.from, axis.to], &axis.stroke);
            for tick in &axis.ticks {
                ctx.draw_line(&[tick.from, tick.to], &axis.stroke);
                if let Some(label) = &tick.label {
                    text::write(ctx, &label.text, label.position, label.align);
                }
            }
        }
        Shape::Legend(legend) => {
            match legend.marker {
                Some(marker) => ctx.draw_marker(
                    legend.swatch.center(),
                    legend.swatch.width() / 2.0,
                    marker,
                    legend.color,
                    None,
                ),
                None => ctx.draw_rect(legend.swatch, Some(legend.color), None, 0.0),
            }
            let label = &legend.label;
            text::write(ctx, &label.text, label.position, label.align);
        }
        Shape::Surround(surround) => {
            let placed = &surround.text;
            text::write(ctx, &placed.text, placed.position, placed.align);
        }
        Shape::Bar(bar) => ctx.draw_rect(bar.bounds, Some(bar.fill), bar.stroke.as_ref(), 0.0),
        Shape::Line(line) => ctx.draw_line(&line.points, &line.stroke),
        Shape::Area(area) => ctx.draw_area(&area.path, Some(area.fill), None),
        Shape::Point(point) => ctx.draw_marker(
            point.center,
            point.radius,
            point.marker,
            point.fill,
            point.stroke.as_ref(),
        ),
        Shape::Label(label) => {
            let placed = &label.text;
            text::write(ctx, &placed.text, placed.position, placed.align);
        }
        Shape::TableCell(cell) => {
            if cell.fill.is_some() {
                ctx.draw_rect(cell.bounds, cell.fill, None, 0.0);
            }
            if let Some(placed) = &cell.text {
                text::write(ctx, &placed.text, placed.position, placed.align);
            }
        }
        Shape::Node(node) => ctx.draw_rect(node.bounds, Some(node.fill), None, 0.0),
        Shape::Link(link) => ctx.draw_area(&link.path(), Some(link.fill), None),
    }
}

#[cfg(test)]
mod tests {
    use figura_core::{
        color::Color,
        draw::{
            BarShape, DrawCall, GridLineShape, Layer, Orientation, PlotIndex, RecordingContext,
            RectShape, StrokeDefinition,
        },
        geometry::{Bounds, Point, Size},
    };

    use super::*;

    fn bar(key: &str, x: f32, z: Option<i32>) -> Primitive {
        let primitive = Primitive::new(
            key,
            Shape::Bar(BarShape {
                bounds: Bounds::new_from_top_left(Point::new(x, 0.0), Size::new(10.0, 10.0)),
                fill: Color::default(),
                stroke: None,
                series: 0,
                value: 1.0,
                index: PlotIndex::default(),
            }),
        );
        match z {
            Some(z) => primitive.with_z_index(z),
            None => primitive,
        }
    }

    fn grid() -> Primitive {
        Primitive::new(
            "grid",
            Shape::GridLine(GridLineShape {
                from: Point::new(0.0, 0.0),
                to: Point::new(10.0, 0.0),
                orientation: Orientation::Horizontal,
                stroke: StrokeDefinition::default(),
                index: PlotIndex::default(),
            }),
        )
    }

    fn background() -> Primitive {
        Primitive::new(
            "background",
            Shape::Background(RectShape {
                bounds: Bounds::from_size(Size::new(10.0, 10.0)),
                fill: Some(Color::default()),
                stroke: None,
                corner_radius: 0.0,
            }),
        )
    }

    #[test]
    fn test_layers_drawn_in_order() {
        let mut ctx = RecordingContext::new();
        render_primitives(&mut ctx, &[bar("b", 0.0, None), grid(), background()]);
        assert_eq!(ctx.layers(), [Layer::Background, Layer::Grid, Layer::Bar]);
    }

    #[test]
    fn test_z_index_then_list_order() {
        let mut ctx = RecordingContext::new();
        let primitives = [
            bar("top", 0.0, Some(2)),
            bar("first", 20.0, None),
            bar("second", 40.0, None),
            bar("under", 60.0, Some(-1)),
        ];
        render_primitives(&mut ctx, &primitives);

        let drawn: Vec<f32> = ctx
            .calls()
            .iter()
            .filter_map(|c| match c {
                DrawCall::Rect { bounds, .. } => Some(bounds.min_x()),
                _ => None,
            })
            .collect();
        assert_eq!(drawn, [60.0, 20.0, 40.0, 0.0]);
    }

    #[test]
    fn test_layer_entered_once() {
        let mut ctx = RecordingContext::new();
        render_primitives(&mut ctx, &[bar("a", 0.0, None), bar("b", 20.0, Some(1))]);
        assert_eq!(ctx.layers(), [Layer::Bar]);
    }
}
