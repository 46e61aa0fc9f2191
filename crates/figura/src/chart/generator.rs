//! Turns mapped series into bar, line, area, point and label primitives.

use std::collections::HashMap;

use log::trace;

use figura_core::{
    draw::{
        AreaShape, BarShape, HAlign, LabelShape, LinePrimitiveShape, PlacedText, PointShape,
        Primitive, RenderContext, RichText, Shape, StrokeDefinition, TextAlign, VAlign,
    },
    geometry::{Bounds, Path, Point},
};

use super::{
    mapper::{MappedChart, MappedSeries, MappedValue},
    PointsMode,
};
use crate::{
    error::FiguraError,
    format::ValueFormatter,
    style::{AreaMirror, ChartStyle, Stacking},
    text,
};

/// Which drawable of a value carries its data label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LabelOwner {
    Point,
    Bar,
    Line,
}

/// Running stack heights of one plot category, per side.
#[derive(Debug, Clone, Copy, Default)]
struct Stack {
    positive: f64,
    negative: f64,
}

/// Last bar series on each side of each stack, with the side's total.
type StackTops = HashMap<(usize, usize, bool), (usize, f64)>;

fn stack_tops(chart: &MappedChart) -> StackTops {
    let mut tops = StackTops::new();
    for (si, series) in chart.series.iter().enumerate().filter(|(_, s)| s.bar) {
        for (c, value) in series.values.iter().enumerate() {
            let Some(value) = value else { continue };
            let key = (series.plot, c, value.value >= 0.0);
            let total = tops.get(&key).map(|(_, t)| *t).unwrap_or(0.0) + value.value;
            tops.insert(key, (si, total));
        }
    }
    tops
}

fn shows_point(mode: PointsMode, category: usize, first: usize, last: usize) -> bool {
    match mode {
        PointsMode::None => false,
        PointsMode::All => true,
        PointsMode::Last => category == last,
        PointsMode::Ends => category == first || category == last,
    }
}

/// The value of the closest earlier series in the same plot.
fn previous_value<'a>(
    chart: &'a MappedChart,
    series_index: usize,
    category: usize,
) -> Option<Option<&'a MappedValue>> {
    let plot = chart.series.get(series_index)?.plot;
    chart.series[..series_index]
        .iter()
        .rev()
        .find(|s| s.plot == plot)
        .map(|s| s.values.get(category).and_then(Option::as_ref))
}

struct Generator<'a> {
    ctx: &'a dyn RenderContext,
    chart: &'a MappedChart,
    style: &'a ChartStyle,
    tops: StackTops,
    stacks: HashMap<(usize, usize), Stack>,
    primitives: Vec<Primitive>,
}

impl Generator<'_> {
    fn bar_slot(&self, series_index: usize, series: &MappedSeries, value: &MappedValue) -> (f32, f32) {
        let inner = value.slot.band * (1.0 - self.style.bar_gap).clamp(0.0, 1.0);
        if self.style.stacking == Stacking::Grouped {
            let members: Vec<_> = self
                .chart
                .series
                .iter()
                .enumerate()
                .filter(|(_, s)| s.bar && s.plot == series.plot)
                .map(|(i, _)| i)
                .collect();
            let count = members.len().max(1) as f32;
            let position = members.iter().position(|i| *i == series_index).unwrap_or(0) as f32;
            let width = (inner / count).min(self.style.max_bar_width);
            let left = value.slot.x - count * width / 2.0 + position * width;
            (left, width)
        } else {
            let width = inner.min(self.style.max_bar_width);
            (value.slot.x - width / 2.0, width)
        }
    }

    /// Emits the bar. Returns the y of the bar end, the number to show and
    /// whether this bar carries a label.
    fn bar(&mut self, si: usize, series: &MappedSeries, c: usize, value: &MappedValue) -> (f32, f64, bool) {
        let scale = &self.chart.plots[series.plot].scale;
        let (from, to) = match self.style.stacking {
            Stacking::Stacked => {
                let stack = self.stacks.entry((series.plot, c)).or_default();
                if value.value >= 0.0 {
                    let from = stack.positive;
                    stack.positive += value.value;
                    (from, stack.positive)
                } else {
                    let from = stack.negative;
                    stack.negative += value.value;
                    (from, stack.negative)
                }
            }
            Stacking::Imposed | Stacking::Grouped => (0.0, value.value),
        };
        let (left, width) = self.bar_slot(si, series, value);
        let (y_from, y_to) = (scale.map(from), scale.map(to));

        self.primitives.push(
            Primitive::new(
                format!("bar-{si}-{c}"),
                Shape::Bar(BarShape {
                    bounds: Bounds::from_corners(
                        Point::new(left, y_from),
                        Point::new(left + width, y_to),
                    ),
                    fill: series.color,
                    stroke: None,
                    series: si,
                    value: value.value,
                    index: series.index(&self.chart.plots, value.slot.lane),
                }),
            )
            .with_z_index(si as i32),
        );

        match self.style.stacking {
            Stacking::Stacked => {
                let side = value.value >= 0.0;
                match self.tops.get(&(series.plot, c, side)) {
                    Some((top, total)) if *top == si => (y_to, *total, true),
                    _ => (y_to, value.value, false),
                }
            }
            Stacking::Imposed | Stacking::Grouped => (y_to, value.value, true),
        }
    }

    fn label(
        &mut self,
        si: usize,
        series: &MappedSeries,
        c: usize,
        anchor: Point,
        offset: f32,
        number: f64,
    ) -> Result<(), FiguraError> {
        let text = self.style.label_format.format(number);
        let measured = text::measure(
            self.ctx,
            &RichText::plain(text, self.chart.label_style.clone()),
            f32::INFINITY,
        )?;
        let gap = offset + self.style.label_gap;
        let (position, align) = if number >= 0.0 {
            (
                Point::new(anchor.x(), anchor.y() - gap),
                TextAlign::new(HAlign::Center, VAlign::Bottom),
            )
        } else {
            (
                Point::new(anchor.x(), anchor.y() + gap),
                TextAlign::new(HAlign::Center, VAlign::Top),
            )
        };
        let lane = series.values[c].map(|v| v.slot.lane).unwrap_or(0);
        self.primitives.push(Primitive::new(
            format!("label-{si}-{c}"),
            Shape::Label(LabelShape {
                text: PlacedText::new(measured, position, align),
                index: series.index(&self.chart.plots, lane),
            }),
        ));
        Ok(())
    }

    fn series(&mut self, si: usize, series: &MappedSeries) -> Result<(), FiguraError> {
        let Some(plot) = self.chart.plots.get(series.plot) else {
            return Ok(());
        };
        let scale = plot.scale.clone();
        let present: Vec<usize> = (0..series.values.len())
            .filter(|c| series.values[*c].is_some())
            .collect();
        let (Some(&first), Some(&last)) = (present.first(), present.last()) else {
            return Ok(());
        };

        let mut line_points = Vec::new();
        for &c in &present {
            let Some(value) = series.values[c] else { continue };
            let point_shown = shows_point(series.points, c, first, last);
            let owner = if point_shown {
                Some(LabelOwner::Point)
            } else if series.bar {
                Some(LabelOwner::Bar)
            } else if series.line {
                Some(LabelOwner::Line)
            } else {
                None
            };

            let mut x = value.slot.x;
            let y = scale.map(value.value);
            let mut bar_label = None;
            if series.bar {
                let (left, width) = self.bar_slot(si, series, &value);
                x = left + width / 2.0;
                bar_label = Some(self.bar(si, series, c, &value));
            }

            if point_shown {
                self.primitives.push(Primitive::new(
                    format!("point-{si}-{c}"),
                    Shape::Point(PointShape {
                        center: Point::new(x, y),
                        radius: self.style.point_radius,
                        marker: series.marker,
                        fill: series.color,
                        stroke: None,
                        series: si,
                        index: series.index(&self.chart.plots, value.slot.lane),
                    }),
                ));
            }
            if series.line {
                line_points.push(Point::new(x, y));
            }

            if !series.labels {
                continue;
            }
            match owner {
                Some(LabelOwner::Point) => {
                    self.label(si, series, c, Point::new(x, y), self.style.point_radius, value.value)?
                }
                Some(LabelOwner::Bar) => {
                    if let Some((y_end, number, labelled)) = bar_label.filter(|(_, _, l)| *l) {
                        self.label(si, series, c, Point::new(x, y_end), 0.0, number)?;
                        trace!(series = si, category = c, labelled; "Bar label placed");
                    }
                }
                Some(LabelOwner::Line) => self.label(si, series, c, Point::new(x, y), 0.0, value.value)?,
                None => {}
            }
        }

        let index = series.index(&self.chart.plots, 0);
        if line_points.len() >= 2 {
            self.primitives.push(Primitive::new(
                format!("line-{si}"),
                Shape::Line(LinePrimitiveShape {
                    points: line_points,
                    stroke: StrokeDefinition::solid(series.color, self.style.line_width),
                    series: si,
                    index,
                }),
            ));
        }

        if series.area {
            if let Some(path) = self.area_path(si, series, &present) {
                self.primitives.push(Primitive::new(
                    format!("area-{si}"),
                    Shape::Area(AreaShape {
                        path,
                        fill: series.color.with_alpha(self.style.area_opacity),
                        series: si,
                        index,
                    }),
                ));
            }
        }
        Ok(())
    }

    /// Upper edge along the series, lower edge per the mirror policy.
    fn area_path(&self, si: usize, series: &MappedSeries, present: &[usize]) -> Option<Path> {
        let scale = &self.chart.plots[series.plot].scale;
        let baseline = scale.baseline();
        let mut upper = Vec::with_capacity(present.len());
        let mut lower = Vec::with_capacity(present.len());

        for &c in present {
            let Some(value) = series.values[c] else { continue };
            let x = value.slot.x;
            let bottom = match self.style.area_mirror {
                AreaMirror::ZeroLine => Some(baseline),
                AreaMirror::PreviousSeriesOrZero => Some(
                    previous_value(self.chart, si, c)
                        .flatten()
                        .map_or(baseline, |p| scale.map(p.value)),
                ),
                AreaMirror::PreviousSeriesOrSkip => match previous_value(self.chart, si, c) {
                    None => Some(baseline),
                    Some(previous) => previous.map(|p| scale.map(p.value)),
                },
            };
            upper.push(Point::new(x, scale.map(value.value)));
            if let Some(bottom) = bottom {
                lower.push(Point::new(x, bottom));
            }
        }

        if upper.len() < 2 || lower.is_empty() {
            return None;
        }
        upper.extend(lower.into_iter().rev());
        Some(Path::polygon(&upper))
    }
}

/// Generates content primitives for every mapped series.
///
/// Per value the point, bar and line are considered in that order and the
/// first one shown for the value carries the value's data label. In
/// [`Stacking::Stacked`] mode only the top bar of each stack side is
/// labelled, with the side's total. Missing values produce nothing.
///
/// # Errors
///
/// Fails only when a data label cannot be measured.
pub fn generate(
    ctx: &dyn RenderContext,
    chart: &MappedChart,
    style: &ChartStyle,
) -> Result<Vec<Primitive>, FiguraError> {
    let mut generator = Generator {
        ctx,
        chart,
        style,
        tops: stack_tops(chart),
        stacks: HashMap::new(),
        primitives: Vec::new(),
    };
    for (si, series) in chart.series.iter().enumerate() {
        generator.series(si, series)?;
    }
    trace!(count = generator.primitives.len(); "Generated chart primitives");
    Ok(generator.primitives)
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;
    use figura_core::{
        color::Color,
        draw::{MarkerShape, RecordingContext, RichTextStyle},
        geometry::PathCommand,
    };

    use super::*;
    use crate::chart::{
        mapper::{MappedPlot, Slot},
        LinearScale,
    };

    /// Plot of 100px height, domain 0..10 (or -10..10 with negatives).
    fn plot(min: f64, max: f64) -> MappedPlot {
        MappedPlot {
            pane: 0,
            tier: 0,
            bounds: Bounds::from_corners(Point::new(0.0, 0.0), Point::new(200.0, 100.0)),
            scale: LinearScale::new(min, max, 5, 100.0, 0.0),
        }
    }

    fn series(values: &[Option<f64>]) -> MappedSeries {
        MappedSeries {
            name: "s".into(),
            color: Color::new("steelblue").unwrap(),
            bar: false,
            line: false,
            area: false,
            points: PointsMode::None,
            marker: MarkerShape::Circle,
            labels: true,
            plot: 0,
            values: values
                .iter()
                .enumerate()
                .map(|(c, v)| {
                    v.map(|value| MappedValue {
                        value,
                        slot: Slot {
                            x: 25.0 + 50.0 * c as f32,
                            band: 50.0,
                            lane: 0,
                        },
                    })
                })
                .collect(),
        }
    }

    fn bars(values: &[Option<f64>]) -> MappedSeries {
        MappedSeries {
            bar: true,
            ..series(values)
        }
    }

    fn chart(plot: MappedPlot, series: Vec<MappedSeries>) -> MappedChart {
        MappedChart {
            plots: vec![plot],
            series,
            label_style: RichTextStyle::new("test", 10.0),
        }
    }

    fn style(stacking: Stacking) -> ChartStyle {
        ChartStyle {
            stacking,
            ..ChartStyle::default()
        }
    }

    fn of_kind<'a>(primitives: &'a [Primitive], kind: &str) -> Vec<&'a Primitive> {
        primitives.iter().filter(|p| p.shape().kind() == kind).collect()
    }

    fn label_texts(primitives: &[Primitive]) -> Vec<String> {
        primitives
            .iter()
            .filter_map(|p| match p.shape() {
                Shape::Label(l) => Some(l.text.text.plain_text()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_stacked_bars_accumulate_and_label_top() {
        let ctx = RecordingContext::new();
        let chart = chart(
            plot(0.0, 10.0),
            vec![bars(&[Some(2.0)]), bars(&[Some(3.0)]), bars(&[Some(5.0)])],
        );
        let primitives = generate(&ctx, &chart, &style(Stacking::Stacked)).unwrap();

        let heights: Vec<f32> = of_kind(&primitives, "bar")
            .iter()
            .map(|p| p.bounds().unwrap().height())
            .collect();
        assert_eq!(heights.len(), 3);
        let total = chart.plots[0].scale.length(10.0);
        assert_approx_eq!(f32, heights.iter().sum::<f32>(), total, epsilon = 0.001);
        assert_eq!(label_texts(&primitives), ["10"]);
        assert_eq!(
            of_kind(&primitives, "label")[0].key().as_str(),
            "label-2-0"
        );
    }

    #[test]
    fn test_stacked_negative_side_separate() {
        let ctx = RecordingContext::new();
        let chart = chart(
            plot(-10.0, 10.0),
            vec![bars(&[Some(4.0)]), bars(&[Some(-3.0)]), bars(&[Some(-2.0)])],
        );
        let primitives = generate(&ctx, &chart, &style(Stacking::Stacked)).unwrap();
        let baseline = chart.plots[0].scale.baseline();
        let bars = of_kind(&primitives, "bar");
        // The first negative bar starts at the baseline, not on the positive stack
        assert_approx_eq!(f32, bars[1].bounds().unwrap().min_y(), baseline);
        assert_approx_eq!(f32, bars[2].bounds().unwrap().min_y(), bars[1].bounds().unwrap().max_y());
        assert_eq!(label_texts(&primitives), ["4", "-5"]);
    }

    #[test]
    fn test_grouped_bars_split_band() {
        let ctx = RecordingContext::new();
        let chart = chart(plot(0.0, 10.0), vec![bars(&[Some(2.0)]), bars(&[Some(3.0)])]);
        let primitives = generate(&ctx, &chart, &style(Stacking::Grouped)).unwrap();
        let bars = of_kind(&primitives, "bar");
        let (a, b) = (bars[0].bounds().unwrap(), bars[1].bounds().unwrap());
        // band 50, gap 0.2 -> 40px shared by two bars
        assert_approx_eq!(f32, a.width(), 20.0);
        assert_approx_eq!(f32, a.max_x(), b.min_x());
        assert_approx_eq!(f32, (a.min_x() + b.max_x()) / 2.0, 25.0);
        assert_eq!(label_texts(&primitives).len(), 2);
    }

    #[test]
    fn test_grouped_bars_capped() {
        let ctx = RecordingContext::new();
        let chart = chart(plot(0.0, 10.0), vec![bars(&[Some(2.0)])]);
        let style = ChartStyle {
            max_bar_width: 12.0,
            ..style(Stacking::Grouped)
        };
        let primitives = generate(&ctx, &chart, &style).unwrap();
        assert_approx_eq!(f32, of_kind(&primitives, "bar")[0].bounds().unwrap().width(), 12.0);
    }

    #[test]
    fn test_imposed_bars_start_at_baseline() {
        let ctx = RecordingContext::new();
        let chart = chart(plot(0.0, 10.0), vec![bars(&[Some(6.0)]), bars(&[Some(3.0)])]);
        let primitives = generate(&ctx, &chart, &style(Stacking::Imposed)).unwrap();
        let bars = of_kind(&primitives, "bar");
        let baseline = chart.plots[0].scale.baseline();
        assert!(bars.iter().all(|b| (b.bounds().unwrap().max_y() - baseline).abs() < 1e-3));
        assert_eq!(bars[1].z_index(), Some(1));
    }

    #[test]
    fn test_label_priority_point_over_bar_over_line() {
        let ctx = RecordingContext::new();
        let mut mixed = bars(&[Some(1.0), Some(2.0), Some(3.0)]);
        mixed.line = true;
        mixed.points = PointsMode::Last;
        let chart = chart(plot(0.0, 10.0), vec![mixed]);
        let primitives = generate(&ctx, &chart, &style(Stacking::Grouped)).unwrap();

        assert_eq!(label_texts(&primitives), ["1", "2", "3"]);
        assert_eq!(of_kind(&primitives, "point").len(), 1);
        // The point label sits above the marker, not on the bar end
        let point = of_kind(&primitives, "point")[0].bounds().unwrap();
        let label = of_kind(&primitives, "label")[2].bounds().unwrap();
        assert!(label.max_y() <= point.min_y());
        assert_eq!(of_kind(&primitives, "line").len(), 1);
    }

    #[test]
    fn test_missing_values_skipped() {
        let ctx = RecordingContext::new();
        let mut line = series(&[Some(1.0), None, Some(3.0)]);
        line.line = true;
        let chart = chart(plot(0.0, 10.0), vec![line]);
        let primitives = generate(&ctx, &chart, &style(Stacking::Grouped)).unwrap();
        match of_kind(&primitives, "line")[0].shape() {
            Shape::Line(l) => assert_eq!(l.points.len(), 2),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(label_texts(&primitives), ["1", "3"]);
    }

    #[test]
    fn test_labels_disabled_per_series() {
        let ctx = RecordingContext::new();
        let mut quiet = bars(&[Some(1.0)]);
        quiet.labels = false;
        let chart = chart(plot(0.0, 10.0), vec![quiet]);
        let primitives = generate(&ctx, &chart, &style(Stacking::Grouped)).unwrap();
        assert!(label_texts(&primitives).is_empty());
    }

    fn area_vertices(primitive: &Primitive) -> Vec<Point> {
        let Shape::Area(area) = primitive.shape() else {
            panic!("not an area");
        };
        area.path
            .commands()
            .iter()
            .filter_map(|c| match c {
                PathCommand::MoveTo(p) | PathCommand::LineTo(p) => Some(*p),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_zero_line_area_closes_to_baseline() {
        let ctx = RecordingContext::new();
        let mut area = series(&[Some(2.0), Some(5.0), None, Some(4.0)]);
        area.area = true;
        let chart = chart(plot(0.0, 10.0), vec![area]);
        let primitives = generate(&ctx, &chart, &style(Stacking::Grouped)).unwrap();
        let vertices = area_vertices(of_kind(&primitives, "area")[0]);
        let baseline = chart.plots[0].scale.baseline();

        assert_eq!(vertices.len(), 6);
        for x in [25.0, 75.0, 175.0] {
            assert!(vertices
                .iter()
                .any(|v| (v.x() - x).abs() < 1e-3 && (v.y() - baseline).abs() < 1e-3));
        }
    }

    #[test]
    fn test_previous_series_mirrors() {
        let ctx = RecordingContext::new();
        let lower = series(&[Some(1.0), None, Some(1.0)]);
        let mut upper = series(&[Some(3.0), Some(8.0), Some(3.0)]);
        upper.area = true;

        let zero = ChartStyle {
            area_mirror: AreaMirror::PreviousSeriesOrZero,
            ..ChartStyle::default()
        };
        let chart = chart(plot(0.0, 10.0), vec![lower, upper]);
        let primitives = generate(&ctx, &chart, &zero).unwrap();
        let vertices = area_vertices(of_kind(&primitives, "area")[0]);
        assert_eq!(vertices.len(), 6);
        let baseline = chart.plots[0].scale.baseline();
        assert!(vertices.iter().any(|v| (v.y() - baseline).abs() < 1e-3));

        let skip = ChartStyle {
            area_mirror: AreaMirror::PreviousSeriesOrSkip,
            ..ChartStyle::default()
        };
        let primitives = generate(&ctx, &chart, &skip).unwrap();
        let vertices = area_vertices(of_kind(&primitives, "area")[0]);
        // The upper edge keeps every point; only the mirror vertex goes.
        assert_eq!(vertices.len(), 5);
        let at_gap: Vec<_> = vertices
            .iter()
            .filter(|v| (v.x() - 75.0).abs() < 1e-3)
            .collect();
        assert_eq!(at_gap.len(), 1);
        assert_approx_eq!(f32, at_gap[0].y(), chart.plots[0].scale.map(8.0), epsilon = 1e-3);
    }

    mod proptest_tests {
        use proptest::prelude::*;

        use super::*;

        fn check_stack_conservation(values: Vec<f64>) {
            let ctx = RecordingContext::new();
            let total: f64 = values.iter().sum();
            let series = values.iter().map(|v| bars(&[Some(*v)])).collect();
            let chart = chart(plot(0.0, total), series);
            let primitives = generate(&ctx, &chart, &style(Stacking::Stacked)).unwrap();

            let heights: f32 = of_kind(&primitives, "bar")
                .iter()
                .map(|p| p.bounds().unwrap().height())
                .sum();
            let expected = chart.plots[0].scale.length(total);
            assert!((heights - expected).abs() < 0.01, "{heights} vs {expected}");
            assert_eq!(label_texts(&primitives).len(), 1);
        }

        proptest! {
            #[test]
            fn stack_conservation(values in prop::collection::vec(0.1f64..100.0, 1..8)) {
                check_stack_conservation(values);
            }
        }
    }
}
