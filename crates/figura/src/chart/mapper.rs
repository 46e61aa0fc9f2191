//! Maps chart data onto pixel coordinates.
//!
//! The plot area is split into a grid of panes; each pane holds one or
//! more tiers stacked vertically, every tier with its own value scale.
//! Categories run along the horizontal axis of every pane, grouped into
//! lanes. The category axis itself is abstract ([`CategoryAxis`]) so
//! timeseries can place slots by time instead of by index.

use log::debug;

use figura_core::{
    color::Color,
    draw::{
        AxisShape, AxisTick, GridLineShape, HAlign, LabelShape, MarkerShape, MeasuredRichText,
        Orientation, PlacedText, PlotIndex, Primitive, RenderContext, RichText, RichTextStyle,
        Rotation, Shape, TextAlign, VAlign,
    },
    geometry::{Bounds, Point, Size},
};

use super::{scale::LinearScale, ChartData, LaneInput, PointsMode};
use crate::{
    error::FiguraError,
    format::ValueFormatter,
    style::{FigureStyle, Stacking, TextRole},
    text,
};

/// Horizontal position of one category.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slot {
    /// Center of the category.
    pub x: f32,
    /// Width available to the category's bars.
    pub band: f32,
    pub lane: usize,
}

/// A category axis tick with its optional label.
#[derive(Debug, Clone)]
pub struct CategoryTick {
    pub x: f32,
    pub label: Option<MeasuredRichText>,
}

/// A lane caption, centered under the lane's categories.
#[derive(Debug, Clone)]
pub struct LaneLabel {
    pub lane: usize,
    pub center: f32,
    pub text: MeasuredRichText,
}

/// Measured labels of a category axis.
#[derive(Debug, Clone, Default)]
pub struct CategoryLabels {
    pub ticks: Vec<CategoryTick>,
    pub lanes: Vec<LaneLabel>,
    /// Height of the tick labels plus lane labels below the axis line.
    pub height: f32,
}

/// Positions categories along the horizontal axis of a pane.
pub trait CategoryAxis {
    fn category_count(&self) -> usize;

    /// One slot per category between `left` and `right`.
    fn slots(&self, left: f32, right: f32) -> Vec<Slot>;

    fn labels(
        &self,
        ctx: &dyn RenderContext,
        left: f32,
        right: f32,
        style: &FigureStyle,
    ) -> Result<CategoryLabels, FiguraError>;

    /// Narrowest pane width (excluding the value axis) that keeps bands
    /// usable.
    fn min_width(&self, style: &FigureStyle) -> f32 {
        self.category_count() as f32 * style.chart.min_band_width
    }
}

/// Evenly sized category bands, grouped into lanes.
#[derive(Debug, Clone)]
pub struct BandAxis {
    categories: Vec<String>,
    /// `(label, first category, category count)`.
    lanes: Vec<(String, usize, usize)>,
    lane_gap: f32,
}

impl BandAxis {
    /// Builds the axis; lanes that overrun the categories are truncated and
    /// uncovered trailing categories form a final unlabelled lane.
    pub fn new(categories: Vec<String>, lanes: &[LaneInput], lane_gap: f32) -> Self {
        let mut spans = Vec::new();
        let mut start = 0;
        for lane in lanes {
            let size = lane.size.min(categories.len() - start);
            if size == 0 {
                continue;
            }
            spans.push((lane.label.clone(), start, size));
            start += size;
        }
        if start < categories.len() || spans.is_empty() {
            spans.push((String::new(), start, categories.len() - start));
        }
        Self {
            categories,
            lanes: spans,
            lane_gap,
        }
    }

    fn lane_of(&self, category: usize) -> usize {
        self.lanes
            .iter()
            .position(|(_, start, size)| category >= *start && category < start + size)
            .unwrap_or(0)
    }
}

impl CategoryAxis for BandAxis {
    fn category_count(&self) -> usize {
        self.categories.len()
    }

    fn slots(&self, left: f32, right: f32) -> Vec<Slot> {
        let count = self.categories.len();
        if count == 0 {
            return Vec::new();
        }
        let gaps = self.lanes.len().saturating_sub(1) as f32 * self.lane_gap;
        let band = (right - left - gaps).max(0.0) / count as f32;
        (0..count)
            .map(|i| {
                let lane = self.lane_of(i);
                Slot {
                    x: left + lane as f32 * self.lane_gap + (i as f32 + 0.5) * band,
                    band,
                    lane,
                }
            })
            .collect()
    }

    fn labels(
        &self,
        ctx: &dyn RenderContext,
        left: f32,
        right: f32,
        style: &FigureStyle,
    ) -> Result<CategoryLabels, FiguraError> {
        let slots = self.slots(left, right);
        let band = slots.first().map(|s| s.band).unwrap_or(0.0);
        let label_style = style.text_style(TextRole::Label);

        let horizontal = self
            .categories
            .iter()
            .map(|c| text::measure(ctx, &RichText::parse(c, label_style.clone()), band))
            .collect::<Result<Vec<_>, _>>()?;
        let overflows = horizontal.iter().any(|m| m.width() > band + 0.5);
        let measured = if overflows {
            self.categories
                .iter()
                .map(|c| {
                    text::measure_rotated(
                        ctx,
                        &RichText::parse(c, label_style.clone()),
                        style.chart.category_label_max,
                        Rotation::Anticlockwise,
                    )
                })
                .collect::<Result<Vec<_>, _>>()?
        } else {
            horizontal
        };

        let mut height = measured
            .iter()
            .map(|m| m.size().height())
            .fold(0.0, f32::max);
        let ticks = slots
            .iter()
            .zip(measured)
            .map(|(slot, label)| CategoryTick {
                x: slot.x,
                label: (!label.is_empty()).then_some(label),
            })
            .collect();

        let mut lanes = Vec::new();
        for (lane, (label, start, size)) in self.lanes.iter().enumerate() {
            if label.trim().is_empty() {
                continue;
            }
            let (Some(first), Some(last)) = (slots.get(*start), slots.get(start + size - 1))
            else {
                continue;
            };
            let width = last.x - first.x + last.band;
            let text = text::measure(ctx, &RichText::parse(label, label_style.clone()), width)?;
            lanes.push(LaneLabel {
                lane,
                center: (first.x + last.x) / 2.0,
                text,
            });
        }
        if let Some(lane_height) = lanes
            .iter()
            .map(|l| l.text.height())
            .reduce(f32::max)
        {
            height += style.chart.axis_label_gap + lane_height;
        }

        Ok(CategoryLabels {
            ticks,
            lanes,
            height,
        })
    }
}

/// One value scale region.
#[derive(Debug, Clone)]
pub struct MappedPlot {
    pub pane: usize,
    pub tier: usize,
    pub bounds: Bounds,
    pub scale: LinearScale,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MappedValue {
    pub value: f64,
    pub slot: Slot,
}

/// A series with its values positioned.
#[derive(Debug, Clone)]
pub struct MappedSeries {
    pub name: String,
    pub color: Color,
    pub bar: bool,
    pub line: bool,
    pub area: bool,
    pub points: PointsMode,
    pub marker: MarkerShape,
    pub labels: bool,
    /// Index into [`MappedChart::plots`].
    pub plot: usize,
    /// One entry per category; `None` where the value is missing.
    pub values: Vec<Option<MappedValue>>,
}

impl MappedSeries {
    pub fn index(&self, plots: &[MappedPlot], lane: usize) -> PlotIndex {
        plots
            .get(self.plot)
            .map(|p| PlotIndex::new(p.pane, p.tier, lane))
            .unwrap_or_default()
    }
}

/// Chart data in pixel space, ready for primitive generation.
#[derive(Debug, Clone)]
pub struct MappedChart {
    pub plots: Vec<MappedPlot>,
    pub series: Vec<MappedSeries>,
    pub label_style: RichTextStyle,
}

/// Output of [`map_chart`].
#[derive(Debug, Clone)]
pub struct ChartLayout {
    pub mapped: MappedChart,
    /// Grid lines, axes and lane labels.
    pub axes: Vec<Primitive>,
    /// Vertical space not taken by tier plot areas.
    pub fixed_height: f32,
    /// Tier plot areas stacked in one pane column.
    pub stacked_tiers: usize,
    pub min_width: f32,
}

/// Value extent of a pane/tier, with stacked bars summed per category.
fn extent(data: &ChartData, categories: usize, pane: usize, tier: usize, stacking: Stacking) -> (f64, f64) {
    let members: Vec<_> = data
        .series
        .iter()
        .filter(|s| s.pane == pane && s.tier == tier)
        .collect();
    let mut min = 0.0f64;
    let mut max = 0.0f64;
    for series in &members {
        if series.shows_bar() && stacking == Stacking::Stacked {
            continue;
        }
        for value in (0..categories).filter_map(|i| series.value(i)) {
            min = min.min(value);
            max = max.max(value);
        }
    }
    if stacking == Stacking::Stacked {
        for i in 0..categories {
            let (positive, negative) = members
                .iter()
                .filter(|s| s.shows_bar())
                .filter_map(|s| s.value(i))
                .fold((0.0, 0.0), |(p, n), v| if v >= 0.0 { (p + v, n) } else { (p, n + v) });
            min = min.min(negative);
            max = max.max(positive);
        }
    }
    (min, max)
}

fn label_height(ctx: &dyn RenderContext, style: &RichTextStyle) -> Result<f32, FiguraError> {
    Ok(text::measure(ctx, &RichText::plain("0", style.clone()), f32::INFINITY)?.height())
}

/// Lays out panes, tiers and axes inside `plot` and maps every series.
pub fn map_chart(
    ctx: &dyn RenderContext,
    plot: Bounds,
    data: &ChartData,
    axis: &dyn CategoryAxis,
    style: &FigureStyle,
) -> Result<ChartLayout, FiguraError> {
    data.check_indices()?;
    let chart = &style.chart;
    let categories = axis.category_count();
    let pane_count = data.series.iter().map(|s| s.pane + 1).max().unwrap_or(1);
    let tier_count = data.series.iter().map(|s| s.tier + 1).max().unwrap_or(1);
    let columns = data.pane_columns.clamp(1, pane_count);
    let rows = pane_count.div_ceil(columns);

    let pane_width = (plot.width() - (columns - 1) as f32 * chart.pane_gap) / columns as f32;
    let pane_height = (plot.height() - (rows - 1) as f32 * chart.pane_gap) / rows as f32;

    let label_style = style.text_style(TextRole::Label);
    let headroom = if chart.data_labels {
        label_height(ctx, &label_style)? + chart.label_gap
    } else {
        0.0
    };

    let mut plots = Vec::with_capacity(pane_count * tier_count);
    let mut pane_slots = Vec::with_capacity(pane_count);
    let mut axes = Vec::new();
    let mut category_block = 0.0f32;
    let mut value_axis_width = 0.0f32;

    for pane in 0..pane_count {
        let (column, row) = (pane % columns, pane / columns);
        let pane_bounds = Bounds::new_from_top_left(
            Point::new(
                plot.min_x() + column as f32 * (pane_width + chart.pane_gap),
                plot.min_y() + row as f32 * (pane_height + chart.pane_gap),
            ),
            Size::new(pane_width.max(0.0), pane_height.max(0.0)),
        );

        // Tick labels fix the value axis width before any height is known.
        let mut tier_scales = Vec::with_capacity(tier_count);
        let mut tick_labels = Vec::with_capacity(tier_count);
        let mut axis_width = 0.0f32;
        for tier in 0..tier_count {
            let (min, max) = extent(data, categories, pane, tier, chart.stacking);
            let scale = LinearScale::new(min, max, chart.tick_count, 1.0, 0.0);
            let labels = scale
                .ticks()
                .iter()
                .map(|tick| {
                    let label = chart.label_format.format(*tick);
                    text::measure(ctx, &RichText::plain(label, label_style.clone()), f32::INFINITY)
                })
                .collect::<Result<Vec<_>, _>>()?;
            axis_width = labels.iter().map(|l| l.width()).fold(axis_width, f32::max);
            tier_scales.push(scale);
            tick_labels.push(labels);
        }
        axis_width += chart.tick_length + chart.axis_label_gap;
        value_axis_width = value_axis_width.max(axis_width);

        let left = pane_bounds.min_x() + axis_width;
        let right = pane_bounds.max_x().max(left);
        let labels = axis.labels(ctx, left, right, style)?;
        let block = chart.tick_length + chart.axis_label_gap + labels.height;
        category_block = category_block.max(block);

        let axis_y = (pane_bounds.max_y() - block).max(pane_bounds.min_y());
        let tiers_height = axis_y - pane_bounds.min_y();
        let tier_height =
            ((tiers_height - (tier_count - 1) as f32 * chart.tier_gap) / tier_count as f32).max(0.0);

        for (tier, (scale, labels)) in tier_scales.into_iter().zip(tick_labels).enumerate() {
            let top = pane_bounds.min_y() + tier as f32 * (tier_height + chart.tier_gap);
            let bottom = top + tier_height;
            let footroom = if scale.domain().0 < 0.0 { headroom } else { 0.0 };
            let range_top = (top + headroom).min(bottom);
            let range_bottom = (bottom - footroom).max(range_top);
            let scale = scale.with_range(range_bottom, range_top);
            let index = PlotIndex::new(pane, tier, 0);

            for (k, tick) in scale.ticks().iter().enumerate() {
                let y = scale.map(*tick);
                axes.push(Primitive::new(
                    format!("grid-{pane}-{tier}-{k}"),
                    Shape::GridLine(GridLineShape {
                        from: Point::new(left, y),
                        to: Point::new(right, y),
                        orientation: Orientation::Horizontal,
                        stroke: style.grid.clone(),
                        index,
                    }),
                ));
            }

            let ticks = scale
                .ticks()
                .iter()
                .zip(labels)
                .map(|(tick, label)| {
                    let y = scale.map(*tick);
                    AxisTick {
                        from: Point::new(left - chart.tick_length, y),
                        to: Point::new(left, y),
                        label: Some(PlacedText::new(
                            label,
                            Point::new(left - chart.tick_length - chart.axis_label_gap, y),
                            TextAlign::new(HAlign::Right, VAlign::Middle),
                        )),
                    }
                })
                .collect();
            axes.push(Primitive::new(
                format!("value-axis-{pane}-{tier}"),
                Shape::Axis(AxisShape {
                    from: Point::new(left, top),
                    to: Point::new(left, bottom),
                    orientation: Orientation::Vertical,
                    stroke: style.axis.clone(),
                    ticks,
                    index,
                }),
            ));

            plots.push(MappedPlot {
                pane,
                tier,
                bounds: Bounds::from_corners(Point::new(left, top), Point::new(right, bottom)),
                scale,
            });
        }

        let last_tier = tier_count - 1;
        let label_top = axis_y + chart.tick_length + chart.axis_label_gap;
        let tick_label_height = labels
            .ticks
            .iter()
            .filter_map(|t| t.label.as_ref())
            .map(|l| l.size().height())
            .fold(0.0, f32::max);
        let ticks = labels
            .ticks
            .into_iter()
            .map(|tick| AxisTick {
                from: Point::new(tick.x, axis_y),
                to: Point::new(tick.x, axis_y + chart.tick_length),
                label: tick.label.map(|label| {
                    PlacedText::new(
                        label,
                        Point::new(tick.x, label_top),
                        TextAlign::new(HAlign::Center, VAlign::Top),
                    )
                }),
            })
            .collect();
        axes.push(Primitive::new(
            format!("category-axis-{pane}"),
            Shape::Axis(AxisShape {
                from: Point::new(left, axis_y),
                to: Point::new(right, axis_y),
                orientation: Orientation::Horizontal,
                stroke: style.axis.clone(),
                ticks,
                index: PlotIndex::new(pane, last_tier, 0),
            }),
        ));
        for lane in labels.lanes {
            axes.push(Primitive::new(
                format!("lane-{pane}-{}", lane.lane),
                Shape::Label(LabelShape {
                    text: PlacedText::new(
                        lane.text,
                        Point::new(
                            lane.center,
                            label_top + tick_label_height + chart.axis_label_gap,
                        ),
                        TextAlign::new(HAlign::Center, VAlign::Top),
                    ),
                    index: PlotIndex::new(pane, last_tier, lane.lane),
                }),
            ));
        }

        pane_slots.push(axis.slots(left, right));
    }

    let series = data
        .series
        .iter()
        .enumerate()
        .map(|(i, input)| {
            let slots = pane_slots.get(input.pane).map(Vec::as_slice).unwrap_or(&[]);
            MappedSeries {
                name: input.name.clone(),
                color: input.color.unwrap_or_else(|| style.color(i)),
                bar: input.shows_bar(),
                line: input.line,
                area: input.area,
                points: input.points,
                marker: input.marker,
                labels: input.labels.unwrap_or(chart.data_labels),
                plot: input.pane * tier_count + input.tier,
                values: slots
                    .iter()
                    .enumerate()
                    .map(|(c, slot)| input.value(c).map(|value| MappedValue { value, slot: *slot }))
                    .collect(),
            }
        })
        .collect();

    let fixed_height = plot_fixed_height(rows, tier_count, category_block, style);
    let min_width = columns as f32 * (value_axis_width + axis.min_width(style))
        + (columns - 1) as f32 * chart.pane_gap;
    debug!(panes = pane_count, tiers = tier_count, columns, fixed_height; "Chart plot mapped");

    Ok(ChartLayout {
        mapped: MappedChart {
            plots,
            series,
            label_style,
        },
        axes,
        fixed_height,
        stacked_tiers: rows * tier_count,
        min_width,
    })
}

fn plot_fixed_height(rows: usize, tiers: usize, category_block: f32, style: &FigureStyle) -> f32 {
    let chart = &style.chart;
    rows as f32 * category_block
        + rows.saturating_sub(1) as f32 * chart.pane_gap
        + (rows * tiers.saturating_sub(1)) as f32 * chart.tier_gap
}
