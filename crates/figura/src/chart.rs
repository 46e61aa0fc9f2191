//! Category charts: bars, lines, areas and points over a category axis.
//!
//! Measuring a chart runs in three steps:
//!
//! 1. [`surround`](crate::surround) places captions, legend and footnote.
//! 2. [`mapper`] splits the remaining plot area into panes and tiers,
//!    builds value scales and axes, and maps every value to pixels.
//! 3. [`generate`] turns the mapped series into content primitives.
//!
//! Timeseries reuse all three steps with a time-based category axis.

mod generator;
mod mapper;
mod scale;

use std::sync::Arc;

use log::debug;
use serde::Deserialize;

use figura_core::{
    color::Color,
    draw::{MarkerShape, Primitive, RenderContext},
    geometry::{Bounds, Size},
};

pub use generator::generate;
pub use mapper::{
    map_chart, BandAxis, CategoryAxis, CategoryLabels, CategoryTick, ChartLayout, LaneLabel,
    MappedChart, MappedPlot, MappedSeries, MappedValue, Slot,
};
pub use scale::{nice_step, nice_ticks, LinearScale};

use crate::{
    autofit::IdealHeight,
    error::FiguraError,
    figure::{self, Figure, FigureBase, FigureRenderer},
    pipeline,
    style::{FigureStyle, ScaledStyleResolver, StyleResolver},
    surround::{self, LegendEntry, MeasuredSurrounds},
};

/// Which values of a series get a point marker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointsMode {
    #[default]
    None,
    All,
    Last,
    /// First and last value.
    Ends,
}

/// One data series.
///
/// `values` align with the categories; `nan` or a missing trailing entry
/// means the category has no value. A series that enables none of `bar`,
/// `line`, `area` and `points` is drawn as bars.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SeriesInput {
    pub name: String,
    pub values: Vec<f64>,
    pub bar: bool,
    pub line: bool,
    pub area: bool,
    pub points: PointsMode,
    pub marker: MarkerShape,
    pub color: Option<Color>,
    pub pane: usize,
    pub tier: usize,
    /// Overrides the style's `data_labels` for this series.
    pub labels: Option<bool>,
}

impl SeriesInput {
    pub fn bars(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
            bar: true,
            ..Self::default()
        }
    }

    pub fn lines(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
            line: true,
            ..Self::default()
        }
    }

    pub fn shows_bar(&self) -> bool {
        self.bar || (!self.line && !self.area && self.points == PointsMode::None)
    }

    /// The finite value at `category`, if any.
    pub fn value(&self, category: usize) -> Option<f64> {
        self.values
            .get(category)
            .copied()
            .filter(|value| value.is_finite())
    }
}

/// A run of consecutive categories grouped under one label.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LaneInput {
    #[serde(default)]
    pub label: String,
    pub size: usize,
}

fn default_pane_columns() -> usize {
    1
}

/// Series shared by category charts and timeseries.
#[derive(Debug, Clone, Deserialize)]
pub struct ChartData {
    #[serde(default)]
    pub series: Vec<SeriesInput>,
    /// Panes per row of the pane grid.
    #[serde(default = "default_pane_columns")]
    pub pane_columns: usize,
}

impl ChartData {
    /// Checks that pane and tier indices stay below the series count, so
    /// the pane grid never holds more cells than there are series.
    ///
    /// # Errors
    ///
    /// Returns [`FiguraError::ChartShape`] naming the first offending series.
    pub fn check_indices(&self) -> Result<(), FiguraError> {
        let limit = self.series.len();
        for series in &self.series {
            for (what, index) in [("pane", series.pane), ("tier", series.tier)] {
                if index >= limit {
                    return Err(FiguraError::ChartShape(format!(
                        "series `{}` is in {what} {index}, but a chart with {limit} series has at most {limit} {what}s",
                        series.name
                    )));
                }
            }
        }
        Ok(())
    }
}

impl Default for ChartData {
    fn default() -> Self {
        Self {
            series: Vec::new(),
            pane_columns: default_pane_columns(),
        }
    }
}

/// Input of a category chart.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChartInput {
    #[serde(flatten)]
    pub base: FigureBase,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub lanes: Vec<LaneInput>,
    #[serde(flatten)]
    pub data: ChartData,
}

/// A measured category chart.
#[derive(Debug, Clone)]
pub struct MeasuredChart {
    pub bounds: Bounds,
    pub style: FigureStyle,
    pub scale: f32,
    pub surrounds: MeasuredSurrounds,
    pub mapped: MappedChart,
    pub primitives: Vec<Primitive>,
}

/// Legend entries for named series.
pub(crate) fn legend_entries(data: &ChartData, style: &FigureStyle) -> Vec<LegendEntry> {
    data.series
        .iter()
        .enumerate()
        .filter(|(_, s)| !s.name.trim().is_empty())
        .map(|(i, s)| {
            let entry = LegendEntry::new(s.name.clone(), s.color.unwrap_or_else(|| style.color(i)));
            if s.shows_bar() || s.points == PointsMode::None {
                entry
            } else {
                entry.with_marker(s.marker)
            }
        })
        .collect()
}

/// Measures a series figure at an already resolved style.
pub(crate) fn measure_series(
    ctx: &dyn RenderContext,
    bounds: Bounds,
    base: &FigureBase,
    data: &ChartData,
    axis: &dyn CategoryAxis,
    style: &FigureStyle,
    scale: f32,
) -> Result<MeasuredChart, FiguraError> {
    let legend = legend_entries(data, style);
    let surrounds = surround::layout(ctx, bounds, base, &legend, style)?;
    let layout = map_chart(ctx, surrounds.plot, data, axis, style)?;
    let content = generate(ctx, &layout.mapped, &style.chart)?;

    let mut primitives: Vec<Primitive> = figure::background(bounds, style).into_iter().collect();
    primitives.extend(surrounds.primitives.iter().cloned());
    primitives.extend(layout.axes);
    primitives.extend(content);

    Ok(MeasuredChart {
        bounds,
        style: style.clone(),
        scale,
        surrounds,
        mapped: layout.mapped,
        primitives,
    })
}

/// Height range and minimum width of a series figure at `width`.
pub(crate) fn estimate_series(
    ctx: &dyn RenderContext,
    width: f32,
    base: &FigureBase,
    data: &ChartData,
    axis: &dyn CategoryAxis,
    style: &FigureStyle,
) -> Result<IdealHeight, FiguraError> {
    let chart = &style.chart;
    let legend = legend_entries(data, style);
    // Surrounds and axes depend on the width only.
    let probe = Bounds::from_size(Size::new(width, chart.max_plot_height * 16.0 + 1000.0));
    let surrounds = surround::layout(ctx, probe, base, &legend, style)?;
    let layout = map_chart(ctx, surrounds.plot, data, axis, style)?;

    let fixed = surrounds.height + layout.fixed_height;
    let tiers = layout.stacked_tiers as f32;
    let min_width = layout.min_width + 2.0 * style.padding;
    Ok(IdealHeight::new(
        fixed + tiers * chart.min_plot_height,
        fixed + tiers * chart.ideal_plot_height,
        fixed + tiers * chart.max_plot_height,
        width,
        min_width,
    ))
}

/// Renders category charts.
pub struct ChartRenderer {
    resolver: Arc<dyn StyleResolver>,
}

impl Default for ChartRenderer {
    fn default() -> Self {
        Self::new(Arc::new(ScaledStyleResolver))
    }
}

impl ChartRenderer {
    pub fn new(resolver: Arc<dyn StyleResolver>) -> Self {
        Self { resolver }
    }

    fn axis(input: &ChartInput, style: &FigureStyle) -> BandAxis {
        BandAxis::new(input.categories.clone(), &input.lanes, style.chart.lane_gap)
    }

    fn estimate(
        &self,
        ctx: &dyn RenderContext,
        width: f32,
        input: &ChartInput,
        scale: f32,
    ) -> Result<IdealHeight, FiguraError> {
        let style = figure::resolve_style(self.resolver.as_ref(), &input.base, scale);
        let axis = Self::axis(input, &style);
        estimate_series(ctx, width, &input.base, &input.data, &axis, &style)
    }

    fn scale_for(
        &self,
        ctx: &dyn RenderContext,
        width: f32,
        height: f32,
        input: &ChartInput,
        responsive_scale: Option<f32>,
    ) -> f32 {
        figure::resolve_scale(&input.base, responsive_scale, width, height, |s| {
            let ideal = self.estimate(ctx, width, input, s)?;
            Ok((width / ideal.needed_scaling_to_fit_width, ideal.ideal_h))
        })
    }
}

impl FigureRenderer for ChartRenderer {
    type Input = ChartInput;
    type Measured = MeasuredChart;

    fn is_type(&self, figure: &Figure) -> bool {
        matches!(figure, Figure::Chart(_))
    }

    fn measure(
        &self,
        ctx: &dyn RenderContext,
        bounds: Bounds,
        input: &ChartInput,
        responsive_scale: Option<f32>,
    ) -> Result<MeasuredChart, FiguraError> {
        let scale = self.scale_for(ctx, bounds.width(), bounds.height(), input, responsive_scale);
        let style = figure::resolve_style(self.resolver.as_ref(), &input.base, scale);
        let axis = Self::axis(input, &style);
        let measured = measure_series(ctx, bounds, &input.base, &input.data, &axis, &style, scale)?;
        debug!(
            series = input.data.series.len(),
            categories = input.categories.len(),
            scale;
            "Chart measured"
        );
        Ok(measured)
    }

    fn render(&self, ctx: &mut dyn RenderContext, measured: &MeasuredChart) {
        pipeline::render_primitives(ctx, &measured.primitives);
    }

    fn ideal_height(
        &self,
        ctx: &dyn RenderContext,
        width: f32,
        input: &ChartInput,
        responsive_scale: Option<f32>,
    ) -> Result<IdealHeight, FiguraError> {
        let scale = self.scale_for(ctx, width, f32::INFINITY, input, responsive_scale);
        self.estimate(ctx, width, input, scale)
    }
}
