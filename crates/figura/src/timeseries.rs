//! Timeseries: charts whose category axis is time.
//!
//! Slots sit at x positions proportional to their timestamps. The bar band
//! is the smallest spacing between neighbouring timestamps, so bars never
//! overlap. Axis ticks are placed on calendar-aligned intervals rather than
//! on the data timestamps.

use std::{fmt::Write as _, sync::Arc};

use chrono::{DateTime, Datelike, Months, NaiveDate, NaiveDateTime};
use log::debug;
use serde::Deserialize;

use figura_core::{
    draw::{RenderContext, RichText},
    geometry::Bounds,
};

use crate::{
    autofit::IdealHeight,
    chart::{self, CategoryAxis, CategoryLabels, CategoryTick, ChartData, MeasuredChart, Slot},
    error::FiguraError,
    figure::{self, Figure, FigureBase, FigureRenderer},
    pipeline,
    style::{FigureStyle, ScaledStyleResolver, StyleResolver, TextRole},
    text,
};

const DEFAULT_TIME_FORMAT: &str = "%Y-%m-%d";

/// A point in time without a time zone.
///
/// Deserialized from strings such as `"2024-03-01"`, `"2024-03-01 12:30"`
/// or `"2024-03-01T12:30:00"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(try_from = "String")]
pub struct Timestamp(NaiveDateTime);

impl Timestamp {
    pub fn new(value: NaiveDateTime) -> Self {
        Self(value)
    }

    pub fn value(self) -> NaiveDateTime {
        self.0
    }

    fn seconds(self) -> i64 {
        self.0.and_utc().timestamp()
    }
}

impl TryFrom<String> for Timestamp {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        const DATETIME_FORMATS: [&str; 4] = [
            "%Y-%m-%dT%H:%M:%S",
            "%Y-%m-%d %H:%M:%S",
            "%Y-%m-%dT%H:%M",
            "%Y-%m-%d %H:%M",
        ];
        let trimmed = value.trim();
        DATETIME_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
            .or_else(|| {
                NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                    .ok()
                    .and_then(|date| date.and_hms_opt(0, 0, 0))
            })
            .map(Self)
            .ok_or_else(|| format!("Invalid timestamp `{value}`, expected YYYY-MM-DD[ HH:MM[:SS]]"))
    }
}

/// Spacing between time axis ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeInterval {
    Seconds(i64),
    Months(u32),
}

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;

/// Candidate intervals, shortest first.
const INTERVALS: [TimeInterval; 25] = [
    TimeInterval::Seconds(1),
    TimeInterval::Seconds(5),
    TimeInterval::Seconds(15),
    TimeInterval::Seconds(30),
    TimeInterval::Seconds(MINUTE),
    TimeInterval::Seconds(5 * MINUTE),
    TimeInterval::Seconds(15 * MINUTE),
    TimeInterval::Seconds(30 * MINUTE),
    TimeInterval::Seconds(HOUR),
    TimeInterval::Seconds(3 * HOUR),
    TimeInterval::Seconds(6 * HOUR),
    TimeInterval::Seconds(12 * HOUR),
    TimeInterval::Seconds(DAY),
    TimeInterval::Seconds(2 * DAY),
    TimeInterval::Seconds(7 * DAY),
    TimeInterval::Months(1),
    TimeInterval::Months(3),
    TimeInterval::Months(6),
    TimeInterval::Months(12),
    TimeInterval::Months(24),
    TimeInterval::Months(60),
    TimeInterval::Months(120),
    TimeInterval::Months(240),
    TimeInterval::Months(600),
    TimeInterval::Months(1200),
];

fn from_seconds(seconds: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp(seconds, 0).map(|dt| dt.naive_utc())
}

fn ticks_at(first: NaiveDateTime, last: NaiveDateTime, interval: TimeInterval, limit: usize) -> Option<Vec<NaiveDateTime>> {
    let mut ticks = Vec::new();
    match interval {
        TimeInterval::Seconds(step) => {
            let start = first.and_utc().timestamp();
            let end = last.and_utc().timestamp();
            let mut tick = start.div_euclid(step) * step;
            if tick < start {
                tick += step;
            }
            while tick <= end {
                if ticks.len() == limit {
                    return None;
                }
                ticks.push(from_seconds(tick)?);
                tick += step;
            }
        }
        TimeInterval::Months(step) => {
            // Months counted from year 0 keep multi-month ticks on quarter
            // and year boundaries.
            let index = first.year() as i64 * 12 + first.month0() as i64;
            let mut aligned = index.div_euclid(step as i64) * step as i64;
            let month_start = |index: i64| {
                NaiveDate::from_ymd_opt(index.div_euclid(12) as i32, index.rem_euclid(12) as u32 + 1, 1)
                    .and_then(|date| date.and_hms_opt(0, 0, 0))
            };
            let mut tick = month_start(aligned)?;
            if tick < first {
                aligned += step as i64;
                tick = month_start(aligned)?;
            }
            while tick <= last {
                if ticks.len() == limit {
                    return None;
                }
                ticks.push(tick);
                tick = tick.checked_add_months(Months::new(step))?;
            }
        }
    }
    Some(ticks)
}

/// Calendar-aligned ticks between `first` and `last`, at most `max_ticks`.
///
/// The shortest interval from a fixed ladder (seconds up to centuries)
/// that yields no more than `max_ticks` ticks wins.
pub fn time_ticks(first: NaiveDateTime, last: NaiveDateTime, max_ticks: usize) -> Vec<NaiveDateTime> {
    let limit = max_ticks.max(1);
    if last <= first {
        return vec![first];
    }
    INTERVALS
        .iter()
        .find_map(|interval| ticks_at(first, last, *interval, limit).filter(|t| !t.is_empty()))
        .unwrap_or_else(|| vec![first, last])
}

/// Formats with a strftime pattern, falling back to ISO dates when the
/// pattern is invalid.
fn format_time(value: NaiveDateTime, pattern: &str) -> String {
    let mut out = String::new();
    if write!(out, "{}", value.format(pattern)).is_err() {
        out.clear();
        // The default pattern is always valid
        let _ = write!(out, "{}", value.format(DEFAULT_TIME_FORMAT));
    }
    out
}

/// Category axis positioned by time.
#[derive(Debug, Clone)]
pub struct TimeAxis {
    times: Vec<Timestamp>,
    format: String,
    max_ticks: usize,
}

impl TimeAxis {
    pub fn new(times: Vec<Timestamp>, format: impl Into<String>, max_ticks: usize) -> Self {
        Self {
            times,
            format: format.into(),
            max_ticks,
        }
    }

    /// `(first, span, min_gap)` in seconds.
    fn extent(&self) -> Option<(i64, i64, i64)> {
        let first = self.times.iter().min()?.seconds();
        let last = self.times.iter().max()?.seconds();
        let mut sorted: Vec<i64> = self.times.iter().map(|t| t.seconds()).collect();
        sorted.sort_unstable();
        let min_gap = sorted
            .windows(2)
            .map(|w| w[1] - w[0])
            .filter(|gap| *gap > 0)
            .min()
            .unwrap_or(0);
        Some((first, last - first, min_gap))
    }

    /// Band width and the x of `seconds`, for the range `left..right`.
    fn placement(&self, left: f32, right: f32) -> Option<(f32, impl Fn(i64) -> f32)> {
        let (first, span, min_gap) = self.extent()?;
        let width = (right - left).max(0.0);
        let band = if span > 0 && min_gap > 0 {
            width * min_gap as f32 / (span + min_gap) as f32
        } else {
            width
        };
        let travel = width - band;
        let x = move |seconds: i64| {
            if span > 0 {
                left + band / 2.0 + (seconds - first) as f32 / span as f32 * travel
            } else {
                left + width / 2.0
            }
        };
        Some((band, x))
    }

    /// Tick instants for the whole axis.
    pub fn ticks(&self) -> Vec<NaiveDateTime> {
        match (self.times.iter().min(), self.times.iter().max()) {
            (Some(first), Some(last)) => time_ticks(first.value(), last.value(), self.max_ticks),
            _ => Vec::new(),
        }
    }
}

impl CategoryAxis for TimeAxis {
    fn category_count(&self) -> usize {
        self.times.len()
    }

    fn slots(&self, left: f32, right: f32) -> Vec<Slot> {
        let Some((band, x)) = self.placement(left, right) else {
            return Vec::new();
        };
        self.times
            .iter()
            .map(|t| Slot {
                x: x(t.seconds()),
                band,
                lane: 0,
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
        let Some((_, x)) = self.placement(left, right) else {
            return Ok(CategoryLabels::default());
        };
        let label_style = style.text_style(TextRole::Label);
        let mut ticks = Vec::new();
        let mut height = 0.0f32;
        for tick in self.ticks() {
            let label = format_time(tick, &self.format);
            let measured = text::measure(ctx, &RichText::plain(label, label_style.clone()), f32::INFINITY)?;
            height = height.max(measured.height());
            ticks.push(CategoryTick {
                x: x(tick.and_utc().timestamp()),
                label: Some(measured),
            });
        }
        Ok(CategoryLabels {
            ticks,
            lanes: Vec::new(),
            height,
        })
    }
}

fn default_time_format() -> String {
    DEFAULT_TIME_FORMAT.to_string()
}

fn default_max_time_ticks() -> usize {
    6
}

/// Input of a timeseries figure.
#[derive(Debug, Clone, Deserialize)]
pub struct TimeseriesInput {
    #[serde(flatten)]
    pub base: FigureBase,
    pub timestamps: Vec<Timestamp>,
    /// strftime pattern of tick labels.
    #[serde(default = "default_time_format")]
    pub time_format: String,
    #[serde(default = "default_max_time_ticks")]
    pub max_time_ticks: usize,
    #[serde(flatten)]
    pub data: ChartData,
}

impl TimeseriesInput {
    /// Timestamps in ascending order with series values permuted to match.
    fn sorted(&self) -> (Vec<Timestamp>, ChartData) {
        let mut order: Vec<usize> = (0..self.timestamps.len()).collect();
        order.sort_by_key(|i| self.timestamps[*i]);
        let timestamps = order.iter().map(|i| self.timestamps[*i]).collect();
        let mut data = self.data.clone();
        for series in &mut data.series {
            series.values = order
                .iter()
                .map(|i| series.values.get(*i).copied().unwrap_or(f64::NAN))
                .collect();
        }
        (timestamps, data)
    }

    fn axis(&self, timestamps: Vec<Timestamp>) -> TimeAxis {
        TimeAxis::new(timestamps, self.time_format.clone(), self.max_time_ticks)
    }
}

/// A measured timeseries.
#[derive(Debug, Clone)]
pub struct MeasuredTimeseries {
    pub chart: MeasuredChart,
    pub time_ticks: Vec<NaiveDateTime>,
}

/// Renders timeseries figures.
pub struct TimeseriesRenderer {
    resolver: Arc<dyn StyleResolver>,
}

impl Default for TimeseriesRenderer {
    fn default() -> Self {
        Self::new(Arc::new(ScaledStyleResolver))
    }
}

impl TimeseriesRenderer {
    pub fn new(resolver: Arc<dyn StyleResolver>) -> Self {
        Self { resolver }
    }

    fn estimate(
        &self,
        ctx: &dyn RenderContext,
        width: f32,
        input: &TimeseriesInput,
        scale: f32,
    ) -> Result<IdealHeight, FiguraError> {
        let style = figure::resolve_style(self.resolver.as_ref(), &input.base, scale);
        let (timestamps, data) = input.sorted();
        let axis = input.axis(timestamps);
        chart::estimate_series(ctx, width, &input.base, &data, &axis, &style)
    }

    fn scale_for(
        &self,
        ctx: &dyn RenderContext,
        width: f32,
        height: f32,
        input: &TimeseriesInput,
        responsive_scale: Option<f32>,
    ) -> f32 {
        figure::resolve_scale(&input.base, responsive_scale, width, height, |s| {
            let ideal = self.estimate(ctx, width, input, s)?;
            Ok((width / ideal.needed_scaling_to_fit_width, ideal.ideal_h))
        })
    }
}

impl FigureRenderer for TimeseriesRenderer {
    type Input = TimeseriesInput;
    type Measured = MeasuredTimeseries;

    fn is_type(&self, figure: &Figure) -> bool {
        matches!(figure, Figure::Timeseries(_))
    }

    fn measure(
        &self,
        ctx: &dyn RenderContext,
        bounds: Bounds,
        input: &TimeseriesInput,
        responsive_scale: Option<f32>,
    ) -> Result<MeasuredTimeseries, FiguraError> {
        let scale = self.scale_for(ctx, bounds.width(), bounds.height(), input, responsive_scale);
        let style = figure::resolve_style(self.resolver.as_ref(), &input.base, scale);
        let (timestamps, data) = input.sorted();
        let axis = input.axis(timestamps);
        let chart = chart::measure_series(ctx, bounds, &input.base, &data, &axis, &style, scale)?;
        let time_ticks = axis.ticks();
        debug!(
            timestamps = input.timestamps.len(),
            ticks = time_ticks.len(),
            scale;
            "Timeseries measured"
        );
        Ok(MeasuredTimeseries { chart, time_ticks })
    }

    fn render(&self, ctx: &mut dyn RenderContext, measured: &MeasuredTimeseries) {
        pipeline::render_primitives(ctx, &measured.chart.primitives);
    }

    fn ideal_height(
        &self,
        ctx: &dyn RenderContext,
        width: f32,
        input: &TimeseriesInput,
        responsive_scale: Option<f32>,
    ) -> Result<IdealHeight, FiguraError> {
        let scale = self.scale_for(ctx, width, f32::INFINITY, input, responsive_scale);
        self.estimate(ctx, width, input, scale)
    }
}
