//! Figure documents and the renderers that measure and draw them.
//!
//! Every figure kind has a renderer implementing [`FigureRenderer`].
//! Measurement is pure: it takes the render context by shared reference and
//! returns an immutable measured figure holding its primitive list. Drawing
//! replays that list through the [`pipeline`](crate::pipeline) and never
//! measures again.

use std::sync::Arc;

use log::{debug, info};
use serde::Deserialize;

use figura_core::{
    draw::{Primitive, RectShape, RenderContext, Shape},
    geometry::Bounds,
};

use crate::{
    autofit::{find_optimal_scale, IdealHeight, ScaleRange},
    chart::{ChartInput, ChartRenderer, MeasuredChart},
    diagram::{DiagramInput, DiagramRenderer, MeasuredDiagram},
    error::FiguraError,
    style::{FigureStyle, ScaledStyleResolver, StyleResolver},
    table::{MeasuredTable, TableInput, TableRenderer},
    timeseries::{MeasuredTimeseries, TimeseriesInput, TimeseriesRenderer},
};

/// Fields shared by every figure kind.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FigureBase {
    /// Caption markup, drawn at the top.
    pub caption: Option<String>,
    pub sub_caption: Option<String>,
    /// Footnote markup, drawn at the bottom.
    pub footnote: Option<String>,
    /// Replaces legend labels by position.
    pub legend: Option<Vec<String>>,
    pub style: FigureStyle,
    /// Scale range searched to fit the figure; scale 1 when absent.
    pub autofit: Option<ScaleRange>,
}

/// A figure document, tagged by `kind`.
///
/// ```
/// # use figura::figure::Figure;
/// let figure: Figure = toml::from_str(r#"
///     kind = "chart"
///     caption = "Sales"
///     categories = ["Q1", "Q2"]
///     [[series]]
///     name = "Online"
///     values = [3, 5]
/// "#).unwrap();
/// assert_eq!(figure.kind(), "chart");
/// assert_eq!(figure.base().caption.as_deref(), Some("Sales"));
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Figure {
    Chart(ChartInput),
    Timeseries(TimeseriesInput),
    Table(TableInput),
    Diagram(DiagramInput),
}

impl Figure {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Chart(_) => "chart",
            Self::Timeseries(_) => "timeseries",
            Self::Table(_) => "table",
            Self::Diagram(_) => "diagram",
        }
    }

    pub fn base(&self) -> &FigureBase {
        match self {
            Self::Chart(input) => &input.base,
            Self::Timeseries(input) => &input.base,
            Self::Table(input) => &input.base,
            Self::Diagram(input) => &input.base,
        }
    }

    pub fn base_mut(&mut self) -> &mut FigureBase {
        match self {
            Self::Chart(input) => &mut input.base,
            Self::Timeseries(input) => &mut input.base,
            Self::Table(input) => &mut input.base,
            Self::Diagram(input) => &mut input.base,
        }
    }
}

/// Measures and draws one kind of figure.
///
/// `responsive_scale` forces a scale; when it is `None` the figure's
/// `autofit` range is searched, and without one the scale is 1.
pub trait FigureRenderer {
    type Input;
    type Measured;

    /// Whether this renderer handles `figure`.
    fn is_type(&self, figure: &Figure) -> bool;

    /// Lays out the figure inside `bounds`.
    ///
    /// # Errors
    ///
    /// Fails when text cannot be measured or the input is malformed.
    fn measure(
        &self,
        ctx: &dyn RenderContext,
        bounds: Bounds,
        input: &Self::Input,
        responsive_scale: Option<f32>,
    ) -> Result<Self::Measured, FiguraError>;

    /// Draws a measured figure.
    fn render(&self, ctx: &mut dyn RenderContext, measured: &Self::Measured);

    fn measure_and_render(
        &self,
        ctx: &mut dyn RenderContext,
        bounds: Bounds,
        input: &Self::Input,
        responsive_scale: Option<f32>,
    ) -> Result<(), FiguraError> {
        let measured = self.measure(ctx, bounds, input, responsive_scale)?;
        self.render(ctx, &measured);
        Ok(())
    }

    /// Heights the figure can use at `width`.
    fn ideal_height(
        &self,
        ctx: &dyn RenderContext,
        width: f32,
        input: &Self::Input,
        responsive_scale: Option<f32>,
    ) -> Result<IdealHeight, FiguraError>;
}

/// Picks the responsive scale of a figure.
///
/// `estimate` returns the minimum width and height needed at a scale.
pub(crate) fn resolve_scale<F>(
    base: &FigureBase,
    explicit: Option<f32>,
    width: f32,
    height: f32,
    estimate: F,
) -> f32
where
    F: Fn(f32) -> Result<(f32, f32), FiguraError>,
{
    if let Some(scale) = explicit {
        return scale;
    }
    let Some(range) = base.autofit else {
        return 1.0;
    };
    let scale = find_optimal_scale(
        width,
        height,
        range,
        |s| estimate(s).map(|(w, _)| w),
        |s| estimate(s).map(|(_, h)| h),
    );
    debug!(scale, width, height; "Resolved responsive scale");
    scale
}

/// Full-size background rectangle, when the style sets a color.
pub(crate) fn background(bounds: Bounds, style: &FigureStyle) -> Option<Primitive> {
    style.background.map(|fill| {
        Primitive::new(
            "background",
            Shape::Background(RectShape {
                bounds,
                fill: Some(fill),
                stroke: None,
                corner_radius: 0.0,
            }),
        )
    })
}

/// Resolves the style a renderer measures with.
pub(crate) fn resolve_style(
    resolver: &dyn StyleResolver,
    base: &FigureBase,
    scale: f32,
) -> FigureStyle {
    resolver.resolve(&base.style, scale)
}

/// A measured figure of any kind.
#[derive(Debug, Clone)]
pub enum MeasuredFigure {
    Chart(MeasuredChart),
    Timeseries(MeasuredTimeseries),
    Table(MeasuredTable),
    Diagram(MeasuredDiagram),
}

impl MeasuredFigure {
    pub fn bounds(&self) -> Bounds {
        match self {
            Self::Chart(m) => m.bounds,
            Self::Timeseries(m) => m.chart.bounds,
            Self::Table(m) => m.bounds,
            Self::Diagram(m) => m.bounds,
        }
    }

    pub fn primitives(&self) -> &[Primitive] {
        match self {
            Self::Chart(m) => &m.primitives,
            Self::Timeseries(m) => &m.chart.primitives,
            Self::Table(m) => &m.primitives,
            Self::Diagram(m) => &m.primitives,
        }
    }

    /// Responsive scale the figure was measured at.
    pub fn scale(&self) -> f32 {
        match self {
            Self::Chart(m) => m.scale,
            Self::Timeseries(m) => m.chart.scale,
            Self::Table(m) => m.scale,
            Self::Diagram(m) => m.scale,
        }
    }
}

/// Routes figures to the renderer of their kind.
pub struct FigureDispatch {
    chart: ChartRenderer,
    timeseries: TimeseriesRenderer,
    table: TableRenderer,
    diagram: DiagramRenderer,
}

impl Default for FigureDispatch {
    fn default() -> Self {
        Self::new(Arc::new(ScaledStyleResolver))
    }
}

impl FigureDispatch {
    /// Creates renderers that all share `resolver`.
    pub fn new(resolver: Arc<dyn StyleResolver>) -> Self {
        Self {
            chart: ChartRenderer::new(Arc::clone(&resolver)),
            timeseries: TimeseriesRenderer::new(Arc::clone(&resolver)),
            table: TableRenderer::new(Arc::clone(&resolver)),
            diagram: DiagramRenderer::new(resolver),
        }
    }

    /// Name of the renderer that handles `figure`.
    pub fn renderer_for(&self, figure: &Figure) -> Option<&'static str> {
        if self.chart.is_type(figure) {
            Some("chart")
        } else if self.timeseries.is_type(figure) {
            Some("timeseries")
        } else if self.table.is_type(figure) {
            Some("table")
        } else if self.diagram.is_type(figure) {
            Some("diagram")
        } else {
            None
        }
    }

    pub fn measure(
        &self,
        ctx: &dyn RenderContext,
        bounds: Bounds,
        figure: &Figure,
        responsive_scale: Option<f32>,
    ) -> Result<MeasuredFigure, FiguraError> {
        info!(kind = figure.kind(), width = bounds.width(), height = bounds.height(); "Measuring figure");
        let measured = match figure {
            Figure::Chart(input) => MeasuredFigure::Chart(self.chart.measure(
                ctx,
                bounds,
                input,
                responsive_scale,
            )?),
            Figure::Timeseries(input) => MeasuredFigure::Timeseries(self.timeseries.measure(
                ctx,
                bounds,
                input,
                responsive_scale,
            )?),
            Figure::Table(input) => MeasuredFigure::Table(self.table.measure(
                ctx,
                bounds,
                input,
                responsive_scale,
            )?),
            Figure::Diagram(input) => MeasuredFigure::Diagram(self.diagram.measure(
                ctx,
                bounds,
                input,
                responsive_scale,
            )?),
        };
        debug!(
            primitives = measured.primitives().len(),
            scale = measured.scale();
            "Figure measured"
        );
        Ok(measured)
    }

    pub fn render(&self, ctx: &mut dyn RenderContext, measured: &MeasuredFigure) {
        match measured {
            MeasuredFigure::Chart(m) => self.chart.render(ctx, m),
            MeasuredFigure::Timeseries(m) => self.timeseries.render(ctx, m),
            MeasuredFigure::Table(m) => self.table.render(ctx, m),
            MeasuredFigure::Diagram(m) => self.diagram.render(ctx, m),
        }
    }

    pub fn measure_and_render(
        &self,
        ctx: &mut dyn RenderContext,
        bounds: Bounds,
        figure: &Figure,
        responsive_scale: Option<f32>,
    ) -> Result<MeasuredFigure, FiguraError> {
        let measured = self.measure(ctx, bounds, figure, responsive_scale)?;
        self.render(ctx, &measured);
        Ok(measured)
    }

    pub fn ideal_height(
        &self,
        ctx: &dyn RenderContext,
        width: f32,
        figure: &Figure,
        responsive_scale: Option<f32>,
    ) -> Result<IdealHeight, FiguraError> {
        match figure {
            Figure::Chart(input) => self.chart.ideal_height(ctx, width, input, responsive_scale),
            Figure::Timeseries(input) => {
                self.timeseries
                    .ideal_height(ctx, width, input, responsive_scale)
            }
            Figure::Table(input) => self.table.ideal_height(ctx, width, input, responsive_scale),
            Figure::Diagram(input) => self.diagram.ideal_height(ctx, width, input, responsive_scale),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> Figure {
        toml::from_str(src).unwrap()
    }

    #[test]
    fn test_dispatch_routes_by_kind() {
        let dispatch = FigureDispatch::default();
        let table = parse(
            r#"
            kind = "table"
            column_headers = ["x"]
            values = [[1]]
            "#,
        );
        assert_eq!(dispatch.renderer_for(&table), Some("table"));

        let diagram = parse(
            r#"
            kind = "diagram"
            [[nodes]]
            id = "a"
            "#,
        );
        assert_eq!(dispatch.renderer_for(&diagram), Some("diagram"));
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let result: Result<Figure, _> = toml::from_str(r#"kind = "pie""#);
        assert!(result.is_err());
    }

    #[test]
    fn test_base_fields_shared() {
        let figure = parse(
            r#"
            kind = "diagram"
            footnote = "*estimated*"
            autofit = { min_scale = 0.5, max_scale = 1.0 }
            "#,
        );
        let base = figure.base();
        assert_eq!(base.footnote.as_deref(), Some("*estimated*"));
        assert_eq!(base.autofit, Some(ScaleRange::new(0.5, 1.0)));
    }

    #[test]
    fn test_resolve_scale_prefers_explicit() {
        let base = FigureBase {
            autofit: Some(ScaleRange::new(0.5, 2.0)),
            ..FigureBase::default()
        };
        assert_eq!(resolve_scale(&base, Some(0.75), 100.0, 100.0, |_| Ok((0.0, 0.0))), 0.75);
        assert_eq!(resolve_scale(&base, None, 100.0, 100.0, |_| Ok((0.0, 0.0))), 2.0);
        let fixed = FigureBase::default();
        assert_eq!(resolve_scale(&fixed, None, 1.0, 1.0, |_| Ok((50.0, 50.0))), 1.0);
    }
}
