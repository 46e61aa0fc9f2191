//! Figura - A layout and rendering engine for data figures
//!
//! This library measures and renders charts, timeseries, tables and flow
//! diagrams described as TOML documents. Measurement produces a list of
//! immutable drawing primitives; rendering replays them through a
//! [`RenderContext`](figura_core::draw::RenderContext), such as the SVG
//! canvas in [`export::svg`].

pub mod autofit;
pub mod chart;
pub mod config;
pub mod diagram;
pub mod export;
pub mod figure;
pub mod format;
pub mod pipeline;
pub mod style;
pub mod surround;
pub mod table;
pub mod text;
pub mod timeseries;

mod error;

pub use figura_core::{color, draw, geometry};

pub use error::FiguraError;

use std::sync::Arc;

use log::{debug, info, trace};

use figura_core::{
    draw::RenderContext,
    geometry::{Bounds, Size},
};

use config::AppConfig;
use export::{
    svg::{SvgCanvas, SvgExporter},
    Exporter,
};
use figure::{Figure, FigureDispatch, MeasuredFigure};
use style::StyleResolver;

/// Builder for parsing and rendering Figura figures.
///
/// # Examples
///
/// ```rust,no_run
/// use figura::{FigureBuilder, config::AppConfig};
///
/// let source = r#"
/// kind = "table"
/// row_headers = ["A", "B"]
/// column_headers = ["2023", "2024"]
/// values = [[1, 2], [3, 4]]
/// "#;
///
/// let builder = FigureBuilder::new(AppConfig::default());
/// let figure = builder.parse(source).expect("Failed to parse");
/// let svg = builder.render_svg(&figure).expect("Failed to render");
/// ```
#[derive(Default)]
pub struct FigureBuilder {
    config: AppConfig,
    dispatch: FigureDispatch,
    /// Fixed per-character text advance; system fonts when unset.
    char_width: Option<f32>,
}

impl FigureBuilder {
    /// Create a new figure builder with the given configuration.
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Resolve figure styles with `resolver` instead of plain scaling.
    pub fn with_style_resolver(mut self, resolver: Arc<dyn StyleResolver>) -> Self {
        self.dispatch = FigureDispatch::new(resolver);
        self
    }

    /// Measure text with fixed per-character metrics instead of system
    /// fonts, for output that is identical on every machine.
    pub fn with_fixed_text_metrics(mut self, char_width: f32) -> Self {
        self.char_width = Some(char_width);
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    fn canvas(&self, size: Size) -> SvgCanvas {
        match self.char_width {
            Some(char_width) => SvgCanvas::with_fixed_metrics(size, char_width),
            None => SvgCanvas::new(size),
        }
    }

    /// Parse a TOML figure document and apply the configured style
    /// defaults.
    ///
    /// # Errors
    ///
    /// Returns [`FiguraError::Document`] with the offending span for
    /// malformed documents, and [`FiguraError::Config`] for invalid
    /// configured colors.
    pub fn parse(&self, source: &str) -> Result<Figure, FiguraError> {
        info!("Parsing figure document");
        let mut figure: Figure =
            toml::from_str(source).map_err(|err| FiguraError::new_document_error(&err, source))?;
        let defaults = self.config.style().defaults().map_err(FiguraError::Config)?;

        let base = figure.base_mut();
        let style = std::mem::take(&mut base.style);
        base.style = style.with_defaults(&defaults);

        debug!(kind = figure.kind(); "Figure parsed");
        trace!(figure:?; "Parsed figure");
        Ok(figure)
    }

    /// Page size for `figure`: the configured width, and the configured
    /// height or else the figure's ideal height at that width.
    fn page_size(&self, ctx: &dyn RenderContext, figure: &Figure) -> Result<Size, FiguraError> {
        let page = self.config.page();
        let height = match page.height() {
            Some(height) => height,
            None => {
                self.dispatch
                    .ideal_height(ctx, page.width(), figure, None)?
                    .ideal_h
            }
        };
        Ok(Size::new(page.width(), height))
    }

    /// Measure a figure against the configured page.
    ///
    /// # Errors
    ///
    /// Returns `FiguraError` when text cannot be measured or the figure's
    /// data is malformed.
    pub fn measure(&self, figure: &Figure) -> Result<MeasuredFigure, FiguraError> {
        let probe = self.canvas(Size::new(self.config.page().width(), 0.0));
        let size = self.page_size(&probe, figure)?;
        let canvas = self.canvas(size);
        self.dispatch
            .measure(&canvas, Bounds::from_size(size), figure, None)
    }

    /// Render a figure to an SVG string.
    ///
    /// # Errors
    ///
    /// Returns `FiguraError` for measurement errors.
    pub fn render_svg(&self, figure: &Figure) -> Result<String, FiguraError> {
        let probe = self.canvas(Size::new(self.config.page().width(), 0.0));
        let size = self.page_size(&probe, figure)?;
        let mut canvas = self.canvas(size);
        let measured = self
            .dispatch
            .measure_and_render(&mut canvas, Bounds::from_size(size), figure, None)?;
        info!(
            kind = figure.kind(),
            primitives = measured.primitives().len();
            "SVG rendered successfully"
        );
        Ok(canvas.into_document().to_string())
    }

    /// Measure a figure and write it as an SVG file.
    ///
    /// # Errors
    ///
    /// Returns `FiguraError` for measurement errors and
    /// [`FiguraError::Export`] when the file cannot be written.
    pub fn write_svg(&self, figure: &Figure, path: &str) -> Result<MeasuredFigure, FiguraError> {
        let measured = self.measure(figure)?;
        SvgExporter::new(path).export_figure(&measured)?;
        info!(path; "SVG written");
        Ok(measured)
    }
}
