//! Figure styles and style resolution.
//!
//! A [`FigureStyle`] is plain data deserialized with the figure. Before
//! measurement a [`StyleResolver`] turns it into the style actually used at
//! a given responsive scale; the default [`ScaledStyleResolver`] multiplies
//! every length by the scale. Nothing here is global: renderers receive the
//! resolver they should use.

use serde::Deserialize;

use figura_core::{
    color::Color,
    draw::{HAlign, RichTextStyle, StrokeDefinition},
};

use crate::format::NumberFormat;

const DEFAULT_PALETTE: [&str; 10] = [
    "#4e79a7", "#f28e2b", "#e15759", "#76b7b2", "#59a14f", "#edc948", "#b07aa1", "#ff9da7",
    "#9c755f", "#bab0ac",
];

fn default_palette() -> Vec<Color> {
    DEFAULT_PALETTE
        .iter()
        .filter_map(|hex| Color::new(hex).ok())
        .collect()
}

fn stroke(color: &str, width: f32) -> StrokeDefinition {
    StrokeDefinition::solid(Color::new(color).unwrap_or_default(), width)
}

/// Host-level values a figure inherits when it does not set them itself.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleDefaults {
    pub font_family: Option<String>,
    pub background: Option<Color>,
    pub palette: Vec<Color>,
}

/// The typographic role of a piece of figure text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextRole {
    Body,
    Caption,
    SubCaption,
    Footnote,
    Label,
}

/// How bars of several series share a category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stacking {
    /// Bars accumulate on top of the lower series.
    Stacked,
    /// Every bar starts at the baseline, drawn over each other.
    Imposed,
    /// The category band is split between bar series.
    #[default]
    Grouped,
}

/// What the lower edge of an area follows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AreaMirror {
    /// The value baseline.
    #[default]
    ZeroLine,
    /// The previous series' point, or the baseline where it has none.
    PreviousSeriesOrZero,
    /// The previous series' point; vertices without one are left out.
    PreviousSeriesOrSkip,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LegendStyle {
    pub swatch: f32,
    pub swatch_gap: f32,
    pub item_gap: f32,
    pub row_gap: f32,
}

impl Default for LegendStyle {
    fn default() -> Self {
        Self {
            swatch: 10.0,
            swatch_gap: 4.0,
            item_gap: 16.0,
            row_gap: 4.0,
        }
    }
}

impl LegendStyle {
    fn scaled(&self, factor: f32) -> Self {
        Self {
            swatch: self.swatch * factor,
            swatch_gap: self.swatch_gap * factor,
            item_gap: self.item_gap * factor,
            row_gap: self.row_gap * factor,
        }
    }
}

/// Chart and timeseries geometry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ChartStyle {
    pub stacking: Stacking,
    pub max_bar_width: f32,
    /// Share of each category band left empty around the bars.
    pub bar_gap: f32,
    pub line_width: f32,
    pub point_radius: f32,
    pub area_opacity: f32,
    pub area_mirror: AreaMirror,
    pub data_labels: bool,
    pub label_gap: f32,
    pub label_format: NumberFormat,
    pub tick_count: usize,
    pub tick_length: f32,
    pub axis_label_gap: f32,
    pub pane_gap: f32,
    pub tier_gap: f32,
    pub lane_gap: f32,
    pub min_band_width: f32,
    /// Longest rotated category label before it wraps.
    pub category_label_max: f32,
    pub min_plot_height: f32,
    pub ideal_plot_height: f32,
    pub max_plot_height: f32,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            stacking: Stacking::default(),
            max_bar_width: 40.0,
            bar_gap: 0.2,
            line_width: 2.0,
            point_radius: 3.0,
            area_opacity: 0.35,
            area_mirror: AreaMirror::default(),
            data_labels: true,
            label_gap: 3.0,
            label_format: NumberFormat::default(),
            tick_count: 5,
            tick_length: 4.0,
            axis_label_gap: 4.0,
            pane_gap: 16.0,
            tier_gap: 12.0,
            lane_gap: 8.0,
            min_band_width: 12.0,
            category_label_max: 80.0,
            min_plot_height: 80.0,
            ideal_plot_height: 240.0,
            max_plot_height: 480.0,
        }
    }
}

impl ChartStyle {
    fn scaled(&self, factor: f32) -> Self {
        Self {
            max_bar_width: self.max_bar_width * factor,
            line_width: self.line_width * factor,
            point_radius: self.point_radius * factor,
            label_gap: self.label_gap * factor,
            tick_length: self.tick_length * factor,
            axis_label_gap: self.axis_label_gap * factor,
            pane_gap: self.pane_gap * factor,
            tier_gap: self.tier_gap * factor,
            lane_gap: self.lane_gap * factor,
            min_band_width: self.min_band_width * factor,
            category_label_max: self.category_label_max * factor,
            min_plot_height: self.min_plot_height * factor,
            ideal_plot_height: self.ideal_plot_height * factor,
            max_plot_height: self.max_plot_height * factor,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TableStyle {
    pub cell_padding_x: f32,
    pub cell_padding_y: f32,
    pub header_fill: Option<Color>,
    pub header_bold: bool,
    pub row_group_indent: f32,
    /// Extra height a data row may absorb before the table stops growing.
    pub max_row_slack: f32,
    pub number_format: NumberFormat,
    pub number_align: HAlign,
}

impl Default for TableStyle {
    fn default() -> Self {
        Self {
            cell_padding_x: 6.0,
            cell_padding_y: 4.0,
            header_fill: Color::new("#f3f4f6").ok(),
            header_bold: true,
            row_group_indent: 12.0,
            max_row_slack: 12.0,
            number_format: NumberFormat::default(),
            number_align: HAlign::Right,
        }
    }
}

impl TableStyle {
    fn scaled(&self, factor: f32) -> Self {
        Self {
            cell_padding_x: self.cell_padding_x * factor,
            cell_padding_y: self.cell_padding_y * factor,
            row_group_indent: self.row_group_indent * factor,
            max_row_slack: self.max_row_slack * factor,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DiagramStyle {
    pub node_width: f32,
    pub node_gap: f32,
    pub label_gap: f32,
    pub link_opacity: f32,
    pub min_node_height: f32,
    pub min_column_gap: f32,
    pub ideal_height: f32,
    pub max_height: f32,
}

impl Default for DiagramStyle {
    fn default() -> Self {
        Self {
            node_width: 12.0,
            node_gap: 10.0,
            label_gap: 6.0,
            link_opacity: 0.4,
            min_node_height: 4.0,
            min_column_gap: 40.0,
            ideal_height: 300.0,
            max_height: 600.0,
        }
    }
}

impl DiagramStyle {
    fn scaled(&self, factor: f32) -> Self {
        Self {
            node_width: self.node_width * factor,
            node_gap: self.node_gap * factor,
            label_gap: self.label_gap * factor,
            min_node_height: self.min_node_height * factor,
            min_column_gap: self.min_column_gap * factor,
            ideal_height: self.ideal_height * factor,
            max_height: self.max_height * factor,
            ..self.clone()
        }
    }
}

/// Complete visual style of a figure.
///
/// Every field has a default, so a figure document only states what it
/// changes:
///
/// ```
/// # use figura::style::FigureStyle;
/// let style: FigureStyle = toml::from_str(r#"
///     caption_size = 20
///     [chart]
///     stacking = "stacked"
/// "#).unwrap();
/// assert_eq!(style.caption_size, 20.0);
/// assert_eq!(style.padding, 8.0);
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FigureStyle {
    /// Overrides the font family of every text role.
    pub font_family: Option<String>,
    pub text: RichTextStyle,
    pub caption_size: f32,
    pub sub_caption_size: f32,
    pub footnote_size: f32,
    pub label_size: f32,
    pub background: Option<Color>,
    pub padding: f32,
    pub surround_gap: f32,
    pub palette: Vec<Color>,
    pub grid: StrokeDefinition,
    pub axis: StrokeDefinition,
    pub legend: LegendStyle,
    pub chart: ChartStyle,
    pub table: TableStyle,
    pub diagram: DiagramStyle,
}

impl Default for FigureStyle {
    fn default() -> Self {
        Self {
            font_family: None,
            text: RichTextStyle::default(),
            caption_size: 16.0,
            sub_caption_size: 13.0,
            footnote_size: 10.0,
            label_size: 10.0,
            background: None,
            padding: 8.0,
            surround_gap: 6.0,
            palette: Vec::new(),
            grid: stroke("#e0e0e0", 1.0),
            axis: stroke("#666666", 1.0),
            legend: LegendStyle::default(),
            chart: ChartStyle::default(),
            table: TableStyle::default(),
            diagram: DiagramStyle::default(),
        }
    }
}

impl FigureStyle {
    /// Fills in what the figure left unset from host defaults.
    pub fn with_defaults(mut self, defaults: &StyleDefaults) -> Self {
        if self.font_family.is_none() {
            self.font_family = defaults.font_family.clone();
        }
        if self.background.is_none() {
            self.background = defaults.background;
        }
        if self.palette.is_empty() {
            self.palette = defaults.palette.clone();
        }
        self
    }

    /// Text style for a role.
    pub fn text_style(&self, role: TextRole) -> RichTextStyle {
        let size = match role {
            TextRole::Body => self.text.font_size(),
            TextRole::Caption => self.caption_size,
            TextRole::SubCaption => self.sub_caption_size,
            TextRole::Footnote => self.footnote_size,
            TextRole::Label => self.label_size,
        };
        let style = self.text.clone().with_font_size(size);
        match &self.font_family {
            Some(family) => style.with_font_family(family.clone()),
            None => style,
        }
    }

    /// The `index`-th palette color, cycling.
    pub fn color(&self, index: usize) -> Color {
        if self.palette.is_empty() {
            let palette = default_palette();
            palette
                .get(index % palette.len().max(1))
                .copied()
                .unwrap_or_default()
        } else {
            self.palette[index % self.palette.len()]
        }
    }

    /// Returns a copy with every length multiplied by `factor`.
    pub fn scaled(&self, factor: f32) -> Self {
        Self {
            text: self.text.scaled(factor),
            caption_size: self.caption_size * factor,
            sub_caption_size: self.sub_caption_size * factor,
            footnote_size: self.footnote_size * factor,
            label_size: self.label_size * factor,
            padding: self.padding * factor,
            surround_gap: self.surround_gap * factor,
            grid: self.grid.scaled(factor),
            axis: self.axis.scaled(factor),
            legend: self.legend.scaled(factor),
            chart: self.chart.scaled(factor),
            table: self.table.scaled(factor),
            diagram: self.diagram.scaled(factor),
            ..self.clone()
        }
    }
}

/// Produces the style a figure is measured with.
pub trait StyleResolver {
    fn resolve(&self, style: &FigureStyle, responsive_scale: f32) -> FigureStyle;
}

/// Multiplies every length of the figure style by the responsive scale.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScaledStyleResolver;

impl StyleResolver for ScaledStyleResolver {
    fn resolve(&self, style: &FigureStyle, responsive_scale: f32) -> FigureStyle {
        style.scaled(responsive_scale)
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;

    #[test]
    fn test_scaled_resolver_multiplies_lengths() {
        let style = FigureStyle::default();
        let resolved = ScaledStyleResolver.resolve(&style, 2.0);
        assert_approx_eq!(f32, resolved.caption_size, 32.0);
        assert_approx_eq!(f32, resolved.padding, 16.0);
        assert_approx_eq!(f32, resolved.chart.max_bar_width, 80.0);
        assert_approx_eq!(f32, resolved.table.cell_padding_x, 12.0);
        assert_approx_eq!(f32, resolved.grid.width(), 2.0);
        // ratios stay untouched
        assert_approx_eq!(f32, resolved.chart.bar_gap, 0.2);
        assert_approx_eq!(f32, resolved.text.line_height(), style.text.line_height());
    }

    #[test]
    fn test_text_style_roles() {
        let mut style = FigureStyle::default();
        style.font_family = Some("Inter".into());
        let caption = style.text_style(TextRole::Caption);
        assert_eq!(caption.font_family(), "Inter");
        assert_approx_eq!(f32, caption.font_size(), 16.0);
        assert_approx_eq!(f32, style.text_style(TextRole::Footnote).font_size(), 10.0);
    }

    #[test]
    fn test_palette_cycles() {
        let style = FigureStyle::default();
        assert_eq!(style.color(0), style.color(DEFAULT_PALETTE.len()));
        assert_ne!(style.color(0), style.color(1));

        let custom = FigureStyle {
            palette: vec![Color::new("red").unwrap()],
            ..FigureStyle::default()
        };
        assert_eq!(custom.color(5), Color::new("red").unwrap());
    }

    #[test]
    fn test_defaults_only_fill_unset_values() {
        let defaults = StyleDefaults {
            font_family: Some("Inter".into()),
            background: Color::new("white").ok(),
            palette: vec![Color::new("red").unwrap()],
        };
        let own = FigureStyle {
            font_family: Some("Mono".into()),
            ..FigureStyle::default()
        };
        let merged = own.with_defaults(&defaults);
        assert_eq!(merged.font_family.as_deref(), Some("Mono"));
        assert_eq!(merged.background, defaults.background);
        assert_eq!(merged.palette.len(), 1);
    }

    #[test]
    fn test_enums_from_toml() {
        let chart: ChartStyle = toml::from_str(
            r#"
            stacking = "imposed"
            area_mirror = "previous-series-or-skip"
            "#,
        )
        .unwrap();
        assert_eq!(chart.stacking, Stacking::Imposed);
        assert_eq!(chart.area_mirror, AreaMirror::PreviousSeriesOrSkip);
    }
}
