//! Captions, legends and footnotes around a figure's plot area.

use log::trace;

use figura_core::{
    color::Color,
    draw::{
        LegendShape, MarkerShape, MeasuredRichText, PlacedText, Primitive, RenderContext,
        RichText, Shape, SurroundRole, SurroundShape, TextAlign,
    },
    geometry::{Bounds, Insets, Point, Size},
};

use crate::{
    error::FiguraError,
    figure::FigureBase,
    style::{FigureStyle, TextRole},
    text,
};

/// One legend item before layout.
#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub label: String,
    pub color: Color,
    pub marker: Option<MarkerShape>,
}

impl LegendEntry {
    pub fn new(label: impl Into<String>, color: Color) -> Self {
        Self {
            label: label.into(),
            color,
            marker: None,
        }
    }

    pub fn with_marker(mut self, marker: MarkerShape) -> Self {
        self.marker = Some(marker);
        self
    }
}

/// Result of laying out the surrounds of a figure.
#[derive(Debug, Clone)]
pub struct MeasuredSurrounds {
    /// Space left for the figure's content.
    pub plot: Bounds,
    pub primitives: Vec<Primitive>,
    /// Vertical space taken by padding, captions, legend and footnote.
    pub height: f32,
}

struct MeasuredLegendItem {
    entry: LegendEntry,
    label: MeasuredRichText,
    size: Size,
}

fn measure_role(
    ctx: &dyn RenderContext,
    source: Option<&str>,
    role: TextRole,
    style: &FigureStyle,
    width: f32,
) -> Result<Option<MeasuredRichText>, FiguraError> {
    let Some(source) = source.filter(|s| !s.trim().is_empty()) else {
        return Ok(None);
    };
    let rich = RichText::parse(source, style.text_style(role));
    text::measure(ctx, &rich, width).map(Some)
}

/// Applies the figure's legend label override, position by position.
fn legend_entries(base: &FigureBase, entries: &[LegendEntry]) -> Vec<LegendEntry> {
    let Some(labels) = &base.legend else {
        return entries.to_vec();
    };
    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| match labels.get(i) {
            Some(label) => LegendEntry {
                label: label.clone(),
                ..entry.clone()
            },
            None => entry.clone(),
        })
        .collect()
}

/// Lays out legend items left to right, wrapping onto new rows.
///
/// Returns the primitives and the height of the legend block.
fn layout_legend(
    ctx: &dyn RenderContext,
    items: &[LegendEntry],
    style: &FigureStyle,
    area: Bounds,
) -> Result<(Vec<Primitive>, f32), FiguraError> {
    let legend = &style.legend;
    let label_budget = (area.width() - legend.swatch - legend.swatch_gap).max(0.0);

    let mut measured = Vec::with_capacity(items.len());
    for entry in items {
        let rich = RichText::parse(&entry.label, style.text_style(TextRole::Label));
        let label = text::measure(ctx, &rich, label_budget)?;
        let size = Size::new(
            legend.swatch + legend.swatch_gap + label.width(),
            legend.swatch.max(label.height()),
        );
        measured.push(MeasuredLegendItem {
            entry: entry.clone(),
            label,
            size,
        });
    }

    // Greedy row filling
    let mut rows: Vec<Vec<MeasuredLegendItem>> = Vec::new();
    let mut row_width = 0.0;
    for item in measured {
        let needed = if row_width > 0.0 {
            row_width + legend.item_gap + item.size.width()
        } else {
            item.size.width()
        };
        match rows.last_mut() {
            Some(row) if row_width > 0.0 && needed <= area.width() => {
                row.push(item);
                row_width = needed;
            }
            _ => {
                row_width = item.size.width();
                rows.push(vec![item]);
            }
        }
    }

    let mut primitives = Vec::new();
    let mut y = area.min_y();
    for (r, row) in rows.into_iter().enumerate() {
        if r > 0 {
            y += legend.row_gap;
        }
        let row_height = row.iter().map(|i| i.size.height()).fold(0.0, f32::max);
        let mut x = area.min_x();
        for item in row {
            let swatch = Bounds::new_from_top_left(
                Point::new(x, y + (row_height - legend.swatch) / 2.0),
                Size::new(legend.swatch, legend.swatch),
            );
            let label_pos = Point::new(
                x + legend.swatch + legend.swatch_gap,
                y + (row_height - item.label.height()) / 2.0,
            );
            let key = format!("legend-{}", primitives.len());
            primitives.push(Primitive::new(
                key,
                Shape::Legend(LegendShape {
                    swatch,
                    color: item.entry.color,
                    marker: item.entry.marker,
                    label: PlacedText::new(item.label, label_pos, TextAlign::top_left()),
                }),
            ));
            x += item.size.width() + legend.item_gap;
        }
        y += row_height;
    }

    Ok((primitives, y - area.min_y()))
}

fn surround(role: SurroundRole, text: MeasuredRichText, at: Point) -> Primitive {
    let key = match role {
        SurroundRole::Caption => "caption",
        SurroundRole::SubCaption => "sub-caption",
        SurroundRole::Footnote => "footnote",
    };
    Primitive::new(
        key,
        Shape::Surround(SurroundShape {
            role,
            text: PlacedText::new(text, at, TextAlign::top_left()),
        }),
    )
}

/// Places caption, sub-caption and legend at the top of `bounds` and the
/// footnote at the bottom, inside the style's padding.
///
/// Legend labels come from `base.legend` when it is set, otherwise from the
/// entries themselves.
pub fn layout(
    ctx: &dyn RenderContext,
    bounds: Bounds,
    base: &FigureBase,
    legend: &[LegendEntry],
    style: &FigureStyle,
) -> Result<MeasuredSurrounds, FiguraError> {
    let content = bounds.inset(Insets::uniform(style.padding));
    let width = content.width();
    let gap = style.surround_gap;
    let mut primitives = Vec::new();
    let mut top = content.min_y();
    let mut bottom = content.max_y();

    for (source, role, text_role) in [
        (base.caption.as_deref(), SurroundRole::Caption, TextRole::Caption),
        (
            base.sub_caption.as_deref(),
            SurroundRole::SubCaption,
            TextRole::SubCaption,
        ),
    ] {
        if let Some(measured) = measure_role(ctx, source, text_role, style, width)? {
            let height = measured.height();
            primitives.push(surround(role, measured, Point::new(content.min_x(), top)));
            top += height + gap;
        }
    }

    let entries = legend_entries(base, legend);
    if !entries.is_empty() {
        let area = Bounds::from_corners(
            Point::new(content.min_x(), top),
            Point::new(content.max_x(), top.max(content.max_y())),
        );
        let (items, height) = layout_legend(ctx, &entries, style, area)?;
        primitives.extend(items);
        top += height + gap;
    }

    if let Some(measured) =
        measure_role(ctx, base.footnote.as_deref(), TextRole::Footnote, style, width)?
    {
        bottom -= measured.height();
        primitives.push(surround(
            SurroundRole::Footnote,
            measured,
            Point::new(content.min_x(), bottom),
        ));
        bottom -= gap;
    }

    let height = (top - content.min_y()) + (content.max_y() - bottom) + 2.0 * style.padding;
    let plot = Bounds::from_corners(
        Point::new(content.min_x(), top),
        Point::new(content.max_x(), bottom.max(top)),
    );
    trace!(height, plot:?; "Surrounds laid out");

    Ok(MeasuredSurrounds {
        plot,
        primitives,
        height,
    })
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;
    use figura_core::draw::RecordingContext;

    use super::*;

    fn style() -> FigureStyle {
        let mut style = FigureStyle::default();
        style.text = style.text.with_line_height(1.0);
        style
    }

    fn base() -> FigureBase {
        FigureBase {
            caption: Some("Revenue **by year**".into()),
            sub_caption: None,
            footnote: Some("Source: ledger".into()),
            ..FigureBase::default()
        }
    }

    #[test]
    fn test_caption_and_footnote_frame_plot() {
        let ctx = RecordingContext::new();
        let bounds = Bounds::from_size(Size::new(400.0, 300.0));
        let surrounds = layout(&ctx, bounds, &base(), &[], &style()).unwrap();

        // caption 16px + gap 6 at padding 8
        assert_approx_eq!(f32, surrounds.plot.min_y(), 30.0);
        // footnote 10px + gap 6 above bottom padding
        assert_approx_eq!(f32, surrounds.plot.max_y(), 276.0);
        assert_approx_eq!(f32, surrounds.height, 300.0 - surrounds.plot.height());
        assert_eq!(surrounds.primitives.len(), 2);
    }

    #[test]
    fn test_empty_surrounds_only_pad() {
        let ctx = RecordingContext::new();
        let bounds = Bounds::from_size(Size::new(200.0, 100.0));
        let surrounds = layout(&ctx, bounds, &FigureBase::default(), &[], &style()).unwrap();
        assert!(surrounds.primitives.is_empty());
        assert_approx_eq!(f32, surrounds.height, 16.0);
    }

    #[test]
    fn test_legend_wraps_rows() {
        let ctx = RecordingContext::new().with_char_width(0.5);
        let red = Color::new("red").unwrap();
        let entries: Vec<_> = ["alpha", "beta", "gamma"]
            .into_iter()
            .map(|l| LegendEntry::new(l, red))
            .collect();
        // Each item is 10 + 4 + 25 = 39px; two fit in 100px with a 16px gap
        let bounds = Bounds::from_size(Size::new(116.0, 200.0));
        let surrounds = layout(&ctx, bounds, &FigureBase::default(), &entries, &style()).unwrap();

        let swatches: Vec<_> = surrounds
            .primitives
            .iter()
            .filter_map(|p| match p.shape() {
                Shape::Legend(l) => Some(l.swatch),
                _ => None,
            })
            .collect();
        assert_eq!(swatches.len(), 3);
        assert_approx_eq!(f32, swatches[0].min_y(), swatches[1].min_y());
        assert!(swatches[2].min_y() > swatches[0].min_y());
        assert_approx_eq!(f32, swatches[2].min_x(), 8.0);
    }

    #[test]
    fn test_legend_override_labels() {
        let ctx = RecordingContext::new();
        let red = Color::new("red").unwrap();
        let base = FigureBase {
            legend: Some(vec!["Renamed".into()]),
            ..FigureBase::default()
        };
        let entries = [LegendEntry::new("a", red), LegendEntry::new("b", red)];
        let surrounds =
            layout(&ctx, Bounds::from_size(Size::new(400.0, 200.0)), &base, &entries, &style())
                .unwrap();
        let labels: Vec<_> = surrounds
            .primitives
            .iter()
            .filter_map(|p| match p.shape() {
                Shape::Legend(l) => Some(l.label.text.plain_text()),
                _ => None,
            })
            .collect();
        assert_eq!(labels, ["Renamed", "b"]);
    }
}
