//! Tables: a header block over data rows, with optional row headers and
//! one level of row and column grouping.
//!
//! Layout follows a fixed cascade. Row headers are measured first and fix
//! the width of the row header column; the remaining width is split evenly
//! between the value columns. Every cell is then measured against its
//! column to find the row heights, and any height left over is spread
//! evenly over all rows.

use std::sync::Arc;

use log::{debug, trace};
use serde::Deserialize;

use figura_core::{
    draw::{
        GridLineShape, HAlign, MeasuredRichText, Orientation, PlacedText, PlotIndex, Primitive,
        RenderContext, RichText, RichTextStyle, Shape, StyledSegment, TableCellShape, TextAlign,
        VAlign,
    },
    geometry::{Bounds, Point, Size},
};

use crate::{
    autofit::IdealHeight,
    error::FiguraError,
    figure::{self, Figure, FigureBase, FigureRenderer},
    format::ValueFormatter,
    pipeline,
    style::{FigureStyle, ScaledStyleResolver, StyleResolver, TableStyle, TextRole},
    surround::{self, MeasuredSurrounds},
    text,
};

/// A label spanning `size` consecutive rows or columns.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HeaderGroup {
    #[serde(default)]
    pub label: String,
    pub size: usize,
}

impl HeaderGroup {
    pub fn new(label: impl Into<String>, size: usize) -> Self {
        Self {
            label: label.into(),
            size,
        }
    }
}

/// A table cell: numbers go through the value formatter, text is markup.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Input of a table figure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TableInput {
    #[serde(flatten)]
    pub base: FigureBase,
    #[serde(default)]
    pub row_headers: Vec<String>,
    #[serde(default)]
    pub row_groups: Vec<HeaderGroup>,
    #[serde(default)]
    pub column_headers: Vec<String>,
    #[serde(default)]
    pub column_groups: Vec<HeaderGroup>,
    /// Row-major cell values.
    #[serde(default)]
    pub values: Vec<Vec<CellValue>>,
}

impl TableInput {
    /// Row and column counts, after checking that headers, groups and
    /// values agree.
    ///
    /// # Errors
    ///
    /// Returns [`FiguraError::TableShape`] describing the first mismatch.
    pub fn dimensions(&self) -> Result<(usize, usize), FiguraError> {
        let rows = self.values.len();
        let columns = if self.column_headers.is_empty() {
            self.values.first().map(Vec::len).unwrap_or(0)
        } else {
            self.column_headers.len()
        };

        if !self.row_headers.is_empty() && self.row_headers.len() != rows {
            return Err(FiguraError::TableShape(format!(
                "{} row headers for {rows} rows of values",
                self.row_headers.len()
            )));
        }
        if let Some((i, row)) = self
            .values
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != columns)
        {
            return Err(FiguraError::TableShape(format!(
                "row {i} has {} values, expected {columns}",
                row.len()
            )));
        }
        for (groups, count, what) in [
            (&self.row_groups, rows, "row"),
            (&self.column_groups, columns, "column"),
        ] {
            let covered: usize = groups.iter().map(|g| g.size).sum();
            if !groups.is_empty() && covered != count {
                return Err(FiguraError::TableShape(format!(
                    "{what} groups cover {covered} {what}s, the table has {count}"
                )));
            }
        }
        Ok((rows, columns))
    }
}

/// A body row: either a row group label or a data row.
#[derive(Debug, Clone)]
enum BodyRow {
    Group {
        group: usize,
        label: MeasuredRichText,
    },
    Data {
        row: usize,
        header: Option<MeasuredRichText>,
        cells: Vec<(MeasuredRichText, HAlign)>,
    },
}

impl BodyRow {
    fn content_height(&self) -> f32 {
        match self {
            Self::Group { label, .. } => label.height(),
            Self::Data { header, cells, .. } => cells
                .iter()
                .map(|(text, _)| text.height())
                .chain(header.iter().map(MeasuredRichText::height))
                .fold(0.0, f32::max),
        }
    }
}

/// Measured text of the table before any vertical placement.
#[derive(Debug, Clone)]
struct TableGrid {
    /// Width of the row header column, zero without one.
    header_column: f32,
    column_width: f32,
    columns: usize,
    /// Column group labels with their first column and span.
    column_groups: Vec<(usize, usize, MeasuredRichText)>,
    column_headers: Vec<MeasuredRichText>,
    body: Vec<BodyRow>,
    row_indent: f32,
}

impl TableGrid {
    fn padded(&self, content: f32, style: &TableStyle) -> f32 {
        content + 2.0 * style.cell_padding_y
    }

    /// Heights of the header rows, top first.
    fn header_rows(&self, style: &TableStyle) -> Vec<f32> {
        let mut rows = Vec::new();
        if !self.column_groups.is_empty() {
            let tallest = self
                .column_groups
                .iter()
                .map(|(_, _, t)| t.height())
                .fold(0.0, f32::max);
            rows.push(self.padded(tallest, style));
        }
        if !self.column_headers.is_empty() {
            let tallest = self
                .column_headers
                .iter()
                .map(MeasuredRichText::height)
                .fold(0.0, f32::max);
            rows.push(self.padded(tallest, style));
        }
        rows
    }

    fn body_rows(&self, style: &TableStyle) -> Vec<f32> {
        self.body
            .iter()
            .map(|row| self.padded(row.content_height(), style))
            .collect()
    }

    /// Horizontal grid lines: one under the header block, then one above
    /// every body row except the first and rows directly under a group
    /// label.
    fn horizontal_lines(&self, has_header: bool) -> usize {
        let mut lines = usize::from(has_header);
        for (i, row) in self.body.iter().enumerate().skip(1) {
            let after_group = matches!(self.body[i - 1], BodyRow::Group { .. });
            if matches!(row, BodyRow::Group { .. }) || !after_group {
                lines += 1;
            }
        }
        lines
    }

    fn data_rows(&self) -> usize {
        self.body
            .iter()
            .filter(|r| matches!(r, BodyRow::Data { .. }))
            .count()
    }
}

fn header_text(source: &str, style: RichTextStyle, bold: bool) -> RichText {
    let parsed = RichText::parse(source, style);
    if !bold {
        return parsed;
    }
    let segments = parsed
        .segments()
        .iter()
        .map(|s| StyledSegment::new(s.text.clone(), true, s.italic))
        .collect();
    RichText::new(segments, parsed.style().clone())
}

fn measure_grid(
    ctx: &dyn RenderContext,
    width: f32,
    input: &TableInput,
    style: &FigureStyle,
    formatter: &dyn ValueFormatter,
) -> Result<TableGrid, FiguraError> {
    let (_, columns) = input.dimensions()?;
    let table = &style.table;
    let body_style = style.text_style(TextRole::Body);
    let stroke = style.grid.width();
    let pad_x = table.cell_padding_x;
    let half = width / 2.0;

    // Row headers and group labels against half the width.
    let row_indent = if input.row_groups.is_empty() {
        0.0
    } else {
        table.row_group_indent
    };
    let row_headers = input
        .row_headers
        .iter()
        .map(|h| {
            text::measure(
                ctx,
                &RichText::parse(h, body_style.clone()),
                (half - row_indent - 2.0 * pad_x).max(0.0),
            )
        })
        .collect::<Result<Vec<_>, _>>()?;
    let row_groups = input
        .row_groups
        .iter()
        .map(|g| {
            text::measure(
                ctx,
                &header_text(&g.label, body_style.clone(), table.header_bold),
                (half - 2.0 * pad_x).max(0.0),
            )
        })
        .collect::<Result<Vec<_>, _>>()?;

    let header_column = if row_headers.is_empty() {
        0.0
    } else {
        let widest = row_headers
            .iter()
            .map(|m| m.width() + row_indent)
            .chain(row_groups.iter().map(MeasuredRichText::width))
            .fold(0.0, f32::max);
        widest + 2.0 * pad_x
    };

    let column_width = if columns == 0 {
        0.0
    } else {
        (width - header_column).max(0.0) / columns as f32
    };
    let inner = (column_width - stroke - 2.0 * pad_x).max(0.0);

    let column_headers = input
        .column_headers
        .iter()
        .map(|h| {
            text::measure(
                ctx,
                &header_text(h, body_style.clone(), table.header_bold),
                inner,
            )
        })
        .collect::<Result<Vec<_>, _>>()?;
    let mut column_groups = Vec::new();
    let mut first = 0;
    for group in &input.column_groups {
        let span = ((group.size as f32 * column_width - stroke).min(half) - 2.0 * pad_x).max(0.0);
        let label = text::measure(
            ctx,
            &header_text(&group.label, body_style.clone(), table.header_bold),
            span,
        )?;
        column_groups.push((first, group.size, label));
        first += group.size;
    }

    let mut body = Vec::new();
    let mut group_ends = input.row_groups.iter().scan(0, |end, g| {
        let start = *end;
        *end += g.size;
        Some(start)
    });
    let mut next_group = group_ends.next();
    let mut group_index = 0;
    let mut row_headers = row_headers.into_iter();
    for (row, values) in input.values.iter().enumerate() {
        // A group label row precedes the first row of every group.
        while next_group == Some(row) {
            body.push(BodyRow::Group {
                group: group_index,
                label: row_groups[group_index].clone(),
            });
            group_index += 1;
            next_group = group_ends.next();
        }
        let cells = values
            .iter()
            .map(|value| {
                let (source, align) = match value {
                    CellValue::Number(n) => (formatter.format(*n), table.number_align),
                    CellValue::Text(t) => (t.clone(), HAlign::Left),
                };
                let measured = text::measure(ctx, &RichText::parse(&source, body_style.clone()), inner)?;
                Ok((measured, align))
            })
            .collect::<Result<Vec<_>, FiguraError>>()?;
        body.push(BodyRow::Data {
            row,
            header: row_headers.next(),
            cells,
        });
    }

    Ok(TableGrid {
        header_column,
        column_width,
        columns,
        column_groups,
        column_headers,
        body,
        row_indent,
    })
}

/// Height the table content needs at its natural row heights.
fn required_height(grid: &TableGrid, style: &FigureStyle) -> f32 {
    let headers = grid.header_rows(&style.table);
    let lines = grid.horizontal_lines(!headers.is_empty()) as f32 * style.grid.width();
    headers.iter().sum::<f32>() + grid.body_rows(&style.table).iter().sum::<f32>() + lines
}

/// A measured table.
#[derive(Debug, Clone)]
pub struct MeasuredTable {
    pub bounds: Bounds,
    pub style: FigureStyle,
    pub scale: f32,
    pub surrounds: MeasuredSurrounds,
    pub rows: usize,
    pub columns: usize,
    /// Row heights actually used, header rows first.
    pub row_heights: Vec<f32>,
    pub primitives: Vec<Primitive>,
}

/// Draws the table cells and grid into primitives.
struct TableWriter<'a> {
    grid: &'a TableGrid,
    style: &'a FigureStyle,
    left: f32,
    primitives: Vec<Primitive>,
}

impl TableWriter<'_> {
    fn column_left(&self, column: usize) -> f32 {
        self.left + self.grid.header_column + column as f32 * self.grid.column_width
    }

    fn cell(
        &mut self,
        key: String,
        bounds: Bounds,
        text: Option<MeasuredRichText>,
        align: HAlign,
        indent: f32,
        (row, column, header): (usize, usize, bool),
    ) {
        let table = &self.style.table;
        let fill = if header { table.header_fill } else { None };
        let text = text.filter(|t| !t.is_empty()).map(|text| {
            let left = bounds.min_x() + table.cell_padding_x + indent;
            let available = (bounds.max_x() - table.cell_padding_x - left).max(0.0);
            let position = Point::new(
                left + align.offset(available, 0.0),
                bounds.min_y() + bounds.height() / 2.0,
            );
            PlacedText::new(text, position, TextAlign::new(align, VAlign::Middle))
        });
        self.primitives.push(Primitive::new(
            key,
            Shape::TableCell(TableCellShape {
                bounds,
                fill,
                text,
                row,
                column,
                header,
            }),
        ));
    }

    fn line(&mut self, key: String, from: Point, to: Point, orientation: Orientation) {
        self.primitives.push(Primitive::new(
            key,
            Shape::GridLine(GridLineShape {
                from,
                to,
                orientation,
                stroke: self.style.grid.clone(),
                index: PlotIndex::default(),
            }),
        ));
    }

    /// A cell spanning `span` value columns from `first`, leaving room for
    /// the grid line on its left.
    fn column_bounds(&self, first: usize, span: usize, top: f32, height: f32) -> Bounds {
        let stroke = self.style.grid.width();
        let left = self.column_left(first) + stroke;
        Bounds::new_from_top_left(
            Point::new(left, top),
            Size::new((span as f32 * self.grid.column_width - stroke).max(0.0), height),
        )
    }
}

fn write_table(
    grid: &TableGrid,
    style: &FigureStyle,
    content: Bounds,
    header_heights: &[f32],
    body_heights: &[f32],
) -> Vec<Primitive> {
    let stroke = style.grid.width();
    let table_right = content.min_x() + grid.header_column + grid.columns as f32 * grid.column_width;
    let mut writer = TableWriter {
        grid,
        style,
        left: content.min_x(),
        primitives: Vec::new(),
    };
    let mut y = content.min_y();
    let mut header_row = 0;

    if !grid.column_groups.is_empty() {
        let height = header_heights[header_row];
        for (g, (first, span, label)) in grid.column_groups.iter().enumerate() {
            let bounds = writer.column_bounds(*first, *span, y, height);
            writer.cell(
                format!("column-group-{g}"),
                bounds,
                Some(label.clone()),
                HAlign::Center,
                0.0,
                (header_row, *first, true),
            );
        }
        y += height;
        header_row += 1;
    }
    if !grid.column_headers.is_empty() {
        let height = header_heights[header_row];
        for (c, label) in grid.column_headers.iter().enumerate() {
            let bounds = writer.column_bounds(c, 1, y, height);
            writer.cell(
                format!("column-header-{c}"),
                bounds,
                Some(label.clone()),
                HAlign::Center,
                0.0,
                (header_row, c, true),
            );
        }
        y += height;
    }
    let body_top = y;

    let has_header = !header_heights.is_empty();
    let mut line = 0;
    if has_header {
        writer.line(
            format!("grid-h-{line}"),
            Point::new(content.min_x(), y + stroke / 2.0),
            Point::new(table_right, y + stroke / 2.0),
            Orientation::Horizontal,
        );
        y += stroke;
        line += 1;
    }

    for (i, (row, height)) in grid.body.iter().zip(body_heights).enumerate() {
        let after_group = i > 0 && matches!(grid.body[i - 1], BodyRow::Group { .. });
        if i > 0 && (matches!(row, BodyRow::Group { .. }) || !after_group) {
            writer.line(
                format!("grid-h-{line}"),
                Point::new(content.min_x(), y + stroke / 2.0),
                Point::new(table_right, y + stroke / 2.0),
                Orientation::Horizontal,
            );
            y += stroke;
            line += 1;
        }
        match row {
            BodyRow::Group { group, label } => {
                let bounds = Bounds::new_from_top_left(
                    Point::new(content.min_x(), y),
                    Size::new(table_right - content.min_x(), *height),
                );
                writer.cell(
                    format!("row-group-{group}"),
                    bounds,
                    Some(label.clone()),
                    HAlign::Left,
                    0.0,
                    (*group, 0, true),
                );
            }
            BodyRow::Data { row, header, cells } => {
                if grid.header_column > 0.0 {
                    let bounds = Bounds::new_from_top_left(
                        Point::new(content.min_x(), y),
                        Size::new(grid.header_column, *height),
                    );
                    writer.cell(
                        format!("row-header-{row}"),
                        bounds,
                        header.clone(),
                        HAlign::Left,
                        grid.row_indent,
                        (*row, 0, false),
                    );
                }
                for (c, (text, align)) in cells.iter().enumerate() {
                    let bounds = writer.column_bounds(c, 1, y, *height);
                    writer.cell(
                        format!("cell-{row}-{c}"),
                        bounds,
                        Some(text.clone()),
                        *align,
                        0.0,
                        (*row, c, false),
                    );
                }
            }
        }
        y += height;
    }

    // One vertical line left of every value column.
    for c in 0..grid.columns {
        let x = writer.column_left(c) + stroke / 2.0;
        let top = if c == 0 || grid.column_groups.is_empty() {
            content.min_y()
        } else {
            // Lines inside a column group start below the group label.
            let inside = grid
                .column_groups
                .iter()
                .any(|(first, span, _)| c > *first && c < first + span);
            if inside {
                content.min_y() + header_heights[0]
            } else {
                content.min_y()
            }
        };
        writer.line(
            format!("grid-v-{c}"),
            Point::new(x, top),
            Point::new(x, y),
            Orientation::Vertical,
        );
    }
    trace!(body_top, bottom = y, lines = line; "Table grid written");

    writer.primitives
}

/// Renders tables.
pub struct TableRenderer {
    resolver: Arc<dyn StyleResolver>,
    formatter: Option<Arc<dyn ValueFormatter>>,
}

impl Default for TableRenderer {
    fn default() -> Self {
        Self::new(Arc::new(ScaledStyleResolver))
    }
}

impl TableRenderer {
    pub fn new(resolver: Arc<dyn StyleResolver>) -> Self {
        Self {
            resolver,
            formatter: None,
        }
    }

    /// Formats numeric cells with `formatter` instead of the style's
    /// number format.
    pub fn with_formatter(mut self, formatter: Arc<dyn ValueFormatter>) -> Self {
        self.formatter = Some(formatter);
        self
    }

    fn grid(
        &self,
        ctx: &dyn RenderContext,
        width: f32,
        input: &TableInput,
        style: &FigureStyle,
    ) -> Result<TableGrid, FiguraError> {
        match &self.formatter {
            Some(formatter) => measure_grid(ctx, width, input, style, formatter.as_ref()),
            None => measure_grid(ctx, width, input, style, &style.table.number_format),
        }
    }

    fn estimate(
        &self,
        ctx: &dyn RenderContext,
        width: f32,
        input: &TableInput,
        scale: f32,
    ) -> Result<IdealHeight, FiguraError> {
        let style = figure::resolve_style(self.resolver.as_ref(), &input.base, scale);
        let probe = Bounds::from_size(Size::new(width, f32::MAX / 4.0));
        let surrounds = surround::layout(ctx, probe, &input.base, &[], &style)?;
        let grid = self.grid(ctx, surrounds.plot.width(), input, &style)?;

        let headers: f32 = grid.header_rows(&style.table).iter().sum();
        let ideal = surrounds.height + required_height(&grid, &style);
        let max = ideal + style.table.max_row_slack * grid.data_rows() as f32;
        let min_width = 2.0 * style.padding
            + grid.header_column
            + grid.columns as f32 * (style.grid.width() + 2.0 * style.table.cell_padding_x);
        Ok(IdealHeight::new(
            surrounds.height + headers,
            ideal,
            max,
            width,
            min_width,
        ))
    }

    fn scale_for(
        &self,
        ctx: &dyn RenderContext,
        width: f32,
        height: f32,
        input: &TableInput,
        responsive_scale: Option<f32>,
    ) -> f32 {
        figure::resolve_scale(&input.base, responsive_scale, width, height, |s| {
            let ideal = self.estimate(ctx, width, input, s)?;
            Ok((width / ideal.needed_scaling_to_fit_width, ideal.ideal_h))
        })
    }
}

impl FigureRenderer for TableRenderer {
    type Input = TableInput;
    type Measured = MeasuredTable;

    fn is_type(&self, figure: &Figure) -> bool {
        matches!(figure, Figure::Table(_))
    }

    fn measure(
        &self,
        ctx: &dyn RenderContext,
        bounds: Bounds,
        input: &TableInput,
        responsive_scale: Option<f32>,
    ) -> Result<MeasuredTable, FiguraError> {
        let (rows, columns) = input.dimensions()?;
        let scale = self.scale_for(ctx, bounds.width(), bounds.height(), input, responsive_scale);
        let style = figure::resolve_style(self.resolver.as_ref(), &input.base, scale);
        let surrounds = surround::layout(ctx, bounds, &input.base, &[], &style)?;
        let content = surrounds.plot;
        let grid = self.grid(ctx, content.width(), input, &style)?;

        let mut header_heights = grid.header_rows(&style.table);
        let mut body_heights = grid.body_rows(&style.table);
        let required = required_height(&grid, &style);
        let row_count = header_heights.len() + body_heights.len();
        let slack = content.height() - required;
        if slack.is_finite() && slack > 0.0 && row_count > 0 {
            let extra = slack / row_count as f32;
            for height in header_heights.iter_mut().chain(body_heights.iter_mut()) {
                *height += extra;
            }
        }
        debug!(rows, columns, required, slack = slack.max(0.0), scale; "Table measured");

        let mut primitives: Vec<Primitive> = figure::background(bounds, &style).into_iter().collect();
        primitives.extend(surrounds.primitives.iter().cloned());
        primitives.extend(write_table(&grid, &style, content, &header_heights, &body_heights));

        let mut row_heights = header_heights;
        row_heights.extend(body_heights);
        Ok(MeasuredTable {
            bounds,
            style,
            scale,
            surrounds,
            rows,
            columns,
            row_heights,
            primitives,
        })
    }

    fn render(&self, ctx: &mut dyn RenderContext, measured: &MeasuredTable) {
        pipeline::render_primitives(ctx, &measured.primitives);
    }

    fn ideal_height(
        &self,
        ctx: &dyn RenderContext,
        width: f32,
        input: &TableInput,
        responsive_scale: Option<f32>,
    ) -> Result<IdealHeight, FiguraError> {
        let scale = self.scale_for(ctx, width, f32::INFINITY, input, responsive_scale);
        self.estimate(ctx, width, input, scale)
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;
    use figura_core::draw::RecordingContext;

    use super::*;

    fn sales() -> TableInput {
        toml::from_str(
            r#"
            caption = "Sales"
            row_headers = ["A", "B"]
            column_headers = ["2023", "2024", "2025"]
            values = [[1, 2, 3], [4, 5, 6]]
            "#,
        )
        .unwrap()
    }

    fn horizontal_lines(primitives: &[Primitive]) -> usize {
        primitives
            .iter()
            .filter(|p| {
                matches!(
                    p.shape(),
                    Shape::GridLine(GridLineShape {
                        orientation: Orientation::Horizontal,
                        ..
                    })
                )
            })
            .count()
    }

    #[test]
    fn test_dimensions_checked() {
        assert_eq!(sales().dimensions().unwrap(), (2, 3));

        let mut input = sales();
        input.row_headers.push("C".to_string());
        assert!(matches!(input.dimensions(), Err(FiguraError::TableShape(_))));

        let mut input = sales();
        input.values[1].pop();
        assert!(matches!(input.dimensions(), Err(FiguraError::TableShape(_))));

        let mut input = sales();
        input.column_groups = vec![HeaderGroup::new("Recent", 2)];
        assert!(matches!(input.dimensions(), Err(FiguraError::TableShape(_))));
    }

    #[test]
    fn test_ideal_height_and_grid_lines() {
        let ctx = RecordingContext::new();
        let renderer = TableRenderer::default();
        let ideal = renderer.ideal_height(&ctx, 400.0, &sales(), None).unwrap();
        assert!(ideal.min_h < ideal.ideal_h);
        assert!(ideal.ideal_h < ideal.max_h);

        let measured = renderer
            .measure(&ctx, Bounds::from_size(Size::new(400.0, ideal.ideal_h)), &sales(), None)
            .unwrap();
        assert_eq!(horizontal_lines(&measured.primitives), 2);
        let vertical = measured
            .primitives
            .iter()
            .filter(|p| p.key().as_str().starts_with("grid-v-"))
            .count();
        assert_eq!(vertical, 3);
    }

    #[test]
    fn test_slack_spread_over_rows() {
        let ctx = RecordingContext::new();
        let renderer = TableRenderer::default();
        let ideal = renderer.ideal_height(&ctx, 400.0, &sales(), None).unwrap();
        let tight = renderer
            .measure(&ctx, Bounds::from_size(Size::new(400.0, ideal.ideal_h)), &sales(), None)
            .unwrap();
        let loose = renderer
            .measure(
                &ctx,
                Bounds::from_size(Size::new(400.0, ideal.ideal_h + 30.0)),
                &sales(),
                None,
            )
            .unwrap();
        assert_eq!(loose.row_heights.len(), 3);
        for (t, l) in tight.row_heights.iter().zip(&loose.row_heights) {
            assert_approx_eq!(f32, *l - *t, 10.0, epsilon = 0.01);
        }
    }

    #[test]
    fn test_cells_formatted_and_aligned() {
        let ctx = RecordingContext::new();
        let mut input = sales();
        input.values[0][0] = CellValue::Number(1234.5);
        input.values[1][2] = CellValue::from("n/a");
        let measured = TableRenderer::default()
            .measure(&ctx, Bounds::from_size(Size::new(400.0, 200.0)), &input, None)
            .unwrap();

        let cell = |key: &str| {
            measured
                .primitives
                .iter()
                .find(|p| p.key().as_str() == key)
                .and_then(|p| match p.shape() {
                    Shape::TableCell(cell) => cell.text.clone(),
                    _ => None,
                })
                .unwrap()
        };
        let number = cell("cell-0-0");
        assert_eq!(number.text.lines()[0].text(), "1,234.5");
        assert_eq!(number.align.horizontal, HAlign::Right);
        assert_eq!(cell("cell-1-2").align.horizontal, HAlign::Left);
    }

    #[test]
    fn test_custom_formatter() {
        let ctx = RecordingContext::new();
        let renderer = TableRenderer::default()
            .with_formatter(Arc::new(|v: f64| format!("{v:.1}%")));
        let measured = renderer
            .measure(&ctx, Bounds::from_size(Size::new(400.0, 200.0)), &sales(), None)
            .unwrap();
        let texts: Vec<String> = measured
            .primitives
            .iter()
            .filter_map(|p| match p.shape() {
                Shape::TableCell(TableCellShape {
                    header: false,
                    text: Some(text),
                    ..
                }) => Some(text.text.lines()[0].text()),
                _ => None,
            })
            .collect();
        assert!(texts.contains(&"6.0%".to_string()));
    }

    #[test]
    fn test_groups() {
        let ctx = RecordingContext::new();
        let input: TableInput = toml::from_str(
            r#"
            row_headers = ["A", "B", "C"]
            row_groups = [{ label = "North", size = 2 }, { label = "South", size = 1 }]
            column_headers = ["Q1", "Q2"]
            column_groups = [{ label = "2024", size = 2 }]
            values = [[1, 2], [3, 4], [5, 6]]
            "#,
        )
        .unwrap();
        let measured = TableRenderer::default()
            .measure(&ctx, Bounds::from_size(Size::new(400.0, 300.0)), &input, None)
            .unwrap();
        let has = |key: &str| measured.primitives.iter().any(|p| p.key().as_str() == key);
        assert!(has("row-group-0"));
        assert!(has("row-group-1"));
        assert!(has("column-group-0"));
        // Header block, B under A, and the South group row; none under
        // either group label.
        assert_eq!(horizontal_lines(&measured.primitives), 3);
        // Two header rows and five body rows.
        assert_eq!(measured.row_heights.len(), 7);
    }

    #[test]
    fn test_headers_wrap_within_their_budget() {
        let ctx = RecordingContext::new();
        let input: TableInput = toml::from_str(
            r#"
            column_headers = ["north east region", "south west region", "x", "y"]
            column_groups = [{ label = "a long group label that spans every single column here", size = 4 }]
            values = [[1, 2, 3, 4]]
            "#,
        )
        .unwrap();
        let width = 300.0;
        let measured = TableRenderer::default()
            .measure(&ctx, Bounds::from_size(Size::new(width, 300.0)), &input, None)
            .unwrap();
        let pad = measured.style.table.cell_padding_x;

        let mut checked = 0;
        for primitive in &measured.primitives {
            let Shape::TableCell(cell) = primitive.shape() else {
                continue;
            };
            let Some(placed) = cell.text.as_ref().filter(|_| cell.header) else {
                continue;
            };
            let text_width = placed.text.width();
            assert!(text_width <= cell.bounds.width() - 2.0 * pad + 1e-3);
            if primitive.key().as_str() == "column-group-0" {
                assert!(text_width <= width / 2.0);
                assert!(placed.text.lines().len() > 1);
            }
            checked += 1;
        }
        assert_eq!(checked, 5);
    }

    #[test]
    fn test_min_not_above_ideal() {
        let ctx = RecordingContext::new();
        for rows in 1..5 {
            let input = TableInput {
                column_headers: vec!["x".to_string()],
                values: vec![vec![CellValue::Number(1.0)]; rows],
                ..TableInput::default()
            };
            let ideal = TableRenderer::default()
                .ideal_height(&ctx, 300.0, &input, None)
                .unwrap();
            assert!(ideal.min_h <= ideal.ideal_h);
        }
    }
}
