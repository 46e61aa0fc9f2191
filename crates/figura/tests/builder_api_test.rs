//! Integration tests for the FigureBuilder API
//!
//! These tests go through the public API only: parse a document, ask for
//! its ideal height, measure it and render SVG.

use std::{fs, sync::Arc};

use figura::{
    FigureBuilder, FiguraError,
    color::Color,
    config::{AppConfig, PageConfig, StyleConfig},
    draw::{GridLineShape, Orientation, RecordingContext, Shape},
    figure::{Figure, FigureDispatch, MeasuredFigure},
    geometry::{Bounds, Size},
    style::{FigureStyle, StyleResolver},
};

const SALES_TABLE: &str = r#"
kind = "table"
caption = "Sales"
row_headers = ["A", "B"]
column_headers = ["2023", "2024", "2025"]
values = [[1, 2, 3], [4, 5, 6]]
"#;

fn builder() -> FigureBuilder {
    FigureBuilder::new(AppConfig::default()).with_fixed_text_metrics(0.6)
}

#[test]
fn test_table_ideal_height_and_grid_lines() {
    let figure = builder().parse(SALES_TABLE).unwrap();
    let ctx = RecordingContext::new();
    let dispatch = FigureDispatch::default();

    let ideal = dispatch.ideal_height(&ctx, 400.0, &figure, None).unwrap();
    assert!(ideal.min_h < ideal.ideal_h);

    let measured = dispatch
        .measure(
            &ctx,
            Bounds::from_size(Size::new(400.0, ideal.ideal_h)),
            &figure,
            None,
        )
        .unwrap();
    let horizontal = measured
        .primitives()
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
        .count();
    assert_eq!(horizontal, 2);
}

#[test]
fn test_render_table_svg() {
    let builder = builder();
    let figure = builder.parse(SALES_TABLE).unwrap();
    let svg = builder.render_svg(&figure).unwrap();
    assert!(svg.contains("<svg"), "Output should contain SVG tag");
    assert!(svg.contains("</svg>"), "Output should be complete SVG");
    assert!(svg.contains("2024"));
}

#[test]
fn test_render_every_kind() {
    let documents = [
        r#"
        kind = "chart"
        categories = ["Q1", "Q2", "Q3"]
        [[series]]
        name = "Online"
        values = [3, 5, 4]
        "#,
        r#"
        kind = "timeseries"
        timestamps = ["2024-01-01", "2024-02-01", "2024-03-01"]
        [[series]]
        name = "Visits"
        values = [10, 12, 9]
        line = true
        "#,
        r#"
        kind = "diagram"
        [[nodes]]
        id = "a"
        [[nodes]]
        id = "b"
        [[links]]
        source = "a"
        target = "b"
        value = 3
        "#,
    ];
    let builder = builder();
    for source in documents {
        let figure = builder.parse(source).unwrap();
        let svg = builder.render_svg(&figure).unwrap();
        assert!(svg.contains("data-layer"), "{} rendered no layers", figure.kind());
    }
}

#[test]
fn test_page_height_from_config() {
    let config = AppConfig::new(StyleConfig::default(), PageConfig::new(500.0, Some(321.0)));
    let builder = FigureBuilder::new(config).with_fixed_text_metrics(0.6);
    let figure = builder.parse(SALES_TABLE).unwrap();
    let measured = builder.measure(&figure).unwrap();
    assert_eq!(measured.bounds().height(), 321.0);
    assert!(matches!(measured, MeasuredFigure::Table(_)));
}

#[test]
fn test_config_defaults_applied() {
    let style = StyleConfig::new(
        Some("Inter".to_string()),
        Some("#fafafa".to_string()),
        vec!["teal".to_string()],
    );
    let builder = FigureBuilder::new(AppConfig::new(style, PageConfig::default()));
    let figure = builder.parse(SALES_TABLE).unwrap();
    let base = figure.base();
    assert_eq!(base.style.font_family.as_deref(), Some("Inter"));
    assert!(base.style.background.is_some());
    assert_eq!(base.style.palette.len(), 1);
}

#[test]
fn test_parse_error_keeps_source() {
    let err = builder()
        .parse("kind = \"table\"\nvalues = [[1, 2], \"x\"]")
        .unwrap_err();
    match err {
        FiguraError::Document { message, src, .. } => {
            assert!(!message.is_empty());
            assert!(src.contains("values"));
        }
        other => panic!("Expected a document error, got {other:?}"),
    }
}

#[test]
fn test_unknown_kind_rejected() {
    let result = builder().parse("kind = \"pie\"");
    assert!(matches!(result, Err(FiguraError::Document { .. })));
}

#[test]
fn test_table_shape_error() {
    let builder = builder();
    let figure: Figure = builder
        .parse(
            r#"
            kind = "table"
            row_headers = ["A"]
            values = [[1], [2]]
            "#,
        )
        .unwrap();
    assert!(matches!(
        builder.render_svg(&figure),
        Err(FiguraError::TableShape(_))
    ));
}

/// Scales like the default resolver and paints a background.
struct TintedResolver;

impl StyleResolver for TintedResolver {
    fn resolve(&self, style: &FigureStyle, responsive_scale: f32) -> FigureStyle {
        let mut resolved = style.scaled(responsive_scale);
        resolved.background = Color::new("#eeeeee").ok();
        resolved
    }
}

#[test]
fn test_custom_style_resolver() {
    let plain = builder();
    let figure = plain.parse(SALES_TABLE).unwrap();
    let has_background = |measured: &MeasuredFigure| {
        measured
            .primitives()
            .iter()
            .any(|p| matches!(p.shape(), Shape::Background(_)))
    };
    assert!(!has_background(&plain.measure(&figure).unwrap()));

    let tinted = builder().with_style_resolver(Arc::new(TintedResolver));
    assert!(has_background(&tinted.measure(&figure).unwrap()));
}

#[test]
fn test_write_svg_file() {
    let builder = builder();
    let figure = builder.parse(SALES_TABLE).unwrap();
    let path = std::env::temp_dir().join(format!("figura-builder-{}.svg", std::process::id()));
    let path_str = path.to_str().unwrap();

    let measured = builder.write_svg(&figure, path_str).unwrap();
    let written = fs::read_to_string(&path).unwrap();
    let _ = fs::remove_file(&path);

    assert!(written.contains("<svg"));
    assert!(written.contains("2025"));
    assert!(matches!(measured, MeasuredFigure::Table(_)));
}
