//! Error adapter for converting FiguraError to miette diagnostics.
//!
//! This module provides the bridge between the library's standard error type
//! and miette's rich diagnostic formatting used in the CLI. Document errors
//! carry their source and span, so they render with a snippet of the
//! offending TOML.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan, SourceSpan};

use figura::FiguraError;

/// Adapter that implements [`MietteDiagnostic`] for a [`FiguraError`].
pub struct ErrorAdapter<'a>(pub &'a FiguraError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match &self.0 {
            FiguraError::Io(_) => "figura::io",
            FiguraError::Document { .. } => "figura::document",
            FiguraError::MissingFontMetrics { .. } => "figura::font",
            FiguraError::TableShape(_) => "figura::table",
            FiguraError::ChartShape(_) => "figura::chart",
            FiguraError::Config(_) => "figura::config",
            FiguraError::Export(_) => "figura::export",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let help = match &self.0 {
            FiguraError::Document { .. } => {
                "figure documents set `kind` to chart, timeseries, table or diagram"
            }
            FiguraError::TableShape(_) => {
                "every row header needs one row of values, and every row as many values as there are column headers"
            }
            FiguraError::ChartShape(_) => {
                "a chart has no more panes or tiers than it has series"
            }
            _ => return None,
        };
        Some(Box::new(help))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        match &self.0 {
            FiguraError::Document { src, .. } => Some(src as &dyn miette::SourceCode),
            _ => None,
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        match &self.0 {
            FiguraError::Document {
                message,
                span: Some(span),
                ..
            } => {
                let span = SourceSpan::new(span.start.into(), span.len());
                Some(Box::new(std::iter::once(
                    LabeledSpan::new_primary_with_span(Some(message.clone()), span),
                )))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_error_has_label() {
        let err = FiguraError::Document {
            message: "invalid type".to_string(),
            span: Some(7..12),
            src: "kind = \"pie\"".to_string(),
        };
        let adapter = ErrorAdapter(&err);

        assert_eq!(adapter.to_string(), "invalid type");
        assert_eq!(adapter.code().unwrap().to_string(), "figura::document");
        assert!(adapter.source_code().is_some());

        let labels: Vec<_> = adapter.labels().unwrap().collect();
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].offset(), 7);
        assert_eq!(labels[0].len(), 5);
        assert!(labels[0].primary());
    }

    #[test]
    fn test_document_error_without_span() {
        let err = FiguraError::Document {
            message: "missing field `kind`".to_string(),
            span: None,
            src: String::new(),
        };
        assert!(ErrorAdapter(&err).labels().is_none());
    }

    #[test]
    fn test_chart_shape_error() {
        let err = FiguraError::ChartShape("series `a` is in pane 9".to_string());
        let adapter = ErrorAdapter(&err);

        assert_eq!(adapter.code().unwrap().to_string(), "figura::chart");
        assert!(adapter.help().is_some());
    }

    #[test]
    fn test_non_document_error() {
        let err = FiguraError::TableShape("2 row headers for 3 rows".to_string());
        let adapter = ErrorAdapter(&err);

        assert_eq!(adapter.code().unwrap().to_string(), "figura::table");
        assert!(adapter.help().is_some());
        assert!(adapter.source_code().is_none());
        assert!(adapter.labels().is_none());
    }
}
