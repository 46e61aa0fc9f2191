//! Error types for Figura operations.
//!
//! This module provides the main error type [`FiguraError`] which wraps
//! the error conditions that can occur while reading, measuring and
//! exporting figures.

use std::{io, ops::Range};

use thiserror::Error;

/// The main error type for Figura operations.
///
/// # Diagnostic Variants
///
/// The `Document` variant keeps the offending source and, when known, the
/// byte span of the problem so callers can render a source snippet.
#[derive(Debug, Error)]
pub enum FiguraError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{message}")]
    Document {
        message: String,
        span: Option<Range<usize>>,
        src: String,
    },

    #[error("Font metrics unavailable for `{font}`: the render context reports no ascent or descent")]
    MissingFontMetrics { font: String },

    #[error("Table shape error: {0}")]
    TableShape(String),

    #[error("Chart shape error: {0}")]
    ChartShape(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Export error: {0}")]
    Export(Box<dyn std::error::Error>),
}

impl From<crate::export::Error> for FiguraError {
    fn from(error: crate::export::Error) -> Self {
        Self::Export(Box::new(error))
    }
}

impl FiguraError {
    /// Create a new `Document` error from a TOML deserialization failure.
    pub fn new_document_error(err: &toml::de::Error, src: impl Into<String>) -> Self {
        Self::Document {
            message: err.message().trim().to_string(),
            span: err.span(),
            src: src.into(),
        }
    }
}
