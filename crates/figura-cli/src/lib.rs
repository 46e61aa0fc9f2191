//! Figura CLI library
//!
//! This module contains the core CLI logic for the Figura figure renderer.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;
pub use error_adapter::ErrorAdapter;

use std::fs;

use log::info;

use figura::{FiguraError, FigureBuilder, config::AppConfig};

/// Run the Figura CLI application
///
/// This function reads the input figure document, measures it against the
/// configured page, and writes the resulting SVG to the output file.
///
/// # Errors
///
/// Returns `FiguraError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Malformed figure documents
/// - Measurement errors
pub fn run(args: &Args) -> Result<(), FiguraError> {
    info!(
        input_path = args.input,
        output_path = args.output;
        "Processing figure"
    );

    let app_config = config::load_config(args.config.as_ref())?;
    let page = app_config.page().with_overrides(args.width, args.height);
    let app_config = AppConfig::new(app_config.style().clone(), page);

    let source = fs::read_to_string(&args.input)?;

    let builder = FigureBuilder::new(app_config);
    let figure = builder.parse(&source)?;
    let svg = builder.render_svg(&figure)?;

    fs::write(&args.output, svg)?;

    info!(output_file = args.output; "SVG exported successfully");

    Ok(())
}
