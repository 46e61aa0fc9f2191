//! Export of measured figures into output formats.
//!
//! This is the last stage of the pipeline:
//!
//! ```text
//! Figure document (TOML)
//!     ↓ parse
//! Figure
//!     ↓ measure (FigureDispatch)
//! MeasuredFigure (primitive list)
//!     ↓ export (this module)
//! Output file
//! ```
//!
//! # Available Backends
//!
//! - [`svg`]: SVG output through [`svg::SvgCanvas`], a [`RenderContext`]
//!   that measures text with system fonts and writes layered SVG.
//!
//! [`RenderContext`]: figura_core::draw::RenderContext

/// SVG export backend.
pub mod svg;

use std::{error, fmt, io};

use crate::figure::MeasuredFigure;

/// Abstraction for figure export backends.
pub trait Exporter {
    /// Writes a measured figure in the backend's output format.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Render`] if the figure cannot be converted, or
    /// [`Error::Io`] if writing the output fails.
    fn export_figure(&mut self, figure: &MeasuredFigure) -> Result<(), Error>;
}

/// Errors that can occur during figure export.
///
/// Converted into [`FiguraError::Export`] at the crate boundary.
///
/// [`FiguraError::Export`]: crate::FiguraError::Export
#[derive(Debug)]
pub enum Error {
    /// A rendering or conversion failure described by `message`.
    Render(String),
    /// An I/O error encountered while writing output.
    Io(io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Render(msg) => write!(f, "Render error: {msg}"),
            Self::Io(err) => write!(f, "I/O error: {err}"),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Render(_) => None,
            Self::Io(err) => Some(err),
        }
    }
}
