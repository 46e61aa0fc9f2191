//! Figura Core Types and Definitions
//!
//! This crate provides the foundational types shared by the Figura layout
//! engine and its hosts. It includes:
//!
//! - **Colors**: Color handling with CSS color support ([`color::Color`])
//! - **Geometry**: Basic geometric types ([`geometry`] module)
//! - **Draw**: Render layers, strokes, text styles, rich text, primitives and
//!   the rendering-context capability ([`draw`] module)
//! - **Markup**: Inline emphasis parsing for figure text ([`markup`] module)

pub mod color;
pub mod draw;
pub mod geometry;
pub mod markup;
