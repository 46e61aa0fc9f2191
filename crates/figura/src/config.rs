//! Configuration types for Figura rendering.
//!
//! This module provides configuration structures that control default
//! styling and page size. All types implement [`serde::Deserialize`] so the
//! CLI can load them from TOML.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining style and page settings.
//! - [`StyleConfig`] - Default font family, background color and series palette.
//! - [`PageConfig`] - Default output size.
//!
//! # Example
//!
//! ```
//! # use figura::config::AppConfig;
//! let config = AppConfig::default();
//! assert!(config.style().background_color().is_ok());
//! assert_eq!(config.page().width(), 800.0);
//! ```

use serde::Deserialize;

use figura_core::color::Color;

use crate::style::StyleDefaults;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Style configuration section.
    #[serde(default)]
    style: StyleConfig,

    /// Page configuration section.
    #[serde(default)]
    page: PageConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] with the specified style and page configurations.
    pub fn new(style: StyleConfig, page: PageConfig) -> Self {
        Self { style, page }
    }

    /// Returns the style configuration.
    pub fn style(&self) -> &StyleConfig {
        &self.style
    }

    /// Returns the page configuration.
    pub fn page(&self) -> &PageConfig {
        &self.page
    }
}

/// Default styling applied to figures that do not set these values
/// themselves.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct StyleConfig {
    /// Font family used by every text role.
    #[serde(default)]
    font_family: Option<String>,

    /// Figure background, as a color string.
    #[serde(default)]
    background_color: Option<String>,

    /// Series and node colors, as color strings.
    #[serde(default)]
    palette: Vec<String>,
}

impl StyleConfig {
    pub fn new(
        font_family: Option<String>,
        background_color: Option<String>,
        palette: Vec<String>,
    ) -> Self {
        Self {
            font_family,
            background_color,
            palette,
        }
    }

    pub fn font_family(&self) -> Option<&str> {
        self.font_family.as_deref()
    }

    /// Returns the parsed background [`Color`], or `None` if no color is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured color string cannot be parsed
    /// into a valid [`Color`].
    pub fn background_color(&self) -> Result<Option<Color>, String> {
        self.background_color
            .as_ref()
            .map(|color| Color::new(color))
            .transpose()
            .map_err(|err| format!("Invalid background color in config: {err}"))
    }

    /// Returns the parsed palette.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first entry that is not a valid color.
    pub fn palette(&self) -> Result<Vec<Color>, String> {
        self.palette
            .iter()
            .map(|color| Color::new(color))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| format!("Invalid palette color in config: {err}"))
    }

    /// Validates every color and bundles the values figures inherit.
    pub fn defaults(&self) -> Result<StyleDefaults, String> {
        Ok(StyleDefaults {
            font_family: self.font_family.clone(),
            background: self.background_color()?,
            palette: self.palette()?,
        })
    }
}

/// Output page settings.
#[derive(Debug, Clone, Deserialize)]
pub struct PageConfig {
    /// Page width in pixels.
    #[serde(default = "default_page_width")]
    width: f32,

    /// Page height in pixels; the figure's ideal height when unset.
    #[serde(default)]
    height: Option<f32>,
}

fn default_page_width() -> f32 {
    800.0
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            width: default_page_width(),
            height: None,
        }
    }
}

impl PageConfig {
    pub fn new(width: f32, height: Option<f32>) -> Self {
        Self { width, height }
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> Option<f32> {
        self.height
    }

    /// Returns a copy with the given dimensions overriding the configured ones.
    pub fn with_overrides(&self, width: Option<f32>, height: Option<f32>) -> Self {
        Self {
            width: width.unwrap_or(self.width),
            height: height.or(self.height),
        }
    }
}
