//! Responsive scale search.
//!
//! A figure that autofits is measured at several candidate scales; the
//! largest one whose estimated size fits the available bounds wins.

use log::debug;
use serde::Deserialize;

use crate::error::FiguraError;

const TOLERANCE: f32 = 0.005;
const MAX_ITERATIONS: usize = 32;

/// Inclusive range of responsive scales a figure may use.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ScaleRange {
    #[serde(alias = "min_scale")]
    pub min: f32,
    #[serde(alias = "max_scale")]
    pub max: f32,
}

impl ScaleRange {
    pub fn new(min: f32, max: f32) -> Self {
        Self {
            min: min.min(max),
            max: max.max(min),
        }
    }

    pub fn clamp(&self, scale: f32) -> f32 {
        scale.clamp(self.min, self.max)
    }
}

impl Default for ScaleRange {
    fn default() -> Self {
        Self { min: 1.0, max: 1.0 }
    }
}

/// Heights a figure can be drawn at, for a given width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IdealHeight {
    /// Smallest height before content overlaps.
    pub min_h: f32,
    /// Height the figure looks best at.
    pub ideal_h: f32,
    /// Height beyond which extra space is left empty.
    pub max_h: f32,
    /// `min(1, width / estimated_min_width)`.
    pub needed_scaling_to_fit_width: f32,
}

impl IdealHeight {
    pub fn new(min_h: f32, ideal_h: f32, max_h: f32, width: f32, min_width: f32) -> Self {
        let needed_scaling_to_fit_width = if min_width > 0.0 {
            (width / min_width).min(1.0)
        } else {
            1.0
        };
        Self {
            min_h,
            ideal_h: ideal_h.max(min_h),
            max_h: max_h.max(ideal_h).max(min_h),
            needed_scaling_to_fit_width,
        }
    }
}

/// Finds the largest scale in `range` whose estimated size fits.
///
/// Returns `range.max` when it already fits and `range.min` when nothing
/// fits (the figure then overflows). Otherwise the fit predicate is assumed
/// monotone and bisected. An estimator failure counts as not fitting.
///
/// # Examples
///
/// ```
/// # use figura::autofit::{find_optimal_scale, ScaleRange};
/// let scale = find_optimal_scale(
///     300.0,
///     1000.0,
///     ScaleRange::new(0.5, 2.0),
///     |s| Ok(200.0 * s),
///     |s| Ok(100.0 * s),
/// );
/// assert!((scale - 1.5).abs() < 0.01);
/// ```
pub fn find_optimal_scale<W, H>(
    width: f32,
    height: f32,
    range: ScaleRange,
    width_estimator: W,
    height_estimator: H,
) -> f32
where
    W: Fn(f32) -> Result<f32, FiguraError>,
    H: Fn(f32) -> Result<f32, FiguraError>,
{
    let fits = |scale: f32| {
        let w = width_estimator(scale).unwrap_or(f32::INFINITY);
        let h = height_estimator(scale).unwrap_or(f32::INFINITY);
        w <= width && h <= height
    };

    if fits(range.max) {
        return range.max;
    }
    if !fits(range.min) {
        debug!(min = range.min, width, height; "No scale fits, overflowing");
        return range.min;
    }

    let mut low = range.min;
    let mut high = range.max;
    let mut iterations = 0;
    while high - low > TOLERANCE && iterations < MAX_ITERATIONS {
        let mid = (low + high) / 2.0;
        if fits(mid) {
            low = mid;
        } else {
            high = mid;
        }
        iterations += 1;
    }
    debug!(scale = low, iterations; "Autofit scale found");
    low
}
