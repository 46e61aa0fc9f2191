//! Linear value scales with rounded tick values.

/// Step between ticks: 1, 2 or 5 times a power of ten.
///
/// ```
/// # use figura::chart::nice_step;
/// assert_eq!(nice_step(100.0, 5), 20.0);
/// assert_eq!(nice_step(7.0, 5), 2.0);
/// assert_eq!(nice_step(0.3, 5), 0.1);
/// assert_eq!(nice_step(0.0, 5), 1.0);
/// ```
pub fn nice_step(span: f64, count: usize) -> f64 {
    let raw = span.abs() / count.max(1) as f64;
    if !raw.is_finite() || raw <= 0.0 {
        return 1.0;
    }
    let exponent = raw.log10().floor() as i32;
    let magnitude = 10f64.powi(exponent.abs());
    let normalized = if exponent < 0 {
        raw * magnitude
    } else {
        raw / magnitude
    };
    let factor = if normalized <= 1.0 {
        1.0
    } else if normalized <= 2.0 {
        2.0
    } else if normalized <= 5.0 {
        5.0
    } else {
        10.0
    };
    // Dividing keeps steps such as 0.1 exact to the nearest float
    if exponent < 0 {
        factor / magnitude
    } else {
        factor * magnitude
    }
}

fn decimals(step: f64) -> i32 {
    (-step.log10().floor()).max(0.0) as i32
}

/// Evenly spaced round values covering `[min, max]`.
///
/// The first tick is at or below `min`, the last at or above `max`.
pub fn nice_ticks(min: f64, max: f64, count: usize) -> Vec<f64> {
    let (mut min, mut max) = (min.min(max), max.max(min));
    if (max - min).abs() < f64::EPSILON {
        if min == 0.0 {
            max = 1.0;
        } else if min > 0.0 {
            min = 0.0;
        } else {
            max = 0.0;
        }
    }
    let step = nice_step(max - min, count);
    let precision = 10f64.powi(decimals(step));
    let first = (min / step + 1e-9).floor() as i64;
    let last = (max / step - 1e-9).ceil() as i64;
    (first..=last)
        // Strip float drift such as 0.30000000000000004
        .map(|i| (i as f64 * step * precision).round() / precision)
        .collect()
}

/// Maps data values onto a vertical pixel range.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearScale {
    domain_min: f64,
    domain_max: f64,
    bottom: f32,
    top: f32,
    ticks: Vec<f64>,
}

impl LinearScale {
    /// Builds a scale whose domain spans the nice ticks around `[min, max]`.
    ///
    /// Zero is always part of the domain so bars have a baseline.
    pub fn new(min: f64, max: f64, tick_count: usize, bottom: f32, top: f32) -> Self {
        let ticks = nice_ticks(min.min(0.0), max.max(0.0), tick_count);
        let domain_min = ticks.first().copied().unwrap_or(0.0);
        let domain_max = ticks.last().copied().unwrap_or(1.0);
        Self {
            domain_min,
            domain_max,
            bottom,
            top,
            ticks,
        }
    }

    pub fn ticks(&self) -> &[f64] {
        &self.ticks
    }

    pub fn domain(&self) -> (f64, f64) {
        (self.domain_min, self.domain_max)
    }

    /// Pixel y of `value`.
    pub fn map(&self, value: f64) -> f32 {
        let span = self.domain_max - self.domain_min;
        if span <= 0.0 {
            return self.bottom;
        }
        let t = ((value - self.domain_min) / span) as f32;
        self.bottom + t * (self.top - self.bottom)
    }

    /// Pixel y of zero, the bar baseline.
    pub fn baseline(&self) -> f32 {
        self.map(0.0)
    }

    /// Pixel length of `value` units.
    pub fn length(&self, value: f64) -> f32 {
        (self.map(value) - self.baseline()).abs()
    }

    /// Returns the same scale mapped onto another pixel range.
    pub fn with_range(&self, bottom: f32, top: f32) -> Self {
        Self {
            bottom,
            top,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;

    #[test]
    fn test_nice_ticks_cover_range() {
        assert_eq!(nice_ticks(0.0, 93.0, 5), vec![0.0, 20.0, 40.0, 60.0, 80.0, 100.0]);
        assert_eq!(nice_ticks(-3.0, 3.0, 5), vec![-4.0, -2.0, 0.0, 2.0, 4.0]);
        assert_eq!(nice_ticks(0.0, 0.3, 3), vec![0.0, 0.1, 0.2, 0.3]);
    }

    #[test]
    fn test_degenerate_range() {
        assert_eq!(nice_ticks(0.0, 0.0, 5), vec![0.0, 0.2, 0.4, 0.6, 0.8, 1.0]);
        assert_eq!(*nice_ticks(5.0, 5.0, 5).first().unwrap(), 0.0);
    }

    #[test]
    fn test_scale_maps_bottom_to_top() {
        let scale = LinearScale::new(10.0, 90.0, 5, 200.0, 0.0);
        assert_eq!(scale.domain(), (0.0, 100.0));
        assert_approx_eq!(f32, scale.baseline(), 200.0);
        assert_approx_eq!(f32, scale.map(100.0), 0.0);
        assert_approx_eq!(f32, scale.map(50.0), 100.0);
        assert_approx_eq!(f32, scale.length(25.0), 50.0);
    }

    #[test]
    fn test_negative_domain_baseline_inside() {
        let scale = LinearScale::new(-50.0, 50.0, 4, 100.0, 0.0);
        assert_approx_eq!(f32, scale.baseline(), 50.0);
    }
}
