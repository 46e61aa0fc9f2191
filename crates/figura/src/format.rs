//! Number formatting for table cells, data labels and axis ticks.

use serde::Deserialize;

/// Turns numeric values into display strings.
///
/// Any `Fn(f64) -> String` is a formatter, so callers can pass a closure.
pub trait ValueFormatter {
    fn format(&self, value: f64) -> String;
}

impl<F> ValueFormatter for F
where
    F: Fn(f64) -> String,
{
    fn format(&self, value: f64) -> String {
        self(value)
    }
}

/// Default decimal formatting.
///
/// With `decimals` unset, whole numbers print without a fraction and other
/// values print with up to two decimals, trailing zeros removed.
///
/// # Examples
///
/// ```
/// # use figura::format::{NumberFormat, ValueFormatter};
/// let format = NumberFormat::default();
/// assert_eq!(format.format(1234.0), "1,234");
/// assert_eq!(format.format(-0.5), "-0.5");
///
/// let money = NumberFormat::default().with_decimals(2).with_prefix("$");
/// assert_eq!(money.format(3.5), "$3.50");
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct NumberFormat {
    decimals: Option<usize>,
    grouping: bool,
    prefix: String,
    suffix: String,
}

impl Default for NumberFormat {
    fn default() -> Self {
        Self {
            decimals: None,
            grouping: true,
            prefix: String::new(),
            suffix: String::new(),
        }
    }
}

impl NumberFormat {
    pub fn with_decimals(mut self, decimals: usize) -> Self {
        self.decimals = Some(decimals);
        self
    }

    pub fn with_grouping(mut self, grouping: bool) -> Self {
        self.grouping = grouping;
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    fn digits(&self, value: f64) -> String {
        match self.decimals {
            Some(decimals) => format!("{:.*}", decimals, value.abs()),
            None => {
                let fixed = format!("{:.2}", value.abs());
                fixed
                    .trim_end_matches('0')
                    .trim_end_matches('.')
                    .to_string()
            }
        }
    }
}

impl ValueFormatter for NumberFormat {
    fn format(&self, value: f64) -> String {
        if !value.is_finite() {
            return String::new();
        }

        let digits = self.digits(value);
        let (whole, fraction) = match digits.split_once('.') {
            Some((whole, fraction)) => (whole, Some(fraction)),
            None => (digits.as_str(), None),
        };

        let whole = if self.grouping {
            group_thousands(whole)
        } else {
            whole.to_string()
        };

        let negative = value < 0.0 && digits.chars().any(|c| c != '0' && c != '.');
        let mut out = String::with_capacity(digits.len() + 8);
        if negative {
            out.push('-');
        }
        out.push_str(&self.prefix);
        out.push_str(&whole);
        if let Some(fraction) = fraction {
            out.push('.');
            out.push_str(fraction);
        }
        out.push_str(&self.suffix);
        out
    }
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_trims_fraction() {
        let format = NumberFormat::default();
        assert_eq!(format.format(1.0), "1");
        assert_eq!(format.format(2.25), "2.25");
        assert_eq!(format.format(2.5), "2.5");
        assert_eq!(format.format(0.0), "0");
    }

    #[test]
    fn test_grouping() {
        assert_eq!(NumberFormat::default().format(1234567.0), "1,234,567");
        assert_eq!(
            NumberFormat::default().with_grouping(false).format(1234567.0),
            "1234567"
        );
        assert_eq!(NumberFormat::default().format(999.0), "999");
    }

    #[test]
    fn test_negative_and_rounded_zero() {
        let format = NumberFormat::default().with_decimals(1);
        assert_eq!(format.format(-1234.56), "-1,234.6");
        assert_eq!(format.format(-0.01), "0.0");
    }

    #[test]
    fn test_prefix_suffix() {
        let format = NumberFormat::default().with_suffix("%");
        assert_eq!(format.format(12.0), "12%");
    }

    #[test]
    fn test_non_finite_is_blank() {
        assert_eq!(NumberFormat::default().format(f64::NAN), "");
    }

    #[test]
    fn test_closure_formatter() {
        let formatter = |value: f64| format!("<{value}>");
        assert_eq!(ValueFormatter::format(&formatter, 3.0), "<3>");
    }
}
