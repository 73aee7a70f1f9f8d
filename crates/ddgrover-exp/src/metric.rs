//! Derived metrics with an explicit "undefined" value.
//!
//! A ratio whose denominator is zero, or a product over a stage that never
//! produced a rate, is [`Metric::Undefined`]. It serializes as `null` and
//! cannot be fed back into arithmetic by accident: callers must go through
//! [`Metric::value`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// A derived statistic that may be undefined.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Metric {
    /// A finite value.
    Defined(f64),
    /// No meaningful value (zero denominator or missing input).
    Undefined,
}

impl Metric {
    /// `numerator / denominator`, undefined when the denominator is zero or
    /// the quotient is not finite.
    pub fn ratio(numerator: f64, denominator: f64) -> Self {
        if denominator == 0.0 {
            return Metric::Undefined;
        }
        Self::finite(numerator / denominator)
    }

    /// Ratio of two metrics; undefined if either side is.
    pub fn ratio_of(numerator: Metric, denominator: Metric) -> Self {
        match (numerator, denominator) {
            (Metric::Defined(n), Metric::Defined(d)) => Self::ratio(n, d),
            _ => Metric::Undefined,
        }
    }

    /// Product of rates; undefined if any rate is missing.
    pub fn product(rates: impl IntoIterator<Item = Option<f64>>) -> Self {
        let mut acc = 1.0;
        for rate in rates {
            match rate {
                Some(r) => acc *= r,
                None => return Metric::Undefined,
            }
        }
        Self::finite(acc)
    }

    /// Running products: entry `i` is the product of rates `0..=i`.
    ///
    /// Once a rate is missing, every later entry is undefined.
    pub fn running_product(rates: impl IntoIterator<Item = Option<f64>>) -> Vec<Self> {
        let mut acc = Metric::Defined(1.0);
        rates
            .into_iter()
            .map(|rate| {
                acc = match (acc, rate) {
                    (Metric::Defined(a), Some(r)) => Self::finite(a * r),
                    _ => Metric::Undefined,
                };
                acc
            })
            .collect()
    }

    fn finite(value: f64) -> Self {
        if value.is_finite() {
            Metric::Defined(value)
        } else {
            Metric::Undefined
        }
    }

    /// The value, if defined.
    pub fn value(self) -> Option<f64> {
        match self {
            Metric::Defined(v) => Some(v),
            Metric::Undefined => None,
        }
    }

    /// Whether a value is present.
    pub fn is_defined(self) -> bool {
        matches!(self, Metric::Defined(_))
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Defined(v) => match f.precision() {
                Some(p) => write!(f, "{v:.p$}"),
                None => write!(f, "{v}"),
            },
            Metric::Undefined => f.write_str("undefined"),
        }
    }
}
