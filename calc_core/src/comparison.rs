//! # Baseline Comparison
//!
//! Every calculator can take a baseline of the same input shape. The baseline
//! runs through the same pipeline and each comparable metric is reduced to an
//! absolute and a percent difference.
//!
//! A metric that is undefined on either side (no chain pitch on the baseline,
//! a zero baseline value) simply produces no diff. That is not an error.
//!
//! ## Example
//!
//! ```rust
//! use calc_core::comparison::Diff;
//!
//! let diff = Diff::between(528.4158843338032, 500.0).unwrap().rounded();
//! assert_eq!(diff.percent, 5.68);
//! assert_eq!(diff.absolute, 28.42);
//! ```

use serde::{Deserialize, Serialize};

use crate::units::round2;

/// Absolute and percent difference of a metric against its baseline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Diff {
    /// current − baseline, in the metric's unit
    pub absolute: f64,
    /// (current − baseline) / baseline · 100
    pub percent: f64,
}

impl Diff {
    /// Compare two defined values. `None` when the baseline is zero or either
    /// side is not finite, since the percent diff has no meaning there.
    pub fn between(current: f64, baseline: f64) -> Option<Self> {
        if baseline == 0.0 || !baseline.is_finite() || !current.is_finite() {
            return None;
        }
        let absolute = current - baseline;
        Some(Diff {
            absolute,
            percent: absolute / baseline * 100.0,
        })
    }

    /// Compare two optional values; a missing or zero side suppresses the diff.
    pub fn between_optional(current: Option<f64>, baseline: Option<f64>) -> Option<Self> {
        match (current, baseline) {
            (Some(current), Some(baseline)) if current != 0.0 => Diff::between(current, baseline),
            _ => None,
        }
    }

    /// Convert the absolute part to another unit. Percent is unit-free.
    pub fn scale_absolute(self, convert: impl Fn(f64) -> f64) -> Self {
        Diff {
            absolute: convert(self.absolute),
            percent: self.percent,
        }
    }

    /// Round both parts for the response
    pub fn rounded(self) -> Self {
        Diff {
            absolute: round2(self.absolute),
            percent: round2(self.percent),
        }
    }
}
