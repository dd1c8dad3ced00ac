//! # Unit Types
//!
//! Type-safe wrappers for the length and volume units used by the calculators,
//! plus the request-level unit system and its resolution.
//!
//! ## Canonical Units
//!
//! Every calculation runs in metric canonical units:
//! - Length: millimeters (mm)
//! - Volume: cubic centimeters (cc)
//!
//! Imperial inputs (inches, cubic inches) are converted at the normalization
//! boundary and results are converted back only when the response is built.
//! Conversions are exact linear scalings; rounding to 2 decimals happens once,
//! at the response boundary (see [`round2`]).
//!
//! ## Example
//!
//! ```rust
//! use calc_core::units::{CubicCentimeters, CubicInches, Inches, Millimeters};
//!
//! let bore = Inches(4.0);
//! let bore_mm: Millimeters = bore.into();
//! assert_eq!(bore_mm.0, 101.6);
//!
//! let chamber: CubicCentimeters = CubicInches(1.0).into();
//! assert_eq!(chamber.0, 16.387064);
//! ```

use serde::{Deserialize, Serialize};

/// Millimeters per inch
pub const MM_PER_INCH: f64 = 25.4;

/// Cubic centimeters per cubic inch
pub const CC_PER_CUBIC_INCH: f64 = 16.387064;

/// Cubic centimeters per liter
pub const CC_PER_LITER: f64 = 1000.0;

// ============================================================================
// Length Units
// ============================================================================

/// Length in millimeters
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Millimeters(pub f64);

/// Length in inches
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inches(pub f64);

impl From<Inches> for Millimeters {
    fn from(inches: Inches) -> Self {
        Millimeters(inches.0 * MM_PER_INCH)
    }
}

impl From<Millimeters> for Inches {
    fn from(mm: Millimeters) -> Self {
        Inches(mm.0 / MM_PER_INCH)
    }
}

// ============================================================================
// Volume Units
// ============================================================================

/// Volume in cubic centimeters
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CubicCentimeters(pub f64);

/// Volume in cubic inches
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CubicInches(pub f64);

/// Volume in liters
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Liters(pub f64);

impl From<CubicInches> for CubicCentimeters {
    fn from(cuin: CubicInches) -> Self {
        CubicCentimeters(cuin.0 * CC_PER_CUBIC_INCH)
    }
}

impl From<CubicCentimeters> for CubicInches {
    fn from(cc: CubicCentimeters) -> Self {
        CubicInches(cc.0 / CC_PER_CUBIC_INCH)
    }
}

impl From<CubicCentimeters> for Liters {
    fn from(cc: CubicCentimeters) -> Self {
        Liters(cc.0 / CC_PER_LITER)
    }
}

// ============================================================================
// Unit Systems
// ============================================================================

/// Warning emitted when a request asks for `auto` units
pub const AUTO_UNIT_WARNING: &str = "unit_system 'auto' is not supported yet; using 'metric'";

/// Unit system as declared by a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    /// Millimeters and cubic centimeters
    #[default]
    Metric,
    /// Inches and cubic inches
    Imperial,
    /// Let the server pick (currently always metric)
    Auto,
}

/// Unit system after resolution. `auto` never survives past [`UnitSystem::resolve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ResolvedUnitSystem {
    #[default]
    Metric,
    Imperial,
}

impl UnitSystem {
    /// Resolve the declared system, returning any user-visible warnings.
    ///
    /// ```rust
    /// use calc_core::units::{ResolvedUnitSystem, UnitSystem};
    ///
    /// let (system, warnings) = UnitSystem::Auto.resolve();
    /// assert_eq!(system, ResolvedUnitSystem::Metric);
    /// assert_eq!(warnings.len(), 1);
    /// ```
    pub fn resolve(self) -> (ResolvedUnitSystem, Vec<String>) {
        match self {
            UnitSystem::Metric => (ResolvedUnitSystem::Metric, Vec::new()),
            UnitSystem::Imperial => (ResolvedUnitSystem::Imperial, Vec::new()),
            UnitSystem::Auto => (ResolvedUnitSystem::Metric, vec![AUTO_UNIT_WARNING.to_string()]),
        }
    }
}

impl ResolvedUnitSystem {
    /// Convert a request length (mm or in) to millimeters
    pub fn length_to_mm(self, value: f64) -> f64 {
        match self {
            ResolvedUnitSystem::Metric => value,
            ResolvedUnitSystem::Imperial => Millimeters::from(Inches(value)).0,
        }
    }

    /// Convert a request volume (cc or cu in) to cubic centimeters
    pub fn volume_to_cc(self, value: f64) -> f64 {
        match self {
            ResolvedUnitSystem::Metric => value,
            ResolvedUnitSystem::Imperial => CubicCentimeters::from(CubicInches(value)).0,
        }
    }

    /// Convert millimeters to the response length unit
    pub fn length_from_mm(self, mm: f64) -> f64 {
        match self {
            ResolvedUnitSystem::Metric => mm,
            ResolvedUnitSystem::Imperial => Inches::from(Millimeters(mm)).0,
        }
    }

    /// Convert cubic centimeters to the response volume unit
    pub fn volume_from_cc(self, cc: f64) -> f64 {
        match self {
            ResolvedUnitSystem::Metric => cc,
            ResolvedUnitSystem::Imperial => CubicInches::from(CubicCentimeters(cc)).0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ResolvedUnitSystem::Metric => "metric",
            ResolvedUnitSystem::Imperial => "imperial",
        }
    }
}

/// Convert inches to millimeters
#[inline]
pub fn inches_to_mm(value: f64) -> f64 {
    Millimeters::from(Inches(value)).0
}

/// Convert millimeters to inches
#[inline]
pub fn mm_to_inches(value: f64) -> f64 {
    Inches::from(Millimeters(value)).0
}

/// Convert cubic centimeters to liters
#[inline]
pub fn cc_to_liters(value: f64) -> f64 {
    Liters::from(CubicCentimeters(value)).0
}

/// Convert cubic centimeters to cubic inches
#[inline]
pub fn cc_to_cuin(value: f64) -> f64 {
    CubicInches::from(CubicCentimeters(value)).0
}

/// Round to two decimals. Only called when a response is assembled.
///
/// Rounds the exact binary value, ties to even: `1.115` is stored just below
/// the tie and becomes `1.11`, while the exact tie `0.125` becomes `0.12`.
///
/// ```rust
/// use calc_core::units::round2;
///
/// assert_eq!(round2(14.5833), 14.58);
/// assert_eq!(round2(1.115), 1.11);
/// assert_eq!(round2(0.375), 0.38);
/// ```
pub fn round2(value: f64) -> f64 {
    let scaled = value * 100.0;
    if !scaled.is_finite() || scaled.abs() >= 2f64.powi(52) {
        return value;
    }

    // value·200 = doubled + error, exactly
    let lower = scaled.floor();
    let doubled = value * 200.0;
    let error = value.mul_add(200.0, -doubled);
    let distance = (doubled - (2.0 * lower + 1.0)) + error;

    let hundredths = if distance < 0.0 {
        lower
    } else if distance > 0.0 || lower.rem_euclid(2.0) != 0.0 {
        lower + 1.0
    } else {
        lower
    };

    let rounded = hundredths / 100.0;
    if rounded == 0.0 {
        0.0_f64.copysign(value)
    } else {
        rounded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_inches_to_mm() {
        let mm: Millimeters = Inches(2.0).into();
        assert_eq!(mm.0, 50.8);
    }

    #[test]
    fn test_round_trip_exact_value() {
        assert_eq!(inches_to_mm(mm_to_inches(100.0)), 100.0);
    }

    #[test]
    fn test_volume_conversions() {
        let cc = 528.4158843338032;
        assert_eq!(round2(cc_to_liters(cc)), 0.53);
        assert_eq!(round2(cc_to_cuin(cc)), 32.25);
    }

    #[test]
    fn test_volume_newtypes() {
        let cc: CubicCentimeters = CubicInches(2.0).into();
        assert_eq!(cc.0, 32.774128);
        let liters: Liters = CubicCentimeters(1500.0).into();
        assert_eq!(liters.0, 1.5);
    }

    #[test]
    fn test_resolve_passes_through() {
        assert_eq!(UnitSystem::Metric.resolve(), (ResolvedUnitSystem::Metric, vec![]));
        assert_eq!(UnitSystem::Imperial.resolve(), (ResolvedUnitSystem::Imperial, vec![]));
    }

    #[test]
    fn test_resolve_auto_warns_once() {
        let (system, warnings) = UnitSystem::Auto.resolve();
        assert_eq!(system, ResolvedUnitSystem::Metric);
        assert_eq!(warnings, vec![AUTO_UNIT_WARNING.to_string()]);
    }

    #[test]
    fn test_unit_system_serialization() {
        let parsed: UnitSystem = serde_json::from_str("\"imperial\"").unwrap();
        assert_eq!(parsed, UnitSystem::Imperial);
        assert_eq!(serde_json::to_string(&ResolvedUnitSystem::Metric).unwrap(), "\"metric\"");
        assert!(serde_json::from_str::<UnitSystem>("\"furlongs\"").is_err());
    }

    #[test]
    fn test_round2_only_rounds_at_two_places() {
        assert_eq!(round2(14.5833), 14.58);
        assert_eq!(round2(2.714285), 2.71);
        assert_eq!(round2(-6.6666), -6.67);
    }

    #[test]
    fn test_round2_ties_go_to_even() {
        // exact binary ties
        assert_eq!(round2(0.125), 0.12);
        assert_eq!(round2(0.375), 0.38);
        assert_eq!(round2(-0.125), -0.12);
        assert_eq!(round2(2.625), 2.62);
        // stored just below the decimal tie
        assert_eq!(round2(1.115), 1.11);
        assert_eq!(round2(2.675), 2.67);
        assert_eq!(round2(1.005), 1.0);
    }

    #[test]
    fn test_round2_edges() {
        assert!(round2(-0.001).is_sign_negative());
        assert_eq!(round2(-0.001), 0.0);
        assert_eq!(round2(1e300), 1e300);
        assert!(round2(f64::NAN).is_nan());
        assert_eq!(round2(f64::INFINITY), f64::INFINITY);
    }

    proptest! {
        #[test]
        fn prop_length_round_trip(value in 0.001f64..10_000.0) {
            for system in [ResolvedUnitSystem::Metric, ResolvedUnitSystem::Imperial] {
                let back = system.length_from_mm(system.length_to_mm(value));
                assert_relative_eq!(back, value, max_relative = 1e-12);
            }
        }

        #[test]
        fn prop_volume_round_trip(value in 0.001f64..100_000.0) {
            for system in [ResolvedUnitSystem::Metric, ResolvedUnitSystem::Imperial] {
                let back = system.volume_from_cc(system.volume_to_cc(value));
                assert_relative_eq!(back, value, max_relative = 1e-12);
            }
        }
    }
}
