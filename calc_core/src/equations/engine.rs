//! # Engine Geometry Formulas
//!
//! Cylinder volumes, bore/stroke classification, compression ratio pieces and
//! connecting-rod ratios.
//!
//! ## Notation
//!
//! - `B` = Bore (cylinder diameter), mm
//! - `S` = Stroke (piston travel), mm
//! - `n` = Cylinder count
//! - `t` = Head gasket compressed thickness, mm
//! - `Bg` = Head gasket bore, mm
//! - `d` = Deck height (piston crown below deck at TDC), mm
//! - `h` = Port height (distance from bottom of stroke to the port's top edge), mm
//! - `R` = Rod length (center to center), mm
//!
//! Volumes come out in cubic centimeters (mm³ / 1000).

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

/// Relative bore/stroke difference still considered "square"
pub const SQUARE_TOLERANCE: f64 = 0.03;

/// R/L at or above this is rough-running
pub const ROUGH_RL_RATIO: f64 = 0.30;

/// R/L at or above this (and below rough) is normal
pub const NORMAL_RL_RATIO: f64 = 0.25;

// =============================================================================
// CYLINDER VOLUMES
// =============================================================================

/// Volume of a cylinder of diameter `diameter_mm` and height `height_mm`, in cc
///
/// # Formula
/// - V = π·D²/4 · h / 1000
#[inline]
pub fn cylinder_volume_cc(diameter_mm: f64, height_mm: f64) -> f64 {
    PI * diameter_mm.powi(2) / 4.0 * height_mm / 1000.0
}

/// Engine displacement in cc
///
/// # Formula
/// - V = π·B²/4 · S · n / 1000
///
/// ```rust
/// use calc_core::equations::displacement_cc;
///
/// let cc = displacement_cc(58.0, 50.0, 4);
/// assert!((cc - 528.42).abs() < 0.01);
/// ```
#[inline]
pub fn displacement_cc(bore_mm: f64, stroke_mm: f64, cylinders: u32) -> f64 {
    cylinder_volume_cc(bore_mm, stroke_mm) * f64::from(cylinders)
}

/// Swept volume of one cylinder in cc
#[inline]
pub fn swept_volume_cc(bore_mm: f64, stroke_mm: f64) -> f64 {
    cylinder_volume_cc(bore_mm, stroke_mm)
}

/// Volume of the compressed head gasket ring in cc
///
/// # Formula
/// - V = π·Bg²/4 · t / 1000
#[inline]
pub fn gasket_volume_cc(gasket_bore_mm: f64, gasket_thickness_mm: f64) -> f64 {
    cylinder_volume_cc(gasket_bore_mm, gasket_thickness_mm)
}

/// Volume between piston crown and deck at TDC in cc
///
/// # Formula
/// - V = π·B²/4 · d / 1000
#[inline]
pub fn deck_volume_cc(bore_mm: f64, deck_height_mm: f64) -> f64 {
    cylinder_volume_cc(bore_mm, deck_height_mm)
}

/// Total clearance volume above the piston at TDC
///
/// Piston volume is positive for a dish and negative for a dome.
#[inline]
pub fn clearance_volume_cc(chamber_cc: f64, gasket_cc: f64, deck_cc: f64, piston_volume_cc: f64) -> f64 {
    chamber_cc + gasket_cc + deck_cc + piston_volume_cc
}

/// Compression ratio (V_swept + V_clearance) / V_clearance
///
/// Also used for crankcase (primary) compression with the crankcase volume
/// in place of the clearance volume.
#[inline]
pub fn compression_ratio(swept_cc: f64, clearance_cc: f64) -> f64 {
    (swept_cc + clearance_cc) / clearance_cc
}

/// Effective swept volume of a two-stroke cylinder after the port closes
///
/// # Formula
/// - V = π·B²/4 · (S − h) / 1000
#[inline]
pub fn trapped_swept_volume_cc(bore_mm: f64, stroke_mm: f64, port_height_mm: f64) -> f64 {
    displacement_cc(bore_mm, stroke_mm - port_height_mm, 1)
}

// =============================================================================
// BORE / STROKE CLASSIFICATION
// =============================================================================

/// Bore/stroke relationship of a cylinder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeometryClass {
    /// Bore within 3% of stroke
    Square,
    /// Bore larger than stroke (short stroke)
    Oversquare,
    /// Bore smaller than stroke (long stroke)
    Undersquare,
}

impl GeometryClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            GeometryClass::Square => "square",
            GeometryClass::Oversquare => "oversquare",
            GeometryClass::Undersquare => "undersquare",
        }
    }
}

impl std::fmt::Display for GeometryClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classify bore vs stroke.
///
/// The tolerance check runs before the magnitude comparison, so anything
/// within 3% (inclusive) of the stroke is square in either direction.
///
/// ```rust
/// use calc_core::equations::{classify_geometry, GeometryClass};
///
/// assert_eq!(classify_geometry(103.0, 100.0), GeometryClass::Square);
/// assert_eq!(classify_geometry(104.0, 100.0), GeometryClass::Oversquare);
/// ```
pub fn classify_geometry(bore_mm: f64, stroke_mm: f64) -> GeometryClass {
    let ratio = (bore_mm - stroke_mm).abs() / stroke_mm;
    if ratio <= SQUARE_TOLERANCE {
        GeometryClass::Square
    } else if bore_mm > stroke_mm {
        GeometryClass::Oversquare
    } else {
        GeometryClass::Undersquare
    }
}

// =============================================================================
// CONNECTING ROD RATIOS
// =============================================================================

/// Crank radius over rod length: (S/2) / R
#[inline]
pub fn rl_ratio(stroke_mm: f64, rod_length_mm: f64) -> f64 {
    (stroke_mm / 2.0) / rod_length_mm
}

/// Rod length over stroke: R / S
#[inline]
pub fn rod_stroke_ratio(stroke_mm: f64, rod_length_mm: f64) -> f64 {
    rod_length_mm / stroke_mm
}

/// Running smoothness implied by the R/L ratio (secondary vibration)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Smoothness {
    Smooth,
    Normal,
    Rough,
}

pub fn classify_smoothness(rl: f64) -> Smoothness {
    if rl >= ROUGH_RL_RATIO {
        Smoothness::Rough
    } else if rl >= NORMAL_RL_RATIO {
        Smoothness::Normal
    } else {
        Smoothness::Smooth
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::round2;

    #[test]
    fn test_displacement_metric_case() {
        let cc = displacement_cc(58.0, 50.0, 4);
        assert_eq!(round2(cc), 528.42);
        assert_eq!(classify_geometry(58.0, 50.0), GeometryClass::Oversquare);
    }

    #[test]
    fn test_classify_geometry_boundaries() {
        assert_eq!(classify_geometry(100.0, 100.0), GeometryClass::Square);
        assert_eq!(classify_geometry(103.0, 100.0), GeometryClass::Square);
        assert_eq!(classify_geometry(97.0, 100.0), GeometryClass::Square);
        assert_eq!(classify_geometry(104.0, 100.0), GeometryClass::Oversquare);
        assert_eq!(classify_geometry(96.0, 100.0), GeometryClass::Undersquare);
    }

    #[test]
    fn test_compression_helpers() {
        let swept = swept_volume_cc(100.0, 100.0);
        let gasket = gasket_volume_cc(100.0, 1.0);
        let deck = deck_volume_cc(100.0, 0.0);
        let clearance = clearance_volume_cc(50.0, gasket, deck, 0.0);
        let ratio = compression_ratio(swept, clearance);
        let trapped = trapped_swept_volume_cc(100.0, 100.0, 40.0);

        assert_eq!(round2(swept), 785.4);
        assert_eq!(round2(gasket), 7.85);
        assert_eq!(round2(clearance), 57.85);
        assert_eq!(round2(ratio), 14.58);
        assert_eq!(round2(trapped), 471.24);
    }

    #[test]
    fn test_rod_ratios() {
        assert_eq!(round2(rl_ratio(50.0, 100.0)), 0.25);
        assert_eq!(round2(rod_stroke_ratio(50.0, 100.0)), 2.0);
    }

    #[test]
    fn test_smoothness_classification() {
        assert_eq!(classify_smoothness(0.31), Smoothness::Rough);
        assert_eq!(classify_smoothness(0.26), Smoothness::Normal);
        assert_eq!(classify_smoothness(0.2), Smoothness::Smooth);
    }

    #[test]
    fn test_geometry_serialization() {
        assert_eq!(serde_json::to_string(&GeometryClass::Undersquare).unwrap(), "\"undersquare\"");
        assert_eq!(serde_json::to_string(&Smoothness::Rough).unwrap(), "\"rough\"");
    }
}
