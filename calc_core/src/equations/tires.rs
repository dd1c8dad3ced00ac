//! # Tire Geometry Formulas
//!
//! Overall diameter from metric (width/aspect/rim) sizing and mounted
//! assembly width.

use crate::units::inches_to_mm;

/// Overall tire diameter in mm from metric sizing
///
/// # Formula
/// - D = rim·25.4 + 2 · width · aspect/100
///
/// ```rust
/// use calc_core::equations::diameter_mm;
///
/// // 190/55 R17
/// assert!((diameter_mm(17.0, 190.0, 55.0) - 640.8).abs() < 1e-9);
/// ```
#[inline]
pub fn diameter_mm(rim_in: f64, width_mm: f64, aspect_percent: f64) -> f64 {
    inches_to_mm(rim_in) + 2.0 * width_mm * (aspect_percent / 100.0)
}

/// Mounted assembly width in mm.
///
/// A tire is never narrower than the wheel it sits on, so the wider of the
/// two wins when a rim width is known.
#[inline]
pub fn assembly_width_mm(tire_width_mm: f64, rim_width_in: Option<f64>) -> f64 {
    match rim_width_in {
        Some(rim_width_in) => tire_width_mm.max(inches_to_mm(rim_width_in)),
        None => tire_width_mm,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::round2;

    #[test]
    fn test_metric_diameter() {
        assert_eq!(round2(diameter_mm(17.0, 190.0, 55.0)), 640.8);
        assert_eq!(round2(diameter_mm(16.0, 205.0, 55.0)), 631.9);
    }

    #[test]
    fn test_assembly_width_without_rim() {
        assert_eq!(assembly_width_mm(205.0, None), 205.0);
    }

    #[test]
    fn test_assembly_width_rim_wider_than_tire() {
        // 9" rim = 228.6 mm under a 205 mm tire
        assert_eq!(round2(assembly_width_mm(205.0, Some(9.0))), 228.6);
    }

    #[test]
    fn test_assembly_width_tire_wider_than_rim() {
        assert_eq!(assembly_width_mm(205.0, Some(7.0)), 205.0);
    }
}
