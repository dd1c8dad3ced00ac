//! Flotation tire size parsing.
//!
//! Two notations are recognized:
//!
//! - Standard flotation `<overall>x<width>R<rim>` (or `-` instead of `R`),
//!   e.g. `31x10.5R15`, `10x4.50-5`. All three numbers are inches.
//! - Motorcycle inch sizing `<width>-<rim>`, e.g. `3.00-21`.
//!
//! Both are matched case-insensitively after trimming surrounding whitespace.

use once_cell::sync::Lazy;
use regex::Regex;

static FLOTATION_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^([0-9.]+)x([0-9.]+)(?:R|-)([0-9.]+)$").expect("valid flotation pattern"));

static MOTORCYCLE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9.]+)-([0-9.]+)$").expect("valid motorcycle size pattern"));

/// Standard flotation size, all values in inches
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlotationSize {
    pub overall_in: f64,
    pub width_in: f64,
    pub rim_in: f64,
}

/// Motorcycle inch size, both values in inches
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotorcycleSize {
    pub width_in: f64,
    pub rim_in: f64,
}

/// Parse a standard flotation size. `None` when the string does not match or
/// a captured number is malformed (e.g. `1.2.3`).
///
/// ```rust
/// use calc_core::tire_size::parse_flotation;
///
/// let size = parse_flotation("31x10.5R15").unwrap();
/// assert_eq!((size.overall_in, size.width_in, size.rim_in), (31.0, 10.5, 15.0));
/// assert!(parse_flotation("31x10.5").is_none());
/// ```
pub fn parse_flotation(value: &str) -> Option<FlotationSize> {
    let caps = FLOTATION_PATTERN.captures(value.trim())?;
    Some(FlotationSize {
        overall_in: caps[1].parse().ok()?,
        width_in: caps[2].parse().ok()?,
        rim_in: caps[3].parse().ok()?,
    })
}

/// Parse a motorcycle `<width>-<rim>` size.
pub fn parse_motorcycle_flotation(value: &str) -> Option<MotorcycleSize> {
    let caps = MOTORCYCLE_PATTERN.captures(value.trim())?;
    Some(MotorcycleSize {
        width_in: caps[1].parse().ok()?,
        rim_in: caps[2].parse().ok()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flotation_with_radial_separator() {
        let size = parse_flotation("31x10.5R15").unwrap();
        assert_eq!(size.overall_in, 31.0);
        assert_eq!(size.width_in, 10.5);
        assert_eq!(size.rim_in, 15.0);
    }

    #[test]
    fn test_flotation_with_dash_separator() {
        let size = parse_flotation("31x10.5-15").unwrap();
        assert_eq!(size.rim_in, 15.0);

        let kart = parse_flotation("10x4.50-5").unwrap();
        assert_eq!((kart.overall_in, kart.width_in, kart.rim_in), (10.0, 4.5, 5.0));
    }

    #[test]
    fn test_flotation_case_and_whitespace() {
        assert!(parse_flotation("  33X12.5r17 ").is_some());
    }

    #[test]
    fn test_flotation_rejects_malformed() {
        assert!(parse_flotation("").is_none());
        assert!(parse_flotation("31x10.5").is_none());
        assert!(parse_flotation("31x10.5Z15").is_none());
        assert!(parse_flotation("205/55R16").is_none());
        assert!(parse_flotation("1.2.3x10R15").is_none());
    }

    #[test]
    fn test_motorcycle_size() {
        let size = parse_motorcycle_flotation("3.00-21").unwrap();
        assert_eq!(size.width_in, 3.0);
        assert_eq!(size.rim_in, 21.0);
        assert!(parse_motorcycle_flotation("31x10.5R15").is_none());
        assert!(parse_motorcycle_flotation("120/70-17").is_none());
    }
}
