//! # Chain Drive Formulas
//!
//! Final-drive gear ratio, roller chain length and the sprocket center
//! distance implied by an integer link count.
//!
//! ## Notation
//!
//! - `z1` = Front (countershaft) sprocket teeth
//! - `z2` = Rear (crown) sprocket teeth
//! - `p` = Chain pitch, mm
//! - `L` = Chain length in links (always even)
//! - `C` = Center distance between sprocket axles, mm
//!
//! The link count for a given center distance is
//!
//! ```text
//! L = 2·C/p + (z1 + z2)/2 + (z2 − z1)² / (4π²·C/p)
//! ```
//!
//! which has no closed-form inverse for C, so [`center_distance_mm`] solves it
//! by fixed-point iteration.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

/// Iteration cap for the center distance solver
pub const MAX_ITERATIONS: usize = 1000;

/// Stop when the implied link count is within this many links of the target
pub const LINK_TOLERANCE: f64 = 0.01;

/// Lower clamp for the solved center distance (mm)
pub const MIN_CENTER_DISTANCE_MM: f64 = 620.0;

/// Upper clamp for the solved center distance (mm)
pub const MAX_CENTER_DISTANCE_MM: f64 = 680.0;

/// Step damping for a standalone calculation
pub const WEAR_FACTOR_FRESH: f64 = 1.0;

/// Step damping for the primary side of a baseline comparison (chain stretch)
pub const WEAR_FACTOR_COMPARED: f64 = 0.98;

/// Standard roller chain sizes by code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChainPitch {
    #[serde(rename = "415")]
    C415,
    #[serde(rename = "420")]
    C420,
    #[serde(rename = "428")]
    C428,
    #[serde(rename = "520")]
    C520,
    #[serde(rename = "525")]
    C525,
    #[serde(rename = "530")]
    C530,
    #[serde(rename = "630")]
    C630,
}

impl ChainPitch {
    /// All supported chain codes
    pub const ALL: [ChainPitch; 7] = [
        ChainPitch::C415,
        ChainPitch::C420,
        ChainPitch::C428,
        ChainPitch::C520,
        ChainPitch::C525,
        ChainPitch::C530,
        ChainPitch::C630,
    ];

    /// Look up a chain by its code ("520", "428", ...)
    pub fn from_code(code: &str) -> Option<Self> {
        ChainPitch::ALL.into_iter().find(|pitch| pitch.code() == code)
    }

    pub fn code(&self) -> &'static str {
        match self {
            ChainPitch::C415 => "415",
            ChainPitch::C420 => "420",
            ChainPitch::C428 => "428",
            ChainPitch::C520 => "520",
            ChainPitch::C525 => "525",
            ChainPitch::C530 => "530",
            ChainPitch::C630 => "630",
        }
    }

    /// Pitch length in millimeters (4xx = 1/2", 5xx = 5/8", 6xx = 3/4")
    pub fn pitch_mm(&self) -> f64 {
        match self {
            ChainPitch::C415 | ChainPitch::C420 | ChainPitch::C428 => 12.7,
            ChainPitch::C520 | ChainPitch::C525 | ChainPitch::C530 => 15.875,
            ChainPitch::C630 => 19.05,
        }
    }
}

impl std::fmt::Display for ChainPitch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Final-drive ratio z2 / z1
#[inline]
pub fn gear_ratio(sprocket_teeth: u32, crown_teeth: u32) -> f64 {
    f64::from(crown_teeth) / f64::from(sprocket_teeth)
}

/// Chain length in mm: L · p
#[inline]
pub fn chain_length_mm(chain_links: u32, pitch_mm: f64) -> f64 {
    f64::from(chain_links) * pitch_mm
}

/// Link count implied by a center distance (see module docs)
#[inline]
fn implied_links(center_mm: f64, pitch_mm: f64, z1: f64, z2: f64) -> f64 {
    let c_pitches = center_mm / pitch_mm;
    2.0 * c_pitches + (z1 + z2) / 2.0 + (z2 - z1).powi(2) / (4.0 * PI * PI * c_pitches)
}

/// Outcome of the center distance solver
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CenterDistanceSolution {
    /// Solved center distance after clamping (mm)
    pub center_distance_mm: f64,
    /// Estimate before clamping (mm)
    pub unclamped_mm: f64,
    /// Iterations performed
    pub iterations: usize,
    /// Whether the link tolerance was met before the cap
    pub converged: bool,
}

/// Solve the sprocket center distance for an integer link count.
///
/// Starts from `C0 = (L·p − π·(z1+z2)·p/2) / 2` and repeatedly corrects the
/// estimate by `(L − L_calc)·p·wear_factor/2` until `|L_calc − L| < 0.01`
/// or [`MAX_ITERATIONS`] is reached. Hitting the cap is not an error: the
/// last estimate is used. The result is clamped to
/// [`MIN_CENTER_DISTANCE_MM`]..=[`MAX_CENTER_DISTANCE_MM`].
///
/// # Example
///
/// ```rust
/// use calc_core::equations::sprocket::{center_distance_mm, WEAR_FACTOR_FRESH};
///
/// let solution = center_distance_mm(14, 38, 12.7, 110, WEAR_FACTOR_FRESH);
/// assert!(solution.converged);
/// assert!((620.0..=680.0).contains(&solution.center_distance_mm));
/// ```
pub fn center_distance_mm(
    sprocket_teeth: u32,
    crown_teeth: u32,
    pitch_mm: f64,
    chain_links: u32,
    wear_factor: f64,
) -> CenterDistanceSolution {
    let z1 = f64::from(sprocket_teeth);
    let z2 = f64::from(crown_teeth);
    let links = f64::from(chain_links);

    let mut center = (chain_length_mm(chain_links, pitch_mm) - PI * (z1 + z2) * pitch_mm / 2.0) / 2.0;
    let mut iterations = 0;
    let mut converged = false;

    while iterations < MAX_ITERATIONS {
        iterations += 1;
        let l_calc = implied_links(center, pitch_mm, z1, z2);
        if (l_calc - links).abs() < LINK_TOLERANCE {
            converged = true;
            break;
        }
        center += (links - l_calc) * pitch_mm * wear_factor / 2.0;
    }

    if converged {
        trace!(iterations, center_mm = center, "center distance converged");
    } else {
        warn!(
            sprocket_teeth,
            crown_teeth,
            chain_links,
            center_mm = center,
            "center distance did not converge; using last estimate"
        );
    }

    // min/max rather than clamp: a NaN estimate lands on the upper bound
    let clamped = center.min(MAX_CENTER_DISTANCE_MM).max(MIN_CENTER_DISTANCE_MM);

    CenterDistanceSolution {
        center_distance_mm: clamped,
        unclamped_mm: center,
        iterations,
        converged,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::round2;

    #[test]
    fn test_gear_ratio() {
        assert_eq!(round2(gear_ratio(14, 38)), 2.71);
        assert_eq!(gear_ratio(15, 45), 3.0);
    }

    #[test]
    fn test_pitch_table() {
        assert_eq!(ChainPitch::ALL.len(), 7);
        assert_eq!(ChainPitch::from_code("420").map(|p| p.pitch_mm()), Some(12.7));
        assert_eq!(ChainPitch::from_code("525").map(|p| p.pitch_mm()), Some(15.875));
        assert_eq!(ChainPitch::from_code("630").map(|p| p.pitch_mm()), Some(19.05));
        assert_eq!(ChainPitch::from_code("999"), None);
        assert_eq!(ChainPitch::from_code(""), None);
    }

    #[test]
    fn test_pitch_code_is_matched_verbatim() {
        assert_eq!(ChainPitch::from_code(" 420 "), None);
        assert_eq!(ChainPitch::from_code("420\n"), None);
        assert_eq!(ChainPitch::from_code("#420"), None);
    }

    #[test]
    fn test_chain_length() {
        assert_eq!(round2(chain_length_mm(110, 12.7)), 1397.0);
    }

    #[test]
    fn test_center_distance_clamped_low() {
        // Unclamped solution is ~531 mm for this drive, well below the frame range
        let solution = center_distance_mm(14, 38, 12.7, 110, WEAR_FACTOR_FRESH);
        assert!(solution.converged);
        assert!(solution.unclamped_mm < MIN_CENTER_DISTANCE_MM);
        assert_eq!(solution.center_distance_mm, MIN_CENTER_DISTANCE_MM);
    }

    #[test]
    fn test_center_distance_clamped_high() {
        let solution = center_distance_mm(15, 45, 15.875, 130, WEAR_FACTOR_FRESH);
        assert!(solution.unclamped_mm > MAX_CENTER_DISTANCE_MM);
        assert_eq!(solution.center_distance_mm, MAX_CENTER_DISTANCE_MM);
    }

    #[test]
    fn test_center_distance_inside_range_matches_link_count() {
        // 520 chain, 15/45, 114 links lands inside the clamp window
        let solution = center_distance_mm(15, 45, 15.875, 114, WEAR_FACTOR_FRESH);
        assert!(solution.converged);
        assert!(solution.center_distance_mm > MIN_CENTER_DISTANCE_MM);
        assert!(solution.center_distance_mm < MAX_CENTER_DISTANCE_MM);
        let links = implied_links(solution.center_distance_mm, 15.875, 15.0, 45.0);
        assert!((links - 114.0).abs() < LINK_TOLERANCE);
    }

    #[test]
    fn test_wear_factor_changes_step_not_bounds() {
        let fresh = center_distance_mm(15, 45, 15.875, 114, WEAR_FACTOR_FRESH);
        let worn = center_distance_mm(15, 45, 15.875, 114, WEAR_FACTOR_COMPARED);
        assert!(worn.converged);
        assert!((fresh.center_distance_mm - worn.center_distance_mm).abs() < 1.0);
    }

    #[test]
    fn test_chain_pitch_serialization() {
        assert_eq!(serde_json::to_string(&ChainPitch::C520).unwrap(), "\"520\"");
    }
}
