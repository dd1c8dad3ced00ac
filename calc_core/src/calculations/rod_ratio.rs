//! # Rod Ratio Calculator
//!
//! Crank radius to rod length (R/L) and rod length to stroke ratios for a
//! single cylinder, with smoothness and bore/stroke classification.
//!
//! A short rod relative to the stroke raises secondary piston acceleration;
//! [`Smoothness`] buckets the R/L ratio accordingly.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::compression::{CompressionInputs, CompressionNormalizedInputs, CompressionResults};
use super::{require_positive, CalcOutput, CalcRequest, Calculator};
use crate::comparison::Diff;
use crate::equations::{
    classify_geometry, classify_smoothness, displacement_cc, rl_ratio, rod_stroke_ratio, GeometryClass, Smoothness,
};
use crate::errors::CalcResult;
use crate::units::{round2, ResolvedUnitSystem};

/// Cylinder dimensions compared against
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RodRatioBaseline {
    pub bore: f64,
    pub stroke: f64,
    pub rod_length: f64,
}

/// Rod ratio inputs; lengths in the request unit system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RodRatioInputs {
    pub bore: f64,
    pub stroke: f64,
    pub rod_length: f64,
    #[serde(default)]
    pub baseline: Option<RodRatioBaseline>,
    #[serde(default)]
    pub compression: Option<CompressionInputs>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RodRatioNormalizedInputs {
    pub bore_mm: f64,
    pub stroke_mm: f64,
    pub rod_length_mm: f64,
    pub baseline: Option<Box<RodRatioNormalizedInputs>>,
    #[serde(default)]
    pub compression: Option<CompressionNormalizedInputs>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RodRatioResults {
    pub rl_ratio: f64,
    pub rod_stroke_ratio: f64,
    /// Single-cylinder displacement in cc
    pub displacement_cc: f64,
    pub geometry: GeometryClass,
    pub smoothness: Smoothness,
    pub diff_rl_percent: Option<f64>,
    pub diff_rl_absolute: Option<f64>,
    pub diff_displacement_percent: Option<f64>,
    pub diff_displacement_cc: Option<f64>,
    pub compression: Option<CompressionResults>,
}

pub type RodRatioOutput = CalcOutput<RodRatioNormalizedInputs, RodRatioResults>;

/// One side of the comparison, in mm
#[derive(Debug, Clone, Copy)]
struct Cylinder {
    bore_mm: f64,
    stroke_mm: f64,
    rod_length_mm: f64,
}

impl Cylinder {
    fn normalize(
        bore: f64,
        stroke: f64,
        rod_length: f64,
        system: ResolvedUnitSystem,
        prefix: &str,
    ) -> CalcResult<Self> {
        Ok(Cylinder {
            bore_mm: require_positive(format!("{prefix}bore"), system.length_to_mm(bore))?,
            stroke_mm: require_positive(format!("{prefix}stroke"), system.length_to_mm(stroke))?,
            rod_length_mm: require_positive(format!("{prefix}rod_length"), system.length_to_mm(rod_length))?,
        })
    }

    fn rl_ratio(&self) -> f64 {
        rl_ratio(self.stroke_mm, self.rod_length_mm)
    }

    fn displacement_cc(&self) -> f64 {
        displacement_cc(self.bore_mm, self.stroke_mm, 1)
    }

    fn echo(&self) -> RodRatioNormalizedInputs {
        RodRatioNormalizedInputs {
            bore_mm: self.bore_mm,
            stroke_mm: self.stroke_mm,
            rod_length_mm: self.rod_length_mm,
            baseline: None,
            compression: None,
        }
    }
}

/// Calculate rod ratios
///
/// ```rust
/// use calc_core::calculations::{rod_ratio, CalcRequest, RodRatioInputs};
/// use calc_core::equations::Smoothness;
/// use calc_core::units::UnitSystem;
///
/// let request = CalcRequest::new(
///     UnitSystem::Metric,
///     RodRatioInputs { bore: 58.0, stroke: 50.0, rod_length: 100.0, baseline: None, compression: None },
/// );
/// let output = rod_ratio::calculate(&request).unwrap();
/// assert_eq!(output.results.rl_ratio, 0.25);
/// assert_eq!(output.results.smoothness, Smoothness::Normal);
/// ```
pub fn calculate(request: &CalcRequest<RodRatioInputs>) -> CalcResult<RodRatioOutput> {
    let (system, warnings) = request.resolve_units();
    let inputs = &request.inputs;

    let current = Cylinder::normalize(inputs.bore, inputs.stroke, inputs.rod_length, system, "inputs.")?;
    let baseline = inputs
        .baseline
        .map(|b| Cylinder::normalize(b.bore, b.stroke, b.rod_length, system, "inputs.baseline."))
        .transpose()?;

    let rl = current.rl_ratio();
    let cc = current.displacement_cc();

    let rl_diff = baseline.and_then(|b| Diff::between(rl, b.rl_ratio())).map(Diff::rounded);
    let cc_diff = baseline
        .and_then(|b| Diff::between(cc, b.displacement_cc()))
        .map(Diff::rounded);

    let compression = inputs
        .compression
        .as_ref()
        .map(|c| c.evaluate(current.bore_mm, current.stroke_mm, system, "inputs.compression"))
        .transpose()?;
    let (compression_normalized, compression_results) = match compression {
        Some((normalized, results)) => (Some(normalized), Some(results)),
        None => (None, None),
    };

    debug!(rl_ratio = rl, displacement_cc = cc, has_baseline = baseline.is_some(), "rod ratio calculated");

    let mut normalized_inputs = current.echo();
    normalized_inputs.baseline = baseline.map(|b| Box::new(b.echo()));
    normalized_inputs.compression = compression_normalized;

    Ok(CalcOutput {
        calculator: Calculator::RodRatio,
        unit_system: system,
        warnings,
        normalized_inputs,
        results: RodRatioResults {
            rl_ratio: round2(rl),
            rod_stroke_ratio: round2(rod_stroke_ratio(current.stroke_mm, current.rod_length_mm)),
            displacement_cc: round2(cc),
            geometry: classify_geometry(current.bore_mm, current.stroke_mm),
            smoothness: classify_smoothness(rl),
            diff_rl_percent: rl_diff.map(|d| d.percent),
            diff_rl_absolute: rl_diff.map(|d| d.absolute),
            diff_displacement_percent: cc_diff.map(|d| d.percent),
            diff_displacement_cc: cc_diff.map(|d| d.absolute),
            compression: compression_results,
        },
    })
}
