//! # Displacement Calculator
//!
//! Total swept volume of an engine from bore, stroke and cylinder count,
//! with bore/stroke classification and an optional comparison against a
//! known displacement.
//!
//! ## Example
//!
//! ```rust
//! use calc_core::calculations::{displacement, CalcRequest, DisplacementInputs};
//! use calc_core::units::UnitSystem;
//!
//! let request = CalcRequest::new(
//!     UnitSystem::Metric,
//!     DisplacementInputs {
//!         bore: 58.0,
//!         stroke: 50.0,
//!         cylinders: 4,
//!         baseline_cc: Some(500.0),
//!         compression: None,
//!     },
//! );
//!
//! let output = displacement::calculate(&request).unwrap();
//! assert_eq!(output.results.displacement_cc, 528.42);
//! assert_eq!(output.results.diff_percent, Some(5.68));
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::compression::{CompressionInputs, CompressionNormalizedInputs, CompressionResults};
use super::{require_count, require_positive, CalcOutput, CalcRequest, Calculator};
use crate::comparison::Diff;
use crate::equations::{classify_geometry, displacement_cc, GeometryClass};
use crate::errors::CalcResult;
use crate::units::{cc_to_cuin, cc_to_liters, round2};

/// Displacement inputs
///
/// `bore` and `stroke` are in the request unit system; `baseline_cc` is
/// always cubic centimeters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplacementInputs {
    pub bore: f64,
    pub stroke: f64,
    pub cylinders: u32,
    #[serde(default)]
    pub baseline_cc: Option<f64>,
    #[serde(default)]
    pub compression: Option<CompressionInputs>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplacementNormalizedInputs {
    pub bore_mm: f64,
    pub stroke_mm: f64,
    pub cylinders: u32,
    pub baseline_cc: Option<f64>,
    pub compression: Option<CompressionNormalizedInputs>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplacementResults {
    pub displacement_cc: f64,
    pub displacement_l: f64,
    pub displacement_ci: f64,
    pub geometry: GeometryClass,
    /// Percent difference against `baseline_cc`
    pub diff_percent: Option<f64>,
    /// Difference against `baseline_cc` in cc
    pub diff_cc: Option<f64>,
    pub compression: Option<CompressionResults>,
}

pub type DisplacementOutput = CalcOutput<DisplacementNormalizedInputs, DisplacementResults>;

/// Calculate engine displacement
pub fn calculate(request: &CalcRequest<DisplacementInputs>) -> CalcResult<DisplacementOutput> {
    let (system, warnings) = request.resolve_units();
    let inputs = &request.inputs;

    let bore_mm = require_positive("inputs.bore", system.length_to_mm(inputs.bore))?;
    let stroke_mm = require_positive("inputs.stroke", system.length_to_mm(inputs.stroke))?;
    let cylinders = require_count("inputs.cylinders", inputs.cylinders)?;
    let baseline_cc = inputs
        .baseline_cc
        .map(|cc| require_positive("inputs.baseline_cc", cc))
        .transpose()?;

    let total_cc = displacement_cc(bore_mm, stroke_mm, cylinders);
    let geometry = classify_geometry(bore_mm, stroke_mm);
    let diff = baseline_cc.and_then(|baseline| Diff::between(total_cc, baseline)).map(Diff::rounded);

    let compression = inputs
        .compression
        .as_ref()
        .map(|c| c.evaluate(bore_mm, stroke_mm, system, "inputs.compression"))
        .transpose()?;
    let (compression_normalized, compression_results) = match compression {
        Some((normalized, results)) => (Some(normalized), Some(results)),
        None => (None, None),
    };

    debug!(bore_mm, stroke_mm, cylinders, total_cc, %geometry, "displacement calculated");

    Ok(CalcOutput {
        calculator: Calculator::Displacement,
        unit_system: system,
        warnings,
        normalized_inputs: DisplacementNormalizedInputs {
            bore_mm,
            stroke_mm,
            cylinders,
            baseline_cc,
            compression: compression_normalized,
        },
        results: DisplacementResults {
            displacement_cc: round2(total_cc),
            displacement_l: round2(cc_to_liters(total_cc)),
            displacement_ci: round2(cc_to_cuin(total_cc)),
            geometry,
            diff_percent: diff.map(|d| d.percent),
            diff_cc: diff.map(|d| d.absolute),
            compression: compression_results,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::compression::StrokeCycle;
    use crate::units::UnitSystem;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn request(unit_system: UnitSystem, bore: f64, stroke: f64, cylinders: u32) -> CalcRequest<DisplacementInputs> {
        CalcRequest::new(
            unit_system,
            DisplacementInputs {
                bore,
                stroke,
                cylinders,
                baseline_cc: None,
                compression: None,
            },
        )
    }

    #[test]
    fn test_metric_four_cylinder() {
        let output = calculate(&request(UnitSystem::Metric, 58.0, 50.0, 4)).unwrap();
        assert_eq!(output.calculator, Calculator::Displacement);
        assert_eq!(output.results.displacement_cc, 528.42);
        assert_eq!(output.results.displacement_l, 0.53);
        assert_eq!(output.results.displacement_ci, 32.25);
        assert_eq!(output.results.geometry, GeometryClass::Oversquare);
        assert_eq!(output.results.diff_percent, None);
        assert!(output.warnings.is_empty());
    }

    #[test]
    fn test_baseline_diff() {
        let mut req = request(UnitSystem::Metric, 58.0, 50.0, 4);
        req.inputs.baseline_cc = Some(500.0);
        let output = calculate(&req).unwrap();
        assert_eq!(output.results.diff_percent, Some(5.68));
        assert_eq!(output.results.diff_cc, Some(28.42));
        assert_eq!(output.normalized_inputs.baseline_cc, Some(500.0));
    }

    #[test]
    fn test_imperial_inputs_normalized_to_mm() {
        // 4.0" x 3.48" V8 (350 cu in class)
        let output = calculate(&request(UnitSystem::Imperial, 4.0, 3.48, 8)).unwrap();
        assert_relative_eq!(output.normalized_inputs.bore_mm, 101.6, epsilon = 1e-9);
        assert_relative_eq!(output.normalized_inputs.stroke_mm, 88.392, epsilon = 1e-9);
        assert_eq!(output.results.displacement_ci, 349.85);
        assert_eq!(output.results.geometry, GeometryClass::Oversquare);
    }

    #[test]
    fn test_auto_units_warn_and_use_metric() {
        let output = calculate(&request(UnitSystem::Auto, 58.0, 50.0, 4)).unwrap();
        assert_eq!(output.unit_system.as_str(), "metric");
        assert_eq!(output.warnings.len(), 1);
        assert_eq!(output.results.displacement_cc, 528.42);
    }

    #[test]
    fn test_rejects_non_positive_inputs() {
        let err = calculate(&request(UnitSystem::Metric, 0.0, 50.0, 4)).unwrap_err();
        assert_eq!(err.field(), Some("inputs.bore"));

        let err = calculate(&request(UnitSystem::Metric, 58.0, 50.0, 0)).unwrap_err();
        assert_eq!(err.field(), Some("inputs.cylinders"));

        let mut req = request(UnitSystem::Metric, 58.0, 50.0, 4);
        req.inputs.baseline_cc = Some(-1.0);
        assert_eq!(calculate(&req).unwrap_err().field(), Some("inputs.baseline_cc"));
    }

    #[test]
    fn test_with_two_stroke_compression() {
        let mut req = request(UnitSystem::Metric, 100.0, 100.0, 1);
        req.inputs.compression = Some(CompressionInputs {
            chamber_volume: 50.0,
            gasket_thickness: Some(1.0),
            gasket_bore: Some(100.0),
            deck_height: Some(0.0),
            piston_volume: Some(0.0),
            exhaust_port_height: Some(40.0),
            transfer_port_height: Some(50.0),
            ..Default::default()
        });
        let output = calculate(&req).unwrap();
        let compression = output.results.compression.unwrap();
        assert_eq!(compression.compression_mode, StrokeCycle::TwoStroke);
        assert_eq!(compression.trapped_volume, Some(471.24));
        assert!(output.normalized_inputs.compression.is_some());
    }

    #[test]
    fn test_compression_error_aborts_calculation() {
        let mut req = request(UnitSystem::Metric, 100.0, 100.0, 1);
        req.inputs.compression = Some(CompressionInputs {
            chamber_volume: -5.0,
            ..Default::default()
        });
        let err = calculate(&req).unwrap_err();
        assert_eq!(err.field(), Some("inputs.compression.chamber_volume"));
    }

    #[test]
    fn test_request_from_json() {
        let req: CalcRequest<DisplacementInputs> = serde_json::from_str(
            r#"{"unit_system": "metric", "inputs": {"bore": 58, "stroke": 50, "cylinders": 4}}"#,
        )
        .unwrap();
        let output = calculate(&req).unwrap();
        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["calculator"], "displacement");
        assert_eq!(json["results"]["geometry"], "oversquare");
        assert!(json["results"]["compression"].is_null());
    }

    proptest! {
        #[test]
        fn prop_calculation_is_idempotent(
            bore in 20.0f64..150.0,
            stroke in 20.0f64..150.0,
            cylinders in 1u32..16,
        ) {
            let req = request(UnitSystem::Metric, bore, stroke, cylinders);
            let first = serde_json::to_string(&calculate(&req).unwrap()).unwrap();
            let second = serde_json::to_string(&calculate(&req).unwrap()).unwrap();
            prop_assert_eq!(first, second);
        }
    }
}
