//! # Compression Ratio Engine
//!
//! Shared by the displacement and rod-ratio calculators, both of which accept
//! an optional `compression` block next to their bore and stroke.
//!
//! ## Pipeline
//!
//! 1. **Mode inference** - `simple` or `advanced`, see [`CompressionInputs::infer_mode`]
//! 2. **Normalization** - every length to mm and volume to cc, then validation
//!    and simple-mode defaulting ([`CompressionInputs::normalize`])
//! 3. **Analysis** - clearance volume, four-stroke vs two-stroke detection from
//!    port heights, compression and crankcase ratios ([`NormalizedCompression::analyze`])
//!
//! ## Two-Stroke Detection
//!
//! A non-zero exhaust or transfer port height marks a ported (two-stroke)
//! cylinder. Compression only starts once the lowest port closes, so the ratio
//! uses the trapped volume above that port instead of the full swept volume.
//! The crankcase ratio always uses the full swept volume because the whole
//! stroke pumps the crankcase.
//!
//! ## Example
//!
//! ```rust
//! use calc_core::calculations::compression::{CompressionInputs, StrokeCycle};
//! use calc_core::units::ResolvedUnitSystem;
//!
//! let inputs = CompressionInputs {
//!     chamber_volume: 50.0,
//!     gasket_thickness: Some(1.0),
//!     gasket_bore: Some(100.0),
//!     deck_height: Some(0.0),
//!     piston_volume: Some(0.0),
//!     ..Default::default()
//! };
//!
//! let (_, results) = inputs
//!     .evaluate(100.0, 100.0, ResolvedUnitSystem::Metric, "inputs.compression")
//!     .unwrap();
//! assert_eq!(results.compression_ratio, 14.58);
//! assert_eq!(results.compression_mode, StrokeCycle::FourStroke);
//! ```

use serde::{Deserialize, Serialize};

use crate::equations::engine::{
    clearance_volume_cc, compression_ratio, deck_volume_cc, gasket_volume_cc, swept_volume_cc,
    trapped_swept_volume_cc,
};
use crate::errors::{CalcError, CalcResult};
use crate::units::{round2, ResolvedUnitSystem};

/// How much of the clearance volume the user measured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionMode {
    /// Chamber volume only; flat-top piston, no gasket or deck contribution
    Simple,
    /// Chamber plus gasket, deck height and piston volume
    Advanced,
}

/// Operating cycle detected from the port heights
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrokeCycle {
    FourStroke,
    TwoStroke,
}

/// Compression block of a displacement or rod-ratio request.
///
/// Lengths are in the request unit system (mm or in), volumes in cc or cu in.
///
/// ## JSON Example
///
/// ```json
/// {
///   "chamber_volume": 50,
///   "gasket_thickness": 1,
///   "gasket_bore": 100,
///   "deck_height": 0,
///   "piston_volume": 0,
///   "exhaust_port_height": 40,
///   "transfer_port_height": 50,
///   "crankcase_volume": 800
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompressionInputs {
    /// Combustion chamber volume (required, > 0)
    pub chamber_volume: f64,

    /// Explicit mode; inferred from the advanced fields when absent
    #[serde(default)]
    pub mode: Option<CompressionMode>,

    /// Compressed head gasket thickness
    #[serde(default)]
    pub gasket_thickness: Option<f64>,

    /// Head gasket bore
    #[serde(default)]
    pub gasket_bore: Option<f64>,

    /// Piston crown distance below the deck at TDC
    #[serde(default)]
    pub deck_height: Option<f64>,

    /// Dish (positive) or dome (negative) volume
    #[serde(default)]
    pub piston_volume: Option<f64>,

    /// Exhaust port height above BDC (two-stroke)
    #[serde(default)]
    pub exhaust_port_height: Option<f64>,

    /// Transfer port height above BDC (two-stroke)
    #[serde(default)]
    pub transfer_port_height: Option<f64>,

    /// Crankcase volume (two-stroke primary compression)
    #[serde(default)]
    pub crankcase_volume: Option<f64>,
}

/// Clearance-side geometry once the mode is known.
///
/// Simple mode carries nothing: the gasket bore defaults to the cylinder bore
/// and every other contribution is zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClearanceGeometry {
    FlatTop,
    Measured {
        gasket_thickness_mm: f64,
        gasket_bore_mm: f64,
        deck_height_mm: f64,
        piston_volume_cc: f64,
    },
}

impl ClearanceGeometry {
    /// (gasket thickness mm, gasket bore mm, deck height mm, piston volume cc)
    fn dimensions(&self, bore_mm: f64) -> (f64, f64, f64, f64) {
        match *self {
            ClearanceGeometry::FlatTop => (0.0, bore_mm, 0.0, 0.0),
            ClearanceGeometry::Measured {
                gasket_thickness_mm,
                gasket_bore_mm,
                deck_height_mm,
                piston_volume_cc,
            } => (gasket_thickness_mm, gasket_bore_mm, deck_height_mm, piston_volume_cc),
        }
    }
}

/// Compression inputs in canonical units, validated
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedCompression {
    pub mode: CompressionMode,
    pub chamber_cc: f64,
    pub geometry: ClearanceGeometry,
    pub exhaust_port_mm: Option<f64>,
    pub transfer_port_mm: Option<f64>,
    pub crankcase_cc: Option<f64>,
}

/// Raw (unrounded) compression figures in canonical units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressionAnalysis {
    pub compression_ratio: f64,
    pub clearance_cc: f64,
    pub swept_cc: f64,
    pub trapped_cc: Option<f64>,
    pub crankcase_ratio: Option<f64>,
    pub port_height_mm: Option<f64>,
    pub cycle: StrokeCycle,
}

/// Normalized compression inputs echoed back in the response (mm / cc)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompressionNormalizedInputs {
    pub mode: CompressionMode,
    pub chamber_volume: f64,
    pub gasket_thickness: f64,
    pub gasket_bore: f64,
    pub deck_height: f64,
    pub piston_volume: f64,
    pub exhaust_port_height: Option<f64>,
    pub transfer_port_height: Option<f64>,
    pub crankcase_volume: Option<f64>,
}

/// Compression results, rounded, volumes in the response unit system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompressionResults {
    pub compression_ratio: f64,
    pub clearance_volume: f64,
    pub swept_volume: f64,
    pub trapped_volume: Option<f64>,
    pub crankcase_compression_ratio: Option<f64>,
    pub compression_mode: StrokeCycle,
}

impl CompressionInputs {
    fn has_advanced_fields(&self) -> bool {
        self.gasket_thickness.is_some()
            || self.gasket_bore.is_some()
            || self.deck_height.is_some()
            || self.piston_volume.is_some()
    }

    /// Resolve the mode: an explicit tag wins, otherwise any of gasket
    /// thickness, gasket bore, deck height or piston volume means advanced.
    pub fn infer_mode(&self) -> CompressionMode {
        match self.mode {
            Some(mode) => mode,
            None if self.has_advanced_fields() => CompressionMode::Advanced,
            None => CompressionMode::Simple,
        }
    }

    /// Convert to canonical units, validate, and apply simple-mode defaults.
    ///
    /// Validation order:
    /// 1. chamber volume > 0
    /// 2. advanced: gasket thickness, gasket bore, deck height and piston
    ///    volume all present; gasket thickness and bore > 0
    /// 3. crankcase volume, when given, not negative
    pub fn normalize(&self, system: ResolvedUnitSystem, prefix: &str) -> CalcResult<NormalizedCompression> {
        let mode = self.infer_mode();

        let chamber_cc = system.volume_to_cc(self.chamber_volume);
        let gasket_thickness_mm = self.gasket_thickness.map(|v| system.length_to_mm(v));
        let gasket_bore_mm = self.gasket_bore.map(|v| system.length_to_mm(v));
        let deck_height_mm = self.deck_height.map(|v| system.length_to_mm(v));
        let piston_volume_cc = self.piston_volume.map(|v| system.volume_to_cc(v));
        let exhaust_port_mm = self.exhaust_port_height.map(|v| system.length_to_mm(v));
        let transfer_port_mm = self.transfer_port_height.map(|v| system.length_to_mm(v));
        let crankcase_cc = self.crankcase_volume.map(|v| system.volume_to_cc(v));

        if !(chamber_cc > 0.0) {
            return Err(CalcError::invalid_input(
                format!("{prefix}.chamber_volume"),
                self.chamber_volume.to_string(),
                "must be greater than zero",
            ));
        }

        let geometry = match mode {
            CompressionMode::Simple => ClearanceGeometry::FlatTop,
            CompressionMode::Advanced => {
                let require = |value: Option<f64>, name: &str| {
                    value.ok_or_else(|| {
                        CalcError::missing_field(format!("{prefix}.{name}"), "required in advanced compression mode")
                    })
                };
                let gasket_thickness_mm = require(gasket_thickness_mm, "gasket_thickness")?;
                let gasket_bore_mm = require(gasket_bore_mm, "gasket_bore")?;
                let deck_height_mm = require(deck_height_mm, "deck_height")?;
                let piston_volume_cc = require(piston_volume_cc, "piston_volume")?;

                if !(gasket_thickness_mm > 0.0) {
                    return Err(CalcError::invalid_input(
                        format!("{prefix}.gasket_thickness"),
                        gasket_thickness_mm.to_string(),
                        "must be greater than zero",
                    ));
                }
                if !(gasket_bore_mm > 0.0) {
                    return Err(CalcError::invalid_input(
                        format!("{prefix}.gasket_bore"),
                        gasket_bore_mm.to_string(),
                        "must be greater than zero",
                    ));
                }

                ClearanceGeometry::Measured {
                    gasket_thickness_mm,
                    gasket_bore_mm,
                    deck_height_mm,
                    piston_volume_cc,
                }
            }
        };

        let crankcase_cc = match crankcase_cc {
            Some(cc) if cc < 0.0 => {
                return Err(CalcError::invalid_input(
                    format!("{prefix}.crankcase_volume"),
                    cc.to_string(),
                    "must not be negative",
                ))
            }
            Some(cc) if cc == 0.0 => None,
            other => other,
        };

        Ok(NormalizedCompression {
            mode,
            chamber_cc,
            geometry,
            exhaust_port_mm,
            transfer_port_mm,
            crankcase_cc,
        })
    }

    /// Run the whole pipeline and produce the response pieces.
    pub fn evaluate(
        &self,
        bore_mm: f64,
        stroke_mm: f64,
        system: ResolvedUnitSystem,
        prefix: &str,
    ) -> CalcResult<(CompressionNormalizedInputs, CompressionResults)> {
        let normalized = self.normalize(system, prefix)?;
        let analysis = normalized.analyze(bore_mm, stroke_mm, prefix)?;
        tracing::debug!(
            mode = ?normalized.mode,
            cycle = ?analysis.cycle,
            ratio = analysis.compression_ratio,
            "compression evaluated"
        );
        Ok((normalized.echo(bore_mm), analysis.to_results(system)))
    }
}

impl NormalizedCompression {
    /// Lowest non-zero port height and the field it came from
    fn governing_port(&self, prefix: &str) -> Option<(f64, String)> {
        [
            (self.exhaust_port_mm, "exhaust_port_height"),
            (self.transfer_port_mm, "transfer_port_height"),
        ]
        .into_iter()
        .filter_map(|(height, name)| height.filter(|h| *h != 0.0).map(|h| (h, name)))
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(height, name)| (height, format!("{prefix}.{name}")))
    }

    /// Compose the clearance volume and compute the ratios.
    pub fn analyze(&self, bore_mm: f64, stroke_mm: f64, prefix: &str) -> CalcResult<CompressionAnalysis> {
        let (gasket_thickness_mm, gasket_bore_mm, deck_height_mm, piston_volume_cc) = self.geometry.dimensions(bore_mm);

        let gasket_cc = gasket_volume_cc(gasket_bore_mm, gasket_thickness_mm);
        let deck_cc = deck_volume_cc(bore_mm, deck_height_mm);
        let clearance_cc = clearance_volume_cc(self.chamber_cc, gasket_cc, deck_cc, piston_volume_cc);
        if !(clearance_cc > 0.0) {
            return Err(CalcError::invalid_geometry(
                prefix,
                clearance_cc.to_string(),
                "clearance volume must be positive",
            ));
        }

        let swept_cc = swept_volume_cc(bore_mm, stroke_mm);

        let (cycle, trapped_cc, port_height_mm) = match self.governing_port(prefix) {
            Some((port_height_mm, field)) => {
                if port_height_mm <= 0.0 || port_height_mm >= stroke_mm {
                    return Err(CalcError::invalid_geometry(
                        field,
                        port_height_mm.to_string(),
                        "port height must be above zero and below the stroke",
                    ));
                }
                let trapped = trapped_swept_volume_cc(bore_mm, stroke_mm, port_height_mm);
                (StrokeCycle::TwoStroke, Some(trapped), Some(port_height_mm))
            }
            None => (StrokeCycle::FourStroke, None, None),
        };

        let effective_swept_cc = trapped_cc.unwrap_or(swept_cc);
        let crankcase_ratio = match cycle {
            StrokeCycle::TwoStroke => self.crankcase_cc.map(|cc| compression_ratio(swept_cc, cc)),
            StrokeCycle::FourStroke => None,
        };

        Ok(CompressionAnalysis {
            compression_ratio: compression_ratio(effective_swept_cc, clearance_cc),
            clearance_cc,
            swept_cc,
            trapped_cc,
            crankcase_ratio,
            port_height_mm,
            cycle,
        })
    }

    /// Echo of the inputs actually used (mm / cc)
    pub fn echo(&self, bore_mm: f64) -> CompressionNormalizedInputs {
        let (gasket_thickness, gasket_bore, deck_height, piston_volume) = self.geometry.dimensions(bore_mm);
        CompressionNormalizedInputs {
            mode: self.mode,
            chamber_volume: self.chamber_cc,
            gasket_thickness,
            gasket_bore,
            deck_height,
            piston_volume,
            exhaust_port_height: self.exhaust_port_mm,
            transfer_port_height: self.transfer_port_mm,
            crankcase_volume: self.crankcase_cc,
        }
    }
}

impl CompressionAnalysis {
    /// Round and convert volumes to the response unit system
    pub fn to_results(&self, system: ResolvedUnitSystem) -> CompressionResults {
        CompressionResults {
            compression_ratio: round2(self.compression_ratio),
            clearance_volume: round2(system.volume_from_cc(self.clearance_cc)),
            swept_volume: round2(system.volume_from_cc(self.swept_cc)),
            trapped_volume: self.trapped_cc.map(|cc| round2(system.volume_from_cc(cc))),
            crankcase_compression_ratio: self.crankcase_ratio.map(round2),
            compression_mode: self.cycle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const PREFIX: &str = "inputs.compression";

    fn advanced_inputs() -> CompressionInputs {
        CompressionInputs {
            chamber_volume: 50.0,
            gasket_thickness: Some(1.0),
            gasket_bore: Some(100.0),
            deck_height: Some(0.0),
            piston_volume: Some(0.0),
            ..Default::default()
        }
    }

    fn metric(inputs: &CompressionInputs) -> CalcResult<(CompressionNormalizedInputs, CompressionResults)> {
        inputs.evaluate(100.0, 100.0, ResolvedUnitSystem::Metric, PREFIX)
    }

    #[test]
    fn test_mode_inference() {
        let simple = CompressionInputs {
            chamber_volume: 50.0,
            ..Default::default()
        };
        assert_eq!(simple.infer_mode(), CompressionMode::Simple);

        let partial = CompressionInputs {
            chamber_volume: 50.0,
            deck_height: Some(0.2),
            ..Default::default()
        };
        assert_eq!(partial.infer_mode(), CompressionMode::Advanced);

        let explicit = CompressionInputs {
            mode: Some(CompressionMode::Simple),
            ..advanced_inputs()
        };
        assert_eq!(explicit.infer_mode(), CompressionMode::Simple);
    }

    #[test]
    fn test_four_stroke_scenario() {
        let (normalized, results) = metric(&advanced_inputs()).unwrap();
        assert_eq!(normalized.mode, CompressionMode::Advanced);
        assert_eq!(results.compression_mode, StrokeCycle::FourStroke);
        assert_eq!(results.swept_volume, 785.4);
        assert_eq!(results.clearance_volume, 57.85);
        assert_eq!(results.compression_ratio, 14.58);
        assert_eq!(results.trapped_volume, None);
        assert_eq!(results.crankcase_compression_ratio, None);
    }

    #[test]
    fn test_two_stroke_scenario() {
        let inputs = CompressionInputs {
            exhaust_port_height: Some(40.0),
            transfer_port_height: Some(50.0),
            crankcase_volume: Some(800.0),
            ..advanced_inputs()
        };
        let normalized = inputs.normalize(ResolvedUnitSystem::Metric, PREFIX).unwrap();
        let analysis = normalized.analyze(100.0, 100.0, PREFIX).unwrap();

        assert_eq!(analysis.cycle, StrokeCycle::TwoStroke);
        assert_eq!(analysis.port_height_mm, Some(40.0));
        assert_relative_eq!(analysis.trapped_cc.unwrap(), 471.24, epsilon = 0.01);
        // ratio uses trapped volume, crankcase ratio uses full swept volume
        assert_relative_eq!(analysis.compression_ratio, (471.2389 + 57.8540) / 57.8540, epsilon = 1e-3);
        assert_relative_eq!(analysis.crankcase_ratio.unwrap(), (785.3982 + 800.0) / 800.0, epsilon = 1e-3);
    }

    #[test]
    fn test_zero_port_height_counts_as_absent() {
        let inputs = CompressionInputs {
            exhaust_port_height: Some(0.0),
            crankcase_volume: Some(800.0),
            ..advanced_inputs()
        };
        let (_, results) = metric(&inputs).unwrap();
        assert_eq!(results.compression_mode, StrokeCycle::FourStroke);
        assert_eq!(results.crankcase_compression_ratio, None);
    }

    #[test]
    fn test_port_at_or_above_stroke_rejected() {
        let inputs = CompressionInputs {
            transfer_port_height: Some(100.0),
            ..advanced_inputs()
        };
        let err = metric(&inputs).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_GEOMETRY");
        assert_eq!(err.field(), Some("inputs.compression.transfer_port_height"));
    }

    #[test]
    fn test_negative_port_rejected() {
        let inputs = CompressionInputs {
            exhaust_port_height: Some(-5.0),
            transfer_port_height: Some(50.0),
            ..advanced_inputs()
        };
        let err = metric(&inputs).unwrap_err();
        assert_eq!(err.field(), Some("inputs.compression.exhaust_port_height"));
    }

    #[test]
    fn test_chamber_must_be_positive() {
        let inputs = CompressionInputs {
            chamber_volume: 0.0,
            ..advanced_inputs()
        };
        let err = metric(&inputs).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
        assert_eq!(err.field(), Some("inputs.compression.chamber_volume"));
    }

    #[test]
    fn test_advanced_requires_all_fields() {
        let inputs = CompressionInputs {
            chamber_volume: 50.0,
            gasket_thickness: Some(1.0),
            ..Default::default()
        };
        let err = metric(&inputs).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
        assert_eq!(err.field(), Some("inputs.compression.gasket_bore"));
    }

    #[test]
    fn test_advanced_rejects_zero_gasket() {
        let inputs = CompressionInputs {
            gasket_thickness: Some(0.0),
            ..advanced_inputs()
        };
        let err = metric(&inputs).unwrap_err();
        assert_eq!(err.field(), Some("inputs.compression.gasket_thickness"));
    }

    #[test]
    fn test_clearance_must_be_positive() {
        // A dome bigger than the chamber
        let inputs = CompressionInputs {
            piston_volume: Some(-80.0),
            ..advanced_inputs()
        };
        let err = metric(&inputs).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_GEOMETRY");
        assert_eq!(err.field(), Some("inputs.compression"));
    }

    #[test]
    fn test_simple_mode_defaults() {
        let inputs = CompressionInputs {
            chamber_volume: 50.0,
            ..Default::default()
        };
        let (normalized, results) = metric(&inputs).unwrap();
        assert_eq!(normalized.mode, CompressionMode::Simple);
        assert_eq!(normalized.gasket_bore, 100.0);
        assert_eq!(normalized.gasket_thickness, 0.0);
        assert_eq!(results.clearance_volume, 50.0);
        // (785.40 + 50) / 50
        assert_eq!(results.compression_ratio, 16.71);
    }

    #[test]
    fn test_explicit_simple_ignores_advanced_fields() {
        let inputs = CompressionInputs {
            mode: Some(CompressionMode::Simple),
            gasket_thickness: Some(0.0),
            ..advanced_inputs()
        };
        let (normalized, results) = metric(&inputs).unwrap();
        assert_eq!(normalized.gasket_thickness, 0.0);
        assert_eq!(results.clearance_volume, 50.0);
    }

    #[test]
    fn test_negative_crankcase_rejected() {
        let inputs = CompressionInputs {
            exhaust_port_height: Some(40.0),
            crankcase_volume: Some(-1.0),
            ..advanced_inputs()
        };
        let err = metric(&inputs).unwrap_err();
        assert_eq!(err.field(), Some("inputs.compression.crankcase_volume"));
    }

    #[test]
    fn test_imperial_conversion() {
        // 50 cc chamber and 1 mm gasket expressed in imperial units
        let inputs = CompressionInputs {
            chamber_volume: 50.0 / 16.387064,
            gasket_thickness: Some(1.0 / 25.4),
            gasket_bore: Some(100.0 / 25.4),
            deck_height: Some(0.0),
            piston_volume: Some(0.0),
            ..Default::default()
        };
        let (normalized, results) = inputs
            .evaluate(100.0, 100.0, ResolvedUnitSystem::Imperial, PREFIX)
            .unwrap();
        assert_relative_eq!(normalized.chamber_volume, 50.0, epsilon = 1e-9);
        assert_relative_eq!(normalized.gasket_thickness, 1.0, epsilon = 1e-9);
        assert_eq!(results.compression_ratio, 14.58);
        // 785.40 cc = 47.93 cu in
        assert_eq!(results.swept_volume, 47.93);
    }

    #[test]
    fn test_results_serialization() {
        let (_, results) = metric(&advanced_inputs()).unwrap();
        let json = serde_json::to_string(&results).unwrap();
        assert!(json.contains("\"compression_mode\":\"four_stroke\""));
        assert!(json.contains("\"trapped_volume\":null"));
    }

    #[test]
    fn test_inputs_deserialize_with_optional_fields_missing() {
        let inputs: CompressionInputs = serde_json::from_str(r#"{"chamber_volume": 42.5}"#).unwrap();
        assert_eq!(inputs.infer_mode(), CompressionMode::Simple);
        let tagged: CompressionInputs =
            serde_json::from_str(r#"{"chamber_volume": 42.5, "mode": "advanced"}"#).unwrap();
        assert_eq!(tagged.mode, Some(CompressionMode::Advanced));
    }
}
