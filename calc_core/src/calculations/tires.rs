//! # Tire Calculator
//!
//! Overall diameter and mounted width of a tire given either metric sizing
//! (`width_mm` / `aspect_percent` on `rim_in`) or a flotation size string.
//! Every tire, baseline included, is checked against the fitment catalog
//! before anything is computed.
//!
//! ## Units
//!
//! Inputs are fixed regardless of the request unit system: `rim_in` and
//! `rim_width_in` in inches, `width_mm` in millimeters. Only the results
//! (`diameter`, `width` and the absolute diffs) follow the resolved system.
//!
//! ## Resolution Order
//!
//! 1. Flotation offered for the vehicle type
//! 2. Flotation string format (`InvalidFormat`)
//! 3. Catalog membership (`InvalidCombination`)
//! 4. Rim width > 0

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{require_positive, CalcOutput, CalcRequest, Calculator};
use crate::comparison::Diff;
use crate::equations::{assembly_width_mm, diameter_mm};
use crate::errors::{CalcError, CalcResult};
use crate::fitment::{FitmentCatalog, FitmentQuery, VehicleType};
use crate::tire_size::{parse_flotation, parse_motorcycle_flotation};
use crate::units::{inches_to_mm, round2, ResolvedUnitSystem};

/// Aspect ratio bounds accepted in metric sizing
pub const MIN_ASPECT_PERCENT: f64 = 10.0;
pub const MAX_ASPECT_PERCENT: f64 = 100.0;

/// One tire as submitted
///
/// ## JSON Example
///
/// ```json
/// { "vehicle_type": "LightTruck", "rim_in": 17, "flotation": "33x12.5R17" }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TireSpec {
    pub vehicle_type: VehicleType,
    pub rim_in: f64,
    #[serde(default)]
    pub width_mm: Option<f64>,
    #[serde(default)]
    pub aspect_percent: Option<f64>,
    #[serde(default)]
    pub flotation: Option<String>,
    #[serde(default)]
    pub rim_width_in: Option<f64>,
}

/// Tire inputs: the tire plus an optional baseline tire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TireInputs {
    #[serde(flatten)]
    pub tire: TireSpec,
    #[serde(default)]
    pub baseline: Option<TireSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TireNormalizedInputs {
    pub vehicle_type: VehicleType,
    pub rim_in: f64,
    pub width_mm: Option<f64>,
    pub aspect_percent: Option<f64>,
    pub flotation: Option<String>,
    pub rim_width_in: Option<f64>,
    pub baseline: Option<Box<TireNormalizedInputs>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TireResults {
    /// Overall diameter (mm or in)
    pub diameter: f64,
    /// Mounted assembly width (mm or in)
    pub width: f64,
    pub diff_diameter: Option<f64>,
    pub diff_diameter_percent: Option<f64>,
    pub diff_width: Option<f64>,
    pub diff_width_percent: Option<f64>,
}

pub type TireOutput = CalcOutput<TireNormalizedInputs, TireResults>;

/// How a tire's geometry was given
#[derive(Debug, Clone, Copy, PartialEq)]
enum Sizing<'a> {
    Metric { width_mm: f64, aspect_percent: f64 },
    Flotation(&'a str),
}

/// Resolved tire dimensions in mm
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TireGeometry {
    pub diameter_mm: f64,
    pub assembly_width_mm: f64,
}

impl TireSpec {
    fn sizing(&self, prefix: &str) -> CalcResult<Sizing<'_>> {
        if let Some(code) = self.flotation.as_deref().filter(|code| !code.is_empty()) {
            return Ok(Sizing::Flotation(code));
        }

        let width_mm = self.width_mm.ok_or_else(|| {
            CalcError::missing_field(format!("{prefix}width_mm"), "required when flotation is not provided")
        })?;
        let aspect_percent = self.aspect_percent.ok_or_else(|| {
            CalcError::missing_field(format!("{prefix}aspect_percent"), "required when flotation is not provided")
        })?;

        let width_mm = require_positive(format!("{prefix}width_mm"), width_mm)?;
        if !(MIN_ASPECT_PERCENT..=MAX_ASPECT_PERCENT).contains(&aspect_percent) {
            return Err(CalcError::invalid_input(
                format!("{prefix}aspect_percent"),
                aspect_percent.to_string(),
                "must be between 10 and 100",
            ));
        }

        Ok(Sizing::Metric {
            width_mm,
            aspect_percent,
        })
    }

    /// Validate against the catalog and compute diameter and mounted width.
    ///
    /// `prefix` is prepended to field names in errors (`"inputs."`,
    /// `"inputs.baseline."`).
    pub fn resolve(&self, catalog: &FitmentCatalog, prefix: &str) -> CalcResult<TireGeometry> {
        let rim_in = require_positive(format!("{prefix}rim_in"), self.rim_in)?;
        let sizing = self.sizing(prefix)?;

        let (diameter, width_mm, query) = match sizing {
            Sizing::Flotation(code) => {
                if !self.vehicle_type.allows_flotation() {
                    return Err(CalcError::invalid_combination(
                        format!("{prefix}flotation"),
                        code,
                        "flotation allowed only for LightTruck/Kart/Kartcross/Motorcycle",
                    ));
                }
                let invalid_format =
                    || CalcError::invalid_format(format!("{prefix}flotation"), code, "invalid flotation format");

                let (diameter, width_mm) = if self.vehicle_type.uses_motorcycle_sizing() {
                    let size = parse_motorcycle_flotation(code).ok_or_else(invalid_format)?;
                    let width_mm = inches_to_mm(size.width_in);
                    (diameter_mm(size.rim_in, width_mm, 100.0), width_mm)
                } else {
                    let size = parse_flotation(code).ok_or_else(invalid_format)?;
                    (inches_to_mm(size.overall_in), inches_to_mm(size.width_in))
                };
                (diameter, width_mm, FitmentQuery::Flotation(code))
            }
            Sizing::Metric {
                width_mm,
                aspect_percent,
            } => (
                diameter_mm(rim_in, width_mm, aspect_percent),
                width_mm,
                FitmentQuery::Aspect {
                    width_mm,
                    aspect_percent,
                },
            ),
        };

        catalog.validate(self.vehicle_type, rim_in, query, prefix)?;

        let rim_width_in = self
            .rim_width_in
            .map(|w| require_positive(format!("{prefix}rim_width_in"), w))
            .transpose()?;

        Ok(TireGeometry {
            diameter_mm: diameter,
            assembly_width_mm: assembly_width_mm(width_mm, rim_width_in),
        })
    }

    fn echo(&self) -> TireNormalizedInputs {
        TireNormalizedInputs {
            vehicle_type: self.vehicle_type,
            rim_in: self.rim_in,
            width_mm: self.width_mm,
            aspect_percent: self.aspect_percent,
            flotation: self.flotation.clone(),
            rim_width_in: self.rim_width_in,
            baseline: None,
        }
    }
}

fn to_output_length(system: ResolvedUnitSystem, mm: f64) -> f64 {
    round2(system.length_from_mm(mm))
}

/// Calculate tire diameter and width
///
/// ```rust
/// use calc_core::calculations::{tires, CalcRequest, TireInputs};
/// use calc_core::fitment::FitmentCatalog;
///
/// let catalog = FitmentCatalog::builtin().unwrap();
/// let request: CalcRequest<TireInputs> = serde_json::from_str(
///     r#"{"unit_system": "metric",
///         "inputs": {"vehicle_type": "Car", "rim_in": 16, "width_mm": 205, "aspect_percent": 55}}"#,
/// ).unwrap();
///
/// let output = tires::calculate(&request, &catalog).unwrap();
/// assert_eq!(output.results.diameter, 631.9);
/// assert_eq!(output.results.width, 205.0);
/// ```
pub fn calculate(request: &CalcRequest<TireInputs>, catalog: &FitmentCatalog) -> CalcResult<TireOutput> {
    let (system, warnings) = request.resolve_units();
    let inputs = &request.inputs;

    let current = inputs.tire.resolve(catalog, "inputs.")?;
    let baseline = inputs
        .baseline
        .as_ref()
        .map(|b| b.resolve(catalog, "inputs.baseline."))
        .transpose()?;

    let diameter_diff = baseline.and_then(|b| Diff::between(current.diameter_mm, b.diameter_mm));
    let width_diff = baseline.and_then(|b| Diff::between(current.assembly_width_mm, b.assembly_width_mm));
    let to_output = |diff: Diff| diff.scale_absolute(|mm| system.length_from_mm(mm)).rounded();
    let diameter_diff = diameter_diff.map(to_output);
    let width_diff = width_diff.map(to_output);

    debug!(
        vehicle = %inputs.tire.vehicle_type,
        diameter_mm = current.diameter_mm,
        width_mm = current.assembly_width_mm,
        "tire calculated"
    );

    let mut normalized_inputs = inputs.tire.echo();
    normalized_inputs.baseline = inputs.baseline.as_ref().map(|b| Box::new(b.echo()));

    Ok(CalcOutput {
        calculator: Calculator::Tires,
        unit_system: system,
        warnings,
        normalized_inputs,
        results: TireResults {
            diameter: to_output_length(system, current.diameter_mm),
            width: to_output_length(system, current.assembly_width_mm),
            diff_diameter: diameter_diff.map(|d| d.absolute),
            diff_diameter_percent: diameter_diff.map(|d| d.percent),
            diff_width: width_diff.map(|d| d.absolute),
            diff_width_percent: width_diff.map(|d| d.percent),
        },
    })
}
