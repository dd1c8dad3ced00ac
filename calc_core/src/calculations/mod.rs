//! # Engine Calculators
//!
//! One module per calculator. Each follows the same pattern:
//!
//! - `*Inputs` - request inputs in the request unit system (JSON-deserializable)
//! - `*NormalizedInputs` - the values actually used, in mm / cc
//! - `*Results` - rounded results, optionally with baseline diffs
//! - `calculate(request) -> CalcResult<CalcOutput<..>>` - pure calculation function
//!
//! Unit resolution happens once per request in [`CalcRequest::resolve_units`];
//! nothing below that point sees raw user units.
//!
//! ## Available Calculators
//!
//! - [`displacement`] - Engine displacement and bore/stroke class
//! - [`rod_ratio`] - Connecting rod ratios and smoothness
//! - [`sprocket`] - Final-drive ratio, chain length and center distance
//! - [`tires`] - Tire diameter and mounted width
//!
//! [`compression`] is shared by the displacement and rod-ratio calculators.

pub mod compression;
pub mod displacement;
pub mod rod_ratio;
pub mod sprocket;
pub mod tires;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{CalcError, CalcResult};
use crate::units::{ResolvedUnitSystem, UnitSystem};

pub use compression::{CompressionInputs, CompressionMode, CompressionResults, StrokeCycle};
pub use displacement::{DisplacementInputs, DisplacementResults};
pub use rod_ratio::{RodRatioInputs, RodRatioResults};
pub use sprocket::{SprocketInputs, SprocketResults};
pub use tires::{TireInputs, TireResults};

/// Calculator identifiers, as used in routes and responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Calculator {
    #[serde(rename = "displacement")]
    Displacement,
    #[serde(rename = "rl")]
    RodRatio,
    #[serde(rename = "sprocket")]
    Sprocket,
    #[serde(rename = "tires")]
    Tires,
}

impl Calculator {
    pub const ALL: [Calculator; 4] = [
        Calculator::Displacement,
        Calculator::RodRatio,
        Calculator::Sprocket,
        Calculator::Tires,
    ];

    /// Route name
    pub fn name(&self) -> &'static str {
        match self {
            Calculator::Displacement => "displacement",
            Calculator::RodRatio => "rl",
            Calculator::Sprocket => "sprocket",
            Calculator::Tires => "tires",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Calculator::ALL.into_iter().find(|c| c.name() == name)
    }
}

impl std::fmt::Display for Calculator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Display language requested by the client. Accepted and validated; results
/// are language-neutral.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "pt_BR")]
    PtBr,
    #[serde(rename = "en_US")]
    EnUs,
    #[serde(rename = "es_ES")]
    EsEs,
}

/// Request body shared by every calculator.
///
/// ## JSON Example
///
/// ```json
/// {
///   "unit_system": "metric",
///   "language": "en_US",
///   "inputs": { "bore": 58, "stroke": 50, "cylinders": 4 }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalcRequest<I> {
    pub unit_system: UnitSystem,
    #[serde(default)]
    pub language: Option<Language>,
    pub inputs: I,
}

impl<I> CalcRequest<I> {
    pub fn new(unit_system: UnitSystem, inputs: I) -> Self {
        CalcRequest {
            unit_system,
            language: None,
            inputs,
        }
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = Some(language);
        self
    }

    /// Resolve the declared unit system, collecting any warning it produces
    pub fn resolve_units(&self) -> (ResolvedUnitSystem, Vec<String>) {
        let (resolved, warnings) = self.unit_system.resolve();
        if !warnings.is_empty() {
            debug!(declared = ?self.unit_system, resolved = resolved.as_str(), "unit system resolved with warning");
        }
        (resolved, warnings)
    }
}

/// Calculator output before the response envelope is added
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalcOutput<N, R> {
    pub calculator: Calculator,
    pub unit_system: ResolvedUnitSystem,
    pub warnings: Vec<String>,
    pub normalized_inputs: N,
    pub results: R,
}

/// Reject magnitudes that are not strictly positive (NaN included)
pub(crate) fn require_positive(field: impl Into<String>, value: f64) -> CalcResult<f64> {
    if value > 0.0 && value.is_finite() {
        Ok(value)
    } else {
        Err(CalcError::invalid_input(field, value.to_string(), "must be greater than zero"))
    }
}

/// Reject integer counts of zero
pub(crate) fn require_count(field: impl Into<String>, value: u32) -> CalcResult<u32> {
    if value > 0 {
        Ok(value)
    } else {
        Err(CalcError::invalid_input(field, value.to_string(), "must be a positive integer"))
    }
}
