//! # Sprocket Calculator
//!
//! Final-drive ratio from front/rear teeth, and, when a chain pitch and link
//! count are both given, chain length and sprocket center distance.
//!
//! Results are unit-system independent: lengths are always reported in both
//! millimeters and inches.
//!
//! ## Baseline Comparison
//!
//! The ratio is always compared. Chain length and center distance are only
//! compared when both sides define them. The primary center distance of a
//! compared drive is solved with [`WEAR_FACTOR_COMPARED`]; the baseline's own
//! solve uses [`WEAR_FACTOR_FRESH`].

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{require_count, CalcOutput, CalcRequest, Calculator};
use crate::comparison::Diff;
use crate::equations::sprocket::{WEAR_FACTOR_COMPARED, WEAR_FACTOR_FRESH};
use crate::equations::{center_distance_mm, chain_length_mm, gear_ratio, ChainPitch};
use crate::errors::{CalcError, CalcResult};
use crate::units::{mm_to_inches, round2};

/// Drive configuration compared against
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SprocketBaseline {
    pub sprocket_teeth: u32,
    pub crown_teeth: u32,
    #[serde(default)]
    pub chain_pitch: Option<String>,
    #[serde(default)]
    pub chain_links: Option<u32>,
}

/// Sprocket inputs
///
/// ## JSON Example
///
/// ```json
/// {
///   "sprocket_teeth": 14,
///   "crown_teeth": 38,
///   "chain_pitch": "420",
///   "chain_links": 110
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SprocketInputs {
    pub sprocket_teeth: u32,
    pub crown_teeth: u32,
    #[serde(default)]
    pub chain_pitch: Option<String>,
    #[serde(default)]
    pub chain_links: Option<u32>,
    #[serde(default)]
    pub baseline: Option<SprocketBaseline>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SprocketNormalizedInputs {
    pub sprocket_teeth: u32,
    pub crown_teeth: u32,
    pub chain_pitch: Option<ChainPitch>,
    pub chain_links: Option<u32>,
    pub baseline: Option<Box<SprocketNormalizedInputs>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SprocketResults {
    pub ratio: f64,
    pub chain_length_mm: Option<f64>,
    pub chain_length_in: Option<f64>,
    pub center_distance_mm: Option<f64>,
    pub center_distance_in: Option<f64>,
    pub diff_ratio_percent: Option<f64>,
    pub diff_ratio_absolute: Option<f64>,
    pub diff_chain_length_percent: Option<f64>,
    /// mm
    pub diff_chain_length_absolute: Option<f64>,
    pub diff_center_distance_percent: Option<f64>,
    /// mm
    pub diff_center_distance_absolute: Option<f64>,
}

pub type SprocketOutput = CalcOutput<SprocketNormalizedInputs, SprocketResults>;

/// Validated drive, one side of the comparison
#[derive(Debug, Clone, Copy, PartialEq)]
struct Drive {
    sprocket_teeth: u32,
    crown_teeth: u32,
    chain_pitch: Option<ChainPitch>,
    chain_links: Option<u32>,
}

/// Chain-dependent figures of one drive, in mm
#[derive(Debug, Clone, Copy, PartialEq)]
struct ChainGeometry {
    length_mm: f64,
    center_distance_mm: f64,
}

impl Drive {
    fn validate(
        sprocket_teeth: u32,
        crown_teeth: u32,
        chain_pitch: Option<&str>,
        chain_links: Option<u32>,
        prefix: &str,
    ) -> CalcResult<Self> {
        let sprocket_teeth = require_count(format!("{prefix}sprocket_teeth"), sprocket_teeth)?;
        let crown_teeth = require_count(format!("{prefix}crown_teeth"), crown_teeth)?;

        let chain_pitch = chain_pitch
            .map(|code| {
                ChainPitch::from_code(code).ok_or_else(|| {
                    CalcError::invalid_input(format!("{prefix}chain_pitch"), code, "invalid chain pitch")
                })
            })
            .transpose()?;

        if let Some(links) = chain_links {
            let field = format!("{prefix}chain_links");
            require_count(field.as_str(), links)?;
            if links % 2 != 0 {
                return Err(CalcError::invalid_input(field, links.to_string(), "must be an even integer"));
            }
        }

        Ok(Drive {
            sprocket_teeth,
            crown_teeth,
            chain_pitch,
            chain_links,
        })
    }

    fn ratio(&self) -> f64 {
        gear_ratio(self.sprocket_teeth, self.crown_teeth)
    }

    /// `None` unless both pitch and link count are known
    fn chain(&self, wear_factor: f64) -> Option<ChainGeometry> {
        let pitch_mm = self.chain_pitch?.pitch_mm();
        let links = self.chain_links?;
        let solution = center_distance_mm(self.sprocket_teeth, self.crown_teeth, pitch_mm, links, wear_factor);
        Some(ChainGeometry {
            length_mm: chain_length_mm(links, pitch_mm),
            center_distance_mm: solution.center_distance_mm,
        })
    }

    fn echo(&self) -> SprocketNormalizedInputs {
        SprocketNormalizedInputs {
            sprocket_teeth: self.sprocket_teeth,
            crown_teeth: self.crown_teeth,
            chain_pitch: self.chain_pitch,
            chain_links: self.chain_links,
            baseline: None,
        }
    }
}

/// Calculate sprocket gearing
///
/// ```rust
/// use calc_core::calculations::{sprocket, CalcRequest, SprocketInputs};
/// use calc_core::units::UnitSystem;
///
/// let request = CalcRequest::new(
///     UnitSystem::Metric,
///     SprocketInputs {
///         sprocket_teeth: 14,
///         crown_teeth: 38,
///         chain_pitch: Some("420".to_string()),
///         chain_links: Some(110),
///         baseline: None,
///     },
/// );
/// let output = sprocket::calculate(&request).unwrap();
/// assert_eq!(output.results.ratio, 2.71);
/// assert_eq!(output.results.chain_length_mm, Some(1397.0));
/// ```
pub fn calculate(request: &CalcRequest<SprocketInputs>) -> CalcResult<SprocketOutput> {
    let (system, warnings) = request.resolve_units();
    let inputs = &request.inputs;

    let current = Drive::validate(
        inputs.sprocket_teeth,
        inputs.crown_teeth,
        inputs.chain_pitch.as_deref(),
        inputs.chain_links,
        "inputs.",
    )?;
    let baseline = inputs
        .baseline
        .as_ref()
        .map(|b| {
            Drive::validate(
                b.sprocket_teeth,
                b.crown_teeth,
                b.chain_pitch.as_deref(),
                b.chain_links,
                "inputs.baseline.",
            )
        })
        .transpose()?;

    let ratio = current.ratio();
    let wear_factor = if baseline.is_some() {
        WEAR_FACTOR_COMPARED
    } else {
        WEAR_FACTOR_FRESH
    };
    let chain = current.chain(wear_factor);
    let baseline_chain = baseline.and_then(|b| b.chain(WEAR_FACTOR_FRESH));

    let ratio_diff = baseline.and_then(|b| Diff::between(ratio, b.ratio())).map(Diff::rounded);
    let length_diff = Diff::between_optional(chain.map(|c| c.length_mm), baseline_chain.map(|c| c.length_mm))
        .map(Diff::rounded);
    let center_diff = Diff::between_optional(
        chain.map(|c| c.center_distance_mm),
        baseline_chain.map(|c| c.center_distance_mm),
    )
    .map(Diff::rounded);

    debug!(ratio, ?chain, has_baseline = baseline.is_some(), "sprocket calculated");

    let mut normalized_inputs = current.echo();
    normalized_inputs.baseline = baseline.map(|b| Box::new(b.echo()));

    Ok(CalcOutput {
        calculator: Calculator::Sprocket,
        unit_system: system,
        warnings,
        normalized_inputs,
        results: SprocketResults {
            ratio: round2(ratio),
            chain_length_mm: chain.map(|c| round2(c.length_mm)),
            chain_length_in: chain.map(|c| round2(mm_to_inches(c.length_mm))),
            center_distance_mm: chain.map(|c| round2(c.center_distance_mm)),
            center_distance_in: chain.map(|c| round2(mm_to_inches(c.center_distance_mm))),
            diff_ratio_percent: ratio_diff.map(|d| d.percent),
            diff_ratio_absolute: ratio_diff.map(|d| d.absolute),
            diff_chain_length_percent: length_diff.map(|d| d.percent),
            diff_chain_length_absolute: length_diff.map(|d| d.absolute),
            diff_center_distance_percent: center_diff.map(|d| d.percent),
            diff_center_distance_absolute: center_diff.map(|d| d.absolute),
        },
    })
}
