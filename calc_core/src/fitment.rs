//! # Tire Fitment Catalog
//!
//! Permitted rim / width / aspect / flotation combinations per vehicle type.
//! The built-in catalog is `data/tires.toml`, embedded at compile time; a
//! replacement can be loaded from disk through [`FitmentCatalog::from_path`].
//!
//! ## Layout
//!
//! ```toml
//! [LightTruck."17"."285"]
//! aspects = [70]
//! flotation = ["33x12.5R17", "35x12.5R17"]
//! ```
//!
//! Rim and width keys never carry a trailing `.0` (`"17"`, `"17.5"`).

use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

const BUILTIN_CATALOG: &str = include_str!("../data/tires.toml");

/// Vehicle categories the catalog knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum VehicleType {
    Car,
    Motorcycle,
    LightTruck,
    TruckCommercial,
    Kart,
    Kartcross,
}

impl VehicleType {
    pub const ALL: [VehicleType; 6] = [
        VehicleType::Car,
        VehicleType::Motorcycle,
        VehicleType::LightTruck,
        VehicleType::TruckCommercial,
        VehicleType::Kart,
        VehicleType::Kartcross,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            VehicleType::Car => "Car",
            VehicleType::Motorcycle => "Motorcycle",
            VehicleType::LightTruck => "LightTruck",
            VehicleType::TruckCommercial => "TruckCommercial",
            VehicleType::Kart => "Kart",
            VehicleType::Kartcross => "Kartcross",
        }
    }

    /// Whether flotation sizing is offered for this vehicle type
    pub fn allows_flotation(&self) -> bool {
        matches!(
            self,
            VehicleType::LightTruck | VehicleType::Kart | VehicleType::Kartcross | VehicleType::Motorcycle
        )
    }

    /// Motorcycles use `<width>-<rim>` inch sizing instead of `<overall>x<width>R<rim>`
    pub fn uses_motorcycle_sizing(&self) -> bool {
        matches!(self, VehicleType::Motorcycle)
    }
}

impl std::fmt::Display for VehicleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for VehicleType {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VehicleType::ALL
            .into_iter()
            .find(|v| v.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CalcError::invalid_input("vehicle_type", s, "unknown vehicle type"))
    }
}

/// Options for one section width on one rim
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WidthFitment {
    #[serde(default)]
    pub aspects: Vec<f64>,
    #[serde(default)]
    pub flotation: Vec<String>,
}

/// Widths offered on one rim, keyed by width in mm
pub type RimFitment = BTreeMap<String, WidthFitment>;

/// Which sizing the caller resolved the tire with
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FitmentQuery<'a> {
    Aspect { width_mm: f64, aspect_percent: f64 },
    Flotation(&'a str),
}

/// Catalog key for a rim diameter or width: `17.0` -> `"17"`, `17.5` -> `"17.5"`
pub fn catalog_key(value: f64) -> String {
    // f64 Display already omits a zero fraction
    format!("{value}")
}

/// Vehicle-keyed fitment catalog
#[derive(Debug, Clone, PartialEq)]
pub struct FitmentCatalog {
    vehicles: BTreeMap<VehicleType, BTreeMap<String, RimFitment>>,
}

impl FitmentCatalog {
    /// Catalog shipped with the crate
    pub fn builtin() -> CalcResult<Self> {
        Self::from_toml_str(BUILTIN_CATALOG)
    }

    /// Parse a catalog from TOML text
    pub fn from_toml_str(text: &str) -> CalcResult<Self> {
        let raw: BTreeMap<String, BTreeMap<String, RimFitment>> =
            toml::from_str(text).map_err(|e| CalcError::serialization(format!("fitment catalog: {e}")))?;

        let mut vehicles = BTreeMap::new();
        for (name, rims) in raw {
            let vehicle: VehicleType = name.parse()?;
            vehicles.insert(vehicle, rims);
        }

        Ok(FitmentCatalog { vehicles })
    }

    /// Load a catalog from a TOML file
    pub fn from_path(path: impl AsRef<Path>) -> CalcResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| CalcError::file_error("read", path.display().to_string(), e.to_string()))?;
        Self::from_toml_str(&text)
    }

    pub fn vehicles(&self) -> impl Iterator<Item = VehicleType> + '_ {
        self.vehicles.keys().copied()
    }

    /// Rim diameters offered for a vehicle, ascending
    pub fn rims(&self, vehicle: VehicleType) -> Vec<f64> {
        let mut rims: Vec<f64> = self
            .vehicles
            .get(&vehicle)
            .map(|rims| rims.keys().filter_map(|k| k.parse().ok()).collect())
            .unwrap_or_default();
        rims.sort_by(f64::total_cmp);
        rims
    }

    /// Widths offered on a rim, ascending
    pub fn widths(&self, vehicle: VehicleType, rim_in: f64) -> Vec<f64> {
        let mut widths: Vec<f64> = self
            .rim(vehicle, rim_in)
            .map(|widths| widths.keys().filter_map(|k| k.parse().ok()).collect())
            .unwrap_or_default();
        widths.sort_by(f64::total_cmp);
        widths
    }

    pub fn rim(&self, vehicle: VehicleType, rim_in: f64) -> Option<&RimFitment> {
        self.vehicles.get(&vehicle)?.get(&catalog_key(rim_in))
    }

    /// Check a tire against the catalog.
    ///
    /// Order: vehicle, rim, then either the flotation code (any width on that
    /// rim may list it) or width followed by aspect. The first miss is
    /// reported with `prefix` prepended to the field name.
    pub fn validate(&self, vehicle: VehicleType, rim_in: f64, query: FitmentQuery<'_>, prefix: &str) -> CalcResult<()> {
        let rims = self.vehicles.get(&vehicle).ok_or_else(|| {
            CalcError::invalid_combination(format!("{prefix}vehicle_type"), vehicle.name(), "invalid vehicle type")
        })?;

        let rim = rims.get(&catalog_key(rim_in)).ok_or_else(|| {
            CalcError::invalid_combination(format!("{prefix}rim_in"), rim_in.to_string(), "invalid rim")
        })?;

        match query {
            FitmentQuery::Flotation(code) => {
                if rim.values().any(|width| width.flotation.iter().any(|f| f == code)) {
                    Ok(())
                } else {
                    Err(CalcError::invalid_combination(
                        format!("{prefix}flotation"),
                        code,
                        "invalid flotation option",
                    ))
                }
            }
            FitmentQuery::Aspect {
                width_mm,
                aspect_percent,
            } => {
                let width = rim.get(&catalog_key(width_mm)).ok_or_else(|| {
                    CalcError::invalid_combination(format!("{prefix}width_mm"), width_mm.to_string(), "invalid width")
                })?;
                if width.aspects.contains(&aspect_percent) {
                    Ok(())
                } else {
                    Err(CalcError::invalid_combination(
                        format!("{prefix}aspect_percent"),
                        aspect_percent.to_string(),
                        "invalid aspect",
                    ))
                }
            }
        }
    }
}
