//! # calc_core - Engine Geometry Calculation Engine
//!
//! `calc_core` computes derived quantities for engine and drivetrain
//! geometry: displacement, compression ratio (four-stroke and ported
//! two-stroke), rod ratios, chain-drive gearing and tire dimensions. Inputs
//! may be metric or imperial and may carry a baseline to compare against.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: Every calculator is a pure function of its request and a
//!   read-only [`config::EngineConfig`]
//! - **Normalize Early**: Lengths become mm and volumes cc at the boundary;
//!   rounding to 2 decimals happens only in the results
//! - **JSON-First**: All inputs, echoes and results implement Serialize/Deserialize
//! - **Rich Errors**: Every failure names the request field it came from
//!
//! ## Quick Start
//!
//! ```rust
//! use calc_core::calculations::{displacement, CalcRequest, DisplacementInputs};
//! use calc_core::units::UnitSystem;
//!
//! let request = CalcRequest::new(
//!     UnitSystem::Metric,
//!     DisplacementInputs { bore: 58.0, stroke: 50.0, cylinders: 4, baseline_cc: None, compression: None },
//! );
//! let output = displacement::calculate(&request).unwrap();
//! assert_eq!(output.results.displacement_cc, 528.42);
//! ```
//!
//! ## Modules
//!
//! - [`calculations`] - The four calculators and the shared compression engine
//! - [`equations`] - Pure formula functions
//! - [`comparison`] - Baseline diffs
//! - [`fitment`] / [`tire_size`] - Tire catalog and flotation size parsing
//! - [`units`] - Unit systems and type-safe unit wrappers
//! - [`api`] / [`security`] / [`config`] - JSON request layer
//! - [`errors`] - Structured error types

pub mod api;
pub mod calculations;
pub mod comparison;
pub mod config;
pub mod equations;
pub mod errors;
pub mod fitment;
pub mod security;
pub mod tire_size;
pub mod units;

// Re-export commonly used types at crate root for convenience
pub use calculations::{CalcOutput, CalcRequest, Calculator};
pub use config::EngineConfig;
pub use errors::{CalcError, CalcResult};
pub use fitment::{FitmentCatalog, VehicleType};
pub use units::{ResolvedUnitSystem, UnitSystem};
