//! # Engine and Drivetrain Equations
//!
//! Pure formula functions used by the calculators. Keeping the formulas in one
//! place gives:
//! - Easy verification against hand calculations
//! - One home for each constant and tolerance
//! - The same implementation for primary and baseline inputs
//!
//! ## Modules
//!
//! - [`engine`] - Displacement, bore/stroke classification, compression volumes, rod ratios
//! - [`sprocket`] - Chain pitch table, gear ratio, chain length, center distance solver
//! - [`tires`] - Tire diameter and mounted assembly width
//!
//! ## Units
//!
//! All functions take canonical units: lengths in millimeters, volumes in
//! cubic centimeters. Unit conversion belongs to [`crate::units`].

pub mod engine;
pub mod sprocket;
pub mod tires;

pub use engine::{
    classify_geometry,
    classify_smoothness,
    clearance_volume_cc,
    compression_ratio,
    cylinder_volume_cc,
    deck_volume_cc,
    displacement_cc,
    gasket_volume_cc,
    rl_ratio,
    rod_stroke_ratio,
    swept_volume_cc,
    trapped_swept_volume_cc,
    GeometryClass,
    Smoothness,
};

pub use sprocket::{
    center_distance_mm,
    chain_length_mm,
    gear_ratio,
    ChainPitch,
    CenterDistanceSolution,
};

pub use tires::{assembly_width_mm, diameter_mm};
