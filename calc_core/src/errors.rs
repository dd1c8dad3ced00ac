//! # Error Types
//!
//! Structured error types for calc_core. Every failure names the offending
//! request field and carries a human-readable reason, so the request layer
//! can turn it into a field-level validation response without guessing.
//!
//! ## Example
//!
//! ```rust
//! use calc_core::errors::{CalcError, CalcResult};
//!
//! fn validate_bore(bore_mm: f64) -> CalcResult<()> {
//!     if bore_mm <= 0.0 {
//!         return Err(CalcError::invalid_input(
//!             "inputs.bore",
//!             bore_mm.to_string(),
//!             "must be greater than zero",
//!         ));
//!     }
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for calc_core operations
pub type CalcResult<T> = Result<T, CalcError>;

/// Structured error type for calculation operations.
///
/// The first four variants are the calculation failures; the rest only
/// occur while loading configuration or catalog data.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CalcError {
    /// A field fails a structural constraint (non-positive magnitude,
    /// odd link count, unknown chain pitch code, missing field)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// A derived physical quantity is non-positive or out of range
    #[error("Invalid geometry for '{field}': {value} - {reason}")]
    InvalidGeometry {
        field: String,
        value: String,
        reason: String,
    },

    /// A string field does not match its expected pattern
    #[error("Invalid format for '{field}': {value} - {reason}")]
    InvalidFormat {
        field: String,
        value: String,
        reason: String,
    },

    /// Otherwise-valid fields that match no cataloged configuration
    #[error("Invalid combination for '{field}': {value} - {reason}")]
    InvalidCombination {
        field: String,
        value: String,
        reason: String,
    },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// TOML/JSON serialization or deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },
}

impl CalcError {
    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create an InvalidInput error for a field that was required but absent
    pub fn missing_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::InvalidInput {
            field: field.into(),
            value: "null".to_string(),
            reason: reason.into(),
        }
    }

    /// Create an InvalidGeometry error
    pub fn invalid_geometry(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::InvalidGeometry {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create an InvalidFormat error
    pub fn invalid_format(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::InvalidFormat {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create an InvalidCombination error
    pub fn invalid_combination(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::InvalidCombination {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a SerializationError
    pub fn serialization(reason: impl Into<String>) -> Self {
        CalcError::SerializationError { reason: reason.into() }
    }

    /// The request field this error refers to, if any
    pub fn field(&self) -> Option<&str> {
        match self {
            CalcError::InvalidInput { field, .. }
            | CalcError::InvalidGeometry { field, .. }
            | CalcError::InvalidFormat { field, .. }
            | CalcError::InvalidCombination { field, .. } => Some(field),
            _ => None,
        }
    }

    /// Human-readable reason without the field prefix
    pub fn reason(&self) -> String {
        match self {
            CalcError::InvalidInput { reason, .. }
            | CalcError::InvalidGeometry { reason, .. }
            | CalcError::InvalidFormat { reason, .. }
            | CalcError::InvalidCombination { reason, .. }
            | CalcError::FileError { reason, .. }
            | CalcError::SerializationError { reason } => reason.clone(),
        }
    }

    /// True for failures caused by the request payload (client errors)
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            CalcError::InvalidInput { .. }
                | CalcError::InvalidGeometry { .. }
                | CalcError::InvalidFormat { .. }
                | CalcError::InvalidCombination { .. }
        )
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CalcError::InvalidInput { .. } => "INVALID_INPUT",
            CalcError::InvalidGeometry { .. } => "INVALID_GEOMETRY",
            CalcError::InvalidFormat { .. } => "INVALID_FORMAT",
            CalcError::InvalidCombination { .. } => "INVALID_COMBINATION",
            CalcError::FileError { .. } => "FILE_ERROR",
            CalcError::SerializationError { .. } => "SERIALIZATION_ERROR",
        }
    }
}
