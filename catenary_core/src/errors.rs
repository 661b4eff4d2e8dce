//! # Error Types
//!
//! Structured error types for catenary_core. Invalid arguments are rejected
//! before any state is touched, so a failed setter leaves its object exactly
//! as it was.
//!
//! Numeric non-convergence is not an error. The inverse solvers
//! return a [`Solution`](crate::numerics::Solution) whose `converged` flag tells
//! the caller whether the returned tension is refined or the analytic guess.
//!
//! ## Example
//!
//! ```rust
//! use catenary_core::errors::{CalcError, CalcResult};
//!
//! fn validate_weight(weight: f64) -> CalcResult<()> {
//!     if !(weight.is_finite() && weight > 0.0) {
//!         return Err(CalcError::InvalidInput {
//!             field: "weight".to_string(),
//!             value: weight.to_string(),
//!             reason: "Weight must be finite and positive".to_string(),
//!         });
//!     }
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for catenary_core operations
pub type CalcResult<T> = Result<T, CalcError>;

/// Structured error type for calculation operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CalcError {
    /// An input value is invalid (non-finite, non-positive, geometrically impossible)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// A configuration the model has no data for (e.g. layer count outside 1..=5)
    #[error("Unsupported configuration for '{field}': {value} - {reason}")]
    UnsupportedConfiguration {
        field: String,
        value: String,
        reason: String,
    },

    /// A span index does not exist in a ruling span
    #[error("Span index {index} out of range (ruling span has {len} spans)")]
    IndexOutOfRange { index: usize, len: usize },

    /// Material not found in a material library
    #[error("Material not found: {material_name}")]
    MaterialNotFound { material_name: String },

    /// Calculation could not produce even a fallback result
    #[error("Calculation failed: {calculation_type} - {reason}")]
    CalculationFailed {
        calculation_type: String,
        reason: String,
    },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// File is locked by another user/process
    #[error("File locked: '{path}' is locked by {locked_by} since {locked_at}")]
    FileLocked {
        path: String,
        locked_by: String,
        locked_at: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Schema version mismatch
    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },
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

    /// Create an UnsupportedConfiguration error
    pub fn unsupported(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::UnsupportedConfiguration {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a MaterialNotFound error
    pub fn material_not_found(material_name: impl Into<String>) -> Self {
        CalcError::MaterialNotFound {
            material_name: material_name.into(),
        }
    }

    /// Create a CalculationFailed error
    pub fn calculation_failed(calculation_type: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::CalculationFailed {
            calculation_type: calculation_type.into(),
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

    /// Create a FileLocked error
    pub fn file_locked(path: impl Into<String>, locked_by: impl Into<String>, locked_at: impl Into<String>) -> Self {
        CalcError::FileLocked {
            path: path.into(),
            locked_by: locked_by.into(),
            locked_at: locked_at.into(),
        }
    }

    /// Check if this is a recoverable error (e.g., can retry)
    pub fn is_recoverable(&self) -> bool {
        matches!(self, CalcError::FileLocked { .. })
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CalcError::InvalidInput { .. } => "INVALID_INPUT",
            CalcError::UnsupportedConfiguration { .. } => "UNSUPPORTED_CONFIGURATION",
            CalcError::IndexOutOfRange { .. } => "INDEX_OUT_OF_RANGE",
            CalcError::MaterialNotFound { .. } => "MATERIAL_NOT_FOUND",
            CalcError::CalculationFailed { .. } => "CALCULATION_FAILED",
            CalcError::FileError { .. } => "FILE_ERROR",
            CalcError::FileLocked { .. } => "FILE_LOCKED",
            CalcError::SerializationError { .. } => "SERIALIZATION_ERROR",
            CalcError::VersionMismatch { .. } => "VERSION_MISMATCH",
        }
    }
}

/// Reject anything that is not a finite, strictly positive number.
pub(crate) fn require_positive(field: &str, value: f64) -> CalcResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(CalcError::invalid_input(
            field,
            value.to_string(),
            "Value must be finite and positive",
        ))
    }
}

/// Reject NaN and infinities.
pub(crate) fn require_finite(field: &str, value: f64) -> CalcResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(CalcError::invalid_input(field, value.to_string(), "Value must be finite"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = CalcError::invalid_input("weight", "-0.75", "Weight must be positive");
        let json = serde_json::to_string(&error).unwrap();
        let roundtrip: CalcError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(CalcError::unsupported("layer_count", "6", "no factor").error_code(), "UNSUPPORTED_CONFIGURATION");
        assert_eq!(CalcError::material_not_found("copper").error_code(), "MATERIAL_NOT_FOUND");
        assert_eq!(CalcError::IndexOutOfRange { index: 3, len: 2 }.error_code(), "INDEX_OUT_OF_RANGE");
    }

    #[test]
    fn test_only_locks_are_recoverable() {
        assert!(CalcError::file_locked("feeder.rsp", "someone (host)", "2026-01-05T10:00:00Z").is_recoverable());
        assert!(!CalcError::file_error("read", "feeder.rsp", "not found").is_recoverable());
        assert!(!CalcError::calculation_failed("pre-strain", "no bracket").is_recoverable());
    }

    #[test]
    fn test_positive_guard() {
        assert_eq!(require_positive("weight", 0.75), Ok(0.75));
        assert!(require_positive("weight", 0.0).is_err());
        assert!(require_positive("weight", f64::NAN).is_err());
        assert!(require_positive("weight", f64::INFINITY).is_err());
        assert!(require_finite("y", -3.0).is_ok());
        assert!(require_finite("y", f64::NEG_INFINITY).is_err());
    }
}
