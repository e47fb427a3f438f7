//! # Error Types
//!
//! Structured error types for calc_core. Calculators return these from their
//! typed layer; the contract layer (`evaluate`) never surfaces them to callers
//! and instead maps any error to an invalid [`CalculationResult`].
//!
//! ## Example
//!
//! ```rust
//! use calc_core::errors::{CalcError, CalcResult};
//!
//! fn validate_area(area_sqft: f64) -> CalcResult<()> {
//!     if area_sqft <= 0.0 {
//!         return Err(CalcError::invalid_input(
//!             "area",
//!             area_sqft.to_string(),
//!             "Area must be positive",
//!         ));
//!     }
//!     Ok(())
//! }
//! ```
//!
//! [`CalculationResult`]: crate::result::CalculationResult

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for calc_core operations
pub type CalcResult<T> = Result<T, CalcError>;

/// Structured error type for calculation operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CalcError {
    /// An input value is invalid (out of range, wrong type, etc.)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// A required field is missing
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// A reference table has no entry for the requested key
    #[error("No '{dataset}' entry for {key}")]
    OutOfRange { dataset: String, key: String },

    /// A divisor would be zero (zero elapsed time, zero years, zero area)
    #[error("Division guard tripped in {calculation}: {reason}")]
    DivisionGuard { calculation: String, reason: String },

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

    /// Generic internal error (should be rare)
    #[error("Internal error: {message}")]
    Internal { message: String },
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

    /// Create a MissingField error
    pub fn missing_field(field: impl Into<String>) -> Self {
        CalcError::MissingField {
            field: field.into(),
        }
    }

    /// Create an OutOfRange error
    pub fn out_of_range(dataset: impl Into<String>, key: impl Into<String>) -> Self {
        CalcError::OutOfRange {
            dataset: dataset.into(),
            key: key.into(),
        }
    }

    /// Create a DivisionGuard error
    pub fn division_guard(calculation: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::DivisionGuard {
            calculation: calculation.into(),
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

    /// Create an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        CalcError::Internal {
            message: message.into(),
        }
    }

    /// True for errors caused by the caller's input rather than the environment.
    ///
    /// These are the errors the contract layer folds into an invalid result.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            CalcError::InvalidInput { .. }
                | CalcError::MissingField { .. }
                | CalcError::OutOfRange { .. }
                | CalcError::DivisionGuard { .. }
        )
    }

    /// Check if this is a recoverable error (e.g., can retry)
    pub fn is_recoverable(&self) -> bool {
        matches!(self, CalcError::FileLocked { .. })
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CalcError::InvalidInput { .. } => "INVALID_INPUT",
            CalcError::MissingField { .. } => "MISSING_FIELD",
            CalcError::OutOfRange { .. } => "OUT_OF_RANGE",
            CalcError::DivisionGuard { .. } => "DIVISION_GUARD",
            CalcError::FileError { .. } => "FILE_ERROR",
            CalcError::FileLocked { .. } => "FILE_LOCKED",
            CalcError::SerializationError { .. } => "SERIALIZATION_ERROR",
            CalcError::VersionMismatch { .. } => "VERSION_MISMATCH",
            CalcError::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = CalcError::invalid_input("amount", "-5", "Amount must be positive");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"type\":\"InvalidInput\""));
        let roundtrip: CalcError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(CalcError::missing_field("draws").error_code(), "MISSING_FIELD");
        assert_eq!(CalcError::out_of_range("cpi", "1900").error_code(), "OUT_OF_RANGE");
        assert_eq!(
            CalcError::division_guard("inflation", "zero years").error_code(),
            "DIVISION_GUARD"
        );
    }

    #[test]
    fn test_input_errors_are_distinguished() {
        assert!(CalcError::missing_field("length").is_input_error());
        assert!(CalcError::division_guard("hcg", "zero hours").is_input_error());
        assert!(!CalcError::file_error("open", "/tmp/x", "denied").is_input_error());
        assert!(CalcError::file_locked("/tmp/x", "me", "now").is_recoverable());
    }
}
