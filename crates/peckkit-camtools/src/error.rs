//! Error types for the CAM tools crate.
//!
//! This module provides structured error types for optimization parameter
//! validation.

use thiserror::Error;

/// Errors related to optimization parameter validation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParameterError {
    /// A parameter value is invalid.
    #[error("Invalid value for '{name}': {reason}")]
    InvalidValue { name: String, reason: String },

    /// Dimensions are invalid (zero or negative).
    #[error("Invalid dimensions: {0}")]
    InvalidDimensions(String),
}

/// Result type alias for parameter validation.
pub type ParameterResult<T> = Result<T, ParameterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_error_display() {
        let err = ParameterError::InvalidDimensions("tool diameter must be > 0".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid dimensions: tool diameter must be > 0"
        );

        let err = ParameterError::InvalidValue {
            name: "tip_angle".to_string(),
            reason: "must be below 180".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid value for 'tip_angle': must be below 180"
        );
    }
}
