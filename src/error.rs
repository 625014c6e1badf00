//! Errors surfaced by a drill session
//!
//! Edits keep reporting [`EditError`] directly; this type covers the
//! operations that cross a file, configuration or optimizer boundary.

use peckkit_camtools::ParameterError;
use peckkit_core::EditError;
use peckkit_settings::SettingsError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    /// Program could not be read or written
    #[error(transparent)]
    Program(#[from] peckkit_core::Error),

    #[error(transparent)]
    Edit(#[from] EditError),

    /// Optimization request rejected
    #[error("Optimization failed: {0}")]
    Parameter(#[from] ParameterError),

    #[error("Configuration error: {0}")]
    Settings(#[from] SettingsError),
}

impl SessionError {
    /// Check if the program file was missing
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Program(e) if e.is_not_found())
    }
}

/// Result type for session operations
pub type SessionResult<T> = std::result::Result<T, SessionError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_not_found_passes_through() {
        let err = SessionError::from(peckkit_core::Error::NotFound {
            path: PathBuf::from("a.nc"),
        });
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "File not found: a.nc");
    }

    #[test]
    fn test_edit_error_display() {
        let err = SessionError::from(EditError::InvalidRpm { rpm: -5.0 });
        assert!(!err.is_not_found());
        assert_eq!(err.to_string(), "Refusing to set spindle speed to -5");
    }
}
