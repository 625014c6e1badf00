//! Error types for the G-code editor crate.
//!
//! This module provides structured error types for line store operations.

use peckkit_core::EditError;
use thiserror::Error;

/// Errors related to line store operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BufferError {
    /// Line index is out of bounds.
    #[error("Line index out of bounds: {index} (lines: {total})")]
    LineIndexOutOfBounds { index: usize, total: usize },

    /// Replacement text would split the line into several program lines.
    #[error("Replacement for line {index} contains a line break")]
    EmbeddedLineBreak { index: usize },
}

/// Result type alias for buffer operations.
pub type BufferResult<T> = Result<T, BufferError>;

impl From<BufferError> for EditError {
    fn from(err: BufferError) -> Self {
        match err {
            BufferError::LineIndexOutOfBounds { index, total } => {
                EditError::LineOutOfRange { line: index, total }
            }
            BufferError::EmbeddedLineBreak { index } => {
                EditError::LineBreakInReplacement { line: index }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_error_display() {
        let err = BufferError::LineIndexOutOfBounds {
            index: 200,
            total: 150,
        };
        assert_eq!(err.to_string(), "Line index out of bounds: 200 (lines: 150)");

        let err = BufferError::EmbeddedLineBreak { index: 4 };
        assert_eq!(err.to_string(), "Replacement for line 4 contains a line break");
    }

    #[test]
    fn test_edit_error_conversion() {
        let err: EditError = BufferError::LineIndexOutOfBounds { index: 9, total: 3 }.into();
        assert_eq!(err, EditError::LineOutOfRange { line: 9, total: 3 });

        let err: EditError = BufferError::EmbeddedLineBreak { index: 4 }.into();
        assert_eq!(err, EditError::LineBreakInReplacement { line: 4 });
    }
}
