//! Error handling for PeckKit
//!
//! Provides the error types shared by every layer of the editor:
//! - Session errors (loading, saving, configuration)
//! - Edit errors (rejected parameter or spindle-speed updates)
//!
//! All error types use `thiserror` for ergonomic error handling.

use std::path::PathBuf;
use thiserror::Error;

/// Edit error type
///
/// Returned by operations that mutate a loaded program. An edit that fails
/// leaves both the program text and the cycle records untouched.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditError {
    /// No cycle record exists at the given position
    #[error("Cycle record {index} out of range (records: {total})")]
    RecordOutOfRange {
        /// The requested record position.
        index: usize,
        /// The number of records in the session.
        total: usize,
    },

    /// Spindle speed must be strictly positive
    #[error("Refusing to set spindle speed to {rpm}")]
    InvalidRpm {
        /// The rejected spindle speed.
        rpm: f64,
    },

    /// No spindle speed command precedes the cycle
    #[error("No spindle speed line resolvable for tool {tool_id}")]
    NoRpmLine {
        /// The tool active at the cycle.
        tool_id: String,
    },

    /// The referenced program line does not exist
    #[error("Line {line} out of range (lines: {total})")]
    LineOutOfRange {
        /// The requested line index.
        line: usize,
        /// The number of lines in the program.
        total: usize,
    },

    /// Replacement text would split a program line in two
    #[error("Replacement for line {line} contains a line break")]
    LineBreakInReplacement {
        /// The line being replaced.
        line: usize,
    },

    /// Parameters of one cycle kind were applied to a record of the other kind
    #[error("Parameter kind mismatch: record is {expected}, got {actual}")]
    KindMismatch {
        /// The kind of the record.
        expected: String,
        /// The kind of the supplied parameters.
        actual: String,
    },
}

/// Main error type for PeckKit
///
/// A unified error type for session-boundary operations (load, save,
/// configuration). Core computations never return it.
#[derive(Error, Debug)]
pub enum Error {
    /// Input program does not exist
    #[error("File not found: {}", path.display())]
    NotFound {
        /// The missing path.
        path: PathBuf,
    },

    /// Edit error
    #[error(transparent)]
    Edit(#[from] EditError),

    /// Configuration could not be used
    #[error("Configuration error: {0}")]
    Config(String),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a missing-file error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    /// Check if this is an edit error
    pub fn is_edit_error(&self) -> bool {
        matches!(self, Error::Edit(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;

/// Result type for edit operations
pub type EditResult<T> = std::result::Result<T, EditError>;
