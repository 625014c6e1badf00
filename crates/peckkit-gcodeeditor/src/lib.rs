//! # PeckKit G-Code Editor
//!
//! Line-level editing support for NC programs containing drilling cycles.
//!
//! ## Core Components
//!
//! ### Text Management
//! - **TextBuffer**: Rope-based line store; lines are replaced in place and
//!   never renumbered
//! - **File I/O**: UTF-8 with byte-preserving legacy fallback
//!
//! ### Rewriting
//! - **render_cycle_line**: Regenerate a cycle line from its parameters
//! - **replace_spindle_rpm**: Positional spindle speed replacement
//!
//! ### Annotation
//! - **ContextView**: Change-marked cycle line with surrounding context
//!
//! ## Usage
//!
//! ```rust
//! use peckkit_gcodeeditor::TextBuffer;
//!
//! let mut buffer = TextBuffer::from("M03 S8000\nG83 Z-3 R0 Q1\n");
//! buffer.replace_line(1, "G83 Z-3 R0 Q0.5").unwrap();
//! assert_eq!(buffer.to_string(), "M03 S8000\nG83 Z-3 R0 Q0.5\n");
//! ```

pub mod annotate;
pub mod error;
pub mod file_io;
pub mod rewriter;
mod text_buffer;

pub use annotate::{
    annotate_cycle_line, annotate_plain_line, context_view, AnnotatedLine, ContextView, Segment,
};
pub use error::{BufferError, BufferResult};
pub use file_io::{read_program, write_program, FileEncoding, LoadedProgram};
pub use rewriter::{
    cycle_words, render_cycle_line, replace_spindle_rpm, spindle_word_range, CycleWord, WordSlot,
};
pub use text_buffer::TextBuffer;
