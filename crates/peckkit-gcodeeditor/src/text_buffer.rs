//! Program line store using a rope for efficient single-line replacement

use ropey::Rope;
use std::fmt;
use std::ops::Range;

use crate::error::{BufferError, BufferResult};

/// Ordered lines of one NC program
///
/// Line indices are 0-based and never shift: the only mutation is replacing
/// the content of an existing line, which keeps that line's terminator
/// (`\n`, `\r\n` or none on an unterminated last line).
#[derive(Clone)]
pub struct TextBuffer {
    rope: Rope,
    dirty_lines: Vec<usize>,
}

impl TextBuffer {
    /// Create a new empty text buffer
    pub fn new() -> Self {
        Self {
            rope: Rope::new(),
            dirty_lines: Vec::new(),
        }
    }

    /// Get the total length in chars
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    /// Number of program lines
    ///
    /// A terminator at the end of the text does not open another line.
    pub fn line_count(&self) -> usize {
        let rope_lines = self.rope.len_lines();
        if self.rope.line(rope_lines - 1).len_chars() == 0 {
            rope_lines - 1
        } else {
            rope_lines
        }
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.rope.len_bytes() == 0
    }

    /// Content of a line without its terminator
    pub fn line(&self, line_idx: usize) -> Option<String> {
        if line_idx < self.line_count() {
            let raw = self.rope.line(line_idx).to_string();
            Some(strip_terminator(&raw).to_string())
        } else {
            None
        }
    }

    /// All line contents, in order
    pub fn lines(&self) -> Vec<String> {
        self.lines_in_range(0..self.line_count())
    }

    /// Line contents in a range, clipped to the program
    pub fn lines_in_range(&self, range: Range<usize>) -> Vec<String> {
        let total = self.line_count();
        let start = range.start.min(total);
        let end = range.end.min(total);

        (start..end)
            .map(|idx| strip_terminator(&self.rope.line(idx).to_string()).to_string())
            .collect()
    }

    /// Replace the content of one line, keeping its terminator
    pub fn replace_line(&mut self, line_idx: usize, content: &str) -> BufferResult<()> {
        let total = self.line_count();
        if line_idx >= total {
            return Err(BufferError::LineIndexOutOfBounds {
                index: line_idx,
                total,
            });
        }
        if content.contains(['\n', '\r']) {
            return Err(BufferError::EmbeddedLineBreak { index: line_idx });
        }

        let line = self.rope.line(line_idx);
        let raw = line.to_string();
        let content_chars = strip_terminator(&raw).chars().count();
        let start = self.rope.line_to_char(line_idx);

        self.rope.remove(start..start + content_chars);
        self.rope.insert(start, content);
        self.mark_dirty(line_idx);
        Ok(())
    }

    fn mark_dirty(&mut self, line_idx: usize) {
        if !self.dirty_lines.contains(&line_idx) {
            self.dirty_lines.push(line_idx);
        }
    }

    /// Get and clear dirty lines
    pub fn take_dirty_lines(&mut self) -> Vec<usize> {
        std::mem::take(&mut self.dirty_lines)
    }

    /// Check if a line has been rewritten since load or the last save
    pub fn is_line_dirty(&self, line_idx: usize) -> bool {
        self.dirty_lines.contains(&line_idx)
    }

    /// True when any line has been rewritten
    pub fn is_modified(&self) -> bool {
        !self.dirty_lines.is_empty()
    }
}

/// Strip a trailing `\n` or `\r\n`
fn strip_terminator(line: &str) -> &str {
    line.strip_suffix('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .unwrap_or(line)
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for TextBuffer {
    fn from(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            dirty_lines: Vec::new(),
        }
    }
}

impl fmt::Display for TextBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.rope)
    }
}

impl fmt::Debug for TextBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextBuffer")
            .field("lines", &self.line_count())
            .field("dirty_lines", &self.dirty_lines)
            .finish()
    }
}
