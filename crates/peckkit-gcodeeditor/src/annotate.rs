//! Change-marked rendering of a cycle line and its surroundings
//!
//! The active line is regenerated from the current parameters and every word
//! whose value differs from the parse-time snapshot (or that did not exist
//! then) is marked. Surrounding lines are shown verbatim; the spindle speed
//! word of the RPM line is marked when the speed was changed.

use peckkit_core::data::approx_eq;
use peckkit_core::CycleParams;
use serde::Serialize;
use std::fmt::Write as _;
use std::ops::Range;

use crate::rewriter::{cycle_words, spindle_word_range, WordSlot};
use crate::text_buffer::TextBuffer;

/// A run of text and whether it is marked as changed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub text: String,
    pub changed: bool,
}

impl Segment {
    fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            changed: false,
        }
    }

    fn marked(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            changed: true,
        }
    }
}

/// One displayed program line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnotatedLine {
    pub line_index: usize,
    /// True for the cycle line the view is centred on
    pub active: bool,
    pub segments: Vec<Segment>,
}

impl AnnotatedLine {
    /// Text without markers
    pub fn text(&self) -> String {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }

    pub fn has_changes(&self) -> bool {
        self.segments.iter().any(|s| s.changed)
    }

    /// Texts of the marked segments
    pub fn changed_words(&self) -> Vec<&str> {
        self.segments
            .iter()
            .filter(|s| s.changed)
            .map(|s| s.text.as_str())
            .collect()
    }

    /// Text with marked segments wrapped in brackets
    pub fn render_marked(&self) -> String {
        self.segments
            .iter()
            .map(|s| {
                if s.changed {
                    format!("[{}]", s.text)
                } else {
                    s.text.clone()
                }
            })
            .collect()
    }
}

/// A cycle line with its context window
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContextView {
    pub lines: Vec<AnnotatedLine>,
}

impl ContextView {
    pub fn active(&self) -> Option<&AnnotatedLine> {
        self.lines.iter().find(|l| l.active)
    }

    /// Numbered listing, active line flagged with `>`
    pub fn render_marked(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            let flag = if line.active { '>' } else { ' ' };
            let _ = writeln!(
                out,
                "{}{:>6}  {}",
                flag,
                line.line_index + 1,
                line.render_marked()
            );
        }
        out
    }
}

/// Regenerate a cycle line, marking words that differ from `initial`
///
/// `inline_rpm` is the spindle word carried on the cycle line itself and
/// `rpm_changed` whether it should be marked.
pub fn annotate_cycle_line(
    line_index: usize,
    current: &CycleParams,
    initial: &CycleParams,
    inline_rpm: Option<u32>,
    rpm_changed: bool,
) -> AnnotatedLine {
    let mut segments = Vec::new();
    for (n, word) in cycle_words(current, inline_rpm).into_iter().enumerate() {
        if n > 0 {
            segments.push(Segment::plain(" "));
        }
        let changed = match word.slot {
            WordSlot::Marker | WordSlot::Position(_) => false,
            WordSlot::Static(letter) => {
                value_changed(static_value(current, letter), static_value(initial, letter))
            }
            WordSlot::Triple { index, letter } => value_changed(
                triple_value(current, index, letter),
                triple_value(initial, index, letter),
            ),
            WordSlot::Spindle => rpm_changed,
        };
        segments.push(Segment {
            text: word.text,
            changed,
        });
    }

    AnnotatedLine {
        line_index,
        active: true,
        segments,
    }
}

/// A verbatim line, optionally marking its spindle speed word
pub fn annotate_plain_line(line_index: usize, text: &str, mark_spindle: bool) -> AnnotatedLine {
    let segments = match spindle_word_range(text).filter(|_| mark_spindle) {
        Some(range) => split_marked(text, range),
        None => vec![Segment::plain(text)],
    };
    AnnotatedLine {
        line_index,
        active: false,
        segments,
    }
}

/// Surround an annotated cycle line with `context_lines` lines on each side
///
/// `changed_rpm_line` is the line holding a modified spindle speed, if any.
pub fn context_view(
    buffer: &TextBuffer,
    active: AnnotatedLine,
    changed_rpm_line: Option<usize>,
    context_lines: usize,
) -> ContextView {
    let center = active.line_index;
    let start = center.saturating_sub(context_lines);
    let end = center
        .saturating_add(context_lines)
        .saturating_add(1)
        .min(buffer.line_count());

    let mut lines = Vec::with_capacity(end.saturating_sub(start));
    for (idx, text) in (start..center).zip(buffer.lines_in_range(start..center)) {
        lines.push(annotate_plain_line(idx, &text, changed_rpm_line == Some(idx)));
    }
    lines.push(active);
    let below = center + 1;
    for (idx, text) in (below..end).zip(buffer.lines_in_range(below..end)) {
        lines.push(annotate_plain_line(idx, &text, changed_rpm_line == Some(idx)));
    }

    ContextView { lines }
}

fn split_marked(text: &str, range: Range<usize>) -> Vec<Segment> {
    let mut segments = Vec::with_capacity(3);
    if range.start > 0 {
        segments.push(Segment::plain(&text[..range.start]));
    }
    segments.push(Segment::marked(&text[range.clone()]));
    if range.end < text.len() {
        segments.push(Segment::plain(&text[range.end..]));
    }
    segments
}

fn value_changed(current: Option<f64>, initial: Option<f64>) -> bool {
    match (current, initial) {
        (Some(c), Some(i)) => !approx_eq(c, i),
        _ => true,
    }
}

fn static_value(params: &CycleParams, letter: char) -> Option<f64> {
    match params {
        CycleParams::Macro(p) => match letter {
            'R' => p.r,
            'Z' => p.z,
            'S' => p.s,
            'T' => p.t,
            _ => None,
        },
        CycleParams::Fixed(p) => match letter {
            'R' => p.r,
            'Z' => p.z,
            'Q' => p.q,
            'F' => p.f,
            'I' => p.i,
            'J' => p.j,
            'K' => p.k,
            _ => None,
        },
    }
}

fn triple_value(params: &CycleParams, index: usize, letter: char) -> Option<f64> {
    let CycleParams::Macro(p) = params else {
        return None;
    };
    let triple = p.triples.get(index)?;
    match letter {
        'I' => Some(triple.i),
        'J' => Some(triple.j),
        'K' => Some(triple.k),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use peckkit_core::{FixedParams, IjkTriple, MacroParams};

    fn macro_params() -> CycleParams {
        CycleParams::Macro(MacroParams {
            r: Some(-0.2),
            z: Some(-2.9),
            s: None,
            t: None,
            triples: vec![IjkTriple::new(-1.0, 0.2, 50.0)],
        })
    }

    #[test]
    fn test_unchanged_line_has_no_marks() {
        let params = macro_params();
        let line = annotate_cycle_line(4, &params, &params, None, false);
        assert!(!line.has_changes());
        assert_eq!(line.text(), "G66 P9131 R-0.2 Z-2.9 I-1 J0.2 K50");
    }

    #[test]
    fn test_edited_and_new_words_marked() {
        let initial = macro_params();
        let mut current = initial.clone();
        if let CycleParams::Macro(p) = &mut current {
            p.z = Some(-3.2);
            p.triples.push(IjkTriple::new(-0.5, 0.1, 0.0));
        }
        let line = annotate_cycle_line(4, &current, &initial, None, false);
        assert_eq!(line.changed_words(), vec!["Z-3.2", "I-0.5", "J0.1", "K0"]);
        assert_eq!(
            line.render_marked(),
            "G66 P9131 R-0.2 [Z-3.2] I-1 J0.2 K50 [I-0.5] [J0.1] [K0]"
        );
    }

    #[test]
    fn test_fixed_mode_switch_marks_new_words() {
        let initial = CycleParams::Fixed(FixedParams {
            r: Some(0.0),
            z: Some(-3.0),
            q: Some(1.0),
            ..Default::default()
        });
        let mut current = initial.clone();
        if let CycleParams::Fixed(p) = &mut current {
            p.variable_peck = true;
            p.i = Some(0.8);
            p.k = Some(0.3);
        }
        let line = annotate_cycle_line(0, &current, &initial, Some(9000), true);
        assert_eq!(line.changed_words(), vec!["I0.8", "K0.3", "S9000"]);
    }

    #[test]
    fn test_plain_line_spindle_mark() {
        let line = annotate_plain_line(2, "M03 S8000", true);
        assert_eq!(line.render_marked(), "M03 [S8000]");
        let line = annotate_plain_line(2, "M03 S8000", false);
        assert!(!line.has_changes());
    }
}
