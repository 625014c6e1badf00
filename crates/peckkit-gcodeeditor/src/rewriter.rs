//! Cycle line reconstruction
//!
//! A cycle line is regenerated from its current parameters in a fixed word
//! order per cycle kind. Absent words are omitted; the macro cycle also omits
//! a zero approach height or dwell and every all-zero I/J/K triple. Numbers
//! use [`format_number`] so that float noise never reaches the program.

use std::ops::Range;
use std::sync::OnceLock;

use peckkit_core::constants::ZERO_TOLERANCE;
use peckkit_core::{format_number, CycleKind, CycleParams, FixedParams, MacroParams};
use regex::Regex;

/// What a regenerated word stands for, used to compare it with the
/// parse-time snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordSlot {
    /// Cycle command words
    Marker,
    /// Verbatim X or Y position
    Position(char),
    /// Single-valued parameter (R, Z, S, T, Q, F, or the fixed I/J/K)
    Static(char),
    /// Member of the `index`-th macro triple
    Triple { index: usize, letter: char },
    /// Spindle speed written on the cycle line itself
    Spindle,
}

/// One word of a regenerated line
#[derive(Debug, Clone, PartialEq)]
pub struct CycleWord {
    pub slot: WordSlot,
    pub text: String,
}

impl CycleWord {
    fn new(slot: WordSlot, text: String) -> Self {
        Self { slot, text }
    }

    fn value(letter: char, value: f64) -> Self {
        Self::new(
            WordSlot::Static(letter),
            format!("{}{}", letter, format_number(value)),
        )
    }
}

/// Words of a cycle line in output order
///
/// `inline_rpm` is the spindle speed when the speed command sits on the cycle
/// line itself; it is kept as a trailing `S` word so a rewrite does not lose
/// it. Only the fixed cycle can carry one.
pub fn cycle_words(params: &CycleParams, inline_rpm: Option<u32>) -> Vec<CycleWord> {
    match params {
        CycleParams::Macro(p) => macro_words(p),
        CycleParams::Fixed(p) => fixed_words(p, inline_rpm),
    }
}

fn macro_words(p: &MacroParams) -> Vec<CycleWord> {
    let mut words = vec![CycleWord::new(
        WordSlot::Marker,
        CycleKind::MacroVariablePeck.marker().to_string(),
    )];

    push_value(&mut words, 'R', p.r);
    push_value(&mut words, 'Z', p.z);
    push_value(&mut words, 'S', p.s.filter(|v| v.abs() > ZERO_TOLERANCE));
    push_value(&mut words, 'T', p.t.filter(|v| v.abs() > ZERO_TOLERANCE));

    for (index, triple) in p.triples.iter().enumerate() {
        if triple.is_zero() {
            continue;
        }
        for (letter, value) in [('I', triple.i), ('J', triple.j), ('K', triple.k)] {
            words.push(CycleWord::new(
                WordSlot::Triple { index, letter },
                format!("{}{}", letter, format_number(value)),
            ));
        }
    }
    words
}

fn fixed_words(p: &FixedParams, inline_rpm: Option<u32>) -> Vec<CycleWord> {
    let mut words = vec![CycleWord::new(
        WordSlot::Marker,
        CycleKind::FixedPeck.marker().to_string(),
    )];

    if let Some(x) = &p.x {
        words.push(CycleWord::new(WordSlot::Position('X'), format!("X{}", x)));
    }
    if let Some(y) = &p.y {
        words.push(CycleWord::new(WordSlot::Position('Y'), format!("Y{}", y)));
    }

    push_value(&mut words, 'Z', p.z);
    push_value(&mut words, 'R', p.r);
    if p.variable_peck {
        push_value(&mut words, 'I', p.i);
        push_value(&mut words, 'J', p.j);
        push_value(&mut words, 'K', p.k);
    } else {
        push_value(&mut words, 'Q', p.q);
    }
    push_value(&mut words, 'F', p.f);

    if let Some(rpm) = inline_rpm {
        words.push(CycleWord::new(WordSlot::Spindle, format!("S{}", rpm)));
    }
    words
}

fn push_value(words: &mut Vec<CycleWord>, letter: char, value: Option<f64>) {
    if let Some(v) = value {
        words.push(CycleWord::value(letter, v));
    }
}

/// Regenerate the full text of a cycle line
pub fn render_cycle_line(params: &CycleParams, inline_rpm: Option<u32>) -> String {
    cycle_words(params, inline_rpm)
        .into_iter()
        .map(|w| w.text)
        .collect::<Vec<_>>()
        .join(" ")
}

fn spindle_regex() -> &'static Regex {
    static SPINDLE: OnceLock<Regex> = OnceLock::new();
    SPINDLE.get_or_init(|| Regex::new(r"S\d+").expect("invalid regex pattern"))
}

/// Byte range of the first spindle speed word on a line
pub fn spindle_word_range(line: &str) -> Option<Range<usize>> {
    spindle_regex().find(line).map(|m| m.range())
}

/// Replace the first spindle speed word of a line
///
/// Returns `None` when the line has no spindle speed word.
pub fn replace_spindle_rpm(line: &str, rpm: u32) -> Option<String> {
    let range = spindle_word_range(line)?;
    let mut out = String::with_capacity(line.len() + 2);
    out.push_str(&line[..range.start]);
    out.push_str(&format!("S{}", rpm));
    out.push_str(&line[range.end..]);
    Some(out)
}
