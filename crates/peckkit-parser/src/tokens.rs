//! Word recognition for NC program lines
//!
//! Numbers follow the controller's loose syntax: an optional sign, then
//! digits with an optional fraction, or a bare fraction (`.45`). Anything the
//! patterns do not match is ignored.

use regex::Regex;
use std::sync::OnceLock;

static SPINDLE_REGEX: OnceLock<Regex> = OnceLock::new();
static TOOL_REGEX: OnceLock<Regex> = OnceLock::new();
static DIAMETER_REGEX: OnceLock<Regex> = OnceLock::new();
static MACRO_WORD_REGEX: OnceLock<Regex> = OnceLock::new();
static FIXED_WORD_REGEX: OnceLock<Regex> = OnceLock::new();

const MACRO_CALL: &str = "G66";
const MACRO_PROGRAM: &str = "P9131";
const FIXED_CYCLE: &str = "G83";

fn spindle_regex() -> &'static Regex {
    SPINDLE_REGEX.get_or_init(|| Regex::new(r"S(\d+)").expect("invalid regex pattern"))
}

fn tool_regex() -> &'static Regex {
    TOOL_REGEX.get_or_init(|| Regex::new(r"T(\d+)").expect("invalid regex pattern"))
}

fn diameter_regex() -> &'static Regex {
    DIAMETER_REGEX.get_or_init(|| Regex::new(r"D\s*(\d*\.?\d+)").expect("invalid regex pattern"))
}

fn macro_word_regex() -> &'static Regex {
    MACRO_WORD_REGEX.get_or_init(|| {
        Regex::new(r"([RZSIJKT])\s*([-+]?(?:\d*\.\d+|\d+))").expect("invalid regex pattern")
    })
}

fn fixed_word_regex() -> &'static Regex {
    FIXED_WORD_REGEX.get_or_init(|| {
        Regex::new(r"([RZQFXYIJK])\s*([-+]?(?:\d*\.\d+|\d+))").expect("invalid regex pattern")
    })
}

/// A letter followed by its number text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Word<'a> {
    pub letter: char,
    pub text: &'a str,
}

impl Word<'_> {
    /// Numeric value, `None` when the text does not parse
    pub fn value(&self) -> Option<f64> {
        match self.text.parse::<f64>() {
            Ok(v) if v.is_finite() => Some(v),
            _ => {
                tracing::debug!("skipping malformed {} word '{}'", self.letter, self.text);
                None
            }
        }
    }
}

fn words<'a>(regex: &'static Regex, line: &'a str) -> impl Iterator<Item = Word<'a>> + 'a {
    regex.captures_iter(line).filter_map(|caps| {
        let letter = caps.get(1)?.as_str().chars().next()?;
        let text = caps.get(2)?.as_str();
        Some(Word { letter, text })
    })
}

/// Any line carrying the macro call; its `S` and `T` words are positional
pub fn is_macro_call(line: &str) -> bool {
    line.contains(MACRO_CALL)
}

/// A variable-peck macro cycle: the macro call plus its program number
pub fn is_macro_cycle(line: &str) -> bool {
    line.contains(MACRO_CALL) && line.contains(MACRO_PROGRAM)
}

pub fn is_fixed_cycle(line: &str) -> bool {
    line.contains(FIXED_CYCLE)
}

/// First spindle speed word on the line
pub fn spindle_speed(line: &str) -> Option<u32> {
    let digits = spindle_regex().captures(line)?.get(1)?.as_str();
    match digits.parse() {
        Ok(rpm) => Some(rpm),
        Err(_) => {
            tracing::debug!("skipping out-of-range spindle speed S{}", digits);
            None
        }
    }
}

/// Digits of the first tool word on the line
pub fn tool_id(line: &str) -> Option<&str> {
    tool_regex()
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Tool selected by the line
///
/// On a macro call only the words before `G66` are read; the call's own `T`
/// is an argument of the macro.
pub fn tool_change(line: &str) -> Option<&str> {
    match line.find(MACRO_CALL) {
        Some(pos) => tool_id(&line[..pos]),
        None => tool_id(line),
    }
}

/// Diameter words on the line, in order
pub fn diameters(line: &str) -> impl Iterator<Item = f64> + '_ {
    diameter_regex()
        .captures_iter(line)
        .filter_map(|caps| caps.get(1)?.as_str().parse::<f64>().ok())
}

/// R, Z, S, T, I, J and K words of a macro cycle line
pub fn macro_words(line: &str) -> impl Iterator<Item = Word<'_>> + '_ {
    words(macro_word_regex(), line)
}

/// R, Z, Q, F, X, Y, I, J and K words of a fixed cycle line
pub fn fixed_words(line: &str) -> impl Iterator<Item = Word<'_>> + '_ {
    words(fixed_word_regex(), line)
}
