//! Parameter extraction for the two cycle kinds

use peckkit_camtools::default_ijk;
use peckkit_core::constants::ZERO_TOLERANCE;
use peckkit_core::{round_to, FixedParams, IjkTriple, MacroParams, PeckPreset, ProcessTables};

use crate::tokens::{fixed_words, macro_words};

/// Groups a stream of I/J/K words into triples
///
/// Words carry no delimiter between groups. A group closes when one of its
/// letters shows up a second time; members never seen are 0.
#[derive(Debug, Clone, Default)]
pub struct TripleAccumulator {
    open: [Option<f64>; 3],
    closed: Vec<IjkTriple>,
}

impl TripleAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one word; letters other than I, J and K are ignored
    pub fn push(&mut self, letter: char, value: f64) {
        let slot = match letter {
            'I' => 0,
            'J' => 1,
            'K' => 2,
            _ => return,
        };
        if self.open[slot].is_some() {
            self.close_open();
        }
        self.open[slot] = Some(value);
    }

    /// Groups closed so far
    pub fn closed(&self) -> &[IjkTriple] {
        &self.closed
    }

    /// Close the open group and return every group in source order,
    /// all-zero groups included
    pub fn finish(mut self) -> Vec<IjkTriple> {
        self.close_open();
        self.closed
    }

    fn close_open(&mut self) {
        if self.open.iter().any(Option::is_some) {
            let [i, j, k] = self.open.map(|v| v.unwrap_or(0.0));
            self.closed.push(IjkTriple::new(i, j, k));
        }
        self.open = [None; 3];
    }
}

/// Every I/J/K group written on a macro line, all-zero groups included
pub fn macro_groups(line: &str) -> Vec<IjkTriple> {
    let mut acc = TripleAccumulator::new();
    for word in macro_words(line) {
        if let Some(value) = word.value() {
            acc.push(word.letter, value);
        }
    }
    acc.finish()
}

/// Words of a `G66 P9131` line
///
/// R, Z, S and T keep their last occurrence. All-zero triples are dropped.
pub fn extract_macro(line: &str) -> MacroParams {
    let mut params = MacroParams::default();
    let mut acc = TripleAccumulator::new();

    for word in macro_words(line) {
        let Some(value) = word.value() else {
            continue;
        };
        match word.letter {
            'R' => params.r = Some(value),
            'Z' => params.z = Some(value),
            'S' => params.s = Some(value),
            'T' => params.t = Some(value),
            letter => acc.push(letter, value),
        }
    }

    params.triples = acc.finish().into_iter().filter(|t| !t.is_zero()).collect();
    params
}

/// Words of a `G83` line with missing peck values filled in
///
/// I or K on the line selects variable mode. Then, in order: constant mode
/// without a usable Q gets `min(1, depth/3)`; variable mode without a usable
/// I gets the efficient preset for `diameter`, or depth-based values when no
/// diameter is known; variable mode whose I and K are both still zero falls
/// back to constant mode and gets the Q default.
pub fn extract_fixed(
    line: &str,
    diameter: Option<f64>,
    tables: Option<&dyn ProcessTables>,
) -> FixedParams {
    let mut params = FixedParams::default();

    for word in fixed_words(line) {
        match word.letter {
            'X' => params.x = Some(word.text.to_string()),
            'Y' => params.y = Some(word.text.to_string()),
            letter => {
                let Some(value) = word.value() else {
                    continue;
                };
                match letter {
                    'R' => params.r = Some(value),
                    'Z' => params.z = Some(value),
                    'Q' => params.q = Some(value),
                    'F' => params.f = Some(value),
                    'I' => params.i = Some(value),
                    'J' => params.j = Some(value),
                    'K' => params.k = Some(value),
                    _ => {}
                }
            }
        }
    }

    params.variable_peck = params.i.is_some() || params.k.is_some();
    let depth = params.depth();

    if !params.variable_peck {
        fill_default_q(&mut params, depth);
    } else if is_near_zero(params.i) {
        let ijk = match diameter.filter(|d| *d > ZERO_TOLERANCE) {
            Some(d) => default_ijk(d, PeckPreset::Efficient, tables),
            None => depth_based_ijk(depth),
        };
        tracing::debug!(
            "G83 without initial peck, using I{} J{} K{}",
            ijk.i,
            ijk.j,
            ijk.k
        );
        params.i = Some(ijk.i);
        params.j = Some(ijk.j);
        params.k = Some(ijk.k);
    }

    if params.variable_peck && is_near_zero(params.i) && is_near_zero(params.k) {
        params.variable_peck = false;
        fill_default_q(&mut params, depth);
    }

    params
}

/// Constant peck used when a fixed cycle gives none
pub fn default_q(depth: f64) -> f64 {
    if depth > 0.0 {
        round_to((depth / 3.0).min(1.0), 3)
    } else {
        1.0
    }
}

/// Variable peck used when neither the line nor the tool gives one
pub fn depth_based_ijk(depth: f64) -> IjkTriple {
    let i = if depth > 0.0 {
        round_to((depth / 3.0).min(0.5), 3)
    } else {
        0.5
    };
    IjkTriple::new(i, round_to(0.2 * i, 3), round_to(0.5 * i, 3))
}

fn fill_default_q(params: &mut FixedParams, depth: f64) {
    if is_near_zero(params.q) {
        params.q = Some(default_q(depth));
    }
}

fn is_near_zero(value: Option<f64>) -> bool {
    value.map_or(true, |v| v.abs() < ZERO_TOLERANCE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accumulator_closes_on_repeat() {
        let mut acc = TripleAccumulator::new();
        acc.push('I', -1.0);
        acc.push('K', 5.0);
        assert!(acc.closed().is_empty());
        acc.push('I', -0.5);
        assert_eq!(acc.closed(), &[IjkTriple::new(-1.0, 0.0, 5.0)]);
        assert_eq!(
            acc.finish(),
            vec![IjkTriple::new(-1.0, 0.0, 5.0), IjkTriple::new(-0.5, 0.0, 0.0)]
        );
    }

    #[test]
    fn test_accumulator_ignores_other_letters() {
        let mut acc = TripleAccumulator::new();
        acc.push('R', 1.0);
        assert!(acc.finish().is_empty());
    }

    #[test]
    fn test_macro_last_static_wins() {
        let params = extract_macro("G66 P9131 R1 Z-2 R-0.2 S3 T50 I-1 J0.2 K50");
        assert_eq!(params.r, Some(-0.2));
        assert_eq!(params.s, Some(3.0));
        assert_eq!(params.t, Some(50.0));
        assert_eq!(params.triples.len(), 1);
    }

    #[test]
    fn test_fixed_q_default_from_depth() {
        let params = extract_fixed("G83 X0 Y0 Z-1.5 R0 F100", None, None);
        assert!(!params.variable_peck);
        assert_eq!(params.q, Some(0.5));

        let deep = extract_fixed("G83 Z-9 R0 Q0", None, None);
        assert_eq!(deep.q, Some(1.0));

        let flat = extract_fixed("G83 Z0 R0", None, None);
        assert_eq!(flat.q, Some(1.0));

        assert_eq!(default_q(2.0), 0.667);
    }

    #[test]
    fn test_fixed_ijk_default_from_diameter() {
        let params = extract_fixed("G83 Z-6 R0 I0 K0.2 F80", Some(2.0), None);
        assert!(params.variable_peck);
        assert_eq!(params.i, Some(2.2));
        assert_eq!(params.j, Some(0.24));
        assert_eq!(params.k, Some(0.7));
    }

    #[test]
    fn test_fixed_ijk_default_from_depth() {
        let params = extract_fixed("G83 Z-0.9 R0 K0", None, None);
        assert!(params.variable_peck);
        let i = params.i.unwrap_or_default();
        assert!((i - 0.3).abs() < 1e-9);
        assert!((params.j.unwrap_or_default() - 0.06).abs() < 1e-9);
        assert!((params.k.unwrap_or_default() - 0.15).abs() < 1e-9);
    }

    #[test]
    fn test_fixed_degenerate_variable_falls_back() {
        // A diameter too small for the presets leaves I and K at zero
        let params = extract_fixed("G83 Z-3 R0 I0 K0", Some(0.00005), None);
        assert!(!params.variable_peck);
        assert_eq!(params.q, Some(1.0));
    }

    #[test]
    fn test_fixed_keeps_position_text() {
        let params = extract_fixed("G83 X12.500 Y-3. Z-3 R0 Q1", None, None);
        assert_eq!(params.x.as_deref(), Some("12.500"));
        assert_eq!(params.y.as_deref(), Some("-3"));
    }
}
