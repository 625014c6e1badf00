//! Tool diameter lookup around a tool change

use peckkit_core::constants::ZERO_TOLERANCE;

use crate::tokens::diameters;

/// First positive diameter word within `radius` lines of `line_index`
///
/// The window is clipped to the program and read top to bottom, so a
/// diameter above the tool change wins over one below it.
pub fn resolve_diameter<S: AsRef<str>>(lines: &[S], line_index: usize, radius: usize) -> Option<f64> {
    if lines.is_empty() {
        return None;
    }
    let start = line_index.saturating_sub(radius);
    let end = line_index.saturating_add(radius).min(lines.len() - 1);
    if start > end {
        return None;
    }

    lines[start..=end]
        .iter()
        .flat_map(|line| diameters(line.as_ref()))
        .find(|&d| d > ZERO_TOLERANCE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_is_clipped() {
        let lines = ["(T1 D6.0)", "T1 M06", "G00 X0"];
        assert_eq!(resolve_diameter(&lines, 1, 10), Some(6.0));
    }

    #[test]
    fn test_zero_diameter_skipped() {
        let lines = ["D0", "T2 M06", "(DIA D2.5)"];
        assert_eq!(resolve_diameter(&lines, 1, 10), Some(2.5));
    }

    #[test]
    fn test_outside_radius_ignored() {
        let mut lines = vec!["(D8.0)".to_string()];
        lines.extend((0..5).map(|_| "G00".to_string()));
        lines.push("T3 M06".to_string());
        assert_eq!(resolve_diameter(&lines, 6, 2), None);
        assert_eq!(resolve_diameter(&lines, 6, 6), Some(8.0));
    }
}
