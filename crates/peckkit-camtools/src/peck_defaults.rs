//! Default variable-peck parameters
//!
//! Two families: fixed ratio presets applied to the raw tool diameter, and
//! curves that shrink the pecks as the hole gets deeper relative to the tool.

use peckkit_core::{round_to, IjkTriple, PeckPreset, PeckRatios, ProcessTables};

/// Diameters at or below this get no defaults
const MIN_DIAMETER: f64 = 0.0001;

/// L/D ratios above this are treated as this value by the curves
const LD_CURVE_LIMIT: f64 = 10.0;

/// Ratios used when no configuration is available
pub fn builtin_ratios(preset: PeckPreset) -> PeckRatios {
    let (i_ratio, j_ratio, k_ratio) = match preset {
        PeckPreset::Safety => (0.8, 0.1, 0.25),
        PeckPreset::Efficient => (1.1, 0.12, 0.35),
        PeckPreset::DeepHole => (0.6, 0.05, 0.15),
    };
    PeckRatios {
        i_ratio,
        j_ratio,
        k_ratio,
    }
}

/// Initial peck, reduction and minimum peck for a tool diameter
///
/// Ratios come from `tables` when it knows the preset, the built-in presets
/// otherwise. Values are rounded to 3 decimals.
pub fn default_ijk(
    diameter: f64,
    preset: PeckPreset,
    tables: Option<&dyn ProcessTables>,
) -> IjkTriple {
    if diameter <= MIN_DIAMETER {
        return IjkTriple::default();
    }

    let ratios = tables
        .and_then(|t| t.peck_ratios(preset))
        .unwrap_or_else(|| builtin_ratios(preset));

    IjkTriple::new(
        round_to(diameter * ratios.i_ratio, 3),
        round_to(diameter * ratios.j_ratio, 3),
        round_to(diameter * ratios.k_ratio, 3),
    )
}

/// L/D-sensitive initial peck, reduction and minimum peck
///
/// I = D(1.2 - 0.08r) in [0.4D, 1.2D], J = D(0.18 - 0.01r) in [0.04D, 0.18D],
/// K = D(0.25 - 0.01r) in [0.08D, 0.25D], with r the L/D ratio capped at 10.
pub fn ld_sensitive_ijk(diameter: f64, ld_ratio: f64) -> IjkTriple {
    let r = ld_ratio.min(LD_CURVE_LIMIT);
    let i_factor = (1.2 - 0.08 * r).clamp(0.4, 1.2);
    let j_factor = (0.18 - 0.01 * r).clamp(0.04, 0.18);
    let k_factor = (0.25 - 0.01 * r).clamp(0.08, 0.25);

    IjkTriple::new(
        round_to(diameter * i_factor, 3),
        round_to(diameter * j_factor, 3),
        round_to(diameter * k_factor, 3),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_efficient() {
        let ijk = default_ijk(2.0, PeckPreset::Efficient, None);
        assert_eq!(ijk, IjkTriple::new(2.2, 0.24, 0.7));
    }

    #[test]
    fn test_tiny_diameter_gives_zeros() {
        assert!(default_ijk(0.00005, PeckPreset::Safety, None).is_zero());
        assert!(default_ijk(-1.0, PeckPreset::Safety, None).is_zero());
    }

    #[test]
    fn test_ld_curves_shallow_and_capped() {
        assert_eq!(ld_sensitive_ijk(1.0, 0.0), IjkTriple::new(1.2, 0.18, 0.25));
        // r = 10: 0.4, 0.08, 0.15
        assert_eq!(ld_sensitive_ijk(2.0, 10.0), IjkTriple::new(0.8, 0.16, 0.3));
        assert_eq!(ld_sensitive_ijk(2.0, 25.0), ld_sensitive_ijk(2.0, 10.0));
    }
}
