//! Peck stage simulation
//!
//! Expands a cycle's compact peck policy into the explicit list of
//! plunge-and-retract stages the controller would execute.

use peckkit_core::constants::ZERO_TOLERANCE;
use peckkit_core::{round_to, CycleParams, FixedParams, PeckMode, PeckStage};

/// Exponent of the default power-decay peck profile
pub const DEFAULT_DECAY_POWER: f64 = 0.6;

/// Simulate the stages of a peck cycle from `r` down (or up) to `z`
///
/// Each stage advances by the current peck, clamped so it never passes `z`.
/// In variable mode the peck shrinks by `|decrement|` after every stage and
/// never drops below `|minimum|`. A starting peck of 1e-6 or less yields no
/// stages.
pub fn simulate(r: f64, z: f64, mode: PeckMode) -> Vec<PeckStage> {
    let (mut peck, reduction, floor) = match mode {
        PeckMode::Constant { q } => (q.abs(), 0.0, 0.0),
        PeckMode::Variable {
            initial,
            decrement,
            minimum,
        } => (initial.abs(), decrement.abs(), minimum.abs()),
    };
    if peck <= ZERO_TOLERANCE {
        return Vec::new();
    }

    let drilling_down = z < r;
    let mut current = r;
    let mut stages = Vec::new();

    loop {
        let (next, increment) = if drilling_down {
            let next = (current - peck).max(z);
            (next, current - next)
        } else {
            let next = (current + peck).min(z);
            (next, next - current)
        };

        if increment < ZERO_TOLERANCE {
            break;
        }

        stages.push(PeckStage {
            depth_increment: if drilling_down { -increment } else { increment },
            retract_offset: r - next,
        });
        current = next;

        if (drilling_down && current <= z) || (!drilling_down && current >= z) {
            break;
        }

        if mode.is_variable() {
            peck = (peck - reduction).max(floor);
        }
    }

    stages
}

/// Stages of a fixed cycle; absent R or Z count as zero
pub fn simulate_fixed(params: &FixedParams) -> Vec<PeckStage> {
    simulate(
        params.r.unwrap_or(0.0),
        params.z.unwrap_or(0.0),
        params.peck_mode(),
    )
}

/// Stage list for any cycle
///
/// Derived by simulation for the fixed cycle; the macro cycle's explicit
/// triples are its stages.
pub fn cycle_stages(params: &CycleParams) -> Vec<PeckStage> {
    match params {
        CycleParams::Macro(p) => p.triples.iter().copied().map(PeckStage::from).collect(),
        CycleParams::Fixed(p) => simulate_fixed(p),
    }
}

/// Power-decay peck sequence from `initial` toward `minimum`
///
/// Peck `n` is `minimum + (initial - minimum) * (1 - (drilled/depth)^power)`,
/// held between `minimum` and the previous peck, with the last peck trimmed
/// to land on `depth`. Returns positive peck depths rounded to 4 decimals.
/// Degenerate input (non-positive depth, initial or minimum) yields nothing.
pub fn decay_profile(initial: f64, minimum: f64, depth: f64, power: f64) -> Vec<f64> {
    if depth <= ZERO_TOLERANCE || initial <= ZERO_TOLERANCE || minimum <= ZERO_TOLERANCE {
        return Vec::new();
    }

    let mut pecks = Vec::new();
    let mut drilled = 0.0;
    let mut last = initial;

    while drilled < depth - ZERO_TOLERANCE {
        let decay = 1.0 - (drilled / depth).powf(power);
        let mut peck = (minimum + (initial - minimum) * decay)
            .max(minimum)
            .min(last);

        if drilled + peck > depth {
            peck = depth - drilled;
        }

        pecks.push(round_to(peck, 4));
        drilled += peck;
        last = peck;
    }

    pecks
}
