//! Cycle time estimation
//!
//! Times are in minutes. The first stage feeds from the R point to its
//! target. Every later stage rapids from R to just above the previously
//! drilled depth (by the clearance), then feeds the rest. Each stage ends
//! with a rapid retract to R. The macro and fixed cycles share this rule.

use peckkit_core::{CycleKind, PeckStage};
use serde::Serialize;

/// What is needed to time one cycle
#[derive(Debug, Clone, Copy)]
pub struct CutProfile<'a> {
    pub kind: CycleKind,
    pub stages: &'a [PeckStage],
    /// Feed rate (mm/min)
    pub feedrate: f64,
    pub r_point: f64,
}

/// Estimate the time of one cycle
///
/// Returns `f64::INFINITY` when the feed rate or rapid speed is not positive.
pub fn estimate_time(profile: &CutProfile<'_>, rapid_speed: f64, clearance: f64) -> f64 {
    if profile.feedrate <= 0.0 || rapid_speed <= 0.0 {
        return f64::INFINITY;
    }

    let r = profile.r_point;
    let mut total = 0.0;
    let mut current = r;

    for (idx, stage) in profile.stages.iter().enumerate() {
        let previous = current;
        let target = previous + stage.depth_increment;

        if idx == 0 {
            total += (target - r).abs() / profile.feedrate;
        } else {
            let resume = previous + clearance;
            total += (r - resume).abs() / rapid_speed;
            total += (target - resume).abs() / profile.feedrate;
        }

        total += (target - r).abs() / rapid_speed;
        current = target;
    }

    tracing::trace!(
        "{} cycle: {} stages, {:.4} min",
        profile.kind,
        profile.stages.len(),
        total
    );
    total
}

/// Current parameters timed against the parse-time parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EfficiencyComparison {
    /// Positive when the current parameters are faster
    pub percent_saved: f64,
    pub stage_count_before: usize,
    pub stage_count_after: usize,
    pub time_before: f64,
    pub time_after: f64,
}

/// Compare two cycle profiles
///
/// `percent_saved` is 0 when either time is infinite or the initial time is
/// not positive.
pub fn compare(
    current: &CutProfile<'_>,
    initial: &CutProfile<'_>,
    rapid_speed: f64,
    clearance: f64,
) -> EfficiencyComparison {
    let time_after = estimate_time(current, rapid_speed, clearance);
    let time_before = estimate_time(initial, rapid_speed, clearance);

    let percent_saved = if time_before > 0.0 && time_before.is_finite() && time_after.is_finite()
    {
        (time_before - time_after) / time_before * 100.0
    } else {
        0.0
    };

    EfficiencyComparison {
        percent_saved,
        stage_count_before: initial.stages.len(),
        stage_count_after: current.stages.len(),
        time_before,
        time_after,
    }
}
