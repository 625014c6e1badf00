//! Risk-aware drilling parameter optimization
//!
//! A request is classified once by its Drilling Risk Index (DRI), which
//! grows with the hole's L/D ratio and is scaled by material, coolant and
//! tool-material factors. The resulting strategy decides the peck policy;
//! speed and feed come from the material tables with deep-hole derating.

use std::f64::consts::PI;
use std::fmt;

use peckkit_core::constants::DEFAULT_MAX_RPM;
use peckkit_core::{
    round_to, IjkTriple, MachineLimit, MaterialCutting, ProcessTables, ToolMaterialRatios,
};
use serde::{Deserialize, Serialize};

use crate::error::{ParameterError, ParameterResult};
use crate::peck_defaults::ld_sensitive_ijk;
use crate::peck_simulator::{decay_profile, DEFAULT_DECAY_POWER};

/// DRI reported for a non-positive tool diameter
pub const DEGENERATE_DRI: f64 = 999.0;

const FALLBACK_MATERIAL: MaterialCutting = MaterialCutting {
    cutting_speed: 50.0,
    feed_factor: 0.01,
};
const CARBIDE: ToolMaterialRatios = ToolMaterialRatios {
    speed_ratio: 1.0,
    feed_ratio: 1.0,
};
const HSS: ToolMaterialRatios = ToolMaterialRatios {
    speed_ratio: 0.4,
    feed_ratio: 0.8,
};
const DEFAULT_MIN_PECK: f64 = 0.05;
const DEFAULT_MICRO_THRESHOLD: f64 = 1.0;
const DEFAULT_MICRO_PENALTY: f64 = 0.8;
const DEFAULT_WEIGHTS: (f64, f64) = (0.7, 0.3);

/// Extra depth past the chamfer break-through (mm)
const BREAKTHROUGH_MARGIN: f64 = 0.2;
/// Speed derating per unit of L/D
const SPEED_DEPTH_COEFF: f64 = 0.035;
/// Feed derating per unit of L/D
const FEED_DEPTH_COEFF: f64 = 0.02;
/// Shrink applied to initial and minimum peck in deep-protect mode
const DEEP_PROTECT_SHRINK: f64 = 0.8;
/// Below this DRI a direct strategy drills without pecking
const NO_PECK_DRI: f64 = 4.0;

/// Drilling strategy selected from the DRI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DrillingStrategy {
    /// DRI < 6: no or a single long peck
    Direct,
    /// DRI < 18: constant Q peck
    ConstantPeck,
    /// DRI < 40: decaying I/J/K peck
    VariableDecayPeck,
    /// DRI >= 40: decaying peck with extra shrink
    DeepProtect,
}

impl DrillingStrategy {
    /// Strategies that call for I/J/K pecking
    pub fn wants_variable_peck(&self) -> bool {
        matches!(self, Self::VariableDecayPeck | Self::DeepProtect)
    }
}

impl fmt::Display for DrillingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Direct => "DIRECT",
            Self::ConstantPeck => "Q_MODE",
            Self::VariableDecayPeck => "IJK_DYNAMIC",
            Self::DeepProtect => "DEEP_PROTECT",
        };
        f.write_str(name)
    }
}

/// Select the strategy tier for a DRI
pub fn select_strategy(dri: f64) -> DrillingStrategy {
    if dri < 6.0 {
        DrillingStrategy::Direct
    } else if dri < 18.0 {
        DrillingStrategy::ConstantPeck
    } else if dri < 40.0 {
        DrillingStrategy::VariableDecayPeck
    } else {
        DrillingStrategy::DeepProtect
    }
}

/// Drilling Risk Index
///
/// `(1.2 + (depth/diameter)^1.4)` times the material, coolant and tool
/// factors; a factor the tables do not know (or no tables) counts as 1.
pub fn drilling_risk_index(
    diameter: f64,
    depth: f64,
    material: &str,
    coolant: &str,
    tool_material: &str,
    tables: Option<&dyn ProcessTables>,
) -> f64 {
    if diameter <= 0.0 {
        return DEGENERATE_DRI;
    }

    let ld_ratio = depth / diameter;
    let risk_depth = 1.2 + ld_ratio.powf(1.4);

    let (material_factor, coolant_factor, tool_factor) = match tables {
        Some(t) => (
            t.dri_material_factor(material).unwrap_or(1.0),
            t.dri_coolant_factor(coolant).unwrap_or(1.0),
            t.dri_tool_factor(tool_material).unwrap_or(1.0),
        ),
        None => (1.0, 1.0, 1.0),
    };

    risk_depth * material_factor * coolant_factor * tool_factor
}

/// Relative tool life from a Taylor speed factor with depth and load penalties
pub fn tool_life_index(
    adjusted_speed: f64,
    reference_speed: f64,
    tool_material: &str,
    ld_ratio: f64,
    feed_ratio: f64,
    tables: Option<&dyn ProcessTables>,
) -> f64 {
    let builtin_n = if tool_material == "CARBIDE" { 0.22 } else { 0.10 };
    let n = tables
        .and_then(|t| t.taylor_exponent(tool_material))
        .unwrap_or(builtin_n);

    let life_factor = if adjusted_speed > 0.0 {
        (reference_speed / adjusted_speed).powf(1.0 / n)
    } else {
        0.0
    };
    let depth_penalty = 1.0 / (1.0 + 0.08 * ld_ratio.powf(1.3));
    let load_penalty = if feed_ratio > 0.0 {
        (1.0 / feed_ratio).powf(0.4)
    } else {
        0.0
    };

    life_factor * depth_penalty * load_penalty
}

/// Inputs of one optimization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizationRequest {
    /// Tool diameter (mm)
    pub tool_diameter: f64,
    /// Requested hole bottom; its magnitude is the depth
    pub target_z: f64,
    pub material: String,
    pub tool_material: String,
    pub coolant: String,
    /// Spindle speed to keep; recalculated when `None` or not positive
    pub current_rpm: Option<f64>,
    /// Stock thickness for chamfer compensation (mm)
    pub material_thickness: f64,
    /// Exit chamfer width (mm); zero disables compensation
    pub exit_chamfer: f64,
    /// Drill point angle (degrees)
    pub tip_angle: f64,
    /// Spindle ceiling when the tables do not provide one
    pub max_rpm: f64,
    /// Force I/J/K (`Some(true)`) or Q (`Some(false)`) pecking
    pub prefer_variable_peck: Option<bool>,
}

impl Default for OptimizationRequest {
    fn default() -> Self {
        Self {
            tool_diameter: 0.0,
            target_z: 0.0,
            material: "AL6061".to_string(),
            tool_material: "CARBIDE".to_string(),
            coolant: "MQL".to_string(),
            current_rpm: None,
            material_thickness: 0.0,
            exit_chamfer: 0.0,
            tip_angle: 118.0,
            max_rpm: DEFAULT_MAX_RPM,
            prefer_variable_peck: None,
        }
    }
}

/// Something the optimizer did or warns about
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "note", rename_all = "snake_case")]
pub enum OptimizationNote {
    /// Z deepened to break through the exit chamfer
    DepthCompensated { z: f64 },
    RiskAssessed { dri: f64, strategy: DrillingStrategy },
    /// Caller's spindle speed kept
    FixedRpm { rpm: f64 },
    RpmClamped { max_rpm: f64 },
    SpeedDepthFactor { factor: f64 },
    MicroToolPenalty { penalty: f64 },
    FeedDepthFactor { factor: f64 },
    /// Constant pecking chosen although the risk tier calls for I/J/K
    RiskConflict { dri: f64 },
    DeepProtectShrink,
}

impl fmt::Display for OptimizationNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DepthCompensated { z } => {
                write!(f, "Geometry: Z deepened to {} to clear the exit chamfer", z)
            }
            Self::RiskAssessed { dri, strategy } => {
                write!(f, "Risk: DRI={} (strategy {})", dri, strategy)
            }
            Self::FixedRpm { rpm } => write!(f, "Spindle: keeping {} RPM", *rpm as i64),
            Self::RpmClamped { max_rpm } => {
                write!(f, "Machine limit: spindle clamped to {} RPM", *max_rpm as i64)
            }
            Self::SpeedDepthFactor { factor } => {
                write!(f, "Depth derating: S factor {}", round_to(*factor, 2))
            }
            Self::MicroToolPenalty { penalty } => {
                write!(f, "Micro drill: F multiplied by {}", penalty)
            }
            Self::FeedDepthFactor { factor } => {
                write!(f, "Depth derating: F factor {}", round_to(*factor, 2))
            }
            Self::RiskConflict { dri } => write!(
                f,
                "Warning: DRI={} is high, I/J/K pecking is strongly recommended",
                dri
            ),
            Self::DeepProtectShrink => write!(f, "Deep protect: initial and minimum peck reduced"),
        }
    }
}

/// Optimized cycle parameters
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimizationResult {
    pub spindle_rpm: f64,
    pub feedrate: f64,
    /// Hole bottom, possibly deepened for the exit chamfer
    pub target_z: f64,
    pub variable_peck: bool,
    /// Constant peck; 0 means drill without pecking
    pub q: f64,
    /// Initial, reduction and minimum peck; zero unless `variable_peck`
    pub ijk: IjkTriple,
    /// Power-decay peck sequence for the I/K pair; empty unless `variable_peck`
    pub decay_profile: Vec<f64>,
    pub dri: f64,
    pub strategy: DrillingStrategy,
    pub life_index: f64,
    pub score: f64,
    pub notes: Vec<OptimizationNote>,
}

/// Derive speed, feed, depth and peck parameters for a hole
///
/// # Errors
/// `InvalidDimensions` for a non-positive tool diameter, `InvalidValue` for a
/// tip angle that cannot form a cone when chamfer compensation is requested.
pub fn optimize(
    request: &OptimizationRequest,
    tables: Option<&dyn ProcessTables>,
) -> ParameterResult<OptimizationResult> {
    let dia = request.tool_diameter;
    if dia <= 0.0 {
        return Err(ParameterError::InvalidDimensions(
            "tool diameter must be greater than 0".to_string(),
        ));
    }

    let mut notes = Vec::new();
    let mut target_z = request.target_z;
    let mut depth = target_z.abs();
    let mut ld_ratio = depth / dia;

    let material = tables
        .and_then(|t| t.material(&request.material))
        .unwrap_or(FALLBACK_MATERIAL);
    let tool = tables
        .and_then(|t| t.tool_material(&request.tool_material))
        .unwrap_or_else(|| builtin_tool_material(&request.tool_material));
    let max_rpm = tables
        .and_then(|t| t.limit(MachineLimit::MaxRpm))
        .filter(|v| *v > 0.0)
        .unwrap_or(request.max_rpm);

    // Chamfer break-through
    if request.exit_chamfer > 0.0 && request.tip_angle > 0.0 {
        if request.tip_angle >= 180.0 {
            return Err(ParameterError::InvalidValue {
                name: "tip_angle".to_string(),
                reason: format!("{} degrees does not form a drill point", request.tip_angle),
            });
        }
        let half_angle = (request.tip_angle / 2.0).to_radians();
        let extra_depth = (request.exit_chamfer / 2.0) / half_angle.tan();
        let compensated = -(request.material_thickness + extra_depth + BREAKTHROUGH_MARGIN);
        if compensated < target_z {
            target_z = round_to(compensated, 4);
            depth = target_z.abs();
            ld_ratio = depth / dia;
            notes.push(OptimizationNote::DepthCompensated { z: target_z });
        }
    }

    // Risk tier
    let raw_dri = drilling_risk_index(
        dia,
        depth,
        &request.material,
        &request.coolant,
        &request.tool_material,
        tables,
    );
    let strategy = select_strategy(raw_dri);
    let dri = round_to(raw_dri, 1);
    notes.push(OptimizationNote::RiskAssessed { dri, strategy });

    // Spindle speed
    let coolant_factor = tables
        .and_then(|t| t.coolant_factor(&request.coolant))
        .unwrap_or(1.0);
    let reference_speed = material.cutting_speed * tool.speed_ratio;
    let base_speed = reference_speed * coolant_factor;
    let speed_factor = 1.0 / (1.0 + SPEED_DEPTH_COEFF * ld_ratio);
    let feed_factor = 1.0 / (1.0 + FEED_DEPTH_COEFF * ld_ratio);
    let final_speed = base_speed * speed_factor;

    let rpm = match request.current_rpm.filter(|s| *s > 0.0) {
        Some(fixed) => {
            notes.push(OptimizationNote::FixedRpm { rpm: fixed });
            fixed
        }
        None => {
            let calculated = final_speed * 1000.0 / (PI * dia);
            if calculated > max_rpm {
                notes.push(OptimizationNote::RpmClamped { max_rpm });
            }
            notes.push(OptimizationNote::SpeedDepthFactor {
                factor: speed_factor,
            });
            calculated.min(max_rpm)
        }
    };

    // Feed
    let micro_threshold = limit_or(tables, MachineLimit::MicroToolThreshold, DEFAULT_MICRO_THRESHOLD);
    let micro_penalty = limit_or(tables, MachineLimit::MicroToolPenalty, DEFAULT_MICRO_PENALTY);
    let mut feed_per_rev = material.feed_factor * dia * tool.feed_ratio;
    if dia < micro_threshold {
        feed_per_rev *= micro_penalty;
        notes.push(OptimizationNote::MicroToolPenalty {
            penalty: micro_penalty,
        });
    }
    let feedrate = round_to(rpm * feed_per_rev * feed_factor, 1);
    if ld_ratio > 3.0 {
        notes.push(OptimizationNote::FeedDepthFactor {
            factor: feed_factor,
        });
    }

    // Peck policy
    let variable_peck = request
        .prefer_variable_peck
        .unwrap_or_else(|| strategy.wants_variable_peck());
    if !variable_peck && strategy.wants_variable_peck() {
        tracing::warn!(
            "DRI {} calls for I/J/K pecking but constant pecking was requested",
            dri
        );
        notes.push(OptimizationNote::RiskConflict { dri });
    }

    let mut q = 0.0;
    let mut ijk = IjkTriple::default();
    let mut profile = Vec::new();
    if variable_peck {
        ijk = ld_sensitive_ijk(dia, ld_ratio);
        if strategy == DrillingStrategy::DeepProtect {
            ijk.i = round_to(ijk.i * DEEP_PROTECT_SHRINK, 3);
            ijk.k = round_to(ijk.k * DEEP_PROTECT_SHRINK, 3);
            notes.push(OptimizationNote::DeepProtectShrink);
        }
        profile = decay_profile(ijk.i, ijk.k, depth, DEFAULT_DECAY_POWER);
    } else if !(strategy == DrillingStrategy::Direct && raw_dri < NO_PECK_DRI) {
        let min_peck = limit_or(tables, MachineLimit::MinPeck, DEFAULT_MIN_PECK);
        q = round_to((dia * 0.8).max(min_peck), 4);
    }

    // Life and score
    let life_index = round_to(
        tool_life_index(
            final_speed,
            reference_speed,
            &request.tool_material,
            ld_ratio,
            feed_factor,
            tables,
        ),
        2,
    );
    let (time_weight, life_weight) = tables
        .and_then(|t| t.optimization_weights())
        .unwrap_or(DEFAULT_WEIGHTS);
    let score = round_to(
        100.0 * (time_weight * (1.0 / ld_ratio.max(0.1)) + life_weight * (life_index / 1000.0)),
        1,
    );

    tracing::info!(
        "Optimized D{} Z{}: {} S{} F{} (DRI {})",
        dia,
        target_z,
        strategy,
        round_to(rpm, 0),
        feedrate,
        dri
    );

    Ok(OptimizationResult {
        spindle_rpm: round_to(rpm, 0),
        feedrate,
        target_z,
        variable_peck,
        q,
        ijk,
        decay_profile: profile,
        dri,
        strategy,
        life_index,
        score,
        notes,
    })
}

fn builtin_tool_material(key: &str) -> ToolMaterialRatios {
    match key {
        "HSS" => HSS,
        _ => CARBIDE,
    }
}

fn limit_or(tables: Option<&dyn ProcessTables>, limit: MachineLimit, fallback: f64) -> f64 {
    tables.and_then(|t| t.limit(limit)).unwrap_or(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_tiers() {
        assert_eq!(select_strategy(5.999), DrillingStrategy::Direct);
        assert_eq!(select_strategy(6.0), DrillingStrategy::ConstantPeck);
        assert_eq!(select_strategy(17.999), DrillingStrategy::ConstantPeck);
        assert_eq!(select_strategy(18.0), DrillingStrategy::VariableDecayPeck);
        assert_eq!(select_strategy(40.0), DrillingStrategy::DeepProtect);
    }

    #[test]
    fn test_dri_without_tables() {
        // ld = 1 -> 1.2 + 1
        let dri = drilling_risk_index(2.0, 2.0, "AL6061", "MQL", "CARBIDE", None);
        assert!((dri - 2.2).abs() < 1e-12);
        assert_eq!(drilling_risk_index(0.0, 2.0, "AL6061", "MQL", "CARBIDE", None), 999.0);
    }

    #[test]
    fn test_tool_life_reference_speed() {
        // Same speed, no depth, nominal feed -> 1
        let life = tool_life_index(50.0, 50.0, "CARBIDE", 0.0, 1.0, None);
        assert!((life - 1.0).abs() < 1e-12);
        assert_eq!(tool_life_index(0.0, 50.0, "HSS", 1.0, 1.0, None), 0.0);
    }

    #[test]
    fn test_strategy_display() {
        assert_eq!(DrillingStrategy::ConstantPeck.to_string(), "Q_MODE");
        assert_eq!(
            serde_json::to_string(&DrillingStrategy::DeepProtect).unwrap(),
            "\"DEEP_PROTECT\""
        );
    }
}
