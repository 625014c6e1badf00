//! Process constant lookup
//!
//! The optimization engine reads material, coolant and tool-material
//! constants through [`ProcessTables`]. Every lookup is optional: a provider
//! answers `None` for keys it does not know, and callers fall back to their
//! built-in constants. A persisted configuration store implements this trait.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Base cutting data for a workpiece material
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaterialCutting {
    /// Cutting speed in m/min
    pub cutting_speed: f64,
    /// Feed per revolution as a fraction of tool diameter
    pub feed_factor: f64,
}

/// Speed and feed multipliers for a tool material
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToolMaterialRatios {
    pub speed_ratio: f64,
    pub feed_ratio: f64,
}

/// Diameter-proportional I/J/K ratios
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeckRatios {
    pub i_ratio: f64,
    pub j_ratio: f64,
    pub k_ratio: f64,
}

/// Named I/J/K ratio preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PeckPreset {
    Safety,
    #[default]
    Efficient,
    DeepHole,
}

impl PeckPreset {
    /// Key used by configuration files
    pub fn key(&self) -> &'static str {
        match self {
            Self::Safety => "safety",
            Self::Efficient => "efficient",
            Self::DeepHole => "deep_hole",
        }
    }

    pub fn all() -> &'static [PeckPreset] {
        &[PeckPreset::Safety, PeckPreset::Efficient, PeckPreset::DeepHole]
    }
}

impl fmt::Display for PeckPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl FromStr for PeckPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "safety" => Ok(Self::Safety),
            "efficient" => Ok(Self::Efficient),
            "deep_hole" | "deep-hole" => Ok(Self::DeepHole),
            other => Err(format!("Unknown peck preset: {}", other)),
        }
    }
}

/// Numeric machine limits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MachineLimit {
    /// Spindle speed ceiling
    MaxRpm,
    /// Smallest constant peck the optimizer will emit
    MinPeck,
    /// Diameter below which the micro-tool feed penalty applies
    MicroToolThreshold,
    /// Feed multiplier for micro tools
    MicroToolPenalty,
}

/// Read-only source of process constants
pub trait ProcessTables {
    /// Cutting data for a workpiece material key
    fn material(&self, key: &str) -> Option<MaterialCutting>;

    /// Cutting-speed multiplier for a coolant mode
    fn coolant_factor(&self, mode: &str) -> Option<f64>;

    /// Speed/feed ratios for a tool material key
    fn tool_material(&self, key: &str) -> Option<ToolMaterialRatios>;

    /// I/J/K ratios for a named preset
    fn peck_ratios(&self, preset: PeckPreset) -> Option<PeckRatios>;

    fn limit(&self, limit: MachineLimit) -> Option<f64>;

    /// DRI multiplier for a workpiece material
    fn dri_material_factor(&self, key: &str) -> Option<f64>;

    /// DRI multiplier for a coolant mode
    fn dri_coolant_factor(&self, mode: &str) -> Option<f64>;

    /// DRI multiplier for a tool material
    fn dri_tool_factor(&self, key: &str) -> Option<f64>;

    /// Taylor tool-life exponent `n` for a tool material
    fn taylor_exponent(&self, key: &str) -> Option<f64>;

    /// `(time, life)` weights of the optimization score
    fn optimization_weights(&self) -> Option<(f64, f64)> {
        None
    }
}
