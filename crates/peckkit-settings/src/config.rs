//! Machining configuration for PeckKit
//!
//! Provides the persisted constant tables consumed by the optimizer:
//! workpiece materials, coolant and tool-material multipliers, I/J/K ratio
//! presets, machine limits, DRI factors, Taylor exponents and score weights.
//! Supports JSON and TOML files. A user file only needs the keys it changes;
//! everything else is merged in from the defaults.

use peckkit_core::data::{
    MachineLimit, MaterialCutting, PeckPreset, PeckRatios, ProcessTables, ToolMaterialRatios,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{SettingsError, SettingsResult};

/// Material used when a requested key is unknown
const FALLBACK_MATERIAL: &str = "AL6061";

/// Cutting data for one workpiece material
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialEntry {
    /// Cutting speed in m/min
    #[serde(rename = "Vc")]
    pub cutting_speed: f64,
    /// Feed per revolution as a fraction of tool diameter
    #[serde(rename = "fr_factor")]
    pub feed_factor: f64,
    /// Human readable name
    #[serde(rename = "desc", default)]
    pub description: String,
}

impl MaterialEntry {
    fn new(cutting_speed: f64, feed_factor: f64, description: &str) -> Self {
        Self {
            cutting_speed,
            feed_factor,
            description: description.to_string(),
        }
    }
}

/// Numeric machine limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Limits {
    /// Spindle ceiling (RPM)
    pub max_rpm: f64,
    /// Smallest constant peck the optimizer emits (mm)
    pub min_q: f64,
    /// Tool diameter below which micro-drill protection applies (mm)
    pub micro_drill_threshold: f64,
    /// Feed multiplier applied to micro drills
    pub micro_drill_penalty: f64,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_rpm: 40000.0,
            min_q: 0.05,
            micro_drill_threshold: 1.0,
            micro_drill_penalty: 0.8,
        }
    }
}

/// Multipliers feeding the drilling risk index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriFactors {
    pub material: BTreeMap<String, f64>,
    pub coolant: BTreeMap<String, f64>,
    pub tool: BTreeMap<String, f64>,
}

impl Default for DriFactors {
    fn default() -> Self {
        Self {
            material: table(&[
                ("AL6061", 0.8),
                ("SUS304", 1.4),
                ("SUS420", 1.2),
                ("TI6AL4V", 1.6),
                ("CERAMIC", 2.0),
            ]),
            coolant: table(&[("Internal", 0.75), ("MQL", 1.2), ("Dry", 1.6)]),
            tool: table(&[("CARBIDE", 0.9), ("HSS", 1.4)]),
        }
    }
}

/// Taylor tool-life parameters for one tool material
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaylorParams {
    pub n: f64,
}

/// Weights of the optimization score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptimizationWeights {
    pub time: f64,
    pub life: f64,
}

impl Default for OptimizationWeights {
    fn default() -> Self {
        Self {
            time: 0.7,
            life: 0.3,
        }
    }
}

/// Complete machining configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachiningConfig {
    /// Workpiece materials by key
    pub materials: BTreeMap<String, MaterialEntry>,
    /// Cutting-speed multiplier per coolant mode
    pub coolant_factors: BTreeMap<String, f64>,
    /// Speed/feed ratios per tool material
    pub tool_materials: BTreeMap<String, ToolMaterialRatios>,
    /// I/J/K ratio presets (`safety`, `efficient`, `deep_hole`)
    pub ijk_strategies: BTreeMap<String, PeckRatios>,
    pub limits: Limits,
    pub dri_factors: DriFactors,
    /// Taylor exponent per tool material
    pub taylor_params: BTreeMap<String, TaylorParams>,
    pub optimization_weights: OptimizationWeights,
}

impl Default for MachiningConfig {
    fn default() -> Self {
        let materials = [
            ("AL6061", MaterialEntry::new(100.0, 0.015, "Aluminum 6061")),
            ("SUS304", MaterialEntry::new(25.0, 0.008, "Stainless 304")),
            ("SUS420", MaterialEntry::new(35.0, 0.009, "Stainless 420J2")),
            ("TI6AL4V", MaterialEntry::new(18.0, 0.006, "Titanium Ti-6Al-4V")),
            ("CERAMIC", MaterialEntry::new(15.0, 0.003, "Engineering ceramic")),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        let tool_materials = [
            (
                "CARBIDE",
                ToolMaterialRatios {
                    speed_ratio: 1.0,
                    feed_ratio: 1.0,
                },
            ),
            (
                "HSS",
                ToolMaterialRatios {
                    speed_ratio: 0.4,
                    feed_ratio: 0.8,
                },
            ),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        let ijk_strategies = [
            (PeckPreset::Safety, ratios(0.5, 0.1, 0.2)),
            (PeckPreset::Efficient, ratios(0.8, 0.15, 0.3)),
            (PeckPreset::DeepHole, ratios(0.4, 0.05, 0.1)),
        ]
        .into_iter()
        .map(|(k, v)| (k.key().to_string(), v))
        .collect();

        let taylor_params = [("CARBIDE", 0.22), ("HSS", 0.10)]
            .into_iter()
            .map(|(k, n)| (k.to_string(), TaylorParams { n }))
            .collect();

        Self {
            materials,
            coolant_factors: table(&[("MQL", 0.8), ("Internal", 1.1), ("Dry", 0.6)]),
            tool_materials,
            ijk_strategies,
            limits: Limits::default(),
            dri_factors: DriFactors::default(),
            taylor_params,
            optimization_weights: OptimizationWeights::default(),
        }
    }
}

impl MachiningConfig {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Platform location of the configuration file
    pub fn default_path() -> SettingsResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("peckkit").join("machining.json"))
            .ok_or_else(|| {
                SettingsError::ConfigDirectory("no configuration directory on this platform".into())
            })
    }

    /// Load config from file (JSON or TOML), filling missing keys from defaults
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path)?;

        let user: Value = match Format::from_path(path)? {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };

        let mut merged = serde_json::to_value(Self::default())?;
        merge_values(&mut merged, user);
        let config: Self = serde_json::from_value(merged)?;

        config.validate()?;
        tracing::info!("Loaded machining config from {}", path.display());
        Ok(config)
    }

    /// Load config from file, or defaults if the file is missing or unusable
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from_file(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Error loading config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match Format::from_path(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, content)?;
        tracing::info!("Saved machining config to {}", path.display());
        Ok(())
    }

    /// Load `source` and persist it at `target` so it is active next time
    pub fn import_from(source: &Path, target: &Path) -> SettingsResult<Self> {
        let config = Self::load_from_file(source)?;
        config.save_to_file(target)?;
        Ok(config)
    }

    /// Restore defaults and persist them at `path`
    pub fn reset_to_defaults(&mut self, path: &Path) -> SettingsResult<()> {
        *self = Self::default();
        self.save_to_file(path)
    }

    /// Validate configuration
    pub fn validate(&self) -> SettingsResult<()> {
        for (key, material) in &self.materials {
            if material.cutting_speed <= 0.0 || material.feed_factor <= 0.0 {
                return Err(invalid(
                    format!("materials.{}", key),
                    "cutting speed and feed factor must be > 0",
                ));
            }
        }

        for (key, ratios) in &self.tool_materials {
            if ratios.speed_ratio <= 0.0 || ratios.feed_ratio <= 0.0 {
                return Err(invalid(
                    format!("tool_materials.{}", key),
                    "ratios must be > 0",
                ));
            }
        }

        for (key, r) in &self.ijk_strategies {
            if r.i_ratio <= 0.0 || r.j_ratio < 0.0 || r.k_ratio < 0.0 {
                return Err(invalid(
                    format!("ijk_strategies.{}", key),
                    "i_ratio must be > 0 and j/k ratios >= 0",
                ));
            }
        }

        if self.limits.max_rpm <= 0.0 {
            return Err(invalid("limits.max_rpm", "must be > 0"));
        }
        if self.limits.min_q <= 0.0 {
            return Err(invalid("limits.min_q", "must be > 0"));
        }
        if self.limits.micro_drill_penalty <= 0.0 {
            return Err(invalid("limits.micro_drill_penalty", "must be > 0"));
        }

        for (key, taylor) in &self.taylor_params {
            if taylor.n <= 0.0 {
                return Err(invalid(format!("taylor_params.{}", key), "n must be > 0"));
            }
        }

        Ok(())
    }

    /// Material keys in display order
    pub fn material_keys(&self) -> impl Iterator<Item = &str> {
        self.materials.keys().map(String::as_str)
    }
}

impl ProcessTables for MachiningConfig {
    fn material(&self, key: &str) -> Option<MaterialCutting> {
        self.materials
            .get(key)
            .or_else(|| self.materials.get(FALLBACK_MATERIAL))
            .map(|m| MaterialCutting {
                cutting_speed: m.cutting_speed,
                feed_factor: m.feed_factor,
            })
    }

    fn coolant_factor(&self, mode: &str) -> Option<f64> {
        self.coolant_factors.get(mode).copied()
    }

    fn tool_material(&self, key: &str) -> Option<ToolMaterialRatios> {
        self.tool_materials.get(key).copied()
    }

    fn peck_ratios(&self, preset: PeckPreset) -> Option<PeckRatios> {
        self.ijk_strategies
            .get(preset.key())
            .or_else(|| self.ijk_strategies.get(PeckPreset::Efficient.key()))
            .copied()
    }

    fn limit(&self, limit: MachineLimit) -> Option<f64> {
        Some(match limit {
            MachineLimit::MaxRpm => self.limits.max_rpm,
            MachineLimit::MinPeck => self.limits.min_q,
            MachineLimit::MicroToolThreshold => self.limits.micro_drill_threshold,
            MachineLimit::MicroToolPenalty => self.limits.micro_drill_penalty,
        })
    }

    fn dri_material_factor(&self, key: &str) -> Option<f64> {
        self.dri_factors.material.get(key).copied()
    }

    fn dri_coolant_factor(&self, mode: &str) -> Option<f64> {
        self.dri_factors.coolant.get(mode).copied()
    }

    fn dri_tool_factor(&self, key: &str) -> Option<f64> {
        self.dri_factors.tool.get(key).copied()
    }

    fn taylor_exponent(&self, key: &str) -> Option<f64> {
        self.taylor_params.get(key).map(|t| t.n)
    }

    fn optimization_weights(&self) -> Option<(f64, f64)> {
        Some((self.optimization_weights.time, self.optimization_weights.life))
    }
}

#[derive(Debug, Clone, Copy)]
enum Format {
    Json,
    Toml,
}

impl Format {
    fn from_path(path: &Path) -> SettingsResult<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            other => Err(SettingsError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }
}

/// Recursively overlay `user` onto `base`; objects merge key by key,
/// anything else replaces.
fn merge_values(base: &mut Value, user: Value) {
    match (base, user) {
        (Value::Object(base_map), Value::Object(user_map)) => {
            for (key, value) in user_map {
                match base_map.get_mut(&key) {
                    Some(existing) if existing.is_object() && value.is_object() => {
                        merge_values(existing, value)
                    }
                    _ => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (base, user) => *base = user,
    }
}

fn table(entries: &[(&str, f64)]) -> BTreeMap<String, f64> {
    entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

fn ratios(i_ratio: f64, j_ratio: f64, k_ratio: f64) -> PeckRatios {
    PeckRatios {
        i_ratio,
        j_ratio,
        k_ratio,
    }
}

fn invalid(key: impl Into<String>, reason: &str) -> SettingsError {
    SettingsError::InvalidSetting {
        key: key.into(),
        reason: reason.to_string(),
    }
}
