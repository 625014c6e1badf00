//! Data models for drilling cycles and process constants
//!
//! This module provides:
//! - Cycle records with their current and parse-time parameters
//! - Tagged macro/fixed parameter sets and peck stages
//! - The process constant lookup used by the optimizer

pub mod cycle;
pub mod tables;

use serde::Serialize;
use std::collections::BTreeMap;

pub use cycle::{
    approx_eq, CycleKind, CycleParams, CycleRecord, FixedParams, IjkTriple, MacroParams,
    PeckMode, PeckStage, SpindleRef,
};
pub use tables::{
    MachineLimit, MaterialCutting, PeckPreset, PeckRatios, ProcessTables, ToolMaterialRatios,
};

/// Tool id to diameter, built once per scan
///
/// Entries are only ever added or overwritten when the same tool id is seen
/// again with a diameter.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ToolDiameterMap {
    diameters: BTreeMap<String, f64>,
}

impl ToolDiameterMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, tool_id: impl Into<String>, diameter: f64) {
        self.diameters.insert(tool_id.into(), diameter);
    }

    pub fn get(&self, tool_id: &str) -> Option<f64> {
        self.diameters.get(tool_id).copied()
    }

    pub fn len(&self) -> usize {
        self.diameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diameters.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.diameters.iter().map(|(k, v)| (k.as_str(), *v))
    }
}
