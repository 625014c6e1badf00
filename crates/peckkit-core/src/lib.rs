//! # PeckKit Core
//!
//! Core types and utilities for PeckKit.
//! Provides the drilling cycle data model, the shared error taxonomy,
//! numeric formatting for regenerated NC words and the process constant
//! lookup trait consumed by the optimizer.

pub mod constants;
pub mod data;
pub mod error;
pub mod format;

pub use data::{
    CycleKind, CycleParams, CycleRecord, FixedParams, IjkTriple, MacroParams, MachineLimit,
    MaterialCutting, PeckMode, PeckPreset, PeckRatios, PeckStage, ProcessTables, SpindleRef,
    ToolDiameterMap, ToolMaterialRatios,
};

pub use error::{EditError, EditResult, Error, Result};

pub use format::{format_number, round_to};
