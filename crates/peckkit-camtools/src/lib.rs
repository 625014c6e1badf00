//! # PeckKit CAM Tools
//!
//! Drilling computations behind the cycle editor.
//!
//! - **Peck Simulator**: expands Q or I/J/K peck policies into explicit stages,
//!   plus the power-decay peck profile
//! - **Efficiency**: cycle time estimation and before/after comparison
//! - **Peck Defaults**: diameter-proportional and L/D-sensitive I/J/K values
//! - **Optimizer**: Drilling Risk Index, strategy selection, speed/feed and
//!   peck derivation, tool-life and score
//!
//! Every computation is a pure function. Process constants are read through
//! [`peckkit_core::ProcessTables`]; passing `None` uses built-in constants.

pub mod efficiency;
pub mod error;
pub mod optimizer;
pub mod peck_defaults;
pub mod peck_simulator;

pub use efficiency::{compare, estimate_time, CutProfile, EfficiencyComparison};
pub use error::{ParameterError, ParameterResult};
pub use optimizer::{
    drilling_risk_index, optimize, select_strategy, tool_life_index, DrillingStrategy,
    OptimizationNote, OptimizationRequest, OptimizationResult,
};
pub use peck_defaults::{builtin_ratios, default_ijk, ld_sensitive_ijk};
pub use peck_simulator::{
    cycle_stages, decay_profile, simulate, simulate_fixed, DEFAULT_DECAY_POWER,
};
