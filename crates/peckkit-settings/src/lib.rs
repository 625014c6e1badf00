//! PeckKit Settings Crate
//!
//! Handles the machining configuration: constant tables, limits and their
//! persistence.

pub mod config;
pub mod error;

pub use config::{
    DriFactors, Limits, MachiningConfig, MaterialEntry, OptimizationWeights, TaylorParams,
};
pub use error::{SettingsError, SettingsResult};
