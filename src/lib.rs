//! # PeckKit
//!
//! A peck-drilling cycle editor for NC programs with support for:
//! - `G66 P9131` variable-peck macro calls with explicit I/J/K stages
//! - `G83` fixed peck cycles with constant Q or I/J/K decay
//! - Stage simulation, cycle time comparison and risk-aware optimization
//!
//! ## Architecture
//!
//! PeckKit is organized as a workspace with multiple crates:
//!
//! 1. **peckkit-core** - Cycle data model, errors, formatting, process table trait
//! 2. **peckkit-settings** - Machining configuration and its persistence
//! 3. **peckkit-gcodeeditor** - Line store, file I/O, line rewriting, annotation
//! 4. **peckkit-camtools** - Peck simulation, time estimation, optimizer
//! 5. **peckkit-parser** - Program scanning and cycle extraction
//! 6. **peckkit** - [`DrillSession`] and the command-line binary
//!
//! ## Usage
//!
//! ```rust
//! use peckkit::DrillSession;
//!
//! let mut session = DrillSession::from_text("M03 S8000\nG83 Z-3 R0 Q1 F100\n");
//! assert_eq!(session.records()[0].stages().len(), 3);
//! session.update_spindle_speed(0, 9500.0).unwrap();
//! assert_eq!(session.line(0).as_deref(), Some("M03 S9500"));
//! ```

pub mod error;
pub mod session;

pub use error::{SessionError, SessionResult};
pub use session::DrillSession;

pub use peckkit_camtools::{
    DrillingStrategy, EfficiencyComparison, OptimizationNote, OptimizationRequest,
    OptimizationResult,
};
pub use peckkit_core::{
    CycleKind, CycleParams, CycleRecord, EditError, EditResult, FixedParams, IjkTriple,
    MacroParams, PeckStage, SpindleRef, ToolDiameterMap,
};
pub use peckkit_gcodeeditor::{AnnotatedLine, ContextView, FileEncoding, Segment};
pub use peckkit_settings::MachiningConfig;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Pretty formatting on stderr, keeping stdout for command output
/// - RUST_LOG environment variable support, INFO when unset
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_line_number(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
