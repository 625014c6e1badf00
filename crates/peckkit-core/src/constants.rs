//! Shared numeric constants

/// Tolerance for every "approximately zero" and change comparison
pub const ZERO_TOLERANCE: f64 = 1e-6;

/// Lines searched on each side of a tool change for a diameter word
pub const DIAMETER_SEARCH_RADIUS: usize = 10;

/// Context lines shown above and below an annotated cycle line
pub const DEFAULT_CONTEXT_LINES: usize = 10;

/// Gap kept above the previous peck depth before feeding resumes (mm)
pub const DEFAULT_CLEARANCE: f64 = 0.1;

/// Rapid traverse speed assumed when none is configured (mm/min)
pub const DEFAULT_RAPID_SPEED: f64 = 5000.0;

/// Spindle ceiling assumed when no configuration is available
pub const DEFAULT_MAX_RPM: f64 = 40000.0;

/// Tool id reported for cycles that precede any tool change
pub const UNKNOWN_TOOL: &str = "Unknown";
