//! Drilling cycle data model
//!
//! One [`CycleRecord`] is produced per detected cycle line. Parameters are held
//! in a tagged [`CycleParams`] so the macro and fixed cycles each carry only
//! the fields they actually understand. Absent words are `None`, never a
//! sentinel value.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::ZERO_TOLERANCE;

/// Kind of drilling cycle found on a line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub enum CycleKind {
    /// Vendor macro call (`G66 P9131`) with explicit per-stage I/J/K triples
    MacroVariablePeck,
    /// Standard fixed peck cycle (`G83`) with constant Q or I/J/K decay
    FixedPeck,
}

impl CycleKind {
    /// Command words that open a line of this kind when it is regenerated
    pub fn marker(&self) -> &'static str {
        match self {
            Self::MacroVariablePeck => "G66 P9131",
            Self::FixedPeck => "G83",
        }
    }
}

impl fmt::Display for CycleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MacroVariablePeck => write!(f, "G66 macro"),
            Self::FixedPeck => write!(f, "G83 fixed"),
        }
    }
}

/// One explicit I/J/K group of a macro cycle
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct IjkTriple {
    pub i: f64,
    pub j: f64,
    pub k: f64,
}

impl IjkTriple {
    pub fn new(i: f64, j: f64, k: f64) -> Self {
        Self { i, j, k }
    }

    /// True when every member is within tolerance of zero
    pub fn is_zero(&self) -> bool {
        self.i.abs() < ZERO_TOLERANCE
            && self.j.abs() < ZERO_TOLERANCE
            && self.k.abs() < ZERO_TOLERANCE
    }

    /// Member-wise comparison within tolerance
    pub fn approx_eq(&self, other: &IjkTriple) -> bool {
        approx_eq(self.i, other.i) && approx_eq(self.j, other.j) && approx_eq(self.k, other.k)
    }
}

/// Static and dynamic words of a `G66 P9131` line
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MacroParams {
    /// R point (retract plane)
    pub r: Option<f64>,
    /// Hole bottom
    pub z: Option<f64>,
    /// Approach height (positional, not a spindle speed)
    pub s: Option<f64>,
    pub t: Option<f64>,
    /// Explicit stages in source order, never containing an all-zero triple
    /// straight after extraction
    pub triples: Vec<IjkTriple>,
}

/// Peck depth policy of a fixed cycle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PeckMode {
    /// Same depth on every peck
    Constant { q: f64 },
    /// Initial depth reduced by `decrement` after each peck, floored at `minimum`
    Variable {
        initial: f64,
        decrement: f64,
        minimum: f64,
    },
}

impl PeckMode {
    pub fn is_variable(&self) -> bool {
        matches!(self, Self::Variable { .. })
    }
}

/// Words of a `G83` line
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FixedParams {
    /// X word exactly as written; carried through rewrites untouched
    pub x: Option<String>,
    /// Y word exactly as written; carried through rewrites untouched
    pub y: Option<String>,
    pub r: Option<f64>,
    pub z: Option<f64>,
    /// Constant peck depth
    pub q: Option<f64>,
    pub f: Option<f64>,
    /// Initial peck (variable mode)
    pub i: Option<f64>,
    /// Peck reduction per pass (variable mode)
    pub j: Option<f64>,
    /// Minimum peck (variable mode)
    pub k: Option<f64>,
    /// Whether I/J/K rather than Q is authoritative
    pub variable_peck: bool,
}

impl FixedParams {
    /// Distance between R point and hole bottom; absent words count as zero
    pub fn depth(&self) -> f64 {
        (self.z.unwrap_or(0.0) - self.r.unwrap_or(0.0)).abs()
    }

    /// The authoritative peck policy
    pub fn peck_mode(&self) -> PeckMode {
        if self.variable_peck {
            PeckMode::Variable {
                initial: self.i.unwrap_or(0.0),
                decrement: self.j.unwrap_or(0.0),
                minimum: self.k.unwrap_or(0.0),
            }
        } else {
            PeckMode::Constant {
                q: self.q.unwrap_or(0.0),
            }
        }
    }
}

/// Parameters of a cycle, tagged by kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CycleParams {
    Macro(MacroParams),
    Fixed(FixedParams),
}

impl CycleParams {
    pub fn kind(&self) -> CycleKind {
        match self {
            Self::Macro(_) => CycleKind::MacroVariablePeck,
            Self::Fixed(_) => CycleKind::FixedPeck,
        }
    }

    pub fn r(&self) -> Option<f64> {
        match self {
            Self::Macro(p) => p.r,
            Self::Fixed(p) => p.r,
        }
    }

    pub fn z(&self) -> Option<f64> {
        match self {
            Self::Macro(p) => p.z,
            Self::Fixed(p) => p.z,
        }
    }

    pub fn set_z(&mut self, z: f64) {
        match self {
            Self::Macro(p) => p.z = Some(z),
            Self::Fixed(p) => p.z = Some(z),
        }
    }

    /// Semantic equality: same kind, same peck mode, every numeric word within
    /// tolerance. Verbatim X/Y text must match exactly.
    ///
    /// Only the peck words of the active mode count (Q, or I/J/K), and a zero
    /// macro `S` or `T` equals an absent one, since a rewritten line carries
    /// neither.
    pub fn approx_eq(&self, other: &CycleParams) -> bool {
        match (self, other) {
            (Self::Macro(a), Self::Macro(b)) => {
                opt_approx_eq(a.r, b.r)
                    && opt_approx_eq(a.z, b.z)
                    && opt_approx_eq(non_zero(a.s), non_zero(b.s))
                    && opt_approx_eq(non_zero(a.t), non_zero(b.t))
                    && a.triples.len() == b.triples.len()
                    && a.triples.iter().zip(&b.triples).all(|(x, y)| x.approx_eq(y))
            }
            (Self::Fixed(a), Self::Fixed(b)) => {
                let same_peck = if a.variable_peck {
                    opt_approx_eq(a.i, b.i) && opt_approx_eq(a.j, b.j) && opt_approx_eq(a.k, b.k)
                } else {
                    opt_approx_eq(a.q, b.q)
                };
                a.x == b.x
                    && a.y == b.y
                    && a.variable_peck == b.variable_peck
                    && opt_approx_eq(a.r, b.r)
                    && opt_approx_eq(a.z, b.z)
                    && opt_approx_eq(a.f, b.f)
                    && same_peck
            }
            _ => false,
        }
    }
}

/// One plunge-and-retract of a simulated or explicit cycle
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PeckStage {
    /// Signed depth gained by this stage (negative when drilling down)
    pub depth_increment: f64,
    /// R point minus the depth reached by this stage
    pub retract_offset: f64,
}

impl From<IjkTriple> for PeckStage {
    fn from(triple: IjkTriple) -> Self {
        Self {
            depth_increment: triple.i,
            retract_offset: triple.j,
        }
    }
}

/// Spindle speed in force at a cycle and the line that set it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpindleRef {
    pub rpm: u32,
    pub line_index: usize,
}

/// One detected drilling cycle
///
/// The parse-time parameters, stage list and spindle speed are captured when
/// the record is created and are never changed afterwards; they drive change
/// marking and rollback.
#[derive(Debug, Clone, Serialize)]
pub struct CycleRecord {
    tool_id: String,
    line_index: usize,
    params: CycleParams,
    stages: Vec<PeckStage>,
    detected_diameter: Option<f64>,
    spindle: Option<SpindleRef>,
    initial_params: CycleParams,
    initial_stages: Vec<PeckStage>,
    initial_rpm: Option<u32>,
}

impl CycleRecord {
    pub fn new(
        tool_id: impl Into<String>,
        line_index: usize,
        params: CycleParams,
        stages: Vec<PeckStage>,
        detected_diameter: Option<f64>,
        spindle: Option<SpindleRef>,
    ) -> Self {
        Self {
            tool_id: tool_id.into(),
            line_index,
            initial_params: params.clone(),
            initial_stages: stages.clone(),
            initial_rpm: spindle.map(|s| s.rpm),
            params,
            stages,
            detected_diameter,
            spindle,
        }
    }

    pub fn tool_id(&self) -> &str {
        &self.tool_id
    }

    /// The line owning this cycle; stable for the lifetime of the program
    pub fn line_index(&self) -> usize {
        self.line_index
    }

    pub fn kind(&self) -> CycleKind {
        self.params.kind()
    }

    pub fn params(&self) -> &CycleParams {
        &self.params
    }

    /// Stage list for the current parameters. Derived for fixed cycles,
    /// a view of the explicit triples for macro cycles.
    pub fn stages(&self) -> &[PeckStage] {
        &self.stages
    }

    pub fn detected_diameter(&self) -> Option<f64> {
        self.detected_diameter
    }

    pub fn spindle(&self) -> Option<SpindleRef> {
        self.spindle
    }

    pub fn spindle_rpm(&self) -> Option<u32> {
        self.spindle.map(|s| s.rpm)
    }

    pub fn initial_params(&self) -> &CycleParams {
        &self.initial_params
    }

    pub fn initial_stages(&self) -> &[PeckStage] {
        &self.initial_stages
    }

    pub fn initial_rpm(&self) -> Option<u32> {
        self.initial_rpm
    }

    /// Whether the fixed cycle currently uses I/J/K decay
    pub fn uses_variable_peck(&self) -> bool {
        matches!(&self.params, CycleParams::Fixed(p) if p.variable_peck)
    }

    /// True when the spindle speed differs from a non-zero parse-time speed
    pub fn is_rpm_modified(&self) -> bool {
        match (self.initial_rpm, self.spindle_rpm()) {
            (Some(initial), Some(current)) => initial != 0 && initial != current,
            _ => false,
        }
    }

    /// True when current parameters differ from the parse-time snapshot
    pub fn is_modified(&self) -> bool {
        !self.params.approx_eq(&self.initial_params) || self.is_rpm_modified()
    }

    /// Replace current parameters together with their stage list
    pub fn update_params(&mut self, params: CycleParams, stages: Vec<PeckStage>) {
        self.params = params;
        self.stages = stages;
    }

    /// Record a new spindle speed for the existing RPM line
    pub fn set_spindle_rpm(&mut self, rpm: u32) {
        if let Some(spindle) = self.spindle.as_mut() {
            spindle.rpm = rpm;
        }
    }
}

/// Comparison within [`ZERO_TOLERANCE`]
pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= ZERO_TOLERANCE
}

fn non_zero(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.abs() > ZERO_TOLERANCE)
}

fn opt_approx_eq(a: Option<f64>, b: Option<f64>) -> bool {
    match (a, b) {
        (Some(x), Some(y)) => approx_eq(x, y),
        (None, None) => true,
        _ => false,
    }
}
