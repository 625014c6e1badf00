//! Drill session: one loaded program and its cycle records
//!
//! The session owns the line store and the record table built by one scan.
//! Every edit goes through it: parameters are applied to the record, the
//! derived stages are recomputed and the owning line is regenerated in
//! place. A failed edit changes neither the records nor the text.

use std::path::{Path, PathBuf};

use peckkit_camtools::{
    compare, cycle_stages, default_ijk, optimize, CutProfile, EfficiencyComparison,
    OptimizationRequest, OptimizationResult,
};
use peckkit_core::{
    CycleKind, CycleParams, CycleRecord, EditError, EditResult, PeckPreset, PeckStage,
    ProcessTables, ToolDiameterMap,
};
use peckkit_gcodeeditor::{
    annotate_cycle_line, context_view, read_program, render_cycle_line, replace_spindle_rpm,
    write_program, ContextView, FileEncoding, TextBuffer,
};
use peckkit_parser::{default_q, depth_based_ijk, ProgramScanner};
use peckkit_settings::MachiningConfig;

use crate::error::SessionResult;
use peckkit_core::constants::{DEFAULT_CLEARANCE, ZERO_TOLERANCE};

/// A loaded NC program with its detected drilling cycles
#[derive(Debug, Clone)]
pub struct DrillSession {
    buffer: TextBuffer,
    encoding: FileEncoding,
    records: Vec<CycleRecord>,
    tool_diameters: ToolDiameterMap,
    config: Option<MachiningConfig>,
    source: Option<PathBuf>,
}

impl DrillSession {
    /// Load and scan a program file
    ///
    /// # Errors
    /// `NotFound` when the file does not exist.
    pub fn open(path: impl AsRef<Path>) -> SessionResult<Self> {
        let path = path.as_ref();
        let loaded = read_program(path)?;
        let mut session = Self::build(&loaded.text, loaded.encoding, None);
        session.source = Some(path.to_path_buf());
        Ok(session)
    }

    /// Scan program text that is already in memory
    pub fn from_text(text: &str) -> Self {
        Self::build(text, FileEncoding::Utf8, None)
    }

    /// Use `config` for peck presets and optimization, rescanning the text
    ///
    /// The rescan takes new parse-time snapshots from the current text, so
    /// edits made before this call can no longer be rolled back. Attach the
    /// configuration right after loading.
    pub fn with_config(mut self, config: MachiningConfig) -> Self {
        if self.is_modified() {
            tracing::warn!("Configuration attached to an edited program, rollback history reset");
        }
        self.config = Some(config);
        self.rescan();
        self
    }

    /// Load a JSON or TOML configuration file and attach it
    ///
    /// # Errors
    /// `Settings` when the file cannot be read, parsed or validated.
    pub fn with_config_file(self, path: impl AsRef<Path>) -> SessionResult<Self> {
        let config = MachiningConfig::load_from_file(path.as_ref())?;
        Ok(self.with_config(config))
    }

    fn build(text: &str, encoding: FileEncoding, config: Option<MachiningConfig>) -> Self {
        let mut session = Self {
            buffer: TextBuffer::from(text),
            encoding,
            records: Vec::new(),
            tool_diameters: ToolDiameterMap::new(),
            config,
            source: None,
        };
        session.rescan();
        session
    }

    fn rescan(&mut self) {
        let lines = self.buffer.lines();
        let mut scanner = ProgramScanner::new();
        if let Some(tables) = self.tables() {
            scanner = scanner.with_tables(tables);
        }
        let result = scanner.scan(&lines);
        self.records = result.records;
        self.tool_diameters = result.tool_diameters;
    }

    fn tables(&self) -> Option<&dyn ProcessTables> {
        self.config.as_ref().map(|c| c as &dyn ProcessTables)
    }

    pub fn records(&self) -> &[CycleRecord] {
        &self.records
    }

    pub fn record(&self, index: usize) -> Option<&CycleRecord> {
        self.records.get(index)
    }

    pub fn tool_diameters(&self) -> &ToolDiameterMap {
        &self.tool_diameters
    }

    /// Current program text
    pub fn text(&self) -> String {
        self.buffer.to_string()
    }

    pub fn line(&self, line_index: usize) -> Option<String> {
        self.buffer.line(line_index)
    }

    pub fn line_count(&self) -> usize {
        self.buffer.line_count()
    }

    pub fn encoding(&self) -> FileEncoding {
        self.encoding
    }

    pub fn config(&self) -> Option<&MachiningConfig> {
        self.config.as_ref()
    }

    /// Path the program was opened from
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// True when any line was rewritten since loading or the last save
    pub fn is_modified(&self) -> bool {
        self.buffer.is_modified()
    }

    /// Stage list the given parameters would produce
    pub fn preview_stages(&self, params: &CycleParams) -> Vec<PeckStage> {
        cycle_stages(params)
    }

    fn record_checked(&self, index: usize) -> EditResult<&CycleRecord> {
        self.records.get(index).ok_or(EditError::RecordOutOfRange {
            index,
            total: self.records.len(),
        })
    }

    /// Spindle speed written on the cycle line itself, if any
    fn inline_rpm(record: &CycleRecord) -> Option<u32> {
        record
            .spindle()
            .filter(|s| s.line_index == record.line_index())
            .map(|s| s.rpm)
    }

    /// Replace a record's parameters and regenerate its line
    ///
    /// All-zero macro triples are dropped before the line is written.
    ///
    /// # Errors
    /// `RecordOutOfRange`, or `KindMismatch` when `params` are for the other
    /// cycle kind.
    pub fn apply_params(&mut self, index: usize, params: CycleParams) -> EditResult<()> {
        let record = self.record_checked(index)?;
        if record.kind() != params.kind() {
            return Err(EditError::KindMismatch {
                expected: record.kind().to_string(),
                actual: params.kind().to_string(),
            });
        }

        let params = match params {
            CycleParams::Macro(mut p) => {
                p.triples.retain(|t| !t.is_zero());
                CycleParams::Macro(p)
            }
            fixed => fixed,
        };

        let line_index = record.line_index();
        let text = render_cycle_line(&params, Self::inline_rpm(record));
        self.buffer.replace_line(line_index, &text)?;

        let stages = cycle_stages(&params);
        tracing::debug!(
            "line {}: rewritten, {} stages",
            line_index + 1,
            stages.len()
        );
        self.records[index].update_params(params, stages);
        Ok(())
    }

    /// Switch a fixed cycle between constant and I/J/K pecking
    ///
    /// A newly active peck value that is zero is filled in from the tool
    /// diameter (efficient preset), or from the hole depth when the diameter
    /// is unknown.
    pub fn set_variable_peck(&mut self, index: usize, enabled: bool) -> EditResult<()> {
        let record = self.record_checked(index)?;
        let CycleParams::Fixed(mut params) = record.params().clone() else {
            return Err(EditError::KindMismatch {
                expected: CycleKind::FixedPeck.to_string(),
                actual: record.kind().to_string(),
            });
        };

        let preset = record
            .detected_diameter()
            .filter(|d| *d > ZERO_TOLERANCE)
            .map(|d| default_ijk(d, PeckPreset::Efficient, self.tables()));
        let depth = params.depth();

        params.variable_peck = enabled;
        if enabled {
            if is_near_zero(params.i) {
                let ijk = preset.unwrap_or_else(|| depth_based_ijk(depth));
                params.i = Some(ijk.i);
                params.j = Some(ijk.j);
                params.k = Some(ijk.k);
            }
        } else if is_near_zero(params.q) {
            params.q = Some(match preset {
                Some(ijk) => ijk.i,
                None => default_q(depth),
            });
        }

        self.apply_params(index, CycleParams::Fixed(params))
    }

    /// Set the spindle speed in force at a cycle
    ///
    /// Only the first `S` word of the line recorded at scan time is replaced.
    /// Every cycle sharing that line sees the new speed.
    ///
    /// # Errors
    /// `InvalidRpm` for a speed below 1, `NoRpmLine` when no spindle word
    /// precedes the cycle.
    pub fn update_spindle_speed(&mut self, index: usize, rpm: f64) -> EditResult<()> {
        let record = self.record_checked(index)?;
        let rpm = checked_rpm(rpm)?;

        let no_line = || EditError::NoRpmLine {
            tool_id: record.tool_id().to_string(),
        };
        let Some(spindle) = record.spindle() else {
            tracing::warn!("Tool {} has no spindle speed line", record.tool_id());
            return Err(no_line());
        };
        let line = self
            .buffer
            .line(spindle.line_index)
            .ok_or(EditError::LineOutOfRange {
                line: spindle.line_index,
                total: self.buffer.line_count(),
            })?;
        let updated = replace_spindle_rpm(&line, rpm).ok_or_else(no_line)?;

        self.buffer.replace_line(spindle.line_index, &updated)?;
        for record in &mut self.records {
            if record.spindle().map(|s| s.line_index) == Some(spindle.line_index) {
                record.set_spindle_rpm(rpm);
            }
        }
        tracing::info!("line {}: spindle set to S{}", spindle.line_index + 1, rpm);
        Ok(())
    }

    /// Restore the parse-time parameters, peck mode and spindle speed
    pub fn rollback(&mut self, index: usize) -> EditResult<()> {
        let record = self.record_checked(index)?;
        let initial = record.initial_params().clone();
        let restore_rpm = record
            .initial_rpm()
            .filter(|rpm| *rpm != 0 && record.spindle_rpm() != Some(*rpm));

        if let Some(rpm) = restore_rpm {
            self.update_spindle_speed(index, f64::from(rpm))?;
        }
        self.apply_params(index, initial)
    }

    /// The cycle line regenerated with changed words marked, plus
    /// `context_lines` lines on each side
    pub fn annotated_view(&self, index: usize, context_lines: usize) -> EditResult<ContextView> {
        let record = self.record_checked(index)?;
        let inline = Self::inline_rpm(record);
        let rpm_changed = record.is_rpm_modified();

        let active = annotate_cycle_line(
            record.line_index(),
            record.params(),
            record.initial_params(),
            inline,
            rpm_changed && inline.is_some(),
        );
        let changed_rpm_line = record
            .spindle()
            .filter(|_| rpm_changed && inline.is_none())
            .map(|s| s.line_index);

        Ok(context_view(
            &self.buffer,
            active,
            changed_rpm_line,
            context_lines,
        ))
    }

    /// Time of the current fixed cycle against its parse-time version
    ///
    /// # Errors
    /// `KindMismatch` for a macro cycle, which carries no feed rate.
    pub fn efficiency(&self, index: usize, rapid_speed: f64) -> EditResult<EfficiencyComparison> {
        let record = self.record_checked(index)?;
        let (CycleParams::Fixed(current), CycleParams::Fixed(initial)) =
            (record.params(), record.initial_params())
        else {
            return Err(EditError::KindMismatch {
                expected: CycleKind::FixedPeck.to_string(),
                actual: record.kind().to_string(),
            });
        };

        let after = CutProfile {
            kind: record.kind(),
            stages: record.stages(),
            feedrate: current.f.unwrap_or(0.0),
            r_point: current.r.unwrap_or(0.0),
        };
        let before = CutProfile {
            kind: record.kind(),
            stages: record.initial_stages(),
            feedrate: initial.f.unwrap_or(0.0),
            r_point: initial.r.unwrap_or(0.0),
        };
        Ok(compare(&after, &before, rapid_speed, DEFAULT_CLEARANCE))
    }

    /// Optimize a cycle
    ///
    /// A non-positive `tool_diameter` or a zero `target_z` in `request` is
    /// taken from the record. The current spindle speed is only kept when the
    /// request asks for it.
    pub fn optimize(
        &self,
        index: usize,
        mut request: OptimizationRequest,
    ) -> SessionResult<OptimizationResult> {
        let record = self.record_checked(index)?;
        if request.tool_diameter <= 0.0 {
            request.tool_diameter = record.detected_diameter().unwrap_or(0.0);
        }
        if request.target_z.abs() < ZERO_TOLERANCE {
            request.target_z = record.params().z().unwrap_or(0.0);
        }

        let result = optimize(&request, self.tables())?;
        tracing::info!(
            "line {}: {} (DRI {}), S{} F{}",
            record.line_index() + 1,
            result.strategy,
            result.dri,
            result.spindle_rpm as u32,
            result.feedrate
        );
        Ok(result)
    }

    /// Write an optimization result back into the program
    ///
    /// Fixed cycles take Z, F and either Q or I/J/K; a result without pecking
    /// becomes a single full-depth Q. Macro cycles keep their triples and take
    /// only Z. The spindle speed is updated when the cycle has a spindle line.
    ///
    /// # Errors
    /// `InvalidRpm` before anything is written when the result's speed is
    /// below 1.
    pub fn apply_optimization(
        &mut self,
        index: usize,
        result: &OptimizationResult,
    ) -> EditResult<()> {
        let record = self.record_checked(index)?;
        checked_rpm(result.spindle_rpm)?;
        let mut params = record.params().clone();
        params.set_z(result.target_z);

        if let CycleParams::Fixed(p) = &mut params {
            p.f = Some(result.feedrate);
            p.variable_peck = result.variable_peck;
            if result.variable_peck {
                p.i = Some(result.ijk.i);
                p.j = Some(result.ijk.j);
                p.k = Some(result.ijk.k);
            } else if result.q > ZERO_TOLERANCE {
                p.q = Some(result.q);
            } else {
                p.q = Some(p.depth());
            }
        }

        self.apply_params(index, params)?;
        match self.update_spindle_speed(index, result.spindle_rpm) {
            Err(EditError::NoRpmLine { tool_id }) => {
                tracing::warn!("Tool {}: optimized speed not written", tool_id);
                Ok(())
            }
            other => other,
        }
    }

    /// Write the program with the encoding it was read with
    pub fn save(&mut self, path: impl AsRef<Path>) -> SessionResult<()> {
        let path = path.as_ref();
        write_program(path, &self.buffer.to_string(), self.encoding)?;
        let dirty = self.buffer.take_dirty_lines();
        tracing::info!("Saved {} ({} edited lines)", path.display(), dirty.len());
        Ok(())
    }
}

/// Whole RPM for a requested spindle speed
fn checked_rpm(rpm: f64) -> EditResult<u32> {
    if !rpm.is_finite() || rpm.trunc() < 1.0 || rpm > f64::from(u32::MAX) {
        tracing::warn!("Refusing to set spindle speed to {}", rpm);
        return Err(EditError::InvalidRpm { rpm });
    }
    Ok(rpm.trunc() as u32)
}

fn is_near_zero(value: Option<f64>) -> bool {
    value.map_or(true, |v| v.abs() < ZERO_TOLERANCE)
}
