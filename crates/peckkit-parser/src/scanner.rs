//! Single pass over a program collecting its drilling cycles

use peckkit_camtools::cycle_stages;
use peckkit_core::constants::{DIAMETER_SEARCH_RADIUS, UNKNOWN_TOOL};
use peckkit_core::{CycleParams, CycleRecord, ProcessTables, SpindleRef, ToolDiameterMap};

use crate::diameter::resolve_diameter;
use crate::extractor::{extract_fixed, extract_macro};
use crate::tokens;

/// Everything found in one scan
#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    pub records: Vec<CycleRecord>,
    pub tool_diameters: ToolDiameterMap,
}

/// Walks a program tracking the active tool and spindle speed
///
/// Each cycle line becomes one [`CycleRecord`] tagged with the tool, its
/// diameter and the spindle word in force at that line. The scan never fails;
/// words it cannot read are skipped.
pub struct ProgramScanner<'a> {
    tables: Option<&'a dyn ProcessTables>,
    diameter_radius: usize,
}

impl Default for ProgramScanner<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> ProgramScanner<'a> {
    pub fn new() -> Self {
        Self {
            tables: None,
            diameter_radius: DIAMETER_SEARCH_RADIUS,
        }
    }

    /// Peck presets used when a `G83` line needs default I/J/K
    pub fn with_tables(mut self, tables: &'a dyn ProcessTables) -> Self {
        self.tables = Some(tables);
        self
    }

    pub fn with_diameter_radius(mut self, radius: usize) -> Self {
        self.diameter_radius = radius;
        self
    }

    pub fn scan<S: AsRef<str>>(&self, lines: &[S]) -> ScanResult {
        let mut result = ScanResult::default();
        let mut tool = UNKNOWN_TOOL.to_string();
        let mut spindle: Option<SpindleRef> = None;

        for (idx, line) in lines.iter().enumerate() {
            let line = line.as_ref();

            // S on a macro call is the approach height, not a speed
            if !tokens::is_macro_call(line) {
                if let Some(rpm) = tokens::spindle_speed(line) {
                    tracing::debug!("line {}: spindle S{}", idx + 1, rpm);
                    spindle = Some(SpindleRef {
                        rpm,
                        line_index: idx,
                    });
                }
            }

            if let Some(id) = tokens::tool_change(line) {
                if let Some(d) = resolve_diameter(lines, idx, self.diameter_radius) {
                    tracing::debug!("line {}: tool T{} diameter {}", idx + 1, id, d);
                    result.tool_diameters.insert(id, d);
                } else {
                    tracing::debug!("line {}: tool T{} without diameter", idx + 1, id);
                }
                tool = id.to_string();
            }

            let diameter = result.tool_diameters.get(&tool);
            let params = if tokens::is_macro_cycle(line) {
                CycleParams::Macro(extract_macro(line))
            } else if tokens::is_fixed_cycle(line) {
                CycleParams::Fixed(extract_fixed(line, diameter, self.tables))
            } else {
                continue;
            };

            let stages = cycle_stages(&params);
            tracing::debug!(
                "line {}: {} cycle, tool {}, {} stages",
                idx + 1,
                params.kind(),
                tool,
                stages.len()
            );
            result.records.push(CycleRecord::new(
                tool.clone(),
                idx,
                params,
                stages,
                diameter,
                spindle,
            ));
        }

        tracing::info!(
            "scanned {} lines: {} cycles, {} tool diameters",
            lines.len(),
            result.records.len(),
            result.tool_diameters.len()
        );
        result
    }
}
