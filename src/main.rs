use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use peckkit::{init_logging, DrillSession, MachiningConfig, OptimizationRequest};
use peckkit_core::constants::{DEFAULT_CONTEXT_LINES, DEFAULT_RAPID_SPEED};
use peckkit_core::format_number;

/// Inspect and edit peck-drilling cycles in an NC program
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None, arg_required_else_help = true)]
struct Cli {
    /// NC program to operate on
    program: PathBuf,

    #[command(subcommand)]
    command: Command,

    /// Machining configuration (JSON or TOML)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print output as JSON
    #[arg(long, short = 'j', global = true)]
    json: bool,

    /// Write the edited program here instead of stdout
    #[arg(long, short = 'o', global = true, value_name = "PATH")]
    output: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List detected cycles
    List,

    /// Show a cycle line with changed words marked and its context
    Show {
        /// Cycle number as shown by `list`
        index: usize,

        /// Lines shown above and below
        #[arg(long, short, default_value_t = DEFAULT_CONTEXT_LINES)]
        context: usize,
    },

    /// Show the peck stages of a cycle and, for G83, its time estimate
    Stages {
        index: usize,

        /// Rapid traverse speed (mm/min)
        #[arg(long, default_value_t = DEFAULT_RAPID_SPEED)]
        rapid: f64,
    },

    /// Change the spindle speed in force at a cycle
    SetRpm { index: usize, rpm: f64 },

    /// Switch a G83 cycle between Q and I/J/K pecking
    PeckMode { index: usize, mode: PeckModeArg },

    /// Derive speed, feed and peck parameters for a cycle
    Optimize {
        index: usize,

        #[arg(long, default_value = "AL6061")]
        material: String,

        #[arg(long, default_value = "CARBIDE")]
        tool_material: String,

        #[arg(long, default_value = "MQL")]
        coolant: String,

        /// Tool diameter; defaults to the one detected for the cycle's tool
        #[arg(long)]
        diameter: Option<f64>,

        /// Hole bottom; defaults to the cycle's Z
        #[arg(long, allow_hyphen_values = true)]
        z: Option<f64>,

        /// Stock thickness for exit chamfer compensation
        #[arg(long, default_value_t = 0.0)]
        thickness: f64,

        /// Exit chamfer width; 0 disables compensation
        #[arg(long, default_value_t = 0.0)]
        chamfer: f64,

        #[arg(long, default_value_t = 118.0)]
        tip_angle: f64,

        /// Keep the program's spindle speed
        #[arg(long)]
        keep_rpm: bool,

        /// Force a peck mode instead of the one the risk tier suggests
        #[arg(long)]
        mode: Option<PeckModeArg>,

        /// Write the result into the program
        #[arg(long)]
        apply: bool,
    },

    /// Restore a cycle's parameters and spindle speed as loaded
    Rollback { index: usize },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum PeckModeArg {
    /// Constant Q
    Constant,
    /// I/J/K decay
    Variable,
}

impl PeckModeArg {
    fn is_variable(self) -> bool {
        matches!(self, Self::Variable)
    }
}

fn main() -> Result<()> {
    init_logging()?;
    let cli = Cli::parse();

    let session = DrillSession::open(&cli.program)
        .with_context(|| format!("loading {}", cli.program.display()))?;
    let mut session = match &cli.config {
        Some(path) => session
            .with_config_file(path)
            .with_context(|| format!("loading configuration {}", path.display()))?,
        None => match default_config() {
            Some(config) => session.with_config(config),
            None => session,
        },
    };

    let edited = match cli.command {
        Command::List => {
            list(&session, cli.json)?;
            false
        }
        Command::Show { index, context } => {
            let view = session.annotated_view(index, context)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                print!("{}", view.render_marked());
            }
            false
        }
        Command::Stages { index, rapid } => {
            stages(&session, index, rapid, cli.json)?;
            false
        }
        Command::SetRpm { index, rpm } => {
            session.update_spindle_speed(index, rpm)?;
            true
        }
        Command::PeckMode { index, mode } => {
            session.set_variable_peck(index, mode.is_variable())?;
            true
        }
        Command::Optimize {
            index,
            material,
            tool_material,
            coolant,
            diameter,
            z,
            thickness,
            chamfer,
            tip_angle,
            keep_rpm,
            mode,
            apply,
        } => {
            let current_rpm = if keep_rpm {
                session
                    .record(index)
                    .and_then(|r| r.spindle_rpm())
                    .map(f64::from)
            } else {
                None
            };
            let request = OptimizationRequest {
                tool_diameter: diameter.unwrap_or(0.0),
                target_z: z.unwrap_or(0.0),
                material,
                tool_material,
                coolant,
                current_rpm,
                material_thickness: thickness,
                exit_chamfer: chamfer,
                tip_angle,
                prefer_variable_peck: mode.map(PeckModeArg::is_variable),
                ..Default::default()
            };
            let result = session.optimize(index, request)?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                for note in &result.notes {
                    println!("- {}", note);
                }
                println!("S{} F{}", result.spindle_rpm as u32, format_number(result.feedrate));
                if result.variable_peck {
                    println!(
                        "I{} J{} K{} ({})",
                        format_number(result.ijk.i),
                        format_number(result.ijk.j),
                        format_number(result.ijk.k),
                        result.strategy
                    );
                } else {
                    println!("Q{} ({})", format_number(result.q), result.strategy);
                }
                println!(
                    "Z{}  DRI {}  life {}  score {}",
                    format_number(result.target_z),
                    result.dri,
                    result.life_index,
                    result.score
                );
            }

            if apply {
                session.apply_optimization(index, &result)?;
            }
            apply
        }
        Command::Rollback { index } => {
            session.rollback(index)?;
            true
        }
    };

    if edited {
        match &cli.output {
            Some(path) => session.save(path)?,
            None if cli.json => {}
            None => print!("{}", session.text()),
        }
    }

    Ok(())
}

fn default_config() -> Option<MachiningConfig> {
    match MachiningConfig::default_path() {
        Ok(path) if path.exists() => Some(MachiningConfig::load_or_default(&path)),
        _ => None,
    }
}

fn list(session: &DrillSession, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(session.records())?);
        return Ok(());
    }

    println!(
        "{:>3}  {:>6}  {:<8}  {:<10}  {:>6}  {:>6}  {:>6}",
        "#", "line", "tool", "cycle", "dia", "rpm", "stages"
    );
    for (n, record) in session.records().iter().enumerate() {
        let dia = record
            .detected_diameter()
            .map(format_number)
            .unwrap_or_else(|| "-".to_string());
        let rpm = record
            .spindle_rpm()
            .map(|r| r.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:>3}  {:>6}  {:<8}  {:<10}  {:>6}  {:>6}  {:>6}{}",
            n,
            record.line_index() + 1,
            record.tool_id(),
            record.kind().to_string(),
            dia,
            rpm,
            record.stages().len(),
            if record.is_modified() { "  *" } else { "" }
        );
    }
    Ok(())
}

fn stages(session: &DrillSession, index: usize, rapid: f64, json: bool) -> Result<()> {
    let Some(record) = session.record(index) else {
        bail!(
            "no cycle {} (program has {})",
            index,
            session.records().len()
        );
    };
    let efficiency = session.efficiency(index, rapid).ok();

    if json {
        let report = serde_json::json!({
            "stages": record.stages(),
            "efficiency": efficiency,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let r = record.params().r().unwrap_or(0.0);
    let mut depth = r;
    for (n, stage) in record.stages().iter().enumerate() {
        depth += stage.depth_increment;
        println!(
            "{:>3}  {:>10}  -> {:>10}",
            n + 1,
            format_number(stage.depth_increment),
            format_number(depth)
        );
    }
    if let Some(e) = efficiency {
        println!(
            "time {:.4} -> {:.4} min ({:+.1}%), stages {} -> {}",
            e.time_before, e.time_after, e.percent_saved, e.stage_count_before, e.stage_count_after
        );
    }
    Ok(())
}
