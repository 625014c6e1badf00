use peckkit::{
    CycleParams, DrillSession, DrillingStrategy, EditError, MachiningConfig, OptimizationRequest,
    SessionError,
};
use std::fs;
use tempfile::TempDir;

const PROGRAM: &str = "\
%
(T1 D2.0)
T1 M06
M03 S8000
G83 X5 Y5 Z-3 R0 Q0.5 F100
G83 X10 Y5 Z-3 R0 Q0.5 F100
G80
(T2 D3.0)
T2 M06
M03 S6000
G66 P9131 R-0.2 Z-2.9 I-2.9 J0.45 K100 I0 J0 K0 I-1 J0.2 K50
G67
M30
";

fn fixed_with_q(session: &DrillSession, index: usize, q: f64) -> CycleParams {
    let mut params = session.records()[index].params().clone();
    if let CycleParams::Fixed(p) = &mut params {
        p.q = Some(q);
    }
    params
}

#[test]
fn test_open_missing_file() {
    let dir = TempDir::new().unwrap();
    let err = DrillSession::open(dir.path().join("none.nc")).unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn test_records_and_lines() {
    let session = DrillSession::from_text(PROGRAM);
    let lines: Vec<usize> = session.records().iter().map(|r| r.line_index()).collect();
    assert_eq!(lines, vec![4, 5, 10]);

    let CycleParams::Macro(p) = session.records()[2].params() else {
        panic!("expected a macro cycle");
    };
    assert_eq!(p.triples.len(), 2);
    assert_eq!(session.records()[2].spindle_rpm(), Some(6000));
}

#[test]
fn test_zero_rpm_rejected_without_change() {
    let mut session = DrillSession::from_text(PROGRAM);
    assert_eq!(
        session.update_spindle_speed(0, 0.0),
        Err(EditError::InvalidRpm { rpm: 0.0 })
    );
    assert!(matches!(
        session.update_spindle_speed(0, -100.0),
        Err(EditError::InvalidRpm { .. })
    ));
    assert_eq!(session.records()[0].spindle_rpm(), Some(8000));
    assert_eq!(session.text(), PROGRAM);
    assert!(!session.is_modified());
}

#[test]
fn test_missing_rpm_line() {
    let mut session = DrillSession::from_text("G83 Z-3 R0 Q1 F100\n");
    assert!(matches!(
        session.update_spindle_speed(0, 5000.0),
        Err(EditError::NoRpmLine { .. })
    ));
}

#[test]
fn test_out_of_range_record() {
    let mut session = DrillSession::from_text(PROGRAM);
    assert_eq!(
        session.rollback(7),
        Err(EditError::RecordOutOfRange { index: 7, total: 3 })
    );
}

#[test]
fn test_shared_rpm_line_updates_every_cycle() {
    let mut session = DrillSession::from_text(PROGRAM);
    session.update_spindle_speed(1, 9000.0).unwrap();

    assert_eq!(session.line(3).as_deref(), Some("M03 S9000"));
    assert_eq!(session.records()[0].spindle_rpm(), Some(9000));
    assert_eq!(session.records()[1].spindle_rpm(), Some(9000));
    assert_eq!(session.records()[2].spindle_rpm(), Some(6000));
    assert!(session.records()[0].is_rpm_modified());
}

#[test]
fn test_apply_params_rewrites_owner_line_only() {
    let mut session = DrillSession::from_text(PROGRAM);
    let mut params = session.records()[0].params().clone();
    params.set_z(-3.5);
    session.apply_params(0, params).unwrap();

    assert_eq!(session.line(4).as_deref(), Some("G83 X5 Y5 Z-3.5 R0 Q0.5 F100"));
    assert_eq!(session.line(5).as_deref(), Some("G83 X10 Y5 Z-3 R0 Q0.5 F100"));
    assert_eq!(session.line_count(), 13);
    assert_eq!(session.records()[0].stages().len(), 7);
    assert_eq!(session.records()[0].initial_stages().len(), 6);
    assert!(session.records()[0].is_modified());
}

#[test]
fn test_rollback_restores_text() {
    let mut session = DrillSession::from_text(PROGRAM);
    session.apply_params(0, fixed_with_q(&session, 0, 1.5)).unwrap();
    session.update_spindle_speed(0, 12000.0).unwrap();
    assert_ne!(session.text(), PROGRAM);

    session.rollback(0).unwrap();
    assert_eq!(session.text(), PROGRAM);
    assert!(!session.records()[0].is_modified());
    assert_eq!(session.records()[1].spindle_rpm(), Some(8000));
}

#[test]
fn test_annotated_view_marks_changes() {
    let mut session = DrillSession::from_text(PROGRAM);
    session.apply_params(0, fixed_with_q(&session, 0, 1.0)).unwrap();
    session.update_spindle_speed(0, 9000.0).unwrap();

    let view = session.annotated_view(0, 2).unwrap();
    assert_eq!(view.lines.len(), 5);
    let active = view.active().unwrap();
    assert_eq!(active.line_index, 4);
    assert_eq!(active.changed_words(), vec!["Q1"]);

    let rendered = view.render_marked();
    assert!(rendered.contains(">     5  G83 X5 Y5 Z-3 R0 [Q1] F100"));
    assert!(rendered.contains("      4  M03 [S9000]"));
    assert!(rendered.contains("      6  G83 X10 Y5 Z-3 R0 Q0.5 F100"));
}

#[test]
fn test_unchanged_view_has_no_marks() {
    let session = DrillSession::from_text(PROGRAM);
    let view = session.annotated_view(2, 1).unwrap();
    assert!(view.lines.iter().all(|l| !l.has_changes()));
    assert_eq!(
        view.active().map(|l| l.text()),
        Some("G66 P9131 R-0.2 Z-2.9 I-2.9 J0.45 K100 I-1 J0.2 K50".to_string())
    );
}

#[test]
fn test_spindle_word_on_cycle_line() {
    let mut session = DrillSession::from_text("T1 M06 (D2.0)\nG83 X0 Y0 Z-3 R0 Q1 F100 S9000\n");
    session.apply_params(0, fixed_with_q(&session, 0, 0.5)).unwrap();
    assert_eq!(
        session.line(1).as_deref(),
        Some("G83 X0 Y0 Z-3 R0 Q0.5 F100 S9000")
    );

    session.update_spindle_speed(0, 12000.0).unwrap();
    assert_eq!(
        session.line(1).as_deref(),
        Some("G83 X0 Y0 Z-3 R0 Q0.5 F100 S12000")
    );

    let view = session.annotated_view(0, 3).unwrap();
    assert_eq!(
        view.active().unwrap().changed_words(),
        vec!["Q0.5", "S12000"]
    );
}

#[test]
fn test_efficiency_of_larger_peck() {
    let mut session = DrillSession::from_text(PROGRAM);
    session.apply_params(0, fixed_with_q(&session, 0, 1.0)).unwrap();

    let comparison = session.efficiency(0, 5000.0).unwrap();
    assert_eq!(comparison.stage_count_before, 6);
    assert_eq!(comparison.stage_count_after, 3);
    assert!(comparison.percent_saved > 0.0);

    assert!(matches!(
        session.efficiency(2, 5000.0),
        Err(EditError::KindMismatch { .. })
    ));
}

#[test]
fn test_optimize_shallow_hole_drills_direct() {
    let mut session = DrillSession::from_text(PROGRAM);
    let result = session.optimize(0, OptimizationRequest::default()).unwrap();
    assert_eq!(result.strategy, DrillingStrategy::Direct);
    assert!(!result.variable_peck);

    session.apply_optimization(0, &result).unwrap();
    let record = &session.records()[0];
    assert!(!record.uses_variable_peck());
    assert_eq!(record.stages().len(), 1);
    assert_eq!(record.spindle_rpm(), Some(result.spindle_rpm as u32));
    assert_ne!(session.line(3).as_deref(), Some("M03 S8000"));
}

#[test]
fn test_rejected_optimization_leaves_program() {
    let mut session = DrillSession::from_text(PROGRAM);
    let mut result = session.optimize(0, OptimizationRequest::default()).unwrap();
    result.spindle_rpm = 0.4;

    let err = session.apply_optimization(0, &result).unwrap_err();
    assert_eq!(err, EditError::InvalidRpm { rpm: 0.4 });
    assert!(!session.is_modified());
    assert_eq!(session.text(), PROGRAM);
    let record = &session.records()[0];
    assert!(record.params().approx_eq(record.initial_params()));
}

#[test]
fn test_optimize_forced_variable_peck() {
    let mut session = DrillSession::from_text(PROGRAM).with_config(MachiningConfig::default());
    let request = OptimizationRequest {
        prefer_variable_peck: Some(true),
        ..Default::default()
    };
    let result = session.optimize(0, request).unwrap();
    assert!(result.variable_peck);

    session.apply_optimization(0, &result).unwrap();
    assert!(session.records()[0].uses_variable_peck());
    let line = session.line(4).unwrap_or_default();
    assert!(line.contains(" I") && line.contains(" K"));
    assert!(!line.contains(" Q"));
}

#[test]
fn test_optimize_macro_updates_z_only() {
    let mut session = DrillSession::from_text(PROGRAM);
    let request = OptimizationRequest {
        target_z: -4.0,
        ..Default::default()
    };
    let result = session.optimize(2, request).unwrap();
    session.apply_optimization(2, &result).unwrap();

    let CycleParams::Macro(p) = session.records()[2].params() else {
        panic!("expected a macro cycle");
    };
    assert_eq!(p.z, Some(-4.0));
    assert_eq!(p.triples.len(), 2);
}

#[test]
fn test_optimize_without_diameter_fails() {
    let session = DrillSession::from_text("G83 Z-3 R0 Q1 F100\n");
    assert!(session.optimize(0, OptimizationRequest::default()).is_err());
}

#[test]
fn test_config_presets_used_for_defaults() {
    let text = "T1 M06 (D2.0)\nG83 Z-6 R0 I0 K0.2 F80\n";
    let builtin = DrillSession::from_text(text);
    assert_eq!(builtin.line(1).as_deref(), Some("G83 Z-6 R0 I0 K0.2 F80"));
    let CycleParams::Fixed(p) = builtin.records()[0].params() else {
        panic!("expected a fixed cycle");
    };
    assert_eq!(p.i, Some(2.2));

    let configured = DrillSession::from_text(text).with_config(MachiningConfig::default());
    let CycleParams::Fixed(p) = configured.records()[0].params() else {
        panic!("expected a fixed cycle");
    };
    assert_eq!((p.i, p.j, p.k), (Some(1.6), Some(0.3), Some(0.6)));
}

#[test]
fn test_config_file_attached() {
    let dir = TempDir::new().unwrap();
    let good = dir.path().join("machining.json");
    fs::write(&good, "{}").unwrap();
    let text = "T1 M06 (D2.0)\nG83 Z-6 R0 I0 K0.2 F80\n";

    let session = DrillSession::from_text(text).with_config_file(&good).unwrap();
    assert!(session.config().is_some());
    let CycleParams::Fixed(p) = session.records()[0].params() else {
        panic!("expected a fixed cycle");
    };
    assert_eq!(p.i, Some(1.6));

    let bad = dir.path().join("machining.toml");
    fs::write(&bad, "materials = = 3").unwrap();
    let err = DrillSession::from_text(text)
        .with_config_file(&bad)
        .unwrap_err();
    assert!(matches!(err, SessionError::Settings(_)));
}

#[test]
fn test_save_and_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("part.nc");
    fs::write(&path, PROGRAM).unwrap();

    let mut session = DrillSession::open(&path).unwrap();
    session.apply_params(1, fixed_with_q(&session, 1, 0.75)).unwrap();
    assert!(session.is_modified());

    let out = dir.path().join("part_out.nc");
    session.save(&out).unwrap();
    assert!(!session.is_modified());

    let reopened = DrillSession::open(&out).unwrap();
    assert_eq!(reopened.records().len(), 3);
    assert_eq!(
        reopened.line(5).as_deref(),
        Some("G83 X10 Y5 Z-3 R0 Q0.75 F100")
    );
    assert_eq!(fs::read_to_string(&out).unwrap(), session.text());
}

#[test]
fn test_legacy_bytes_survive_edit() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("legacy.nc");
    let mut bytes = b"(\xB0\xAA\xB9\xD5)\r\nM03 S8000\r\n".to_vec();
    bytes.extend_from_slice(b"G83 Z-3 R0 Q1 F100\r\n");
    fs::write(&path, &bytes).unwrap();

    let mut session = DrillSession::open(&path).unwrap();
    session.update_spindle_speed(0, 7000.0).unwrap();
    session.save(&path).unwrap();

    let mut expected = b"(\xB0\xAA\xB9\xD5)\r\nM03 S7000\r\n".to_vec();
    expected.extend_from_slice(b"G83 Z-3 R0 Q1 F100\r\n");
    assert_eq!(fs::read(&path).unwrap(), expected);
}
