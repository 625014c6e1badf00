use peckkit_core::{MachineLimit, PeckPreset, ProcessTables};
use peckkit_settings::{MachiningConfig, SettingsError};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_json_save_and_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("machining.json");

    let mut config = MachiningConfig::default();
    config.limits.max_rpm = 24000.0;
    config.save_to_file(&path).unwrap();

    let loaded = MachiningConfig::load_from_file(&path).unwrap();
    assert_eq!(loaded, config);
    assert_eq!(loaded.limit(MachineLimit::MaxRpm), Some(24000.0));
}

#[test]
fn test_toml_save_and_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("machining.toml");

    let config = MachiningConfig::default();
    config.save_to_file(&path).unwrap();
    assert!(path.exists());

    let loaded = MachiningConfig::load_from_file(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_partial_file_merges_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("machining.json");
    fs::write(
        &path,
        r#"{
            "materials": { "BRASS": { "Vc": 80, "fr_factor": 0.02, "desc": "Brass" } },
            "limits": { "max_rpm": 12000 }
        }"#,
    )
    .unwrap();

    let config = MachiningConfig::load_from_file(&path).unwrap();
    assert_eq!(config.materials.len(), 6);
    assert_eq!(config.material("BRASS").unwrap().cutting_speed, 80.0);
    assert_eq!(config.material("SUS304").unwrap().cutting_speed, 25.0);
    assert_eq!(config.limits.max_rpm, 12000.0);
    assert_eq!(config.limits.min_q, 0.05);
    assert_eq!(config.taylor_exponent("HSS"), Some(0.10));
}

#[test]
fn test_peck_ratios_lookup() {
    let config = MachiningConfig::default();
    let deep = config.peck_ratios(PeckPreset::DeepHole).unwrap();
    assert_eq!(deep.i_ratio, 0.4);
    assert_eq!(deep.k_ratio, 0.1);
}

#[test]
fn test_invalid_values_rejected_on_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("machining.json");
    fs::write(&path, r#"{ "limits": { "min_q": -1.0 } }"#).unwrap();

    let err = MachiningConfig::load_from_file(&path).unwrap_err();
    assert!(matches!(err, SettingsError::InvalidSetting { .. }));

    let fallback = MachiningConfig::load_or_default(&path);
    assert_eq!(fallback, MachiningConfig::default());
}

#[test]
fn test_unsupported_extension() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("machining.ini");
    let err = MachiningConfig::default().save_to_file(&path).unwrap_err();
    assert!(matches!(err, SettingsError::UnsupportedFormat(_)));
}

#[test]
fn test_import_and_reset() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("shop.toml");
    let active = dir.path().join("active.json");

    let mut shop = MachiningConfig::default();
    shop.coolant_factors.insert("Flood".to_string(), 1.2);
    shop.save_to_file(&source).unwrap();

    let imported = MachiningConfig::import_from(&source, &active).unwrap();
    assert_eq!(imported.coolant_factor("Flood"), Some(1.2));
    assert_eq!(
        MachiningConfig::load_from_file(&active).unwrap().coolant_factor("Flood"),
        Some(1.2)
    );

    let mut config = imported;
    config.reset_to_defaults(&active).unwrap();
    assert_eq!(config.coolant_factor("Flood"), None);
    assert_eq!(
        MachiningConfig::load_from_file(&active).unwrap(),
        MachiningConfig::default()
    );
}

#[test]
fn test_missing_file_gives_defaults() {
    let dir = TempDir::new().unwrap();
    let config = MachiningConfig::load_or_default(&dir.path().join("absent.json"));
    assert_eq!(config, MachiningConfig::default());
}
