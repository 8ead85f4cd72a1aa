use demandscope::columns::CanonicalField;
use demandscope::config::{AppConfig, ConfigError};
use std::path::PathBuf;

#[test]
fn missing_config_uses_defaults() {
    let tmp = tempfile::tempdir().unwrap();
    let cfg = AppConfig::load(&tmp.path().join("absent.json")).unwrap();
    assert_eq!(cfg, AppConfig::default());
    assert_eq!(cfg.dashboard_dir(), PathBuf::from("data").join("dashboard"));
}

#[test]
fn partial_config_fills_defaults_and_extends_columns() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("cfg.json");
    std::fs::write(&path, r#"{"keep_snapshots":3,"extra_columns":{"Avatar link":"avatar_url"}}"#).unwrap();
    let cfg = AppConfig::load(&path).unwrap();
    assert_eq!(cfg.keep_snapshots, Some(3));
    assert_eq!(cfg.data_dir, PathBuf::from("data"));
    let map = cfg.column_map().unwrap();
    assert_eq!(map.resolve("Avatar link"), Some(CanonicalField::AvatarUrl));
    assert_eq!(map.resolve("desired_price"), Some(CanonicalField::DesiredPrice));
}

#[test]
fn unknown_field_name_is_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("cfg.json");
    std::fs::write(&path, r#"{"extra_columns":{"Price?":"price"}}"#).unwrap();
    let err = AppConfig::load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Column { ref label, .. } if label == "Price?"));

    std::fs::write(&path, "{oops").unwrap();
    assert!(matches!(AppConfig::load(&path).unwrap_err(), ConfigError::Json { .. }));
}

#[test]
fn zero_retention_is_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("cfg.json");
    std::fs::write(&path, r#"{"keep_snapshots":0}"#).unwrap();
    assert!(matches!(AppConfig::load(&path).unwrap_err(), ConfigError::KeepSnapshots { .. }));
}
