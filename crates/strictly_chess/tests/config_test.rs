//! Tests for session configuration loading.

use std::io::Write;
use std::time::Duration;
use strictly_chess::{OracleKind, SessionConfig, Side};
use tempfile::NamedTempFile;

#[test]
fn test_load_full_config() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
oracle = "local"
oracle_url = "http://localhost:8080/engine"
strength = 15
oracle_timeout_secs = 5
manual_side = "black"
log_file = "game.log"
"#
    )
    .unwrap();

    let config = SessionConfig::from_file(file.path()).unwrap();

    assert_eq!(*config.oracle(), OracleKind::Local);
    assert_eq!(config.oracle_url(), "http://localhost:8080/engine");
    assert_eq!(*config.strength(), 15);
    assert_eq!(config.oracle_timeout(), Some(Duration::from_secs(5)));
    assert_eq!(*config.manual_side(), Side::Second);
    assert_eq!(config.oracle_side(), Side::First);
    assert_eq!(config.log_file().to_str(), Some("game.log"));
}

#[test]
fn test_partial_config_uses_defaults() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "strength = 3").unwrap();

    let config = SessionConfig::from_file(file.path()).unwrap();

    assert_eq!(*config.strength(), 3);
    assert_eq!(*config.oracle(), OracleKind::Http);
    assert_eq!(*config.manual_side(), Side::First);
}

#[test]
fn test_missing_file_loads_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = SessionConfig::load(dir.path().join("absent.toml")).unwrap();

    assert_eq!(config.strength(), SessionConfig::default().strength());
    assert_eq!(config.manual_side(), SessionConfig::default().manual_side());
}

#[test]
fn test_malformed_config_is_an_error() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "oracle = \"carrier-pigeon\"").unwrap();

    let err = SessionConfig::from_file(file.path()).unwrap_err();
    assert!(err.message.contains("Failed to parse config"));
}

#[test]
fn test_builder_overrides() {
    let config = SessionConfig::default()
        .with_oracle(OracleKind::Local)
        .with_strength(1)
        .with_manual_side(Side::Second);

    assert_eq!(*config.oracle(), OracleKind::Local);
    assert_eq!(*config.strength(), 1);
    assert_eq!(config.oracle_side(), Side::First);
}
