//! Tests for `WindowConfig` defaults and YAML loading.

use std::io::Write;

use omni_feed::{FeedError, WindowConfig, load_window_config};

#[test]
fn defaults_match_documented_values() {
    let config = WindowConfig::default();
    assert_eq!(config.initial_size, 20);
    assert_eq!(config.step_size, 20);
    assert_eq!(config.margin_bottom, 1000);
    assert_eq!(config.event_capacity, 64);
}

#[test]
fn sizes_override_independently() {
    let config = WindowConfig::from_yaml_str("step_size: 5\n").expect("parse");
    assert_eq!(config.initial_size, 20);
    assert_eq!(config.step_size, 5);

    let config = WindowConfig::from_yaml_str("initial_size: 50\n").expect("parse");
    assert_eq!(config.initial_size, 50);
    assert_eq!(config.step_size, 20);
}

#[test]
fn empty_document_yields_defaults() {
    let config = WindowConfig::from_yaml_str("  \n").expect("parse");
    assert_eq!(config, WindowConfig::default());
}

#[test]
fn zero_size_is_rejected_when_parsing() {
    let err = WindowConfig::from_yaml_str("step_size: 0\n").unwrap_err();
    assert!(matches!(err, FeedError::InvalidConfig(_)));
}

#[test]
fn malformed_yaml_is_a_config_error() {
    let err = WindowConfig::from_yaml_str("initial_size: [oops\n").unwrap_err();
    assert!(matches!(err, FeedError::Config(_)));
}

#[test]
fn normalized_clamps_zero_sizes() {
    let config = WindowConfig::default()
        .with_initial_size(0)
        .with_step_size(0)
        .normalized();
    assert_eq!(config.initial_size, 1);
    assert_eq!(config.step_size, 1);
}

#[test]
fn load_reads_file() {
    let mut file = tempfile::NamedTempFile::new().expect("tempfile");
    writeln!(file, "initial_size: 10\nstep_size: 15\nmargin_bottom: 200").expect("write");
    let config = load_window_config(file.path());
    assert_eq!(config.initial_size, 10);
    assert_eq!(config.step_size, 15);
    assert_eq!(config.margin_bottom, 200);
}

#[test]
fn load_missing_file_uses_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = load_window_config(&dir.path().join("absent.yaml"));
    assert_eq!(config, WindowConfig::default());
}

#[test]
fn load_invalid_file_falls_back_to_defaults() {
    let mut file = tempfile::NamedTempFile::new().expect("tempfile");
    writeln!(file, "step_size: not-a-number").expect("write");
    let config = load_window_config(file.path());
    assert_eq!(config, WindowConfig::default());
}

#[test]
fn from_yaml_file_reports_io_errors() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = WindowConfig::from_yaml_file(&dir.path().join("absent.yaml")).unwrap_err();
    assert!(matches!(err, FeedError::Io(_)));
}
