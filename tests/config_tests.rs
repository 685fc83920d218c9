// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for configuration module

use qrreader::config::Config;
use qrreader::errors::AppError;
use qrreader::permissions::PermissionBackendKind;
use std::path::PathBuf;
use std::time::Duration;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("qrreader-config-{}-{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

#[test]
fn test_config_default() {
    let config = Config::default();

    assert_eq!(config.permission_backend, PermissionBackendKind::Auto);
    assert_eq!(config.detection_interval(), Duration::from_millis(250));
    assert_eq!(config.max_dimension, 640);
    assert_eq!(config.presentation_timeout(), Some(Duration::from_secs(120)));
    assert!(!config.mirror_preview);
    assert!(config.last_camera_path.is_none());
}

#[test]
fn test_missing_file_gives_defaults() {
    let dir = scratch_dir("missing");
    let config = Config::load_from(&dir.join("config.json")).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_partial_file_fills_defaults() {
    let dir = scratch_dir("partial");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("config.json");
    std::fs::write(
        &path,
        r#"{ "permission_backend": "device-node", "presentation_timeout_secs": null }"#,
    )
    .unwrap();

    let config = Config::load_from(&path).unwrap();
    assert_eq!(config.permission_backend, PermissionBackendKind::DeviceNode);
    assert_eq!(config.presentation_timeout(), None);
    assert_eq!(config.max_dimension, 640);

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_invalid_json_is_config_error() {
    let dir = scratch_dir("invalid");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("config.json");
    std::fs::write(&path, "{ not json").unwrap();

    let result = Config::load_from(&path);
    assert!(matches!(result, Err(AppError::Config(_))));

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_save_and_load_round_trip() {
    let dir = scratch_dir("round-trip");
    let path = dir.join("nested").join("config.json");

    let config = Config {
        permission_backend: PermissionBackendKind::Portal,
        last_camera_path: Some("/dev/video2".to_string()),
        detection_interval_ms: 100,
        max_dimension: 320,
        presentation_timeout_secs: Some(5),
        mirror_preview: true,
    };
    config.save_to(&path).unwrap();

    assert_eq!(Config::load_from(&path).unwrap(), config);

    std::fs::remove_dir_all(&dir).unwrap();
}
