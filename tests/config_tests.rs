// Integration tests for configuration loading and validation

mod common;

use common::create_test_config;
use robot_console::Config;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_default_config_is_valid() {
    let config = Config::default();
    assert!(config.validate().is_ok());
    assert!(config.stream.url.starts_with("wss://"));
    assert!(!config.stream.pairs.is_empty());
    assert!(config.api.control_timeout_secs > 0);
}

#[test]
fn test_config_serialization_deserialization() {
    let config = create_test_config();

    let toml_string = toml::to_string(&config).expect("Failed to serialize config");

    assert!(!toml_string.is_empty());
    assert!(toml_string.contains("btcusdt"));
    assert!(toml_string.contains("session_token"));

    let deserialized: Config = toml::from_str(&toml_string).expect("Failed to deserialize config");

    assert_eq!(deserialized.stream.url, config.stream.url);
    assert_eq!(deserialized.stream.pairs, config.stream.pairs);
    assert_eq!(deserialized.api.base_url, config.api.base_url);
}

#[test]
fn test_config_file_loading() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("test_config.toml");

    let config = create_test_config();
    let toml_string = toml::to_string(&config).expect("Failed to serialize config");

    fs::write(&config_path, toml_string).expect("Failed to write config file");

    let loaded = Config::from_file(&config_path).expect("Failed to load config");

    assert_eq!(loaded.stream.pairs.len(), 2);
    assert_eq!(loaded.api.session_token, "test-session-token");
}

#[test]
fn test_load_or_create_writes_default() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("config.toml");

    assert!(!config_path.exists());
    let created = Config::load_or_create(&config_path).expect("Failed to create config");
    assert!(config_path.exists());

    let reloaded = Config::from_file(&config_path).expect("Failed to reload config");
    assert_eq!(reloaded.stream.url, created.stream.url);
}

#[test]
fn test_validation_rejects_bad_values() {
    let mut config = create_test_config();
    config.stream.url = "https://not-a-websocket".to_string();
    assert!(config.validate().is_err());

    let mut config = create_test_config();
    config.stream.pairs.clear();
    assert!(config.validate().is_err());

    let mut config = create_test_config();
    config.api.control_timeout_secs = 0;
    assert!(config.validate().is_err());

    let mut config = create_test_config();
    config.stream.reconnect_max_secs = 0;
    assert!(config.validate().is_err());
}
