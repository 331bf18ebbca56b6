// Config loading and validation tests

use std::time::Duration;
use sysdash::config::AppConfig;
use tui::style::Color;

const VALID_CONFIG: &str = r#"
[sampler]
period_ms = 2000
unavailable_after = 5

[display]
title = "Host"
header_color = "yellow"
label_color = "white"
value_color = "light_green"

[input]
poll_interval_ms = 100

[logging]
level = "debug"
file = "logs/sysdash.log"
"#;

#[test]
fn test_config_loads_from_str() {
    let config = AppConfig::load_from_str(VALID_CONFIG).expect("load_from_str");
    assert_eq!(config.sampler.period_ms, 2000);
    assert_eq!(config.sampler.unavailable_after, 5);
    assert_eq!(config.display.title, "Host");
    assert_eq!(config.input.poll_interval_ms, 100);
    assert_eq!(config.logging.level, "debug");
    assert_eq!(
        config.logging.file.as_deref(),
        Some(std::path::Path::new("logs/sysdash.log"))
    );
}

#[test]
fn test_empty_config_uses_defaults() {
    let config = AppConfig::load_from_str("").expect("defaults");
    let sampler = config.sampler_config();
    assert_eq!(sampler.period, Duration::from_secs(2));
    assert_eq!(sampler.unavailable_after, 5);
    assert_eq!(config.poll_interval(), Duration::from_millis(100));
    assert!(config.logging.file.is_none());
}

#[test]
fn test_partial_section_keeps_other_defaults() {
    let config = AppConfig::load_from_str("[sampler]\nperiod_ms = 500\n").unwrap();
    assert_eq!(config.sampler.period_ms, 500);
    assert_eq!(config.sampler.unavailable_after, 5);
    assert_eq!(config.display.title, "System Monitor");
}

#[test]
fn test_theme_from_display_section() {
    let theme = AppConfig::load_from_str(VALID_CONFIG)
        .unwrap()
        .theme()
        .unwrap();
    assert_eq!(theme.title, "Host");
    assert_eq!(theme.header_color, Color::Yellow);
    assert_eq!(theme.label_color, Color::White);
    assert_eq!(theme.value_color, Color::LightGreen);
}

#[test]
fn test_config_validation_rejects_zero_period() {
    let bad = VALID_CONFIG.replace("period_ms = 2000", "period_ms = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("sampler.period_ms"));
}

#[test]
fn test_config_validation_rejects_zero_unavailable_after() {
    let bad = VALID_CONFIG.replace("unavailable_after = 5", "unavailable_after = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("sampler.unavailable_after"));
}

#[test]
fn test_config_validation_rejects_poll_not_below_period() {
    let bad = VALID_CONFIG.replace("poll_interval_ms = 100", "poll_interval_ms = 2000");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("input.poll_interval_ms"));
}

#[test]
fn test_config_validation_rejects_empty_title() {
    let bad = VALID_CONFIG.replace("title = \"Host\"", "title = \"\"");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("display.title"));
}

#[test]
fn test_config_validation_rejects_unknown_color() {
    let bad = VALID_CONFIG.replace("header_color = \"yellow\"", "header_color = \"mauve\"");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("display.header_color"));
}

#[test]
fn test_config_rejects_malformed_toml() {
    assert!(AppConfig::load_from_str("[sampler\nperiod_ms = 1").is_err());
}

#[test]
fn test_load_uses_config_file_env() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("sysdash.toml");
    std::fs::write(&path, VALID_CONFIG).unwrap();

    // Only test in this binary that touches the environment.
    unsafe { std::env::set_var("CONFIG_FILE", &path) };
    let config = AppConfig::load().expect("load from CONFIG_FILE");
    assert_eq!(config.display.title, "Host");

    unsafe { std::env::set_var("CONFIG_FILE", dir.path().join("missing.toml")) };
    let err = AppConfig::load().unwrap_err();
    assert!(err.to_string().contains("missing.toml"));

    unsafe { std::env::remove_var("CONFIG_FILE") };
}
