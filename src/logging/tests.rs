// render-cfg: Configuration Template Renderer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use super::{LogConfig, LogLevel};
use tracing::Level;

#[test]
fn test_log_level_bounds() {
    assert_eq!(LogLevel::new(0).unwrap(), LogLevel::SILENT);
    assert_eq!(LogLevel::new(6).unwrap(), LogLevel::DUMP);
    assert_eq!(LogLevel::from_u8(7), None);

    let err = LogLevel::new(7).unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"invalid value for 'level' in section '[log]': log level must be 0-6, got 7");
}

#[test]
fn test_log_level_filters() {
    let filters: Vec<_> = (0..=6u8)
        .map(|n| LogLevel::new(n).unwrap().to_filter_string())
        .collect();
    insta::assert_debug_snapshot!(filters, @r#"
    [
        "off",
        "error",
        "warn",
        "warn,render_cfg=info",
        "warn,render_cfg=debug",
        "warn,render_cfg=trace",
        "trace",
    ]
    "#);
}

#[test]
fn test_log_level_tracing_level() {
    assert_eq!(LogLevel::SILENT.to_tracing_level(), None);
    assert_eq!(LogLevel::INFO.to_tracing_level(), Some(Level::INFO));
    assert_eq!(LogLevel::DUMP.to_tracing_level(), Some(Level::TRACE));
}

#[test]
fn test_log_level_deserialize_rejects_out_of_range() {
    let ok: LogLevel = serde_json::from_str("4").unwrap();
    assert_eq!(ok, LogLevel::DEBUG);
    assert!(serde_json::from_str::<LogLevel>("9").is_err());
}

#[test]
fn test_log_config_defaults() {
    let config = LogConfig::default();
    assert_eq!(config.console_level(), LogLevel::INFO);
    assert_eq!(config.file_level(), LogLevel::TRACE);
    assert_eq!(config.log_file(), None);
    assert!(!config.show_timestamps());
}
