//! Tests for settings backup import/export.

#![allow(clippy::field_reassign_with_default)]

use vidrate::import_export::{EXPORT_VERSION, ImportError, export_settings, import_settings};
use vidrate_config::Settings;

#[test]
fn test_export_round_trips_through_import() {
    let mut settings = Settings::default();
    settings.global_enabled = false;
    settings.hide_floating_ball = true;
    settings.include_rules = vec!["^https://example\\.com".to_string()];
    settings.exclude_rules = vec!["youtube\\.com".to_string()];
    settings.default_speed = 1.5;
    settings.preset_speed = 3.0;
    settings.shortcuts.increase_speed = "Alt+Up".to_string();

    let document = export_settings(&settings);
    let imported = import_settings(&document).expect("import");
    assert_eq!(imported, settings);
}

#[test]
fn test_export_carries_version_and_timestamp() {
    let document = export_settings(&Settings::default());
    let value: serde_json::Value = serde_json::from_str(&document).expect("parse");
    assert_eq!(value["version"], EXPORT_VERSION);
    let timestamp = value["timestamp"].as_str().expect("timestamp string");
    // RFC 3339, e.g. 2026-08-30T12:34:56.789Z
    assert!(timestamp.contains('T'), "not a timestamp: {timestamp}");
    assert!(value["settings"].is_object());
    assert!(value["shortcuts"].is_object());
}

#[test]
fn test_export_uses_camel_case_wire_names() {
    let document = export_settings(&Settings::default());
    let value: serde_json::Value = serde_json::from_str(&document).expect("parse");
    let settings = &value["settings"];
    assert!(settings.get("globalEnabled").is_some());
    assert!(settings.get("hideFloatingBall").is_some());
    assert!(settings.get("includeRules").is_some());
    assert!(settings.get("excludeRules").is_some());
    assert!(settings.get("defaultSpeed").is_some());
    assert!(settings.get("presetSpeed").is_some());
    assert!(value["shortcuts"].get("increaseSpeed").is_some());
}

#[test]
fn test_minimal_document_imports_as_defaults() {
    let imported = import_settings(r#"{"settings": {}}"#).expect("import");
    assert_eq!(imported, Settings::default());
}

#[test]
fn test_missing_settings_key_rejected() {
    let err = import_settings(r#"{"version": "1.0"}"#).expect_err("should fail");
    assert!(matches!(err, ImportError::MissingSettings));
}

#[test]
fn test_malformed_json_rejected() {
    let err = import_settings("{not json").expect_err("should fail");
    assert!(matches!(err, ImportError::Json(_)));
}

#[test]
fn test_out_of_range_speed_rejected() {
    let err = import_settings(r#"{"settings": {"defaultSpeed": 20.0}}"#)
        .expect_err("should fail");
    match err {
        ImportError::SpeedOutOfRange { field, value } => {
            assert_eq!(field, "settings.defaultSpeed");
            assert_eq!(value, 20.0);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_wrong_field_type_rejected() {
    let err = import_settings(r#"{"settings": {"globalEnabled": "yes"}}"#)
        .expect_err("should fail");
    assert!(matches!(err, ImportError::InvalidField { .. }));
}

#[test]
fn test_malformed_rule_pattern_rejected() {
    let err = import_settings(r#"{"settings": {"excludeRules": ["[unclosed"]}}"#)
        .expect_err("should fail");
    match err {
        ImportError::InvalidRule { list, pattern } => {
            assert_eq!(list, "settings.excludeRules");
            assert_eq!(pattern, "[unclosed");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_shortcut_without_modifier_rejected() {
    let document = r#"{"settings": {}, "shortcuts": {"increaseSpeed": "Right"}}"#;
    let err = import_settings(document).expect_err("should fail");
    assert!(matches!(err, ImportError::InvalidShortcut { .. }));
}

#[test]
fn test_duplicate_shortcut_rejected() {
    let document = r#"{
        "settings": {},
        "shortcuts": {
            "increaseSpeed": "Ctrl+Shift+Up",
            "decreaseSpeed": "Ctrl+Shift+Up"
        }
    }"#;
    let err = import_settings(document).expect_err("should fail");
    assert!(matches!(err, ImportError::DuplicateShortcut { .. }));
}

#[test]
fn test_partial_shortcuts_keep_defaults_for_the_rest() {
    let document = r#"{"settings": {}, "shortcuts": {"presetSpeed": "Alt+P"}}"#;
    let imported = import_settings(document).expect("import");
    assert_eq!(imported.shortcuts.preset_speed, "Alt+P");
    assert_eq!(
        imported.shortcuts.increase_speed,
        Settings::default().shortcuts.increase_speed
    );
}

#[test]
fn test_unknown_version_still_imports() {
    let document = r#"{"version": "0.9", "settings": {"defaultSpeed": 1.25}}"#;
    let imported = import_settings(document).expect("import");
    assert_eq!(imported.default_speed, 1.25);
}

#[test]
fn test_validation_failure_is_all_or_nothing() {
    // Valid fields next to an invalid one must not leak through.
    let document = r#"{"settings": {"defaultSpeed": 1.5, "presetSpeed": 99.0}}"#;
    assert!(import_settings(document).is_err());
}
