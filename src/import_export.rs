//! Settings backup files.
//!
//! Exports produce a versioned JSON document carrying the full settings
//! record plus the shortcut bindings; imports validate the document field by
//! field before anything is applied, so a bad file can never half-import.
//! The JSON layout matches what the browser-extension options page produced,
//! so old backup files keep working.

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use vidrate_config::{MAX_SPEED, MIN_SPEED, Settings, ShortcutBindings, SpeedAction};
use vidrate_keybindings::validate_shortcut;

/// Format version written to every export. Imports warn on anything else
/// but still try; the layout has been stable since 1.0.
pub const EXPORT_VERSION: &str = "1.0";

/// Why an import file was rejected.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("backup file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("backup file has no 'settings' object")]
    MissingSettings,

    #[error("'{field}' must be {expected}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },

    #[error("'{field}' must be between {MIN_SPEED} and {MAX_SPEED}, got {value}")]
    SpeedOutOfRange { field: &'static str, value: f64 },

    #[error("{list} pattern '{pattern}' is not a valid regex")]
    InvalidRule { list: &'static str, pattern: String },

    #[error("shortcut for '{action}' is invalid: {reason}")]
    InvalidShortcut { action: String, reason: String },

    #[error("shortcut '{shortcut}' is bound to more than one action")]
    DuplicateShortcut { shortcut: String },
}

/// The settings portion of a backup file. Shortcuts travel in their own
/// top-level key, mirroring the original storage split.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportedSettings {
    global_enabled: bool,
    hide_floating_ball: bool,
    include_rules: Vec<String>,
    exclude_rules: Vec<String>,
    default_speed: f64,
    preset_speed: f64,
}

#[derive(Debug, Serialize)]
struct ExportFile<'a> {
    version: &'a str,
    timestamp: String,
    settings: ExportedSettings,
    shortcuts: &'a ShortcutBindings,
}

/// Serialize settings to a pretty-printed backup document.
pub fn export_settings(settings: &Settings) -> String {
    let file = ExportFile {
        version: EXPORT_VERSION,
        timestamp: Utc::now().to_rfc3339(),
        settings: ExportedSettings {
            global_enabled: settings.global_enabled,
            hide_floating_ball: settings.hide_floating_ball,
            include_rules: settings.include_rules.clone(),
            exclude_rules: settings.exclude_rules.clone(),
            default_speed: settings.default_speed,
            preset_speed: settings.preset_speed,
        },
        shortcuts: &settings.shortcuts,
    };
    // Only String keys and finite floats in the document.
    serde_json::to_string_pretty(&file).expect("export document serializes")
}

/// Parse and validate a backup document into a full settings record.
///
/// Every field is checked before anything is returned: types, speed ranges,
/// rule regex compilability, shortcut validity and uniqueness. Fields absent
/// from the document fall back to defaults, so a minimal `{"settings": {}}`
/// imports as the default configuration.
pub fn import_settings(json: &str) -> Result<Settings, ImportError> {
    let document: Value = serde_json::from_str(json)?;

    if let Some(version) = document.get("version").and_then(Value::as_str) {
        if version != EXPORT_VERSION {
            log::warn!("Backup file has version '{version}', expected '{EXPORT_VERSION}'");
        }
    }

    let raw = document
        .get("settings")
        .filter(|v| v.is_object())
        .ok_or(ImportError::MissingSettings)?;

    let mut settings = Settings::default();

    if let Some(value) = raw.get("globalEnabled") {
        settings.global_enabled = value.as_bool().ok_or(ImportError::InvalidField {
            field: "settings.globalEnabled",
            expected: "a boolean",
        })?;
    }
    if let Some(value) = raw.get("hideFloatingBall") {
        settings.hide_floating_ball = value.as_bool().ok_or(ImportError::InvalidField {
            field: "settings.hideFloatingBall",
            expected: "a boolean",
        })?;
    }

    settings.default_speed = speed_field(raw, "defaultSpeed", "settings.defaultSpeed")?
        .unwrap_or(settings.default_speed);
    settings.preset_speed = speed_field(raw, "presetSpeed", "settings.presetSpeed")?
        .unwrap_or(settings.preset_speed);

    if let Some(rules) = rule_list(raw, "includeRules", "settings.includeRules")? {
        settings.include_rules = rules;
    }
    if let Some(rules) = rule_list(raw, "excludeRules", "settings.excludeRules")? {
        settings.exclude_rules = rules;
    }

    if let Some(shortcuts) = document.get("shortcuts") {
        settings.shortcuts = parse_shortcuts(shortcuts)?;
    }

    Ok(settings)
}

/// Extract and range-check an optional speed field.
fn speed_field(
    raw: &Value,
    key: &str,
    field: &'static str,
) -> Result<Option<f64>, ImportError> {
    let Some(value) = raw.get(key) else {
        return Ok(None);
    };
    let speed = value.as_f64().ok_or(ImportError::InvalidField {
        field,
        expected: "a number",
    })?;
    if !speed.is_finite() || !(MIN_SPEED..=MAX_SPEED).contains(&speed) {
        return Err(ImportError::SpeedOutOfRange {
            field,
            value: speed,
        });
    }
    Ok(Some(speed))
}

/// Extract an optional rule list, rejecting non-string entries and patterns
/// that do not compile.
fn rule_list(
    raw: &Value,
    key: &str,
    list: &'static str,
) -> Result<Option<Vec<String>>, ImportError> {
    let Some(value) = raw.get(key) else {
        return Ok(None);
    };
    let entries = value.as_array().ok_or(ImportError::InvalidField {
        field: list,
        expected: "an array of strings",
    })?;

    let mut rules = Vec::with_capacity(entries.len());
    for entry in entries {
        let pattern = entry.as_str().ok_or(ImportError::InvalidField {
            field: list,
            expected: "an array of strings",
        })?;
        if regex::Regex::new(pattern).is_err() {
            return Err(ImportError::InvalidRule {
                list,
                pattern: pattern.to_string(),
            });
        }
        rules.push(pattern.to_string());
    }
    Ok(Some(rules))
}

/// Build bindings from the document's `shortcuts` object.
///
/// Unknown keys are ignored; known keys must hold valid, mutually distinct
/// shortcut strings. Missing keys keep their defaults.
fn parse_shortcuts(value: &Value) -> Result<ShortcutBindings, ImportError> {
    let object = value.as_object().ok_or(ImportError::InvalidField {
        field: "shortcuts",
        expected: "an object of shortcut strings",
    })?;

    let mut bindings = ShortcutBindings::default();
    for action in SpeedAction::ALL {
        let Some(entry) = object.get(action.as_str()) else {
            continue;
        };
        let shortcut = entry.as_str().ok_or(ImportError::InvalidField {
            field: "shortcuts",
            expected: "an object of shortcut strings",
        })?;
        validate_shortcut(shortcut).map_err(|e| ImportError::InvalidShortcut {
            action: action.to_string(),
            reason: e.to_string(),
        })?;
        bindings.set(action, shortcut.to_string());
    }

    for (action, shortcut) in bindings.iter() {
        if vidrate_keybindings::find_conflict(&bindings, shortcut, action).is_some() {
            return Err(ImportError::DuplicateShortcut {
                shortcut: shortcut.to_string(),
            });
        }
    }

    Ok(bindings)
}
