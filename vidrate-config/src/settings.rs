//! The canonical settings record and its persistence.
//!
//! Settings are stored as a single YAML file under the XDG config directory
//! and always read and written as a whole record. Callers that want to change
//! one field fetch the full record, mutate it, and save it back; there is no
//! partial-field merge at this layer.

use crate::error::SettingsError;
use crate::types::ShortcutBindings;
use crate::{MAX_SPEED, MIN_SPEED};
use anyhow::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Canonical configuration for the speed engine.
///
/// Field names serialize in camelCase so settings files and export files stay
/// interchangeable with the layout the browser-extension storage used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Master on/off switch. When false no page receives speed control.
    #[serde(default = "crate::defaults::global_enabled")]
    pub global_enabled: bool,

    /// UI preference carried for round-tripping; the engine never reads it.
    #[serde(default)]
    pub hide_floating_ball: bool,

    /// Regex allow-list. Non-empty means speed control runs only on URLs
    /// matching at least one pattern, and the exclude list is ignored.
    #[serde(default)]
    pub include_rules: Vec<String>,

    /// Regex deny-list, consulted only when `include_rules` is empty.
    #[serde(default)]
    pub exclude_rules: Vec<String>,

    /// Playback multiplier a page session starts with, in [0.25, 16.0].
    #[serde(default = "crate::defaults::default_speed")]
    pub default_speed: f64,

    /// Secondary multiplier toggled by the preset action, in [0.25, 16.0].
    #[serde(default = "crate::defaults::preset_speed")]
    pub preset_speed: f64,

    /// Canonical shortcut string per action.
    #[serde(default)]
    pub shortcuts: ShortcutBindings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            global_enabled: crate::defaults::global_enabled(),
            hide_floating_ball: false,
            include_rules: Vec::new(),
            exclude_rules: Vec::new(),
            default_speed: crate::defaults::default_speed(),
            preset_speed: crate::defaults::preset_speed(),
            shortcuts: ShortcutBindings::default(),
        }
    }
}

impl Settings {
    /// Load settings from the default path, creating the file with defaults
    /// when it does not exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::settings_path())
    }

    /// Load settings from an explicit path, creating the file with defaults
    /// when it does not exist yet.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            log::info!("Loading settings from {:?}", path);
            let contents = fs::read_to_string(path).map_err(SettingsError::Io)?;
            let mut settings: Settings =
                serde_yaml_ng::from_str(&contents).map_err(SettingsError::Parse)?;
            settings.normalize();
            Ok(settings)
        } else {
            log::info!("Settings file not found, creating default at {:?}", path);
            let settings = Self::default();
            settings.save_to(path)?;
            Ok(settings)
        }
    }

    /// Save settings to the default path.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::settings_path())
    }

    /// Save settings to an explicit path.
    ///
    /// Writes to a temp file in the same directory and renames it into place
    /// so a crash mid-write never leaves a truncated settings file.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(SettingsError::Io)?;
        }

        let yaml = serde_yaml_ng::to_string(self).map_err(SettingsError::Parse)?;
        let temp_path = path.with_extension("yaml.tmp");
        fs::write(&temp_path, &yaml).map_err(SettingsError::Io)?;
        fs::rename(&temp_path, path).map_err(SettingsError::Io)?;

        Ok(())
    }

    /// Get the settings file path (XDG convention).
    pub fn settings_path() -> PathBuf {
        Self::config_dir().join("settings.yaml")
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        #[cfg(target_os = "windows")]
        {
            if let Some(config_dir) = dirs::config_dir() {
                config_dir.join("vidrate")
            } else {
                PathBuf::from(".")
            }
        }
        #[cfg(not(target_os = "windows"))]
        {
            // XDG convention on all platforms: ~/.config/vidrate
            if let Some(home_dir) = dirs::home_dir() {
                home_dir.join(".config").join("vidrate")
            } else {
                PathBuf::from(".")
            }
        }
    }

    /// Clamp out-of-range numeric fields back into their documented ranges.
    ///
    /// Serde defaults already guarantee the list fields are present, so this
    /// only has to repair the speed values.
    pub fn normalize(&mut self) {
        let clamp = |value: f64, name: &str| {
            if !value.is_finite() {
                log::warn!("{name} is not finite, resetting to 1.0");
                return 1.0;
            }
            if value < MIN_SPEED || value > MAX_SPEED {
                log::warn!(
                    "{name} {value} outside [{MIN_SPEED}, {MAX_SPEED}], clamping"
                );
            }
            value.clamp(MIN_SPEED, MAX_SPEED)
        };
        self.default_speed = clamp(self.default_speed, "defaultSpeed");
        self.preset_speed = clamp(self.preset_speed, "presetSpeed");
    }

    /// Validate the record without mutating it.
    ///
    /// Speed ranges are hard invariants. Rule patterns are checked for
    /// compilability so configuration surfaces can reject bad regexes before
    /// they are saved; at evaluation time a malformed pattern that slipped
    /// through is still tolerated (treated as non-matching).
    pub fn validate(&self) -> Result<(), SettingsError> {
        for (name, value) in [
            ("defaultSpeed", self.default_speed),
            ("presetSpeed", self.preset_speed),
        ] {
            if !value.is_finite() || value < MIN_SPEED || value > MAX_SPEED {
                return Err(SettingsError::Validation(format!(
                    "{name} must be between {MIN_SPEED} and {MAX_SPEED}, got {value}"
                )));
            }
        }

        for (list, rules) in [
            ("includeRules", &self.include_rules),
            ("excludeRules", &self.exclude_rules),
        ] {
            for pattern in rules {
                if let Err(e) = Regex::new(pattern) {
                    return Err(SettingsError::Validation(format!(
                        "{list} pattern '{pattern}' is not a valid regex: {e}"
                    )));
                }
            }
        }

        Ok(())
    }
}
