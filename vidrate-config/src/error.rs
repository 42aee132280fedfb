//! Typed error variants for the vidrate-config crate.
//!
//! Provides structured error types for settings I/O and validation. These are
//! used internally and exposed for library consumers who want to match on
//! specific failure modes instead of opaque `anyhow` strings.

use std::fmt;

/// Errors that can occur when loading, saving, or validating settings.
///
/// `Settings::load` and `Settings::save` return `anyhow::Result` for
/// convenience at the application seam; `SettingsError` values coerce
/// automatically via the `From` impl `anyhow` provides for any
/// `std::error::Error`.
#[derive(Debug)]
pub enum SettingsError {
    /// An I/O error occurred reading or writing the settings file.
    Io(std::io::Error),

    /// The settings file contained invalid YAML that could not be parsed.
    Parse(serde_yaml_ng::Error),

    /// A field value failed semantic validation.
    ///
    /// The inner string describes which field is invalid and why.
    Validation(String),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::Io(e) => write!(f, "I/O error reading settings: {e}"),
            SettingsError::Parse(e) => write!(f, "YAML parse error in settings: {e}"),
            SettingsError::Validation(msg) => write!(f, "settings validation error: {msg}"),
        }
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SettingsError::Io(e) => Some(e),
            SettingsError::Parse(e) => Some(e),
            SettingsError::Validation(_) => None,
        }
    }
}

impl From<std::io::Error> for SettingsError {
    fn from(e: std::io::Error) -> Self {
        SettingsError::Io(e)
    }
}

impl From<serde_yaml_ng::Error> for SettingsError {
    fn from(e: serde_yaml_ng::Error) -> Self {
        SettingsError::Parse(e)
    }
}
