//! Default value functions for settings.
//!
//! Each `default_*` style free function here is referenced from
//! `#[serde(default = "crate::defaults::...")]` attributes on the settings
//! types, so that partially-written settings files deserialize cleanly.

/// Speed control is on unless the user switches it off.
pub fn global_enabled() -> bool {
    true
}

/// Playback multiplier applied when a page session starts.
pub fn default_speed() -> f64 {
    1.0
}

/// Secondary multiplier toggled by the preset action.
pub fn preset_speed() -> f64 {
    2.0
}

/// Default binding for the increase action (Cmd on macOS, Ctrl elsewhere).
pub fn increase_speed_shortcut() -> String {
    format!("{}+Shift+Right", default_primary_modifier())
}

/// Default binding for the decrease action.
pub fn decrease_speed_shortcut() -> String {
    format!("{}+Shift+Left", default_primary_modifier())
}

/// Default binding for the preset toggle action.
pub fn preset_speed_shortcut() -> String {
    format!("{}+Shift+Space", default_primary_modifier())
}

fn default_primary_modifier() -> &'static str {
    #[cfg(target_os = "macos")]
    {
        "Command"
    }
    #[cfg(not(target_os = "macos"))]
    {
        "Ctrl"
    }
}
