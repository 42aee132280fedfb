//! Platform-specific shortcut resolution.
//!
//! Contains:
//! - Meta-key display name (Command on macOS, Win elsewhere)
//! - Platform default bindings

use vidrate_config::ShortcutBindings;

/// Canonical token for the Meta/Super modifier on this platform.
#[inline]
pub fn meta_key_name() -> &'static str {
    #[cfg(target_os = "macos")]
    {
        "Command"
    }
    #[cfg(not(target_os = "macos"))]
    {
        "Win"
    }
}

/// Default bindings for the current platform.
///
/// macOS uses Command+Shift combos to stay out of the way of browser Ctrl
/// shortcuts; everywhere else Ctrl+Shift is the convention.
pub fn default_bindings() -> ShortcutBindings {
    ShortcutBindings::default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use vidrate_config::SpeedAction;

    #[test]
    fn test_default_bindings_use_platform_modifier() {
        let bindings = default_bindings();
        let increase = bindings.get(SpeedAction::IncreaseSpeed);
        #[cfg(target_os = "macos")]
        assert_eq!(increase, "Command+Shift+Right");
        #[cfg(not(target_os = "macos"))]
        assert_eq!(increase, "Ctrl+Shift+Right");
    }
}
