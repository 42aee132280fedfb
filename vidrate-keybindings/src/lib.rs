//! Shortcut recognition for vidrate.
//!
//! This crate turns raw key events from a page context into speed actions:
//!
//! - Canonicalization of key events to shortcut strings (Ctrl+Shift+Right)
//! - A registry matching canonical strings against configured bindings
//! - Configuration-time conflict detection and recording

pub mod parser;
pub mod platform;
mod recorder;

pub use parser::{KeyPress, ShortcutError, canonicalize, is_valid_shortcut, validate_shortcut};
pub use recorder::{RecordOutcome, ShortcutRecorder};

use vidrate_config::{ShortcutBindings, SpeedAction};

/// Registry of shortcut bindings mapping canonical strings to actions.
///
/// Built from a settings snapshot and rebuilt whenever settings reload.
#[derive(Debug, Default)]
pub struct ShortcutRegistry {
    /// (action, canonical string) pairs in the fixed binding order.
    bindings: Vec<(SpeedAction, String)>,
}

impl ShortcutRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from configured bindings.
    ///
    /// Invalid binding strings (no modifier) are logged and skipped; the
    /// remaining bindings still work.
    pub fn from_bindings(bindings: &ShortcutBindings) -> Self {
        let mut registry = Self::new();

        for (action, shortcut) in bindings.iter() {
            match validate_shortcut(shortcut) {
                Ok(()) => {
                    log::debug!("Registered shortcut: {} -> {}", shortcut, action);
                    registry.bindings.push((action, shortcut.to_string()));
                }
                Err(e) => {
                    log::warn!("Invalid shortcut '{}' for action '{}': {}", shortcut, action, e);
                }
            }
        }

        log::info!(
            "Shortcut registry initialized with {} bindings",
            registry.bindings.len()
        );
        registry
    }

    /// Look up the action for a key event.
    ///
    /// The event is canonicalized and compared for exact string equality
    /// against each binding, first match in the fixed order wins.
    pub fn lookup(&self, press: &KeyPress) -> Option<SpeedAction> {
        let candidate = canonicalize(press)?;
        self.bindings
            .iter()
            .find(|(_, shortcut)| *shortcut == candidate)
            .map(|(action, _)| *action)
    }

    /// Check if the registry has any bindings.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Get the number of registered bindings.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }
}

/// Find the action, other than `exclude`, already bound to `candidate`.
///
/// Used at configuration time: two actions must never share a canonical
/// string, and the rejection message names the holder of the conflicting
/// binding.
pub fn find_conflict(
    bindings: &ShortcutBindings,
    candidate: &str,
    exclude: SpeedAction,
) -> Option<SpeedAction> {
    bindings
        .iter()
        .find(|(action, shortcut)| *action != exclude && *shortcut == candidate)
        .map(|(action, _)| action)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bindings() -> ShortcutBindings {
        ShortcutBindings {
            increase_speed: "Ctrl+Shift+Right".to_string(),
            decrease_speed: "Ctrl+Shift+Left".to_string(),
            preset_speed: "Ctrl+Shift+Space".to_string(),
        }
    }

    fn press(ctrl: bool, shift: bool, key: &str) -> KeyPress {
        KeyPress {
            ctrl,
            alt: false,
            shift,
            meta: false,
            key: key.to_string(),
        }
    }

    #[test]
    fn test_lookup_matches_configured_binding() {
        let registry = ShortcutRegistry::from_bindings(&bindings());
        assert_eq!(
            registry.lookup(&press(true, true, "ArrowRight")),
            Some(SpeedAction::IncreaseSpeed)
        );
        assert_eq!(
            registry.lookup(&press(true, true, "ArrowLeft")),
            Some(SpeedAction::DecreaseSpeed)
        );
        assert_eq!(
            registry.lookup(&press(true, true, " ")),
            Some(SpeedAction::PresetSpeed)
        );
    }

    #[test]
    fn test_lookup_misses_unbound_combo() {
        let registry = ShortcutRegistry::from_bindings(&bindings());
        assert_eq!(registry.lookup(&press(true, true, "ArrowUp")), None);
        assert_eq!(registry.lookup(&press(false, true, "ArrowRight")), None);
    }

    #[test]
    fn test_bare_modifier_never_matches() {
        let registry = ShortcutRegistry::from_bindings(&bindings());
        assert_eq!(registry.lookup(&press(true, true, "Control")), None);
    }

    #[test]
    fn test_invalid_binding_skipped() {
        let mut b = bindings();
        b.preset_speed = "Space".to_string(); // no modifier
        let registry = ShortcutRegistry::from_bindings(&b);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.lookup(&KeyPress::bare(" ")), None);
    }

    #[test]
    fn test_find_conflict_names_holder() {
        let b = bindings();
        assert_eq!(
            find_conflict(&b, "Ctrl+Shift+Left", SpeedAction::IncreaseSpeed),
            Some(SpeedAction::DecreaseSpeed)
        );
    }

    #[test]
    fn test_find_conflict_ignores_own_binding() {
        let b = bindings();
        assert_eq!(
            find_conflict(&b, "Ctrl+Shift+Right", SpeedAction::IncreaseSpeed),
            None
        );
    }
}
