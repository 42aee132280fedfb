//! Canonical shortcut strings.
//!
//! A key event is canonicalized to an ordered token list
//! `[Ctrl?, Alt?, Shift?, (Command|Win)?]` followed by the main key name,
//! joined with `+`, e.g. "Ctrl+Shift+Right". The same strings are stored in
//! settings and compared at runtime, so canonicalization is the single point
//! where key naming is decided.

use crate::platform;
use std::fmt;

/// Error type for shortcut validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortcutError(pub(crate) String);

impl fmt::Display for ShortcutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ShortcutError {}

/// A key event as delivered by a page context.
///
/// Mirrors the modifier flags and key name of a browser `KeyboardEvent`;
/// `key` carries the event's key value ("a", "ArrowRight", " ", "F5", ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPress {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
    pub key: String,
}

impl KeyPress {
    /// Convenience constructor for an unmodified key press.
    pub fn bare(key: impl Into<String>) -> Self {
        Self {
            ctrl: false,
            alt: false,
            shift: false,
            meta: false,
            key: key.into(),
        }
    }

    /// True when the event's key is itself a modifier (Control held down
    /// alone, etc.). Such events never produce a canonical string; the
    /// recognizer waits for the real key.
    pub fn is_bare_modifier(&self) -> bool {
        matches!(self.key.as_str(), "Control" | "Alt" | "Shift" | "Meta")
    }
}

/// Canonicalize a key event into a shortcut string.
///
/// Returns `None` when the event is a bare modifier press. The result is not
/// guaranteed to be a *valid* binding (it may lack modifiers entirely); use
/// [`is_valid_shortcut`] for that check.
pub fn canonicalize(press: &KeyPress) -> Option<String> {
    if press.is_bare_modifier() {
        return None;
    }

    let mut parts: Vec<&str> = Vec::with_capacity(5);
    if press.ctrl {
        parts.push("Ctrl");
    }
    if press.alt {
        parts.push("Alt");
    }
    if press.shift {
        parts.push("Shift");
    }
    if press.meta {
        parts.push(platform::meta_key_name());
    }

    let main = rename_key(&press.key);
    parts.push(&main);

    Some(parts.join("+"))
}

/// Map a raw key value to its canonical token.
///
/// Special keys are renamed via a fixed table; function keys pass through;
/// single printable characters are upper-cased; anything else keeps the
/// event's own name.
fn rename_key(key: &str) -> String {
    match key {
        " " | "Spacebar" => "Space".to_string(),
        "ArrowUp" => "Up".to_string(),
        "ArrowDown" => "Down".to_string(),
        "ArrowLeft" => "Left".to_string(),
        "ArrowRight" => "Right".to_string(),
        "Escape" => "Esc".to_string(),
        "Delete" => "Del".to_string(),
        "Insert" => "Ins".to_string(),
        other => {
            let mut chars = other.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => c.to_uppercase().to_string(),
                _ => other.to_string(),
            }
        }
    }
}

/// Check whether a canonical string is a usable binding.
///
/// A binding must carry at least one modifier token; a bare key would
/// shadow normal typing on the page.
pub fn is_valid_shortcut(shortcut: &str) -> bool {
    if shortcut.is_empty() {
        return false;
    }
    shortcut
        .split('+')
        .any(|token| matches!(token, "Ctrl" | "Alt" | "Shift" | "Meta" | "Command" | "Win"))
}

/// Validate a binding, returning a reason string on rejection.
pub fn validate_shortcut(shortcut: &str) -> Result<(), ShortcutError> {
    if is_valid_shortcut(shortcut) {
        Ok(())
    } else {
        Err(ShortcutError(format!(
            "shortcut '{shortcut}' must include at least one modifier (Ctrl/Alt/Shift/Meta)"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(ctrl: bool, alt: bool, shift: bool, meta: bool, key: &str) -> KeyPress {
        KeyPress {
            ctrl,
            alt,
            shift,
            meta,
            key: key.to_string(),
        }
    }

    #[test]
    fn test_ctrl_shift_arrow() {
        let combo = canonicalize(&press(true, false, true, false, "ArrowRight"));
        assert_eq!(combo.as_deref(), Some("Ctrl+Shift+Right"));
    }

    #[test]
    fn test_modifier_token_order() {
        let combo = canonicalize(&press(true, true, true, false, "ArrowUp"));
        assert_eq!(combo.as_deref(), Some("Ctrl+Alt+Shift+Up"));
    }

    #[test]
    fn test_space_is_renamed() {
        let combo = canonicalize(&press(true, false, true, false, " "));
        assert_eq!(combo.as_deref(), Some("Ctrl+Shift+Space"));
    }

    #[test]
    fn test_single_char_uppercased() {
        let combo = canonicalize(&press(true, false, false, false, "a"));
        assert_eq!(combo.as_deref(), Some("Ctrl+A"));
    }

    #[test]
    fn test_function_key_passes_through() {
        let combo = canonicalize(&press(false, true, false, false, "F5"));
        assert_eq!(combo.as_deref(), Some("Alt+F5"));
    }

    #[test]
    fn test_special_key_renames() {
        assert_eq!(
            canonicalize(&press(true, false, false, false, "Escape")).as_deref(),
            Some("Ctrl+Esc")
        );
        assert_eq!(
            canonicalize(&press(true, false, false, false, "Delete")).as_deref(),
            Some("Ctrl+Del")
        );
        assert_eq!(
            canonicalize(&press(true, false, false, false, "Insert")).as_deref(),
            Some("Ctrl+Ins")
        );
    }

    #[test]
    fn test_bare_modifier_yields_none() {
        for key in ["Control", "Alt", "Shift", "Meta"] {
            assert_eq!(canonicalize(&KeyPress::bare(key)), None);
        }
    }

    #[test]
    fn test_meta_name_is_platform_dependent() {
        let combo = canonicalize(&press(false, false, false, true, "k")).unwrap();
        #[cfg(target_os = "macos")]
        assert_eq!(combo, "Command+K");
        #[cfg(not(target_os = "macos"))]
        assert_eq!(combo, "Win+K");
    }

    #[test]
    fn test_unmodified_key_is_canonical_but_invalid() {
        let combo = canonicalize(&KeyPress::bare("x")).unwrap();
        assert_eq!(combo, "X");
        assert!(!is_valid_shortcut(&combo));
    }

    #[test]
    fn test_is_valid_shortcut() {
        assert!(is_valid_shortcut("Ctrl+Shift+Right"));
        assert!(is_valid_shortcut("Alt+F5"));
        assert!(is_valid_shortcut("Command+Shift+Space"));
        assert!(is_valid_shortcut("Win+K"));
        assert!(!is_valid_shortcut("Right"));
        assert!(!is_valid_shortcut("X"));
        assert!(!is_valid_shortcut(""));
    }

    #[test]
    fn test_validate_shortcut_reason_names_modifiers() {
        let err = validate_shortcut("Q").expect_err("should be rejected");
        assert!(err.to_string().contains("modifier"));
    }
}
