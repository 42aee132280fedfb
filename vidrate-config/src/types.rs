//! Shared settings types: speed actions and shortcut bindings.

use serde::{Deserialize, Serialize};

/// The fixed set of actions a shortcut can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SpeedAction {
    /// Raise the current playback multiplier by one step.
    IncreaseSpeed,
    /// Lower the current playback multiplier by one step.
    DecreaseSpeed,
    /// Toggle between the preset multiplier and normal speed.
    PresetSpeed,
}

impl SpeedAction {
    /// All actions, in the fixed order used for matching and conflict checks.
    pub const ALL: [SpeedAction; 3] = [
        SpeedAction::IncreaseSpeed,
        SpeedAction::DecreaseSpeed,
        SpeedAction::PresetSpeed,
    ];

    /// Stable identifier used in storage and export files.
    pub fn as_str(&self) -> &'static str {
        match self {
            SpeedAction::IncreaseSpeed => "increaseSpeed",
            SpeedAction::DecreaseSpeed => "decreaseSpeed",
            SpeedAction::PresetSpeed => "presetSpeed",
        }
    }

    /// Human-readable description for configuration UIs and error messages.
    pub fn description(&self) -> &'static str {
        match self {
            SpeedAction::IncreaseSpeed => "increase playback speed (+0.25x)",
            SpeedAction::DecreaseSpeed => "decrease playback speed (-0.25x)",
            SpeedAction::PresetSpeed => "toggle preset speed",
        }
    }
}

impl std::fmt::Display for SpeedAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical shortcut string for each action.
///
/// The action set is fixed at three entries, so bindings are stored as plain
/// fields rather than a map. `iter()` yields them in declaration order; that
/// order is what shortcut matching and conflict detection rely on. If the
/// action set ever grows, the iteration order stops being an adequate
/// tie-break and matching needs an explicit priority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortcutBindings {
    #[serde(default = "crate::defaults::increase_speed_shortcut")]
    pub increase_speed: String,

    #[serde(default = "crate::defaults::decrease_speed_shortcut")]
    pub decrease_speed: String,

    #[serde(default = "crate::defaults::preset_speed_shortcut")]
    pub preset_speed: String,
}

impl Default for ShortcutBindings {
    fn default() -> Self {
        Self {
            increase_speed: crate::defaults::increase_speed_shortcut(),
            decrease_speed: crate::defaults::decrease_speed_shortcut(),
            preset_speed: crate::defaults::preset_speed_shortcut(),
        }
    }
}

impl ShortcutBindings {
    /// Get the shortcut string bound to an action.
    pub fn get(&self, action: SpeedAction) -> &str {
        match action {
            SpeedAction::IncreaseSpeed => &self.increase_speed,
            SpeedAction::DecreaseSpeed => &self.decrease_speed,
            SpeedAction::PresetSpeed => &self.preset_speed,
        }
    }

    /// Replace the shortcut string bound to an action.
    pub fn set(&mut self, action: SpeedAction, shortcut: impl Into<String>) {
        let slot = match action {
            SpeedAction::IncreaseSpeed => &mut self.increase_speed,
            SpeedAction::DecreaseSpeed => &mut self.decrease_speed,
            SpeedAction::PresetSpeed => &mut self.preset_speed,
        };
        *slot = shortcut.into();
    }

    /// Iterate bindings in the fixed declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (SpeedAction, &str)> {
        SpeedAction::ALL
            .iter()
            .map(move |&action| (action, self.get(action)))
    }
}
