//! Settings system for the vidrate playback-speed engine.
//!
//! This crate provides settings loading, saving, and default values
//! for the speed controller. It includes:
//!
//! - The canonical settings record and its persistence
//! - URL include/exclude rule evaluation
//! - Shortcut binding storage types
//! - Settings file watching

pub mod defaults;
pub mod error;
pub mod rules;
pub mod settings;
mod types;
#[cfg(feature = "watcher")]
pub mod watcher;

// Re-export main types for convenience
pub use error::SettingsError;
pub use rules::{CompiledRules, should_apply};
pub use settings::Settings;
pub use types::{ShortcutBindings, SpeedAction};

/// Lowest playback multiplier the controller will ever set.
pub const MIN_SPEED: f64 = 0.25;

/// Highest playback multiplier the controller will ever set.
pub const MAX_SPEED: f64 = 16.0;

/// Increment applied by the increase/decrease operations.
pub const SPEED_STEP: f64 = 0.25;

/// Tolerance used when comparing playback multipliers for equality.
pub const SPEED_EPSILON: f64 = 0.01;
