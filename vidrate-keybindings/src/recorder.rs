//! Configuration-time shortcut recording.
//!
//! Drives the "press the combination you want" flow on the shortcuts page.
//! The recorder is a small state machine: while recording, each key event is
//! canonicalized and checked for validity and conflicts; a bare modifier
//! press keeps the recorder waiting for the real key. Cancellation is
//! synchronous so the caller can tear down its key-capture listeners without
//! leaving a dangling capture behind.

use crate::parser::{KeyPress, canonicalize, validate_shortcut};
use crate::find_conflict;
use vidrate_config::{ShortcutBindings, SpeedAction};

/// Result of feeding one key event to the recorder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    /// A bare modifier was pressed; still waiting for the main key.
    Pending,
    /// The combination was rejected; recording stays active. The string
    /// gives the specific reason (missing modifier, or the conflicting
    /// action's binding).
    Rejected(String),
    /// A valid combination was captured; recording has stopped.
    Captured(String),
}

/// Records a new shortcut for one action at a time.
#[derive(Debug, Default)]
pub struct ShortcutRecorder {
    target: Option<SpeedAction>,
}

impl ShortcutRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin recording for `action`.
    ///
    /// Starting a new recording cancels any recording already in progress.
    pub fn start(&mut self, action: SpeedAction) {
        if let Some(previous) = self.target.replace(action) {
            if previous != action {
                log::debug!("Recording for '{previous}' cancelled by new recording");
            }
        }
    }

    /// The action currently being recorded, if any.
    pub fn target(&self) -> Option<SpeedAction> {
        self.target
    }

    pub fn is_recording(&self) -> bool {
        self.target.is_some()
    }

    /// Cancel the recording in progress, if any.
    ///
    /// Also the entry point for "page lost focus" teardown.
    pub fn cancel(&mut self) {
        if let Some(action) = self.target.take() {
            log::debug!("Recording for '{action}' cancelled");
        }
    }

    /// Feed a key-down event to the recorder.
    ///
    /// Returns `None` when no recording is in progress. On `Captured` the
    /// recorder stops and the caller is expected to store the returned
    /// string via its settings flow; the recorder itself never mutates
    /// bindings.
    pub fn key_down(
        &mut self,
        press: &KeyPress,
        bindings: &ShortcutBindings,
    ) -> Option<RecordOutcome> {
        let target = self.target?;

        let Some(candidate) = canonicalize(press) else {
            return Some(RecordOutcome::Pending);
        };

        if let Err(e) = validate_shortcut(&candidate) {
            return Some(RecordOutcome::Rejected(e.to_string()));
        }

        if let Some(holder) = find_conflict(bindings, &candidate, target) {
            return Some(RecordOutcome::Rejected(format!(
                "shortcut '{candidate}' is already used by '{}'",
                holder.description()
            )));
        }

        self.target = None;
        Some(RecordOutcome::Captured(candidate))
    }
}
