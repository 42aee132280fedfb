//! Settings distribution to page sessions.
//!
//! The broker owns the authoritative settings snapshot, persists changes, and
//! fans out reload signals to every live page session over a broadcast
//! channel. Delivery is fire-and-forget: a session that has gone away (its
//! receiver dropped) is simply skipped and never fails a save.

use anyhow::Result;
use std::path::PathBuf;
use tokio::sync::broadcast;
use vidrate_config::watcher::SettingsWatcher;
use vidrate_config::{Settings, ShortcutBindings, SpeedAction};
use vidrate_keybindings::{find_conflict, validate_shortcut};

/// Signal fanned out to page sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSignal {
    /// Settings changed; sessions should fetch a fresh snapshot and rebuild
    /// their derived state.
    ReloadSettings,
}

/// Command addressed at the focused page session, e.g. from a global
/// hotkey surface that bypasses per-page key capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlobalCommand {
    IncreaseSpeed,
    DecreaseSpeed,
    PresetSpeed,
}

impl GlobalCommand {
    /// The speed action this command maps to.
    pub fn action(self) -> SpeedAction {
        match self {
            Self::IncreaseSpeed => SpeedAction::IncreaseSpeed,
            Self::DecreaseSpeed => SpeedAction::DecreaseSpeed,
            Self::PresetSpeed => SpeedAction::PresetSpeed,
        }
    }
}

/// Broadcast channel depth. Sessions collapse every pending signal into one
/// reload on their next tick, so lag here only costs a redundant reload.
const SIGNAL_CAPACITY: usize = 32;

/// Owns the settings snapshot and distributes changes.
pub struct SettingsBroker {
    settings: Settings,
    path: Option<PathBuf>,
    signals: broadcast::Sender<PageSignal>,
    watcher: Option<SettingsWatcher>,
}

impl std::fmt::Debug for SettingsBroker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsBroker")
            .field("path", &self.path)
            .field("receivers", &self.signals.receiver_count())
            .finish_non_exhaustive()
    }
}

impl SettingsBroker {
    /// Broker over an in-memory snapshot, with no backing file. Saves still
    /// validate and broadcast; nothing touches disk.
    pub fn in_memory(settings: Settings) -> Self {
        let (signals, _) = broadcast::channel(SIGNAL_CAPACITY);
        Self {
            settings,
            path: None,
            signals,
            watcher: None,
        }
    }

    /// Open (or create) the settings file at `path`.
    pub fn open(path: PathBuf) -> Result<Self> {
        let settings = Settings::load_from(&path)?;
        let (signals, _) = broadcast::channel(SIGNAL_CAPACITY);
        Ok(Self {
            settings,
            path: Some(path),
            signals,
            watcher: None,
        })
    }

    /// Open the settings file and watch it for external edits.
    ///
    /// External changes are picked up by [`poll_external_reload`].
    ///
    /// [`poll_external_reload`]: Self::poll_external_reload
    pub fn open_watched(path: PathBuf, debounce_ms: u64) -> Result<Self> {
        let mut broker = Self::open(path)?;
        // open() guarantees the file exists by now.
        let watch_path = broker.path.as_ref().expect("open() sets the path");
        broker.watcher = Some(SettingsWatcher::new(watch_path, debounce_ms)?);
        Ok(broker)
    }

    /// Current settings snapshot.
    ///
    /// Sessions hold their own copy; a snapshot taken before a save stays
    /// coherent until the reload signal lands.
    pub fn get(&self) -> Settings {
        self.settings.clone()
    }

    /// Subscribe to reload signals. Each page session holds one receiver.
    pub fn subscribe(&self) -> broadcast::Receiver<PageSignal> {
        self.signals.subscribe()
    }

    /// Validate, persist, and distribute a full settings record.
    ///
    /// Validation failures leave both the snapshot and the file untouched.
    pub fn save(&mut self, mut settings: Settings) -> Result<()> {
        settings.validate()?;
        Self::validate_bindings(&settings.shortcuts)?;
        settings.normalize();

        if let Some(path) = &self.path {
            settings.save_to(path)?;
        }
        self.settings = settings;
        self.broadcast_reload();
        Ok(())
    }

    /// Replace just the shortcut bindings, with the same validate/persist/
    /// distribute flow as a full save.
    pub fn update_shortcuts(&mut self, bindings: ShortcutBindings) -> Result<()> {
        let mut settings = self.settings.clone();
        settings.shortcuts = bindings;
        self.save(settings)
    }

    /// Reset everything to defaults.
    pub fn reset(&mut self) -> Result<()> {
        self.save(Settings::default())
    }

    /// Check for an external edit to the settings file and absorb it.
    ///
    /// Returns true when a reload happened. A file that became unreadable or
    /// unparsable keeps the previous snapshot and logs the failure.
    pub fn poll_external_reload(&mut self) -> bool {
        let Some(watcher) = &self.watcher else {
            return false;
        };
        let Some(event) = watcher.try_recv() else {
            return false;
        };
        // Drain any further queued events; one reload covers them all.
        while watcher.try_recv().is_some() {}

        match Settings::load_from(&event.path) {
            Ok(settings) => {
                self.settings = settings;
                self.broadcast_reload();
                true
            }
            Err(e) => {
                log::error!("Failed to reload settings from {:?}: {e:#}", event.path);
                false
            }
        }
    }

    /// Fan out a reload signal to all live sessions.
    ///
    /// Fire-and-forget: a send error only means no receiver is alive, which
    /// is fine (e.g. settings edited before any page opened).
    fn broadcast_reload(&self) {
        match self.signals.send(PageSignal::ReloadSettings) {
            Ok(n) => log::debug!("Settings reload signalled to {n} session(s)"),
            Err(_) => log::trace!("Settings reload signalled with no live sessions"),
        }
    }

    /// Reject binding sets with invalid or duplicated shortcut strings.
    fn validate_bindings(bindings: &ShortcutBindings) -> Result<()> {
        for (action, shortcut) in bindings.iter() {
            validate_shortcut(shortcut)
                .map_err(|e| anyhow::anyhow!("shortcut for '{action}': {e}"))?;
            if let Some(holder) = find_conflict(bindings, shortcut, action) {
                anyhow::bail!(
                    "shortcut '{shortcut}' is bound to both '{action}' and '{holder}'"
                );
            }
        }
        Ok(())
    }
}
