//! Settings file watcher for automatic reload.
//!
//! Watches settings.yaml for external edits and emits reload events. Uses
//! debouncing to avoid multiple reloads during rapid saves from editors, and
//! because the store's own atomic save (temp file + rename) shows up as a
//! create event.

use anyhow::{Context, Result};
use notify::{Config as NotifyConfig, Event, PollWatcher, RecursiveMode, Watcher};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender, channel};
use std::time::{Duration, Instant};

/// Event indicating the settings file changed on disk and needs reloading.
#[derive(Debug, Clone)]
pub struct SettingsReloadEvent {
    /// Path to the settings file that changed.
    pub path: PathBuf,
}

/// Rate limiter shared by the watcher backends.
#[derive(Debug, Default)]
struct Debounce {
    last_event: Mutex<Option<Instant>>,
}

impl Debounce {
    /// Returns true if enough time has passed since the last allowed event.
    fn allow(&self, delay: Duration) -> bool {
        let now = Instant::now();
        let mut last = self.last_event.lock();
        match *last {
            Some(prev) if now.duration_since(prev) < delay => false,
            _ => {
                *last = Some(now);
                true
            }
        }
    }
}

/// Watches the settings file for changes and sends reload events.
pub struct SettingsWatcher {
    /// The file system watcher (kept alive to maintain watching).
    _watcher: Box<dyn Watcher + Send>,
    /// Receiver for settings change events.
    event_receiver: Receiver<SettingsReloadEvent>,
}

impl std::fmt::Debug for SettingsWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsWatcher").finish_non_exhaustive()
    }
}

/// Build the event-handler closure used by both watcher backends.
///
/// Filters events to the watched filename, applies debouncing, and sends
/// `SettingsReloadEvent` values on `tx`.
fn make_event_handler(
    filename: std::ffi::OsString,
    canonical_path: PathBuf,
    debounce_delay: Duration,
    tx: Sender<SettingsReloadEvent>,
    debounce: Arc<Debounce>,
) -> impl Fn(std::result::Result<Event, notify::Error>) + Send + 'static {
    move |result| {
        let Ok(event) = result else { return };

        // Modify covers in-place writes; Create covers the atomic
        // temp-file-then-rename save path.
        if !matches!(
            event.kind,
            notify::EventKind::Modify(_) | notify::EventKind::Create(_)
        ) {
            return;
        }

        let matches_settings = event
            .paths
            .iter()
            .any(|p| p.file_name().map(|f| f == filename).unwrap_or(false));
        if !matches_settings {
            return;
        }

        if !debounce.allow(debounce_delay) {
            log::trace!("Debouncing settings reload event");
            return;
        }

        let reload_event = SettingsReloadEvent {
            path: canonical_path.clone(),
        };
        log::info!("Settings file changed: {}", reload_event.path.display());
        if let Err(e) = tx.send(reload_event) {
            log::error!("Failed to send settings reload event: {}", e);
        }
    }
}

impl SettingsWatcher {
    /// Create a new settings watcher.
    ///
    /// Attempts the platform's native watcher (inotify on Linux, kqueue on
    /// macOS, ReadDirectoryChanges on Windows) for event-driven
    /// notifications. If the native backend fails to initialise (e.g. inside
    /// a container or on a network filesystem), falls back to a `PollWatcher`
    /// that checks for changes every 500 ms.
    ///
    /// # Errors
    /// Returns an error if the settings file doesn't exist or watching fails
    /// on both backends.
    pub fn new(settings_path: &Path, debounce_delay_ms: u64) -> Result<Self> {
        if !settings_path.exists() {
            anyhow::bail!("Settings file not found: {}", settings_path.display());
        }

        let canonical: PathBuf = settings_path
            .canonicalize()
            .unwrap_or_else(|_| settings_path.to_path_buf());

        let filename = canonical
            .file_name()
            .context("settings path has no filename")?
            .to_os_string();

        let parent_dir = canonical
            .parent()
            .context("settings path has no parent directory")?
            .to_path_buf();

        let (tx, rx) = channel::<SettingsReloadEvent>();
        let debounce_delay = Duration::from_millis(debounce_delay_ms);

        let mut watcher =
            Self::create_watcher(filename, canonical.clone(), debounce_delay, tx)?;

        watcher
            .watch(&parent_dir, RecursiveMode::NonRecursive)
            .with_context(|| {
                format!(
                    "Failed to watch settings directory: {}",
                    parent_dir.display()
                )
            })?;

        log::info!("Settings hot reload: watching {}", canonical.display());

        Ok(Self {
            _watcher: watcher,
            event_receiver: rx,
        })
    }

    /// Try the native watcher backend first, fall back to polling.
    fn create_watcher(
        filename: std::ffi::OsString,
        canonical_path: PathBuf,
        debounce_delay: Duration,
        tx: Sender<SettingsReloadEvent>,
    ) -> Result<Box<dyn Watcher + Send>> {
        let debounce = Arc::new(Debounce::default());

        let handler = make_event_handler(
            filename.clone(),
            canonical_path.clone(),
            debounce_delay,
            tx.clone(),
            Arc::clone(&debounce),
        );

        match notify::recommended_watcher(handler) {
            Ok(w) => {
                log::debug!("Settings watcher: using native backend");
                Ok(Box::new(w))
            }
            Err(e) => {
                log::warn!(
                    "Settings watcher: native backend unavailable ({}); falling back to PollWatcher",
                    e
                );
                let fallback_handler =
                    make_event_handler(filename, canonical_path, debounce_delay, tx, debounce);
                let poll_watcher = PollWatcher::new(
                    fallback_handler,
                    NotifyConfig::default().with_poll_interval(Duration::from_millis(500)),
                )
                .context("Failed to create fallback PollWatcher")?;
                Ok(Box::new(poll_watcher))
            }
        }
    }

    /// Check for pending reload events (non-blocking).
    pub fn try_recv(&self) -> Option<SettingsReloadEvent> {
        self.event_receiver.try_recv().ok()
    }
}
