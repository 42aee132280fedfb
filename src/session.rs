//! One page context under speed control.
//!
//! A session ties together everything a single page needs: a settings
//! snapshot, the compiled rule set that decided whether this page is under
//! control, the shortcut registry, the speed controller, and the page's media
//! elements. The host drives it with key events, media notifications, and a
//! periodic tick.

use crate::broker::{GlobalCommand, PageSignal, SettingsBroker};
use crate::controller::{MediaElement, SpeedController, SpeedNotice};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::TryRecvError;
use vidrate_config::{CompiledRules, Settings, SpeedAction};
use vidrate_keybindings::{KeyPress, ShortcutRegistry};

/// A live page context.
///
/// Generic over the media element type so the host supplies real DOM handles
/// and tests supply fakes.
#[derive(Debug)]
pub struct PageSession<M: MediaElement> {
    url: String,
    settings: Settings,
    rules: CompiledRules,
    registry: ShortcutRegistry,
    controller: SpeedController,
    media: Vec<M>,
    signals: broadcast::Receiver<PageSignal>,
}

impl<M: MediaElement> PageSession<M> {
    /// Open a session for the page at `url`, subscribed to the broker's
    /// reload signals.
    pub fn open(url: impl Into<String>, broker: &SettingsBroker) -> Self {
        let url = url.into();
        let settings = broker.get();
        let signals = broker.subscribe();

        let rules = CompiledRules::new(&settings);
        let registry = ShortcutRegistry::from_bindings(&settings.shortcuts);
        let active = rules.should_apply(&url);

        let mut controller = SpeedController::new();
        let mut media: Vec<M> = Vec::new();
        controller.initialize(settings.default_speed, active, &mut media);

        log::info!(
            "Page session opened for {url}: speed control {}",
            if active { "active" } else { "inactive" }
        );

        Self {
            url,
            settings,
            rules,
            registry,
            controller,
            media,
            signals,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn current_speed(&self) -> f64 {
        self.controller.current_speed()
    }

    /// Whether this page is under speed control.
    pub fn is_active(&self) -> bool {
        self.controller.is_active()
    }

    /// A media element appeared on the page (initial scan or dynamic
    /// insertion). The current speed is applied immediately; elements that
    /// are not ready yet get picked up by the next tick.
    pub fn media_added(&mut self, element: M) {
        self.media.push(element);
        self.controller.apply(&mut self.media);
    }

    /// Read access to the page's media elements.
    pub fn media(&self) -> &[M] {
        &self.media
    }

    /// Execute a speed action against this page.
    pub fn handle_action(&mut self, action: SpeedAction) {
        match action {
            SpeedAction::IncreaseSpeed => self.controller.increase(&mut self.media),
            SpeedAction::DecreaseSpeed => self.controller.decrease(&mut self.media),
            SpeedAction::PresetSpeed => self
                .controller
                .toggle_preset(self.settings.preset_speed, &mut self.media),
        }
    }

    /// Execute a global command (same dispatch as a matched shortcut).
    pub fn handle_command(&mut self, command: GlobalCommand) {
        self.handle_action(command.action());
    }

    /// Feed a key-down event from the page.
    ///
    /// Returns true when the event matched a binding and was consumed, in
    /// which case the host should suppress the page's own handling of it.
    /// Pages not under speed control never consume key events.
    pub fn handle_key(&mut self, press: &KeyPress) -> bool {
        if !self.controller.is_active() {
            return false;
        }
        let Some(action) = self.registry.lookup(press) else {
            return false;
        };
        log::debug!("Shortcut matched on {}: {action}", self.url);
        self.handle_action(action);
        true
    }

    /// Reset the page to the configured default speed.
    pub fn reset_speed(&mut self) {
        self.controller
            .reset(self.settings.default_speed, &mut self.media);
    }

    /// Periodic maintenance: absorb pending reload signals, then run the
    /// speed correction pass. The host calls this on its timer (the original
    /// cadence was one second).
    pub fn tick(&mut self, broker: &SettingsBroker) {
        if self.drain_signals() {
            self.reload_settings(broker.get());
        }
        self.controller.reconcile(&mut self.media);
    }

    /// Collapse all pending signals into a single reload decision.
    fn drain_signals(&mut self) -> bool {
        let mut reload = false;
        loop {
            match self.signals.try_recv() {
                Ok(PageSignal::ReloadSettings) => reload = true,
                // Missed signals still mean "settings changed at some point".
                Err(TryRecvError::Lagged(_)) => reload = true,
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }
        reload
    }

    /// Rebuild derived state from a fresh settings snapshot.
    ///
    /// The rule decision and the shortcut registry are recomputed; the
    /// current speed is kept so a reload never yanks playback back to the
    /// default mid-video. Becoming inactive restores normal speed.
    fn reload_settings(&mut self, settings: Settings) {
        self.settings = settings;
        self.rules = CompiledRules::new(&self.settings);
        self.registry = ShortcutRegistry::from_bindings(&self.settings.shortcuts);

        let active = self.rules.should_apply(&self.url);
        log::info!(
            "Settings reloaded for {}: speed control {}",
            self.url,
            if active { "active" } else { "inactive" }
        );
        self.controller.set_active(active, &mut self.media);
    }

    /// Drain the pending transient notifications for the host to render.
    pub fn take_notices(&mut self) -> Vec<SpeedNotice> {
        self.controller.take_notices()
    }
}
