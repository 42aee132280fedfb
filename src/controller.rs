//! Per-page playback speed state machine.
//!
//! The controller owns the current multiplier for one page context and
//! applies it to that page's media elements. It never talks to a DOM
//! directly; media elements come in behind the [`MediaElement`] trait so the
//! host environment (content script, test harness) supplies the real thing.
//!
//! Applying speed is idempotent: both the media-added notification and the
//! periodic reconciliation tick funnel into the same apply operation, so
//! overlapping triggers are safe.

use vidrate_config::{MAX_SPEED, MIN_SPEED, SPEED_EPSILON, SPEED_STEP};

/// A controllable media element on the page.
pub trait MediaElement {
    /// Whether the element has loaded enough data for its playback rate to
    /// stick. Elements that are not ready are skipped and corrected by a
    /// later reconciliation pass.
    fn is_ready(&self) -> bool;

    /// Current playback rate of the element.
    fn playback_rate(&self) -> f64;

    /// Set the playback rate of the element.
    fn set_playback_rate(&mut self, rate: f64);
}

/// Transient visual notification emitted by mutating operations.
///
/// Carries the resulting speed plus an optional custom message; the host
/// renders it however it likes (the original UI showed a fading overlay).
#[derive(Debug, Clone, PartialEq)]
pub struct SpeedNotice {
    pub speed: f64,
    pub message: Option<String>,
}

impl SpeedNotice {
    fn speed(speed: f64) -> Self {
        Self {
            speed,
            message: None,
        }
    }

    fn message(speed: f64, message: impl Into<String>) -> Self {
        Self {
            speed,
            message: Some(message.into()),
        }
    }
}

/// Speed state machine for one page context.
#[derive(Debug)]
pub struct SpeedController {
    current_speed: f64,
    active: bool,
    notices: Vec<SpeedNotice>,
}

impl Default for SpeedController {
    fn default() -> Self {
        Self {
            current_speed: 1.0,
            active: false,
            notices: Vec::new(),
        }
    }
}

impl SpeedController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current playback multiplier, always within [0.25, 16.0].
    pub fn current_speed(&self) -> f64 {
        self.current_speed
    }

    /// Whether the rule evaluation allowed speed control on this page.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Start (or restart) the controller for this page.
    ///
    /// Sets the speed to the configured default. When active, the current
    /// speed is applied to all ready media; when inactive, any previously
    /// altered media is restored to normal speed.
    pub fn initialize<M: MediaElement>(
        &mut self,
        default_speed: f64,
        active: bool,
        media: &mut [M],
    ) {
        self.current_speed = default_speed.clamp(MIN_SPEED, MAX_SPEED);
        self.active = active;
        log::debug!(
            "Speed controller initialized: speed={} active={}",
            self.current_speed,
            self.active
        );
        self.apply(media);
    }

    /// Update the active flag after a settings reload, keeping the current
    /// speed. Deactivation restores media to normal speed.
    pub fn set_active<M: MediaElement>(&mut self, active: bool, media: &mut [M]) {
        self.active = active;
        self.apply(media);
    }

    /// Raise the multiplier by one step, capped at 16.0. No-op when the
    /// page is not under speed control.
    pub fn increase<M: MediaElement>(&mut self, media: &mut [M]) {
        if !self.active {
            return;
        }
        self.current_speed = (self.current_speed + SPEED_STEP).min(MAX_SPEED);
        self.apply(media);
        self.notices.push(SpeedNotice::speed(self.current_speed));
    }

    /// Lower the multiplier by one step, floored at 0.25. Same guard.
    pub fn decrease<M: MediaElement>(&mut self, media: &mut [M]) {
        if !self.active {
            return;
        }
        self.current_speed = (self.current_speed - SPEED_STEP).max(MIN_SPEED);
        self.apply(media);
        self.notices.push(SpeedNotice::speed(self.current_speed));
    }

    /// Toggle between the preset multiplier and normal speed.
    ///
    /// When the current speed already sits at the preset (within tolerance),
    /// this switches back to 1.0x; otherwise it jumps to the preset.
    pub fn toggle_preset<M: MediaElement>(&mut self, preset_speed: f64, media: &mut [M]) {
        if !self.active {
            return;
        }
        let preset = preset_speed.clamp(MIN_SPEED, MAX_SPEED);
        if (self.current_speed - preset).abs() < SPEED_EPSILON {
            self.current_speed = 1.0;
            self.notices
                .push(SpeedNotice::message(1.0, "back to normal speed"));
        } else {
            self.current_speed = preset;
            self.notices
                .push(SpeedNotice::message(preset, format!("preset {preset}x")));
        }
        self.apply(media);
    }

    /// Unconditionally reset to the configured default speed and reapply.
    pub fn reset<M: MediaElement>(&mut self, default_speed: f64, media: &mut [M]) {
        self.current_speed = default_speed.clamp(MIN_SPEED, MAX_SPEED);
        self.apply(media);
        self.notices.push(SpeedNotice::message(
            self.current_speed,
            "speed reset",
        ));
    }

    /// Apply the current speed to every ready media element, or restore
    /// normal speed everywhere when inactive.
    ///
    /// Only writes rates that actually differ, so the observer callback and
    /// the periodic tick can both call this without fighting each other.
    pub fn apply<M: MediaElement>(&mut self, media: &mut [M]) {
        if !self.active {
            for element in media.iter_mut() {
                if (element.playback_rate() - 1.0).abs() > SPEED_EPSILON {
                    element.set_playback_rate(1.0);
                }
            }
            return;
        }
        for element in media.iter_mut() {
            if !element.is_ready() {
                continue;
            }
            if (element.playback_rate() - self.current_speed).abs() > SPEED_EPSILON {
                element.set_playback_rate(self.current_speed);
            }
        }
    }

    /// Periodic correction pass.
    ///
    /// Counters pages that reset playback rate programmatically (e.g. on a
    /// media-source change) and picks up elements that were not ready when
    /// the speed was last applied. Does nothing on inactive pages.
    pub fn reconcile<M: MediaElement>(&mut self, media: &mut [M]) {
        if !self.active {
            return;
        }
        self.apply(media);
    }

    /// Drain the pending transient notifications.
    pub fn take_notices(&mut self) -> Vec<SpeedNotice> {
        std::mem::take(&mut self.notices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// In-memory media element standing in for a page's <video>.
    #[derive(Debug)]
    struct FakeMedia {
        ready: bool,
        rate: f64,
    }

    impl FakeMedia {
        fn ready() -> Self {
            Self {
                ready: true,
                rate: 1.0,
            }
        }

        fn not_ready() -> Self {
            Self {
                ready: false,
                rate: 1.0,
            }
        }
    }

    impl MediaElement for FakeMedia {
        fn is_ready(&self) -> bool {
            self.ready
        }
        fn playback_rate(&self) -> f64 {
            self.rate
        }
        fn set_playback_rate(&mut self, rate: f64) {
            self.rate = rate;
        }
    }

    fn active_controller(media: &mut [FakeMedia]) -> SpeedController {
        let mut controller = SpeedController::new();
        controller.initialize(1.0, true, media);
        controller
    }

    #[test]
    fn test_increase_steps_and_applies() {
        let mut media = vec![FakeMedia::ready()];
        let mut controller = active_controller(&mut media);
        controller.increase(&mut media);
        assert_eq!(controller.current_speed(), 1.25);
        assert_eq!(media[0].rate, 1.25);
    }

    #[test]
    fn test_increase_clamps_at_max() {
        let mut media = vec![FakeMedia::ready()];
        let mut controller = active_controller(&mut media);
        for _ in 0..100 {
            controller.increase(&mut media);
        }
        assert_eq!(controller.current_speed(), MAX_SPEED);
        assert_eq!(media[0].rate, MAX_SPEED);
    }

    #[test]
    fn test_decrease_clamps_at_min() {
        let mut media = vec![FakeMedia::ready()];
        let mut controller = active_controller(&mut media);
        for _ in 0..100 {
            controller.decrease(&mut media);
        }
        assert_eq!(controller.current_speed(), MIN_SPEED);
        assert_eq!(media[0].rate, MIN_SPEED);
    }

    #[test]
    fn test_inactive_operations_are_silent_no_ops() {
        let mut media = vec![FakeMedia::ready()];
        let mut controller = SpeedController::new();
        controller.initialize(1.5, false, &mut media);

        controller.increase(&mut media);
        controller.decrease(&mut media);
        controller.toggle_preset(2.0, &mut media);

        assert_eq!(controller.current_speed(), 1.5);
        assert_eq!(media[0].rate, 1.0);
        assert!(controller.take_notices().is_empty());
    }

    #[test]
    fn test_preset_toggle_alternates() {
        let mut media = vec![FakeMedia::ready()];
        let mut controller = active_controller(&mut media);

        controller.toggle_preset(2.0, &mut media);
        assert_eq!(controller.current_speed(), 2.0);

        controller.toggle_preset(2.0, &mut media);
        assert_eq!(controller.current_speed(), 1.0);

        controller.toggle_preset(2.0, &mut media);
        assert_eq!(controller.current_speed(), 2.0);
    }

    #[test]
    fn test_reset_is_unconditional() {
        let mut media = vec![FakeMedia::ready()];
        let mut controller = active_controller(&mut media);
        controller.increase(&mut media);
        controller.reset(1.0, &mut media);
        assert_eq!(controller.current_speed(), 1.0);
    }

    #[test]
    fn test_not_ready_media_skipped_then_corrected() {
        let mut media = vec![FakeMedia::not_ready()];
        let mut controller = active_controller(&mut media);
        controller.increase(&mut media);
        assert_eq!(media[0].rate, 1.0, "not-ready element must be skipped");

        // The element becomes ready; the periodic pass corrects it.
        media[0].ready = true;
        controller.reconcile(&mut media);
        assert_eq!(media[0].rate, 1.25);
    }

    #[test]
    fn test_reconcile_counters_external_rate_reset() {
        let mut media = vec![FakeMedia::ready()];
        let mut controller = active_controller(&mut media);
        controller.toggle_preset(2.0, &mut media);
        assert_eq!(media[0].rate, 2.0);

        // Page resets the rate behind our back.
        media[0].rate = 1.0;
        controller.reconcile(&mut media);
        assert_eq!(media[0].rate, 2.0);
    }

    #[test]
    fn test_deactivation_restores_normal_speed() {
        let mut media = vec![FakeMedia::ready()];
        let mut controller = active_controller(&mut media);
        controller.toggle_preset(2.0, &mut media);
        assert_eq!(media[0].rate, 2.0);

        controller.set_active(false, &mut media);
        assert_eq!(media[0].rate, 1.0);
    }

    #[test]
    fn test_notices_carry_speed_or_message() {
        let mut media = vec![FakeMedia::ready()];
        let mut controller = active_controller(&mut media);
        controller.increase(&mut media);
        controller.toggle_preset(2.0, &mut media);

        let notices = controller.take_notices();
        assert_eq!(notices.len(), 2);
        assert_eq!(notices[0], SpeedNotice::speed(1.25));
        assert_eq!(notices[1].speed, 2.0);
        assert!(notices[1].message.as_deref().unwrap_or("").contains("preset"));
        assert!(controller.take_notices().is_empty());
    }
}
