//! Severe-weather alerting policy

use crate::alerting::{AlertBoard, AlertId, Announcer, HapticDevice, Urgency};
use crate::core::{SevereWeatherNotice, URGENT_HAPTIC_PATTERN_MS};
use std::time::{Duration, Instant};
use tracing::warn;

pub const TORNADO_ALERT_TITLE: &str = "TORNADO WARNING";

/// What a severe-weather alert actually triggered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertOutcome {
    pub alert: AlertId,
    pub spoken: bool,
    pub vibrated: bool,
}

/// Voice, visual and haptic alerting behind one switchboard
pub struct AlertingPolicy {
    announcer: Announcer,
    board: AlertBoard,
    haptics: Option<Box<dyn HapticDevice>>,
}

impl AlertingPolicy {
    pub fn new(announcer: Announcer, alert_duration: Duration) -> Self {
        Self {
            announcer,
            board: AlertBoard::new(alert_duration),
            haptics: None,
        }
    }

    pub fn with_haptics(mut self, haptics: Box<dyn HapticDevice>) -> Self {
        self.haptics = Some(haptics);
        self
    }

    pub fn voice_enabled(&self) -> bool {
        self.announcer.is_enabled()
    }

    pub fn set_voice_enabled(&mut self, enabled: bool) {
        self.announcer.set_enabled(enabled);
    }

    /// Baseline announcement for routine status changes
    pub fn announce(&mut self, text: &str) -> bool {
        self.announcer.announce(text, Urgency::Normal)
    }

    /// Speak, show and vibrate for a tornado warning.
    ///
    /// Visual and haptic alerting happen even when voice is off.
    pub fn tornado_warning(&mut self, notice: &SevereWeatherNotice, now: Instant) -> AlertOutcome {
        warn!(area = %notice.area, headline = %notice.headline, "tornado warning");

        let text = format!(
            "Tornado warning issued for {}. Take shelter immediately.",
            notice.area
        );
        let spoken = self.announcer.announce(&text, Urgency::Urgent);
        let alert = self.board.show(TORNADO_ALERT_TITLE, &notice.headline, now);
        let vibrated = self
            .haptics
            .as_mut()
            .map(|device| device.vibrate(&URGENT_HAPTIC_PATTERN_MS))
            .unwrap_or(false);

        AlertOutcome {
            alert,
            spoken,
            vibrated,
        }
    }

    pub fn dismiss(&mut self, id: AlertId) -> bool {
        self.board.dismiss(id)
    }

    /// Drop alerts past their deadline; returns how many were removed
    pub fn expire(&mut self, now: Instant) -> usize {
        self.board.expire(now).len()
    }

    pub fn board(&self) -> &AlertBoard {
        &self.board
    }
}
