//! Dismissable on-screen alerts and haptics

use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Identifies one raised alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AlertId(pub u64);

/// An urgent alert currently on screen
#[derive(Debug, Clone, PartialEq)]
pub struct UrgentAlert {
    pub id: AlertId,
    pub title: String,
    pub message: String,
    pub raised_at: Instant,
    pub expires_at: Instant,
}

/// Alerts on screen, each removed by dismissal or after a fixed duration
#[derive(Debug, Clone)]
pub struct AlertBoard {
    alerts: Vec<UrgentAlert>,
    duration: Duration,
    next_id: u64,
}

impl AlertBoard {
    pub fn new(duration: Duration) -> Self {
        Self {
            alerts: Vec::new(),
            duration,
            next_id: 0,
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Raise an alert at `now`
    pub fn show(&mut self, title: &str, message: &str, now: Instant) -> AlertId {
        self.next_id += 1;
        let id = AlertId(self.next_id);
        info!(alert = id.0, title, message, "urgent alert raised");

        self.alerts.push(UrgentAlert {
            id,
            title: title.to_string(),
            message: message.to_string(),
            raised_at: now,
            expires_at: now + self.duration,
        });
        id
    }

    /// Remove an alert. Returns false if it was already gone.
    pub fn dismiss(&mut self, id: AlertId) -> bool {
        let before = self.alerts.len();
        self.alerts.retain(|a| a.id != id);
        let removed = self.alerts.len() != before;
        if removed {
            debug!(alert = id.0, "alert dismissed");
        }
        removed
    }

    /// Remove and return every alert whose deadline has passed
    pub fn expire(&mut self, now: Instant) -> Vec<UrgentAlert> {
        let (expired, live): (Vec<_>, Vec<_>) = self
            .alerts
            .drain(..)
            .partition(|a| a.expires_at <= now);
        self.alerts = live;

        for alert in &expired {
            debug!(alert = alert.id.0, "alert expired");
        }
        expired
    }

    pub fn active(&self) -> &[UrgentAlert] {
        &self.alerts
    }

    /// Earliest pending expiry, if any alert is up
    pub fn next_deadline(&self) -> Option<Instant> {
        self.alerts.iter().map(|a| a.expires_at).min()
    }
}

/// Vibration motor or equivalent
pub trait HapticDevice: Send {
    /// Play an on/off pattern (milliseconds). Returns false if unsupported.
    fn vibrate(&mut self, pattern_ms: &[u64]) -> bool;
}
