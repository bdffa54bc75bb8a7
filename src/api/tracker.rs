//! Chase tracker context
//!
//! [`ChaseTracker`] owns every piece of mutable tracking state: the breadcrumb
//! filter, the persisted toggles, the alerting policy and the registered sinks.
//! Callers drive it one operation at a time; see [`crate::api::runtime`] for
//! the event loop that does this.

use crate::alerting::{AlertId, AlertOutcome, AlertingPolicy};
use crate::api::events::{SinkHandle, TrackerEvent, TrackerSink};
use crate::core::{Breadcrumb, Fix, SevereWeatherNotice};
use crate::processing::{BreadcrumbFilter, FilterState, TrackingSession};
use crate::source::PositionError;
use crate::utils::{PersistedToggles, ToggleStore, TrackerConfig};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Tracking session, toggles, alerting and event fan-out
pub struct ChaseTracker {
    filter: BreadcrumbFilter,
    alerting: AlertingPolicy,
    store: Box<dyn ToggleStore>,
    toggles: PersistedToggles,
    sinks: Vec<(SinkHandle, Box<dyn TrackerSink>)>,
    sink_counter: u32,
    /// Most recent raw position, tracked or one-shot
    last_position: Option<Fix>,
}

impl ChaseTracker {
    /// Build a tracker, reading persisted toggles from `store`.
    ///
    /// An unreadable store falls back to defaults so a bad state file never
    /// blocks startup. Tracking is not resumed here; call [`Self::restore`].
    pub fn new(config: &TrackerConfig, store: Box<dyn ToggleStore>, mut alerting: AlertingPolicy) -> Self {
        let toggles = store.load().unwrap_or_else(|e| {
            warn!(error = %e, "failed to load persisted toggles, using defaults");
            PersistedToggles::default()
        });
        alerting.set_voice_enabled(toggles.voice_alerts_enabled);

        Self {
            filter: BreadcrumbFilter::new(config.min_distance_m),
            alerting,
            store,
            toggles,
            sinks: Vec::new(),
            sink_counter: 0,
            last_position: None,
        }
    }

    /// Register a sink for all future events
    pub fn register_sink(&mut self, sink: Box<dyn TrackerSink>) -> SinkHandle {
        self.sink_counter += 1;
        let handle = SinkHandle::new(self.sink_counter);
        self.sinks.push((handle, sink));
        handle
    }

    /// Remove a sink. Returns false for unknown handles.
    pub fn unregister_sink(&mut self, handle: SinkHandle) -> bool {
        let before = self.sinks.len();
        self.sinks.retain(|(h, _)| *h != handle);
        self.sinks.len() != before
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    /// Resume tracking if it was active when the process last ran.
    /// Returns whether tracking started.
    pub fn restore(&mut self, now_ms: u64) -> bool {
        if !self.toggles.tracking_active {
            return false;
        }
        info!(started_at = ?self.toggles.started_at, "restoring tracking session");
        let started_at = self.toggles.started_at.unwrap_or(now_ms);
        self.begin(started_at, now_ms)
    }

    /// Idle -> Tracking. A no-op returning false when already tracking.
    pub fn start(&mut self, now_ms: u64) -> bool {
        self.begin(now_ms, now_ms)
    }

    fn begin(&mut self, started_at: u64, now_ms: u64) -> bool {
        if !self.filter.start(started_at) {
            return false;
        }
        info!(started_at, "GPS tracking started");

        self.toggles.tracking_active = true;
        self.toggles.started_at = Some(started_at);
        self.persist();

        self.alerting.announce("GPS tracking started");
        self.emit(TrackerEvent::TrackingStarted { timestamp: now_ms });
        true
    }

    /// Tracking -> Idle. A no-op returning false when idle.
    pub fn stop(&mut self, now_ms: u64) -> bool {
        if !self.filter.stop() {
            return false;
        }
        info!("GPS tracking stopped");

        self.toggles.tracking_active = false;
        self.toggles.started_at = None;
        self.persist();

        self.alerting.announce("GPS tracking stopped");
        self.emit(TrackerEvent::TrackingStopped { timestamp: now_ms });
        true
    }

    /// Flip tracking; returns the new tracking state
    pub fn toggle(&mut self, now_ms: u64) -> bool {
        if self.filter.is_tracking() {
            self.stop(now_ms);
        } else {
            self.start(now_ms);
        }
        self.filter.is_tracking()
    }

    /// Feed a fix from the tracking watch.
    ///
    /// Fixes that arrive while idle were in flight when tracking stopped and
    /// are dropped.
    pub fn handle_fix(&mut self, fix: Fix) -> Option<Breadcrumb> {
        if !self.filter.is_tracking() {
            debug!(timestamp = fix.timestamp, "dropping fix while idle");
            return None;
        }
        if !fix.is_finite() {
            warn!(timestamp = fix.timestamp, "dropping fix with invalid coordinates");
            return None;
        }
        debug!(
            lat = fix.latitude,
            lon = fix.longitude,
            accuracy = fix.accuracy,
            "GPS position"
        );
        self.last_position = Some(fix);

        let crumb = self.filter.handle_fix(fix)?;
        info!(
            lat = crumb.latitude,
            lon = crumb.longitude,
            distance_m = crumb.distance_from_previous,
            "adding breadcrumb"
        );
        self.emit(TrackerEvent::AddBreadcrumb(crumb));
        Some(crumb)
    }

    /// Record a one-shot position without touching the session
    pub fn observe_position(&mut self, fix: Fix) {
        if !fix.is_finite() {
            warn!(timestamp = fix.timestamp, "ignoring position with invalid coordinates");
            return;
        }
        debug!(lat = fix.latitude, lon = fix.longitude, "current position");
        self.last_position = Some(fix);
    }

    /// Report a position source error. Tracking stays active.
    pub fn handle_error(&mut self, error: PositionError) {
        let message = error.user_message();
        warn!(?error, %message, "position source error");

        self.alerting.announce("GPS error occurred");
        self.emit(TrackerEvent::GpsError { message });
    }

    /// Drop a manual breadcrumb at the last known position, stamped `now_ms`.
    ///
    /// Returns `None` when no position is known yet; the caller should
    /// request one.
    pub fn mark_current_position(&mut self, now_ms: u64) -> Option<Breadcrumb> {
        let position = self.last_position?;
        let fix = Fix {
            timestamp: now_ms,
            ..position
        };

        let crumb = self.filter.force(fix);
        info!(lat = crumb.latitude, lon = crumb.longitude, "manual breadcrumb");
        self.emit(TrackerEvent::AddBreadcrumb(crumb));
        Some(crumb)
    }

    /// Flip voice alerts and persist the choice; returns the new setting.
    ///
    /// The flag changes before the confirmation is spoken, so only
    /// "enabled" is ever heard.
    pub fn toggle_voice(&mut self) -> bool {
        let enabled = !self.toggles.voice_alerts_enabled;
        self.toggles.voice_alerts_enabled = enabled;
        self.alerting.set_voice_enabled(enabled);
        self.persist();

        self.alerting.announce(if enabled {
            "Voice alerts enabled"
        } else {
            "Voice alerts disabled"
        });
        enabled
    }

    /// Raise every alert channel for a tornado warning
    pub fn severe_weather(&mut self, notice: &SevereWeatherNotice, now: Instant) -> AlertOutcome {
        self.alerting.tornado_warning(notice, now)
    }

    pub fn dismiss_alert(&mut self, id: AlertId) -> bool {
        self.alerting.dismiss(id)
    }

    pub fn expire_alerts(&mut self, now: Instant) -> usize {
        self.alerting.expire(now)
    }

    pub fn is_tracking(&self) -> bool {
        self.filter.is_tracking()
    }

    pub fn state(&self) -> FilterState {
        self.filter.state()
    }

    pub fn session(&self) -> &TrackingSession {
        self.filter.session()
    }

    pub fn last_position(&self) -> Option<Fix> {
        self.last_position
    }

    /// Whether announcements are actually spoken. Always false without a
    /// synthesizer, whatever the persisted toggle says.
    pub fn voice_enabled(&self) -> bool {
        self.alerting.voice_enabled()
    }

    pub fn toggles(&self) -> PersistedToggles {
        self.toggles
    }

    pub fn alerting(&self) -> &AlertingPolicy {
        &self.alerting
    }

    fn emit(&mut self, event: TrackerEvent) {
        for (_, sink) in self.sinks.iter_mut() {
            sink.emit(&event);
        }
    }

    fn persist(&mut self) {
        if let Err(e) = self.store.save(&self.toggles) {
            warn!(error = %e, "failed to persist toggles");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerting::{Announcer, RecordingHaptics, RecordingSynthesizer, SpeechCall};
    use crate::api::events::{BreadcrumbTrail, EventLog};
    use crate::utils::{MemoryStore, StoreError, StoreResult};
    use std::time::Duration;

    struct Harness {
        tracker: ChaseTracker,
        events: EventLog,
        speech: crate::alerting::CallLog<SpeechCall>,
    }

    fn harness_with(toggles: PersistedToggles) -> Harness {
        let (synth, speech) = RecordingSynthesizer::new();
        let alerting = AlertingPolicy::new(Announcer::new(Some(Box::new(synth))), Duration::from_secs(30));
        let mut tracker = ChaseTracker::new(
            &TrackerConfig::default(),
            Box::new(MemoryStore::new(toggles)),
            alerting,
        );
        let events = EventLog::new();
        tracker.register_sink(Box::new(events.clone()));
        Harness {
            tracker,
            events,
            speech,
        }
    }

    fn harness() -> Harness {
        harness_with(PersistedToggles::default())
    }

    #[test]
    fn test_reference_drive() {
        let mut h = harness();
        assert!(h.tracker.start(1_000));

        assert!(h.tracker.handle_fix(Fix::new(0.0, 0.0, 1)).is_none());
        assert!(h.tracker.handle_fix(Fix::new(0.0, 0.0005, 2)).is_some());
        assert!(h.tracker.handle_fix(Fix::new(0.0, 0.00051, 3)).is_none());

        assert_eq!(h.events.actions(), vec!["tracking_started", "add_breadcrumb"]);
        let crumbs = h.events.breadcrumbs();
        assert_eq!(crumbs.len(), 1);
        assert_eq!(crumbs[0].timestamp, 2);
        assert_eq!(h.tracker.last_position().map(|f| f.timestamp), Some(3));
    }

    #[test]
    fn test_transitions_are_idempotent() {
        let mut h = harness();
        assert!(!h.tracker.stop(0));
        assert!(h.tracker.start(0));
        h.tracker.handle_fix(Fix::new(0.0, 0.0, 1));

        assert!(!h.tracker.start(5));
        assert_eq!(
            h.tracker.session().last_fix.map(|f| f.timestamp),
            Some(1)
        );

        assert!(h.tracker.stop(10));
        assert!(!h.tracker.stop(11));
        assert_eq!(h.events.actions(), vec!["tracking_started", "tracking_stopped"]);
        assert_eq!(
            h.speech.spoken(),
            vec!["GPS tracking started", "GPS tracking stopped"]
        );
    }

    #[test]
    fn test_fix_after_stop_is_dropped() {
        let mut h = harness();
        h.tracker.start(0);
        h.tracker.handle_fix(Fix::new(0.0, 0.0, 1));
        h.tracker.stop(2);

        assert!(h.tracker.handle_fix(Fix::new(0.0, 0.01, 3)).is_none());
        assert_eq!(h.tracker.state(), FilterState::Idle);
        assert!(h.events.breadcrumbs().is_empty());
    }

    #[test]
    fn test_invalid_fix_is_ignored() {
        let mut h = harness();
        h.tracker.start(0);
        h.tracker.handle_fix(Fix::new(0.0, 0.0, 1));

        assert!(h.tracker.handle_fix(Fix::new(f64::NAN, 0.0, 2)).is_none());
        h.tracker.observe_position(Fix::new(0.0, f64::NAN, 3));
        assert_eq!(h.tracker.last_position().map(|f| f.timestamp), Some(1));

        assert!(h.tracker.handle_fix(Fix::new(0.0, 0.00001, 4)).is_none());
        assert!(h.events.breadcrumbs().is_empty());
    }

    #[test]
    fn test_toggle() {
        let mut h = harness();
        assert!(h.tracker.toggle(0));
        assert!(h.tracker.toggles().tracking_active);
        assert_eq!(h.tracker.toggles().started_at, Some(0));

        assert!(!h.tracker.toggle(1));
        assert!(!h.tracker.toggles().tracking_active);
        assert_eq!(h.tracker.toggles().started_at, None);
    }

    #[test]
    fn test_errors_keep_tracking() {
        let mut h = harness();
        h.tracker.start(0);
        h.tracker.handle_fix(Fix::new(0.0, 0.0, 1));
        h.tracker.handle_error(PositionError::Timeout);

        assert!(h.tracker.is_tracking());
        assert_eq!(
            h.events.events().last(),
            Some(&TrackerEvent::GpsError {
                message: "GPS error: Location request timed out.".to_string()
            })
        );
        assert_eq!(h.speech.spoken().last().map(String::as_str), Some("GPS error occurred"));

        // The anchor survived the error
        assert!(h.tracker.handle_fix(Fix::new(0.0, 0.0005, 2)).is_some());
    }

    #[test]
    fn test_restore_resumes_tracking() {
        let mut h = harness_with(PersistedToggles {
            tracking_active: true,
            started_at: Some(500),
            voice_alerts_enabled: true,
        });
        assert!(!h.tracker.is_tracking());

        assert!(h.tracker.restore(1_000));
        assert!(h.tracker.is_tracking());
        assert_eq!(h.tracker.session().started_at, Some(500));
        assert_eq!(
            h.events.events(),
            vec![TrackerEvent::TrackingStarted { timestamp: 1_000 }]
        );
    }

    #[test]
    fn test_restore_without_persisted_session() {
        let mut h = harness();
        assert!(!h.tracker.restore(0));
        assert!(h.events.events().is_empty());
    }

    #[test]
    fn test_voice_toggle_persists_and_silences() {
        let mut h = harness();
        assert!(h.tracker.voice_enabled());

        assert!(!h.tracker.toggle_voice());
        assert!(!h.tracker.toggles().voice_alerts_enabled);
        h.tracker.start(0);
        assert!(h.speech.spoken().is_empty());

        assert!(h.tracker.toggle_voice());
        assert_eq!(h.speech.spoken(), vec!["Voice alerts enabled"]);
    }

    #[test]
    fn test_persisted_voice_off_applies_on_load() {
        let mut h = harness_with(PersistedToggles {
            voice_alerts_enabled: false,
            ..PersistedToggles::default()
        });
        assert!(!h.tracker.alerting().voice_enabled());
        h.tracker.start(0);
        assert!(h.speech.is_empty());
    }

    #[test]
    fn test_voice_reported_off_without_synthesizer() {
        let alerting = AlertingPolicy::new(Announcer::silent(), Duration::from_secs(30));
        let mut tracker = ChaseTracker::new(
            &TrackerConfig::default(),
            Box::new(MemoryStore::default()),
            alerting,
        );

        assert!(tracker.toggles().voice_alerts_enabled);
        assert!(!tracker.voice_enabled());

        // The preference still flips and persists for when a voice appears
        assert!(!tracker.toggle_voice());
        assert!(tracker.toggle_voice());
        assert!(tracker.toggles().voice_alerts_enabled);
        assert!(!tracker.voice_enabled());
    }

    #[test]
    fn test_tornado_warning_with_voice_off() {
        let (synth, speech) = RecordingSynthesizer::new();
        let (haptics, vibrations) = RecordingHaptics::new();
        let alerting = AlertingPolicy::new(Announcer::new(Some(Box::new(synth))), Duration::from_secs(30))
            .with_haptics(Box::new(haptics));
        let mut tracker = ChaseTracker::new(
            &TrackerConfig::default(),
            Box::new(MemoryStore::default()),
            alerting,
        );
        tracker.toggle_voice();

        let notice = SevereWeatherNotice::new("Test County", "Test headline");
        let now = Instant::now();
        let outcome = tracker.severe_weather(&notice, now);

        assert!(!outcome.spoken);
        assert!(outcome.vibrated);
        assert!(speech.spoken().is_empty());
        assert_eq!(vibrations.len(), 1);
        assert_eq!(tracker.alerting().board().active()[0].message, "Test headline");

        assert_eq!(tracker.expire_alerts(now + Duration::from_secs(30)), 1);
        assert!(!tracker.dismiss_alert(outcome.alert));
    }

    #[test]
    fn test_mark_current_position() {
        let mut h = harness();
        assert!(h.tracker.mark_current_position(10).is_none());

        h.tracker.observe_position(Fix::new(35.0, -97.0, 5));
        let crumb = h.tracker.mark_current_position(10).unwrap();
        assert_eq!(crumb.timestamp, 10);
        assert_eq!(crumb.point(), (35.0, -97.0));
        assert_eq!(crumb.distance_from_previous, 0.0);
        assert_eq!(h.events.breadcrumbs().len(), 1);
        // Idle: the filter is untouched
        assert!(h.tracker.session().last_fix.is_none());
    }

    #[test]
    fn test_sinks_receive_each_breadcrumb_once() {
        let mut h = harness();
        let trail = BreadcrumbTrail::new();
        let handle = h.tracker.register_sink(Box::new(trail.clone()));
        assert_eq!(h.tracker.sink_count(), 2);

        h.tracker.start(0);
        for i in 0..4u64 {
            h.tracker.handle_fix(Fix::new(0.0, i as f64 * 0.001, i));
        }
        assert_eq!(trail.len(), 3);
        assert_eq!(h.events.breadcrumbs().len(), 3);

        assert!(h.tracker.unregister_sink(handle));
        assert!(!h.tracker.unregister_sink(handle));
        h.tracker.handle_fix(Fix::new(0.0, 0.01, 9));
        assert_eq!(trail.len(), 3);
        assert_eq!(h.events.breadcrumbs().len(), 4);
    }

    struct FailingStore;

    impl ToggleStore for FailingStore {
        fn load(&self) -> StoreResult<PersistedToggles> {
            Err(StoreError::Io {
                path: "state.json".into(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
            })
        }

        fn save(&mut self, _toggles: &PersistedToggles) -> StoreResult<()> {
            self.load().map(|_| ())
        }
    }

    #[test]
    fn test_store_failures_do_not_interrupt_tracking() {
        let alerting = AlertingPolicy::new(Announcer::silent(), Duration::from_secs(30));
        let mut tracker = ChaseTracker::new(&TrackerConfig::default(), Box::new(FailingStore), alerting);
        assert_eq!(tracker.toggles(), PersistedToggles::default());

        assert!(tracker.start(0));
        tracker.handle_fix(Fix::new(0.0, 0.0, 1));
        assert!(tracker.handle_fix(Fix::new(0.0, 0.001, 2)).is_some());
    }
}
