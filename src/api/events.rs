//! Tracker events and the sinks that receive them
//!
//! Breadcrumbs, session changes and GPS errors all travel through the single
//! [`TrackerSink`] interface.

use crate::algorithms::track_length;
use crate::core::{Breadcrumb, HOST_MESSAGE_TYPE};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// Something the tracker reports to its host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", content = "data", rename_all = "snake_case")]
pub enum TrackerEvent {
    TrackingStarted { timestamp: u64 },
    TrackingStopped { timestamp: u64 },
    AddBreadcrumb(Breadcrumb),
    GpsError { message: String },
}

impl TrackerEvent {
    pub fn action(&self) -> &'static str {
        match self {
            TrackerEvent::TrackingStarted { .. } => "tracking_started",
            TrackerEvent::TrackingStopped { .. } => "tracking_stopped",
            TrackerEvent::AddBreadcrumb(_) => "add_breadcrumb",
            TrackerEvent::GpsError { .. } => "gps_error",
        }
    }
}

/// Wire envelope: `{"type": "storm_chase_gps", "action": ..., "data": ...}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HostMessage<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(flatten)]
    pub event: &'a TrackerEvent,
}

impl<'a> HostMessage<'a> {
    pub fn new(event: &'a TrackerEvent) -> Self {
        Self {
            kind: HOST_MESSAGE_TYPE,
            event,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Receiver of tracker events. Transport and retry are the sink's business.
pub trait TrackerSink: Send {
    fn emit(&mut self, event: &TrackerEvent);
}

/// Handle returned when a sink is registered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SinkHandle(u32);

impl SinkHandle {
    pub(crate) fn new(id: u32) -> Self {
        SinkHandle(id)
    }

    pub fn id(&self) -> u32 {
        self.0
    }
}

/// Closure-backed sink
pub struct CallbackSink(Box<dyn FnMut(&TrackerEvent) + Send>);

impl CallbackSink {
    pub fn new(callback: impl FnMut(&TrackerEvent) + Send + 'static) -> Self {
        CallbackSink(Box::new(callback))
    }
}

impl TrackerSink for CallbackSink {
    fn emit(&mut self, event: &TrackerEvent) {
        (self.0)(event)
    }
}

impl TrackerSink for mpsc::UnboundedSender<TrackerEvent> {
    fn emit(&mut self, event: &TrackerEvent) {
        // A closed receiver just means nobody is listening any more
        let _ = self.send(event.clone());
    }
}

/// In-memory record of every event, shareable across clones
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<TrackerEvent>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<TrackerEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn actions(&self) -> Vec<&'static str> {
        self.events().iter().map(TrackerEvent::action).collect()
    }

    pub fn breadcrumbs(&self) -> Vec<Breadcrumb> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                TrackerEvent::AddBreadcrumb(crumb) => Some(crumb),
                _ => None,
            })
            .collect()
    }
}

impl TrackerSink for EventLog {
    fn emit(&mut self, event: &TrackerEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

/// Chase track built from emitted breadcrumbs
#[derive(Debug, Clone, Default)]
pub struct BreadcrumbTrail {
    points: Arc<Mutex<Vec<Breadcrumb>>>,
}

impl BreadcrumbTrail {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn breadcrumbs(&self) -> Vec<Breadcrumb> {
        self.points.lock().map(|p| p.clone()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.points.lock().map(|p| p.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total chase distance along the trail (meters)
    pub fn total_distance_m(&self) -> f64 {
        track_length(self.breadcrumbs().iter().map(Breadcrumb::point))
    }

    pub fn clear(&self) {
        if let Ok(mut points) = self.points.lock() {
            points.clear();
        }
    }
}

impl TrackerSink for BreadcrumbTrail {
    fn emit(&mut self, event: &TrackerEvent) {
        if let TrackerEvent::AddBreadcrumb(crumb) = event {
            if let Ok(mut points) = self.points.lock() {
                points.push(*crumb);
            }
        }
    }
}
