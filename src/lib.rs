//! Storm Chase Tracker
//!
//! GPS breadcrumb tracking and severe-weather alerting for storm chasers.
//! Raw fixes are thinned into breadcrumb waypoints with a great-circle
//! distance threshold; tornado warnings raise voice, visual and haptic alerts.

pub mod core;
pub mod algorithms;
pub mod processing;
pub mod source;
pub mod alerting;
pub mod api;
pub mod utils;
pub mod offline;
pub mod logging;

// Re-export commonly used types
pub use self::core::{Breadcrumb, Fix, SevereWeatherNotice, DEFAULT_MIN_DISTANCE_M, EARTH_RADIUS_M};
pub use algorithms::{haversine_distance, track_length};
pub use processing::{BreadcrumbFilter, FilterState, TrackingSession};
pub use source::{MockPositionSource, PositionError, PositionOptions, PositionSource, PositionUpdate};
pub use alerting::{AlertingPolicy, Announcer, HapticDevice, SpeechSynthesizer};
pub use api::{
    BreadcrumbTrail, ChaseTracker, EventLog, HostMessage, TrackerEvent, TrackerHandle,
    TrackerRuntime, TrackerSink,
};
pub use utils::{JsonFileStore, MemoryStore, PersistedToggles, ToggleStore, TrackerConfig};
