//! Physical constants and tracker defaults

/// Mean Earth radius used for great-circle distances (meters)
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Minimum distance between consecutive breadcrumbs (meters)
pub const DEFAULT_MIN_DISTANCE_M: f64 = 50.0;

/// How long an urgent visual alert stays up unless dismissed (seconds)
pub const DEFAULT_ALERT_DURATION_SECS: u64 = 30;

/// Vibration pattern for urgent alerts: on/off/on/off/on (milliseconds)
pub const URGENT_HAPTIC_PATTERN_MS: [u64; 5] = [500, 200, 500, 200, 500];

/// Message type tag carried by every host-frame message
pub const HOST_MESSAGE_TYPE: &str = "storm_chase_gps";
