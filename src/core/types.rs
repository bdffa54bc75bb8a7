//! Core data types for position tracking

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// One raw position reading from a position source
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fix {
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
    /// Measurement time (milliseconds since epoch)
    pub timestamp: u64,
    /// Reported horizontal accuracy (meters)
    pub accuracy: f64,
}

impl Fix {
    pub fn new(latitude: f64, longitude: f64, timestamp: u64) -> Self {
        Self {
            latitude,
            longitude,
            timestamp,
            accuracy: 0.0,
        }
    }

    pub fn with_accuracy(mut self, accuracy: f64) -> Self {
        self.accuracy = accuracy;
        self
    }

    /// Latitude/longitude pair in degrees
    pub fn point(&self) -> (f64, f64) {
        (self.latitude, self.longitude)
    }

    /// Both coordinates are finite numbers
    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }
}

/// A fix promoted to a persisted waypoint by the distance filter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Breadcrumb {
    #[serde(rename = "lat")]
    pub latitude: f64,
    #[serde(rename = "lon")]
    pub longitude: f64,
    pub timestamp: u64,
    /// Distance from the previous breadcrumb anchor (meters)
    pub distance_from_previous: f64,
}

impl Breadcrumb {
    pub(crate) fn from_fix(fix: &Fix, distance_from_previous: f64) -> Self {
        Self {
            latitude: fix.latitude,
            longitude: fix.longitude,
            timestamp: fix.timestamp,
            distance_from_previous,
        }
    }

    pub fn point(&self) -> (f64, f64) {
        (self.latitude, self.longitude)
    }
}

/// Severe-weather notice handed to the alerting policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SevereWeatherNotice {
    pub area: String,
    pub headline: String,
}

impl SevereWeatherNotice {
    pub fn new(area: impl Into<String>, headline: impl Into<String>) -> Self {
        Self {
            area: area.into(),
            headline: headline.into(),
        }
    }
}

/// Current wall-clock time in milliseconds since epoch
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
