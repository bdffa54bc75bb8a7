//! Position source trait and update types

use crate::core::Fix;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Error kinds a position source can report.
///
/// The display text is the message shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum PositionError {
    #[error("GPS error: Location access denied. Please enable location permissions.")]
    PermissionDenied,
    #[error("GPS error: Location information unavailable.")]
    Unavailable,
    #[error("GPS error: Location request timed out.")]
    Timeout,
    #[error("GPS error: An unknown error occurred.")]
    Unknown,
}

impl PositionError {
    /// Map a W3C geolocation error code (1-3) onto an error kind
    pub fn from_code(code: u16) -> Self {
        match code {
            1 => PositionError::PermissionDenied,
            2 => PositionError::Unavailable,
            3 => PositionError::Timeout,
            _ => PositionError::Unknown,
        }
    }

    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

/// One delivery from a position source
#[derive(Debug, Clone, PartialEq)]
pub enum PositionUpdate {
    Fix(Fix),
    Error(PositionError),
}

/// Sending half handed to sources
pub type UpdateSender = mpsc::UnboundedSender<PositionUpdate>;

/// Handle returned by [`PositionSource::watch`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatchId(pub u32);

/// Accuracy/cadence profile requested from a source
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionOptions {
    pub enable_high_accuracy: bool,
    /// Give up on a reading after this long (milliseconds)
    pub timeout_ms: u64,
    /// Accept cached readings up to this age (milliseconds)
    pub maximum_age_ms: u64,
}

impl PositionOptions {
    /// Profile for a single position request
    pub fn one_shot() -> Self {
        Self {
            enable_high_accuracy: true,
            timeout_ms: 10_000,
            maximum_age_ms: 60_000,
        }
    }

    /// Profile for continuous watching while tracking
    pub fn watch() -> Self {
        Self {
            enable_high_accuracy: true,
            timeout_ms: 15_000,
            maximum_age_ms: 30_000,
        }
    }
}

/// Something that produces fixes, e.g. a GNSS receiver or browser geolocation.
///
/// Sources retry on their own after reporting an error; consumers only stop
/// a watch through [`PositionSource::clear_watch`].
pub trait PositionSource: Send {
    /// Start delivering updates until the watch is cleared
    fn watch(&mut self, options: &PositionOptions, sender: UpdateSender) -> WatchId;

    /// Stop a watch. Unknown ids are ignored.
    fn clear_watch(&mut self, id: WatchId);

    /// Deliver a single update for the current position
    fn request_current(&mut self, options: &PositionOptions, sender: UpdateSender);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            PositionError::PermissionDenied.user_message(),
            "GPS error: Location access denied. Please enable location permissions."
        );
        assert_eq!(
            PositionError::Unavailable.user_message(),
            "GPS error: Location information unavailable."
        );
        assert_eq!(
            PositionError::Timeout.user_message(),
            "GPS error: Location request timed out."
        );
        assert_eq!(
            PositionError::Unknown.user_message(),
            "GPS error: An unknown error occurred."
        );
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(PositionError::from_code(1), PositionError::PermissionDenied);
        assert_eq!(PositionError::from_code(2), PositionError::Unavailable);
        assert_eq!(PositionError::from_code(3), PositionError::Timeout);
        assert_eq!(PositionError::from_code(0), PositionError::Unknown);
        assert_eq!(PositionError::from_code(99), PositionError::Unknown);
    }

    #[test]
    fn test_option_profiles() {
        let watch = PositionOptions::watch();
        assert!(watch.enable_high_accuracy);
        assert_eq!(watch.timeout_ms, 15_000);
        assert_eq!(watch.maximum_age_ms, 30_000);

        let once = PositionOptions::one_shot();
        assert_eq!(once.timeout_ms, 10_000);
        assert_eq!(once.maximum_age_ms, 60_000);
    }
}
