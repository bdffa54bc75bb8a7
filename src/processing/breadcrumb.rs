//! Distance-threshold breadcrumb filter
//!
//! Consumes raw fixes while a tracking session is active and promotes a fix to
//! a [`Breadcrumb`] once it is at least `min_distance_m` away from the last
//! emitted breadcrumb. The first fix of a session only seeds the anchor.

use crate::algorithms::haversine_distance;
use crate::core::{Breadcrumb, Fix, DEFAULT_MIN_DISTANCE_M};
use std::cmp::Ordering;

/// Filter state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterState {
    Idle,
    Tracking,
}

/// The single tracking session owned by the filter
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackingSession {
    pub active: bool,
    /// Anchor the next distance is measured from
    pub last_fix: Option<Fix>,
    pub started_at: Option<u64>,
}

/// Breadcrumb emission policy
#[derive(Debug, Clone)]
pub struct BreadcrumbFilter {
    min_distance_m: f64,
    session: TrackingSession,
}

impl BreadcrumbFilter {
    pub fn new(min_distance_m: f64) -> Self {
        Self {
            min_distance_m,
            session: TrackingSession::default(),
        }
    }

    pub fn min_distance(&self) -> f64 {
        self.min_distance_m
    }

    pub fn state(&self) -> FilterState {
        if self.session.active {
            FilterState::Tracking
        } else {
            FilterState::Idle
        }
    }

    pub fn is_tracking(&self) -> bool {
        self.session.active
    }

    pub fn session(&self) -> &TrackingSession {
        &self.session
    }

    /// Enter `Tracking`. Returns false (and leaves the anchor alone) when
    /// already tracking.
    pub fn start(&mut self, now_ms: u64) -> bool {
        if self.session.active {
            return false;
        }

        self.session = TrackingSession {
            active: true,
            last_fix: None,
            started_at: Some(now_ms),
        };
        true
    }

    /// Return to `Idle`, discarding the session. Returns false when idle.
    pub fn stop(&mut self) -> bool {
        if !self.session.active {
            return false;
        }

        self.session = TrackingSession::default();
        true
    }

    /// Feed one fix. Returns the breadcrumb to emit, if any.
    ///
    /// Fixes with non-finite coordinates are discarded and never become the
    /// anchor.
    pub fn handle_fix(&mut self, fix: Fix) -> Option<Breadcrumb> {
        if !self.session.active || !fix.is_finite() {
            return None;
        }

        let Some(anchor) = self.session.last_fix else {
            self.session.last_fix = Some(fix);
            return None;
        };

        let distance = haversine_distance(anchor.point(), fix.point());
        // Unordered (NaN) comparisons never pass the threshold
        let passes = matches!(
            distance.partial_cmp(&self.min_distance_m),
            Some(Ordering::Greater | Ordering::Equal)
        );
        if !passes {
            return None;
        }

        self.session.last_fix = Some(fix);
        Some(Breadcrumb::from_fix(&fix, distance))
    }

    /// Promote a fix regardless of distance. While tracking it becomes the
    /// new anchor.
    pub fn force(&mut self, fix: Fix) -> Breadcrumb {
        let distance = self
            .session
            .last_fix
            .map(|anchor| haversine_distance(anchor.point(), fix.point()))
            .unwrap_or(0.0);

        if self.session.active {
            self.session.last_fix = Some(fix);
        }
        Breadcrumb::from_fix(&fix, distance)
    }
}

impl Default for BreadcrumbFilter {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_DISTANCE_M)
    }
}
