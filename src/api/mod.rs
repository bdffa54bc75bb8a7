//! Host-facing tracker API
//!
//! [`ChaseTracker`] is the synchronous context object; [`TrackerRuntime`]
//! drives it from a position source on a tokio task.

pub mod events;
pub mod tracker;
pub mod runtime;

pub use events::{
    BreadcrumbTrail, CallbackSink, EventLog, HostMessage, SinkHandle, TrackerEvent, TrackerSink,
};
pub use tracker::ChaseTracker;
pub use runtime::{Command, RuntimeError, TrackerHandle, TrackerRuntime, TrackerStatus};
