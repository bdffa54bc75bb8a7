//! Fix processing

pub mod breadcrumb;

pub use breadcrumb::{BreadcrumbFilter, FilterState, TrackingSession};
