//! Geodesic algorithms

pub mod distance;

pub use distance::{haversine_distance, track_length};
