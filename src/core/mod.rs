//! Core types and constants for the storm chase tracker

pub mod types;
pub mod constants;

pub use types::*;
pub use constants::*;
