//! Position source abstraction
//!
//! Sources push [`PositionUpdate`]s into a tokio channel so a single consumer
//! sees fixes and errors in delivery order.

pub mod position;
pub mod mock;

pub use position::{
    PositionError, PositionOptions, PositionSource, PositionUpdate, UpdateSender, WatchId,
};
pub use mock::MockPositionSource;
