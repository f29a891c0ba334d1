//! telemetry/mod.rs
//! Counters, timers, and immutable snapshots for a controller session.

pub mod counters;
pub mod snapshot;
pub mod timers;

pub use counters::*;
pub use snapshot::*;
pub use timers::*;
