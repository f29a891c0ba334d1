//! controller/mod.rs
//! Transport adapter: filter chains, byte queues, and listener notifications.

#[allow(clippy::module_inception)]
pub mod controller;
pub mod memory;
pub mod types;

pub use controller::Controller;
pub use memory::MemoryTransport;
pub use types::{ControllerConfig, ControllerEvent, Transport, TransportError};
