//! controller/types.rs
//! Transport seam, controller events, and controller configuration.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::DEFAULT_QUEUE_CAPACITY;
use crate::types::LinkError;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("transport is not open")]
    NotOpen,

    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("transport closed by peer")]
    Closed,
}

/// Byte transport under a controller (serial port, simulated device, ...).
///
/// Inbound bytes are pushed by the transport owner into
/// [`Controller::receive_from_device`](crate::controller::Controller::receive_from_device).
pub trait Transport: Send {
    fn open(&mut self) -> Result<(), TransportError>;
    fn close(&mut self) -> Result<(), TransportError>;
    fn is_open(&self) -> bool;
    /// One bulk write. Implementations must not split it into several writes.
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), TransportError>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn open(&mut self) -> Result<(), TransportError> {
        (**self).open()
    }

    fn close(&mut self) -> Result<(), TransportError> {
        (**self).close()
    }

    fn is_open(&self) -> bool {
        (**self).is_open()
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        (**self).write_bytes(bytes)
    }
}

/// Notifications for the session layer.
#[derive(Debug, Clone, PartialEq)]
pub enum ControllerEvent {
    /// New filtered bytes are ready to read.
    DataReceived { controller: String },
    /// A recoverable error was caught on the receive path.
    Error {
        controller: String,
        message: String,
        at: DateTime<Utc>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    pub name: String,
    /// Initial capacity of the receive and send queues.
    pub queue_capacity: usize,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self { name: String::new(), queue_capacity: DEFAULT_QUEUE_CAPACITY }
    }
}

impl ControllerConfig {
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Self::default() }
    }

    pub fn from_json(s: &str) -> Result<Self, LinkError> {
        let cfg: Self = serde_json::from_str(s).map_err(|e| LinkError::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), LinkError> {
        if self.queue_capacity == 0 {
            return Err(LinkError::Config("queue_capacity must be greater than zero".into()));
        }
        Ok(())
    }
}
