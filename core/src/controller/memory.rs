//! controller/memory.rs
//! In-memory transport. Clones share state, so a test can keep a handle while
//! the controller owns the other.
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use bytes::Bytes;

use crate::controller::types::{Transport, TransportError};

#[derive(Debug, Clone, Default)]
pub struct MemoryTransport {
    open: Arc<AtomicBool>,
    writes: Arc<Mutex<Vec<Bytes>>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every bulk write in order.
    pub fn writes(&self) -> Vec<Bytes> {
        self.writes.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn write_count(&self) -> usize {
        self.writes.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// All written bytes concatenated.
    pub fn written(&self) -> Vec<u8> {
        self.writes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .flat_map(|w| w.iter().copied())
            .collect()
    }
}

impl Transport for MemoryTransport {
    fn open(&mut self) -> Result<(), TransportError> {
        self.open.store(true, Ordering::Release);
        Ok(())
    }

    fn close(&mut self) -> Result<(), TransportError> {
        self.open.store(false, Ordering::Release);
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        if !self.is_open() {
            return Err(TransportError::NotOpen);
        }
        self.writes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Bytes::copy_from_slice(bytes));
        Ok(())
    }
}
