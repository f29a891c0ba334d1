//! queue.rs
//! Mutex-guarded FIFO of bytes shared between a producer and a consumer thread.
//!
//! The lock is held for the queue operation only. A panic on another thread
//! does not make the queue unusable; the poisoned guard is recovered.
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use bytes::Bytes;

use crate::constants::DEFAULT_QUEUE_CAPACITY;

#[derive(Debug)]
pub struct ByteQueue {
    inner: Mutex<VecDeque<u8>>,
}

impl ByteQueue {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_QUEUE_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { inner: Mutex::new(VecDeque::with_capacity(capacity)) }
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<u8>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn push(&self, byte: u8) {
        self.lock().push_back(byte);
    }

    /// Append a whole burst under a single lock, preserving order.
    pub fn extend(&self, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        self.lock().extend(bytes.iter().copied());
    }

    /// Put bytes back in front of everything queued, keeping their order.
    pub fn requeue_front(&self, bytes: &[u8]) {
        let mut q = self.lock();
        for &b in bytes.iter().rev() {
            q.push_front(b);
        }
    }

    pub fn pop(&self) -> Option<u8> {
        self.lock().pop_front()
    }

    /// Move up to `buf.len()` bytes into `buf`. Returns the count moved.
    pub fn pop_into(&self, buf: &mut [u8]) -> usize {
        let mut q = self.lock();
        let n = buf.len().min(q.len());
        for (slot, b) in buf.iter_mut().zip(q.drain(..n)) {
            *slot = b;
        }
        n
    }

    /// Take everything currently queued.
    pub fn drain(&self) -> Bytes {
        let mut q = self.lock();
        let v: Vec<u8> = q.drain(..).collect();
        Bytes::from(v)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}

impl Default for ByteQueue {
    fn default() -> Self {
        Self::new()
    }
}
