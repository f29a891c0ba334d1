//! filters/chain.rs
//!
//! Ordered list of filter stages with a FIFO output queue.
//!
//! Design notes:
//! - A burst is pushed through one stage at a time; each stage sees exactly the
//!   byte sequence the previous one produced, in order.
//! - Stage errors do not stop the burst. Every stage resynchronises on its own,
//!   so the rest of the burst is still processed and its output queued.
//! - The first fatal error is returned if there was one, otherwise the first
//!   recoverable error.
use bytes::Bytes;
use tracing::{debug, trace, warn};

use crate::filters::types::{Filter, FilterError};
use crate::queue::ByteQueue;

pub struct FilterChain {
    stages: Vec<Box<dyn Filter>>,
    output: ByteQueue,
}

impl FilterChain {
    pub fn new() -> Self {
        Self { stages: Vec::new(), output: ByteQueue::new() }
    }

    /// Append a stage at the end of the chain.
    pub fn add_filter<F: Filter + 'static>(&mut self, filter: F) -> &mut Self {
        self.add_boxed(Box::new(filter))
    }

    pub fn add_boxed(&mut self, filter: Box<dyn Filter>) -> &mut Self {
        debug!(stage = filter.name(), position = self.stages.len(), "filter added");
        self.stages.push(filter);
        self
    }

    /// Stage names in processing order.
    pub fn names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn write(&mut self, byte: u8) -> Result<(), FilterError> {
        self.write_all(&[byte])
    }

    pub fn write_all(&mut self, bytes: &[u8]) -> Result<(), FilterError> {
        let mut first_err = None;
        let mut batch = bytes.to_vec();

        for stage in self.stages.iter_mut() {
            batch = run_stage(stage.as_mut(), &batch, &mut first_err);
            if batch.is_empty() {
                break;
            }
        }

        self.output.extend(&batch);
        first_err.map_or(Ok(()), Err)
    }

    /// Flush every stage in order. Whatever an earlier stage releases is
    /// processed by the later ones before they flush.
    pub fn flush(&mut self) -> Result<(), FilterError> {
        let mut first_err = None;
        let mut batch = Vec::new();

        for stage in self.stages.iter_mut() {
            let mut next = run_stage(stage.as_mut(), &batch, &mut first_err);
            if let Err(e) = stage.flush(&mut next) {
                record(stage.name(), e, &mut first_err);
            }
            batch = next;
        }

        self.output.extend(&batch);
        first_err.map_or(Ok(()), Err)
    }

    pub fn read(&self) -> Option<u8> {
        self.output.pop()
    }

    pub fn read_into(&self, buf: &mut [u8]) -> usize {
        self.output.pop_into(buf)
    }

    pub fn data_ready(&self) -> bool {
        !self.output.is_empty()
    }

    pub fn data_len(&self) -> usize {
        self.output.len()
    }

    /// Take everything the chain has produced so far.
    pub fn drain(&self) -> Bytes {
        self.output.drain()
    }
}

impl Default for FilterChain {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FilterChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterChain")
            .field("stages", &self.names())
            .field("queued", &self.output.len())
            .finish()
    }
}

fn run_stage(stage: &mut dyn Filter, input: &[u8], first_err: &mut Option<FilterError>) -> Vec<u8> {
    let mut out = Vec::with_capacity(input.len());
    for &b in input {
        if let Err(e) = stage.write(b, &mut out) {
            record(stage.name(), e, first_err);
        }
    }
    out
}

/// Keep the error the caller should see. A fatal error outranks any
/// recoverable one recorded before it.
fn record(stage: &'static str, e: FilterError, first_err: &mut Option<FilterError>) {
    if e.is_recoverable() {
        trace!(stage, error = %e, "recoverable filter error");
    } else {
        warn!(stage, error = %e, "fatal filter error");
    }
    let replace = match first_err {
        None => true,
        Some(prev) => prev.is_recoverable() && !e.is_recoverable(),
    };
    if replace {
        *first_err = Some(e);
    }
}
