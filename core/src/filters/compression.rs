//! filters/compression.rs
//!
//! Outbound counterpart of the decompression filter. While compression is
//! enabled, bytes are LZW encoded inside a `<cmp>` ... `</cmp>` region.
//!
//! The mode is toggled from outside through a [`CompressionMode`] handle. A
//! region opens lazily on the first byte written while enabled and closes on
//! the first byte written after disabling, or on flush.
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::debug;

use crate::codec::Encoder;
use crate::constants::tags::{COMPRESS_START, COMPRESS_STOP};
use crate::filters::types::{Filter, FilterError};

/// Shared switch for a [`CompressionFilter`] that already lives in a chain.
#[derive(Debug, Clone, Default)]
pub struct CompressionMode(Arc<AtomicBool>);

impl CompressionMode {
    pub fn set_enabled(&self, enabled: bool) {
        self.0.store(enabled, Ordering::Release);
    }

    pub fn is_enabled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[derive(Debug, Default)]
pub struct CompressionFilter {
    mode: CompressionMode,
    encoder: Option<Encoder>,
    regions: u64,
}

impl CompressionFilter {
    /// Starts in pass-through mode.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enabled() -> Self {
        let f = Self::new();
        f.mode.set_enabled(true);
        f
    }

    pub fn mode(&self) -> CompressionMode {
        self.mode.clone()
    }

    pub fn in_region(&self) -> bool {
        self.encoder.is_some()
    }

    pub fn regions(&self) -> u64 {
        self.regions
    }

    fn close_region(&mut self, out: &mut Vec<u8>) {
        if let Some(mut enc) = self.encoder.take() {
            enc.finish(out);
            out.extend_from_slice(COMPRESS_STOP);
            debug!(region = self.regions, bytes_in = enc.bytes_in(), "compressed region closed");
        }
    }
}

impl Filter for CompressionFilter {
    fn name(&self) -> &'static str {
        "compression"
    }

    fn write(&mut self, byte: u8, out: &mut Vec<u8>) -> Result<(), FilterError> {
        if !self.mode.is_enabled() {
            self.close_region(out);
            out.push(byte);
            return Ok(());
        }

        let regions = &mut self.regions;
        let enc = self.encoder.get_or_insert_with(|| {
            *regions += 1;
            debug!(region = *regions, "compressed region opened");
            out.extend_from_slice(COMPRESS_START);
            Encoder::new()
        });
        enc.encode(byte, out);
        Ok(())
    }

    fn flush(&mut self, out: &mut Vec<u8>) -> Result<(), FilterError> {
        self.close_region(out);
        Ok(())
    }
}
