//! filters/timestamp.rs
//!
//! Expands the device's transition log into one byte per sampling tick.
//!
//! Wire format, 4 bytes per record:
//! - `[marker][lo][hi][value]`, `lo`/`hi` form a little-endian u16.
//! - `Period`: sampling period, stored only.
//! - `Rollover`: upper 16 bits of the 32-bit tick counter.
//! - `Sample`: lower 16 bits of the tick at which the inputs changed to `value`.
use byteorder::{ByteOrder, LittleEndian};
use num_enum::{IntoPrimitive, TryFromPrimitive};
use tracing::trace;

use crate::constants::TIMESTAMP_RECORD_LEN;
use crate::filters::types::{Filter, FilterError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum Marker {
    Period = 0xBD,
    Rollover = 0xBE,
    Sample = 0xBF,
}

#[derive(Debug, Default)]
pub struct TimestampFilter {
    record: [u8; TIMESTAMP_RECORD_LEN],
    filled: usize,
    period: u16,
    rollover: u16,
    /// First tick that has not been emitted yet.
    next_tick: u64,
    prev_sample: u8,
}

impl TimestampFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn period(&self) -> u16 {
        self.period
    }

    pub fn rollover_count(&self) -> u16 {
        self.rollover
    }

    pub fn next_tick(&self) -> u64 {
        self.next_tick
    }

    fn apply(&mut self, marker: Marker, out: &mut Vec<u8>) {
        let value16 = LittleEndian::read_u16(&self.record[1..3]);
        match marker {
            Marker::Period => self.period = value16,
            Marker::Rollover => self.rollover = value16,
            Marker::Sample => {
                let tick = ((self.rollover as u64) << 16) | value16 as u64;
                let value = self.record[3];

                if tick > self.next_tick {
                    let gap = (tick - self.next_tick) as usize;
                    out.resize(out.len() + gap, self.prev_sample);
                    self.next_tick = tick;
                }
                if tick == self.next_tick {
                    out.push(value);
                    self.next_tick = tick + 1;
                } else {
                    trace!(tick, next_tick = self.next_tick, "stale sample, holding new value");
                }
                self.prev_sample = value;
            }
        }
    }
}

impl Filter for TimestampFilter {
    fn name(&self) -> &'static str {
        "timestamp"
    }

    fn write(&mut self, byte: u8, out: &mut Vec<u8>) -> Result<(), FilterError> {
        if self.filled == 0 && Marker::try_from(byte).is_err() {
            return Err(FilterError::InvalidMarker(byte));
        }

        self.record[self.filled] = byte;
        self.filled += 1;
        if self.filled < TIMESTAMP_RECORD_LEN {
            return Ok(());
        }

        self.filled = 0;
        // Validated when the record started.
        if let Ok(marker) = Marker::try_from(self.record[0]) {
            self.apply(marker, out);
        }
        Ok(())
    }
}
