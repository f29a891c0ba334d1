//! constants.rs
//! Wire-level constants of the device link.

pub use crate::codec::constants::{CLEAR_CODE, CODE_BITS, FIRST_CODE, MAX_CODE, TERMINATOR_CODE};

/// In-band delimiters. Literal ASCII, matched byte by byte.
pub mod tags {
    /// Opens a compressed region.
    pub const COMPRESS_START: &[u8] = b"<cmp>";
    /// Closes a compressed region.
    pub const COMPRESS_STOP: &[u8] = b"</cmp>";
    /// Opens a device error message.
    pub const ERROR_START: &[u8] = b"<err>";
    /// Closes a device error message.
    pub const ERROR_STOP: &[u8] = b"</err>";
}

/// Timestamp record markers (first byte of every 4-byte record).
pub mod markers {
    pub const PERIOD: u8 = 0xBD;
    pub const ROLLOVER: u8 = 0xBE;
    pub const SAMPLE: u8 = 0xBF;
}

/// `[marker][lo][hi][value]`
pub const TIMESTAMP_RECORD_LEN: usize = 4;

/// Initial capacity of the controller queues. They grow past it on demand.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;
