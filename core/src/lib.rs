//! samplink-core
//!
//! Streaming codec and framing pipeline for a sampling device link.
//! LZW codec, in-band tag filters, and a thread-safe transport adapter.

#![forbid(unsafe_code)]

// Shared and top level
pub mod constants;
pub mod queue;
pub mod types;

pub mod codec;
pub mod filters;
pub mod telemetry;

// Transport boundary
pub mod controller;

// -----------------------------------------------------------------------------
// Prelude (Rust users)
// -----------------------------------------------------------------------------
pub mod prelude {
    pub use crate::codec::{compress, decompress, CodecError, Decoder, Encoder};
    pub use crate::controller::{
        Controller, ControllerConfig, ControllerEvent, MemoryTransport, Transport, TransportError,
    };
    pub use crate::filters::{
        CompressionFilter, CompressionMode, DecompressionFilter, ErrorFilter, Filter, FilterChain,
        FilterError, TagDetector, TimestampFilter,
    };
    pub use crate::queue::ByteQueue;
    pub use crate::telemetry::{TelemetryCounters, TelemetrySnapshot};
    pub use crate::types::LinkError;
}
