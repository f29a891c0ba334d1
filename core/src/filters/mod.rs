//! filters/mod.rs
//! Byte-stream filters for the device link and the ordered chain that runs them.

pub mod chain;
pub mod compression;
pub mod decompression;
pub mod error;
pub mod tag;
pub mod timestamp;
pub mod types;

pub use chain::FilterChain;
pub use compression::{CompressionFilter, CompressionMode};
pub use decompression::DecompressionFilter;
pub use error::ErrorFilter;
pub use tag::TagDetector;
pub use timestamp::{Marker, TimestampFilter};
pub use types::{Filter, FilterError};
