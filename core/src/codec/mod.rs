//! codec/mod.rs
//! 13-bit LZW codec used for compressed regions on the device link.

pub mod constants;
pub mod decoder;
pub mod encoder;
pub mod stream;
pub mod types;

pub use decoder::Decoder;
pub use encoder::Encoder;
pub use stream::{compress, compress_stream, decompress, decompress_stream};
pub use types::{CodecError, Compressor, Decompressor};
