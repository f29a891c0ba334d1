//! codec/types.rs
//! Codec errors and the chunk-level compressor/decompressor traits.
use thiserror::Error;

use crate::codec::constants::CODE_BITS;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Configuration error: only the fixed code width is supported.
    #[error("invalid code width {bits}: only {expected}-bit codes are supported", expected = CODE_BITS)]
    InvalidCodeWidth { bits: u8 },

    /// Framing error: a code that cannot be derived from the codes seen so far.
    #[error("invalid code {code} (next free entry {free_entry})")]
    InvalidCode { code: u16, free_entry: u16 },

    /// Framing error: the prefix walk did not reach a literal byte.
    #[error("prefix chain for code {code} exceeds the dictionary bound")]
    ChainTooLong { code: u16 },

    /// The decoder already failed and its dictionary is unusable.
    #[error("decoder state is corrupted by an earlier framing error")]
    Poisoned,

    #[error("codec I/O error: {0}")]
    Io(String),
}

impl CodecError {
    /// Framing errors corrupt the dictionary; they are never retried.
    pub fn is_framing(&self) -> bool {
        matches!(
            self,
            CodecError::InvalidCode { .. } | CodecError::ChainTooLong { .. } | CodecError::Poisoned
        )
    }
}

impl From<std::io::Error> for CodecError {
    fn from(e: std::io::Error) -> Self {
        CodecError::Io(e.to_string())
    }
}

// Send so a codec can live inside a filter owned by the transport thread.
pub trait Compressor: Send {
    /// Compress a chunk, appending any completed wire bytes to `out`.
    fn compress_chunk(&mut self, input: &[u8], out: &mut Vec<u8>) -> Result<(), CodecError>;
    /// Flush pending state and terminate the stream.
    fn finish(&mut self, out: &mut Vec<u8>) -> Result<(), CodecError>;
}

pub trait Decompressor: Send {
    /// Decompress a chunk of wire bytes, appending literal bytes to `out`.
    fn decompress_chunk(&mut self, input: &[u8], out: &mut Vec<u8>) -> Result<(), CodecError>;
}
