//! filters/types.rs
//! Filter errors and the stage capability every filter implements.
use thiserror::Error;

use crate::codec::CodecError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    /// The device framed an error message in-band. Surrounding state is intact.
    #[error("device error: {message}")]
    Protocol { message: String },

    /// Decoder failure inside a compressed region.
    #[error("codec failure: {0}")]
    Codec(#[from] CodecError),

    /// Timestamp record that does not start with a known marker. The byte is dropped.
    #[error("invalid timestamp marker 0x{0:02X}")]
    InvalidMarker(u8),
}

impl FilterError {
    /// Protocol-level problems are reported and processing continues.
    /// Codec failures abort the current compressed region.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, FilterError::Codec(_))
    }
}

/// One processing stage of a [`FilterChain`](crate::filters::FilterChain).
///
/// `write` consumes one byte and appends whatever the stage yields to `out`.
/// A stage never reads from `out`; it may leave it untouched.
pub trait Filter: Send {
    fn name(&self) -> &'static str;

    fn write(&mut self, byte: u8, out: &mut Vec<u8>) -> Result<(), FilterError>;

    /// Emit anything held back for framing reasons.
    fn flush(&mut self, _out: &mut Vec<u8>) -> Result<(), FilterError> {
        Ok(())
    }
}
