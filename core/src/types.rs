//! types.rs
//! Crate-wide error covering codec, filter, transport and configuration failures.
//! - `From<T>` impls let `?` cross layer boundaries.
use thiserror::Error;

use crate::codec::CodecError;
use crate::controller::TransportError;
use crate::filters::FilterError;

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("filter error: {0}")]
    Filter(#[from] FilterError),

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Rejected at construction time, never on the streaming path.
    #[error("configuration error: {0}")]
    Config(String),
}

impl LinkError {
    /// Protocol errors reported by the device. Everything else aborts the session.
    pub fn is_recoverable(&self) -> bool {
        match self {
            LinkError::Filter(e) => e.is_recoverable(),
            _ => false,
        }
    }
}
