//! filters/error.rs
//! Extracts `<err>` ... `</err>` messages from the stream and raises them.
use tracing::warn;

use crate::constants::tags::{ERROR_START, ERROR_STOP};
use crate::filters::tag::TagDetector;
use crate::filters::types::{Filter, FilterError};

#[derive(Debug, Default)]
pub struct ErrorFilter {
    detector: TagDetector,
    in_message: bool,
    message: Vec<u8>,
    raised: u64,
}

impl ErrorFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_message(&self) -> bool {
        self.in_message
    }

    /// Messages raised so far.
    pub fn raised(&self) -> u64 {
        self.raised
    }
}

impl Filter for ErrorFilter {
    fn name(&self) -> &'static str {
        "error"
    }

    fn write(&mut self, byte: u8, out: &mut Vec<u8>) -> Result<(), FilterError> {
        let tag = if self.in_message { ERROR_STOP } else { ERROR_START };
        let in_message = self.in_message;
        let message = &mut self.message;
        let mut route = |b: u8| {
            if in_message {
                message.push(b);
            } else {
                out.push(b);
            }
            Ok::<(), FilterError>(())
        };

        if !self.detector.matches(tag, byte, &mut route)? {
            return route(byte);
        }
        if !self.detector.is_complete(tag) {
            return Ok(());
        }

        self.detector.clear();
        if !in_message {
            self.in_message = true;
            self.message.clear();
            return Ok(());
        }

        self.in_message = false;
        self.raised += 1;
        let message = String::from_utf8_lossy(&std::mem::take(&mut self.message)).into_owned();
        warn!(%message, "device reported an error");
        Err(FilterError::Protocol { message })
    }
}
