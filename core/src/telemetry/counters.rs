//! telemetry/counters.rs
//! Byte counters on both sides of the filter chains.
//!
//! Summary: raw counts are what crossed the transport, filtered counts are what
//! the consumer read or wrote. Converted into an immutable TelemetrySnapshot on demand.
use std::ops::AddAssign;

use serde::{Deserialize, Serialize};

#[derive(Default, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryCounters {
    /// Bytes handed to the controller by the transport.
    pub bytes_received_raw: u64,
    /// Bytes the input chain produced into the receive queue.
    pub bytes_received: u64,
    /// Bytes given to `write` by the consumer.
    pub bytes_sent_raw: u64,
    /// Bytes the output chain produced for the transport.
    pub bytes_sent: u64,
    pub protocol_errors: u64,
    pub transport_writes: u64,
}

impl TelemetryCounters {
    pub fn add_received(&mut self, raw: usize, filtered: usize) {
        self.bytes_received_raw += raw as u64;
        self.bytes_received += filtered as u64;
    }

    pub fn add_sent(&mut self, raw: usize, filtered: usize) {
        self.bytes_sent_raw += raw as u64;
        self.bytes_sent += filtered as u64;
    }

    pub fn add_protocol_error(&mut self) {
        self.protocol_errors += 1;
    }

    pub fn add_transport_write(&mut self) {
        self.transport_writes += 1;
    }

    pub fn merge(&mut self, other: &TelemetryCounters) {
        self.bytes_received_raw += other.bytes_received_raw;
        self.bytes_received += other.bytes_received;
        self.bytes_sent_raw += other.bytes_sent_raw;
        self.bytes_sent += other.bytes_sent;
        self.protocol_errors += other.protocol_errors;
        self.transport_writes += other.transport_writes;
    }
}

impl AddAssign for TelemetryCounters {
    fn add_assign(&mut self, rhs: Self) {
        self.merge(&rhs);
    }
}
