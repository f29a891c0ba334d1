//! telemetry/snapshot.rs
//!
//! Immutable copy of a controller's counters with derived ratios.
//!
//! Design notes:
//! - `receive_ratio` is raw / filtered inbound bytes. Below 1.0 the device link
//!   carried fewer bytes than the consumer read, i.e. compression paid off.
//! - `send_ratio` is the same measure for outbound traffic.
//! - Ratios are 0.0 when nothing was produced yet.
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::telemetry::counters::TelemetryCounters;
use crate::telemetry::timers::{StageTimes, TelemetryTimer};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    pub counters: TelemetryCounters,
    pub receive_ratio: f64,
    pub send_ratio: f64,
    pub throughput_received_bytes_per_sec: f64,
    pub elapsed: Duration,
    pub stage_times: StageTimes,
}

fn ratio(raw: u64, filtered: u64) -> f64 {
    if filtered == 0 {
        0.0
    } else {
        raw as f64 / filtered as f64
    }
}

impl TelemetrySnapshot {
    pub fn from(counters: &TelemetryCounters, timer: &TelemetryTimer) -> Self {
        let elapsed = timer.elapsed();
        let throughput = if elapsed.as_secs_f64() > 0.0 {
            counters.bytes_received as f64 / elapsed.as_secs_f64()
        } else {
            0.0
        };

        Self {
            counters: counters.clone(),
            receive_ratio: ratio(counters.bytes_received_raw, counters.bytes_received),
            send_ratio: ratio(counters.bytes_sent, counters.bytes_sent_raw),
            throughput_received_bytes_per_sec: throughput,
            elapsed,
            stage_times: timer.stage_times.clone(),
        }
    }

    pub fn total_stage_time(&self) -> Duration {
        self.stage_times.total()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
