//! controller/controller.rs
//!
//! Adapter between a byte transport and the consumer.
//!
//! Design notes:
//! - `receive_from_device` runs on the transport's thread; `read`/`write` on the
//!   consumer's. The receive and send queues are the only shared hand-off.
//! - The input chain lock is held while its output is appended to the receive
//!   queue, so concurrent receivers cannot interleave one byte's output with
//!   another's.
//! - Lock order: chain -> queue -> transport -> counters/timer. Never the reverse.
//! - Protocol errors from the input chain become `ControllerEvent::Error`;
//!   everything else is returned to the caller.
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use chrono::Utc;
use crossbeam::channel::{self, Receiver, Sender};
use tracing::{debug, trace, warn};

use crate::controller::types::{ControllerConfig, ControllerEvent, Transport};
use crate::filters::{Filter, FilterChain, FilterError};
use crate::queue::ByteQueue;
use crate::telemetry::{Stage, TelemetryCounters, TelemetrySnapshot, TelemetryTimer};
use crate::types::LinkError;

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct Controller<T: Transport> {
    config: ControllerConfig,
    transport: Mutex<T>,
    input: Mutex<Option<FilterChain>>,
    output: Mutex<Option<FilterChain>>,
    received: ByteQueue,
    sending: ByteQueue,
    counters: Mutex<TelemetryCounters>,
    timer: Mutex<TelemetryTimer>,
    subscribers: Mutex<Vec<Sender<ControllerEvent>>>,
}

impl<T: Transport> Controller<T> {
    pub fn new(config: ControllerConfig, transport: T) -> Result<Self, LinkError> {
        config.validate()?;
        Ok(Self {
            received: ByteQueue::with_capacity(config.queue_capacity),
            sending: ByteQueue::with_capacity(config.queue_capacity),
            config,
            transport: Mutex::new(transport),
            input: Mutex::new(None),
            output: Mutex::new(None),
            counters: Mutex::new(TelemetryCounters::default()),
            timer: Mutex::new(TelemetryTimer::new()),
            subscribers: Mutex::new(Vec::new()),
        })
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    // ---- transport --------------------------------------------------------

    pub fn open(&self) -> Result<(), LinkError> {
        lock(&self.transport).open()?;
        debug!(controller = %self.config.name, "transport opened");
        Ok(())
    }

    pub fn close(&self) -> Result<(), LinkError> {
        lock(&self.transport).close()?;
        debug!(controller = %self.config.name, "transport closed");
        Ok(())
    }

    pub fn is_open(&self) -> bool {
        lock(&self.transport).is_open()
    }

    // ---- filters ----------------------------------------------------------

    /// Append a stage to the inbound chain, creating the chain on first use.
    pub fn add_input_filter<F: Filter + 'static>(&self, filter: F) {
        lock(&self.input).get_or_insert_with(FilterChain::new).add_filter(filter);
    }

    pub fn add_output_filter<F: Filter + 'static>(&self, filter: F) {
        lock(&self.output).get_or_insert_with(FilterChain::new).add_filter(filter);
    }

    /// Detach both chains. Bytes already queued are kept.
    pub fn clear_filters(&self) {
        *lock(&self.input) = None;
        *lock(&self.output) = None;
        debug!(controller = %self.config.name, "filters cleared");
    }

    // ---- receive path -----------------------------------------------------

    /// Entry point for every raw inbound byte.
    pub fn receive_from_device(&self, byte: u8) -> Result<(), LinkError> {
        let (produced, result) = {
            let mut input = lock(&self.input);
            match input.as_mut() {
                None => {
                    self.received.push(byte);
                    (1, Ok(()))
                }
                Some(chain) => {
                    let result = chain.write(byte);
                    let out = chain.drain();
                    self.received.extend(&out);
                    (out.len(), result)
                }
            }
        };

        lock(&self.counters).add_received(1, produced);
        result.or_else(|e| self.handle_receive_error(e))
    }

    /// Receive a burst from the transport, then notify subscribers once.
    ///
    /// A fatal error does not stop the burst: the input chain resynchronises on
    /// the next tag, so every byte is still fed. The first fatal error is
    /// returned afterwards.
    pub fn receive_bytes(&self, bytes: &[u8]) -> Result<(), LinkError> {
        let start = Instant::now();
        let mut first_err = None;
        for &b in bytes {
            if let Err(e) = self.receive_from_device(b) {
                first_err.get_or_insert(e);
            }
        }
        lock(&self.timer).add_stage_time(Stage::Receive, start.elapsed());

        if !self.received.is_empty() {
            self.notify(ControllerEvent::DataReceived { controller: self.config.name.clone() });
        }
        first_err.map_or(Ok(()), Err)
    }

    fn handle_receive_error(&self, e: FilterError) -> Result<(), LinkError> {
        if !e.is_recoverable() {
            warn!(controller = %self.config.name, error = %e, "fatal error on receive path");
            return Err(e.into());
        }

        let message = match e {
            FilterError::Protocol { message } => message,
            other => other.to_string(),
        };
        warn!(controller = %self.config.name, %message, "protocol error");
        lock(&self.counters).add_protocol_error();
        self.notify(ControllerEvent::Error {
            controller: self.config.name.clone(),
            message,
            at: Utc::now(),
        });
        Ok(())
    }

    // ---- consumer side ----------------------------------------------------

    pub fn read(&self) -> Option<u8> {
        self.received.pop()
    }

    /// Move up to `buf.len()` received bytes into `buf`.
    pub fn read_into(&self, buf: &mut [u8]) -> usize {
        self.received.pop_into(buf)
    }

    pub fn bytes_to_read(&self) -> usize {
        self.received.len()
    }

    /// Filter `data` and hand the result to the transport in one write.
    ///
    /// Returns the number of bytes written to the transport. Nothing is
    /// written when filtering yields no bytes. Whatever the chain produced is
    /// sent even when a stage failed; a fatal stage error is returned after.
    pub fn write(&self, data: &[u8]) -> Result<usize, LinkError> {
        let mut output = lock(&self.output);
        let start = Instant::now();

        let result = match output.as_mut() {
            None => {
                self.sending.extend(data);
                Ok(())
            }
            Some(chain) => {
                let result = chain.write_all(data);
                self.sending.extend(&chain.drain());
                result
            }
        };
        lock(&self.timer).add_stage_time(Stage::Send, start.elapsed());

        lock(&self.counters).add_sent(data.len(), 0);

        let sent = self.send_pending()?;
        match result {
            Err(e) if !e.is_recoverable() => Err(e.into()),
            Err(e) => {
                warn!(controller = %self.config.name, error = %e, "recoverable error on send path");
                Ok(sent)
            }
            Ok(()) => Ok(sent),
        }
    }

    pub fn write_byte(&self, byte: u8) -> Result<usize, LinkError> {
        self.write(&[byte])
    }

    /// Flush both chains: inbound leftovers go to the receive queue, outbound
    /// leftovers go to the transport in one write.
    pub fn flush(&self) -> Result<(), LinkError> {
        {
            let mut input = lock(&self.input);
            if let Some(chain) = input.as_mut() {
                let result = chain.flush();
                let out = chain.drain();
                self.received.extend(&out);
                lock(&self.counters).add_received(0, out.len());
                if let Err(e) = result {
                    self.handle_receive_error(e)?;
                }
            }
        }

        let mut output = lock(&self.output);
        let result = match output.as_mut() {
            Some(chain) => {
                let result = chain.flush();
                self.sending.extend(&chain.drain());
                result
            }
            None => Ok(()),
        };
        self.send_pending()?;
        result.map_err(LinkError::from)
    }

    /// Drain the send queue into a single transport write.
    ///
    /// Called with the output chain locked. On a transport failure the bytes go
    /// back to the front of the queue, since the encoder state already covers
    /// them, and the next successful write sends them first.
    fn send_pending(&self) -> Result<usize, LinkError> {
        let bytes = self.sending.drain();
        if bytes.is_empty() {
            return Ok(0);
        }

        let start = Instant::now();
        if let Err(e) = lock(&self.transport).write_bytes(&bytes) {
            self.sending.requeue_front(&bytes);
            warn!(controller = %self.config.name, len = bytes.len(), error = %e, "transport write failed, bytes requeued");
            return Err(e.into());
        }
        trace!(controller = %self.config.name, len = bytes.len(), "transport write");

        {
            let mut counters = lock(&self.counters);
            counters.add_sent(0, bytes.len());
            counters.add_transport_write();
        }
        lock(&self.timer).add_stage_time(Stage::Transport, start.elapsed());
        Ok(bytes.len())
    }

    // ---- events and telemetry ---------------------------------------------

    /// New listener for data and error notifications.
    pub fn subscribe(&self) -> Receiver<ControllerEvent> {
        let (tx, rx) = channel::unbounded();
        lock(&self.subscribers).push(tx);
        rx
    }

    fn notify(&self, event: ControllerEvent) {
        // Dropped receivers are pruned here.
        lock(&self.subscribers).retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub fn telemetry(&self) -> TelemetrySnapshot {
        let counters = lock(&self.counters).clone();
        let timer = lock(&self.timer).clone();
        TelemetrySnapshot::from(&counters, &timer)
    }

    /// Zero the counters and restart the session timer.
    pub fn reset_counters(&self) {
        *lock(&self.counters) = TelemetryCounters::default();
        *lock(&self.timer) = TelemetryTimer::new();
    }

    /// Run `f` with exclusive access to the transport.
    pub fn with_transport<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut lock(&self.transport))
    }
}

impl<T: Transport> std::fmt::Debug for Controller<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("name", &self.config.name)
            .field("bytes_to_read", &self.received.len())
            .finish()
    }
}
