//! UDP data stream receiver.
//!
//! This module provides [`StreamListener`], it binds the data port, counts
//! every datagram it receives and periodically reports throughput. The payload
//! is never inspected beyond a hex preview of the first packet.

use std::io;
use std::net::{SocketAddr, UdpSocket};
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::config::ListenerConfig;
use crate::errors::SdrError;
use crate::result::{StreamCounters, instant_rates};
use crate::utils::net_utils::{StopSignal, bind_reusable, hex_prefix, is_timeout};
use crate::utils::ui;

/// Bytes of the first datagram shown in the diagnostic line.
const PREVIEW_BYTES: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerState {
    Idle,
    Listening,
    Stopped,
}

/// Why the receive loop ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    Cancelled,
    TransportError(String),
}

#[derive(Debug)]
pub struct StreamListener {
    config: ListenerConfig,
    state: ListenerState,
    sock: Option<UdpSocket>,
    counters: Option<StreamCounters>,
}

impl StreamListener {
    pub fn new(config: ListenerConfig) -> Self {
        Self {
            config,
            state: ListenerState::Idle,
            sock: None,
            counters: None,
        }
    }

    pub fn state(&self) -> ListenerState {
        self.state
    }

    /// Counters so far; `None` until the socket has been bound.
    pub fn counters(&self) -> Option<StreamCounters> {
        self.counters
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.sock.as_ref().and_then(|s| s.local_addr().ok())
    }

    /// Binds the data port and starts the clock.
    ///
    /// # Errors
    ///
    /// - [`SdrError::InvalidArgument`] if the configuration is unusable or the
    ///   listener already left the idle state.
    /// - [`SdrError::BindFailed`] if the port cannot be bound.
    pub fn bind(&mut self) -> Result<SocketAddr, SdrError> {
        if self.state != ListenerState::Idle {
            return Err(SdrError::invalid("Listener can only be bound once"));
        }
        self.config.validate()?;

        let sock = bind_reusable(self.config.port, self.config.poll_timeout)
            .map_err(SdrError::BindFailed)?;
        let addr = sock.local_addr().map_err(SdrError::BindFailed)?;

        info!(%addr, "UDP receiver listening");
        self.sock = Some(sock);
        self.counters = Some(StreamCounters::new(Instant::now()));
        self.state = ListenerState::Listening;
        Ok(addr)
    }

    /// Runs the receive loop until `stop` fires or the socket fails.
    ///
    /// The stop signal is checked between receive attempts, so stopping takes
    /// at most one poll timeout. The socket is closed when this returns,
    /// whatever the reason.
    ///
    /// # Errors
    ///
    /// Returns [`SdrError::NotListening`] if [`bind`](Self::bind) has not succeeded.
    pub fn run(&mut self, stop: &StopSignal) -> Result<StopReason, SdrError> {
        self.run_with(stop, |sock, buf| sock.recv_from(buf))
    }

    /// Receive loop with the receive step supplied by the caller.
    pub(crate) fn run_with<F>(&mut self, stop: &StopSignal, mut recv: F) -> Result<StopReason, SdrError>
    where
        F: FnMut(&UdpSocket, &mut [u8]) -> io::Result<(usize, SocketAddr)>,
    {
        let (Some(sock), Some(mut counters)) = (self.sock.take(), self.counters) else {
            return Err(SdrError::NotListening);
        };

        let mut buf = vec![0u8; self.config.buffer_size];

        let reason = loop {
            if stop.is_stopped() {
                break StopReason::Cancelled;
            }

            match recv(&sock, &mut buf) {
                Ok((len, from)) => {
                    let now = Instant::now();
                    counters.record(len, now);
                    self.counters = Some(counters);

                    if self.config.verbose {
                        debug!(%from, len, "datagram");
                    }

                    if counters.packets_received == 1 {
                        ui::print_first_packet(from, len, &hex_prefix(&buf[..len], PREVIEW_BYTES));
                    }

                    if counters.packets_received % self.config.report_every == 0 {
                        ui::print_progress(&counters, &instant_rates(&counters, now));
                    }
                }
                Err(e) if is_timeout(&e) => continue,
                Err(e) => {
                    warn!(error = %e, "error receiving data");
                    break StopReason::TransportError(e.to_string());
                }
            }
        };

        drop(sock);
        self.state = ListenerState::Stopped;
        info!(?reason, "UDP receiver stopped");
        Ok(reason)
    }

    /// Binds and runs in one go, returning the final counters.
    pub fn listen(&mut self, stop: &StopSignal) -> Result<(StopReason, StreamCounters), SdrError> {
        self.bind()?;
        let reason = self.run(stop)?;
        let counters = self.counters.ok_or(SdrError::NotListening)?;
        Ok((reason, counters))
    }
}
