//! Blocking request/response client for the device control port.
//!
//! This module provides [`CommandChannel`], one owned UDP socket that sends a
//! single text command and waits for exactly one reply datagram, or gives up
//! after the configured timeout.

use std::net::{SocketAddr, UdpSocket};
use std::time::Duration;

use tracing::debug;

use crate::config::ControllerConfig;
use crate::errors::SdrError;
use crate::utils::net_utils::{ephemeral_for, is_timeout, resolve_endpoint};

/// Replies are single short text lines.
pub const RESPONSE_BUFFER_SIZE: usize = 1024;

/// Anything that can carry one command line to the device and bring back its reply.
pub trait CommandTransport {
    fn send(&mut self, command: &str) -> Result<String, SdrError>;
}

#[derive(Debug)]
pub struct CommandChannel {
    sock: UdpSocket,
    /// Device control endpoint, fixed for the lifetime of the channel.
    target: SocketAddr,
    timeout: Duration,
    buf: Vec<u8>,
}

impl CommandChannel {
    /// Resolves the device address and binds an ephemeral local socket for it.
    ///
    /// # Errors
    ///
    /// - [`SdrError::InvalidArgument`] if `timeout` is zero.
    /// - [`SdrError::InvalidAddress`] if the host does not resolve.
    /// - [`SdrError::BindFailed`] if no local socket could be bound.
    pub fn new(host: &str, port: u16, timeout: Duration) -> Result<Self, SdrError> {
        if timeout.is_zero() {
            return Err(SdrError::invalid("Timeout must be greater than zero"));
        }

        let target = resolve_endpoint(host, port)?;
        let sock = UdpSocket::bind(ephemeral_for(&target)).map_err(SdrError::BindFailed)?;
        sock.set_read_timeout(Some(timeout))
            .map_err(SdrError::Transport)?;

        debug!(endpoint = %target, local = ?sock.local_addr().ok(), "control channel ready");

        Ok(Self {
            sock,
            target,
            timeout,
            buf: vec![0u8; RESPONSE_BUFFER_SIZE],
        })
    }

    pub fn from_config(config: &ControllerConfig) -> Result<Self, SdrError> {
        Self::new(&config.host, config.port, config.timeout)
    }

    pub fn target(&self) -> SocketAddr {
        self.target
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl CommandTransport for CommandChannel {
    /// Sends `command` as one datagram and returns the first datagram that comes back.
    ///
    /// The reply is not matched against the request; the protocol relies on
    /// strict one-request-one-response ordering on this socket.
    fn send(&mut self, command: &str) -> Result<String, SdrError> {
        debug!(endpoint = %self.target, command, "sending command");

        self.sock
            .send_to(command.as_bytes(), self.target)
            .map_err(SdrError::Transport)?;

        let (len, from) = self.sock.recv_from(&mut self.buf).map_err(|e| {
            if is_timeout(&e) {
                SdrError::Timeout(self.target)
            } else {
                SdrError::Transport(e)
            }
        })?;

        let response = decode_response(&self.buf[..len]);
        debug!(%from, response = %response, "received response");
        Ok(response)
    }
}

pub(crate) fn decode_response(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).trim_end().to_string()
}
