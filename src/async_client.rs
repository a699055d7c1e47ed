//! Asynchronous control channel for callers already running inside tokio.
//!
//! This module provides [`AsyncCommandChannel`], the same one-request,
//! one-reply exchange as [`CommandChannel`](crate::CommandChannel), on a tokio
//! `UdpSocket` with `tokio::time::timeout` bounding the wait.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::UdpSocket;
use tracing::debug;

use crate::client::{RESPONSE_BUFFER_SIZE, decode_response};
use crate::command::Command;
use crate::errors::SdrError;
use crate::utils::net_utils::{ephemeral_for, resolve_endpoint};

#[derive(Debug)]
pub struct AsyncCommandChannel {
    sock: UdpSocket,
    target: SocketAddr,
    timeout: Duration,
    buf: Vec<u8>,
}

impl AsyncCommandChannel {
    /// Resolves the device address and binds an ephemeral local tokio socket.
    ///
    /// # Errors
    ///
    /// Same as [`CommandChannel::new`](crate::CommandChannel::new).
    pub async fn new(host: &str, port: u16, timeout: Duration) -> Result<Self, SdrError> {
        if timeout.is_zero() {
            return Err(SdrError::invalid("Timeout must be greater than zero"));
        }

        let target = resolve_endpoint(host, port)?;
        let sock = UdpSocket::bind(ephemeral_for(&target))
            .await
            .map_err(SdrError::BindFailed)?;

        Ok(Self {
            sock,
            target,
            timeout,
            buf: vec![0u8; RESPONSE_BUFFER_SIZE],
        })
    }

    pub fn target(&self) -> SocketAddr {
        self.target
    }

    pub async fn send(&mut self, command: &str) -> Result<String, SdrError> {
        debug!(endpoint = %self.target, command, "sending command");

        self.sock
            .send_to(command.as_bytes(), self.target)
            .await
            .map_err(SdrError::Transport)?;

        let (len, _) = tokio::time::timeout(self.timeout, self.sock.recv_from(&mut self.buf))
            .await
            .map_err(|_| SdrError::Timeout(self.target))?
            .map_err(SdrError::Transport)?;

        Ok(decode_response(&self.buf[..len]))
    }

    /// Validates `command` locally, then sends it.
    pub async fn execute(&mut self, command: &Command) -> Result<String, SdrError> {
        command.validate()?;
        self.send(&command.to_string()).await
    }
}

#[cfg(test)]
mod async_channel_tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn test_async_round_trip() {
        let device = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let port = device.local_addr().unwrap().port();

        let responder = tokio::spawn(async move {
            let mut buf = [0u8; 256];
            let (len, from) = device.recv_from(&mut buf).await.unwrap();
            device.send_to(b"OK: DAC bypass enabled\n", from).await.unwrap();
            String::from_utf8_lossy(&buf[..len]).to_string()
        });

        let mut channel = AsyncCommandChannel::new("127.0.0.1", port, Duration::from_secs(1))
            .await
            .unwrap();
        let reply = channel.execute(&Command::SetDacBypass(true)).await.unwrap();

        assert_eq!(reply, "OK: DAC bypass enabled");
        assert_eq!(responder.await.unwrap(), "set_dac_bypass 1");
    }

    #[tokio::test]
    async fn test_async_timeout() {
        let silent = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let port = silent.local_addr().unwrap().port();
        let timeout = Duration::from_millis(150);

        let mut channel = AsyncCommandChannel::new("127.0.0.1", port, timeout)
            .await
            .unwrap();

        let start = Instant::now();
        let result = channel.send("get_status").await;

        assert!(matches!(result, Err(SdrError::Timeout(_))));
        assert!(start.elapsed() >= timeout);
        assert!(start.elapsed() < timeout + Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_async_invalid_command_not_sent() {
        let device = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let port = device.local_addr().unwrap().port();

        let mut channel = AsyncCommandChannel::new("127.0.0.1", port, Duration::from_millis(100))
            .await
            .unwrap();
        let result = channel.execute(&Command::SetBuffer(500)).await;
        assert!(matches!(result, Err(SdrError::InvalidArgument(_))));

        let mut buf = [0u8; 64];
        assert!(device.try_recv_from(&mut buf).is_err(), "nothing should reach the device");
    }
}
