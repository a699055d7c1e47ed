//! Runtime settings for the controller and the stream receiver.

use std::time::Duration;

use crate::errors::SdrError;
use crate::{DEFAULT_CONTROL_PORT, DEFAULT_DATA_PORT};

/// Where the control channel talks to and how long it waits for a reply.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Board hostname or IP address.
    pub host: String,
    pub port: u16,
    /// Upper bound on each request/response exchange.
    pub timeout: Duration,
}

impl ControllerConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_CONTROL_PORT,
            timeout: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ListenerConfig {
    /// Local UDP port the data stream arrives on.
    pub port: u16,

    /// Receive buffer per datagram; larger datagrams are truncated.
    pub buffer_size: usize,

    /// How long a single receive may block before the stop signal is checked again.
    pub poll_timeout: Duration,

    /// Emit a rate snapshot every this many packets.
    pub report_every: u64,

    /// Log every datagram at debug level.
    pub verbose: bool,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_DATA_PORT,
            buffer_size: 4096,
            poll_timeout: Duration::from_secs(1),
            report_every: 100,
            verbose: false,
        }
    }
}

impl ListenerConfig {
    pub fn validate(&self) -> Result<(), SdrError> {
        if self.buffer_size == 0 {
            return Err(SdrError::invalid("Receive buffer size must be positive"));
        }
        if self.poll_timeout.is_zero() {
            return Err(SdrError::invalid("Poll timeout must be positive"));
        }
        if self.report_every == 0 {
            return Err(SdrError::invalid("Report interval must be at least one packet"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_protocol_ports() {
        let ctl = ControllerConfig::new("192.168.1.12");
        assert_eq!(ctl.port, 12346);
        assert_eq!(ctl.timeout, Duration::from_secs(5));

        let listener = ListenerConfig::default();
        assert_eq!(listener.port, 12345);
        assert_eq!(listener.buffer_size, 4096);
        assert!(listener.validate().is_ok());
    }

    #[test]
    fn test_listener_rejects_degenerate_settings() {
        let mut config = ListenerConfig::default();
        config.buffer_size = 0;
        assert!(config.validate().is_err());

        let mut config = ListenerConfig::default();
        config.poll_timeout = Duration::ZERO;
        assert!(config.validate().is_err());

        let mut config = ListenerConfig::default();
        config.report_every = 0;
        assert_eq!(
            config.validate().unwrap_err().to_string(),
            "Report interval must be at least one packet"
        );
    }
}
