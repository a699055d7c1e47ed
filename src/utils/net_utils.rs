use std::io;
use std::net::{Ipv4Addr, SocketAddr, ToSocketAddrs, UdpSocket};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use socket2::{Domain, Protocol, Socket, Type};

use crate::errors::SdrError;

/// Cooperative cancellation token shared between a run loop and whoever wants it stopped.
///
/// Cloning is cheap; every clone observes the same flag.
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    stopped: Arc<AtomicBool>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

/// Resolves `host:port` to the first usable socket address.
pub fn resolve_endpoint(host: &str, port: u16) -> Result<SocketAddr, SdrError> {
    (host, port)
        .to_socket_addrs()
        .map_err(|e| SdrError::InvalidAddress(format!("{host}:{port} ({e})")))?
        .next()
        .ok_or_else(|| SdrError::InvalidAddress(format!("{host}:{port}")))
}

/// Address of an ephemeral local port in the same family as `peer`.
pub(crate) fn ephemeral_for(peer: &SocketAddr) -> SocketAddr {
    match peer {
        SocketAddr::V4(_) => SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0)),
        SocketAddr::V6(_) => SocketAddr::from(([0u16; 8], 0)),
    }
}

/// Binds a UDP socket on every interface with `SO_REUSEADDR` set, so a
/// restarted receiver can grab the data port again immediately.
pub fn bind_reusable(port: u16, read_timeout: Duration) -> io::Result<UdpSocket> {
    let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;
    socket.set_reuse_address(true)?;

    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
    socket.bind(&addr.into())?;

    let sock: UdpSocket = socket.into();
    sock.set_read_timeout(Some(read_timeout))?;
    Ok(sock)
}

/// Read timeouts surface as `WouldBlock` on unix and `TimedOut` on windows.
pub(crate) fn is_timeout(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
    )
}

/// Lowercase hex of at most the first `limit` bytes.
pub fn hex_prefix(data: &[u8], limit: usize) -> String {
    data.iter()
        .take(limit)
        .map(|b| format!("{b:02x}"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_signal_is_shared_between_clones() {
        let signal = StopSignal::new();
        let other = signal.clone();
        assert!(!other.is_stopped());
        signal.stop();
        assert!(other.is_stopped());
    }

    #[test]
    fn test_hex_prefix_truncates() {
        let data: Vec<u8> = (0u8..32).collect();
        assert_eq!(
            hex_prefix(&data, 16),
            "000102030405060708090a0b0c0d0e0f"
        );
        assert_eq!(hex_prefix(&[0xab, 0xcd], 16), "abcd");
        assert_eq!(hex_prefix(&[], 16), "");
    }

    #[test]
    fn test_resolve_endpoint() {
        let addr = resolve_endpoint("127.0.0.1", 12346).unwrap();
        assert_eq!(addr, "127.0.0.1:12346".parse::<SocketAddr>().unwrap());
    }

    #[test]
    fn test_bind_reusable_allows_rebinding() {
        let first = bind_reusable(0, Duration::from_millis(50)).unwrap();
        let port = first.local_addr().unwrap().port();
        drop(first);
        let second = bind_reusable(port, Duration::from_millis(50)).unwrap();
        assert_eq!(second.local_addr().unwrap().port(), port);
    }
}
