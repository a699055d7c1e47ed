use std::{io, net::SocketAddr};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdrError {
    /// Rejected locally, nothing was sent.
    #[error("{0}")]
    InvalidArgument(String),

    #[error("Timeout - no response from {0}")]
    Timeout(SocketAddr),

    #[error("{0}")]
    Transport(io::Error),

    #[error("Failed to bind socket address: {0}")]
    BindFailed(io::Error),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Unknown command '{0}'")]
    UnknownCommand(String),

    #[error("Listener is not bound")]
    NotListening,
}

impl SdrError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        SdrError::InvalidArgument(reason.into())
    }

    /// Renders the error the way the control protocol reports failures.
    pub fn to_response(&self) -> String {
        format!("ERROR: {self}")
    }
}

/// Collapses a command outcome into the single human-readable line shown to the user.
pub fn response_text(result: Result<String, SdrError>) -> String {
    match result {
        Ok(response) => response,
        Err(e) => e.to_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_strings_match_protocol_form() {
        let addr: SocketAddr = "192.168.1.12:12346".parse().unwrap();
        assert_eq!(
            SdrError::Timeout(addr).to_response(),
            "ERROR: Timeout - no response from 192.168.1.12:12346"
        );
        assert_eq!(
            SdrError::invalid("Mode must be 0 or 1").to_response(),
            "ERROR: Mode must be 0 or 1"
        );
        assert_eq!(
            SdrError::UnknownCommand("bogus".into()).to_response(),
            "ERROR: Unknown command 'bogus'"
        );
    }

    #[test]
    fn test_response_text_passes_success_through() {
        assert_eq!(response_text(Ok("OK".into())), "OK");
        assert_eq!(
            response_text(Err(SdrError::invalid("bad"))),
            "ERROR: bad"
        );
    }
}
