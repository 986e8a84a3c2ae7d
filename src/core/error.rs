use std::io;
use std::time::Duration;
use thiserror::Error;

/// Custom error types for the fan controller client
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Timed out after {0:?} waiting for a response")]
    Timeout(Duration),

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Structural violations found in a response packet
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("invalid prefix")]
    InvalidPrefix,

    #[error("invalid protocol type")]
    InvalidProtocolType,

    #[error("invalid result function")]
    InvalidResultFunction,

    #[error("checksum mismatch: expected {expected:02X?}, got {actual:02X?}")]
    ChecksumMismatch {
        /// Checksum computed over the received bytes
        expected: [u8; 2],
        /// Checksum carried by the packet
        actual: [u8; 2],
    },

    #[error("truncated response")]
    Truncated,

    #[error("unsupported field marker 0x{0:02X}")]
    UnsupportedMarker(u8),
}

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Creates a new validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    /// Creates a new encoding error
    pub fn encoding(msg: impl Into<String>) -> Self {
        Error::Encoding(msg.into())
    }

    /// Creates a new network error
    pub fn network(msg: impl Into<String>) -> Self {
        Error::Network(msg.into())
    }

    /// Creates a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Returns the protocol violation, if this is one
    pub fn as_protocol(&self) -> Option<&ProtocolError> {
        match self {
            Error::Protocol(e) => Some(e),
            _ => None,
        }
    }
}
