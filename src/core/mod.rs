//! Core types and traits for the fan controller client
//!
//! This module contains the fundamental building blocks used throughout the library.

pub mod config;
pub mod error;
pub mod types;
pub mod serde;

use std::time::Duration;

pub use self::config::ClientConfig;
pub use self::error::{Error, ProtocolError, Result};
pub use self::types::{
    speed_code,
    Credentials,
    DeviceStatus,
    Direction,
    Mode,
    ProtocolVersion,
    FAN_SPEEDS,
};

/// Default UDP port of the controller
pub const DEFAULT_PORT: u16 = 4000;

/// Receive timeout for one request/response exchange
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Receive buffer size for a response datagram
pub const MAX_PACKET_SIZE: usize = 256;
