//! TwinFresh: client for Siku/TwinFresh ventilation fan controllers
//!
//! This library speaks the controllers' UDP control protocol. It builds
//! authenticated command packets, exchanges them with the controller, verifies
//! the replies and decodes their field stream into a [`DeviceStatus`].
//!
//! It has no opinion on how it is hosted: callers construct a client, call its
//! command methods, and get plain status records or [`Error`]s back.

pub mod client;
pub mod core;
pub mod network;
pub mod protocol;
pub mod util;

// Re-export commonly used items
pub use crate::client::{Controller, EventSink, ExchangeEvent, FanClient, LegacyFanClient, NullSink, TracingSink};
pub use crate::core::{
    ClientConfig, Credentials, DeviceStatus, Direction, Error, Mode, ProtocolError,
    ProtocolVersion, Result,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
