//! Protocol implementation module
//!
//! This module defines the controller's wire format: packet framing and
//! checksums, the response field stream, translation of fields into a
//! [`DeviceStatus`](crate::core::DeviceStatus), and the legacy V1 frames.

pub mod checksum;
pub mod codec;
pub mod legacy;
pub mod parser;
pub mod translate;

use std::fmt;

pub use self::checksum::{checksum, verify_checksum};
pub use self::codec::{decode_tokens, PacketCodec, Request};
pub use self::parser::{parse_response, FieldEncoding, ResponseFields};
pub use self::translate::translate;

/// Magic bytes opening every packet
pub const PACKET_PREFIX: [u8; 2] = [0xFD, 0xFD];

/// Protocol type byte following the prefix
pub const PACKET_PROTOCOL_TYPE: u8 = 0x02;

/// Size class marker preceding the id block
pub const PACKET_SIZE_ID: u8 = 0x10;

/// Length of the trailing checksum
pub const CHECKSUM_LEN: usize = 2;

/// Function code selecting the semantics of a packet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FunctionCode {
    Read = 0x01,
    Write = 0x02,
    ReadWrite = 0x03,
    Increment = 0x04,
    Decrement = 0x05,
    /// Sent by the controller in reply to read, read-write, increment and decrement
    Result = 0x06,
}

impl FunctionCode {
    /// Returns the wire byte
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// One byte identifier of a controller attribute.
///
/// Codes the client does not know are kept as-is so they can pass through
/// a parsed response untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Command(pub u8);

impl Command {
    pub const ON_OFF: Command = Command(0x01);
    pub const SPEED: Command = Command(0x02);
    pub const MODE: Command = Command(0x07);
    pub const CURRENT_HUMIDITY: Command = Command(0x25);
    pub const DIRECTION: Command = Command(0xB7);
    pub const DEVICE_TYPE: Command = Command(0xB9);

    /// Returns the wire byte
    pub fn code(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02X}", self.0)
    }
}

/// Values written to [`Command::ON_OFF`]
pub mod power {
    pub const OFF: u8 = 0x00;
    pub const ON: u8 = 0x01;
    pub const TOGGLE: u8 = 0x02;
}

/// Values written to [`Command::MODE`]
pub mod mode {
    pub const SLEEP: u8 = 0x01;
    pub const PARTY: u8 = 0x02;
}

/// Reserved bytes in a response that change how the next field is framed
pub mod marker {
    pub const CHANGE_FUNCTION: u8 = 0xFC;
    pub const INVALID: u8 = 0xFD;
    pub const VALUE_SIZE: u8 = 0xFE;
    pub const HIGH_BYTE: u8 = 0xFF;
}
