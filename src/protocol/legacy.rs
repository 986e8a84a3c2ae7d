//! Legacy V1 protocol
//!
//! Older controllers speak an unauthenticated protocol: the ASCII prefix
//! `mobile`, the command bytes and a CRLF. Every reply is a fixed layout
//! status frame.

use bytes::{BufMut, BytesMut};

use crate::core::{DeviceStatus, Direction, Mode, ProtocolError, Result};

/// ASCII "mobile"
pub const FRAME_PREFIX: [u8; 6] = *b"mobile";

/// CRLF
pub const FRAME_POSTFIX: [u8; 2] = [0x0D, 0x0A];

/// Offset of the power byte in a status frame
pub const POWER_OFFSET: usize = 7;
/// Offset of the mode byte in a status frame
pub const MODE_OFFSET: usize = 9;
/// Offset of the speed byte in a status frame
pub const SPEED_OFFSET: usize = 19;
/// Offset of the direction byte in a status frame
pub const DIRECTION_OFFSET: usize = 23;

const POWER_ON: u8 = 0x01;

/// Commands understood by V1 controllers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegacyCommand {
    Status,
    /// Flips the power state
    TogglePower,
    Speed(u8),
    Direction(Direction),
    Sleep,
    Party,
}

impl LegacyCommand {
    fn put(&self, dst: &mut BytesMut) {
        match *self {
            LegacyCommand::Status => dst.put_u8(0x01),
            LegacyCommand::TogglePower => dst.put_u8(0x03),
            LegacyCommand::Speed(speed) => dst.put_slice(&[0x04, speed]),
            LegacyCommand::Direction(direction) => dst.put_slice(&[0x06, direction.code()]),
            LegacyCommand::Sleep => dst.put_slice(&[0x09, 0x01]),
            LegacyCommand::Party => dst.put_slice(&[0x09, 0x02]),
        }
    }
}

/// Builds a complete V1 request frame
pub fn encode_frame(command: LegacyCommand) -> BytesMut {
    let mut dst = BytesMut::with_capacity(FRAME_PREFIX.len() + 2 + FRAME_POSTFIX.len());
    dst.put_slice(&FRAME_PREFIX);
    command.put(&mut dst);
    dst.put_slice(&FRAME_POSTFIX);
    dst
}

/// Raw values read from a V1 status frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegacyFrame {
    pub power: u8,
    pub mode: u8,
    pub speed: u8,
    pub direction: u8,
}

impl LegacyFrame {
    /// Reads the fixed offsets of a status frame
    pub fn parse(frame: &[u8]) -> Result<Self> {
        let at = |offset: usize| frame.get(offset).copied().ok_or(ProtocolError::Truncated);
        Ok(LegacyFrame {
            power: at(POWER_OFFSET)?,
            mode: at(MODE_OFFSET)?,
            speed: at(SPEED_OFFSET)?,
            direction: at(DIRECTION_OFFSET)?,
        })
    }

    /// Returns true if the fan is running
    pub fn is_on(&self) -> bool {
        self.power == POWER_ON
    }

    /// Translates the frame into a status record
    pub fn status(&self) -> DeviceStatus {
        let direction = Direction::from_code(self.direction);
        DeviceStatus {
            is_on: self.is_on(),
            speed: format!("{:02}", self.speed),
            oscillating: direction.map_or(true, |d| d == Direction::Alternating),
            direction,
            mode: Mode::from_code(self.mode).unwrap_or_default(),
        }
    }
}
