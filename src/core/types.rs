use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Deserialize};

use super::error::{Error, Result};

/// Speed settings accepted by the controller, as sent on the wire
pub const FAN_SPEEDS: [&str; 3] = ["01", "02", "03"];

/// Device id and password embedded in every V2 packet
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Credentials {
    /// Controller id, usually the 16 character serial
    pub device_id: String,
    /// Controller password
    pub password: String,
}

impl Credentials {
    /// Creates a new credential pair
    pub fn new(device_id: impl Into<String>, password: impl Into<String>) -> Self {
        Credentials {
            device_id: device_id.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("device_id", &self.device_id)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Airflow direction of the fan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Pull air out of the room
    Forward,
    /// Periodically switch between forward and reverse (heat recovery)
    Alternating,
    /// Pull air into the room from outside
    Reverse,
}

impl Direction {
    /// Looks up a direction from its wire code
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0x00 => Some(Direction::Forward),
            0x01 => Some(Direction::Alternating),
            0x02 => Some(Direction::Reverse),
            _ => None,
        }
    }

    /// Returns the wire code for this direction
    pub fn code(&self) -> u8 {
        match self {
            Direction::Forward => 0x00,
            Direction::Alternating => 0x01,
            Direction::Reverse => 0x02,
        }
    }

    /// Returns the lowercase name used in status records
    pub fn name(&self) -> &'static str {
        match self {
            Direction::Forward => "forward",
            Direction::Alternating => "alternating",
            Direction::Reverse => "reverse",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Accepts either a raw two digit wire code ("00", "01", "02") or a name
impl FromStr for Direction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let by_name = [Direction::Forward, Direction::Alternating, Direction::Reverse]
            .into_iter()
            .find(|d| d.name() == s);
        if let Some(direction) = by_name {
            return Ok(direction);
        }

        if s.len() == 2 && s.bytes().all(|b| b.is_ascii_hexdigit()) {
            if let Some(direction) = u8::from_str_radix(s, 16).ok().and_then(Direction::from_code) {
                return Ok(direction);
            }
        }

        Err(Error::validation(format!("Invalid fan direction: {}", s)))
    }
}

/// Preset mode reported by the controller
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Auto,
    Sleep,
    Party,
}

impl Mode {
    /// Looks up a mode from its wire code; unknown codes are not an error
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0x01 => Some(Mode::Sleep),
            0x02 => Some(Mode::Party),
            _ => None,
        }
    }
}

/// Validates a requested speed and returns its wire byte
pub fn speed_code(speed: &str) -> Result<u8> {
    if !FAN_SPEEDS.contains(&speed) {
        return Err(Error::validation(format!("Invalid fan speed: {}", speed)));
    }
    u8::from_str_radix(speed, 16)
        .map_err(|e| Error::validation(format!("Invalid fan speed {}: {}", speed, e)))
}

/// Snapshot of the controller state, rebuilt from every status read
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceStatus {
    /// Whether the fan is running
    pub is_on: bool,
    /// Speed as a two digit decimal string ("00" when unknown)
    pub speed: String,
    /// Whether the fan alternates airflow direction
    pub oscillating: bool,
    /// Current airflow direction, if reported
    pub direction: Option<Direction>,
    /// Current preset mode
    pub mode: Mode,
}

/// Wire protocol spoken by the controller
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ProtocolVersion {
    /// Legacy "mobile" framed protocol without authentication
    V1,
    /// Authenticated, checksummed field protocol
    #[default]
    V2,
}

impl TryFrom<u8> for ProtocolVersion {
    type Error = Error;

    fn try_from(version: u8) -> Result<Self> {
        match version {
            1 => Ok(ProtocolVersion::V1),
            2 => Ok(ProtocolVersion::V2),
            other => Err(Error::config(format!("Unsupported protocol version: {}", other))),
        }
    }
}

impl From<ProtocolVersion> for u8 {
    fn from(version: ProtocolVersion) -> u8 {
        match version {
            ProtocolVersion::V1 => 1,
            ProtocolVersion::V2 => 2,
        }
    }
}
