//! Response field parser
//!
//! After the header, a response is a stream of fields. Each field starts
//! either with a command code or with one of the reserved marker bytes in
//! [`marker`](super::marker), which changes how the bytes that follow are framed.

use std::collections::BTreeMap;

use crate::core::{ProtocolError, Result};
use super::checksum::checksum;
use super::{marker, Command, FunctionCode, CHECKSUM_LEN, PACKET_PREFIX, PACKET_PROTOCOL_TYPE};

/// How the field starting at a given token is framed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldEncoding {
    /// `command value`
    Plain,
    /// `FD command`: the controller rejected the command
    Invalid,
    /// `FE size command value...`: multi-byte value, least significant byte first
    ExplicitSize,
    /// A marker whose framing is not supported
    Unsupported(u8),
}

impl FieldEncoding {
    /// Classifies the first token of a field
    pub fn classify(token: u8) -> Self {
        match token {
            marker::INVALID => FieldEncoding::Invalid,
            marker::VALUE_SIZE => FieldEncoding::ExplicitSize,
            marker::CHANGE_FUNCTION | marker::HIGH_BYTE => FieldEncoding::Unsupported(token),
            _ => FieldEncoding::Plain,
        }
    }
}

/// Command values decoded from one response.
///
/// Values are stored most significant byte first. A command that appears
/// twice keeps its last value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseFields {
    /// `None` marks a command the controller rejected
    fields: BTreeMap<Command, Option<Vec<u8>>>,
}

impl ResponseFields {
    /// Creates an empty field map
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a value for `command`
    pub fn insert(&mut self, command: Command, value: Vec<u8>) {
        self.fields.insert(command, Some(value));
    }

    /// Records that the controller rejected `command`
    pub fn insert_rejected(&mut self, command: Command) {
        self.fields.insert(command, None);
    }

    /// Returns the value bytes of `command`, if present and not rejected
    pub fn get(&self, command: Command) -> Option<&[u8]> {
        self.fields.get(&command)?.as_deref()
    }

    /// Returns the least significant byte of `command`'s value
    pub fn byte(&self, command: Command) -> Option<u8> {
        self.get(command)?.last().copied()
    }

    /// Returns the value of `command` as an unsigned big-endian number
    pub fn number(&self, command: Command) -> Option<u64> {
        let value = self.get(command)?;
        if value.is_empty() || value.len() > 8 {
            return None;
        }
        Some(value.iter().fold(0u64, |acc, &b| (acc << 8) | u64::from(b)))
    }

    /// Returns true if `command` appeared in the response in any form
    pub fn contains(&self, command: Command) -> bool {
        self.fields.contains_key(&command)
    }

    /// Returns true if the controller rejected `command`
    pub fn is_rejected(&self, command: Command) -> bool {
        matches!(self.fields.get(&command), Some(None))
    }

    /// Commands the controller rejected
    pub fn rejected(&self) -> impl Iterator<Item = Command> + '_ {
        self.fields
            .iter()
            .filter(|(_, value)| value.is_none())
            .map(|(command, _)| *command)
    }

    /// All fields in command order
    pub fn iter(&self) -> impl Iterator<Item = (Command, Option<&[u8]>)> + '_ {
        self.fields.iter().map(|(command, value)| (*command, value.as_deref()))
    }

    /// Number of distinct commands
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true when no fields were decoded
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Bounded read position over the token stream
struct Cursor<'a> {
    tokens: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(tokens: &'a [u8]) -> Self {
        Cursor { tokens, pos: 0 }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn next(&mut self) -> std::result::Result<u8, ProtocolError> {
        let token = *self.tokens.get(self.pos).ok_or(ProtocolError::Truncated)?;
        self.pos += 1;
        Ok(token)
    }

    fn take(&mut self, n: usize) -> std::result::Result<&'a [u8], ProtocolError> {
        let end = self.pos.checked_add(n).ok_or(ProtocolError::Truncated)?;
        let slice = self.tokens.get(self.pos..end).ok_or(ProtocolError::Truncated)?;
        self.pos = end;
        Ok(slice)
    }
}

/// Validates a packet header and returns the offset of its payload.
///
/// `tokens` must not include the trailing checksum.
pub fn parse_header(tokens: &[u8], function: FunctionCode) -> Result<usize> {
    let mut cursor = Cursor::new(tokens);
    read_header(&mut cursor, function)?;
    Ok(cursor.pos)
}

fn read_header(cursor: &mut Cursor<'_>, function: FunctionCode) -> std::result::Result<(), ProtocolError> {
    if cursor.take(PACKET_PREFIX.len())? != &PACKET_PREFIX[..] {
        return Err(ProtocolError::InvalidPrefix);
    }
    if cursor.next()? != PACKET_PROTOCOL_TYPE {
        return Err(ProtocolError::InvalidProtocolType);
    }

    // size class marker
    cursor.next()?;

    let id_len = cursor.next()?;
    cursor.take(usize::from(id_len))?;
    let password_len = cursor.next()?;
    cursor.take(usize::from(password_len))?;

    if cursor.next()? != function.code() {
        return Err(ProtocolError::InvalidResultFunction);
    }
    Ok(())
}

/// Verifies and parses a response packet into its fields.
///
/// Structural problems (checksum, prefix, protocol type, result function,
/// truncation, unsupported markers) are errors. Which fields are present is
/// not checked.
pub fn parse_response(tokens: &[u8]) -> Result<ResponseFields> {
    if tokens.len() < CHECKSUM_LEN {
        return Err(ProtocolError::Truncated.into());
    }
    let (body, claimed) = tokens.split_at(tokens.len() - CHECKSUM_LEN);
    let claimed = [claimed[0], claimed[1]];
    let expected = checksum(body);
    if expected != claimed {
        return Err(ProtocolError::ChecksumMismatch { expected, actual: claimed }.into());
    }

    let mut cursor = Cursor::new(body);
    read_header(&mut cursor, FunctionCode::Result)?;

    let mut fields = ResponseFields::new();
    while !cursor.at_end() {
        let token = cursor.next()?;
        match FieldEncoding::classify(token) {
            FieldEncoding::Plain => {
                let value = cursor.next()?;
                tracing::trace!(command = %Command(token), value, "plain field");
                fields.insert(Command(token), vec![value]);
            }
            FieldEncoding::Invalid => {
                let command = Command(cursor.next()?);
                tracing::trace!(%command, "controller rejected command");
                fields.insert_rejected(command);
            }
            FieldEncoding::ExplicitSize => {
                let size = cursor.next()?;
                let command = Command(cursor.next()?);
                let mut value = cursor.take(usize::from(size))?.to_vec();
                value.reverse();
                tracing::trace!(%command, ?value, "sized field");
                fields.insert(command, value);
            }
            FieldEncoding::Unsupported(m) => {
                return Err(ProtocolError::UnsupportedMarker(m).into());
            }
        }
    }

    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Credentials, Error};
    use crate::protocol::{PacketCodec, Request};

    fn response(fields: &[u8]) -> Vec<u8> {
        PacketCodec::new(Credentials::new("A1", "pw"))
            .to_bytes(&Request::new(FunctionCode::Result, fields.to_vec()))
            .unwrap()
            .to_vec()
    }

    fn protocol_error(result: Result<ResponseFields>) -> ProtocolError {
        match result {
            Err(Error::Protocol(e)) => e,
            other => panic!("expected protocol error, got {:?}", other),
        }
    }

    /// Rewrites the trailing checksum after a test mutated the packet
    fn reseal(packet: &mut Vec<u8>) {
        let len = packet.len();
        let sum = checksum(&packet[..len - 2]);
        packet[len - 2..].copy_from_slice(&sum);
    }

    #[test]
    fn test_plain_fields() {
        let fields = parse_response(&response(&[0x01, 0x01, 0x02, 0x03])).unwrap();
        assert_eq!(fields.get(Command::ON_OFF), Some(&[0x01][..]));
        assert_eq!(fields.get(Command::SPEED), Some(&[0x03][..]));
        assert_eq!(fields.len(), 2);
    }

    #[test]
    fn test_each_field_encoding() {
        let stream = [
            0x01, 0x01, // plain on/off = 1
            0xFD, 0x25, // humidity rejected
            0xFE, 0x02, 0xB9, 0x05, 0x11, // device type, two bytes, LSB first
            0x02, 0x02, // plain speed = 2
        ];
        let fields = parse_response(&response(&stream)).unwrap();

        assert_eq!(fields.get(Command::ON_OFF), Some(&[0x01][..]));
        assert_eq!(fields.get(Command::SPEED), Some(&[0x02][..]));
        assert_eq!(fields.get(Command::DEVICE_TYPE), Some(&[0x11, 0x05][..]));
        assert_eq!(fields.number(Command::DEVICE_TYPE), Some(0x1105));
        assert!(fields.contains(Command::CURRENT_HUMIDITY));
        assert!(fields.is_rejected(Command::CURRENT_HUMIDITY));
        assert_eq!(fields.get(Command::CURRENT_HUMIDITY), None);
        assert_eq!(fields.rejected().collect::<Vec<_>>(), vec![Command::CURRENT_HUMIDITY]);
    }

    #[test]
    fn test_unsupported_markers_fail() {
        for m in [marker::CHANGE_FUNCTION, marker::HIGH_BYTE] {
            let err = protocol_error(parse_response(&response(&[0x01, 0x01, m, 0x02, 0x03])));
            assert_eq!(err, ProtocolError::UnsupportedMarker(m));
        }
    }

    #[test]
    fn test_unknown_command_passes_through() {
        let fields = parse_response(&response(&[0x44, 0x09])).unwrap();
        assert_eq!(fields.get(Command(0x44)), Some(&[0x09][..]));
    }

    #[test]
    fn test_duplicate_command_last_write_wins() {
        let fields = parse_response(&response(&[0x02, 0x01, 0x02, 0x03])).unwrap();
        assert_eq!(fields.byte(Command::SPEED), Some(0x03));
        assert_eq!(fields.len(), 1);
    }

    #[test]
    fn test_empty_field_stream() {
        let fields = parse_response(&response(&[])).unwrap();
        assert!(fields.is_empty());
    }

    #[test]
    fn test_truncated_fields() {
        for stream in [
            &[0x01][..],                    // plain without value
            &[0xFD][..],                    // invalid without command
            &[0xFE, 0x04, 0xB9, 0x01][..],  // sized value cut short
            &[0xFE][..],                    // sized without size
        ] {
            let err = protocol_error(parse_response(&response(stream)));
            assert_eq!(err, ProtocolError::Truncated, "stream {:02X?}", stream);
        }
    }

    #[test]
    fn test_bad_checksum() {
        let mut packet = response(&[0x01, 0x01]);
        let len = packet.len();
        packet[len - 1] ^= 0xFF;
        let err = protocol_error(parse_response(&packet));
        assert!(matches!(err, ProtocolError::ChecksumMismatch { .. }));
    }

    #[test]
    fn test_bad_prefix() {
        let mut packet = response(&[0x01, 0x01]);
        packet[1] = 0xFE;
        // the prefix is not covered by the checksum
        let err = protocol_error(parse_response(&packet));
        assert_eq!(err, ProtocolError::InvalidPrefix);
    }

    #[test]
    fn test_bad_protocol_type() {
        let mut packet = response(&[0x01, 0x01]);
        packet[2] = 0x03;
        reseal(&mut packet);
        assert_eq!(protocol_error(parse_response(&packet)), ProtocolError::InvalidProtocolType);
    }

    #[test]
    fn test_bad_result_function() {
        let packet = PacketCodec::new(Credentials::new("A1", "pw"))
            .to_bytes(&Request::read(&[Command::ON_OFF]))
            .unwrap();
        assert_eq!(protocol_error(parse_response(&packet)), ProtocolError::InvalidResultFunction);
    }

    #[test]
    fn test_id_length_past_end() {
        let mut packet = response(&[]);
        packet[4] = 0xF0;
        reseal(&mut packet);
        assert_eq!(protocol_error(parse_response(&packet)), ProtocolError::Truncated);
    }

    #[test]
    fn test_too_short_for_checksum() {
        assert_eq!(protocol_error(parse_response(&[])), ProtocolError::Truncated);
        assert_eq!(protocol_error(parse_response(&[0xFD])), ProtocolError::Truncated);
    }

    #[test]
    fn test_parse_header_of_request() {
        let packet = PacketCodec::new(Credentials::new("A1", "pw"))
            .to_bytes(&Request::read(&[Command::ON_OFF, Command::SPEED]))
            .unwrap();
        let body = &packet[..packet.len() - 2];
        let offset = parse_header(body, FunctionCode::Read).unwrap();
        assert_eq!(&body[offset..], &[0x01, 0x02]);
    }

    #[test]
    fn test_classify() {
        assert_eq!(FieldEncoding::classify(0x01), FieldEncoding::Plain);
        assert_eq!(FieldEncoding::classify(0xFD), FieldEncoding::Invalid);
        assert_eq!(FieldEncoding::classify(0xFE), FieldEncoding::ExplicitSize);
        assert_eq!(FieldEncoding::classify(0xFC), FieldEncoding::Unsupported(0xFC));
        assert_eq!(FieldEncoding::classify(0xFF), FieldEncoding::Unsupported(0xFF));
    }
}
