use bytes::{BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::core::{Credentials, Error, Result};
use super::checksum::checksum;
use super::parser::{parse_response, ResponseFields};
use super::{Command, FunctionCode, PACKET_PREFIX, PACKET_PROTOCOL_TYPE, PACKET_SIZE_ID};

/// Function code and payload of an outbound packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Function applied to every command in the payload
    pub function: FunctionCode,
    /// Command bytes, sent verbatim
    pub payload: Vec<u8>,
}

impl Request {
    /// Creates a request from raw payload bytes
    pub fn new(function: FunctionCode, payload: impl Into<Vec<u8>>) -> Self {
        Request {
            function,
            payload: payload.into(),
        }
    }

    /// Reads the given commands
    pub fn read(commands: &[Command]) -> Self {
        Request::new(FunctionCode::Read, commands.iter().map(|c| c.code()).collect::<Vec<_>>())
    }

    /// Writes each command's value and reads it back
    pub fn read_write(values: &[(Command, u8)]) -> Self {
        let payload = values
            .iter()
            .flat_map(|&(command, value)| [command.code(), value])
            .collect::<Vec<_>>();
        Request::new(FunctionCode::ReadWrite, payload)
    }
}

/// Packet codec for the authenticated V2 protocol.
///
/// Encoding wraps a [`Request`] in the credential header and checksum.
/// Decoding treats the whole buffer as one datagram and yields its parsed
/// [`ResponseFields`].
#[derive(Debug, Clone)]
pub struct PacketCodec {
    credentials: Credentials,
}

impl PacketCodec {
    /// Creates a new packet codec
    pub fn new(credentials: Credentials) -> Self {
        PacketCodec { credentials }
    }

    /// Returns the credentials embedded in every packet
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Serializes `request` into `dst`
    pub fn encode_packet(&self, request: &Request, dst: &mut BytesMut) -> Result<()> {
        let id = self.credentials.device_id.as_bytes();
        let password = self.credentials.password.as_bytes();
        let id_len = length_byte("device id", id)?;
        let password_len = length_byte("password", password)?;

        let start = dst.len();
        dst.reserve(8 + id.len() + password.len() + request.payload.len());
        dst.put_slice(&PACKET_PREFIX);
        dst.put_u8(PACKET_PROTOCOL_TYPE);
        dst.put_u8(PACKET_SIZE_ID);
        dst.put_u8(id_len);
        dst.put_slice(id);
        dst.put_u8(password_len);
        dst.put_slice(password);
        dst.put_u8(request.function.code());
        dst.put_slice(&request.payload);

        let sum = checksum(&dst[start..]);
        dst.put_slice(&sum);
        Ok(())
    }

    /// Serializes `request` into a fresh buffer
    pub fn to_bytes(&self, request: &Request) -> Result<BytesMut> {
        let mut dst = BytesMut::new();
        self.encode_packet(request, &mut dst)?;
        Ok(dst)
    }
}

fn length_byte(what: &str, bytes: &[u8]) -> Result<u8> {
    u8::try_from(bytes.len()).map_err(|_| {
        Error::encoding(format!("{} is {} bytes, at most 255 fit in a packet", what, bytes.len()))
    })
}

/// Splits a raw datagram into byte tokens.
///
/// No validation happens here; see [`parse_response`].
pub fn decode_tokens(bytes: &[u8]) -> Vec<u8> {
    bytes.to_vec()
}

impl Encoder<Request> for PacketCodec {
    type Error = Error;

    fn encode(&mut self, item: Request, dst: &mut BytesMut) -> Result<()> {
        self.encode_packet(&item, dst)
    }
}

impl Decoder for PacketCodec {
    type Item = ResponseFields;
    type Error = Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        if src.is_empty() {
            return Ok(None);
        }

        // A datagram is always a complete packet
        let datagram = src.split();
        let tokens = decode_tokens(&datagram);
        parse_response(&tokens).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::verify_checksum;

    fn codec() -> PacketCodec {
        PacketCodec::new(Credentials::new("A1", "pw"))
    }

    #[test]
    fn test_encode_read_on_off_and_speed() {
        let packet = codec()
            .to_bytes(&Request::read(&[Command::ON_OFF, Command::SPEED]))
            .unwrap();

        assert_eq!(
            &packet[..],
            &[
                0xFD, 0xFD, // prefix
                0x02, // protocol type
                0x10, // size class
                0x02, b'A', b'1', // id
                0x02, b'p', b'w', // password
                0x01, // read
                0x01, 0x02, // on/off, speed
                0x73, 0x01, // checksum 0x0173, low byte first
            ]
        );
    }

    #[test]
    fn test_encoded_checksum_covers_all_prior_bytes() {
        let packet = codec()
            .to_bytes(&Request::read_write(&[(Command::ON_OFF, 0x01), (Command::MODE, 0x02)]))
            .unwrap();
        let (body, sum) = packet.split_at(packet.len() - 2);
        assert!(verify_checksum(body, [sum[0], sum[1]]));
        assert_eq!(&body[body.len() - 5..], &[0x03, 0x01, 0x01, 0x07, 0x02]);
    }

    #[test]
    fn test_encoder_appends_to_buffer() {
        let mut dst = BytesMut::from(&b"xx"[..]);
        let mut codec = codec();
        codec.encode(Request::read(&[Command::SPEED]), &mut dst).unwrap();
        assert_eq!(&dst[..2], b"xx");
        assert_eq!(&dst[2..4], &PACKET_PREFIX);
        // checksum ignores whatever preceded the packet in the buffer
        let packet = &dst[2..];
        let (body, sum) = packet.split_at(packet.len() - 2);
        assert!(verify_checksum(body, [sum[0], sum[1]]));
    }

    #[test]
    fn test_oversized_credentials_rejected() {
        let long = "x".repeat(256);
        let err = PacketCodec::new(Credentials::new(long.clone(), "pw"))
            .to_bytes(&Request::read(&[Command::ON_OFF]))
            .unwrap_err();
        assert!(matches!(err, Error::Encoding(_)));

        let err = PacketCodec::new(Credentials::new("A1", long))
            .to_bytes(&Request::read(&[Command::ON_OFF]))
            .unwrap_err();
        assert!(matches!(err, Error::Encoding(_)));

        let max = "y".repeat(255);
        assert!(PacketCodec::new(Credentials::new(max, "pw"))
            .to_bytes(&Request::read(&[Command::ON_OFF]))
            .is_ok());
    }

    #[test]
    fn test_multibyte_utf8_length_is_in_bytes() {
        let packet = PacketCodec::new(Credentials::new("é", ""))
            .to_bytes(&Request::read(&[]))
            .unwrap();
        assert_eq!(packet[4], 2);
        assert_eq!(&packet[5..7], "é".as_bytes());
        assert_eq!(packet[7], 0);
    }

    #[test]
    fn test_decode_tokens_is_mechanical() {
        assert_eq!(decode_tokens(&[0x00, 0xFF, 0x10]), vec![0x00, 0xFF, 0x10]);
        assert!(decode_tokens(&[]).is_empty());
    }

    #[test]
    fn test_decoder_empty_buffer() {
        let mut src = BytesMut::new();
        assert!(codec().decode(&mut src).unwrap().is_none());
    }
}
