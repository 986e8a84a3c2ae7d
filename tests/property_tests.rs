//! Property-based tests using proptest
//!
//! These check packet framing, checksum and parser invariants over random
//! credentials, payloads and field streams.

use proptest::prelude::*;
use twinfresh::protocol::parser::parse_header;
use twinfresh::protocol::{
    checksum, decode_tokens, parse_response, verify_checksum, Command, FunctionCode, PacketCodec,
    Request, ResponseFields,
};
use twinfresh::{Credentials, Error};

fn function_strategy() -> impl Strategy<Value = FunctionCode> {
    prop_oneof![
        Just(FunctionCode::Read),
        Just(FunctionCode::Write),
        Just(FunctionCode::ReadWrite),
        Just(FunctionCode::Increment),
        Just(FunctionCode::Decrement),
        Just(FunctionCode::Result),
    ]
}

// Property: every encoded packet has a valid header and checksum
proptest! {
    #[test]
    fn prop_encode_then_check_header(
        id in "[ -~]{0,40}",
        password in "\\PC{0,20}",
        function in function_strategy(),
        payload in prop::collection::vec(any::<u8>(), 0..200),
    ) {
        let codec = PacketCodec::new(Credentials::new(id, password));
        let packet = codec.to_bytes(&Request::new(function, payload.clone())).unwrap();
        let tokens = decode_tokens(&packet);

        let (body, sum) = tokens.split_at(tokens.len() - 2);
        prop_assert!(verify_checksum(body, [sum[0], sum[1]]));

        let offset = parse_header(body, function).unwrap();
        prop_assert_eq!(&body[offset..], &payload[..]);
    }
}

// Property: checksum is deterministic
proptest! {
    #[test]
    fn prop_checksum_deterministic(bytes in prop::collection::vec(any::<u8>(), 0..600)) {
        prop_assert_eq!(checksum(&bytes), checksum(&bytes));
    }
}

// Property: flipping one bit after the prefix changes the checksum
proptest! {
    #[test]
    fn prop_checksum_detects_single_bit_flip(
        bytes in prop::collection::vec(any::<u8>(), 3..200),
        index in any::<prop::sample::Index>(),
        bit in 0u8..8,
    ) {
        let i = 2 + index.index(bytes.len() - 2);
        let mut flipped = bytes.clone();
        flipped[i] ^= 1 << bit;
        // sums stay far below 2^16, so a single flip cannot wrap around
        prop_assert_ne!(checksum(&flipped), checksum(&bytes));
    }
}

// Property: the parser never panics, whatever arrives
proptest! {
    #[test]
    fn prop_parse_arbitrary_bytes(bytes in prop::collection::vec(any::<u8>(), 0..300)) {
        let _ = parse_response(&bytes);
    }
}

// Property: well-formed plain field streams decode to exactly their pairs
proptest! {
    #[test]
    fn prop_plain_fields_decoded(
        pairs in prop::collection::btree_map(0u8..0xFC, any::<u8>(), 0..20),
    ) {
        let stream: Vec<u8> = pairs.iter().flat_map(|(&c, &v)| [c, v]).collect();
        let packet = PacketCodec::new(Credentials::new("A1", "pw"))
            .to_bytes(&Request::new(FunctionCode::Result, stream))
            .unwrap();

        let fields: ResponseFields = parse_response(&packet).unwrap();
        prop_assert_eq!(fields.len(), pairs.len());
        for (&command, &value) in &pairs {
            prop_assert_eq!(fields.get(Command(command)), Some(&[value][..]));
        }
    }
}

// Property: any truncation of a valid response is rejected, never misread
proptest! {
    #[test]
    fn prop_truncated_response_rejected(cut in 1usize..16) {
        let packet = PacketCodec::new(Credentials::new("A1", "pw"))
            .to_bytes(&Request::new(FunctionCode::Result, vec![0x01, 0x01, 0x02, 0x03]))
            .unwrap();
        let cut = cut.min(packet.len());
        let result = parse_response(&packet[..packet.len() - cut]);
        prop_assert!(matches!(result, Err(Error::Protocol(_))));
    }
}
