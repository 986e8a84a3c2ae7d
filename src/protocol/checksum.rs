//! Additive packet checksum
//!
//! The checksum is the 16-bit sum of every byte after the two byte prefix,
//! written low byte first.

use super::PACKET_PREFIX;

/// Computes the checksum of `bytes`, skipping the leading prefix.
///
/// `bytes` is a packet without its trailing checksum field.
pub fn checksum(bytes: &[u8]) -> [u8; 2] {
    let sum = bytes
        .iter()
        .skip(PACKET_PREFIX.len())
        .fold(0u16, |acc, &b| acc.wrapping_add(u16::from(b)));
    sum.to_le_bytes()
}

/// Returns true when `claimed` is exactly the checksum of `bytes`
pub fn verify_checksum(bytes: &[u8], claimed: [u8; 2]) -> bool {
    checksum(bytes) == claimed
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATUS_READ: [u8; 13] = [
        0xFD, 0xFD, 0x02, 0x10, 0x02, 0x41, 0x31, 0x02, 0x70, 0x77, 0x01, 0x01, 0x02,
    ];

    #[test]
    fn test_known_checksum() {
        // 0x02 + 0x10 + 0x02 + 'A' + '1' + 0x02 + 'p' + 'w' + 0x01 + 0x01 + 0x02 = 0x0173
        assert_eq!(checksum(&STATUS_READ), [0x73, 0x01]);
    }

    #[test]
    fn test_prefix_excluded() {
        let mut other_prefix = STATUS_READ;
        other_prefix[0] = 0x00;
        other_prefix[1] = 0xAA;
        assert_eq!(checksum(&other_prefix), checksum(&STATUS_READ));
    }

    #[test]
    fn test_sum_truncated_to_16_bits() {
        let mut bytes = vec![0xFD, 0xFD];
        bytes.extend(std::iter::repeat(0xFF).take(300));
        // 300 * 255 = 76500 = 0x12AD4, truncated to 0x2AD4
        assert_eq!(checksum(&bytes), [0xD4, 0x2A]);
    }

    #[test]
    fn test_single_bit_flip_changes_checksum() {
        let mut flipped = STATUS_READ;
        flipped[8] ^= 0x01;
        assert_ne!(checksum(&flipped), checksum(&STATUS_READ));
        assert!(!verify_checksum(&flipped, [0x73, 0x01]));
    }

    #[test]
    fn test_verify_requires_exact_order() {
        assert!(verify_checksum(&STATUS_READ, [0x73, 0x01]));
        assert!(!verify_checksum(&STATUS_READ, [0x01, 0x73]));
    }

    #[test]
    fn test_short_input() {
        assert_eq!(checksum(&[]), [0x00, 0x00]);
        assert_eq!(checksum(&[0xFD, 0xFD]), [0x00, 0x00]);
    }
}
