//! Conversions between numbers and MSB-first bit sequences.
//!
//! A "bit" is a `u8` holding 0 or 1. Anything non-zero read back from a
//! sequence is treated as its lowest bit only.

use crate::error::{Result, StegoError};

pub fn byte_to_bits(byte: u8) -> [u8; 8] {
    [
        (byte >> 7) & 0x01,
        (byte >> 6) & 0x01,
        (byte >> 5) & 0x01,
        (byte >> 4) & 0x01,
        (byte >> 3) & 0x01,
        (byte >> 2) & 0x01,
        (byte >> 1) & 0x01,
        byte & 0x01,
    ]
}

pub fn bits_to_byte(bits: &[u8]) -> Result<u8> {
    if bits.len() != 8 {
        return Err(StegoError::Length {
            expected: 8,
            actual: bits.len(),
        });
    }

    Ok((bits[0] << 7) & 0x80
        | (bits[1] << 6) & 0x40
        | (bits[2] << 5) & 0x20
        | (bits[3] << 4) & 0x10
        | (bits[4] << 3) & 0x08
        | (bits[5] << 2) & 0x04
        | (bits[6] << 1) & 0x02
        | (bits[7] & 0x01))
}

/// Writes the low `width` bits of `value`, most significant first.
/// Higher bits are dropped; widths above 64 are padded with leading zeros.
pub fn number_to_bits(value: u64, width: usize) -> Vec<u8> {
    (0..width)
        .rev()
        .map(|shift| {
            if shift >= 64 {
                0
            } else {
                ((value >> shift) & 0x01) as u8
            }
        })
        .collect()
}

/// Reads MSB-first bits back into a number. Only the last 64 bits survive.
pub fn bits_to_number(bits: &[u8]) -> u64 {
    bits.iter()
        .fold(0u64, |acc, bit| (acc << 1) | u64::from(bit & 0x01))
}

pub fn bytes_to_bits(bytes: &[u8]) -> Vec<u8> {
    let mut bits = Vec::with_capacity(bytes.len() * 8);
    for byte in bytes {
        bits.extend_from_slice(&byte_to_bits(*byte));
    }
    bits
}

pub fn bits_to_bytes(bits: &[u8]) -> Result<Vec<u8>> {
    if bits.len() % 8 != 0 {
        return Err(StegoError::Length {
            expected: (bits.len() / 8 + 1) * 8,
            actual: bits.len(),
        });
    }

    bits.chunks(8).map(bits_to_byte).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_merge_byte() {
        test_split_merge(0xFF, [1, 1, 1, 1, 1, 1, 1, 1]);
        test_split_merge(0x03, [0, 0, 0, 0, 0, 0, 1, 1]);
        test_split_merge(0x02, [0, 0, 0, 0, 0, 0, 1, 0]);
        test_split_merge(0x00, [0, 0, 0, 0, 0, 0, 0, 0]);
        test_split_merge(0x11, [0, 0, 0, 1, 0, 0, 0, 1]);
        test_split_merge(0xEC, [1, 1, 1, 0, 1, 1, 0, 0]);
        test_split_merge(0x4D, [0, 1, 0, 0, 1, 1, 0, 1]);
    }

    #[test]
    fn test_bits_to_byte_requires_eight_bits() {
        assert_eq!(
            Err(StegoError::Length {
                expected: 8,
                actual: 7
            }),
            bits_to_byte(&[0, 1, 0, 1, 0, 1, 0])
        );
        assert!(bits_to_byte(&[0; 9]).is_err());
    }

    #[test]
    fn test_number_to_bits() {
        assert_eq!(vec![0, 1, 0, 1], number_to_bits(5, 4));
        assert_eq!(vec![0, 0, 0, 0, 0, 0, 0, 1], number_to_bits(1, 8));
        assert_eq!(0x4D53_4348, bits_to_number(&number_to_bits(0x4D53_4348, 32)));
        assert_eq!(u64::MAX, bits_to_number(&number_to_bits(u64::MAX, 64)));
    }

    #[test]
    fn test_number_to_bits_truncates() {
        // 0x1FF only keeps its low byte at width 8
        assert_eq!(vec![1; 8], number_to_bits(0x1FF, 8));
        assert_eq!(0xFF, bits_to_number(&number_to_bits(0x1FF, 8)));
        assert!(number_to_bits(42, 0).is_empty());
    }

    #[test]
    fn test_wide_widths_pad_with_zeros() {
        let bits = number_to_bits(3, 66);
        assert_eq!(66, bits.len());
        assert_eq!(&[0, 0], &bits[..2]);
        assert_eq!(3, bits_to_number(&bits));
    }

    #[test]
    fn test_bytes_bits_round_trip() {
        let bits = bytes_to_bits(b"Hi");
        assert_eq!(16, bits.len());
        assert_eq!(b"Hi".to_vec(), bits_to_bytes(&bits).expect("no error"));
        assert!(bits_to_bytes(&bits[..15]).is_err());
    }

    fn test_split_merge(input: u8, expected: [u8; 8]) {
        let result = byte_to_bits(input);
        assert_eq!(expected, result);

        let merged = bits_to_byte(&result).expect("no error");
        assert_eq!(input, merged);
    }
}
